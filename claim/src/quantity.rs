use crate::error::QuantityError;

/// Number of tokens the user wants to claim. Never below 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quantity(u64);

impl Default for Quantity {
    fn default() -> Self {
        Self(1)
    }
}

impl Quantity {
    pub fn get(&self) -> u64 {
        self.0
    }

    /// Clamped at 1.
    pub fn decrement(&mut self) {
        self.0 = self.0.saturating_sub(1).max(1);
    }

    /// No ceiling, the claim gate checks the remaining supply.
    pub fn increment(&mut self) {
        self.0 = self.0.saturating_add(1);
    }

    pub fn reset(&mut self) {
        self.0 = 1;
    }

    /// Replaces the quantity with typed text. Rejected input leaves it as is.
    pub fn set_from_input(&mut self, input: &str) -> Result<u64, QuantityError> {
        let value = parse(input)?;
        self.0 = value;
        Ok(value)
    }
}

fn parse(input: &str) -> Result<u64, QuantityError> {
    let trimmed = input.trim();
    match trimmed.parse::<u64>() {
        Ok(0) => Err(QuantityError::Zero),
        Ok(value) => Ok(value),
        Err(_) => Err(QuantityError::NotANumber(trimmed.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decrement_is_clamped_at_one() {
        let mut quantity = Quantity::default();
        quantity.decrement();
        assert_eq!(quantity.get(), 1);

        let mut quantity = Quantity(5);
        quantity.decrement();
        assert_eq!(quantity.get(), 4);
    }

    #[test]
    fn increment_has_no_ceiling() {
        let mut quantity = Quantity::default();
        quantity.increment();
        assert_eq!(quantity.get(), 2);

        for _ in 0..10_000 {
            quantity.increment();
        }
        assert_eq!(quantity.get(), 10_002);
    }

    #[test]
    fn manual_entry_accepts_whole_numbers() {
        let mut quantity = Quantity::default();
        assert_eq!(quantity.set_from_input(" 12 "), Ok(12));
        assert_eq!(quantity.get(), 12);
    }

    #[test]
    fn manual_entry_rejects_garbage_and_keeps_value() {
        let mut quantity = Quantity(3);
        assert_eq!(
            quantity.set_from_input("abc"),
            Err(QuantityError::NotANumber("abc".into()))
        );
        assert!(matches!(quantity.set_from_input("-2"), Err(QuantityError::NotANumber(_))));
        assert!(matches!(quantity.set_from_input("1.5"), Err(QuantityError::NotANumber(_))));
        assert!(matches!(quantity.set_from_input(""), Err(QuantityError::NotANumber(_))));
        assert_eq!(quantity.set_from_input("0"), Err(QuantityError::Zero));
        assert_eq!(quantity.get(), 3);
    }

    #[test]
    fn reset_returns_to_one() {
        let mut quantity = Quantity(9);
        quantity.reset();
        assert_eq!(quantity, Quantity::default());
    }
}

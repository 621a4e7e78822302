use crate::dto::ClaimCondition;

/// Formats an amount of smallest currency units as a base-currency decimal
/// string, e.g. `1_500_000_000` with 9 decimals is `"1.5"`.
pub fn format_units(amount: u128, decimals: u32) -> String {
    if decimals == 0 {
        return amount.to_string();
    }
    let digits = amount.to_string();
    let decimals = decimals as usize;
    let (whole, frac) = if digits.len() > decimals {
        let split = digits.len() - decimals;
        (digits[..split].to_string(), digits[split..].to_string())
    } else {
        ("0".to_string(), format!("{digits:0>decimals$}"))
    };

    let frac = frac.trim_end_matches('0');
    if frac.is_empty() {
        whole
    } else {
        format!("{whole}.{frac}")
    }
}

/// Total price of `quantity` tokens under `condition`, formatted in the base
/// currency. A condition that has not loaded prices tokens at zero.
///
/// `u64 * u64` always fits in `u128`.
pub fn total_price(quantity: u64, condition: Option<&ClaimCondition>, decimals: u32) -> String {
    let unit = condition.map_or(0, |c| c.price_per_token);
    format_units(quantity as u128 * unit as u128, decimals)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn priced(price_per_token: u64) -> ClaimCondition {
        ClaimCondition {
            price_per_token,
            ..ClaimCondition::free()
        }
    }

    #[test]
    fn whole_units() {
        assert_eq!(format_units(3_000_000_000_000_000_000, 18), "3");
        assert_eq!(format_units(1_000_000_000, 9), "1");
        assert_eq!(format_units(42, 0), "42");
    }

    #[test]
    fn fractional_units() {
        assert_eq!(format_units(1_500_000_000, 9), "1.5");
        assert_eq!(format_units(1, 9), "0.000000001");
        assert_eq!(format_units(120_000_000, 9), "0.12");
        assert_eq!(format_units(0, 9), "0");
    }

    #[test]
    fn total_is_quantity_times_unit_price() {
        let condition = priced(1_000_000_000_000_000_000);
        assert_eq!(total_price(3, Some(&condition), 18), "3");

        let condition = priced(750_000_000);
        assert_eq!(total_price(2, Some(&condition), 9), "1.5");
    }

    #[test]
    fn unloaded_condition_is_free() {
        assert_eq!(total_price(1, None, 9), "0");
        assert_eq!(total_price(1_000, None, 9), "0");
    }

    #[test]
    fn largest_inputs_fit() {
        let condition = priced(u64::MAX);
        let total = total_price(u64::MAX, Some(&condition), 0);
        assert_eq!(total, ((u64::MAX as u128) * (u64::MAX as u128)).to_string());
    }
}

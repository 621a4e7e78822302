use anchor_client::solana_sdk::signature::Signature;
use serde::Deserialize;

/// Collection metadata shown above the claim form.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ContractMetadata {
    pub name: String,
    pub description: String,
    pub image: String,
}

/// Off-chain JSON document referenced by the collection's metadata uri.
#[derive(Deserialize, Debug, Default)]
pub struct OffChainMetadata {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

impl OffChainMetadata {
    /// Off-chain fields win, the on-chain name fills a missing one.
    pub fn into_contract_metadata(self, on_chain_name: &str) -> ContractMetadata {
        ContractMetadata {
            name: self
                .name
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| on_chain_name.to_string()),
            description: self.description.unwrap_or_default(),
            image: self.image.unwrap_or_default(),
        }
    }
}

/// Active claim condition of the drop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClaimCondition {
    /// Price per token in lamports.
    pub price_per_token: u64,
    pub start_timestamp: i64,
    /// 0 means no per-claim limit.
    pub max_per_claim: u64,
}

impl ClaimCondition {
    const DISCRIMINATOR_LEN: usize = 8;
    const LEN: usize = Self::DISCRIMINATOR_LEN + 8 + 8 + 8;

    /// Decodes the account as the drop program stores it: discriminator, then
    /// little endian `price_per_token`, `start_timestamp`, `max_per_claim`.
    pub fn from_account_data(data: &[u8]) -> Option<Self> {
        if data.len() < Self::LEN {
            return None;
        }
        let field = |i: usize| -> [u8; 8] {
            let start = Self::DISCRIMINATOR_LEN + i * 8;
            let mut buf = [0u8; 8];
            buf.copy_from_slice(&data[start..start + 8]);
            buf
        };
        Some(Self {
            price_per_token: u64::from_le_bytes(field(0)),
            start_timestamp: i64::from_le_bytes(field(1)),
            max_per_claim: u64::from_le_bytes(field(2)),
        })
    }

    pub fn free() -> Self {
        Self {
            price_per_token: 0,
            start_timestamp: 0,
            max_per_claim: 0,
        }
    }

    pub fn per_claim_limit(&self) -> Option<u64> {
        (self.max_per_claim > 0).then_some(self.max_per_claim)
    }
}

/// Supply counters, `total == u64::MAX` for an unlimited edition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SupplyCounters {
    pub claimed: u64,
    pub total: u64,
}

impl SupplyCounters {
    pub fn remaining(&self) -> u64 {
        self.total.saturating_sub(self.claimed)
    }

    pub fn is_unlimited(&self) -> bool {
        self.total == u64::MAX
    }
}

/// Result of a confirmed claim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimReceipt {
    pub quantity: u64,
    pub signatures: Vec<Signature>,
}

pub mod claim_flow;
pub mod config;
pub mod drop_client;
pub mod dto;
pub mod error;
pub mod price;
pub mod quantity;
pub mod read_cache;
pub mod wallet;

pub use crate::claim_flow::{ClaimState, ClaimView, Notice};
pub use crate::config::Config;
pub use crate::drop_client::{ClaimSubmitter, DropClient, DropReader};
pub use crate::dto::{ClaimCondition, ClaimReceipt, ContractMetadata, SupplyCounters};
pub use crate::error::{ClaimBlocked, Error, QuantityError};
pub use crate::read_cache::{Query, Read, ReadCache};
pub use crate::wallet::WalletSession;

//! Error types for the claim client.

use std::fmt;

/// Claim client error type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Configuration error.
    Config(String),
    /// RPC communication error.
    Rpc(String),
    /// Collection metadata could not be fetched or decoded.
    Metadata(String),
    /// Wallet could not be loaded.
    Wallet(String),
    /// Claim transaction failed.
    Claim(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(msg) => write!(f, "config error: {msg}"),
            Error::Rpc(msg) => write!(f, "rpc error: {msg}"),
            Error::Metadata(msg) => write!(f, "metadata error: {msg}"),
            Error::Wallet(msg) => write!(f, "wallet error: {msg}"),
            Error::Claim(msg) => write!(f, "claim failed: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

/// Rejected manual quantity entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuantityError {
    NotANumber(String),
    Zero,
}

impl fmt::Display for QuantityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuantityError::NotANumber(input) => write!(f, "'{input}' is not a whole number"),
            QuantityError::Zero => write!(f, "quantity must be at least 1"),
        }
    }
}

impl std::error::Error for QuantityError {}

/// Why the claim control is disabled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimBlocked {
    NoWallet,
    Submitting,
    NotStarted { starts_at: i64 },
    SupplyLoading,
    SoldOut,
    ExceedsRemaining { requested: u64, remaining: u64 },
    ExceedsPerClaimLimit { requested: u64, limit: u64 },
}

impl fmt::Display for ClaimBlocked {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClaimBlocked::NoWallet => write!(f, "connect a wallet to claim"),
            ClaimBlocked::Submitting => write!(f, "a claim is already in progress"),
            ClaimBlocked::NotStarted { starts_at } => write!(f, "claims open at unix time {starts_at}"),
            ClaimBlocked::SupplyLoading => write!(f, "supply is still loading"),
            ClaimBlocked::SoldOut => write!(f, "sold out"),
            ClaimBlocked::ExceedsRemaining { requested, remaining } => {
                write!(f, "only {remaining} left, cannot claim {requested}")
            }
            ClaimBlocked::ExceedsPerClaimLimit { requested, limit } => {
                write!(f, "at most {limit} per claim, cannot claim {requested}")
            }
        }
    }
}

impl std::error::Error for ClaimBlocked {}

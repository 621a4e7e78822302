//! Deployment configuration: target cluster, drop program and collection.

use std::str::FromStr;
use std::time::Duration;

use anchor_client::solana_sdk::pubkey::Pubkey;
use anchor_client::solana_sdk::signature::Signature;
use ::config::builder::DefaultState;
use ::config::ConfigBuilder;
use serde::Deserialize;
use url::Url;

use crate::error::Error;

/// Configuration for the claim client.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// `mainnet-beta`, `testnet`, `devnet` or `localnet`.
    #[serde(default = "defaults::cluster")]
    pub cluster: String,

    /// Overrides the cluster's public RPC endpoint.
    #[serde(default)]
    pub rpc_url: Option<String>,

    /// RPC provider client id, sent as the `api-key` query parameter.
    #[serde(default)]
    pub client_id: Option<String>,

    #[serde(default = "defaults::program_id")]
    pub program_id: String,

    /// Master edition mint of the collection being dropped.
    #[serde(default)]
    pub collection_mint: String,

    #[serde(default = "defaults::keypair_path")]
    pub keypair_path: String,

    #[serde(default = "defaults::currency_decimals")]
    pub currency_decimals: u32,

    #[serde(default = "defaults::currency_symbol")]
    pub currency_symbol: String,

    #[serde(default = "defaults::refresh_secs")]
    pub refresh_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cluster: defaults::cluster(),
            rpc_url: None,
            client_id: None,
            program_id: defaults::program_id(),
            collection_mint: String::new(),
            keypair_path: defaults::keypair_path(),
            currency_decimals: defaults::currency_decimals(),
            currency_symbol: defaults::currency_symbol(),
            refresh_secs: defaults::refresh_secs(),
        }
    }
}

impl Config {
    /// Reads `drop.{toml,json,yaml,..}` if present, then `DROP_*` variables.
    pub fn load() -> Result<Self, Error> {
        Self::build(
            ::config::Config::builder()
                .add_source(::config::File::with_name("drop").required(false))
                .add_source(::config::Environment::with_prefix("DROP").try_parsing(true)),
        )
    }

    fn build(builder: ConfigBuilder<DefaultState>) -> Result<Self, Error> {
        builder
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| Error::Config(e.to_string()))
    }

    /// RPC endpoint with the client id attached.
    pub fn rpc_endpoint(&self) -> Result<String, Error> {
        let base = match &self.rpc_url {
            Some(url) if !url.is_empty() => url.clone(),
            _ => defaults::cluster_url(&self.cluster).to_string(),
        };

        let mut url = Url::parse(&base).map_err(|e| Error::Config(format!("rpc_url {base}: {e}")))?;
        if let Some(id) = self.client_id.as_deref().filter(|id| !id.is_empty()) {
            url.query_pairs_mut().append_pair("api-key", id);
        }
        Ok(url.to_string())
    }

    pub fn program_id(&self) -> Result<Pubkey, Error> {
        parse_pubkey("program_id", &self.program_id)
    }

    pub fn collection_mint(&self) -> Result<Pubkey, Error> {
        parse_pubkey("collection_mint", &self.collection_mint)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_secs.max(1))
    }

    pub fn explorer_url(&self, signature: &Signature) -> String {
        match self.cluster.as_str() {
            "mainnet-beta" | "mainnet" => format!("https://explorer.solana.com/tx/{signature}"),
            cluster => format!("https://explorer.solana.com/tx/{signature}?cluster={cluster}"),
        }
    }
}

fn parse_pubkey(field: &str, value: &str) -> Result<Pubkey, Error> {
    if value.is_empty() {
        return Err(Error::Config(format!("{field} is not set")));
    }
    Pubkey::from_str(value).map_err(|e| Error::Config(format!("{field} '{value}': {e}")))
}

mod defaults {
    pub fn cluster() -> String {
        "devnet".into()
    }

    pub fn cluster_url(cluster: &str) -> &'static str {
        match cluster {
            "mainnet-beta" | "mainnet" => "https://api.mainnet-beta.solana.com",
            "testnet" => "https://api.testnet.solana.com",
            "localnet" | "localhost" => "http://127.0.0.1:8899",
            _ => "https://api.devnet.solana.com",
        }
    }

    pub fn program_id() -> String {
        "ADidMwkBx687QFpAFmYVJs3fqVLQz1BHNfb1dH4o5UgK".into()
    }

    pub fn keypair_path() -> String {
        dirs::home_dir()
            .map(|home| home.join(".config/solana/id.json"))
            .unwrap_or_else(|| "id.json".into())
            .to_string_lossy()
            .into_owned()
    }

    pub fn currency_decimals() -> u32 {
        9
    }

    pub fn currency_symbol() -> String {
        "SOL".into()
    }

    pub fn refresh_secs() -> u64 {
        15
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ::config::{File, FileFormat};

    fn from_toml(toml: &str) -> Result<Config, Error> {
        Config::build(::config::Config::builder().add_source(File::from_str(toml, FileFormat::Toml)))
    }

    #[test]
    fn defaults_target_devnet() {
        let config = from_toml("").unwrap();
        assert_eq!(config.cluster, "devnet");
        assert_eq!(config.currency_decimals, 9);
        assert_eq!(config.currency_symbol, "SOL");
        assert_eq!(config.rpc_endpoint().unwrap(), "https://api.devnet.solana.com/");
        assert!(config.program_id().is_ok());
    }

    #[test]
    fn cluster_selects_endpoint() {
        let config = from_toml(r#"cluster = "mainnet-beta""#).unwrap();
        assert_eq!(config.rpc_endpoint().unwrap(), "https://api.mainnet-beta.solana.com/");
    }

    #[test]
    fn client_id_is_appended() {
        let config = from_toml(
            r#"
            rpc_url = "https://rpc.example.com/v1?region=eu"
            client_id = "abc123"
            "#,
        )
        .unwrap();
        assert_eq!(
            config.rpc_endpoint().unwrap(),
            "https://rpc.example.com/v1?region=eu&api-key=abc123"
        );
    }

    #[test]
    fn missing_collection_mint_is_a_config_error() {
        let config = Config::default();
        assert!(matches!(config.collection_mint(), Err(Error::Config(_))));
    }

    #[test]
    fn malformed_pubkey_is_a_config_error() {
        let config = from_toml(r#"collection_mint = "not-a-key""#).unwrap();
        assert!(matches!(config.collection_mint(), Err(Error::Config(msg)) if msg.contains("not-a-key")));
    }

    #[test]
    fn explorer_url_carries_cluster() {
        let signature = Signature::default();
        let devnet = Config::default();
        assert!(devnet.explorer_url(&signature).ends_with("?cluster=devnet"));

        let mainnet = from_toml(r#"cluster = "mainnet-beta""#).unwrap();
        assert!(!mainnet.explorer_url(&signature).contains("cluster="));
    }

    #[test]
    fn refresh_interval_is_at_least_a_second() {
        let config = from_toml("refresh_secs = 0").unwrap();
        assert_eq!(config.refresh_interval(), Duration::from_secs(1));
    }
}

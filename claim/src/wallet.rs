use std::sync::Arc;

use anchor_client::solana_sdk::pubkey::Pubkey;
use anchor_client::solana_sdk::signature::{read_keypair_file, Keypair, Signer};
use tracing::info;

use crate::error::Error;

/// Which account, if any, the user has authorized the client to act for.
#[derive(Default, Clone)]
pub struct WalletSession {
    keypair: Option<Arc<Keypair>>,
}

impl WalletSession {
    pub fn disconnected() -> Self {
        Self::default()
    }

    pub fn with_keypair(keypair: Keypair) -> Self {
        Self {
            keypair: Some(Arc::new(keypair)),
        }
    }

    /// Loads a solana CLI style keypair file.
    pub fn connect(&mut self, path: &str) -> Result<Pubkey, Error> {
        let keypair = read_keypair_file(path).map_err(|e| Error::Wallet(format!("{path}: {e}")))?;
        let account = keypair.pubkey();
        self.keypair = Some(Arc::new(keypair));
        info!(%account, "wallet connected");
        Ok(account)
    }

    pub fn disconnect(&mut self) {
        if let Some(keypair) = self.keypair.take() {
            info!(account = %keypair.pubkey(), "wallet disconnected");
        }
    }

    pub fn account(&self) -> Option<Pubkey> {
        self.keypair.as_ref().map(|k| k.pubkey())
    }

    pub fn is_connected(&self) -> bool {
        self.keypair.is_some()
    }

    pub(crate) fn signer(&self) -> Option<Arc<Keypair>> {
        self.keypair.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connect_and_disconnect() {
        let keypair = Keypair::new();
        let expected = keypair.pubkey();
        let mut session = WalletSession::with_keypair(keypair);
        assert_eq!(session.account(), Some(expected));

        session.disconnect();
        assert_eq!(session.account(), None);
        assert!(!session.is_connected());
    }

    #[test]
    fn missing_keypair_file_is_a_wallet_error() {
        let mut session = WalletSession::disconnected();
        let result = session.connect("/nonexistent/id.json");
        assert!(matches!(result, Err(Error::Wallet(msg)) if msg.contains("/nonexistent/id.json")));
        assert!(!session.is_connected());
    }
}

use std::str::FromStr;
use std::sync::Arc;

use anchor_client::anchor_lang::solana_program::hash::hash;
use anchor_client::solana_client::rpc_client::RpcClient;
use anchor_client::solana_sdk::commitment_config::CommitmentConfig;
use anchor_client::solana_sdk::instruction::{AccountMeta, Instruction};
use anchor_client::solana_sdk::pubkey::Pubkey;
use anchor_client::solana_sdk::signature::{Keypair, Signer};
use anchor_client::solana_sdk::system_program;
use anchor_client::solana_sdk::transaction::Transaction;
use mpl_token_metadata::accounts::{MasterEdition, Metadata};
use mpl_token_metadata::EDITION_MARKER_BIT_SIZE;
use tracing::{debug, info};

use crate::config::Config;
use crate::dto::{ClaimCondition, ClaimReceipt, ContractMetadata, OffChainMetadata};
use crate::error::Error;

const TOKEN_PROGRAM_ID: &str = "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA";
const ASSOCIATED_TOKEN_PROGRAM_ID: &str = "ATokenGPvbdGVxr1b2hvZbsiqW5xWH25efTNsLJA8knL";

/// Reads of drop state. Each call is independent and may block on the network.
pub trait DropReader: Send + Sync + 'static {
    fn contract_metadata(&self) -> Result<ContractMetadata, Error>;
    fn claimed_supply(&self) -> Result<u64, Error>;
    /// `u64::MAX` when the edition has no max supply.
    fn total_supply(&self) -> Result<u64, Error>;
    /// `None` when the drop has no active claim condition.
    fn active_claim_condition(&self) -> Result<Option<ClaimCondition>, Error>;
}

/// Submits a claim and blocks until it is confirmed or fails.
pub trait ClaimSubmitter: Send + Sync + 'static {
    fn claim_to(&self, payer: &Keypair, receiver: &Pubkey, quantity: u64) -> Result<ClaimReceipt, Error>;
}

/**
 * Handle to one drop: the drop program plus the collection's master edition mint.
 * Arc on fields so clones can be moved into fetch threads.
 */
#[derive(Clone)]
pub struct DropClient {
    rpc: Arc<RpcClient>,
    http: reqwest::blocking::Client,
    program_id: Pubkey,
    master_mint: Pubkey,
    metadata_program_id: Pubkey,
    token_program_id: Pubkey,
    associated_token_program_id: Pubkey,
}

impl DropClient {
    pub fn new(rpc_url: &str, program_id: Pubkey, master_mint: Pubkey) -> Result<Self, Error> {
        let rpc = RpcClient::new_with_commitment(rpc_url.to_string(), CommitmentConfig::confirmed());

        let token_program_id = Pubkey::from_str(TOKEN_PROGRAM_ID).map_err(|e| Error::Config(e.to_string()))?;
        let associated_token_program_id =
            Pubkey::from_str(ASSOCIATED_TOKEN_PROGRAM_ID).map_err(|e| Error::Config(e.to_string()))?;

        Ok(Self {
            rpc: Arc::new(rpc),
            http: reqwest::blocking::Client::new(),
            program_id,
            master_mint,
            metadata_program_id: Pubkey::new_from_array(mpl_token_metadata::ID.to_bytes()),
            token_program_id,
            associated_token_program_id,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, Error> {
        let client = Self::new(&config.rpc_endpoint()?, config.program_id()?, config.collection_mint()?)?;
        info!(
            cluster = %config.cluster,
            program = %client.program_id,
            collection = %client.master_mint,
            "drop client ready"
        );
        Ok(client)
    }

    pub fn master_mint(&self) -> &Pubkey {
        &self.master_mint
    }

    fn metadata_address(&self, mint: &Pubkey) -> Pubkey {
        Pubkey::find_program_address(
            &[b"metadata", self.metadata_program_id.as_ref(), mint.as_ref()],
            &self.metadata_program_id,
        )
        .0
    }

    fn edition_address(&self, mint: &Pubkey) -> Pubkey {
        Pubkey::find_program_address(
            &[b"metadata", self.metadata_program_id.as_ref(), mint.as_ref(), b"edition"],
            &self.metadata_program_id,
        )
        .0
    }

    // One marker account tracks EDITION_MARKER_BIT_SIZE editions.
    fn edition_marker_address(&self, edition_supply: u64) -> Pubkey {
        let marker = (edition_supply / EDITION_MARKER_BIT_SIZE).to_string();
        Pubkey::find_program_address(
            &[
                b"metadata",
                self.metadata_program_id.as_ref(),
                self.master_mint.as_ref(),
                b"edition",
                marker.as_bytes(),
            ],
            &self.metadata_program_id,
        )
        .0
    }

    fn associated_token_address(&self, owner: &Pubkey, mint: &Pubkey) -> Pubkey {
        Pubkey::find_program_address(
            &[owner.as_ref(), self.token_program_id.as_ref(), mint.as_ref()],
            &self.associated_token_program_id,
        )
        .0
    }

    fn claim_condition_address(&self) -> Pubkey {
        Pubkey::find_program_address(&[b"claim_condition", self.master_mint.as_ref()], &self.program_id).0
    }

    fn mint_authority(&self) -> Pubkey {
        Pubkey::find_program_address(&[b"authority"], &self.program_id).0
    }

    fn master_edition(&self) -> Result<MasterEdition, Error> {
        let address = self.edition_address(&self.master_mint);
        let data = self
            .rpc
            .get_account_data(&address)
            .map_err(|e| Error::Rpc(format!("master edition {address}: {e}")))?;
        MasterEdition::from_bytes(&data).map_err(|e| Error::Rpc(format!("master edition {address}: {e}")))
    }

    /// `buy_nft` mints the next edition of the collection into the buyer's token account.
    pub(crate) fn buy_instruction(&self, buyer: &Pubkey, new_mint: &Pubkey, edition_supply: u64) -> Instruction {
        let mint_authority = self.mint_authority();
        let accounts = vec![
            AccountMeta::new(*buyer, true),
            AccountMeta::new_readonly(self.master_mint, false),
            AccountMeta::new_readonly(mint_authority, false),
            AccountMeta::new(self.associated_token_address(&mint_authority, &self.master_mint), false),
            AccountMeta::new(self.metadata_address(&self.master_mint), false),
            AccountMeta::new(self.edition_address(&self.master_mint), false),
            AccountMeta::new(*new_mint, true),
            AccountMeta::new(self.associated_token_address(buyer, new_mint), false),
            AccountMeta::new(self.metadata_address(new_mint), false),
            AccountMeta::new(self.edition_address(new_mint), false),
            AccountMeta::new(self.edition_marker_address(edition_supply), false),
            AccountMeta::new_readonly(system_program::ID, false),
            AccountMeta::new_readonly(self.token_program_id, false),
            AccountMeta::new_readonly(self.associated_token_program_id, false),
            AccountMeta::new_readonly(self.metadata_program_id, false),
        ];

        Instruction {
            program_id: self.program_id,
            accounts,
            data: instruction_discriminator("buy_nft").to_vec(),
        }
    }
}

fn instruction_discriminator(name: &str) -> [u8; 8] {
    let preimage = format!("global:{name}");
    let mut discriminator = [0u8; 8];
    discriminator.copy_from_slice(&hash(preimage.as_bytes()).to_bytes()[..8]);
    discriminator
}

impl DropReader for DropClient {
    fn contract_metadata(&self) -> Result<ContractMetadata, Error> {
        let address = self.metadata_address(&self.master_mint);
        let data = self
            .rpc
            .get_account_data(&address)
            .map_err(|e| Error::Rpc(format!("metadata {address}: {e}")))?;
        let metadata = Metadata::from_bytes(&data).map_err(|e| Error::Metadata(format!("{address}: {e}")))?;

        // On-chain strings are padded with NULs
        let name = metadata.name.trim_end_matches('\0');
        let uri = metadata.uri.trim_end_matches('\0');
        debug!(%uri, "fetching collection metadata");

        let response = self
            .http
            .get(uri)
            .send()
            .map_err(|e| Error::Metadata(format!("{uri}: {e}")))?;
        if !response.status().is_success() {
            return Err(Error::Metadata(format!("{uri}: status {}", response.status())));
        }
        let document: OffChainMetadata = response.json().map_err(|e| Error::Metadata(format!("{uri}: {e}")))?;

        Ok(document.into_contract_metadata(name))
    }

    fn claimed_supply(&self) -> Result<u64, Error> {
        Ok(self.master_edition()?.supply)
    }

    fn total_supply(&self) -> Result<u64, Error> {
        Ok(self.master_edition()?.max_supply.unwrap_or(u64::MAX))
    }

    fn active_claim_condition(&self) -> Result<Option<ClaimCondition>, Error> {
        let address = self.claim_condition_address();
        let account = self
            .rpc
            .get_account_with_commitment(&address, self.rpc.commitment())
            .map_err(|e| Error::Rpc(format!("claim condition {address}: {e}")))?
            .value;

        match account {
            None => Ok(None),
            Some(account) => ClaimCondition::from_account_data(&account.data)
                .map(Some)
                .ok_or_else(|| Error::Rpc(format!("claim condition {address}: account too short"))),
        }
    }
}

impl ClaimSubmitter for DropClient {
    fn claim_to(&self, payer: &Keypair, receiver: &Pubkey, quantity: u64) -> Result<ClaimReceipt, Error> {
        let buyer = payer.pubkey();
        if *receiver != buyer {
            return Err(Error::Claim(format!("receiver {receiver} must be the signing wallet {buyer}")));
        }

        let mut signatures = Vec::new();
        for minted in 0..quantity {
            let partial = |e: String| Error::Claim(format!("{e} ({minted} of {quantity} minted)"));

            // Supply moves with every confirmed edition, the marker follows it.
            let edition_supply = self.master_edition().map_err(|e| partial(e.to_string()))?.supply;
            let new_mint = Keypair::new();
            let instruction = self.buy_instruction(&buyer, &new_mint.pubkey(), edition_supply);

            let blockhash = self.rpc.get_latest_blockhash().map_err(|e| partial(e.to_string()))?;
            let transaction =
                Transaction::new_signed_with_payer(&[instruction], Some(&buyer), &[payer, &new_mint], blockhash);

            let signature = self
                .rpc
                .send_and_confirm_transaction(&transaction)
                .map_err(|e| partial(e.to_string()))?;
            info!(%signature, edition = edition_supply + 1, mint = %new_mint.pubkey(), "edition claimed");
            signatures.push(signature);
        }

        Ok(ClaimReceipt { quantity, signatures })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> DropClient {
        DropClient::new("http://127.0.0.1:8899", Pubkey::new_unique(), Pubkey::new_unique()).unwrap()
    }

    #[test]
    fn discriminator_matches_anchor_sighash() {
        let expected = &hash(b"global:buy_nft").to_bytes()[..8];
        assert_eq!(instruction_discriminator("buy_nft"), expected);
        assert_ne!(instruction_discriminator("buy_nft"), instruction_discriminator("create_nft"));
    }

    #[test]
    fn buy_instruction_signers_and_layout() {
        let client = client();
        let buyer = Pubkey::new_unique();
        let new_mint = Pubkey::new_unique();
        let ix = client.buy_instruction(&buyer, &new_mint, 0);

        assert_eq!(ix.program_id, client.program_id);
        assert_eq!(ix.accounts.len(), 15);
        assert_eq!(ix.data, instruction_discriminator("buy_nft").to_vec());

        let signers: Vec<Pubkey> = ix.accounts.iter().filter(|a| a.is_signer).map(|a| a.pubkey).collect();
        assert_eq!(signers, vec![buyer, new_mint]);
        assert_eq!(ix.accounts[1].pubkey, *client.master_mint());
        assert_eq!(ix.accounts[14].pubkey, client.metadata_program_id);
    }

    #[test]
    fn edition_marker_changes_every_marker_width() {
        let client = client();
        assert_eq!(client.edition_marker_address(0), client.edition_marker_address(EDITION_MARKER_BIT_SIZE - 1));
        assert_ne!(client.edition_marker_address(0), client.edition_marker_address(EDITION_MARKER_BIT_SIZE));
    }

    #[test]
    fn claim_to_another_receiver_is_refused() {
        let client = client();
        let payer = Keypair::new();
        let result = client.claim_to(&payer, &Pubkey::new_unique(), 1);
        assert!(matches!(result, Err(Error::Claim(msg)) if msg.contains("must be the signing wallet")));
    }

    #[test]
    fn zero_quantity_claims_nothing() {
        let client = client();
        let payer = Keypair::new();
        let receipt = client.claim_to(&payer, &payer.pubkey(), 0).unwrap();
        assert!(receipt.signatures.is_empty());
    }
}

//! The claim form: quantity, total price and the claim action.

use std::collections::VecDeque;
use std::sync::Arc;
use std::thread;
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::{info, warn};

use crate::drop_client::ClaimSubmitter;
use crate::dto::{ClaimCondition, ClaimReceipt, SupplyCounters};
use crate::error::{ClaimBlocked, Error, QuantityError};
use crate::price;
use crate::quantity::Quantity;
use crate::wallet::WalletSession;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimState {
    Idle,
    Submitting,
    Confirmed,
    Errored,
}

/// User facing notification produced by a settled claim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Claimed(ClaimReceipt),
    /// Blocking alert carrying the raw error.
    Alert(String),
}

pub struct ClaimView<S: ClaimSubmitter> {
    submitter: Arc<S>,
    decimals: u32,
    quantity: Quantity,
    state: ClaimState,
    outcome_tx: flume::Sender<Result<ClaimReceipt, Error>>,
    outcome_rx: flume::Receiver<Result<ClaimReceipt, Error>>,
    notices: VecDeque<Notice>,
}

impl<S: ClaimSubmitter> ClaimView<S> {
    pub fn new(submitter: Arc<S>, decimals: u32) -> Self {
        let (outcome_tx, outcome_rx) = flume::unbounded();
        Self {
            submitter,
            decimals,
            quantity: Quantity::default(),
            state: ClaimState::Idle,
            outcome_tx,
            outcome_rx,
            notices: VecDeque::new(),
        }
    }

    pub fn quantity(&self) -> u64 {
        self.quantity.get()
    }

    pub fn increment(&mut self) {
        self.quantity.increment();
    }

    pub fn decrement(&mut self) {
        self.quantity.decrement();
    }

    pub fn set_quantity_input(&mut self, input: &str) -> Result<u64, QuantityError> {
        self.quantity.set_from_input(input)
    }

    pub fn state(&self) -> ClaimState {
        self.state
    }

    pub fn is_submitting(&self) -> bool {
        self.state == ClaimState::Submitting
    }

    /// Price of the current quantity, `condition` is `None` until it loads.
    pub fn total_price(&self, condition: Option<&ClaimCondition>) -> String {
        price::total_price(self.quantity.get(), condition, self.decimals)
    }

    /// First reason the claim control must stay disabled, if any.
    pub fn claim_blocker(
        &self,
        wallet: &WalletSession,
        supply: Option<SupplyCounters>,
        condition: Option<&ClaimCondition>,
    ) -> Option<ClaimBlocked> {
        if !wallet.is_connected() {
            return Some(ClaimBlocked::NoWallet);
        }
        if self.is_submitting() {
            return Some(ClaimBlocked::Submitting);
        }
        if let Some(condition) = condition {
            if condition.start_timestamp > unix_now() {
                return Some(ClaimBlocked::NotStarted {
                    starts_at: condition.start_timestamp,
                });
            }
        }
        let Some(supply) = supply else {
            return Some(ClaimBlocked::SupplyLoading);
        };

        let requested = self.quantity.get();
        let remaining = supply.remaining();
        if remaining == 0 {
            return Some(ClaimBlocked::SoldOut);
        }
        if requested > remaining {
            return Some(ClaimBlocked::ExceedsRemaining { requested, remaining });
        }
        if let Some(limit) = condition.and_then(ClaimCondition::per_claim_limit) {
            if requested > limit {
                return Some(ClaimBlocked::ExceedsPerClaimLimit { requested, limit });
            }
        }
        None
    }

    /// Submits the claim on a background thread. The outcome arrives through `poll`.
    pub fn claim(
        &mut self,
        wallet: &WalletSession,
        supply: Option<SupplyCounters>,
        condition: Option<&ClaimCondition>,
    ) -> Result<(), ClaimBlocked> {
        if let Some(blocked) = self.claim_blocker(wallet, supply, condition) {
            return Err(blocked);
        }
        let (Some(signer), Some(receiver)) = (wallet.signer(), wallet.account()) else {
            return Err(ClaimBlocked::NoWallet);
        };

        let quantity = self.quantity.get();
        info!(%receiver, quantity, "submitting claim");
        self.state = ClaimState::Submitting;

        let submitter = Arc::clone(&self.submitter);
        let outcome_tx = self.outcome_tx.clone();
        thread::spawn(move || {
            let outcome = submitter.claim_to(&signer, &receiver, quantity);
            // receiver is gone only when the view was dropped
            let _ = outcome_tx.send(outcome);
        });
        Ok(())
    }

    /// Applies a settled claim, if one arrived since the last call.
    pub fn poll(&mut self) -> Option<ClaimState> {
        let outcome = self.outcome_rx.try_recv().ok()?;
        match outcome {
            Ok(receipt) => {
                info!(quantity = receipt.quantity, "claim confirmed");
                self.quantity.reset();
                self.state = ClaimState::Confirmed;
                self.notices.push_back(Notice::Claimed(receipt));
            }
            Err(e) => {
                warn!(error = %e, "claim failed");
                self.state = ClaimState::Errored;
                self.notices.push_back(Notice::Alert(e.to_string()));
            }
        }
        Some(self.state)
    }

    /// Hands the next notice to the presentation. The view is idle again once
    /// every notice of a settled claim has been taken.
    pub fn next_notice(&mut self) -> Option<Notice> {
        let notice = self.notices.pop_front();
        if self.notices.is_empty() && !self.is_submitting() {
            self.state = ClaimState::Idle;
        }
        notice
    }
}

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default()
}

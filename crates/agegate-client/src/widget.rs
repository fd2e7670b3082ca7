use chrono::{DateTime, TimeZone, Utc};
use std::time::Duration;
use tokio::time::Instant;

use agegate_core::{
    Address, AgeTier, VerificationDetails, WidgetEvent, WidgetState, WidgetStateMachine,
};

use crate::challenge::{ChallengeSettings, ProofChallenge};
use crate::error::ClientError;
use crate::reader::RegistryReader;

const DEFAULT_PROOF_ERROR: &str = "Verification failed. Please try again.";
const CHECK_FAILED_MESSAGE: &str = "Failed to check verification status";

/// How long to keep polling the registry after the proof flow reports success.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettlePolicy {
    /// Wait before the first poll.
    pub initial_delay: Duration,
    /// Cap for the doubling delay between polls.
    pub max_delay: Duration,
    /// Give up once this much time has passed since the success signal.
    pub max_wait: Duration,
}

impl Default for SettlePolicy {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(4),
            max_wait: Duration::from_secs(30),
        }
    }
}

/// Static settings of one widget instance.
#[derive(Debug, Clone)]
pub struct WidgetConfig {
    pub site_name: String,
    pub tier: AgeTier,
    pub challenge: ChallengeSettings,
    pub settle: SettlePolicy,
}

/// Identifies one issued registry query.
///
/// Only the ticket from the most recent `begin_check` is honoured; results
/// for older tickets are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckTicket {
    generation: u64,
    address: Address,
}

impl CheckTicket {
    pub fn address(&self) -> &Address {
        &self.address
    }
}

/// Drives one relying site's age gate for the connected wallet.
pub struct AgeGateWidget<R> {
    reader: R,
    config: WidgetConfig,
    state: WidgetState,
    wallet: Option<Address>,
    generation: u64,
    verified_at: Option<DateTime<Utc>>,
    message: Option<String>,
    last_error: Option<ClientError>,
}

impl<R: RegistryReader> AgeGateWidget<R> {
    pub fn new(reader: R, config: WidgetConfig) -> Self {
        Self {
            reader,
            config,
            state: WidgetState::Loading,
            wallet: None,
            generation: 0,
            verified_at: None,
            message: None,
            last_error: None,
        }
    }

    pub fn state(&self) -> WidgetState {
        self.state
    }

    pub fn wallet(&self) -> Option<&Address> {
        self.wallet.as_ref()
    }

    pub fn tier(&self) -> AgeTier {
        self.config.tier
    }

    /// When the registry recorded the verification; display only.
    pub fn verified_at(&self) -> Option<DateTime<Utc>> {
        self.verified_at
    }

    /// User-facing message for the current state, if any.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn last_error(&self) -> Option<&ClientError> {
        self.last_error.as_ref()
    }

    /// Start (or restart) the flow for a page load or wallet change.
    pub async fn load(&mut self, wallet: Option<Address>) -> WidgetState {
        self.wallet = wallet;
        match wallet {
            None => {
                self.generation += 1;
                self.verified_at = None;
                self.apply(WidgetEvent::WalletMissing);
                self.state
            }
            Some(_) => self.check().await,
        }
    }

    /// Query the registry for the connected wallet and settle on the answer.
    pub async fn check(&mut self) -> WidgetState {
        let ticket = match self.begin_check() {
            Ok(ticket) => ticket,
            Err(_) => return self.state,
        };
        let result = self.reader.verification_details(&ticket.address).await;
        self.complete_check(ticket, result);
        self.state
    }

    /// Enter `CheckingRegistry` and issue a ticket for a new query.
    ///
    /// Any query still outstanding is superseded.
    pub fn begin_check(&mut self) -> Result<CheckTicket, ClientError> {
        let address = self.wallet.ok_or(ClientError::NotConnected)?;
        if self.state != WidgetState::CheckingRegistry {
            self.apply(WidgetEvent::WalletConnected);
        }
        self.generation += 1;
        self.message = None;
        tracing::debug!(address = %address, generation = self.generation, "registry check issued");
        Ok(CheckTicket {
            generation: self.generation,
            address,
        })
    }

    /// Feed the result of a query back in. Returns `false` if the ticket was stale.
    pub fn complete_check(
        &mut self,
        ticket: CheckTicket,
        result: Result<VerificationDetails, ClientError>,
    ) -> bool {
        if ticket.generation != self.generation
            || self.wallet != Some(ticket.address)
            || self.state != WidgetState::CheckingRegistry
        {
            tracing::debug!(
                generation = ticket.generation,
                current = self.generation,
                "ignoring stale registry response"
            );
            return false;
        }

        match result {
            Ok(details) if details.meets(self.config.tier.years()) => {
                self.verified_at = i64::try_from(details.timestamp)
                    .ok()
                    .and_then(|t| Utc.timestamp_opt(t, 0).single());
                self.message = None;
                self.last_error = None;
                self.apply(WidgetEvent::QueryVerified);
            }
            Ok(_) => {
                self.verified_at = None;
                self.last_error = None;
                self.apply(WidgetEvent::QueryUnverified);
            }
            Err(e) => {
                tracing::warn!(address = %ticket.address, error = %e, "registry check failed");
                self.verified_at = None;
                self.message = Some(CHECK_FAILED_MESSAGE.into());
                self.last_error = Some(e);
                self.apply(WidgetEvent::QueryFailed);
            }
        }
        true
    }

    /// Retry after `CheckFailed`.
    pub async fn retry(&mut self) -> Result<WidgetState, ClientError> {
        self.transition(WidgetEvent::Retry)?;
        Ok(self.check().await)
    }

    /// The challenge to present while the address still needs a proof.
    pub fn challenge(&self) -> Option<ProofChallenge> {
        if !self.state.shows_challenge() {
            return None;
        }
        let requester = self.wallet.as_ref()?;
        Some(ProofChallenge::build(
            &self.config.challenge,
            &self.config.site_name,
            self.config.tier,
            requester,
        ))
    }

    /// The external proof flow failed. The same challenge stays valid.
    pub fn on_proof_error(
        &mut self,
        code: Option<String>,
        reason: Option<String>,
    ) -> Result<(), ClientError> {
        self.transition(WidgetEvent::ProofFailed)?;
        let reason = reason.unwrap_or_else(|| DEFAULT_PROOF_ERROR.into());
        tracing::info!(code = ?code, reason = %reason, "proof flow reported an error");
        self.message = Some(reason.clone());
        self.last_error = Some(ClientError::ExternalProofFailed { code, reason });
        Ok(())
    }

    /// The external proof flow succeeded; wait for the registry to show it.
    ///
    /// Polls with a doubling delay until the address meets the tier or the
    /// settle window closes. Unverified answers and query errors inside the
    /// window are treated as "not visible yet".
    pub async fn on_proof_success(&mut self) -> Result<WidgetState, ClientError> {
        self.transition(WidgetEvent::ProofSucceeded)?;
        self.message = None;

        let settle = self.config.settle;
        let started = Instant::now();
        let mut delay = settle.initial_delay;

        loop {
            tokio::time::sleep(delay).await;

            let ticket = self.begin_check()?;
            let result = self.reader.verification_details(&ticket.address).await;
            match result {
                Ok(details) if details.meets(self.config.tier.years()) => {
                    self.complete_check(ticket, Ok(details));
                    return Ok(self.state);
                }
                Ok(_) => {
                    tracing::debug!(address = %ticket.address, "verification not visible yet");
                }
                Err(e) => {
                    tracing::debug!(address = %ticket.address, error = %e, "settle poll failed");
                }
            }

            let elapsed = started.elapsed();
            if elapsed >= settle.max_wait {
                tracing::warn!(address = %ticket.address, waited = ?elapsed, "verification never became visible");
                self.complete_check(ticket, Err(ClientError::WriteNotVisible { waited: elapsed }));
                return Ok(self.state);
            }

            delay = (delay * 2)
                .min(settle.max_delay)
                .min(settle.max_wait.saturating_sub(elapsed));
        }
    }

    fn transition(&mut self, event: WidgetEvent) -> Result<(), ClientError> {
        self.state = WidgetStateMachine::transition(self.state, event)?;
        Ok(())
    }

    /// Apply an event the widget only issues from states where it is valid.
    fn apply(&mut self, event: WidgetEvent) {
        if let Err(e) = self.transition(event) {
            tracing::error!(error = %e, "unexpected widget transition");
        }
    }
}

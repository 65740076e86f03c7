//! Transaction orchestration.
//!
//! A mint runs `Submitting -> AwaitingConfirmation -> SettingRecord ->
//! AwaitingRecordConfirmation -> Done`; a record update enters at
//! `SettingRecord`. `Failed` is reachable from every in-flight phase. Only
//! one attempt may be in flight: [`Orchestrator::begin`] refuses while busy,
//! and the returned [`InFlight`] marks the attempt `Failed` if it is dropped
//! without settling, so an error path can never leave the busy flag set.

use std::cell::Cell;
use tracing::{debug, info, warn};
use xns_chain_client::NameContract;
use xns_types::{MintRequest, Receipt, WalletAddress, Wei};

use crate::config::ClientConfig;
use crate::error::{ControllerError, TxStage};
use crate::events::{ControllerEvent, EventHub};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TxPhase {
    #[default]
    Idle,
    Submitting,
    AwaitingConfirmation,
    SettingRecord,
    AwaitingRecordConfirmation,
    Done,
    Failed,
}

impl TxPhase {
    pub fn is_in_flight(self) -> bool {
        matches!(
            self,
            TxPhase::Submitting
                | TxPhase::AwaitingConfirmation
                | TxPhase::SettingRecord
                | TxPhase::AwaitingRecordConfirmation
        )
    }
}

#[derive(Debug, Default)]
pub struct Orchestrator {
    phase: Cell<TxPhase>,
    /// Bumped on every network change; attempts started under an older
    /// generation discard their results.
    generation: Cell<u64>,
}

impl Orchestrator {
    pub fn phase(&self) -> TxPhase {
        self.phase.get()
    }

    pub fn is_busy(&self) -> bool {
        self.phase.get().is_in_flight()
    }

    pub fn generation(&self) -> u64 {
        self.generation.get()
    }

    pub(crate) fn begin<'a>(
        &'a self,
        events: &'a EventHub,
        first: TxPhase,
    ) -> Result<InFlight<'a>, ControllerError> {
        if self.is_busy() {
            debug!("ignoring submission while {:?}", self.phase.get());
            return Err(ControllerError::Busy);
        }
        let flight = InFlight {
            orchestrator: self,
            events,
            generation: self.generation.get(),
            settled: false,
        };
        flight.set(first);
        Ok(flight)
    }

    /// Abandons whatever is in flight and returns to `Idle`.
    pub(crate) fn invalidate(&self, events: &EventHub) {
        self.generation.set(self.generation.get() + 1);
        self.phase.set(TxPhase::Idle);
        events.emit(ControllerEvent::PhaseChanged(TxPhase::Idle));
    }
}

pub(crate) struct InFlight<'a> {
    orchestrator: &'a Orchestrator,
    events: &'a EventHub,
    generation: u64,
    settled: bool,
}

impl InFlight<'_> {
    fn is_current(&self) -> bool {
        self.orchestrator.generation.get() == self.generation
    }

    fn set(&self, phase: TxPhase) {
        debug!("transaction phase {:?}", phase);
        self.orchestrator.phase.set(phase);
        self.events.emit(ControllerEvent::PhaseChanged(phase));
    }

    pub(crate) fn check(&self) -> Result<(), ControllerError> {
        if self.is_current() {
            Ok(())
        } else {
            Err(ControllerError::Invalidated)
        }
    }

    pub(crate) fn advance(&self, phase: TxPhase) -> Result<(), ControllerError> {
        self.check()?;
        self.set(phase);
        Ok(())
    }

    pub(crate) fn finish(mut self) {
        self.settled = true;
        if self.is_current() {
            self.set(TxPhase::Done);
        }
    }

    pub(crate) fn fail(mut self) {
        self.settled = true;
        if self.is_current() {
            self.set(TxPhase::Failed);
        }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.settled && self.is_current() {
            self.set(TxPhase::Failed);
        }
    }
}

/// Registers `request.domain` and, only if that receipt succeeds, sets its
/// record. Returns the still-open attempt so the caller settles it.
pub(crate) async fn run_mint<'a, C: NameContract>(
    flight: InFlight<'a>,
    contract: &C,
    config: &ClientConfig,
    from: &WalletAddress,
    request: &MintRequest,
    price: Wei,
) -> Result<(InFlight<'a>, Receipt), ControllerError> {
    info!(
        "minting {} with price {}",
        request.domain,
        price.ether_label()
    );
    let tx = contract.register(from, &request.domain, price).await?;
    flight.advance(TxPhase::AwaitingConfirmation)?;

    let receipt = contract.wait_for_confirmation(&tx).await?;
    flight.check()?;
    if !receipt.succeeded() {
        warn!("registration of {} reverted in {}", request.domain, tx.hash);
        flight.fail();
        return Err(ControllerError::ChainRejected {
            stage: TxStage::Registration,
            tx_hash: tx.hash,
        });
    }
    info!("domain minted! {}", link(config, &tx.hash));

    flight.advance(TxPhase::SettingRecord)?;
    set_record(flight, contract, config, from, &request.domain, &request.record).await
}

/// Sets the record of an existing domain.
pub(crate) async fn run_update<'a, C: NameContract>(
    flight: InFlight<'a>,
    contract: &C,
    config: &ClientConfig,
    from: &WalletAddress,
    domain: &str,
    record: &str,
) -> Result<(InFlight<'a>, Receipt), ControllerError> {
    info!("updating record of {domain}");
    set_record(flight, contract, config, from, domain, record).await
}

async fn set_record<'a, C: NameContract>(
    flight: InFlight<'a>,
    contract: &C,
    config: &ClientConfig,
    from: &WalletAddress,
    domain: &str,
    record: &str,
) -> Result<(InFlight<'a>, Receipt), ControllerError> {
    let tx = contract.set_record(from, domain, record).await?;
    flight.advance(TxPhase::AwaitingRecordConfirmation)?;

    let receipt = contract.wait_for_confirmation(&tx).await?;
    flight.check()?;
    if !receipt.succeeded() {
        warn!("record update of {domain} reverted in {}", tx.hash);
        flight.fail();
        return Err(ControllerError::ChainRejected {
            stage: TxStage::Record,
            tx_hash: tx.hash,
        });
    }
    info!("record set! {}", link(config, &tx.hash));
    Ok((flight, receipt))
}

fn link(config: &ClientConfig, tx_hash: &str) -> String {
    config
        .explorer_tx_url(tx_hash)
        .unwrap_or_else(|| tx_hash.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn phases(events: &mut futures::channel::mpsc::UnboundedReceiver<ControllerEvent>) -> Vec<TxPhase> {
        crate::testing::drain(events)
            .into_iter()
            .filter_map(|event| match event {
                ControllerEvent::PhaseChanged(phase) => Some(phase),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn begin_refuses_while_in_flight() {
        let orchestrator = Orchestrator::default();
        let events = EventHub::default();

        let flight = orchestrator.begin(&events, TxPhase::Submitting).unwrap();
        assert!(orchestrator.is_busy());
        assert!(matches!(
            orchestrator.begin(&events, TxPhase::SettingRecord),
            Err(ControllerError::Busy)
        ));

        flight.finish();
        assert_eq!(orchestrator.phase(), TxPhase::Done);
        assert!(!orchestrator.is_busy());
    }

    #[test]
    fn dropped_attempt_fails_and_clears_busy() {
        let orchestrator = Orchestrator::default();
        let events = EventHub::default();
        let mut rx = events.subscribe();

        {
            let flight = orchestrator.begin(&events, TxPhase::Submitting).unwrap();
            flight.advance(TxPhase::AwaitingConfirmation).unwrap();
        }

        assert_eq!(orchestrator.phase(), TxPhase::Failed);
        assert_eq!(
            phases(&mut rx),
            vec![
                TxPhase::Submitting,
                TxPhase::AwaitingConfirmation,
                TxPhase::Failed
            ]
        );
    }

    #[test]
    fn invalidated_attempt_cannot_advance_or_touch_phase() {
        let orchestrator = Orchestrator::default();
        let events = EventHub::default();

        let flight = orchestrator.begin(&events, TxPhase::Submitting).unwrap();
        orchestrator.invalidate(&events);

        assert_eq!(
            flight.advance(TxPhase::AwaitingConfirmation),
            Err(ControllerError::Invalidated)
        );
        drop(flight);
        assert_eq!(orchestrator.phase(), TxPhase::Idle);
        assert!(orchestrator.begin(&events, TxPhase::Submitting).is_ok());
    }
}

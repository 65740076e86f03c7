use futures::StreamExt;
use futures::channel::mpsc::UnboundedReceiver;
use std::cell::{Cell, RefCell};
use tracing::{debug, info, warn};
use xns_chain_client::{ChainChanges, NameContract, NetworkRegistry, WalletProvider};
use xns_types::{ChainId, DomainRecord, MintRequest, Receipt, WalletAddress};

use crate::config::ClientConfig;
use crate::edit::{EditMode, EditState, FormState};
use crate::error::{ControllerError, TxStage};
use crate::events::{ControllerEvent, EventHub, Notice};
use crate::orchestrator::{self, Orchestrator, TxPhase};
use crate::registry_view::{self, RegistrySnapshot};
use crate::session::{self, Session};
use crate::{guard, pricing};

/// Owns the session, the registry snapshot, the edit form and the busy flag
/// for the lifetime of the page. All methods take `&self` so the UI can hold
/// the controller in an `Rc` and call it from several event handlers; no
/// `RefCell` borrow is held across an `.await`.
pub struct Controller<W, C> {
    config: ClientConfig,
    networks: NetworkRegistry,
    wallet: Option<W>,
    contract: Option<C>,
    session: RefCell<Session>,
    snapshot: RefCell<RegistrySnapshot>,
    edit: RefCell<EditState>,
    orchestrator: Orchestrator,
    refresh_scheduled: Cell<bool>,
    events: EventHub,
}

impl<W, C> Controller<W, C>
where
    W: WalletProvider,
    C: NameContract,
{
    /// `wallet` and `contract` are `None` when no wallet provider is injected.
    pub fn new(
        config: ClientConfig,
        networks: NetworkRegistry,
        wallet: Option<W>,
        contract: Option<C>,
    ) -> Self {
        let required = &config.required_chain.chain_id;
        if networks.required().map(|network| &network.chain_id) != Some(required) {
            warn!(
                "{} is not the registry's mutation network, mint and edit stay disabled",
                required
            );
        }
        Self {
            config,
            networks,
            wallet,
            contract,
            session: RefCell::new(Session::default()),
            snapshot: RefCell::new(RegistrySnapshot::default()),
            edit: RefCell::new(EditState::default()),
            orchestrator: Orchestrator::default(),
            refresh_scheduled: Cell::new(false),
            events: EventHub::default(),
        }
    }

    pub fn subscribe(&self) -> UnboundedReceiver<ControllerEvent> {
        self.events.subscribe()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn wallet(&self) -> Option<&W> {
        self.wallet.as_ref()
    }

    pub fn contract(&self) -> Option<&C> {
        self.contract.as_ref()
    }

    pub fn has_provider(&self) -> bool {
        self.wallet.is_some()
    }

    pub fn session(&self) -> Session {
        self.session.borrow().clone()
    }

    pub fn snapshot(&self) -> RegistrySnapshot {
        self.snapshot.borrow().clone()
    }

    pub fn phase(&self) -> TxPhase {
        self.orchestrator.phase()
    }

    pub fn is_busy(&self) -> bool {
        self.orchestrator.is_busy()
    }

    pub fn edit_mode(&self) -> EditMode {
        self.edit.borrow().mode()
    }

    pub fn form(&self) -> FormState {
        self.edit.borrow().form().clone()
    }

    pub fn set_domain_input(&self, domain: &str) {
        self.edit.borrow_mut().set_domain(domain);
    }

    pub fn set_record_input(&self, record: &str) {
        self.edit.borrow_mut().set_record(record);
    }

    pub fn is_on_required_network(&self) -> bool {
        guard::is_on_required_network(&self.session.borrow(), &self.config.required_chain.chain_id)
    }

    /// Whether mint and edit may be offered at all.
    pub fn mutations_allowed(&self) -> bool {
        self.session.borrow().is_connected() && self.is_on_required_network()
    }

    /// Edit affordance: only the owner of a name may change its record.
    pub fn can_edit(&self, record: &DomainRecord) -> bool {
        match &self.session.borrow().account {
            Some(account) => record.is_owned_by(account),
            None => false,
        }
    }

    /// Price of the domain currently typed into the form.
    pub fn price_label(&self) -> Option<String> {
        pricing::price_label(
            &self.edit.borrow().form().domain,
            &self.config.required_chain.native_currency.symbol,
        )
    }

    fn notify(&self, notice: Notice) {
        self.events.emit(ControllerEvent::Notice(notice));
    }

    fn require_wallet(&self) -> Result<&W, ControllerError> {
        self.wallet.as_ref().ok_or_else(|| {
            self.notify(Notice::ProviderAbsent);
            ControllerError::ProviderAbsent
        })
    }

    fn require_contract(&self) -> Result<&C, ControllerError> {
        self.contract.as_ref().ok_or_else(|| {
            self.notify(Notice::ProviderAbsent);
            ControllerError::ProviderAbsent
        })
    }

    fn ensure_generation(&self, generation: u64) -> Result<(), ControllerError> {
        if self.orchestrator.generation() == generation {
            Ok(())
        } else {
            Err(ControllerError::Invalidated)
        }
    }

    fn update_session(&self, update: impl FnOnce(&mut Session)) {
        update(&mut self.session.borrow_mut());
        self.events.emit(ControllerEvent::SessionChanged);
    }

    /// Startup sequence: silent account probe, network resolution and, when
    /// an account is present, the initial registry fetch.
    pub async fn load(&self) -> Result<(), ControllerError> {
        self.probe_existing_session().await?;
        self.resolve_network().await?;
        if self.session.borrow().is_connected() {
            self.refresh().await?;
        }
        Ok(())
    }

    /// Prompts the wallet for account access. A rejection leaves the session
    /// untouched.
    pub async fn connect(&self) -> Result<WalletAddress, ControllerError> {
        let wallet = self.require_wallet()?;
        let generation = self.orchestrator.generation();
        let account = session::request_authorization(wallet).await?;
        self.ensure_generation(generation)?;

        self.update_session(|session| session.account = Some(account.clone()));
        self.resolve_network().await?;
        if let Err(err) = self.refresh().await {
            warn!("initial registry fetch failed: {err}");
        }
        Ok(account)
    }

    pub async fn probe_existing_session(&self) -> Result<Option<WalletAddress>, ControllerError> {
        let wallet = self.require_wallet()?;
        let generation = self.orchestrator.generation();
        let account = session::probe_existing(wallet).await?;
        self.ensure_generation(generation)?;

        if account.is_some() {
            self.update_session(|session| session.account = account.clone());
        }
        Ok(account)
    }

    pub async fn resolve_network(&self) -> Result<(), ControllerError> {
        let wallet = self.require_wallet()?;
        let generation = self.orchestrator.generation();
        let network = session::resolve_network(wallet, &self.networks).await?;
        self.ensure_generation(generation)?;

        info!("active network: {}", network.label());
        self.update_session(|session| session.network = Some(network));
        Ok(())
    }

    /// Subscribes to wallet chain-change notifications. Call once at startup.
    pub fn on_network_changed(&self) -> Result<ChainChanges, ControllerError> {
        session::subscribe_network_changes(self.require_wallet()?)
    }

    /// Drives [`Controller::handle_network_changed`] for every notification
    /// until the wallet stops delivering them.
    pub async fn watch_network_changes(&self) -> Result<(), ControllerError> {
        let mut changes = self.on_network_changed()?;
        while let Some(chain_id) = changes.next().await {
            if let Err(err) = self.handle_network_changed(chain_id).await {
                warn!("reload after network change failed: {err}");
            }
        }
        debug!("chain change notifications closed");
        Ok(())
    }

    /// Treats all page state as stale: abandons whatever is in flight,
    /// empties session, snapshot and form, then re-runs [`Controller::load`].
    pub async fn handle_network_changed(&self, chain_id: ChainId) -> Result<(), ControllerError> {
        info!("network changed to {chain_id}, reloading");
        self.orchestrator.invalidate(&self.events);
        self.refresh_scheduled.set(false);
        *self.snapshot.borrow_mut() = RegistrySnapshot::default();
        self.edit.borrow_mut().cancel();
        self.update_session(|session| *session = Session::default());
        self.events.emit(ControllerEvent::SnapshotReplaced);
        self.events.emit(ControllerEvent::EditModeChanged);

        self.load().await
    }

    /// Asks the wallet to move to the required chain, adding it if needed.
    pub async fn switch_network(&self) -> Result<(), ControllerError> {
        let wallet = self.require_wallet()?;
        if let Err(err) = guard::request_network_switch(wallet, &self.config.required_chain).await {
            warn!("network switch failed: {err}");
            self.notify(Notice::SwitchFailed(err.to_string()));
            return Err(err);
        }
        self.resolve_network().await
    }

    fn guard_mutation(&self) -> Result<(&C, WalletAddress), ControllerError> {
        let contract = self.require_contract()?;
        let account = self
            .session
            .borrow()
            .account
            .clone()
            .ok_or(ControllerError::NotConnected)?;
        if !self.is_on_required_network() {
            return Err(ControllerError::WrongNetwork);
        }
        Ok((contract, account))
    }

    /// Registers a new domain and sets its record.
    pub async fn mint(&self, request: MintRequest) -> Result<Receipt, ControllerError> {
        let price = pricing::validate(&request).map_err(|err| {
            self.notify(Notice::Validation(err.clone()));
            ControllerError::from(err)
        })?;
        let (contract, from) = self.guard_mutation()?;
        let flight = self.orchestrator.begin(&self.events, TxPhase::Submitting)?;

        match orchestrator::run_mint(flight, contract, &self.config, &from, &request, price).await {
            Ok((flight, receipt)) => {
                flight.finish();
                self.edit.borrow_mut().clear_fields();
                self.events.emit(ControllerEvent::EditModeChanged);
                self.schedule_refresh();
                Ok(receipt)
            }
            Err(err) => {
                self.report_failure(&err);
                Err(err)
            }
        }
    }

    /// Sets the record of an existing domain. Empty input is ignored and
    /// yields `Ok(None)`.
    pub async fn update_record(
        &self,
        domain: &str,
        record: &str,
    ) -> Result<Option<Receipt>, ControllerError> {
        if domain.is_empty() || record.is_empty() {
            debug!("ignoring record update with empty input");
            return Ok(None);
        }
        let (contract, from) = self.guard_mutation()?;
        let flight = self.orchestrator.begin(&self.events, TxPhase::SettingRecord)?;

        match orchestrator::run_update(flight, contract, &self.config, &from, domain, record).await {
            Ok((flight, receipt)) => {
                if let Err(err) = self.refresh().await {
                    warn!("refresh after record update failed: {err}");
                }
                flight.check()?;
                flight.finish();
                self.edit.borrow_mut().cancel();
                self.events.emit(ControllerEvent::EditModeChanged);
                Ok(Some(receipt))
            }
            Err(err) => {
                self.report_failure(&err);
                Err(err)
            }
        }
    }

    /// Mint or update, depending on edit mode, using the form fields.
    pub async fn submit(&self) -> Result<Option<Receipt>, ControllerError> {
        let (mode, form) = {
            let edit = self.edit.borrow();
            (edit.mode(), edit.form().clone())
        };
        match mode {
            EditMode::Editing => self.update_record(&form.domain, &form.record).await,
            EditMode::Minting => self
                .mint(MintRequest {
                    domain: form.domain,
                    record: form.record,
                })
                .await
                .map(Some),
        }
    }

    fn report_failure(&self, err: &ControllerError) {
        match err {
            ControllerError::Invalidated => {
                debug!("discarding result of a transaction from a previous network");
            }
            ControllerError::ChainRejected { stage, tx_hash } => {
                warn!("{stage} transaction {tx_hash} failed");
                self.notify(Notice::TransactionFailed);
                // The name exists even though its record does not.
                if *stage == TxStage::Record {
                    self.schedule_refresh();
                }
            }
            ControllerError::AuthorizationDenied => {
                warn!("transaction was rejected in the wallet");
            }
            other => {
                warn!("transaction failed: {other}");
                self.notify(Notice::Error(other.to_string()));
            }
        }
    }

    fn schedule_refresh(&self) {
        self.refresh_scheduled.set(true);
        self.events
            .emit(ControllerEvent::RefreshScheduled(self.config.refresh_delay()));
    }

    /// Runs a refresh requested by a finished mint. Returns whether one was
    /// pending.
    pub async fn run_scheduled_refresh(&self) -> Result<bool, ControllerError> {
        if !self.refresh_scheduled.replace(false) {
            return Ok(false);
        }
        self.refresh().await?;
        Ok(true)
    }

    /// Re-fetches the registry. The previous snapshot survives any failure.
    pub async fn refresh(&self) -> Result<(), ControllerError> {
        let contract = self.require_contract()?;
        let generation = self.orchestrator.generation();

        let snapshot = registry_view::fetch_all(contract).await.map_err(|err| {
            warn!("registry fetch failed, keeping previous snapshot: {err}");
            ControllerError::from(err)
        })?;
        self.ensure_generation(generation)?;

        debug!("registry snapshot with {} names", snapshot.len());
        *self.snapshot.borrow_mut() = snapshot;
        self.events.emit(ControllerEvent::SnapshotReplaced);
        Ok(())
    }

    /// Enters edit mode for `name`. Refused while a mutation is in flight or
    /// off the required network.
    pub fn begin_edit(&self, name: &str) -> Result<(), ControllerError> {
        if self.is_busy() {
            return Err(ControllerError::Busy);
        }
        if !self.mutations_allowed() {
            return Err(ControllerError::WrongNetwork);
        }
        self.edit.borrow_mut().begin(name);
        self.events.emit(ControllerEvent::EditModeChanged);
        Ok(())
    }

    pub fn cancel_edit(&self) {
        self.edit.borrow_mut().cancel();
        self.events.emit(ControllerEvent::EditModeChanged);
    }
}

//! In-memory wallet and contract used by the unit tests.

use async_trait::async_trait;
use futures::channel::mpsc::{self, UnboundedReceiver, UnboundedSender};
use futures::channel::oneshot;
use futures::{FutureExt, StreamExt};
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use xns_chain_client::{
    ChainChanges, NameContract, ProviderError, ProviderResult, WalletProvider,
};
use xns_types::{AddChainParams, ChainId, Receipt, ReceiptStatus, TxHandle, WalletAddress, Wei};

pub(crate) fn account(n: u8) -> WalletAddress {
    WalletAddress(format!("0x{}{:02x}", "ab".repeat(19), n))
}

pub(crate) fn drain<T>(rx: &mut UnboundedReceiver<T>) -> Vec<T> {
    let mut out = Vec::new();
    while let Some(Some(item)) = rx.next().now_or_never() {
        out.push(item);
    }
    out
}

pub(crate) struct MockWallet {
    chain: RefCell<ChainId>,
    authorized: RefCell<Vec<WalletAddress>>,
    on_request: RefCell<ProviderResult<Vec<WalletAddress>>>,
    switch_script: RefCell<VecDeque<ProviderResult<()>>>,
    added: RefCell<Vec<AddChainParams>>,
    calls: RefCell<Vec<String>>,
    changes_tx: UnboundedSender<ChainId>,
    changes_rx: RefCell<Option<ChainChanges>>,
}

impl MockWallet {
    pub(crate) fn on_chain(chain: &str) -> Self {
        let (changes_tx, changes_rx) = mpsc::unbounded();
        Self {
            chain: RefCell::new(ChainId::new(chain)),
            authorized: RefCell::new(Vec::new()),
            on_request: RefCell::new(Ok(Vec::new())),
            switch_script: RefCell::new(VecDeque::new()),
            added: RefCell::new(Vec::new()),
            calls: RefCell::new(Vec::new()),
            changes_tx,
            changes_rx: RefCell::new(Some(changes_rx)),
        }
    }

    /// Marks `account` as granted in an earlier visit.
    pub(crate) fn authorize(&self, account: WalletAddress) {
        self.authorized.borrow_mut().push(account);
    }

    pub(crate) fn grant_on_request(&self, accounts: Vec<WalletAddress>) {
        *self.on_request.borrow_mut() = Ok(accounts);
    }

    pub(crate) fn reject_requests(&self, err: ProviderError) {
        *self.on_request.borrow_mut() = Err(err);
    }

    /// Queues the outcome of the next `switch_chain`; unscripted switches succeed.
    pub(crate) fn script_switch(&self, outcome: ProviderResult<()>) {
        self.switch_script.borrow_mut().push_back(outcome);
    }

    /// Simulates the user switching networks in the wallet.
    pub(crate) fn user_switches_to(&self, chain: &str) {
        *self.chain.borrow_mut() = ChainId::new(chain);
        let _ = self.changes_tx.unbounded_send(ChainId::new(chain));
    }

    pub(crate) fn close_notifications(&self) {
        self.changes_tx.close_channel();
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    pub(crate) fn added_chains(&self) -> Vec<AddChainParams> {
        self.added.borrow().clone()
    }

    fn log(&self, call: &str) {
        self.calls.borrow_mut().push(call.to_owned());
    }
}

#[async_trait(?Send)]
impl WalletProvider for MockWallet {
    async fn request_accounts(&self) -> ProviderResult<Vec<WalletAddress>> {
        self.log("request_accounts");
        let outcome = self.on_request.borrow().clone();
        if let Ok(accounts) = &outcome {
            self.authorized.borrow_mut().extend(accounts.iter().cloned());
        }
        outcome
    }

    async fn authorized_accounts(&self) -> ProviderResult<Vec<WalletAddress>> {
        self.log("authorized_accounts");
        Ok(self.authorized.borrow().clone())
    }

    async fn chain_id(&self) -> ProviderResult<ChainId> {
        self.log("chain_id");
        Ok(self.chain.borrow().clone())
    }

    async fn switch_chain(&self, chain_id: &ChainId) -> ProviderResult<()> {
        self.log("switch_chain");
        let outcome = self.switch_script.borrow_mut().pop_front().unwrap_or(Ok(()));
        if outcome.is_ok() {
            *self.chain.borrow_mut() = chain_id.clone();
        }
        outcome
    }

    async fn add_chain(&self, params: &AddChainParams) -> ProviderResult<()> {
        self.log("add_chain");
        self.added.borrow_mut().push(params.clone());
        Ok(())
    }

    fn chain_changes(&self) -> ProviderResult<ChainChanges> {
        self.log("chain_changes");
        self.changes_rx
            .borrow_mut()
            .take()
            .ok_or_else(|| ProviderError::Transport("already subscribed".to_owned()))
    }
}

enum PendingWrite {
    Register { name: String, owner: WalletAddress },
    SetRecord { name: String, record: String },
}

/// Contract whose state changes only when a transaction is confirmed
/// with a successful receipt.
#[derive(Default)]
pub(crate) struct MockContract {
    names: RefCell<Vec<(String, String, WalletAddress)>>,
    pending: RefCell<HashMap<String, PendingWrite>>,
    register_status: Cell<Option<ReceiptStatus>>,
    record_status: Cell<Option<ReceiptStatus>>,
    register_error: RefCell<Option<ProviderError>>,
    failing_lookup: RefCell<Option<String>>,
    gate: RefCell<Option<oneshot::Receiver<()>>>,
    payments: RefCell<Vec<Wei>>,
    calls: RefCell<Vec<String>>,
    next_tx: Cell<u64>,
}

impl MockContract {
    pub(crate) fn seed(&self, name: &str, record: &str, owner: WalletAddress) {
        self.names
            .borrow_mut()
            .push((name.to_owned(), record.to_owned(), owner));
    }

    pub(crate) fn register_receipt(&self, status: ReceiptStatus) {
        self.register_status.set(Some(status));
    }

    pub(crate) fn record_receipt(&self, status: ReceiptStatus) {
        self.record_status.set(Some(status));
    }

    pub(crate) fn fail_register_with(&self, err: ProviderError) {
        *self.register_error.borrow_mut() = Some(err);
    }

    pub(crate) fn fail_lookup_of(&self, name: &str) {
        *self.failing_lookup.borrow_mut() = Some(name.to_owned());
    }

    pub(crate) fn heal_lookups(&self) {
        self.failing_lookup.borrow_mut().take();
    }

    /// Holds the next confirmation until the returned sender fires.
    pub(crate) fn hold_next_confirmation(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        *self.gate.borrow_mut() = Some(rx);
        tx
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    pub(crate) fn writes(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|call| call.starts_with("register") || call.starts_with("set_record"))
            .collect()
    }

    pub(crate) fn payments(&self) -> Vec<Wei> {
        self.payments.borrow().clone()
    }

    fn log(&self, call: String) {
        self.calls.borrow_mut().push(call);
    }

    fn submit(&self, write: PendingWrite) -> TxHandle {
        let id = self.next_tx.get() + 1;
        self.next_tx.set(id);
        let hash = format!("0x{id:064x}");
        self.pending.borrow_mut().insert(hash.clone(), write);
        TxHandle { hash }
    }
}

#[async_trait(?Send)]
impl NameContract for MockContract {
    async fn register(
        &self,
        from: &WalletAddress,
        name: &str,
        payment: Wei,
    ) -> ProviderResult<TxHandle> {
        self.log(format!("register:{name}"));
        if let Some(err) = self.register_error.borrow_mut().take() {
            return Err(err);
        }
        self.payments.borrow_mut().push(payment);
        Ok(self.submit(PendingWrite::Register {
            name: name.to_owned(),
            owner: from.clone(),
        }))
    }

    async fn set_record(
        &self,
        _from: &WalletAddress,
        name: &str,
        record: &str,
    ) -> ProviderResult<TxHandle> {
        self.log(format!("set_record:{name}"));
        let known = self.names.borrow().iter().any(|(existing, _, _)| existing == name);
        if !known {
            return Err(ProviderError::from_rpc(-32603, "execution reverted"));
        }
        Ok(self.submit(PendingWrite::SetRecord {
            name: name.to_owned(),
            record: record.to_owned(),
        }))
    }

    async fn wait_for_confirmation(&self, tx: &TxHandle) -> ProviderResult<Receipt> {
        self.log(format!("wait:{}", tx.hash));
        let gate = self.gate.borrow_mut().take();
        if let Some(gate) = gate {
            let _ = gate.await;
        }

        let write = self
            .pending
            .borrow_mut()
            .remove(&tx.hash)
            .ok_or_else(|| ProviderError::Transport(format!("unknown tx {}", tx.hash)))?;
        let status = match &write {
            PendingWrite::Register { .. } => self.register_status.get(),
            PendingWrite::SetRecord { .. } => self.record_status.get(),
        }
        .unwrap_or(ReceiptStatus::Success);

        if status == ReceiptStatus::Success {
            let mut names = self.names.borrow_mut();
            match write {
                PendingWrite::Register { name, owner } => names.push((name, String::new(), owner)),
                PendingWrite::SetRecord { name, record } => {
                    if let Some(entry) = names.iter_mut().find(|(existing, _, _)| *existing == name) {
                        entry.1 = record;
                    }
                }
            }
        }

        Ok(Receipt {
            tx_hash: tx.hash.clone(),
            status,
            block_number: Some(self.next_tx.get()),
        })
    }

    async fn all_names(&self) -> ProviderResult<Vec<String>> {
        self.log("all_names".to_owned());
        Ok(self.names.borrow().iter().map(|(name, _, _)| name.clone()).collect())
    }

    async fn record(&self, name: &str) -> ProviderResult<String> {
        self.log(format!("record:{name}"));
        if self.failing_lookup.borrow().as_deref() == Some(name) {
            return Err(ProviderError::Transport(format!("lookup of {name} dropped")));
        }
        self.names
            .borrow()
            .iter()
            .find(|(existing, _, _)| existing == name)
            .map(|(_, record, _)| record.clone())
            .ok_or_else(|| ProviderError::from_rpc(-32603, "execution reverted"))
    }

    async fn owner(&self, name: &str) -> ProviderResult<WalletAddress> {
        self.log(format!("owner:{name}"));
        self.names
            .borrow()
            .iter()
            .find(|(existing, _, _)| existing == name)
            .map(|(_, _, owner)| owner.clone())
            .ok_or_else(|| ProviderError::from_rpc(-32603, "execution reverted"))
    }
}

//! Change notifications published by the controller.
//!
//! The UI renders from these instead of polling controller state.

use futures::channel::mpsc::{self, UnboundedReceiver, UnboundedSender};
use std::cell::RefCell;
use std::fmt;
use std::time::Duration;

use crate::error::ValidationError;
use crate::orchestrator::TxPhase;

/// Messages meant for the user, as opposed to log lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    ProviderAbsent,
    Validation(ValidationError),
    TransactionFailed,
    SwitchFailed(String),
    Error(String),
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::ProviderAbsent => f.write_str("MetaMask not installed."),
            Notice::Validation(err) => write!(f, "{err}"),
            Notice::TransactionFailed => f.write_str("Transaction failed! Please try again"),
            Notice::SwitchFailed(reason) => write!(f, "Could not switch network: {reason}"),
            Notice::Error(reason) => write!(f, "Something went wrong: {reason}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerEvent {
    SessionChanged,
    PhaseChanged(TxPhase),
    SnapshotReplaced,
    /// Edit mode or the form fields changed.
    EditModeChanged,
    RefreshScheduled(Duration),
    Notice(Notice),
}

#[derive(Default)]
pub(crate) struct EventHub {
    subscribers: RefCell<Vec<UnboundedSender<ControllerEvent>>>,
}

impl EventHub {
    pub(crate) fn subscribe(&self) -> UnboundedReceiver<ControllerEvent> {
        let (tx, rx) = mpsc::unbounded();
        self.subscribers.borrow_mut().push(tx);
        rx
    }

    pub(crate) fn emit(&self, event: ControllerEvent) {
        self.subscribers
            .borrow_mut()
            .retain(|subscriber| subscriber.unbounded_send(event.clone()).is_ok());
    }
}

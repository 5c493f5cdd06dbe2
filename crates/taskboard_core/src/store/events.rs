//! Change notifications emitted by the entity store.
//!
//! # Responsibility
//! - Describe committed mutations (`create`/`update`/`delete`) to observers.
//! - Keep observer failures isolated from the mutating caller.
//!
//! # Invariants
//! - Delivery is synchronous, at-least-once, immediately after commit.
//! - An erroring or panicking observer is logged and skipped; it never
//!   fails the store operation and never stops later observers.
//!
//! # See also
//! - docs/architecture/logging.md

use crate::model::record::RecordId;
use log::warn;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

/// Kind of committed mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeOp {
    Create,
    Update,
    Delete,
}

impl Display for ChangeOp {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Create => write!(f, "create"),
            Self::Update => write!(f, "update"),
            Self::Delete => write!(f, "delete"),
        }
    }
}

/// One committed mutation, as seen by observers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub entity: String,
    pub id: RecordId,
    pub op: ChangeOp,
}

/// Observer contract for change events.
///
/// Errors are reported as strings so observers stay trivially composable;
/// the store logs and drops them.
pub trait ChangeObserver: Send + Sync {
    fn on_change(&self, event: &ChangeEvent) -> Result<(), String>;

    /// Name used in failure log lines.
    fn name(&self) -> &str {
        "observer"
    }
}

impl<F> ChangeObserver for F
where
    F: Fn(&ChangeEvent) -> Result<(), String> + Send + Sync,
{
    fn on_change(&self, event: &ChangeEvent) -> Result<(), String> {
        self(event)
    }
}

/// Built-in observer writing one audit line per committed mutation.
pub struct AuditLogObserver;

impl ChangeObserver for AuditLogObserver {
    fn on_change(&self, event: &ChangeEvent) -> Result<(), String> {
        log::info!(
            "event=record_changed module=store status=ok entity={} id={} op={}",
            event.entity,
            event.id,
            event.op
        );
        Ok(())
    }

    fn name(&self) -> &str {
        "audit_log"
    }
}

/// Registered observers and isolated dispatch.
#[derive(Default)]
pub(crate) struct ObserverRegistry {
    observers: RwLock<Vec<Arc<dyn ChangeObserver>>>,
}

impl ObserverRegistry {
    pub(crate) fn register(&self, observer: Arc<dyn ChangeObserver>) {
        self.observers.write().push(observer);
    }

    /// Delivers one event to every observer, isolating failures.
    pub(crate) fn notify(&self, event: &ChangeEvent) {
        let observers = self.observers.read().clone();
        for observer in observers {
            let outcome = catch_unwind(AssertUnwindSafe(|| observer.on_change(event)));
            match outcome {
                Ok(Ok(())) => {}
                Ok(Err(error)) => warn!(
                    "event=observer_failed module=store status=error observer={} entity={} id={} op={} error={}",
                    observer.name(),
                    event.entity,
                    event.id,
                    event.op,
                    error
                ),
                Err(_) => warn!(
                    "event=observer_failed module=store status=error observer={} entity={} id={} op={} error=observer_panicked",
                    observer.name(),
                    event.entity,
                    event.id,
                    event.op
                ),
            }
        }
    }
}

//! Background persistence of reordered forests
//!
//! The persisted state moves independently of the displayed forest:
//! `Idle → InFlight → Persisted | Failed`. A push is spawned and never awaited
//! by the display path, so the two can diverge until the push settles or the
//! next reload replaces the forest.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info, instrument};

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{Forest, ReorderItem, ReorderRequest};
use crate::infrastructure::CategoryStore;

/// Persisted-state machine, one value per dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistState {
    /// Nothing pushed yet
    Idle,
    InFlight { generation: u64 },
    Persisted { generation: u64 },
    /// Logged and kept; the local forest is not rolled back
    Failed { generation: u64, message: String },
}

impl PersistState {
    pub fn generation(&self) -> u64 {
        match self {
            PersistState::Idle => 0,
            PersistState::InFlight { generation }
            | PersistState::Persisted { generation }
            | PersistState::Failed { generation, .. } => *generation,
        }
    }

    pub fn is_settled(&self) -> bool {
        matches!(
            self,
            PersistState::Persisted { .. } | PersistState::Failed { .. }
        )
    }

    /// `Failed` becomes `SyncFailure`; everything else is the generation.
    pub fn into_result(self) -> ApplicationResult<u64> {
        match self {
            PersistState::Failed {
                generation,
                message,
            } => Err(ApplicationError::SyncFailure {
                generation,
                message,
            }),
            other => Ok(other.generation()),
        }
    }
}

/// Flatten a forest pre-order into the reorder change-set.
pub fn changeset(forest: &Forest) -> ReorderRequest {
    ReorderRequest {
        items: forest
            .iter()
            .map(|visit| ReorderItem {
                id: visit.category.id,
                parent_id: visit.parent_id,
                order: visit.category.order,
            })
            .collect(),
    }
}

/// Pushes change-sets to the remote store in the background.
pub struct SyncDispatcher {
    store: Arc<dyn CategoryStore>,
    state: Arc<watch::Sender<PersistState>>,
    generation: AtomicU64,
}

impl SyncDispatcher {
    pub fn new(store: Arc<dyn CategoryStore>) -> Self {
        let (state, _) = watch::channel(PersistState::Idle);
        Self {
            store,
            state: Arc::new(state),
            generation: AtomicU64::new(0),
        }
    }

    /// Watch persisted-state transitions.
    pub fn subscribe(&self) -> watch::Receiver<PersistState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> PersistState {
        self.state.borrow().clone()
    }

    /// Spawn the push of `forest` and return immediately.
    ///
    /// Failures are logged and published as `Failed`; there is no retry.
    /// Outside a tokio runtime nothing is sent and the push fails at once.
    /// Dropping the returned handle leaves the push running.
    #[instrument(level = "debug", skip_all, fields(nodes = forest.len()))]
    pub fn push(&self, forest: &Forest) -> SyncHandle {
        let generation = self.generation.fetch_add(1, Ordering::Relaxed) + 1;
        let request = changeset(forest);
        publish(&self.state, PersistState::InFlight { generation });

        let runtime = match Handle::try_current() {
            Ok(runtime) => runtime,
            Err(e) => {
                let outcome = failed(generation, format!("no async runtime: {e}"));
                publish(&self.state, outcome.clone());
                return SyncHandle {
                    generation,
                    task: Task::Settled(outcome),
                };
            }
        };

        let store = Arc::clone(&self.store);
        let state = Arc::clone(&self.state);
        let task = runtime.spawn(async move {
            let outcome = match store.reorder(&request).await {
                Ok(()) => {
                    info!(generation, items = request.items.len(), "reorder persisted");
                    PersistState::Persisted { generation }
                }
                Err(e) => failed(generation, e.to_string()),
            };
            publish(&state, outcome.clone());
            outcome
        });

        SyncHandle {
            generation,
            task: Task::Spawned(task),
        }
    }
}

fn failed(generation: u64, message: String) -> PersistState {
    let failure = ApplicationError::SyncFailure {
        generation,
        message: message.clone(),
    };
    error!(error = %failure, "keeping local tree until next reload");
    PersistState::Failed {
        generation,
        message,
    }
}

/// A newer push's state is never overwritten by an older one settling late.
fn publish(state: &watch::Sender<PersistState>, next: PersistState) {
    state.send_if_modified(|current| {
        if next.generation() >= current.generation() {
            *current = next;
            true
        } else {
            false
        }
    });
}

#[derive(Debug)]
enum Task {
    Spawned(JoinHandle<PersistState>),
    Settled(PersistState),
}

/// Handle on one push.
#[derive(Debug)]
pub struct SyncHandle {
    generation: u64,
    task: Task,
}

impl SyncHandle {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_finished(&self) -> bool {
        match &self.task {
            Task::Spawned(task) => task.is_finished(),
            Task::Settled(_) => true,
        }
    }

    /// Await the outcome. Only for callers outside the display path.
    pub async fn wait(self) -> PersistState {
        let task = match self.task {
            Task::Spawned(task) => task,
            Task::Settled(outcome) => return outcome,
        };
        match task.await {
            Ok(state) => state,
            Err(e) => PersistState::Failed {
                generation: self.generation,
                message: format!("sync task aborted: {e}"),
            },
        }
    }
}

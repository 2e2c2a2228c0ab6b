//! Drag-and-drop reorder service
//!
//! Owns the displayed forest. A drag-end is handled synchronously: resolve,
//! move, restamp orders, replace the displayed forest. The push to the remote
//! store is then spawned and left to settle on its own.

use std::sync::Arc;

use tracing::{debug, instrument, warn};

use crate::application::sync::{SyncDispatcher, SyncHandle};
use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{mutator, order, resolver, CategoryId, DragEnd, Forest};
use crate::infrastructure::CategoryStore;

/// Result of one drag-end.
#[derive(Debug)]
pub enum DragOutcome {
    /// Released outside any target or onto itself; nothing changed.
    Ignored,
    /// The displayed forest was replaced and a push is under way.
    Moved {
        dragged: CategoryId,
        new_parent: Option<CategoryId>,
        sync: SyncHandle,
    },
}

/// A move computed against the current forest but not yet displayed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedMove {
    pub dragged: CategoryId,
    pub new_parent: Option<CategoryId>,
    pub forest: Forest,
}

pub struct ReorderService {
    store: Arc<dyn CategoryStore>,
    dispatcher: SyncDispatcher,
    forest: Forest,
}

impl ReorderService {
    /// Start with an empty forest; call [`ReorderService::load`] to seed it.
    pub fn new(store: Arc<dyn CategoryStore>) -> Self {
        Self::with_forest(store, Forest::new())
    }

    pub fn with_forest(store: Arc<dyn CategoryStore>, forest: Forest) -> Self {
        let dispatcher = SyncDispatcher::new(Arc::clone(&store));
        Self {
            store,
            dispatcher,
            forest,
        }
    }

    /// The displayed forest.
    pub fn forest(&self) -> &Forest {
        &self.forest
    }

    pub fn dispatcher(&self) -> &SyncDispatcher {
        &self.dispatcher
    }

    /// Fetch the forest from the remote store and replace the displayed one.
    ///
    /// Does not wait for in-flight pushes.
    #[instrument(level = "debug", skip(self))]
    pub async fn load(&mut self) -> ApplicationResult<&Forest> {
        let nodes = self
            .store
            .list()
            .await
            .map_err(|e| ApplicationError::failed("load categories", e))?;
        let forest = Forest::from_nodes(&nodes)?;
        self.replace(forest);
        Ok(&self.forest)
    }

    /// Replace the displayed forest wholesale.
    pub fn replace(&mut self, forest: Forest) {
        debug!(nodes = forest.len(), "replacing displayed forest");
        self.forest = forest;
    }

    /// Compute the outcome of a drag-end without touching the displayed forest.
    ///
    /// `None` when the drag is a no-op.
    pub fn plan(&self, event: &DragEnd) -> ApplicationResult<Option<PlannedMove>> {
        let target = match event.over {
            Some(target) if !event.is_noop() => target,
            _ => return Ok(None),
        };
        let new_parent = resolver::resolve(event.dragged, &target, &self.forest)?;
        let moved = mutator::apply(&self.forest, event.dragged, new_parent)?;
        Ok(Some(PlannedMove {
            dragged: event.dragged,
            new_parent,
            forest: order::assign(&moved),
        }))
    }

    /// Drag-end handler.
    ///
    /// On a structural error the displayed forest is left unchanged and the
    /// error is returned for an optional transient notice.
    #[instrument(level = "debug", skip(self))]
    pub fn handle_drag_end(&mut self, event: &DragEnd) -> ApplicationResult<DragOutcome> {
        let planned = self.plan(event).inspect_err(|e| {
            warn!(error = %e, "drag rejected, forest unchanged");
        })?;
        let Some(PlannedMove {
            dragged,
            new_parent,
            forest,
        }) = planned
        else {
            debug!("drag ignored");
            return Ok(DragOutcome::Ignored);
        };

        self.forest = forest;
        let sync = self.dispatcher.push(&self.forest);
        Ok(DragOutcome::Moved {
            dragged,
            new_parent,
            sync,
        })
    }
}

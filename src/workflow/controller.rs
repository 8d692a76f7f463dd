use std::sync::Arc;
use tokio::sync::{oneshot, watch, Mutex};
use tracing::{debug, info, warn};

use crate::clients::{CollectionId, CollectionStore, CreateOutcome, NamingService, OwnerId};
use crate::workflow::name::NormalizedName;
use crate::workflow::state::{Failure, FailureReason, Phase, Snapshot};

const EMPTY_NAME_MESSAGE: &str = "Please enter a name";
const NAME_TAKEN_MESSAGE: &str = "This name already exists.";

/// One save attempt's mutable state. Kept behind a mutex that is never held
/// across an external call, so `cancel` and snapshot reads always get
/// through while a call is in flight.
struct Inner {
    phase: Phase,
    candidate: String,
    error: Option<Failure>,
    /// Monotonic marker captured when an external call is issued. A result
    /// whose captured marker no longer matches is discarded on arrival.
    generation: u64,
    cancelled: bool,
    completion_tx: Option<oneshot::Sender<CollectionId>>,
    completion_rx: Option<oneshot::Receiver<CollectionId>>,
}

impl Inner {
    fn snapshot(&self) -> Snapshot {
        Snapshot {
            phase: self.phase,
            candidate_name: self.candidate.clone(),
            error: self.error.clone(),
        }
    }

    fn fail(&mut self, reason: FailureReason, message: impl Into<String>) {
        self.phase = Phase::Failed;
        self.error = Some(Failure::new(reason, message));
    }

    fn is_stale(&self, issued: u64) -> bool {
        self.cancelled || self.generation != issued
    }

    /// Inert instances (cancelled or already succeeded) accept nothing.
    fn is_inert(&self) -> bool {
        self.cancelled || self.phase.is_terminal()
    }
}

/// Controller for the named-collection save workflow.
///
/// Owns the item set and owner identity for its whole lifetime and sequences
/// the three external calls (name suggestion, existence check, create) so
/// that at most one is live at a time. The presentation layer observes it
/// through [`Snapshot`]s and drives it through the action methods; a oneshot
/// completion signal fires exactly once when a collection is created.
///
/// The existence pre-check is an optimistic early rejection for the user's
/// benefit, not a correctness guarantee: a racing attempt can slip between
/// the check and the create, in which case the store's own uniqueness
/// enforcement reports the collision through the create's rejected outcome.
pub struct SaveWorkflow<I> {
    items: Arc<[I]>,
    owner: OwnerId,
    naming: Arc<dyn NamingService<I>>,
    store: Arc<dyn CollectionStore<I>>,
    inner: Mutex<Inner>,
    snapshots: watch::Sender<Snapshot>,
}

impl<I> SaveWorkflow<I>
where
    I: Send + Sync + 'static,
{
    pub fn new(
        items: Vec<I>,
        owner: OwnerId,
        naming: Arc<dyn NamingService<I>>,
        store: Arc<dyn CollectionStore<I>>,
    ) -> Self {
        let (completion_tx, completion_rx) = oneshot::channel();
        let (snapshots, _) = watch::channel(Snapshot::initial());
        Self {
            items: items.into(),
            owner,
            naming,
            store,
            inner: Mutex::new(Inner {
                phase: Phase::Idle,
                candidate: String::new(),
                error: None,
                generation: 0,
                cancelled: false,
                completion_tx: Some(completion_tx),
                completion_rx: Some(completion_rx),
            }),
            snapshots,
        }
    }

    /// Current read-only state.
    pub fn snapshot(&self) -> Snapshot {
        self.snapshots.borrow().clone()
    }

    /// Subscribe to state changes. Each transition publishes a fresh
    /// snapshot; rejected actions and discarded results publish nothing.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.snapshots.subscribe()
    }

    /// Take the completion signal. Resolves with the created collection's id
    /// when the workflow enters `Succeeded`. Yields `Some` only on the first
    /// call.
    pub async fn completion(&self) -> Option<oneshot::Receiver<CollectionId>> {
        self.inner.lock().await.completion_rx.take()
    }

    /// Record the user-edited candidate name verbatim and clear any error.
    /// Ignored while an existence check or save is pending and after the
    /// workflow has succeeded or been cancelled.
    pub async fn set_name(&self, text: impl Into<String>) {
        let mut inner = self.inner.lock().await;
        if inner.is_inert() || matches!(inner.phase, Phase::Validating | Phase::Saving) {
            warn!(phase = ?inner.phase, "name edit ignored");
            return;
        }
        inner.candidate = text.into();
        inner.error = None;
        // While a suggestion is pending the phase stays put; its result may
        // still land and replace what the user typed.
        if matches!(inner.phase, Phase::Idle | Phase::Failed) {
            inner.phase = Phase::Ready;
        }
        self.publish(&inner);
    }

    /// Ask the naming service for a suggested name for the item set.
    ///
    /// A request issued while an earlier suggestion is still pending
    /// supersedes it: only the most recently issued call may replace the
    /// candidate name, whatever order the results arrive in. Rejected while
    /// a submit is in flight and after success or cancellation.
    pub async fn request_name_suggestion(&self) -> Snapshot {
        let issued = {
            let mut inner = self.inner.lock().await;
            if inner.is_inert() || matches!(inner.phase, Phase::Validating | Phase::Saving) {
                warn!(phase = ?inner.phase, "name suggestion request ignored");
                return inner.snapshot();
            }
            inner.generation += 1;
            inner.phase = Phase::GeneratingName;
            self.publish(&inner);
            inner.generation
        };

        debug!(generation = issued, "requesting name suggestion");
        let result = self.naming.suggest_name(&self.items).await;

        let mut inner = self.inner.lock().await;
        if inner.is_stale(issued) {
            debug!(
                issued,
                current = inner.generation,
                "discarding superseded name suggestion result"
            );
            return inner.snapshot();
        }

        match result {
            Ok(name) => {
                info!(generation = issued, suggested = %name, "name suggestion applied");
                inner.candidate = name;
                inner.error = None;
                inner.phase = Phase::Ready;
            }
            Err(err) => {
                warn!(generation = issued, error = %err, "name suggestion failed");
                inner.fail(FailureReason::Transient, err.to_string());
            }
        }
        self.publish(&inner)
    }

    /// Validate the candidate name, check it is unused for this owner, and
    /// persist the collection.
    ///
    /// An empty (after trimming) candidate fails validation locally with no
    /// external call. An existence check that cannot reach a verdict blocks
    /// the save rather than proceeding optimistically. Rejected while any
    /// operation is pending and after success or cancellation; a failed
    /// attempt can be resubmitted with the same items and owner.
    pub async fn submit(&self) -> Snapshot {
        let (issued, name) = {
            let mut inner = self.inner.lock().await;
            if inner.is_inert() || inner.phase.is_pending() {
                warn!(phase = ?inner.phase, "submit ignored");
                return inner.snapshot();
            }
            let Some(name) = NormalizedName::new(&inner.candidate) else {
                info!("submit rejected: empty candidate name");
                inner.fail(FailureReason::Validation, EMPTY_NAME_MESSAGE);
                return self.publish(&inner);
            };
            inner.generation += 1;
            inner.error = None;
            inner.phase = Phase::Validating;
            self.publish(&inner);
            (inner.generation, name)
        };

        debug!(generation = issued, name = %name, "checking name availability");
        let existing = self.store.exists(&self.owner, &name).await;

        {
            let mut inner = self.inner.lock().await;
            if inner.is_stale(issued) {
                debug!(issued, "discarding existence check result");
                return inner.snapshot();
            }
            match existing {
                Err(err) => {
                    // Existence unknown blocks the save; never proceed blind.
                    warn!(generation = issued, error = %err, "existence check failed");
                    inner.fail(FailureReason::Transient, err.to_string());
                    return self.publish(&inner);
                }
                Ok(true) => {
                    info!(generation = issued, name = %name, "name already taken");
                    inner.fail(FailureReason::Conflict, NAME_TAKEN_MESSAGE);
                    return self.publish(&inner);
                }
                Ok(false) => {
                    inner.phase = Phase::Saving;
                    self.publish(&inner);
                }
            }
        }

        debug!(generation = issued, name = %name, "creating collection");
        let created = self
            .store
            .create_collection(&self.owner, &name, &self.items)
            .await;

        let mut inner = self.inner.lock().await;
        if inner.is_stale(issued) {
            debug!(issued, "discarding create result");
            return inner.snapshot();
        }
        match created {
            Err(err) => {
                warn!(generation = issued, error = %err, "create failed in transit");
                inner.fail(FailureReason::Transient, err.to_string());
            }
            Ok(CreateOutcome::Rejected { reason }) => {
                warn!(generation = issued, reason = %reason, "store rejected create");
                inner.fail(FailureReason::Persistence, reason);
            }
            Ok(CreateOutcome::Created { id }) => {
                info!(owner = %self.owner, name = %name, id = %id, "collection saved");
                inner.phase = Phase::Succeeded;
                inner.error = None;
                if let Some(tx) = inner.completion_tx.take() {
                    let _ = tx.send(id);
                }
            }
        }
        self.publish(&inner)
    }

    /// Mark the attempt inert. Any in-flight call's eventual result is
    /// discarded and no further state transition occurs; the external
    /// operation itself is not aborted and may still complete remotely.
    pub async fn cancel(&self) {
        let mut inner = self.inner.lock().await;
        if inner.cancelled {
            return;
        }
        inner.cancelled = true;
        inner.generation += 1;
        info!(phase = ?inner.phase, "workflow cancelled; in-flight results will be discarded");
    }

    pub fn owner(&self) -> &OwnerId {
        &self.owner
    }

    pub fn items(&self) -> &[I] {
        &self.items
    }

    fn publish(&self, inner: &Inner) -> Snapshot {
        let snapshot = inner.snapshot();
        self.snapshots.send_replace(snapshot.clone());
        snapshot
    }
}

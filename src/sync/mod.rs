//! Synchronization service.
//!
//! This module provides the [`SyncService`] which moves data between the
//! backend and the [`RootStore`]. It owns the per-kind fetch state machine
//! (`Idle → Pending → Ready`, or `→ Error`) and the write paths in
//! [`writes`] and [`timesheets`].
//!
//! Network and decode errors never escape a fetch: they are recorded on the
//! slice (`Status::Error` plus message) and reported as
//! [`FetchOutcome::Failed`].

pub mod timesheets;
pub mod writes;

use log::{error, info, warn};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinSet;

use crate::api::{ApiError, Backend};
use crate::constants::{LOG_FETCH_DISCARDED, LOG_FETCH_SKIPPED_IN_FLIGHT, LOG_FETCH_STARTED, LOG_STORE_CLEARED};
use crate::entities::{
    Absence, Attributes, EntityKind, Preset, Setting, Shift, Timesheet, User, ValidationError,
};
use crate::store::{Action, RootState, RootStore, SliceAction, Status, StoreError};

/// Result of asking for a kind to be fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The response was stored; number of entities
    Loaded(usize),
    /// Already loaded, nothing requested
    Cached,
    /// Another fetch for the kind is in flight; nothing requested
    InFlight,
    /// The store was cleared while the request was in flight; response dropped
    Discarded,
    /// The request or decoding failed; the slice is in `Status::Error`
    Failed(String),
}

/// Errors of the write paths.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SyncError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Service that keeps the entity store in step with the backend.
///
/// Cloning is cheap; clones share the backend and the store. All store
/// mutations happen under the store mutex, one dispatch at a time.
///
/// # Example
/// ```rust,no_run
/// use timesheets::api::HttpBackend;
/// use timesheets::config::Config;
/// use timesheets::entities::User;
/// use timesheets::store::selectors;
/// use timesheets::sync::SyncService;
/// use std::sync::Arc;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::load()?;
/// let backend = Arc::new(HttpBackend::new(&config.api)?);
/// let sync_service = SyncService::new(backend);
///
/// sync_service.ensure_loaded::<User>().await;
/// let names: Vec<String> = sync_service
///     .read(|state| {
///         selectors::select_users(state)
///             .items
///             .iter()
///             .map(|user| user.attributes.name.clone())
///             .collect()
///     })
///     .await;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct SyncService {
    backend: Arc<dyn Backend>,
    store: Arc<Mutex<RootStore>>,
}

impl SyncService {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self::with_store(backend, Arc::new(Mutex::new(RootStore::new())))
    }

    pub fn with_store(backend: Arc<dyn Backend>, store: Arc<Mutex<RootStore>>) -> Self {
        Self { backend, store }
    }

    pub fn store(&self) -> Arc<Mutex<RootStore>> {
        Arc::clone(&self.store)
    }

    /// Run a selector against the current state.
    pub async fn read<R>(&self, f: impl FnOnce(&RootState) -> R) -> R {
        let store = self.store.lock().await;
        f(store.state())
    }

    pub async fn status(&self, kind: EntityKind) -> Status {
        self.store.lock().await.state().status(kind)
    }

    pub async fn is_fetching(&self, kind: EntityKind) -> bool {
        self.status(kind).await == Status::Pending
    }

    /// Fetch every entity of kind `A`, unless a fetch is already in flight.
    pub async fn fetch<A: Attributes>(&self) -> FetchOutcome {
        match self.begin::<A>(true).await {
            Ok(generation) => self.load::<A>(generation).await,
            Err(outcome) => outcome,
        }
    }

    /// Fetch kind `A` only if it has not been loaded yet.
    pub async fn ensure_loaded<A: Attributes>(&self) -> FetchOutcome {
        match self.begin::<A>(false).await {
            Ok(generation) => self.load::<A>(generation).await,
            Err(outcome) => outcome,
        }
    }

    /// [`SyncService::ensure_loaded`] for a kind known only at runtime.
    pub async fn ensure_kind(&self, kind: EntityKind) -> FetchOutcome {
        match kind {
            EntityKind::User => self.ensure_loaded::<User>().await,
            EntityKind::Timesheet => self.ensure_loaded::<Timesheet>().await,
            EntityKind::Shift => self.ensure_loaded::<Shift>().await,
            EntityKind::Absence => self.ensure_loaded::<Absence>().await,
            EntityKind::Preset => self.ensure_loaded::<Preset>().await,
            EntityKind::Setting => self.ensure_loaded::<Setting>().await,
        }
    }

    /// Ensure several kinds concurrently. Results come back in input order.
    pub async fn preload(&self, kinds: &[EntityKind]) -> Vec<(EntityKind, FetchOutcome)> {
        let mut tasks = JoinSet::new();
        for (position, kind) in kinds.iter().copied().enumerate() {
            let service = self.clone();
            tasks.spawn(async move { (position, kind, service.ensure_kind(kind).await) });
        }

        let mut results = Vec::with_capacity(kinds.len());
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(result) => results.push(result),
                Err(e) => error!("❌ Preload task failed: {e}"),
            }
        }
        results.sort_by_key(|(position, _, _)| *position);
        results.into_iter().map(|(_, kind, outcome)| (kind, outcome)).collect()
    }

    /// Every kind, concurrently.
    pub async fn fetch_all(&self) -> Vec<(EntityKind, FetchOutcome)> {
        self.preload(&EntityKind::ALL).await
    }

    /// Drop all cached entities, e.g. on logout. In-flight fetches started
    /// before this call will discard their responses.
    pub async fn logout(&self) {
        let mut store = self.store.lock().await;
        Self::apply(&mut store, Action::ClearAll);
        info!("{LOG_STORE_CLEARED}");
    }

    /// Move kind `A` to `Pending` and return the generation the request
    /// belongs to, or the outcome to report when no request is needed.
    ///
    /// Check and transition happen under one lock, so concurrent callers
    /// cannot both start a request.
    async fn begin<A: Attributes>(&self, force: bool) -> Result<u64, FetchOutcome> {
        let mut store = self.store.lock().await;
        match store.state().status(A::KIND) {
            Status::Pending => {
                info!("{LOG_FETCH_SKIPPED_IN_FLIGHT} {}", A::KIND);
                return Err(FetchOutcome::InFlight);
            }
            Status::Ready if !force => return Err(FetchOutcome::Cached),
            _ => {}
        }
        Self::apply(&mut store, A::wrap(SliceAction::SetPending));
        Ok(store.state().generation(A::KIND))
    }

    async fn load<A: Attributes>(&self, generation: u64) -> FetchOutcome {
        info!("{LOG_FETCH_STARTED} {}", A::KIND);
        let response = self.backend.fetch_all(A::KIND).await;

        let mut store = self.store.lock().await;
        if store.state().generation(A::KIND) != generation {
            warn!("{LOG_FETCH_DISCARDED} {}", A::KIND);
            return FetchOutcome::Discarded;
        }

        let entities = response.and_then(|resources| store.state().slice::<A>().entities_from_resources(&resources));
        match entities {
            Ok(entities) => {
                let count = entities.len();
                Self::apply(&mut store, A::wrap(SliceAction::Set(entities)));
                info!("✅ Fetched {count} {}", A::KIND);
                FetchOutcome::Loaded(count)
            }
            Err(e) => {
                error!("❌ Failed to fetch {}: {e}", A::KIND);
                Self::apply(&mut store, A::wrap(SliceAction::SetError(e.to_string())));
                FetchOutcome::Failed(e.to_string())
            }
        }
    }

    /// Dispatch an action that cannot fail (status changes, set, clear).
    fn apply(store: &mut RootStore, action: Action) {
        let kind = action.kind();
        if let Err(e) = store.dispatch(action) {
            match kind {
                Some(kind) => error!("❌ Store rejected {kind} action: {e}"),
                None => error!("❌ Store rejected store-wide action: {e}"),
            }
        }
    }
}

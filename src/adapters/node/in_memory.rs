//! In-Memory Session Node
//!
//! Keeps sessions in process memory. Each session sits behind its own async
//! mutex, which gives the exclusivity the admission layer relies on: a
//! second request for a busy session waits for the first to finish.
//!
//! Offloading is simulated: `offload_session` moves a session to another
//! host by name. A session that is idle moves at once; a session that is
//! held moves when its current holder releases it, and the holder learns
//! the new location from `acquire_session`.
//!
//! Sessions with an expiry that nobody comes back for, and relocation
//! records nobody asks about, are reclaimed by `purge_expired`.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};

use crate::domain::foundation::{Host, SessionId};
use crate::domain::session::{
    AcquireSessionOptions, CreateAndAcquireSessionOptions, SessionLocation, SessionToken,
};
use crate::ports::{NodeError, NodeInfo, ResumeTask, SessionNode, SessionTask};

#[derive(Debug)]
enum SlotState {
    Active,
    Relocated(SessionLocation),
    Evicted,
}

#[derive(Debug)]
struct SessionSlot {
    state: SlotState,
    expires_at: Option<DateTime<Utc>>,
    acquisitions: u64,
}

impl SessionSlot {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map_or(false, |at| at <= now)
    }
}

#[derive(Debug)]
struct SessionEntry {
    pending_offload: Mutex<Option<Host>>,
    slot: Arc<Mutex<SessionSlot>>,
}

/// Where an idle session went, kept until one request has been told.
#[derive(Debug, Clone)]
struct Relocation {
    location: SessionLocation,
    relocated_at: DateTime<Utc>,
}

/// How long an unclaimed relocation record is kept by default, in seconds.
pub const DEFAULT_RELOCATION_TTL_SECS: i64 = 600;

/// What one `purge_expired` pass reclaimed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PurgeReport {
    /// Expired sessions removed
    pub sessions: usize,
    /// Relocation records older than the TTL removed
    pub relocations: usize,
}

/// Single-process session node.
#[derive(Debug, Clone)]
pub struct InMemoryNode {
    host: Host,
    parent: Option<Host>,
    relocation_ttl: Duration,
    sessions: Arc<RwLock<HashMap<SessionId, Arc<SessionEntry>>>>,
    relocated: Arc<RwLock<HashMap<SessionId, Relocation>>>,
}

impl InMemoryNode {
    /// Create a node answering for `host`, with no parent.
    pub fn new(host: Host) -> Self {
        Self {
            host,
            parent: None,
            relocation_ttl: Duration::seconds(DEFAULT_RELOCATION_TTL_SECS),
            sessions: Arc::new(RwLock::new(HashMap::new())),
            relocated: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Set the parent reported by `get_parent_node_of` for this node.
    pub fn with_parent(mut self, parent: Host) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Keep unclaimed relocation records for `ttl` instead of the default.
    pub fn with_relocation_ttl(mut self, ttl: Duration) -> Self {
        self.relocation_ttl = ttl;
        self
    }

    /// Number of sessions currently stored on this node.
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Whether `session_id` is stored on this node.
    pub async fn contains(&self, session_id: &SessionId) -> bool {
        self.sessions.read().await.contains_key(session_id)
    }

    /// Number of offloaded sessions whose new location has not been claimed.
    pub async fn relocation_count(&self) -> usize {
        self.relocated.read().await.len()
    }

    /// How many times `session_id` has been acquired, creation included.
    pub async fn acquisitions(&self, session_id: &SessionId) -> Option<u64> {
        let entry = self.sessions.read().await.get(session_id).cloned()?;
        let slot = entry.slot.lock().await;
        Some(slot.acquisitions)
    }

    /// Move a session to `to`.
    ///
    /// Returns the new location if the session was idle and moved at once,
    /// or `None` if it is held and will move when released.
    ///
    /// When a held session moves, its holder is told. When an idle session
    /// moves, the next `acquire_session` for it is told instead, once; after
    /// that, or after the relocation TTL, the session is simply not found.
    pub async fn offload_session(
        &self,
        session_id: &SessionId,
        to: Host,
    ) -> Result<Option<SessionLocation>, NodeError> {
        let entry = self
            .sessions
            .read()
            .await
            .get(session_id)
            .cloned()
            .ok_or_else(|| NodeError::SessionNotFound(session_id.to_string()))?;

        *entry.pending_offload.lock().await = Some(to);

        match Arc::clone(&entry.slot).try_lock_owned() {
            Ok(mut slot) => Ok(self
                .apply_pending_offload(session_id, &entry, &mut slot, true)
                .await),
            Err(_) => {
                tracing::debug!(session_id = %session_id, "Session busy, offload deferred");
                Ok(None)
            }
        }
    }

    /// Drop expired sessions nobody holds and stale relocation records.
    ///
    /// Sessions that are currently held are left for their holder, which
    /// evicts them on its next acquisition.
    pub async fn purge_expired(&self) -> PurgeReport {
        let now = Utc::now();
        let entries: Vec<(SessionId, Arc<SessionEntry>)> = self
            .sessions
            .read()
            .await
            .iter()
            .map(|(id, entry)| (id.clone(), Arc::clone(entry)))
            .collect();

        let mut report = PurgeReport::default();
        for (session_id, entry) in entries {
            let Ok(mut slot) = Arc::clone(&entry.slot).try_lock_owned() else {
                continue;
            };
            if matches!(slot.state, SlotState::Active) && slot.is_expired(now) {
                self.evict(&session_id, &mut slot).await;
                report.sessions += 1;
            }
        }

        let cutoff = now - self.relocation_ttl;
        let mut relocated = self.relocated.write().await;
        let before = relocated.len();
        relocated.retain(|_, relocation| relocation.relocated_at > cutoff);
        report.relocations = before - relocated.len();
        drop(relocated);

        if report != PurgeReport::default() {
            tracing::debug!(
                host = %self.host,
                sessions = report.sessions,
                relocations = report.relocations,
                "Purged expired session state"
            );
        }
        report
    }

    /// Run `purge_expired` every `every` until the returned handle is aborted.
    pub fn spawn_purge_task(&self, every: std::time::Duration) -> tokio::task::JoinHandle<()> {
        let node = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                node.purge_expired().await;
            }
        })
    }

    async fn entry(&self, session_id: &SessionId) -> Option<Arc<SessionEntry>> {
        self.sessions.read().await.get(session_id).cloned()
    }

    /// Take the relocation record for `session_id`, if it is still fresh.
    async fn claim_relocation(&self, session_id: &SessionId) -> Option<SessionLocation> {
        let relocation = self.relocated.write().await.remove(session_id)?;
        let fresh = relocation.relocated_at > Utc::now() - self.relocation_ttl;
        fresh.then_some(relocation.location)
    }

    async fn apply_pending_offload(
        &self,
        session_id: &SessionId,
        entry: &SessionEntry,
        slot: &mut OwnedMutexGuard<SessionSlot>,
        remember: bool,
    ) -> Option<SessionLocation> {
        if !matches!(slot.state, SlotState::Active) {
            return None;
        }
        let to = entry.pending_offload.lock().await.take()?;
        let location = SessionLocation::new(to, session_id.clone());

        slot.state = SlotState::Relocated(location.clone());
        self.sessions.write().await.remove(session_id);
        if remember {
            self.relocated.write().await.insert(
                session_id.clone(),
                Relocation {
                    location: location.clone(),
                    relocated_at: Utc::now(),
                },
            );
        }

        tracing::info!(
            session_id = %session_id,
            from = %self.host,
            to = %location.host(),
            "Session offloaded"
        );
        Some(location)
    }

    async fn evict(&self, session_id: &SessionId, slot: &mut OwnedMutexGuard<SessionSlot>) {
        slot.state = SlotState::Evicted;
        self.sessions.write().await.remove(session_id);
        tracing::debug!(session_id = %session_id, "Expired session evicted");
    }

    async fn release(
        &self,
        session_id: &SessionId,
        entry: &SessionEntry,
        slot: &mut OwnedMutexGuard<SessionSlot>,
        options: AcquireSessionOptions,
    ) -> Option<SessionLocation> {
        if options.allow_offloading {
            self.apply_pending_offload(session_id, entry, slot, false)
                .await
        } else {
            None
        }
    }
}

#[async_trait]
impl SessionNode for InMemoryNode {
    fn host(&self) -> &Host {
        &self.host
    }

    async fn create_and_acquire_session(
        &self,
        options: CreateAndAcquireSessionOptions,
        task: SessionTask,
    ) -> Result<(), NodeError> {
        let session_id = SessionId::generate();
        let entry = Arc::new(SessionEntry {
            pending_offload: Mutex::new(None),
            slot: Arc::new(Mutex::new(SessionSlot {
                state: SlotState::Active,
                expires_at: options.create.expires_at,
                acquisitions: 1,
            })),
        });

        // Held before the session becomes visible, so nobody else can
        // acquire it until the creating request is done.
        let mut slot = Arc::clone(&entry.slot).lock_owned().await;
        self.sessions
            .write()
            .await
            .insert(session_id.clone(), Arc::clone(&entry));
        tracing::debug!(host = %self.host, session_id = %session_id, "Session created");

        let token = SessionToken::new(SessionLocation::new(self.host.clone(), session_id.clone()));
        let result = task(token).await;

        self.release(&session_id, &entry, &mut slot, options.acquire)
            .await;
        result.map_err(NodeError::from)
    }

    async fn acquire_session(
        &self,
        token: &SessionToken,
        options: AcquireSessionOptions,
        task: ResumeTask,
    ) -> Result<Option<SessionLocation>, NodeError> {
        let session_id = token.session_id();
        let not_found = || NodeError::SessionNotFound(session_id.to_string());

        if token.host() != &self.host {
            return Err(not_found());
        }

        let Some(entry) = self.entry(session_id).await else {
            return self.claim_relocation(session_id).await.map(Some).ok_or_else(not_found);
        };

        let mut slot = Arc::clone(&entry.slot).lock_owned().await;
        match &slot.state {
            SlotState::Active => {}
            SlotState::Relocated(location) => {
                let location = location.clone();
                self.relocated.write().await.remove(session_id);
                return Ok(Some(location));
            }
            SlotState::Evicted => return Err(not_found()),
        }

        if slot.is_expired(Utc::now()) {
            self.evict(session_id, &mut slot).await;
            return Err(not_found());
        }

        if !options.allow_while_offloading && entry.pending_offload.lock().await.is_some() {
            return Ok(self
                .apply_pending_offload(session_id, &entry, &mut slot, false)
                .await);
        }

        slot.acquisitions += 1;
        let result = task().await;

        let relocated = self.release(session_id, &entry, &mut slot, options).await;
        result?;
        Ok(relocated)
    }

    async fn get_parent_node_of(&self, host: &Host) -> Result<NodeInfo, NodeError> {
        if host != &self.host {
            return Err(NodeError::NoParent(host.to_string()));
        }
        self.parent
            .clone()
            .map(NodeInfo::new)
            .ok_or_else(|| NodeError::NoParent(host.to_string()))
    }
}

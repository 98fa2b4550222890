//! Texture resolution for identity-linked icons.
//!
//! Lookups that are not already cached run on the async pool with a hard timeout.
//! Completed results hop back to the synchronous context and are applied only when the
//! instance is still at the render generation that requested them.

use crate::error::ResolveError;
use crate::scheduler::Scheduler;
use crate::types::Slot;
use async_trait::async_trait;
use dashmap::DashMap;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// The external texture lookup service.
#[async_trait]
pub trait TextureResolver: Send + Sync {
    /// Texture already known for `identity`, if any.
    fn cached(&self, identity: &str) -> Option<String>;

    async fn lookup(&self, identity: &str) -> Result<String, ResolveError>;
}

/// One container slot waiting for a texture.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SlotTarget {
    pub language: String,
    pub page: usize,
    pub slot: Slot,
}

/// A texture lookup together with every slot waiting on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingLookup {
    pub identity: String,
    pub targets: Vec<SlotTarget>,
}

/// Groups slot targets by identity so each identity is looked up once per render.
///
/// Lookups keep the order in which their identity was first seen.
#[derive(Debug, Default)]
pub struct LookupBatch {
    lookups: Vec<PendingLookup>,
    index: HashMap<String, usize>,
}

impl LookupBatch {
    pub fn add(&mut self, identity: &str, target: SlotTarget) {
        match self.index.get(identity) {
            Some(&position) => self.lookups[position].targets.push(target),
            None => {
                self.index.insert(identity.to_string(), self.lookups.len());
                self.lookups.push(PendingLookup {
                    identity: identity.to_string(),
                    targets: vec![target],
                });
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lookups.is_empty()
    }

    pub fn len(&self) -> usize {
        self.lookups.len()
    }

    pub fn into_lookups(self) -> Vec<PendingLookup> {
        self.lookups
    }
}

/// Sync-side callback applying a resolved texture: `(targets, texture)`.
pub type ApplyTexture = Arc<dyn Fn(&[SlotTarget], &str) + Send + Sync>;

/// Starts every lookup in `batch` on the async pool.
///
/// Each successful result is handed to `apply` on the synchronous context. Failures and
/// timeouts are dropped; the slot keeps its unresolved appearance.
pub fn dispatch(
    scheduler: &Arc<dyn Scheduler>,
    resolver: &Arc<dyn TextureResolver>,
    batch: LookupBatch,
    timeout: Duration,
    apply: ApplyTexture,
) {
    for lookup in batch.into_lookups() {
        let scheduler_sync = scheduler.clone();
        let resolver = resolver.clone();
        let apply = apply.clone();
        scheduler.run_async(
            Box::pin(async move {
                let PendingLookup { identity, targets } = lookup;
                let result = match tokio::time::timeout(timeout, resolver.lookup(&identity)).await {
                    Ok(result) => result,
                    Err(_) => Err(ResolveError::Timeout(identity.clone())),
                };
                match result {
                    Ok(texture) => {
                        scheduler_sync.run_sync(
                            Box::new(move || apply(targets.as_slice(), texture.as_str())),
                            Duration::ZERO,
                        );
                    }
                    Err(e) => debug!("Texture lookup dropped: {}", e),
                }
            }),
            Duration::ZERO,
        );
    }
}

/// In-memory texture service with an optional artificial latency.
#[derive(Debug, Default)]
pub struct StaticResolver {
    known: DashMap<String, String>,
    cache: DashMap<String, String>,
    latency: Duration,
    lookups: AtomicUsize,
}

impl StaticResolver {
    pub fn new(latency: Duration) -> Self {
        Self {
            latency,
            ..Self::default()
        }
    }

    /// Registers a texture that lookups will find.
    pub fn insert(&self, identity: &str, texture: &str) {
        self.known.insert(identity.to_string(), texture.to_string());
    }

    /// Registers a texture that is available without a lookup.
    pub fn insert_cached(&self, identity: &str, texture: &str) {
        self.cache.insert(identity.to_string(), texture.to_string());
    }

    /// Number of lookups started so far.
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl TextureResolver for StaticResolver {
    fn cached(&self, identity: &str) -> Option<String> {
        self.cache.get(identity).map(|texture| texture.clone())
    }

    async fn lookup(&self, identity: &str) -> Result<String, ResolveError> {
        self.lookups.fetch_add(1, Ordering::Relaxed);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        let texture = self
            .known
            .get(identity)
            .map(|texture| texture.clone())
            .ok_or_else(|| ResolveError::NotFound(identity.to_string()))?;
        self.cache.insert(identity.to_string(), texture.clone());
        Ok(texture)
    }
}

//! Per-entity detail resolution and per-card display state.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::{RwLock, Semaphore};
use tokio::task::JoinSet;

use crate::api::CatalogSource;
use crate::error::ApiError;
use crate::model::{EntityDetail, SpriteVariant};

pub const DEFAULT_CONCURRENCY: usize = 12;
pub const SHINY_INTERVAL: Duration = Duration::from_millis(2000);

/// Memoizing detail fetcher with a bound on in-flight requests.
///
/// The cache is keyed by the name the caller asked for, so completions that
/// arrive out of order still land in their own slot. Once a name is cached
/// the entry never changes; a racing second fetch for the same name is
/// discarded in favour of the first write.
pub struct EntityResolver {
    source: Arc<dyn CatalogSource>,
    cache: RwLock<HashMap<String, EntityDetail>>,
    permits: Semaphore,
}

impl EntityResolver {
    pub fn new(source: Arc<dyn CatalogSource>, concurrency: usize) -> Self {
        Self {
            source,
            cache: RwLock::new(HashMap::new()),
            permits: Semaphore::new(concurrency.max(1)),
        }
    }

    pub fn source(&self) -> Arc<dyn CatalogSource> {
        Arc::clone(&self.source)
    }

    pub async fn cached(&self, name: &str) -> Option<EntityDetail> {
        self.cache.read().await.get(name).cloned()
    }

    pub async fn cached_count(&self) -> usize {
        self.cache.read().await.len()
    }

    pub async fn resolve(&self, name: &str) -> Result<EntityDetail, ApiError> {
        if let Some(detail) = self.cached(name).await {
            return Ok(detail);
        }

        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| ApiError::Network("resolver closed".to_string()))?;
        let detail = match self.source.fetch_detail(name).await {
            Ok(detail) => detail,
            Err(error) => {
                tracing::warn!(%name, %error, "detail resolution failed");
                return Err(error);
            }
        };

        let mut cache = self.cache.write().await;
        Ok(cache.entry(name.to_string()).or_insert(detail).clone())
    }
}

/// Result of an eager detail pass. Failures never abort siblings.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Prefetch {
    pub details: Vec<EntityDetail>,
    pub failures: Vec<(String, ApiError)>,
}

/// Resolve every name through `resolver`, sharing its permits and cache with
/// on-demand resolutions. Names already cached are not fetched again.
pub async fn resolve_many(resolver: Arc<EntityResolver>, names: &[String]) -> Prefetch {
    let mut prefetch = Prefetch::default();
    let mut join_set = JoinSet::new();
    for name in names {
        let name = name.clone();
        let resolver = Arc::clone(&resolver);
        join_set.spawn(async move {
            let result = resolver.resolve(&name).await;
            (name, result)
        });
    }

    while let Some(joined) = join_set.join_next().await {
        match joined {
            Ok((_, Ok(detail))) => prefetch.details.push(detail),
            Ok((name, Err(error))) => prefetch.failures.push((name, error)),
            Err(error) => tracing::warn!(%error, "detail prefetch task failed"),
        }
    }
    tracing::info!(
        resolved = prefetch.details.len(),
        failed = prefetch.failures.len(),
        "prefetch finished"
    );
    prefetch
}

/// Display toggles for one visible card.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardState {
    pub shiny: bool,
    pub back: bool,
    elapsed_ms: u64,
}

impl CardState {
    pub fn variant(&self) -> SpriteVariant {
        SpriteVariant {
            back: self.back,
            shiny: self.shiny,
        }
    }

    fn advance(&mut self, elapsed_ms: u64, interval_ms: u64) -> bool {
        self.elapsed_ms += elapsed_ms;
        let mut flipped = false;
        while self.elapsed_ms >= interval_ms {
            self.elapsed_ms -= interval_ms;
            self.shiny = !self.shiny;
            flipped = !flipped;
        }
        flipped
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VisibilityChange {
    pub mounted: Vec<String>,
    pub unmounted: Vec<String>,
}

impl VisibilityChange {
    pub fn is_empty(&self) -> bool {
        self.mounted.is_empty() && self.unmounted.is_empty()
    }
}

/// Card state for the currently visible entities.
///
/// Each card owns its shiny clock, started when the card is mounted and
/// dropped with it when the entity leaves the visible set.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardDeck {
    cards: HashMap<String, CardState>,
    interval_ms: u64,
}

impl Default for CardDeck {
    fn default() -> Self {
        Self::new(SHINY_INTERVAL)
    }
}

impl CardDeck {
    pub fn new(interval: Duration) -> Self {
        Self {
            cards: HashMap::new(),
            interval_ms: (interval.as_millis() as u64).max(1),
        }
    }

    /// Make `visible` the mounted set.
    pub fn sync_visible(&mut self, visible: &[String]) -> VisibilityChange {
        let wanted: HashSet<&str> = visible.iter().map(String::as_str).collect();
        let mut unmounted: Vec<String> = self
            .cards
            .keys()
            .filter(|name| !wanted.contains(name.as_str()))
            .cloned()
            .collect();
        unmounted.sort();
        for name in &unmounted {
            self.cards.remove(name);
        }

        let mut mounted = Vec::new();
        for name in visible {
            if !self.cards.contains_key(name) {
                self.cards.insert(name.clone(), CardState::default());
                mounted.push(name.clone());
            }
        }
        VisibilityChange { mounted, unmounted }
    }

    /// Advance every card clock; true when any card flipped.
    pub fn advance(&mut self, elapsed: Duration) -> bool {
        let elapsed_ms = elapsed.as_millis() as u64;
        let interval_ms = self.interval_ms;
        let mut changed = false;
        for card in self.cards.values_mut() {
            changed |= card.advance(elapsed_ms, interval_ms);
        }
        changed
    }

    pub fn card(&self, name: &str) -> Option<&CardState> {
        self.cards.get(name)
    }

    pub fn is_mounted(&self, name: &str) -> bool {
        self.cards.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn toggle_back(&mut self, name: &str) -> bool {
        match self.cards.get_mut(name) {
            Some(card) => {
                card.back = !card.back;
                true
            }
            None => false,
        }
    }

    /// Back to the front pair; used when a card is re-resolved.
    pub fn reset_swap(&mut self, name: &str) {
        if let Some(card) = self.cards.get_mut(name) {
            card.back = false;
        }
    }
}

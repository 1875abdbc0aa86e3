//! In-memory [`CatalogSource`] for tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use crate::api::CatalogSource;
use crate::error::ApiError;
use crate::model::{EntityDetail, EntitySummary, SpriteSet, TypeSlot};

#[derive(Debug, Default)]
pub struct FakeSource {
    summaries: Vec<EntitySummary>,
    details: HashMap<String, EntityDetail>,
    list_error: Option<ApiError>,
    broken: HashMap<String, ApiError>,
    delay: Option<Duration>,
    detail_calls: AtomicUsize,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl FakeSource {
    pub fn summary(id: u32, name: &str) -> EntitySummary {
        EntitySummary::new(name, format!("https://pokeapi.co/api/v2/pokemon/{id}/"))
    }

    pub fn detail(id: u32, name: &str, types: &[&str]) -> EntityDetail {
        EntityDetail {
            id,
            name: name.to_string(),
            types: types.iter().map(|t| TypeSlot::new(*t)).collect(),
            height: 7,
            weight: 69,
            base_experience: Some(64),
            sprites: SpriteSet {
                front_default: Some(format!("https://img/{id}.png")),
                front_shiny: Some(format!("https://img/shiny/{id}.png")),
                back_default: Some(format!("https://img/back/{id}.png")),
                back_shiny: Some(format!("https://img/back/shiny/{id}.png")),
            },
        }
    }

    /// Adds a detail and its matching summary.
    pub fn with_detail(mut self, detail: EntityDetail) -> Self {
        self.summaries.push(Self::summary(detail.id, &detail.name));
        self.details.insert(detail.name.clone(), detail);
        self
    }

    pub fn with_list_error(mut self, error: ApiError) -> Self {
        self.list_error = Some(error);
        self
    }

    pub fn with_broken(mut self, name: &str, error: ApiError) -> Self {
        self.broken.insert(name.to_string(), error);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn detail_calls(&self) -> usize {
        self.detail_calls.load(Ordering::SeqCst)
    }

    /// Most detail fetches that were ever running at the same time.
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CatalogSource for FakeSource {
    async fn list_summaries(&self, limit: usize) -> Result<Vec<EntitySummary>, ApiError> {
        if let Some(error) = &self.list_error {
            return Err(error.clone());
        }
        Ok(self.summaries.iter().take(limit).cloned().collect())
    }

    async fn fetch_detail(&self, identifier: &str) -> Result<EntityDetail, ApiError> {
        self.detail_calls.fetch_add(1, Ordering::SeqCst);
        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(running, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let result = match self.broken.get(identifier) {
            Some(error) => Err(error.clone()),
            None => self
                .details
                .get(identifier)
                .or_else(|| {
                    self.details
                        .values()
                        .find(|detail| detail.id.to_string() == identifier)
                })
                .cloned()
                .ok_or_else(|| ApiError::NotFound(identifier.to_string())),
        };
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

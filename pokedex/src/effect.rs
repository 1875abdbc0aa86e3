use std::path::PathBuf;
use std::sync::Arc;

use crate::action::Action;
use crate::api::CatalogSource;
use crate::audio;
use crate::resolver::{self, EntityResolver};

#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    LoadCatalog { limit: usize },
    ResolveDetail { name: String },
    CancelDetail { name: String },
    PrefetchDetails { names: Vec<String> },
    PlayMusic { path: PathBuf },
}

// Task bodies for the effects above. Each one turns its outcome into the
// action the reducer expects, so nothing fails past the task boundary.

pub async fn load_catalog(source: Arc<dyn CatalogSource>, limit: usize) -> Action {
    match source.list_summaries(limit).await {
        Ok(summaries) => Action::CatalogDidLoad(summaries),
        Err(error) => {
            tracing::error!(%error, "catalog load failed");
            Action::CatalogDidError(error)
        }
    }
}

pub async fn resolve_detail(resolver: Arc<EntityResolver>, name: String) -> Action {
    match resolver.resolve(&name).await {
        Ok(detail) => Action::DetailDidLoad { name, detail },
        Err(error) => Action::DetailDidError { name, error },
    }
}

pub async fn prefetch_details(resolver: Arc<EntityResolver>, names: Vec<String>) -> Action {
    let prefetch = resolver::resolve_many(resolver, &names).await;
    Action::PrefetchDidLoad {
        details: prefetch.details,
        failures: prefetch.failures,
    }
}

pub async fn play_music(path: PathBuf) -> Action {
    let bytes = match audio::load_track(&path).await {
        Ok(bytes) => bytes,
        Err(error) => return Action::MusicDidError(error),
    };
    match tokio::task::spawn_blocking(move || audio::play_track(bytes)).await {
        Ok(Ok(())) => Action::MusicDidFinish,
        Ok(Err(error)) => Action::MusicDidError(error),
        Err(error) => Action::MusicDidError(error.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use crate::testing::FakeSource;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn listing_failure_becomes_catalog_error() {
        let source = Arc::new(
            FakeSource::default().with_list_error(ApiError::Network("connection refused".into())),
        );
        assert_eq!(
            load_catalog(source, 100).await,
            Action::CatalogDidError(ApiError::Network("connection refused".into()))
        );
    }

    #[tokio::test]
    async fn listing_success_keeps_fetch_order() {
        let source = Arc::new(
            FakeSource::default()
                .with_detail(FakeSource::detail(7, "squirtle", &["water"]))
                .with_detail(FakeSource::detail(1, "bulbasaur", &["grass"])),
        );
        assert_eq!(
            load_catalog(source, 100).await,
            Action::CatalogDidLoad(vec![
                FakeSource::summary(7, "squirtle"),
                FakeSource::summary(1, "bulbasaur"),
            ])
        );
    }

    #[tokio::test]
    async fn detail_outcomes_carry_the_requested_name() {
        let source = Arc::new(
            FakeSource::default().with_detail(FakeSource::detail(4, "charmander", &["fire"])),
        );
        let resolver = Arc::new(EntityResolver::new(source, 2));

        assert_eq!(
            resolve_detail(Arc::clone(&resolver), "charmander".into()).await,
            Action::DetailDidLoad {
                name: "charmander".into(),
                detail: FakeSource::detail(4, "charmander", &["fire"]),
            }
        );
        assert_eq!(
            resolve_detail(resolver, "missingno".into()).await,
            Action::DetailDidError {
                name: "missingno".into(),
                error: ApiError::NotFound("missingno".into()),
            }
        );
    }

    #[tokio::test]
    async fn missing_music_file_is_reported() {
        let action = play_music(PathBuf::from("no/such/theme.mp3")).await;
        assert!(matches!(action, Action::MusicDidError(ref e) if e.contains("theme.mp3")));
    }
}

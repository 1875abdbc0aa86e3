use async_trait::async_trait;
use serde::Deserialize;

use crate::error::ApiError;
use crate::model::{EntityDetail, EntitySummary, SpriteSet, TypeSlot};

pub const API_BASE: &str = "https://pokeapi.co/api/v2";

#[derive(Clone, Debug, Deserialize)]
struct NamedResource {
    name: String,
    url: String,
}

#[derive(Clone, Debug, Deserialize)]
struct ListResponse {
    results: Vec<NamedResource>,
}

#[derive(Clone, Debug, Deserialize)]
struct PokemonResponse {
    id: u32,
    name: String,
    height: u32,
    weight: u32,
    base_experience: Option<u32>,
    types: Vec<TypeSlot>,
    sprites: serde_json::Value,
}

/// Where summaries and details come from.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn list_summaries(&self, limit: usize) -> Result<Vec<EntitySummary>, ApiError>;

    /// `identifier` is a name or a numeric id.
    async fn fetch_detail(&self, identifier: &str) -> Result<EntityDetail, ApiError>;
}

/// HTTP client for the PokeAPI listing and detail endpoints.
#[derive(Clone, Debug)]
pub struct PokeApiClient {
    base: String,
    client: reqwest::Client,
}

impl Default for PokeApiClient {
    fn default() -> Self {
        Self::new(API_BASE)
    }
}

impl PokeApiClient {
    pub fn new(base: impl Into<String>) -> Self {
        let base = base.into().trim_end_matches('/').to_string();
        Self {
            base,
            client: reqwest::Client::new(),
        }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn list_url(&self, limit: usize) -> String {
        format!("{}/pokemon?limit={limit}", self.base)
    }

    pub fn detail_url(&self, identifier: &str) -> String {
        format!("{}/pokemon/{}", self.base, identifier.trim().to_lowercase())
    }

    async fn fetch_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, ApiError> {
        tracing::debug!(url, "GET");
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::from_status(status, url));
        }
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[async_trait]
impl CatalogSource for PokeApiClient {
    async fn list_summaries(&self, limit: usize) -> Result<Vec<EntitySummary>, ApiError> {
        let url = self.list_url(limit);
        let response: ListResponse = self.fetch_json(&url).await?;
        Ok(response
            .results
            .into_iter()
            .map(|entry| EntitySummary::new(entry.name, entry.url))
            .collect())
    }

    async fn fetch_detail(&self, identifier: &str) -> Result<EntityDetail, ApiError> {
        let url = self.detail_url(identifier);
        let response: PokemonResponse = self.fetch_json(&url).await?;
        Ok(detail_from_response(response))
    }
}

fn detail_from_response(response: PokemonResponse) -> EntityDetail {
    let sprites = SpriteSet {
        front_default: pointer_string(&response.sprites, "/front_default"),
        front_shiny: pointer_string(&response.sprites, "/front_shiny"),
        back_default: pointer_string(&response.sprites, "/back_default"),
        back_shiny: pointer_string(&response.sprites, "/back_shiny"),
    };
    EntityDetail {
        id: response.id,
        name: response.name,
        types: response.types,
        height: response.height,
        weight: response.weight,
        base_experience: response.base_experience,
        sprites,
    }
}

fn pointer_string(value: &serde_json::Value, pointer: &str) -> Option<String> {
    value
        .pointer(pointer)
        .and_then(|val| val.as_str())
        .map(|s| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serves one canned response and returns the base URL to hit.
    async fn serve_once(status: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            if let Ok((mut stream, _)) = listener.accept().await {
                let mut buf = [0u8; 1024];
                let _ = stream.read(&mut buf).await;
                let response = format!(
                    "HTTP/1.1 {status}\r\nContent-Length: {}\r\nContent-Type: application/json\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = stream.write_all(response.as_bytes()).await;
            }
        });
        format!("http://{addr}/api/v2")
    }

    #[test]
    fn urls_are_built_from_base() {
        let client = PokeApiClient::new("http://localhost:9000/api/v2/");
        assert_eq!(client.base(), "http://localhost:9000/api/v2");
        assert_eq!(
            client.list_url(100),
            "http://localhost:9000/api/v2/pokemon?limit=100"
        );
        assert_eq!(
            client.detail_url(" Pikachu "),
            "http://localhost:9000/api/v2/pokemon/pikachu"
        );
        assert_eq!(client.detail_url("4"), "http://localhost:9000/api/v2/pokemon/4");
    }

    #[test]
    fn detail_response_decodes_sprites_and_types() {
        let body = r#"{
            "id": 4,
            "name": "charmander",
            "height": 6,
            "weight": 85,
            "base_experience": 62,
            "types": [{"slot": 1, "type": {"name": "fire", "url": "https://pokeapi.co/api/v2/type/10/"}}],
            "sprites": {
                "front_default": "https://img/4.png",
                "front_shiny": "https://img/shiny/4.png",
                "back_default": null,
                "back_shiny": "https://img/back/shiny/4.png",
                "other": {}
            },
            "moves": []
        }"#;
        let response: PokemonResponse = serde_json::from_str(body).unwrap();
        let detail = detail_from_response(response);

        assert_eq!(detail.id, 4);
        assert_eq!(detail.primary_type(), Some("fire"));
        assert_eq!(detail.base_experience, Some(62));
        assert_eq!(detail.sprites.front_default.as_deref(), Some("https://img/4.png"));
        assert_eq!(detail.sprites.back_default, None);
        assert_eq!(
            detail.sprites.back_shiny.as_deref(),
            Some("https://img/back/shiny/4.png")
        );
    }

    #[test]
    fn list_response_keeps_fetch_order() {
        let body = r#"{"count": 2, "next": null, "results": [
            {"name": "squirtle", "url": "u/7/"},
            {"name": "bulbasaur", "url": "u/1/"}
        ]}"#;
        let response: ListResponse = serde_json::from_str(body).unwrap();
        let names: Vec<_> = response.results.into_iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["squirtle", "bulbasaur"]);
    }

    #[tokio::test]
    async fn client_lists_summaries_over_http() {
        let base = serve_once(
            "200 OK",
            r#"{"count": 1, "results": [{"name": "bulbasaur", "url": "https://pokeapi.co/api/v2/pokemon/1/"}]}"#,
        )
        .await;
        let summaries = PokeApiClient::new(base).list_summaries(1).await.unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].name, "bulbasaur");
        assert_eq!(summaries[0].id_from_url(), Some(1));
    }

    #[tokio::test]
    async fn client_maps_missing_entity_to_not_found() {
        let base = serve_once("404 Not Found", "Not Found").await;
        let err = PokeApiClient::new(base).fetch_detail("missingno").await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)), "{err:?}");
    }

    #[tokio::test]
    async fn client_maps_server_error_to_network() {
        let base = serve_once("503 Service Unavailable", "{}").await;
        let err = PokeApiClient::new(base).list_summaries(10).await.unwrap_err();
        assert!(matches!(err, ApiError::Network(_)), "{err:?}");
    }

    #[tokio::test]
    async fn client_maps_malformed_body_to_decode() {
        let base = serve_once("200 OK", r#"{"id": "four", "name": 4}"#).await;
        let err = PokeApiClient::new(base).fetch_detail("charmander").await.unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)), "{err:?}");
    }
}

//! HTTP server wiring for Funnel: configuration, the top-level router, and
//! seed import. The binary in `main.rs` is a thin shell over this crate.

pub mod error;
pub mod seed;

pub use error::{Error, Result};

use std::{path::PathBuf, sync::Arc};

use axum::Router;
use funnel_core::store::CampaignStore;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

// ─── Configuration ───────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `FUNNEL_*` environment variables.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ServerConfig {
  pub host:       String,
  pub port:       u16,
  pub store_path: PathBuf,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:       "127.0.0.1".to_string(),
      port:       8080,
      store_path: PathBuf::from("funnel.db"),
    }
  }
}

impl ServerConfig {
  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// The full application: the JSON API under `/api`, with request tracing.
pub fn app<S>(store: Arc<S>) -> Router
where
  S: CampaignStore + 'static,
{
  Router::new()
    .nest("/api", funnel_api::api_router(store))
    .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
  use axum::{
    body::Body,
    http::{Request, StatusCode},
  };
  use funnel_store_sqlite::SqliteStore;
  use tower::ServiceExt as _;

  use super::*;

  #[tokio::test]
  async fn api_is_nested_under_prefix() {
    let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());

    let req = Request::builder().uri("/api/health").body(Body::empty()).unwrap();
    let resp = app(store.clone()).oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let req = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let resp = app(store).oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }

  #[test]
  fn overrides_win_over_file_values() {
    let settings = config::Config::builder()
      .add_source(config::File::from_str(
        "host = \"0.0.0.0\"\nport = 9000",
        config::FileFormat::Toml,
      ))
      .set_override("port", 9100)
      .unwrap()
      .build()
      .unwrap();
    let cfg: ServerConfig = settings.try_deserialize().unwrap();
    assert_eq!(cfg.address(), "0.0.0.0:9100");
    assert_eq!(cfg.store_path, PathBuf::from("funnel.db"));
  }
}

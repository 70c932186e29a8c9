//! JSON REST API for Funnel campaign tracking.
//!
//! Exposes an axum [`Router`] backed by any [`funnel_core::store::CampaignStore`].
//! Every route is a read; the clock used for classification is taken per
//! request.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", funnel_api::api_router(store.clone()))
//! ```

pub mod campaigns;
pub mod error;

use std::sync::Arc;

use axum::{Json, Router, routing::get};
use funnel_core::store::CampaignStore;
use serde_json::{Value, json};

pub use error::ApiError;

/// Build the API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: CampaignStore + 'static,
{
  Router::new()
    .route("/health", get(health))
    .route("/campaigns", get(campaigns::list::<S>))
    .route("/campaigns/track", get(campaigns::track::<S>))
    .route("/campaigns/overview", get(campaigns::overview::<S>))
    .route("/campaigns/report", get(campaigns::cross_axis::<S>))
    .with_state(store)
}

async fn health() -> Json<Value> { Json(json!({ "status": "ok" })) }

//! Core types and engines for Funnel campaign tracking.
//!
//! This crate is deliberately free of HTTP and database dependencies. Storage
//! backends implement [`store::CampaignStore`]; the transport layer turns raw
//! query strings into [`filter::RawParams`] and calls one of the four engines:
//!
//! - [`listing::list_campaigns`]: record-level paged listing.
//! - [`tracker::track_dashboard`]: per-touch tracker with category facets.
//! - [`overview::overview_stats`]: entity counts and a chart series.
//! - [`report::report`]: distinct-entity counts pivoted on a chosen axis.

#![allow(async_fn_in_trait)]

pub mod error;
pub mod filter;
pub mod listing;
pub mod overview;
pub mod period;
pub mod range;
pub mod record;
pub mod report;
pub mod status;
pub mod store;
pub mod tracker;

pub use error::{Error, Result};

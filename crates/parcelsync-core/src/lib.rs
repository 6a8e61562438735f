//! # Parcelsync Core
//!
//! Incremental extraction engine for shipment-tracking records from the
//! AfterShip REST API.
//!
//! ## Overview
//!
//! This crate provides the core of the connector:
//!
//! - **Page walker** driving strictly sequential, paginated requests
//! - **Replication window** computed from the last persisted bookmark
//! - **Response classifier** with rate-limit and backoff policy
//! - **Canonical domain model** for tracking records
//! - **Trait seams** for the transport and the stream-execution runtime
//!
//! The generic runtime around it — configuration loading, record
//! serialization, bookmark persistence, CLI — is an external collaborator
//! that plugs in through [`RecordSink`] and [`HttpClient`].
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`classify`] | Response classification and backoff policy |
//! | [`config`] | Validated connector configuration |
//! | [`context`] | Per-run extraction state and bookmark tracking |
//! | [`domain`] | Domain models (Tracking, UtcDateTime) |
//! | [`engine`] | Page-walking extraction engine |
//! | [`error`] | Error taxonomy |
//! | [`http`] | HTTP transport abstraction |
//! | [`pacing`] | Proactive request pacing |
//! | [`sink`] | Outbound record/bookmark seam |
//! | [`stream`] | Stream descriptors and envelope projection |
//! | [`window`] | Replication window computation |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use parcelsync_core::{ConnectorConfig, MemorySink, PageWalker, ReqwestHttpClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConnectorConfig::new(std::env::var("AFTERSHIP_API_KEY")?)?
//!         .with_start_date("2024-01-01T00:00:00Z")?;
//!
//!     let mut walker = PageWalker::new(config, Arc::new(ReqwestHttpClient::new()), None);
//!     let mut sink = MemorySink::default();
//!
//!     let summary = walker.run(&mut sink).await?;
//!     println!("{} records over {} pages", summary.records, summary.pages);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────┐
//! │ Runtime (caller) │  config in, records + bookmarks out
//! └────────┬─────────┘
//!          │
//!          ▼
//! ┌──────────────────┐     ┌────────────────────┐
//! │   Page Walker    │────▶│ Replication Window │
//! └────────┬─────────┘     └────────────────────┘
//!          │
//!          ▼
//! ┌──────────────────┐     ┌────────────────────┐
//! │    Classifier    │◀────│ HTTP Client        │
//! │ (retry/backoff)  │     │ (reqwest/offline)  │
//! └────────┬─────────┘     └────────────────────┘
//!          │
//!          ▼
//! ┌──────────────────┐
//! │   RecordSink     │
//! └──────────────────┘
//! ```
//!
//! ## Error Handling
//!
//! All operations return `Result` with structured errors:
//!
//! ```rust
//! use parcelsync_core::ExtractError;
//!
//! fn handle_error(error: ExtractError) {
//!     match error {
//!         ExtractError::Fatal { status, .. } => {
//!             // 4xx: fix the request or credentials, do not retry
//!             let _ = status;
//!         }
//!         ExtractError::RetriesExhausted { .. } => {
//!             // transient upstream trouble; rerun resumes from the bookmark
//!         }
//!         _ => {}
//!     }
//! }
//! ```
//!
//! ## Security
//!
//! - The API key is injected as the `as-api-key` header and never appears in
//!   `Debug` output or logs
//! - All timestamps are normalized to UTC before comparison

pub mod classify;
pub mod config;
pub mod context;
pub mod domain;
pub mod engine;
pub mod error;
pub mod http;
pub mod pacing;
pub mod sink;
pub mod stream;
pub mod window;

// Re-export commonly used types at crate root for convenience

pub use classify::{Backoff, Disposition, RetryPolicy, DEFAULT_MAX_ATTEMPTS, RATE_LIMIT_WAIT};
pub use config::{ConnectorConfig, DEFAULT_API_VERSION, DEFAULT_BASE_URL};
pub use context::ExtractionContext;
pub use domain::{
    CheckpointEvent, CustomFields, EstimatedDelivery, NextCourier, Tracking, TrackingCheckpoint,
    UtcDateTime,
};
pub use engine::{PageWalker, RunSummary};
pub use error::{ConfigError, ExtractError};
pub use http::{
    HttpAuth, HttpClient, HttpError, HttpRequest, HttpResponse, NoopHttpClient, ReqwestHttpClient,
    API_KEY_HEADER,
};
pub use pacing::{RequestPacer, DEFAULT_REQUESTS_PER_SECOND};
pub use sink::{MemorySink, RecordSink, SinkError};
pub use stream::StreamDescriptor;
pub use window::{ReplicationWindow, WindowBounds, DEFAULT_PAGE_SIZE};

//! # Transfer Verifier SDK
//!
//! Numeric normalization and bounded-memory aggregation for cross-chain transfer
//! verification. Token amounts observed on different chains are reduced to a
//! canonical 8-decimal precision and folded into capped, self-trimming running
//! totals per bridged asset, so a downstream detector can compare what flowed into
//! the bridge with what flowed out without unbounded memory growth.
//!
//! ## Architecture
//!
//! ### Normalization Layer
//! Arbitrary-precision conversion between native token decimals and the canonical
//! 8-decimal representation (lossy above 8 decimals, by protocol convention).
//!
//! ### Aggregation Layer
//! A capacity-limited cache with batch eviction, an accumulator that upserts
//! normalized amounts per `(origin address, origin chain)` key, and a ledger that
//! pairs inbound and outbound accumulators.
//!
//! ### Boundary Validation
//! Chain-ID allow-list checks and typed JSON-path extraction from RPC responses.
//!
//! ### Service
//! A tokio task that owns a ledger exclusively and trims it periodically.
//!
//! None of the aggregation types synchronize internally; either keep them on one
//! task or go through [`ledger_service`].

// Core Types
/// Chain identifiers and the verifier allow-list
pub mod chains;
/// Asset keys, transfer records and conversions
pub mod types;

// Normalization Layer
/// Canonical 8-decimal normalization
pub mod normalization;

// Aggregation Layer
/// Bounded cache with batch eviction
pub mod cache;
/// Eviction victim selection strategies
pub mod eviction;
/// Per-asset running totals (upsert)
pub mod accumulator;
/// Inbound/outbound flow ledger
pub mod flow_ledger;

// Boundary Validation
/// Typed JSON-path extraction
pub mod json_path;

// Infrastructure
/// Single-task ledger owner
pub mod ledger_service;
/// Metrics and observability
pub mod metrics;

// Settings & Configuration
/// Configuration management
pub mod settings;

// Re-exports for convenience
pub use accumulator::{upsert, AggregationCache, AssetAccumulator, UpsertError};
pub use cache::{trim_cache, BoundedCache, CacheError, CacheLimits};
pub use chains::{validate_chains, ChainId, ChainValidationError};
pub use flow_ledger::{FlowLedger, FlowSnapshot};
pub use normalization::{denormalize, normalize};
pub use settings::Settings;
pub use types::{AssetKey, FlowDirection, FlowEvent, TransferRecord};

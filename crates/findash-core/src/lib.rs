//! Core ingestion pipeline for findash.
//!
//! This crate contains:
//! - Canonical domain models and validation
//! - The FMP statement source and its transport
//! - Normalization from raw provider payloads to statement records
//! - Rate gating and refresh orchestration
//! - The typed read surface over the statement store

pub mod config;
pub mod domain;
pub mod error;
pub mod fmp;
pub mod http;
pub mod ingest;
pub mod normalize;
pub mod read;
pub mod retry;
pub mod source;
pub mod throttle;

pub use config::{FmpConfig, IngestConfig, ProviderPolicy, DEFAULT_FMP_BASE_URL, FMP_API_KEY_ENV};
pub use domain::{
    now_rfc3339, FiscalPeriod, PeriodRange, StatementRecord, StatementType, Symbol,
};
pub use error::{ConfigError, FetchError, FetchErrorKind, ValidationError};
pub use findash_store::{
    CoverageRow, Provenance, RefreshStatus, Registry, StatementRow, Store, StoreConfig,
    StoreError, TickerRow, DEFAULT_SEED, STATEMENT_TABLES,
};
pub use fmp::FmpClient;
pub use http::{HttpClient, HttpError, HttpRequest, HttpResponse, NoopHttpClient, ReqwestHttpClient};
pub use ingest::{BatchReport, IngestError, Ingestor, TickerOutcome, TickerStatus};
pub use normalize::{MalformedReason, MalformedRecord, NormalizedBatch, Normalizer};
pub use read::{ReadError, StatementReader};
pub use retry::{Backoff, RetryConfig};
pub use source::{RawPeriod, StatementSource};
pub use throttle::RateGate;

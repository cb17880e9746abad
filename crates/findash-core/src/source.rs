//! Statement source contract.

use std::future::Future;
use std::pin::Pin;

use serde_json::{Map, Value};

use crate::domain::{StatementType, Symbol};
use crate::error::FetchError;

/// One raw reporting period exactly as the provider returned it: a JSON
/// object with provider-specific field names. The normalizer turns these
/// into [`crate::StatementRecord`]s.
pub type RawPeriod = Map<String, Value>;

/// A provider of raw statement data, keyed by ticker and statement type.
///
/// Implementations perform no persistence and no normalization; they fetch,
/// classify failures into [`FetchError`], and hand the payload back.
pub trait StatementSource: Send + Sync {
    fn fetch<'a>(
        &'a self,
        symbol: &'a Symbol,
        statement: StatementType,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<RawPeriod>, FetchError>> + Send + 'a>>;
}

//! Refresh orchestration: fetch, normalize and store statements for a set
//! of tickers.
//!
//! One ticker's failure never aborts the others. A provider rate limit arms
//! the shared cooldown latch; the batch waits it out once, and if the
//! provider pushes back again the remaining work is reported as not
//! attempted instead of waiting indefinitely. Only a store failure halts
//! the batch, because continuing would silently drop fetched data.

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use findash_store::{Store, StoreError};

use crate::config::IngestConfig;
use crate::domain::{now_rfc3339, StatementType, Symbol};
use crate::error::{FetchError, FetchErrorKind};
use crate::normalize::Normalizer;
use crate::source::{RawPeriod, StatementSource};
use crate::throttle::RateGate;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Final state of one ticker within a refresh batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TickerStatus {
    /// Every requested statement type was fetched and stored in full.
    Refreshed,
    /// Something was stored, but a statement type failed or malformed
    /// records were skipped.
    Partial,
    /// Nothing was stored for this ticker.
    Failed,
    /// The batch gave up before reaching this ticker.
    NotAttempted,
}

#[derive(Debug, Clone, Serialize)]
pub struct TickerOutcome {
    pub symbol: Symbol,
    pub status: TickerStatus,
    /// Documents written across all statement types.
    pub written: usize,
    /// Malformed provider records skipped during normalization.
    pub skipped: usize,
    /// First error encountered for this ticker, if any.
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BatchReport {
    pub request_id: String,
    pub started_at: String,
    pub finished_at: String,
    pub outcomes: Vec<TickerOutcome>,
}

impl BatchReport {
    pub fn refreshed(&self) -> usize {
        self.count(TickerStatus::Refreshed)
    }

    pub fn failed(&self) -> usize {
        self.count(TickerStatus::Failed)
    }

    pub fn not_attempted(&self) -> usize {
        self.count(TickerStatus::NotAttempted)
    }

    fn count(&self, status: TickerStatus) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| outcome.status == status)
            .count()
    }
}

/// What became of one (ticker, statement type) fetch.
enum FetchResolution {
    Fetched(Vec<RawPeriod>),
    Failed(FetchError),
    /// The cooldown budget is spent; stop issuing provider calls.
    Abandoned(FetchError),
}

pub struct Ingestor {
    source: Arc<dyn StatementSource>,
    store: Store,
    normalizer: Normalizer,
    gate: RateGate,
    config: IngestConfig,
}

impl Ingestor {
    pub fn new(source: Arc<dyn StatementSource>, store: Store, config: IngestConfig) -> Self {
        let gate = RateGate::from_policy(&config.policy);
        Self {
            source,
            store,
            normalizer: Normalizer::new(),
            gate,
            config,
        }
    }

    /// Refresh `statements` for every ticker in `symbols`, in order.
    ///
    /// Returns one outcome per ticker. Fetch and normalization failures are
    /// contained per ticker; a store failure aborts the batch.
    pub async fn refresh(
        &self,
        symbols: &[Symbol],
        statements: &[StatementType],
    ) -> Result<BatchReport, IngestError> {
        let request_id = Uuid::new_v4().to_string();
        let started_at = now_rfc3339();
        log::info!(
            "refresh {request_id}: {} ticker(s), {} statement type(s)",
            symbols.len(),
            statements.len()
        );

        let mut outcomes = Vec::with_capacity(symbols.len());
        let mut cooldowns_used = 0u32;
        let mut abandoned = false;

        for symbol in symbols {
            if abandoned {
                outcomes.push(TickerOutcome {
                    symbol: symbol.clone(),
                    status: TickerStatus::NotAttempted,
                    written: 0,
                    skipped: 0,
                    error: None,
                });
                continue;
            }

            let outcome = self
                .refresh_ticker(
                    &request_id,
                    symbol,
                    statements,
                    &mut cooldowns_used,
                    &mut abandoned,
                )
                .await?;
            log::info!(
                "refresh {request_id}: {symbol} {:?}, {} written, {} skipped",
                outcome.status,
                outcome.written,
                outcome.skipped
            );
            outcomes.push(outcome);
        }

        Ok(BatchReport {
            request_id,
            started_at,
            finished_at: now_rfc3339(),
            outcomes,
        })
    }

    async fn refresh_ticker(
        &self,
        request_id: &str,
        symbol: &Symbol,
        statements: &[StatementType],
        cooldowns_used: &mut u32,
        abandoned: &mut bool,
    ) -> Result<TickerOutcome, IngestError> {
        let mut written = 0;
        let mut skipped = 0;
        let mut stored = 0;
        let mut failures = 0;
        let mut first_error: Option<String> = None;

        for statement in statements {
            if *abandoned {
                failures += 1;
                continue;
            }

            match self.fetch_gated(symbol, *statement, cooldowns_used).await {
                FetchResolution::Fetched(raw) => {
                    let batch = self.normalizer.normalize(symbol, *statement, raw);
                    skipped += batch.skipped.len();

                    let mut rows = Vec::with_capacity(batch.records.len());
                    for record in &batch.records {
                        match record.to_row() {
                            Ok(row) => rows.push(row),
                            Err(error) => {
                                // serde_json can't fail on a f64 map; treat
                                // it like any other malformed record.
                                log::warn!("{symbol} {statement}: unserializable record: {error}");
                                skipped += 1;
                            }
                        }
                    }

                    self.store
                        .upsert_statements(request_id, statement.as_str(), &rows)?;
                    written += rows.len();
                    stored += 1;
                }
                FetchResolution::Failed(error) => {
                    log::warn!("{symbol} {statement}: {error}");
                    failures += 1;
                    first_error.get_or_insert_with(|| error.to_string());
                }
                FetchResolution::Abandoned(error) => {
                    log::warn!(
                        "{symbol} {statement}: {error}; cooldown budget spent, abandoning batch"
                    );
                    *abandoned = true;
                    failures += 1;
                    first_error.get_or_insert_with(|| error.to_string());
                }
            }
        }

        let status = if stored == 0 && failures > 0 {
            TickerStatus::Failed
        } else if failures > 0 || skipped > 0 {
            TickerStatus::Partial
        } else {
            TickerStatus::Refreshed
        };

        Ok(TickerOutcome {
            symbol: symbol.clone(),
            status,
            written,
            skipped,
            error: first_error,
        })
    }

    /// One gated fetch. Waits for the rate gate by sleeping, never by
    /// spinning; a provider rate limit arms the cooldown latch and retries
    /// after it, up to the batch's cooldown budget.
    async fn fetch_gated(
        &self,
        symbol: &Symbol,
        statement: StatementType,
        cooldowns_used: &mut u32,
    ) -> FetchResolution {
        loop {
            while let Err(wait) = self.gate.check() {
                log::debug!(
                    "{symbol} {statement}: rate gate closed, sleeping {:.2}s",
                    wait.as_secs_f64()
                );
                tokio::time::sleep(wait).await;
            }

            match self.source.fetch(symbol, statement).await {
                Ok(raw) => return FetchResolution::Fetched(raw),
                Err(error) if error.kind() == FetchErrorKind::RateLimited => {
                    self.gate.note_rate_limited();
                    if *cooldowns_used >= self.config.max_cooldowns_per_batch {
                        return FetchResolution::Abandoned(error);
                    }
                    *cooldowns_used += 1;
                    log::warn!(
                        "{symbol} {statement}: provider rate limit, cooling down {:.0}s \
                         ({cooldowns_used} of {} for this batch)",
                        self.gate.cooldown().as_secs_f64(),
                        self.config.max_cooldowns_per_batch
                    );
                }
                Err(error) => return FetchResolution::Failed(error),
            }
        }
    }
}

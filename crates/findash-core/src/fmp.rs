//! Financial Modeling Prep statement fetcher.
//!
//! One GET per (ticker, statement type):
//! `{base_url}/{statement-path}/{symbol}?apikey=…`, answered with a JSON
//! array of reporting periods. Failures are classified into the fetch error
//! taxonomy; only `RemoteUnavailable` is retried, exactly once by default.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde_json::Value;

use crate::config::FmpConfig;
use crate::domain::{StatementType, Symbol};
use crate::error::FetchError;
use crate::http::{HttpClient, HttpRequest, HttpResponse, ReqwestHttpClient};
use crate::source::{RawPeriod, StatementSource};

#[derive(Clone)]
pub struct FmpClient {
    config: FmpConfig,
    http: Arc<dyn HttpClient>,
}

impl FmpClient {
    pub fn new(config: FmpConfig, http: Arc<dyn HttpClient>) -> Self {
        Self { config, http }
    }

    pub fn with_default_transport(config: FmpConfig) -> Self {
        Self::new(config, Arc::new(ReqwestHttpClient::new()))
    }

    pub async fn fetch_statement(
        &self,
        symbol: &Symbol,
        statement: StatementType,
    ) -> Result<Vec<RawPeriod>, FetchError> {
        let mut attempt = 0;
        loop {
            match self.fetch_once(symbol, statement).await {
                Ok(periods) => return Ok(periods),
                Err(error) if error.retryable() && attempt < self.config.retry.max_retries => {
                    let delay = self.config.retry.backoff.delay(attempt);
                    log::warn!(
                        "{symbol} {statement}: {error}; retrying in {:.2}s",
                        delay.as_secs_f64()
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(error) => return Err(error),
            }
        }
    }

    async fn fetch_once(
        &self,
        symbol: &Symbol,
        statement: StatementType,
    ) -> Result<Vec<RawPeriod>, FetchError> {
        let endpoint = self.endpoint(symbol, statement);
        log::debug!("GET {endpoint}");

        let request = HttpRequest::get(self.authenticated(&endpoint))
            .with_timeout_ms(self.config.timeout_ms);
        let response = self.http.execute(request).await.map_err(|error| {
            FetchError::remote_unavailable(format!(
                "fmp transport error: {}",
                self.redact(error.message())
            ))
            .with_retryable(error.retryable())
        })?;

        self.classify(symbol, statement, response)
    }

    fn endpoint(&self, symbol: &Symbol, statement: StatementType) -> String {
        format!(
            "{}/{}/{}",
            self.config.base_url.trim_end_matches('/'),
            statement.api_path(),
            urlencoding::encode(symbol.as_str()),
        )
    }

    fn authenticated(&self, endpoint: &str) -> String {
        format!("{endpoint}?apikey={}", self.config.api_key)
    }

    /// Strip the API key out of anything destined for logs or errors.
    fn redact(&self, message: &str) -> String {
        if self.config.api_key.is_empty() {
            message.to_string()
        } else {
            message.replace(self.config.api_key.as_str(), "<redacted>")
        }
    }

    fn classify(
        &self,
        symbol: &Symbol,
        statement: StatementType,
        response: HttpResponse,
    ) -> Result<Vec<RawPeriod>, FetchError> {
        match response.status {
            429 => {
                return Err(FetchError::rate_limited(format!(
                    "fmp rate limit hit while fetching {symbol} {statement}"
                )))
            }
            404 => {
                return Err(FetchError::not_found(format!(
                    "fmp has no {statement} endpoint data for {symbol}"
                )))
            }
            401 | 403 => {
                return Err(FetchError::remote_unavailable(format!(
                    "fmp rejected the request with status {}; check the API key",
                    response.status
                ))
                .with_retryable(false))
            }
            status if !response.is_success() => {
                // 5xx stays retryable; other client errors are final.
                return Err(FetchError::remote_unavailable(format!(
                    "fmp returned status {status} for {symbol} {statement}"
                ))
                .with_retryable(status >= 500));
            }
            _ => {}
        }

        let body: Value = serde_json::from_str(&response.body).map_err(|error| {
            FetchError::malformed_payload(format!(
                "fmp returned non-JSON body for {symbol} {statement}: {error}"
            ))
        })?;

        match body {
            Value::Array(items) => {
                if items.is_empty() {
                    return Err(FetchError::not_found(format!(
                        "fmp returned no {statement} data for {symbol}"
                    )));
                }
                let mut periods = Vec::with_capacity(items.len());
                for item in items {
                    match item {
                        Value::Object(map) => periods.push(map),
                        other => {
                            return Err(FetchError::malformed_payload(format!(
                                "fmp {statement} payload for {symbol} contains a non-object entry: {other}"
                            )))
                        }
                    }
                }
                Ok(periods)
            }
            // FMP signals both unknown tickers and exhausted quotas with an
            // "Error Message" object instead of an HTTP error status.
            Value::Object(map) => match map.get("Error Message").and_then(Value::as_str) {
                Some(message) if message.to_ascii_lowercase().contains("limit") => Err(
                    FetchError::rate_limited(format!("fmp quota exhausted: {}", self.redact(message))),
                ),
                Some(message) => Err(FetchError::not_found(format!(
                    "fmp error for {symbol} {statement}: {}",
                    self.redact(message)
                ))),
                None => Err(FetchError::malformed_payload(format!(
                    "fmp returned an unexpected object for {symbol} {statement}"
                ))),
            },
            other => Err(FetchError::malformed_payload(format!(
                "fmp returned an unexpected {} for {symbol} {statement}",
                json_type_name(&other)
            ))),
        }
    }
}

impl StatementSource for FmpClient {
    fn fetch<'a>(
        &'a self,
        symbol: &'a Symbol,
        statement: StatementType,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<RawPeriod>, FetchError>> + Send + 'a>> {
        Box::pin(self.fetch_statement(symbol, statement))
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::time::Duration;

    use super::*;
    use crate::error::FetchErrorKind;
    use crate::http::HttpError;
    use crate::retry::RetryConfig;

    /// Replays a scripted sequence of transport results and counts calls.
    struct ScriptedHttpClient {
        responses: Mutex<VecDeque<Result<HttpResponse, HttpError>>>,
        calls: Mutex<usize>,
    }

    impl ScriptedHttpClient {
        fn new(responses: Vec<Result<HttpResponse, HttpError>>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses.into()),
                calls: Mutex::new(0),
            })
        }

        fn calls(&self) -> usize {
            *self.calls.lock().expect("calls mutex")
        }
    }

    impl HttpClient for ScriptedHttpClient {
        fn execute<'a>(
            &'a self,
            _request: HttpRequest,
        ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
            Box::pin(async move {
                *self.calls.lock().expect("calls mutex") += 1;
                self.responses
                    .lock()
                    .expect("responses mutex")
                    .pop_front()
                    .unwrap_or_else(|| Ok(HttpResponse::ok_json("[]")))
            })
        }
    }

    fn client_with(
        responses: Vec<Result<HttpResponse, HttpError>>,
    ) -> (FmpClient, Arc<ScriptedHttpClient>) {
        let http = ScriptedHttpClient::new(responses);
        let config = FmpConfig::new("test-key")
            .with_retry(RetryConfig::fixed(Duration::from_millis(1), 1));
        (FmpClient::new(config, http.clone()), http)
    }

    fn aapl() -> Symbol {
        Symbol::parse("AAPL").expect("symbol")
    }

    #[tokio::test]
    async fn parses_an_array_of_periods() {
        let (client, http) = client_with(vec![Ok(HttpResponse::ok_json(
            r#"[{"symbol":"AAPL","date":"2023-09-30","revenue":383285000000}]"#,
        ))]);

        let periods = client
            .fetch_statement(&aapl(), StatementType::Income)
            .await
            .expect("fetch should succeed");
        assert_eq!(periods.len(), 1);
        assert_eq!(
            periods[0].get("date").and_then(Value::as_str),
            Some("2023-09-30")
        );
        assert_eq!(http.calls(), 1);
    }

    #[tokio::test]
    async fn retries_a_server_error_exactly_once() {
        let (client, http) = client_with(vec![
            Ok(HttpResponse {
                status: 503,
                body: String::new(),
            }),
            Ok(HttpResponse::ok_json(
                r#"[{"symbol":"AAPL","date":"2023-09-30","revenue":1.0}]"#,
            )),
        ]);

        let periods = client
            .fetch_statement(&aapl(), StatementType::Income)
            .await
            .expect("second attempt should succeed");
        assert_eq!(periods.len(), 1);
        assert_eq!(http.calls(), 2);
    }

    #[tokio::test]
    async fn does_not_retry_a_rate_limit() {
        let (client, http) = client_with(vec![Ok(HttpResponse {
            status: 429,
            body: String::new(),
        })]);

        let error = client
            .fetch_statement(&aapl(), StatementType::Income)
            .await
            .expect_err("must fail");
        assert_eq!(error.kind(), FetchErrorKind::RateLimited);
        assert_eq!(http.calls(), 1, "rate limits are surfaced, not retried");
    }

    #[tokio::test]
    async fn empty_array_means_unknown_ticker() {
        let (client, _http) = client_with(vec![Ok(HttpResponse::ok_json("[]"))]);

        let error = client
            .fetch_statement(&aapl(), StatementType::Profile)
            .await
            .expect_err("must fail");
        assert_eq!(error.kind(), FetchErrorKind::NotFound);
    }

    #[tokio::test]
    async fn error_message_body_maps_to_not_found_or_rate_limit() {
        let (client, _http) = client_with(vec![
            Ok(HttpResponse::ok_json(
                r#"{"Error Message":"Invalid API KEY or symbol"}"#,
            )),
            Ok(HttpResponse::ok_json(
                r#"{"Error Message":"Limit Reach. Please upgrade your plan"}"#,
            )),
        ]);

        let first = client
            .fetch_statement(&aapl(), StatementType::Income)
            .await
            .expect_err("must fail");
        assert_eq!(first.kind(), FetchErrorKind::NotFound);

        let second = client
            .fetch_statement(&aapl(), StatementType::Income)
            .await
            .expect_err("must fail");
        assert_eq!(second.kind(), FetchErrorKind::RateLimited);
    }

    #[tokio::test]
    async fn transport_errors_never_leak_the_api_key() {
        let (client, _http) = client_with(vec![Err(HttpError::non_retryable(
            "request failed: https://financialmodelingprep.com/api/v3/profile/AAPL?apikey=test-key",
        ))]);

        let error = client
            .fetch_statement(&aapl(), StatementType::Profile)
            .await
            .expect_err("must fail");
        assert!(!error.message().contains("test-key"));
        assert!(error.message().contains("<redacted>"));
    }
}

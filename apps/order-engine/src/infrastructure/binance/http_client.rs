//! Signed HTTP client for the Binance futures REST API.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, Method, header};
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::config::BinanceConfig;
use super::signer::{RequestSigner, build_query_string};
use crate::application::ports::{
    AccountInfo, ApiError, AssetBalance, ExchangeError, ExchangeInfo, ExchangePort, PositionRisk,
    ServerTime, TickerPrice,
};
use crate::domain::symbol::Symbol;

/// HTTP client for the Binance futures API.
///
/// Signed calls get a millisecond `timestamp` and a `recvWindow` injected
/// when absent, then an HMAC-SHA256 `signature` over the canonical query
/// string. No call is ever retried here: the pipeline's contract is
/// at-most-one HTTP request per invocation.
#[derive(Debug, Clone)]
pub struct BinanceHttpClient {
    client: Client,
    config: BinanceConfig,
    signer: RequestSigner,
}

impl BinanceHttpClient {
    /// Create a new client from config.
    ///
    /// # Errors
    ///
    /// Returns [`ExchangeError::Network`] if the underlying HTTP client
    /// cannot be constructed.
    pub fn new(config: BinanceConfig) -> Result<Self, ExchangeError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ExchangeError::Network(e.to_string()))?;
        let signer = RequestSigner::new(config.api_secret.clone());

        Ok(Self {
            client,
            config,
            signer,
        })
    }

    /// Perform one request and classify the response.
    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        signed: bool,
        mut params: Vec<(String, String)>,
    ) -> Result<T, ExchangeError> {
        if signed {
            if !params.iter().any(|(k, _)| k == "recvWindow") {
                params.push((
                    "recvWindow".to_string(),
                    self.config.recv_window.to_string(),
                ));
            }
            if !params.iter().any(|(k, _)| k == "timestamp") {
                params.push((
                    "timestamp".to_string(),
                    Utc::now().timestamp_millis().to_string(),
                ));
            }
            self.signer.sign(&mut params);
        }

        let url = format!("{}{}", self.config.base_url, path);
        let query = build_query_string(&params);
        tracing::debug!(%method, path, signed, "Exchange request");

        let builder = if method == Method::GET {
            let full_url = if query.is_empty() {
                url
            } else {
                format!("{url}?{query}")
            };
            self.client.get(full_url)
        } else {
            // Binance takes non-GET parameters as a form body; the signature
            // covers the exact string sent.
            self.client
                .request(method, url)
                .header(
                    header::CONTENT_TYPE,
                    "application/x-www-form-urlencoded",
                )
                .body(query)
        };

        let response = builder
            .header("X-MBX-APIKEY", &self.config.api_key)
            .send()
            .await
            .map_err(|e| ExchangeError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| ExchangeError::Network(e.to_string()))?;

        let data = classify(status, &body)?;
        serde_json::from_value(data).map_err(|e| ExchangeError::Parse(e.to_string()))
    }
}

/// Classify a response body.
///
/// HTTP status >= 400, or a parsed body carrying a negative numeric
/// `code`, is an API error; a body that fails to parse as JSON is wrapped
/// as a raw-text value rather than raised.
fn classify(status: u16, body: &str) -> Result<Value, ExchangeError> {
    let data: Value =
        serde_json::from_str(body).unwrap_or_else(|_| serde_json::json!({ "raw": body }));
    let code = data.get("code").and_then(Value::as_i64);

    if status >= 400 || code.is_some_and(|c| c < 0) {
        let message = data
            .get("msg")
            .and_then(Value::as_str)
            .map_or_else(|| body.to_string(), ToString::to_string);
        tracing::error!(status, code, %message, "Exchange REST error");
        return Err(ExchangeError::Api(ApiError {
            status,
            code,
            message,
            body: body.to_string(),
        }));
    }

    Ok(data)
}

#[async_trait]
impl ExchangePort for BinanceHttpClient {
    async fn ping(&self) -> Result<(), ExchangeError> {
        let _: Value = self
            .request(Method::GET, "/fapi/v1/ping", false, Vec::new())
            .await?;
        Ok(())
    }

    async fn server_time(&self) -> Result<ServerTime, ExchangeError> {
        self.request(Method::GET, "/fapi/v1/time", false, Vec::new())
            .await
    }

    async fn exchange_info(&self) -> Result<ExchangeInfo, ExchangeError> {
        self.request(Method::GET, "/fapi/v1/exchangeInfo", false, Vec::new())
            .await
    }

    async fn place_order(
        &self,
        params: &[(String, String)],
    ) -> Result<Value, ExchangeError> {
        self.request(Method::POST, "/fapi/v1/order", true, params.to_vec())
            .await
    }

    async fn account_balance(&self) -> Result<Vec<AssetBalance>, ExchangeError> {
        self.request(Method::GET, "/fapi/v2/balance", true, Vec::new())
            .await
    }

    async fn account(&self) -> Result<AccountInfo, ExchangeError> {
        self.request(Method::GET, "/fapi/v2/account", true, Vec::new())
            .await
    }

    async fn position_risk(&self) -> Result<Vec<PositionRisk>, ExchangeError> {
        self.request(Method::GET, "/fapi/v2/positionRisk", true, Vec::new())
            .await
    }

    async fn ticker_price(&self, symbol: &Symbol) -> Result<TickerPrice, ExchangeError> {
        self.request(
            Method::GET,
            "/fapi/v1/ticker/price",
            false,
            vec![("symbol".to_string(), symbol.as_str().to_string())],
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_success_returns_body() {
        let data = classify(200, r#"{"orderId": 42, "status": "NEW"}"#).unwrap();
        assert_eq!(data["orderId"], 42);
    }

    #[test]
    fn classify_http_error_with_code() {
        let body = r#"{"code":-2010,"msg":"Account has insufficient balance for requested action."}"#;
        let err = classify(400, body).unwrap_err();
        match err {
            ExchangeError::Api(api) => {
                assert_eq!(api.status, 400);
                assert_eq!(api.code, Some(-2010));
                assert!(api.message.contains("insufficient balance"));
                assert_eq!(api.body, body);
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[test]
    fn classify_negative_code_with_ok_status() {
        // Binance sometimes reports errors with HTTP 200 and a negative code.
        let err = classify(200, r#"{"code":-1121,"msg":"Invalid symbol."}"#).unwrap_err();
        assert_eq!(err.code(), Some(-1121));
    }

    #[test]
    fn classify_positive_code_is_not_an_error() {
        assert!(classify(200, r#"{"code":200,"msg":"ok"}"#).is_ok());
    }

    #[test]
    fn classify_unparsable_success_body_wraps_as_raw() {
        let data = classify(200, "pong").unwrap();
        assert_eq!(data["raw"], "pong");
    }

    #[test]
    fn classify_unparsable_error_body_keeps_text() {
        let err = classify(502, "Bad Gateway").unwrap_err();
        match err {
            ExchangeError::Api(api) => {
                assert_eq!(api.status, 502);
                assert_eq!(api.code, None);
                assert_eq!(api.message, "Bad Gateway");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[test]
    fn client_construction() {
        let config = BinanceConfig::new("key", "secret", "http://localhost:1234");
        assert!(BinanceHttpClient::new(config).is_ok());
    }
}

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::cache::Cache;
use crate::currency_provider::CurrencyRateProvider;
use crate::price_provider::{PriceProvider, PriceResult};

// YahooFinanceProvider implementation for PriceProvider
pub struct YahooFinanceProvider {
    base_url: String,
    cache: Arc<Cache<String, PriceResult>>,
}

impl YahooFinanceProvider {
    pub fn new(base_url: &str, cache: Arc<Cache<String, PriceResult>>) -> Self {
        YahooFinanceProvider {
            base_url: base_url.to_string(),
            cache,
        }
    }
}

#[derive(Deserialize, Debug)]
struct YahooPriceResponse {
    chart: PriceChartResult,
}

#[derive(Deserialize, Debug)]
struct PriceChartResult {
    result: Vec<PriceChartItem>,
}

#[derive(Deserialize, Debug)]
struct PriceChartItem {
    meta: PriceChartMeta,
}

#[derive(Deserialize, Debug)]
struct PriceChartMeta {
    #[serde(alias = "regularMarketPrice")]
    regular_market_price: f64,
    currency: String,
}

#[async_trait]
impl PriceProvider for YahooFinanceProvider {
    #[instrument(
        name = "YahooPriceFetch",
        skip(self),
        fields(ticker = %ticker)
    )]
    async fn fetch_price(&self, ticker: &str) -> Result<PriceResult> {
        if let Some(cached) = self.cache.get(&ticker.to_string()).await {
            return Ok(cached);
        }

        let url = format!("{}/v8/finance/chart/{}?interval=1d", self.base_url, ticker);
        debug!("Requesting price data from {}", url);

        let client = reqwest::Client::builder().user_agent("nwt/1.0").build()?;
        let response = client
            .get(&url)
            .send()
            .await
            .map_err(|e| anyhow!("Request error: {} for ticker: {} URL: {}", e, ticker, url))?;

        debug!(response = ?response, "Received Yahoo response");

        let data = response.json::<YahooPriceResponse>().await?;
        let item = data
            .chart
            .result
            .first()
            .ok_or_else(|| anyhow!("No price data found for ticker: {}", ticker))?;

        let result = PriceResult {
            price: item.meta.regular_market_price,
            currency: item.meta.currency.clone(),
        };

        self.cache.put(ticker.to_string(), result.clone()).await;

        Ok(result)
    }
}

// YahooCurrencyProvider implementation for CurrencyRateProvider
pub struct YahooCurrencyProvider {
    base_url: String,
    cache: Arc<Cache<String, f64>>,
}

impl YahooCurrencyProvider {
    pub fn new(base_url: &str, cache: Arc<Cache<String, f64>>) -> Self {
        YahooCurrencyProvider {
            base_url: base_url.to_string(),
            cache,
        }
    }
}

#[derive(Debug, Deserialize)]
struct YahooCurrencyResponse {
    chart: CurrencyChartResult,
}

#[derive(Debug, Deserialize)]
struct CurrencyChartResult {
    result: Vec<CurrencyChartItem>,
}

#[derive(Debug, Deserialize)]
struct CurrencyChartItem {
    meta: CurrencyChartMeta,
}

#[derive(Debug, Deserialize)]
struct CurrencyChartMeta {
    #[serde(alias = "regularMarketPrice")]
    regular_market_price: f64,
}

#[async_trait]
impl CurrencyRateProvider for YahooCurrencyProvider {
    async fn get_rate(&self, from: &str, to: &str) -> Result<f64> {
        let symbol = format!("{from}{to}=X");
        if let Some(cached) = self.cache.get(&symbol).await {
            return Ok(cached);
        }

        let endpoint = format!("/v8/finance/chart/{symbol}");
        let url = format!("{}{}", self.base_url, endpoint);
        debug!("Requesting currency rate from {}", url);

        let client = reqwest::Client::builder().user_agent("nwt/1.0").build()?;

        let response = client
            .get(&url)
            .send()
            .await
            .map_err(|e| anyhow!("Request error: {} for currency pair: {}", e, symbol))?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "HTTP error: {} for currency pair: {}",
                response.status(),
                symbol
            ));
        }

        let text = response.text().await?;

        let data: YahooCurrencyResponse = serde_json::from_str(&text)
            .map_err(|e| anyhow!("Failed to parse JSON response for {}: {}", symbol, e))?;

        let item = data
            .chart
            .result
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("No rate data found for currency pair: {}", symbol))?;

        let rate = item.meta.regular_market_price;
        self.cache.put(symbol, rate).await;
        Ok(rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    pub async fn create_mock_server(ticker: &str, mock_response: &str) -> wiremock::MockServer {
        let mock_server = wiremock::MockServer::start().await;
        let request_path = format!("/v8/finance/chart/{ticker}");

        Mock::given(method("GET"))
            .and(path(request_path))
            .respond_with(ResponseTemplate::new(200).set_body_string(mock_response))
            .mount(&mock_server)
            .await;

        mock_server
    }

    #[tokio::test]
    async fn test_successful_price_fetch() {
        let mock_response = r#"{
            "chart": {
                "result": [{
                    "meta": {
                        "regularMarketPrice": 150.65,
                        "currency": "USD"
                    }
                }]
            }
        }"#;

        let mock_server = create_mock_server("AAPL", mock_response).await;
        let cache = Arc::new(Cache::new());

        let provider = YahooFinanceProvider::new(&mock_server.uri(), cache);
        let result = provider.fetch_price("AAPL").await.unwrap();
        assert_eq!(result.price, 150.65);
        assert_eq!(result.currency, "USD");
    }

    #[tokio::test]
    async fn test_korean_ticker_priced_in_krw() {
        let mock_response = r#"{
            "chart": {
                "result": [{
                    "meta": {
                        "regularMarketPrice": 61000.0,
                        "currency": "KRW"
                    }
                }]
            }
        }"#;

        let mock_server = create_mock_server("005930.KS", mock_response).await;
        let cache = Arc::new(Cache::new());

        let provider = YahooFinanceProvider::new(&mock_server.uri(), cache);
        let result = provider.fetch_price("005930.KS").await.unwrap();
        assert_eq!(result.price, 61000.0);
        assert_eq!(result.currency, "KRW");
    }

    #[tokio::test]
    async fn test_no_price_result_data() {
        let mock_response = r#"{"chart": {"result": []}}"#;
        let mock_server = create_mock_server("INVALID", mock_response).await;
        let cache = Arc::new(Cache::new());

        let provider = YahooFinanceProvider::new(&mock_server.uri(), cache);
        let result = provider.fetch_price("INVALID").await;
        assert!(result.is_err());
        assert_eq!(
            result.unwrap_err().to_string(),
            "No price data found for ticker: INVALID"
        );
    }

    #[tokio::test]
    async fn test_price_fetch_is_cached() {
        let mock_response = r#"{
            "chart": {
                "result": [{
                    "meta": {
                        "regularMarketPrice": 10.0,
                        "currency": "USD"
                    }
                }]
            }
        }"#;
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v8/finance/chart/AAPL"))
            .respond_with(ResponseTemplate::new(200).set_body_string(mock_response))
            .expect(1)
            .mount(&mock_server)
            .await;

        let cache = Arc::new(Cache::new());
        let provider = YahooFinanceProvider::new(&mock_server.uri(), cache);

        provider.fetch_price("AAPL").await.unwrap();
        let second = provider.fetch_price("AAPL").await.unwrap();
        assert_eq!(second.price, 10.0);
    }

    #[tokio::test]
    async fn test_successful_rate_fetch() {
        let mock_server = MockServer::start().await;
        let cache = Arc::new(Cache::new());
        let provider = YahooCurrencyProvider::new(&mock_server.uri(), cache);

        let mock_response = r#"{
            "chart": {
                "result": [
                    {
                        "meta": {
                            "regularMarketPrice": 1372.5
                        }
                    }
                ]
            }
        }"#;

        let expected_endpoint = "/v8/finance/chart/USDKRW=X";
        Mock::given(method("GET"))
            .and(path(expected_endpoint))
            .respond_with(ResponseTemplate::new(200).set_body_string(mock_response))
            .mount(&mock_server)
            .await;

        let rate = provider
            .get_rate("USD", "KRW")
            .await
            .expect("Failed to get rate");
        assert_eq!(rate, 1372.5);
    }

    #[tokio::test]
    async fn test_no_currency_rate_found() {
        let mock_server = MockServer::start().await;
        let cache = Arc::new(Cache::new());
        let provider = YahooCurrencyProvider::new(&mock_server.uri(), cache);

        let mock_response = r#"{
            "chart": {
                "result": []
            }
        }"#;

        let expected_endpoint = "/v8/finance/chart/USDKRW=X";
        Mock::given(method("GET"))
            .and(path(expected_endpoint))
            .respond_with(ResponseTemplate::new(200).set_body_string(mock_response))
            .mount(&mock_server)
            .await;

        let result = provider.get_rate("USD", "KRW").await;
        assert!(result.is_err());
        assert_eq!(
            result.unwrap_err().to_string(),
            "No rate data found for currency pair: USDKRW=X"
        );
    }

    #[tokio::test]
    async fn test_yahoo_currency_api_error_response() {
        let mock_server = MockServer::start().await;
        let cache = Arc::new(Cache::new());
        let provider = YahooCurrencyProvider::new(&mock_server.uri(), cache);

        let expected_endpoint = "/v8/finance/chart/USDKRW=X";
        Mock::given(method("GET"))
            .and(path(expected_endpoint))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;

        let result = provider.get_rate("USD", "KRW").await;
        assert!(result.is_err());
        assert_eq!(
            result.unwrap_err().to_string(),
            "HTTP error: 500 Internal Server Error for currency pair: USDKRW=X"
        );
    }

    #[tokio::test]
    async fn test_yahoo_currency_api_malformed_response() {
        let mock_server = MockServer::start().await;
        let cache = Arc::new(Cache::new());
        let provider = YahooCurrencyProvider::new(&mock_server.uri(), cache);

        let mock_response = r#"{
            "chart": {
                "results": []
            }
        }"#; // "results" instead of "result"

        let expected_endpoint = "/v8/finance/chart/USDKRW=X";
        Mock::given(method("GET"))
            .and(path(expected_endpoint))
            .respond_with(ResponseTemplate::new(200).set_body_string(mock_response))
            .mount(&mock_server)
            .await;

        let result = provider.get_rate("USD", "KRW").await;
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Failed to parse JSON response for USDKRW=X"));
    }
}

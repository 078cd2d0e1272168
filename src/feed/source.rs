// src/feed/source.rs
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use metrics::counter;
use reqwest::header::{ETAG, IF_MODIFIED_SINCE, IF_NONE_MATCH, LAST_MODIFIED};
use reqwest::{Client, StatusCode};

use crate::error::FeedError;
use crate::feed::rss::parse_feed;
use crate::feed::types::{CacheValidators, FeedSource, FetchOutcome};

const USER_AGENT: &str = concat!("p2000-monitor/", env!("CARGO_PKG_VERSION"));

/// Conditional-GET RSS source over HTTP.
pub struct HttpFeedSource {
    url: String,
    client: Client,
}

impl HttpFeedSource {
    pub fn new(url: impl Into<String>) -> Result<Self, FeedError> {
        Self::with_timeout(url, Duration::from_secs(15))
    }

    pub fn with_timeout(url: impl Into<String>, timeout: Duration) -> Result<Self, FeedError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            url: url.into(),
            client,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl FeedSource for HttpFeedSource {
    async fn fetch(&self, validators: &CacheValidators) -> Result<FetchOutcome, FeedError> {
        tracing::debug!(url = %self.url, "fetch feed");
        let mut req = self.client.get(&self.url);
        if let Some(etag) = &validators.etag {
            req = req.header(IF_NONE_MATCH, etag);
        }
        if let Some(lm) = &validators.last_modified {
            req = req.header(IF_MODIFIED_SINCE, lm);
        }

        let resp = req.send().await.inspect_err(|e| {
            tracing::warn!(error = ?e, url = %self.url, "feed http error");
            counter!("p2000_fetch_errors_total").increment(1);
        })?;

        let status = resp.status();
        if status == StatusCode::NOT_MODIFIED {
            return Ok(FetchOutcome::NotModified);
        }
        if !status.is_success() {
            counter!("p2000_fetch_errors_total").increment(1);
            return Err(FeedError::Fetch(format!("HTTP {status} from {}", self.url)));
        }

        let header = |name: reqwest::header::HeaderName| {
            resp.headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        let next = CacheValidators {
            etag: header(ETAG),
            last_modified: header(LAST_MODIFIED),
        };

        let parsed = match resp.text().await {
            Ok(body) => parse_feed(&body, next),
            Err(e) => Err(e.into()),
        };
        parsed.map(FetchOutcome::Parsed).inspect_err(|e| {
            tracing::warn!(error = %e, url = %self.url, "feed body rejected");
            counter!("p2000_fetch_errors_total").increment(1);
        })
    }

    fn name(&self) -> &str {
        "http"
    }
}

/// Serves an in-memory RSS document; the body can be swapped between cycles.
pub struct FixtureFeedSource {
    xml: Mutex<String>,
}

impl FixtureFeedSource {
    pub fn from_xml(xml: &str) -> Self {
        Self {
            xml: Mutex::new(xml.to_string()),
        }
    }

    pub fn set_xml(&self, xml: &str) {
        let mut guard = self.xml.lock().unwrap_or_else(|e| e.into_inner());
        *guard = xml.to_string();
    }
}

#[async_trait]
impl FeedSource for FixtureFeedSource {
    async fn fetch(&self, _validators: &CacheValidators) -> Result<FetchOutcome, FeedError> {
        let xml = self.xml.lock().unwrap_or_else(|e| e.into_inner()).clone();
        parse_feed(&xml, CacheValidators::default()).map(FetchOutcome::Parsed)
    }

    fn name(&self) -> &str {
        "fixture"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use metrics_exporter_prometheus::PrometheusBuilder;

    #[test]
    fn malformed_http_body_counts_as_fetch_error() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();

        let err = metrics::with_local_recorder(&recorder, || {
            rt.block_on(async {
                let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
                let addr = listener.local_addr().unwrap();
                let app = axum::Router::new().route(
                    "/",
                    axum::routing::get(|| async { "<html><body>502</body></html>" }),
                );
                tokio::spawn(async move { axum::serve(listener, app).await });

                let source = HttpFeedSource {
                    url: format!("http://{addr}/"),
                    client: Client::builder().no_proxy().build().unwrap(),
                };
                source.fetch(&CacheValidators::default()).await.unwrap_err()
            })
        });

        assert!(matches!(err, FeedError::Parse(_)));
        assert!(handle.render().contains("p2000_fetch_errors_total 1"));
    }
}

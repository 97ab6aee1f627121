use anyhow::Result;
use serde::Serialize;
use std::time::Instant;
use tracing::{debug, warn};

/// Body posted to every monitored function
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
struct WarmUp {
    warm_up: bool,
}

const WARM_UP: WarmUp = WarmUp { warm_up: true };

/// Measures how long a target takes to answer
#[async_trait::async_trait]
pub trait Prober: Send + Sync {
    /// Milliseconds between dispatch and the arrival of a response or a
    /// failure. `None` when the request could not be dispatched at all.
    async fn probe(&self, target: &str) -> Option<u64>;
}

/// Times a warm-up POST against a function URL
///
/// Most functions reject the warm-up body; any answer, including an error
/// status or a dropped connection, is a valid measurement.
pub struct HttpProber {
    client: reqwest::Client,
}

impl HttpProber {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("warmwatch/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl Prober for HttpProber {
    async fn probe(&self, target: &str) -> Option<u64> {
        let request = match self.client.post(target).json(&WARM_UP).build() {
            Ok(request) => request,
            Err(e) => {
                warn!("Cannot build warm-up request for {}: {}", target, e);
                return None;
            }
        };

        let start = Instant::now();
        match self.client.execute(request).await {
            Ok(response) => {
                let status = response.status();
                // The full answer counts, not just its headers.
                if let Err(e) = response.bytes().await {
                    debug!("Reading response body from {} failed: {}", target, e);
                }
                debug!("{} answered {} after {:?}", target, status, start.elapsed());
            }
            // Rejected by the client before anything went on the wire.
            Err(e) if e.is_builder() => {
                warn!("Cannot dispatch warm-up request to {}: {}", target, e);
                return None;
            }
            Err(e) => {
                debug!("{} failed after {:?}: {}", target, start.elapsed(), e);
            }
        }

        Some(u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_probe_posts_warm_up_payload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/fn"))
            .and(body_json(serde_json::json!({ "warmUp": true })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let prober = HttpProber::new().unwrap();
        let duration = prober.probe(&format!("{}/fn", server.uri())).await;

        assert!(duration.is_some());
    }

    #[tokio::test]
    async fn test_probe_times_error_responses() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(500).set_delay(std::time::Duration::from_millis(50)),
            )
            .mount(&server)
            .await;

        let prober = HttpProber::new().unwrap();
        let duration = prober.probe(&server.uri()).await.expect("error responses are timed");

        assert!(duration >= 50);
    }

    #[tokio::test]
    async fn test_probe_times_connection_failures() {
        // Bind and release a port so nothing listens on it.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let prober = HttpProber::new().unwrap();
        let duration = prober.probe(&format!("http://{addr}/fn")).await;

        assert!(duration.is_some());
    }

    #[tokio::test]
    async fn test_probe_undispatchable_target() {
        let prober = HttpProber::new().unwrap();

        assert_eq!(prober.probe("not a url").await, None);
    }

    #[tokio::test]
    async fn test_probe_unsupported_scheme_is_not_timed() {
        let prober = HttpProber::new().unwrap();

        assert_eq!(prober.probe("ftp://example.invalid/fn").await, None);
    }
}

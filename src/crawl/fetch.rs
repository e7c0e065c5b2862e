// src/crawl/fetch.rs
// =============================================================================
// This module performs the HTTP GET requests of a crawl.
//
// Key functionality:
// - One reqwest Client, reused for every request (connection pooling)
// - A random User-Agent from the configured pool on each request
// - A fixed 5 second client timeout, independent of the crawl budget
// - Bodies are truncated at 1 MiB no matter what the server sends
// - Every request races against the crawl's CancellationToken
//
// Non-2xx responses are NOT errors here: their bodies are returned and
// parsed for links like any other page. Only the status line is logged.
// =============================================================================

use anyhow::{anyhow, Context, Result};
use rand::seq::SliceRandom;
use rand::Rng;
use reqwest::Client;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

// Per-request network timeout
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

// Largest response body we keep (1 MiB)
pub const MAX_BODY_BYTES: usize = 1 << 20;

pub struct Fetcher {
    client: Client,
    user_agents: Vec<String>,
}

impl Fetcher {
    // Builds the HTTP client
    //
    // Parameters:
    //   user_agents: pool of User-Agent values (must not be empty)
    pub fn new(user_agents: Vec<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self { client, user_agents })
    }

    // Fetches a page and returns at most MAX_BODY_BYTES of its body
    //
    // Returns an error if the request cannot be built or sent, if reading the
    // body fails, or if `token` is cancelled before the request completes.
    pub async fn fetch<R: Rng + ?Sized>(
        &self,
        token: &CancellationToken,
        url: &str,
        rng: &mut R,
    ) -> Result<Vec<u8>> {
        if token.is_cancelled() {
            return Err(anyhow!("crawl cancelled before fetching {}", url));
        }

        let user_agent = self
            .user_agents
            .choose(rng)
            .map(String::as_str)
            .unwrap_or_default();

        tokio::select! {
            biased;
            _ = token.cancelled() => Err(anyhow!("crawl cancelled while fetching {}", url)),
            result = self.get(url, user_agent) => result,
        }
    }

    async fn get(&self, url: &str, user_agent: &str) -> Result<Vec<u8>> {
        let mut response = self
            .client
            .get(url)
            .header(reqwest::header::USER_AGENT, user_agent)
            .send()
            .await?;

        tracing::info!("fetch {}: {}", url, response.status());

        // Read chunk by chunk so a huge body never lands in memory
        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await? {
            let remaining = MAX_BODY_BYTES - body.len();
            if chunk.len() >= remaining {
                body.extend_from_slice(&chunk[..remaining]);
                break;
            }
            body.extend_from_slice(&chunk);
        }

        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::time::Instant;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fetcher() -> Fetcher {
        Fetcher::new(vec!["urusai-test".to_string()]).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_returns_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/page"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<a href=\"/x\">x</a>"))
            .expect(1)
            .mount(&server)
            .await;

        let token = CancellationToken::new();
        let mut rng = StdRng::seed_from_u64(0);
        let body = fetcher()
            .fetch(&token, &format!("{}/page", server.uri()), &mut rng)
            .await
            .unwrap();

        assert_eq!(body, b"<a href=\"/x\">x</a>");
    }

    #[tokio::test]
    async fn test_fetch_sends_user_agent_from_pool() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(header("user-agent", "urusai-test"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let token = CancellationToken::new();
        let mut rng = StdRng::seed_from_u64(0);
        let result = fetcher().fetch(&token, &server.uri(), &mut rng).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_non_success_status_still_returns_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404).set_body_string("not here"))
            .mount(&server)
            .await;

        let token = CancellationToken::new();
        let mut rng = StdRng::seed_from_u64(0);
        let body = fetcher().fetch(&token, &server.uri(), &mut rng).await.unwrap();
        assert_eq!(body, b"not here");
    }

    #[tokio::test]
    async fn test_body_is_capped() {
        let server = MockServer::start().await;
        let big = vec![b'a'; MAX_BODY_BYTES * 2];
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(big))
            .mount(&server)
            .await;

        let token = CancellationToken::new();
        let mut rng = StdRng::seed_from_u64(0);
        let body = fetcher().fetch(&token, &server.uri(), &mut rng).await.unwrap();
        assert_eq!(body.len(), MAX_BODY_BYTES);
    }

    #[tokio::test]
    async fn test_cancellation_interrupts_slow_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
            .mount(&server)
            .await;

        let token = CancellationToken::new();
        let canceller = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            canceller.cancel();
        });

        let started = Instant::now();
        let mut rng = StdRng::seed_from_u64(0);
        let result = fetcher().fetch(&token, &server.uri(), &mut rng).await;

        assert!(result.is_err());
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_request_timeout_applies_without_cancellation() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200).set_delay(REQUEST_TIMEOUT + Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        // Never cancelled: only the client timeout can end this request
        let token = CancellationToken::new();
        let started = Instant::now();
        let mut rng = StdRng::seed_from_u64(0);
        let result = fetcher().fetch(&token, &server.uri(), &mut rng).await;
        let elapsed = started.elapsed();

        assert!(result.is_err());
        assert!(elapsed >= REQUEST_TIMEOUT - Duration::from_millis(100));
        assert!(elapsed < REQUEST_TIMEOUT + Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_already_cancelled_token_fails_fast() {
        let token = CancellationToken::new();
        token.cancel();
        let mut rng = StdRng::seed_from_u64(0);
        let result = fetcher().fetch(&token, "http://127.0.0.1:9/", &mut rng).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_invalid_url_is_an_error() {
        let token = CancellationToken::new();
        let mut rng = StdRng::seed_from_u64(0);
        let result = fetcher().fetch(&token, "not a url", &mut rng).await;
        assert!(result.is_err());
    }
}

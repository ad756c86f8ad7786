//! Test helpers for integration tests
//!
//! Spawns a server on a free port, makes HTTP requests, and unwraps the
//! `{succeeded, data, messages}` envelope.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU16, Ordering};
use std::time::Duration;

use anyhow::Result;
use ident_api::{create_app, create_app_state};
use ident_common::AppConfig;
use reqwest::{Client, Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Counter for unique test ports
static PORT_COUNTER: AtomicU16 = AtomicU16::new(19000);

/// Get a unique port for testing
pub fn get_test_port() -> u16 {
    PORT_COUNTER.fetch_add(1, Ordering::SeqCst)
}

/// Deserialized response envelope
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub succeeded: bool,
    pub data: Option<T>,
    #[serde(default)]
    pub messages: Vec<String>,
}

/// Test server instance that manages lifecycle
pub struct TestServer {
    pub addr: SocketAddr,
    pub client: Client,
    _handle: JoinHandle<()>,
}

impl TestServer {
    /// Start a new test server
    pub async fn start() -> Result<Self> {
        let config = test_config()?;
        Self::start_with_config(config).await
    }

    /// Start a test server with custom config
    pub async fn start_with_config(config: AppConfig) -> Result<Self> {
        let port = get_test_port();
        let addr = SocketAddr::from(([127, 0, 0, 1], port));

        let state = create_app_state(config).await?;
        let app = create_app(state);

        let listener = TcpListener::bind(addr).await?;
        let actual_addr = listener.local_addr()?;

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        // Wait for server to be ready
        tokio::time::sleep(Duration::from_millis(100)).await;

        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;

        Ok(Self {
            addr: actual_addr,
            client,
            _handle: handle,
        })
    }

    /// Get base URL for the server
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Make a GET request
    pub async fn get(&self, path: &str) -> Result<Response> {
        let url = format!("{}{}", self.base_url(), path);
        Ok(self.client.get(&url).send().await?)
    }

    /// Make a GET request with auth token
    pub async fn get_auth(&self, path: &str, token: &str) -> Result<Response> {
        let url = format!("{}{}", self.base_url(), path);
        Ok(self
            .client
            .get(&url)
            .header("Authorization", format!("Bearer {token}"))
            .send()
            .await?)
    }

    /// Make a POST request with JSON body
    pub async fn post<T: Serialize>(&self, path: &str, body: &T) -> Result<Response> {
        let url = format!("{}{}", self.base_url(), path);
        Ok(self.client.post(&url).json(body).send().await?)
    }

    /// Make a POST request with auth token
    pub async fn post_auth<T: Serialize>(
        &self,
        path: &str,
        token: &str,
        body: &T,
    ) -> Result<Response> {
        let url = format!("{}{}", self.base_url(), path);
        Ok(self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {token}"))
            .json(body)
            .send()
            .await?)
    }

    /// Make a PUT request with auth token
    pub async fn put_auth<T: Serialize>(
        &self,
        path: &str,
        token: &str,
        body: &T,
    ) -> Result<Response> {
        let url = format!("{}{}", self.base_url(), path);
        Ok(self
            .client
            .put(&url)
            .header("Authorization", format!("Bearer {token}"))
            .json(body)
            .send()
            .await?)
    }

    /// Make a DELETE request with auth token
    pub async fn delete_auth(&self, path: &str, token: &str) -> Result<Response> {
        let url = format!("{}{}", self.base_url(), path);
        Ok(self
            .client
            .delete(&url)
            .header("Authorization", format!("Bearer {token}"))
            .send()
            .await?)
    }
}

/// Create a test configuration
pub fn test_config() -> Result<AppConfig> {
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env().map_err(|e| anyhow::anyhow!("Config error: {e}"))?;

    Ok(config)
}

/// Helper to check if test environment is available
///
/// Integration tests require PostgreSQL, Redis, and a seeded admin account.
pub async fn check_test_env() -> bool {
    for var in ["DATABASE_URL", "REDIS_URL", "JWT_SECRET", "ADMIN_EMAIL", "ADMIN_PASSWORD"] {
        if std::env::var(var).is_err() {
            eprintln!("Skipping test: {var} not set");
            return false;
        }
    }

    true
}

/// Assert HTTP 200 and a succeeded envelope, returning the data payload
pub async fn assert_success<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    let body = response.text().await?;
    if status != StatusCode::OK {
        anyhow::bail!("Expected status 200, got {status}. Body: {body}");
    }

    let envelope: Envelope<T> = serde_json::from_str(&body)?;
    if !envelope.succeeded {
        anyhow::bail!("Expected succeeded envelope, got failure: {:?}", envelope.messages);
    }
    envelope
        .data
        .ok_or_else(|| anyhow::anyhow!("Succeeded envelope without data. Body: {body}"))
}

/// Assert HTTP 200 and a succeeded envelope whose data may be null
pub async fn assert_succeeded(response: Response) -> Result<()> {
    let status = response.status();
    let body = response.text().await?;
    if status != StatusCode::OK {
        anyhow::bail!("Expected status 200, got {status}. Body: {body}");
    }

    let envelope: Envelope<serde_json::Value> = serde_json::from_str(&body)?;
    if !envelope.succeeded {
        anyhow::bail!("Expected succeeded envelope, got failure: {:?}", envelope.messages);
    }
    Ok(())
}

/// Assert HTTP 200 and a failed envelope, returning its messages
pub async fn assert_failure(response: Response) -> Result<Vec<String>> {
    let status = response.status();
    let body = response.text().await?;
    if status != StatusCode::OK {
        anyhow::bail!("Expected status 200, got {status}. Body: {body}");
    }

    let envelope: Envelope<serde_json::Value> = serde_json::from_str(&body)?;
    if envelope.succeeded {
        anyhow::bail!("Expected failed envelope, got success. Body: {body}");
    }
    Ok(envelope.messages)
}

/// Assert response status without parsing body
pub async fn assert_status(response: Response, expected_status: StatusCode) -> Result<()> {
    let status = response.status();
    if status != expected_status {
        let body = response.text().await?;
        anyhow::bail!("Expected status {expected_status}, got {status}. Body: {body}");
    }
    Ok(())
}

//! Provider clients
//!
//! The router talks to backends only through the `ProviderClient` trait. A
//! registry maps provider name to client; specs without an `api` block get
//! the mock client, the rest get the OpenAI-compatible HTTP client.

mod http;
mod mock;

pub use http::HttpClient;
pub use mock::MockClient;

use crate::config::ProviderSpec;
use crate::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Error from a provider invocation, classified for the fallback loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// Upstream quota error; does not count against the breaker
    RateLimited(String),
    /// Anything else, including transport failures
    Other(String),
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientError::RateLimited(msg) => write!(f, "rate limited: {}", msg),
            ClientError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for ClientError {}

/// Successful completion from a backend
#[derive(Debug, Clone)]
pub struct ChatOutcome {
    pub content: String,
    pub latency_ms: u64,
    pub cost: f64,
}

/// One upstream LLM backend
#[async_trait]
pub trait ProviderClient: Send + Sync {
    /// Provider name, matching its spec
    fn name(&self) -> &str;

    /// Send a prompt. The router additionally bounds the call with its own
    /// deadline; implementations should still honor `timeout` where the
    /// underlying transport supports it.
    async fn chat(
        &self,
        prompt: &str,
        timeout: Duration,
    ) -> std::result::Result<ChatOutcome, ClientError>;
}

/// Registry mapping provider name -> client
pub struct ClientRegistry {
    clients: HashMap<String, Arc<dyn ProviderClient>>,
}

impl ClientRegistry {
    /// Build one client per spec
    pub fn from_specs(specs: &[Arc<ProviderSpec>]) -> Result<Self> {
        let mut clients: HashMap<String, Arc<dyn ProviderClient>> = HashMap::new();
        for spec in specs {
            let client: Arc<dyn ProviderClient> = match &spec.api {
                Some(api) => Arc::new(HttpClient::new(spec, api)?),
                None => Arc::new(MockClient::new(spec)),
            };
            clients.insert(spec.name.clone(), client);
        }
        Ok(ClientRegistry { clients })
    }

    /// Registry over pre-built clients, used by router tests
    pub fn from_clients(list: Vec<Arc<dyn ProviderClient>>) -> Self {
        let clients = list
            .into_iter()
            .map(|c| (c.name().to_string(), c))
            .collect();
        ClientRegistry { clients }
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn ProviderClient>> {
        self.clients.get(name)
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_spec;

    #[test]
    fn test_registry_builds_mock_for_plain_specs() {
        let specs: Vec<_> = [test_spec("a"), test_spec("b")]
            .into_iter()
            .map(Arc::new)
            .collect();
        let registry = ClientRegistry::from_specs(&specs).unwrap();
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get("a").unwrap().name(), "a");
        assert!(registry.get("missing").is_none());
    }

    #[test]
    fn test_client_error_display() {
        let e = ClientError::RateLimited("quota".into());
        assert_eq!(e.to_string(), "rate limited: quota");
        let e = ClientError::Other("boom".into());
        assert_eq!(e.to_string(), "boom");
    }
}

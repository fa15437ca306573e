//! Single-shot upstream helpers: one connection per operation.

use super::{
    DiscoveredServer, ToolCallResult, UpstreamConnector, UpstreamEndpoint, UpstreamError,
    UpstreamResult, UpstreamTool,
};
use serde_json::Value;
use std::{sync::Arc, time::Duration};
use tokio::time::{Instant, timeout_at};
use tracing::debug;

/// Default wall-clock budget for one `tools/call`.
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(120);

/// Opens a fresh session for every operation and always closes it.
#[derive(Debug)]
pub struct UpstreamClient<C>
where
    C: UpstreamConnector,
{
    connector: Arc<C>,
    call_timeout: Duration,
}

impl<C> Clone for UpstreamClient<C>
where
    C: UpstreamConnector,
{
    fn clone(&self) -> Self {
        Self {
            connector: Arc::clone(&self.connector),
            call_timeout: self.call_timeout,
        }
    }
}

impl<C> UpstreamClient<C>
where
    C: UpstreamConnector,
{
    /// Creates a client over `connector`.
    #[must_use]
    pub const fn new(connector: Arc<C>, call_timeout: Duration) -> Self {
        Self {
            connector,
            call_timeout,
        }
    }

    /// Returns the configured `tools/call` budget.
    #[must_use]
    pub const fn call_timeout(&self) -> Duration {
        self.call_timeout
    }

    /// Returns the capabilities advertised during the handshake.
    ///
    /// # Errors
    ///
    /// Returns an [`UpstreamError`] when the session cannot be opened.
    pub async fn fetch_capabilities(&self, endpoint: &UpstreamEndpoint) -> UpstreamResult<Value> {
        let mut session = self.connector.connect(endpoint).await?;
        let capabilities = session.capabilities().clone();
        session.close().await;
        Ok(capabilities)
    }

    /// Lists the upstream's tools over a fresh connection.
    ///
    /// # Errors
    ///
    /// Returns an [`UpstreamError`] on connection, transport, or protocol
    /// failure.
    pub async fn list_tools(&self, endpoint: &UpstreamEndpoint) -> UpstreamResult<Vec<UpstreamTool>> {
        let mut session = self.connector.connect(endpoint).await?;
        let outcome = session.list_tools().await;
        session.close().await;
        outcome
    }

    /// Fetches capabilities and tools over one connection.
    ///
    /// # Errors
    ///
    /// Returns an [`UpstreamError`] on connection, transport, or protocol
    /// failure.
    pub async fn discover(&self, endpoint: &UpstreamEndpoint) -> UpstreamResult<DiscoveredServer> {
        let mut session = self.connector.connect(endpoint).await?;
        let capabilities = session.capabilities().clone();
        let outcome = session.list_tools().await;
        session.close().await;
        let tools = outcome?;
        debug!(url = %endpoint.url, tool_count = tools.len(), "upstream discovery finished");
        Ok(DiscoveredServer {
            capabilities,
            tools,
        })
    }

    /// Invokes one tool within the call budget.
    ///
    /// The budget covers the handshake and the call together.
    ///
    /// # Errors
    ///
    /// Returns [`UpstreamError::Timeout`] when the budget is exhausted, or the
    /// connection and transport errors of the underlying session.
    pub async fn call_tool(
        &self,
        endpoint: &UpstreamEndpoint,
        name: &str,
        arguments: Value,
    ) -> UpstreamResult<ToolCallResult> {
        let deadline = Instant::now() + self.call_timeout;
        let timed_out = |operation| UpstreamError::Timeout {
            operation,
            after: self.call_timeout,
        };
        let mut session = timeout_at(deadline, self.connector.connect(endpoint))
            .await
            .map_err(|_| timed_out("initialize"))??;
        let outcome = timeout_at(deadline, session.call_tool(name, arguments)).await;
        session.close().await;
        debug!(url = %endpoint.url, tool = name, "upstream call finished");
        outcome.map_err(|_| timed_out("tools/call"))?
    }
}

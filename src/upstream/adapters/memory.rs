//! Scripted in-process upstream for tests and local development.

use crate::upstream::{
    ToolCallResult, UpstreamConnector, UpstreamEndpoint, UpstreamError, UpstreamHeaders,
    UpstreamResult, UpstreamSession, UpstreamTool,
};
use async_trait::async_trait;
use serde_json::{Value, json};
use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard},
    time::Duration,
};

/// One recorded `connect` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedConnection {
    /// Target URL.
    pub url: String,
    /// Headers the gateway supplied.
    pub headers: UpstreamHeaders,
}

/// One recorded `tools/call`.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    /// Target URL.
    pub url: String,
    /// Tool name sent upstream.
    pub tool: String,
    /// Arguments sent upstream.
    pub arguments: Value,
    /// Headers of the session that made the call.
    pub headers: UpstreamHeaders,
}

#[derive(Debug, Clone)]
struct ScriptedServer {
    capabilities: Value,
    tools: Vec<UpstreamTool>,
    call_results: HashMap<String, Value>,
}

#[derive(Debug, Default)]
struct UpstreamState {
    servers: HashMap<String, ScriptedServer>,
    refusing: HashSet<String>,
    failing_lists: HashSet<String>,
    call_delay: Option<Duration>,
    connections: Vec<RecordedConnection>,
    calls: Vec<RecordedCall>,
    open_sessions: usize,
}

/// In-memory upstream that serves scripted tool catalogs per URL.
///
/// Clones share state, so a test can keep one handle for scripting and
/// inspection while the gateway owns another.
#[derive(Debug, Clone, Default)]
pub struct InMemoryUpstream {
    state: Arc<RwLock<UpstreamState>>,
}

impl InMemoryUpstream {
    /// Creates an upstream that serves nothing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, UpstreamState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, UpstreamState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Serves `tools` at `url`, replacing any earlier catalog.
    pub fn serve(&self, url: &str, tools: Vec<UpstreamTool>) {
        let mut state = self.write();
        let server = state
            .servers
            .entry(url.to_owned())
            .or_insert_with(|| ScriptedServer {
                capabilities: json!({"tools": {"listChanged": false}}),
                tools: Vec::new(),
                call_results: HashMap::new(),
            });
        server.tools = tools;
    }

    /// Serves tools with the given names and no schema.
    pub fn serve_names(&self, url: &str, names: &[&str]) {
        self.serve(
            url,
            names
                .iter()
                .map(|name| UpstreamTool::new(*name, format!("{name} tool")))
                .collect(),
        );
    }

    /// Overrides the handshake capabilities for `url`.
    pub fn set_capabilities(&self, url: &str, capabilities: Value) {
        if let Some(server) = self.write().servers.get_mut(url) {
            server.capabilities = capabilities;
        }
    }

    /// Scripts the result returned for `tool` at `url`.
    pub fn set_call_result(&self, url: &str, tool: &str, result: Value) {
        if let Some(server) = self.write().servers.get_mut(url) {
            server.call_results.insert(tool.to_owned(), result);
        }
    }

    /// Makes every connection to `url` fail.
    pub fn fail_connections(&self, url: &str) {
        self.write().refusing.insert(url.to_owned());
    }

    /// Makes `tools/list` at `url` fail after a successful handshake.
    pub fn fail_listing(&self, url: &str) {
        self.write().failing_lists.insert(url.to_owned());
    }

    /// Clears injected connection and listing failures for `url`.
    pub fn recover(&self, url: &str) {
        let mut state = self.write();
        state.refusing.remove(url);
        state.failing_lists.remove(url);
    }

    /// Delays every `tools/call` by `delay`.
    pub fn delay_calls(&self, delay: Duration) {
        self.write().call_delay = Some(delay);
    }

    /// Returns every connection attempt in order.
    #[must_use]
    pub fn connections(&self) -> Vec<RecordedConnection> {
        self.read().connections.clone()
    }

    /// Returns every tool call in order.
    #[must_use]
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.read().calls.clone()
    }

    /// Returns how many sessions are open.
    #[must_use]
    pub fn open_sessions(&self) -> usize {
        self.read().open_sessions
    }
}

#[async_trait]
impl UpstreamConnector for InMemoryUpstream {
    async fn connect(
        &self,
        endpoint: &UpstreamEndpoint,
    ) -> UpstreamResult<Box<dyn UpstreamSession>> {
        let mut state = self.write();
        state.connections.push(RecordedConnection {
            url: endpoint.url.clone(),
            headers: endpoint.headers.clone(),
        });
        if state.refusing.contains(&endpoint.url) {
            return Err(UpstreamError::Connect {
                url: endpoint.url.clone(),
                message: "connection refused".to_owned(),
            });
        }
        let capabilities = state
            .servers
            .get(&endpoint.url)
            .map(|server| server.capabilities.clone())
            .ok_or_else(|| UpstreamError::Connect {
                url: endpoint.url.clone(),
                message: "no upstream is served at this url".to_owned(),
            })?;
        state.open_sessions += 1;
        Ok(Box::new(InMemorySession {
            upstream: self.clone(),
            endpoint: endpoint.clone(),
            capabilities,
            closed: false,
        }))
    }
}

struct InMemorySession {
    upstream: InMemoryUpstream,
    endpoint: UpstreamEndpoint,
    capabilities: Value,
    closed: bool,
}

impl InMemorySession {
    fn ensure_open(&self) -> UpstreamResult<()> {
        if self.closed {
            return Err(UpstreamError::Closed);
        }
        Ok(())
    }
}

#[async_trait]
impl UpstreamSession for InMemorySession {
    fn capabilities(&self) -> &Value {
        &self.capabilities
    }

    async fn list_tools(&mut self) -> UpstreamResult<Vec<UpstreamTool>> {
        self.ensure_open()?;
        let state = self.upstream.read();
        if state.failing_lists.contains(&self.endpoint.url) {
            return Err(UpstreamError::Transport("listing failed".to_owned()));
        }
        Ok(state
            .servers
            .get(&self.endpoint.url)
            .map(|server| server.tools.clone())
            .unwrap_or_default())
    }

    async fn call_tool(&mut self, name: &str, arguments: Value) -> UpstreamResult<ToolCallResult> {
        self.ensure_open()?;
        let delay = self.upstream.read().call_delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let mut state = self.upstream.write();
        state.calls.push(RecordedCall {
            url: self.endpoint.url.clone(),
            tool: name.to_owned(),
            arguments,
            headers: self.endpoint.headers.clone(),
        });
        let server = state
            .servers
            .get(&self.endpoint.url)
            .ok_or_else(|| UpstreamError::Transport("upstream stopped serving".to_owned()))?;
        if !server.tools.iter().any(|tool| tool.name == name) {
            return Err(UpstreamError::Rpc {
                code: -32602,
                message: format!("unknown tool: {name}"),
            });
        }
        let result = server.call_results.get(name).cloned().unwrap_or_else(|| {
            json!({
                "content": [{"type": "text", "text": format!("{name} ok")}],
                "isError": false
            })
        });
        Ok(ToolCallResult(result))
    }

    async fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        let mut state = self.upstream.write();
        state.open_sessions = state.open_sessions.saturating_sub(1);
    }
}

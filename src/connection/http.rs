use super::config::AdminConfig;
use super::{AdminClient, AdminCommand};
use crate::core::{
    Address, CommandAck, ControllerError, ReplicaSetConfig, ReplicaSetStatus, Result, RoleStatus,
};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::{Span, debug, debug_span};

/// JSON-over-HTTP implementation of the administrative interface.
///
/// Commands are posted to `{scheme}://{addr}:{port}{prefix}/{command}`.
#[derive(Debug, Clone)]
pub struct HttpAdminClient {
    config: AdminConfig,
    span: Span,
}

impl HttpAdminClient {
    pub fn new(config: AdminConfig) -> Result<Self> {
        config.validate().map_err(ControllerError::Config)?;
        Ok(Self {
            config,
            span: debug_span!("admin"),
        })
    }

    /// Parent span for every event emitted by this client.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn config(&self) -> &AdminConfig {
        &self.config
    }

    pub fn base_url(&self, addr: &Address) -> String {
        format!(
            "{}://{}:{}{}",
            self.config.scheme,
            addr.url_host(),
            self.config.port,
            self.config.path_prefix
        )
    }

    /// Opens a session scoped to one node.
    ///
    /// The session is released when dropped, whichever way the caller exits.
    pub fn session(&self, addr: &Address) -> Result<AdminSession> {
        let client = reqwest::Client::builder()
            .timeout(self.config.request_timeout)
            .connect_timeout(self.config.request_timeout)
            .pool_max_idle_per_host(0)
            .build()
            .map_err(|e| ControllerError::transport(addr, "connect", e))?;
        debug!(parent: &self.span, addr = %addr, "admin session opened");
        Ok(AdminSession {
            client: Some(client),
            base_url: self.base_url(addr),
            addr: addr.clone(),
            span: self.span.clone(),
        })
    }

    async fn run<T: DeserializeOwned>(
        &self,
        addr: &Address,
        command: AdminCommand,
        body: Option<&ReplicaSetConfig>,
    ) -> Result<T> {
        let session = self.session(addr)?;
        session.run(command, body).await
    }

    async fn run_mutation(
        &self,
        addr: &Address,
        command: AdminCommand,
        config: &ReplicaSetConfig,
    ) -> Result<()> {
        let ack: CommandAck = self.run(addr, command, Some(config)).await?;
        if !ack.ok {
            return Err(ControllerError::protocol(
                addr,
                command.as_str(),
                ack.errmsg.unwrap_or_else(|| "command not acknowledged".to_string()),
            ));
        }
        Ok(())
    }
}

/// One open connection to a node's admin interface.
pub struct AdminSession {
    client: Option<reqwest::Client>,
    base_url: String,
    addr: Address,
    span: Span,
}

impl AdminSession {
    pub fn addr(&self) -> &Address {
        &self.addr
    }

    /// Runs one command and decodes its typed response.
    pub async fn run<T: DeserializeOwned>(
        &self,
        command: AdminCommand,
        body: Option<&ReplicaSetConfig>,
    ) -> Result<T> {
        let client = self.client.as_ref().ok_or_else(|| {
            ControllerError::transport(&self.addr, command.as_str(), "session already closed")
        })?;
        let url = format!("{}/{}", self.base_url, command.as_str());
        debug!(parent: &self.span, addr = %self.addr, command = %command, body = ?body, "run_command");

        let request = client.post(&url);
        let request = match body {
            Some(body) => request.json(body),
            None => request,
        };
        let response = request
            .send()
            .await
            .map_err(|e| ControllerError::transport(&self.addr, command.as_str(), e))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ControllerError::protocol(
                &self.addr,
                command.as_str(),
                format!("HTTP {}: {}", status, text),
            ));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ControllerError::transport(&self.addr, command.as_str(), e))?;
        let decoded = serde_json::from_slice::<T>(&bytes)
            .map_err(|e| ControllerError::protocol(&self.addr, command.as_str(), e))?;
        debug!(parent: &self.span, addr = %self.addr, command = %command, "run_command done");
        Ok(decoded)
    }

    /// Releases the session explicitly.
    pub fn close(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if self.client.take().is_some() {
            debug!(parent: &self.span, addr = %self.addr, "admin session closed");
        }
    }
}

impl Drop for AdminSession {
    fn drop(&mut self) {
        self.release();
    }
}

#[async_trait]
impl AdminClient for HttpAdminClient {
    async fn role_status(&self, addr: &Address) -> Result<RoleStatus> {
        self.run(addr, AdminCommand::RoleStatus, None).await
    }

    async fn read_config(&self, addr: &Address) -> Result<ReplicaSetConfig> {
        self.run(addr, AdminCommand::ReadConfig, None).await
    }

    async fn initiate(&self, addr: &Address, config: &ReplicaSetConfig) -> Result<()> {
        self.run_mutation(addr, AdminCommand::Initiate, config).await
    }

    async fn reconfigure(&self, addr: &Address, config: &ReplicaSetConfig) -> Result<()> {
        self.run_mutation(addr, AdminCommand::Reconfigure, config)
            .await
    }

    async fn member_statuses(&self, addr: &Address) -> Result<ReplicaSetStatus> {
        self.run(addr, AdminCommand::MemberStatuses, None).await
    }
}

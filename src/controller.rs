use crate::cluster::{
    AddressResolver, BootstrapReady, Bootstrapper, ClusterProbe, ConfigMerger, DnsResolver,
    NameResolver, Reconciler,
};
use crate::config::ControllerConfig;
use crate::connection::AdminClient;
use crate::connection::http::HttpAdminClient;
use crate::core::{ControllerError, Result};
use std::convert::Infallible;
use std::sync::Arc;
use tracing::{Span, info, info_span};

/// Wires discovery, bootstrap and reconciliation for one set of hosts.
pub struct Controller {
    config: ControllerConfig,
    bootstrapper: Bootstrapper,
    reconciler: Reconciler,
    span: Span,
}

impl Controller {
    /// Creates a controller talking to real nodes (system DNS, HTTP admin).
    pub fn from_config(config: ControllerConfig) -> Result<Self> {
        let span = info_span!("controller");
        let client = HttpAdminClient::new(config.admin.clone())?
            .with_span(info_span!(parent: &span, "admin"));
        Self::with_collaborators(config, Arc::new(DnsResolver), Arc::new(client), span)
    }

    /// Creates a controller from explicit collaborators.
    pub fn new(
        config: ControllerConfig,
        resolver: Arc<dyn NameResolver>,
        client: Arc<dyn AdminClient>,
    ) -> Result<Self> {
        Self::with_collaborators(config, resolver, client, info_span!("controller"))
    }

    fn with_collaborators(
        config: ControllerConfig,
        resolver: Arc<dyn NameResolver>,
        client: Arc<dyn AdminClient>,
        span: Span,
    ) -> Result<Self> {
        config.validate().map_err(ControllerError::Config)?;

        let resolver =
            AddressResolver::new(resolver).with_span(info_span!(parent: &span, "resolver"));
        let probe = ClusterProbe::new(resolver, client)
            .with_span(info_span!(parent: &span, "probe"));
        let bootstrapper = Bootstrapper::new(probe.clone(), config.set_name.clone())
            .with_span(info_span!(parent: &span, "bootstrap"));
        let reconciler = Reconciler::new(probe, ConfigMerger::new(config.set_name.clone()))
            .removed_state(config.removed_state)
            .with_span(info_span!(parent: &span, "watch"));

        Ok(Self {
            config,
            bootstrapper,
            reconciler,
            span,
        })
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn bootstrapper(&self) -> &Bootstrapper {
        &self.bootstrapper
    }

    pub fn reconciler(&self) -> &Reconciler {
        &self.reconciler
    }

    /// Blocks until a primary exists, creating the replica set if needed.
    pub async fn bootstrap(&self) -> Result<BootstrapReady> {
        self.bootstrapper
            .run_until_ready(&self.config.hostnames, &self.config.retry)
            .await
    }

    /// Reconciles membership forever; only returns on a fatal error.
    pub async fn watch(&self) -> Result<Infallible> {
        self.reconciler
            .run(&self.config.hostnames, self.config.watch_interval)
            .await
    }

    /// Bootstraps, then watches when configured to.
    pub async fn run(&self) -> Result<()> {
        let ready = self.bootstrap().await?;
        info!(parent: &self.span, ready = ?ready, "replica set ready");
        if self.config.watch {
            match self.watch().await? {}
        }
        Ok(())
    }
}

use super::probe::ClusterProbe;
use super::view::ClusterView;
use crate::config::RetryPolicy;
use crate::core::{Address, ControllerError, ReplicaSetConfig, Result};
use tokio::time::sleep;
use tracing::{Span, error, info, info_span};

/// Where a probing pass leaves the bootstrap state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootstrapState {
    /// A primary answered; nothing to do.
    PrimaryPresent(Address),
    /// Members exist but none is primary yet.
    SecondariesOnly,
    /// Only vacant nodes answered; the smallest becomes the seed.
    FreshCluster { seed: Address },
    /// Nobody answered.
    NothingReachable,
}

impl BootstrapState {
    pub fn from_view(view: &ClusterView) -> Self {
        if let Some(primary) = view.primary() {
            BootstrapState::PrimaryPresent(primary.clone())
        } else if !view.secondaries().is_empty() {
            BootstrapState::SecondariesOnly
        } else if let Some(seed) = view.seed_candidate() {
            BootstrapState::FreshCluster { seed: seed.clone() }
        } else {
            BootstrapState::NothingReachable
        }
    }
}

/// Terminal success of a bootstrap attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootstrapReady {
    PrimaryFound(Address),
    Initiated {
        seed: Address,
        config: ReplicaSetConfig,
    },
}

/// Why the cluster is not ready yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotYetStarted {
    SecondariesOnly,
    NothingReachable,
}

/// Result of a single bootstrap attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootstrapOutcome {
    Success(BootstrapReady),
    Retryable(NotYetStarted),
    Fatal(ControllerError),
}

/// Creates the replica set on first start, or confirms it already exists.
#[derive(Clone)]
pub struct Bootstrapper {
    probe: ClusterProbe,
    set_name: String,
    span: Span,
}

impl Bootstrapper {
    pub fn new(probe: ClusterProbe, set_name: impl Into<String>) -> Self {
        Self {
            probe,
            set_name: set_name.into(),
            span: info_span!("bootstrap"),
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Probes the hosts once and acts on the resulting view.
    pub async fn attempt(&self, hostnames: &[String]) -> BootstrapOutcome {
        match self.probe.probe(hostnames).await {
            Ok(view) => self.attempt_view(&view).await,
            Err(err) => BootstrapOutcome::Fatal(err),
        }
    }

    /// Acts on an already probed view.
    pub async fn attempt_view(&self, view: &ClusterView) -> BootstrapOutcome {
        match BootstrapState::from_view(view) {
            BootstrapState::PrimaryPresent(primary) => {
                info!(parent: &self.span, primary = %primary, "primary found");
                BootstrapOutcome::Success(BootstrapReady::PrimaryFound(primary))
            }
            BootstrapState::SecondariesOnly => {
                info!(parent: &self.span, "primary not found but secondaries");
                BootstrapOutcome::Retryable(NotYetStarted::SecondariesOnly)
            }
            BootstrapState::FreshCluster { seed } => {
                info!(parent: &self.span, primary = %seed, "create new primary");
                let config = ReplicaSetConfig::initial(self.set_name.clone(), seed.clone());
                match self.probe.client().initiate(&seed, &config).await {
                    Ok(()) => BootstrapOutcome::Success(BootstrapReady::Initiated { seed, config }),
                    Err(err) => BootstrapOutcome::Fatal(err),
                }
            }
            BootstrapState::NothingReachable => {
                info!(parent: &self.span, "instances not started");
                BootstrapOutcome::Retryable(NotYetStarted::NothingReachable)
            }
        }
    }

    /// Repeats attempts until one succeeds; only `Retryable` is retried.
    pub async fn run_until_ready(
        &self,
        hostnames: &[String],
        retry: &RetryPolicy,
    ) -> Result<BootstrapReady> {
        let mut attempt: u32 = 0;
        loop {
            attempt = attempt.saturating_add(1);
            match self.attempt(hostnames).await {
                BootstrapOutcome::Success(ready) => return Ok(ready),
                BootstrapOutcome::Retryable(reason) => {
                    let delay = retry.delay_for(attempt);
                    info!(
                        parent: &self.span,
                        attempt,
                        reason = ?reason,
                        delay_ms = delay.as_millis() as u64,
                        "cluster not ready, retrying"
                    );
                    sleep(delay).await;
                }
                BootstrapOutcome::Fatal(err) => {
                    error!(parent: &self.span, error = %err, "bootstrap failed");
                    return Err(err);
                }
            }
        }
    }
}

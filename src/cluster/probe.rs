use super::resolver::AddressResolver;
use super::view::ClusterView;
use crate::connection::AdminClient;
use crate::core::{Address, ControllerError, NodeStatus, Result};
use futures::future::join_all;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{Span, debug, info, info_span};

/// Queries every candidate address once and classifies it.
#[derive(Clone)]
pub struct ClusterProbe {
    resolver: AddressResolver,
    client: Arc<dyn AdminClient>,
    span: Span,
}

impl ClusterProbe {
    pub fn new(resolver: AddressResolver, client: Arc<dyn AdminClient>) -> Self {
        Self {
            resolver,
            client,
            span: info_span!("probe"),
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn client(&self) -> &Arc<dyn AdminClient> {
        &self.client
    }

    /// Resolves the host names and probes every resulting address.
    pub async fn probe(&self, hostnames: &[String]) -> Result<ClusterView> {
        let addresses = self.resolver.resolve(hostnames).await;
        self.probe_addresses(&addresses).await
    }

    /// Probes a fixed address set.
    ///
    /// Nodes failing at the transport level are left out of the view. All
    /// answers are collected before classification, so a split brain is
    /// detected over the whole set.
    pub async fn probe_addresses(&self, addresses: &BTreeSet<Address>) -> Result<ClusterView> {
        let answers = join_all(addresses.iter().map(|addr| async move {
            (addr, self.client.role_status(addr).await)
        }))
        .await;

        let mut observations = Vec::with_capacity(answers.len());
        for (addr, answer) in answers {
            match answer {
                Ok(role) => {
                    let status = NodeStatus::from(&role);
                    debug!(parent: &self.span, addr = %addr, status = ?status, "node classified");
                    observations.push((addr.clone(), status));
                }
                Err(ControllerError::Transport { message, .. }) => {
                    info!(parent: &self.span, addr = %addr, error = %message, "node not answered");
                }
                Err(err) => return Err(err),
            }
        }

        ClusterView::from_observations(observations)
    }
}

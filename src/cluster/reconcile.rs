use super::merge::{ConfigMerger, MemberPartition, assign_member_ids};
use super::probe::ClusterProbe;
use super::view::ClusterView;
use crate::core::{Address, MemberConfig, MemberRecord, REMOVED_MEMBER_STATE, Result};
use std::convert::Infallible;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{Span, debug, info, info_span, warn};

/// What one reconciliation pass did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// No primary answered; the pass was skipped.
    NoPrimary,
    /// Nothing to add or drop.
    Unchanged,
    Reconfigured {
        primary: Address,
        version: u64,
        added: Vec<MemberConfig>,
        removed: Vec<MemberRecord>,
    },
}

/// Keeps the member list in line with the nodes that currently answer.
#[derive(Clone)]
pub struct Reconciler {
    probe: ClusterProbe,
    merger: ConfigMerger,
    removed_state: i32,
    span: Span,
}

impl Reconciler {
    pub fn new(probe: ClusterProbe, merger: ConfigMerger) -> Self {
        Self {
            probe,
            merger,
            removed_state: REMOVED_MEMBER_STATE,
            span: info_span!("watch"),
        }
    }

    /// State code that marks a member as removed/down.
    pub fn removed_state(mut self, state: i32) -> Self {
        self.removed_state = state;
        self
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Runs passes forever, sleeping `interval` before each one.
    ///
    /// Only returns when a pass fails.
    pub async fn run(&self, hostnames: &[String], interval: Duration) -> Result<Infallible> {
        loop {
            sleep(interval).await;
            self.reconcile_once(hostnames).await?;
        }
    }

    /// Probes the hosts and reconciles against the fresh view.
    pub async fn reconcile_once(&self, hostnames: &[String]) -> Result<ReconcileOutcome> {
        let view = self.probe.probe(hostnames).await?;
        self.reconcile_view(&view).await
    }

    pub async fn reconcile_view(&self, view: &ClusterView) -> Result<ReconcileOutcome> {
        let Some(primary) = view.primary() else {
            warn!(parent: &self.span, "primary not found");
            return Ok(ReconcileOutcome::NoPrimary);
        };

        let client = self.probe.client();
        let status = client.member_statuses(primary).await?;
        let partition = MemberPartition::from_records(status.members, self.removed_state);

        if !view.vacants().is_empty() {
            info!(parent: &self.span, vacants = ?view.vacants(), "vacants found");
            let added = assign_member_ids(partition.max_id(), view.vacants());
            let mut members = partition.active;
            members.extend(added.iter().cloned());
            let version = self
                .reconfigure(primary, members, &partition.removed)
                .await?;
            Ok(ReconcileOutcome::Reconfigured {
                primary: primary.clone(),
                version,
                added,
                removed: partition.removed,
            })
        } else if !partition.removed.is_empty() {
            let version = self
                .reconfigure(primary, partition.active, &partition.removed)
                .await?;
            Ok(ReconcileOutcome::Reconfigured {
                primary: primary.clone(),
                version,
                added: Vec::new(),
                removed: partition.removed,
            })
        } else {
            debug!(parent: &self.span, primary = %primary, "membership unchanged");
            Ok(ReconcileOutcome::Unchanged)
        }
    }

    /// Reads the current config from the primary and replaces it.
    async fn reconfigure(
        &self,
        primary: &Address,
        members: Vec<MemberConfig>,
        removed: &[MemberRecord],
    ) -> Result<u64> {
        info!(parent: &self.span, primary = %primary, "reconfigure primary");
        let client = self.probe.client();

        let current = client.read_config(primary).await?;
        let next = self.merger.next_config(&current, members)?;
        debug!(parent: &self.span, version = next.version, "new version");

        info!(parent: &self.span, "reconfigure with {} members", next.members.len());
        debug!(parent: &self.span, members = ?next.hosts(), "members");
        info!(parent: &self.span, "removed {} members", removed.len());
        debug!(
            parent: &self.span,
            removed = ?removed.iter().map(|r| &r.host).collect::<Vec<_>>(),
            "removed"
        );

        client.reconfigure(primary, &next).await?;
        Ok(next.version)
    }
}

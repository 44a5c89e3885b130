// Discovery and membership reconciliation, leaf-first:
// resolver -> probe -> view -> bootstrap | reconcile -> merge.
pub mod bootstrap;
pub mod merge;
pub mod probe;
pub mod reconcile;
pub mod resolver;
pub mod view;

pub use bootstrap::{BootstrapOutcome, BootstrapReady, BootstrapState, Bootstrapper, NotYetStarted};
pub use merge::{ConfigMerger, MemberPartition, assign_member_ids};
pub use probe::ClusterProbe;
pub use reconcile::{ReconcileOutcome, Reconciler};
pub use resolver::{AddressResolver, DnsResolver, NameResolver, StaticResolver};
pub use view::ClusterView;

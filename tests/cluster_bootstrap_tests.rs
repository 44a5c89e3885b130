use replset_controller::{
    Address, AddressResolver, AdminCommand, BootstrapOutcome, BootstrapReady, Bootstrapper,
    ClusterProbe, ControllerError, DEFAULT_SET_NAME, InMemoryAdminClient, MemberConfig,
    NotYetStarted, ReplicaSetConfig, RetryPolicy, RoleStatus, StaticResolver,
};
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

fn ip(s: &str) -> IpAddr {
    s.parse().unwrap()
}

fn hosts(list: &[&str]) -> Vec<String> {
    list.iter().map(|h| h.to_string()).collect()
}

fn two_host_resolver() -> StaticResolver {
    StaticResolver::new()
        .with_host("a.example", vec![ip("1.1.1.1")])
        .with_host("b.example", vec![ip("2.2.2.2")])
}

fn bootstrapper(resolver: StaticResolver, admin: &InMemoryAdminClient) -> Bootstrapper {
    let probe = ClusterProbe::new(
        AddressResolver::new(Arc::new(resolver)),
        Arc::new(admin.clone()),
    );
    Bootstrapper::new(probe, DEFAULT_SET_NAME)
}

#[tokio::test]
async fn fresh_cluster_is_initiated_on_smallest_address() {
    let admin = InMemoryAdminClient::new();
    admin.add_vacant("2.2.2.2").await;
    admin.add_vacant("1.1.1.1").await;

    let outcome = bootstrapper(two_host_resolver(), &admin)
        .attempt(&hosts(&["a.example", "b.example"]))
        .await;

    let expected = ReplicaSetConfig {
        name: "rs".to_string(),
        version: 1,
        members: vec![MemberConfig::new(0, "1.1.1.1")],
    };
    assert_eq!(
        outcome,
        BootstrapOutcome::Success(BootstrapReady::Initiated {
            seed: Address::new("1.1.1.1"),
            config: expected.clone(),
        })
    );

    let submitted = admin.submitted().await;
    assert_eq!(submitted.len(), 1);
    assert_eq!(submitted[0].command, AdminCommand::Initiate);
    assert_eq!(submitted[0].addr, Address::new("1.1.1.1"));
    assert_eq!(submitted[0].config, expected);
    assert!(submitted[0].accepted);
}

#[tokio::test]
async fn existing_primary_needs_no_action() {
    let admin = InMemoryAdminClient::new();
    admin
        .add_primary(
            "2.2.2.2",
            ReplicaSetConfig::initial(DEFAULT_SET_NAME, Address::new("2.2.2.2")),
            Vec::new(),
        )
        .await;
    admin.add_vacant("1.1.1.1").await;

    let outcome = bootstrapper(two_host_resolver(), &admin)
        .attempt(&hosts(&["a.example", "b.example"]))
        .await;

    assert_eq!(
        outcome,
        BootstrapOutcome::Success(BootstrapReady::PrimaryFound(Address::new("2.2.2.2")))
    );
    assert!(admin.submitted().await.is_empty());
}

#[tokio::test]
async fn secondaries_without_primary_are_not_started() {
    let admin = InMemoryAdminClient::new();
    admin.add_secondary("1.1.1.1").await;
    admin.add_vacant("2.2.2.2").await;

    let outcome = bootstrapper(two_host_resolver(), &admin)
        .attempt(&hosts(&["a.example", "b.example"]))
        .await;

    assert_eq!(
        outcome,
        BootstrapOutcome::Retryable(NotYetStarted::SecondariesOnly)
    );
    assert!(admin.submitted().await.is_empty());
}

#[tokio::test]
async fn nothing_reachable_is_not_started() {
    let admin = InMemoryAdminClient::new();
    admin.add_vacant("1.1.1.1").await;
    admin
        .set_reachable(&Address::new("1.1.1.1"), false)
        .await
        .unwrap();

    let outcome = bootstrapper(two_host_resolver(), &admin)
        .attempt(&hosts(&["a.example", "b.example", "missing.example"]))
        .await;

    assert_eq!(
        outcome,
        BootstrapOutcome::Retryable(NotYetStarted::NothingReachable)
    );
    assert!(admin.submitted().await.is_empty());
}

#[tokio::test]
async fn split_brain_is_fatal() {
    let admin = InMemoryAdminClient::new();
    for addr in ["1.1.1.1", "2.2.2.2"] {
        admin
            .add_primary(
                addr,
                ReplicaSetConfig::initial(DEFAULT_SET_NAME, Address::new(addr)),
                Vec::new(),
            )
            .await;
    }

    let bootstrapper = bootstrapper(two_host_resolver(), &admin);
    let outcome = bootstrapper
        .attempt(&hosts(&["a.example", "b.example"]))
        .await;
    match outcome {
        BootstrapOutcome::Fatal(ControllerError::SplitBrain { first, second, .. }) => {
            assert_eq!(first, "1.1.1.1");
            assert_eq!(second, "2.2.2.2");
        }
        other => panic!("unexpected outcome: {other:?}"),
    }

    let err = bootstrapper
        .run_until_ready(
            &hosts(&["a.example", "b.example"]),
            &RetryPolicy::fixed(Duration::from_millis(1)),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ControllerError::SplitBrain { .. }));
}

#[tokio::test]
async fn failed_initiate_is_fatal() {
    let admin = InMemoryAdminClient::new();
    admin.add_vacant("1.1.1.1").await;
    admin.fail_mutations(&Address::new("1.1.1.1")).await.unwrap();

    let outcome = bootstrapper(two_host_resolver(), &admin)
        .attempt(&hosts(&["a.example"]))
        .await;

    assert!(matches!(
        outcome,
        BootstrapOutcome::Fatal(ControllerError::Transport { .. })
    ));
}

#[tokio::test]
async fn run_until_ready_retries_until_primary_appears() {
    let admin = InMemoryAdminClient::new();
    admin.add_secondary("1.1.1.1").await;

    let promoter = admin.clone();
    let promote = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(30)).await;
        promoter
            .set_role(&Address::new("1.1.1.1"), RoleStatus::primary())
            .await
            .unwrap();
    });

    let ready = bootstrapper(two_host_resolver(), &admin)
        .run_until_ready(
            &hosts(&["a.example"]),
            &RetryPolicy::fixed(Duration::from_millis(5)),
        )
        .await
        .unwrap();

    promote.await.unwrap();
    assert_eq!(ready, BootstrapReady::PrimaryFound(Address::new("1.1.1.1")));
    assert!(admin.submitted().await.is_empty());
}

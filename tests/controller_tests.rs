use replset_controller::{
    Address, AdminCommand, BootstrapReady, Controller, ControllerConfig, ControllerError,
    InMemoryAdminClient, ReconcileOutcome, RetryPolicy, StaticResolver,
};
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

fn ip(s: &str) -> IpAddr {
    s.parse().unwrap()
}

fn controller(admin: &InMemoryAdminClient, watch: bool) -> Controller {
    let resolver = StaticResolver::new()
        .with_host("a.example", vec![ip("1.1.1.1")])
        .with_host("b.example", vec![ip("2.2.2.2")]);
    let config = ControllerConfig::new(["a.example", "b.example"])
        .watch(watch)
        .retry(RetryPolicy::fixed(Duration::from_millis(5)))
        .watch_interval(Duration::from_millis(5));
    Controller::new(config, Arc::new(resolver), Arc::new(admin.clone())).unwrap()
}

#[tokio::test]
async fn bootstrap_then_reconcile_adds_remaining_vacant() {
    let admin = InMemoryAdminClient::new();
    admin.add_vacant("1.1.1.1").await;
    admin.add_vacant("2.2.2.2").await;

    let controller = controller(&admin, false);
    let ready = controller.bootstrap().await.unwrap();
    assert!(matches!(
        ready,
        BootstrapReady::Initiated { ref seed, .. } if seed == &Address::new("1.1.1.1")
    ));

    let outcome = controller
        .reconciler()
        .reconcile_once(&controller.config().hostnames)
        .await
        .unwrap();
    assert!(matches!(outcome, ReconcileOutcome::Reconfigured { version: 2, .. }));

    let stored = admin.config_of(&Address::new("1.1.1.1")).await.unwrap();
    assert_eq!(
        stored.hosts(),
        vec![&Address::new("1.1.1.1"), &Address::new("2.2.2.2")]
    );

    let commands: Vec<AdminCommand> = admin
        .submitted()
        .await
        .iter()
        .map(|cmd| cmd.command)
        .collect();
    assert_eq!(commands, vec![AdminCommand::Initiate, AdminCommand::Reconfigure]);
}

#[tokio::test]
async fn run_without_watch_returns_after_bootstrap() {
    let admin = InMemoryAdminClient::new();
    admin.add_vacant("2.2.2.2").await;

    controller(&admin, false).run().await.unwrap();
    assert_eq!(admin.submitted().await.len(), 1);
}

#[tokio::test]
async fn watch_stops_on_fatal_error() {
    let admin = InMemoryAdminClient::new();
    admin.add_vacant("1.1.1.1").await;
    admin.add_vacant("2.2.2.2").await;

    let controller = controller(&admin, true);
    controller.bootstrap().await.unwrap();
    admin.fail_mutations(&Address::new("1.1.1.1")).await.unwrap();

    let err = tokio::time::timeout(Duration::from_secs(5), controller.watch())
        .await
        .expect("watch should fail fast")
        .unwrap_err();
    assert!(matches!(err, ControllerError::Transport { .. }));
}

#[test]
fn invalid_configuration_is_rejected() {
    let admin = InMemoryAdminClient::new();
    let result = Controller::new(
        ControllerConfig::new(Vec::<String>::new()),
        Arc::new(StaticResolver::new()),
        Arc::new(admin),
    );
    assert!(matches!(result, Err(ControllerError::Config(_))));
}

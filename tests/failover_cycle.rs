//! End-to-end cycle scenarios against in-memory collaborators.

use std::sync::atomic::Ordering;

use standby_failover::failover::{Command, DecisionReason, DispatchOutcome};
use standby_failover::inventory::LifecycleState;
use standby_failover::pool::PoolSyncOutcome;
use standby_failover::scheduler::{CycleError, CycleReport, DispatchStatus, FailoverOutcome, PoolOutcome};

mod common;
use common::*;

fn decision_of(report: &CycleReport) -> (Option<&str>, Command, DecisionReason) {
    match &report.failover {
        FailoverOutcome::Decided {
            standby_id, decision, ..
        } => (standby_id.as_deref(), decision.command, decision.reason),
        FailoverOutcome::Aborted(e) => panic!("cycle aborted: {e}"),
    }
}

fn healthy_pair(standby_state: LifecycleState) -> Vec<standby_failover::inventory::InstanceRecord> {
    vec![
        instance("i-a", Some("10.0.0.1"), LifecycleState::Running),
        instance("i-b", Some("10.0.0.2"), standby_state),
    ]
}

#[tokio::test]
async fn test_healthy_primary_stops_standby_then_settles() {
    let cloud = FakeCloud::new(healthy_pair(LifecycleState::Running));
    let metrics = FakeMetrics::new(vec![0.1, 0.15, 0.05]);
    let pool = FakePool::new(Vec::new());
    let controller = controller(&cloud, &metrics, &pool);

    let report = controller.run_cycle(NOW_MS).await;
    let (standby, command, reason) = decision_of(&report);
    assert_eq!(standby, Some("i-b"));
    assert_eq!(command, Command::Stop);
    assert_eq!(reason, DecisionReason::PrimaryHealthy { max_load: 0.15 });
    assert_eq!(cloud.executed(), vec!["execute:stop:i-b"]);
    assert_eq!(report.outcome_label(), "ok");

    // Still stopping: nothing new is issued.
    let report = controller.run_cycle(NOW_MS + 60_000).await;
    let (_, command, reason) = decision_of(&report);
    assert_eq!(command, Command::Noop);
    assert_eq!(
        reason,
        DecisionReason::TransitionInFlight {
            standby: LifecycleState::Stopping
        }
    );

    cloud.settle();
    let report = controller.run_cycle(NOW_MS + 120_000).await;
    assert_eq!(decision_of(&report).1, Command::Noop);
    assert_eq!(cloud.executed().len(), 1);
    assert_eq!(cloud.state_of("i-b"), Some(LifecycleState::Stopped));
}

#[tokio::test]
async fn test_overloaded_primary_starts_standby_once() {
    let cloud = FakeCloud::new(healthy_pair(LifecycleState::Stopped));
    let metrics = FakeMetrics::new(vec![0.3, 0.1, 0.05]);
    let pool = FakePool::new(Vec::new());
    let controller = controller(&cloud, &metrics, &pool);

    let report = controller.run_cycle(NOW_MS).await;
    let (_, command, reason) = decision_of(&report);
    assert_eq!(command, Command::Start);
    assert_eq!(
        reason,
        DecisionReason::PrimaryOverloaded {
            max_load: 0.3,
            threshold: 0.2
        }
    );
    assert_eq!(cloud.calls(), vec!["probe:start:i-b", "execute:start:i-b"]);

    for _ in 0..2 {
        controller.run_cycle(NOW_MS).await;
        cloud.settle();
    }
    assert_eq!(cloud.executed(), vec!["execute:start:i-b"]);
    assert_eq!(cloud.state_of("i-b"), Some(LifecycleState::Running));
}

#[tokio::test]
async fn test_silent_primary_starts_standby() {
    let cloud = FakeCloud::new(healthy_pair(LifecycleState::Stopped));
    let metrics = FakeMetrics::new(vec![0.1, 0.25]);
    let pool = FakePool::new(Vec::new());
    let controller = controller(&cloud, &metrics, &pool);

    let report = controller.run_cycle(NOW_MS).await;
    let (_, command, reason) = decision_of(&report);
    assert_eq!(command, Command::Start);
    assert_eq!(
        reason,
        DecisionReason::PrimaryNotReporting {
            expected_buckets: 3,
            received_buckets: 2
        }
    );

    let queries = metrics.queries.lock().unwrap();
    assert_eq!(queries[0].host, "i-a");
    assert_eq!(queries[0].window.to_ms, NOW_MS - 300_000);
}

#[tokio::test]
async fn test_no_usable_primary_starts_stopped_standby() {
    let cloud = FakeCloud::new(vec![
        instance("i-a", None, LifecycleState::Stopped),
        instance("i-b", None, LifecycleState::Stopped),
    ]);
    let metrics = FakeMetrics::new(vec![0.1, 0.1, 0.1]);
    let pool = FakePool::new(vec![member("i-a", "10.0.0.1")]);
    let controller = controller(&cloud, &metrics, &pool);

    let report = controller.run_cycle(NOW_MS).await;
    let (standby, command, reason) = decision_of(&report);
    assert_eq!(standby, Some("i-b"));
    assert_eq!(command, Command::Start);
    assert_eq!(reason.to_string(), "no usable primary");

    // No role assignment means no health query at all.
    assert_eq!(metrics.query_count(), 0);
    // The pool still reflects the (empty) addressed set.
    assert!(pool.origins().is_empty());
}

#[tokio::test]
async fn test_single_addressed_instance_uses_pinned_standby() {
    let cloud = FakeCloud::new(vec![
        instance("i-a", Some("10.0.0.1"), LifecycleState::Running),
        instance("i-b", None, LifecycleState::Stopped),
        instance("i-c", None, LifecycleState::Stopped),
    ]);
    let metrics = FakeMetrics::new(vec![0.1, 0.1, 0.1]);
    let pool = FakePool::new(Vec::new());
    let mut config = test_config();
    config.failover.standby_instance_id = Some("i-b".into());
    let controller = controller_with(&config, &cloud, &metrics, &pool);

    let report = controller.run_cycle(NOW_MS).await;
    let (standby, command, _) = decision_of(&report);
    assert_eq!(standby, Some("i-b"));
    assert_eq!(command, Command::Start);
    assert_eq!(metrics.query_count(), 0);
}

#[tokio::test]
async fn test_metrics_failure_skips_decision_but_syncs_pool() {
    let cloud = FakeCloud::new(healthy_pair(LifecycleState::Running));
    let metrics = FakeMetrics::new(Vec::new());
    metrics.fail.store(true, Ordering::SeqCst);
    let pool = FakePool::new(Vec::new());
    let controller = controller(&cloud, &metrics, &pool);

    let report = controller.run_cycle(NOW_MS).await;
    assert!(matches!(report.failover, FailoverOutcome::Aborted(CycleError::Metrics(_))));
    assert!(matches!(report.pool, PoolOutcome::Synced(PoolSyncOutcome::Replaced { members: 2 })));
    assert!(cloud.calls().is_empty());
    assert_eq!(report.outcome_label(), "degraded");
}

#[tokio::test]
async fn test_metrics_failure_holds_even_when_primary_is_stopped() {
    let cloud = FakeCloud::new(vec![
        instance("i-a", Some("10.0.0.1"), LifecycleState::Stopped),
        instance("i-b", Some("10.0.0.2"), LifecycleState::Stopped),
    ]);
    let metrics = FakeMetrics::new(Vec::new());
    metrics.fail.store(true, Ordering::SeqCst);
    let pool = FakePool::new(Vec::new());
    let controller = controller(&cloud, &metrics, &pool);

    let report = controller.run_cycle(NOW_MS).await;
    assert!(matches!(report.failover, FailoverOutcome::Aborted(CycleError::Metrics(_))));
    assert!(cloud.calls().is_empty());
    assert_eq!(cloud.state_of("i-b"), Some(LifecycleState::Stopped));
    assert_eq!(pool.writes.load(Ordering::SeqCst), 1);

    metrics.fail.store(false, Ordering::SeqCst);
    metrics.set_means(vec![0.1, 0.1, 0.1]);
    let report = controller.run_cycle(NOW_MS).await;
    assert_eq!(decision_of(&report).1, Command::Start);
}

#[tokio::test]
async fn test_inventory_failure_aborts_everything() {
    let cloud = FakeCloud::new(healthy_pair(LifecycleState::Running));
    cloud.fail_inventory.store(true, Ordering::SeqCst);
    let metrics = FakeMetrics::new(vec![0.1, 0.1, 0.1]);
    let pool = FakePool::new(vec![member("i-a", "10.0.0.1")]);
    let controller = controller(&cloud, &metrics, &pool);

    let report = controller.run_cycle(NOW_MS).await;
    assert!(matches!(report.failover, FailoverOutcome::Aborted(CycleError::Inventory(_))));
    assert!(matches!(report.pool, PoolOutcome::Skipped));
    assert_eq!(report.outcome_label(), "aborted");
    assert!(cloud.calls().is_empty());
    assert_eq!(metrics.query_count(), 0);
    assert_eq!(pool.writes.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn test_hung_inventory_times_out() {
    let cloud = FakeCloud::new(healthy_pair(LifecycleState::Running));
    cloud.hang_inventory.store(true, Ordering::SeqCst);
    let metrics = FakeMetrics::new(vec![0.1, 0.1, 0.1]);
    let pool = FakePool::new(Vec::new());
    let controller = controller(&cloud, &metrics, &pool);

    let report = controller.run_cycle(NOW_MS).await;
    match report.failover {
        FailoverOutcome::Aborted(CycleError::Inventory(e)) => assert!(e.to_string().contains("timed out")),
        other => panic!("unexpected outcome: {other:?}"),
    }
}

#[tokio::test]
async fn test_rejected_command_is_noop_and_retried_next_cycle() {
    let cloud = FakeCloud::new(healthy_pair(LifecycleState::Stopped));
    cloud.reject_execute.store(true, Ordering::SeqCst);
    let metrics = FakeMetrics::new(vec![0.9, 0.9, 0.9]);
    let pool = FakePool::new(Vec::new());
    let controller = controller(&cloud, &metrics, &pool);

    let report = controller.run_cycle(NOW_MS).await;
    match &report.failover {
        FailoverOutcome::Decided {
            dispatch: Some(DispatchStatus::Failed(e)),
            ..
        } => assert_eq!(e.label(), "rejected"),
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert!(matches!(report.pool, PoolOutcome::Synced(_)));
    assert_eq!(cloud.state_of("i-b"), Some(LifecycleState::Stopped));

    cloud.reject_execute.store(false, Ordering::SeqCst);
    let report = controller.run_cycle(NOW_MS + 60_000).await;
    assert!(matches!(
        report.failover,
        FailoverOutcome::Decided {
            dispatch: Some(DispatchStatus::Completed(DispatchOutcome::Executed)),
            ..
        }
    ));
    assert_eq!(cloud.state_of("i-b"), Some(LifecycleState::Pending));
}

#[tokio::test]
async fn test_pool_failure_does_not_block_failover() {
    let cloud = FakeCloud::new(healthy_pair(LifecycleState::Stopped));
    let metrics = FakeMetrics::new(vec![0.9, 0.9, 0.9]);
    let pool = FakePool::new(Vec::new());
    pool.fail_writes.store(true, Ordering::SeqCst);
    let controller = controller(&cloud, &metrics, &pool);

    let report = controller.run_cycle(NOW_MS).await;
    assert_eq!(decision_of(&report).1, Command::Start);
    assert!(matches!(report.pool, PoolOutcome::Failed(_)));
    assert_eq!(cloud.executed(), vec!["execute:start:i-b"]);
}

#[tokio::test]
async fn test_pool_tracks_latest_addressed_set() {
    let cloud = FakeCloud::new(healthy_pair(LifecycleState::Stopped));
    let metrics = FakeMetrics::new(vec![0.1, 0.1, 0.1]);
    let pool = FakePool::new(vec![member("i-old", "192.0.2.10"), member("i-a", "10.0.0.99")]);
    let controller = controller(&cloud, &metrics, &pool);

    controller.run_cycle(NOW_MS).await;
    assert_eq!(pool.origins(), vec![member("i-a", "10.0.0.1"), member("i-b", "10.0.0.2")]);
    assert_eq!(pool.pool.lock().unwrap().monitor.as_deref(), Some("monitor-1"));

    cloud.set_instances(vec![
        instance("i-a", Some("10.0.0.1"), LifecycleState::Running),
        instance("i-b", None, LifecycleState::Stopped),
        instance("i-c", Some("10.0.0.3"), LifecycleState::Running),
    ]);
    controller.run_cycle(NOW_MS + 60_000).await;
    assert_eq!(pool.origins(), vec![member("i-a", "10.0.0.1"), member("i-c", "10.0.0.3")]);
}

#[tokio::test]
async fn test_unchanged_pool_is_rewritten_unless_diffing_enabled() {
    let cloud = FakeCloud::new(healthy_pair(LifecycleState::Stopped));
    let metrics = FakeMetrics::new(vec![0.1, 0.1, 0.1]);

    let pool = FakePool::new(Vec::new());
    let controller = controller(&cloud, &metrics, &pool);
    controller.run_cycle(NOW_MS).await;
    controller.run_cycle(NOW_MS).await;
    assert_eq!(pool.writes.load(Ordering::SeqCst), 2);

    let pool = FakePool::new(Vec::new());
    let mut config = test_config();
    config.pool.skip_unchanged = true;
    let controller = controller_with(&config, &cloud, &metrics, &pool);
    controller.run_cycle(NOW_MS).await;
    let report = controller.run_cycle(NOW_MS).await;
    assert_eq!(pool.writes.load(Ordering::SeqCst), 1);
    assert!(matches!(report.pool, PoolOutcome::Synced(PoolSyncOutcome::Unchanged { members: 2 })));
}

#[tokio::test]
async fn test_dry_run_probes_without_executing() {
    let cloud = FakeCloud::new(healthy_pair(LifecycleState::Running));
    let metrics = FakeMetrics::new(vec![0.1, 0.1, 0.1]);
    let pool = FakePool::new(Vec::new());
    let mut config = test_config();
    config.failover.dry_run = true;
    let controller = controller_with(&config, &cloud, &metrics, &pool);

    let report = controller.run_cycle(NOW_MS).await;
    assert!(matches!(
        report.failover,
        FailoverOutcome::Decided {
            dispatch: Some(DispatchStatus::Completed(DispatchOutcome::Probed)),
            ..
        }
    ));
    assert_eq!(cloud.calls(), vec!["probe:stop:i-b"]);
    assert_eq!(cloud.state_of("i-b"), Some(LifecycleState::Running));
}

#[tokio::test]
async fn test_role_selection_is_order_independent() {
    let metrics = FakeMetrics::new(vec![0.1, 0.1, 0.1]);
    let pool = FakePool::new(Vec::new());

    let forward = vec![
        instance("i-c", Some("10.0.0.3"), LifecycleState::Running),
        instance("i-a", Some("10.0.0.1"), LifecycleState::Running),
        instance("i-b", Some("10.0.0.2"), LifecycleState::Stopped),
    ];
    let mut reversed = forward.clone();
    reversed.reverse();

    for snapshot in [forward, reversed] {
        let cloud = FakeCloud::new(snapshot);
        let controller = controller(&cloud, &metrics, &pool);
        let report = controller.run_cycle(NOW_MS).await;
        assert_eq!(decision_of(&report).0, Some("i-b"));
    }

    let hosts: Vec<String> = metrics.queries.lock().unwrap().iter().map(|q| q.host.clone()).collect();
    assert_eq!(hosts, vec!["i-a", "i-a"]);
}

mod common;

mod continuation;

use crate::common::{collect_failures, prepared_dispatcher, Journal, MAIN_THREAD, PID};
use bs_notify::dispatch::entity::{EvalId, RawThread, StepperId};
use bs_notify::dispatch::notification::payload::StepReason;
use bs_notify::dispatch::{Dispatcher, DispatchConfig, NotificationKind, RawNotification};
use serial_test::serial;

#[test]
fn test_deliver_without_subscribers() {
    let dispatcher = Dispatcher::default();
    assert!(dispatcher.deliver(RawNotification::ProcessCreated { process: PID }));
    assert!(dispatcher.model().lookup_process(PID).is_some());
    assert!(!dispatcher.is_dispatching());
}

#[test]
fn test_summary_trace() {
    let dispatcher = prepared_dispatcher();
    let summaries = Journal::default();
    for kind in [NotificationKind::StepCompleted, NotificationKind::EvalFailed] {
        let summaries = summaries.clone();
        dispatcher.subscribe(kind, move |env| {
            summaries.push(env.notification().summary());
            Ok(())
        });
    }

    dispatcher.deliver(RawNotification::StepCompleted {
        domain: None,
        thread: RawThread::new(MAIN_THREAD),
        stepper: StepperId(4),
        reason: StepReason::Return,
    });
    dispatcher.deliver(RawNotification::EvalFailed {
        domain: None,
        thread: RawThread::new(MAIN_THREAD),
        evaluation: EvalId(11),
    });

    assert_eq!(
        summaries.records(),
        vec![
            "stepper 4 complete (return) at thread 7 (domain #1, process 100)".to_string(),
            "evaluation 11 failed at thread 7 (domain #1, process 100)".to_string(),
        ]
    );
}

#[test]
#[serial]
fn test_muted_logging() {
    let config = DispatchConfig {
        trace_notifications: true,
        ..DispatchConfig::default()
    };
    bs_notify::log::init(config.log_level());

    let dispatcher = Dispatcher::new(config);
    let failures = collect_failures(&dispatcher);

    bs_notify::log::disable();
    assert!(!bs_notify::log::is_enabled());
    // logging switch affects only log output, failures are still reported
    assert!(dispatcher.deliver(RawNotification::ControlCTrap { process: PID }));
    assert_eq!(failures.len(), 1);
    bs_notify::log::enable();
    assert!(bs_notify::log::is_enabled());
}

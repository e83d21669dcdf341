use crate::common::{
    breakpoint_hit, collect_failures, prepared_dispatcher, Journal, DEFAULT_DOMAIN, MAIN_THREAD,
    PID, PLUGIN_DOMAIN, WORKER_THREAD,
};
use bs_notify::dispatch::entity::{
    AssemblyId, BreakpointId, ClassId, DomainId, EvalId, FrameId, FunctionId, ModuleId,
    ProcessId, RawThread, StepperId, ThreadId,
};
use bs_notify::dispatch::notification::payload::{
    ExceptionEventKind, ExceptionFlags, ExceptionUnwindKind, LogSwitchReason, StepReason,
};
use bs_notify::dispatch::{NotificationKind, RawNotification};
use std::collections::HashSet;
use strum::IntoEnumIterator;

#[test]
fn test_resume_by_default() {
    let dispatcher = prepared_dispatcher();
    let calls = Journal::default();
    for kind in NotificationKind::iter() {
        let calls = calls.clone();
        dispatcher.subscribe(kind, move |env| {
            calls.push(env.kind());
            Ok(())
        });
    }

    assert!(dispatcher.deliver(breakpoint_hit(MAIN_THREAD)));
    assert!(dispatcher.deliver(RawNotification::Break {
        domain: None,
        thread: RawThread::new(MAIN_THREAD),
    }));
    assert!(dispatcher.deliver(RawNotification::ModuleLoaded {
        domain: DomainId(1),
        module: ModuleId(0x7000),
        name: "app.dll".to_string(),
    }));
    assert!(dispatcher.deliver(RawNotification::ProcessExited { process: PID }));

    assert_eq!(
        calls.records(),
        vec![
            NotificationKind::BreakpointHit,
            NotificationKind::Break,
            NotificationKind::ModuleLoaded,
            NotificationKind::ProcessExited,
        ]
    );
}

#[test]
fn test_every_engine_kind() {
    struct TestCase {
        raw: RawNotification,
        summary: &'static str,
    }
    let test_cases = [
        TestCase {
            raw: breakpoint_hit(MAIN_THREAD),
            summary: "breakpoint 1 hit at thread 7 (domain #1, process 100)",
        },
        TestCase {
            raw: RawNotification::BreakpointSetFailed {
                domain: None,
                thread: RawThread::new(WORKER_THREAD),
                breakpoint: BreakpointId(2),
                error_code: 0x1f,
            },
            summary: "breakpoint 2 set failed at thread 8 (domain #2, process 100), error code 0x1f",
        },
        TestCase {
            raw: RawNotification::StepCompleted {
                domain: None,
                thread: RawThread::new(MAIN_THREAD),
                stepper: StepperId(3),
                reason: StepReason::Normal,
            },
            summary: "stepper 3 complete (normal) at thread 7 (domain #1, process 100)",
        },
        TestCase {
            raw: RawNotification::Break {
                domain: None,
                thread: RawThread::new(WORKER_THREAD),
            },
            summary: "user break at thread 8 (domain #2, process 100)",
        },
        TestCase {
            raw: RawNotification::ExceptionRaised {
                domain: None,
                thread: RawThread::new(MAIN_THREAD),
                unhandled: false,
            },
            summary: "first chance exception at thread 7 (domain #1, process 100)",
        },
        TestCase {
            raw: RawNotification::ExceptionContext {
                domain: None,
                thread: RawThread::new(MAIN_THREAD),
                frame: Some(FrameId(5)),
                offset: 0x2a,
                kind: ExceptionEventKind::CatchHandlerFound,
                flags: ExceptionFlags::CAN_BE_INTERCEPTED,
            },
            summary: "exception event catch_handler_found at thread 7 (domain #1, process 100), frame 5 offset 0x2a, flags: can_be_intercepted",
        },
        TestCase {
            raw: RawNotification::ExceptionUnwind {
                domain: None,
                thread: RawThread::new(MAIN_THREAD),
                kind: ExceptionUnwindKind::UnwindBegin,
                flags: ExceptionFlags::NONE,
            },
            summary: "exception unwind unwind_begin at thread 7 (domain #1, process 100), flags: none",
        },
        TestCase {
            raw: RawNotification::EvalCompleted {
                domain: None,
                thread: RawThread::new(WORKER_THREAD),
                evaluation: EvalId(11),
            },
            summary: "evaluation 11 complete at thread 8 (domain #2, process 100)",
        },
        TestCase {
            raw: RawNotification::EvalFailed {
                domain: None,
                thread: RawThread::new(MAIN_THREAD),
                evaluation: EvalId(12),
            },
            summary: "evaluation 12 failed at thread 7 (domain #1, process 100)",
        },
        TestCase {
            raw: RawNotification::LogMessage {
                domain: None,
                thread: RawThread::new(MAIN_THREAD),
                level: 2,
                switch_name: "Trace".to_string(),
                message: "started\n".to_string(),
            },
            summary: "log message [Trace:2] at thread 7 (domain #1, process 100): started",
        },
        TestCase {
            raw: RawNotification::LogSwitchChanged {
                domain: None,
                thread: RawThread::new(WORKER_THREAD),
                level: 4,
                reason: LogSwitchReason::Modified,
                switch_name: "Net".to_string(),
                parent_name: "Trace".to_string(),
            },
            summary: "log switch \"Net\" (parent \"Trace\") modified with level 4 at thread 8 (domain #2, process 100)",
        },
        TestCase {
            raw: RawNotification::ToolNotification {
                tool_id: "profiler".to_string(),
                thread: Some(MAIN_THREAD),
                process: PID,
                payload: "<Tick/>".to_string(),
            },
            summary: "tool profiler notification in process 100, thread 7: 7 bytes of payload",
        },
        TestCase {
            raw: RawNotification::DebuggerError {
                process: PID,
                hresult: -2146233079,
                error_code: 0,
            },
            summary: "debugger error in process 100: hresult 0x80131509, error code 0",
        },
        TestCase {
            raw: RawNotification::ControlCTrap { process: PID },
            summary: "ctrl+c trapped in process 100",
        },
        TestCase {
            raw: RawNotification::FunctionRemapOpportunity {
                domain: None,
                thread: RawThread::new(MAIN_THREAD),
                old_function: FunctionId(0x0600_0001),
                new_function: FunctionId(0x0600_0002),
                old_offset: 0x10,
            },
            summary: "function 0x06000001 can be remapped to 0x06000002 at offset 0x10, thread 7 (domain #1, process 100)",
        },
        TestCase {
            raw: RawNotification::FunctionRemapCompleted {
                domain: None,
                thread: RawThread::new(MAIN_THREAD),
                function: FunctionId(0x0600_0002),
            },
            summary: "function 0x06000002 remapped at thread 7 (domain #1, process 100)",
        },
        TestCase {
            raw: RawNotification::AssemblyLoaded {
                domain: DEFAULT_DOMAIN,
                assembly: AssemblyId(0x5000),
                name: "App".to_string(),
            },
            summary: "assembly 0x5000 \"App\" loaded into domain #1 (process 100)",
        },
        TestCase {
            raw: RawNotification::ModuleLoaded {
                domain: DEFAULT_DOMAIN,
                module: ModuleId(0x7000),
                name: "App.dll".to_string(),
            },
            summary: "module 0x7000 \"App.dll\" loaded into domain #1 (process 100)",
        },
        TestCase {
            raw: RawNotification::ClassLoaded {
                domain: DEFAULT_DOMAIN,
                class: ClassId(0x0200_0002),
                module: Some(ModuleId(0x7000)),
            },
            summary: "class 0x02000002 loaded into domain #1 (process 100) from module 0x7000",
        },
        TestCase {
            raw: RawNotification::ModuleSymbolsUpdated {
                domain: DEFAULT_DOMAIN,
                module: ModuleId(0x7000),
                symbols: vec![0; 4],
            },
            summary: "module 0x7000 symbols updated in domain #1 (process 100) (4 bytes)",
        },
        TestCase {
            raw: RawNotification::ClassUnloaded {
                domain: DEFAULT_DOMAIN,
                class: ClassId(0x0200_0002),
            },
            summary: "class 0x02000002 unloaded from domain #1 (process 100)",
        },
        TestCase {
            raw: RawNotification::ModuleUnloaded {
                domain: DEFAULT_DOMAIN,
                module: ModuleId(0x7000),
            },
            summary: "module 0x7000 unloaded from domain #1 (process 100)",
        },
        TestCase {
            raw: RawNotification::AssemblyUnloaded {
                domain: DEFAULT_DOMAIN,
                assembly: AssemblyId(0x5000),
            },
            summary: "assembly 0x5000 unloaded from domain #1 (process 100)",
        },
        TestCase {
            raw: RawNotification::ThreadCreated {
                domain: None,
                thread: RawThread::in_domain(ThreadId(9), PLUGIN_DOMAIN),
            },
            summary: "thread 9 (domain #2, process 100) created",
        },
        TestCase {
            raw: RawNotification::ThreadRenamed {
                domain: None,
                thread: RawThread::new(ThreadId(9)),
                name: Some("io".to_string()),
            },
            summary: "thread 9 (domain #2, process 100) renamed to \"io\"",
        },
        TestCase {
            raw: RawNotification::ThreadExited {
                domain: None,
                thread: RawThread::new(ThreadId(9)),
            },
            summary: "thread 9 (domain #2, process 100) exited",
        },
        TestCase {
            raw: RawNotification::DomainCreated {
                process: PID,
                domain: DomainId(3),
                name: "tmp".to_string(),
            },
            summary: "domain #3 (process 100) created with name \"tmp\"",
        },
        TestCase {
            raw: RawNotification::DomainRenamed {
                domain: DomainId(3),
                name: Some("scratch".to_string()),
            },
            summary: "domain #3 (process 100) renamed to \"scratch\"",
        },
        TestCase {
            raw: RawNotification::DomainExited {
                domain: DomainId(3),
            },
            summary: "domain #3 (process 100) exited",
        },
        TestCase {
            raw: RawNotification::ProcessCreated {
                process: ProcessId(200),
            },
            summary: "process 200 created",
        },
        TestCase {
            raw: RawNotification::ProcessExited {
                process: ProcessId(200),
            },
            summary: "process 200 exited",
        },
    ];

    let dispatcher = prepared_dispatcher();
    let failures = collect_failures(&dispatcher);
    let summaries = Journal::default();
    for kind in NotificationKind::iter().filter(|k| !k.is_meta()) {
        let summaries = summaries.clone();
        dispatcher.subscribe(kind, move |env| {
            summaries.push((env.kind(), env.notification().summary()));
            Ok(())
        });
    }

    let mut delivered = HashSet::new();
    for tc in test_cases {
        let kind = tc.raw.kind();
        summaries.clear();
        assert!(dispatcher.deliver(tc.raw), "{kind} must resume by default");
        assert_eq!(summaries.records(), vec![(kind, tc.summary.to_string())]);
        delivered.insert(kind);
    }

    assert_eq!(failures.len(), 0);
    let engine_kinds: HashSet<_> = NotificationKind::iter().filter(|k| !k.is_meta()).collect();
    assert_eq!(delivered, engine_kinds);
}

#[test]
fn test_one_suppression_is_enough() {
    let dispatcher = prepared_dispatcher();
    let calls = Journal::default();

    let first = calls.clone();
    dispatcher.subscribe(NotificationKind::BreakpointHit, move |env| {
        first.push("first");
        env.suppress_resume();
        Ok(())
    });
    let second = calls.clone();
    dispatcher.subscribe(NotificationKind::BreakpointHit, move |_| {
        second.push("second");
        Ok(())
    });

    assert!(!dispatcher.deliver(breakpoint_hit(MAIN_THREAD)));
    assert_eq!(calls.records(), vec!["first", "second"]);
}

#[test]
fn test_suppression_is_idempotent() {
    let dispatcher = prepared_dispatcher();
    for _ in 0..3 {
        dispatcher.subscribe(NotificationKind::BreakpointHit, |env| {
            env.suppress_resume();
            env.suppress_resume();
            Ok(())
        });
    }
    assert!(!dispatcher.deliver(breakpoint_hit(MAIN_THREAD)));
}

#[test]
fn test_suppression_scope_is_one_dispatch() {
    let dispatcher = prepared_dispatcher();
    let hits = Journal::default();
    let hits_clone = hits.clone();
    dispatcher.subscribe(NotificationKind::BreakpointHit, move |env| {
        hits_clone.push(());
        // keep debugee suspended only at first hit
        if hits_clone.len() == 1 {
            env.suppress_resume();
        }
        Ok(())
    });

    assert!(!dispatcher.deliver(breakpoint_hit(MAIN_THREAD)));
    assert!(dispatcher.deliver(breakpoint_hit(MAIN_THREAD)));
    assert_eq!(hits.len(), 2);
}

#[test]
fn test_suppression_of_other_kind_not_affected() {
    let dispatcher = prepared_dispatcher();
    dispatcher.subscribe(NotificationKind::Break, |env| {
        env.suppress_resume();
        Ok(())
    });
    assert!(dispatcher.deliver(breakpoint_hit(MAIN_THREAD)));
    assert!(!dispatcher.deliver(RawNotification::Break {
        domain: None,
        thread: RawThread::new(MAIN_THREAD),
    }));
}

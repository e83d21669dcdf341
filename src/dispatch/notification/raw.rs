//! Notifications as the native engine boundary supplies them: entity references are
//! not resolved yet and the execution domain of thread-scoped notifications may be absent.

use crate::dispatch::entity::{
    AssemblyId, BreakpointId, ClassId, DomainId, EvalId, FrameId, FunctionId, ModuleId,
    ProcessId, RawThread, StepperId, ThreadId,
};
use crate::dispatch::notification::payload::{
    ExceptionEventKind, ExceptionFlags, ExceptionUnwindKind, LogSwitchReason, StepReason,
};
use crate::dispatch::notification::NotificationKind;

#[derive(Clone, PartialEq, Debug)]
pub enum RawNotification {
    BreakpointHit {
        domain: Option<DomainId>,
        thread: RawThread,
        breakpoint: BreakpointId,
    },
    BreakpointSetFailed {
        domain: Option<DomainId>,
        thread: RawThread,
        breakpoint: BreakpointId,
        error_code: u32,
    },
    StepCompleted {
        domain: Option<DomainId>,
        thread: RawThread,
        stepper: StepperId,
        reason: StepReason,
    },
    Break {
        domain: Option<DomainId>,
        thread: RawThread,
    },
    ExceptionRaised {
        domain: Option<DomainId>,
        thread: RawThread,
        unhandled: bool,
    },
    ExceptionContext {
        domain: Option<DomainId>,
        thread: RawThread,
        frame: Option<FrameId>,
        offset: u32,
        kind: ExceptionEventKind,
        flags: ExceptionFlags,
    },
    ExceptionUnwind {
        domain: Option<DomainId>,
        thread: RawThread,
        kind: ExceptionUnwindKind,
        flags: ExceptionFlags,
    },
    EvalCompleted {
        domain: Option<DomainId>,
        thread: RawThread,
        evaluation: EvalId,
    },
    EvalFailed {
        domain: Option<DomainId>,
        thread: RawThread,
        evaluation: EvalId,
    },
    ProcessCreated {
        process: ProcessId,
    },
    ProcessExited {
        process: ProcessId,
    },
    ThreadCreated {
        domain: Option<DomainId>,
        thread: RawThread,
    },
    ThreadExited {
        domain: Option<DomainId>,
        thread: RawThread,
    },
    ThreadRenamed {
        domain: Option<DomainId>,
        thread: RawThread,
        name: Option<String>,
    },
    DomainCreated {
        process: ProcessId,
        domain: DomainId,
        name: String,
    },
    DomainExited {
        domain: DomainId,
    },
    DomainRenamed {
        domain: DomainId,
        name: Option<String>,
    },
    ModuleLoaded {
        domain: DomainId,
        module: ModuleId,
        name: String,
    },
    ModuleUnloaded {
        domain: DomainId,
        module: ModuleId,
    },
    ClassLoaded {
        domain: DomainId,
        class: ClassId,
        module: Option<ModuleId>,
    },
    ClassUnloaded {
        domain: DomainId,
        class: ClassId,
    },
    AssemblyLoaded {
        domain: DomainId,
        assembly: AssemblyId,
        name: String,
    },
    AssemblyUnloaded {
        domain: DomainId,
        assembly: AssemblyId,
    },
    ModuleSymbolsUpdated {
        domain: DomainId,
        module: ModuleId,
        symbols: Vec<u8>,
    },
    DebuggerError {
        process: ProcessId,
        hresult: i32,
        error_code: u32,
    },
    LogMessage {
        domain: Option<DomainId>,
        thread: RawThread,
        level: i32,
        switch_name: String,
        message: String,
    },
    LogSwitchChanged {
        domain: Option<DomainId>,
        thread: RawThread,
        level: i32,
        reason: LogSwitchReason,
        switch_name: String,
        parent_name: String,
    },
    ToolNotification {
        tool_id: String,
        thread: Option<ThreadId>,
        process: ProcessId,
        payload: String,
    },
    ControlCTrap {
        process: ProcessId,
    },
    FunctionRemapOpportunity {
        domain: Option<DomainId>,
        thread: RawThread,
        old_function: FunctionId,
        new_function: FunctionId,
        old_offset: u32,
    },
    FunctionRemapCompleted {
        domain: Option<DomainId>,
        thread: RawThread,
        function: FunctionId,
    },
}

impl RawNotification {
    pub fn kind(&self) -> NotificationKind {
        match self {
            RawNotification::BreakpointHit { .. } => NotificationKind::BreakpointHit,
            RawNotification::BreakpointSetFailed { .. } => NotificationKind::BreakpointSetFailed,
            RawNotification::StepCompleted { .. } => NotificationKind::StepCompleted,
            RawNotification::Break { .. } => NotificationKind::Break,
            RawNotification::ExceptionRaised { .. } => NotificationKind::ExceptionRaised,
            RawNotification::ExceptionContext { .. } => NotificationKind::ExceptionContext,
            RawNotification::ExceptionUnwind { .. } => NotificationKind::ExceptionUnwind,
            RawNotification::EvalCompleted { .. } => NotificationKind::EvalCompleted,
            RawNotification::EvalFailed { .. } => NotificationKind::EvalFailed,
            RawNotification::ProcessCreated { .. } => NotificationKind::ProcessCreated,
            RawNotification::ProcessExited { .. } => NotificationKind::ProcessExited,
            RawNotification::ThreadCreated { .. } => NotificationKind::ThreadCreated,
            RawNotification::ThreadExited { .. } => NotificationKind::ThreadExited,
            RawNotification::ThreadRenamed { .. } => NotificationKind::ThreadRenamed,
            RawNotification::DomainCreated { .. } => NotificationKind::DomainCreated,
            RawNotification::DomainExited { .. } => NotificationKind::DomainExited,
            RawNotification::DomainRenamed { .. } => NotificationKind::DomainRenamed,
            RawNotification::ModuleLoaded { .. } => NotificationKind::ModuleLoaded,
            RawNotification::ModuleUnloaded { .. } => NotificationKind::ModuleUnloaded,
            RawNotification::ClassLoaded { .. } => NotificationKind::ClassLoaded,
            RawNotification::ClassUnloaded { .. } => NotificationKind::ClassUnloaded,
            RawNotification::AssemblyLoaded { .. } => NotificationKind::AssemblyLoaded,
            RawNotification::AssemblyUnloaded { .. } => NotificationKind::AssemblyUnloaded,
            RawNotification::ModuleSymbolsUpdated { .. } => {
                NotificationKind::ModuleSymbolsUpdated
            }
            RawNotification::DebuggerError { .. } => NotificationKind::DebuggerError,
            RawNotification::LogMessage { .. } => NotificationKind::LogMessage,
            RawNotification::LogSwitchChanged { .. } => NotificationKind::LogSwitchChanged,
            RawNotification::ToolNotification { .. } => NotificationKind::ToolNotification,
            RawNotification::ControlCTrap { .. } => NotificationKind::ControlCTrap,
            RawNotification::FunctionRemapOpportunity { .. } => {
                NotificationKind::FunctionRemapOpportunity
            }
            RawNotification::FunctionRemapCompleted { .. } => {
                NotificationKind::FunctionRemapCompleted
            }
        }
    }

    /// Thread handle of a thread-scoped notification, as engine reports it.
    pub fn raw_thread(&self) -> Option<RawThread> {
        match self {
            RawNotification::BreakpointHit { thread, .. }
            | RawNotification::BreakpointSetFailed { thread, .. }
            | RawNotification::StepCompleted { thread, .. }
            | RawNotification::Break { thread, .. }
            | RawNotification::ExceptionRaised { thread, .. }
            | RawNotification::ExceptionContext { thread, .. }
            | RawNotification::ExceptionUnwind { thread, .. }
            | RawNotification::EvalCompleted { thread, .. }
            | RawNotification::EvalFailed { thread, .. }
            | RawNotification::ThreadCreated { thread, .. }
            | RawNotification::ThreadExited { thread, .. }
            | RawNotification::ThreadRenamed { thread, .. }
            | RawNotification::LogMessage { thread, .. }
            | RawNotification::LogSwitchChanged { thread, .. }
            | RawNotification::FunctionRemapOpportunity { thread, .. }
            | RawNotification::FunctionRemapCompleted { thread, .. } => Some(*thread),
            _ => None,
        }
    }

    /// Thread referenced by notification, if any.
    pub fn thread(&self) -> Option<ThreadId> {
        if let Some(thread) = self.raw_thread() {
            return Some(thread.id);
        }
        match self {
            RawNotification::ToolNotification { thread, .. } => *thread,
            _ => None,
        }
    }
}

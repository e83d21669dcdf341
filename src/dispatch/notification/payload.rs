//! Resolved notification payloads.

use crate::dispatch::entity::{
    AssemblyId, BreakpointId, ClassId, Controller, DomainScope, EvalId, FrameId, FunctionId,
    ModuleId, ProcessId, StepperId, ThreadId, ThreadScope,
};
use crate::dispatch::error::{Error, FailureClass};
use crate::dispatch::notification::NotificationKind;
use itertools::Itertools;
use std::fmt::{Display, Formatter};
use strum_macros::{Display as StrumDisplay, IntoStaticStr};

/// Why a stepper completes.
#[derive(Clone, Copy, PartialEq, Eq, Debug, StrumDisplay, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum StepReason {
    Normal,
    Return,
    Call,
    ExceptionFilter,
    ExceptionHandler,
    Intercept,
    Exit,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, StrumDisplay, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ExceptionEventKind {
    FirstChance,
    UserFirstChance,
    CatchHandlerFound,
    Unhandled,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, StrumDisplay, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ExceptionUnwindKind {
    UnwindBegin,
    Intercepted,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, StrumDisplay, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum LogSwitchReason {
    Created,
    Modified,
    Deleted,
}

/// Exception notification flags.
#[derive(Clone, Copy, PartialEq, Eq, Default, Debug)]
pub struct ExceptionFlags(pub u32);

impl ExceptionFlags {
    pub const NONE: ExceptionFlags = ExceptionFlags(0);
    pub const CAN_BE_INTERCEPTED: ExceptionFlags = ExceptionFlags(0x1);

    pub fn can_be_intercepted(&self) -> bool {
        self.0 & Self::CAN_BE_INTERCEPTED.0 != 0
    }
}

impl Display for ExceptionFlags {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut names = vec![];
        if self.can_be_intercepted() {
            names.push("can_be_intercepted".to_string());
        }
        let unknown = self.0 & !Self::CAN_BE_INTERCEPTED.0;
        if unknown != 0 {
            names.push(format!("{unknown:#x}"));
        }
        if names.is_empty() {
            return f.write_str("none");
        }
        f.write_str(&names.iter().join("|"))
    }
}

// --------------------------------- execution control ---------------------------------------------

#[derive(Clone, PartialEq, Debug)]
pub struct BreakpointHit {
    pub scope: ThreadScope,
    pub breakpoint: BreakpointId,
}

#[derive(Clone, PartialEq, Debug)]
pub struct BreakpointSetFailed {
    pub scope: ThreadScope,
    pub breakpoint: BreakpointId,
    pub error_code: u32,
}

#[derive(Clone, PartialEq, Debug)]
pub struct StepCompleted {
    pub scope: ThreadScope,
    pub stepper: StepperId,
    pub reason: StepReason,
}

/// User break (e.g. debugger break intrinsic called by debugee).
#[derive(Clone, PartialEq, Debug)]
pub struct Break {
    pub scope: ThreadScope,
}

// --------------------------------- exceptions ----------------------------------------------------

#[derive(Clone, PartialEq, Debug)]
pub struct ExceptionRaised {
    pub scope: ThreadScope,
    pub unhandled: bool,
}

#[derive(Clone, PartialEq, Debug)]
pub struct ExceptionContext {
    pub scope: ThreadScope,
    /// Frame where exception event occurs, absent for unhandled exceptions.
    pub frame: Option<FrameId>,
    pub offset: u32,
    pub kind: ExceptionEventKind,
    pub flags: ExceptionFlags,
}

#[derive(Clone, PartialEq, Debug)]
pub struct ExceptionUnwind {
    pub scope: ThreadScope,
    pub kind: ExceptionUnwindKind,
    pub flags: ExceptionFlags,
}

// --------------------------------- evaluation ----------------------------------------------------

#[derive(Clone, PartialEq, Debug)]
pub struct EvalCompleted {
    pub scope: ThreadScope,
    pub evaluation: EvalId,
}

#[derive(Clone, PartialEq, Debug)]
pub struct EvalFailed {
    pub scope: ThreadScope,
    pub evaluation: EvalId,
}

// --------------------------------- lifecycle -----------------------------------------------------

#[derive(Clone, PartialEq, Debug)]
pub struct ProcessCreated {
    pub process: ProcessId,
}

#[derive(Clone, PartialEq, Debug)]
pub struct ProcessExited {
    pub process: ProcessId,
}

#[derive(Clone, PartialEq, Debug)]
pub struct ThreadCreated {
    pub scope: ThreadScope,
}

#[derive(Clone, PartialEq, Debug)]
pub struct ThreadExited {
    pub scope: ThreadScope,
}

#[derive(Clone, PartialEq, Debug)]
pub struct ThreadRenamed {
    pub scope: ThreadScope,
    /// New thread name if the engine supplies it.
    pub name: Option<String>,
}

#[derive(Clone, PartialEq, Debug)]
pub struct DomainCreated {
    pub scope: DomainScope,
    pub name: String,
}

#[derive(Clone, PartialEq, Debug)]
pub struct DomainExited {
    pub scope: DomainScope,
}

#[derive(Clone, PartialEq, Debug)]
pub struct DomainRenamed {
    pub scope: DomainScope,
    pub name: Option<String>,
}

#[derive(Clone, PartialEq, Debug)]
pub struct ModuleLoaded {
    pub scope: DomainScope,
    pub module: ModuleId,
    pub name: String,
}

#[derive(Clone, PartialEq, Debug)]
pub struct ModuleUnloaded {
    pub scope: DomainScope,
    pub module: ModuleId,
}

#[derive(Clone, PartialEq, Debug)]
pub struct ClassLoaded {
    pub scope: DomainScope,
    pub class: ClassId,
    /// Module declaring the class.
    pub module: Option<ModuleId>,
}

#[derive(Clone, PartialEq, Debug)]
pub struct ClassUnloaded {
    pub scope: DomainScope,
    pub class: ClassId,
}

#[derive(Clone, PartialEq, Debug)]
pub struct AssemblyLoaded {
    pub scope: DomainScope,
    pub assembly: AssemblyId,
    pub name: String,
}

#[derive(Clone, PartialEq, Debug)]
pub struct AssemblyUnloaded {
    pub scope: DomainScope,
    pub assembly: AssemblyId,
}

#[derive(Clone, PartialEq, Debug)]
pub struct ModuleSymbolsUpdated {
    pub scope: DomainScope,
    pub module: ModuleId,
    /// Raw symbol stream content.
    pub symbols: Vec<u8>,
}

// --------------------------------- diagnostics ---------------------------------------------------

#[derive(Clone, PartialEq, Debug)]
pub struct DebuggerError {
    pub process: ProcessId,
    pub hresult: i32,
    pub error_code: u32,
}

#[derive(Clone, PartialEq, Debug)]
pub struct LogMessage {
    pub scope: ThreadScope,
    pub level: i32,
    pub switch_name: String,
    pub message: String,
}

#[derive(Clone, PartialEq, Debug)]
pub struct LogSwitchChanged {
    pub scope: ThreadScope,
    pub level: i32,
    pub reason: LogSwitchReason,
    pub switch_name: String,
    pub parent_name: String,
}

/// Notification addressed to an external diagnostic tool.
#[derive(Clone, PartialEq, Debug)]
pub struct ToolNotification {
    pub tool_id: String,
    pub thread: Option<ThreadId>,
    pub process: ProcessId,
    /// Notification name and xml payload as the tool produces it.
    pub payload: String,
}

/// Console interrupt (Ctrl+C) caught in debugee.
#[derive(Clone, PartialEq, Debug)]
pub struct ControlCTrap {
    pub process: ProcessId,
}

// --------------------------------- edit-and-continue ---------------------------------------------

#[derive(Clone, PartialEq, Debug)]
pub struct FunctionRemapOpportunity {
    pub scope: ThreadScope,
    pub old_function: FunctionId,
    pub new_function: FunctionId,
    pub old_offset: u32,
}

#[derive(Clone, PartialEq, Debug)]
pub struct FunctionRemapCompleted {
    pub scope: ThreadScope,
    pub function: FunctionId,
}

// --------------------------------- meta ----------------------------------------------------------

/// Failure inside dispatch layer itself.
#[derive(Clone, PartialEq, Debug)]
pub struct DispatchFailure {
    pub controller: Option<Controller>,
    pub cause: String,
    pub class: FailureClass,
    /// Kind of notification whose dispatch fails, if known.
    pub trigger: Option<NotificationKind>,
    /// Dispatch layer invariants may not hold anymore.
    pub fatal: bool,
}

impl DispatchFailure {
    pub fn new(
        err: &Error,
        controller: Option<Controller>,
        trigger: Option<NotificationKind>,
    ) -> Self {
        Self {
            controller,
            cause: err.to_string(),
            class: err.class(),
            trigger,
            fatal: err.is_fatal(),
        }
    }
}

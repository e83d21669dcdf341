//! Notification catalog.
//!
//! Every notification the native engine may deliver is a variant of [`RawNotification`].
//! After resolution against the context model it becomes a [`Notification`], a typed payload
//! with all references checked and the execution domain resolved. [`NotificationKind`] is a
//! plain tag of a notification and is used as a subscription key.

pub mod payload;
pub mod raw;

use crate::dispatch::entity::{Controller, ProcessId, ThreadId, ThreadScope};
use std::fmt;
use strum_macros::{EnumCount, EnumDiscriminants, EnumIter, IntoStaticStr};

pub use raw::RawNotification;

#[derive(Clone, PartialEq, Debug, EnumDiscriminants)]
#[strum_discriminants(name(NotificationKind))]
#[strum_discriminants(derive(Hash, PartialOrd, Ord, strum_macros::Display, EnumIter, EnumCount, IntoStaticStr))]
pub enum Notification {
    // execution control
    BreakpointHit(payload::BreakpointHit),
    BreakpointSetFailed(payload::BreakpointSetFailed),
    StepCompleted(payload::StepCompleted),
    Break(payload::Break),
    // exceptions
    ExceptionRaised(payload::ExceptionRaised),
    ExceptionContext(payload::ExceptionContext),
    ExceptionUnwind(payload::ExceptionUnwind),
    // evaluation
    EvalCompleted(payload::EvalCompleted),
    EvalFailed(payload::EvalFailed),
    // lifecycle
    ProcessCreated(payload::ProcessCreated),
    ProcessExited(payload::ProcessExited),
    ThreadCreated(payload::ThreadCreated),
    ThreadExited(payload::ThreadExited),
    ThreadRenamed(payload::ThreadRenamed),
    DomainCreated(payload::DomainCreated),
    DomainExited(payload::DomainExited),
    DomainRenamed(payload::DomainRenamed),
    ModuleLoaded(payload::ModuleLoaded),
    ModuleUnloaded(payload::ModuleUnloaded),
    ClassLoaded(payload::ClassLoaded),
    ClassUnloaded(payload::ClassUnloaded),
    AssemblyLoaded(payload::AssemblyLoaded),
    AssemblyUnloaded(payload::AssemblyUnloaded),
    ModuleSymbolsUpdated(payload::ModuleSymbolsUpdated),
    // diagnostics
    DebuggerError(payload::DebuggerError),
    LogMessage(payload::LogMessage),
    LogSwitchChanged(payload::LogSwitchChanged),
    ToolNotification(payload::ToolNotification),
    ControlCTrap(payload::ControlCTrap),
    // edit-and-continue
    FunctionRemapOpportunity(payload::FunctionRemapOpportunity),
    FunctionRemapCompleted(payload::FunctionRemapCompleted),
    // meta
    DispatchFailure(payload::DispatchFailure),
}

impl NotificationKind {
    /// True if notification of this kind creates or destroys an entity of context model.
    pub fn is_lifecycle(self) -> bool {
        matches!(
            self,
            NotificationKind::ProcessCreated
                | NotificationKind::ProcessExited
                | NotificationKind::ThreadCreated
                | NotificationKind::ThreadExited
                | NotificationKind::ThreadRenamed
                | NotificationKind::DomainCreated
                | NotificationKind::DomainExited
                | NotificationKind::DomainRenamed
                | NotificationKind::ModuleLoaded
                | NotificationKind::ModuleUnloaded
                | NotificationKind::ClassLoaded
                | NotificationKind::ClassUnloaded
                | NotificationKind::AssemblyLoaded
                | NotificationKind::AssemblyUnloaded
        )
    }

    /// True if payload of this kind carries a resolved [`ThreadScope`].
    pub fn is_thread_scoped(self) -> bool {
        matches!(
            self,
            NotificationKind::BreakpointHit
                | NotificationKind::BreakpointSetFailed
                | NotificationKind::StepCompleted
                | NotificationKind::Break
                | NotificationKind::ExceptionRaised
                | NotificationKind::ExceptionContext
                | NotificationKind::ExceptionUnwind
                | NotificationKind::EvalCompleted
                | NotificationKind::EvalFailed
                | NotificationKind::ThreadCreated
                | NotificationKind::ThreadExited
                | NotificationKind::ThreadRenamed
                | NotificationKind::LogMessage
                | NotificationKind::LogSwitchChanged
                | NotificationKind::FunctionRemapOpportunity
                | NotificationKind::FunctionRemapCompleted
        )
    }

    /// True for notifications raised by the dispatch layer itself, never by native engine.
    pub fn is_meta(self) -> bool {
        self == NotificationKind::DispatchFailure
    }
}

impl Notification {
    pub fn kind(&self) -> NotificationKind {
        self.into()
    }

    /// Resolved thread scope of thread-scoped notifications.
    pub fn thread_scope(&self) -> Option<&ThreadScope> {
        let scope = match self {
            Notification::BreakpointHit(n) => &n.scope,
            Notification::BreakpointSetFailed(n) => &n.scope,
            Notification::StepCompleted(n) => &n.scope,
            Notification::Break(n) => &n.scope,
            Notification::ExceptionRaised(n) => &n.scope,
            Notification::ExceptionContext(n) => &n.scope,
            Notification::ExceptionUnwind(n) => &n.scope,
            Notification::EvalCompleted(n) => &n.scope,
            Notification::EvalFailed(n) => &n.scope,
            Notification::ThreadCreated(n) => &n.scope,
            Notification::ThreadExited(n) => &n.scope,
            Notification::ThreadRenamed(n) => &n.scope,
            Notification::LogMessage(n) => &n.scope,
            Notification::LogSwitchChanged(n) => &n.scope,
            Notification::FunctionRemapOpportunity(n) => &n.scope,
            Notification::FunctionRemapCompleted(n) => &n.scope,
            _ => return None,
        };
        Some(scope)
    }

    /// Thread referenced by notification, if any.
    pub fn thread(&self) -> Option<ThreadId> {
        match self {
            Notification::ToolNotification(n) => n.thread,
            _ => self.thread_scope().map(|scope| scope.thread),
        }
    }

    /// Process referenced by notification. [`None`] only for failures without known controller.
    pub fn process(&self) -> Option<ProcessId> {
        if let Some(scope) = self.thread_scope() {
            return Some(scope.process);
        }
        match self {
            Notification::ProcessCreated(n) => Some(n.process),
            Notification::ProcessExited(n) => Some(n.process),
            Notification::DomainCreated(n) => Some(n.scope.process),
            Notification::DomainExited(n) => Some(n.scope.process),
            Notification::DomainRenamed(n) => Some(n.scope.process),
            Notification::ModuleLoaded(n) => Some(n.scope.process),
            Notification::ModuleUnloaded(n) => Some(n.scope.process),
            Notification::ClassLoaded(n) => Some(n.scope.process),
            Notification::ClassUnloaded(n) => Some(n.scope.process),
            Notification::AssemblyLoaded(n) => Some(n.scope.process),
            Notification::AssemblyUnloaded(n) => Some(n.scope.process),
            Notification::ModuleSymbolsUpdated(n) => Some(n.scope.process),
            Notification::DebuggerError(n) => Some(n.process),
            Notification::ToolNotification(n) => Some(n.process),
            Notification::ControlCTrap(n) => Some(n.process),
            Notification::DispatchFailure(n) => match n.controller {
                Some(Controller::Process(pid)) => Some(pid),
                _ => None,
            },
            _ => None,
        }
    }

    /// Controller the continuation decision of this notification applies to.
    pub fn controller(&self) -> Option<Controller> {
        if let Some(scope) = self.thread_scope() {
            return Some(Controller::Domain(scope.domain));
        }
        let controller = match self {
            Notification::ProcessCreated(n) => Controller::Process(n.process),
            Notification::ProcessExited(n) => Controller::Process(n.process),
            Notification::DomainCreated(n) => Controller::Process(n.scope.process),
            Notification::DomainExited(n) => Controller::Process(n.scope.process),
            Notification::DomainRenamed(n) => Controller::Process(n.scope.process),
            Notification::ModuleLoaded(n) => Controller::Domain(n.scope.domain),
            Notification::ModuleUnloaded(n) => Controller::Domain(n.scope.domain),
            Notification::ClassLoaded(n) => Controller::Domain(n.scope.domain),
            Notification::ClassUnloaded(n) => Controller::Domain(n.scope.domain),
            Notification::AssemblyLoaded(n) => Controller::Domain(n.scope.domain),
            Notification::AssemblyUnloaded(n) => Controller::Domain(n.scope.domain),
            Notification::ModuleSymbolsUpdated(n) => Controller::Domain(n.scope.domain),
            Notification::DebuggerError(n) => Controller::Process(n.process),
            Notification::ToolNotification(n) => Controller::Process(n.process),
            Notification::ControlCTrap(n) => Controller::Process(n.process),
            Notification::DispatchFailure(n) => return n.controller,
            _ => return None,
        };
        Some(controller)
    }

    /// Human-readable notification description for logs and traces.
    pub fn summary(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notification::BreakpointHit(n) => {
                write!(f, "breakpoint {} hit at {}", n.breakpoint, n.scope)
            }
            Notification::BreakpointSetFailed(n) => write!(
                f,
                "breakpoint {} set failed at {}, error code {:#x}",
                n.breakpoint, n.scope, n.error_code
            ),
            Notification::StepCompleted(n) => write!(
                f,
                "stepper {} complete ({}) at {}",
                n.stepper, n.reason, n.scope
            ),
            Notification::Break(n) => write!(f, "user break at {}", n.scope),
            Notification::ExceptionRaised(n) => {
                let kind = if n.unhandled { "unhandled" } else { "first chance" };
                write!(f, "{kind} exception at {}", n.scope)
            }
            Notification::ExceptionContext(n) => {
                write!(f, "exception event {} at {}", n.kind, n.scope)?;
                if let Some(frame) = n.frame {
                    write!(f, ", frame {frame} offset {:#x}", n.offset)?;
                }
                write!(f, ", flags: {}", n.flags)
            }
            Notification::ExceptionUnwind(n) => write!(
                f,
                "exception unwind {} at {}, flags: {}",
                n.kind, n.scope, n.flags
            ),
            Notification::EvalCompleted(n) => {
                write!(f, "evaluation {} complete at {}", n.evaluation, n.scope)
            }
            Notification::EvalFailed(n) => {
                write!(f, "evaluation {} failed at {}", n.evaluation, n.scope)
            }
            Notification::ProcessCreated(n) => write!(f, "process {} created", n.process),
            Notification::ProcessExited(n) => write!(f, "process {} exited", n.process),
            Notification::ThreadCreated(n) => write!(f, "{} created", n.scope),
            Notification::ThreadExited(n) => write!(f, "{} exited", n.scope),
            Notification::ThreadRenamed(n) => match &n.name {
                Some(name) => write!(f, "{} renamed to \"{name}\"", n.scope),
                None => write!(f, "{} renamed", n.scope),
            },
            Notification::DomainCreated(n) => {
                write!(f, "{} created with name \"{}\"", n.scope, n.name)
            }
            Notification::DomainExited(n) => write!(f, "{} exited", n.scope),
            Notification::DomainRenamed(n) => match &n.name {
                Some(name) => write!(f, "{} renamed to \"{name}\"", n.scope),
                None => write!(f, "{} renamed", n.scope),
            },
            Notification::ModuleLoaded(n) => write!(
                f,
                "module {} \"{}\" loaded into {}",
                n.module, n.name, n.scope
            ),
            Notification::ModuleUnloaded(n) => {
                write!(f, "module {} unloaded from {}", n.module, n.scope)
            }
            Notification::ClassLoaded(n) => {
                write!(f, "class {} loaded into {}", n.class, n.scope)?;
                if let Some(module) = n.module {
                    write!(f, " from module {module}")?;
                }
                Ok(())
            }
            Notification::ClassUnloaded(n) => {
                write!(f, "class {} unloaded from {}", n.class, n.scope)
            }
            Notification::AssemblyLoaded(n) => write!(
                f,
                "assembly {} \"{}\" loaded into {}",
                n.assembly, n.name, n.scope
            ),
            Notification::AssemblyUnloaded(n) => {
                write!(f, "assembly {} unloaded from {}", n.assembly, n.scope)
            }
            Notification::ModuleSymbolsUpdated(n) => write!(
                f,
                "module {} symbols updated in {} ({} bytes)",
                n.module,
                n.scope,
                n.symbols.len()
            ),
            Notification::DebuggerError(n) => write!(
                f,
                "debugger error in process {}: hresult {:#010x}, error code {}",
                n.process, n.hresult, n.error_code
            ),
            Notification::LogMessage(n) => write!(
                f,
                "log message [{}:{}] at {}: {}",
                n.switch_name,
                n.level,
                n.scope,
                n.message.trim_end()
            ),
            Notification::LogSwitchChanged(n) => write!(
                f,
                "log switch \"{}\" (parent \"{}\") {} with level {} at {}",
                n.switch_name, n.parent_name, n.reason, n.level, n.scope
            ),
            Notification::ToolNotification(n) => {
                write!(f, "tool {} notification in process {}", n.tool_id, n.process)?;
                if let Some(thread) = n.thread {
                    write!(f, ", thread {thread}")?;
                }
                write!(f, ": {} bytes of payload", n.payload.len())
            }
            Notification::ControlCTrap(n) => {
                write!(f, "ctrl+c trapped in process {}", n.process)
            }
            Notification::FunctionRemapOpportunity(n) => write!(
                f,
                "function {} can be remapped to {} at offset {:#x}, {}",
                n.old_function, n.new_function, n.old_offset, n.scope
            ),
            Notification::FunctionRemapCompleted(n) => {
                write!(f, "function {} remapped at {}", n.function, n.scope)
            }
            Notification::DispatchFailure(n) => {
                if n.fatal {
                    f.write_str("fatal ")?;
                }
                write!(f, "{} failure", n.class)?;
                if let Some(kind) = n.trigger {
                    write!(f, " while dispatching {kind}")?;
                }
                if let Some(controller) = n.controller {
                    write!(f, " ({controller})")?;
                }
                write!(f, ": {}", n.cause)
            }
        }
    }
}

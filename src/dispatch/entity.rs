//! Identities of debugee entities referenced by notifications.
//!
//! Entities themselves belong to the native engine, this layer only keeps their identities.

use crate::dispatch::context::ContextModel;
use std::fmt::{Display, Formatter};

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident($repr:ty), $fmt:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        pub struct $name(pub $repr);

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, $fmt, self.0)
            }
        }

        impl From<$repr> for $name {
            fn from(value: $repr) -> Self {
                Self(value)
            }
        }
    };
}

entity_id!(
    /// Debugee process id.
    ProcessId(u32),
    "{}"
);
entity_id!(
    /// Execution domain (isolated execution context inside a process).
    DomainId(u32),
    "#{}"
);
entity_id!(
    /// Debugee thread id.
    ThreadId(u32),
    "{}"
);
entity_id!(ModuleId(u64), "{:#x}");
entity_id!(AssemblyId(u64), "{:#x}");
entity_id!(
    /// Class metadata token.
    ClassId(u32),
    "{:#010x}"
);
entity_id!(
    /// Function metadata token.
    FunctionId(u32),
    "{:#010x}"
);
entity_id!(BreakpointId(u64), "{}");
entity_id!(StepperId(u64), "{}");
entity_id!(EvalId(u64), "{}");
entity_id!(FrameId(u64), "{}");

/// Entity that can be asked to resume or suspend execution.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Controller {
    Process(ProcessId),
    Domain(DomainId),
}

impl Controller {
    /// Return process that owns this controller. For a domain controller the process is taken
    /// from the context model, so [`None`] returns if domain is unknown.
    pub fn process(&self, model: &ContextModel) -> Option<ProcessId> {
        match self {
            Controller::Process(pid) => Some(*pid),
            Controller::Domain(domain) => model.lookup_domain(*domain).map(|d| d.process),
        }
    }
}

impl Display for Controller {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Controller::Process(pid) => write!(f, "process {pid}"),
            Controller::Domain(domain) => write!(f, "domain {domain}"),
        }
    }
}

/// Thread handle as the native engine reports it.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct RawThread {
    pub id: ThreadId,
    /// Domain the engine reports for this thread, may be absent.
    pub domain: Option<DomainId>,
}

impl RawThread {
    pub fn new(id: ThreadId) -> Self {
        Self { id, domain: None }
    }

    pub fn in_domain(id: ThreadId, domain: DomainId) -> Self {
        Self {
            id,
            domain: Some(domain),
        }
    }
}

impl From<ThreadId> for RawThread {
    fn from(id: ThreadId) -> Self {
        Self { id, domain: None }
    }
}

/// Resolved context of a thread-scoped notification.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct ThreadScope {
    pub process: ProcessId,
    pub domain: DomainId,
    pub thread: ThreadId,
}

impl ThreadScope {
    pub fn domain_scope(&self) -> DomainScope {
        DomainScope {
            process: self.process,
            domain: self.domain,
        }
    }
}

impl Display for ThreadScope {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "thread {} (domain {}, process {})",
            self.thread, self.domain, self.process
        )
    }
}

/// Resolved context of a domain-scoped notification.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct DomainScope {
    pub process: ProcessId,
    pub domain: DomainId,
}

impl Display for DomainScope {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "domain {} (process {})", self.domain, self.process)
    }
}

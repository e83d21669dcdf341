use crate::dispatch::entity::{AssemblyId, ClassId, DomainId, ModuleId, ProcessId, ThreadId};
use crate::dispatch::notification::NotificationKind;
use crate::dispatch::subscription::SubscriptionHandle;
use strum_macros::{Display, IntoStaticStr};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    // --------------------------------- context resolution errors ---------------------------------
    #[error("unknown process {0}")]
    UnknownProcess(ProcessId),
    #[error("unknown execution domain {0}")]
    UnknownDomain(DomainId),
    #[error("unknown thread {0}")]
    UnknownThread(ThreadId),
    #[error("unknown module {0}")]
    UnknownModule(ModuleId),
    #[error("unknown assembly {0}")]
    UnknownAssembly(AssemblyId),
    #[error("unknown class {0}")]
    UnknownClass(ClassId),
    #[error("execution domain not supplied and thread {0} has no owning domain")]
    NoDomain(ThreadId),
    #[error("{0} {1} already known")]
    AlreadyKnown(&'static str, String),

    // --------------------------------- subscriber errors -----------------------------------------
    #[error("subscriber {0} fail: {1:#}")]
    Subscriber(SubscriptionHandle, anyhow::Error),
    #[error("subscriber {0} panicked: {1}")]
    SubscriberPanic(SubscriptionHandle, String),
    #[error("subscriber {0} invoked while already running")]
    SubscriberBusy(SubscriptionHandle),

    // --------------------------------- protocol errors -------------------------------------------
    #[error("notification {incoming} delivered while {in_flight} dispatch is in progress")]
    ProtocolViolation {
        incoming: NotificationKind,
        in_flight: NotificationKind,
    },
    #[error("context model is borrowed outside of dispatcher while {0} dispatching")]
    ModelBorrowed(NotificationKind),

    // --------------------------------- configuration errors --------------------------------------
    #[error(transparent)]
    IO(#[from] std::io::Error),
    #[error("config parsing error: {0}")]
    ConfigParsing(#[from] toml::de::Error),
}

/// Class of a dispatch failure, reported with a `DispatchFailure` notification.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Display, IntoStaticStr)]
pub enum FailureClass {
    /// Native context could not be mapped to a known entity.
    #[strum(serialize = "context resolution")]
    Resolution,
    /// Subscriber callback returns an error or panics.
    #[strum(serialize = "subscriber")]
    Subscriber,
    /// Native engine boundary contract broken (reentrant or concurrent delivery).
    #[strum(serialize = "protocol violation")]
    Protocol,
    /// Configuration can't be loaded. Such errors happen before dispatch and are only logged,
    /// never reported with `DispatchFailure`.
    #[strum(serialize = "configuration")]
    Config,
}

impl Error {
    pub fn class(&self) -> FailureClass {
        match self {
            Error::UnknownProcess(_)
            | Error::UnknownDomain(_)
            | Error::UnknownThread(_)
            | Error::UnknownModule(_)
            | Error::UnknownAssembly(_)
            | Error::UnknownClass(_)
            | Error::NoDomain(_)
            | Error::AlreadyKnown(_, _) => FailureClass::Resolution,
            Error::Subscriber(_, _) | Error::SubscriberPanic(_, _) | Error::SubscriberBusy(_) => {
                FailureClass::Subscriber
            }
            Error::ProtocolViolation { .. } | Error::ModelBorrowed(_) => FailureClass::Protocol,
            Error::IO(_) | Error::ConfigParsing(_) => FailureClass::Config,
        }
    }

    /// Return a hint - layer invariants still hold after error or not.
    pub fn is_fatal(&self) -> bool {
        match self {
            Error::UnknownProcess(_) => false,
            Error::UnknownDomain(_) => false,
            Error::UnknownThread(_) => false,
            Error::UnknownModule(_) => false,
            Error::UnknownAssembly(_) => false,
            Error::UnknownClass(_) => false,
            Error::NoDomain(_) => false,
            Error::AlreadyKnown(_, _) => false,
            Error::Subscriber(_, _) => false,
            Error::SubscriberPanic(_, _) => false,
            Error::SubscriberBusy(_) => false,
            Error::IO(_) => false,
            Error::ConfigParsing(_) => false,

            // engine boundary contract is broken
            Error::ProtocolViolation { .. } => true,
            Error::ModelBorrowed(_) => true,
        }
    }
}

#[macro_export]
macro_rules! _error {
    ($log_fn: path, $res: expr) => {
        match $res {
            Ok(value) => Some(value),
            Err(e) => {
                $log_fn!(target: "dispatch", "{:#}", e);
                None
            }
        }
    };
    ($log_fn: path, $res: expr, $msg: tt) => {
        match $res {
            Ok(value) => Some(value),
            Err(e) => {
                $log_fn!(target: "dispatch", concat!($msg, " {:#}"), e);
                None
            }
        }
    };
}

/// Transforms `Result` into `Option` and logs an error if it occurs.
#[macro_export]
macro_rules! weak_error {
    ($res: expr) => {
        $crate::_error!(log::warn, $res)
    };
    ($res: expr, $msg: tt) => {
        $crate::_error!(log::warn, $res, $msg)
    };
}

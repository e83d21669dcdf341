use log::LevelFilter;
use std::sync::atomic::{AtomicBool, Ordering};

static ENABLED: AtomicBool = AtomicBool::new(true);

#[inline(always)]
pub fn is_enabled() -> bool {
    ENABLED.load(Ordering::SeqCst)
}

pub fn disable() {
    ENABLED.store(false, Ordering::SeqCst)
}

pub fn enable() {
    ENABLED.store(true, Ordering::SeqCst)
}

/// Install `env_logger` as a logging backend.
/// `RUST_LOG` environment variable takes precedence over `default_level`.
///
/// Return false if logger already installed.
pub fn init(default_level: LevelFilter) -> bool {
    let env = env_logger::Env::default().default_filter_or(default_level.as_str());
    env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .try_init()
        .is_ok()
}

#[doc(hidden)]
#[macro_export]
macro_rules! _bs_log {
    ($log_fn: path, target: $target:expr, $($arg:tt)+) => {
        if $crate::log::is_enabled() {
            $log_fn!(target: $target, $($arg)+)
        }
    };
    ($log_fn: path, $($arg:tt)+) => {
        if $crate::log::is_enabled() {
            $log_fn!($($arg)+)
        }
    };
}

/// Like [`log::info`] but muted when crate logging is disabled.
#[macro_export]
macro_rules! bs_info {
    ($($arg:tt)+) => { $crate::_bs_log!(log::info, $($arg)+) };
}

#[macro_export]
macro_rules! bs_warn {
    ($($arg:tt)+) => { $crate::_bs_log!(log::warn, $($arg)+) };
}

#[macro_export]
macro_rules! bs_error {
    ($($arg:tt)+) => { $crate::_bs_log!(log::error, $($arg)+) };
}

#[macro_export]
macro_rules! bs_debug {
    ($($arg:tt)+) => { $crate::_bs_log!(log::debug, $($arg)+) };
}

//! Debug-event dispatch layer.
//!
//! Native debugging engine delivers debug notifications (breakpoint hits, thread and module
//! lifecycle, exceptions, etc.) one by one through [`dispatch::NotificationSink`]. For each of
//! them [`dispatch::Dispatcher`] resolves its context against a mirror of debugee entities,
//! calls subscribers and answers the engine whether debugee should resume.

pub mod dispatch;
pub mod log;

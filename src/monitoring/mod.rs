/*!
 * Monitoring
 * Structured tracing, the in-simulation event log and run statistics
 */

mod event_log;
mod statistics;
mod tracer;

pub use event_log::{EventColor, EventLog, LogEntry};
pub use statistics::{ProcessStatEntry, StatisticKind, Statistics};
pub use tracer::{init_tracing, span_tick, TickSpan};

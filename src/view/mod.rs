/*!
 * Presentation
 * Read-only snapshots of the scheduler and their text rendering
 */

mod snapshot;

pub use snapshot::{ProcessorView, SchedulerSnapshot};

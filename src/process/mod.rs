/*!
 * Process Module
 * Simulated tasks, their fork trees and the process arena
 */

mod control;
mod forking;
mod table;
pub mod types;

// Re-export for convenience
pub use control::Process;
pub use forking::{ForkingData, ParentLink};
pub use table::ProcessTable;
pub use types::{IoEvent, ProcessSpec, ProcessState};

/*!
 * Core Types
 * Common types used across the simulator
 */

/// Process ID type
pub type Pid = u32;

/// Discrete simulation time, in ticks
pub type Tick = u64;

/// Index of a processor in registration order
pub type ProcessorId = usize;

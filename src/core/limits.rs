/*!
 * Simulation Limits and Constants
 *
 * Centralized location for fixed policy thresholds and defaults.
 * Organized by subsystem.
 */

use std::time::Duration;

// =============================================================================
// FORKING
// =============================================================================

/// Number of child slots in a process fork tree.
/// A process may fork at most this many children over its lifetime.
pub const FORK_CHILD_SLOTS: usize = 2;

// =============================================================================
// LOAD BALANCING
// =============================================================================

/// Relative imbalance `(max - min) / max` above which work stealing moves
/// processes from the most loaded processor to the least loaded one.
pub const STEAL_LIMIT_THRESHOLD: f64 = 0.4;

// =============================================================================
// OVERHEATING
// =============================================================================

/// Default chance, in parts per thousand, that a processor overheats on a tick
pub const DEFAULT_OVERHEAT_PERMILLE: u32 = 5;

/// Default number of ticks a processor stays in STOP after overheating
pub const DEFAULT_OVERHEAT_DELAY: u64 = 10;

// =============================================================================
// HOST LOOP
// =============================================================================

/// Real-time delay between ticks in step-by-step mode
pub const STEP_BY_STEP_DELAY: Duration = Duration::from_secs(1);

/// Number of recent messages kept by the in-simulation event log
pub const EVENT_LOG_CAPACITY: usize = 64;

/// Default safety bound for `run_until_finished`
pub const DEFAULT_TICK_LIMIT: u64 = 1_000_000;

/// Default seed used when none is configured
pub const DEFAULT_SEED: u64 = 0x5eed_cafe;

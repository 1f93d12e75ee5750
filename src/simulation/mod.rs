/*!
 * Simulation
 * Playback control, the per-run context, randomness and the kill schedule
 */

mod context;
mod info;
mod random;
mod sigkill;

pub use context::SimulationContext;
pub use info::{SimulationInfo, SimulationMode, SimulationState};
pub use random::{RandomSource, ScriptedRandom, SeededRandom};
pub use sigkill::{SigKill, SigkillSchedule};

/*!
 * Event Log
 * Bounded audit trail of simulation messages with nested colour scoping
 */

use crate::core::types::Tick;
use serde::Serialize;
use std::collections::VecDeque;
use std::fmt;

/// Display colour of a log entry
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventColor {
    #[default]
    Default,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
}

impl EventColor {
    /// ANSI foreground escape
    pub fn ansi(self) -> &'static str {
        match self {
            EventColor::Default => "\x1b[39m",
            EventColor::Red => "\x1b[31m",
            EventColor::Green => "\x1b[32m",
            EventColor::Yellow => "\x1b[33m",
            EventColor::Blue => "\x1b[34m",
            EventColor::Magenta => "\x1b[35m",
            EventColor::Cyan => "\x1b[36m",
        }
    }
}

/// One log line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogEntry {
    pub timestep: Tick,
    pub message: String,
    pub color: EventColor,
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.timestep, self.message)
    }
}

/// Keeps the most recent `capacity` messages. Every message is also emitted
/// as a `tracing` event under the `sched_sim::events` target.
#[derive(Debug, Clone)]
pub struct EventLog {
    entries: VecDeque<LogEntry>,
    colors: Vec<EventColor>,
    capacity: usize,
}

impl EventLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            colors: Vec::new(),
            capacity,
        }
    }

    /// Colour applied to messages logged without an explicit one
    pub fn current_color(&self) -> EventColor {
        self.colors.last().copied().unwrap_or_default()
    }

    pub fn push_color(&mut self, color: EventColor) {
        self.colors.push(color);
    }

    pub fn pop_color(&mut self) -> Option<EventColor> {
        self.colors.pop()
    }

    /// Log with the current scoped colour
    pub fn log(&mut self, timestep: Tick, message: impl Into<String>) {
        let color = self.current_color();
        self.log_colored(timestep, message, color);
    }

    pub fn log_colored(&mut self, timestep: Tick, message: impl Into<String>, color: EventColor) {
        let message = message.into();
        tracing::info!(target: "sched_sim::events", timestep, "{}", message);

        if self.capacity == 0 {
            return;
        }
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(LogEntry {
            timestep,
            message,
            color,
        });
    }

    pub fn entries(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    /// The `count` most recent entries, oldest first
    pub fn recent(&self, count: usize) -> Vec<LogEntry> {
        let skip = self.entries.len().saturating_sub(count);
        self.entries.iter().skip(skip).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.colors.clear();
    }
}

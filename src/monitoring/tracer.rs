/*!
 * Structured Tracing
 * Subscriber setup and per-tick spans using the tracing crate
 *
 * Features:
 * - Env-filtered output (RUST_LOG)
 * - JSON-formatted logs for structured parsing
 * - One span per simulated tick, timed against wall clock
 */

use crate::core::types::Tick;
use std::time::Instant;
use tracing::{debug, info, span, warn, Level, Span};
use tracing_subscriber::{
    fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

/// Wall-clock time above which a single tick is reported as slow
const SLOW_TICK_MS: u128 = 50;

/// Initialize structured tracing
///
/// Environment variables:
/// - RUST_LOG: Set log level (default: info)
/// - SCHED_SIM_TRACE_JSON: Enable JSON output (default: false)
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let use_json = std::env::var("SCHED_SIM_TRACE_JSON")
        .map(|v| v == "1" || v == "true")
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(env_filter);

    // try_init: tests and embedding hosts may have installed a subscriber already
    if use_json {
        let _ = registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_line_number(true)
                    .with_file(true)
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_span_events(FmtSpan::CLOSE)
                    .with_writer(std::io::stderr),
            )
            .try_init();
        info!("Structured tracing initialized with JSON output");
    } else {
        let _ = registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_line_number(true)
                    .compact()
                    .with_writer(std::io::stderr),
            )
            .try_init();
        debug!("Structured tracing initialized");
    }
}

/// Span covering one scheduler update
pub struct TickSpan {
    span: Span,
    start: Instant,
    timestep: Tick,
}

impl TickSpan {
    pub fn new(timestep: Tick) -> Self {
        let span = span!(
            Level::DEBUG,
            "tick",
            timestep,
            duration_us = tracing::field::Empty,
            terminated = tracing::field::Empty,
        );

        Self {
            span,
            start: Instant::now(),
            timestep,
        }
    }

    /// Record the terminated count reached by the end of the tick
    pub fn record_terminated(&self, count: usize) {
        self.span.record("terminated", count);
    }

    /// Enter the span context
    pub fn enter(&self) -> tracing::span::Entered<'_> {
        self.span.enter()
    }
}

impl Drop for TickSpan {
    fn drop(&mut self) {
        let duration = self.start.elapsed();
        let _entered = self.span.enter();
        self.span.record("duration_us", duration.as_micros());

        if duration.as_millis() > SLOW_TICK_MS {
            warn!(
                timestep = self.timestep,
                duration_ms = duration.as_millis(),
                slow = true,
                "slow tick detected"
            );
        }
    }
}

/// Helper to create a tick span
#[inline]
pub fn span_tick(timestep: Tick) -> TickSpan {
    TickSpan::new(timestep)
}

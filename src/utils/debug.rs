//! Per-query debug output routed through the `log` facade
//!
//! Messages gated by [`DebugOptions`] are emitted at `info` level so a user
//! who asked for debugging on one query sees them without raising the global
//! filter. Ungated diagnostics in the crate use `log::debug!` directly.

use crate::types::DebugOptions;

const TARGET: &str = "multisearch::debug";

/// Log a message if debugging is enabled
pub fn log(options: &Option<DebugOptions>, message: &str, data: &str) {
    if enabled(options, |_| true) {
        if data.is_empty() {
            log::info!(target: TARGET, "{message}");
        } else {
            log::info!(target: TARGET, "{message}: {data}");
        }
    }
}

/// Log request details if request logging is enabled
pub fn log_request(options: &Option<DebugOptions>, message: &str, data: &str) {
    if enabled(options, |o| o.log_requests) {
        log::info!(target: TARGET, "REQUEST: {message}: {data}");
    }
}

/// Log response details if response logging is enabled
pub fn log_response(options: &Option<DebugOptions>, message: &str) {
    if enabled(options, |o| o.log_responses) {
        log::info!(target: TARGET, "RESPONSE: {message}");
    }
}

fn enabled(options: &Option<DebugOptions>, extra: impl Fn(&DebugOptions) -> bool) -> bool {
    options.as_ref().is_some_and(|o| o.enabled && extra(o))
}

/// Create default debug options with all logging enabled
pub fn debug_all() -> DebugOptions {
    DebugOptions {
        enabled: true,
        log_requests: true,
        log_responses: true,
    }
}

/// Create debug options with only basic logging enabled
pub fn debug_basic() -> DebugOptions {
    DebugOptions {
        enabled: true,
        log_requests: false,
        log_responses: false,
    }
}

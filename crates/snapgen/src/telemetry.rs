//! Process-wide tracing setup.

use std::sync::atomic::{AtomicBool, Ordering};

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Filter directives, e.g. `snapgen=debug`.
pub const LOG_ENV: &str = "SNAPGEN_LOG";
/// Set to `json` for structured output.
pub const LOG_FORMAT_ENV: &str = "SNAPGEN_LOG_FORMAT";

static INITIALIZED: AtomicBool = AtomicBool::new(false);

fn json_requested() -> bool {
    std::env::var(LOG_FORMAT_ENV).is_ok_and(|v| v.trim().eq_ignore_ascii_case("json"))
}

/// Installs the global subscriber and bridges `log` records into it.
///
/// Returns false when tracing was already initialised, by this function or
/// by someone else.
pub fn init_tracing(default_filter: &str) -> bool {
    if INITIALIZED.swap(true, Ordering::AcqRel) {
        return false;
    }

    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_filter));
    let registry = tracing_subscriber::registry().with(filter);

    let installed = if json_requested() {
        tracing::subscriber::set_global_default(registry.with(fmt::layer().json()))
    } else {
        tracing::subscriber::set_global_default(registry.with(fmt::layer()))
    };
    if let Err(e) = installed {
        eprintln!("Tracing subscriber already set: {}", e);
        return false;
    }

    if let Err(e) = tracing_log::LogTracer::init() {
        tracing::warn!("log bridge not installed: {}", e);
    }
    true
}

//! Internal diagnostics
//!
//! The facility reports its own lifecycle (context creation, default
//! logger construction, rejected configuration, failed writes) as
//! `tracing` events, separate from the records application code emits
//! through a [`Logger`](crate::Logger). This module routes those events to
//! stderr so they never mix with the JSON lines on stdout.

use std::io;
use std::sync::Once;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Crate targets whose events pass the default filter: the library
/// itself and the `fwlog` binary.
pub const DIAGNOSTIC_TARGETS: &[&str] = &["fwlog_logging", "fwlog"];

/// Diagnostics profile
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    /// Human-readable events at debug
    Development,
    /// JSON events at info
    Production,
    /// Nothing is printed; tests assert on captured records instead
    Test,
}

impl Profile {
    /// Level applied to [`DIAGNOSTIC_TARGETS`] when `RUST_LOG` is unset
    pub fn default_level(self) -> &'static str {
        match self {
            Profile::Development => "debug",
            Profile::Production => "info",
            Profile::Test => "off",
        }
    }

    /// `EnvFilter` directives used when `RUST_LOG` is unset
    pub fn default_directives(self) -> String {
        DIAGNOSTIC_TARGETS
            .iter()
            .map(|target| format!("{}={}", target, self.default_level()))
            .collect::<Vec<_>>()
            .join(",")
    }

    fn filter(self) -> EnvFilter {
        if self == Profile::Test {
            return EnvFilter::new("off");
        }
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.default_directives()))
    }
}

static INSTALL: Once = Once::new();

/// Install the diagnostics subscriber for `profile`
///
/// Only the first call in a process has an effect. A global subscriber
/// installed by the host application is left in place.
///
/// # Example
///
/// ```
/// use fwlog_logging::diagnostics::{init, Profile};
///
/// init(Profile::Test);
/// ```
pub fn init(profile: Profile) {
    INSTALL.call_once(|| {
        let human = (profile == Profile::Development)
            .then(|| fmt::layer().with_writer(io::stderr));
        let json = (profile == Profile::Production)
            .then(|| fmt::layer().json().with_writer(io::stderr));

        let installed = tracing_subscriber::registry()
            .with(profile.filter())
            .with(human)
            .with(json)
            .try_init();
        if installed.is_err() {
            tracing::debug!(?profile, "diagnostics subscriber already installed");
        }
    });
}

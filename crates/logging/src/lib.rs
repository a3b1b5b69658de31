#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `logging` owns the one piece of ambient configuration `fcp` exposes on the
//! command line: the `-v` verbosity flag. It turns a repeat count into a
//! [`Verbosity`] level and wires up [`tracing_subscriber`] so every other
//! crate in the workspace can log through the ordinary `tracing` macros
//! (`tracing::debug!`, `tracing::info!`, `tracing::error!`) without knowing
//! how output is ultimately rendered.
//!
//! # Design
//!
//! [`Verbosity::from_flag_count`] mirrors the CLI's `-v` counting behaviour:
//! zero occurrences is [`Verbosity::Normal`] (info and above), one or more is
//! [`Verbosity::Debug`] (everything, including the pool's per-packet trace
//! lines). [`init`] installs a global subscriber once per process; calling it
//! more than once is a no-op rather than a panic, since tests and the
//! `fcp`/`fcpd` binaries may both want to initialise logging defensively.
//!
//! # Invariants
//!
//! - [`init`] never panics even if a subscriber is already installed.
//! - Output format has no target module path or timestamp, matching the
//!   single `%(message)s` format the original tool used so wire-level traces
//!   stay readable during manual debugging.
//!
//! # Examples
//!
//! ```
//! use logging::{init, Verbosity};
//!
//! init(Verbosity::from_flag_count(1));
//! tracing::debug!("pool: registered socket");
//! ```

use std::sync::Once;

use tracing_subscriber::EnvFilter;

/// The verbosity level selected by the CLI's `-v` flag.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Verbosity {
    /// Info, warn, and error lines only.
    #[default]
    Normal,
    /// Everything, including per-packet pool tracing.
    Debug,
}

impl Verbosity {
    /// Maps a `-v` repeat count to a verbosity level.
    ///
    /// Any nonzero count enables debug output; `fcp` does not distinguish
    /// `-v` from `-vv`.
    #[must_use]
    pub const fn from_flag_count(count: u8) -> Self {
        if count == 0 {
            Self::Normal
        } else {
            Self::Debug
        }
    }

    fn filter_directive(self) -> &'static str {
        match self {
            Self::Normal => "info",
            Self::Debug => "debug",
        }
    }
}

static INIT: Once = Once::new();

/// Installs a process-wide `tracing` subscriber at the given verbosity.
///
/// Safe to call more than once; only the first call takes effect, matching
/// the behaviour callers expect from a idempotent setup routine.
pub fn init(verbosity: Verbosity) {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(verbosity.filter_directive()));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_level(false)
            .without_time()
            .init();
    });
}

//! Tracing setup for the resolver and its driver
//!
//! `TERN_LOG` picks what is logged, with the same syntax as `RUST_LOG`
//! (which it overrides). `TERN_LOG_FORMAT` picks how:
//!
//! - `text` (default): flat lines from the `fmt` subscriber
//! - `json`: one JSON object per event, for tooling
//!
//! ```bash
//! TERN_LOG=tern_resolve=debug cargo test -p tern_resolve -- --nocapture
//! TERN_LOG=trace TERN_LOG_FORMAT=json cargo test 2> trace.jsonl
//! ```
//!
//! Without either variable only warnings are shown. Output goes to stderr.

use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter, Registry};

/// Level used when neither `TERN_LOG` nor `RUST_LOG` is set
const DEFAULT_DIRECTIVES: &str = "warn";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl LogFormat {
    fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Text,
        }
    }

    fn from_env() -> Self {
        Self::parse(&std::env::var("TERN_LOG_FORMAT").unwrap_or_default())
    }
}

/// `TERN_LOG`, then `RUST_LOG`, then warnings only
fn directives() -> String {
    std::env::var("TERN_LOG")
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| DEFAULT_DIRECTIVES.to_string())
}

/// Install the global subscriber. Later calls leave the first one in place.
pub fn init_tracing() {
    let filter = EnvFilter::builder().parse_lossy(directives());
    let installed = match LogFormat::from_env() {
        LogFormat::Json => {
            let json_layer = fmt::layer().json().with_writer(std::io::stderr);
            Registry::default().with(filter).with(json_layer).try_init().is_ok()
        }
        LogFormat::Text => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init()
            .is_ok(),
    };
    if installed {
        tracing::debug!("tracing initialised");
    }
}

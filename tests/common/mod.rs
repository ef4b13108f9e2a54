//! Shared helpers for the integration tests: tracing setup and small tree
//! fixtures.
//!
//! # Tracing
//!
//! ```rust,ignore
//! mod common;
//!
//! #[test]
//! fn my_test() {
//!     common::init_tracing();
//!     // ... tree operations; with `--features tracing` the crate's
//!     // structural events land in the log file too.
//! }
//! ```
//!
//! Environment variables:
//! - `RUST_LOG`: Filter directives (e.g., `ttree=debug,ttree::tree::balance=trace`)
//! - `TTREE_LOG_DIR`: Log directory (default: `logs/`)
//! - `TTREE_LOG_CONSOLE`: Set to "0" to disable console output
//!
//! Logs are appended to `logs/ttree.jsonl` as newline-delimited JSON:
//!
//! ```bash
//! # Every rotation, in order
//! jq 'select(.fields.message | test("rotation"))' logs/ttree.jsonl
//!
//! # Key migrations with the number of keys moved
//! jq 'select(.fields.moved != null) | .fields' logs/ttree.jsonl
//! ```

#![allow(dead_code)]

use std::env;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Once;

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};
use ttree::{TTree, TreeConfig};

// ============================================================================
//  Tracing
// ============================================================================

/// Ensures tracing is only initialized once across all tests.
static INIT: Once = Once::new();

/// Initialize console and NDJSON file logging.
///
/// Safe to call multiple times - only the first call takes effect.
pub fn init_tracing() {
    INIT.call_once(setup_tracing);
}

/// Configuration for tracing setup.
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Directory for log files.
    pub log_dir: PathBuf,
    /// Log file name.
    pub log_file: String,
    /// Enable console output.
    pub console_enabled: bool,
    /// Default log level if RUST_LOG is not set.
    pub default_level: Level,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            log_dir: PathBuf::from("logs"),
            log_file: "ttree.jsonl".to_string(),
            console_enabled: true,
            default_level: Level::INFO,
        }
    }
}

impl TracingConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(dir) = env::var("TTREE_LOG_DIR") {
            config.log_dir = PathBuf::from(dir);
        }

        if env::var("TTREE_LOG_CONSOLE").is_ok_and(|v| v == "0") {
            config.console_enabled = false;
        }

        config
    }
}

/// Create an EnvFilter from RUST_LOG or use default level.
fn make_filter(default_level: Level) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(format!("{default_level}")))
}

#[expect(clippy::expect_used)]
fn setup_tracing() {
    let config = TracingConfig::from_env();

    std::fs::create_dir_all(&config.log_dir).expect("Failed to create log directory");
    let log_path = config.log_dir.join(&config.log_file);

    // Append: each test binary runs in its own process.
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .expect("Failed to open log file");

    let console_layer = config.console_enabled.then(|| {
        tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_line_number(true)
            .with_test_writer()
            .compact()
            .with_filter(make_filter(config.default_level))
    });

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::sync::Mutex::new(file))
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .json()
        .with_filter(make_filter(config.default_level));

    let _ = Registry::default()
        .with(console_layer)
        .with(file_layer)
        .try_init();
}

// ============================================================================
//  Fixtures
// ============================================================================

/// Item with an embedded key, as stored by most callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub id: u64,
    pub payload: String,
}

impl Record {
    pub fn new(id: u64) -> Self {
        Self {
            id,
            payload: format!("record-{id}"),
        }
    }
}

/// Empty tree of [`Record`]s keyed by `id`.
#[expect(clippy::unwrap_used)]
pub fn record_tree(keys_per_node: usize, unique: bool) -> TTree<Record, u64> {
    TTree::<Record, u64>::builder()
        .keys_per_node(keys_per_node)
        .unique(unique)
        .comparator(u64::cmp)
        .key(|record| &record.id)
        .build()
        .unwrap()
}

/// Tree of plain integers holding `values`, inserted in order.
#[expect(clippy::unwrap_used)]
pub fn int_tree(keys_per_node: usize, values: impl IntoIterator<Item = i64>) -> TTree<i64> {
    let mut tree = TTree::with_ord_config(TreeConfig::new(keys_per_node, true)).unwrap();
    for v in values {
        tree.insert(v).unwrap();
    }
    tree
}

/// Panic with a structure dump if any invariant is broken.
pub fn assert_valid<T, K>(tree: &TTree<T, K>)
where
    K: std::fmt::Debug + ?Sized,
{
    if let Err(violation) = tree.validate() {
        panic!("{violation}\n{}", tree.dump());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracing_init() {
        init_tracing();
        tracing::info!("Tracing initialized successfully");
        tracing::debug!(keys_per_node = 8, "Debug event");
    }
}

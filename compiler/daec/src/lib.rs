//! Driver for the DAE canonicalization backend.
//!
//! Loads JSON model documents ([`ModelDocument`]), runs the simplification
//! pipeline, writes cached models and compares models with the numeric
//! oracle. `main.rs` is a thin argument parser over [`commands`].

pub mod commands;
mod document;

use std::sync::Once;

pub use commands::{CliError, CompareArgs, LoadedModel, SimplifyArgs};
pub use document::{ExprNode, LoadError, ModelDocument, VariableDecl};

static TRACING_INIT: Once = Once::new();

/// Install the tracing subscriber once, when `RUST_LOG` is set.
///
/// `DAEC_LOG_TREE=1` switches to an indented span tree on stderr.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_err() {
            return;
        }
        let registry = tracing_subscriber::registry().with(EnvFilter::from_default_env());
        if std::env::var_os("DAEC_LOG_TREE").is_some() {
            registry
                .with(
                    tracing_tree::HierarchicalLayer::default()
                        .with_indent_lines(true)
                        .with_indent_amount(2)
                        .with_bracketed_fields(true)
                        .with_targets(true)
                        .with_writer(std::io::stderr),
                )
                .init();
        } else {
            registry
                .with(
                    fmt::layer()
                        .with_target(true)
                        .with_level(true)
                        .with_writer(std::io::stderr),
                )
                .init();
        }
    });
}

//! # Debug Better Core
//!
//! Rewrite rules that make debug-level logging call sites cheaper without changing what
//! the program does:
//! - Lazy-wrap: defer expensive arguments behind `() -> expr`
//! - Fluent API: move `debug(...)` onto `atDebug()...log()` chains
//! - Guard insertion: put `if (logger.isDebugEnabled())` around logging statements
//!
//! The crate works on an in-memory syntax tree ([`ast`]) and asks a host-supplied
//! [`types::TypeResolver`] for semantic facts. Parsing, printing and file handling
//! belong to the host.

#![warn(clippy::all)]

pub mod ast;
pub mod classify;
pub mod fragments;
pub mod logger;
pub mod rewrite;
pub mod types;

// Re-export commonly used types
pub use ast::{CompilationUnit, Expr, ExprKind, MethodCall, Statement, StatementKind, ToSource};
pub use classify::{Classification, ClassifierMode};
pub use logger::{FacadeKind, LoggerConventions, LoggerSite};
pub use rewrite::debug_rules::{FluentApiRule, GuardInsertionRule, LazyWrapMode, LazyWrapRule};
pub use rewrite::{
    AncestorChain, Diagnostic, PassOutput, RewriteRule, RewriteSummary, RuleContext, RulePass,
    RuleResult, RuleStats,
};
pub use types::{MethodSignature, TypeInfo, TypeResolver, TypeTable, Unresolved};

use serde::{Deserialize, Serialize};

/// Crate version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize tracing for the rewrite rules. `RUST_LOG` overrides the default filter.
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug_better_core=info"));
    // A host that already installed a subscriber keeps it.
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Configuration shared by rule passes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewriteConfig {
    /// Names that identify loggers and their capabilities
    pub conventions: LoggerConventions,
    /// Mode used when a lazy-wrap rule is built from this configuration
    pub lazy_wrap: LazyWrapMode,
    /// Nesting depth past which a subtree is left untouched
    pub max_depth: usize,
}

impl Default for RewriteConfig {
    fn default() -> Self {
        Self {
            conventions: LoggerConventions::default(),
            lazy_wrap: LazyWrapMode::Verified,
            max_depth: 512,
        }
    }
}

impl RewriteConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a configuration; missing keys take their defaults.
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn with_conventions(mut self, conventions: LoggerConventions) -> Self {
        self.conventions = conventions;
        self
    }

    pub fn with_lazy_wrap(mut self, mode: LazyWrapMode) -> Self {
        self.lazy_wrap = mode;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

/// Error types for rewrite operations
///
/// A rule that simply does not apply is not an error; it answers
/// [`RuleResult::NoChange`].
#[derive(thiserror::Error, Debug)]
pub enum RewriteError {
    /// A replacement fragment could not be built for one call site
    #[error("cannot build {fragment}: {reason}")]
    Fragment {
        fragment: &'static str,
        reason: String,
    },

    /// The walker stopped descending into a subtree
    #[error("nesting exceeds {limit} levels, subtree left unchanged")]
    DepthExceeded { limit: usize },

    /// Configuration could not be read
    #[error("Configuration error: {0}")]
    Config(#[from] serde_json::Error),
}

impl RewriteError {
    pub fn fragment(fragment: &'static str, reason: impl Into<String>) -> Self {
        RewriteError::Fragment {
            fragment,
            reason: reason.into(),
        }
    }
}

/// Result type for rewrite operations
pub type Result<T> = std::result::Result<T, RewriteError>;

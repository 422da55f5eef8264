/*!
# Debug Logging Rules

The three independent rewrites for `debug`-level logging call sites. Each rule is
stateless and runs on its own [`RulePass`](super::RulePass); combining them is up to
the host.
*/

pub mod fluent;
pub mod guard;
pub mod lazy_wrap;

// Re-export commonly used rules
pub use fluent::FluentApiRule;
pub use guard::GuardInsertionRule;
pub use lazy_wrap::{LazyWrapMode, LazyWrapRule};

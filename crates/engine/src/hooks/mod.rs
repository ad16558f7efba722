//! Hook system
//!
//! Declared hooks are resolved once into typed handlers and then run in
//! declaration order over the files of a commit.
//!
//! ## Execution Model
//!
//! - A preflight pass runs every validator over the initial content; files
//!   with fatal findings are locked against modification for the whole run
//! - Hooks then run one at a time in declared order, each seeing the output
//!   of the fixers before it
//! - With `fail_fast`, the run stops after the first hook that does not pass
//!
//! ## Module Organization
//!
//! - `handler`: capability traits (validator, fixer) and the `Handler` enum
//! - `registry`: hook id to handler resolution
//! - `external`: child process execution for third-party tools
//! - `runner`: the sequential pipeline runner
//! - `result`: findings, hook results and the run report

pub mod external;
pub mod handler;
pub mod registry;
pub mod result;
pub mod runner;

// Re-export main types for convenience
pub use external::{ExternalCommand, ExternalRun};
pub use handler::{Capability, FixOutcome, Fixer, Handler, ValidationContext, Validator};
pub use registry::{HookRegistry, ResolvedHook};
pub use result::{Finding, FindingKind, HookOutcome, HookResult, RunReport};
pub use runner::{PipelineRunner, PipelineRunnerBuilder};

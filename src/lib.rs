#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::must_use_candidate
)]

//! cmdgate — allowlist-based gatekeeper for single-command execution.
//!
//! Given an arbitrary single-line command string from an untrusted caller,
//! cmdgate decides whether it may run at all, and if so runs it as a direct
//! process invocation (never through a shell) with a fixed working directory
//! and a bounded wall-clock deadline.
//!
//! The sandboxing here is ADVISORY input validation: shell-operator
//! rejection, exact command/flag allowlists, regex pattern matching, and
//! canonical-path containment under a sandbox root. It is not namespace,
//! cgroup, or syscall-level isolation — add a real containment layer
//! separately if you need one.

pub mod config;
pub mod error;
pub mod executor;

pub use config::SecurityConfig;
pub use error::{ConfigError, ExecError, GateError, Result, SecurityViolation};
pub use executor::{CommandExecutor, ExecutionOutcome, ParsedCommand, RulesSnapshot};

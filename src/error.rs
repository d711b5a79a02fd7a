use thiserror::Error;

// ─── Top-level error hierarchy ───────────────────────────────────────────────

/// Structured error hierarchy for `cmdgate`.
///
/// Each stage defines its own error enum. Library callers can match on these
/// to decide how to report a rejection; the binary uses `anyhow::Result` for
/// ad-hoc context chains.
#[derive(Debug, Error)]
pub enum GateError {
    // ── Config ───────────────────────────────────────────────────────────
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    // ── Validation ──────────────────────────────────────────────────────
    #[error("security violation: {0}")]
    Violation(#[from] SecurityViolation),

    // ── Execution ───────────────────────────────────────────────────────
    #[error("execution: {0}")]
    Exec(#[from] ExecError),

    // ── Generic fallthrough (wraps anyhow for interop) ──────────────────
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ─── Config errors ───────────────────────────────────────────────────────────

/// Startup-time configuration failures. All of these are fatal: an executor
/// is never constructed from an invalid configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("allowed command list must not be empty")]
    EmptyCommandList,

    #[error("{field} must be positive")]
    NonPositiveLimit { field: &'static str },

    #[error("invalid allowed pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        source: regex::Error,
    },

    #[error("invalid value for {var}: '{value}'")]
    InvalidEnvValue { var: &'static str, value: String },

    #[error("sandbox root '{0}' does not exist or is not accessible")]
    RootUnavailable(String),
}

// ─── Validation rejections ──────────────────────────────────────────────────

/// A command string was refused before any process was spawned.
///
/// Every variant names the offending token where one exists, so the adapter
/// can report a precise cause without string inspection. Validation is
/// all-or-nothing: no subset of a rejected command is ever executed.
#[derive(Debug, Error)]
pub enum SecurityViolation {
    #[error("command string exceeds maximum length of {max} characters")]
    CommandTooLong { length: usize, max: usize },

    #[error("shell operator '{operator}' is not supported; only single commands are allowed")]
    UnsupportedOperator { operator: &'static str },

    #[error("empty command")]
    EmptyCommand,

    #[error("invalid command format: {0}")]
    InvalidCommandFormat(String),

    #[error("command '{command}' is not allowed")]
    CommandNotAllowed { command: String },

    #[error("flag '{flag}' is not allowed")]
    FlagNotAllowed { flag: String },

    #[error("path '{path}' is not allowed")]
    PathNotAllowed { path: String },

    #[error("argument '{argument}' doesn't match allowed patterns")]
    ArgumentNotAllowed { argument: String },
}

// ─── Execution errors ───────────────────────────────────────────────────────

/// Failure during (or instead of) process invocation.
#[derive(Debug, Error)]
pub enum ExecError {
    #[error(transparent)]
    Rejected(#[from] SecurityViolation),

    #[error("command timed out after {seconds} seconds and was killed")]
    Timeout { seconds: u64 },

    #[error("command execution failed: {0}")]
    ExecutionFailed(#[source] std::io::Error),
}

// ─── Convenience re-exports ─────────────────────────────────────────────────

/// Shorthand result type for the crate.
pub type Result<T> = std::result::Result<T, GateError>;

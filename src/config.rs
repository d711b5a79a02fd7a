use std::collections::HashSet;

use regex::Regex;

use crate::error::ConfigError;

// ─── Environment surface (adapter side) ─────────────────────────────────────

const ENV_ALLOWED_COMMANDS: &str = "ALLOWED_COMMANDS";
const ENV_ALLOWED_FLAGS: &str = "ALLOWED_FLAGS";
const ENV_ALLOWED_PATTERNS: &str = "ALLOWED_PATTERNS";
const ENV_MAX_COMMAND_LENGTH: &str = "MAX_COMMAND_LENGTH";
const ENV_COMMAND_TIMEOUT: &str = "COMMAND_TIMEOUT";

const DEFAULT_ALLOWED_COMMANDS: &str = "ls,cat,pwd";
const DEFAULT_ALLOWED_FLAGS: &str = "-l,-a,--help";
const DEFAULT_MAX_COMMAND_LENGTH: usize = 1024;
const DEFAULT_COMMAND_TIMEOUT: u64 = 30;

/// Basic filename pattern, always present ahead of any operator-supplied
/// patterns. Does not admit path separators.
const BASE_PATTERN: &str = r"^[\w\-. ]+$";

// ─── Security configuration ─────────────────────────────────────────────────

/// Immutable rule set consumed by the executor.
///
/// Constructed once at startup and read-only thereafter: fields are private,
/// there are no mutation operations, and every accessor borrows. Shared
/// references may be read concurrently without synchronization.
#[derive(Debug, Clone)]
pub struct SecurityConfig {
    allowed_commands: HashSet<String>,
    allowed_flags: HashSet<String>,
    allowed_patterns: Vec<Regex>,
    max_command_length: usize,
    command_timeout: u64,
}

impl SecurityConfig {
    /// Build a configuration, rejecting anything that would make the
    /// executor permanently unusable: an empty command allowlist, a
    /// non-positive limit, or a pattern that does not compile. All of these
    /// surface at startup, never per-call.
    pub fn new(
        allowed_commands: Vec<String>,
        allowed_flags: Vec<String>,
        allowed_patterns: Vec<String>,
        max_command_length: usize,
        command_timeout: u64,
    ) -> Result<Self, ConfigError> {
        if allowed_commands.is_empty() {
            return Err(ConfigError::EmptyCommandList);
        }
        if max_command_length == 0 {
            return Err(ConfigError::NonPositiveLimit {
                field: "max_command_length",
            });
        }
        if command_timeout == 0 {
            return Err(ConfigError::NonPositiveLimit {
                field: "command_timeout",
            });
        }

        let allowed_patterns = allowed_patterns
            .into_iter()
            .map(|pattern| {
                Regex::new(&pattern).map_err(|source| ConfigError::InvalidPattern {
                    pattern,
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            allowed_commands: allowed_commands.into_iter().collect(),
            allowed_flags: allowed_flags.into_iter().collect(),
            allowed_patterns,
            max_command_length,
            command_timeout,
        })
    }

    /// Load configuration from environment variables with the stock
    /// defaults. This is the adapter surface; the core itself never reads
    /// the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let commands = env_list(ENV_ALLOWED_COMMANDS, DEFAULT_ALLOWED_COMMANDS);
        let flags = env_list(ENV_ALLOWED_FLAGS, DEFAULT_ALLOWED_FLAGS);

        let mut patterns = vec![BASE_PATTERN.to_string()];
        patterns.extend(env_list(ENV_ALLOWED_PATTERNS, ""));

        let max_command_length = env_number(ENV_MAX_COMMAND_LENGTH, DEFAULT_MAX_COMMAND_LENGTH)?;
        let command_timeout = env_number(ENV_COMMAND_TIMEOUT, DEFAULT_COMMAND_TIMEOUT)?;

        Self::new(commands, flags, patterns, max_command_length, command_timeout)
    }

    pub fn allowed_commands(&self) -> &HashSet<String> {
        &self.allowed_commands
    }

    pub fn allowed_flags(&self) -> &HashSet<String> {
        &self.allowed_flags
    }

    pub fn allowed_patterns(&self) -> &[Regex] {
        &self.allowed_patterns
    }

    pub fn max_command_length(&self) -> usize {
        self.max_command_length
    }

    /// Execution deadline in seconds.
    pub fn command_timeout(&self) -> u64 {
        self.command_timeout
    }

    /// Whole-token match against the ordered pattern list: an argument is
    /// acceptable if any pattern covers it entirely.
    pub fn matches_any_pattern(&self, argument: &str) -> bool {
        self.allowed_patterns.iter().any(|re| {
            re.find(argument)
                .is_some_and(|m| m.start() == 0 && m.end() == argument.len())
        })
    }
}

fn env_list(var: &str, default: &str) -> Vec<String> {
    std::env::var(var)
        .unwrap_or_else(|_| default.to_string())
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(String::from)
        .collect()
}

fn env_number<T: std::str::FromStr>(var: &'static str, default: T) -> Result<T, ConfigError> {
    match std::env::var(var) {
        Ok(value) => match value.trim().parse() {
            Ok(parsed) => Ok(parsed),
            Err(_) => Err(ConfigError::InvalidEnvValue { var, value }),
        },
        Err(_) => Ok(default),
    }
}

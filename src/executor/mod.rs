mod path;
mod run;
mod validate;

pub use run::ExecutionOutcome;
pub use validate::ParsedCommand;

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::config::SecurityConfig;
use crate::error::ConfigError;

/// Validates untrusted command strings and runs the ones that pass.
///
/// This is the single security boundary between an external instruction and
/// real process execution. The sandboxing is ADVISORY: enforcement is string
/// validation plus canonical-path containment, not namespaces, cgroups, or
/// syscall filtering. Deployments that need real isolation must layer it on
/// separately.
///
/// The executor holds no mutable state. Concurrent `validate`/`execute`
/// calls from any number of callers are safe by construction; each call
/// spawns (at most) one independent child process.
#[derive(Debug, Clone)]
pub struct CommandExecutor {
    /// Canonical, symlink-resolved sandbox root. All path containment
    /// decisions and the child working directory anchor here.
    root: PathBuf,
    config: SecurityConfig,
}

impl CommandExecutor {
    /// Bind a configuration to a sandbox root. The root must exist at
    /// startup; it is canonicalized once and fixed for the process lifetime.
    pub fn new(allowed_dir: impl AsRef<Path>, config: SecurityConfig) -> Result<Self, ConfigError> {
        let dir = allowed_dir.as_ref();
        let root = dir
            .canonicalize()
            .map_err(|_| ConfigError::RootUnavailable(dir.display().to_string()))?;
        if !root.is_dir() {
            return Err(ConfigError::RootUnavailable(dir.display().to_string()));
        }
        Ok(Self { root, config })
    }

    /// Canonical sandbox root (also the working directory of every child).
    pub fn sandbox_root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &SecurityConfig {
        &self.config
    }

    /// Read-only snapshot of the active rules, for display by the adapter.
    /// Informational only; performs no enforcement.
    pub fn rules(&self) -> RulesSnapshot {
        let mut allowed_commands: Vec<String> =
            self.config.allowed_commands().iter().cloned().collect();
        allowed_commands.sort();
        let mut allowed_flags: Vec<String> = self.config.allowed_flags().iter().cloned().collect();
        allowed_flags.sort();

        RulesSnapshot {
            working_directory: self.root.clone(),
            allowed_commands,
            allowed_flags,
            allowed_patterns: self
                .config
                .allowed_patterns()
                .iter()
                .map(|re| re.as_str().to_string())
                .collect(),
            max_command_length: self.config.max_command_length(),
            command_timeout: self.config.command_timeout(),
        }
    }
}

/// Diagnostic view of the executor's rules.
#[derive(Debug, Clone, Serialize)]
pub struct RulesSnapshot {
    pub working_directory: PathBuf,
    pub allowed_commands: Vec<String>,
    pub allowed_flags: Vec<String>,
    pub allowed_patterns: Vec<String>,
    pub max_command_length: usize,
    pub command_timeout: u64,
}

impl fmt::Display for RulesSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Security Configuration:")?;
        writeln!(f, "==================")?;
        writeln!(f, "Working Directory: {}", self.working_directory.display())?;
        writeln!(f, "\nAllowed Commands:")?;
        writeln!(f, "----------------")?;
        writeln!(f, "{}", self.allowed_commands.join(", "))?;
        writeln!(f, "\nAllowed Flags:")?;
        writeln!(f, "-------------")?;
        writeln!(f, "{}", self.allowed_flags.join(", "))?;
        writeln!(f, "\nAllowed Patterns:")?;
        writeln!(f, "----------------")?;
        writeln!(f, "{}", self.allowed_patterns.join(", "))?;
        writeln!(f, "\nSecurity Limits:")?;
        writeln!(f, "---------------")?;
        writeln!(
            f,
            "Max Command Length: {} characters",
            self.max_command_length
        )?;
        writeln!(f, "Command Timeout: {} seconds", self.command_timeout)
    }
}

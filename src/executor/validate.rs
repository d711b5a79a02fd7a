use serde::Serialize;
use tracing::debug;

use super::{CommandExecutor, path};
use crate::error::SecurityViolation;

/// Shell operators this system refuses to interpret. Scanned as literal
/// substrings on the RAW string, before tokenization, so quoting cannot hide
/// one. The reported operator is the first match in list order.
const SHELL_OPERATORS: &[&str] = &["&&", "||", "|", ">", ">>", "<", "<<", ";"];

/// A fully-validated command: the originally parsed tokens, verbatim.
/// Produced by [`CommandExecutor::validate`], consumed immediately by
/// execution, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedCommand {
    pub command: String,
    pub args: Vec<String>,
}

fn find_shell_operator(raw: &str) -> Option<&'static str> {
    SHELL_OPERATORS.iter().copied().find(|op| raw.contains(op))
}

impl CommandExecutor {
    /// Validate and parse a raw command string.
    ///
    /// In order: shell-operator rejection on the raw string, shell-word
    /// tokenization (quoting honored, no expansion), exact command-name
    /// allowlist, then per-argument checks — exact flag allowlist for
    /// `-`-prefixed tokens, canonical containment for path-shaped tokens,
    /// and a whole-token pattern match for every non-flag token. The first
    /// failing check wins; nothing is normalized or rewritten on success.
    pub fn validate(&self, raw: &str) -> Result<ParsedCommand, SecurityViolation> {
        if let Some(operator) = find_shell_operator(raw) {
            return Err(SecurityViolation::UnsupportedOperator { operator });
        }

        let tokens = shell_words::split(raw)
            .map_err(|e| SecurityViolation::InvalidCommandFormat(e.to_string()))?;
        let Some((command, args)) = tokens.split_first() else {
            return Err(SecurityViolation::EmptyCommand);
        };

        if !self.config.allowed_commands().contains(command) {
            return Err(SecurityViolation::CommandNotAllowed {
                command: command.clone(),
            });
        }

        for arg in args {
            self.check_argument(arg)?;
        }

        debug!(command = %command, args = args.len(), "command validated");
        Ok(ParsedCommand {
            command: command.clone(),
            args: args.to_vec(),
        })
    }

    fn check_argument(&self, arg: &str) -> Result<(), SecurityViolation> {
        // Flag-shaped tokens are allowlisted exactly; no pattern or path
        // check applies to them.
        if arg.starts_with('-') {
            if !self.config.allowed_flags().contains(arg) {
                return Err(SecurityViolation::FlagNotAllowed {
                    flag: arg.to_string(),
                });
            }
            return Ok(());
        }

        if path::is_path_shaped(arg) && !self.is_path_contained(arg) {
            return Err(SecurityViolation::PathNotAllowed {
                path: arg.to_string(),
            });
        }

        // Containment is in addition to the pattern gate, never instead of
        // it: a path argument must satisfy both.
        if !self.config.matches_any_pattern(arg) {
            return Err(SecurityViolation::ArgumentNotAllowed {
                argument: arg.to_string(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SecurityConfig;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn strings(list: &[&str]) -> Vec<String> {
        list.iter().map(ToString::to_string).collect()
    }

    fn executor_with(
        root: &Path,
        commands: &[&str],
        flags: &[&str],
        patterns: &[&str],
    ) -> CommandExecutor {
        let config = SecurityConfig::new(
            strings(commands),
            strings(flags),
            strings(patterns),
            1024,
            30,
        )
        .expect("valid config");
        CommandExecutor::new(root, config).expect("executor")
    }

    fn scenario_executor(root: &Path) -> CommandExecutor {
        executor_with(root, &["ls", "cat"], &["-l"], &[r"^[\w\-. ]+$"])
    }

    #[test]
    fn accepts_allowed_command_flag_and_filename() {
        let sandbox = TempDir::new().expect("tempdir");
        let executor = scenario_executor(sandbox.path());

        let parsed = executor.validate("ls -l notes.txt").expect("accepted");
        assert_eq!(parsed.command, "ls");
        assert_eq!(parsed.args, vec!["-l", "notes.txt"]);
    }

    #[test]
    fn rejects_every_shell_operator_regardless_of_allowlist() {
        let sandbox = TempDir::new().expect("tempdir");
        let executor = scenario_executor(sandbox.path());

        for raw in [
            "ls && cat notes.txt",
            "ls || cat notes.txt",
            "ls | cat",
            "ls > out.txt",
            "ls >> out.txt",
            "ls < in.txt",
            "ls << EOF",
            "ls -l; cat secret",
        ] {
            let err = executor.validate(raw).unwrap_err();
            assert!(
                matches!(err, SecurityViolation::UnsupportedOperator { .. }),
                "expected operator rejection for {raw:?}, got {err:?}"
            );
        }
    }

    #[test]
    fn semicolon_rejection_names_the_operator() {
        let sandbox = TempDir::new().expect("tempdir");
        let executor = scenario_executor(sandbox.path());

        let err = executor.validate("ls -l; cat secret").unwrap_err();
        assert!(matches!(
            err,
            SecurityViolation::UnsupportedOperator { operator: ";" }
        ));
    }

    #[test]
    fn operator_scan_runs_on_the_raw_string_before_tokenization() {
        let sandbox = TempDir::new().expect("tempdir");
        let executor = scenario_executor(sandbox.path());

        // Quoting would hide the operator from the tokenizer; the raw-string
        // scan still sees it.
        let err = executor.validate("ls 'a && b'").unwrap_err();
        assert!(matches!(
            err,
            SecurityViolation::UnsupportedOperator { operator: "&&" }
        ));
    }

    #[test]
    fn rejects_disallowed_command() {
        let sandbox = TempDir::new().expect("tempdir");
        let executor = scenario_executor(sandbox.path());

        let err = executor.validate("rm -rf /").unwrap_err();
        match err {
            SecurityViolation::CommandNotAllowed { command } => assert_eq!(command, "rm"),
            other => panic!("expected CommandNotAllowed, got {other:?}"),
        }
    }

    #[test]
    fn command_check_is_exact_and_case_sensitive() {
        let sandbox = TempDir::new().expect("tempdir");
        let executor = scenario_executor(sandbox.path());

        assert!(matches!(
            executor.validate("lsblk").unwrap_err(),
            SecurityViolation::CommandNotAllowed { .. }
        ));
        assert!(matches!(
            executor.validate("Ls").unwrap_err(),
            SecurityViolation::CommandNotAllowed { .. }
        ));
    }

    #[test]
    fn rejects_disallowed_flag_exactly() {
        let sandbox = TempDir::new().expect("tempdir");
        let executor = scenario_executor(sandbox.path());

        let err = executor.validate("ls -a").unwrap_err();
        match err {
            SecurityViolation::FlagNotAllowed { flag } => assert_eq!(flag, "-a"),
            other => panic!("expected FlagNotAllowed, got {other:?}"),
        }

        // No prefix matching: "-l" being allowed does not admit "-la".
        assert!(matches!(
            executor.validate("ls -la").unwrap_err(),
            SecurityViolation::FlagNotAllowed { .. }
        ));
    }

    #[test]
    fn allowed_flags_skip_the_pattern_gate() {
        let sandbox = TempDir::new().expect("tempdir");
        // "--help" does not match the base pattern, but flags are never
        // pattern-checked.
        let executor = executor_with(sandbox.path(), &["ls"], &["--help"], &[r"^[\w\-. ]+$"]);
        assert!(executor.validate("ls --help").is_ok());
    }

    #[test]
    fn rejects_path_outside_sandbox() {
        let sandbox = TempDir::new().expect("tempdir");
        let executor = scenario_executor(sandbox.path());

        let err = executor.validate("ls /etc/passwd").unwrap_err();
        match err {
            SecurityViolation::PathNotAllowed { path } => assert_eq!(path, "/etc/passwd"),
            other => panic!("expected PathNotAllowed, got {other:?}"),
        }

        assert!(matches!(
            executor.validate("cat ../outside.txt").unwrap_err(),
            SecurityViolation::PathNotAllowed { .. }
        ));
    }

    #[test]
    fn contained_path_still_faces_the_pattern_gate() {
        let sandbox = TempDir::new().expect("tempdir");
        fs::create_dir(sandbox.path().join("sub")).expect("mkdir");
        fs::write(sandbox.path().join("sub/notes.txt"), "hi\n").expect("write");

        // Base pattern has no separator, so a nested path inside the
        // sandbox passes containment but fails the pattern check.
        let executor = scenario_executor(sandbox.path());
        let err = executor.validate("cat sub/notes.txt").unwrap_err();
        assert!(matches!(
            err,
            SecurityViolation::ArgumentNotAllowed { .. }
        ));

        // A separator-aware pattern admits the same argument.
        let executor = executor_with(sandbox.path(), &["cat"], &[], &[r"^[\w\-. /]+$"]);
        let parsed = executor.validate("cat sub/notes.txt").expect("accepted");
        assert_eq!(parsed.args, vec!["sub/notes.txt"]);
    }

    #[test]
    fn rejects_non_matching_plain_argument() {
        let sandbox = TempDir::new().expect("tempdir");
        let executor = scenario_executor(sandbox.path());

        let err = executor.validate("ls 'notes;txt'").unwrap_err();
        match err {
            SecurityViolation::ArgumentNotAllowed { argument } => {
                assert_eq!(argument, "notes;txt");
            }
            other => panic!("expected ArgumentNotAllowed, got {other:?}"),
        }
    }

    #[test]
    fn quoted_arguments_tokenize_as_single_tokens() {
        let sandbox = TempDir::new().expect("tempdir");
        let executor = scenario_executor(sandbox.path());

        let parsed = executor.validate("cat 'my notes.txt'").expect("accepted");
        assert_eq!(parsed.args, vec!["my notes.txt"]);
    }

    #[test]
    fn malformed_quoting_is_an_invalid_format() {
        let sandbox = TempDir::new().expect("tempdir");
        let executor = scenario_executor(sandbox.path());

        let err = executor.validate("ls 'unterminated").unwrap_err();
        assert!(matches!(err, SecurityViolation::InvalidCommandFormat(_)));
    }

    #[test]
    fn empty_and_blank_input_is_an_empty_command() {
        let sandbox = TempDir::new().expect("tempdir");
        let executor = scenario_executor(sandbox.path());

        assert!(matches!(
            executor.validate("").unwrap_err(),
            SecurityViolation::EmptyCommand
        ));
        assert!(matches!(
            executor.validate("   \t ").unwrap_err(),
            SecurityViolation::EmptyCommand
        ));
    }

    #[test]
    fn validation_is_idempotent() {
        let sandbox = TempDir::new().expect("tempdir");
        let executor = scenario_executor(sandbox.path());

        let first = executor.validate("ls -l notes.txt").expect("accepted");
        let second = executor.validate("ls -l notes.txt").expect("accepted");
        assert_eq!(first, second);

        let first = executor.validate("ls /etc/passwd").unwrap_err();
        let second = executor.validate("ls /etc/passwd").unwrap_err();
        assert_eq!(first.to_string(), second.to_string());
    }

    #[test]
    fn tokens_are_passed_through_verbatim() {
        let sandbox = TempDir::new().expect("tempdir");
        let executor = scenario_executor(sandbox.path());

        // Quote removal is the tokenizer's job; beyond that nothing is
        // normalized or substituted.
        let parsed = executor.validate(r"ls -l my\ file.txt").expect("accepted");
        assert_eq!(parsed.args, vec!["-l", "my file.txt"]);
    }
}

use std::path::{Component, Path, PathBuf};

use super::CommandExecutor;

/// Whether an argument token should be subjected to the containment check:
/// anything carrying a path separator or an absolute prefix.
pub(super) fn is_path_shaped(arg: &str) -> bool {
    arg.contains('/') || arg.contains('\\') || Path::new(arg).is_absolute()
}

impl CommandExecutor {
    /// Resolve `arg` against the sandbox root and decide containment on the
    /// canonical result — never on the literal string, so `..` segments and
    /// symlink indirection cannot smuggle a path outside the root.
    pub(super) fn is_path_contained(&self, arg: &str) -> bool {
        // An absolute argument replaces the root on join, exactly like the
        // containment check it feeds: such paths only pass if they already
        // point inside the root.
        let joined = self.root.join(arg);
        resolve_traversal_proof(&joined).starts_with(&self.root)
    }
}

/// Canonicalize a path that may not exist (yet). The full path is preferred;
/// for missing paths the deepest existing ancestor is resolved through the
/// filesystem FIRST, then the remaining components are applied lexically.
///
/// Ordering is load-bearing: a `..` following a symlink must fold against
/// the symlink's target, the way the kernel resolves it — folding `..`
/// textually before resolution would let `link/../evil.txt` masquerade as a
/// sibling of `link` while the filesystem places it outside the root.
fn resolve_traversal_proof(path: &Path) -> PathBuf {
    if let Ok(resolved) = path.canonicalize() {
        return resolved;
    }

    for ancestor in path.ancestors().skip(1) {
        if let Ok(resolved) = ancestor.canonicalize() {
            let remainder = path.strip_prefix(ancestor).unwrap_or(Path::new(""));
            return apply_lexically(resolved, remainder);
        }
    }
    apply_lexically(PathBuf::new(), path)
}

/// Apply the missing tail of a path onto a canonical base: `.` dropped, `..`
/// folded against the base. Popping at the filesystem root is a no-op,
/// matching canonicalization semantics.
fn apply_lexically(mut base: PathBuf, remainder: &Path) -> PathBuf {
    for component in remainder.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                base.pop();
            }
            other => base.push(other),
        }
    }
    base
}

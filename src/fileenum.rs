//! File enumeration collaborator (A2, SPEC_FULL.md §6).
//!
//! Positional file arguments containing glob metacharacters (`*`, `?`,
//! `[...]`) are expanded via the `glob` crate; arguments with none pass
//! through unchanged, including paths that don't exist, so the
//! existing `IO_ERROR` path still produces a clear diagnostic instead
//! of a silently empty expansion.

use crate::error::{RecsortError, Result};
use std::path::PathBuf;

fn has_glob_metacharacters(arg: &str) -> bool {
    arg.contains(['*', '?', '[', ']'])
}

/// Expands the file arguments the user passed on the command line into
/// a concrete, ordered list of paths.
pub fn enumerate(args: &[String]) -> Result<Vec<PathBuf>> {
    let mut out = Vec::new();
    for arg in args {
        if has_glob_metacharacters(arg) {
            let matches = glob::glob(arg).map_err(|e| {
                RecsortError::InvalidArgument(format!("invalid glob pattern {arg:?}: {e}"))
            })?;
            let mut any = false;
            for entry in matches {
                let path = entry.map_err(|e| {
                    RecsortError::InvalidArgument(format!("error reading glob entry: {e}"))
                })?;
                out.push(path);
                any = true;
            }
            if !any {
                return Err(RecsortError::InvalidArgument(format!(
                    "no files match pattern {arg:?}"
                )));
            }
        } else {
            out.push(PathBuf::from(arg));
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_path_passes_through_unchanged() {
        let result = enumerate(&["foo.txt".to_string()]).unwrap();
        assert_eq!(result, vec![PathBuf::from("foo.txt")]);
    }

    #[test]
    fn nonexistent_plain_path_is_not_rejected_here() {
        // IO_ERROR fires later, when the orchestrator actually tries to
        // open the file -- enumeration itself never checks existence
        // for a metacharacter-free argument.
        let result = enumerate(&["does-not-exist.txt".to_string()]).unwrap();
        assert_eq!(result, vec![PathBuf::from("does-not-exist.txt")]);
    }

    #[test]
    fn glob_expands_matching_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), "").unwrap();
        std::fs::write(dir.path().join("b.txt"), "").unwrap();
        let pattern = dir.path().join("*.txt");
        let result = enumerate(&[pattern.to_string_lossy().to_string()]).unwrap();
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn glob_with_no_matches_errors() {
        let dir = tempfile::tempdir().unwrap();
        let pattern = dir.path().join("*.nomatch");
        let result = enumerate(&[pattern.to_string_lossy().to_string()]);
        assert!(result.is_err());
    }
}

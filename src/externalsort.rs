//! External line-sort process boundary (C6 step 6, spec §6).
//!
//! The orchestrator never sorts the index file itself: it hands the
//! unsorted index path to an [`ExternalSorter`] and reads back the
//! sorted path. `SystemSort` shells out to the platform's `sort`
//! binary, matching spec §6's "External sorter contract" exactly.
//! `InMemorySort` is the in-process fallback spec §9 explicitly
//! permits ("implementers may substitute an in-process external
//! merge-sort over the same index-file format").

use crate::error::{IoContext, RecsortError, Result};
use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use std::process::Command;

/// Abstracts "sort this file's lines lexicographically, ascending or
/// descending, into that file" as a process-boundary collaborator.
pub trait ExternalSorter {
    fn sort(&self, input: &Path, output: &Path, reverse: bool) -> Result<()>;
}

/// Shells out to the platform's `sort` utility (`sort -o <out> <in>`,
/// `-r` for reverse). The default sorter.
pub struct SystemSort {
    binary: String,
}

impl SystemSort {
    pub fn new() -> Self {
        Self {
            binary: "sort".to_string(),
        }
    }

    /// Returns `None` if the configured sort binary cannot be located on
    /// `PATH`, signalling the caller to fall back to [`InMemorySort`].
    pub fn available(&self) -> bool {
        Command::new(&self.binary)
            .arg("--version")
            .output()
            .is_ok()
    }
}

impl Default for SystemSort {
    fn default() -> Self {
        Self::new()
    }
}

impl ExternalSorter for SystemSort {
    fn sort(&self, input: &Path, output: &Path, reverse: bool) -> Result<()> {
        let mut cmd = Command::new(&self.binary);
        // Force byte-lexicographic collation: the nines-complement and
        // space-padding encodings (C1/C2) only order correctly under
        // raw byte comparison, not locale-aware collation, which is
        // what GNU `sort` uses under any non-"C" locale.
        cmd.env("LC_ALL", "C").env("LANG", "C");
        cmd.arg("-o").arg(output).arg(input);
        if reverse {
            cmd.arg("-r");
        }
        let status = cmd.status().with_path(input)?;
        if !status.success() {
            return Err(RecsortError::SortFailed {
                index_path: input.to_path_buf(),
                status: status.code().unwrap_or(-1),
            });
        }
        Ok(())
    }
}

/// In-process fallback used automatically when `sort` cannot be
/// located, and explicitly selectable so tests never depend on `PATH`
/// contents (spec §9: "implementers may substitute an in-process
/// external merge-sort over the same index-file format provided the
/// line-ordering semantics match").
pub struct InMemorySort;

impl ExternalSorter for InMemorySort {
    fn sort(&self, input: &Path, output: &Path, reverse: bool) -> Result<()> {
        let file = std::fs::File::open(input).with_path(input)?;
        let mut lines: Vec<Vec<u8>> = BufReader::new(file)
            .split(b'\n')
            .collect::<std::io::Result<_>>()
            .with_path(input)?;
        lines.sort_unstable();
        if reverse {
            lines.reverse();
        }

        let mut out = std::fs::File::create(output).with_path(output)?;
        for line in &lines {
            out.write_all(line).with_path(output)?;
            out.write_all(b"\n").with_path(output)?;
        }
        Ok(())
    }
}

/// Picks `SystemSort` when the `sort` binary is on `PATH`, otherwise
/// `InMemorySort`, so a default-configured run never fails purely for
/// lack of the external utility.
pub fn default_sorter() -> Box<dyn ExternalSorter> {
    let system = SystemSort::new();
    if system.available() {
        Box::new(system)
    } else {
        Box::new(InMemorySort)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    #[test]
    fn in_memory_sort_orders_lines_ascending() {
        let input = tempfile::NamedTempFile::new().unwrap();
        {
            let mut f = input.reopen().unwrap();
            f.write_all(b"charlie\t3\nalpha\t1\nbravo\t2\n").unwrap();
        }
        let output = tempfile::NamedTempFile::new().unwrap();
        InMemorySort
            .sort(input.path(), output.path(), false)
            .unwrap();
        let contents = std::fs::read_to_string(output.path()).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines, vec!["alpha\t1", "bravo\t2", "charlie\t3"]);
    }

    #[test]
    fn in_memory_sort_honors_reverse() {
        let input = tempfile::NamedTempFile::new().unwrap();
        {
            let mut f = input.reopen().unwrap();
            f.write_all(b"alpha\t1\nbravo\t2\n").unwrap();
        }
        let output = tempfile::NamedTempFile::new().unwrap();
        InMemorySort
            .sort(input.path(), output.path(), true)
            .unwrap();
        let contents = std::fs::read_to_string(output.path()).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines, vec!["bravo\t2", "alpha\t1"]);
    }
}

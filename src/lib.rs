//! `recsort` — an external positional sort engine for delimited and
//! fixed-width record files (spec.md §1).
//!
//! The crate sorts record *positions*, not records: it builds a
//! composite sort key for each record, writes a `key \t offset`
//! index, hands that index to an external line sorter, and
//! rematerializes the output by random-access reads against the
//! original file. See `SPEC_FULL.md` for the full design.

pub mod cli;
pub mod config;
pub mod date;
pub mod error;
pub mod externalsort;
pub mod fieldspec;
pub mod fileenum;
pub mod keybuilder;
pub mod linereader;
pub mod numeric;
pub mod orchestrator;
pub mod progress;

use config::RunContext;
use error::Result;
use std::rc::Rc;

/// Runs the configured sort over every enumerated input file,
/// sequentially (spec §5), stopping at the first fatal error (spec
/// §7: "Processing does not continue to subsequent files after a
/// fatal error").
///
/// Returns the number of files successfully processed, for the
/// `<N> files processed.` success line (spec §6).
pub fn run_all(
    config: &config::SortConfig,
    files: &[std::path::PathBuf],
    run_ctx: &RunContext,
    sorter: &dyn externalsort::ExternalSorter,
) -> Result<usize> {
    let mut per_file_config = config.clone();
    per_file_config.century_anchor = run_ctx.century_anchor;

    for file in files {
        orchestrator::run_file(file, &per_file_config, run_ctx, sorter)?;
    }
    Ok(files.len())
}

/// Registers a `Ctrl-C`/`SIGTERM` handler that requests the orchestrator
/// abort the file currently in flight (SPEC_FULL.md §5). Best-effort:
/// if a handler is already installed (e.g. a second call in the same
/// process, as happens in tests), the error is ignored.
#[cfg(not(any(target_os = "redox", target_os = "wasi")))]
pub fn install_interrupt_handler() {
    let _ = ctrlc::set_handler(orchestrator::request_interrupt);
}

/// No interrupt handling available on this target; the orchestrator's
/// interrupt check simply never fires.
#[cfg(any(target_os = "redox", target_os = "wasi"))]
pub fn install_interrupt_handler() {}

/// Convenience used by `main`: builds a [`RunContext`] with a terminal
/// progress sink when `use_terminal_progress` is true, a no-op sink
/// otherwise (non-interactive runs, tests).
pub fn new_run_context(use_terminal_progress: bool) -> RunContext {
    let progress: Rc<dyn progress::ProgressSink> = if use_terminal_progress {
        Rc::new(progress::TerminalProgress::new())
    } else {
        Rc::new(progress::NullProgress)
    };
    RunContext::new(progress)
}

/// Whether standard error looks like an interactive terminal, used to
/// decide whether to render the `indicatif` progress bar at all.
pub fn stderr_is_terminal() -> bool {
    use std::io::IsTerminal;
    std::io::stderr().is_terminal()
}

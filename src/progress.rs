//! Progress reporting collaborator (A3, SPEC_FULL.md §2/§6).
//!
//! A trait so the orchestrator never has to know whether it is running
//! attached to a terminal, inside a test, or headless.

use indicatif::{ProgressBar, ProgressStyle};
use std::cell::RefCell;

/// Receives periodic progress updates during C6's index-emission and
/// re-emission passes. `lines_done` is exact; `lines_total_estimate` is
/// derived from file size and is therefore approximate.
pub trait ProgressSink {
    fn on_progress(&self, lines_done: u64, lines_total_estimate: u64);
    fn finish(&self);
}

/// Renders an `indicatif` bar on standard error. Interior-mutable because
/// `RunContext` hands out `Rc<dyn ProgressSink>` to callers that only hold
/// shared references.
pub struct TerminalProgress {
    bar: RefCell<Option<ProgressBar>>,
}

impl TerminalProgress {
    pub fn new() -> Self {
        Self {
            bar: RefCell::new(None),
        }
    }

    fn bar_for(&self, total: u64) -> std::cell::Ref<'_, Option<ProgressBar>> {
        {
            let mut slot = self.bar.borrow_mut();
            if slot.is_none() {
                let pb = ProgressBar::new(total);
                pb.set_style(
                    ProgressStyle::with_template(
                        "{spinner} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} lines",
                    )
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("#>-"),
                );
                *slot = Some(pb);
            }
        }
        self.bar.borrow()
    }
}

impl Default for TerminalProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressSink for TerminalProgress {
    fn on_progress(&self, lines_done: u64, lines_total_estimate: u64) {
        let bar_ref = self.bar_for(lines_total_estimate.max(1));
        if let Some(bar) = bar_ref.as_ref() {
            bar.set_length(lines_total_estimate.max(lines_done).max(1));
            bar.set_position(lines_done);
        }
    }

    fn finish(&self) {
        if let Some(bar) = self.bar.borrow().as_ref() {
            bar.finish_and_clear();
        }
    }
}

/// Discards every update. Used in tests and whenever standard error is
/// not a terminal.
pub struct NullProgress;

impl ProgressSink for NullProgress {
    fn on_progress(&self, _lines_done: u64, _lines_total_estimate: u64) {}
    fn finish(&self) {}
}

//! Data model shared by every component (spec §3).

use crate::progress::ProgressSink;
use std::path::PathBuf;
use std::rc::Rc;

/// One of the three key field types a [`FieldSpec`] can describe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Alpha,
    Numeric,
    Date,
}

/// A descriptor for one key field (spec §3, §4.3).
///
/// `position` is 1-based: a field index in delimited mode, a character
/// start offset in fixed mode. `length` is the fixed-mode byte width, or
/// the alpha padding/truncation width in delimited mode (`0` otherwise).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub field_type: FieldType,
    pub position: usize,
    pub length: usize,
}

/// Line-ending convention detected by [`crate::linereader`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Eol {
    Unix,
    Windows,
    Mac,
}

impl Eol {
    pub fn bytes(self) -> &'static [u8] {
        match self {
            Eol::Unix => b"\n",
            Eol::Windows => b"\r\n",
            Eol::Mac => b"\r",
        }
    }
}

/// Numeric encoding precision regime (spec §4.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precision {
    Simple,
    Double,
}

impl Precision {
    pub fn exponent_width(self) -> usize {
        match self {
            Precision::Simple => 2,
            Precision::Double => 3,
        }
    }

    pub fn mantissa_width(self) -> usize {
        match self {
            Precision::Simple => 8,
            Precision::Double => 17,
        }
    }

    /// Total encoded width: sign flag + exp-sign flag + exponent + mantissa.
    /// Also the width the non-numeric fallback space-pads text to, so a
    /// field's encoded width never depends on whether a given row happens
    /// to parse as a number.
    pub fn total_width(self) -> usize {
        2 + self.exponent_width() + self.mantissa_width()
    }
}

/// The immutable configuration for one file's sort run (spec §3).
///
/// Constructed once per input file and read-only thereafter; `fields` is
/// owned by `SortConfig`.
#[derive(Debug, Clone)]
pub struct SortConfig {
    pub fields: Vec<FieldSpec>,
    pub fixed_mode: bool,
    pub field_separator: u8,
    pub decimal_separator: u8,
    pub date_pattern: String,
    pub begin_line: usize,
    pub reverse: bool,
    pub precision: Precision,
    pub ignore_overflow: bool,
    pub output_extension: String,
    /// Century anchor computed once per process run (spec §4.1, §9).
    pub century_anchor: u32,
}

impl SortConfig {
    /// Cross-field and cross-argument validation (spec §3 invariants, §7
    /// `INVALID_ARGUMENT`/`INVALID_FIELD_SPEC`), run once before any file
    /// is opened.
    pub fn validate(&self) -> crate::error::Result<()> {
        use crate::error::RecsortError;

        if self.fields.is_empty() {
            return Err(RecsortError::InvalidArgument(
                "at least one field spec is required".into(),
            ));
        }
        for f in &self.fields {
            if f.position < 1 {
                return Err(RecsortError::InvalidFieldSpec {
                    spec: format!("{f:?}"),
                    reason: "position must be >= 1".into(),
                });
            }
            if self.fixed_mode {
                if f.length == 0 {
                    return Err(RecsortError::InvalidFieldSpec {
                        spec: format!("{f:?}"),
                        reason: "fixed mode requires a positive length".into(),
                    });
                }
            } else if f.length != 0 && f.field_type != FieldType::Alpha {
                return Err(RecsortError::InvalidFieldSpec {
                    spec: format!("{f:?}"),
                    reason: "length suffix is only valid on ALPHA fields in delimited mode".into(),
                });
            }
        }
        if self.begin_line < 1 {
            return Err(RecsortError::InvalidArgument(
                "begin line must be >= 1".into(),
            ));
        }
        // Validated here, once, before any file is opened (spec §7), even
        // though the parsed pattern itself is rebuilt per file in
        // `orchestrator::run_file` to get the `DatePattern` value it needs.
        crate::date::DatePattern::parse(&self.date_pattern)?;
        Ok(())
    }
}

/// Per-process state threaded into every file's run (SPEC_FULL §3):
/// the century anchor and the shared progress sink. A plain struct, not
/// module-level/global state, per spec §9.
pub struct RunContext {
    pub century_anchor: u32,
    pub progress: Rc<dyn ProgressSink>,
}

impl RunContext {
    /// `century = (current_year - 1900) / 100 + 19` — the historical
    /// quirk preserved verbatim from spec §4.1. The source computes
    /// this from a `tm_year`-style year-since-1900, not the raw
    /// Gregorian year, so the 4-digit year from `chrono` is rebased by
    /// 1900 first; skipping that rebase yields `39xx` dates instead of
    /// `20xx`. Computed once per run.
    pub fn new(progress: Rc<dyn ProgressSink>) -> Self {
        let current_year = chrono::Utc::now().format("%Y").to_string();
        let current_year: u32 = current_year.parse().unwrap_or(2000);
        Self {
            century_anchor: ((current_year - 1900) / 100) + 19,
            progress,
        }
    }
}

/// Resolves the output path for an input path (spec §6): replace the
/// final extension with `extension`, or append it if the input has none.
pub fn output_path(input: &std::path::Path, extension: &str) -> PathBuf {
    let mut ext = extension.to_string();
    if !ext.starts_with('.') {
        ext.insert(0, '.');
    }
    let stem_with_parent = match input.file_stem() {
        Some(stem) => input.with_file_name(stem),
        None => input.to_path_buf(),
    };
    let mut out = stem_with_parent.into_os_string();
    out.push(&ext);
    PathBuf::from(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_path_replaces_extension() {
        assert_eq!(
            output_path(std::path::Path::new("foo.txt"), ".sor.txt"),
            PathBuf::from("foo.sor.txt")
        );
    }

    #[test]
    fn output_path_appends_when_no_extension() {
        assert_eq!(
            output_path(std::path::Path::new("foo"), ".sor.txt"),
            PathBuf::from("foo.sor.txt")
        );
    }

    #[test]
    fn output_path_inserts_leading_dot() {
        assert_eq!(
            output_path(std::path::Path::new("foo.dat"), "sor"),
            PathBuf::from("foo.sor")
        );
    }

    #[test]
    fn validate_rejects_missing_fixed_length() {
        let cfg = SortConfig {
            fields: vec![FieldSpec {
                field_type: FieldType::Alpha,
                position: 1,
                length: 0,
            }],
            fixed_mode: true,
            field_separator: b'\t',
            decimal_separator: b'.',
            date_pattern: "d.m.y".into(),
            begin_line: 1,
            reverse: false,
            precision: Precision::Simple,
            ignore_overflow: false,
            output_extension: ".sor.txt".into(),
            century_anchor: 20,
        };
        assert!(cfg.validate().is_err());
    }
}

//! CLI front-end (A1, SPEC_FULL.md §2/§6).
//!
//! Every option is `/slash`-prefixed (`/p:SPEC`, not `-p SPEC`), which
//! doesn't fit `clap`'s `-`/`--` matcher, so options are parsed by a
//! small hand-written tokenizer in the same "peekable-chars state
//! machine" style [`crate::fieldspec`] already uses for its own
//! sub-grammar.

use crate::config::{FieldSpec, Precision, SortConfig};
use crate::error::{RecsortError, Result};
use crate::fieldspec;

pub const USAGE: &str = "\
recsort [options] file...

Sorts large delimited or fixed-width record files by one or more key
fields, producing a reordered copy that preserves the original bytes
of each record.

Options:
  /o:EXT     output extension (default .sor.txt)
  /n:C       decimal separator (default .)
  /d:FMT     date pattern, e.g. d.m.y (default d.m.y)
  /s:C       field separator for delimited mode (default TAB)
  /p:SPEC    delimited-mode field spec, e.g. 2,D5 (conflicts with /f)
  /f:SPEC    fixed-mode field spec, e.g. 10L5,N20L8 (conflicts with /p)
  /r         reverse order
  /b:N       first data line, 1-based (default 1)
  /double    use DOUBLE numeric precision (default SIMPLE)
  /i         ignore overflow: truncate long mantissas, never exponents
  /?         print this message and exit
";

/// The result of parsing `argv`: either a request to print usage, or a
/// validated config plus the file arguments to process.
pub enum Parsed {
    Usage,
    Run {
        config: SortConfig,
        files: Vec<String>,
    },
}

/// Parses `argv` (excluding the program name) into a [`Parsed`] result.
pub fn parse(args: &[String]) -> Result<Parsed> {
    let mut output_extension = ".sor.txt".to_string();
    let mut decimal_separator = b'.';
    let mut date_pattern = "d.m.y".to_string();
    let mut field_separator: Option<u8> = None;
    let mut p_spec: Option<String> = None;
    let mut f_spec: Option<String> = None;
    let mut reverse = false;
    let mut begin_line = 1usize;
    let mut precision = Precision::Simple;
    let mut ignore_overflow = false;
    let mut files = Vec::new();

    for arg in args {
        if arg == "/?" {
            return Ok(Parsed::Usage);
        }
        if let Some(rest) = arg.strip_prefix('/') {
            let (name, value) = split_option(rest);
            match name.to_ascii_lowercase().as_str() {
                "o" => output_extension = require_value(arg, value)?.to_string(),
                "n" => decimal_separator = require_byte(arg, value)?,
                "d" => date_pattern = require_value(arg, value)?.to_string(),
                "s" => field_separator = Some(require_byte(arg, value)?),
                "p" => p_spec = Some(require_value(arg, value)?.to_string()),
                "f" => f_spec = Some(require_value(arg, value)?.to_string()),
                "r" => reverse = true,
                "b" => {
                    begin_line = require_value(arg, value)?
                        .parse()
                        .map_err(|_| invalid(arg, "expected an integer"))?
                }
                "double" => precision = Precision::Double,
                "i" => ignore_overflow = true,
                other => return Err(invalid(arg, &format!("unrecognized option /{other}"))),
            }
        } else {
            files.push(arg.clone());
        }
    }

    if files.is_empty() {
        return Err(RecsortError::InvalidArgument(
            "at least one input file is required".to_string(),
        ));
    }
    if p_spec.is_some() && f_spec.is_some() {
        return Err(RecsortError::InvalidArgument(
            "/p and /f are mutually exclusive".to_string(),
        ));
    }
    if p_spec.is_none() && f_spec.is_none() {
        return Err(RecsortError::InvalidArgument(
            "one of /p or /f is required".to_string(),
        ));
    }
    if field_separator.is_some() && p_spec.is_none() {
        return Err(RecsortError::InvalidArgument(
            "/s requires /p".to_string(),
        ));
    }

    let fixed_mode = f_spec.is_some();
    let fields: Vec<FieldSpec> = match (&p_spec, &f_spec) {
        (Some(spec), None) => fieldspec::parse(spec, false)?,
        (None, Some(spec)) => fieldspec::parse(spec, true)?,
        _ => unreachable!("checked above"),
    };

    let config = SortConfig {
        fields,
        fixed_mode,
        field_separator: field_separator.unwrap_or(b'\t'),
        decimal_separator,
        date_pattern,
        begin_line,
        reverse,
        precision,
        ignore_overflow,
        output_extension,
        century_anchor: 0, // filled in by the caller from `RunContext`
    };
    config.validate()?;

    Ok(Parsed::Run { config, files })
}

/// Splits `name:value` into its parts; an option with no `:` has no
/// value (flags like `/r`, `/i`, `/double`).
fn split_option(rest: &str) -> (&str, Option<&str>) {
    match rest.split_once(':') {
        Some((name, value)) => (name, Some(value)),
        None => (rest, None),
    }
}

fn require_value<'a>(arg: &str, value: Option<&'a str>) -> Result<&'a str> {
    value.ok_or_else(|| invalid(arg, "expected a value after ':'"))
}

fn require_byte(arg: &str, value: Option<&str>) -> Result<u8> {
    let text = require_value(arg, value)?;
    let mut bytes = text.bytes();
    let first = bytes
        .next()
        .ok_or_else(|| invalid(arg, "expected a single character"))?;
    if bytes.next().is_some() {
        return Err(invalid(arg, "expected a single character"));
    }
    Ok(first)
}

fn invalid(arg: &str, reason: &str) -> RecsortError {
    RecsortError::InvalidArgument(format!("{arg}: {reason}"))
}

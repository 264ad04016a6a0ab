//! Sort orchestrator (C6) and output writer (C7), spec §4.6–§4.7.
//!
//! Drives one input file through the whole pipeline: header copy, key
//! building and index emission, external sort, and re-emission of
//! sorted records with their original bytes and EOL untouched. Stages
//! run strictly sequentially (spec §5); every temp file is removed on
//! every exit path, including error paths.

use crate::config::{RunContext, SortConfig};
use crate::date::DatePattern;
use crate::error::{IoContext, RecsortError, Result};
use crate::externalsort::ExternalSorter;
use crate::keybuilder;
use crate::linereader::LineReader;
use crate::progress::ProgressSink;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

/// Average bytes per row assumed when estimating the total line count
/// for progress reporting (spec §4.6).
const AVG_ROW_LEN: u64 = 120;

/// Set by the `ctrlc` handler installed in [`crate::install_interrupt_handler`];
/// checked between records during the index and re-emission passes so an
/// interrupted run aborts the *current* file cleanly instead of leaving
/// partially written output (SPEC_FULL.md §5).
static INTERRUPTED: AtomicBool = AtomicBool::new(false);

pub fn request_interrupt() {
    INTERRUPTED.store(true, Ordering::SeqCst);
}

fn interrupted() -> bool {
    INTERRUPTED.load(Ordering::SeqCst)
}

/// Guards the two temp files the pipeline creates, removing whichever
/// still exist on drop — including on the error path that unwinds
/// through `?` (spec §5: "released on every exit path").
struct TempGuard {
    unsorted: PathBuf,
    sorted: PathBuf,
}

impl Drop for TempGuard {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.unsorted);
        let _ = std::fs::remove_file(&self.sorted);
    }
}

/// Runs the full pipeline for one input file, returning the output path
/// on success (spec §4.6, §4.7).
pub fn run_file(
    input: &Path,
    config: &SortConfig,
    run_ctx: &RunContext,
    sorter: &dyn ExternalSorter,
) -> Result<PathBuf> {
    let output = crate::config::output_path(input, &config.output_extension);
    if output.exists() {
        std::fs::remove_file(&output).with_path(&output)?;
    }

    let unsorted_index = temp_path(input, "tmp");
    let sorted_index = temp_path(input, "tmp.sorted");
    if unsorted_index.exists() {
        std::fs::remove_file(&unsorted_index).with_path(&unsorted_index)?;
    }
    if sorted_index.exists() {
        std::fs::remove_file(&sorted_index).with_path(&sorted_index)?;
    }
    let _guard = TempGuard {
        unsorted: unsorted_index.clone(),
        sorted: sorted_index.clone(),
    };

    let reader = LineReader::open(input)?;
    let date_pattern = DatePattern::parse(&config.date_pattern)?;

    let total_estimate = (reader.len() as u64 / AVG_ROW_LEN).max(1);
    let increment = progress_increment(reader.len() as u64);

    let mut out_file = std::fs::File::create(&output).with_path(&output)?;

    // Step 3–4: copy header lines [1, begin) verbatim, including the
    // source file's own EOL bytes; everything after is the data region.
    let mut records = reader.records();
    let mut line_no = 0usize;
    while line_no + 1 < config.begin_line {
        match records.next() {
            Some(record) => {
                line_no += 1;
                let bytes = reader.record_with_eol_at(record.offset);
                out_file.write_all(bytes).with_path(&output)?;
            }
            None => break,
        }
    }

    // Step 5: stream remaining (data) records, building keys into the
    // unsorted index file.
    {
        let mut index_file = std::fs::File::create(&unsorted_index).with_path(&unsorted_index)?;
        let mut done = 0u64;
        for record in records {
            if interrupted() {
                return Err(RecsortError::Io {
                    path: input.to_path_buf(),
                    source: std::io::Error::new(std::io::ErrorKind::Interrupted, "interrupted"),
                });
            }
            write_index_entry(&mut index_file, &record.bytes, record.offset, config, &date_pattern, &unsorted_index)?;
            done += 1;
            if done % increment == 0 {
                run_ctx.progress.on_progress(done, total_estimate);
            }
        }
        index_file.flush().with_path(&unsorted_index)?;
    }

    // Step 6: invoke the external sorter.
    sorter.sort(&unsorted_index, &sorted_index, config.reverse)?;

    // Step 7: the unsorted index is no longer needed; remove it now so
    // a crash before step 9 leaves only the sorted index behind.
    std::fs::remove_file(&unsorted_index).with_path(&unsorted_index)?;

    // Step 8-9: re-emit records in sorted order, preserving original
    // bytes and EOL (C7).
    let sorted_file = std::fs::File::open(&sorted_index).with_path(&sorted_index)?;
    let mut done = 0u64;
    for line in BufReader::new(sorted_file).split(b'\n') {
        if interrupted() {
            return Err(RecsortError::Io {
                path: input.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::Interrupted, "interrupted"),
            });
        }
        let line = line.with_path(&sorted_index)?;
        if line.is_empty() {
            continue;
        }
        let tab = memchr::memchr(b'\t', &line).ok_or_else(|| RecsortError::Io {
            path: sorted_index.clone(),
            source: std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                "malformed index entry: no TAB separator",
            ),
        })?;
        let offset_text = std::str::from_utf8(&line[tab + 1..]).map_err(|_| RecsortError::Io {
            path: sorted_index.clone(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidData, "non-utf8 offset"),
        })?;
        let offset: u64 = offset_text.trim().parse().map_err(|_| RecsortError::Io {
            path: sorted_index.clone(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidData, "invalid offset"),
        })?;

        let body = reader.record_at(offset);
        out_file.write_all(body).with_path(&output)?;
        out_file.write_all(reader.eol().bytes()).with_path(&output)?;

        done += 1;
        if done % increment == 0 {
            run_ctx.progress.on_progress(done, total_estimate);
        }
    }
    run_ctx.progress.on_progress(done, total_estimate.max(done));
    out_file.flush().with_path(&output)?;

    Ok(output)
}

fn write_index_entry(
    index_file: &mut std::fs::File,
    record: &[u8],
    offset: u64,
    config: &SortConfig,
    date_pattern: &DatePattern,
    index_path: &Path,
) -> Result<()> {
    let key = keybuilder::build_key(record, config, date_pattern)?;
    index_file.write_all(&key).with_path(index_path)?;
    index_file.write_all(b"\t").with_path(index_path)?;
    index_file
        .write_all(offset.to_string().as_bytes())
        .with_path(index_path)?;
    index_file.write_all(b"\n").with_path(index_path)?;
    Ok(())
}

/// `.tmp` / `.tmp.sorted` temp file naming (spec §5): appended to the
/// full input path, not substituted for its extension.
fn temp_path(input: &Path, suffix: &str) -> PathBuf {
    let mut s = input.as_os_str().to_os_string();
    s.push(".");
    s.push(suffix);
    PathBuf::from(s)
}

/// `increment = max(1000, round_down_to_1000(file_size / AVG_ROW_LEN / 100))`
/// (spec §4.6).
fn progress_increment(file_size: u64) -> u64 {
    let raw = file_size / AVG_ROW_LEN / 100;
    let rounded = (raw / 1000) * 1000;
    rounded.max(1000)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FieldSpec, FieldType, Precision};
    use crate::externalsort::InMemorySort;
    use crate::progress::NullProgress;
    use std::rc::Rc;

    fn base_config(fields: Vec<FieldSpec>) -> SortConfig {
        SortConfig {
            fields,
            fixed_mode: false,
            field_separator: b'\t',
            decimal_separator: b'.',
            date_pattern: "d.m.y".into(),
            begin_line: 2,
            reverse: false,
            precision: Precision::Simple,
            ignore_overflow: false,
            output_extension: ".sor.txt".into(),
            century_anchor: 20,
        }
    }

    fn run_ctx() -> RunContext {
        RunContext {
            century_anchor: 20,
            progress: Rc::new(NullProgress),
        }
    }

    #[test]
    fn sorts_numeric_field_with_header_preserved() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("foo.txt");
        std::fs::write(&input, "ID\tAMT\n1\t3.14\n2\t-2.5\n3\t10\n").unwrap();

        let fields = vec![FieldSpec {
            field_type: FieldType::Numeric,
            position: 2,
            length: 0,
        }];
        let cfg = base_config(fields);
        let ctx = run_ctx();
        let out = run_file(&input, &cfg, &ctx, &InMemorySort).unwrap();

        let contents = std::fs::read_to_string(&out).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines[0], "ID\tAMT");
        assert_eq!(&lines[1..], &["2\t-2.5", "1\t3.14", "3\t10"]);
    }

    #[test]
    fn reverse_flag_reverses_final_order() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("foo.txt");
        std::fs::write(&input, "ID\tAMT\n1\t3.14\n2\t-2.5\n3\t10\n").unwrap();

        let fields = vec![FieldSpec {
            field_type: FieldType::Numeric,
            position: 2,
            length: 0,
        }];
        let mut cfg = base_config(fields);
        cfg.reverse = true;
        let ctx = run_ctx();
        let out = run_file(&input, &cfg, &ctx, &InMemorySort).unwrap();

        let contents = std::fs::read_to_string(&out).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(&lines[1..], &["3\t10", "1\t3.14", "2\t-2.5"]);
    }

    #[test]
    fn preserves_crlf_eol_in_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("foo.txt");
        std::fs::write(&input, "b\r\na\r\n").unwrap();

        let fields = vec![FieldSpec {
            field_type: FieldType::Alpha,
            position: 1,
            length: 0,
        }];
        let mut cfg = base_config(fields);
        cfg.begin_line = 1;
        let ctx = run_ctx();
        let out = run_file(&input, &cfg, &ctx, &InMemorySort).unwrap();

        let contents = std::fs::read(&out).unwrap();
        assert_eq!(contents, b"a\r\nb\r\n");
    }

    #[test]
    fn begin_one_copies_no_header() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("foo.txt");
        std::fs::write(&input, "b\na\n").unwrap();

        let fields = vec![FieldSpec {
            field_type: FieldType::Alpha,
            position: 1,
            length: 0,
        }];
        let mut cfg = base_config(fields);
        cfg.begin_line = 1;
        let ctx = run_ctx();
        let out = run_file(&input, &cfg, &ctx, &InMemorySort).unwrap();

        let contents = std::fs::read_to_string(&out).unwrap();
        assert_eq!(contents, "a\nb\n");
    }

    #[test]
    fn temp_files_are_removed_after_success() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("foo.txt");
        std::fs::write(&input, "a\n1\n2\n").unwrap();

        let fields = vec![FieldSpec {
            field_type: FieldType::Alpha,
            position: 1,
            length: 0,
        }];
        let mut cfg = base_config(fields);
        cfg.begin_line = 1;
        let ctx = run_ctx();
        run_file(&input, &cfg, &ctx, &InMemorySort).unwrap();

        assert!(!temp_path(&input, "tmp").exists());
        assert!(!temp_path(&input, "tmp.sorted").exists());
    }

    #[test]
    fn fixed_mode_sorts_by_alpha_then_numeric() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("fixed.dat");
        // chars 10..15 ALPHA, chars 20..28 NUMERIC, padded rows.
        let row_b = format!("{}BBBBB{}{:<8}\n", " ".repeat(9), " ".repeat(5), "1e5");
        let row_a = format!("{}AAAAA{}{:<8}\n", " ".repeat(9), " ".repeat(5), "1e-5");
        std::fs::write(&input, format!("{row_b}{row_a}")).unwrap();

        let fields = vec![
            FieldSpec {
                field_type: FieldType::Alpha,
                position: 10,
                length: 5,
            },
            FieldSpec {
                field_type: FieldType::Numeric,
                position: 20,
                length: 8,
            },
        ];
        let mut cfg = base_config(fields);
        cfg.fixed_mode = true;
        cfg.begin_line = 1;
        let ctx = run_ctx();
        let out = run_file(&input, &cfg, &ctx, &InMemorySort).unwrap();
        let contents = std::fs::read_to_string(&out).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert!(lines[0].contains("AAAAA"));
        assert!(lines[1].contains("BBBBB"));
    }
}

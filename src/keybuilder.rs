//! Composite key builder (C5, spec §4.5).
//!
//! Extracts each configured field's text from a record (delimited or
//! fixed mode), encodes it through C1/C2 or raw-pads it for ALPHA, and
//! concatenates the results into one fixed-layout sortable byte string.

use crate::config::{FieldSpec, FieldType, SortConfig};
use crate::date::DatePattern;
use crate::error::Result;
use crate::numeric;

/// Builds one record's composite sort key.
///
/// `date_pattern` is parsed once per file (not per record) by the caller
/// and passed in, since every record in a file shares the same pattern.
pub fn build_key(
    record: &[u8],
    config: &SortConfig,
    date_pattern: &DatePattern,
) -> Result<Vec<u8>> {
    let mut key = Vec::new();
    for field in &config.fields {
        let text = extract_field(record, field, config.fixed_mode, config.field_separator);
        encode_field(&text, field, config, date_pattern, &mut key)?;
    }
    Ok(key)
}

/// Pulls one field's raw text out of a record. Missing fields (short
/// delimited rows, short fixed-width rows) yield an empty string rather
/// than an error — C1/C2 both define empty-text behavior.
fn extract_field(record: &[u8], field: &FieldSpec, fixed_mode: bool, separator: u8) -> String {
    if fixed_mode {
        let start = field.position - 1;
        if start >= record.len() {
            return String::new();
        }
        let end = (start + field.length).min(record.len());
        String::from_utf8_lossy(&record[start..end]).into_owned()
    } else {
        record
            .split(|&b| b == separator)
            .nth(field.position - 1)
            .map(|chunk| String::from_utf8_lossy(chunk).into_owned())
            .unwrap_or_default()
    }
}

fn encode_field(
    text: &str,
    field: &FieldSpec,
    config: &SortConfig,
    date_pattern: &DatePattern,
    out: &mut Vec<u8>,
) -> Result<()> {
    match field.field_type {
        FieldType::Alpha => {
            let width = field.length;
            if width == 0 {
                out.extend_from_slice(text.as_bytes());
            } else {
                let mut bytes = text.as_bytes().to_vec();
                bytes.truncate(width);
                while bytes.len() < width {
                    bytes.push(b' ');
                }
                out.extend_from_slice(&bytes);
            }
        }
        FieldType::Numeric => {
            let encoded = numeric::encode(
                text,
                config.precision,
                config.decimal_separator,
                config.ignore_overflow,
            )?;
            out.extend_from_slice(&encoded);
        }
        FieldType::Date => {
            let encoded = date_pattern.convert(text, config.century_anchor)?;
            out.extend_from_slice(&encoded);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Precision;

    fn config(fields: Vec<FieldSpec>, fixed_mode: bool) -> SortConfig {
        SortConfig {
            fields,
            fixed_mode,
            field_separator: b',',
            decimal_separator: b'.',
            date_pattern: "d.m.y".into(),
            begin_line: 1,
            reverse: false,
            precision: Precision::Simple,
            ignore_overflow: false,
            output_extension: ".sor.txt".into(),
            century_anchor: 20,
        }
    }

    #[test]
    fn builds_delimited_alpha_and_numeric_key() {
        let fields = vec![
            FieldSpec {
                field_type: FieldType::Alpha,
                position: 1,
                length: 0,
            },
            FieldSpec {
                field_type: FieldType::Numeric,
                position: 2,
                length: 0,
            },
        ];
        let cfg = config(fields, false);
        let pattern = DatePattern::parse("d.m.y").unwrap();
        let key = build_key(b"abc,42", &cfg, &pattern).unwrap();
        assert!(key.starts_with(b"abc"));
    }

    #[test]
    fn missing_delimited_field_yields_empty_text() {
        let fields = vec![FieldSpec {
            field_type: FieldType::Alpha,
            position: 5,
            length: 4,
        }];
        let cfg = config(fields, false);
        let pattern = DatePattern::parse("d.m.y").unwrap();
        let key = build_key(b"a,b", &cfg, &pattern).unwrap();
        assert_eq!(key, b"    ");
    }

    #[test]
    fn fixed_mode_extracts_by_offset_and_length() {
        let fields = vec![FieldSpec {
            field_type: FieldType::Alpha,
            position: 3,
            length: 4,
        }];
        let cfg = config(fields, true);
        let pattern = DatePattern::parse("d.m.y").unwrap();
        let key = build_key(b"xxHELLOyy", &cfg, &pattern).unwrap();
        assert_eq!(key, b"HELL");
    }

    #[test]
    fn short_fixed_row_pads_with_spaces() {
        let fields = vec![FieldSpec {
            field_type: FieldType::Alpha,
            position: 1,
            length: 10,
        }];
        let cfg = config(fields, true);
        let pattern = DatePattern::parse("d.m.y").unwrap();
        let key = build_key(b"ab", &cfg, &pattern).unwrap();
        assert_eq!(key, b"ab        ");
    }

    #[test]
    fn date_field_is_encoded_to_canonical_form() {
        let fields = vec![FieldSpec {
            field_type: FieldType::Date,
            position: 1,
            length: 0,
        }];
        let cfg = config(fields, false);
        let pattern = DatePattern::parse("d.m.y").unwrap();
        let key = build_key(b"5.3.99", &cfg, &pattern).unwrap();
        assert_eq!(key, b"20990305");
    }
}

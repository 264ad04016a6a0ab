//! Field specification parser (C3, spec §4.3).
//!
//! Grammar: `field := type_prefix? position length_suffix?`,
//! `type_prefix := 'd' | 'n'` (else ALPHA), `position := [0-9]+`,
//! `length_suffix := 'l' [0-9]+`. A comma-separated list of these tokens,
//! case-folded before parsing.

use crate::config::{FieldSpec, FieldType};
use crate::error::{RecsortError, Result};

/// Parses a `/p` or `/f` argument into an ordered list of field
/// descriptors. `fixed_mode` selects the cross-mode rules: fixed mode
/// requires every field to carry a positive length; delimited mode
/// permits a length suffix only on ALPHA fields.
pub fn parse(spec: &str, fixed_mode: bool) -> Result<Vec<FieldSpec>> {
    let folded = spec.to_lowercase();
    let mut fields = Vec::new();
    for token in folded.split(',') {
        let token = token.trim();
        if token.is_empty() {
            return Err(invalid_spec(spec, "empty field token"));
        }
        fields.push(parse_token(spec, token, fixed_mode)?);
    }
    Ok(fields)
}

fn parse_token(full_spec: &str, token: &str, fixed_mode: bool) -> Result<FieldSpec> {
    let mut chars = token.chars().peekable();

    let field_type = match chars.peek() {
        Some('d') => {
            chars.next();
            FieldType::Date
        }
        Some('n') => {
            chars.next();
            FieldType::Numeric
        }
        _ => FieldType::Alpha,
    };

    let mut position_str = String::new();
    while let Some(&c) = chars.peek() {
        if c.is_ascii_digit() {
            position_str.push(c);
            chars.next();
        } else {
            break;
        }
    }
    if position_str.is_empty() {
        return Err(invalid_spec(full_spec, "missing field position"));
    }
    let position: usize = position_str
        .parse()
        .map_err(|_| invalid_spec(full_spec, "position is not a valid integer"))?;
    if position < 1 {
        return Err(invalid_spec(full_spec, "position must be >= 1"));
    }

    let mut length = 0usize;
    if let Some(&'l') = chars.peek() {
        chars.next();
        let mut length_str = String::new();
        while let Some(&c) = chars.peek() {
            if c.is_ascii_digit() {
                length_str.push(c);
                chars.next();
            } else {
                break;
            }
        }
        if length_str.is_empty() {
            return Err(invalid_spec(full_spec, "'l' must be followed by a length"));
        }
        length = length_str
            .parse()
            .map_err(|_| invalid_spec(full_spec, "length is not a valid integer"))?;
    }

    if chars.peek().is_some() {
        return Err(invalid_spec(full_spec, "unexpected trailing characters"));
    }

    if fixed_mode && length == 0 {
        return Err(invalid_spec(
            full_spec,
            "fixed mode requires every field to have an 'l' length suffix",
        ));
    }
    if !fixed_mode && length > 0 && field_type != FieldType::Alpha {
        return Err(invalid_spec(
            full_spec,
            "length suffix is only permitted on ALPHA fields in delimited mode",
        ));
    }

    Ok(FieldSpec {
        field_type,
        position,
        length,
    })
}

fn invalid_spec(spec: &str, reason: &str) -> RecsortError {
    RecsortError::InvalidFieldSpec {
        spec: spec.to_string(),
        reason: reason.to_string(),
    }
}

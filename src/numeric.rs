//! Numeric key encoder (C2, spec §4.2).
//!
//! Maps signed real numbers to a fixed-width byte string whose
//! lexicographic order equals numeric order, using a sign flag, an
//! exponent-sign flag, and nines-complemented digit fields so that
//! negative and fractional magnitudes invert correctly (spec §4.2).

pub use crate::config::Precision;
use crate::error::{RecsortError, Result};

/// Encodes one field value under the given precision (spec §4.2).
///
/// `decimal_separator` is the single byte the caller configured as the
/// decimal point; it is translated to `.` before parsing. Non-numeric
/// text falls back to space-padded raw text (never an error).
pub fn encode(
    value_text: &str,
    precision: Precision,
    decimal_separator: u8,
    ignore_overflow: bool,
) -> Result<Vec<u8>> {
    let total_width = precision.total_width();
    let trimmed = value_text.trim();

    match parse_decomposed(trimmed, decimal_separator) {
        Some(Decomposed::Zero) => Ok(encode_zero(precision, total_width)),
        Some(Decomposed::NonZero { negative, digits, exponent }) => {
            encode_numeric(trimmed, negative, &digits, exponent, precision, ignore_overflow, total_width)
        }
        None => Ok(fallback(trimmed, total_width)),
    }
}

enum Decomposed {
    Zero,
    NonZero {
        negative: bool,
        digits: String,
        exponent: i64,
    },
}

/// Cleans, trailing-minus-normalizes, and lexically decomposes a field's
/// text into (sign, significant digit string, power-of-ten exponent) —
/// see SPEC_FULL.md §4.2 for why this is done with string slicing rather
/// than an arithmetic decimal type.
fn parse_decomposed(trimmed: &str, decimal_separator: u8) -> Option<Decomposed> {
    if trimmed.is_empty() {
        return None;
    }

    // Trailing-minus normalization: legacy accounting convention.
    let mut owned;
    let normalized: &str = if trimmed.ends_with('-')
        && !trimmed.starts_with('-')
        && !trimmed.starts_with('+')
    {
        owned = String::with_capacity(trimmed.len());
        owned.push('-');
        owned.push_str(&trimmed[..trimmed.len() - 1]);
        &owned
    } else {
        trimmed
    };

    // Strip characters outside the numeric alphabet, translating the
    // configured decimal separator to '.'. 'e'/'E'/'+' are kept so that
    // scientific notation in the source text still parses (see
    // SPEC_FULL.md §4.2 open-question resolution in DESIGN.md).
    let mut cleaned = String::with_capacity(normalized.len());
    for c in normalized.chars() {
        if c == '-' || c == '+' || c == 'e' || c == 'E' || c.is_ascii_digit() {
            cleaned.push(c);
        } else if c as u32 == decimal_separator as u32 {
            cleaned.push('.');
        }
    }

    let (mantissa_part, explicit_exponent) = match cleaned.find(['e', 'E']) {
        Some(idx) => {
            let exp_str = &cleaned[idx + 1..];
            let exp: i64 = exp_str.parse().ok()?;
            (&cleaned[..idx], exp)
        }
        None => (cleaned.as_str(), 0),
    };

    let negative = mantissa_part.starts_with('-');
    let unsigned = mantissa_part.trim_start_matches(['-', '+']);
    if unsigned.is_empty() {
        return None;
    }

    let mut dot_parts = unsigned.splitn(2, '.');
    let int_part = dot_parts.next().unwrap_or("");
    let frac_part = dot_parts.next().unwrap_or("");
    if int_part.is_empty() && frac_part.is_empty() {
        return None;
    }
    if !int_part.bytes().all(|b| b.is_ascii_digit()) || !frac_part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let digit_sequence = format!("{int_part}{frac_part}");
    let point_pos = int_part.len() as i64;

    let first_nonzero = digit_sequence.bytes().position(|b| b != b'0');
    let Some(k) = first_nonzero else {
        return Some(Decomposed::Zero);
    };
    let k = k as i64;

    // Trailing zeros carry no significance (they're re-added by the
    // right-zero-pad in `encode_components`) and must not count
    // against the mantissa-width overflow check below: "1e8" has one
    // significant digit, not nine.
    let significant = digit_sequence[k as usize..]
        .trim_end_matches('0')
        .to_string();
    let exponent = (point_pos - k - 1) + explicit_exponent;

    Some(Decomposed::NonZero {
        negative,
        digits: significant,
        exponent,
    })
}

fn encode_numeric(
    original: &str,
    negative: bool,
    digits: &str,
    exponent: i64,
    precision: Precision,
    ignore_overflow: bool,
    total_width: usize,
) -> Result<Vec<u8>> {
    let mantissa_width = precision.mantissa_width();

    let mantissa_source: &str = if digits.len() > mantissa_width {
        if ignore_overflow {
            &digits[..mantissa_width]
        } else {
            return Err(RecsortError::ValueOverflow {
                value: original.to_string(),
                precision,
            });
        }
    } else {
        digits
    };

    let exponent_width = precision.exponent_width();
    let exponent_digits = format!("{:0width$}", exponent.unsigned_abs(), width = exponent_width);
    if exponent_digits.len() > exponent_width {
        return Err(RecsortError::ExponentOverflow {
            value: original.to_string(),
            precision,
        });
    }

    Ok(encode_components(
        negative,
        mantissa_source,
        exponent,
        precision,
        total_width,
    ))
}

/// Zero is the smallest non-negative magnitude: it must sort before every
/// positive fraction, not just before values >= 1. Rather than route it
/// through the exponent-zero case of [`encode_components`] (which would
/// land it in the "magnitude >= 1" bucket, after small fractions), it is
/// given the exponent pattern that bucket reserves for the limit of an
/// infinitely negative exponent — all-zero digits in the "lesser" flag
/// class — so it sorts below every representable fraction.
fn encode_zero(precision: Precision, total_width: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(total_width);
    out.push(b'1');
    out.push(b'0');
    out.extend(std::iter::repeat(b'0').take(precision.exponent_width()));
    out.extend(std::iter::repeat(b'0').take(precision.mantissa_width()));
    out
}

/// Builds the final fixed-width encoding once overflow checks have
/// passed. `digits` may be shorter than the mantissa width; it is
/// zero-padded on the right before any nines-complement is applied.
fn encode_components(
    negative: bool,
    digits: &str,
    exponent: i64,
    precision: Precision,
    total_width: usize,
) -> Vec<u8> {
    let mut mantissa: Vec<u8> = digits.bytes().collect();
    mantissa.truncate(precision.mantissa_width());
    while mantissa.len() < precision.mantissa_width() {
        mantissa.push(b'0');
    }

    let mut exponent_digits: Vec<u8> = format!(
        "{:0width$}",
        exponent.unsigned_abs(),
        width = precision.exponent_width()
    )
    .into_bytes();
    exponent_digits.truncate(precision.exponent_width());

    let complement_exponent = negative ^ (exponent < 0);
    if complement_exponent {
        nines_complement(&mut exponent_digits);
    }
    if negative {
        nines_complement(&mut mantissa);
    }

    let sign_flag = if negative { b'0' } else { b'1' };
    let exp_sign_flag = if complement_exponent { b'0' } else { b'1' };

    let mut out = Vec::with_capacity(total_width);
    out.push(sign_flag);
    out.push(exp_sign_flag);
    out.extend_from_slice(&exponent_digits);
    out.extend_from_slice(&mantissa);
    out
}

/// Digit-wise subtraction from an all-`9` string of the same width
/// (spec glossary: "nines-complement").
fn nines_complement(digits: &mut [u8]) {
    for d in digits.iter_mut() {
        *d = b'9' - (*d - b'0') + b'0';
    }
}

/// Non-numeric fallback: the original trimmed text, space-padded (or
/// truncated) to the precision's total encoded width (spec §4.2).
fn fallback(trimmed: &str, total_width: usize) -> Vec<u8> {
    let mut out = trimmed.as_bytes().to_vec();
    out.truncate(total_width);
    while out.len() < total_width {
        out.push(b' ');
    }
    out
}

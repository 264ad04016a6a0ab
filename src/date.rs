//! Date format validator and converter (C1, spec §4.1).

use crate::error::{RecsortError, Result};

/// A validated date pattern: the order day/month/year tokens appear in,
/// and the separator byte if one was present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatePattern {
    order: [Token; 3],
    separator: Option<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    Day,
    Month,
    Year,
}

impl DatePattern {
    /// Validates and canonicalizes a raw user pattern (e.g. `"d.m.y"`,
    /// `"ymd"`, `"j/a/m"` with localized aliases `j -> d`, `a -> y`).
    pub fn parse(raw: &str) -> Result<Self> {
        let folded = raw.to_lowercase();
        let normalized: String = folded
            .chars()
            .map(|c| match c {
                'j' => 'd',
                'a' => 'y',
                other => other,
            })
            .collect();

        let invalid = || RecsortError::InvalidDateFormat {
            pattern: raw.to_string(),
            reason: "expected exactly one each of d, m, y and at most one repeated \
                     separator character"
                .to_string(),
        };

        if normalized.len() != 3 && normalized.len() != 5 {
            return Err(invalid());
        }

        let chars: Vec<char> = normalized.chars().collect();
        let (token_chars, separator): (Vec<char>, Option<u8>) = if chars.len() == 3 {
            (chars, None)
        } else {
            // Exactly 5 chars: positions 1 and 3 must be the same
            // non-token separator, positions 0, 2, 4 the tokens.
            let sep = chars[1];
            if chars[3] != sep || "dmy".contains(sep) {
                return Err(invalid());
            }
            (vec![chars[0], chars[2], chars[4]], Some(sep as u8))
        };

        let mut order = Vec::with_capacity(3);
        for c in token_chars {
            order.push(match c {
                'd' => Token::Day,
                'm' => Token::Month,
                'y' => Token::Year,
                _ => return Err(invalid()),
            });
        }
        let (d, m, y) = (
            order.contains(&Token::Day),
            order.contains(&Token::Month),
            order.contains(&Token::Year),
        );
        if !(d && m && y) {
            return Err(invalid());
        }

        Ok(DatePattern {
            order: [order[0], order[1], order[2]],
            separator,
        })
    }

    /// Idempotent: re-parsing the canonical textual form of a pattern
    /// yields the same `DatePattern` (spec §8 invariant 6).
    pub fn canonical_text(&self) -> String {
        let token = |t: Token| match t {
            Token::Day => 'd',
            Token::Month => 'm',
            Token::Year => 'y',
        };
        match self.separator {
            Some(sep) => format!(
                "{}{}{}{}{}",
                token(self.order[0]),
                sep as char,
                token(self.order[1]),
                sep as char,
                token(self.order[2])
            ),
            None => self.order.iter().map(|t| token(*t)).collect(),
        }
    }

    /// Converts a field value to canonical `YYYYMMDD` (spec §4.1).
    ///
    /// Empty values produce 8 spaces. Two-digit years are expanded with
    /// `century_anchor` (`century * 100 + yy`).
    pub fn convert(&self, value: &str, century_anchor: u32) -> Result<[u8; 8]> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Ok(*b"        ");
        }

        let parts: Vec<&str> = match self.separator {
            Some(sep) => trimmed.split(sep as char).collect(),
            None => {
                // No separator: tokens occupy fixed 2-digit slots, except
                // a year token which takes whatever is left (2 or 4 digits).
                split_unseparated(trimmed, &self.order)?
            }
        };

        if parts.len() != 3 {
            return Err(RecsortError::InvalidDateValue {
                value: value.to_string(),
                pattern: self.canonical_text(),
            });
        }

        let mut day = 0u32;
        let mut month = 0u32;
        let mut year = 0u32;
        for (token, part) in self.order.iter().zip(parts.iter()) {
            let n: u32 = part.parse().map_err(|_| RecsortError::InvalidDateValue {
                value: value.to_string(),
                pattern: self.canonical_text(),
            })?;
            match token {
                Token::Day => day = n,
                Token::Month => month = n,
                Token::Year => {
                    year = if part.len() <= 2 {
                        century_anchor * 100 + n
                    } else {
                        n
                    }
                }
            }
        }

        if !(1..=31).contains(&day) || !(1..=12).contains(&month) {
            return Err(RecsortError::InvalidDateValue {
                value: value.to_string(),
                pattern: self.canonical_text(),
            });
        }

        let mut out = [0u8; 8];
        let rendered = format!("{year:04}{month:02}{day:02}");
        out.copy_from_slice(rendered.as_bytes());
        Ok(out)
    }
}

/// Splits an unseparated date string (e.g. `ddmmyy`) into day/month/year
/// substrings given the token order, allowing the year token to absorb a
/// 2- or 4-digit remainder.
fn split_unseparated<'a>(value: &'a str, order: &[Token; 3]) -> Result<Vec<&'a str>> {
    let mut rest = value;
    let mut parts = Vec::with_capacity(3);
    for (i, token) in order.iter().enumerate() {
        let is_last = i == order.len() - 1;
        // Day/month tokens are always 2 digits; a year token in the last
        // position absorbs whatever remains (2 or 4 digits) since the
        // pattern itself carries no explicit field widths.
        let width = if *token == Token::Year && is_last {
            rest.len()
        } else {
            2
        };
        if width != 2 && width != 4 && *token == Token::Year && is_last {
            return Err(RecsortError::InvalidDateValue {
                value: value.to_string(),
                pattern: "unseparated".to_string(),
            });
        }
        if rest.len() < width {
            return Err(RecsortError::InvalidDateValue {
                value: value.to_string(),
                pattern: "unseparated".to_string(),
            });
        }
        let (head, tail) = rest.split_at(width);
        parts.push(head);
        rest = tail;
    }
    if !rest.is_empty() {
        return Err(RecsortError::InvalidDateValue {
            value: value.to_string(),
            pattern: "unseparated".to_string(),
        });
    }
    Ok(parts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_duplicate_token() {
        assert!(DatePattern::parse("d.d.y").is_err());
    }

    #[test]
    fn rejects_mismatched_separators() {
        assert!(DatePattern::parse("d.m/y").is_err());
    }

    #[test]
    fn accepts_localized_aliases() {
        let p = DatePattern::parse("j.m.a").unwrap();
        assert_eq!(p.canonical_text(), "d.m.y");
    }

    #[test]
    fn canonicalize_is_idempotent() {
        let p = DatePattern::parse("d.m.y").unwrap();
        let reparsed = DatePattern::parse(&p.canonical_text()).unwrap();
        assert_eq!(p.canonical_text(), reparsed.canonical_text());
    }

    #[test]
    fn empty_value_is_eight_spaces() {
        let p = DatePattern::parse("d.m.y").unwrap();
        assert_eq!(&p.convert("", 20).unwrap(), b"        ");
    }

    #[test]
    fn two_digit_year_uses_century_anchor() {
        let p = DatePattern::parse("d.m.y").unwrap();
        let converted = p.convert("01.01.99", 20).unwrap();
        assert_eq!(&converted, b"20990101");
    }

    #[test]
    fn dates_sort_chronologically() {
        let p = DatePattern::parse("d.m.y").unwrap();
        let a = p.convert("31.12.2000", 20).unwrap();
        let b = p.convert("01.01.2001", 20).unwrap();
        assert!(a < b);
    }

    #[test]
    fn invalid_month_is_rejected() {
        let p = DatePattern::parse("d.m.y").unwrap();
        assert!(p.convert("01.13.2000", 20).is_err());
    }
}

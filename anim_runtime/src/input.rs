//! Raw input validation for client controls.
//!
//! Everything here runs before an action is recorded. A rejected input
//! produces no command and no history entry.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("{field} must not be empty")]
    Empty { field: &'static str },
    #[error("{token:?} is not an integer")]
    NotANumber { token: String },
    #[error("index {index} is outside 0..{len}")]
    IndexOutOfRange { index: i64, len: usize },
    #[error("{0}")]
    Unavailable(&'static str),
}

/// Trimmed `raw`, or `Empty` if nothing is left.
pub fn require_non_empty<'a>(raw: &'a str, field: &'static str) -> Result<&'a str, InputError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        Err(InputError::Empty { field })
    } else {
        Ok(trimmed)
    }
}

/// Zero-pad an all-digit value to `max_len`, keeping its last `max_len`
/// digits. Anything else is returned unchanged.
pub fn normalize_number(input: &str, max_len: usize) -> String {
    if input.is_empty() || !input.bytes().all(|b| b.is_ascii_digit()) {
        return input.to_string();
    }
    let tail = &input[input.len().saturating_sub(max_len)..];
    format!("{:0>width$}", tail, width = max_len)
}

/// Comma-separated integers. Blank entries are skipped; the result is
/// capped at `max_len` elements.
pub fn parse_number_list(raw: &str, max_len: usize) -> Result<Vec<i64>, InputError> {
    let mut values = Vec::new();
    for token in raw.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        let value = token.parse::<i64>().map_err(|_| InputError::NotANumber {
            token: token.to_string(),
        })?;
        values.push(value);
    }
    if values.is_empty() {
        return Err(InputError::Empty { field: "list" });
    }
    values.truncate(max_len);
    Ok(values)
}

pub fn check_index(index: i64, len: usize) -> Result<usize, InputError> {
    usize::try_from(index)
        .ok()
        .filter(|i| *i < len)
        .ok_or(InputError::IndexOutOfRange { index, len })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_non_empty() {
        assert_eq!(require_non_empty("  7 ", "value"), Ok("7"));
        assert_eq!(
            require_non_empty("   ", "value"),
            Err(InputError::Empty { field: "value" })
        );
    }

    #[test]
    fn test_normalize_number() {
        assert_eq!(normalize_number("5", 4), "0005");
        assert_eq!(normalize_number("12345", 4), "2345");
        assert_eq!(normalize_number("ab", 4), "ab");
        assert_eq!(normalize_number("", 4), "");
    }

    #[test]
    fn test_parse_number_list() {
        assert_eq!(parse_number_list("3,1,2", 12), Ok(vec![3, 1, 2]));
        assert_eq!(parse_number_list(" 4 , ,-2,", 12), Ok(vec![4, -2]));
        assert_eq!(parse_number_list("1,2,3,4", 2), Ok(vec![1, 2]));
        assert_eq!(
            parse_number_list("1,x", 12),
            Err(InputError::NotANumber { token: "x".into() })
        );
        assert_eq!(parse_number_list(" , ", 12), Err(InputError::Empty { field: "list" }));
    }

    #[test]
    fn test_check_index() {
        assert_eq!(check_index(2, 3), Ok(2));
        assert_eq!(check_index(3, 3), Err(InputError::IndexOutOfRange { index: 3, len: 3 }));
        assert_eq!(check_index(-1, 3), Err(InputError::IndexOutOfRange { index: -1, len: 3 }));
    }
}

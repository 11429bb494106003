use std::collections::HashMap;

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 10;

/// Page window requested by a listing caller. Both values are always at
/// least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Pagination {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

/// Reads the integer at the start of `s` the lenient way: leading
/// whitespace and a sign are accepted, anything after the digits is ignored.
/// Returns None when there are no digits or the value overflows.
fn parse_leading_int(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let digits_len = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits_len == 0 {
        return None;
    }
    let value: i64 = rest[..digits_len].parse().ok()?;
    Some(if negative { -value } else { value })
}

/// Zero, negative, non-numeric and out of range values all fall back to the
/// default instead of failing the request.
fn positive_or(value: Option<&str>, default: u32) -> u32 {
    value
        .and_then(parse_leading_int)
        .filter(|v| *v >= 1)
        .and_then(|v| u32::try_from(v).ok())
        .unwrap_or(default)
}

impl Pagination {
    pub fn from_params(page: Option<&str>, limit: Option<&str>) -> Self {
        Pagination {
            page: positive_or(page, DEFAULT_PAGE),
            limit: positive_or(limit, DEFAULT_LIMIT),
        }
    }

    pub fn from_query(query: &HashMap<String, String>) -> Self {
        Self::from_params(
            query.get("page").map(String::as_str),
            query.get("limit").map(String::as_str),
        )
    }

    /// Zero-based index of the first record of the page.
    pub fn offset(&self) -> u64 {
        (self.page as u64 - 1) * self.limit as u64
    }

    /// Zero-based index of the last record of the page, inclusive.
    pub fn last_index(&self) -> u64 {
        self.offset() + self.limit as u64 - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_leading_integers() {
        assert_eq!(parse_leading_int("42"), Some(42));
        assert_eq!(parse_leading_int("  7abc"), Some(7));
        assert_eq!(parse_leading_int("-3"), Some(-3));
        assert_eq!(parse_leading_int("+5"), Some(5));
        assert_eq!(parse_leading_int("2.9"), Some(2));
        assert_eq!(parse_leading_int("abc"), None);
        assert_eq!(parse_leading_int(""), None);
        assert_eq!(parse_leading_int("-"), None);
        assert_eq!(parse_leading_int("99999999999999999999999"), None);
    }

    #[test]
    fn defaults_when_absent() {
        assert_eq!(Pagination::from_params(None, None), Pagination::default());
    }

    #[test]
    fn falls_back_to_defaults_on_bad_values() {
        let pagination = Pagination::from_params(Some("zero"), Some(""));
        assert_eq!(pagination, Pagination { page: 1, limit: 10 });

        let pagination = Pagination::from_params(Some("0"), Some("-5"));
        assert_eq!(pagination, Pagination { page: 1, limit: 10 });

        let pagination = Pagination::from_params(Some("4294967296"), Some("3"));
        assert_eq!(pagination, Pagination { page: 1, limit: 3 });
    }

    #[test]
    fn computes_inclusive_window() {
        let pagination = Pagination::from_params(Some("3"), Some("20"));
        assert_eq!(pagination.offset(), 40);
        assert_eq!(pagination.last_index(), 59);

        let first = Pagination::default();
        assert_eq!(first.offset(), 0);
        assert_eq!(first.last_index(), 9);
    }

    #[test]
    fn largest_window_does_not_overflow() {
        let pagination = Pagination {
            page: u32::MAX,
            limit: u32::MAX,
        };
        assert_eq!(
            pagination.offset(),
            (u32::MAX as u64 - 1) * u32::MAX as u64
        );
    }

    #[test]
    fn reads_from_query_map() {
        let query: HashMap<String, String> = [
            ("page".to_string(), "2".to_string()),
            ("limit".to_string(), "5".to_string()),
            ("other".to_string(), "x".to_string()),
        ]
        .into_iter()
        .collect();
        assert_eq!(
            Pagination::from_query(&query),
            Pagination { page: 2, limit: 5 }
        );
    }
}

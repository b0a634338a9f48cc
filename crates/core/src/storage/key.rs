//! Object key construction.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex_lite::Regex;

static UNSAFE_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Za-z0-9._-]").unwrap());

/// Builds `{category}/{subject}/{millis}-{file}`.
///
/// Every segment is reduced to `[A-Za-z0-9._-]`. The millisecond prefix keeps
/// same-named files apart; two calls with identical inputs in the same
/// millisecond produce the same key.
pub fn build_key(category: &str, subject_id: &str, file_name: &str, now: DateTime<Utc>) -> String {
    format!(
        "{}/{}/{}-{}",
        sanitize_segment(category, "uncategorized"),
        sanitize_segment(subject_id, "anonymous"),
        now.timestamp_millis(),
        sanitize_file_name(file_name)
    )
}

/// Strips any directory part and replaces unsafe characters with `_`.
pub fn sanitize_file_name(file_name: &str) -> String {
    let base = file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(file_name);
    sanitize_segment(base, "file")
}

fn sanitize_segment(raw: &str, fallback: &str) -> String {
    let cleaned = UNSAFE_CHARS.replace_all(raw.trim(), "_");
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        fallback.to_string()
    } else {
        cleaned.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(millis: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(millis).unwrap()
    }

    #[test]
    fn test_key_layout() {
        let key = build_key("payslips", "borrower-42", "March Payslip.pdf", at(1_700_000_000_123));
        assert_eq!(key, "payslips/borrower-42/1700000000123-March_Payslip.pdf");
    }

    #[test]
    fn test_sanitize_strips_directories_and_unsafe_chars() {
        assert_eq!(sanitize_file_name("C:\\scans\\bank (1).pdf"), "bank__1_.pdf");
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("..."), "file");
        assert_eq!(sanitize_file_name(""), "file");
        assert_eq!(sanitize_file_name("r\u{e9}sum\u{e9}.pdf"), "r_sum_.pdf");
    }

    #[test]
    fn test_subject_cannot_escape_namespace() {
        let key = build_key("payslips", "../other", "a.pdf", at(1));
        assert_eq!(key, "payslips/_other/1-a.pdf");
    }

    #[test]
    fn test_distinct_millis_give_distinct_keys() {
        let a = build_key("payslips", "b1", "same.pdf", at(1_000));
        let b = build_key("payslips", "b1", "same.pdf", at(1_001));
        assert_ne!(a, b);
    }

    #[test]
    fn test_same_millis_collide() {
        let a = build_key("payslips", "b1", "same.pdf", at(1_000));
        let b = build_key("payslips", "b1", "same.pdf", at(1_000));
        assert_eq!(a, b);
    }
}

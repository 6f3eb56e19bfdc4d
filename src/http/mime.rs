//! Content types served by the monitor
//!
//! Each route declares its content type up front; nothing is guessed from file extensions.

pub const TEXT_HTML: &str = "text/html; charset=utf-8";
pub const TEXT_CSV: &str = "text/csv; charset=utf-8";
pub const TEXT_PLAIN: &str = "text/plain; charset=utf-8";
pub const APPLICATION_JSON: &str = "application/json";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_types_declare_charset() {
        for content_type in [TEXT_HTML, TEXT_CSV, TEXT_PLAIN] {
            assert!(content_type.ends_with("; charset=utf-8"), "{content_type}");
        }
        assert!(!APPLICATION_JSON.contains("charset"));
    }
}

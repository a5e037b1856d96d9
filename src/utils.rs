use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%d-%m-%Y", "%Y/%m/%d"];

/// Parse a date written in one of the accepted formats.
pub fn parse_date(input: &str) -> Option<NaiveDate> {
    let trimmed = input.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
}

fn html_tag() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<[^>]*>").unwrap())
}

fn url() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?:https?://|www\.)\S+").unwrap())
}

fn special_chars() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^\w\s'.,!?%$-]").unwrap())
}

/// Strip HTML tags, links and stray symbols from provider text and collapse whitespace.
/// Sentence punctuation and apostrophes survive so negations still tokenize.
pub fn clean_text(text: &str) -> String {
    let without_tags = html_tag().replace_all(text, " ");
    let without_urls = url().replace_all(&without_tags, " ");
    let without_symbols = special_chars().replace_all(&without_urls, " ");
    without_symbols.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2023, 3, 14);
        assert_eq!(parse_date("2023-03-14"), expected);
        assert_eq!(parse_date("03/14/2023"), expected);
        assert_eq!(parse_date("14-03-2023"), expected);
        assert_eq!(parse_date("2023/03/14"), expected);
        assert_eq!(parse_date(" 2023-03-14 "), expected);
        assert_eq!(parse_date("March 14"), None);
    }

    #[test]
    fn test_clean_text() {
        let raw = "<p>Shares <b>surge</b> after earnings</p> see https://example.com/x?y=1 #AAPL isn't   done";
        assert_eq!(clean_text(raw), "Shares surge after earnings see AAPL isn't done");
        assert_eq!(clean_text(""), "");
    }
}

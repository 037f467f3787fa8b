use std::sync::LazyLock;

use regex::Regex;

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>?").unwrap());

/// Strip anything that looks like an HTML/XML tag from user input.
///
/// Not an HTML parser: tag-like spans are removed wholesale, including an
/// unclosed trailing `<...`, and the surrounding text is kept as-is.
pub fn sanitize_input(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    TAG_RE.replace_all(text, "").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_script_tags_wholesale() {
        assert_eq!(sanitize_input("hi<script>bad</script>"), "hibad");
    }

    #[test]
    fn test_plain_text_unchanged() {
        assert_eq!(sanitize_input("hello there"), "hello there");
    }

    #[test]
    fn test_unclosed_tag_removed() {
        assert_eq!(sanitize_input("hello <b"), "hello ");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(sanitize_input(""), "");
    }

    #[test]
    fn test_only_tags_becomes_empty() {
        assert_eq!(sanitize_input("<div><span></span></div>"), "");
    }
}

use std::sync::LazyLock;

use regex::Regex;

/// A machine-actionable instruction embedded in AI reply text.
///
/// Directives are value-equal and ephemeral: they carry no identity and are
/// consumed once, at the moment the reply is appended to the conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionDirective {
    Breathing,
    Meditation { topic: String },
    Playlist { theme: String },
}

/// Result of scanning a raw AI reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedReply {
    /// Directives in left-to-right order of occurrence.
    pub directives: Vec<ActionDirective>,
    /// Reply text with recognized markers removed, splice points merged to
    /// a single space, and the ends trimmed. Other whitespace is untouched.
    pub cleaned: String,
}

const BREATHING_TOKEN: &str = "[ACTION:START_BREATHING_EXERCISE]";

static MEDITATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[ACTION:START_MEDITATION:\{(.*?)\}\]").unwrap());

static PLAYLIST_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[ACTION:CREATE_PLAYLIST:\{(.*?)\}\]").unwrap());

/// Extract every recognized directive from `raw` and strip the markers.
///
/// Meditation markers match globally; the playlist marker is recognized on
/// its first occurrence only; the breathing token is reported once per
/// occurrence (deduplication is the orchestrator's job, not the parser's).
/// A marker nested inside an earlier match is consumed with it and emits no
/// directive. Malformed bracket syntax never matches and is left in the
/// text untouched, whitespace included.
pub fn parse_reply(raw: &str) -> ParsedReply {
    // (byte range, directive), gathered per category then ordered by
    // position so mixed-category text keeps left-to-right order.
    let mut found: Vec<(std::ops::Range<usize>, ActionDirective)> = Vec::new();

    for caps in MEDITATION_RE.captures_iter(raw) {
        let whole = caps.get(0).unwrap();
        let topic = caps.get(1).unwrap().as_str().to_string();
        found.push((whole.range(), ActionDirective::Meditation { topic }));
    }

    for (start, token) in raw.match_indices(BREATHING_TOKEN) {
        found.push((start..start + token.len(), ActionDirective::Breathing));
    }

    if let Some(caps) = PLAYLIST_RE.captures(raw) {
        let whole = caps.get(0).unwrap();
        let theme = caps.get(1).unwrap().as_str().to_string();
        found.push((whole.range(), ActionDirective::Playlist { theme }));
    }

    found.sort_by_key(|(range, _)| range.start);

    // Rebuild the text skipping every recognized marker.
    let mut cleaned = String::with_capacity(raw.len());
    let mut directives = Vec::with_capacity(found.len());
    let mut cursor = 0;
    for (range, directive) in found {
        // Overlap: this marker sits inside an earlier match and was
        // already removed with it.
        if range.start < cursor {
            continue;
        }
        cleaned.push_str(&raw[cursor..range.start]);
        cursor = range.end;
        // Splicing two space-separated halves back together would leave a
        // doubled space where the marker used to be.
        if cleaned.ends_with(' ') && raw[cursor..].starts_with(' ') {
            cursor += 1;
        }
        directives.push(directive);
    }
    cleaned.push_str(&raw[cursor..]);

    ParsedReply {
        directives,
        cleaned: cleaned.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_breathing_token_extracted_and_stripped() {
        let parsed = parse_reply("Let's slow down. [ACTION:START_BREATHING_EXERCISE]");
        assert_eq!(parsed.directives, vec![ActionDirective::Breathing]);
        assert_eq!(parsed.cleaned, "Let's slow down.");
        assert!(!parsed.cleaned.contains("[ACTION:"));
    }

    #[test]
    fn test_breathing_token_reported_per_occurrence() {
        let raw = "[ACTION:START_BREATHING_EXERCISE] and again \
                   [ACTION:START_BREATHING_EXERCISE]";
        let parsed = parse_reply(raw);
        assert_eq!(
            parsed.directives,
            vec![ActionDirective::Breathing, ActionDirective::Breathing]
        );
        assert_eq!(parsed.cleaned, "and again");
    }

    #[test]
    fn test_meditation_matches_globally_in_order() {
        let raw = "Try this. [ACTION:START_MEDITATION:{letting go}] Or later \
                   [ACTION:START_MEDITATION:{deep sleep}]";
        let parsed = parse_reply(raw);
        assert_eq!(
            parsed.directives,
            vec![
                ActionDirective::Meditation {
                    topic: "letting go".to_string()
                },
                ActionDirective::Meditation {
                    topic: "deep sleep".to_string()
                },
            ]
        );
        assert_eq!(parsed.cleaned, "Try this. Or later");
    }

    #[test]
    fn test_meditation_topic_taken_verbatim() {
        let parsed = parse_reply("[ACTION:START_MEDITATION:{  spaced topic }]");
        assert_eq!(
            parsed.directives,
            vec![ActionDirective::Meditation {
                topic: "  spaced topic ".to_string()
            }]
        );
    }

    #[test]
    fn test_playlist_first_match_only() {
        let raw = "[ACTION:CREATE_PLAYLIST:{calm}] more \
                   [ACTION:CREATE_PLAYLIST:{focus}]";
        let parsed = parse_reply(raw);
        assert_eq!(
            parsed.directives,
            vec![ActionDirective::Playlist {
                theme: "calm".to_string()
            }]
        );
        // The second marker is not recognized and stays in the text.
        assert!(parsed.cleaned.contains("[ACTION:CREATE_PLAYLIST:{focus}]"));
    }

    #[test]
    fn test_mixed_categories_in_text_order() {
        let raw = "a [ACTION:START_MEDITATION:{calm}] b \
                   [ACTION:START_BREATHING_EXERCISE] c \
                   [ACTION:CREATE_PLAYLIST:{rainy day}] d";
        let parsed = parse_reply(raw);
        assert_eq!(
            parsed.directives,
            vec![
                ActionDirective::Meditation {
                    topic: "calm".to_string()
                },
                ActionDirective::Breathing,
                ActionDirective::Playlist {
                    theme: "rainy day".to_string()
                },
            ]
        );
        assert_eq!(parsed.cleaned, "a b c d");
    }

    #[test]
    fn test_marker_nested_in_meditation_topic_is_consumed_with_it() {
        // The breathing token also matches inside the topic braces; the
        // enclosing meditation match wins and the inner token emits nothing.
        let raw = "[ACTION:START_MEDITATION:{[ACTION:START_BREATHING_EXERCISE]}]";
        let parsed = parse_reply(raw);
        assert_eq!(
            parsed.directives,
            vec![ActionDirective::Meditation {
                topic: "[ACTION:START_BREATHING_EXERCISE]".to_string()
            }]
        );
        assert!(parsed.cleaned.is_empty());
    }

    #[test]
    fn test_malformed_markers_left_untouched() {
        let cases = [
            "[ACTION:START_MEDITATION:{no closing brace]",
            "[ACTION:START_MEDITATION:missing braces]",
            "[ACTION:DO_SOMETHING_ELSE]",
            "[ACTION:CREATE_PLAYLIST:{unterminated",
            "[ACTION:DO_SOMETHING_ELSE]  with  doubled  spaces",
        ];
        for raw in cases {
            let parsed = parse_reply(raw);
            assert!(parsed.directives.is_empty(), "matched: {}", raw);
            assert_eq!(parsed.cleaned, raw.trim());
        }
    }

    #[test]
    fn test_embedded_marker_leaves_no_doubled_whitespace() {
        let parsed = parse_reply("Breathe [ACTION:START_BREATHING_EXERCISE] with me.");
        assert_eq!(parsed.directives, vec![ActionDirective::Breathing]);
        assert_eq!(parsed.cleaned, "Breathe with me.");
    }

    #[test]
    fn test_directive_only_message_yields_empty_text() {
        let parsed = parse_reply("[ACTION:START_MEDITATION:{sleep}]");
        assert_eq!(parsed.directives.len(), 1);
        assert!(parsed.cleaned.is_empty());
    }

    #[test]
    fn test_plain_text_passes_through() {
        let parsed = parse_reply("Just a normal reply.");
        assert!(parsed.directives.is_empty());
        assert_eq!(parsed.cleaned, "Just a normal reply.");
    }

    #[test]
    fn test_existing_whitespace_away_from_markers_is_preserved() {
        // Only the splice point loses a space; spacing elsewhere is kept.
        let parsed = parse_reply("a  b");
        assert_eq!(parsed.cleaned, "a  b");

        let parsed = parse_reply("keep  this [ACTION:START_BREATHING_EXERCISE] spacing");
        assert_eq!(parsed.directives, vec![ActionDirective::Breathing]);
        assert_eq!(parsed.cleaned, "keep  this spacing");
    }
}

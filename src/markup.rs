const MARKER: &str = "**";

/// Display style of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStyle {
    Plain,
    Bold,
    Header,
}

/// A contiguous span of text with a single style.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Run {
    pub style: RunStyle,
    pub text: String,
}

impl Run {
    fn new(style: RunStyle, text: &str) -> Self {
        Self {
            style,
            text: text.to_string(),
        }
    }
}

/// Split response text into lines of styled runs. Each line is followed
/// by a line break when rendered.
///
/// Rules (literal splitting, not markdown):
/// - a line whose trimmed form starts and ends with `**` becomes one
///   header run with every marker removed;
/// - any other line containing `**` is split on the marker, odd pieces
///   bold and even pieces plain (an odd marker count leaves a trailing
///   bold run);
/// - anything else is a single plain run.
pub fn parse_markup(text: &str) -> Vec<Vec<Run>> {
    text.split('\n').map(parse_line).collect()
}

pub fn parse_line(line: &str) -> Vec<Run> {
    let trimmed = line.trim();
    if trimmed.starts_with(MARKER) && trimmed.ends_with(MARKER) {
        return vec![Run::new(RunStyle::Header, &line.replace(MARKER, ""))];
    }

    if !line.contains(MARKER) {
        return vec![Run::new(RunStyle::Plain, line)];
    }

    line.split(MARKER)
        .enumerate()
        .map(|(i, part)| {
            let style = if i % 2 == 1 {
                RunStyle::Bold
            } else {
                RunStyle::Plain
            };
            Run::new(style, part)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn runs(line: &str) -> Vec<(RunStyle, String)> {
        parse_line(line).into_iter().map(|r| (r.style, r.text)).collect()
    }

    fn expect(items: &[(RunStyle, &str)]) -> Vec<(RunStyle, String)> {
        items.iter().map(|(s, t)| (*s, t.to_string())).collect()
    }

    #[test]
    fn labeled_field_splits_into_plain_bold_plain() {
        assert_eq!(
            runs("**Song Name:** Example"),
            expect(&[
                (RunStyle::Plain, ""),
                (RunStyle::Bold, "Song Name:"),
                (RunStyle::Plain, " Example"),
            ])
        );
    }

    #[test]
    fn whole_line_marker_is_header() {
        assert_eq!(runs("**Trivia:**"), expect(&[(RunStyle::Header, "Trivia:")]));
    }

    #[test]
    fn header_detection_ignores_surrounding_whitespace() {
        assert_eq!(
            runs("  **Key Lyrics:**  "),
            expect(&[(RunStyle::Header, "  Key Lyrics:  ")])
        );
    }

    #[test]
    fn header_strips_inner_markers_too() {
        assert_eq!(runs("**a** and **b**"), expect(&[(RunStyle::Header, "a and b")]));
    }

    #[test]
    fn odd_marker_count_leaves_trailing_bold() {
        assert_eq!(
            runs("a**b"),
            expect(&[(RunStyle::Plain, "a"), (RunStyle::Bold, "b")])
        );
    }

    #[test]
    fn plain_line_is_untouched() {
        assert_eq!(
            runs("Just some text * with a star"),
            expect(&[(RunStyle::Plain, "Just some text * with a star")])
        );
    }

    #[test]
    fn lone_marker_is_an_empty_header() {
        assert_eq!(runs("**"), expect(&[(RunStyle::Header, "")]));
    }

    #[test]
    fn every_line_is_kept_including_blank_ones() {
        let lines = parse_markup("**Song Name:** X\n\n**Trivia:**\n");
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[1], vec![Run::new(RunStyle::Plain, "")]);
        assert_eq!(lines[2], vec![Run::new(RunStyle::Header, "Trivia:")]);
        assert_eq!(lines[3], vec![Run::new(RunStyle::Plain, "")]);
    }

    #[test]
    fn garbage_never_panics() {
        for text in ["****", "*** ***", "**\u{1F3B5}**x**", "\r\n**\r"] {
            let _ = parse_markup(text);
        }
    }
}

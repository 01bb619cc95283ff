//! Greedy first-fit line wrapping.

use super::font::Typeface;

/// Split `text` into lines no wider than `max_width` when drawn with `face`.
///
/// Words are appended while the line still fits; the first word that does
/// not fit starts the next line. A word wider than `max_width` on its own
/// gets a line to itself. Whitespace runs collapse to one space.
pub fn wrap_text(face: &Typeface, text: &str, max_width: u32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if current.is_empty() {
            current.push_str(word);
            continue;
        }

        let candidate = format!("{} {}", current, word);
        if face.measure(&candidate) <= max_width {
            current = candidate;
        } else {
            lines.push(std::mem::replace(&mut current, word.to_string()));
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overlay::font::{FontPaths, FontSet};
    use qclip_models::encoding::{MAX_LINE_WIDTH, QUOTE_FONT_SIZE};

    fn face() -> Typeface {
        Typeface::builtin(QUOTE_FONT_SIZE)
    }

    #[test]
    fn test_short_quote_is_one_line() {
        let lines = wrap_text(&face(), "Stay hungry, stay foolish.", MAX_LINE_WIDTH);
        assert_eq!(lines, vec!["Stay hungry, stay foolish."]);
    }

    #[test]
    fn test_wide_quote_wraps_within_limit() {
        let quote = "The only way to do great work is to love what you do. If you haven't \
                     found it yet, keep looking. Don't settle. As with all matters of the \
                     heart, you'll know when you find it.";
        let face = face();
        assert!(face.measure(quote) > MAX_LINE_WIDTH);

        let lines = wrap_text(&face, quote, MAX_LINE_WIDTH);
        assert!(lines.len() >= 2);
        for line in &lines {
            assert!(face.measure(line) <= MAX_LINE_WIDTH, "line too wide: {line:?}");
        }
        assert_eq!(lines.join(" "), quote.split_whitespace().collect::<Vec<_>>().join(" "));
    }

    #[test]
    fn test_lines_are_filled_greedily() {
        let face = face();
        let quote = "aaaa bbbb cccc dddd eeee ffff gggg hhhh iiii jjjj kkkk llll mmmm";
        let lines = wrap_text(&face, quote, MAX_LINE_WIDTH);

        // Each committed line must have been unable to take the next word
        for pair in lines.windows(2) {
            let next_word = pair[1].split(' ').next().unwrap();
            let extended = format!("{} {}", pair[0], next_word);
            assert!(face.measure(&extended) > MAX_LINE_WIDTH);
        }
    }

    #[test]
    fn test_overlong_word_gets_its_own_line() {
        let face = face();
        let giant = "x".repeat(80);
        let lines = wrap_text(&face, &format!("{giant} tail"), MAX_LINE_WIDTH);

        assert_eq!(lines, vec![giant, "tail".to_string()]);
        assert!(lines.iter().all(|l| !l.is_empty()));
    }

    #[test]
    fn test_blank_text_has_no_lines() {
        assert!(wrap_text(&face(), "", MAX_LINE_WIDTH).is_empty());
        assert!(wrap_text(&face(), "   \t ", MAX_LINE_WIDTH).is_empty());
    }

    #[test]
    fn test_system_font_wraps_within_limit() {
        let paths = FontPaths::default();
        if !paths.quote.exists() || !paths.attribution.exists() {
            return;
        }
        let fonts = FontSet::load(&paths);
        assert!(!fonts.fallback);

        let quote = "The only way to do great work is to love what you do. If you haven't \
                     found it yet, keep looking. Don't settle. As with all matters of the \
                     heart, you'll know when you find it.";
        assert!(fonts.quote.measure(quote) > MAX_LINE_WIDTH);

        let lines = wrap_text(&fonts.quote, quote, MAX_LINE_WIDTH);
        assert!(lines.len() >= 2);
        for line in &lines {
            let width = fonts.quote.measure(line);
            assert!(width <= MAX_LINE_WIDTH, "line {line:?} is {width}px wide");
        }
        for pair in lines.windows(2) {
            let next_word = pair[1].split(' ').next().unwrap();
            let extended = format!("{} {}", pair[0], next_word);
            assert!(fonts.quote.measure(&extended) > MAX_LINE_WIDTH);
        }
    }
}

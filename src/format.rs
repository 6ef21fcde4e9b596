//! Strips lightweight markdown from generated text before it reaches a client.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref CODE_BLOCK: Regex = Regex::new(r"(?s)```[^\n`]*\n?(.*?)```").unwrap();
    static ref HEADING: Regex = Regex::new(r"#{1,6}[ \t]+").unwrap();
    static ref BOLD_STARS: Regex = Regex::new(r"\*\*(.+?)\*\*").unwrap();
    static ref BOLD_UNDERSCORES: Regex = Regex::new(r"__(.+?)__").unwrap();
    static ref ITALIC_STAR: Regex = Regex::new(r"\*([^*\n]+)\*").unwrap();
    static ref ITALIC_UNDERSCORE: Regex = Regex::new(r"\b_([^_\n]+)_\b").unwrap();
    static ref INLINE_CODE: Regex = Regex::new(r"`([^`\n]+)`").unwrap();
    static ref LINK: Regex = Regex::new(r"\[([^\]]+)\]\([^)]*\)").unwrap();
    static ref EXTRA_NEWLINES: Regex = Regex::new(r"\n{3,}").unwrap();
}

/// Removes headings, emphasis, code fences and links (keeping their visible
/// text), collapses runs of blank lines and trims the result.
///
/// Markers are matched anywhere in a line, not only at line starts, so prose
/// that merely looks like markup is altered too: "C# is" loses its "# " and
/// "2 * 3 * 4" loses its spaced asterisks.
pub fn format_response(text: &str) -> String {
    let text = CODE_BLOCK.replace_all(text, "${1}");
    let text = HEADING.replace_all(&text, "");
    let text = BOLD_STARS.replace_all(&text, "${1}");
    let text = BOLD_UNDERSCORES.replace_all(&text, "${1}");
    let text = ITALIC_STAR.replace_all(&text, "${1}");
    let text = ITALIC_UNDERSCORE.replace_all(&text, "${1}");
    let text = INLINE_CODE.replace_all(&text, "${1}");
    let text = LINK.replace_all(&text, "${1}");
    let text = EXTRA_NEWLINES.replace_all(&text, "\n\n");
    text.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_emphasis_headings_and_blank_runs() {
        let raw = "**bold** and *italic* and # Heading\n\n\n\nend";
        assert_eq!(format_response(raw), "bold and italic and Heading\n\nend");
    }

    #[test]
    fn keeps_code_block_contents() {
        let raw = "Try this:\n```rust\nlet x = 1;\n```\nand `y`.";
        assert_eq!(format_response(raw), "Try this:\nlet x = 1;\n\nand y.");
    }

    #[test]
    fn links_keep_visible_text() {
        assert_eq!(format_response("See [the docs](https://example.com/a)."), "See the docs.");
    }

    #[test]
    fn underscores_inside_words_survive() {
        assert_eq!(format_response("call snake_case_name or _this_"), "call snake_case_name or this");
        assert_eq!(format_response("__strong__ text"), "strong text");
    }

    #[test]
    fn headings_at_line_starts() {
        assert_eq!(format_response("## Title\n### Sub\nbody"), "Title\nSub\nbody");
    }

    #[test]
    fn markup_lookalikes_in_prose_are_stripped() {
        assert_eq!(format_response("C# is great"), "Cis great");
        assert_eq!(format_response("2 * 3 * 4"), "2  3  4");
    }

    #[test]
    fn empty_and_whitespace_input() {
        assert_eq!(format_response(""), "");
        assert_eq!(format_response("  \n\n  "), "");
    }

    #[test]
    fn idempotent_on_clean_text() {
        let clean = "Plain answer.\n\nSecond paragraph with a list:\n- one\n- two";
        let once = format_response(clean);
        assert_eq!(once, clean);
        assert_eq!(format_response(&once), once);
    }
}

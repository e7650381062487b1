//! Log-safe rendering of player input.
//!
//! Names, answers and slot labels come straight from the player. Before they
//! reach a log line every control character is escaped, so a crafted answer
//! cannot forge extra log records, and long input is cut short.

use std::fmt::Write;

/// Longest rendering [`escape_log`] produces, in characters.
pub const MAX_PREVIEW: usize = 300;

/// Escape `s` for a single log line, capped at [`MAX_PREVIEW`] characters.
pub fn escape_log(s: &str) -> String {
    escape_preview(s, MAX_PREVIEW)
}

/// Escape `s` and keep at most `max` input characters, marking a cut with `…`.
///
/// `\n`, `\r`, `\t` and backslash get their usual escapes; any other control
/// character is written as `\xNN`.
pub fn escape_preview(s: &str, max: usize) -> String {
    let mut out = String::with_capacity(s.len().min(max) + 8);
    for (count, ch) in s.chars().enumerate() {
        if count >= max {
            out.push('…');
            break;
        }
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => {
                let _ = write!(&mut out, "\\x{:02X}", c as u32);
            }
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forged_log_lines_stay_on_one_line() {
        let answer = "piano\n2024-01-01T00:00:00Z [WARN] admin logged in";
        let esc = escape_log(answer);
        assert!(!esc.contains('\n'));
        assert!(esc.starts_with("piano\\n2024"));
        assert_eq!(escape_log("a\\b\r\t\u{7}"), "a\\\\b\\r\\t\\x07");
    }

    #[test]
    fn previews_are_cut_on_characters() {
        assert_eq!(escape_preview("ÄÖÜäöü", 3), "ÄÖÜ…");
        assert_eq!(escape_preview("short", 40), "short");
        assert_eq!(escape_log(&"x".repeat(MAX_PREVIEW + 5)).chars().count(), MAX_PREVIEW + 1);
    }
}

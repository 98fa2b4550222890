//! Text helpers: `&` color-code translation and `{placeholder}` substitution.

use std::collections::HashMap;

/// Placeholder name to replacement text, without braces.
pub type Placeholders = HashMap<String, String>;

/// Wire format color marker.
pub const SECTION: char = '§';

fn is_format_code(c: char) -> bool {
    matches!(c.to_ascii_lowercase(), '0'..='9' | 'a'..='f' | 'k'..='o' | 'r')
}

/// Returns the lowercased hex digits of an `#RRGGBB` sequence starting at `start`.
fn hex_at(chars: &[char], start: usize) -> Option<String> {
    if chars.get(start) != Some(&'#') {
        return None;
    }
    let digits = chars.get(start + 1..start + 7)?;
    if digits.iter().all(|c| c.is_ascii_hexdigit()) {
        Some(digits.iter().map(|c| c.to_ascii_lowercase()).collect())
    } else {
        None
    }
}

/// Translates `&` format codes and `&#RRGGBB` hex colors into the `§` wire format.
///
/// Unknown codes and lone ampersands are kept as written.
pub fn colorize(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len());
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c == '&' {
            if let Some(hex) = hex_at(&chars, i + 1) {
                out.push(SECTION);
                out.push('x');
                for digit in hex.chars() {
                    out.push(SECTION);
                    out.push(digit);
                }
                i += 8;
                continue;
            }
            if let Some(&code) = chars.get(i + 1) {
                if is_format_code(code) {
                    out.push(SECTION);
                    out.push(code.to_ascii_lowercase());
                    i += 2;
                    continue;
                }
            }
        }
        out.push(c);
        i += 1;
    }

    out
}

/// Replaces every `{name}` token that has an entry in `placeholders`.
///
/// The input is scanned once; replacement text is copied as-is and never expanded again.
pub fn fill_placeholders(input: &str, placeholders: &Placeholders) -> String {
    if placeholders.is_empty() || !input.contains('{') {
        return input.to_string();
    }
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let Some(close) = after.find(|c: char| c == '{' || c == '}') else {
            out.push_str(&rest[open..]);
            return out;
        };
        if after.as_bytes()[close] == b'{' {
            // Stray brace; the next token may start at the inner one.
            out.push('{');
            rest = after;
            continue;
        }
        let name = &after[..close];
        match placeholders.get(name) {
            Some(value) => out.push_str(value),
            None => {
                out.push('{');
                out.push_str(name);
                out.push('}');
            }
        }
        rest = &after[close + 1..];
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_colorize_codes() {
        assert_eq!(colorize("&aHello &lWorld"), "§aHello §lWorld");
        assert_eq!(colorize("&ABig"), "§aBig");
    }

    #[test]
    fn test_colorize_hex() {
        assert_eq!(colorize("&#FF0000x"), "§x§f§f§0§0§0§0x");
    }

    #[test]
    fn test_colorize_keeps_plain_ampersands() {
        assert_eq!(colorize("Tom & Jerry"), "Tom & Jerry");
        assert_eq!(colorize("&z"), "&z");
        assert_eq!(colorize("trailing &"), "trailing &");
        assert_eq!(colorize("&#12"), "&#12");
    }

    #[test]
    fn test_fill_placeholders() {
        let mut placeholders = Placeholders::new();
        placeholders.insert("target".to_string(), "Steve".to_string());
        placeholders.insert("reason".to_string(), "griefing".to_string());

        assert_eq!(
            fill_placeholders("{target} banned for {reason} ({unknown})", &placeholders),
            "Steve banned for griefing ({unknown})"
        );
        assert_eq!(fill_placeholders("no tokens", &placeholders), "no tokens");
    }

    #[test]
    fn test_fill_placeholders_does_not_expand_replacements() {
        let mut placeholders = Placeholders::new();
        placeholders.insert("reason".to_string(), "typed {player} in chat".to_string());
        placeholders.insert("player".to_string(), "Steve".to_string());

        for _ in 0..50 {
            assert_eq!(
                fill_placeholders("{reason}", &placeholders),
                "typed {player} in chat"
            );
        }
        assert_eq!(
            fill_placeholders("{player}: {reason}", &placeholders),
            "Steve: typed {player} in chat"
        );
    }

    #[test]
    fn test_fill_placeholders_stray_braces() {
        let mut placeholders = Placeholders::new();
        placeholders.insert("target".to_string(), "Steve".to_string());

        assert_eq!(fill_placeholders("{{target}}", &placeholders), "{Steve}");
        assert_eq!(fill_placeholders("open { {target}", &placeholders), "open { Steve");
        assert_eq!(fill_placeholders("tail {target", &placeholders), "tail {target");
        assert_eq!(fill_placeholders("} {target}", &placeholders), "} Steve");
    }
}

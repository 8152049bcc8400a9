use serde_json::Value;
use thiserror::Error;

/// Raw control characters were found where none are permitted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("raw control characters found: {}", codes.join(", "))]
pub struct SanitizationError {
    /// Offending characters as `0xNN` codes, in order of appearance.
    pub codes: Vec<String>,
}

/// C0 and C1 control ranges (0x00-0x1F, 0x7F-0x9F).
pub fn is_control(c: char) -> bool {
    matches!(c as u32, 0x00..=0x1F | 0x7F..=0x9F)
}

/// Controls that must never reach the transport encoder. Tab, LF and CR
/// are left to the JSON layer, which escapes them.
fn is_forbidden_control(c: char) -> bool {
    matches!(c as u32, 0x00..=0x08 | 0x0B | 0x0C | 0x0E..=0x1F | 0x7F)
}

/// Replaces every control character with a space, collapses whitespace
/// runs into a single space and trims both ends.
pub fn clean(text: &str) -> String {
    let spaced: String = text
        .chars()
        .map(|c| if is_control(c) { ' ' } else { c })
        .collect();
    spaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Applies [`clean`] to every string inside `value`, keys excluded.
pub fn deep_clean(value: &Value) -> Value {
    match value {
        Value::String(s) => Value::String(clean(s)),
        Value::Array(items) => Value::Array(items.iter().map(deep_clean).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), deep_clean(v)))
                .collect(),
        ),
        other => other.clone(),
    }
}

pub fn validate_no_control_characters(text: &str) -> Result<(), SanitizationError> {
    let codes: Vec<String> = text
        .chars()
        .filter(|c| is_forbidden_control(*c))
        .map(|c| format!("0x{:02X}", c as u32))
        .collect();

    if codes.is_empty() {
        Ok(())
    } else {
        Err(SanitizationError { codes })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn clean_replaces_controls_and_collapses() {
        assert_eq!(clean("  a\u{0}b\t\tc\r\n d\u{85}e  "), "a b c d e");
        assert_eq!(clean(""), "");
        assert_eq!(clean("\u{7}\u{1F}"), "");
    }

    #[test]
    fn clean_keeps_unicode() {
        assert_eq!(clean("héllo 🌍 世界"), "héllo 🌍 世界");
    }

    #[test]
    fn deep_clean_preserves_shape() {
        let input = json!({
            "title": " a\u{1}b ",
            "n": 3,
            "flag": true,
            "list": ["x\ny", null, {"inner": "\tz"}]
        });
        let out = deep_clean(&input);
        assert_eq!(
            out,
            json!({
                "title": "a b",
                "n": 3,
                "flag": true,
                "list": ["x y", null, {"inner": "z"}]
            })
        );
    }

    #[test]
    fn validate_reports_codes() {
        assert!(validate_no_control_characters("tab\tnew\nline\r").is_ok());
        let err = validate_no_control_characters("a\u{0}b\u{7F}\u{B}").unwrap_err();
        assert_eq!(err.codes, vec!["0x00", "0x7F", "0x0B"]);
    }
}

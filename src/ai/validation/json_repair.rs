//! JSON Repair
//!
//! Best-effort recovery of a JSON object from free-form model output.
//!
//! Handles the usual ways an explanation payload arrives damaged:
//! - Markdown code fence wrapping (```json ... ```)
//! - Prose before or after the object
//! - Trailing commas
//! - Output cut off mid-string or mid-object by `max_tokens`

use serde_json::Value;
use tracing::{debug, warn};

/// Why a payload could not be recovered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnparseablePayload {
    /// First characters of the cleaned payload, for logs
    pub preview: String,
}

/// Parse model output into JSON, repairing if needed
pub fn extract_json_from_response(content: &str) -> Result<Value, UnparseablePayload> {
    JsonRepairer::new().parse_or_repair(content).map(|(value, _)| value)
}

// =============================================================================
// JsonRepairer
// =============================================================================

pub struct JsonRepairer {
    preview_chars: usize,
}

impl Default for JsonRepairer {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonRepairer {
    pub fn new() -> Self {
        Self { preview_chars: 200 }
    }

    /// Returns `(value, was_repaired)`
    pub fn parse_or_repair(&self, raw: &str) -> Result<(Value, bool), UnparseablePayload> {
        let cleaned = strip_code_fences(raw.trim().trim_start_matches('\u{feff}'));

        if let Ok(value) = serde_json::from_str::<Value>(&cleaned) {
            return Ok((value, false));
        }
        debug!("Direct JSON parse failed, attempting repair");

        // Prose around the object is the most common damage, so isolate first
        let candidate = extract_outer_object(&cleaned).unwrap_or_else(|| cleaned.clone());
        if let Ok(value) = serde_json::from_str::<Value>(&candidate) {
            warn!("JSON extracted from surrounding text");
            return Ok((value, true));
        }

        let repaired = close_open_structures(&remove_trailing_commas(&candidate));
        if let Ok(value) = serde_json::from_str::<Value>(&repaired) {
            warn!("JSON repaired after truncation");
            return Ok((value, true));
        }

        Err(UnparseablePayload {
            preview: cleaned.chars().take(self.preview_chars).collect(),
        })
    }
}

fn strip_code_fences(s: &str) -> String {
    let mut body = s;
    if body.starts_with("```") {
        body = match body.find('\n') {
            Some(newline) => &body[newline + 1..],
            None => body.trim_start_matches('`'),
        };
    }
    body.trim_end().trim_end_matches("```").trim().to_string()
}

/// Slice from the first `{` to its matching `}`, or to the end when unmatched
fn extract_outer_object(s: &str) -> Option<String> {
    let start = s.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escape = false;

    for (offset, ch) in s[start..].char_indices() {
        if escape {
            escape = false;
            continue;
        }
        match ch {
            '\\' if in_string => escape = true,
            '"' => in_string = !in_string,
            '{' | '[' if !in_string => depth += 1,
            '}' | ']' if !in_string => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(s[start..start + offset + 1].to_string());
                }
            }
            _ => {}
        }
    }

    Some(s[start..].to_string())
}

fn remove_trailing_commas(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut out = String::with_capacity(s.len());
    let mut in_string = false;
    let mut escape = false;

    for (i, &ch) in chars.iter().enumerate() {
        if escape {
            escape = false;
            out.push(ch);
            continue;
        }
        match ch {
            '\\' if in_string => escape = true,
            '"' => in_string = !in_string,
            ',' if !in_string => {
                let next = chars[i + 1..].iter().find(|c| !c.is_whitespace());
                if matches!(next, Some('}') | Some(']')) {
                    continue;
                }
            }
            _ => {}
        }
        out.push(ch);
    }

    out
}

/// Close an unterminated string, drop a dangling key, then close brackets
fn close_open_structures(s: &str) -> String {
    let mut stack = Vec::new();
    let mut in_string = false;
    let mut escape = false;

    for ch in s.chars() {
        if escape {
            escape = false;
            continue;
        }
        match ch {
            '\\' if in_string => escape = true,
            '"' => in_string = !in_string,
            '{' if !in_string => stack.push('}'),
            '[' if !in_string => stack.push(']'),
            '}' | ']' if !in_string => {
                stack.pop();
            }
            _ => {}
        }
    }

    let mut out = s.to_string();
    if in_string {
        out.push('"');
    }

    // `{"a": "x", "b"` or `{"a": "x", "b":` cannot be closed as-is
    let trimmed = out.trim_end();
    if trimmed.ends_with(':') || trimmed.ends_with(',') {
        out = trimmed.trim_end_matches([':', ',']).to_string();
        if out.ends_with('"')
            && let Some(key_start) = dangling_key_start(&out)
        {
            out.truncate(key_start);
            out = out.trim_end().trim_end_matches(',').to_string();
        }
    }

    while let Some(closer) = stack.pop() {
        out.push(closer);
    }
    out
}

/// Byte offset of a trailing `"key"` that follows `{` or `,`
fn dangling_key_start(s: &str) -> Option<usize> {
    let without_quote = &s[..s.len() - 1];
    let open = without_quote.rfind('"')?;
    let before = without_quote[..open].trim_end();
    if before.ends_with(',') || before.ends_with('{') {
        Some(open)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_json() {
        let repairer = JsonRepairer::new();
        let (_, repaired) = repairer.parse_or_repair(r#"{"key": "value"}"#).unwrap();
        assert!(!repaired);
    }

    #[test]
    fn test_strip_code_fences() {
        let input = "```json\n{\"explanations\": {\"src\": \"Source code\"}}\n```";
        let value = extract_json_from_response(input).unwrap();
        assert_eq!(value["explanations"]["src"], "Source code");
    }

    #[test]
    fn test_fix_trailing_comma() {
        let input = r#"{"explanations": {"src": "Code", "docs": "Docs",}}"#;
        let (value, repaired) = JsonRepairer::new().parse_or_repair(input).unwrap();
        assert!(repaired);
        assert_eq!(value["explanations"]["docs"], "Docs");
    }

    #[test]
    fn test_comma_inside_string_is_kept() {
        let input = r#"{"a": "x,}", "b": 1,}"#;
        let value = extract_json_from_response(input).unwrap();
        assert_eq!(value["a"], "x,}");
    }

    #[test]
    fn test_extract_from_mixed() {
        let input = "Sure! Here you go:\n{\"explanations\": {\"lib\": \"Helpers\"}}\nLet me know!";
        let (value, repaired) = JsonRepairer::new().parse_or_repair(input).unwrap();
        assert!(repaired);
        assert_eq!(value["explanations"]["lib"], "Helpers");
    }

    #[test]
    fn test_truncated_mid_string() {
        let input = r#"{"explanations": {"src": "All the application co"#;
        let value = extract_json_from_response(input).unwrap();
        assert_eq!(value["explanations"]["src"], "All the application co");
    }

    #[test]
    fn test_truncated_after_key() {
        let input = r#"{"explanations": {"src": "Code", "docs":"#;
        let value = extract_json_from_response(input).unwrap();
        assert_eq!(value["explanations"]["src"], "Code");
        assert!(value["explanations"].get("docs").is_none());
    }

    #[test]
    fn test_unparseable_returns_preview() {
        let err = extract_json_from_response("I cannot help with that.").unwrap_err();
        assert_eq!(err.preview, "I cannot help with that.");
    }
}

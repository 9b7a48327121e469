//! Prompt Construction
//!
//! Prompts for the three explanation tiers plus the content truncation rule
//! applied before any file is sent to the provider.
//!
//! The audience is someone who has never written code, so every prompt
//! steers toward analogies and away from jargon.

use std::fmt::Write as _;

use crate::constants::content;
use crate::types::NodeKind;

pub const SYSTEM_PROMPT: &str = "\
You are explaining a codebase to someone who has never written a line of code in their life. \
They are smart and capable, they just don't know programming terminology.

Rules:
- Never use programming jargon without explaining it. Don't say \"components\", say \"the individual \
building blocks that make up what users see on screen (buttons, forms, menus, etc.)\"
- Use analogies: folders are like departments in a company, files are like individual workers, \
imports are like asking another department for help, APIs are like phone calls to external services
- Be specific: don't say \"contains various utilities\", say \"contains helper tools that do things \
like format dates, check if an email address is valid, and calculate prices\"
- If it's boilerplate (node_modules, .next, dist, config files), say plainly: \"This is plumbing \
that makes the app work behind the scenes. You can ignore it.\"
- Answer the question: \"What would break or be missing if this didn't exist?\"
- Write like you're explaining to a smart friend over coffee, not writing documentation.";

const DEFAULT_PROJECT: &str = "A software project";

fn project_line(description: &str) -> &str {
    let trimmed = description.trim();
    if trimmed.is_empty() {
        DEFAULT_PROJECT
    } else {
        trimmed
    }
}

/// One line of item context: child listing for folders, extension for files
pub fn item_context(kind: NodeKind, context: Option<&str>, extension: Option<&str>) -> String {
    match kind {
        NodeKind::Folder => format!("contains: {}", context.unwrap_or("unknown contents")),
        NodeKind::File => format!("file type: {}", extension.unwrap_or("unknown")),
    }
}

/// Bulk tier: numbered items, JSON map keyed by exact item name
pub fn build_batch_prompt<'a, I>(items: I, description: &str) -> String
where
    I: IntoIterator<Item = (&'a str, NodeKind, Option<&'a str>, Option<&'a str>)>,
{
    let mut list = String::new();
    for (i, (name, kind, context, extension)) in items.into_iter().enumerate() {
        let _ = writeln!(
            list,
            "{}. {} ({}) - {}",
            i + 1,
            name,
            kind,
            item_context(kind, context, extension)
        );
    }

    format!(
        "Explain each of these items in plain English. Each explanation should be 1-2 sentences. \
Use analogies. Never use jargon without defining it. Answer \"why does this exist?\" not just \
\"what is it called.\"

Project: {}

Items:
{}
Respond as JSON with this exact format: {{\"explanations\": {{\"item-name\": \"explanation text\", ...}}}}
Use the exact item names as keys. Respond with ONLY the JSON, no other text.",
        project_line(description),
        list
    )
}

/// High-fidelity single item ("deep dive"): free text, no JSON
pub fn build_single_prompt(
    name: &str,
    kind: NodeKind,
    path: &str,
    context: Option<&str>,
    extension: Option<&str>,
    description: &str,
) -> String {
    let detail = match kind {
        NodeKind::Folder => format!(
            "This is a folder containing: {}",
            context.unwrap_or("unknown contents")
        ),
        NodeKind::File => format!(
            "This is a file with extension: {}",
            extension.unwrap_or("unknown")
        ),
    };

    format!(
        "Give a detailed plain-English explanation of this item from a codebase. 3-5 sentences. \
Be specific about what it does, why it exists, and what would break without it.

Project: {}
Item: {} ({})
Path: {}
{}

Respond with ONLY the explanation text, no JSON or formatting.",
        project_line(description),
        name,
        kind,
        path,
        detail
    )
}

/// High-fidelity file explanation; `content` must already be truncated
pub fn build_file_prompt(
    name: &str,
    path: &str,
    language: &str,
    content: &str,
    description: &str,
) -> String {
    format!(
        "Explain this file to someone who has never coded before.

Project: {}
File: {}
Path: {}
Language: {}

Contents:
{}

Respond in this exact JSON format (no other text):
{{
  \"summary\": \"2-3 sentence explanation of what this file does and why it exists. Answer: if I deleted this file, what would stop working?\",
  \"keyPoints\": [{{\"name\": \"human-readable name for this part\", \"explanation\": \"what this part does in plain English\"}}],
  \"dependencies\": [{{\"name\": \"file or package name\", \"why\": \"what this file asks it for help with\"}}],
  \"notes\": [\"important pattern or gotcha in plain English\"]
}}",
        project_line(description),
        name,
        path,
        language,
        content
    )
}

// =============================================================================
// Content Truncation
// =============================================================================

/// Cap content at the first `MAX_LINES` lines and `MAX_CHARS` characters.
///
/// Returns the text to send and whether anything was cut. The marker is
/// appended after the cap, so the body itself never exceeds either limit.
pub fn truncate_content(text: &str) -> (String, bool) {
    let mut cut = false;

    let mut body = match text.match_indices('\n').nth(content::MAX_LINES - 1) {
        Some((idx, _)) if idx + 1 < text.len() => {
            cut = true;
            &text[..idx]
        }
        _ => text,
    };

    if let Some((idx, _)) = body.char_indices().nth(content::MAX_CHARS) {
        cut = true;
        body = &body[..idx];
    }

    if cut {
        (format!("{}{}", body, content::TRUNCATION_MARKER), true)
    } else {
        (body.to_string(), false)
    }
}

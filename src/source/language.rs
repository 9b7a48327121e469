//! Plain-English language labels for the file detail pane.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LanguageInfo {
    pub name: &'static str,
    pub explanation: &'static str,
}

const fn lang(name: &'static str, explanation: &'static str) -> LanguageInfo {
    LanguageInfo { name, explanation }
}

const YAML: LanguageInfo = lang(
    "YAML",
    "a configuration format that uses indentation to organize settings",
);
const DOCKERFILE: LanguageInfo = lang(
    "Dockerfile",
    "instructions for creating a portable package of the app that runs anywhere",
);
const MAKEFILE: LanguageInfo = lang(
    "Makefile",
    "a recipe file that tells the computer how to build the project",
);
const PLAIN_TEXT: LanguageInfo = lang("Plain text", "a regular text file");

fn by_extension(ext: &str) -> Option<LanguageInfo> {
    let info = match ext {
        "ts" => lang(
            "TypeScript",
            "a stricter version of JavaScript, the language that makes websites interactive",
        ),
        "tsx" => lang(
            "TypeScript React",
            "TypeScript code that also defines what users see on screen (buttons, forms, etc.)",
        ),
        "js" => lang(
            "JavaScript",
            "the language that makes websites interactive; it runs in your browser",
        ),
        "jsx" => lang(
            "JavaScript React",
            "JavaScript that also defines what users see on screen",
        ),
        "json" => lang(
            "JSON",
            "a structured data format, think of it like a very organized list",
        ),
        "md" => lang(
            "Markdown",
            "a simple text format for writing documents with headers and links",
        ),
        "css" => lang(
            "CSS",
            "the styling language; it controls colors, fonts, spacing, and layout",
        ),
        "scss" => lang(
            "SCSS",
            "an enhanced version of CSS with more features for styling",
        ),
        "html" => lang("HTML", "the language that defines the structure of a web page"),
        "py" => lang(
            "Python",
            "a popular general-purpose programming language known for being readable",
        ),
        "rb" => lang(
            "Ruby",
            "a programming language designed to make developers happy and productive",
        ),
        "go" => lang(
            "Go",
            "a fast programming language made by Google for building servers",
        ),
        "rs" => lang("Rust", "a language focused on speed and safety"),
        "sh" => lang(
            "Shell Script",
            "a script that runs commands in the terminal, like a recipe for the computer",
        ),
        "yaml" | "yml" => YAML,
        "toml" => lang(
            "TOML",
            "a configuration file format that's easy for humans to read",
        ),
        "sql" => lang(
            "SQL",
            "the language for talking to databases: asking questions about stored data",
        ),
        "graphql" => lang(
            "GraphQL",
            "a language for requesting specific data from a server",
        ),
        "dockerfile" => DOCKERFILE,
        _ => return None,
    };
    Some(info)
}

/// Label by extension, then by well-known file name, else plain text
pub fn language_info(file_name: &str) -> LanguageInfo {
    if let Some((_, ext)) = file_name.rsplit_once('.')
        && let Some(info) = by_extension(ext)
    {
        return info;
    }

    match file_name {
        "Dockerfile" => DOCKERFILE,
        "Makefile" => MAKEFILE,
        _ => PLAIN_TEXT,
    }
}

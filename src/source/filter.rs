//! Hidden-path filter for build output, VCS metadata and editor clutter.

const HIDDEN_SEGMENTS: &[&str] = &[
    "node_modules",
    ".next",
    "dist",
    "build",
    ".git",
    "__pycache__",
    ".DS_Store",
    ".vscode",
    ".idea",
    ".cache",
    ".turbo",
    "coverage",
    ".nyc_output",
    ".parcel-cache",
    ".vercel",
    ".netlify",
    "out",
    "target",
];

const HIDDEN_FILES: &[&str] = &[
    ".DS_Store",
    "Thumbs.db",
    ".gitattributes",
    ".editorconfig",
    ".browserslistrc",
];

const HIDDEN_EXTENSIONS: &[&str] = &[".lock", ".log"];

/// True when any segment is a hidden directory, or the file itself is noise
pub fn is_hidden(path: &str) -> bool {
    if path.split('/').any(|segment| HIDDEN_SEGMENTS.contains(&segment)) {
        return true;
    }

    let name = path.rsplit('/').next().unwrap_or(path);
    HIDDEN_FILES.contains(&name) || HIDDEN_EXTENSIONS.iter().any(|ext| name.ends_with(ext))
}

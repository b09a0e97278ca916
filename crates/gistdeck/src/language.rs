//! Language tags for gist files, derived from the filename extension.

/// Tag for files with no recognized extension.
pub const PLAIN_TEXT: &str = "text";

/// Language tag for a filename. The extension is whatever follows the last
/// `.`; a name without one is matched whole, so `Dockerfile` works.
pub fn language_for_filename(filename: &str) -> &'static str {
    let Some(extension) = filename.rsplit('.').next().filter(|e| !e.is_empty()) else {
        return PLAIN_TEXT;
    };

    match extension.to_ascii_lowercase().as_str() {
        "js" | "mjs" | "cjs" => "javascript",
        "jsx" => "jsx",
        "ts" => "typescript",
        "tsx" => "tsx",

        "html" | "htm" => "html",
        "css" => "css",
        "scss" => "scss",
        "sass" => "sass",
        "less" => "less",
        "json" => "json",
        "xml" => "xml",
        "yaml" | "yml" => "yaml",

        "py" => "python",
        "java" => "java",
        "c" => "c",
        "cpp" | "cxx" | "cc" => "cpp",
        "cs" => "csharp",
        "php" => "php",
        "rb" => "ruby",
        "go" => "go",
        "rs" => "rust",
        "kt" => "kotlin",
        "scala" => "scala",
        "swift" => "swift",
        "dart" => "dart",

        "sh" | "bash" => "bash",
        "zsh" => "zsh",
        "fish" => "fish",
        "ps1" => "powershell",
        "bat" | "cmd" => "batch",

        "sql" => "sql",

        "md" | "markdown" => "markdown",
        "rst" => "rst",
        "txt" => PLAIN_TEXT,

        "toml" => "toml",
        "ini" | "cfg" | "conf" => "ini",
        "dockerfile" => "dockerfile",

        "r" => "r",
        "matlab" | "m" => "matlab",
        "pl" => "perl",
        "lua" => "lua",
        "vim" => "vim",

        _ => PLAIN_TEXT,
    }
}

/// Whether a highlighter has anything better than plain text for this file.
pub fn is_highlight_supported(filename: &str) -> bool {
    language_for_filename(filename) != PLAIN_TEXT
}

/// Human-readable language name, e.g. `C++` for `main.cpp`.
pub fn language_display_name(filename: &str) -> String {
    let language = language_for_filename(filename);
    let known = match language {
        "javascript" => "JavaScript",
        "typescript" => "TypeScript",
        "jsx" => "React JSX",
        "tsx" => "React TSX",
        "python" => "Python",
        "java" => "Java",
        "csharp" => "C#",
        "cpp" => "C++",
        "html" => "HTML",
        "css" => "CSS",
        "scss" => "SCSS",
        "sass" => "Sass",
        "markdown" => "Markdown",
        "json" => "JSON",
        "yaml" => "YAML",
        "bash" => "Bash",
        "sql" => "SQL",
        PLAIN_TEXT => "Text",
        other => return capitalize(other),
    };
    known.to_string()
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

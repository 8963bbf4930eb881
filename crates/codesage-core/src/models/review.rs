use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::serde_ext;

/// Declared language of a submission.
///
/// The selector offers the first four; the rest are identifiers the
/// formatter and history view know how to label. Anything else round-trips
/// untouched through `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Language {
    JavaScript,
    Python,
    Java,
    CSharp,
    TypeScript,
    Go,
    Rust,
    Php,
    Css,
    Jsx,
    Cpp,
    Other(String),
}

impl Language {
    /// Languages offered by the language selector, in display order.
    pub const SELECTABLE: [Language; 4] = [
        Language::JavaScript,
        Language::Python,
        Language::Java,
        Language::CSharp,
    ];

    /// Parse a language identifier. Empty input means "unset".
    pub fn parse(s: &str) -> Option<Self> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self::from(trimmed.to_string()))
        }
    }

    /// Wire identifier sent to the backend.
    pub fn as_str(&self) -> &str {
        match self {
            Language::JavaScript => "javascript",
            Language::Python => "python",
            Language::Java => "java",
            Language::CSharp => "csharp",
            Language::TypeScript => "typescript",
            Language::Go => "go",
            Language::Rust => "rust",
            Language::Php => "php",
            Language::Css => "css",
            Language::Jsx => "jsx",
            Language::Cpp => "cpp",
            Language::Other(s) => s,
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            Language::JavaScript => "JavaScript",
            Language::Python => "Python",
            Language::Java => "Java",
            Language::CSharp => "C#",
            Language::TypeScript => "TypeScript",
            Language::Go => "Go",
            Language::Rust => "Rust",
            Language::Php => "PHP",
            Language::Css => "CSS",
            Language::Jsx => "JSX",
            Language::Cpp => "C++",
            Language::Other(s) if s.is_empty() => "Unknown",
            Language::Other(s) => s,
        }
    }

    /// Extension used for the file label in the history view.
    pub fn file_extension(&self) -> &'static str {
        match self {
            Language::JavaScript | Language::Jsx => "js",
            Language::Python => "py",
            Language::Java => "java",
            Language::CSharp => "cs",
            Language::TypeScript => "ts",
            Language::Go => "go",
            Language::Rust => "rs",
            Language::Php => "php",
            Language::Css => "css",
            Language::Cpp => "cpp",
            Language::Other(_) => "txt",
        }
    }

    /// Next selectable language, wrapping around.
    pub fn next(&self) -> Self {
        let idx = Self::SELECTABLE.iter().position(|l| l == self);
        match idx {
            Some(i) => Self::SELECTABLE[(i + 1) % Self::SELECTABLE.len()].clone(),
            None => Language::JavaScript,
        }
    }

    /// Previous selectable language, wrapping around.
    pub fn prev(&self) -> Self {
        let len = Self::SELECTABLE.len();
        let idx = Self::SELECTABLE.iter().position(|l| l == self);
        match idx {
            Some(i) => Self::SELECTABLE[(i + len - 1) % len].clone(),
            None => Language::JavaScript,
        }
    }
}

impl Default for Language {
    fn default() -> Self {
        Language::JavaScript
    }
}

impl From<String> for Language {
    fn from(s: String) -> Self {
        match s.to_lowercase().as_str() {
            "javascript" | "js" => Language::JavaScript,
            "python" | "py" => Language::Python,
            "java" => Language::Java,
            "csharp" | "c#" | "cs" => Language::CSharp,
            "typescript" | "ts" => Language::TypeScript,
            "go" => Language::Go,
            "rust" | "rs" => Language::Rust,
            "php" => Language::Php,
            "css" => Language::Css,
            "jsx" => Language::Jsx,
            "cpp" | "c++" => Language::Cpp,
            _ => Language::Other(s),
        }
    }
}

impl From<Language> for String {
    fn from(lang: Language) -> Self {
        match lang {
            Language::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body of `POST /code/submit`.
#[derive(Debug, Clone, Serialize)]
pub struct ReviewRequest {
    pub code: String,
    pub language: Language,
}

/// Response of `POST /code/submit`: `{ "result": "..." }`, though a bare
/// string body is accepted too.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ReviewResult {
    Wrapped { result: String },
    Bare(String),
}

impl ReviewResult {
    pub fn into_text(self) -> String {
        match self {
            ReviewResult::Wrapped { result } | ReviewResult::Bare(result) => result,
        }
    }
}

/// An archived review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    #[serde(alias = "code", default)]
    pub input_code: String,
    #[serde(default = "default_history_language")]
    pub language: Language,
    #[serde(alias = "reviewResult", alias = "result", default)]
    pub reviewed_result: String,
    #[serde(
        alias = "createdAt",
        default = "Utc::now",
        deserialize_with = "serde_ext::deserialize_timestamp",
        serialize_with = "serde_ext::serialize_timestamp"
    )]
    pub timestamp: DateTime<Utc>,
}

fn default_history_language() -> Language {
    Language::Other(String::new())
}

impl HistoryEntry {
    pub fn new(input_code: String, language: Language, reviewed_result: String) -> Self {
        Self {
            input_code,
            language,
            reviewed_result,
            timestamp: Utc::now(),
        }
    }

    pub fn line_count(&self) -> usize {
        self.input_code.split('\n').count()
    }
}

/// Response of `GET /code/history`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryResponse {
    #[serde(default)]
    pub code_history: Vec<HistoryEntry>,
}

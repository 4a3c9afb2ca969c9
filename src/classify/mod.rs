//! Prompt classification
//!
//! Labels a prompt as code / writing / analysis from keyword lists. The scan
//! is case-insensitive substring matching; the code list takes precedence
//! over the writing list, and anything else falls through to analysis.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default keywords marking a prompt as a coding task
pub static DEFAULT_CODE_KEYWORDS: Lazy<Vec<String>> = Lazy::new(|| {
    ["def ", "class ", "import ", "exception", "function", "algorithm"]
        .iter()
        .map(|s| s.to_string())
        .collect()
});

/// Default keywords marking a prompt as a writing task
pub static DEFAULT_WRITING_KEYWORDS: Lazy<Vec<String>> = Lazy::new(|| {
    ["essay", "blog", "email", "summarize", "article", "letter"]
        .iter()
        .map(|s| s.to_string())
        .collect()
});

/// Classified prompt type, also used for provider specialties
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptKind {
    Code,
    Writing,
    Analysis,
}

impl fmt::Display for PromptKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PromptKind::Code => write!(f, "code"),
            PromptKind::Writing => write!(f, "writing"),
            PromptKind::Analysis => write!(f, "analysis"),
        }
    }
}

/// Keyword-driven prompt classifier
#[derive(Debug, Clone)]
pub struct Classifier {
    code: Vec<String>,
    writing: Vec<String>,
}

impl Classifier {
    /// Create a classifier with custom keyword lists. Keywords are matched
    /// lowercase; the lists are normalized here so `classify` stays cheap.
    pub fn new(code: Vec<String>, writing: Vec<String>) -> Self {
        Classifier {
            code: code.into_iter().map(|k| k.to_lowercase()).collect(),
            writing: writing.into_iter().map(|k| k.to_lowercase()).collect(),
        }
    }

    /// Classify a prompt. Code keywords win over writing keywords.
    pub fn classify(&self, prompt: &str) -> PromptKind {
        let lower = prompt.to_lowercase();
        if self.code.iter().any(|k| lower.contains(k.as_str())) {
            PromptKind::Code
        } else if self.writing.iter().any(|k| lower.contains(k.as_str())) {
            PromptKind::Writing
        } else {
            PromptKind::Analysis
        }
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Classifier::new(
            DEFAULT_CODE_KEYWORDS.clone(),
            DEFAULT_WRITING_KEYWORDS.clone(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_prompt() {
        let classifier = Classifier::default();
        assert_eq!(classifier.classify("def foo():"), PromptKind::Code);
        assert_eq!(
            classifier.classify("Explain this ALGORITHM to me"),
            PromptKind::Code
        );
    }

    #[test]
    fn test_writing_prompt() {
        let classifier = Classifier::default();
        assert_eq!(
            classifier.classify("Write an essay about trains"),
            PromptKind::Writing
        );
        assert_eq!(
            classifier.classify("Summarize this meeting"),
            PromptKind::Writing
        );
    }

    #[test]
    fn test_analysis_fallback() {
        let classifier = Classifier::default();
        assert_eq!(
            classifier.classify("What drove Q3 revenue?"),
            PromptKind::Analysis
        );
        assert_eq!(classifier.classify(""), PromptKind::Analysis);
    }

    #[test]
    fn test_code_wins_over_writing() {
        let classifier = Classifier::default();
        // Contains both "essay" and "function"; code list is checked first.
        assert_eq!(
            classifier.classify("Write an essay about this function"),
            PromptKind::Code
        );
    }

    #[test]
    fn test_custom_keywords() {
        let classifier = Classifier::new(vec!["sql".into()], vec!["poem".into()]);
        assert_eq!(classifier.classify("tune this SQL query"), PromptKind::Code);
        assert_eq!(classifier.classify("a poem about rust"), PromptKind::Writing);
        assert_eq!(classifier.classify("def foo():"), PromptKind::Analysis);
    }

    #[test]
    fn test_kind_serde() {
        assert_eq!(
            serde_json::to_string(&PromptKind::Code).unwrap(),
            "\"code\""
        );
        let kind: PromptKind = serde_json::from_str("\"writing\"").unwrap();
        assert_eq!(kind, PromptKind::Writing);
    }
}

//! Crisis resources and client-side crisis-language screening
//!
//! Risk classification belongs to the backend: a reply's `is_crisis` flag is
//! the only thing that turns crisis mode on. The screen here just notes when
//! an outgoing message contains crisis language so it shows up in the logs.

use regex::Regex;

/// Phrases treated as crisis language
pub const CRISIS_KEYWORDS: [&str; 8] = [
    "suicide",
    "kill myself",
    "end my life",
    "want to die",
    "self harm",
    "cut myself",
    "hurt myself",
    "no reason to live",
];

/// A way to reach a trained crisis counselor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrisisLine {
    pub title: &'static str,
    pub detail: &'static str,
}

/// Shown whenever crisis mode is on
pub const CRISIS_LINES: [CrisisLine; 3] = [
    CrisisLine {
        title: "Call 988",
        detail: "Suicide & Crisis Lifeline (24/7)",
    },
    CrisisLine {
        title: "Text \"HELLO\" to 741741",
        detail: "Crisis Text Line",
    },
    CrisisLine {
        title: "findahelpline.com",
        detail: "International resources",
    },
];

/// Keyword and pattern matcher for crisis language
pub struct CrisisScreen {
    keywords: Vec<String>,
    patterns: Vec<Regex>,
}

impl CrisisScreen {
    pub fn new() -> Self {
        Self {
            keywords: CRISIS_KEYWORDS.iter().map(|k| k.to_string()).collect(),
            patterns: Self::compile_patterns(),
        }
    }

    fn compile_patterns() -> Vec<Regex> {
        vec![
            Regex::new(r"(?i)\b(?:don't|dont) want to (?:live|be here)").unwrap(),
            Regex::new(r"(?i)\b(?:thinking about|planning) (?:suicide|ending)").unwrap(),
            Regex::new(r"(?i)\bno point in (?:living|life)\b").unwrap(),
        ]
    }

    /// True if `text` contains any crisis keyword or pattern.
    pub fn mentions_crisis_language(&self, text: &str) -> bool {
        let lowered = text.to_lowercase();
        self.keywords.iter().any(|k| lowered.contains(k.as_str()))
            || self.patterns.iter().any(|p| p.is_match(text))
    }
}

impl Default for CrisisScreen {
    fn default() -> Self {
        Self::new()
    }
}

//! Keyword crisis detector
//!
//! Simple substring scan for strong self-harm ideation. Deliberately
//! conservative and dependency-free; anything flagged short-circuits the
//! turn upstream.

use async_trait::async_trait;
use chorus_application::ports::crisis::CrisisDetector;

const CRISIS_KEYWORDS: [&str; 8] = [
    "kill myself",
    "suicide",
    "end my life",
    "die by my own hand",
    "hurt myself",
    "self-harm",
    "overdose",
    "take my life",
];

/// Keyword-based crisis detection
#[derive(Debug, Default)]
pub struct KeywordCrisisDetector;

#[async_trait]
impl CrisisDetector for KeywordCrisisDetector {
    async fn detect(&self, user_text: &str) -> bool {
        let lower = user_text.to_lowercase();
        CRISIS_KEYWORDS.iter().any(|phrase| lower.contains(phrase))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_flags_keywords_case_insensitively() {
        let detector = KeywordCrisisDetector;
        assert!(detector.detect("I want to End My Life").await);
        assert!(detector.detect("thinking about self-harm again").await);
    }

    #[tokio::test]
    async fn test_ordinary_text_passes() {
        let detector = KeywordCrisisDetector;
        assert!(!detector.detect("what should I cook tonight?").await);
    }
}

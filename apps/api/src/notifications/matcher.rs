//! Match Scorer — cheap keyword-overlap relevance test used to trigger notifications.
//!
//! Algorithm:
//! 1. Keywords = lowercase field of study + career interests, split on whitespace,
//!    tokens longer than `MIN_KEYWORD_CHARS` characters only.
//! 2. Posting text = lowercase title + description + requirements.
//! 3. Match if ANY keyword is a substring of the posting text.
//!
//! High recall, low precision. The length threshold is a product policy; keep it as is.
//!
//! `KeywordMatcher::for_profile(profile).matches(posting)` is the match test. Build the
//! matcher once per profile and reuse it across postings.

use crate::models::{JobPosting, Profile};

/// Tokens must be strictly longer than this to count as keywords.
pub const MIN_KEYWORD_CHARS: usize = 3;

#[derive(Debug, Clone)]
pub struct KeywordMatcher {
    keywords: Vec<String>,
}

impl KeywordMatcher {
    pub fn for_profile(profile: &Profile) -> Self {
        let interests = format!(
            "{} {}",
            profile.field_of_study.as_deref().unwrap_or(""),
            profile.career_interests.as_deref().unwrap_or("")
        )
        .to_lowercase();

        let keywords = interests
            .split_whitespace()
            .filter(|token| token.chars().count() > MIN_KEYWORD_CHARS)
            .map(str::to_string)
            .collect();

        Self { keywords }
    }

    #[cfg(test)]
    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// A matcher without keywords never matches.
    pub fn matches(&self, posting: &JobPosting) -> bool {
        if self.keywords.is_empty() {
            return false;
        }
        let text = searchable_text(posting);
        self.keywords.iter().any(|k| text.contains(k.as_str()))
    }
}

fn searchable_text(posting: &JobPosting) -> String {
    format!(
        "{} {} {}",
        posting.title,
        posting.description,
        posting.requirements.as_deref().unwrap_or("")
    )
    .to_lowercase()
}

use std::collections::HashSet;

use serde::Serialize;

/// A normalized text snippet taken from one page element.
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    pub text: String,
    pub href: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredFragment {
    pub snippet: String,
    pub href: Option<String>,
    pub score: u32,
}

impl ScoredFragment {
    /// Snippet with its link appended in brackets, as handed to the model.
    pub fn render(&self) -> String {
        match &self.href {
            Some(href) => format!("{} [{}]", self.snippet, href),
            None => self.snippet.clone(),
        }
    }
}

/// Unique fragments keyed by lowercased snippet. The first insert for a key wins.
#[derive(Debug, Default)]
pub struct FragmentSet {
    seen: HashSet<String>,
    fragments: Vec<ScoredFragment>,
}

impl FragmentSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key_for(snippet: &str) -> String {
        snippet.to_lowercase()
    }

    pub fn contains(&self, snippet: &str) -> bool {
        self.seen.contains(&Self::key_for(snippet))
    }

    /// Returns false when a fragment with the same key was already kept.
    pub fn insert(&mut self, fragment: ScoredFragment) -> bool {
        if !self.seen.insert(Self::key_for(&fragment.snippet)) {
            return false;
        }
        self.fragments.push(fragment);
        true
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Sorted by score descending; ties keep encounter order.
    pub fn into_ranked(self) -> Vec<ScoredFragment> {
        let mut fragments = self.fragments;
        fragments.sort_by(|a, b| b.score.cmp(&a.score));
        fragments
    }
}

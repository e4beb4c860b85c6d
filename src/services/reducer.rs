use std::sync::LazyLock;

use itertools::Itertools;
use regex::Regex;
use serde::Serialize;

use crate::domain::fragment::{Fragment, FragmentSet, ScoredFragment};

use super::{
    extractor::{extract_fragments, HtmlPage, PageDocument},
    scorer::ScoringRules,
};

static WHITESPACE_RUN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s{2,}").unwrap());

pub const FALLBACK_MARKER: &str = "NO_OBVIOUS_COUPON_SNIPPETS_FOUND";
const SNIPPET_ELLIPSIS: char = '…';

/// Size caps for the text handed to the model. All lengths count characters.
#[derive(Debug, Clone, PartialEq)]
pub struct ReductionLimits {
    pub max_chars: usize,
    pub max_fragments: usize,
    pub snippet_max_chars: usize,
    pub min_fragment_chars: usize,
    pub fallback_sample_chars: usize,
}

impl Default for ReductionLimits {
    fn default() -> Self {
        ReductionLimits {
            max_chars: 4000,
            max_fragments: 50,
            snippet_max_chars: 300,
            min_fragment_chars: 3,
            fallback_sample_chars: 1000,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ScrapeReport {
    pub reduced: String,
    pub contexts: Vec<ScoredFragment>,
}

pub fn truncate_snippet(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        let mut snippet: String = text.chars().take(max_chars).collect();
        snippet.push(SNIPPET_ELLIPSIS);
        snippet
    } else {
        text.to_string()
    }
}

/// Keeps relevant fragments, scores them and dedupes by lowercased snippet.
pub fn collect_fragments(
    fragments: Vec<Fragment>,
    rules: &ScoringRules,
    limits: &ReductionLimits,
) -> FragmentSet {
    let mut set = FragmentSet::new();

    for fragment in fragments {
        if !rules.is_relevant(&fragment.text) {
            continue;
        }

        let snippet = truncate_snippet(&fragment.text, limits.snippet_max_chars);
        if set.contains(&snippet) {
            continue;
        }

        set.insert(ScoredFragment {
            score: rules.score(&fragment.text),
            snippet,
            href: fragment.href,
        });
    }

    set
}

/// Joins ranked fragments into the final text, falling back to a page sample when
/// nothing useful matched. The result never exceeds `limits.max_chars`.
pub fn reduce_text(
    ranked: &[ScoredFragment],
    body_text: &str,
    limits: &ReductionLimits,
) -> String {
    let joined = ranked.iter().map(|f| f.render()).join("\n\n");

    let text = if joined.trim().chars().count() < 10 {
        let sample: String = body_text.chars().take(limits.fallback_sample_chars).collect();
        format!("{}\nPAGE_SNIPPET:\n{}", FALLBACK_MARKER, sample)
    } else {
        joined
    };

    WHITESPACE_RUN_RE
        .replace_all(&text, " ")
        .trim()
        .chars()
        .take(limits.max_chars)
        .collect()
}

pub fn reduce_page<D: PageDocument>(
    document: &mut D,
    rules: &ScoringRules,
    limits: &ReductionLimits,
) -> ScrapeReport {
    let fragments = extract_fragments(document, limits.min_fragment_chars);
    let total = fragments.len();

    let set = collect_fragments(fragments, rules, limits);
    log::info!("Kept {} unique candidate fragments out of {}", set.len(), total);

    let mut contexts = set.into_ranked();
    contexts.truncate(limits.max_fragments);

    let reduced = reduce_text(&contexts, &document.body_text(), limits);

    ScrapeReport { reduced, contexts }
}

pub fn reduce_html(html: &str, rules: &ScoringRules, limits: &ReductionLimits) -> ScrapeReport {
    let mut page = HtmlPage::parse(html);
    reduce_page(&mut page, rules, limits)
}

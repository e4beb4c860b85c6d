use std::sync::LazyLock;

use regex::Regex;

static PERCENT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"%\s*\d+|\d+\s*%").unwrap());
static CODE_RUN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[A-Z0-9]{4,12}").unwrap());

pub const DEFAULT_KEYWORDS: [&str; 8] = [
    "coupon", "promo", "code", "discount", "offer", "deal", "% off", "off",
];

/// Tunables for the relevance filter and score. Keywords are matched lowercase.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoringRules {
    pub keywords: Vec<String>,
    pub keyword_weight: u32,
    pub percent_weight: u32,
    pub code_weight: u32,
    pub free_shipping_weight: u32,
}

impl Default for ScoringRules {
    fn default() -> Self {
        ScoringRules {
            keywords: DEFAULT_KEYWORDS.iter().map(|k| k.to_string()).collect(),
            keyword_weight: 10,
            percent_weight: 8,
            code_weight: 6,
            free_shipping_weight: 5,
        }
    }
}

impl ScoringRules {
    pub fn is_relevant(&self, text: &str) -> bool {
        has_keyword(&text.to_lowercase(), &self.keywords) || is_code_like(text)
    }

    pub fn score(&self, text: &str) -> u32 {
        let lower = text.to_lowercase();
        let mut score = 0;

        if has_keyword(&lower, &self.keywords) {
            score += self.keyword_weight;
        }
        if has_percent(text) {
            score += self.percent_weight;
        }
        if is_code_like(text) {
            score += self.code_weight;
        }
        if has_free_shipping(&lower) {
            score += self.free_shipping_weight;
        }

        score
    }
}

pub fn has_keyword(lower: &str, keywords: &[String]) -> bool {
    keywords.iter().any(|k| lower.contains(k.as_str()))
}

/// `%20` or `20 %` style percentages.
pub fn has_percent(text: &str) -> bool {
    PERCENT_RE.is_match(text)
}

/// A 4-12 long run of uppercase letters and digits with at least one letter, like `SAVE20`.
pub fn is_code_like(text: &str) -> bool {
    CODE_RUN_RE
        .find_iter(text)
        .any(|m| m.as_str().chars().any(|c| c.is_ascii_uppercase()))
}

pub fn has_free_shipping(lower: &str) -> bool {
    lower.contains("free shipping")
}

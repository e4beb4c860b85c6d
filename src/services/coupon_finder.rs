use std::sync::Arc;

use crate::domain::{coupon::CouponCandidate, scrape_url::ScrapeUrl};

use super::{
    complete_with_retry, parse_coupons, reduce_html, ChatModel, CompletionError, FetchError,
    PageFetcher, RecoveryParseError, ReductionLimits, RetryPolicy, ScoringRules, ScrapeReport,
    Sleeper,
};

pub const EXTRACTION_INSTRUCTION: &str = r#"You extract coupon and promo codes from text scraped off a web page.
Return ONLY a JSON array, with no prose and no markdown, where every element looks like:
{ "title": string, "code": string|null, "description": string|null, "url": string|null }
Use null when a field is not present in the text. Never invent codes, offers or links
that are not in the text. If there are no coupons or offers, return []."#;

#[derive(thiserror::Error, Debug)]
pub enum ScrapeError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("failed to fetch page: {0}")]
    Fetch(#[from] FetchError),
    #[error("{0}")]
    Completion(#[from] CompletionError),
    #[error("could not parse model output: {0}")]
    Parse(#[from] RecoveryParseError),
    #[error("page reduction failed: {0}")]
    Reduce(#[from] tokio::task::JoinError),
    #[error("scrape timed out after {0} seconds")]
    Timeout(u64),
}

#[derive(Debug)]
pub struct CouponFinding {
    pub coupons: Vec<CouponCandidate>,
    pub report: ScrapeReport,
    pub model_raw: String,
}

/// Runs fetch, reduction, model call and recovery for one URL. Holds no per-request state.
pub struct CouponFinder {
    fetcher: Arc<dyn PageFetcher>,
    model: Arc<dyn ChatModel>,
    sleeper: Arc<dyn Sleeper>,
    pub rules: ScoringRules,
    pub limits: ReductionLimits,
    pub retry: RetryPolicy,
}

impl CouponFinder {
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        model: Arc<dyn ChatModel>,
        sleeper: Arc<dyn Sleeper>,
    ) -> Self {
        CouponFinder {
            fetcher,
            model,
            sleeper,
            rules: ScoringRules::default(),
            limits: ReductionLimits::default(),
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_rules(mut self, rules: ScoringRules) -> Self {
        self.rules = rules;
        self
    }

    pub fn with_limits(mut self, limits: ReductionLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Fetches the page and reduces it on the blocking pool.
    pub async fn scrape_site(&self, url: &ScrapeUrl) -> Result<ScrapeReport, ScrapeError> {
        let html = self.fetcher.fetch(url).await?;
        let rules = self.rules.clone();
        let limits = self.limits.clone();

        let report =
            tokio::task::spawn_blocking(move || reduce_html(&html, &rules, &limits)).await?;
        Ok(report)
    }

    pub async fn find_coupons(&self, url: &ScrapeUrl) -> Result<CouponFinding, ScrapeError> {
        let report = self.scrape_site(url).await?;
        log::info!(
            "Reduced {} to {} characters from {} contexts",
            url.as_str(),
            report.reduced.chars().count(),
            report.contexts.len()
        );

        let model_raw = complete_with_retry(
            self.model.as_ref(),
            self.sleeper.as_ref(),
            &self.retry,
            EXTRACTION_INSTRUCTION,
            &report.reduced,
        )
        .await?;

        let coupons = parse_coupons(&model_raw)?;
        log::info!("Model reported {} coupons for {}", coupons.len(), url.as_str());

        Ok(CouponFinding {
            coupons,
            report,
            model_raw,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::{
        CountingFetcher, FailingFetcher, RecordingSleeper, ScriptedModel,
    };

    const COUPON_PAGE: &str = r#"<html><head><script>var promo = "IGNORED";</script></head>
        <body><h1>Shoes</h1><div>Use code SAVE20 for 20% off!</div><p>About the brand</p></body></html>"#;

    fn finder(fetcher: Arc<dyn PageFetcher>, model: Arc<ScriptedModel>) -> CouponFinder {
        CouponFinder::new(fetcher, model, Arc::new(RecordingSleeper::default()))
    }

    fn url() -> ScrapeUrl {
        ScrapeUrl::parse("https://shoes.example.com/").unwrap()
    }

    #[tokio::test]
    async fn reduced_text_is_sent_to_the_model() {
        let model = Arc::new(ScriptedModel::replying(
            r#"[{"title":"20% off","code":"SAVE20","description":null,"url":null}]"#,
        ));
        let finder = finder(Arc::new(CountingFetcher::new(COUPON_PAGE)), model.clone());

        let finding = finder.find_coupons(&url()).await.unwrap();

        assert_eq!(finding.coupons[0].code.as_deref(), Some("SAVE20"));
        assert_eq!(finding.report.contexts[0].snippet, "Use code SAVE20 for 20% off!");
        assert!(finding.report.contexts[0].score >= 24);
        assert_eq!(model.last_text(), Some(finding.report.reduced.clone()));
        assert!(!finding.report.reduced.contains("IGNORED"));
    }

    #[tokio::test]
    async fn scrape_site_reduces_on_the_blocking_pool() {
        let finder = finder(
            Arc::new(CountingFetcher::new(COUPON_PAGE)),
            Arc::new(ScriptedModel::replying("[]")),
        );

        let report = finder.scrape_site(&url()).await.unwrap();

        assert_eq!(report.reduced, "Use code SAVE20 for 20% off!");
        assert_eq!(report.contexts.len(), 1);
    }

    #[tokio::test]
    async fn fetch_failure_skips_the_model() {
        let model = Arc::new(ScriptedModel::replying("[]"));
        let finder = finder(Arc::new(FailingFetcher), model.clone());

        let result = finder.find_coupons(&url()).await;

        assert!(matches!(result, Err(ScrapeError::Fetch(_))));
        assert_eq!(model.calls(), 0);
    }

    #[tokio::test]
    async fn unparseable_reply_keeps_raw_text() {
        let model = Arc::new(ScriptedModel::replying("Sorry, I cannot help with that."));
        let finder = finder(Arc::new(CountingFetcher::new(COUPON_PAGE)), model);

        match finder.find_coupons(&url()).await {
            Err(ScrapeError::Parse(e)) => assert_eq!(e.raw, "Sorry, I cannot help with that."),
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn custom_limits_cap_the_reduced_text() {
        let model = Arc::new(ScriptedModel::replying("[]"));
        let finder = finder(Arc::new(CountingFetcher::new(COUPON_PAGE)), model.clone())
            .with_limits(ReductionLimits {
                max_chars: 12,
                ..ReductionLimits::default()
            });

        let finding = finder.find_coupons(&url()).await.unwrap();

        assert!(finding.coupons.is_empty());
        assert_eq!(finding.report.reduced, "Use code SAV");
        assert_eq!(model.last_text().as_deref(), Some("Use code SAV"));
    }
}

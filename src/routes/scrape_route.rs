use std::time::Duration;

use actix_web::{
    error::JsonPayloadError, http::StatusCode, post, web, HttpRequest, HttpResponse,
    ResponseError,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::{
    configuration::ApplicationSettings,
    domain::{coupon::CouponCandidate, fragment::ScoredFragment, scrape_url::ScrapeUrl},
    services::{CouponFinder, CouponFinding, ScrapeError},
};

#[derive(Deserialize)]
struct ScrapeBody {
    url: Option<String>,
}

#[derive(Serialize)]
struct ScrapeResponse {
    coupons: Vec<CouponCandidate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    debug: Option<DebugPayload>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DebugPayload {
    reduced: String,
    contexts: Vec<ScoredFragment>,
    model_raw: String,
}

impl ResponseError for ScrapeError {
    fn status_code(&self) -> StatusCode {
        match self {
            ScrapeError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ScrapeError::Fetch(_) => StatusCode::BAD_GATEWAY,
            ScrapeError::Completion(e) if e.is_rate_limit() => StatusCode::SERVICE_UNAVAILABLE,
            ScrapeError::Completion(_) => StatusCode::BAD_GATEWAY,
            ScrapeError::Parse(_) | ScrapeError::Reduce(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ScrapeError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            ScrapeError::Parse(e) => json!({ "error": self.to_string(), "raw": e.raw }),
            _ => json!({ "error": self.to_string() }),
        };
        HttpResponse::build(self.status_code()).json(body)
    }
}

/// Malformed or non-JSON bodies are input errors, answered before any scraping.
pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    ScrapeError::InvalidInput(err.to_string()).into()
}

#[post("/scrape")]
async fn scrape(
    body: web::Json<ScrapeBody>,
    finder: web::Data<CouponFinder>,
    app: web::Data<ApplicationSettings>,
) -> Result<HttpResponse, ScrapeError> {
    let request_id = Uuid::new_v4();
    let url = ScrapeUrl::parse(body.url.as_deref().unwrap_or_default()).map_err(|reason| {
        log::warn!("[{}] Rejected scrape request: {}", request_id, reason);
        ScrapeError::InvalidInput(reason)
    })?;
    log::info!("[{}] Scraping {}", request_id, url.as_str());

    let timeout = Duration::from_secs(app.request_timeout_secs);
    let result = match tokio::time::timeout(timeout, finder.find_coupons(&url)).await {
        Ok(result) => result,
        Err(_) => Err(ScrapeError::Timeout(app.request_timeout_secs)),
    };

    let finding = match result {
        Ok(finding) => finding,
        Err(e) => {
            log::error!("[{}] Scrape of {} failed: {}", request_id, url.as_str(), e);
            return Err(e);
        }
    };

    let CouponFinding {
        coupons,
        report,
        model_raw,
    } = finding;
    let debug = app.debug.then(|| DebugPayload {
        reduced: report.reduced,
        contexts: report.contexts,
        model_raw,
    });

    Ok(HttpResponse::Ok().json(ScrapeResponse { coupons, debug }))
}

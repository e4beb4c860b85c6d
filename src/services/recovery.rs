use serde_json::Value;

use crate::domain::coupon::CouponCandidate;

#[derive(thiserror::Error, Debug)]
#[error("{reason}")]
pub struct RecoveryParseError {
    pub reason: String,
    pub raw: String,
}

impl RecoveryParseError {
    fn new(reason: impl Into<String>, raw: &str) -> Self {
        RecoveryParseError {
            reason: reason.into(),
            raw: raw.to_string(),
        }
    }
}

/// Parses the model reply into coupons, tolerating prose around the JSON.
pub fn parse_coupons(raw: &str) -> Result<Vec<CouponCandidate>, RecoveryParseError> {
    let value = parse_json_leniently(raw)
        .ok_or_else(|| RecoveryParseError::new("model reply contained no parseable JSON", raw))?;

    if !value.is_array() {
        return Err(RecoveryParseError::new(
            "model reply was not a JSON array",
            raw,
        ));
    }

    serde_json::from_value(value).map_err(|e| {
        RecoveryParseError::new(format!("model reply array is not a coupon list: {}", e), raw)
    })
}

/// Whole text first, then the widest `[...]` span, then the widest `{...}` span.
fn parse_json_leniently(raw: &str) -> Option<Value> {
    if let Ok(value) = serde_json::from_str(raw.trim()) {
        return Some(value);
    }

    [('[', ']'), ('{', '}')].iter().find_map(|(open, close)| {
        let snippet = bracketed(raw, *open, *close)?;
        let value = serde_json::from_str(snippet).ok()?;
        log::info!("Recovered JSON from {} surrounding characters", raw.len() - snippet.len());
        Some(value)
    })
}

fn bracketed(raw: &str, open: char, close: char) -> Option<&str> {
    let start = raw.find(open)?;
    let end = raw.rfind(close)?;
    (end > start).then(|| &raw[start..=end])
}

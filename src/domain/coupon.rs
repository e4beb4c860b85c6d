use serde::{Deserialize, Serialize};

/// One coupon as reported by the model. Optional fields may be absent or null.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CouponCandidate {
    pub title: String,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

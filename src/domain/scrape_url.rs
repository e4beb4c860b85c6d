use url::Url;

/// An absolute http(s) URL accepted for scraping.
#[derive(Debug, Clone, PartialEq)]
pub struct ScrapeUrl(Url);

impl ScrapeUrl {
    pub fn parse(raw: &str) -> Result<Self, String> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err("url is required".to_string());
        }

        let parsed =
            Url::parse(trimmed).map_err(|e| format!("{} is not a valid url: {}", trimmed, e))?;
        match parsed.scheme() {
            "http" | "https" => {}
            other => return Err(format!("unsupported url scheme: {}", other)),
        }
        match parsed.host_str() {
            Some(host) if !host.is_empty() => Ok(Self(parsed)),
            _ => Err(format!("{} has no host", trimmed)),
        }
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

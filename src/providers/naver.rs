// =============================================================================
// Naver Finance Name Lookup — company names for local numeric codes
// =============================================================================
//
// Naver serves the company page as HTML with the name in the `<title>`
// element ("삼성전자 : 네이버페이 증권"). Only that one element is read, via
// plain string search, so markup drift anywhere else on the page never
// breaks the lookup. The analysis service degrades to the raw input code
// when this provider fails.
// =============================================================================

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, instrument};

use crate::error::ProviderError;
use crate::providers::{truncate_body, NameLookupProvider};

/// Naver Finance HTML scraper for company display names.
#[derive(Debug, Clone)]
pub struct NaverClient {
    base_url: String,
    client: reqwest::Client,
}

impl NaverClient {
    /// Create a new `NaverClient` against the public finance site.
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .user_agent("Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36")
            .build()
            .expect("failed to build reqwest client");

        debug!("NaverClient initialised (base_url=https://finance.naver.com)");

        Self {
            base_url: "https://finance.naver.com".to_string(),
            client,
        }
    }
}

impl Default for NaverClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NameLookupProvider for NaverClient {
    /// GET /item/main.naver?code={code} and read the page `<title>`.
    #[instrument(skip(self), name = "naver::display_name")]
    async fn display_name(&self, code: &str) -> Result<String, ProviderError> {
        let url = format!("{}/item/main.naver?code={}", self.base_url, code);

        let resp = self.client.get(&url).send().await?;
        let status = resp.status();
        // reqwest decodes the body from the Content-Type charset (EUC-KR here).
        let body = resp.text().await?;

        if !status.is_success() {
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        let name = extract_title_name(&body).ok_or_else(|| {
            ProviderError::Malformed("page title missing or unrecognised".into())
        })?;

        debug!(code, name = %name, "display name resolved");
        Ok(name)
    }
}

/// Pull the company name out of a Naver Finance page title.
///
/// The title format is "{name} : {site banner}"; everything from the first
/// colon on is site chrome. Returns `None` when no `<title>` is present or
/// the name part is empty.
fn extract_title_name(html: &str) -> Option<String> {
    let start = html.find("<title>")? + "<title>".len();
    let end = html[start..].find("</title>")? + start;

    let name = html[start..end].split(':').next()?.trim();
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

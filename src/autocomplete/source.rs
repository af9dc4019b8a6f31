//! Where suggestions come from.

use std::future::Future;

use serde_json::Value;
use thiserror::Error;
use url::Url;

#[derive(Error, Debug)]
pub enum SuggestError {
    #[error("Invalid suggest URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("Suggest endpoint {0} is not on the page origin")]
    CrossOrigin(Url),
    #[cfg(feature = "http")]
    #[error("Suggest request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Suggest endpoint answered with status {0}")]
    Status(u16),
    #[error("Suggest response is not JSON: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Answers a query with a JSON body.
///
/// The body is expected to be an array of strings or of
/// `{label, value, hint}` records; anything else renders as no suggestions.
pub trait SuggestSource {
    fn suggest(
        &self,
        endpoint: &str,
        query: &str,
    ) -> impl Future<Output = Result<Value, SuggestError>>;
}

/// Resolves `endpoint` against `origin` and sets the `q` parameter.
///
/// Endpoints resolving to another origin are rejected.
pub fn suggest_url(origin: &Url, endpoint: &str, query: &str) -> Result<Url, SuggestError> {
    let mut url = origin.join(endpoint)?;
    if url.origin() != origin.origin() {
        return Err(SuggestError::CrossOrigin(url));
    }
    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(name, _)| name != "q")
        .map(|(name, value)| (name.into_owned(), value.into_owned()))
        .collect();
    url.query_pairs_mut()
        .clear()
        .extend_pairs(kept)
        .append_pair("q", query);
    Ok(url)
}

/// Suggestion source issuing same-origin `GET` requests.
#[cfg(feature = "http")]
#[derive(Debug, Clone)]
pub struct HttpSuggestSource {
    client: reqwest::Client,
    origin: Url,
}

#[cfg(feature = "http")]
impl HttpSuggestSource {
    /// Creates a source for pages served from `origin`, e.g. `https://example.com`.
    pub fn new(origin: &str) -> Result<Self, SuggestError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("form-widgets/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::with_client(client, Url::parse(origin)?))
    }

    pub fn with_client(client: reqwest::Client, origin: Url) -> Self {
        Self { client, origin }
    }

    pub fn origin(&self) -> &Url {
        &self.origin
    }
}

#[cfg(feature = "http")]
impl SuggestSource for HttpSuggestSource {
    async fn suggest(&self, endpoint: &str, query: &str) -> Result<Value, SuggestError> {
        let url = suggest_url(&self.origin, endpoint, query)?;

        #[cfg(feature = "tracing")]
        tracing::debug!("Fetching suggestions from: {}", url);

        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SuggestError::Status(response.status().as_u16()));
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

use std::future::Future;

use reqwest::Url;
use thiserror::Error;

use crate::extractor::{Extractor, VideoIdExtractor};

pub const DEFAULT_SEARCH_ENDPOINT: &str = "https://www.youtube.com/results";

/// Name of the query parameter the search endpoint expects.
const SEARCH_PARAM: &str = "search_query";

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid search endpoint {endpoint:?}: {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("no identifier found in response")]
    NotFound,
}

/// One query in, one identifier out.
///
/// This is the seam the batch coordinator drives; anything that can turn a
/// query into an identifier (or a reason it couldn't) plugs in here.
pub trait Fetch: Send + Sync + 'static {
    fn fetch(&self, query: &str) -> impl Future<Output = Result<String, FetchError>> + Send;
}

/// Fetches a search results page and runs an [`Extractor`] over the body.
pub struct SearchFetcher {
    client: reqwest::Client,
    endpoint: Url,
    extractor: Box<dyn Extractor>,
}

impl SearchFetcher {
    pub fn new(endpoint: &str, extractor: Box<dyn Extractor>) -> Result<Self, FetchError> {
        let endpoint = Url::parse(endpoint).map_err(|e| FetchError::InvalidEndpoint {
            endpoint: endpoint.to_string(),
            reason: e.to_string(),
        })?;
        if endpoint.scheme() != "http" && endpoint.scheme() != "https" {
            return Err(FetchError::InvalidEndpoint {
                endpoint: endpoint.to_string(),
                reason: "scheme must be http or https".to_string(),
            });
        }

        Ok(SearchFetcher {
            client: reqwest::Client::new(),
            endpoint,
            extractor,
        })
    }

    /// Fetcher for the public video search page.
    pub fn video_search(endpoint: &str) -> Result<Self, FetchError> {
        Self::new(endpoint, Box::new(VideoIdExtractor))
    }

    /// Target url for a query, with the query form-encoded.
    pub fn search_url(&self, query: &str) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut().append_pair(SEARCH_PARAM, query);
        url
    }

    async fn fetch_page(&self, url: Url) -> Result<Vec<u8>, FetchError> {
        let res = self.client.get(url).send().await?;
        // status is deliberately not checked, error pages get scanned as well
        log::debug!("upstream responded {} for {}", res.status(), res.url());
        let body = res.bytes().await?;
        Ok(body.to_vec())
    }
}

impl Fetch for SearchFetcher {
    async fn fetch(&self, query: &str) -> Result<String, FetchError> {
        let url = self.search_url(query);
        let body = self.fetch_page(url).await?;
        self.extractor.extract(&body).ok_or(FetchError::NotFound)
    }
}

#[test]
fn test_search_url_encodes_query() {
    let fetcher = SearchFetcher::video_search("https://example.com/results").unwrap();

    let url = fetcher.search_url("rust async & tokio");
    assert_eq!(
        url.as_str(),
        "https://example.com/results?search_query=rust+async+%26+tokio"
    );

    let url = fetcher.search_url("");
    assert_eq!(url.as_str(), "https://example.com/results?search_query=");
}

#[test]
fn test_search_url_keeps_existing_params() {
    let fetcher = SearchFetcher::video_search("https://example.com/results?hl=en").unwrap();
    let url = fetcher.search_url("a/b?c");
    assert_eq!(
        url.as_str(),
        "https://example.com/results?hl=en&search_query=a%2Fb%3Fc"
    );
}

#[test]
fn test_rejects_bad_endpoints() {
    assert!(matches!(
        SearchFetcher::video_search("not a url"),
        Err(FetchError::InvalidEndpoint { .. })
    ));
    assert!(matches!(
        SearchFetcher::video_search("ftp://example.com/results"),
        Err(FetchError::InvalidEndpoint { .. })
    ));
}

use std::collections::HashMap;

use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use url::Url;

use crate::error_catalog::error::{fetch_error, invalid_argument, CatalogResult};

/// Path of locale documents relative to the asset base URL.
pub const LOCALES_PATH: &str = "assets/locales";

/// Escapes everything in a locale path segment except RFC 3986 unreserved characters.
const LOCALE_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Where raw locale documents come from.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait CatalogSource: Send + Sync {
    /// Returns the raw YAML document for `locale`.
    async fn fetch(&self, locale: &str) -> CatalogResult<String>;
}

/// Fetches `{base_url}/assets/locales/{locale}.yml` over HTTP.
pub struct HttpCatalogSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpCatalogSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn locale_url(&self, locale: &str) -> CatalogResult<Url> {
        let segment = utf8_percent_encode(locale, LOCALE_SEGMENT).to_string();
        let raw = format!("{}/{LOCALES_PATH}/{segment}.yml", self.base_url);
        Url::parse(&raw).map_err(|err| invalid_argument(format!("invalid catalog url `{raw}`: {err}")))
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl CatalogSource for HttpCatalogSource {
    async fn fetch(&self, locale: &str) -> CatalogResult<String> {
        let url = self.locale_url(locale)?;
        log::debug!("fetching error catalog from {url}");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| fetch_error(format!("catalog request failed: {err}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(fetch_error(format!(
                "catalog request for locale `{locale}` failed with status {status}"
            ))
            .with_status(status.as_u16()));
        }

        response
            .text()
            .await
            .map_err(|err| fetch_error(format!("failed to read catalog body: {err}")))
    }
}

/// In-memory locale documents, for bundled catalogs and tests.
#[derive(Clone, Debug, Default)]
pub struct StaticCatalogSource {
    documents: HashMap<String, String>,
}

impl StaticCatalogSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(mut self, locale: impl Into<String>, document: impl Into<String>) -> Self {
        self.documents.insert(locale.into(), document.into());
        self
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl CatalogSource for StaticCatalogSource {
    async fn fetch(&self, locale: &str) -> CatalogResult<String> {
        self.documents
            .get(locale)
            .cloned()
            .ok_or_else(|| fetch_error(format!("no bundled catalog for locale `{locale}`")).with_status(404))
    }
}

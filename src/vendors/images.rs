use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::{check_status, network_error, ImageResult, ImageSearch, VendorError};

const SOURCE_NAME: &str = "Open-i (NLM)";

/// Open-i medical image search, no credentials required
pub struct OpenIClient {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    list: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchItem {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    img_large: Option<String>,
    #[serde(default)]
    img_thumb: Option<String>,
    #[serde(default)]
    image: Option<ImageCaption>,
}

#[derive(Debug, Deserialize)]
struct ImageCaption {
    #[serde(default)]
    caption: Option<String>,
}

impl OpenIClient {
    pub fn new(client: Client, base_url: &str) -> Self {
        Self { client, base_url: base_url.trim_end_matches('/').to_string() }
    }

    /// Open-i returns paths relative to its host
    fn absolute(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else {
            format!("{}/{}", self.base_url, path.trim_start_matches('/'))
        }
    }

    fn to_result(&self, item: SearchItem) -> Option<ImageResult> {
        let url = item.img_large.filter(|u| !u.is_empty())?;
        let titulo = item
            .title
            .filter(|t| !t.trim().is_empty())
            .or_else(|| item.image.and_then(|i| i.caption))
            .unwrap_or_default();
        Some(ImageResult {
            titulo,
            url: self.absolute(&url),
            miniatura: item.img_thumb.map(|t| self.absolute(&t)),
            fonte: SOURCE_NAME.to_string(),
        })
    }
}

#[async_trait]
impl ImageSearch for OpenIClient {
    async fn search(&self, term: &str, limit: usize) -> Result<Vec<ImageResult>, VendorError> {
        let limit = limit.max(1);
        let n = limit.to_string();
        let response = self
            .client
            .get(format!("{}/api/search", self.base_url))
            .query(&[("query", term), ("m", "1"), ("n", n.as_str())])
            .send()
            .await
            .map_err(network_error)?;

        let body: SearchResponse = check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| VendorError::InvalidResponse(e.to_string()))?;

        Ok(body
            .list
            .into_iter()
            .filter_map(|item| self.to_result(item))
            .take(limit)
            .collect())
    }
}

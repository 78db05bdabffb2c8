//! reqwest-backed access to the CMS REST API.

mod query;

pub use query::encode_query;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderValue};
use reqwest::{Client, Response, Url};
use serde_json::Value;

use crate::application::sources::{ContentSource, FetchRequest, SourceError};
use crate::config::CmsSettings;
use crate::domain::resources::EntryId;

#[derive(Clone, Debug)]
pub struct HttpSource {
    client: Client,
    base: Url,
    api_prefix: String,
}

impl HttpSource {
    pub fn new(settings: &CmsSettings) -> Result<Self, SourceError> {
        let client = Client::builder()
            .user_agent(Self::user_agent())
            .timeout(settings.request_timeout)
            .build()
            .map_err(SourceError::transport)?;
        Ok(Self {
            client,
            base: settings.base_url.clone(),
            api_prefix: settings.api_prefix.clone(),
        })
    }

    pub fn user_agent() -> &'static str {
        concat!("folio/", env!("CARGO_PKG_VERSION"))
    }

    pub fn auth_header(token: &str) -> Result<HeaderValue, SourceError> {
        HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|e| SourceError::Credential(e.to_string()))
    }

    /// `<base>/<prefix>/<resource path>[/<id>]?<encoded query>`
    pub fn resource_url(&self, request: &FetchRequest<'_>) -> Result<Url, SourceError> {
        let mut path = String::new();
        if !self.api_prefix.is_empty() {
            path.push_str(&self.api_prefix);
            path.push('/');
        }
        path.push_str(request.resource.path());

        let mut url = self.base.join(&path)?;
        if let Some(id) = request.id {
            push_segment(&mut url, id)?;
        }

        let pairs = encode_query(request.query);
        if !pairs.is_empty() {
            url.query_pairs_mut().extend_pairs(pairs);
        }
        Ok(url)
    }

    async fn handle(resp: Response) -> Result<Value, SourceError> {
        let status = resp.status();
        let bytes = resp.bytes().await.map_err(SourceError::transport)?;
        if !status.is_success() {
            let body = String::from_utf8_lossy(&bytes).into_owned();
            return Err(SourceError::Status {
                status: status.as_u16(),
                body,
            });
        }
        serde_json::from_slice(&bytes).map_err(|e| SourceError::Decode(e.to_string()))
    }
}

#[async_trait]
impl ContentSource for HttpSource {
    async fn probe(&self) -> Result<u16, SourceError> {
        let resp = self
            .client
            .get(self.base.clone())
            .send()
            .await
            .map_err(SourceError::transport)?;
        Ok(resp.status().as_u16())
    }

    async fn fetch(&self, request: FetchRequest<'_>) -> Result<Value, SourceError> {
        let url = self.resource_url(&request)?;
        tracing::debug!(resource = %request.resource, url = %url, "querying cms");

        let mut req = self.client.get(url);
        if let Some(token) = request.token {
            req = req.header(AUTHORIZATION, Self::auth_header(token)?);
        }

        let resp = req.send().await.map_err(SourceError::transport)?;
        Self::handle(resp).await
    }
}

fn push_segment(url: &mut Url, id: &EntryId) -> Result<(), SourceError> {
    let segment = id.to_string();
    url.path_segments_mut()
        .map_err(|()| SourceError::Url(url::ParseError::RelativeUrlWithoutBase))?
        .push(&segment);
    Ok(())
}

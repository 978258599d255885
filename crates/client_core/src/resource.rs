//! Resource client for the `/studies/:id` URL template.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use shared::{
    domain::{Study, StudyId},
    error::ApiError,
};
use tracing::{debug, warn};
use url::Url;

use crate::error::ResourceError;

const COLLECTION_SEGMENT: &str = "studies";

/// CRUD verbs against the studies collection.
///
/// `save` creates when the study has no id and updates otherwise; the
/// returned study is the server's canonical copy.
#[async_trait]
pub trait StudyResource: Send + Sync {
    async fn query(&self) -> Result<Vec<Study>, ResourceError>;
    async fn get(&self, id: &StudyId) -> Result<Study, ResourceError>;
    async fn save(&self, study: &Study) -> Result<Study, ResourceError>;
    async fn delete(&self, id: &StudyId) -> Result<(), ResourceError>;
}

pub struct HttpStudyResource {
    http: Client,
    base_url: Url,
}

impl HttpStudyResource {
    pub fn new(server_url: &str) -> Result<Self, ResourceError> {
        Self::with_timeout(server_url, None)
    }

    pub fn with_timeout(
        server_url: &str,
        timeout: Option<Duration>,
    ) -> Result<Self, ResourceError> {
        let base_url = Url::parse(server_url).map_err(|err| ResourceError::InvalidUrl {
            url: server_url.to_string(),
            reason: err.to_string(),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ResourceError::InvalidUrl {
                url: server_url.to_string(),
                reason: "url cannot carry a path".to_string(),
            });
        }

        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http: builder.build()?,
            base_url,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `/studies` when `id` is `None`, `/studies/:id` otherwise.
    pub fn study_url(&self, id: Option<&StudyId>) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(COLLECTION_SEGMENT);
            if let Some(id) = id {
                segments.push(id.as_str());
            }
        }
        url
    }

    fn request(&self, method: Method, id: Option<&StudyId>) -> RequestBuilder {
        let url = self.study_url(id);
        debug!(%method, %url, "studies request");
        self.http.request(method, url)
    }
}

#[async_trait]
impl StudyResource for HttpStudyResource {
    async fn query(&self) -> Result<Vec<Study>, ResourceError> {
        let res = self.request(Method::GET, None).send().await?;
        decode_json(res).await
    }

    async fn get(&self, id: &StudyId) -> Result<Study, ResourceError> {
        let res = self.request(Method::GET, Some(id)).send().await?;
        decode_json(res).await
    }

    async fn save(&self, study: &Study) -> Result<Study, ResourceError> {
        let res = self
            .request(Method::POST, study.id.as_ref())
            .json(study)
            .send()
            .await?;
        decode_json(res).await
    }

    async fn delete(&self, id: &StudyId) -> Result<(), ResourceError> {
        let res = self.request(Method::DELETE, Some(id)).send().await?;
        ensure_success(res).await?;
        Ok(())
    }
}

async fn ensure_success(res: Response) -> Result<Response, ResourceError> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }
    let body = match res.text().await {
        Ok(body) => body,
        Err(err) => {
            warn!(%status, error = %err, "failed to read error response body");
            String::new()
        }
    };
    Err(ResourceError::Status {
        status,
        payload: ApiError::payload_from_body(&body),
    })
}

async fn decode_json<T: DeserializeOwned>(res: Response) -> Result<T, ResourceError> {
    let body = ensure_success(res).await?.text().await?;
    Ok(serde_json::from_str(&body)?)
}

#[cfg(test)]
#[path = "tests/resource_tests.rs"]
mod tests;

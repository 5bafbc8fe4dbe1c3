use super::{Client, ClientError};
use crate::model::{AccessKey, Alert, AlertTarget, Pipeline, SharedSource, Sink, Source, Transform};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION};
use reqwest::{RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;
use tracing::{debug, instrument};

/// Resolved connection settings for [`HttpClient`].
#[derive(Clone)]
pub struct ClientSettings {
    pub endpoint: Url,
    pub auth_key: String,
    pub headers: BTreeMap<String, String>,
    pub timeout: Duration,
}

impl fmt::Debug for ClientSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientSettings")
            .field("endpoint", &self.endpoint.as_str())
            .field("auth_key", &"<redacted>")
            .field("headers", &self.headers.keys().collect::<Vec<_>>())
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Deserialize)]
struct Envelope<T> {
    data: T,
}

/// [`Client`] over HTTPS with `reqwest`.
///
/// Every request carries `Authorization: Token <key>` plus any configured extra headers.
/// Responses are unwrapped from their `{"data": ...}` envelope. Ids become single
/// percent-encoded path segments, so an id can never point a request at another object.
#[derive(Clone, Debug)]
pub struct HttpClient {
    http: reqwest::Client,
    base: Url,
}

impl HttpClient {
    pub fn new(settings: &ClientSettings) -> Result<Self, ClientError> {
        if settings.endpoint.cannot_be_a_base() {
            return Err(ClientError::Config(format!(
                "endpoint {} cannot be a base URL",
                settings.endpoint
            )));
        }

        let mut headers = HeaderMap::new();
        for (name, value) in &settings.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| ClientError::Config(format!("header name {name:?}: {e}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| ClientError::Config(format!("header {name}: {e}")))?;
            headers.insert(name, value);
        }
        let mut auth = HeaderValue::from_str(&format!("Token {}", settings.auth_key))
            .map_err(|e| ClientError::Config(format!("auth_key: {e}")))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(concat!("terraform-provider-pipeline/", env!("CARGO_PKG_VERSION")))
            .timeout(settings.timeout)
            .build()
            .map_err(|e| ClientError::Config(e.to_string()))?;

        Ok(Self {
            http,
            base: settings.endpoint.clone(),
        })
    }

    /// Appends `segments` to the endpoint path, percent-encoding each one.
    fn url(&self, segments: &[&str]) -> Result<Url, ClientError> {
        if let Some(bad) = segments
            .iter()
            .find(|s| s.is_empty() || **s == "." || **s == "..")
        {
            return Err(ClientError::InvalidPath(bad.to_string()));
        }
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::Config(format!("endpoint {} cannot be a base URL", self.base)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send(&self, request: RequestBuilder, url: &Url) -> Result<Response, ClientError> {
        let response = request.send().await.map_err(|source| ClientError::Transport {
            url: url.to_string(),
            source,
        })?;
        let status = response.status();
        debug!(%url, status = status.as_u16(), "Response");
        if status == StatusCode::NOT_FOUND {
            return Err(ClientError::NotFound {
                url: url.to_string(),
            });
        }
        if !status.is_success() {
            return Err(status_error(url, status, response.text().await));
        }
        Ok(response)
    }

    async fn decode<T: DeserializeOwned>(url: &Url, response: Response) -> Result<T, ClientError> {
        let bytes = response.bytes().await.map_err(|source| ClientError::Transport {
            url: url.to_string(),
            source,
        })?;
        serde_json::from_slice::<Envelope<T>>(&bytes)
            .map(|envelope| envelope.data)
            .map_err(|e| ClientError::Decode {
                url: url.to_string(),
                message: e.to_string(),
            })
    }

    async fn get<T: DeserializeOwned>(&self, path: &[&str]) -> Result<T, ClientError> {
        let url = self.url(path)?;
        let response = self.send(self.http.get(url.clone()), &url).await?;
        Self::decode(&url, response).await
    }

    async fn post<B, T>(&self, path: &[&str], body: &B) -> Result<T, ClientError>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(path)?;
        let response = self.send(self.http.post(url.clone()).json(body), &url).await?;
        Self::decode(&url, response).await
    }

    async fn put<B, T>(&self, path: &[&str], body: &B) -> Result<T, ClientError>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(path)?;
        let response = self.send(self.http.put(url.clone()).json(body), &url).await?;
        Self::decode(&url, response).await
    }

    async fn delete(&self, path: &[&str]) -> Result<(), ClientError> {
        let url = self.url(path)?;
        self.send(self.http.delete(url.clone()), &url).await?;
        Ok(())
    }
}

/// A failed status keeps the body verbatim; a body that cannot be read is a transport error.
fn status_error(url: &Url, status: StatusCode, body: reqwest::Result<String>) -> ClientError {
    match body {
        Ok(body) => ClientError::Status {
            url: url.to_string(),
            status: status.as_u16(),
            body,
        },
        Err(source) => ClientError::Transport {
            url: url.to_string(),
            source,
        },
    }
}

const PIPELINES: [&str; 2] = ["v3", "pipeline"];
const SHARED_SOURCES: [&str; 3] = ["v3", "pipeline", "shared-source"];
const ACCESS_KEYS: [&str; 3] = ["v3", "pipeline", "access-key"];

fn item<'a>(collection: &[&'a str], id: &'a str) -> Vec<&'a str> {
    let mut path = collection.to_vec();
    path.push(id);
    path
}

fn component_path<'a>(pipeline_id: &'a str, kind: &'a str) -> [&'a str; 4] {
    ["v3", "pipeline", pipeline_id, kind]
}

fn alert_path(target: &AlertTarget) -> [&str; 6] {
    [
        "v3",
        "pipeline",
        target.pipeline_id.as_str(),
        target.component_kind.as_str(),
        target.component_id.as_str(),
        "alert",
    ]
}

#[async_trait]
impl Client for HttpClient {
    #[instrument(skip(self, pipeline))]
    async fn create_pipeline(&self, pipeline: &Pipeline) -> Result<Pipeline, ClientError> {
        self.post(&PIPELINES, pipeline).await
    }

    async fn get_pipeline(&self, id: &str) -> Result<Pipeline, ClientError> {
        self.get(&item(&PIPELINES, id)).await
    }

    #[instrument(skip(self, pipeline))]
    async fn update_pipeline(&self, id: &str, pipeline: &Pipeline) -> Result<Pipeline, ClientError> {
        self.put(&item(&PIPELINES, id), pipeline).await
    }

    #[instrument(skip(self))]
    async fn delete_pipeline(&self, id: &str) -> Result<(), ClientError> {
        self.delete(&item(&PIPELINES, id)).await
    }

    #[instrument(skip(self, source))]
    async fn create_source(&self, pipeline_id: &str, source: &Source) -> Result<Source, ClientError> {
        self.post(&component_path(pipeline_id, "source"), source).await
    }

    async fn get_source(&self, pipeline_id: &str, id: &str) -> Result<Source, ClientError> {
        self.get(&item(&component_path(pipeline_id, "source"), id))
            .await
    }

    #[instrument(skip(self, source))]
    async fn update_source(
        &self,
        pipeline_id: &str,
        id: &str,
        source: &Source,
    ) -> Result<Source, ClientError> {
        self.put(&item(&component_path(pipeline_id, "source"), id), source)
            .await
    }

    #[instrument(skip(self))]
    async fn delete_source(&self, pipeline_id: &str, id: &str) -> Result<(), ClientError> {
        self.delete(&item(&component_path(pipeline_id, "source"), id))
            .await
    }

    #[instrument(skip(self, transform))]
    async fn create_transform(
        &self,
        pipeline_id: &str,
        transform: &Transform,
    ) -> Result<Transform, ClientError> {
        self.post(&component_path(pipeline_id, "transform"), transform)
            .await
    }

    async fn get_transform(&self, pipeline_id: &str, id: &str) -> Result<Transform, ClientError> {
        self.get(&item(&component_path(pipeline_id, "transform"), id))
            .await
    }

    #[instrument(skip(self, transform))]
    async fn update_transform(
        &self,
        pipeline_id: &str,
        id: &str,
        transform: &Transform,
    ) -> Result<Transform, ClientError> {
        self.put(&item(&component_path(pipeline_id, "transform"), id), transform)
            .await
    }

    #[instrument(skip(self))]
    async fn delete_transform(&self, pipeline_id: &str, id: &str) -> Result<(), ClientError> {
        self.delete(&item(&component_path(pipeline_id, "transform"), id))
            .await
    }

    #[instrument(skip(self, sink))]
    async fn create_sink(&self, pipeline_id: &str, sink: &Sink) -> Result<Sink, ClientError> {
        self.post(&component_path(pipeline_id, "sink"), sink).await
    }

    async fn get_sink(&self, pipeline_id: &str, id: &str) -> Result<Sink, ClientError> {
        self.get(&item(&component_path(pipeline_id, "sink"), id))
            .await
    }

    #[instrument(skip(self, sink))]
    async fn update_sink(&self, pipeline_id: &str, id: &str, sink: &Sink) -> Result<Sink, ClientError> {
        self.put(&item(&component_path(pipeline_id, "sink"), id), sink)
            .await
    }

    #[instrument(skip(self))]
    async fn delete_sink(&self, pipeline_id: &str, id: &str) -> Result<(), ClientError> {
        self.delete(&item(&component_path(pipeline_id, "sink"), id))
            .await
    }

    #[instrument(skip(self, alert))]
    async fn create_alert(&self, target: &AlertTarget, alert: &Alert) -> Result<Alert, ClientError> {
        self.post(&alert_path(target), alert).await
    }

    async fn get_alert(&self, target: &AlertTarget, id: &str) -> Result<Alert, ClientError> {
        self.get(&item(&alert_path(target), id)).await
    }

    #[instrument(skip(self, alert))]
    async fn update_alert(
        &self,
        target: &AlertTarget,
        id: &str,
        alert: &Alert,
    ) -> Result<Alert, ClientError> {
        self.put(&item(&alert_path(target), id), alert).await
    }

    #[instrument(skip(self))]
    async fn delete_alert(&self, target: &AlertTarget, id: &str) -> Result<(), ClientError> {
        self.delete(&item(&alert_path(target), id)).await
    }

    #[instrument(skip(self, source))]
    async fn create_shared_source(&self, source: &SharedSource) -> Result<SharedSource, ClientError> {
        self.post(&SHARED_SOURCES, source).await
    }

    async fn get_shared_source(&self, id: &str) -> Result<SharedSource, ClientError> {
        self.get(&item(&SHARED_SOURCES, id)).await
    }

    #[instrument(skip(self, source))]
    async fn update_shared_source(
        &self,
        id: &str,
        source: &SharedSource,
    ) -> Result<SharedSource, ClientError> {
        self.put(&item(&SHARED_SOURCES, id), source).await
    }

    #[instrument(skip(self))]
    async fn delete_shared_source(&self, id: &str) -> Result<(), ClientError> {
        self.delete(&item(&SHARED_SOURCES, id)).await
    }

    #[instrument(skip(self, key))]
    async fn create_access_key(&self, key: &AccessKey) -> Result<AccessKey, ClientError> {
        self.post(&ACCESS_KEYS, key).await
    }

    async fn get_access_key(&self, id: &str) -> Result<AccessKey, ClientError> {
        self.get(&item(&ACCESS_KEYS, id)).await
    }

    #[instrument(skip(self))]
    async fn delete_access_key(&self, id: &str) -> Result<(), ClientError> {
        self.delete(&item(&ACCESS_KEYS, id)).await
    }
}

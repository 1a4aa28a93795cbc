use super::error::FaceClientError;
use super::interfaces::{FaceModel, FaceServiceHealth};
use bon::bon;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument, warn};
use url::Url;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Serialize)]
struct EmbedRequest<'a> {
    image: &'a str,
}

#[derive(Deserialize)]
struct EmbedResponse {
    vector: Vec<f32>,
    /// Number of faces the detector found, not every service version reports it.
    #[serde(default)]
    faces: Option<u32>,
}

#[derive(Serialize)]
struct LoadModelRequest {
    model: FaceModel,
}

/// HTTP client for the face inference service.
#[derive(Clone, Debug)]
pub struct FaceClient {
    http_client: Client,
    base_url: Url,
    timeout: Duration,
}

#[bon]
impl FaceClient {
    #[builder(start_fn = with_base_url)]
    pub fn new(
        #[builder(start_fn)] base_url: &str,
        timeout: Option<Duration>,
    ) -> Result<Self, FaceClientError> {
        let timeout = timeout.unwrap_or(DEFAULT_TIMEOUT);
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(FaceClientError::Request)?;

        Ok(Self {
            http_client,
            base_url: base_url.parse()?,
            timeout,
        })
    }
}

impl FaceClient {
    fn endpoint(&self, path: &str) -> Url {
        let mut url = self.base_url.clone();
        let base_path = url.path().trim_end_matches('/').to_string();
        url.set_path(&format!("{base_path}/{path}"));
        url
    }

    fn request_error(&self, err: reqwest::Error) -> FaceClientError {
        if err.is_timeout() {
            FaceClientError::Timeout(self.timeout)
        } else {
            FaceClientError::Request(err)
        }
    }

    /// Turns a face image into an embedding vector.
    ///
    /// `image_b64` is plain base64, without a data URL prefix. Exactly one face has to be visible.
    #[instrument(skip_all)]
    pub async fn embed(&self, image_b64: &str) -> Result<Vec<f32>, FaceClientError> {
        let url = self.endpoint("embed");
        let response = self
            .http_client
            .post(url)
            .json(&EmbedRequest { image: image_b64 })
            .send()
            .await
            .map_err(|e| self.request_error(e))?;
        let response = check_status(response).await?;

        let body = response.text().await.map_err(|e| self.request_error(e))?;
        let parsed: EmbedResponse = serde_json::from_str(&body)
            .map_err(|e| FaceClientError::MalformedResponse(e.to_string()))?;

        match parsed.faces {
            Some(0) => return Err(FaceClientError::NoFace),
            Some(n) if n > 1 => return Err(FaceClientError::MultipleFaces(n)),
            _ => {}
        }
        if parsed.vector.is_empty() {
            return Err(FaceClientError::EmptyEmbedding);
        }

        debug!("Received embedding with {} dimensions", parsed.vector.len());
        Ok(parsed.vector)
    }

    /// Switches the model the inference service uses for every subsequent request.
    #[instrument(skip(self))]
    pub async fn load_model(&self, model: FaceModel) -> Result<(), FaceClientError> {
        let url = self.endpoint("load-model");
        let response = self
            .http_client
            .post(url)
            .json(&LoadModelRequest { model })
            .send()
            .await
            .map_err(|e| self.request_error(e))?;
        check_status(response).await?;
        Ok(())
    }

    /// Reports the status of the inference service. Never fails, an unreachable service is
    /// reported as not ok.
    pub async fn health(&self) -> FaceServiceHealth {
        let mut health = FaceServiceHealth::default();
        let url = self.endpoint("health");

        let body = match self.http_client.get(url).send().await {
            Ok(response) => response.json::<Value>().await,
            Err(e) => {
                warn!("Face service health check failed: {}", e);
                return health;
            }
        };

        if let Ok(Value::Object(map)) = body {
            health.ok = map.get("ok").and_then(Value::as_bool).unwrap_or(false);
            health.models_loaded = map
                .get("modelsLoaded")
                .and_then(Value::as_bool)
                .unwrap_or(false);
            if let Some(model) = map.get("model").and_then(Value::as_str) {
                health.model = Some(model.to_string());
            }
            if let Some(commit) = map.get("commit").and_then(Value::as_str) {
                health.commit = commit.to_string();
            }
        }
        health
    }
}

/// Converts a non-2xx response into [`FaceClientError::Upstream`], using the `detail` or `error`
/// field of a JSON body as the message when there is one.
async fn check_status(response: Response) -> Result<Response, FaceClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<Value>(&text)
        .ok()
        .and_then(|body| {
            ["detail", "error"]
                .iter()
                .find_map(|key| body.get(*key).and_then(Value::as_str).map(str::to_string))
        })
        .unwrap_or_else(|| {
            if text.is_empty() {
                "face service error".to_string()
            } else {
                text
            }
        });

    Err(FaceClientError::Upstream { status, message })
}

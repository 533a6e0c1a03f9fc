use std::time::Duration;

use url::Url;

use crate::types::{AckResponse, GenerateResponse, OutlineResponse};
use crate::{ActionKind, ApiError, GenerateRequest, StatusReport};

/// Header carrying the page-level CSRF token, expected by every POST.
pub const CSRF_HEADER: &str = "X-CSRFToken";

#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub base_url: Url,
    pub csrf_token: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl ClientSettings {
    pub fn new(base_url: Url, csrf_token: impl Into<String>) -> Self {
        Self {
            base_url,
            csrf_token: csrf_token.into(),
            connect_timeout: Duration::from_secs(10),
            // The backend itself gives a generation call 60 seconds.
            request_timeout: Duration::from_secs(90),
        }
    }
}

/// The backend seam. Production uses [`HttpApi`]; tests drive the runtime
/// against a mock server or a scripted implementation.
#[async_trait::async_trait]
pub trait GenerationApi: Send + Sync {
    async fn generate(
        &self,
        action: ActionKind,
        request: &GenerateRequest,
    ) -> Result<String, ApiError>;

    async fn status(&self) -> Result<StatusReport, ApiError>;

    async fn stop(&self) -> Result<(), ApiError>;

    async fn parse_outline(&self, outline_text: &str) -> Result<u64, ApiError>;
}

#[derive(Debug, Clone)]
pub struct HttpApi {
    client: reqwest::Client,
    settings: ClientSettings,
}

impl HttpApi {
    pub fn new(settings: ClientSettings) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| ApiError::Network(err.to_string()))?;
        Ok(Self { client, settings })
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.settings
            .base_url
            .join(path)
            .map_err(|err| ApiError::InvalidEndpoint(err.to_string()))
    }

    async fn post(
        &self,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<reqwest::Response, ApiError> {
        let url = self.endpoint(path)?;
        let mut builder = self
            .client
            .post(url)
            .header(CSRF_HEADER, &self.settings.csrf_token);
        if let Some(body) = body {
            builder = builder.json(body);
        }
        builder.send().await.map_err(map_reqwest_error)
    }
}

#[async_trait::async_trait]
impl GenerationApi for HttpApi {
    async fn generate(
        &self,
        action: ActionKind,
        request: &GenerateRequest,
    ) -> Result<String, ApiError> {
        let url = self.endpoint(action.endpoint())?;
        let response = self
            .client
            .post(url)
            .header(CSRF_HEADER, &self.settings.csrf_token)
            .json(request)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        // Validation failures come back as non-2xx with the same JSON
        // envelope, so the body is tried before the status code.
        let status = response.status();
        let body: GenerateResponse = match response.json().await {
            Ok(body) => body,
            Err(_) if !status.is_success() => {
                return Err(ApiError::HttpStatus(status.as_u16()));
            }
            Err(err) => return Err(ApiError::InvalidResponse(err.to_string())),
        };

        if !body.success {
            return Err(ApiError::Rejected {
                message: body.message,
            });
        }
        body.content_for(action).ok_or_else(|| {
            ApiError::InvalidResponse(format!("missing `{}` field", action.response_field()))
        })
    }

    async fn status(&self) -> Result<StatusReport, ApiError> {
        let url = self.endpoint("status")?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::HttpStatus(status.as_u16()));
        }
        response
            .json()
            .await
            .map_err(|err| ApiError::InvalidResponse(err.to_string()))
    }

    async fn stop(&self) -> Result<(), ApiError> {
        let response = self.post("stop", None).await?;
        let status = response.status();
        let body: AckResponse = match response.json().await {
            Ok(body) => body,
            Err(_) if !status.is_success() => {
                return Err(ApiError::HttpStatus(status.as_u16()));
            }
            Err(err) => return Err(ApiError::InvalidResponse(err.to_string())),
        };
        if body.success {
            Ok(())
        } else {
            Err(ApiError::Rejected {
                message: body.message,
            })
        }
    }

    async fn parse_outline(&self, outline_text: &str) -> Result<u64, ApiError> {
        let body = serde_json::json!({ "outline_text": outline_text });
        let response = self.post("parse_outline", Some(&body)).await?;
        let status = response.status();
        let body: OutlineResponse = match response.json().await {
            Ok(body) => body,
            Err(_) if !status.is_success() => {
                return Err(ApiError::HttpStatus(status.as_u16()));
            }
            Err(err) => return Err(ApiError::InvalidResponse(err.to_string())),
        };
        if !body.success {
            return Err(ApiError::Rejected {
                message: body.error,
            });
        }
        body.section_count
            .ok_or_else(|| ApiError::InvalidResponse("missing `section_count` field".to_string()))
    }
}

fn map_reqwest_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        return ApiError::Timeout;
    }
    if err.is_decode() {
        return ApiError::InvalidResponse(err.to_string());
    }
    ApiError::Network(err.to_string())
}

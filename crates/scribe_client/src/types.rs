use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type Epoch = u64;

/// One generation endpoint on the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    AbstractCn,
    KeywordsCn,
    AbstractEn,
    KeywordsEn,
    Body,
    References,
    Acknowledgement,
}

impl ActionKind {
    /// Endpoint path relative to the base URL.
    pub fn endpoint(self) -> &'static str {
        match self {
            ActionKind::AbstractCn => "generate_abstract_cn",
            ActionKind::KeywordsCn => "generate_keywords_cn",
            ActionKind::AbstractEn => "generate_abstract_en",
            ActionKind::KeywordsEn => "generate_keywords_en",
            ActionKind::Body => "generate_paper_body",
            ActionKind::References => "generate_references",
            ActionKind::Acknowledgement => "generate_acknowledgement",
        }
    }

    /// Name of the response field carrying the generated content.
    pub fn response_field(self) -> &'static str {
        match self {
            ActionKind::AbstractCn => "abstract_cn",
            ActionKind::KeywordsCn => "keywords_cn",
            ActionKind::AbstractEn => "abstract_en",
            ActionKind::KeywordsEn => "keywords_en",
            ActionKind::Body => "body",
            ActionKind::References => "references",
            ActionKind::Acknowledgement => "acknowledgement",
        }
    }
}

/// JSON body for a generation request. Fields an action does not use are
/// omitted from the wire form.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct GenerateRequest {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outline: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub abstract_cn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keywords_cn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub word_count: Option<u32>,
    pub subject: String,
    pub education_level: String,
    pub custom_prompt: String,
}

/// Envelope shared by all generation endpoints: `success`, an optional
/// `message`, and one content field named after the action.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct GenerateResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(flatten)]
    pub fields: BTreeMap<String, serde_json::Value>,
}

impl GenerateResponse {
    pub(crate) fn content_for(&self, action: ActionKind) -> Option<String> {
        self.fields
            .get(action.response_field())
            .and_then(|value| value.as_str().map(ToOwned::to_owned))
    }
}

/// One observation of the backend's generation status.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StatusReport {
    /// Completion fraction in `0.0..=1.0`.
    pub progress: f64,
    #[serde(default)]
    pub current_section: String,
    #[serde(default)]
    pub content: Option<String>,
    pub in_progress: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct AckResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct OutlineResponse {
    pub success: bool,
    #[serde(default)]
    pub section_count: Option<u64>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Why a call against the generation backend failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The server answered with `success == false`.
    #[error("rejected by server: {}", message.as_deref().unwrap_or("unknown error"))]
    Rejected { message: Option<String> },
    #[error("http status {0}")]
    HttpStatus(u16),
    #[error("timeout")]
    Timeout,
    #[error("network error: {0}")]
    Network(String),
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl ApiError {
    /// Rejections come from the server's own answer; everything else means
    /// the request never produced a usable response.
    pub fn is_transport(&self) -> bool {
        !matches!(self, ApiError::Rejected { .. })
    }
}

/// Outcome of one executed command, delivered back to the driving loop.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    GenerateFinished {
        epoch: Epoch,
        action: ActionKind,
        result: Result<String, ApiError>,
    },
    StatusReported {
        epoch: Epoch,
        report: StatusReport,
    },
    /// A status tick failed; the poll loop has already stopped.
    PollFailed {
        epoch: Epoch,
        error: ApiError,
    },
    StopFinished {
        result: Result<(), ApiError>,
    },
    OutlineParsed {
        result: Result<u64, ApiError>,
    },
}

#[cfg(test)]
mod tests {
    use super::{ActionKind, GenerateRequest, GenerateResponse, StatusReport};

    #[test]
    fn generate_response_extracts_the_action_field() {
        let body: GenerateResponse =
            serde_json::from_str(r#"{"success": true, "abstract_cn": "an abstract"}"#).unwrap();
        assert!(body.success);
        assert_eq!(
            body.content_for(ActionKind::AbstractCn).as_deref(),
            Some("an abstract")
        );
        assert_eq!(body.content_for(ActionKind::Body), None);
    }

    #[test]
    fn status_report_tolerates_missing_optionals() {
        let report: StatusReport =
            serde_json::from_str(r#"{"progress": 0.25, "in_progress": true}"#).unwrap();
        assert_eq!(report.progress, 0.25);
        assert_eq!(report.current_section, "");
        assert_eq!(report.content, None);
    }

    #[test]
    fn unused_request_fields_are_omitted_from_the_wire_form() {
        let request = GenerateRequest {
            title: "T".to_string(),
            ..GenerateRequest::default()
        };
        let wire = serde_json::to_string(&request).unwrap();
        assert!(!wire.contains("outline"));
        assert!(!wire.contains("word_count"));
        assert!(wire.contains("\"title\":\"T\""));
    }
}

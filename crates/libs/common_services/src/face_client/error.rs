use reqwest::StatusCode;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FaceClientError {
    #[error("Invalid face service URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Face service did not answer within {0:?}")]
    Timeout(Duration),

    #[error("Face service request failed: {0}")]
    Request(reqwest::Error),

    #[error("Face service returned {status}: {message}")]
    Upstream { status: StatusCode, message: String },

    #[error("Malformed face service response: {0}")]
    MalformedResponse(String),

    #[error("No face detected")]
    NoFace,

    #[error("Multiple faces detected ({0})")]
    MultipleFaces(u32),

    #[error("Face service returned an empty embedding")]
    EmptyEmbedding,
}

impl FaceClientError {
    /// The service could not be reached at all, as opposed to rejecting the image.
    #[must_use]
    pub fn is_unreachable(&self) -> bool {
        match self {
            Self::Request(e) => e.is_connect(),
            _ => false,
        }
    }
}

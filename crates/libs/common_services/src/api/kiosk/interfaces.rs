use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

// --- Request Payloads ---

#[derive(Deserialize, ToSchema, Debug)]
pub struct PinLookupRequest {
    pub pin: String,
}

#[derive(Deserialize, ToSchema, Debug)]
#[serde(rename_all = "camelCase")]
pub struct FaceMatchRequest {
    pub pin: String,
    /// Base64 image or data URL of the face in front of the kiosk.
    pub face_image: String,
}

// --- Response Payloads ---

#[derive(Serialize, ToSchema, Debug, PartialEq, Eq)]
#[serde(untagged)]
pub enum PinLookupResponse {
    Eligible { ok: bool, eligible: bool },
    NotRecognized { ok: bool, error: String },
}

impl PinLookupResponse {
    #[must_use]
    pub const fn eligible() -> Self {
        Self::Eligible {
            ok: true,
            eligible: true,
        }
    }

    #[must_use]
    pub fn not_recognized() -> Self {
        Self::NotRecognized {
            ok: false,
            error: "PIN not recognized".to_string(),
        }
    }
}

#[derive(Serialize, ToSchema, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MatchCandidate {
    pub customer_id: Uuid,
    pub name: String,
    /// The closest stored capture of this customer.
    pub image_path: String,
    pub distance: f32,
}

#[derive(Serialize, ToSchema, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NoMatchReason {
    NoCustomers,
    NoFaces,
    NoMatch,
}

#[derive(Serialize, ToSchema, Debug, PartialEq)]
#[serde(untagged)]
pub enum FaceMatchResponse {
    Matched {
        ok: bool,
        threshold: f32,
        matches: Vec<MatchCandidate>,
    },
    Unmatched {
        ok: bool,
        error: String,
        reason: NoMatchReason,
        #[serde(skip_serializing_if = "Option::is_none")]
        threshold: Option<f32>,
        #[serde(skip_serializing_if = "Option::is_none")]
        candidates: Option<Vec<MatchCandidate>>,
    },
}

impl FaceMatchResponse {
    pub(crate) fn unmatched(reason: NoMatchReason) -> Self {
        let error = match reason {
            NoMatchReason::NoCustomers => "No customers found for pin",
            NoMatchReason::NoFaces => "No faces found for pin",
            NoMatchReason::NoMatch => "No matches found",
        };
        Self::Unmatched {
            ok: false,
            error: error.to_string(),
            reason,
            threshold: None,
            candidates: None,
        }
    }
}

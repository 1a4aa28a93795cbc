//! Decoding of captured face images and naming of the files they are stored in.
//!
//! Captures arrive either as raw base64 or as a `data:<mime>;base64,<payload>` URL.
//! Nothing in here touches the disk.

use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use thiserror::Error;
use uuid::Uuid;

/// Placeholder used when a name has no characters that survive sanitizing.
pub const FALLBACK_NAME: &str = "customer";

/// Standard alphabet, padding optional. Browsers and python clients disagree on padding.
const LENIENT_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

#[derive(Debug, Error)]
pub enum ImageCodecError {
    #[error("data URL has no payload separator")]
    MalformedDataUrl,

    #[error("data URL is not base64 encoded: {0}")]
    UnsupportedEncoding(String),

    #[error("invalid base64 payload: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    #[error("image payload is empty")]
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub bytes: Vec<u8>,
    /// File extension without the dot: `jpg`, `png` or `webp`.
    pub extension: &'static str,
}

/// Decodes a raw base64 string or a base64 data URL into image bytes.
pub fn decode_image(encoded: &str) -> Result<DecodedImage, ImageCodecError> {
    let encoded = encoded.trim();
    let (payload, extension) = match encoded.strip_prefix("data:") {
        Some(rest) => {
            let (meta, payload) = rest
                .split_once(',')
                .ok_or(ImageCodecError::MalformedDataUrl)?;
            let Some(mime) = meta.strip_suffix(";base64") else {
                return Err(ImageCodecError::UnsupportedEncoding(meta.to_string()));
            };
            (payload, extension_for_mime(mime))
        }
        None => (encoded, "jpg"),
    };

    // Clients sometimes wrap long base64 lines.
    let compact: String = payload
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    if compact.is_empty() {
        return Err(ImageCodecError::Empty);
    }

    let bytes = LENIENT_BASE64.decode(compact.as_bytes())?;
    if bytes.is_empty() {
        return Err(ImageCodecError::Empty);
    }

    Ok(DecodedImage { bytes, extension })
}

fn extension_for_mime(mime: &str) -> &'static str {
    let mime = mime.to_ascii_lowercase();
    if mime.contains("png") {
        "png"
    } else if mime.contains("webp") {
        "webp"
    } else {
        "jpg"
    }
}

/// Returns the base64 payload of a data URL, or the input when it is not one.
#[must_use]
pub fn strip_data_url_prefix(encoded: &str) -> &str {
    let encoded = encoded.trim();
    if encoded.starts_with("data:") {
        encoded
            .split_once(',')
            .map_or(encoded, |(_, payload)| payload)
    } else {
        encoded
    }
}

/// Makes a free-text name safe to embed in a file name.
///
/// Lowercases, replaces everything outside `[a-z0-9_-]` with `-`, collapses dash runs and trims
/// dashes from both ends. Never returns an empty string.
#[must_use]
pub fn sanitize_name(name: &str) -> String {
    let mut sanitized = String::with_capacity(name.len());
    for c in name.trim().chars().flat_map(char::to_lowercase) {
        let c = if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' {
            c
        } else {
            '-'
        };
        if c == '-' && sanitized.ends_with('-') {
            continue;
        }
        sanitized.push(c);
    }

    let trimmed = sanitized.trim_matches('-');
    if trimmed.is_empty() {
        FALLBACK_NAME.to_string()
    } else {
        trimmed.to_string()
    }
}

/// File name for one stored capture.
///
/// `customer-<sanitizedName>-<customerId>-<index + 1>-<timestamp>.<ext>`. The customer id has a
/// fixed width and the trailing fields are plain numbers, so distinct (id, index, timestamp)
/// triples always give distinct names.
#[must_use]
pub fn capture_file_name(
    name: &str,
    customer_id: Uuid,
    index: usize,
    timestamp_ms: i64,
    extension: &str,
) -> String {
    format!(
        "customer-{}-{}-{}-{}.{}",
        sanitize_name(name),
        customer_id.hyphenated(),
        index + 1,
        timestamp_ms,
        extension
    )
}

/// Whether a file name looks like something [`capture_file_name`] produced.
#[must_use]
pub fn is_capture_file_name(file_name: &str) -> bool {
    let Some((stem, extension)) = file_name.rsplit_once('.') else {
        return false;
    };
    file_name.starts_with("customer-")
        && stem.len() > "customer-".len()
        && matches!(extension, "jpg" | "png" | "webp")
}

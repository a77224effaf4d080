//! Base64 data-URL images, as sent by clients for recipe pictures and avatars.
//!
//! The declared MIME type is only used to recognise the value as an image
//! upload. The stored format is sniffed from the decoded bytes, which must
//! decode as PNG, JPEG, GIF or WebP.

use base64::{Engine as _, engine::general_purpose::STANDARD};
use image::ImageFormat;

use crate::{AppError, AppResult};

/// A decoded `data:image/<format>;base64,<payload>` value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUrlImage {
    /// MIME type of the detected format, e.g. `image/png`.
    pub content_type: String,
    /// File extension of the detected format.
    pub extension: String,
    /// Raw image bytes.
    pub bytes: Vec<u8>,
}

impl DataUrlImage {
    /// Parse a data URL. `field` names the request field for error reporting.
    pub fn parse(field: &str, value: &str) -> AppResult<Self> {
        let invalid = |msg: &str| AppError::field(field, msg);

        let rest = value
            .strip_prefix("data:")
            .ok_or_else(|| invalid("Expected a base64 data URL"))?;
        let (meta, payload) = rest
            .split_once(',')
            .ok_or_else(|| invalid("Expected a base64 data URL"))?;
        let declared = meta
            .strip_suffix(";base64")
            .ok_or_else(|| invalid("Only base64-encoded images are accepted"))?;
        if declared.strip_prefix("image/").is_none_or(str::is_empty) {
            return Err(invalid("Upload a valid image"));
        }

        let bytes = STANDARD
            .decode(payload.trim())
            .map_err(|_| invalid("Image payload is not valid base64"))?;
        if bytes.is_empty() {
            return Err(invalid("The submitted image is empty"));
        }

        let format = detect_format(&bytes).ok_or_else(|| {
            invalid("Upload a valid image. The file you uploaded was either not an image or a corrupted image.")
        })?;

        Ok(Self {
            content_type: format.to_mime_type().to_string(),
            extension: extension_for(format).to_string(),
            bytes,
        })
    }
}

/// Sniff the format from the magic bytes and make sure the payload decodes.
fn detect_format(bytes: &[u8]) -> Option<ImageFormat> {
    let format = image::guess_format(bytes).ok()?;
    if !matches!(
        format,
        ImageFormat::Png | ImageFormat::Jpeg | ImageFormat::Gif | ImageFormat::WebP
    ) {
        return None;
    }
    image::load_from_memory_with_format(bytes, format).ok()?;
    Some(format)
}

const fn extension_for(format: ImageFormat) -> &'static str {
    match format {
        ImageFormat::Jpeg => "jpg",
        ImageFormat::Gif => "gif",
        ImageFormat::WebP => "webp",
        _ => "png",
    }
}

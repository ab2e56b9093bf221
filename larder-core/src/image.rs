//! Image validation for recipe uploads.
//!
//! Format is sniffed from the bytes (never trusted from the filename or the
//! declared content type) and the image is fully decoded, so truncated or
//! disguised files are rejected before anything is written to storage.

use std::io::Cursor;

use image::{ImageFormat, ImageReader};

use crate::error::ImageError;

/// Allowed image formats for recipe images.
pub const ALLOWED_FORMATS: &[ImageFormat] = &[
    ImageFormat::Jpeg,
    ImageFormat::Png,
    ImageFormat::Gif,
    ImageFormat::WebP,
];

/// Maximum upload size (10MB).
pub const MAX_FILE_SIZE: usize = 10 * 1024 * 1024;

/// An upload that decoded successfully.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatedImage {
    pub format: ImageFormat,
    pub width: u32,
    pub height: u32,
}

impl ValidatedImage {
    /// MIME type, e.g. `image/png`.
    pub fn content_type(&self) -> &'static str {
        self.format.to_mime_type()
    }

    /// File extension used when storing the upload.
    pub fn extension(&self) -> &'static str {
        match self.format {
            ImageFormat::Jpeg => "jpg",
            ImageFormat::Png => "png",
            ImageFormat::Gif => "gif",
            ImageFormat::WebP => "webp",
            other => other.extensions_str().first().copied().unwrap_or("img"),
        }
    }
}

/// Validate image data: size limit, allowed format, and a full decode.
pub fn validate_image(data: &[u8]) -> Result<ValidatedImage, ImageError> {
    if data.len() > MAX_FILE_SIZE {
        return Err(ImageError::TooLarge {
            size: data.len(),
            max: MAX_FILE_SIZE,
        });
    }

    let reader = ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| ImageError::Unreadable(e.to_string()))?;

    let format = reader.format().ok_or(ImageError::UnknownFormat)?;

    if !ALLOWED_FORMATS.contains(&format) {
        return Err(ImageError::Unsupported(format));
    }

    let img = reader
        .decode()
        .map_err(|e| ImageError::Decode(e.to_string()))?;

    Ok(ValidatedImage {
        format,
        width: img.width(),
        height: img.height(),
    })
}

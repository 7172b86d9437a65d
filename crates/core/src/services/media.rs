//! Image validation for post attachments.

use std::io::Cursor;

use serde::{Deserialize, Serialize};
use yatube_common::{AppError, AppResult};

/// Supported image formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    /// JPEG format
    Jpeg,
    /// PNG format
    Png,
    /// WebP format
    WebP,
    /// GIF format
    Gif,
}

impl ImageFormat {
    /// Get MIME type for this format.
    #[must_use]
    pub const fn mime_type(&self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::WebP => "image/webp",
            Self::Gif => "image/gif",
        }
    }

    /// Get file extension for this format.
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::WebP => "webp",
            Self::Gif => "gif",
        }
    }

    const fn from_image(format: image::ImageFormat) -> Option<Self> {
        match format {
            image::ImageFormat::Jpeg => Some(Self::Jpeg),
            image::ImageFormat::Png => Some(Self::Png),
            image::ImageFormat::WebP => Some(Self::WebP),
            image::ImageFormat::Gif => Some(Self::Gif),
            _ => None,
        }
    }
}

/// What an uploaded image turned out to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ImageInfo {
    pub format: ImageFormat,
    pub width: u32,
    pub height: u32,
}

/// Validates uploaded images.
#[derive(Debug, Clone)]
pub struct MediaService {
    max_upload_bytes: usize,
}

impl MediaService {
    /// Create a new media service.
    #[must_use]
    pub const fn new(max_upload_bytes: usize) -> Self {
        Self { max_upload_bytes }
    }

    /// Check that `data` fully decodes as an image in a supported format.
    pub fn inspect_image(&self, data: &[u8]) -> AppResult<ImageInfo> {
        if data.is_empty() {
            return Err(AppError::Validation("The submitted file is empty.".to_string()));
        }
        if data.len() > self.max_upload_bytes {
            return Err(AppError::Validation(format!(
                "The image is larger than {} bytes.",
                self.max_upload_bytes
            )));
        }

        let invalid = || {
            AppError::Validation(
                "Upload a valid image. The file you uploaded was either not an image or a corrupted image."
                    .to_string(),
            )
        };

        let format = image::guess_format(data)
            .ok()
            .and_then(ImageFormat::from_image)
            .ok_or_else(invalid)?;

        // Decode every pixel, a readable header alone is not enough
        let decoded = image::ImageReader::new(Cursor::new(data))
            .with_guessed_format()
            .map_err(|_| invalid())?
            .decode()
            .map_err(|_| invalid())?;
        let (width, height) = (decoded.width(), decoded.height());

        if width == 0 || height == 0 {
            return Err(invalid());
        }

        Ok(ImageInfo {
            format,
            width,
            height,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    /// A 2x1 GIF.
    const SMALL_GIF: &[u8] = b"\x47\x49\x46\x38\x39\x61\x02\x00\
        \x01\x00\x80\x00\x00\x00\x00\x00\
        \xFF\xFF\xFF\x21\xF9\x04\x00\x00\
        \x00\x00\x00\x2C\x00\x00\x00\x00\
        \x02\x00\x01\x00\x00\x02\x02\x0C\
        \x0A\x00\x3B";

    #[test]
    fn test_inspect_small_gif() {
        let info = MediaService::new(1024).inspect_image(SMALL_GIF).unwrap();
        assert_eq!(info.format, ImageFormat::Gif);
        assert_eq!((info.width, info.height), (2, 1));
        assert_eq!(info.format.extension(), "gif");
        assert_eq!(info.format.mime_type(), "image/gif");
    }

    #[test]
    fn test_rejects_non_image() {
        let result = MediaService::new(1024).inspect_image(b"definitely not an image");
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn test_rejects_truncated_header() {
        let result = MediaService::new(1024).inspect_image(&SMALL_GIF[..8]);
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_missing_pixel_data() {
        // Header and frame descriptor intact, image data cut off
        let corrupt = &SMALL_GIF[..SMALL_GIF.len() - 4];
        let result = MediaService::new(1024).inspect_image(corrupt);
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn test_rejects_empty_and_oversized() {
        let service = MediaService::new(16);
        assert!(service.inspect_image(&[]).is_err());
        assert!(service.inspect_image(SMALL_GIF).is_err());
    }
}

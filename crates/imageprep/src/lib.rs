//! Client-side image preprocessing for uploads.
//!
//! Reduces an arbitrarily large user-selected image to a bounded width
//! before it is attached to a multipart upload, to control bandwidth
//! and server storage cost. Compression is best-effort: when anything
//! fails, the caller uploads the original file unchanged rather than
//! blocking the user's action.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::{GenericImageView, ImageFormat};

/// Tunable parameters for upload preprocessing.
#[derive(Debug, Clone)]
pub struct ImagePrepConfig {
    /// Maximum output width in pixels. Wider inputs are scaled down;
    /// narrower inputs are never scaled up.
    pub max_width: u32,
    /// JPEG re-encode quality (1-100).
    pub jpeg_quality: u8,
}

impl Default for ImagePrepConfig {
    fn default() -> Self {
        Self {
            max_width: 1024,
            jpeg_quality: 80,
        }
    }
}

/// A user-selected image file: declared name, MIME type, and bytes.
#[derive(Debug, Clone, PartialEq)]
pub struct RawImage {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// Errors from the preprocessing pipeline.
#[derive(Debug, thiserror::Error)]
pub enum ImagePrepError {
    /// The declared MIME type is not one we can re-encode.
    #[error("Unsupported image MIME type: {0}")]
    UnsupportedMime(String),

    /// Decoding or re-encoding failed.
    #[error("Image processing failed: {0}")]
    Image(#[from] image::ImageError),
}

/// Map a declared MIME type to a decodable/encodable format.
fn format_for_mime(mime_type: &str) -> Option<ImageFormat> {
    match mime_type {
        "image/jpeg" | "image/jpg" => Some(ImageFormat::Jpeg),
        "image/png" => Some(ImageFormat::Png),
        "image/webp" => Some(ImageFormat::WebP),
        _ => None,
    }
}

/// Re-encode an image so its width does not exceed `max_width`.
///
/// Aspect ratio is preserved (height rounds to the nearest pixel) and
/// the output keeps the input's declared MIME type. An input already
/// within bounds is returned unchanged -- never upscaled, never
/// pointlessly re-encoded.
pub fn compress(raw: &RawImage, config: &ImagePrepConfig) -> Result<RawImage, ImagePrepError> {
    let format = format_for_mime(&raw.mime_type)
        .ok_or_else(|| ImagePrepError::UnsupportedMime(raw.mime_type.clone()))?;

    let decoded = image::load_from_memory_with_format(&raw.bytes, format)?;
    let (width, height) = decoded.dimensions();

    if width <= config.max_width {
        return Ok(raw.clone());
    }

    let scale = config.max_width as f64 / width as f64;
    let new_height = ((height as f64 * scale).round() as u32).max(1);
    let resized = decoded.resize_exact(
        config.max_width,
        new_height,
        image::imageops::FilterType::Lanczos3,
    );

    let mut bytes = Vec::new();
    match format {
        ImageFormat::Jpeg => {
            let encoder = JpegEncoder::new_with_quality(&mut bytes, config.jpeg_quality);
            resized.write_with_encoder(encoder)?;
        }
        _ => {
            resized.write_to(&mut Cursor::new(&mut bytes), format)?;
        }
    }

    tracing::debug!(
        file = %raw.file_name,
        from = width,
        to = config.max_width,
        "compressed image for upload"
    );

    Ok(RawImage {
        file_name: raw.file_name.clone(),
        mime_type: raw.mime_type.clone(),
        bytes,
    })
}

/// Best-effort preprocessing: on any failure the original file comes
/// back unchanged so the upload is never blocked.
pub fn prepare(raw: RawImage, config: &ImagePrepConfig) -> RawImage {
    match compress(&raw, config) {
        Ok(prepared) => prepared,
        Err(error) => {
            tracing::warn!(
                file = %raw.file_name,
                %error,
                "image preprocessing failed; uploading original"
            );
            raw
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, Rgb, RgbImage};

    fn png_image(width: u32, height: u32) -> RawImage {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([10, 120, 200])));
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        RawImage {
            file_name: "test.png".into(),
            mime_type: "image/png".into(),
            bytes,
        }
    }

    fn decoded_dimensions(raw: &RawImage) -> (u32, u32) {
        image::load_from_memory(&raw.bytes).unwrap().dimensions()
    }

    #[test]
    fn wide_input_is_scaled_to_max_width() {
        let raw = png_image(2000, 1000);
        let config = ImagePrepConfig {
            max_width: 800,
            ..Default::default()
        };

        let out = compress(&raw, &config).unwrap();
        assert_eq!(decoded_dimensions(&out), (800, 400));
        assert_eq!(out.mime_type, "image/png");
    }

    #[test]
    fn aspect_ratio_rounds_to_nearest_pixel() {
        // 1000x333 at max 500 -> 500x167 (166.5 rounds up).
        let raw = png_image(1000, 333);
        let config = ImagePrepConfig {
            max_width: 500,
            ..Default::default()
        };

        let out = compress(&raw, &config).unwrap();
        assert_eq!(decoded_dimensions(&out), (500, 167));
    }

    #[test]
    fn narrow_input_is_never_upscaled() {
        let raw = png_image(500, 300);
        let config = ImagePrepConfig {
            max_width: 1024,
            ..Default::default()
        };

        let out = compress(&raw, &config).unwrap();
        // Returned unchanged, not re-encoded.
        assert_eq!(out, raw);
    }

    #[test]
    fn jpeg_keeps_declared_mime() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(1200, 600, Rgb([50, 50, 50])));
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Jpeg)
            .unwrap();
        let raw = RawImage {
            file_name: "photo.jpg".into(),
            mime_type: "image/jpeg".into(),
            bytes,
        };

        let out = compress(&raw, &ImagePrepConfig::default()).unwrap();
        assert_eq!(out.mime_type, "image/jpeg");
        assert_eq!(decoded_dimensions(&out).0, 1024);
    }

    #[test]
    fn unsupported_mime_is_an_error() {
        let raw = RawImage {
            file_name: "doc.gif".into(),
            mime_type: "image/gif".into(),
            bytes: vec![0; 16],
        };
        let err = compress(&raw, &ImagePrepConfig::default()).unwrap_err();
        assert!(matches!(err, ImagePrepError::UnsupportedMime(_)));
    }

    #[test]
    fn prepare_falls_back_to_original_on_failure() {
        let raw = RawImage {
            file_name: "broken.png".into(),
            mime_type: "image/png".into(),
            bytes: vec![1, 2, 3, 4],
        };

        let out = prepare(raw.clone(), &ImagePrepConfig::default());
        assert_eq!(out, raw);
    }
}

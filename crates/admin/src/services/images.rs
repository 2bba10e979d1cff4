//! Image preparation before upload.
//!
//! Images whose long edge exceeds the listing bound are downsampled and
//! re-encoded as JPEG. Everything else is uploaded byte-for-byte.

use std::io::Cursor;
use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};
use tracing::{debug, warn};

use teslix_core::images::{JPEG_QUALITY, scaled_dimensions};

/// One file of an upload batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    #[must_use]
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    /// Size in bytes.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    fn is_image(&self) -> bool {
        self.content_type.starts_with("image/")
    }
}

/// Downsample and re-encode an oversized image.
///
/// Non-image content, undecodable images and images within bounds are
/// returned unchanged.
#[must_use]
pub fn prepare_for_upload(file: UploadFile) -> UploadFile {
    if !file.is_image() {
        return file;
    }

    let decoded = match image::load_from_memory(&file.bytes) {
        Ok(decoded) => decoded,
        Err(e) => {
            debug!(file = %file.file_name, error = %e, "Undecodable image, uploading as is");
            return file;
        }
    };

    let (width, height) = decoded.dimensions();
    let Some((target_width, target_height)) = scaled_dimensions(width, height) else {
        return file;
    };

    match encode_jpeg(&decoded, target_width, target_height) {
        Ok(bytes) => {
            debug!(
                file = %file.file_name,
                from = %format!("{width}x{height}"),
                to = %format!("{target_width}x{target_height}"),
                "Image downsampled"
            );
            UploadFile {
                file_name: jpeg_name(&file.file_name),
                content_type: "image/jpeg".to_string(),
                bytes,
            }
        }
        Err(e) => {
            warn!(file = %file.file_name, error = %e, "Re-encoding failed, uploading original");
            file
        }
    }
}

fn encode_jpeg(image: &DynamicImage, width: u32, height: u32) -> image::ImageResult<Vec<u8>> {
    let resized = image.resize_exact(width, height, FilterType::Triangle);
    let rgb = DynamicImage::ImageRgb8(resized.to_rgb8());

    let mut out = Cursor::new(Vec::new());
    rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut out, JPEG_QUALITY))?;
    Ok(out.into_inner())
}

fn jpeg_name(file_name: &str) -> String {
    Path::new(file_name)
        .with_extension("jpg")
        .to_string_lossy()
        .into_owned()
}

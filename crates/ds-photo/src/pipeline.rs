// pipeline.rs — PhotoPipeline: decode, downsample, re-encode as a data URL.
//
// Progress photos straight off a phone camera are several megabytes. Durable
// storage has a practical ceiling (see ds-storage's DEFAULT_MAX_VALUE_BYTES),
// so every photo is shrunk to fit a bounding box and re-encoded as a
// moderate-quality JPEG before it is attached to a goal.
//
// Decoding and resampling are CPU-bound, so they run on tokio's blocking
// pool. This is the only suspension point in the system: the caller awaits
// the result while other goal mutations keep running.

use std::path::Path;

use base64::Engine;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::GenericImageView;
use serde::{Deserialize, Serialize};

use crate::error::PhotoError;

const DATA_URL_PREFIX: &str = "data:image/jpeg;base64,";

/// Sizing and quality knobs for stored photos.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoConfig {
    /// Maximum stored width in pixels.
    #[serde(default = "default_max_dimension")]
    pub max_width: u32,

    /// Maximum stored height in pixels.
    #[serde(default = "default_max_dimension")]
    pub max_height: u32,

    /// JPEG quality, 1 (smallest) to 100 (best).
    #[serde(default = "default_quality")]
    pub quality: u8,
}

impl Default for PhotoConfig {
    fn default() -> Self {
        Self {
            max_width: default_max_dimension(),
            max_height: default_max_dimension(),
            quality: default_quality(),
        }
    }
}

fn default_max_dimension() -> u32 {
    800
}

fn default_quality() -> u8 {
    70
}

impl PhotoConfig {
    /// Clamp out-of-range values into something the encoder accepts.
    pub fn normalized(self) -> Self {
        Self {
            max_width: self.max_width.max(1),
            max_height: self.max_height.max(1),
            quality: self.quality.clamp(1, 100),
        }
    }
}

/// A photo re-encoded as a `data:image/jpeg;base64,...` URL.
///
/// Serializes as a plain string so it embeds directly in the goal JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EncodedImage(String);

impl EncodedImage {
    /// Wrap JPEG bytes as a data URL.
    pub fn from_jpeg(bytes: &[u8]) -> Self {
        let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
        Self(format!("{}{}", DATA_URL_PREFIX, encoded))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Size of the payload as stored, in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Recover the JPEG bytes from the data URL.
    pub fn decode_bytes(&self) -> Result<Vec<u8>, PhotoError> {
        let payload = self
            .0
            .strip_prefix(DATA_URL_PREFIX)
            .ok_or_else(|| PhotoError::MalformedPayload("missing jpeg data URL prefix".into()))?;
        base64::engine::general_purpose::STANDARD
            .decode(payload)
            .map_err(|e| PhotoError::MalformedPayload(e.to_string()))
    }
}

/// Turns user-supplied image files into bounded-size stored photos.
#[derive(Debug, Clone, Default)]
pub struct PhotoPipeline {
    config: PhotoConfig,
}

impl PhotoPipeline {
    pub fn new(config: PhotoConfig) -> Self {
        Self {
            config: config.normalized(),
        }
    }

    /// Downsample and re-encode raw image bytes.
    ///
    /// Suspends while the image is decoded and redrawn on the blocking pool.
    /// There is no timeout: a decode that never finishes leaves this future
    /// pending without blocking anything else.
    pub async fn resize(&self, bytes: Vec<u8>) -> Result<EncodedImage, PhotoError> {
        let config = self.config;
        tokio::task::spawn_blocking(move || downsample(&bytes, &config))
            .await
            .map_err(|e| PhotoError::TaskFailed(e.to_string()))?
    }

    /// Read an image file from disk and run it through [`resize`](Self::resize).
    pub async fn resize_file(&self, path: impl AsRef<Path>) -> Result<EncodedImage, PhotoError> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| PhotoError::IoError {
                path: path.to_path_buf(),
                source,
            })?;
        self.resize(bytes).await
    }
}

/// Synchronous core of the pipeline.
fn downsample(bytes: &[u8], config: &PhotoConfig) -> Result<EncodedImage, PhotoError> {
    let img = image::load_from_memory(bytes).map_err(PhotoError::ImageDecode)?;
    let (width, height) = img.dimensions();
    let (target_w, target_h) = fit_within(width, height, config.max_width, config.max_height);

    let img = if (target_w, target_h) == (width, height) {
        img
    } else {
        img.resize_exact(target_w, target_h, FilterType::Triangle)
    };

    // JPEG has no alpha channel.
    let rgb = img.to_rgb8();
    let mut jpeg = Vec::new();
    JpegEncoder::new_with_quality(&mut jpeg, config.quality)
        .encode_image(&rgb)
        .map_err(PhotoError::ImageEncode)?;

    tracing::debug!(
        from_width = width,
        from_height = height,
        to_width = target_w,
        to_height = target_h,
        input_bytes = bytes.len(),
        output_bytes = jpeg.len(),
        "downsampled photo"
    );

    Ok(EncodedImage::from_jpeg(&jpeg))
}

/// Scale `(width, height)` down to fit inside `(max_w, max_h)`, preserving
/// aspect ratio. Images already inside the box are returned unchanged.
pub fn fit_within(width: u32, height: u32, max_w: u32, max_h: u32) -> (u32, u32) {
    if width <= max_w && height <= max_h {
        return (width, height);
    }
    let scale = f64::min(
        f64::from(max_w) / f64::from(width),
        f64::from(max_h) / f64::from(height),
    );
    let w = ((f64::from(width) * scale).round() as u32).clamp(1, max_w);
    let h = ((f64::from(height) * scale).round() as u32).clamp(1, max_h);
    (w, h)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    use image::{DynamicImage, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([200, 40, 40])));
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageFormat::Png).unwrap();
        buf.into_inner()
    }

    fn decoded_dimensions(encoded: &EncodedImage) -> (u32, u32) {
        let jpeg = encoded.decode_bytes().unwrap();
        image::load_from_memory_with_format(&jpeg, ImageFormat::Jpeg)
            .unwrap()
            .dimensions()
    }

    #[test]
    fn fit_within_preserves_aspect_ratio() {
        assert_eq!(fit_within(1600, 800, 800, 800), (800, 400));
        assert_eq!(fit_within(600, 1200, 800, 800), (400, 800));
        assert_eq!(fit_within(4000, 3000, 800, 600), (800, 600));
    }

    #[test]
    fn fit_within_never_upscales() {
        assert_eq!(fit_within(320, 240, 800, 800), (320, 240));
        assert_eq!(fit_within(800, 800, 800, 800), (800, 800));
    }

    #[test]
    fn fit_within_keeps_at_least_one_pixel() {
        assert_eq!(fit_within(10_000, 1, 100, 100), (100, 1));
    }

    #[tokio::test]
    async fn resize_large_image_to_bounding_box() {
        let pipeline = PhotoPipeline::default();
        let encoded = pipeline.resize(png_bytes(1600, 800)).await.unwrap();

        assert!(encoded.as_str().starts_with("data:image/jpeg;base64,"));
        assert_eq!(decoded_dimensions(&encoded), (800, 400));
    }

    #[tokio::test]
    async fn resize_small_image_keeps_dimensions() {
        let pipeline = PhotoPipeline::default();
        let encoded = pipeline.resize(png_bytes(64, 48)).await.unwrap();
        assert_eq!(decoded_dimensions(&encoded), (64, 48));
    }

    #[tokio::test]
    async fn resize_flattens_alpha() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(20, 20, Rgba([0, 0, 255, 128])));
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageFormat::Png).unwrap();

        let encoded = PhotoPipeline::default()
            .resize(buf.into_inner())
            .await
            .unwrap();
        assert_eq!(decoded_dimensions(&encoded), (20, 20));
    }

    #[tokio::test]
    async fn resize_rejects_non_image_bytes() {
        let pipeline = PhotoPipeline::default();
        let err = pipeline
            .resize(b"definitely not an image".to_vec())
            .await
            .unwrap_err();
        assert!(matches!(err, PhotoError::ImageDecode(_)));
    }

    #[tokio::test]
    async fn resize_file_reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("progress.png");
        std::fs::write(&path, png_bytes(1000, 2000)).unwrap();

        let pipeline = PhotoPipeline::new(PhotoConfig {
            max_width: 300,
            max_height: 300,
            quality: 50,
        });
        let encoded = pipeline.resize_file(&path).await.unwrap();
        assert_eq!(decoded_dimensions(&encoded), (150, 300));
    }

    #[tokio::test]
    async fn resize_file_missing_path_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = PhotoPipeline::default()
            .resize_file(dir.path().join("nope.jpg"))
            .await
            .unwrap_err();
        assert!(matches!(err, PhotoError::IoError { .. }));
    }

    #[test]
    fn config_normalized_clamps_quality_and_dimensions() {
        let cfg = PhotoConfig {
            max_width: 0,
            max_height: 10,
            quality: 0,
        }
        .normalized();
        assert_eq!(cfg.max_width, 1);
        assert_eq!(cfg.quality, 1);

        let cfg = PhotoConfig {
            quality: 255,
            ..PhotoConfig::default()
        }
        .normalized();
        assert_eq!(cfg.quality, 100);
    }

    #[test]
    fn decode_bytes_rejects_foreign_payload() {
        let bogus: EncodedImage = serde_json::from_str("\"data:image/png;base64,AAAA\"").unwrap();
        assert!(matches!(
            bogus.decode_bytes(),
            Err(PhotoError::MalformedPayload(_))
        ));
    }
}

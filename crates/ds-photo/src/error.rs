// error.rs — Error types for the photo pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while turning an image file into a stored photo.
#[derive(Debug, Error)]
pub enum PhotoError {
    /// The input bytes are not a readable image.
    #[error("could not decode image: {0}")]
    ImageDecode(#[source] image::ImageError),

    /// Re-encoding the downsampled image failed.
    #[error("could not encode image: {0}")]
    ImageEncode(#[source] image::ImageError),

    /// Reading the source file failed.
    #[error("I/O error at {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The blocking decode task panicked or was torn down.
    #[error("photo task failed: {0}")]
    TaskFailed(String),

    /// A stored payload is not a base64 JPEG data URL.
    #[error("malformed photo payload: {0}")]
    MalformedPayload(String),
}

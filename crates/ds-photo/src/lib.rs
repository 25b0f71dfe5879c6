//! # ds-photo
//!
//! Progress photo pipeline for Daily Streak.
//!
//! Turns an arbitrary user-supplied image file into a small JPEG embedded as
//! a base64 data URL, suitable for storing alongside a goal.
//!
//! ## Key components
//!
//! - [`PhotoPipeline`] — async decode → downsample → re-encode
//! - [`PhotoConfig`] — bounding box and JPEG quality
//! - [`EncodedImage`] — the stored data-URL payload
//! - [`PhotoError`] — decode, encode, and I/O failures

pub mod error;
pub mod pipeline;

pub use error::PhotoError;
pub use pipeline::{fit_within, EncodedImage, PhotoConfig, PhotoPipeline};

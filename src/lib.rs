//! PSD (Photoshop document) reader, writer and compositor
//!
//! This crate parses layered PSD files into an owned document tree,
//! writes documents back out and renders RGBA buffers from the merged
//! image, single layers or layer masks.
//!
//! # Supported documents
//!
//! - Format version 1, bit depths 1, 8 and 16
//! - Bitmap, Grayscale, Indexed, RGB, CMYK, Multichannel, Duotone and
//!   Lab color modes
//! - Raw and RLE (PackBits) channel compression
//!
//! # Example
//!
//! ```ignore
//! use psdkit::{composite, PsdDocument};
//!
//! let data = std::fs::read("artwork.psd")?;
//! let document = PsdDocument::from_bytes(&data)?;
//!
//! for layer in &document.layers {
//!     println!(
//!         "Layer: {} ({}x{})",
//!         layer.name,
//!         layer.rect.width(),
//!         layer.rect.height()
//!     );
//! }
//!
//! let rgba = composite::document_rgba(&document)?;
//! ```

pub mod composite;
pub mod cursor;
pub mod document;
pub mod error;
pub mod info;
pub mod layer;
pub mod resources;
pub mod rle;
pub mod types;

pub use document::PsdDocument;
pub use error::PsdError;
pub use info::{DocumentInfo, LayerInfo};
pub use layer::{AdjustmentInfo, Channel, Layer, Mask, CHANNEL_ALPHA, CHANNEL_MASK};
pub use resources::{
    AlphaChannelNames, DimensionUnit, ImageResource, ResolutionInfo, ResolutionUnit, ResourceId,
    ResourceKind, ThumbnailResource, FORMAT_JPEG, FORMAT_RAW_RGB,
};
pub use types::{ColorMode, CompressionMethod, LayerFlags, MaskFlags, Rect};

//! PSD parsing and encoding error types

use std::io;
use thiserror::Error;

/// Errors that can occur while loading, saving or compositing a PSD document
#[derive(Error, Debug)]
pub enum PsdError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid file signature: {0:?}")]
    Signature([u8; 4]),

    #[error("Unsupported PSD version: {0}")]
    UnsupportedVersion(u16),

    #[error("Channel count {0} out of range (supported range is 1 to 24)")]
    ChannelCount(u16),

    #[error("Image {axis} {value} out of range (supported range is 0 to 30000)")]
    Dimension { axis: &'static str, value: u32 },

    #[error("Unsupported bit depth: {0} (supported values are 1, 8 and 16)")]
    Depth(u16),

    #[error("Unknown color mode: {0}")]
    ColorMode(u16),

    #[error("Unknown compression method: {0}")]
    Compression(u16),

    #[error("Invalid image resource signature: {0:?}")]
    ResourceSignature([u8; 4]),

    #[error("Invalid layer channel header signature: {0:?}")]
    ChannelHeaderSignature([u8; 4]),

    #[error("Blend mode key must be exactly 4 bytes, got {0}")]
    BlendKeyLength(usize),

    #[error("Duplicate channel ID {0} within one layer")]
    DuplicateChannel(i16),

    #[error("RLE stream contains the reserved 0x80 header byte")]
    RleMarkerByte,

    #[error("Channel plane holds {actual} bytes but the geometry needs {expected}")]
    PlaneSize { expected: usize, actual: usize },

    #[error("Merged image has {actual} planes but the header declares {expected} channels")]
    MergedPlaneCount { expected: u16, actual: usize },

    #[error("Missing channel {0} for compositing")]
    MissingChannel(i16),

    #[error("Indexed color mode requires a 768-byte palette")]
    MissingPalette,
}

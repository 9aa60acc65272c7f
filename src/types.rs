//! Shared primitive types for the PSD format

use serde::Serialize;

use crate::error::PsdError;

/// File signature of a Photoshop document, `8BPS`
pub const SIGNATURE: [u8; 4] = *b"8BPS";
/// The only supported PSD format version
pub const VERSION: u16 = 1;
/// Signature of image resource blocks and layer sub-blocks
pub const BLOCK_SIGNATURE: [u8; 4] = *b"8BIM";
/// Alternative resource block signature written by ImageReady
pub const BLOCK_SIGNATURE_MESA: [u8; 4] = *b"MeSa";
/// Largest width or height a PSD file may declare
pub const MAX_DIMENSION: u32 = 30_000;
/// Largest channel count a PSD file may declare
pub const MAX_CHANNELS: u16 = 24;

/// Color mode of the merged document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[repr(u16)]
pub enum ColorMode {
    Bitmap = 0,
    Grayscale = 1,
    Indexed = 2,
    Rgb = 3,
    Cmyk = 4,
    Multichannel = 7,
    Duotone = 8,
    Lab = 9,
}

impl ColorMode {
    pub fn from_u16(value: u16) -> Result<ColorMode, PsdError> {
        match value {
            0 => Ok(ColorMode::Bitmap),
            1 => Ok(ColorMode::Grayscale),
            2 => Ok(ColorMode::Indexed),
            3 => Ok(ColorMode::Rgb),
            4 => Ok(ColorMode::Cmyk),
            7 => Ok(ColorMode::Multichannel),
            8 => Ok(ColorMode::Duotone),
            9 => Ok(ColorMode::Lab),
            other => Err(PsdError::ColorMode(other)),
        }
    }
}

/// Compression method of a channel plane or the merged image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[repr(u16)]
pub enum CompressionMethod {
    Raw = 0,
    Rle = 1,
}

impl CompressionMethod {
    pub fn from_u16(value: u16) -> Result<CompressionMethod, PsdError> {
        match value {
            0 => Ok(CompressionMethod::Raw),
            1 => Ok(CompressionMethod::Rle),
            other => Err(PsdError::Compression(other)),
        }
    }
}

/// Integer pixel rectangle, edges in document coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Rect {
    pub top: i32,
    pub left: i32,
    pub bottom: i32,
    pub right: i32,
}

impl Rect {
    pub fn new(top: i32, left: i32, bottom: i32, right: i32) -> Rect {
        Rect {
            top,
            left,
            bottom,
            right,
        }
    }

    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }

    pub fn is_empty(&self) -> bool {
        self.width() <= 0 || self.height() <= 0
    }
}

/// Number of bytes one stored scanline occupies for the given bit depth.
///
/// Sub-byte depths are stored one byte per pixel in the files this crate
/// targets, so only 16-bit planes get a wider stride.
pub fn bytes_per_row(depth: u16, width: usize) -> usize {
    if depth == 16 {
        width * 2
    } else {
        width
    }
}

/// Per-layer state flags stored as a single byte.
///
/// Note the stored bit 1 is a *hidden* flag, so `visible` is written inverted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LayerFlags {
    pub transparency_protected: bool,
    pub visible: bool,
    pub obsolete: bool,
    pub has_useful_info: bool,
    pub pixel_data_irrelevant: bool,
}

impl LayerFlags {
    pub fn from_byte(byte: u8) -> LayerFlags {
        LayerFlags {
            transparency_protected: byte & 0x01 != 0,
            visible: byte & 0x02 == 0,
            obsolete: byte & 0x04 != 0,
            has_useful_info: byte & 0x08 != 0,
            pixel_data_irrelevant: byte & 0x10 != 0,
        }
    }

    pub fn to_byte(self) -> u8 {
        let mut byte = 0u8;
        if self.transparency_protected {
            byte |= 0x01;
        }
        if !self.visible {
            byte |= 0x02;
        }
        if self.obsolete {
            byte |= 0x04;
        }
        if self.has_useful_info {
            byte |= 0x08;
        }
        if self.pixel_data_irrelevant {
            byte |= 0x10;
        }
        byte
    }
}

impl Default for LayerFlags {
    fn default() -> LayerFlags {
        LayerFlags {
            transparency_protected: false,
            visible: true,
            obsolete: false,
            has_useful_info: false,
            pixel_data_irrelevant: false,
        }
    }
}

/// Flags byte of a layer mask record
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MaskFlags {
    pub position_relative: bool,
    pub disabled: bool,
    pub invert_on_blend: bool,
}

impl MaskFlags {
    pub fn from_byte(byte: u8) -> MaskFlags {
        MaskFlags {
            position_relative: byte & 0x01 != 0,
            disabled: byte & 0x02 != 0,
            invert_on_blend: byte & 0x04 != 0,
        }
    }

    pub fn to_byte(self) -> u8 {
        let mut byte = 0u8;
        if self.position_relative {
            byte |= 0x01;
        }
        if self.disabled {
            byte |= 0x02;
        }
        if self.invert_on_blend {
            byte |= 0x04;
        }
        byte
    }
}

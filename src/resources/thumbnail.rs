//! Thumbnail preview resource (ids 0x0409 and 0x040C)

use std::io::{self, Cursor, Read, Write};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use serde::Serialize;

use crate::error::PsdError;

/// Raw 24-bit RGB thumbnail data
pub const FORMAT_RAW_RGB: i32 = 0;
/// JPEG compressed thumbnail data
pub const FORMAT_JPEG: i32 = 1;

/// Embedded preview image.
///
/// The 28-byte header is followed by the image blob, which is a JPEG
/// stream when `format` is [`FORMAT_JPEG`]. Decoding the blob is left to
/// the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThumbnailResource {
    pub format: i32,
    pub width: i32,
    pub height: i32,
    pub width_bytes: i32,
    pub total_size: i32,
    pub compressed_size: i32,
    pub bits_per_pixel: i16,
    pub planes: i16,
    #[serde(skip)]
    pub data: Vec<u8>,
}

impl ThumbnailResource {
    pub fn from_payload(payload: &[u8]) -> Result<ThumbnailResource, PsdError> {
        let mut cursor = Cursor::new(payload);
        let format = cursor.read_i32::<BigEndian>()?;
        let width = cursor.read_i32::<BigEndian>()?;
        let height = cursor.read_i32::<BigEndian>()?;
        let width_bytes = cursor.read_i32::<BigEndian>()?;
        let total_size = cursor.read_i32::<BigEndian>()?;
        let compressed_size = cursor.read_i32::<BigEndian>()?;
        let bits_per_pixel = cursor.read_i16::<BigEndian>()?;
        let planes = cursor.read_i16::<BigEndian>()?;

        let mut data = Vec::new();
        cursor.read_to_end(&mut data)?;

        Ok(ThumbnailResource {
            format,
            width,
            height,
            width_bytes,
            total_size,
            compressed_size,
            bits_per_pixel,
            planes,
            data,
        })
    }

    pub fn write_payload<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_i32::<BigEndian>(self.format)?;
        writer.write_i32::<BigEndian>(self.width)?;
        writer.write_i32::<BigEndian>(self.height)?;
        writer.write_i32::<BigEndian>(self.width_bytes)?;
        writer.write_i32::<BigEndian>(self.total_size)?;
        writer.write_i32::<BigEndian>(self.compressed_size)?;
        writer.write_i16::<BigEndian>(self.bits_per_pixel)?;
        writer.write_i16::<BigEndian>(self.planes)?;
        writer.write_all(&self.data)?;
        Ok(())
    }

    pub fn is_jpeg(&self) -> bool {
        self.format == FORMAT_JPEG
    }
}

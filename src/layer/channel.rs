//! Layer channel planes

use std::io::{Cursor, Read, Seek, Write};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

use crate::cursor::PsdReadExt;
use crate::error::PsdError;
use crate::rle;
use crate::types::{bytes_per_row, CompressionMethod, Rect};

/// Channel ID of the transparency plane
pub const CHANNEL_ALPHA: i16 = -1;
/// Channel ID of the layer mask plane
pub const CHANNEL_MASK: i16 = -2;

/// One channel of a layer.
///
/// `image_data` is the decoded plane, one stored row per scanline of the
/// owning rectangle: the layer bounds for color and transparency channels,
/// the mask bounds for the mask channel.
#[derive(Debug, Clone)]
pub struct Channel {
    pub id: i16,
    /// Byte length of the stored block as declared by the layer header,
    /// including the 2-byte compression mode
    pub length: u32,
    pub compression: CompressionMethod,
    pub image_data: Vec<u8>,
}

impl Channel {
    pub fn new(id: i16) -> Channel {
        Channel {
            id,
            length: 0,
            compression: CompressionMethod::Rle,
            image_data: Vec::new(),
        }
    }

    /// Reads one `(id, length)` entry of the layer's channel table.
    pub(crate) fn read_header<R: Read + Seek>(reader: &mut R) -> Result<Channel, PsdError> {
        let id = reader.read_i16::<BigEndian>()?;
        let length = reader.read_u32::<BigEndian>()?;
        Ok(Channel {
            id,
            length,
            compression: CompressionMethod::Raw,
            image_data: Vec::new(),
        })
    }

    /// Reads the channel's stored block and decodes the plane for `rect`.
    pub(crate) fn load_pixel_data<R: Read + Seek>(
        &mut self,
        reader: &mut R,
        depth: u16,
        rect: Rect,
    ) -> Result<(), PsdError> {
        self.load_pixel_data_filled(reader, depth, rect, 0)
    }

    /// Like [`Self::load_pixel_data`] but prefills the plane, for mask
    /// channels whose stored block may not cover the whole rectangle.
    pub(crate) fn load_pixel_data_filled<R: Read + Seek>(
        &mut self,
        reader: &mut R,
        depth: u16,
        rect: Rect,
        fill: u8,
    ) -> Result<(), PsdError> {
        // The whole block is buffered so a malformed packet stream cannot
        // desynchronize the channels that follow it
        let block = reader.read_bytes(self.length as usize)?;
        let mut cursor = Cursor::new(block.as_slice());

        self.compression = CompressionMethod::from_u16(cursor.read_u16::<BigEndian>()?)?;

        let rows = rect.height().max(0) as usize;
        let row_bytes = bytes_per_row(depth, rect.width().max(0) as usize);
        self.image_data = vec![fill; rows * row_bytes];

        match self.compression {
            CompressionMethod::Raw => {
                // Short blocks leave the plane tail at the fill value
                let start = cursor.position() as usize;
                let count = (block.len() - start).min(self.image_data.len());
                self.image_data[..count].copy_from_slice(&block[start..start + count]);
            }
            CompressionMethod::Rle => {
                cursor.skip(rows as u64 * 2)?;
                for row in 0..rows {
                    rle::decode_row(&mut cursor, &mut self.image_data, row * row_bytes, row_bytes)?;
                }
            }
        }
        Ok(())
    }

    /// Re-encodes the plane into a stored block, mode word first.
    pub(crate) fn encode_pixel_data(&self, depth: u16, rect: Rect) -> Result<Vec<u8>, PsdError> {
        let rows = rect.height().max(0) as usize;
        let row_bytes = bytes_per_row(depth, rect.width().max(0) as usize);
        let needed = rows * row_bytes;
        if self.image_data.len() < needed {
            return Err(PsdError::PlaneSize {
                expected: needed,
                actual: self.image_data.len(),
            });
        }

        let mut block = Vec::with_capacity(2 + needed);
        block.write_u16::<BigEndian>(self.compression as u16)?;
        match self.compression {
            CompressionMethod::Raw => block.write_all(&self.image_data[..needed])?,
            CompressionMethod::Rle => {
                let (row_counts, data) = rle::encode_plane(&self.image_data, rows, row_bytes)?;
                for count in row_counts {
                    block.write_u16::<BigEndian>(count)?;
                }
                block.write_all(&data)?;
            }
        }
        Ok(block)
    }
}

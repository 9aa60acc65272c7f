//! Layer records and their pixel data
//!
//! A layer is parsed in two passes, the way the file is laid out: first
//! the fixed header with the channel table, blend settings and the sized
//! extra region (mask, blending ranges, name, tagged adjustment blocks),
//! then the channel pixel planes, which follow the headers of all layers.

mod channel;
mod mask;

pub use channel::{Channel, CHANNEL_ALPHA, CHANNEL_MASK};
pub use mask::Mask;

use std::io::{Read, Seek, SeekFrom, Write};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

use crate::cursor::{PsdReadExt, PsdWriteExt};
use crate::error::PsdError;
use crate::types::{CompressionMethod, LayerFlags, Rect, BLOCK_SIGNATURE};

use mask::MASK_FILL;

/// One layer of a document
#[derive(Debug, Clone)]
pub struct Layer {
    /// Layer bounds in document coordinates
    pub rect: Rect,
    /// Channels in channel-table order; the mask channel, when present,
    /// goes last, which is where its pixel block sits in the file
    pub channels: Vec<Channel>,
    pub(crate) blend_key: [u8; 4],
    pub opacity: u8,
    pub clipping: bool,
    pub flags: LayerFlags,
    pub name: String,
    pub mask: Option<Mask>,
    /// Blending-ranges block, kept verbatim
    pub blending_ranges: Vec<u8>,
    pub adjustments: Vec<AdjustmentInfo>,
}

/// Tagged extra-data block attached to a layer
#[derive(Debug, Clone, PartialEq)]
pub struct AdjustmentInfo {
    pub key: [u8; 4],
    pub data: Vec<u8>,
}

impl AdjustmentInfo {
    fn read<R: Read + Seek>(reader: &mut R) -> Result<AdjustmentInfo, PsdError> {
        let signature = reader.read_tag()?;
        if signature != BLOCK_SIGNATURE {
            return Err(PsdError::ResourceSignature(signature));
        }
        let key = reader.read_tag()?;
        let length = reader.read_u32::<BigEndian>()?;
        let data = reader.read_bytes(length as usize)?;
        Ok(AdjustmentInfo { key, data })
    }

    fn write<W: Write + Seek>(&self, writer: &mut W) -> Result<(), PsdError> {
        writer.write_tag(&BLOCK_SIGNATURE)?;
        writer.write_tag(&self.key)?;
        writer.write_u32::<BigEndian>(self.data.len() as u32)?;
        writer.write_all(&self.data)?;
        Ok(())
    }
}

impl Default for Layer {
    fn default() -> Layer {
        Layer {
            rect: Rect::default(),
            channels: Vec::new(),
            blend_key: *b"norm",
            opacity: 255,
            clipping: false,
            flags: LayerFlags::default(),
            name: String::new(),
            mask: None,
            blending_ranges: Vec::new(),
            adjustments: Vec::new(),
        }
    }
}

impl Layer {
    /// Blend mode key, a 4-character tag such as `norm` or `mul `.
    pub fn blend_mode_key(&self) -> String {
        String::from_utf8_lossy(&self.blend_key).into_owned()
    }

    pub fn set_blend_mode_key(&mut self, key: &str) -> Result<(), PsdError> {
        let bytes = key.as_bytes();
        if bytes.len() != 4 {
            return Err(PsdError::BlendKeyLength(bytes.len()));
        }
        self.blend_key.copy_from_slice(bytes);
        Ok(())
    }

    /// Looks a channel up by its ID.
    pub fn channel(&self, id: i16) -> Option<&Channel> {
        self.channels.iter().find(|channel| channel.id == id)
    }

    fn mask_rect(&self) -> Rect {
        self.mask.as_ref().map(|mask| mask.rect).unwrap_or_default()
    }

    /// Reads one layer record (header and extra region, not pixel data).
    pub(crate) fn read<R: Read + Seek>(reader: &mut R) -> Result<Layer, PsdError> {
        let top = reader.read_i32::<BigEndian>()?;
        let left = reader.read_i32::<BigEndian>()?;
        let bottom = reader.read_i32::<BigEndian>()?;
        let right = reader.read_i32::<BigEndian>()?;
        let rect = Rect::new(top, left, bottom, right);

        let channel_count = reader.read_u16::<BigEndian>()?;
        let mut channels: Vec<Channel> = Vec::with_capacity(channel_count as usize);
        for _ in 0..channel_count {
            let channel = Channel::read_header(reader)?;
            if channels.iter().any(|existing| existing.id == channel.id) {
                return Err(PsdError::DuplicateChannel(channel.id));
            }
            channels.push(channel);
        }

        let signature = reader.read_tag()?;
        if signature != BLOCK_SIGNATURE {
            return Err(PsdError::ChannelHeaderSignature(signature));
        }
        let blend_key = reader.read_tag()?;
        let opacity = reader.read_u8()?;
        let clipping = reader.read_u8()? > 0;
        let flags = LayerFlags::from_byte(reader.read_u8()?);
        reader.skip(1)?;

        let extra_len = reader.read_u32::<BigEndian>()? as u64;
        let extra_end = reader.stream_position()? + extra_len;

        let mask = Mask::read(reader)?;

        let ranges_len = reader.read_i32::<BigEndian>()?;
        let blending_ranges = if ranges_len > 0 {
            reader.read_bytes(ranges_len as usize)?
        } else {
            Vec::new()
        };

        let name_start = reader.stream_position()?;
        let name = reader.read_pascal_string()?;
        let name_skip = (reader.stream_position()? - name_start) % 4;
        reader.skip(name_skip)?;

        let mut adjustments = Vec::new();
        while reader.stream_position()? < extra_end {
            match AdjustmentInfo::read(reader) {
                Ok(info) => adjustments.push(info),
                Err(error) => {
                    // Malformed block; give up on the rest of the region
                    // but keep the layer
                    tracing::warn!("Skipping unreadable adjustment block: {}", error);
                    reader.seek(SeekFrom::Start(extra_end))?;
                }
            }
        }
        reader.seek(SeekFrom::Start(extra_end))?;

        tracing::debug!(
            "Layer {:?}: {} channels, {}x{}",
            name,
            channel_count,
            rect.width(),
            rect.height()
        );

        Ok(Layer {
            rect,
            channels,
            blend_key,
            opacity,
            clipping,
            flags,
            name,
            mask,
            blending_ranges,
            adjustments,
        })
    }

    /// Reads the pixel planes of every channel.
    ///
    /// Color and transparency channels decode against the layer bounds in
    /// table order; the mask channel comes last and decodes against the
    /// mask bounds. A mask channel without usable mask geometry records its
    /// declared compression mode and is otherwise skipped over so the
    /// stream stays aligned for the next layer.
    pub(crate) fn load_pixel_data<R: Read + Seek>(
        &mut self,
        reader: &mut R,
        depth: u16,
    ) -> Result<(), PsdError> {
        let rect = self.rect;
        for channel in self.channels.iter_mut() {
            if channel.id != CHANNEL_MASK {
                channel.load_pixel_data(reader, depth, rect)?;
            }
        }
        self.load_mask_pixel_data(reader, depth)
    }

    fn load_mask_pixel_data<R: Read + Seek>(
        &mut self,
        reader: &mut R,
        depth: u16,
    ) -> Result<(), PsdError> {
        let index = match self.channels.iter().position(|c| c.id == CHANNEL_MASK) {
            Some(index) => index,
            None => return Ok(()),
        };
        let mask_rect = self.mask_rect();
        let channel = &mut self.channels[index];
        if mask_rect.is_empty() {
            // The stored block still leads with its compression mode;
            // only the remainder is skipped
            if channel.length >= 2 {
                channel.compression =
                    CompressionMethod::from_u16(reader.read_u16::<BigEndian>()?)?;
                reader.skip(channel.length as u64 - 2)?;
            } else {
                reader.skip(channel.length as u64)?;
            }
            return Ok(());
        }

        channel.load_pixel_data_filled(reader, depth, mask_rect, MASK_FILL)?;
        if let Some(mask) = &mut self.mask {
            mask.image_data = channel.image_data.clone();
        }
        Ok(())
    }

    /// Pre-encodes every channel plane into its stored block.
    pub(crate) fn encode_channels(&self, depth: u16) -> Result<Vec<Vec<u8>>, PsdError> {
        self.channels
            .iter()
            .map(|channel| {
                let rect = if channel.id == CHANNEL_MASK {
                    self.mask_rect()
                } else {
                    self.rect
                };
                channel.encode_pixel_data(depth, rect)
            })
            .collect()
    }

    /// Writes the layer record; `encoded` supplies the stored block
    /// lengths for the channel table.
    pub(crate) fn write_record<W: Write + Seek>(
        &self,
        writer: &mut W,
        encoded: &[Vec<u8>],
    ) -> Result<(), PsdError> {
        writer.write_i32::<BigEndian>(self.rect.top)?;
        writer.write_i32::<BigEndian>(self.rect.left)?;
        writer.write_i32::<BigEndian>(self.rect.bottom)?;
        writer.write_i32::<BigEndian>(self.rect.right)?;

        writer.write_u16::<BigEndian>(self.channels.len() as u16)?;
        for (channel, block) in self.channels.iter().zip(encoded) {
            writer.write_i16::<BigEndian>(channel.id)?;
            writer.write_u32::<BigEndian>(block.len() as u32)?;
        }

        writer.write_tag(&BLOCK_SIGNATURE)?;
        writer.write_all(&self.blend_key)?;
        writer.write_u8(self.opacity)?;
        writer.write_u8(u8::from(self.clipping))?;
        writer.write_u8(self.flags.to_byte())?;
        writer.write_u8(0)?;

        writer.write_sized_u32(|writer| -> Result<(), PsdError> {
            Mask::write(self.mask.as_ref(), writer)?;
            writer.write_u32::<BigEndian>(self.blending_ranges.len() as u32)?;
            writer.write_all(&self.blending_ranges)?;
            writer.write_pascal_string_padded4(&self.name)?;
            for adjustment in &self.adjustments {
                adjustment.write(writer)?;
            }
            Ok(())
        })
    }
}

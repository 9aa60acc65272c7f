//! Layer mask records

use std::io::{Read, Seek, SeekFrom, Write};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

use crate::cursor::PsdWriteExt;
use crate::error::PsdError;
use crate::types::{MaskFlags, Rect};

/// Value mask planes are prefilled with before decoding; areas a short
/// stored block never covers keep it
pub(crate) const MASK_FILL: u8 = 171;

/// Raster mask attached to a layer
#[derive(Debug, Clone, Default)]
pub struct Mask {
    /// Mask bounds in document coordinates (or relative to the layer when
    /// the position-relative flag is set)
    pub rect: Rect,
    /// Color of mask areas outside the stored rectangle, 0 or 255
    pub default_color: u8,
    pub flags: MaskFlags,
    /// Decoded mask plane sized by `rect`, filled during pixel loading
    pub image_data: Vec<u8>,
}

impl Mask {
    /// Reads a mask record; a zero length means the layer has no mask.
    pub(crate) fn read<R: Read + Seek>(reader: &mut R) -> Result<Option<Mask>, PsdError> {
        let length = reader.read_u32::<BigEndian>()? as u64;
        if length == 0 {
            return Ok(None);
        }
        let start = reader.stream_position()?;

        let top = reader.read_i32::<BigEndian>()?;
        let left = reader.read_i32::<BigEndian>()?;
        let bottom = reader.read_i32::<BigEndian>()?;
        let right = reader.read_i32::<BigEndian>()?;
        let default_color = reader.read_u8()?;
        let flags = MaskFlags::from_byte(reader.read_u8()?);
        // The 36-byte variant repeats the flags/background pair and a
        // second rectangle; neither is retained
        reader.seek(SeekFrom::Start(start + length))?;

        Ok(Some(Mask {
            rect: Rect::new(top, left, bottom, right),
            default_color,
            flags,
            image_data: Vec::new(),
        }))
    }

    /// Writes a mask record, or a zero length when there is no mask.
    pub(crate) fn write<W: Write + Seek>(
        mask: Option<&Mask>,
        writer: &mut W,
    ) -> Result<(), PsdError> {
        let mask = match mask {
            Some(mask) if !mask.rect.is_empty() => mask,
            _ => {
                writer.write_u32::<BigEndian>(0)?;
                return Ok(());
            }
        };

        writer.write_sized_u32(|writer| -> Result<(), PsdError> {
            writer.write_i32::<BigEndian>(mask.rect.top)?;
            writer.write_i32::<BigEndian>(mask.rect.left)?;
            writer.write_i32::<BigEndian>(mask.rect.bottom)?;
            writer.write_i32::<BigEndian>(mask.rect.right)?;
            writer.write_u8(mask.default_color)?;
            writer.write_u8(mask.flags.to_byte())?;
            writer.write_u16::<BigEndian>(0)?;
            Ok(())
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn test_roundtrip() {
        let mask = Mask {
            rect: Rect::new(2, 4, 10, 12),
            default_color: 255,
            flags: MaskFlags {
                position_relative: true,
                disabled: false,
                invert_on_blend: true,
            },
            image_data: Vec::new(),
        };

        let mut buffer = Cursor::new(Vec::new());
        Mask::write(Some(&mask), &mut buffer).unwrap();
        // 4-byte length plus the 20-byte body
        assert_eq!(buffer.get_ref().len(), 24);

        buffer.set_position(0);
        let parsed = Mask::read(&mut buffer).unwrap().unwrap();
        assert_eq!(parsed.rect, mask.rect);
        assert_eq!(parsed.default_color, 255);
        assert_eq!(parsed.flags, mask.flags);
        assert_eq!(buffer.position(), 24);
    }

    #[test]
    fn test_absent_mask_writes_zero_length() {
        let mut buffer = Cursor::new(Vec::new());
        Mask::write(None, &mut buffer).unwrap();
        assert_eq!(buffer.get_ref(), &[0, 0, 0, 0]);

        buffer.set_position(0);
        assert!(Mask::read(&mut buffer).unwrap().is_none());
    }

    #[test]
    fn test_empty_rect_saves_as_absent() {
        let mask = Mask::default();
        let mut buffer = Cursor::new(Vec::new());
        Mask::write(Some(&mask), &mut buffer).unwrap();
        assert_eq!(buffer.get_ref(), &[0, 0, 0, 0]);
    }

    #[test]
    fn test_extended_body_extras_are_skipped() {
        let mut buffer = Cursor::new(Vec::new());
        buffer.write_u32::<BigEndian>(36).unwrap();
        buffer.write_i32::<BigEndian>(1).unwrap();
        buffer.write_i32::<BigEndian>(2).unwrap();
        buffer.write_i32::<BigEndian>(9).unwrap();
        buffer.write_i32::<BigEndian>(10).unwrap();
        buffer.write_u8(0).unwrap();
        buffer.write_u8(0x02).unwrap();
        // real flags, real background and a second rectangle
        buffer.write_all(&[0xFF; 18]).unwrap();
        // trailing marker to prove the reader lands past the record
        buffer.write_u8(0x5A).unwrap();

        buffer.set_position(0);
        let parsed = Mask::read(&mut buffer).unwrap().unwrap();
        assert_eq!(parsed.rect, Rect::new(1, 2, 9, 10));
        assert!(parsed.flags.disabled);
        assert_eq!(buffer.position(), 40);
        assert_eq!(buffer.read_u8().unwrap(), 0x5A);
    }
}

//! Image resource section
//!
//! Image resources are tagged metadata blocks between the palette and the
//! layer section. Blocks with a known ID are decoded into typed payloads;
//! everything else is kept verbatim so it survives a load/save cycle.
//!
//! # Example
//!
//! ```no_run
//! use psdkit::{PsdDocument, ResourceKind};
//!
//! let document = PsdDocument::from_bytes(&std::fs::read("art.psd")?)?;
//! for resource in &document.resources {
//!     if let ResourceKind::AlphaNames(names) = &resource.kind {
//!         println!("alpha channels: {:?}", names.names);
//!     }
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod alpha_names;
mod resolution;
mod thumbnail;

pub use alpha_names::AlphaChannelNames;
pub use resolution::{DimensionUnit, ResolutionInfo, ResolutionUnit};
pub use thumbnail::{ThumbnailResource, FORMAT_JPEG, FORMAT_RAW_RGB};

use std::io::{self, Read, Seek, Write};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

use crate::cursor::{PsdReadExt, PsdWriteExt};
use crate::error::PsdError;
use crate::types::{BLOCK_SIGNATURE, BLOCK_SIGNATURE_MESA};

/// Well-known image resource IDs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i16)]
#[allow(dead_code)]
pub enum ResourceId {
    ResolutionInfo = 0x03ED,
    AlphaChannelNames = 0x03EE,
    ThumbnailPhotoshop4 = 0x0409,
    IccProfile = 0x040F,
    Thumbnail = 0x040C,
    UnicodeAlphaNames = 0x0415,
    VersionInfo = 0x0421,
}

/// Decoded payload of an image resource block
#[derive(Debug, Clone, PartialEq)]
pub enum ResourceKind {
    Resolution(ResolutionInfo),
    AlphaNames(AlphaChannelNames),
    Thumbnail(ThumbnailResource),
    Generic(Vec<u8>),
}

impl ResourceKind {
    fn write_payload<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        match self {
            ResourceKind::Resolution(info) => info.write_payload(writer),
            ResourceKind::AlphaNames(names) => names.write_payload(writer),
            ResourceKind::Thumbnail(thumbnail) => thumbnail.write_payload(writer),
            ResourceKind::Generic(payload) => writer.write_all(payload),
        }
    }
}

/// One image resource block
#[derive(Debug, Clone, PartialEq)]
pub struct ImageResource {
    /// Block signature, `8BIM` or `MeSa`, re-emitted as read
    pub signature: [u8; 4],
    pub id: i16,
    pub name: String,
    pub kind: ResourceKind,
}

impl ImageResource {
    pub fn new(id: i16, kind: ResourceKind) -> ImageResource {
        ImageResource {
            signature: BLOCK_SIGNATURE,
            id,
            name: String::new(),
            kind,
        }
    }

    /// Reads one resource block at the current position.
    pub fn read<R: Read + Seek>(reader: &mut R) -> Result<ImageResource, PsdError> {
        let signature = reader.read_tag()?;
        if signature != BLOCK_SIGNATURE && signature != BLOCK_SIGNATURE_MESA {
            return Err(PsdError::ResourceSignature(signature));
        }

        let id = reader.read_i16::<BigEndian>()?;
        let name = reader.read_pascal_string()?;
        let payload_len = reader.read_u32::<BigEndian>()? as usize;
        let payload = reader.read_bytes(payload_len)?;
        // Blocks are aligned by stream position, not payload length
        if reader.stream_position()? % 2 == 1 {
            reader.skip(1)?;
        }

        tracing::debug!("Image resource {:#06x}, {} payload bytes", id, payload_len);

        let kind = if id == ResourceId::ResolutionInfo as i16 {
            ResourceKind::Resolution(ResolutionInfo::from_payload(&payload)?)
        } else if id == ResourceId::AlphaChannelNames as i16 {
            ResourceKind::AlphaNames(AlphaChannelNames::from_payload(&payload))
        } else if id == ResourceId::ThumbnailPhotoshop4 as i16 || id == ResourceId::Thumbnail as i16
        {
            ResourceKind::Thumbnail(ThumbnailResource::from_payload(&payload)?)
        } else {
            ResourceKind::Generic(payload)
        };

        Ok(ImageResource {
            signature,
            id,
            name,
            kind,
        })
    }

    /// Writes this block, padding to an even stream position.
    pub fn write<W: Write + Seek>(&self, writer: &mut W) -> Result<(), PsdError> {
        writer.write_tag(&self.signature)?;
        writer.write_i16::<BigEndian>(self.id)?;
        writer.write_pascal_string(&self.name)?;

        let mut payload = Vec::new();
        self.kind.write_payload(&mut payload)?;
        writer.write_u32::<BigEndian>(payload.len() as u32)?;
        writer.write_all(&payload)?;
        if writer.stream_position()? % 2 == 1 {
            writer.write_u8(0)?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn roundtrip(resource: &ImageResource) -> ImageResource {
        let mut buffer = Cursor::new(Vec::new());
        resource.write(&mut buffer).unwrap();
        buffer.set_position(0);
        ImageResource::read(&mut buffer).unwrap()
    }

    #[test]
    fn test_resolution_block_roundtrip() {
        let resource = ImageResource::new(
            ResourceId::ResolutionInfo as i16,
            ResourceKind::Resolution(ResolutionInfo::new(300)),
        );
        let parsed = roundtrip(&resource);
        assert_eq!(parsed, resource);
        assert!(matches!(parsed.kind, ResourceKind::Resolution(info) if info.horizontal_res == 300));
    }

    #[test]
    fn test_generic_block_roundtrip_keeps_payload() {
        let resource = ImageResource {
            signature: BLOCK_SIGNATURE,
            id: 0x0421,
            name: "ver".into(),
            kind: ResourceKind::Generic(vec![1, 2, 3, 4, 5]),
        };
        assert_eq!(roundtrip(&resource), resource);
    }

    #[test]
    fn test_mesa_signature_survives() {
        let resource = ImageResource {
            signature: BLOCK_SIGNATURE_MESA,
            id: 0x07D0,
            name: String::new(),
            kind: ResourceKind::Generic(vec![9]),
        };
        let parsed = roundtrip(&resource);
        assert_eq!(parsed.signature, BLOCK_SIGNATURE_MESA);
    }

    #[test]
    fn test_unknown_signature_is_rejected() {
        let mut buffer = Cursor::new(b"8BXXrest".to_vec());
        let result = ImageResource::read(&mut buffer);
        assert!(matches!(result, Err(PsdError::ResourceSignature(_))));
    }

    #[test]
    fn test_odd_payload_is_padded() {
        let resource = ImageResource::new(0x07D1, ResourceKind::Generic(vec![1, 2, 3]));
        let mut buffer = Cursor::new(Vec::new());
        resource.write(&mut buffer).unwrap();
        // 4 tag + 2 id + 2 name + 4 len + 3 payload = 15, one pad byte
        assert_eq!(buffer.get_ref().len(), 16);

        buffer.set_position(0);
        assert_eq!(ImageResource::read(&mut buffer).unwrap(), resource);
        assert_eq!(buffer.position(), 16);
    }

    #[test]
    fn test_alpha_names_block() {
        let resource = ImageResource::new(
            ResourceId::AlphaChannelNames as i16,
            ResourceKind::AlphaNames(AlphaChannelNames {
                names: vec!["Extra".into()],
            }),
        );
        assert_eq!(roundtrip(&resource), resource);
    }

    #[test]
    fn test_thumbnail_block() {
        let resource = ImageResource::new(
            ResourceId::Thumbnail as i16,
            ResourceKind::Thumbnail(ThumbnailResource {
                format: FORMAT_JPEG,
                width: 32,
                height: 32,
                width_bytes: 96,
                total_size: 3072,
                compressed_size: 100,
                bits_per_pixel: 24,
                planes: 1,
                data: vec![0xFF; 100],
            }),
        );
        assert_eq!(roundtrip(&resource), resource);
    }
}

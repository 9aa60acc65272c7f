//! The PSD document: header, sections and the merged image
//!
//! A file is five sections in fixed order: the 26-byte header, the color
//! mode data, the image resources, the layer and mask section and the
//! merged image. Loading walks them in that order; saving pre-encodes
//! every layer channel first so the record tables can carry the stored
//! block sizes.

use std::io::{Cursor, Read, Seek, SeekFrom, Write};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

use crate::cursor::{PsdReadExt, PsdWriteExt};
use crate::error::PsdError;
use crate::layer::Layer;
use crate::resources::{ImageResource, ResolutionInfo, ResourceId, ResourceKind};
use crate::rle;
use crate::types::{
    bytes_per_row, ColorMode, CompressionMethod, MAX_CHANNELS, MAX_DIMENSION, SIGNATURE, VERSION,
};

/// A layered Photoshop document.
///
/// `image_data` holds the merged (flattened) image as one decoded plane
/// per channel; layer pixel data lives in each [`Layer`]'s channels.
#[derive(Debug, Clone)]
pub struct PsdDocument {
    /// Channel count of the merged image, 1 to 24
    pub channels: u16,
    /// Height in pixels
    pub rows: u32,
    /// Width in pixels
    pub columns: u32,
    /// Bits per channel, 1, 8 or 16
    pub depth: u16,
    pub color_mode: ColorMode,
    /// Color mode data; a 768-byte RGB table for indexed documents
    pub palette: Vec<u8>,
    pub resources: Vec<ImageResource>,
    pub layers: Vec<Layer>,
    /// When set, the first alpha channel is the merged transparency
    /// rather than a saved selection
    pub absolute_alpha: bool,
    /// Global layer mask info block, kept verbatim
    pub global_mask: Vec<u8>,
    /// Compression method used when saving the merged image
    pub compression: CompressionMethod,
    /// Decoded merged image planes, one per channel
    pub image_data: Vec<Vec<u8>>,
}

impl PsdDocument {
    /// Creates an empty document with zeroed merged planes.
    pub fn new(
        color_mode: ColorMode,
        columns: u32,
        rows: u32,
        channels: u16,
        depth: u16,
    ) -> Result<PsdDocument, PsdError> {
        validate_geometry(channels, rows, columns, depth)?;
        let plane_len = rows as usize * bytes_per_row(depth, columns as usize);
        let image_data = (0..channels).map(|_| vec![0u8; plane_len]).collect();
        Ok(PsdDocument {
            channels,
            rows,
            columns,
            depth,
            color_mode,
            palette: Vec::new(),
            resources: Vec::new(),
            layers: Vec::new(),
            absolute_alpha: false,
            global_mask: Vec::new(),
            compression: CompressionMethod::Rle,
            image_data,
        })
    }

    /// Parses a document from a byte slice.
    pub fn from_bytes(bytes: &[u8]) -> Result<PsdDocument, PsdError> {
        PsdDocument::from_reader(&mut Cursor::new(bytes))
    }

    /// Parses a document from a seekable reader.
    pub fn from_reader<R: Read + Seek>(reader: &mut R) -> Result<PsdDocument, PsdError> {
        let signature = reader.read_tag()?;
        if signature != SIGNATURE {
            return Err(PsdError::Signature(signature));
        }
        let version = reader.read_u16::<BigEndian>()?;
        if version != VERSION {
            return Err(PsdError::UnsupportedVersion(version));
        }
        reader.skip(6)?;

        let channels = reader.read_u16::<BigEndian>()?;
        let rows = reader.read_u32::<BigEndian>()?;
        let columns = reader.read_u32::<BigEndian>()?;
        let depth = reader.read_u16::<BigEndian>()?;
        let color_mode = ColorMode::from_u16(reader.read_u16::<BigEndian>()?)?;
        validate_geometry(channels, rows, columns, depth)?;
        tracing::debug!(
            "Header: {}x{} px, {} channels, depth {}, {:?}",
            columns,
            rows,
            channels,
            depth,
            color_mode
        );

        let palette_len = reader.read_u32::<BigEndian>()?;
        let palette = reader.read_bytes(palette_len as usize)?;

        let resources = read_resource_section(reader)?;
        let (layers, absolute_alpha, global_mask) = read_layer_section(reader, depth)?;
        let (compression, image_data) =
            read_merged_image(reader, channels, rows, columns, depth)?;

        tracing::info!(
            "Loaded PSD document: {}x{}, {} layers, {} resources",
            columns,
            rows,
            layers.len(),
            resources.len()
        );

        Ok(PsdDocument {
            channels,
            rows,
            columns,
            depth,
            color_mode,
            palette,
            resources,
            layers,
            absolute_alpha,
            global_mask,
            compression,
            image_data,
        })
    }

    /// Serializes the document into a byte vector.
    pub fn to_bytes(&self) -> Result<Vec<u8>, PsdError> {
        let mut buffer = Cursor::new(Vec::new());
        self.save_to(&mut buffer)?;
        Ok(buffer.into_inner())
    }

    /// Writes the document to a seekable writer.
    pub fn save_to<W: Write + Seek>(&self, writer: &mut W) -> Result<(), PsdError> {
        validate_geometry(self.channels, self.rows, self.columns, self.depth)?;

        // 1. Pre-encode all layer channels; the records need the stored
        //    block sizes before any pixel data goes out.
        let encoded_layers: Vec<Vec<Vec<u8>>> = self
            .layers
            .iter()
            .map(|layer| layer.encode_channels(self.depth))
            .collect::<Result<_, _>>()?;

        // 2. Header.
        writer.write_tag(&SIGNATURE)?;
        writer.write_u16::<BigEndian>(VERSION)?;
        writer.write_all(&[0u8; 6])?;
        writer.write_u16::<BigEndian>(self.channels)?;
        writer.write_u32::<BigEndian>(self.rows)?;
        writer.write_u32::<BigEndian>(self.columns)?;
        writer.write_u16::<BigEndian>(self.depth)?;
        writer.write_u16::<BigEndian>(self.color_mode as u16)?;

        // 3. Color mode data.
        writer.write_u32::<BigEndian>(self.palette.len() as u32)?;
        writer.write_all(&self.palette)?;

        // 4. Image resources.
        writer.write_sized_u32(|writer| -> Result<(), PsdError> {
            for resource in &self.resources {
                resource.write(writer)?;
            }
            Ok(())
        })?;

        // 5. Layer and mask section.
        self.write_layer_section(writer, &encoded_layers)?;

        // 6. Merged image.
        self.write_merged_image(writer)?;

        tracing::info!(
            "Saved PSD document: {}x{}, {} layers",
            self.columns,
            self.rows,
            self.layers.len()
        );
        Ok(())
    }

    /// Resolution info resource, when the document carries one.
    pub fn resolution(&self) -> Option<&ResolutionInfo> {
        self.resources
            .iter()
            .find_map(|resource| match &resource.kind {
                ResourceKind::Resolution(info) => Some(info),
                _ => None,
            })
    }

    /// Sets the resolution info resource, replacing any existing one.
    pub fn set_resolution(&mut self, info: ResolutionInfo) {
        self.resources
            .retain(|resource| !matches!(resource.kind, ResourceKind::Resolution(_)));
        self.resources.push(ImageResource::new(
            ResourceId::ResolutionInfo as i16,
            ResourceKind::Resolution(info),
        ));
    }

    fn write_layer_section<W: Write + Seek>(
        &self,
        writer: &mut W,
        encoded_layers: &[Vec<Vec<u8>>],
    ) -> Result<(), PsdError> {
        if self.layers.is_empty() && self.global_mask.is_empty() {
            writer.write_u32::<BigEndian>(0)?;
            return Ok(());
        }

        writer.write_sized_u32(|writer| -> Result<(), PsdError> {
            // Layer info: count, records, then all pixel blocks in record
            // order, padded to an even length.
            writer.write_sized_u32(|writer| -> Result<(), PsdError> {
                let mut count = self.layers.len() as i16;
                if self.absolute_alpha {
                    count = -count;
                }
                writer.write_i16::<BigEndian>(count)?;
                for (layer, encoded) in self.layers.iter().zip(encoded_layers) {
                    layer.write_record(writer, encoded)?;
                }
                for encoded in encoded_layers {
                    for block in encoded {
                        writer.write_all(block)?;
                    }
                }
                if writer.stream_position()? % 2 == 1 {
                    writer.write_u8(0)?;
                }
                Ok(())
            })?;

            writer.write_u32::<BigEndian>(self.global_mask.len() as u32)?;
            writer.write_all(&self.global_mask)?;
            Ok(())
        })
    }

    fn write_merged_image<W: Write + Seek>(&self, writer: &mut W) -> Result<(), PsdError> {
        if self.image_data.len() != self.channels as usize {
            return Err(PsdError::MergedPlaneCount {
                expected: self.channels,
                actual: self.image_data.len(),
            });
        }
        let rows = self.rows as usize;
        let row_bytes = bytes_per_row(self.depth, self.columns as usize);
        let plane_len = rows * row_bytes;
        for plane in &self.image_data {
            if plane.len() < plane_len {
                return Err(PsdError::PlaneSize {
                    expected: plane_len,
                    actual: plane.len(),
                });
            }
        }

        writer.write_u16::<BigEndian>(self.compression as u16)?;
        match self.compression {
            CompressionMethod::Raw => {
                for plane in &self.image_data {
                    writer.write_all(&plane[..plane_len])?;
                }
            }
            CompressionMethod::Rle => {
                // The row tables of every plane lead the packet data, so
                // encode everything up front.
                let mut encoded = Vec::with_capacity(self.image_data.len());
                for plane in &self.image_data {
                    encoded.push(rle::encode_plane(plane, rows, row_bytes)?);
                }
                for (counts, _) in &encoded {
                    for count in counts {
                        writer.write_u16::<BigEndian>(*count)?;
                    }
                }
                for (_, data) in &encoded {
                    writer.write_all(data)?;
                }
            }
        }
        Ok(())
    }
}

fn validate_geometry(channels: u16, rows: u32, columns: u32, depth: u16) -> Result<(), PsdError> {
    if channels < 1 || channels > MAX_CHANNELS {
        return Err(PsdError::ChannelCount(channels));
    }
    if rows > MAX_DIMENSION {
        return Err(PsdError::Dimension {
            axis: "height",
            value: rows,
        });
    }
    if columns > MAX_DIMENSION {
        return Err(PsdError::Dimension {
            axis: "width",
            value: columns,
        });
    }
    if depth != 1 && depth != 8 && depth != 16 {
        return Err(PsdError::Depth(depth));
    }
    Ok(())
}

fn read_resource_section<R: Read + Seek>(reader: &mut R) -> Result<Vec<ImageResource>, PsdError> {
    let length = reader.read_u32::<BigEndian>()? as u64;
    let end = reader.stream_position()? + length;

    let mut resources = Vec::new();
    while reader.stream_position()? < end {
        resources.push(ImageResource::read(reader)?);
    }
    reader.seek(SeekFrom::Start(end))?;
    Ok(resources)
}

fn read_layer_section<R: Read + Seek>(
    reader: &mut R,
    depth: u16,
) -> Result<(Vec<Layer>, bool, Vec<u8>), PsdError> {
    let length = reader.read_u32::<BigEndian>()? as u64;
    if length == 0 {
        return Ok((Vec::new(), false, Vec::new()));
    }
    let end = reader.stream_position()? + length;

    let (layers, absolute_alpha) = read_layer_info(reader, depth)?;

    // Global layer mask info trails the layer info when there is room
    // left in the section.
    let mut global_mask = Vec::new();
    if reader.stream_position()? < end {
        let mask_len = reader.read_u32::<BigEndian>()?;
        global_mask = reader.read_bytes(mask_len as usize)?;
    }
    reader.seek(SeekFrom::Start(end))?;
    Ok((layers, absolute_alpha, global_mask))
}

fn read_layer_info<R: Read + Seek>(
    reader: &mut R,
    depth: u16,
) -> Result<(Vec<Layer>, bool), PsdError> {
    let length = reader.read_u32::<BigEndian>()? as u64;
    if length == 0 {
        return Ok((Vec::new(), false));
    }
    let end = reader.stream_position()? + length;

    // A negative count flags the first alpha channel as the merged
    // transparency.
    let raw_count = reader.read_i16::<BigEndian>()?;
    let absolute_alpha = raw_count < 0;
    let count = raw_count.unsigned_abs();
    tracing::debug!(
        "Layer info: {} layers, absolute alpha {}",
        count,
        absolute_alpha
    );

    let mut layers = Vec::with_capacity(count as usize);
    for _ in 0..count {
        layers.push(Layer::read(reader)?);
    }
    for layer in layers.iter_mut() {
        layer.load_pixel_data(reader, depth)?;
    }

    // Pixel data pads the info block to an even length.
    if reader.stream_position()? % 2 == 1 {
        reader.skip(1)?;
    }
    reader.seek(SeekFrom::Start(end))?;
    Ok((layers, absolute_alpha))
}

fn read_merged_image<R: Read + Seek>(
    reader: &mut R,
    channels: u16,
    rows: u32,
    columns: u32,
    depth: u16,
) -> Result<(CompressionMethod, Vec<Vec<u8>>), PsdError> {
    let compression = CompressionMethod::from_u16(reader.read_u16::<BigEndian>()?)?;

    let rows = rows as usize;
    let row_bytes = bytes_per_row(depth, columns as usize);
    if compression == CompressionMethod::Rle {
        // Per-row packet sizes; the decoder consumes whole packets and
        // does not need them.
        reader.skip(rows as u64 * channels as u64 * 2)?;
    }

    let mut image_data = Vec::with_capacity(channels as usize);
    for _ in 0..channels {
        let mut plane = vec![0u8; rows * row_bytes];
        match compression {
            CompressionMethod::Raw => reader.read_exact(&mut plane)?,
            CompressionMethod::Rle => {
                for row in 0..rows {
                    rle::decode_row(reader, &mut plane, row * row_bytes, row_bytes)?;
                }
            }
        }
        image_data.push(plane);
    }
    Ok((compression, image_data))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use crate::layer::{AdjustmentInfo, Channel, Mask, CHANNEL_ALPHA, CHANNEL_MASK};
    use crate::types::Rect;

    use super::*;

    fn rgb_document() -> PsdDocument {
        let mut document = PsdDocument::new(ColorMode::Rgb, 2, 2, 3, 8).unwrap();
        document.image_data[0] = vec![10, 20, 30, 40];
        document.image_data[1] = vec![50, 60, 70, 80];
        document.image_data[2] = vec![90, 100, 110, 120];
        document
    }

    #[test]
    fn test_new_preallocates_planes() {
        let document = PsdDocument::new(ColorMode::Rgb, 4, 3, 3, 8).unwrap();
        assert_eq!(document.image_data.len(), 3);
        for plane in &document.image_data {
            assert_eq!(plane, &vec![0u8; 12]);
        }

        let document = PsdDocument::new(ColorMode::Grayscale, 4, 3, 1, 16).unwrap();
        assert_eq!(document.image_data[0].len(), 24);
    }

    #[test]
    fn test_new_rejects_bad_geometry() {
        assert!(matches!(
            PsdDocument::new(ColorMode::Rgb, 1, 1, 0, 8),
            Err(PsdError::ChannelCount(0))
        ));
        assert!(matches!(
            PsdDocument::new(ColorMode::Rgb, 1, 1, 25, 8),
            Err(PsdError::ChannelCount(25))
        ));
        assert!(matches!(
            PsdDocument::new(ColorMode::Rgb, 30_001, 1, 3, 8),
            Err(PsdError::Dimension { axis: "width", .. })
        ));
        assert!(matches!(
            PsdDocument::new(ColorMode::Rgb, 1, 30_001, 3, 8),
            Err(PsdError::Dimension { axis: "height", .. })
        ));
        assert!(matches!(
            PsdDocument::new(ColorMode::Rgb, 1, 1, 3, 4),
            Err(PsdError::Depth(4))
        ));
    }

    #[test]
    fn test_minimal_roundtrip() {
        let document = rgb_document();
        let bytes = document.to_bytes().unwrap();
        let parsed = PsdDocument::from_bytes(&bytes).unwrap();

        assert_eq!(parsed.channels, 3);
        assert_eq!(parsed.rows, 2);
        assert_eq!(parsed.columns, 2);
        assert_eq!(parsed.depth, 8);
        assert_eq!(parsed.color_mode, ColorMode::Rgb);
        assert_eq!(parsed.compression, CompressionMethod::Rle);
        assert_eq!(parsed.image_data, document.image_data);
        assert!(parsed.layers.is_empty());
        assert!(parsed.resources.is_empty());
        assert!(parsed.global_mask.is_empty());
        assert!(!parsed.absolute_alpha);
    }

    #[test]
    fn test_raw_merged_roundtrip() {
        let mut document = rgb_document();
        document.compression = CompressionMethod::Raw;
        let bytes = document.to_bytes().unwrap();
        let parsed = PsdDocument::from_bytes(&bytes).unwrap();
        assert_eq!(parsed.compression, CompressionMethod::Raw);
        assert_eq!(parsed.image_data, document.image_data);
    }

    #[test]
    fn test_header_validation() {
        let bytes = rgb_document().to_bytes().unwrap();

        let mut bad = bytes.clone();
        bad[0] = b'X';
        assert!(matches!(
            PsdDocument::from_bytes(&bad),
            Err(PsdError::Signature(_))
        ));

        let mut bad = bytes.clone();
        bad[5] = 2;
        assert!(matches!(
            PsdDocument::from_bytes(&bad),
            Err(PsdError::UnsupportedVersion(2))
        ));

        let mut bad = bytes.clone();
        bad[13] = 25;
        assert!(matches!(
            PsdDocument::from_bytes(&bad),
            Err(PsdError::ChannelCount(25))
        ));

        let mut bad = bytes.clone();
        bad[23] = 4;
        assert!(matches!(
            PsdDocument::from_bytes(&bad),
            Err(PsdError::Depth(4))
        ));

        let mut bad = bytes;
        bad[25] = 5;
        assert!(matches!(
            PsdDocument::from_bytes(&bad),
            Err(PsdError::ColorMode(5))
        ));
    }

    #[test]
    fn test_layer_roundtrip() {
        let mut channel = Channel::new(0);
        channel.image_data = vec![1, 2, 3, 4];
        let mut green = Channel::new(1);
        green.image_data = vec![5, 6, 7, 8];
        let mut blue = Channel::new(2);
        blue.image_data = vec![9, 10, 11, 12];
        let mut alpha = Channel::new(CHANNEL_ALPHA);
        alpha.image_data = vec![255, 255, 128, 0];
        let mut mask_channel = Channel::new(CHANNEL_MASK);
        mask_channel.image_data = vec![200];

        let mut layer = Layer {
            rect: Rect::new(0, 0, 2, 2),
            channels: vec![channel, green, blue, alpha, mask_channel],
            name: "Layer 1".into(),
            opacity: 128,
            clipping: true,
            mask: Some(Mask {
                rect: Rect::new(0, 0, 1, 1),
                image_data: vec![200],
                ..Mask::default()
            }),
            adjustments: vec![AdjustmentInfo {
                key: *b"luni",
                data: vec![1, 2, 3, 4],
            }],
            ..Layer::default()
        };
        layer.set_blend_mode_key("mul ").unwrap();
        layer.flags.visible = false;

        let mut document = rgb_document();
        document.layers.push(layer);
        document.absolute_alpha = true;
        document.global_mask = vec![1, 2, 3, 4];

        let bytes = document.to_bytes().unwrap();
        let parsed = PsdDocument::from_bytes(&bytes).unwrap();

        assert!(parsed.absolute_alpha);
        assert_eq!(parsed.global_mask, vec![1, 2, 3, 4]);
        assert_eq!(parsed.layers.len(), 1);

        let layer = &parsed.layers[0];
        assert_eq!(layer.name, "Layer 1");
        assert_eq!(layer.blend_mode_key(), "mul ");
        assert_eq!(layer.opacity, 128);
        assert!(layer.clipping);
        assert!(!layer.flags.visible);
        assert_eq!(layer.channels.len(), 5);
        assert_eq!(layer.channel(0).unwrap().image_data, vec![1, 2, 3, 4]);
        assert_eq!(
            layer.channel(CHANNEL_ALPHA).unwrap().image_data,
            vec![255, 255, 128, 0]
        );
        assert_eq!(layer.channel(CHANNEL_MASK).unwrap().image_data, vec![200]);
        let mask = layer.mask.as_ref().unwrap();
        assert_eq!(mask.rect, Rect::new(0, 0, 1, 1));
        assert_eq!(mask.image_data, vec![200]);
        assert_eq!(layer.adjustments.len(), 1);
        assert_eq!(&layer.adjustments[0].key, b"luni");
    }

    #[test]
    fn test_mask_channel_without_mask_record_roundtrip() {
        // The first layer carries a mask channel but no mask record, so
        // its stored block is the bare mode word; the next layer's
        // blocks must still parse from the right offset.
        let mut fill = Channel::new(0);
        fill.image_data = vec![5, 6, 7, 8];
        let mask_channel = Channel::new(CHANNEL_MASK);
        let mut lines = Channel::new(0);
        lines.image_data = vec![1, 2, 3, 4];

        let mut document = rgb_document();
        document.layers.push(Layer {
            rect: Rect::new(0, 0, 2, 2),
            channels: vec![fill, mask_channel],
            name: "Fill".into(),
            ..Layer::default()
        });
        document.layers.push(Layer {
            rect: Rect::new(0, 0, 2, 2),
            channels: vec![lines],
            name: "Lines".into(),
            ..Layer::default()
        });

        let bytes = document.to_bytes().unwrap();
        let parsed = PsdDocument::from_bytes(&bytes).unwrap();

        assert!(parsed.layers[0].mask.is_none());
        let mask_channel = parsed.layers[0].channel(CHANNEL_MASK).unwrap();
        assert_eq!(mask_channel.compression, CompressionMethod::Rle);
        assert!(mask_channel.image_data.is_empty());
        assert_eq!(
            parsed.layers[1].channel(0).unwrap().image_data,
            vec![1, 2, 3, 4]
        );

        let again = parsed.to_bytes().unwrap();
        assert_eq!(bytes, again);
    }

    #[test]
    fn test_resources_roundtrip() {
        let mut document = rgb_document();
        document.set_resolution(ResolutionInfo::new(300));
        document.resources.push(ImageResource::new(
            0x07D0,
            ResourceKind::Generic(vec![1, 2, 3]),
        ));

        let bytes = document.to_bytes().unwrap();
        let parsed = PsdDocument::from_bytes(&bytes).unwrap();

        assert_eq!(parsed.resources.len(), 2);
        assert_eq!(parsed.resolution().unwrap().horizontal_res, 300);
        assert!(matches!(
            &parsed.resources[1].kind,
            ResourceKind::Generic(payload) if payload == &vec![1, 2, 3]
        ));
    }

    #[test]
    fn test_set_resolution_replaces_existing() {
        let mut document = rgb_document();
        document.set_resolution(ResolutionInfo::new(72));
        document.set_resolution(ResolutionInfo::new(300));

        let infos: Vec<_> = document
            .resources
            .iter()
            .filter(|resource| matches!(resource.kind, ResourceKind::Resolution(_)))
            .collect();
        assert_eq!(infos.len(), 1);
        assert_eq!(document.resolution().unwrap().horizontal_res, 300);
    }

    #[test]
    fn test_indexed_palette_roundtrip() {
        let mut document = PsdDocument::new(ColorMode::Indexed, 2, 1, 1, 8).unwrap();
        document.palette = (0..=255u8).cycle().take(768).collect();
        document.image_data[0] = vec![0, 255];

        let bytes = document.to_bytes().unwrap();
        let parsed = PsdDocument::from_bytes(&bytes).unwrap();
        assert_eq!(parsed.color_mode, ColorMode::Indexed);
        assert_eq!(parsed.palette.len(), 768);
        assert_eq!(parsed.image_data[0], vec![0, 255]);
    }

    #[test]
    fn test_zero_dimension_document() {
        let document = PsdDocument::new(ColorMode::Rgb, 0, 0, 3, 8).unwrap();
        let bytes = document.to_bytes().unwrap();
        let parsed = PsdDocument::from_bytes(&bytes).unwrap();
        assert_eq!(parsed.columns, 0);
        assert_eq!(parsed.rows, 0);
        assert_eq!(parsed.image_data.len(), 3);
        assert!(parsed.image_data[0].is_empty());
    }

    #[test]
    fn test_sixteen_bit_roundtrip() {
        let mut document = PsdDocument::new(ColorMode::Grayscale, 2, 2, 1, 16).unwrap();
        document.image_data[0] = vec![0x12, 0x34, 0x56, 0x78, 0x9A, 0xBC, 0xDE, 0xF0];

        let bytes = document.to_bytes().unwrap();
        let parsed = PsdDocument::from_bytes(&bytes).unwrap();
        assert_eq!(parsed.depth, 16);
        assert_eq!(parsed.image_data, document.image_data);
    }

    #[test]
    fn test_merged_plane_count_mismatch() {
        let mut document = rgb_document();
        document.image_data.pop();
        assert!(matches!(
            document.to_bytes(),
            Err(PsdError::MergedPlaneCount {
                expected: 3,
                actual: 2
            })
        ));
    }

    #[test]
    fn test_undersized_merged_plane() {
        let mut document = rgb_document();
        document.image_data[1] = vec![1, 2];
        assert!(matches!(
            document.to_bytes(),
            Err(PsdError::PlaneSize {
                expected: 4,
                actual: 2
            })
        ));
    }

    #[test]
    fn test_global_mask_without_layers() {
        let mut document = rgb_document();
        document.global_mask = vec![0, 0, 0, 1];
        let bytes = document.to_bytes().unwrap();
        let parsed = PsdDocument::from_bytes(&bytes).unwrap();
        assert!(parsed.layers.is_empty());
        assert_eq!(parsed.global_mask, vec![0, 0, 0, 1]);
    }
}

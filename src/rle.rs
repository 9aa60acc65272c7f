//! PackBits RLE compression/decompression
//!
//! PackBits is the row-oriented compression used for PSD channel planes.
//! Reference: Apple Technical Note TN1023
//!
//! Every scanline is encoded independently. A header byte below 128
//! introduces `header + 1` literal bytes, a header byte above 128 repeats
//! the following byte `257 - header` times, and the value 128 is reserved
//! and never produced by the encoder.

use std::io::{Read, Write};

use byteorder::{ReadBytesExt, WriteBytesExt};

use crate::error::PsdError;

/// Decodes one compressed scanline into `plane` starting at `start`.
///
/// Exactly `row_bytes` output bytes are consumed from the packet stream.
/// Stores that would fall outside `plane` are dropped rather than
/// truncating the packet, so the reader stays aligned with the next row
/// even for files whose row table disagrees with the declared geometry.
pub fn decode_row<R: Read>(
    reader: &mut R,
    plane: &mut [u8],
    start: usize,
    row_bytes: usize,
) -> Result<(), PsdError> {
    let mut emitted = 0;

    while emitted < row_bytes {
        let header = reader.read_u8()?;

        if header < 128 {
            // Literal: copy next (header + 1) bytes
            let count = header as usize + 1;
            for _ in 0..count {
                let value = reader.read_u8()?;
                if start + emitted < plane.len() {
                    plane[start + emitted] = value;
                }
                emitted += 1;
            }
        } else if header > 128 {
            // Run: repeat next byte (257 - header) times
            let count = 257 - header as usize;
            let value = reader.read_u8()?;
            for _ in 0..count {
                if start + emitted < plane.len() {
                    plane[start + emitted] = value;
                }
                emitted += 1;
            }
        } else {
            return Err(PsdError::RleMarkerByte);
        }
    }

    Ok(())
}

/// Incremental PackBits encoder for a single scanline.
///
/// Bytes are pushed one at a time; the packer decides between literal and
/// replicate packets as the run develops. A pending literal whose last
/// byte matches the incoming one is split so the pair can seed a
/// replicate packet.
struct RowPacker<'a, W: Write> {
    writer: &'a mut W,
    values: [u8; 128],
    len: usize,
    replicate: bool,
    written: usize,
}

impl<'a, W: Write> RowPacker<'a, W> {
    fn new(writer: &'a mut W) -> RowPacker<'a, W> {
        RowPacker {
            writer,
            values: [0; 128],
            len: 0,
            replicate: false,
            written: 0,
        }
    }

    fn push(&mut self, color: u8) -> Result<(), PsdError> {
        if self.len == 0 {
            self.values[0] = color;
            self.len = 1;
        } else if self.len == 1 {
            self.replicate = color == self.values[0];
            self.values[1] = color;
            self.len = 2;
        } else if self.len == self.values.len() {
            self.flush()?;
            self.push(color)?;
        } else if self.replicate {
            if color == self.values[self.len - 1] {
                self.values[self.len] = color;
                self.len += 1;
            } else {
                self.flush()?;
                self.push(color)?;
            }
        } else if color == self.values[self.len - 1] {
            // Split the literal so the repeated pair starts a run
            self.len -= 1;
            self.flush()?;
            self.push(color)?;
            self.push(color)?;
        } else {
            self.values[self.len] = color;
            self.len += 1;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<(), PsdError> {
        if self.len == 0 {
            return Ok(());
        }
        if self.replicate {
            // Header is -(len - 1) in two's complement, then the byte
            self.writer.write_u8((self.len as u8 - 1).wrapping_neg())?;
            self.writer.write_u8(self.values[0])?;
            self.written += 2;
        } else {
            self.writer.write_u8(self.len as u8 - 1)?;
            self.writer.write_all(&self.values[..self.len])?;
            self.written += 1 + self.len;
        }
        self.len = 0;
        self.replicate = false;
        Ok(())
    }
}

/// Encodes one scanline, returning the number of compressed bytes written.
pub fn encode_row<W: Write>(writer: &mut W, row: &[u8]) -> Result<usize, PsdError> {
    let mut packer = RowPacker::new(writer);
    for &color in row {
        packer.push(color)?;
    }
    packer.flush()?;
    Ok(packer.written)
}

/// Encodes a whole channel plane scanline by scanline.
///
/// Returns the per-row compressed byte counts for the RLE row table and
/// the concatenated packet data.
pub fn encode_plane(
    plane: &[u8],
    rows: usize,
    row_bytes: usize,
) -> Result<(Vec<u16>, Vec<u8>), PsdError> {
    let mut row_counts = Vec::with_capacity(rows);
    let mut data = Vec::new();

    for row in 0..rows {
        let start = row * row_bytes;
        let count = encode_row(&mut data, &plane[start..start + row_bytes])?;
        row_counts.push(count as u16);
    }

    Ok((row_counts, data))
}

//! Stream helpers for the big-endian PSD wire format
//!
//! Everything in a PSD file is big-endian. These extension traits add the
//! format's recurring primitives on top of [`byteorder`]: 4-byte tags,
//! Pascal strings with their padding rules and length-prefixed regions
//! whose size is patched in after the body is written.

use std::io::{self, Read, Seek, SeekFrom, Write};

use byteorder::{BigEndian, WriteBytesExt};

/// Read-side helpers for PSD streams
pub trait PsdReadExt: Read + Seek {
    /// Reads a 4-byte tag such as `8BPS` or `8BIM`.
    fn read_tag(&mut self) -> io::Result<[u8; 4]> {
        let mut tag = [0u8; 4];
        self.read_exact(&mut tag)?;
        Ok(tag)
    }

    /// Reads `count` bytes into a fresh buffer.
    fn read_bytes(&mut self, count: usize) -> io::Result<Vec<u8>> {
        let mut buffer = vec![0u8; count];
        self.read_exact(&mut buffer)?;
        Ok(buffer)
    }

    /// Reads a Pascal string padded to an even total size.
    ///
    /// The length prefix itself counts towards the total, so the pad byte
    /// is only present when the string length is even.
    fn read_pascal_string(&mut self) -> io::Result<String> {
        let mut length = [0u8; 1];
        self.read_exact(&mut length)?;
        let bytes = self.read_bytes(length[0] as usize)?;
        if length[0] % 2 == 0 {
            self.skip(1)?;
        }
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Advances the stream by `count` bytes without reading them.
    fn skip(&mut self, count: u64) -> io::Result<()> {
        self.seek(SeekFrom::Current(count as i64))?;
        Ok(())
    }
}

impl<R: Read + Seek> PsdReadExt for R {}

/// Write-side helpers for PSD streams
pub trait PsdWriteExt: Write + Seek {
    /// Writes a 4-byte tag.
    fn write_tag(&mut self, tag: &[u8; 4]) -> io::Result<()> {
        self.write_all(tag)
    }

    /// Writes a Pascal string padded to an even total size, the mirror of
    /// [`PsdReadExt::read_pascal_string`]. Strings longer than 255 bytes
    /// are truncated.
    fn write_pascal_string(&mut self, text: &str) -> io::Result<()> {
        let bytes = text.as_bytes();
        let length = bytes.len().min(255);
        self.write_u8(length as u8)?;
        self.write_all(&bytes[..length])?;
        if length % 2 == 0 {
            self.write_u8(0)?;
        }
        Ok(())
    }

    /// Writes a Pascal string padded to a multiple of four bytes, the
    /// layout used for layer names.
    fn write_pascal_string_padded4(&mut self, text: &str) -> io::Result<()> {
        let bytes = text.as_bytes();
        let length = bytes.len().min(255);
        self.write_u8(length as u8)?;
        self.write_all(&bytes[..length])?;
        let total = 1 + length;
        let padded = (total + 3) & !3;
        for _ in total..padded {
            self.write_u8(0)?;
        }
        Ok(())
    }

    /// Writes a region prefixed with its byte length.
    ///
    /// A placeholder length is written first, then `body` runs, then the
    /// real length is patched in. The length is patched even when `body`
    /// fails so a partially written stream stays consistent.
    fn write_sized_u32<F, E>(&mut self, body: F) -> Result<(), E>
    where
        Self: Sized,
        F: FnOnce(&mut Self) -> Result<(), E>,
        E: From<io::Error>,
    {
        let field_position = self.stream_position()?;
        self.write_u32::<BigEndian>(0)?;
        let start = self.stream_position()?;
        let result = body(self);
        let end = self.stream_position()?;
        self.seek(SeekFrom::Start(field_position))?;
        self.write_u32::<BigEndian>((end - start) as u32)?;
        self.seek(SeekFrom::Start(end))?;
        result
    }
}

impl<W: Write + Seek> PsdWriteExt for W {}

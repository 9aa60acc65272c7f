//! Alpha channel name list resource (id 0x03EE)

use std::io::{self, Write};

use byteorder::WriteBytesExt;
use serde::Serialize;

/// Names of the extra alpha channels, in channel order.
///
/// The payload is a bare sequence of length-prefixed strings with no
/// padding between entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AlphaChannelNames {
    pub names: Vec<String>,
}

impl AlphaChannelNames {
    pub fn from_payload(payload: &[u8]) -> AlphaChannelNames {
        let mut names = Vec::new();
        let mut position = 0;

        while position < payload.len() {
            let length = payload[position] as usize;
            position += 1;
            let end = position + length;
            if end > payload.len() {
                tracing::warn!(
                    "Alpha channel name truncated: declared {} bytes, {} available",
                    length,
                    payload.len() - position
                );
            }
            let end = end.min(payload.len());
            let text = String::from_utf8_lossy(&payload[position..end]);
            if !text.is_empty() {
                names.push(text.into_owned());
            }
            position = end;
        }

        AlphaChannelNames { names }
    }

    pub fn write_payload<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        for name in &self.names {
            let bytes = name.as_bytes();
            let length = bytes.len().min(255);
            writer.write_u8(length as u8)?;
            writer.write_all(&bytes[..length])?;
        }
        Ok(())
    }
}

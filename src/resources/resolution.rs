//! Document resolution resource (id 0x03ED)

use std::io::{self, Cursor, Write};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use serde::Serialize;

use crate::error::PsdError;

/// Unit of a resolution value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ResolutionUnit {
    PixelsPerInch,
    PixelsPerCm,
    Other(i32),
}

impl ResolutionUnit {
    pub fn from_raw(value: i32) -> ResolutionUnit {
        match value {
            1 => ResolutionUnit::PixelsPerInch,
            2 => ResolutionUnit::PixelsPerCm,
            other => ResolutionUnit::Other(other),
        }
    }

    pub fn as_raw(self) -> i32 {
        match self {
            ResolutionUnit::PixelsPerInch => 1,
            ResolutionUnit::PixelsPerCm => 2,
            ResolutionUnit::Other(value) => value,
        }
    }
}

/// Display unit of the document width and height
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DimensionUnit {
    Inches,
    Centimeters,
    Points,
    Picas,
    Columns,
    Other(i16),
}

impl DimensionUnit {
    pub fn from_raw(value: i16) -> DimensionUnit {
        match value {
            1 => DimensionUnit::Inches,
            2 => DimensionUnit::Centimeters,
            3 => DimensionUnit::Points,
            4 => DimensionUnit::Picas,
            5 => DimensionUnit::Columns,
            other => DimensionUnit::Other(other),
        }
    }

    pub fn as_raw(self) -> i16 {
        match self {
            DimensionUnit::Inches => 1,
            DimensionUnit::Centimeters => 2,
            DimensionUnit::Points => 3,
            DimensionUnit::Picas => 4,
            DimensionUnit::Columns => 5,
            DimensionUnit::Other(value) => value,
        }
    }
}

/// Pixel density and display units of the document.
///
/// The payload is 16 bytes: `hRes:i16`, `hResUnit:i32`, `widthUnit:i16`,
/// `vRes:i16`, `vResUnit:i32`, `heightUnit:i16`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResolutionInfo {
    pub horizontal_res: i16,
    pub horizontal_res_unit: ResolutionUnit,
    pub width_unit: DimensionUnit,
    pub vertical_res: i16,
    pub vertical_res_unit: ResolutionUnit,
    pub height_unit: DimensionUnit,
}

impl ResolutionInfo {
    pub fn new(dpi: i16) -> ResolutionInfo {
        ResolutionInfo {
            horizontal_res: dpi,
            horizontal_res_unit: ResolutionUnit::PixelsPerInch,
            width_unit: DimensionUnit::Inches,
            vertical_res: dpi,
            vertical_res_unit: ResolutionUnit::PixelsPerInch,
            height_unit: DimensionUnit::Inches,
        }
    }

    pub fn from_payload(payload: &[u8]) -> Result<ResolutionInfo, PsdError> {
        let mut cursor = Cursor::new(payload);
        Ok(ResolutionInfo {
            horizontal_res: cursor.read_i16::<BigEndian>()?,
            horizontal_res_unit: ResolutionUnit::from_raw(cursor.read_i32::<BigEndian>()?),
            width_unit: DimensionUnit::from_raw(cursor.read_i16::<BigEndian>()?),
            vertical_res: cursor.read_i16::<BigEndian>()?,
            vertical_res_unit: ResolutionUnit::from_raw(cursor.read_i32::<BigEndian>()?),
            height_unit: DimensionUnit::from_raw(cursor.read_i16::<BigEndian>()?),
        })
    }

    pub fn write_payload<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_i16::<BigEndian>(self.horizontal_res)?;
        writer.write_i32::<BigEndian>(self.horizontal_res_unit.as_raw())?;
        writer.write_i16::<BigEndian>(self.width_unit.as_raw())?;
        writer.write_i16::<BigEndian>(self.vertical_res)?;
        writer.write_i32::<BigEndian>(self.vertical_res_unit.as_raw())?;
        writer.write_i16::<BigEndian>(self.height_unit.as_raw())?;
        Ok(())
    }
}

impl Default for ResolutionInfo {
    fn default() -> ResolutionInfo {
        ResolutionInfo::new(72)
    }
}

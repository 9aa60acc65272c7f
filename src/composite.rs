//! RGBA rendering of merged images, layers and masks
//!
//! Every function returns an 8-bit RGBA buffer in row-major order.
//! 16-bit planes are sampled at their high byte, so deep documents
//! render without a separate conversion pass. Rows render in parallel.

use rayon::prelude::*;

use crate::document::PsdDocument;
use crate::error::PsdError;
use crate::layer::{Layer, Mask, CHANNEL_ALPHA, CHANNEL_MASK};
use crate::types::ColorMode;

/// Bytes between consecutive pixel samples within one plane
fn sample_stride(depth: u16) -> usize {
    if depth == 16 {
        2
    } else {
        1
    }
}

fn clamp_u8(value: i32) -> u8 {
    value.clamp(0, 255) as u8
}

/// Converts ink coverage to RGB. Coverage scales over 256, so a fully
/// inked plate truncates to 0 rather than reaching an exact black.
fn cmyk_to_rgb(c: u8, m: u8, y: u8, k: u8) -> [u8; 3] {
    let c = c as f64 / 256.0;
    let m = m as f64 / 256.0;
    let y = y as f64 / 256.0;
    let k = k as f64 / 256.0;

    let r = ((1.0 - (c * (1.0 - k) + k)) * 255.0) as i32;
    let g = ((1.0 - (m * (1.0 - k) + k)) * 255.0) as i32;
    let b = ((1.0 - (y * (1.0 - k) + k)) * 255.0) as i32;
    [clamp_u8(r), clamp_u8(g), clamp_u8(b)]
}

/// Converts an 8-bit Lab sample to RGB via D65 XYZ.
///
/// Lightness is stored on 0..=255 and truncates down to the 0..=100
/// scale; a and b are stored offset by 128.
fn lab_to_rgb(l: u8, a: u8, b: u8) -> [u8; 3] {
    let l = (l as f64 / 2.56) as i32 as f64;
    let a = a as f64 - 128.0;
    let b = b as f64 - 128.0;

    let fy = (l + 16.0) / 116.0;
    let fx = a / 500.0 + fy;
    let fz = fy - b / 200.0;

    let finv = |t: f64| {
        let cube = t.powf(3.0);
        if cube > 0.008856 {
            cube
        } else {
            t / 7.787
        }
    };

    xyz_to_rgb(95.047 * finv(fx), 100.0 * finv(fy), 108.883 * finv(fz))
}

fn xyz_to_rgb(x: f64, y: f64, z: f64) -> [u8; 3] {
    let x = x / 100.0;
    let y = y / 100.0;
    let z = z / 100.0;

    let r = x * 3.2406 + y * -1.5372 + z * -0.4986;
    let g = x * -0.9689 + y * 1.8758 + z * 0.0415;
    let b = x * 0.0557 + y * -0.204 + z * 1.057;

    let gamma = |v: f64| {
        if v > 0.0031308 {
            1.055 * v.powf(1.0 / 2.4) - 0.055
        } else {
            12.92 * v
        }
    };

    [
        clamp_u8((gamma(r) * 256.0) as i32),
        clamp_u8((gamma(g) * 256.0) as i32),
        clamp_u8((gamma(b) * 256.0) as i32),
    ]
}

/// Planes a color mode needs before the optional alpha or black plane
fn required_planes(color_mode: ColorMode) -> usize {
    match color_mode {
        ColorMode::Bitmap => 0,
        ColorMode::Grayscale | ColorMode::Duotone | ColorMode::Indexed => 1,
        _ => 3,
    }
}

fn validate_document_planes(document: &PsdDocument) -> Result<(), PsdError> {
    let needed = required_planes(document.color_mode);
    if document.image_data.len() < needed {
        return Err(PsdError::MissingChannel(document.image_data.len() as i16));
    }
    if document.color_mode == ColorMode::Indexed && document.palette.len() < 768 {
        return Err(PsdError::MissingPalette);
    }

    let mut used = needed;
    if matches!(document.color_mode, ColorMode::Rgb | ColorMode::Cmyk)
        && document.image_data.len() > 3
    {
        used = 4;
    }
    let expected =
        document.rows as usize * document.columns as usize * sample_stride(document.depth);
    for plane in &document.image_data[..used] {
        if plane.len() < expected {
            return Err(PsdError::PlaneSize {
                expected,
                actual: plane.len(),
            });
        }
    }
    Ok(())
}

fn document_color(document: &PsdDocument, pos: usize, stride: usize) -> [u8; 4] {
    let planes = &document.image_data;
    let sample = |channel: usize| planes[channel][pos * stride];
    match document.color_mode {
        ColorMode::Bitmap => [255, 255, 255, 255],
        ColorMode::Grayscale | ColorMode::Duotone => {
            let gray = sample(0);
            [gray, gray, gray, 255]
        }
        ColorMode::Indexed => {
            let index = sample(0) as usize;
            [
                document.palette[index],
                document.palette[index + 256],
                document.palette[index + 512],
                255,
            ]
        }
        ColorMode::Rgb => {
            let alpha = if planes.len() > 3 { sample(3) } else { 255 };
            [sample(0), sample(1), sample(2), alpha]
        }
        ColorMode::Cmyk => {
            let black = if planes.len() > 3 { sample(3) } else { 0 };
            let [r, g, b] = cmyk_to_rgb(sample(0), sample(1), sample(2), black);
            [r, g, b, 255]
        }
        ColorMode::Multichannel => {
            let [r, g, b] = cmyk_to_rgb(sample(0), sample(1), sample(2), 0);
            [r, g, b, 255]
        }
        ColorMode::Lab => {
            let [r, g, b] = lab_to_rgb(sample(0), sample(1), sample(2));
            [r, g, b, 255]
        }
    }
}

/// Renders the merged image to RGBA.
pub fn document_rgba(document: &PsdDocument) -> Result<Vec<u8>, PsdError> {
    let rows = document.rows as usize;
    let columns = document.columns as usize;
    if rows == 0 || columns == 0 {
        return Ok(Vec::new());
    }
    validate_document_planes(document)?;
    let stride = sample_stride(document.depth);

    let mut rgba = vec![0u8; rows * columns * 4];
    rgba.par_chunks_mut(columns * 4)
        .enumerate()
        .for_each(|(y, row)| {
            let base = y * columns;
            for x in 0..columns {
                let color = document_color(document, base + x, stride);
                row[x * 4..x * 4 + 4].copy_from_slice(&color);
            }
        });
    Ok(rgba)
}

/// Color channels a layer must carry for the document's mode.
///
/// CMYK layers have no implicit black plane, so all four channels are
/// required there.
fn layer_color_planes<'a>(
    document: &PsdDocument,
    layer: &'a Layer,
) -> Result<Vec<&'a [u8]>, PsdError> {
    let needed = match document.color_mode {
        ColorMode::Cmyk => 4,
        other => required_planes(other),
    };
    (0..needed as i16)
        .map(|id| {
            layer
                .channel(id)
                .map(|channel| channel.image_data.as_slice())
                .ok_or(PsdError::MissingChannel(id))
        })
        .collect()
}

fn layer_color(document: &PsdDocument, planes: &[&[u8]], pos: usize, stride: usize) -> [u8; 4] {
    let sample = |channel: usize| planes[channel][pos * stride];
    match document.color_mode {
        ColorMode::Bitmap => [255, 255, 255, 255],
        ColorMode::Grayscale | ColorMode::Duotone => {
            let gray = sample(0);
            [gray, gray, gray, 255]
        }
        ColorMode::Indexed => {
            let index = sample(0) as usize;
            [
                document.palette[index],
                document.palette[index + 256],
                document.palette[index + 512],
                255,
            ]
        }
        ColorMode::Rgb => [sample(0), sample(1), sample(2), 255],
        ColorMode::Cmyk => {
            let [r, g, b] = cmyk_to_rgb(sample(0), sample(1), sample(2), sample(3));
            [r, g, b, 255]
        }
        ColorMode::Multichannel => {
            let [r, g, b] = cmyk_to_rgb(sample(0), sample(1), sample(2), 0);
            [r, g, b, 255]
        }
        ColorMode::Lab => {
            let [r, g, b] = lab_to_rgb(sample(0), sample(1), sample(2));
            [r, g, b, 255]
        }
    }
}

/// Mask coverage for the layer-local pixel (x, y); outside the mask
/// bounds the layer shows through fully.
fn mask_multiplier(layer: &Layer, mask: Option<&Mask>, x: i32, y: i32, stride: usize) -> u8 {
    let mask = match mask {
        Some(mask) => mask,
        None => return 255,
    };
    let (mx, my) = if mask.flags.position_relative {
        (x - mask.rect.left, y - mask.rect.top)
    } else {
        (
            x + layer.rect.left - mask.rect.left,
            y + layer.rect.top - mask.rect.top,
        )
    };
    if my < 0 || my >= mask.rect.height() || mx < 0 || mx >= mask.rect.width() {
        return 255;
    }
    let index = (my * mask.rect.width() + mx) as usize;
    mask.image_data
        .get(index * stride)
        .copied()
        .unwrap_or(255)
}

/// Renders one layer to RGBA sized by its bounds.
///
/// Transparency comes from the alpha channel when present, multiplied
/// by the layer mask coverage when a mask channel exists and the mask
/// is not disabled. An empty layer renders to an empty buffer.
pub fn layer_rgba(document: &PsdDocument, layer: &Layer) -> Result<Vec<u8>, PsdError> {
    if layer.rect.is_empty() {
        return Ok(Vec::new());
    }
    let width = layer.rect.width() as usize;
    let height = layer.rect.height() as usize;
    let stride = sample_stride(document.depth);
    let pixels = width * height;

    if document.color_mode == ColorMode::Indexed && document.palette.len() < 768 {
        return Err(PsdError::MissingPalette);
    }
    let planes = layer_color_planes(document, layer)?;
    for plane in &planes {
        if plane.len() < pixels * stride {
            return Err(PsdError::PlaneSize {
                expected: pixels * stride,
                actual: plane.len(),
            });
        }
    }
    let alpha_plane = match layer.channel(CHANNEL_ALPHA) {
        Some(channel) => {
            if channel.image_data.len() < pixels * stride {
                return Err(PsdError::PlaneSize {
                    expected: pixels * stride,
                    actual: channel.image_data.len(),
                });
            }
            Some(channel.image_data.as_slice())
        }
        None => None,
    };
    let mask = layer.mask.as_ref();
    let masked = layer.channel(CHANNEL_MASK).is_some()
        && mask.map_or(true, |mask| !mask.flags.disabled);

    let mut rgba = vec![0u8; pixels * 4];
    rgba.par_chunks_mut(width * 4)
        .enumerate()
        .for_each(|(y, row)| {
            for x in 0..width {
                let pos = y * width + x;
                let mut color = layer_color(document, &planes, pos, stride);
                if let Some(alpha) = alpha_plane {
                    color[3] = alpha[pos * stride];
                }
                if masked {
                    let coverage = mask_multiplier(layer, mask, x as i32, y as i32, stride);
                    color[3] = (color[3] as u32 * coverage as u32 / 255) as u8;
                }
                row[x * 4..x * 4 + 4].copy_from_slice(&color);
            }
        });
    Ok(rgba)
}

/// Renders a layer mask as opaque grayscale, sized by the mask bounds.
pub fn mask_rgba(document: &PsdDocument, mask: &Mask) -> Result<Vec<u8>, PsdError> {
    if mask.rect.is_empty() {
        return Ok(Vec::new());
    }
    let width = mask.rect.width() as usize;
    let height = mask.rect.height() as usize;
    let stride = sample_stride(document.depth);
    let pixels = width * height;
    if mask.image_data.len() < pixels * stride {
        return Err(PsdError::PlaneSize {
            expected: pixels * stride,
            actual: mask.image_data.len(),
        });
    }

    let mut rgba = vec![0u8; pixels * 4];
    rgba.par_chunks_mut(width * 4)
        .enumerate()
        .for_each(|(y, row)| {
            for x in 0..width {
                let value = mask.image_data[(y * width + x) * stride];
                row[x * 4..x * 4 + 4].copy_from_slice(&[value, value, value, 255]);
            }
        });
    Ok(rgba)
}

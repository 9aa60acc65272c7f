//! Read-only document and layer summaries for frontend consumption
//!
//! Serializable projections of a loaded document carrying geometry and
//! metadata but no pixel planes, in the shape embedding UIs expect.

use serde::Serialize;

use crate::document::PsdDocument;
use crate::layer::Layer;
use crate::types::{ColorMode, Rect};

/// Document summary for frontend consumption
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentInfo {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Channel count of the merged image
    pub channels: u16,
    /// Bits per channel
    pub depth: u16,
    pub color_mode: ColorMode,
    pub layer_count: usize,
    /// Per-layer summaries, bottom to top
    pub layers: Vec<LayerInfo>,
}

/// Layer summary for frontend consumption
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerInfo {
    /// Display name
    pub name: String,
    /// Layer bounds in document coordinates
    pub bounds: Rect,
    /// Blend mode key, such as `norm` or `mul `
    pub blend_mode: String,
    /// Opacity scaled to 0.0..=1.0
    pub opacity: f32,
    pub visible: bool,
    pub clipping: bool,
    pub has_mask: bool,
    /// Channel IDs in channel-table order
    pub channel_ids: Vec<i16>,
}

impl From<&PsdDocument> for DocumentInfo {
    fn from(document: &PsdDocument) -> DocumentInfo {
        DocumentInfo {
            width: document.columns,
            height: document.rows,
            channels: document.channels,
            depth: document.depth,
            color_mode: document.color_mode,
            layer_count: document.layers.len(),
            layers: document.layers.iter().map(LayerInfo::from).collect(),
        }
    }
}

impl From<&Layer> for LayerInfo {
    fn from(layer: &Layer) -> LayerInfo {
        LayerInfo {
            name: layer.name.clone(),
            bounds: layer.rect,
            blend_mode: layer.blend_mode_key(),
            opacity: layer.opacity as f32 / 255.0,
            visible: layer.flags.visible,
            clipping: layer.clipping,
            has_mask: layer.mask.is_some(),
            channel_ids: layer.channels.iter().map(|channel| channel.id).collect(),
        }
    }
}

//! Renders a PSD file's merged image and every layer to PNG files.
//!
//! Usage: cargo run --example render_composite -- input.psd [output-dir]

use std::env;
use std::error::Error;
use std::path::PathBuf;

use image::RgbaImage;
use psdkit::{composite, DocumentInfo, PsdDocument};

fn main() -> Result<(), Box<dyn Error>> {
    let mut args = env::args().skip(1);
    let input = args
        .next()
        .ok_or("usage: render_composite <input.psd> [output-dir]")?;
    let out_dir = PathBuf::from(args.next().unwrap_or_else(|| ".".into()));

    let data = std::fs::read(&input)?;
    let document = PsdDocument::from_bytes(&data)?;

    let info = DocumentInfo::from(&document);
    println!(
        "{}: {}x{} {:?}, depth {}, {} layers",
        input, info.width, info.height, info.color_mode, info.depth, info.layer_count
    );

    let rgba = composite::document_rgba(&document)?;
    if let Some(image) = RgbaImage::from_raw(document.columns, document.rows, rgba) {
        let path = out_dir.join("composite.png");
        image.save(&path)?;
        println!("Wrote {}", path.display());
    }

    for (index, layer) in document.layers.iter().enumerate() {
        if layer.rect.is_empty() {
            println!("Skipping empty layer {:?}", layer.name);
            continue;
        }
        let rgba = composite::layer_rgba(&document, layer)?;
        let width = layer.rect.width() as u32;
        let height = layer.rect.height() as u32;
        if let Some(image) = RgbaImage::from_raw(width, height, rgba) {
            let path = out_dir.join(format!("layer_{:02}_{}.png", index, sanitize(&layer.name)));
            image.save(&path)?;
            println!("Wrote {}", path.display());
        }
    }

    Ok(())
}

fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

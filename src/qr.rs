//! QR code rendering for share links

use image::{DynamicImage, GrayImage, ImageOutputFormat, Luma};
use qrcode::QrCode;
use qrcode::render::unicode::Dense1x2;
use qrcode::types::Color;
use std::io::Cursor;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("cannot encode link as QR code: {0}")]
    Encode(String),

    #[error("failed to encode PNG: {0}")]
    Image(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, RenderError>;

/// Pixel geometry of the rendered code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QrStyle {
    /// Side length of one module in pixels
    pub module_px: u32,
    /// Light border around the code, in modules
    pub quiet_zone: u32,
}

impl Default for QrStyle {
    fn default() -> Self {
        Self {
            module_px: 10,
            quiet_zone: 5,
        }
    }
}

fn encode(url: &str) -> Result<QrCode> {
    QrCode::new(url.as_bytes()).map_err(|e| RenderError::Encode(e.to_string()))
}

/// Render `url` as a black-on-white PNG
pub fn render_png(url: &str, style: QrStyle) -> Result<Vec<u8>> {
    let code = encode(url)?;
    let width = code.width() as u32;
    let colors = code.to_colors();

    let module = style.module_px.max(1);
    let side = (width + 2 * style.quiet_zone) * module;

    let img = GrayImage::from_fn(side, side, |x, y| {
        let (mx, my) = (x / module, y / module);
        let inside = style.quiet_zone..style.quiet_zone + width;
        if !inside.contains(&mx) || !inside.contains(&my) {
            return Luma([255]);
        }
        let idx = ((my - style.quiet_zone) * width + (mx - style.quiet_zone)) as usize;
        match colors[idx] {
            Color::Dark => Luma([0]),
            Color::Light => Luma([255]),
        }
    });

    let mut buf = Cursor::new(Vec::new());
    DynamicImage::ImageLuma8(img).write_to(&mut buf, ImageOutputFormat::Png)?;

    tracing::debug!(modules = width, side_px = side, "Rendered QR code");

    Ok(buf.into_inner())
}

/// Render `url` with Unicode half blocks for display in a terminal
///
/// Colors are inverted so the code scans on dark terminal themes.
pub fn render_terminal(url: &str) -> Result<String> {
    let code = encode(url)?;
    Ok(code
        .render::<Dense1x2>()
        .dark_color(Dense1x2::Light)
        .light_color(Dense1x2::Dark)
        .build())
}

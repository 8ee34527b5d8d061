use image::{ImageFormat, RgbaImage, imageops::FilterType};

use crate::error::{Result, WeatherError};

/// Target size of a decoded icon, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IconSize {
    pub width: u32,
    pub height: u32,
}

impl IconSize {
    /// Hourly forecast cells.
    pub const HOURLY: IconSize = IconSize::square(32);
    /// Daily forecast cells.
    pub const DAILY: IconSize = IconSize::square(48);

    pub const fn square(side: u32) -> Self {
        Self {
            width: side,
            height: side,
        }
    }
}

impl Default for IconSize {
    fn default() -> Self {
        IconSize::square(64)
    }
}

/// A decoded, resized RGBA icon ready to hand to a renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct Bitmap(RgbaImage);

impl Bitmap {
    pub fn width(&self) -> u32 {
        self.0.width()
    }

    pub fn height(&self) -> u32 {
        self.0.height()
    }

    /// Row-major RGBA8 pixels.
    pub fn pixels(&self) -> &[u8] {
        self.0.as_raw()
    }
}

impl From<RgbaImage> for Bitmap {
    fn from(image: RgbaImage) -> Self {
        Bitmap(image)
    }
}

/// Decode PNG bytes for `code` and resample them to exactly `size`.
pub fn decode_png(code: &str, bytes: &[u8], size: IconSize) -> Result<Bitmap> {
    let decoded = image::load_from_memory_with_format(bytes, ImageFormat::Png).map_err(|source| {
        WeatherError::Decode {
            code: code.to_string(),
            source,
        }
    })?;

    let resized = decoded.resize_exact(size.width, size.height, FilterType::Lanczos3);
    Ok(Bitmap(resized.to_rgba8()))
}

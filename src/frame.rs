//! In-memory frame handling.
//!
//! - `Frame`: decoded image as an owned RGB8 buffer, loaded once per run.
//! - Model views: a stretched RGB square for the face mesh and a centered
//!   grayscale square for the emotion classifier.
//!
//! Frames live only for the duration of one analysis and are never written
//! back to disk.

use anyhow::{anyhow, Context, Result};
use image::{imageops, imageops::FilterType, GrayImage, RgbImage};
use std::path::Path;

/// Decoded image in RGB channel order, row-major, 3 bytes per pixel.
#[derive(Debug)]
pub struct Frame {
    data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl Frame {
    /// Decode an image file. The format is detected from the content, not the
    /// extension.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let image = image::ImageReader::open(path)
            .with_context(|| format!("cannot open image {}", path.display()))?
            .with_guessed_format()
            .with_context(|| format!("cannot read image {}", path.display()))?
            .decode()
            .with_context(|| format!("corrupted or unsupported image {}", path.display()))?;
        let rgb = image.into_rgb8();
        let (width, height) = rgb.dimensions();
        Self::from_rgb(rgb.into_raw(), width, height)
    }

    /// Wrap an existing RGB8 buffer.
    pub fn from_rgb(data: Vec<u8>, width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(anyhow!("image has no pixels ({}x{})", width, height));
        }
        let expected_len = (width as usize)
            .checked_mul(height as usize)
            .and_then(|v| v.checked_mul(3))
            .ok_or_else(|| anyhow!("frame dimensions overflow"))?;
        if data.len() != expected_len {
            return Err(anyhow!(
                "expected {} RGB bytes, received {}",
                expected_len,
                data.len()
            ));
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Raw RGB bytes.
    pub fn pixels(&self) -> &[u8] {
        &self.data
    }

    fn to_image(&self) -> Result<RgbImage> {
        RgbImage::from_raw(self.width, self.height, self.data.clone())
            .ok_or_else(|| anyhow!("frame buffer does not match its dimensions"))
    }

    /// Whole frame stretched to `side`×`side` RGB.
    ///
    /// Normalized coordinates on the result map 1:1 onto the original frame.
    pub fn resized_rgb(&self, side: u32) -> Result<RgbImage> {
        let image = self.to_image()?;
        Ok(imageops::resize(&image, side, side, FilterType::Triangle))
    }

    /// Largest centered square, converted to luma and resized to `side`×`side`.
    pub fn center_square_gray(&self, side: u32) -> Result<GrayImage> {
        let image = self.to_image()?;
        let edge = self.width.min(self.height);
        let x = (self.width - edge) / 2;
        let y = (self.height - edge) / 2;
        let crop = imageops::crop_imm(&image, x, y, edge, edge).to_image();
        let gray = imageops::grayscale(&crop);
        Ok(imageops::resize(&gray, side, side, FilterType::Triangle))
    }
}

//! RGB image buffer and the `.qif` binary dump format.
//!
//! A `.qif` file is a 4-byte signed width, a 4-byte signed height, then
//! `width * height * 3` raw bytes in row-major RGB order. There is no magic,
//! version or compression. The byte order of the two integers is not recorded
//! in the file, so it is fixed explicitly by [`QifByteOrder`] (little-endian
//! unless stated otherwise).

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use thiserror::Error;

use crate::mesh::Rgb;

/// Errors that can occur while reading, writing or exporting images.
#[derive(Error, Debug)]
pub enum ImageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid image dimensions: {width}x{height}")]
    InvalidDimensions { width: i64, height: i64 },

    #[error("Image dimensions {width}x{height} do not fit the qif header")]
    DimensionOverflow { width: u32, height: u32 },

    #[error("Truncated pixel data: expected {expected} bytes, found {actual}")]
    Truncated { expected: usize, actual: usize },

    #[error("Image encoding error: {0}")]
    Encode(#[from] image::ImageError),
}

pub type ImageResult<T> = Result<T, ImageError>;

/// Byte order of the two header integers in a `.qif` file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QifByteOrder {
    #[default]
    Little,
    Big,
}

impl QifByteOrder {
    fn encode(self, value: i32) -> [u8; 4] {
        match self {
            QifByteOrder::Little => value.to_le_bytes(),
            QifByteOrder::Big => value.to_be_bytes(),
        }
    }

    fn decode(self, bytes: [u8; 4]) -> i32 {
        match self {
            QifByteOrder::Little => i32::from_le_bytes(bytes),
            QifByteOrder::Big => i32::from_be_bytes(bytes),
        }
    }
}

/// Three-channel 8-bit image.
///
/// Pixels are stored row-major, three bytes per pixel (R, G, B). The buffer
/// is zeroed on construction and owned exclusively by the image.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Image {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Image {
    /// Allocate a black image.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; width as usize * height as usize * 3],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Byte offset of `channel` at pixel `(x, y)`.
    #[inline]
    pub fn index(&self, x: u32, y: u32, channel: usize) -> usize {
        (y as usize * self.width as usize + x as usize) * 3 + channel
    }

    /// Get one channel at (x, y). Channel 0 is R, 1 is G, 2 is B.
    pub fn get(&self, x: u32, y: u32, channel: usize) -> u8 {
        self.data[self.index(x, y, channel)]
    }

    /// Set one channel at (x, y). Channel 0 is R, 1 is G, 2 is B.
    pub fn set(&mut self, x: u32, y: u32, channel: usize, value: u8) {
        let i = self.index(x, y, channel);
        self.data[i] = value;
    }

    pub fn get_pixel(&self, x: u32, y: u32) -> Rgb {
        let i = self.index(x, y, 0);
        [self.data[i], self.data[i + 1], self.data[i + 2]]
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, color: Rgb) {
        let i = self.index(x, y, 0);
        self.data[i..i + 3].copy_from_slice(&color);
    }

    /// Zero every byte.
    pub fn clear(&mut self) {
        self.data.fill(0);
    }

    /// Set every pixel to `color`.
    pub fn fill(&mut self, color: Rgb) {
        for pixel in self.data.chunks_exact_mut(3) {
            pixel.copy_from_slice(&color);
        }
    }

    /// Raw row-major RGB bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Serialize as `.qif`.
    pub fn write_qif<W: Write>(&self, writer: &mut W, order: QifByteOrder) -> ImageResult<()> {
        let overflow = || ImageError::DimensionOverflow {
            width: self.width,
            height: self.height,
        };
        let width = i32::try_from(self.width).map_err(|_| overflow())?;
        let height = i32::try_from(self.height).map_err(|_| overflow())?;

        writer.write_all(&order.encode(width))?;
        writer.write_all(&order.encode(height))?;
        writer.write_all(&self.data)?;
        Ok(())
    }

    /// Deserialize a `.qif` stream.
    pub fn read_qif<R: Read>(reader: &mut R, order: QifByteOrder) -> ImageResult<Self> {
        let mut header = [0u8; 8];
        reader.read_exact(&mut header)?;
        let width = order.decode([header[0], header[1], header[2], header[3]]);
        let height = order.decode([header[4], header[5], header[6], header[7]]);

        if width < 0 || height < 0 {
            return Err(ImageError::InvalidDimensions {
                width: width as i64,
                height: height as i64,
            });
        }

        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(3))
            .ok_or(ImageError::InvalidDimensions {
                width: width as i64,
                height: height as i64,
            })?;

        // Grow with the bytes actually read; the header alone is untrusted
        let mut data = Vec::new();
        reader.take(expected as u64).read_to_end(&mut data)?;
        if data.len() != expected {
            return Err(ImageError::Truncated {
                expected,
                actual: data.len(),
            });
        }

        Ok(Self {
            width: width as u32,
            height: height as u32,
            data,
        })
    }

    /// Write a little-endian `.qif` file.
    pub fn save_qif(&self, path: impl AsRef<Path>) -> ImageResult<()> {
        self.save_qif_with_order(path, QifByteOrder::Little)
    }

    pub fn save_qif_with_order(
        &self,
        path: impl AsRef<Path>,
        order: QifByteOrder,
    ) -> ImageResult<()> {
        let mut writer = BufWriter::new(File::create(path.as_ref())?);
        self.write_qif(&mut writer, order)?;
        writer.flush()?;
        log::debug!(
            "Wrote {}x{} qif to {}",
            self.width,
            self.height,
            path.as_ref().display()
        );
        Ok(())
    }

    /// Read a little-endian `.qif` file.
    pub fn load_qif(path: impl AsRef<Path>) -> ImageResult<Self> {
        Self::load_qif_with_order(path, QifByteOrder::Little)
    }

    pub fn load_qif_with_order(path: impl AsRef<Path>, order: QifByteOrder) -> ImageResult<Self> {
        let mut reader = BufReader::new(File::open(path)?);
        Self::read_qif(&mut reader, order)
    }

    /// Copy into an `image::RgbImage`.
    pub fn to_rgb_image(&self) -> image::RgbImage {
        image::RgbImage::from_fn(self.width, self.height, |x, y| image::Rgb(self.get_pixel(x, y)))
    }

    /// Export to any format the `image` crate infers from the extension
    /// (normally `.png`).
    pub fn save_png(&self, path: impl AsRef<Path>) -> ImageResult<()> {
        self.to_rgb_image().save(path.as_ref())?;
        log::debug!("Exported image to {}", path.as_ref().display());
        Ok(())
    }
}

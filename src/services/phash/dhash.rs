use image::imageops::{self, FilterType};
use image::{DynamicImage, GrayImage, Luma};
use log::warn;

use crate::types::errors::{MatchError, MatchResult, NoSignal};

/// Length of a serialized hash: 64 bits as lowercase hex.
pub const HASH_HEX_LEN: usize = 16;

/// Maximum Hamming distance between two 64-bit hashes.
pub const MAX_DISTANCE: u32 = 64;

const GRID_WIDTH: u32 = 9;
const GRID_HEIGHT: u32 = 8;

/// Popcount of every 4-bit value.
const POP4: [u32; 16] = [0, 1, 1, 2, 1, 2, 2, 3, 1, 2, 2, 3, 2, 3, 3, 4];

/// A validated 64-bit difference hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PerceptualHash(u64);

impl PerceptualHash {
    /// Parse 16 hex digits (any case). Anything else is `InvalidHash`.
    pub fn parse(value: &str) -> MatchResult<Self> {
        let trimmed = value.trim();
        if !is_hex16(trimmed) {
            return Err(MatchError::InvalidHash(value.to_string()));
        }
        u64::from_str_radix(trimmed, 16)
            .map(PerceptualHash)
            .map_err(|_| MatchError::InvalidHash(value.to_string()))
    }

    pub fn bits(&self) -> u64 {
        self.0
    }

    pub fn to_hex(&self) -> String {
        format!("{:016x}", self.0)
    }

    pub fn distance(&self, other: &PerceptualHash) -> u32 {
        (self.0 ^ other.0).count_ones()
    }
}

impl std::fmt::Display for PerceptualHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// True when `value` is exactly 16 hexadecimal digits (case-insensitive).
pub fn is_hex16(value: &str) -> bool {
    value.len() == HASH_HEX_LEN && value.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Hamming distance between two serialized hashes, nibble by nibble.
///
/// Both inputs must pass [`is_hex16`]; the result is in `0..=64`.
pub fn hamming_distance(a: &str, b: &str) -> MatchResult<u32> {
    if !is_hex16(a) {
        return Err(MatchError::InvalidHash(a.to_string()));
    }
    if !is_hex16(b) {
        return Err(MatchError::InvalidHash(b.to_string()));
    }

    let mut distance = 0;
    for (left, right) in a.chars().zip(b.chars()) {
        let (Some(left), Some(right)) = (left.to_digit(16), right.to_digit(16)) else {
            return Err(MatchError::InvalidHash(format!("{a}/{b}")));
        };
        distance += POP4[(left ^ right) as usize];
    }
    Ok(distance)
}

/// Compute the dHash of an already decoded image.
///
/// Grayscale uses fixed luminance weights (0.299 R + 0.587 G + 0.114 B),
/// the image is resized to exactly 9×8 with a triangle filter, and each
/// row contributes 8 bits: 1 when the left pixel is darker than its right
/// neighbour. Bits are packed most-significant first.
///
/// Returns `None` for images without pixels.
pub fn dhash_image(image: &DynamicImage) -> Option<String> {
    if image.width() == 0 || image.height() == 0 {
        return None;
    }

    let gray = to_luma(image);
    let grid = imageops::resize(&gray, GRID_WIDTH, GRID_HEIGHT, FilterType::Triangle);

    let mut bits: u64 = 0;
    for y in 0..GRID_HEIGHT {
        for x in 0..GRID_WIDTH - 1 {
            let left = grid.get_pixel(x, y)[0];
            let right = grid.get_pixel(x + 1, y)[0];
            bits = (bits << 1) | u64::from(left < right);
        }
    }

    Some(PerceptualHash(bits).to_hex())
}

/// Decode raw image bytes and hash them.
///
/// Undecodable input is "no visual signal", never an error.
pub fn compute_image_hash(bytes: &[u8]) -> Option<String> {
    match decode(bytes) {
        Ok(image) => dhash_image(&image),
        Err(reason) => {
            warn!("Image hash unavailable: {reason}");
            None
        }
    }
}

fn decode(bytes: &[u8]) -> Result<DynamicImage, NoSignal> {
    image::load_from_memory(bytes).map_err(|e| NoSignal::Decode(e.to_string()))
}

fn to_luma(image: &DynamicImage) -> GrayImage {
    let rgb = image.to_rgb8();
    let mut gray = GrayImage::new(rgb.width(), rgb.height());
    for (x, y, pixel) in rgb.enumerate_pixels() {
        let [r, g, b] = pixel.0;
        let luma = 0.299 * f64::from(r) + 0.587 * f64::from(g) + 0.114 * f64::from(b);
        gray.put_pixel(x, y, Luma([luma.round().clamp(0.0, 255.0) as u8]));
    }
    gray
}

#[cfg(test)]
#[path = "tests/dhash_tests.rs"]
mod tests;

//! Captured frame encoding.

use image::codecs::jpeg::JpegEncoder;
use image::RgbImage;

use moodscan_common::error::MoodscanResult;

/// MIME type of every captured image.
pub const CAPTURE_CONTENT_TYPE: &str = "image/jpeg";

/// The artifact a confirmed capture session hands to its caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedImage {
    /// Encoded image bytes.
    pub bytes: Vec<u8>,
    /// MIME type of `bytes`.
    pub content_type: String,
    pub width: u32,
    pub height: u32,
}

/// Encode a frame as JPEG. `quality` is clamped to 1..=100.
pub fn encode_jpeg(frame: &RgbImage, quality: u8) -> MoodscanResult<Vec<u8>> {
    let mut buf = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut buf, quality.clamp(1, 100));
    encoder.encode_image(frame)?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn produces_decodable_jpeg() {
        let frame = RgbImage::from_pixel(32, 16, Rgb([200, 40, 40]));
        let jpeg = encode_jpeg(&frame, 80).unwrap();

        assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);
        let decoded = image::load_from_memory(&jpeg).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (32, 16));
    }

    #[test]
    fn lower_quality_is_smaller() {
        let frame = RgbImage::from_fn(64, 64, |x, y| Rgb([(x * 4) as u8, (y * 4) as u8, 128]));
        let high = encode_jpeg(&frame, 100).unwrap();
        let low = encode_jpeg(&frame, 10).unwrap();
        assert!(low.len() < high.len());
    }
}

//! Domain Services
//!
//! Pure byte inspection: format sniffing by magic number and header-only
//! dimension reading via `imagesize`. Short input is never an error.

use crate::domain::entities::{Dimensions, ImageFormat};

pub const JPEG_SIGNATURE: [u8; 3] = [0xFF, 0xD8, 0xFF];
pub const PNG_SIGNATURE: [u8; 4] = [0x89, 0x50, 0x4E, 0x47];
pub const RIFF_SIGNATURE: [u8; 4] = [0x52, 0x49, 0x46, 0x46];
pub const WEBP_SIGNATURE: [u8; 4] = [0x57, 0x45, 0x42, 0x50];
pub const GIF_SIGNATURE: [u8; 3] = [0x47, 0x49, 0x46];

const MIN_SNIFF_LEN: usize = 4;
const WEBP_MIN_LEN: usize = 12;

/// Result of format validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatCheck {
    pub valid: bool,
    pub format: Option<ImageFormat>,
}

impl FormatCheck {
    const INVALID: FormatCheck = FormatCheck {
        valid: false,
        format: None,
    };

    fn valid(format: ImageFormat) -> Self {
        Self {
            valid: true,
            format: Some(format),
        }
    }
}

/// Identify the image format from the leading bytes
///
/// Signatures are checked in order JPEG, PNG, WebP, GIF.
pub fn validate_format(buffer: &[u8]) -> FormatCheck {
    if buffer.len() < MIN_SNIFF_LEN {
        return FormatCheck::INVALID;
    }

    if buffer.starts_with(&JPEG_SIGNATURE) {
        return FormatCheck::valid(ImageFormat::Jpeg);
    }

    if buffer.starts_with(&PNG_SIGNATURE) {
        return FormatCheck::valid(ImageFormat::Png);
    }

    if buffer.len() >= WEBP_MIN_LEN
        && buffer.starts_with(&RIFF_SIGNATURE)
        && buffer.get(8..12) == Some(&WEBP_SIGNATURE[..])
    {
        return FormatCheck::valid(ImageFormat::Webp);
    }

    if buffer.starts_with(&GIF_SIGNATURE) {
        return FormatCheck::valid(ImageFormat::Gif);
    }

    FormatCheck::INVALID
}

/// Read width and height from the image header
///
/// Returns `None` when the header is truncated, malformed, or reports a zero side.
pub fn read_dimensions(buffer: &[u8]) -> Option<Dimensions> {
    let size = imagesize::blob_size(buffer).ok()?;
    let width = u32::try_from(size.width).ok()?;
    let height = u32::try_from(size.height).ok()?;

    if width == 0 || height == 0 {
        return None;
    }
    Some(Dimensions::new(width, height))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_buffer_is_invalid() {
        assert_eq!(validate_format(&[]), FormatCheck::INVALID);
        assert_eq!(validate_format(&[0xFF, 0xD8, 0xFF]), FormatCheck::INVALID);
        assert_eq!(validate_format(b"GIF"), FormatCheck::INVALID);
    }

    #[test]
    fn test_recognised_signatures() {
        let jpeg = [0xFF, 0xD8, 0xFF, 0xE0];
        assert_eq!(validate_format(&jpeg).format, Some(ImageFormat::Jpeg));

        let png = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
        assert_eq!(validate_format(&png).format, Some(ImageFormat::Png));

        let gif = b"GIF89a";
        assert_eq!(validate_format(gif).format, Some(ImageFormat::Gif));

        let webp = b"RIFF\x24\x00\x00\x00WEBPVP8 ";
        let check = validate_format(webp);
        assert!(check.valid);
        assert_eq!(check.format, Some(ImageFormat::Webp));
    }

    #[test]
    fn test_riff_without_webp_is_invalid() {
        assert!(!validate_format(b"RIFF\x24\x00\x00\x00WAVEfmt ").valid);
        // RIFF prefix but too short to carry the WEBP tag
        assert!(!validate_format(b"RIFF\x24\x00\x00\x00WEB").valid);
    }

    #[test]
    fn test_text_is_invalid() {
        assert!(!validate_format(b"not an image").valid);
    }

    #[test]
    fn test_png_dimensions() {
        let mut png = PNG_SIGNATURE.to_vec();
        png.extend_from_slice(&[0x0D, 0x0A, 0x1A, 0x0A]);
        png.extend_from_slice(&13u32.to_be_bytes());
        png.extend_from_slice(b"IHDR");
        png.extend_from_slice(&100u32.to_be_bytes());
        png.extend_from_slice(&50u32.to_be_bytes());
        png.extend_from_slice(&[8, 6, 0, 0, 0]);
        assert_eq!(read_dimensions(&png), Some(Dimensions::new(100, 50)));

        // Signature only
        assert_eq!(read_dimensions(&png[..8]), None);
    }

    #[test]
    fn test_gif_dimensions() {
        let gif89 = [b'G', b'I', b'F', b'8', b'9', b'a', 0x40, 0x01, 0xF0, 0x00, 0, 0, 0];
        assert_eq!(read_dimensions(&gif89), Some(Dimensions::new(320, 240)));

        let gif87 = [b'G', b'I', b'F', b'8', b'7', b'a', 0x10, 0x00, 0x20, 0x00, 0, 0, 0];
        assert_eq!(read_dimensions(&gif87), Some(Dimensions::new(16, 32)));
    }

    #[test]
    fn test_jpeg_dimensions_after_app0() {
        let mut jpeg = vec![0xFF, 0xD8];
        // APP0 with a 16-byte segment
        jpeg.extend_from_slice(&[0xFF, 0xE0, 0x00, 0x10]);
        jpeg.extend_from_slice(b"JFIF\0");
        jpeg.extend_from_slice(&[0x01, 0x01, 0x00, 0x00, 0x01, 0x00, 0x01, 0x00, 0x00]);
        // SOF0: length 17, precision 8, height 480, width 640
        jpeg.extend_from_slice(&[0xFF, 0xC0, 0x00, 0x11, 0x08, 0x01, 0xE0, 0x02, 0x80]);
        jpeg.extend_from_slice(&[0x03, 0x01, 0x22, 0x00, 0x02, 0x11, 0x01, 0x03, 0x11, 0x01]);
        assert_eq!(read_dimensions(&jpeg), Some(Dimensions::new(640, 480)));
    }

    #[test]
    fn test_progressive_jpeg_dimensions() {
        let mut jpeg = vec![0xFF, 0xD8];
        // SOF2: height 200, width 320
        jpeg.extend_from_slice(&[0xFF, 0xC2, 0x00, 0x11, 0x08, 0x00, 0xC8, 0x01, 0x40]);
        jpeg.extend_from_slice(&[0x03, 0x01, 0x22, 0x00, 0x02, 0x11, 0x01, 0x03, 0x11, 0x01]);
        assert_eq!(read_dimensions(&jpeg), Some(Dimensions::new(320, 200)));
    }

    #[test]
    fn test_truncated_jpeg_is_unknown() {
        // APP0 claims 16 bytes that never arrive
        let jpeg = [0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10];
        assert_eq!(read_dimensions(&jpeg), None);
    }

    #[test]
    fn test_webp_vp8x_dimensions() {
        let mut webp = b"RIFF\x00\x00\x00\x00WEBPVP8X".to_vec();
        webp.extend_from_slice(&10u32.to_le_bytes());
        webp.extend_from_slice(&[0u8; 4]);
        // canvas 1920x1080, stored minus one
        webp.extend_from_slice(&[0x7F, 0x07, 0x00, 0x37, 0x04, 0x00]);
        assert_eq!(read_dimensions(&webp), Some(Dimensions::new(1920, 1080)));
    }

    #[test]
    fn test_webp_vp8_dimensions() {
        let mut webp = b"RIFF\x00\x00\x00\x00WEBPVP8 ".to_vec();
        webp.extend_from_slice(&10u32.to_le_bytes());
        // frame tag, start code, then 14-bit width 64 and height 48
        webp.extend_from_slice(&[0x00, 0x00, 0x00, 0x9D, 0x01, 0x2A]);
        webp.extend_from_slice(&64u16.to_le_bytes());
        webp.extend_from_slice(&48u16.to_le_bytes());
        assert_eq!(read_dimensions(&webp), Some(Dimensions::new(64, 48)));
    }

    #[test]
    fn test_webp_vp8l_dimensions() {
        let mut webp = b"RIFF\x00\x00\x00\x00WEBPVP8L".to_vec();
        webp.extend_from_slice(&5u32.to_le_bytes());
        webp.push(0x2F);
        // width 16, height 8 -> (15) | (7 << 14)
        let packed: u32 = 15 | (7 << 14);
        webp.extend_from_slice(&packed.to_le_bytes());
        assert_eq!(read_dimensions(&webp), Some(Dimensions::new(16, 8)));
    }

    #[test]
    fn test_zero_side_is_unknown() {
        let gif = [b'G', b'I', b'F', b'8', b'9', b'a', 0x00, 0x00, 0x10, 0x00, 0, 0, 0];
        assert_eq!(read_dimensions(&gif), None);
    }
}

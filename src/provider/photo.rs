// src/provider/photo.rs — Re-encode photos as JPEG data URIs

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use std::io::Cursor;

use crate::infra::errors::MirrorsError;

/// Decode any supported image, re-encode as JPEG at `quality` and wrap it in a
/// `data:image/jpeg;base64,` URI.
pub fn jpeg_data_uri(image: &[u8], quality: u8) -> Result<String, MirrorsError> {
    let decoded = ::image::load_from_memory(image)
        .map_err(|e| MirrorsError::DataConversion(format!("unreadable image: {e}")))?;
    let rgb = decoded.to_rgb8();

    let mut buffer = Cursor::new(Vec::new());
    let encoder =
        ::image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buffer, quality.clamp(1, 100));
    rgb.write_with_encoder(encoder)
        .map_err(|e| MirrorsError::DataConversion(format!("JPEG encoding failed: {e}")))?;

    Ok(format!(
        "data:image/jpeg;base64,{}",
        BASE64.encode(buffer.into_inner())
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_bytes() -> Vec<u8> {
        let img = ::image::RgbImage::from_pixel(4, 4, ::image::Rgb([200, 40, 90]));
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, ::image::ImageFormat::Png).unwrap();
        buf.into_inner()
    }

    #[test]
    fn test_png_becomes_jpeg_data_uri() {
        let uri = jpeg_data_uri(&png_bytes(), 80).unwrap();
        let encoded = uri.strip_prefix("data:image/jpeg;base64,").unwrap();
        let jpeg = BASE64.decode(encoded).unwrap();
        // JPEG SOI marker
        assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn test_garbage_is_data_conversion_error() {
        let err = jpeg_data_uri(b"definitely not an image", 80).unwrap_err();
        assert!(matches!(err, MirrorsError::DataConversion(_)));
    }

    #[test]
    fn test_empty_input_is_data_conversion_error() {
        assert!(matches!(
            jpeg_data_uri(&[], 80),
            Err(MirrorsError::DataConversion(_))
        ));
    }
}

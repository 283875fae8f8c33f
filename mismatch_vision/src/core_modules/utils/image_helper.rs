use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use image::codecs::png::PngEncoder;
use image::{DynamicImage, ImageEncoder, RgbaImage};

use crate::error::Result;

/// Reads and decodes an image file. The format is guessed from the content.
pub fn load(path: impl AsRef<Path>) -> Result<DynamicImage> {
    let bytes = std::fs::read(path.as_ref())?;
    decode(&bytes)
}

/// Decodes an in-memory image buffer.
pub fn decode(bytes: &[u8]) -> Result<DynamicImage> {
    Ok(image::load_from_memory(bytes)?)
}

/// Encodes an RGBA image as PNG into a byte buffer.
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    write_png(&mut buffer, image)?;
    Ok(buffer)
}

/// Writes an RGBA image to `path` as PNG.
pub fn save_png(path: impl AsRef<Path>, image: &RgbaImage) -> Result<()> {
    let mut output = BufWriter::new(File::create(path)?);
    write_png(&mut output, image)?;
    output.flush()?;
    Ok(())
}

fn write_png<W: Write>(writer: W, image: &RgbaImage) -> Result<()> {
    let encoder = PngEncoder::new(writer);
    encoder.write_image(
        image.as_raw(),
        image.width(),
        image.height(),
        image::ExtendedColorType::Rgba8,
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MismatchError;
    use image::Rgba;

    #[test]
    fn save_and_load_gradient_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gradient_file.png");

        let mut image = RgbaImage::from_pixel(50, 20, Rgba([255, 255, 255, 255]));
        let mut intensity = 0u8;
        for pixel in image.pixels_mut() {
            pixel.0[0] = intensity;
            pixel.0[1] = intensity;
            pixel.0[2] = intensity;
            intensity = intensity.wrapping_add(1);
        }

        save_png(&path, &image).expect("Error Saving File.");
        let loaded = load(&path).expect("Error Loading File.");
        assert_eq!(loaded.to_rgba8(), image);
    }

    #[test]
    fn encoded_buffer_decodes() {
        let image = RgbaImage::from_pixel(3, 7, Rgba([1, 2, 3, 255]));
        let bytes = encode_png(&image).unwrap();
        assert_eq!(&bytes[1..4], b"PNG");
        let decoded = decode(&bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (3, 7));
    }

    #[test]
    fn garbage_is_a_decode_failure() {
        let err = decode(b"definitely not an image").unwrap_err();
        assert!(matches!(err, MismatchError::Decode(_)));
    }

    #[test]
    fn missing_file_is_an_io_failure() {
        let dir = tempfile::tempdir().unwrap();
        let err = load(dir.path().join("missing.png")).unwrap_err();
        assert!(matches!(err, MismatchError::Io(_)));
    }
}

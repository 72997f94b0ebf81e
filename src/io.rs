// ============================================================================
// OUTPUT ENCODING — PNG files, data URIs, and SVG filter wrappers
// ============================================================================

use image::codecs::png::PngEncoder;
use image::{ImageError, RgbaImage};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Encode and write a displacement map as a PNG file.
/// Standalone function so it can run on a background thread.
pub fn encode_and_write(image: &RgbaImage, path: &Path) -> Result<(), ImageError> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    let encoder = PngEncoder::new(&mut writer);
    #[allow(deprecated)]
    encoder.encode(
        image.as_raw(),
        image.width(),
        image.height(),
        image::ColorType::Rgba8,
    )?;
    Ok(())
}

/// Encode to PNG bytes in memory.
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, ImageError> {
    let mut bytes = Vec::new();
    let encoder = PngEncoder::new(&mut bytes);
    #[allow(deprecated)]
    encoder.encode(
        image.as_raw(),
        image.width(),
        image.height(),
        image::ColorType::Rgba8,
    )?;
    Ok(bytes)
}

/// `data:image/png;base64,...` URI for embedding the map in SVG or CSS.
pub fn png_data_url(image: &RgbaImage) -> Result<String, ImageError> {
    let bytes = encode_png(image)?;
    Ok(format!("data:image/png;base64,{}", base64_encode(&bytes)))
}

/// Base64 encode bytes for the data URI.
fn base64_encode(data: &[u8]) -> String {
    const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

    let mut result = String::with_capacity(data.len().div_ceil(3) * 4);

    for chunk in data.chunks(3) {
        let mut buf = [0u8; 3];
        buf[..chunk.len()].copy_from_slice(chunk);

        let n = (u32::from(buf[0]) << 16) | (u32::from(buf[1]) << 8) | u32::from(buf[2]);

        result.push(ALPHABET[(n >> 18) as usize & 0x3F] as char);
        result.push(ALPHABET[(n >> 12) as usize & 0x3F] as char);

        if chunk.len() > 1 {
            result.push(ALPHABET[(n >> 6) as usize & 0x3F] as char);
        } else {
            result.push('=');
        }

        if chunk.len() > 2 {
            result.push(ALPHABET[n as usize & 0x3F] as char);
        } else {
            result.push('=');
        }
    }

    result
}

/// Build a standalone SVG document carrying the displacement filter chain:
/// the map embedded via `feImage`, an `feDisplacementMap` reading x from R
/// and y from G at the given composite-time `scale`, and a zero-strength
/// blur slot left in the chain for hosts that want to soften the result.
pub fn svg_filter_document(
    image: &RgbaImage,
    filter_id: &str,
    scale: f32,
) -> Result<String, ImageError> {
    let data_url = png_data_url(image)?;
    let (w, h) = image.dimensions();

    Ok(format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" color-interpolation-filters="sRGB" width="0" height="0">
  <defs>
    <filter id="{id}" filterUnits="objectBoundingBox" primitiveUnits="userSpaceOnUse" x="0" y="0" width="1" height="1">
      <feImage href="{href}" x="0" y="0" width="{w}" height="{h}" result="displacementMap" preserveAspectRatio="none"/>
      <feDisplacementMap in="SourceGraphic" in2="displacementMap" scale="{scale}" xChannelSelector="R" yChannelSelector="G" result="displaced"/>
      <feGaussianBlur in="displaced" stdDeviation="0"/>
    </filter>
  </defs>
</svg>
"#,
        id = filter_id,
        href = data_url,
        w = w,
        h = h,
        scale = scale,
    ))
}

/// Write the SVG filter document next to (or instead of) the raw PNG.
pub fn write_svg_filter(
    image: &RgbaImage,
    path: &Path,
    filter_id: &str,
    scale: f32,
) -> Result<(), ImageError> {
    let doc = svg_filter_document(image, filter_id, scale)?;
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    writer.write_all(doc.as_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checker(w: u32, h: u32) -> RgbaImage {
        RgbaImage::from_fn(w, h, |x, y| {
            if (x + y) % 2 == 0 {
                image::Rgba([200, 60, 128, 255])
            } else {
                image::Rgba([128, 128, 128, 255])
            }
        })
    }

    #[test]
    fn base64_known_vectors() {
        assert_eq!(base64_encode(b""), "");
        assert_eq!(base64_encode(b"M"), "TQ==");
        assert_eq!(base64_encode(b"Ma"), "TWE=");
        assert_eq!(base64_encode(b"Man"), "TWFu");
        assert_eq!(base64_encode(b"light work."), "bGlnaHQgd29yay4=");
    }

    #[test]
    fn png_round_trip_is_lossless() {
        let img = checker(16, 9);
        let bytes = encode_png(&img).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap().into_rgba8();
        assert_eq!(decoded.dimensions(), img.dimensions());
        assert_eq!(decoded.as_raw(), img.as_raw());
    }

    #[test]
    fn data_url_has_png_prefix() {
        let url = png_data_url(&checker(4, 4)).unwrap();
        assert!(url.starts_with("data:image/png;base64,"));
        // PNG magic bytes \x89PNG encode to "iVBO"
        assert!(url["data:image/png;base64,".len()..].starts_with("iVBO"));
    }

    #[test]
    fn svg_filter_wires_channels_and_scale() {
        let doc = svg_filter_document(&checker(8, 8), "liquidGlassFilter", 44.0).unwrap();
        assert!(doc.contains(r#"id="liquidGlassFilter""#));
        assert!(doc.contains(r#"scale="44""#));
        assert!(doc.contains(r#"xChannelSelector="R""#));
        assert!(doc.contains(r#"yChannelSelector="G""#));
        assert!(doc.contains(r#"width="8" height="8""#));
        assert!(doc.contains("data:image/png;base64,"));
    }
}

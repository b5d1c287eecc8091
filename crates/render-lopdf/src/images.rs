//! Raster images as PDF image XObjects.

use crate::writer::{StreamingPdfWriter, flate_compress};
use image::{DynamicImage, ExtendedColorType, ImageDecoder, ImageFormat, ImageReader};
use lopdf::{Dictionary, Object, ObjectId, Stream};
use ofdrender_render_core::RenderError;
use std::io::{Cursor, Seek, Write};

/// Declared formats the renderer places.
pub const SUPPORTED_FORMATS: [&str; 3] = ["JPG", "JPEG", "PNG"];

pub fn is_supported_format(format: &str) -> bool {
    SUPPORTED_FORMATS.contains(&format.trim().to_ascii_uppercase().as_str())
}

/// An image ready to be written as an XObject.
#[derive(Debug, Clone)]
pub struct PdfImage {
    width: u32,
    height: u32,
    color_space: &'static str,
    filter: &'static str,
    data: Vec<u8>,
    /// Flate-compressed 8-bit alpha channel, when any pixel is translucent.
    smask: Option<Vec<u8>>,
}

impl PdfImage {
    /// Decodes resource bytes. Baseline JPEG is passed through untouched.
    pub fn decode(bytes: &[u8]) -> Result<Self, RenderError> {
        if image::guess_format(bytes).ok() == Some(ImageFormat::Jpeg) {
            if let Some(passthrough) = Self::jpeg_passthrough(bytes) {
                return Ok(passthrough);
            }
        }
        let decoded = image::load_from_memory(bytes)
            .map_err(|e| RenderError::Decode(format!("image bytes could not be decoded: {}", e)))?;
        Self::from_dynamic(&decoded)
    }

    fn jpeg_passthrough(bytes: &[u8]) -> Option<Self> {
        let decoder = ImageReader::with_format(Cursor::new(bytes), ImageFormat::Jpeg)
            .into_decoder()
            .ok()?;
        let (width, height) = decoder.dimensions();
        let color_space = match decoder.original_color_type() {
            ExtendedColorType::L8 => "DeviceGray",
            ExtendedColorType::Rgb8 => "DeviceRGB",
            // CMYK and friends get re-encoded.
            _ => return None,
        };
        Some(Self {
            width,
            height,
            color_space,
            filter: "DCTDecode",
            data: bytes.to_vec(),
            smask: None,
        })
    }

    /// Flate-compressed RGB plus an optional soft mask.
    pub fn from_dynamic(img: &DynamicImage) -> Result<Self, RenderError> {
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        let mut rgb = Vec::with_capacity(width as usize * height as usize * 3);
        let mut alpha = Vec::with_capacity(width as usize * height as usize);
        let mut opaque = true;
        for pixel in rgba.pixels() {
            let [r, g, b, a] = pixel.0;
            rgb.extend_from_slice(&[r, g, b]);
            alpha.push(a);
            opaque &= a == u8::MAX;
        }
        let smask = if opaque { None } else { Some(flate_compress(&alpha)?) };
        Ok(Self {
            width,
            height,
            color_space: "DeviceRGB",
            filter: "FlateDecode",
            data: flate_compress(&rgb)?,
            smask,
        })
    }

    /// Natural size in pixels.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn has_alpha(&self) -> bool {
        self.smask.is_some()
    }

    fn image_dict(&self, color_space: &str, filter: &str) -> Dictionary {
        let mut dict = Dictionary::new();
        dict.set("Type", "XObject");
        dict.set("Subtype", "Image");
        dict.set("Width", i64::from(self.width));
        dict.set("Height", i64::from(self.height));
        dict.set("ColorSpace", color_space);
        dict.set("BitsPerComponent", 8i64);
        dict.set("Filter", filter);
        dict
    }

    pub(crate) fn write_objects<W: Write + Seek>(
        &self,
        writer: &mut StreamingPdfWriter<W>,
    ) -> Result<ObjectId, RenderError> {
        let mut dict = self.image_dict(self.color_space, self.filter);
        if let Some(mask) = &self.smask {
            let mask_dict = self.image_dict("DeviceGray", "FlateDecode");
            let mask_id = writer.write_object(&Object::Stream(Stream::new(mask_dict, mask.clone())))?;
            dict.set("SMask", mask_id);
        }
        Ok(writer.write_object(&Object::Stream(Stream::new(dict, self.data.clone())))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn png_bytes(img: &RgbaImage) -> Vec<u8> {
        let mut out = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(img.clone()).write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn opaque_png_has_no_mask() {
        let img = RgbaImage::from_pixel(3, 2, Rgba([10, 20, 30, 255]));
        let pdf = PdfImage::decode(&png_bytes(&img)).unwrap();
        assert_eq!(pdf.dimensions(), (3, 2));
        assert!(!pdf.has_alpha());
        assert_eq!(pdf.filter, "FlateDecode");
    }

    #[test]
    fn translucent_png_gets_a_soft_mask() {
        let mut img = RgbaImage::from_pixel(2, 2, Rgba([255, 0, 0, 255]));
        img.put_pixel(0, 0, Rgba([255, 0, 0, 0]));
        let pdf = PdfImage::decode(&png_bytes(&img)).unwrap();
        assert!(pdf.has_alpha());
    }

    #[test]
    fn garbage_is_a_decode_error() {
        assert!(matches!(PdfImage::decode(b"not an image"), Err(RenderError::Decode(_))));
    }

    #[test]
    fn supported_formats_are_case_insensitive() {
        assert!(is_supported_format("png"));
        assert!(is_supported_format("Jpeg"));
        assert!(!is_supported_format("GIF"));
        assert!(!is_supported_format(""));
    }
}

//! Image to PDF assembly.
//!
//! Each input image becomes one PDF page whose media box matches the image
//! pixel dimensions (one pixel per point). Pixels are re-encoded as JPEG and
//! embedded as `DCTDecode` XObjects, which keeps the output compact without
//! an external converter.

use image::GenericImageView;
use image::codecs::jpeg::JpegEncoder;
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};

use crate::error::ConversionError;

const JPEG_QUALITY: u8 = 85;

/// Assemble the given images, in input order, into a single PDF.
pub fn images_to_pdf(images: &[Vec<u8>]) -> Result<Vec<u8>, ConversionError> {
    if images.is_empty() {
        return Err(ConversionError::InvalidInput(
            "At least one image is required".to_string(),
        ));
    }

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let mut kids = Vec::with_capacity(images.len());

    for data in images {
        let img = image::load_from_memory(data)?;
        let (width, height) = img.dimensions();

        let mut jpeg = Vec::new();
        img.to_rgb8()
            .write_with_encoder(JpegEncoder::new_with_quality(&mut jpeg, JPEG_QUALITY))?;

        let xobject = Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => width as i64,
                "Height" => height as i64,
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8,
                "Filter" => "DCTDecode",
            },
            jpeg,
        )
        .with_compression(false);
        let xobject_id = doc.add_object(xobject);

        let content = Content {
            operations: vec![
                Operation::new("q", vec![]),
                Operation::new(
                    "cm",
                    vec![
                        (width as i64).into(),
                        0.into(),
                        0.into(),
                        (height as i64).into(),
                        0.into(),
                        0.into(),
                    ],
                ),
                Operation::new("Do", vec!["Im0".into()]),
                Operation::new("Q", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => Object::Reference(pages_id),
            "MediaBox" => vec![
                0.into(),
                0.into(),
                (width as i64).into(),
                (height as i64).into(),
            ],
            "Contents" => Object::Reference(content_id),
            "Resources" => dictionary! {
                "XObject" => dictionary! { "Im0" => Object::Reference(xobject_id) },
            },
        });
        kids.push(Object::Reference(page_id));
    }

    let pages_dict = dictionary! {
        "Type" => "Pages",
        "Count" => kids.len() as i64,
        "Kids" => kids,
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => Object::Reference(pages_id),
    });
    doc.trailer.set("Root", catalog_id);

    let mut buf = Vec::new();
    doc.save_to(&mut buf)?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::page_count;
    use image::{ImageFormat, RgbImage};
    use std::io::Cursor;

    fn sample_png(width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::from_pixel(width, height, image::Rgb([200, 40, 40]));
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageFormat::Png).unwrap();
        buf.into_inner()
    }

    #[test]
    fn one_page_per_image_in_order() {
        let out = images_to_pdf(&[sample_png(4, 4), sample_png(8, 2), sample_png(2, 2)]).unwrap();
        assert!(out.starts_with(b"%PDF"));
        assert_eq!(page_count(&out).unwrap(), 3);
    }

    #[test]
    fn empty_input_is_rejected() {
        assert!(matches!(
            images_to_pdf(&[]),
            Err(ConversionError::InvalidInput(_))
        ));
    }

    #[test]
    fn undecodable_image_is_rejected() {
        assert!(matches!(
            images_to_pdf(&[b"not an image".to_vec()]),
            Err(ConversionError::Image(_))
        ));
    }
}

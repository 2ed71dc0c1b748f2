//! Raster image helpers shared by the snapshot and asset loaders.

use image::{DynamicImage, GenericImageView, ImageResult, RgbImage};

use crate::model::Size;

/// Resolution `printpdf` assumes for embedded images.
pub const IMAGE_DPI: f64 = 300.0;
const MM_PER_INCH: f64 = 25.4;

/// Decodes an image held in memory, guessing the format from its header.
pub fn decode_image_from_bytes(bytes: impl AsRef<[u8]>) -> ImageResult<DynamicImage> {
    image::load_from_memory(bytes.as_ref())
}

/// Composites any alpha channel onto white and drops it.
///
/// PDF images are embedded without a soft mask, so transparent pixels have to be
/// resolved against the white backing they are drawn on.
pub fn flatten_onto_white(image: &DynamicImage) -> RgbImage {
    let rgba = image.to_rgba8();
    RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let [r, g, b, a] = rgba.get_pixel(x, y).0;
        let alpha = u32::from(a);
        let over_white = |channel: u8| -> u8 {
            ((u32::from(channel) * alpha + 255 * (255 - alpha) + 127) / 255) as u8
        };
        image::Rgb([over_white(r), over_white(g), over_white(b)])
    })
}

/// Size of `image` when embedded at [`IMAGE_DPI`] without scaling.
pub fn natural_size(image: &DynamicImage) -> Size {
    let (width, height) = image.dimensions();
    Size::new(
        MM_PER_INCH * f64::from(width) / IMAGE_DPI,
        MM_PER_INCH * f64::from(height) / IMAGE_DPI,
    )
}

/// Horizontal and vertical scale factors that stretch `image` to `target`.
pub fn scale_factors(image: &DynamicImage, target: Size) -> (f64, f64) {
    let natural = natural_size(image);
    let factor = |target: f64, natural: f64| if natural > 0.0 { target / natural } else { 1.0 };
    (
        factor(target.width, natural.width),
        factor(target.height, natural.height),
    )
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use image::{ImageOutputFormat, Rgba, RgbaImage};

    use super::*;

    #[test]
    fn transparent_pixels_become_white() {
        let mut rgba = RgbaImage::new(2, 1);
        rgba.put_pixel(0, 0, Rgba([0, 0, 0, 0]));
        rgba.put_pixel(1, 0, Rgba([10, 20, 30, 255]));
        let flat = flatten_onto_white(&DynamicImage::ImageRgba8(rgba));
        assert_eq!(flat.get_pixel(0, 0).0, [255, 255, 255]);
        assert_eq!(flat.get_pixel(1, 0).0, [10, 20, 30]);
    }

    #[test]
    fn natural_size_uses_the_embedding_resolution() {
        let image = DynamicImage::ImageRgb8(RgbImage::new(300, 600));
        let size = natural_size(&image);
        assert_relative_eq!(size.width, 25.4);
        assert_relative_eq!(size.height, 50.8);

        let (sx, sy) = scale_factors(&image, Size::new(50.8, 50.8));
        assert_relative_eq!(sx, 2.0);
        assert_relative_eq!(sy, 1.0);
    }

    #[test]
    fn decodes_png_bytes() {
        let mut bytes = Vec::new();
        DynamicImage::ImageRgb8(RgbImage::new(4, 3))
            .write_to(&mut bytes, ImageOutputFormat::Png)
            .expect("encode png");
        let decoded = decode_image_from_bytes(&bytes).expect("decode png");
        assert_eq!(decoded.dimensions(), (4, 3));
        assert!(decode_image_from_bytes(b"not an image").is_err());
    }
}

use image::{GrayImage, Luma, RgbaImage};

/// Converts a region to a binary image ready for OCR.
///
/// The region is converted to grayscale, then inverted-thresholded: pixels
/// brighter than `threshold` become black (0), everything else white (255).
/// A light UI background therefore turns dark and dark text turns bright.
///
/// 150 works for phone photos of a laptop screen.
pub fn threshold_inverse(img: &RgbaImage, threshold: u8) -> GrayImage {
    let (width, height) = img.dimensions();
    if width == 0 || height == 0 {
        return GrayImage::new(width, height);
    }

    let mut gray = image::imageops::grayscale(img);

    for pixel in gray.pixels_mut() {
        let value = if pixel[0] > threshold { 0u8 } else { 255u8 };
        *pixel = Luma([value]);
    }

    gray
}

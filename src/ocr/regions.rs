//! Fixed-layout region split for the problem UI.
//!
//! The problem page is assumed to be laid out left to right: statement, code
//! editor, test panel. No content-aware detection is attempted.

use image::RgbaImage;

/// Fraction of the width taken by the problem statement.
const PROBLEM_FRACTION: f64 = 0.3;

/// Fraction of the width taken by the code editor.
const CODE_FRACTION: f64 = 0.4;

/// The three bands of a captured problem page.
#[derive(Debug, Clone)]
pub struct ProblemRegions {
    pub problem: RgbaImage,
    pub code: RgbaImage,
    pub tests: RgbaImage,
}

/// Pixel widths of the three bands for an image `width` pixels wide.
///
/// The test band takes whatever is left, so the widths always sum to `width`.
pub fn band_widths(width: u32) -> (u32, u32, u32) {
    let problem = ((PROBLEM_FRACTION * width as f64).round() as u32).min(width);
    let code = ((CODE_FRACTION * width as f64).round() as u32).min(width - problem);
    (problem, code, width - problem - code)
}

/// Splits an image into problem / code / tests bands, each full height.
///
/// Images 2 px wide or less produce empty bands; that is accepted.
pub fn detect_regions(img: &RgbaImage) -> ProblemRegions {
    let (w, h) = img.dimensions();
    let (problem_w, code_w, tests_w) = band_widths(w);

    ProblemRegions {
        problem: image::imageops::crop_imm(img, 0, 0, problem_w, h).to_image(),
        code: image::imageops::crop_imm(img, problem_w, 0, code_w, h).to_image(),
        tests: image::imageops::crop_imm(img, problem_w + code_w, 0, tests_w, h).to_image(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_band_widths() {
        assert_eq!(band_widths(100), (30, 40, 30));
        assert_eq!(band_widths(1920), (576, 768, 576));
        // round(0.3 * 7) = 2, round(0.4 * 7) = 3
        assert_eq!(band_widths(7), (2, 3, 2));
    }

    #[test]
    fn test_band_widths_degenerate() {
        assert_eq!(band_widths(0), (0, 0, 0));
        assert_eq!(band_widths(1), (0, 0, 1));
        assert_eq!(band_widths(2), (1, 1, 0));
    }

    #[test]
    fn test_detect_regions_dimensions() {
        let img = RgbaImage::new(101, 37);
        let regions = detect_regions(&img);

        let p = (0.3f64 * 101.0).round() as u32;
        let c = (0.4f64 * 101.0).round() as u32;
        assert_eq!(regions.problem.dimensions(), (p, 37));
        assert_eq!(regions.code.dimensions(), (c, 37));
        assert_eq!(regions.tests.dimensions(), (101 - p - c, 37));
    }

    #[test]
    fn test_detect_regions_pixels_come_from_right_band() {
        // Each column stores its own x coordinate in the red channel
        let img: RgbaImage = RgbaImage::from_fn(10, 2, |x, _| Rgba([x as u8, 0, 0, 255]));
        let regions = detect_regions(&img);

        assert_eq!(regions.problem.get_pixel(0, 0)[0], 0);
        assert_eq!(regions.code.get_pixel(0, 1)[0], 3);
        assert_eq!(regions.tests.get_pixel(0, 0)[0], 7);
        assert_eq!(regions.tests.get_pixel(2, 1)[0], 9);
    }

    #[test]
    fn test_detect_regions_degenerate_width() {
        let img = RgbaImage::new(1, 5);
        let regions = detect_regions(&img);
        assert_eq!(regions.problem.width(), 0);
        assert_eq!(regions.code.width(), 0);
        assert_eq!(regions.tests.dimensions(), (1, 5));
    }
}

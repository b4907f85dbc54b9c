pub mod engine;
pub mod extract;
pub mod preprocess;
pub mod regions;
pub mod setup;

pub use engine::TesseractEngine;
pub use extract::parse_content;
pub use regions::detect_regions;

use image::RgbaImage;
use std::path::Path;

use crate::error::SolverResult;
use preprocess::threshold_inverse;

/// Turns one region of a capture into text.
pub trait TextExtractor {
    fn extract_text(&self, region: &RgbaImage) -> SolverResult<String>;
}

/// Local OCR: inverse threshold, then tesseract.
pub struct TesseractExtractor {
    engine: TesseractEngine,
    threshold: u8,
}

impl TesseractExtractor {
    pub fn new(engine: TesseractEngine, threshold: u8) -> Self {
        Self { engine, threshold }
    }

    /// Locates tesseract and its data directory.
    pub fn discover(explicit: Option<&Path>, threshold: u8) -> SolverResult<Self> {
        let executable = setup::find_tesseract_executable(explicit)?;
        let tessdata = setup::find_tessdata_dir();
        log::info!(
            "Using tesseract at {} (tessdata: {})",
            executable.display(),
            tessdata
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "built-in default".to_string())
        );
        Ok(Self::new(TesseractEngine::new(executable, tessdata), threshold))
    }
}

impl TextExtractor for TesseractExtractor {
    fn extract_text(&self, region: &RgbaImage) -> SolverResult<String> {
        // Narrow captures give empty bands; there is nothing to read
        if region.width() == 0 || region.height() == 0 {
            return Ok(String::new());
        }

        let preprocessed = threshold_inverse(region, self.threshold);
        let lines = self.engine.recognize(&preprocessed)?;
        if !lines.is_empty() {
            let mean = lines.iter().map(|l| l.confidence).sum::<f32>() / lines.len() as f32;
            log::debug!("OCR read {} lines, mean confidence {:.1}", lines.len(), mean);
        }
        Ok(lines
            .into_iter()
            .map(|line| line.text)
            .collect::<Vec<_>>()
            .join("\n"))
    }
}

/// OCR text of the three bands of a capture.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegionTexts {
    pub problem: String,
    pub code: String,
    pub tests: String,
}

/// Splits the capture into bands and runs the extractor on each.
pub fn ocr_regions<E: TextExtractor + ?Sized>(
    extractor: &E,
    img: &RgbaImage,
) -> SolverResult<RegionTexts> {
    let regions = detect_regions(img);
    log::debug!(
        "Regions: problem {}px, code {}px, tests {}px",
        regions.problem.width(),
        regions.code.width(),
        regions.tests.width()
    );

    Ok(RegionTexts {
        problem: extractor.extract_text(&regions.problem)?,
        code: extractor.extract_text(&regions.code)?,
        tests: extractor.extract_text(&regions.tests)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Reports the width of each region it is asked to read.
    struct WidthReporter;

    impl TextExtractor for WidthReporter {
        fn extract_text(&self, region: &RgbaImage) -> SolverResult<String> {
            Ok(region.width().to_string())
        }
    }

    #[test]
    fn test_ocr_regions_reads_bands_in_order() {
        let img = RgbaImage::new(100, 10);
        let texts = ocr_regions(&WidthReporter, &img).unwrap();
        assert_eq!(
            texts,
            RegionTexts {
                problem: "30".to_string(),
                code: "40".to_string(),
                tests: "30".to_string(),
            }
        );
    }

    #[test]
    fn test_narrow_capture_does_not_panic() {
        let extractor = TesseractExtractor::new(
            TesseractEngine::new("/nonexistent/tesseract".into(), None),
            150,
        );

        // Zero-width bands never reach tesseract
        assert_eq!(extractor.extract_text(&RgbaImage::new(0, 40)).unwrap(), "");

        // A 1px capture leaves only the test band non-empty, which fails on
        // the missing binary instead of panicking in preprocessing
        let result = ocr_regions(&extractor, &RgbaImage::new(1, 40));
        assert!(matches!(result, Err(crate::error::SolverError::Extraction(_))));
    }
}

//! Capture-to-solution pipelines and the loop that drives them.

pub mod ocr;
pub mod vision;

pub use ocr::OcrPipeline;
pub use vision::VisionPipeline;

use anyhow::Result;
use std::path::PathBuf;

use crate::capture::{CaptureEvent, ImageSource};

/// Turns one capture into persisted output. Returns the solution file.
pub trait Pipeline {
    fn process(&self, event: &CaptureEvent) -> Result<PathBuf>;
}

/// Captures and processes images until the source runs dry or the user
/// cancels. Without `continuous`, the first successful cycle ends the loop and
/// the first failure is returned. Returns the number of solved captures.
pub fn run_capture_loop(
    source: &mut dyn ImageSource,
    pipeline: &dyn Pipeline,
    continuous: bool,
) -> Result<usize> {
    let mut solved = 0;

    loop {
        let cycle = source
            .capture()
            .map_err(anyhow::Error::from)
            .and_then(|event| match event {
                Some(event) => pipeline.process(&event).map(Some),
                None => Ok(None),
            });

        match cycle {
            Ok(None) => break,
            Ok(Some(path)) => {
                solved += 1;
                log::info!("Cycle {} done: {}", solved, path.display());
                if !continuous {
                    break;
                }
            }
            Err(e) => {
                log::error!("Cycle failed: {:#}", e);
                if !continuous {
                    return Err(e);
                }
            }
        }
    }

    Ok(solved)
}

//! Local OCR path: split the capture into bands, read each band, parse the
//! problem, then ask a text model for the code.

use anyhow::Result;
use std::path::PathBuf;

use super::Pipeline;
use crate::capture::CaptureEvent;
use crate::llm::{DecodeStrategy, SolutionRequester, decode_with_strategy};
use crate::model::{ProblemData, SolutionResult};
use crate::ocr::{TextExtractor, ocr_regions, parse_content};
use crate::output::OutputSink;

pub struct OcrPipeline {
    extractor: Box<dyn TextExtractor>,
    /// Absent when no API key is configured
    requester: Option<SolutionRequester>,
    sink: OutputSink,
}

impl OcrPipeline {
    pub fn new(
        extractor: Box<dyn TextExtractor>,
        requester: Option<SolutionRequester>,
        sink: OutputSink,
    ) -> Self {
        Self {
            extractor,
            requester,
            sink,
        }
    }
}

impl Pipeline for OcrPipeline {
    fn process(&self, event: &CaptureEvent) -> Result<PathBuf> {
        log::info!("Extracting text from {}", event.path.display());
        let texts = ocr_regions(self.extractor.as_ref(), &event.image)?;
        let problem = parse_content(&texts.problem, &texts.code, &texts.tests);

        if !problem.is_complete() {
            log::warn!(
                "Low-confidence parse ({} signatures, {} test cases); keeping raw text",
                problem.function_signatures.len(),
                problem.test_cases.len()
            );
            self.sink.save_extraction(&event.name, &texts)?;
        }

        let result = match &self.requester {
            Some(requester) => {
                log::info!("Generating solution...");
                let code = requester.generate_solution(&problem)?;
                merge_reply(problem, &code)
            }
            None => {
                log::warn!("No API key available; saving the problem without a solution");
                SolutionResult::from_problem(problem, None)
            }
        };

        self.sink.persist(&result, &event.name)
    }
}

/// Combines the parsed problem with the fence-stripped reply. A reply that is
/// still a result object wins field by field where it is non-empty; otherwise
/// it is the solution code.
fn merge_reply(problem: ProblemData, code: &str) -> SolutionResult {
    let (decoded, strategy) = decode_with_strategy(code);

    if strategy == DecodeStrategy::RawFallback {
        let code = code.trim().to_string();
        return SolutionResult::from_problem(problem, Some(code).filter(|c| !c.is_empty()));
    }

    SolutionResult {
        problem_statement: if decoded.problem_statement.trim().is_empty() {
            problem.problem_statement
        } else {
            decoded.problem_statement
        },
        function_signatures: if decoded.function_signatures.is_empty() {
            problem.function_signatures
        } else {
            decoded.function_signatures
        },
        test_cases: if decoded.test_cases.is_empty() {
            problem.test_cases
        } else {
            decoded.test_cases
        },
        solution: decoded.solution,
    }
}

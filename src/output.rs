//! Writes solutions and their metadata next to the captures.
//!
//! Each file is written whole on every run, so re-running a capture replaces
//! its outputs instead of appending to them.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::model::SolutionResult;
use crate::ocr::RegionTexts;

pub struct OutputSink {
    output_dir: PathBuf,
    extension: String,
    editor: Option<String>,
}

impl OutputSink {
    pub fn new(output_dir: impl Into<PathBuf>, extension: &str, editor: Option<String>) -> Self {
        Self {
            output_dir: output_dir.into(),
            extension: extension.trim_start_matches('.').to_string(),
            editor,
        }
    }

    fn ensure_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.output_dir).with_context(|| {
            format!(
                "Failed to create output directory {}",
                self.output_dir.display()
            )
        })
    }

    /// Writes `<base>_solution.<ext>` and `<base>_info.json`, then opens the
    /// solution in the editor. Returns the solution path.
    pub fn persist(&self, result: &SolutionResult, base_name: &str) -> Result<PathBuf> {
        self.ensure_dir()?;

        let solution_path = self
            .output_dir
            .join(format!("{}_solution.{}", base_name, self.extension));
        fs::write(&solution_path, &result.solution)
            .with_context(|| format!("Failed to write {}", solution_path.display()))?;

        let info_path = self.output_dir.join(format!("{}_info.json", base_name));
        let json = serde_json::to_string_pretty(result).context("Failed to serialize result")?;
        fs::write(&info_path, json)
            .with_context(|| format!("Failed to write {}", info_path.display()))?;

        log::info!("Solution saved to {}", solution_path.display());
        log::info!("Problem info saved to {}", info_path.display());

        self.open_in_editor(&solution_path);
        Ok(solution_path)
    }

    /// Writes the raw OCR text of a capture to `<base>_extracted.txt`.
    pub fn save_extraction(&self, base_name: &str, texts: &RegionTexts) -> Result<PathBuf> {
        self.ensure_dir()?;

        let path = self.output_dir.join(format!("{}_extracted.txt", base_name));
        let contents = format!(
            "PROBLEM TEXT:\n{}\n\nCODE TEXT:\n{}\n\nTEST TEXT:\n{}\n",
            texts.problem, texts.code, texts.tests
        );
        fs::write(&path, contents).with_context(|| format!("Failed to write {}", path.display()))?;

        log::info!("Extracted text saved to {}", path.display());
        Ok(path)
    }

    /// Launches the editor without waiting for it. Failures are only logged.
    pub fn open_in_editor(&self, path: &Path) {
        let Some(editor) = self.editor.as_deref() else {
            return;
        };

        match Command::new(editor).arg(path).spawn() {
            Ok(_) => log::debug!("Opened {} in {}", path.display(), editor),
            Err(e) => log::warn!("Could not open {} with {}: {}", path.display(), editor, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{NO_SOLUTION, TestCase};
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    fn result(solution: &str) -> SolutionResult {
        SolutionResult {
            problem_statement: "Track the median.".to_string(),
            function_signatures: vec!["def add(self, x: int) -> None:".to_string()],
            test_cases: vec![TestCase::new("Add", "1", "[1]")],
            solution: solution.to_string(),
        }
    }

    fn file_names(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_persist_writes_exactly_two_files() {
        let dir = tempdir().unwrap();
        let sink = OutputSink::new(dir.path(), "py", None);

        let path = sink.persist(&result("pass"), "prob1").unwrap();

        assert_eq!(path, dir.path().join("prob1_solution.py"));
        assert_eq!(
            file_names(dir.path()),
            vec!["prob1_info.json", "prob1_solution.py"]
        );
        assert_eq!(fs::read_to_string(&path).unwrap(), "pass");

        let info: SolutionResult =
            serde_json::from_str(&fs::read_to_string(dir.path().join("prob1_info.json")).unwrap())
                .unwrap();
        assert_eq!(info, result("pass"));
    }

    #[test]
    fn test_persist_overwrites_previous_run() {
        let dir = tempdir().unwrap();
        let sink = OutputSink::new(dir.path(), "py", None);

        sink.persist(&result("a much longer first solution body"), "prob1")
            .unwrap();
        sink.persist(&result(NO_SOLUTION), "prob1").unwrap();

        assert_eq!(
            fs::read_to_string(dir.path().join("prob1_solution.py")).unwrap(),
            NO_SOLUTION
        );
        assert_eq!(file_names(dir.path()).len(), 2);
    }

    #[test]
    fn test_persist_creates_output_dir_and_strips_dot() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("solutions");
        let sink = OutputSink::new(&nested, ".rs", None);

        let path = sink.persist(&result("fn main() {}"), "p").unwrap();
        assert_eq!(path, nested.join("p_solution.rs"));
    }

    #[test]
    fn test_info_json_field_order() {
        let dir = tempdir().unwrap();
        let sink = OutputSink::new(dir.path(), "py", None);
        sink.persist(&result("pass"), "p").unwrap();

        let json = fs::read_to_string(dir.path().join("p_info.json")).unwrap();
        let statement = json.find("problem_statement").unwrap();
        let solution = json.find("\"solution\"").unwrap();
        assert!(statement < solution);
    }

    #[test]
    fn test_missing_editor_is_not_an_error() {
        let dir = tempdir().unwrap();
        let sink = OutputSink::new(
            dir.path(),
            "py",
            Some("snap-solver-no-such-editor".to_string()),
        );
        assert!(sink.persist(&result("pass"), "p").is_ok());
    }

    #[test]
    fn test_save_extraction() {
        let dir = tempdir().unwrap();
        let sink = OutputSink::new(dir.path(), "py", None);
        let texts = RegionTexts {
            problem: "Scenario".to_string(),
            code: "def f():".to_string(),
            tests: "".to_string(),
        };

        let path = sink.save_extraction("cap", &texts).unwrap();
        assert_eq!(path, dir.path().join("cap_extracted.txt"));
        let contents = fs::read_to_string(path).unwrap();
        assert!(contents.contains("PROBLEM TEXT:\nScenario\n"));
        assert!(contents.contains("CODE TEXT:\ndef f():\n"));
    }
}

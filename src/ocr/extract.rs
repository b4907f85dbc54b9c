use regex::Regex;
use std::sync::LazyLock;

use crate::model::{ProblemData, TestCase};

/// Statement text sits between the "Scenario" heading and the "Unit tests"
/// heading (or the end of the text).
static STATEMENT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)Scenario(.*?)(?:Unit tests|$)").expect("statement pattern is valid")
});

/// Python-style definitions: `def name(args) [-> type]:`.
/// Arguments may wrap across OCR lines.
static SIGNATURE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)def\s+(\w+)\s*\((.*?)\)\s*(->\s*\w+)?:").expect("signature pattern is valid")
});

/// Test panel lines: `<Operation> <args> (is|->) <expected>`.
static TEST_CASE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)(Add|Delete|Median of).*?(\d.*?)(?:is|->)\s*(.*?)$")
        .expect("test case pattern is valid")
});

/// Extracts the problem statement. Returns the input unchanged when the
/// "Scenario" heading is missing.
pub fn extract_problem_statement(text: &str) -> String {
    match STATEMENT_PATTERN.captures(text) {
        Some(caps) => caps[1].trim().to_string(),
        None => text.to_string(),
    }
}

/// Extracts every function signature, in order of appearance.
pub fn extract_function_signatures(text: &str) -> Vec<String> {
    SIGNATURE_PATTERN
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Extracts test cases from the test panel. Lines that don't match are dropped.
pub fn extract_test_cases(text: &str) -> Vec<TestCase> {
    TEST_CASE_PATTERN
        .captures_iter(text)
        .map(|caps| TestCase::new(caps[1].trim(), caps[2].trim(), caps[3].trim()))
        .collect()
}

/// Builds ProblemData from the OCR text of the three regions.
///
/// Never fails: missing signatures or test cases come back empty.
pub fn parse_content(problem_text: &str, signature_text: &str, tests_text: &str) -> ProblemData {
    let problem = ProblemData {
        problem_statement: extract_problem_statement(problem_text),
        function_signatures: extract_function_signatures(signature_text),
        test_cases: extract_test_cases(tests_text),
    };

    log::debug!(
        "Parsed problem: {} chars of statement, {} signatures, {} test cases",
        problem.problem_statement.len(),
        problem.function_signatures.len(),
        problem.test_cases.len()
    );

    problem
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_statement_between_markers() {
        let text = "Header\nScenario\nKeep a running median.\nUnit tests\nAdd 1 -> [1]";
        assert_eq!(extract_problem_statement(text), "Keep a running median.");
    }

    #[test]
    fn test_statement_runs_to_end_without_second_marker() {
        let text = "Scenario\nKeep a running median.\nOf many numbers.";
        assert_eq!(
            extract_problem_statement(text),
            "Keep a running median.\nOf many numbers."
        );
    }

    #[test]
    fn test_statement_without_marker_is_verbatim() {
        let text = "  no heading here\n";
        assert_eq!(extract_problem_statement(text), text);
        assert_eq!(extract_problem_statement(""), "");
    }

    #[test]
    fn test_signatures_in_order_with_colon() {
        let sigs = extract_function_signatures("def a(x): pass\ndef b(y) -> int: pass");
        assert_eq!(sigs, vec!["def a(x):", "def b(y) -> int:"]);
    }

    #[test]
    fn test_signatures_spanning_lines() {
        let text = "class MedianTracker:\n    def add(self,\n            value: int) -> None:\n        pass";
        let sigs = extract_function_signatures(text);
        assert_eq!(sigs.len(), 1);
        assert!(sigs[0].starts_with("def add(self,"));
        assert!(sigs[0].ends_with("-> None:"));
    }

    #[test]
    fn test_signatures_none_found() {
        assert!(extract_function_signatures("class Foo:\n    pass").is_empty());
    }

    #[test]
    fn test_test_cases_basic() {
        let cases = extract_test_cases("Add 1, 2, 5 -> [1, 2, 5]\nDelete 3 -> []");
        assert_eq!(
            cases,
            vec![
                TestCase::new("Add", "1, 2, 5", "[1, 2, 5]"),
                TestCase::new("Delete", "3", "[]"),
            ]
        );
    }

    #[test]
    fn test_test_cases_with_is_and_noise() {
        let text = "Terminal\nMedian of 1, 3 is 2\nrandom noise -> nothing\nAdd 7 -> [7]\r\n";
        let cases = extract_test_cases(text);
        assert_eq!(
            cases,
            vec![
                TestCase::new("Median of", "1, 3", "2"),
                TestCase::new("Add", "7", "[7]"),
            ]
        );
    }

    #[test]
    fn test_test_cases_none_found() {
        assert!(extract_test_cases("Run tests\nAll passed").is_empty());
    }

    #[test]
    fn test_parse_content_nothing_found_is_valid() {
        let problem = parse_content("", "", "");
        assert_eq!(problem, ProblemData::default());
    }

    #[test]
    fn test_parse_content_full() {
        let problem = parse_content(
            "Scenario\nTrack the median.\nUnit tests",
            "def add(self, x: int) -> None:",
            "Add 1 -> [1]",
        );
        assert_eq!(problem.problem_statement, "Track the median.");
        assert_eq!(problem.function_signatures, vec!["def add(self, x: int) -> None:"]);
        assert_eq!(problem.test_cases, vec![TestCase::new("Add", "1", "[1]")]);
        assert!(problem.is_complete());
    }

    #[test]
    fn test_parse_content_tolerates_odd_input() {
        // Unbalanced parens, stray markers, unicode: no panic, best effort
        let problem = parse_content("ScenarioScenario ✓", "def (((:", "Add -> ->\nDelete ٣ -> x");
        assert_eq!(problem.problem_statement, "Scenario ✓");
        assert!(problem.function_signatures.is_empty());
    }
}

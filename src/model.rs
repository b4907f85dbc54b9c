//! Problem and solution records shared by the parser, the decoder and the sink.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Solution body used when nothing could be generated.
pub const NO_SOLUTION: &str = "# No solution generated";

/// A single test case as shown in the problem's test panel.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawTestCase")]
pub struct TestCase {
    pub operation: String,
    pub input: String,
    pub expected_output: String,
}

impl TestCase {
    pub fn new(
        operation: impl Into<String>,
        input: impl Into<String>,
        expected_output: impl Into<String>,
    ) -> Self {
        Self {
            operation: operation.into(),
            input: input.into(),
            expected_output: expected_output.into(),
        }
    }

    /// Prompt line: `<op> <input> -> <expected>`.
    pub fn prompt_line(&self) -> String {
        format!("{} {} -> {}", self.operation, self.input, self.expected_output)
    }
}

/// Model replies describe test cases in whatever shape they like. Accept a bare
/// string or an object whose values may be any JSON.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawTestCase {
    Text(String),
    Fields {
        #[serde(default)]
        operation: Option<Value>,
        #[serde(default, alias = "inputs")]
        input: Option<Value>,
        #[serde(default, alias = "output", alias = "expected")]
        expected_output: Option<Value>,
    },
}

impl From<RawTestCase> for TestCase {
    fn from(raw: RawTestCase) -> Self {
        match raw {
            RawTestCase::Text(input) => TestCase {
                input,
                ..Default::default()
            },
            RawTestCase::Fields {
                operation,
                input,
                expected_output,
            } => TestCase {
                operation: json_text(operation),
                input: json_text(input),
                expected_output: json_text(expected_output),
            },
        }
    }
}

fn json_text(value: Option<Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s,
        Some(other) => other.to_string(),
    }
}

/// `[operation, input, expected]` arrays map positionally.
fn test_case_from_value(value: Value) -> TestCase {
    match value {
        Value::Array(parts) => {
            let mut parts = parts.into_iter().map(|part| json_text(Some(part)));
            TestCase {
                operation: parts.next().unwrap_or_default(),
                input: parts.next().unwrap_or_default(),
                expected_output: parts.next().unwrap_or_default(),
            }
        }
        object @ Value::Object(_) => serde_json::from_value(object).unwrap_or_default(),
        other => TestCase {
            input: json_text(Some(other)),
            ..Default::default()
        },
    }
}

fn lenient_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(json_text(Some(Value::deserialize(deserializer)?)))
}

fn lenient_solution<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(default_solution()),
        other => Ok(json_text(Some(other))),
    }
}

/// A lone string is one signature.
fn lenient_signatures<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    let items = match Value::deserialize(deserializer)? {
        Value::Array(items) => items,
        other => vec![other],
    };
    Ok(items
        .into_iter()
        .map(|item| json_text(Some(item)))
        .filter(|text| !text.is_empty())
        .collect())
}

fn lenient_test_cases<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<TestCase>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => Vec::new(),
        Value::Array(items) => items.into_iter().map(test_case_from_value).collect(),
        other => vec![test_case_from_value(other)],
    })
}

/// Structured problem data recovered from OCR text or a vision reply.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProblemData {
    pub problem_statement: String,
    pub function_signatures: Vec<String>,
    pub test_cases: Vec<TestCase>,
}

impl ProblemData {
    /// True when both signatures and test cases were found.
    pub fn is_complete(&self) -> bool {
        !self.function_signatures.is_empty() && !self.test_cases.is_empty()
    }
}

/// ProblemData plus the generated code. This is what ends up in `<name>_info.json`.
///
/// Deserialization takes any JSON for each field: null falls back to the
/// default and mistyped values are coerced to text.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolutionResult {
    #[serde(default, deserialize_with = "lenient_text")]
    pub problem_statement: String,
    #[serde(default, deserialize_with = "lenient_signatures")]
    pub function_signatures: Vec<String>,
    #[serde(default, deserialize_with = "lenient_test_cases")]
    pub test_cases: Vec<TestCase>,
    #[serde(default = "default_solution", deserialize_with = "lenient_solution")]
    pub solution: String,
}

fn default_solution() -> String {
    NO_SOLUTION.to_string()
}

impl SolutionResult {
    pub fn from_problem(problem: ProblemData, solution: Option<String>) -> Self {
        Self {
            problem_statement: problem.problem_statement,
            function_signatures: problem.function_signatures,
            test_cases: problem.test_cases,
            solution: solution.unwrap_or_else(default_solution),
        }
    }
}

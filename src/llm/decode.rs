//! Turns a free-form model reply into a `SolutionResult`.
//!
//! Strategies are tried in a fixed order and the first one that yields a
//! result wins. None of them fail: a miss falls through to the next, and the
//! last one always produces something.

use serde_json::Value;

use crate::model::{NO_SOLUTION, SolutionResult};

/// Statement used when the reply held no structured data.
pub const UNEXTRACTED_STATEMENT: &str = "Could not extract automatically.";

const FIELDS: [&str; 4] = [
    "problem_statement",
    "function_signatures",
    "test_cases",
    "solution",
];

/// How a reply was decoded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DecodeStrategy {
    /// A fenced block labelled `json`
    FencedJson,
    /// Any fenced block whose content looks like an object
    FencedBlock,
    /// First `{` to last `}` of the whole reply
    BracedSpan,
    /// No structured data; the reply is taken as code
    RawFallback,
}

impl DecodeStrategy {
    pub const ORDER: [DecodeStrategy; 4] = [
        DecodeStrategy::FencedJson,
        DecodeStrategy::FencedBlock,
        DecodeStrategy::BracedSpan,
        DecodeStrategy::RawFallback,
    ];

    fn attempt(self, raw: &str, fences: &[Fence<'_>]) -> Option<SolutionResult> {
        match self {
            DecodeStrategy::FencedJson => fences
                .iter()
                .filter(|f| f.label.eq_ignore_ascii_case("json"))
                .find_map(|f| parse_structured(&f.body)),
            DecodeStrategy::FencedBlock => fences
                .iter()
                .map(|f| f.body.trim())
                .filter(|body| body.starts_with('{') && body.ends_with('}'))
                .find_map(parse_structured),
            DecodeStrategy::BracedSpan => {
                let start = raw.find('{')?;
                let end = raw.rfind('}')?;
                if end <= start {
                    return None;
                }
                parse_structured(&raw[start..=end])
            }
            DecodeStrategy::RawFallback => Some(raw_fallback(raw, fences)),
        }
    }
}

/// A fenced block: the first word after the opening backticks, and the lines
/// up to the closing backticks.
#[derive(Debug, PartialEq, Eq)]
struct Fence<'a> {
    label: &'a str,
    body: String,
}

/// Scans for fenced blocks. An unclosed fence runs to the end of the text.
/// A fence closed on its opening line has no label.
fn scan_fences(text: &str) -> Vec<Fence<'_>> {
    let mut fences = Vec::new();
    let mut open: Option<(&str, Vec<&str>)> = None;

    for line in text.lines() {
        let trimmed = line.trim_start();
        let is_marker = trimmed.starts_with("```");

        match open.take() {
            Some((label, body)) if is_marker => fences.push(Fence {
                label,
                body: body.join("\n"),
            }),
            Some((label, mut body)) => {
                body.push(line);
                open = Some((label, body));
            }
            None if is_marker => {
                let rest = &trimmed[3..];
                match rest.find("```") {
                    Some(close) => fences.push(Fence {
                        label: "",
                        body: rest[..close].to_string(),
                    }),
                    None => {
                        let label = rest.split_whitespace().next().unwrap_or("");
                        open = Some((label, Vec::new()));
                    }
                }
            }
            None => {}
        }
    }

    if let Some((label, body)) = open {
        fences.push(Fence {
            label,
            body: body.join("\n"),
        });
    }
    fences
}

/// Parses a JSON object into a result. The object must carry at least one
/// result field, so an arbitrary `{}` inside code is not mistaken for one.
fn parse_structured(text: &str) -> Option<SolutionResult> {
    let value: Value = serde_json::from_str(text.trim()).ok()?;
    let object = value.as_object()?;
    if !FIELDS.iter().any(|field| object.contains_key(*field)) {
        return None;
    }
    serde_json::from_value(value).ok()
}

fn raw_fallback(raw: &str, fences: &[Fence<'_>]) -> SolutionResult {
    let code = fences
        .iter()
        .find(|f| f.label.eq_ignore_ascii_case("python"))
        .or_else(|| fences.first())
        .map(|f| f.body.trim())
        .unwrap_or_else(|| raw.trim());

    SolutionResult {
        problem_statement: UNEXTRACTED_STATEMENT.to_string(),
        function_signatures: Vec::new(),
        test_cases: Vec::new(),
        solution: if code.is_empty() {
            NO_SOLUTION.to_string()
        } else {
            code.to_string()
        },
    }
}

/// Decodes a reply and reports which strategy produced the result.
pub fn decode_with_strategy(raw: &str) -> (SolutionResult, DecodeStrategy) {
    let fences = scan_fences(raw);

    for strategy in DecodeStrategy::ORDER {
        if let Some(result) = strategy.attempt(raw, &fences) {
            if strategy == DecodeStrategy::RawFallback {
                log::warn!(
                    "No structured data in reply ({} chars, {} fenced blocks); using it as code",
                    raw.len(),
                    fences.len()
                );
            } else {
                log::debug!("Reply decoded with {:?}", strategy);
            }
            return (result, strategy);
        }
    }

    // RawFallback always yields a result
    (raw_fallback(raw, &fences), DecodeStrategy::RawFallback)
}

pub fn decode(raw: &str) -> SolutionResult {
    decode_with_strategy(raw).0
}

/// Keeps only the lines inside fenced blocks, or the whole trimmed reply when
/// there are none.
pub fn strip_to_code(raw: &str) -> String {
    let fences = scan_fences(raw);
    if fences.is_empty() {
        return raw.trim().to_string();
    }
    fences
        .iter()
        .map(|f| f.body.as_str())
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

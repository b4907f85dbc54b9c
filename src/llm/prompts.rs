//! Prompt text sent to the providers.

use crate::model::ProblemData;

/// System prompt for the one-shot vision path.
pub const VISION_SYSTEM_PROMPT: &str = "\
You solve programming exercises from photos of the exercise screen.
The screen has three columns:
- left: the problem description, under a \"Scenario\" heading
- middle: a code editor holding the functions to implement
- right: the unit tests and terminal output

Reply with a single JSON object with these fields:
- problem_statement: the full problem description
- function_signatures: array of the function signatures in the editor
- test_cases: array of objects with operation, input and expected_output
- solution: complete code implementing those functions";

/// User prompt sent alongside the image.
pub const VISION_USER_PROMPT: &str = "\
Read the problem in this image and write a solution for it.
Implement exactly the functions shown in the editor so that every visible \
test case passes.";

/// System preamble for text-only solution requests.
pub fn solution_system_prompt(language: &str) -> String {
    format!(
        "You are a competitive programming expert who writes clean, efficient \
         and correct {} solutions.",
        language
    )
}

/// Builds the solution prompt from a parsed problem. Output depends only on
/// the input.
pub fn build_solution_prompt(problem: &ProblemData, language: &str) -> String {
    let signatures = problem.function_signatures.join("\n");
    let tests = problem
        .test_cases
        .iter()
        .map(|case| case.prompt_line())
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Write {language} code to solve the following problem.\n\
         \n\
         Problem Statement:\n\
         {statement}\n\
         \n\
         Function Signatures:\n\
         {signatures}\n\
         \n\
         Test Cases:\n\
         {tests}\n\
         \n\
         Implement a solution that passes all test cases. \
         Only provide the implementation of the required methods, no explanations.\n",
        language = language,
        statement = problem.problem_statement,
        signatures = signatures,
        tests = tests,
    )
}

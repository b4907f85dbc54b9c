use super::{ChatRequest, LlmClient, strip_to_code};
use super::prompts::{build_solution_prompt, solution_system_prompt};
use crate::error::SolverResult;
use crate::model::ProblemData;

const DEFAULT_TEMPERATURE: f64 = 0.2;

/// Asks a text model to implement a parsed problem.
pub struct SolutionRequester {
    client: LlmClient,
    language: String,
}

impl SolutionRequester {
    pub fn new(client: LlmClient, language: impl Into<String>) -> Self {
        Self {
            client,
            language: language.into(),
        }
    }

    /// Sends the problem and returns the model's raw reply.
    pub fn request(&self, problem: &ProblemData) -> SolverResult<String> {
        let system = solution_system_prompt(&self.language);
        let prompt = build_solution_prompt(problem, &self.language);
        let temperature = self
            .client
            .settings()
            .temperature
            .unwrap_or(DEFAULT_TEMPERATURE);

        log::debug!("Solution prompt:\n{}", prompt);
        self.client
            .send(&ChatRequest::text(&system, &prompt).temperature(temperature))
    }

    /// Like `request`, but keeps only the code from fenced blocks.
    pub fn generate_solution(&self, problem: &ProblemData) -> SolverResult<String> {
        self.request(problem).map(|reply| strip_to_code(&reply))
    }
}

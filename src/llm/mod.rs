//! Language-model providers: request/response plumbing, prompts, solution
//! requests and reply decoding.

pub mod client;
pub mod decode;
pub mod prompts;
pub mod requester;

pub use client::{ChatRequest, LlmClient, ProviderConfig, resolve_api_key};
pub use decode::{DecodeStrategy, decode, decode_with_strategy, strip_to_code};
pub use requester::SolutionRequester;

/// Supported providers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum ProviderKind {
    #[value(name = "openai")]
    OpenAi,
    Claude,
    Gemini,
}

impl ProviderKind {
    pub fn name(self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "OpenAI",
            ProviderKind::Claude => "Claude",
            ProviderKind::Gemini => "Gemini",
        }
    }

    /// Environment variable consulted when no `--api-key` is given.
    pub fn env_var(self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "OPENAI_API_KEY",
            ProviderKind::Claude => "ANTHROPIC_API_KEY",
            ProviderKind::Gemini => "GOOGLE_API_KEY",
        }
    }

    /// Chat endpoint, or the API base URL for Gemini.
    pub fn default_endpoint(self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "https://api.openai.com/v1/chat/completions",
            ProviderKind::Claude => "https://api.anthropic.com/v1/messages",
            ProviderKind::Gemini => "https://generativelanguage.googleapis.com/v1beta",
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

//! One-shot path: the whole image goes to a vision model, which returns both
//! the problem and the solution.

use anyhow::{Context, Result};
use image::ImageFormat;
use std::fs;
use std::path::{Path, PathBuf};

use super::Pipeline;
use crate::capture::CaptureEvent;
use crate::llm::{LlmClient, decode};
use crate::llm::prompts::{VISION_SYSTEM_PROMPT, VISION_USER_PROMPT};
use crate::output::OutputSink;

pub struct VisionPipeline {
    client: LlmClient,
    sink: OutputSink,
}

impl VisionPipeline {
    pub fn new(client: LlmClient, sink: OutputSink) -> Self {
        Self { client, sink }
    }
}

fn mime_type(path: &Path) -> &'static str {
    ImageFormat::from_path(path)
        .map(|format| format.to_mime_type())
        .unwrap_or("image/jpeg")
}

impl Pipeline for VisionPipeline {
    fn process(&self, event: &CaptureEvent) -> Result<PathBuf> {
        let bytes = fs::read(&event.path)
            .with_context(|| format!("Failed to read {}", event.path.display()))?;

        log::info!(
            "Sending {} ({} KB) to {}",
            event.path.display(),
            bytes.len() / 1024,
            self.client.kind()
        );
        let reply = self.client.describe_image(
            VISION_SYSTEM_PROMPT,
            VISION_USER_PROMPT,
            &bytes,
            mime_type(&event.path),
        )?;

        let result = decode(&reply);
        self.sink.persist(&result, &event.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModelSettings;
    use crate::llm::{ProviderConfig, ProviderKind, decode::UNEXTRACTED_STATEMENT};
    use crate::model::SolutionResult;
    use image::RgbaImage;
    use mockito::Matcher;
    use tempfile::tempdir;

    fn claude(url: String) -> LlmClient {
        let settings = ModelSettings {
            model: "claude-test".to_string(),
            endpoint: Some(format!("{}/v1/messages", url)),
            max_tokens: 4000,
            temperature: None,
        };
        LlmClient::new(ProviderConfig::new(ProviderKind::Claude, "key", settings)).unwrap()
    }

    fn saved_capture(dir: &Path) -> CaptureEvent {
        let path = dir.join("shot.png");
        let image = RgbaImage::new(4, 4);
        image.save(&path).unwrap();
        CaptureEvent {
            image,
            name: "shot".to_string(),
            path,
        }
    }

    #[test]
    fn test_mime_type_from_extension() {
        assert_eq!(mime_type(Path::new("a.png")), "image/png");
        assert_eq!(mime_type(Path::new("a.JPG")), "image/jpeg");
        assert_eq!(mime_type(Path::new("a.unknown")), "image/jpeg");
    }

    #[test]
    fn test_structured_reply_is_persisted() {
        let dir = tempdir().unwrap();
        let mut server = mockito::Server::new();
        let reply = serde_json::json!({
            "content": [{
                "type": "text",
                "text": "```json\n{\"problem_statement\": \"Sum two numbers.\", \"function_signatures\": [\"def add(a, b):\"], \"test_cases\": [{\"input\": \"1, 2\", \"output\": \"3\"}], \"solution\": \"def add(a, b):\\n    return a + b\"}\n```"
            }]
        });
        let mock = server
            .mock("POST", "/v1/messages")
            .match_body(Matcher::Regex("image/png".to_string()))
            .with_status(200)
            .with_body(reply.to_string())
            .create();

        let pipeline = VisionPipeline::new(claude(server.url()), OutputSink::new(dir.path(), "py", None));
        let path = pipeline.process(&saved_capture(dir.path())).unwrap();

        mock.assert();
        assert_eq!(
            fs::read_to_string(path).unwrap(),
            "def add(a, b):\n    return a + b"
        );
        let info: SolutionResult =
            serde_json::from_str(&fs::read_to_string(dir.path().join("shot_info.json")).unwrap())
                .unwrap();
        assert_eq!(info.problem_statement, "Sum two numbers.");
        assert_eq!(info.test_cases[0].expected_output, "3");
    }

    #[test]
    fn test_code_only_reply_uses_placeholder_statement() {
        let dir = tempdir().unwrap();
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("POST", "/v1/messages")
            .with_status(200)
            .with_body(r#"{"content":[{"type":"text","text":"```python\nprint(42)\n```"}]}"#)
            .create();

        let pipeline = VisionPipeline::new(claude(server.url()), OutputSink::new(dir.path(), "py", None));
        pipeline.process(&saved_capture(dir.path())).unwrap();

        let info: SolutionResult =
            serde_json::from_str(&fs::read_to_string(dir.path().join("shot_info.json")).unwrap())
                .unwrap();
        assert_eq!(info.problem_statement, UNEXTRACTED_STATEMENT);
        assert_eq!(info.solution, "print(42)");
    }
}

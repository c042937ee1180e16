use std::sync::Mutex;

use async_trait::async_trait;
use pretty_assertions::assert_eq;

use super::*;
use crate::error::RagErr;
use crate::error::Result;

struct EchoGenerator {
    fail: bool,
    prompts: Mutex<Vec<String>>,
}

impl EchoGenerator {
    fn new(fail: bool) -> Arc<Self> {
        Arc::new(Self {
            fail,
            prompts: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl TextGenerator for EchoGenerator {
    fn name(&self) -> &str {
        "echo"
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        if self.fail {
            return Err(RagErr::GenerationFailed {
                cause: "API error 503 Service Unavailable".to_string(),
            });
        }
        Ok("Sốt là phản ứng tự nhiên của cơ thể.".to_string())
    }
}

#[test]
fn test_is_refusal() {
    assert!(is_refusal(REFUSAL_ANSWER));
    assert!(is_refusal(&format!("  \"{REFUSAL_ANSWER}\".\n")));
    assert!(is_refusal(&format!("{REFUSAL_ANSWER}.")));
    assert!(!is_refusal("Sốt là phản ứng tự nhiên của cơ thể."));
    assert!(!is_refusal(&format!("{REFUSAL_ANSWER}, nhưng sốt thường lành tính.")));
}

#[test]
fn test_prompt_embeds_context_and_query() {
    let prompt = build_prompt("Sốt là gì?", "=== Tài liệu 1 ===\nNội dung:\nabc");
    assert!(prompt.contains("NGỮ CẢNH:\n=== Tài liệu 1 ===\nNội dung:\nabc\n\nCÂU HỎI: Sốt là gì?"));
    assert!(prompt.contains(REFUSAL_ANSWER));
    assert!(prompt.ends_with("TRẢ LỜI:"));
}

#[tokio::test]
async fn test_generate_returns_model_text() {
    let model = EchoGenerator::new(false);
    let generator = AnswerGenerator::new(model.clone());
    let answer = generator.generate("Sốt là gì?", "ctx").await;
    assert_eq!(answer, "Sốt là phản ứng tự nhiên của cơ thể.");
    assert_eq!(model.prompts.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_generate_failure_is_apology() {
    let model = EchoGenerator::new(true);
    let generator = AnswerGenerator::new(model.clone());
    let answer = generator.generate("Sốt là gì?", "ctx").await;
    assert_eq!(
        answer,
        "Xin lỗi, có lỗi xảy ra khi tạo câu trả lời: Generation failed: API error 503 Service Unavailable"
    );
    // No retry.
    assert_eq!(model.prompts.lock().unwrap().len(), 1);
}

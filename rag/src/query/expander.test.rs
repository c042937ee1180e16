use std::sync::Mutex;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use async_trait::async_trait;
use pretty_assertions::assert_eq;

use super::*;
use crate::error::RagErr;
use crate::error::Result;

struct ScriptedGenerator {
    reply: Option<String>,
    calls: AtomicUsize,
    last_prompt: Mutex<String>,
}

impl ScriptedGenerator {
    fn replying(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Some(reply.to_string()),
            calls: AtomicUsize::new(0),
            last_prompt: Mutex::new(String::new()),
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self {
            reply: None,
            calls: AtomicUsize::new(0),
            last_prompt: Mutex::new(String::new()),
        })
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_prompt.lock().unwrap() = prompt.to_string();
        self.reply.clone().ok_or_else(|| RagErr::GenerationFailed {
            cause: "unavailable".to_string(),
        })
    }
}

#[test]
fn test_parse_paraphrases() {
    let text = "  Sốt là gì?\n\n- \n   Nguyên nhân gây sốt?  \nTriệu chứng sốt?\n";
    assert_eq!(
        parse_paraphrases(text, 2),
        vec!["Sốt là gì?".to_string(), "-".to_string()]
    );
    assert_eq!(parse_paraphrases("", 3), Vec::<String>::new());
    assert_eq!(parse_paraphrases("a\nb", 0), Vec::<String>::new());
}

#[tokio::test]
async fn test_expand_keeps_original_first() {
    let generator = ScriptedGenerator::replying(
        "What causes a fever?\nHow is fever defined?\nWhen is a fever dangerous?",
    );
    let expander = QueryExpander::new(generator.clone());

    let queries = expander.expand("What is fever?", 3).await;
    assert_eq!(
        queries,
        vec![
            "What is fever?".to_string(),
            "What causes a fever?".to_string(),
            "How is fever defined?".to_string(),
        ]
    );
    assert_eq!(generator.calls.load(Ordering::SeqCst), 1);

    let prompt = generator.last_prompt.lock().unwrap().clone();
    assert!(prompt.contains("Câu hỏi gốc: What is fever?"));
    assert!(prompt.contains("tạo ra 2 câu hỏi"));
}

#[tokio::test]
async fn test_expand_short_reply() {
    let generator = ScriptedGenerator::replying("\n  Sốt kéo dài bao lâu?  \n\n");
    let expander = QueryExpander::new(generator);

    let queries = expander.expand("Sốt là gì?", 3).await;
    assert_eq!(queries, vec!["Sốt là gì?".to_string(), "Sốt kéo dài bao lâu?".to_string()]);
}

#[tokio::test]
async fn test_expand_failure_returns_original() {
    let generator = ScriptedGenerator::failing();
    let expander = QueryExpander::new(generator.clone());

    let queries = expander.expand("What is fever?", 3).await;
    assert_eq!(queries, vec!["What is fever?".to_string()]);
    assert_eq!(generator.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_expand_single_query_skips_model() {
    let generator = ScriptedGenerator::replying("unused");
    let expander = QueryExpander::new(generator.clone());

    assert_eq!(expander.expand("q", 1).await, vec!["q".to_string()]);
    assert_eq!(expander.expand("q", 0).await, vec!["q".to_string()]);
    assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
}

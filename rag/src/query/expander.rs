//! Paraphrase-based query expansion.

use std::sync::Arc;

use crate::fallback::or_degrade;
use crate::traits::TextGenerator;

/// Generates paraphrases of a query with a [`TextGenerator`].
#[derive(Clone)]
pub struct QueryExpander {
    generator: Arc<dyn TextGenerator>,
}

impl QueryExpander {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    /// Expand `query` into at most `n` queries.
    ///
    /// The first element is always `query` itself, followed by up to
    /// `n - 1` paraphrases in the order the model produced them. A model
    /// failure yields just the original query.
    pub async fn expand(&self, query: &str, n: usize) -> Vec<String> {
        if n <= 1 {
            return vec![query.to_string()];
        }

        let prompt = build_prompt(query, n - 1);
        let paraphrases = or_degrade(
            "query_expansion",
            async {
                let text = self.generator.generate(&prompt).await?;
                Ok(parse_paraphrases(&text, n - 1))
            },
            |_| Vec::new(),
        )
        .await;

        let mut queries = Vec::with_capacity(paraphrases.len() + 1);
        queries.push(query.to_string());
        queries.extend(paraphrases);

        tracing::debug!(queries = ?queries, "Expanded query");
        queries
    }
}

/// Split a model reply into paraphrases: one per non-blank line, trimmed,
/// at most `max`.
pub fn parse_paraphrases(text: &str, max: usize) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .take(max)
        .map(str::to_string)
        .collect()
}

fn build_prompt(query: &str, count: usize) -> String {
    format!(
        "Bạn là một chuyên gia y tế. Hãy tạo ra {count} câu hỏi tương tự với câu hỏi sau, \
nhưng diễn đạt khác đi để có thể tìm kiếm được nhiều thông tin liên quan hơn.

Câu hỏi gốc: {query}

Yêu cầu:
- Mỗi câu hỏi trên một dòng
- Giữ nguyên ý nghĩa chính
- Thay đổi cách diễn đạt, từ ngữ
- Chỉ trả về các câu hỏi, không giải thích

Ví dụ:
- Với câu hỏi gốc 'Những ai có nguy cơ gục ngã bất ngờ vì đột quỵ, đột tử?' có thể đổi thành 'Các nhóm người nào có khả năng bị đột tử mà không báo trước?'
- Với câu hỏi gốc 'Bệnh COVID-19 có lây không?' có thể đổi thành 'Bệnh COVID-19 lây lan qua những con đường nào?'
- Với câu hỏi gốc 'Ung thư phổi có chữa được không?' có thể đổi thành 'Khả năng điều trị ung thư phổi hiện nay như thế nào?'

Các câu hỏi tương tự:"
    )
}

#[cfg(test)]
#[path = "expander.test.rs"]
mod tests;

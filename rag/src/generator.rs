//! Grounded answer generation.
//!
//! The prompt confines the model to the assembled context and asks for a
//! fixed refusal sentence when the context is not enough. Compliance is
//! not verified; [`is_refusal`] only lets callers recognize the refusal.

use std::sync::Arc;

use crate::fallback::or_degrade;
use crate::traits::TextGenerator;

/// Sentence the model is told to answer with when the context is insufficient.
pub const REFUSAL_ANSWER: &str = "Xin lỗi, tôi chưa có đủ thông tin để trả lời câu hỏi này";

/// Prefix of the answer returned when generation fails.
pub const GENERATION_ERROR_PREFIX: &str = "Xin lỗi, có lỗi xảy ra khi tạo câu trả lời";

/// Whether `answer` is the model's refusal.
pub fn is_refusal(answer: &str) -> bool {
    let trimmed = answer.trim().trim_end_matches('.').trim_matches('"');
    trimmed.trim_end_matches('.') == REFUSAL_ANSWER
}

/// Produces answers from a query and its context.
#[derive(Clone)]
pub struct AnswerGenerator {
    generator: Arc<dyn TextGenerator>,
}

impl AnswerGenerator {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    /// Generate an answer grounded in `context`.
    ///
    /// Never fails: a model error becomes a user-visible apology that
    /// includes the error text.
    pub async fn generate(&self, query: &str, context: &str) -> String {
        let prompt = build_prompt(query, context);
        or_degrade(
            "answer_generation",
            self.generator.generate(&prompt),
            |err| format!("{GENERATION_ERROR_PREFIX}: {err}"),
        )
        .await
    }
}

fn build_prompt(query: &str, context: &str) -> String {
    format!(
        r#"Bạn là ViMedBot, trợ lý sức khỏe gia đình trả lời ngắn gọn, dễ hiểu.
Chỉ sử dụng thông tin có trong NGỮ CẢNH bên dưới. Không thêm thông tin ngoài NGỮ CẢNH. Không chẩn đoán, không kê đơn hay chỉ định điều trị.
Nếu NGỮ CẢNH không đủ để trả lời, viết nguyên văn: "{REFUSAL_ANSWER}".

PHONG CÁCH & MỞ BÀI
- Viết một câu dẫn nhập tự nhiên, phù hợp ngữ cảnh câu hỏi, không dùng các cụm khuôn mẫu như "Về [chủ đề]…", "Những điểm bạn nên biết…", "Tóm tắt nhanh…", "Nếu bạn đang tìm hiểu…", "Dưới đây là…", "Trao đổi ngắn gọn…".
- Câu dẫn nhập nhắc lại trọng tâm câu hỏi bằng ngôn ngữ đời thường, 1–2 câu, không dùng ngoặc vuông, không dùng từ "chủ đề".

KẾT CẤU NỘI DUNG
- Tóm tắt ngắn: 1–2 câu nêu cốt lõi theo NGỮ CẢNH.
- Các điểm chính:
  - Sử dụng gạch đầu dòng Markdown (`- `) cho các ý chính, tối đa 3–5 ý.
  - Nếu ý chính có chi tiết phụ, sử dụng bullet con với thụt đầu dòng (2 khoảng trắng trước `- `, ví dụ: `  - `).
  - Đảm bảo mỗi bullet con liên quan trực tiếp đến bullet cha, không để bullet con đứng độc lập.
- Khi nào nên đi khám: Chỉ liệt kê nếu NGỮ CẢNH có nêu dấu hiệu/nguy cơ/cảnh báo, dùng gạch đầu dòng (`- `).
- Lưu ý:
  - Thông tin chỉ mang tính tham khảo chung.
  - Khi có triệu chứng bất thường, đang mang thai, có bệnh nền, hoặc đang dùng thuốc, hãy tham khảo bác sĩ chuyên khoa.

QUY TẮC
- Ngắn gọn, rõ ràng, tránh thuật ngữ khó; nếu dùng thuật ngữ từ NGỮ CẢNH, giải thích ngắn gọn.
- Sử dụng ký tự Markdown chuẩn: `- ` cho bullet, `*text*` cho nghiêng.
- Không nêu nguồn, không viết "theo tài liệu/nguồn/tham khảo".
- Không suy diễn ngoài NGỮ CẢNH, không kết luận điều trị.
- Đảm bảo định dạng Markdown rõ ràng, dễ đọc, với các bullet lồng nhau đúng cú pháp, không in đậm.
- Nếu câu hỏi vượt ngoài phạm vi NGỮ CẢNH, trả lời: "{REFUSAL_ANSWER}".

NGỮ CẢNH:
{context}

CÂU HỎI: {query}

TRẢ LỜI:"#
    )
}

#[cfg(test)]
#[path = "generator.test.rs"]
mod tests;

//! Response catalog: category keywords, conversational templates and the
//! phrase substitution table.
//!
//! The catalog is plain data. The built-in default targets a Vietnamese
//! credit-card FAQ; deployments can replace it with a YAML file of the same
//! shape.

use crate::types::Category;
use faqbot_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// A literal, case-sensitive replacement applied to answer text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhraseSubstitution {
    pub from: String,
    pub to: String,
}

impl PhraseSubstitution {
    pub fn new(from: &str, to: &str) -> Self {
        Self {
            from: from.to_string(),
            to: to.to_string(),
        }
    }
}

/// Templates used when a category has a conversational framing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTemplates {
    /// Lead-in placed before the answer body
    #[serde(default)]
    pub intros: Vec<String>,

    /// Sentence appended after the answer body
    #[serde(default)]
    pub outros: Vec<String>,
}

impl CategoryTemplates {
    /// Both an intro and an outro are available.
    pub fn is_complete(&self) -> bool {
        !self.intros.is_empty() && !self.outros.is_empty()
    }
}

/// All configurable wording of the retriever.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseCatalog {
    /// Substrings that mark a query as belonging to a category
    pub category_keywords: BTreeMap<Category, Vec<String>>,

    /// Openers; may contain "" so some replies start directly
    pub greetings: Vec<String>,

    /// Per-category intro/outro templates; categories without an entry get none
    #[serde(default)]
    pub templates: BTreeMap<Category, CategoryTemplates>,

    /// Sign-offs; may contain ""
    pub closings: Vec<String>,

    /// Ordered replacement table applied to answer text
    #[serde(default)]
    pub phrase_substitutions: Vec<PhraseSubstitution>,

    /// Handlebars templates rendered with `{{query}}` when nothing matches
    pub fallbacks: Vec<String>,

    /// Heading of the runner-up block in contextual answers
    pub additional_info_label: String,
}

impl ResponseCatalog {
    /// Load a catalog from YAML.
    pub fn load(path: &Path) -> AppResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read catalog at {:?}: {}", path, e))
        })?;

        let catalog: ResponseCatalog = serde_yaml::from_str(&content).map_err(|e| {
            AppError::Config(format!("Failed to parse catalog at {:?}: {}", path, e))
        })?;

        catalog.validate()?;
        tracing::debug!("Loaded response catalog from {:?}", path);
        Ok(catalog)
    }

    /// Load from `path` when given, otherwise use the built-in catalog.
    pub fn load_or_default(path: Option<&Path>) -> AppResult<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Check the catalog can always produce a non-empty reply.
    pub fn validate(&self) -> AppResult<()> {
        if self.fallbacks.iter().all(|f| f.trim().is_empty()) {
            return Err(AppError::Config(
                "Response catalog needs at least one non-empty fallback".to_string(),
            ));
        }
        if self.greetings.is_empty() || self.closings.is_empty() {
            return Err(AppError::Config(
                "Response catalog needs greetings and closings (use \"\" for none)".to_string(),
            ));
        }
        if self.category_keywords.contains_key(&Category::General) {
            return Err(AppError::Config(
                "'general' is the catch-all category and cannot have keywords".to_string(),
            ));
        }
        Ok(())
    }

    /// Keywords of a category, empty when none are configured.
    pub fn keywords(&self, category: Category) -> &[String] {
        self.category_keywords
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Templates of a category, if it has a usable intro and outro set.
    pub fn templates_for(&self, category: Category) -> Option<&CategoryTemplates> {
        self.templates.get(&category).filter(|t| t.is_complete())
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for ResponseCatalog {
    fn default() -> Self {
        let category_keywords = BTreeMap::from([
            (
                Category::Fee,
                strings(&["phí", "lệ phí", "biểu phí", "lãi suất", "bao nhiêu tiền"]),
            ),
            (
                Category::Payment,
                strings(&[
                    "thanh toán",
                    "trả nợ",
                    "sao kê",
                    "dư nợ",
                    "chuyển khoản",
                    "trả góp",
                ]),
            ),
            (
                Category::Card,
                strings(&[
                    "thẻ",
                    "hạn mức",
                    "phát hành",
                    "mã pin",
                    "kích hoạt",
                    "gia hạn",
                ]),
            ),
            (
                Category::Technical,
                strings(&[
                    "ứng dụng",
                    "app",
                    "đăng nhập",
                    "mật khẩu",
                    "otp",
                    "lỗi",
                    "internet banking",
                    "digibank",
                ]),
            ),
        ]);

        let templates = BTreeMap::from([
            (
                Category::Fee,
                CategoryTemplates {
                    intros: strings(&[
                        "Về vấn đề phí, ",
                        "Liên quan đến các khoản phí, ",
                        "Về chi phí bạn hỏi, ",
                    ]),
                    outros: strings(&[
                        "Biểu phí có thể thay đổi theo từng thời kỳ, bạn nên kiểm tra lại trên website Vietcombank.",
                        "Bạn có thể xem biểu phí đầy đủ trên website hoặc ứng dụng VCB Digibank.",
                    ]),
                },
            ),
            (
                Category::Payment,
                CategoryTemplates {
                    intros: strings(&["Về việc thanh toán, ", "Đối với thanh toán thẻ, "]),
                    outros: strings(&[
                        "Bạn nhớ thanh toán đúng hạn để tránh phát sinh phí phạt nhé.",
                        "Bạn có thể theo dõi sao kê và dư nợ ngay trên VCB Digibank.",
                    ]),
                },
            ),
            (
                Category::Card,
                CategoryTemplates {
                    intros: strings(&["Về thẻ của bạn, ", "Liên quan đến thẻ, "]),
                    outros: strings(&[
                        "Bạn nhớ giữ bí mật thông tin thẻ và mã PIN nhé.",
                        "Bạn có thể quản lý thẻ trực tiếp trên ứng dụng VCB Digibank.",
                    ]),
                },
            ),
            (
                Category::Technical,
                CategoryTemplates {
                    intros: strings(&["Về vấn đề kỹ thuật, ", "Để xử lý vấn đề này, "]),
                    outros: strings(&[
                        "Nếu vẫn gặp lỗi, bạn hãy cập nhật ứng dụng lên phiên bản mới nhất.",
                        "Bạn có thể thử đăng xuất rồi đăng nhập lại nếu lỗi vẫn còn.",
                    ]),
                },
            ),
        ]);

        Self {
            category_keywords,
            greetings: strings(&["", "Dạ, ", "Chào bạn! ", "Cảm ơn bạn đã hỏi! "]),
            templates,
            closings: strings(&[
                "",
                " Nếu cần hỗ trợ thêm, bạn cứ nhắn cho mình nhé!",
                " Chúc bạn một ngày tốt lành!",
                " Mình luôn sẵn sàng hỗ trợ bạn.",
            ]),
            phrase_substitutions: vec![
                PhraseSubstitution::new("Quý khách hàng", "bạn"),
                PhraseSubstitution::new("Quý khách", "bạn"),
                PhraseSubstitution::new("quý khách", "bạn"),
                PhraseSubstitution::new("Ngân hàng TMCP Ngoại thương Việt Nam", "Vietcombank"),
                PhraseSubstitution::new("Chủ thẻ phải", "Bạn cần"),
                PhraseSubstitution::new("bắt buộc phải", "cần"),
                PhraseSubstitution::new("Vui lòng", "Bạn vui lòng"),
            ],
            fallbacks: strings(&[
                "Xin lỗi, mình chưa hiểu rõ câu hỏi \"{{query}}\". Bạn có thể hỏi lại rõ hơn hoặc liên hệ hotline 1900 54 54 13 để được tư vấn viên hỗ trợ.",
                "Mình chưa tìm thấy thông tin phù hợp cho \"{{query}}\". Bạn vui lòng gọi hotline 1900 54 54 13 hoặc đến chi nhánh Vietcombank gần nhất nhé.",
                "Câu hỏi \"{{query}}\" nằm ngoài phạm vi mình có thể trả lời. Bạn hãy liên hệ tổng đài 1900 54 54 13 để được nhân viên hỗ trợ trực tiếp.",
            ]),
            additional_info_label: "Thông tin thêm:".to_string(),
        }
    }
}

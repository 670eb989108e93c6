use crate::models::CatalogEntry;
use serde::{Deserialize, Serialize};

/// 明细行校验与比对结果
///
/// `is_valid == false` 时 `is_duplicate`/`price_change` 恒为 false，`matched_entry` 为空。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub is_duplicate: bool,
    pub price_change: bool,
    pub matched_entry: Option<CatalogEntry>,
}

impl ValidationResult {
    /// 仅含结构校验信息，比对字段取默认值
    pub fn structural(errors: Vec<String>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
            ..Self::default()
        }
    }
}

/// 界面上每行明细的展示状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    ValidNew,
    ValidDuplicate,
    Invalid,
    WriteFailed,
}

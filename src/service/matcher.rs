use crate::models::{CatalogEntry, CatalogSnapshot, LineItem, ValidationResult};
use crate::service::validator;

/// 商品库比对结果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchOutcome {
    pub is_duplicate: bool,
    pub price_change: bool,
    pub matched_entry: Option<CatalogEntry>,
}

/// 按归一化商品名精确比对（不参与 HSN 编码，不做模糊匹配）
pub fn match_item(item: &LineItem, snapshot: &CatalogSnapshot) -> MatchOutcome {
    let Some(entry) = snapshot.lookup(&item.name) else {
        return MatchOutcome::default();
    };

    // 十进制精确比较: 100 == 100.00
    let price_change = item.unit_rate.as_ref() != Some(&entry.last_rate);

    MatchOutcome {
        is_duplicate: true,
        price_change,
        matched_entry: Some(entry.clone()),
    }
}

/// 校验 + 比对；校验不通过时不做比对
pub fn review(item: &LineItem, snapshot: &CatalogSnapshot) -> ValidationResult {
    let mut result = validator::validate(item);
    if !result.is_valid {
        return result;
    }

    let matched = match_item(item, snapshot);
    result.is_duplicate = matched.is_duplicate;
    result.price_change = matched.price_change;
    result.matched_entry = matched.matched_entry;
    result
}

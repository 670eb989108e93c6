use crate::models::line_item::is_storable_rate;
use crate::models::{LineItem, ValidationResult};
use bigdecimal::{BigDecimal, Zero};

pub const ERR_NAME_REQUIRED: &str = "Product name is required";
pub const ERR_INVALID_RATE: &str = "Unit rate must be a valid non-negative number";
pub const ERR_NEGATIVE_QUANTITY: &str = "Quantity cannot be negative";
pub const ERR_QUANTITY_TOO_LARGE: &str = "Quantity exceeds the allowed maximum";

/// 单行数量上限，保证库存累加不会溢出
pub const MAX_QUANTITY: i64 = 1_000_000_000;

/// 结构校验：商品名 -> 单价 -> 数量，顺序固定
pub fn validate(item: &LineItem) -> ValidationResult {
    let mut errors = Vec::new();

    if item.name.trim().is_empty() {
        errors.push(ERR_NAME_REQUIRED.to_string());
    }

    // 先检查精度，避免超大指数在比较时展开
    let rate_ok = matches!(
        &item.unit_rate,
        Some(rate) if is_storable_rate(rate) && *rate >= BigDecimal::zero()
    );
    if !rate_ok {
        errors.push(ERR_INVALID_RATE.to_string());
    }

    if item.quantity < 0 {
        errors.push(ERR_NEGATIVE_QUANTITY.to_string());
    } else if item.quantity > MAX_QUANTITY {
        errors.push(ERR_QUANTITY_TOO_LARGE.to_string());
    }

    ValidationResult::structural(errors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn valid_item_has_no_errors() {
        let item = LineItem::new("Brake Pad", Some(BigDecimal::from(0)), 0);
        let result = validate(&item);
        assert!(result.is_valid);
        assert!(result.errors.is_empty());
    }

    #[test]
    fn blank_name_and_missing_rate_report_in_order() {
        let item = LineItem::new("   ", None, 3);
        let result = validate(&item);
        assert!(!result.is_valid);
        assert_eq!(result.errors, vec![ERR_NAME_REQUIRED, ERR_INVALID_RATE]);
        assert!(!result.is_duplicate);
        assert!(!result.price_change);
    }

    #[test]
    fn negative_rate_is_invalid() {
        let item = LineItem::new("Filter", Some(BigDecimal::from(-1)), 3);
        let result = validate(&item);
        assert!(!result.is_valid);
        assert_eq!(result.errors, vec![ERR_INVALID_RATE]);
    }

    #[test]
    fn rate_with_huge_exponent_is_invalid() {
        let rate = BigDecimal::from_str("1e-900000000").ok();
        let result = validate(&LineItem::new("Filter", rate, 1));
        assert!(!result.is_valid);
        assert_eq!(result.errors, vec![ERR_INVALID_RATE]);
    }

    #[test]
    fn quantity_above_maximum_is_invalid() {
        let item = LineItem::new("Filter", Some(BigDecimal::from(1)), i64::MAX);
        let result = validate(&item);
        assert!(!result.is_valid);
        assert_eq!(result.errors, vec![ERR_QUANTITY_TOO_LARGE]);

        let item = LineItem::new("Filter", Some(BigDecimal::from(1)), MAX_QUANTITY);
        assert!(validate(&item).is_valid);
    }

    #[test]
    fn negative_quantity_is_invalid() {
        let item = LineItem::new("Filter", Some(BigDecimal::from(10)), -2);
        let result = validate(&item);
        assert_eq!(result.errors, vec![ERR_NEGATIVE_QUANTITY]);
    }
}

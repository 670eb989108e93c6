use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// OCR 识别出的单价原始值：可能是数字，也可能是带货币符号的文本
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawRate {
    Number(serde_json::Number),
    Text(String),
}

/// 识别服务返回的发票明细行 (未校验)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawLineItem {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub hsn_code: Option<String>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub unit_rate: Option<RawRate>,
    #[serde(default)]
    pub quantity: Option<i64>,
}

/// 发票明细行
///
/// 校验后不可变；界面上的编辑会生成新的 `LineItem` 替换原位置。
/// `unit_rate` 为 `None` 表示识别结果缺失或无法解析。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub name: String,
    pub hsn_code: Option<String>,
    pub brand: Option<String>,
    pub unit_rate: Option<BigDecimal>,
    pub quantity: i64,
}

impl LineItem {
    pub fn new(name: impl Into<String>, unit_rate: Option<BigDecimal>, quantity: i64) -> Self {
        Self {
            name: name.into(),
            hsn_code: None,
            brand: None,
            unit_rate,
            quantity,
        }
    }

    /// 从识别结果构建明细行，缺失字段取空值
    pub fn from_raw(raw: RawLineItem) -> Self {
        let unit_rate = match raw.unit_rate {
            Some(RawRate::Number(n)) => parse_rate(&n.to_string()),
            Some(RawRate::Text(text)) => parse_rate(&text),
            None => None,
        };

        Self {
            name: raw.name.unwrap_or_default(),
            hsn_code: non_blank(raw.hsn_code),
            brand: non_blank(raw.brand),
            unit_rate,
            quantity: raw.quantity.unwrap_or(0),
        }
    }
}

/// 解析单价文本: 去掉货币符号、千分位和空白后按十进制精确解析
pub fn parse_rate(text: &str) -> Option<BigDecimal> {
    let stripped = text
        .trim()
        .trim_start_matches("Rs.")
        .trim_start_matches('₹')
        .trim_start_matches('$');

    let cleaned: String = stripped
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();

    if cleaned.is_empty() {
        return None;
    }

    BigDecimal::from_str(&cleaned).ok().filter(is_storable_rate)
}

/// 单价小数位 (NUMERIC(18, 4))
pub const RATE_SCALE: i64 = 4;
const RATE_INTEGER_DIGITS: u32 = 14;
/// 指数上限；超出时任何比较都会按指数展开，必须先拦截
const MAX_RAW_SCALE: i64 = 32;

/// 单价能否无损存入 NUMERIC(18, 4)
///
/// 先只看指数，不做任何会触发重新缩放的运算。
pub fn is_storable_rate(rate: &BigDecimal) -> bool {
    let (_, scale) = rate.as_bigint_and_exponent();
    if scale > MAX_RAW_SCALE || scale < -(RATE_INTEGER_DIGITS as i64) {
        return false;
    }

    if scale > RATE_SCALE && rate.with_scale(RATE_SCALE) != *rate {
        return false;
    }

    rate.abs() < BigDecimal::from(10_i64.pow(RATE_INTEGER_DIGITS))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

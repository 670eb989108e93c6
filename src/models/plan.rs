use crate::models::NewProduct;
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

/// 重复商品的库存合并策略，一个批次统一使用
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergePolicy {
    /// 库存累加
    #[default]
    AddToStock,
    /// 库存覆盖为发票数量
    ReplaceStock,
    /// 跳过已存在商品
    SkipExisting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteOp {
    Insert,
    UpdateStock,
}

/// 写入计划中的一条
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanEntry {
    /// 对应明细行下标
    pub source_index: usize,
    pub target_name: String,
    pub op: WriteOp,
    pub resulting_stock: i64,
    pub unit_rate: Option<BigDecimal>,
    pub hsn_code: Option<String>,
    pub brand: Option<String>,
}

impl PlanEntry {
    /// Insert 时写入的商品行
    pub fn to_new_product(&self) -> NewProduct {
        NewProduct {
            name: self.target_name.clone(),
            hsn_code: self.hsn_code.clone(),
            brand: self.brand.clone(),
            unit_rate: self.unit_rate.clone(),
            stock: self.resulting_stock,
        }
    }
}

/// 写入计划：由选择集和合并策略推导，执行后丢弃
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WritePlan {
    pub entries: Vec<PlanEntry>,
}

impl WritePlan {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn inserts(&self) -> usize {
        self.entries.iter().filter(|e| e.op == WriteOp::Insert).count()
    }

    pub fn updates(&self) -> usize {
        self.entries.iter().filter(|e| e.op == WriteOp::UpdateStock).count()
    }
}

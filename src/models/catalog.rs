use bigdecimal::BigDecimal;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// 商品库条目 (t_catalog_product)
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub name: String,
    pub current_stock: i64,
    pub last_rate: BigDecimal,
}

/// 新增商品行 (Insert 写入)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub hsn_code: Option<String>,
    pub brand: Option<String>,
    pub unit_rate: Option<BigDecimal>,
    pub stock: i64,
}

/// 商品名归一化: 去首尾空白 + 小写
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// 商品库只读快照；会话预览和提交前从商品库重新同步
///
/// 键为归一化后的商品名，保留插入顺序以便序列化结果稳定。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    entries: IndexMap<String, CatalogEntry>,
}

impl CatalogSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: impl IntoIterator<Item = CatalogEntry>) -> Self {
        let mut snapshot = Self::new();
        for entry in entries {
            snapshot.insert(entry);
        }
        snapshot
    }

    /// 同名（归一化后）条目后者覆盖前者
    pub fn insert(&mut self, entry: CatalogEntry) {
        self.entries.insert(normalize_name(&entry.name), entry);
    }

    /// 按归一化商品名精确查找
    pub fn lookup(&self, name: &str) -> Option<&CatalogEntry> {
        self.entries.get(&normalize_name(name))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_ignores_case_and_surrounding_whitespace() {
        let snapshot = CatalogSnapshot::from_entries([CatalogEntry {
            name: "Brake Pad".to_string(),
            current_stock: 10,
            last_rate: BigDecimal::from(100),
        }]);

        assert!(snapshot.lookup("  brake PAD ").is_some());
        assert!(snapshot.lookup("brake pads").is_none());
        assert!(snapshot.lookup("brake  pad").is_none());
    }
}

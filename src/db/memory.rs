use crate::db::CatalogStore;
use crate::error::StoreError;
use crate::models::{normalize_name, CatalogEntry, CatalogSnapshot, NewProduct};
use async_trait::async_trait;
use bigdecimal::{BigDecimal, Zero};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

/// 内存商品库，用于测试和本地演示
///
/// 可通过 `fail_writes_for` 为指定商品注入写入错误。
#[derive(Debug, Default)]
pub struct InMemoryCatalogStore {
    products: DashMap<String, CatalogEntry>,
    failures: DashMap<String, StoreError>,
}

impl InMemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries(entries: impl IntoIterator<Item = CatalogEntry>) -> Self {
        let store = Self::new();
        for entry in entries {
            store.products.insert(normalize_name(&entry.name), entry);
        }
        store
    }

    /// 之后对该商品的写入都返回给定错误
    pub fn fail_writes_for(self, name: &str, error: StoreError) -> Self {
        self.failures.insert(normalize_name(name), error);
        self
    }

    pub fn get(&self, name: &str) -> Option<CatalogEntry> {
        self.products.get(&normalize_name(name)).map(|e| e.clone())
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    fn injected_failure(&self, key: &str) -> Result<(), StoreError> {
        match self.failures.get(key) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl CatalogStore for InMemoryCatalogStore {
    async fn fetch_snapshot(&self, names: Option<&[String]>) -> Result<CatalogSnapshot, StoreError> {
        let snapshot = match names {
            Some(names) => CatalogSnapshot::from_entries(
                names.iter().filter_map(|n| self.get(n)),
            ),
            None => CatalogSnapshot::from_entries(self.products.iter().map(|e| e.value().clone())),
        };
        Ok(snapshot)
    }

    async fn insert(&self, product: &NewProduct) -> Result<(), StoreError> {
        let key = normalize_name(&product.name);
        self.injected_failure(&key)?;

        match self.products.entry(key) {
            Entry::Occupied(_) => Err(StoreError::Rejected(format!(
                "product '{}' already exists",
                product.name
            ))),
            Entry::Vacant(slot) => {
                slot.insert(CatalogEntry {
                    name: product.name.clone(),
                    current_stock: product.stock,
                    last_rate: product.unit_rate.clone().unwrap_or_else(BigDecimal::zero),
                });
                Ok(())
            }
        }
    }

    async fn update_stock(&self, name: &str, new_stock: i64) -> Result<(), StoreError> {
        let key = normalize_name(name);
        self.injected_failure(&key)?;

        match self.products.get_mut(&key) {
            Some(mut entry) => {
                entry.current_stock = new_stock;
                Ok(())
            }
            None => Err(StoreError::Rejected(format!("product '{}' not found", name))),
        }
    }
}

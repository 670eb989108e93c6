use crate::db::queries;
use crate::error::StoreError;
use crate::models::{normalize_name, CatalogSnapshot, NewProduct};
use async_trait::async_trait;
use sqlx::PgPool;
use std::future::Future;
use std::time::{Duration, Instant};

/// 商品库存储接口
///
/// 每次 `insert` / `update_stock` 调用对调用方是原子的。
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// 获取快照；`names` 为 `None` 时返回全部商品
    async fn fetch_snapshot(&self, names: Option<&[String]>) -> Result<CatalogSnapshot, StoreError>;

    /// 新增商品，已存在时返回 `StoreError::Rejected`
    async fn insert(&self, product: &NewProduct) -> Result<(), StoreError>;

    /// 更新库存，商品不存在时返回 `StoreError::Rejected`
    async fn update_stock(&self, name: &str, new_stock: i64) -> Result<(), StoreError>;
}

/// PostgreSQL 商品库
pub struct PgCatalogStore {
    pool: PgPool,
    timeout: Duration,
}

impl PgCatalogStore {
    pub fn new(pool: PgPool, timeout: Duration) -> Self {
        Self { pool, timeout }
    }

    /// 带超时执行，超时视为致命错误
    async fn timed<T, F>(&self, label: &str, fut: F) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, sqlx::Error>>,
    {
        let start = Instant::now();
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(Ok(value)) => {
                tracing::debug!("{} ok, 耗时: {:?}", label, start.elapsed());
                Ok(value)
            }
            Ok(Err(e)) => {
                tracing::error!("✗ {} 失败, 耗时: {:?}, 错误: {:?}", label, start.elapsed(), e);
                Err(StoreError::from(e))
            }
            Err(_) => {
                tracing::error!("✗ {} 超时 (>{:?})!", label, self.timeout);
                Err(StoreError::Fatal(format!("{} timed out after {:?}", label, self.timeout)))
            }
        }
    }
}

#[async_trait]
impl CatalogStore for PgCatalogStore {
    async fn fetch_snapshot(&self, names: Option<&[String]>) -> Result<CatalogSnapshot, StoreError> {
        let keys = names.map(|ns| {
            let mut keys: Vec<String> = ns.iter().map(|n| normalize_name(n)).collect();
            keys.sort();
            keys.dedup();
            keys
        });

        let entries = self
            .timed("fetch snapshot", queries::fetch_catalog_entries(&self.pool, keys))
            .await?;
        tracing::info!("商品库快照加载完成, {} 条", entries.len());
        Ok(CatalogSnapshot::from_entries(entries))
    }

    async fn insert(&self, product: &NewProduct) -> Result<(), StoreError> {
        let key = normalize_name(&product.name);
        let rows = self
            .timed("insert product", queries::insert_product(&self.pool, &key, product))
            .await?;
        if rows == 0 {
            return Err(StoreError::Rejected(format!("product '{}' already exists", product.name)));
        }
        Ok(())
    }

    async fn update_stock(&self, name: &str, new_stock: i64) -> Result<(), StoreError> {
        let key = normalize_name(name);
        let rows = self
            .timed("update stock", queries::update_stock(&self.pool, &key, new_stock))
            .await?;
        if rows == 0 {
            return Err(StoreError::Rejected(format!("product '{}' not found", name)));
        }
        Ok(())
    }
}

use crate::models::{CatalogEntry, NewProduct};
use chrono::Utc;
use sqlx::PgPool;

/// 查询商品库快照；`name_keys` 为空时取全表
pub async fn fetch_catalog_entries(
    pool: &PgPool,
    name_keys: Option<Vec<String>>,
) -> Result<Vec<CatalogEntry>, sqlx::Error> {
    sqlx::query_as::<_, CatalogEntry>(
        r#"
        SELECT fname as name,
               fstock as current_stock,
               coalesce(flastrate, 0) as last_rate
        FROM t_catalog_product
        WHERE $1::varchar[] IS NULL
           OR fnamekey = ANY($1)
        ORDER BY fid
        "#
    )
    .bind(name_keys)
    .fetch_all(pool)
    .await
}

/// 新增商品（已存在则不插入），返回影响行数
pub async fn insert_product(
    pool: &PgPool,
    name_key: &str,
    product: &NewProduct,
) -> Result<u64, sqlx::Error> {
    let now = Utc::now();
    let result = sqlx::query(
        r#"
        INSERT INTO t_catalog_product (
            fname, fnamekey, fhsncode, fbrand, fstock, flastrate, fcreatetime, fupdatetime
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
        ON CONFLICT (fnamekey) DO NOTHING
        "#
    )
    .bind(&product.name)
    .bind(name_key)
    .bind(&product.hsn_code)
    .bind(&product.brand)
    .bind(product.stock)
    .bind(product.unit_rate.clone())
    .bind(now)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

/// 更新库存（仅更新已存在的商品），返回影响行数
pub async fn update_stock(
    pool: &PgPool,
    name_key: &str,
    new_stock: i64,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE t_catalog_product
        SET fstock = $2,
            fupdatetime = $3
        WHERE fnamekey = $1
        "#
    )
    .bind(name_key)
    .bind(new_stock)
    .bind(Utc::now())
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

use invoice_reconcile::{api, create_pool, AppConfig, PgCatalogStore, ReconcileService};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceBuilder;
use tracing::info;
use tracing_subscriber::fmt::time::ChronoLocal;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 初始化日志 - 使用本地时间格式
    tracing_subscriber::fmt()
        .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S".to_string()))
        .with_target(true)
        .with_level(true)
        .init();

    // 加载配置
    let config = AppConfig::load()?;
    info!("Starting server with config: {:?}", config);

    // 创建数据库连接池
    let pool = create_pool(&config.database).await?;
    info!("Database pool created");

    let store = Arc::new(PgCatalogStore::new(
        pool,
        Duration::from_secs(config.executor.write_timeout_secs),
    ));
    let service = Arc::new(ReconcileService::new(store, &config.executor));

    let app = api::router(service).layer(ServiceBuilder::new());

    // 启动服务器
    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!("Server listening on {}", addr);
    info!("API Endpoints:");
    info!("  POST /api/reconcile/review      - 校验比对");
    info!("  POST /api/reconcile/preview     - 写入计划预览");
    info!("  POST /api/reconcile/commit      - 提交写入");
    info!("  POST /api/reconcile/commit/csv  - 提交写入 (CSV 结果)");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

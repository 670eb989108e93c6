use crate::config::ExecutorConfig;
use crate::db::CatalogStore;
use crate::error::ReconcileError;
use crate::models::{LineItem, MergePolicy, OutcomeReport, RawLineItem, ValidationResult, WritePlan};
use crate::service::{planner, BatchExecutor, LineItemExtractor, ReconcileSession, SelectionSet};
use std::sync::Arc;

/// 对账服务: 识别 -> 校验比对 -> 预览 -> 提交
pub struct ReconcileService {
    store: Arc<dyn CatalogStore>,
    executor: BatchExecutor,
}

impl ReconcileService {
    pub fn new(store: Arc<dyn CatalogStore>, config: &ExecutorConfig) -> Self {
        let executor = BatchExecutor::new(store.clone(), config.concurrency);
        Self { store, executor }
    }

    /// 校验并比对一批识别结果，默认勾选所有有效行
    pub async fn review_batch(
        &self,
        raw_items: Vec<RawLineItem>,
        policy: MergePolicy,
    ) -> Result<ReconcileSession, ReconcileError> {
        let items: Vec<LineItem> = raw_items.into_iter().map(LineItem::from_raw).collect();

        // 取完整快照：会话内的编辑可能改成批次外的任意已有商品名
        let snapshot = self.store.fetch_snapshot(None).await?;

        let mut session = ReconcileSession::new(items, snapshot, policy);
        session.select_all();

        let validations = session.validations();
        let invalid = validations.iter().filter(|v| !v.is_valid).count();
        let duplicates = validations.iter().filter(|v| v.is_duplicate).count();
        let price_changes = validations.iter().filter(|v| v.price_change).count();
        tracing::info!(
            "校验完成: {} 行, 无效 {}, 重复 {}, 价格变动 {}",
            validations.len(), invalid, duplicates, price_changes
        );

        Ok(session)
    }

    /// 识别发票图片后进入校验
    pub async fn review_image(
        &self,
        extractor: &dyn LineItemExtractor,
        image: &[u8],
        policy: MergePolicy,
    ) -> Result<ReconcileSession, ReconcileError> {
        let raw_items = extractor.extract(image).await?;
        tracing::info!("识别出 {} 行明细", raw_items.len());
        self.review_batch(raw_items, policy).await
    }

    /// 从商品库重新取快照并重算整个会话
    ///
    /// 客户端回传的会话不可信，预览和提交前都要先同步。
    pub async fn resync(&self, session: &mut ReconcileSession) -> Result<(), ReconcileError> {
        let snapshot = self.store.fetch_snapshot(None).await?;
        session.replace_snapshot(snapshot);
        Ok(())
    }

    /// 写入计划预览
    pub fn preview_plan(
        &self,
        items: &[LineItem],
        validations: &[ValidationResult],
        selection: &SelectionSet,
        policy: MergePolicy,
    ) -> WritePlan {
        planner::plan(items, validations, selection, policy)
    }

    /// 提交写入计划
    pub async fn commit(&self, plan: &WritePlan) -> OutcomeReport {
        self.executor.execute(plan).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::InMemoryCatalogStore;
    use crate::models::{CatalogEntry, CatalogSnapshot, RawRate, WriteOp};
    use async_trait::async_trait;
    use bigdecimal::BigDecimal;

    struct FixedExtractor(Vec<RawLineItem>);

    #[async_trait]
    impl LineItemExtractor for FixedExtractor {
        async fn extract(&self, _image: &[u8]) -> Result<Vec<RawLineItem>, ReconcileError> {
            Ok(self.0.clone())
        }
    }

    struct FailingExtractor;

    #[async_trait]
    impl LineItemExtractor for FailingExtractor {
        async fn extract(&self, _image: &[u8]) -> Result<Vec<RawLineItem>, ReconcileError> {
            Err(ReconcileError::Extraction("unreadable image".to_string()))
        }
    }

    fn raw(name: &str, rate: &str, quantity: i64) -> RawLineItem {
        RawLineItem {
            name: Some(name.to_string()),
            unit_rate: Some(RawRate::Text(rate.to_string())),
            quantity: Some(quantity),
            ..RawLineItem::default()
        }
    }

    fn service() -> ReconcileService {
        let store = Arc::new(InMemoryCatalogStore::with_entries([CatalogEntry {
            name: "Brake Pad".to_string(),
            current_stock: 10,
            last_rate: BigDecimal::from(100),
        }]));
        ReconcileService::new(store, &ExecutorConfig::default())
    }

    #[tokio::test]
    async fn review_image_flags_duplicates_and_selects_valid_rows() {
        let extractor = FixedExtractor(vec![
            raw("brake pad ", "120", 5),
            raw("Gasket", "n/a", 1),
            raw("Clutch Plate", "80", 2),
        ]);

        let mut session = service()
            .review_image(&extractor, b"jpeg", MergePolicy::AddToStock)
            .await
            .unwrap();

        let validations = session.validations().to_vec();
        assert!(validations[0].is_duplicate && validations[0].price_change);
        assert!(!validations[1].is_valid);
        assert!(!validations[2].is_duplicate);
        assert_eq!(session.selection().iter().collect::<Vec<_>>(), vec![0, 2]);
    }

    #[tokio::test]
    async fn extraction_failure_is_surfaced() {
        let err = service()
            .review_image(&FailingExtractor, b"", MergePolicy::AddToStock)
            .await
            .unwrap_err();
        assert!(matches!(err, ReconcileError::Extraction(_)));
    }

    #[tokio::test]
    async fn editing_a_row_to_an_existing_name_matches_it() {
        let store = Arc::new(InMemoryCatalogStore::with_entries([CatalogEntry {
            name: "Filter".to_string(),
            current_stock: 20,
            last_rate: BigDecimal::from(45),
        }]));
        let service = ReconcileService::new(store, &ExecutorConfig::default());

        let mut session = service
            .review_batch(vec![raw("Fliter", "45", 5)], MergePolicy::AddToStock)
            .await
            .unwrap();
        assert!(!session.validations()[0].is_duplicate);

        session
            .replace_item(0, LineItem::new("Filter", Some(BigDecimal::from(45)), 5))
            .unwrap();
        let validations = session.validations().to_vec();
        assert!(validations[0].is_duplicate);
        assert_eq!(
            validations[0].matched_entry.as_ref().map(|e| e.current_stock),
            Some(20)
        );

        assert!(session.selection().contains(0));
        let plan = service.preview_plan(
            session.items(),
            &validations,
            session.selection(),
            session.policy(),
        );
        assert_eq!(plan.len(), 1);
        assert_eq!(plan.entries[0].op, WriteOp::UpdateStock);
        assert_eq!(plan.entries[0].resulting_stock, 25);
    }

    #[tokio::test]
    async fn resync_discards_a_stale_client_snapshot() {
        let service = service();
        let mut session = service
            .review_batch(vec![raw("Brake Pad", "100", 5)], MergePolicy::AddToStock)
            .await
            .unwrap();

        // 会话持有期间商品库存被其他人改动
        service.store.update_stock("brake pad", 40).await.unwrap();
        session.replace_snapshot(CatalogSnapshot::new());
        assert!(!session.validations()[0].is_duplicate);

        service.resync(&mut session).await.unwrap();
        let validations = session.validations().to_vec();
        assert!(validations[0].is_duplicate);
        assert_eq!(
            validations[0].matched_entry.as_ref().map(|e| e.current_stock),
            Some(40)
        );
    }

    #[tokio::test]
    async fn preview_then_commit_updates_the_store() {
        let service = service();
        let mut session = service
            .review_batch(vec![raw("Brake Pad", "100", 5)], MergePolicy::ReplaceStock)
            .await
            .unwrap();

        let validations = session.validations().to_vec();
        let plan = service.preview_plan(
            session.items(),
            &validations,
            session.selection(),
            session.policy(),
        );
        assert_eq!(plan.entries[0].resulting_stock, 5);

        let report = service.commit(&plan).await;
        assert_eq!(report.succeeded(), 1);

        let snapshot = service.store.fetch_snapshot(None).await.unwrap();
        assert_eq!(snapshot.lookup("brake pad").map(|e| e.current_stock), Some(5));
    }
}

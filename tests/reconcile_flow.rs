use bigdecimal::BigDecimal;
use invoice_reconcile::config::ExecutorConfig;
use invoice_reconcile::models::{
    CatalogEntry, ItemStatus, MergePolicy, OutcomeStatus, RawLineItem, RawRate, WriteOp,
};
use invoice_reconcile::{InMemoryCatalogStore, ReconcileService, StoreError};
use std::sync::Arc;

fn raw(name: &str, rate: &str, quantity: i64) -> RawLineItem {
    RawLineItem {
        name: Some(name.to_string()),
        unit_rate: Some(RawRate::Text(rate.to_string())),
        quantity: Some(quantity),
        ..RawLineItem::default()
    }
}

fn entry(name: &str, stock: i64, rate: i64) -> CatalogEntry {
    CatalogEntry {
        name: name.to_string(),
        current_stock: stock,
        last_rate: BigDecimal::from(rate),
    }
}

#[tokio::test]
async fn brake_pad_scenario_under_each_policy() {
    let store = Arc::new(InMemoryCatalogStore::with_entries([entry("Brake Pad", 10, 100)]));
    let service = ReconcileService::new(store, &ExecutorConfig::default());

    let mut session = service
        .review_batch(vec![raw("brake pad ", "120", 5)], MergePolicy::AddToStock)
        .await
        .unwrap();

    let v = &session.validations()[0];
    assert!(v.is_valid && v.is_duplicate && v.price_change);

    let plan = session.preview();
    assert_eq!(plan.len(), 1);
    assert_eq!(plan.entries[0].op, WriteOp::UpdateStock);
    assert_eq!(plan.entries[0].target_name, "Brake Pad");
    assert_eq!(plan.entries[0].resulting_stock, 15);

    session.set_policy(MergePolicy::ReplaceStock);
    assert_eq!(session.preview().entries[0].resulting_stock, 5);

    session.set_policy(MergePolicy::SkipExisting);
    assert!(session.preview().is_empty());
}

#[tokio::test]
async fn duplicate_names_within_one_invoice_collapse_to_the_last_row() {
    let store = Arc::new(InMemoryCatalogStore::with_entries([entry("Filter", 0, 45)]));
    let service = ReconcileService::new(store.clone(), &ExecutorConfig::default());

    let mut session = service
        .review_batch(
            vec![raw("Filter", "45", 3), raw("Filter", "45", 7)],
            MergePolicy::AddToStock,
        )
        .await
        .unwrap();

    let plan = session.preview();
    assert_eq!(plan.len(), 1);
    assert_eq!(plan.entries[0].resulting_stock, 7);

    let report = service.commit(&plan).await;
    assert_eq!(report.succeeded(), 1);
    assert_eq!(store.get("filter").map(|e| e.current_stock), Some(7));
}

#[tokio::test]
async fn one_rejected_write_leaves_the_rest_committed() {
    let store = Arc::new(
        InMemoryCatalogStore::with_entries([entry("Brake Pad", 10, 100)])
            .fail_writes_for("Gasket", StoreError::Rejected("value too long".to_string())),
    );
    let service = ReconcileService::new(store.clone(), &ExecutorConfig::default());

    let mut session = service
        .review_batch(
            vec![
                raw("Brake Pad", "100", 2),
                raw("Gasket", "12", 4),
                raw("Clutch Plate", "80", 1),
                raw("", "9", 1),
            ],
            MergePolicy::AddToStock,
        )
        .await
        .unwrap();

    let plan = session.preview();
    assert_eq!(plan.len(), 3);

    let report = service.commit(&plan).await;
    let statuses: Vec<_> = report.outcomes.iter().map(|o| o.status).collect();
    assert_eq!(
        statuses,
        vec![OutcomeStatus::Succeeded, OutcomeStatus::Failed, OutcomeStatus::Succeeded]
    );
    assert!(report.outcomes[1].error.is_some());

    assert_eq!(store.get("Brake Pad").map(|e| e.current_stock), Some(12));
    assert_eq!(store.get("Clutch Plate").map(|e| e.current_stock), Some(1));

    assert_eq!(
        session.statuses(Some(&report)),
        vec![
            ItemStatus::ValidDuplicate,
            ItemStatus::WriteFailed,
            ItemStatus::ValidNew,
            ItemStatus::Invalid,
        ]
    );

    // 只重试失败的条目
    let retry = report.pending(&plan);
    assert_eq!(retry.len(), 1);
    assert_eq!(retry.entries[0].target_name, "Gasket");
}

#[tokio::test]
async fn select_all_then_deselect_all_plans_nothing() {
    let store = Arc::new(InMemoryCatalogStore::new());
    let service = ReconcileService::new(store, &ExecutorConfig::default());

    let mut session = service
        .review_batch(vec![raw("A", "1", 1), raw("B", "oops", 1)], MergePolicy::AddToStock)
        .await
        .unwrap();

    assert_eq!(session.select_all().iter().collect::<Vec<_>>(), vec![0]);
    assert!(session.toggle(1).is_err());
    assert!(session.deselect_all().is_empty());
    assert!(session.preview().is_empty());
}

#[tokio::test]
async fn rows_collapsed_into_a_failed_write_all_report_failure() {
    let store = Arc::new(
        InMemoryCatalogStore::with_entries([entry("Filter", 0, 45)])
            .fail_writes_for("Filter", StoreError::Rejected("row locked".to_string())),
    );
    let service = ReconcileService::new(store.clone(), &ExecutorConfig::default());

    let mut session = service
        .review_batch(
            vec![raw("Filter", "45", 3), raw("Gasket", "12", 2), raw("filter", "45", 7)],
            MergePolicy::AddToStock,
        )
        .await
        .unwrap();

    let plan = session.preview();
    assert_eq!(plan.len(), 2);
    let report = service.commit(&plan).await;

    assert_eq!(
        session.statuses(Some(&report)),
        vec![ItemStatus::WriteFailed, ItemStatus::ValidNew, ItemStatus::WriteFailed]
    );
    assert_eq!(store.get("Filter").map(|e| e.current_stock), Some(0));
}

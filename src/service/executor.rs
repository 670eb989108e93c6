use crate::db::CatalogStore;
use crate::error::StoreError;
use crate::models::{EntryOutcome, OutcomeReport, OutcomeStatus, PlanEntry, WriteOp, WritePlan};
use chrono::{DateTime, Utc};
use futures::future::join_all;
use std::sync::Arc;

/// 批量写入执行器
///
/// 按窗口并发写入，单条失败不影响其他条目；
/// 遇到致命错误后不再发起新的窗口，剩余条目标记为未执行。
pub struct BatchExecutor {
    store: Arc<dyn CatalogStore>,
    concurrency: usize,
}

impl BatchExecutor {
    pub fn new(store: Arc<dyn CatalogStore>, concurrency: usize) -> Self {
        Self {
            store,
            concurrency: concurrency.max(1),
        }
    }

    pub async fn execute(&self, plan: &WritePlan) -> OutcomeReport {
        let mut report = OutcomeReport::default();
        let total = plan.len();

        tracing::info!(
            "开始执行写入计划: {} 条 (新增 {}, 更新库存 {})",
            total, plan.inserts(), plan.updates()
        );

        for (window_idx, window) in plan.entries.chunks(self.concurrency).enumerate() {
            if report.fatal_error.is_some() {
                report.outcomes.extend(window.iter().map(not_attempted));
                continue;
            }

            let results = join_all(window.iter().map(|entry| self.apply(entry))).await;

            for (entry, (result, attempted_at)) in window.iter().zip(results) {
                let outcome = match result {
                    Ok(()) => outcome(entry, OutcomeStatus::Succeeded, None, attempted_at),
                    Err(e) => {
                        if e.is_fatal() {
                            tracing::error!("写入 '{}' 遇到致命错误: {}", entry.target_name, e);
                            if report.fatal_error.is_none() {
                                report.fatal_error = Some(e.to_string());
                            }
                        } else {
                            tracing::warn!("写入 '{}' 被拒绝: {}", entry.target_name, e);
                        }
                        outcome(entry, OutcomeStatus::Failed, Some(e.to_string()), attempted_at)
                    }
                };
                report.outcomes.push(outcome);
            }

            let done = (window_idx * self.concurrency + window.len()).min(total);
            tracing::debug!("写入进度: {}/{}", done, total);
        }

        tracing::info!(
            "写入完成: 成功 {}, 失败 {}, 未执行 {}",
            report.succeeded(), report.failed(), report.not_attempted()
        );

        report
    }

    async fn apply(&self, entry: &PlanEntry) -> (Result<(), StoreError>, DateTime<Utc>) {
        let attempted_at = Utc::now();
        let result = match entry.op {
            WriteOp::Insert => self.store.insert(&entry.to_new_product()).await,
            WriteOp::UpdateStock => {
                self.store
                    .update_stock(&entry.target_name, entry.resulting_stock)
                    .await
            }
        };
        (result, attempted_at)
    }
}

fn outcome(
    entry: &PlanEntry,
    status: OutcomeStatus,
    error: Option<String>,
    attempted_at: DateTime<Utc>,
) -> EntryOutcome {
    EntryOutcome {
        source_index: entry.source_index,
        target_name: entry.target_name.clone(),
        op: entry.op,
        status,
        error,
        attempted_at: Some(attempted_at),
    }
}

fn not_attempted(entry: &PlanEntry) -> EntryOutcome {
    EntryOutcome {
        source_index: entry.source_index,
        target_name: entry.target_name.clone(),
        op: entry.op,
        status: OutcomeStatus::NotAttempted,
        error: None,
        attempted_at: None,
    }
}

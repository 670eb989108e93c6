use crate::error::ReconcileError;
use crate::models::{
    normalize_name, CatalogSnapshot, ItemStatus, LineItem, MergePolicy, OutcomeReport,
    ValidationResult, WritePlan,
};
use crate::service::{matcher, planner, SelectionSet};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

/// 一次对账会话: 明细、校验结果、选择集、合并策略和商品库快照
///
/// 编辑某行只作废该行的校验结果，下次读取前按需重算。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconcileSession {
    items: Vec<LineItem>,
    #[serde(default)]
    validations: Vec<ValidationResult>,
    #[serde(default)]
    stale: BTreeSet<usize>,
    selection: SelectionSet,
    policy: MergePolicy,
    snapshot: CatalogSnapshot,
}

impl ReconcileSession {
    pub fn new(items: Vec<LineItem>, snapshot: CatalogSnapshot, policy: MergePolicy) -> Self {
        let validations = items.iter().map(|i| matcher::review(i, &snapshot)).collect();
        Self {
            items,
            validations,
            stale: BTreeSet::new(),
            selection: SelectionSet::new(),
            policy,
            snapshot,
        }
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn snapshot(&self) -> &CatalogSnapshot {
        &self.snapshot
    }

    pub fn policy(&self) -> MergePolicy {
        self.policy
    }

    pub fn set_policy(&mut self, policy: MergePolicy) {
        self.policy = policy;
    }

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    /// 最新校验结果（先重算已作废的行）
    pub fn validations(&mut self) -> &[ValidationResult] {
        self.refresh();
        &self.validations
    }

    /// 替换某行明细，只作废该行的校验结果
    pub fn replace_item(&mut self, index: usize, item: LineItem) -> Result<(), ReconcileError> {
        let len = self.items.len();
        let slot = self
            .items
            .get_mut(index)
            .ok_or(ReconcileError::IndexOutOfRange { index, len })?;
        *slot = item;
        self.stale.insert(index);
        Ok(())
    }

    /// 换用新的商品库快照，全部行重新比对
    pub fn replace_snapshot(&mut self, snapshot: CatalogSnapshot) {
        self.snapshot = snapshot;
        self.invalidate_all();
    }

    /// 作废全部校验结果（例如会话来自客户端反序列化）
    pub fn invalidate_all(&mut self) {
        self.validations.resize_with(self.items.len(), ValidationResult::default);
        self.stale = (0..self.items.len()).collect();
    }

    pub fn toggle(&mut self, index: usize) -> Result<&SelectionSet, ReconcileError> {
        self.refresh();
        self.selection.toggle(index, &self.validations)
    }

    pub fn select_all(&mut self) -> &SelectionSet {
        self.refresh();
        self.selection.select_all(&self.validations)
    }

    pub fn deselect_all(&mut self) -> &SelectionSet {
        self.selection.deselect_all()
    }

    /// 当前选择和策略下的写入计划预览
    pub fn preview(&mut self) -> WritePlan {
        self.refresh();
        planner::plan(&self.items, &self.validations, &self.selection, self.policy)
    }

    /// 每行展示状态；传入写入报告时失败/未执行的行标记为 WriteFailed
    pub fn statuses(&mut self, report: Option<&OutcomeReport>) -> Vec<ItemStatus> {
        self.refresh();
        item_statuses(&self.items, &self.validations, &self.selection, report)
    }

    fn refresh(&mut self) {
        if self.validations.len() != self.items.len() {
            self.invalidate_all();
        }
        if self.stale.is_empty() {
            return;
        }

        for index in std::mem::take(&mut self.stale) {
            if let Some(item) = self.items.get(index) {
                self.validations[index] = matcher::review(item, &self.snapshot);
            }
        }
        self.selection.retain_valid(&self.validations);
    }
}

/// 每行展示状态
///
/// 写入结果按目标商品归并：同一批次中被后一行覆盖的已勾选行，
/// 跟随保留条目的写入结果。
pub fn item_statuses(
    items: &[LineItem],
    validations: &[ValidationResult],
    selection: &SelectionSet,
    report: Option<&OutcomeReport>,
) -> Vec<ItemStatus> {
    let failed_targets: HashSet<String> = report
        .map(|r| {
            r.outcomes
                .iter()
                .filter(|o| !o.is_success())
                .map(|o| normalize_name(&o.target_name))
                .collect()
        })
        .unwrap_or_default();

    validations
        .iter()
        .enumerate()
        .map(|(index, v)| {
            let write_failed = selection.contains(index)
                && items
                    .get(index)
                    .map(|item| failed_targets.contains(&target_key(item, v)))
                    .unwrap_or(false);

            if !v.is_valid {
                ItemStatus::Invalid
            } else if write_failed {
                ItemStatus::WriteFailed
            } else if v.is_duplicate {
                ItemStatus::ValidDuplicate
            } else {
                ItemStatus::ValidNew
            }
        })
        .collect()
}

fn target_key(item: &LineItem, validation: &ValidationResult) -> String {
    match &validation.matched_entry {
        Some(existing) if validation.is_duplicate => normalize_name(&existing.name),
        _ => normalize_name(&item.name),
    }
}

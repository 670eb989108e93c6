use crate::models::{normalize_name, LineItem, MergePolicy, PlanEntry, ValidationResult, WriteOp, WritePlan};
use crate::service::SelectionSet;
use indexmap::IndexMap;

/// 根据选择集和合并策略计算写入计划（纯函数，可用于实时预览）
///
/// - 新商品: Insert，库存 = 发票数量
/// - 重复商品: AddToStock 累加 / ReplaceStock 覆盖 / SkipExisting 不生成条目
///
/// 同一批次内多行指向同一商品时后者覆盖前者（不累加），
/// 保留的条目位于后者的位置，其余条目保持明细原顺序。
pub fn plan(
    items: &[LineItem],
    validations: &[ValidationResult],
    selection: &SelectionSet,
    policy: MergePolicy,
) -> WritePlan {
    let mut by_target: IndexMap<String, PlanEntry> = IndexMap::new();

    for index in selection.iter() {
        let (Some(item), Some(validation)) = (items.get(index), validations.get(index)) else {
            continue;
        };
        if !validation.is_valid {
            continue;
        }

        let Some(entry) = plan_entry(index, item, validation, policy) else {
            continue;
        };

        let key = normalize_name(&entry.target_name);
        by_target.shift_remove(&key);
        by_target.insert(key, entry);
    }

    WritePlan {
        entries: by_target.into_values().collect(),
    }
}

fn plan_entry(
    index: usize,
    item: &LineItem,
    validation: &ValidationResult,
    policy: MergePolicy,
) -> Option<PlanEntry> {
    let (target_name, op, resulting_stock) = match (&validation.matched_entry, validation.is_duplicate) {
        (Some(existing), true) => match policy {
            MergePolicy::AddToStock => {
                let Some(total) = existing.current_stock.checked_add(item.quantity) else {
                    tracing::error!(
                        "item {} skipped: stock overflow ({} + {})",
                        index, existing.current_stock, item.quantity
                    );
                    return None;
                };
                (existing.name.clone(), WriteOp::UpdateStock, total)
            }
            MergePolicy::ReplaceStock => (existing.name.clone(), WriteOp::UpdateStock, item.quantity),
            MergePolicy::SkipExisting => return None,
        },
        _ => (item.name.trim().to_string(), WriteOp::Insert, item.quantity),
    };

    Some(PlanEntry {
        source_index: index,
        target_name,
        op,
        resulting_stock,
        unit_rate: item.unit_rate.clone(),
        hsn_code: item.hsn_code.clone(),
        brand: item.brand.clone(),
    })
}

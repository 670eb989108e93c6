use crate::error::ReconcileError;
use crate::models::ValidationResult;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// 用户勾选的明细行下标，只允许包含校验通过的行
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionSet {
    indices: BTreeSet<usize>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, index: usize) -> bool {
        self.indices.contains(&index)
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// 升序遍历
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.indices.iter().copied()
    }

    /// 切换勾选状态；无效行拒绝且不改变状态
    pub fn toggle(
        &mut self,
        index: usize,
        validations: &[ValidationResult],
    ) -> Result<&Self, ReconcileError> {
        let selectable = validations.get(index).map(|v| v.is_valid).unwrap_or(false);
        if !selectable {
            tracing::warn!("item {} not selectable", index);
            return Err(ReconcileError::NotSelectable(index));
        }

        if !self.indices.remove(&index) {
            self.indices.insert(index);
        }
        Ok(self)
    }

    /// 勾选全部有效行，无效行一律排除
    pub fn select_all(&mut self, validations: &[ValidationResult]) -> &Self {
        self.indices = validations
            .iter()
            .enumerate()
            .filter(|(_, v)| v.is_valid)
            .map(|(i, _)| i)
            .collect();
        self
    }

    pub fn deselect_all(&mut self) -> &Self {
        self.indices.clear();
        self
    }

    /// 行被编辑后失效时移出选择集
    pub fn retain_valid(&mut self, validations: &[ValidationResult]) {
        self.indices
            .retain(|&i| validations.get(i).map(|v| v.is_valid).unwrap_or(false));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validations(flags: &[bool]) -> Vec<ValidationResult> {
        flags
            .iter()
            .map(|&ok| {
                let errors = if ok { vec![] } else { vec!["bad".to_string()] };
                ValidationResult::structural(errors)
            })
            .collect()
    }

    #[test]
    fn select_all_skips_invalid_items() {
        let v = validations(&[true, false, true]);
        let mut selection = SelectionSet::new();
        selection.select_all(&v);
        assert_eq!(selection.iter().collect::<Vec<_>>(), vec![0, 2]);

        let first = selection.clone();
        selection.select_all(&v);
        assert_eq!(selection, first);

        selection.deselect_all();
        assert!(selection.is_empty());
    }

    #[test]
    fn toggle_twice_restores_membership() {
        let v = validations(&[true, true]);
        let mut selection = SelectionSet::new();
        selection.toggle(1, &v).unwrap();
        assert!(selection.contains(1));
        selection.toggle(1, &v).unwrap();
        assert!(!selection.contains(1));
    }

    #[test]
    fn toggle_invalid_item_is_rejected_without_change() {
        let v = validations(&[true, false]);
        let mut selection = SelectionSet::new();
        selection.toggle(0, &v).unwrap();

        let err = selection.toggle(1, &v).unwrap_err();
        assert!(matches!(err, ReconcileError::NotSelectable(1)));
        assert!(matches!(selection.toggle(9, &v), Err(ReconcileError::NotSelectable(9))));
        assert_eq!(selection.iter().collect::<Vec<_>>(), vec![0]);
    }

    #[test]
    fn retain_valid_drops_newly_invalid_items() {
        let mut selection = SelectionSet::new();
        selection.select_all(&validations(&[true, true, true]));
        selection.retain_valid(&validations(&[true, false, true]));
        assert_eq!(selection.iter().collect::<Vec<_>>(), vec![0, 2]);
    }
}

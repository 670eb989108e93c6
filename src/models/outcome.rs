use crate::models::{WriteOp, WritePlan};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    Succeeded,
    Failed,
    NotAttempted,
}

impl OutcomeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::NotAttempted => "not_attempted",
        }
    }
}

/// 单条写入结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryOutcome {
    pub source_index: usize,
    pub target_name: String,
    pub op: WriteOp,
    pub status: OutcomeStatus,
    pub error: Option<String>,
    pub attempted_at: Option<DateTime<Utc>>,
}

impl EntryOutcome {
    pub fn is_success(&self) -> bool {
        self.status == OutcomeStatus::Succeeded
    }
}

/// 批量写入结果报告，顺序与写入计划一致
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutcomeReport {
    pub outcomes: Vec<EntryOutcome>,
    /// 致命错误（连接/认证失败），出现后剩余条目不再执行
    pub fatal_error: Option<String>,
}

impl OutcomeReport {
    pub fn succeeded(&self) -> usize {
        self.count(OutcomeStatus::Succeeded)
    }

    pub fn failed(&self) -> usize {
        self.count(OutcomeStatus::Failed)
    }

    pub fn not_attempted(&self) -> usize {
        self.count(OutcomeStatus::NotAttempted)
    }

    fn count(&self, status: OutcomeStatus) -> usize {
        self.outcomes.iter().filter(|o| o.status == status).count()
    }

    /// 尚需重试的子计划（失败 + 未执行）
    ///
    /// 已成功的 Insert 若重复执行会重复插入，重试前必须用它重新计算。
    pub fn pending(&self, plan: &WritePlan) -> WritePlan {
        let entries = plan
            .entries
            .iter()
            .zip(&self.outcomes)
            .filter(|(_, outcome)| !outcome.is_success())
            .map(|(entry, _)| entry.clone())
            .collect();
        WritePlan { entries }
    }

    /// 导出为 CSV
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), csv::Error> {
        let mut writer = csv::Writer::from_writer(writer);
        writer.write_record(["source_index", "target_name", "op", "status", "error", "attempted_at"])?;

        for outcome in &self.outcomes {
            let op = match outcome.op {
                WriteOp::Insert => "insert",
                WriteOp::UpdateStock => "update_stock",
            };
            writer.write_record(&[
                outcome.source_index.to_string(),
                outcome.target_name.clone(),
                op.to_string(),
                outcome.status.as_str().to_string(),
                outcome.error.clone().unwrap_or_default(),
                outcome
                    .attempted_at
                    .map(|t| t.to_rfc3339())
                    .unwrap_or_default(),
            ])?;
        }

        writer.flush()?;
        Ok(())
    }
}

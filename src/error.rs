use thiserror::Error;

/// 商品库写入/查询错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// 单条写入被拒绝（唯一约束、行不存在等），不影响同批其他条目
    #[error("write rejected: {0}")]
    Rejected(String),

    /// 连接/认证等不可恢复错误，剩余条目不再执行
    #[error("fatal store error: {0}")]
    Fatal(String),
}

impl StoreError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Fatal(_))
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db) => {
                // SQLSTATE 28xxx: 认证失败
                let auth_failure = db.code().map(|c| c.starts_with("28")).unwrap_or(false);
                if auth_failure {
                    Self::Fatal(err.to_string())
                } else {
                    Self::Rejected(err.to_string())
                }
            }
            sqlx::Error::RowNotFound => Self::Rejected(err.to_string()),
            _ => Self::Fatal(err.to_string()),
        }
    }
}

/// 对账流程错误
#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("item {0} is not selectable")]
    NotSelectable(usize),

    #[error("item index {index} out of range (batch has {len} items)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("extraction failed: {0}")]
    Extraction(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

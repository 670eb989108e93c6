use crate::error::ReconcileError;
use crate::models::RawLineItem;
use async_trait::async_trait;

/// 发票图片识别服务（外部协作方）
#[async_trait]
pub trait LineItemExtractor: Send + Sync {
    async fn extract(&self, image: &[u8]) -> Result<Vec<RawLineItem>, ReconcileError>;
}

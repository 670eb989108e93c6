use crate::error::{ReconcileError, StoreError};
use crate::models::{ItemStatus, MergePolicy, OutcomeReport, RawLineItem, WritePlan};
use crate::service::{ReconcileService, ReconcileSession};
use axum::{
    extract::{Json, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// 请求体: 识别出的明细行
#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    pub items: Vec<RawLineItem>,
    #[serde(default)]
    pub policy: MergePolicy,
}

/// 请求体: 客户端持有的会话
#[derive(Debug, Deserialize)]
pub struct SessionRequest {
    pub session: ReconcileSession,
}

#[derive(Debug, Serialize)]
pub struct ReviewResponse {
    pub success: bool,
    pub message: String,
    pub session: Option<ReconcileSession>,
    pub statuses: Vec<ItemStatus>,
}

#[derive(Debug, Serialize)]
pub struct PreviewResponse {
    pub success: bool,
    pub plan: WritePlan,
    pub statuses: Vec<ItemStatus>,
}

#[derive(Debug, Serialize)]
pub struct CommitResponse {
    pub success: bool,
    pub message: String,
    pub report: OutcomeReport,
    pub statuses: Vec<ItemStatus>,
}

/// 健康检查
pub async fn health_check() -> &'static str {
    "OK"
}

/// 校验比对接口
pub async fn review(
    State(service): State<Arc<ReconcileService>>,
    Json(req): Json<ReviewRequest>,
) -> Response {
    let count = req.items.len();
    match service.review_batch(req.items, req.policy).await {
        Ok(mut session) => {
            let statuses = session.statuses(None);
            let response = ReviewResponse {
                success: true,
                message: format!("Reviewed {} items", count),
                session: Some(session),
                statuses,
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            let response = ReviewResponse {
                success: false,
                message: format!("Error: {}", e),
                session: None,
                statuses: Vec::new(),
            };
            (error_status(&e), Json(response)).into_response()
        }
    }
}

/// 写入计划预览接口
pub async fn preview(
    State(service): State<Arc<ReconcileService>>,
    Json(req): Json<SessionRequest>,
) -> Response {
    let mut session = req.session;
    if let Err(e) = service.resync(&mut session).await {
        let status = error_status(&e);
        return (status, format!("Error: {}", e)).into_response();
    }

    let response = PreviewResponse {
        success: true,
        plan: plan_for(&service, &mut session),
        statuses: session.statuses(None),
    };
    (StatusCode::OK, Json(response)).into_response()
}

/// 提交接口
pub async fn commit(
    State(service): State<Arc<ReconcileService>>,
    Json(req): Json<SessionRequest>,
) -> Response {
    let (report, statuses) = match run_commit(&service, req.session).await {
        Ok(done) => done,
        Err(e) => return (error_status(&e), format!("Error: {}", e)).into_response(),
    };

    let status = if report.fatal_error.is_some() {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    };
    let response = CommitResponse {
        success: report.succeeded() == report.outcomes.len(),
        message: format!(
            "{} succeeded, {} failed, {} not attempted",
            report.succeeded(), report.failed(), report.not_attempted()
        ),
        report,
        statuses,
    };
    (status, Json(response)).into_response()
}

/// 提交并以 CSV 返回结果
pub async fn commit_csv(
    State(service): State<Arc<ReconcileService>>,
    Json(req): Json<SessionRequest>,
) -> Response {
    let (report, _) = match run_commit(&service, req.session).await {
        Ok(done) => done,
        Err(e) => return (error_status(&e), format!("Error: {}", e)).into_response(),
    };

    let mut body = Vec::new();
    if let Err(e) = report.write_csv(&mut body) {
        tracing::error!("CSV 导出失败: {}", e);
        return (StatusCode::INTERNAL_SERVER_ERROR, format!("Error: {}", e)).into_response();
    }

    (StatusCode::OK, [(header::CONTENT_TYPE, "text/csv; charset=utf-8")], body).into_response()
}

async fn run_commit(
    service: &ReconcileService,
    mut session: ReconcileSession,
) -> Result<(OutcomeReport, Vec<ItemStatus>), ReconcileError> {
    service.resync(&mut session).await?;
    let plan = plan_for(service, &mut session);
    let report = service.commit(&plan).await;
    let statuses = session.statuses(Some(&report));
    Ok((report, statuses))
}

fn plan_for(service: &ReconcileService, session: &mut ReconcileSession) -> WritePlan {
    let validations = session.validations().to_vec();
    service.preview_plan(session.items(), &validations, session.selection(), session.policy())
}

fn error_status(err: &ReconcileError) -> StatusCode {
    match err {
        ReconcileError::Store(StoreError::Fatal(_)) => StatusCode::SERVICE_UNAVAILABLE,
        ReconcileError::Store(StoreError::Rejected(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        ReconcileError::Extraction(_) => StatusCode::BAD_GATEWAY,
        ReconcileError::NotSelectable(_) | ReconcileError::IndexOutOfRange { .. } => {
            StatusCode::BAD_REQUEST
        }
    }
}

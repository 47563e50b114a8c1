use std::sync::Arc;

use attendance_sdk::{AttendanceQuery, NewAttendance};
use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Extension, Query};
use axum::http::StatusCode;
use campus_auth::OrgScoped;

use crate::domain::service::Service;

use super::dto::{
    AttendanceDto, BatchReq, BatchResponse, DeleteParams, ListParams, ListResponse,
    MessageResponse, RecordResponse, UpdateReq, UpsertReq, parse_id,
};
use super::error::ApiError;

type ApiResult<T> = Result<T, ApiError>;

pub async fn list_attendance(
    OrgScoped { ctx, .. }: OrgScoped,
    Extension(svc): Extension<Arc<Service>>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> ApiResult<Json<ListResponse>> {
    let Query(params) = params?;
    let query = AttendanceQuery::try_from(params)?;

    let attendance: Vec<AttendanceDto> = svc
        .list(&ctx, query)
        .await?
        .into_iter()
        .map(AttendanceDto::from)
        .collect();
    Ok(Json(ListResponse {
        total: attendance.len(),
        attendance,
    }))
}

pub async fn upsert_attendance(
    OrgScoped { ctx, .. }: OrgScoped,
    Extension(svc): Extension<Arc<Service>>,
    body: Result<Json<UpsertReq>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<RecordResponse>)> {
    let Json(req) = body?;
    let record = NewAttendance::try_from(req)?;

    let saved = svc.upsert_one(&ctx, record).await?;
    Ok((
        StatusCode::CREATED,
        Json(RecordResponse {
            attendance: saved.into(),
            message: "Attendance recorded",
        }),
    ))
}

pub async fn upsert_attendance_batch(
    OrgScoped { ctx, .. }: OrgScoped,
    Extension(svc): Extension<Arc<Service>>,
    body: Result<Json<BatchReq>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<BatchResponse>)> {
    let Json(req) = body?;
    let records = req
        .records
        .into_iter()
        .map(NewAttendance::try_from)
        .collect::<Result<Vec<_>, _>>()?;

    let saved = svc.upsert_batch(&ctx, records).await?;
    let count = saved.len();
    Ok((
        StatusCode::CREATED,
        Json(BatchResponse {
            attendance: saved.into_iter().map(AttendanceDto::from).collect(),
            message: format!("{count} attendance records saved"),
            count,
        }),
    ))
}

pub async fn update_attendance(
    OrgScoped { ctx, .. }: OrgScoped,
    Extension(svc): Extension<Arc<Service>>,
    body: Result<Json<UpdateReq>, JsonRejection>,
) -> ApiResult<Json<RecordResponse>> {
    let Json(req) = body?;
    let (id, patch) = req.into_parts()?;

    let updated = svc.update(&ctx, id, patch).await?;
    Ok(Json(RecordResponse {
        attendance: updated.into(),
        message: "Attendance updated",
    }))
}

pub async fn delete_attendance(
    OrgScoped { ctx, .. }: OrgScoped,
    Extension(svc): Extension<Arc<Service>>,
    params: Result<Query<DeleteParams>, QueryRejection>,
) -> ApiResult<Json<MessageResponse>> {
    let Query(params) = params?;
    let id = parse_id(&params.id)?;

    svc.delete(&ctx, id).await?;
    Ok(Json(MessageResponse {
        message: "Attendance deleted",
    }))
}

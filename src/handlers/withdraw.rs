use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

use crate::models::*;
use crate::services::WithdrawService;

#[utoipa::path(
    post,
    path = "/withdraw-requests",
    tag = "withdraw",
    request_body = CreateWithdrawRequest,
    responses(
        (status = 201, description = "提现申请已创建", body = WithdrawRequest),
        (status = 400, description = "余额不足或参数错误")
    )
)]
pub async fn create_withdraw(
    withdraw_service: web::Data<WithdrawService>,
    request: web::Json<CreateWithdrawRequest>,
) -> Result<HttpResponse> {
    match withdraw_service.create(request.into_inner()).await {
        Ok(record) => Ok(HttpResponse::Created().json(json!({
            "success": true,
            "data": {
                "withdrawRequest": record
            }
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/withdraw-requests",
    tag = "withdraw",
    params(
        ("userId" = Option<String>, Query, description = "按用户过滤"),
        ("status" = Option<String>, Query, description = "按状态过滤")
    ),
    responses(
        (status = 200, description = "获取提现列表成功")
    )
)]
pub async fn list_withdraws(
    withdraw_service: web::Data<WithdrawService>,
    query: web::Query<WithdrawQuery>,
) -> Result<HttpResponse> {
    match withdraw_service.list(&query.into_inner()).await {
        Ok(records) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": records
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    patch,
    path = "/withdraw-requests/{id}",
    tag = "withdraw",
    request_body = UpdateWithdrawStatusRequest,
    params(
        ("id" = String, Path, description = "提现申请ID")
    ),
    security(
        ("admin_key" = [])
    ),
    responses(
        (status = 200, description = "状态更新成功", body = WithdrawRequest),
        (status = 400, description = "非法状态迁移"),
        (status = 404, description = "提现申请不存在")
    )
)]
pub async fn update_withdraw_status(
    withdraw_service: web::Data<WithdrawService>,
    path: web::Path<String>,
    request: web::Json<UpdateWithdrawStatusRequest>,
) -> Result<HttpResponse> {
    match withdraw_service
        .update_status(&path.into_inner(), request.status)
        .await
    {
        Ok(record) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": {
                "withdrawRequest": record
            }
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn withdraw_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/withdraw-requests")
            .route("", web::post().to(create_withdraw))
            .route("", web::get().to(list_withdraws))
            .route("/{id}", web::patch().to(update_withdraw_status)),
    );
}

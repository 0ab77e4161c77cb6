use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

use crate::models::*;
use crate::services::{ReferralService, ShareService, WithdrawService};

/// 管理端手工发币时写入的分享链接占位值
const ADMIN_GRANT_LINK: &str = "admin_grant";

#[utoipa::path(
    post,
    path = "/admin/share-posts",
    tag = "admin",
    request_body = CreateSharePostRequest,
    security(
        ("admin_key" = [])
    ),
    responses(
        (status = 200, description = "推广帖创建成功", body = SharePost),
        (status = 400, description = "请求参数错误")
    )
)]
pub async fn create_share_post(
    share_service: web::Data<ShareService>,
    request: web::Json<CreateSharePostRequest>,
) -> Result<HttpResponse> {
    match share_service.create_share_post(request.into_inner()).await {
        Ok(post) => Ok(HttpResponse::Ok().json(ApiResponse::success(post))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/admin/share-posts",
    tag = "admin",
    security(
        ("admin_key" = [])
    ),
    responses(
        (status = 200, description = "获取推广帖列表成功")
    )
)]
pub async fn list_share_posts(share_service: web::Data<ShareService>) -> Result<HttpResponse> {
    match share_service.list_share_posts().await {
        Ok(posts) => Ok(HttpResponse::Ok().json(ApiResponse::success(posts))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/admin/referrals",
    tag = "admin",
    params(
        ("status" = Option<String>, Query, description = "pending | approved")
    ),
    security(
        ("admin_key" = [])
    ),
    responses(
        (status = 200, description = "获取推荐审核队列成功")
    )
)]
pub async fn list_referrals(
    referral_service: web::Data<ReferralService>,
    query: web::Query<serde_json::Value>,
) -> Result<HttpResponse> {
    let status = match query.get("status").and_then(|v| v.as_str()) {
        Some("pending") => Some(ReferralStatus::Pending),
        Some("approved") => Some(ReferralStatus::Approved),
        _ => None,
    };

    match referral_service.list_referrals_by_status(status).await {
        Ok(records) => Ok(HttpResponse::Ok().json(ApiResponse::success(records))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/admin/referrals/{id}/approve",
    tag = "admin",
    params(
        ("id" = String, Path, description = "推荐记录ID")
    ),
    security(
        ("admin_key" = [])
    ),
    responses(
        (status = 200, description = "推荐记录已批准", body = ReferralRecord),
        (status = 404, description = "记录不存在")
    )
)]
pub async fn approve_referral(
    referral_service: web::Data<ReferralService>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    match referral_service.approve_referral(&path.into_inner()).await {
        Ok(record) => Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
            record,
            "推荐记录已批准".to_string(),
        ))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/admin/share-records/{id}/approve",
    tag = "admin",
    params(
        ("id" = String, Path, description = "分享收益记录ID")
    ),
    security(
        ("admin_key" = [])
    ),
    responses(
        (status = 200, description = "分享收益已批准", body = ShareRecord),
        (status = 404, description = "记录不存在")
    )
)]
pub async fn approve_share_record(
    share_service: web::Data<ShareService>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    match share_service.approve_share_record(&path.into_inner()).await {
        Ok(record) => Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
            record,
            "分享收益已批准".to_string(),
        ))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/admin/grants",
    tag = "admin",
    request_body = AdminGrantRequest,
    security(
        ("admin_key" = [])
    ),
    responses(
        (status = 200, description = "发放成功", body = ShareRecord),
        (status = 400, description = "请求参数错误")
    )
)]
pub async fn create_grant(
    share_service: web::Data<ShareService>,
    request: web::Json<AdminGrantRequest>,
) -> Result<HttpResponse> {
    let request = request.into_inner();

    match share_service
        .grant_share_coins(
            &request.user_id,
            ShareType::AdminPost,
            ADMIN_GRANT_LINK,
            request.amount_coins,
            request.admin_note,
        )
        .await
    {
        Ok(record) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": {
                "shareRecord": record
            },
            "message": "金币已发放，待审核生效"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/admin/withdraw-requests",
    tag = "admin",
    params(
        ("status" = Option<String>, Query, description = "pending | approved | rejected")
    ),
    security(
        ("admin_key" = [])
    ),
    responses(
        (status = 200, description = "获取提现队列成功")
    )
)]
pub async fn list_withdraw_requests(
    withdraw_service: web::Data<WithdrawService>,
    query: web::Query<serde_json::Value>,
) -> Result<HttpResponse> {
    let status = match query.get("status").and_then(|v| v.as_str()) {
        Some("pending") => Some(WithdrawStatus::Pending),
        Some("approved") => Some(WithdrawStatus::Approved),
        Some("rejected") => Some(WithdrawStatus::Rejected),
        _ => None,
    };

    let filter = WithdrawQuery {
        user_id: query
            .get("userId")
            .and_then(|v| v.as_str())
            .map(str::to_string),
        status,
    };

    match withdraw_service.list(&filter).await {
        Ok(records) => Ok(HttpResponse::Ok().json(ApiResponse::success(records))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn admin_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin")
            .route("/share-posts", web::post().to(create_share_post))
            .route("/share-posts", web::get().to(list_share_posts))
            .route("/referrals", web::get().to(list_referrals))
            .route("/referrals/{id}/approve", web::post().to(approve_referral))
            .route(
                "/share-records/{id}/approve",
                web::post().to(approve_share_record),
            )
            .route("/grants", web::post().to(create_grant))
            .route("/withdraw-requests", web::get().to(list_withdraw_requests)),
    );
}

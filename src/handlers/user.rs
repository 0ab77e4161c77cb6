use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

use crate::handlers::{client_ip, client_user_agent};
use crate::models::*;
use crate::services::{EarningsService, ReferralService, UserService};

#[utoipa::path(
    post,
    path = "/users/register",
    tag = "user",
    request_body = RegisterUserRequest,
    responses(
        (status = 200, description = "注册同步成功", body = PlatformUser),
        (status = 400, description = "请求参数错误")
    )
)]
pub async fn register(
    user_service: web::Data<UserService>,
    req: HttpRequest,
    request: web::Json<RegisterUserRequest>,
) -> Result<HttpResponse> {
    let ip = client_ip(&req);
    let user_agent = client_user_agent(&req);

    match user_service
        .register(request.into_inner(), ip, user_agent)
        .await
    {
        Ok(user) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": {
                "user": user
            }
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "user",
    params(
        ("id" = String, Path, description = "用户ID")
    ),
    responses(
        (status = 200, description = "获取用户成功", body = PlatformUser),
        (status = 404, description = "用户不存在")
    )
)]
pub async fn get_user(
    user_service: web::Data<UserService>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    match user_service.get_user(&path.into_inner()).await {
        Ok(user) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": {
                "user": user
            }
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/users/{id}/earnings",
    tag = "user",
    params(
        ("id" = String, Path, description = "用户ID")
    ),
    responses(
        (status = 200, description = "获取余额成功", body = UserEarnings)
    )
)]
pub async fn get_earnings(
    earnings_service: web::Data<EarningsService>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    match earnings_service.compute_balance(&path.into_inner()).await {
        Ok(earnings) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": earnings
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/users/{id}/referrals",
    tag = "user",
    params(
        ("id" = String, Path, description = "用户ID"),
        ("page" = Option<i64>, Query, description = "页码"),
        ("per_page" = Option<i64>, Query, description = "每页数量")
    ),
    responses(
        (status = 200, description = "获取推荐列表成功")
    )
)]
pub async fn get_referrals(
    referral_service: web::Data<ReferralService>,
    path: web::Path<String>,
    query: web::Query<PaginationParams>,
) -> Result<HttpResponse> {
    match referral_service
        .list_referrals_by_referrer(&path.into_inner(), &query.into_inner())
        .await
    {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn user_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/users")
            .route("/register", web::post().to(register))
            .route("/{id}", web::get().to(get_user))
            .route("/{id}/earnings", web::get().to(get_earnings))
            .route("/{id}/referrals", web::get().to(get_referrals)),
    );
}

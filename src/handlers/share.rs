use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

use crate::handlers::client_fingerprint;
use crate::models::*;
use crate::services::ShareService;

#[utoipa::path(
    post,
    path = "/share/visit",
    tag = "share",
    request_body = RecordVisitRequest,
    responses(
        (status = 200, description = "访问已记录", body = ShareVisitor)
    )
)]
pub async fn record_visit(
    share_service: web::Data<ShareService>,
    req: HttpRequest,
    request: web::Json<RecordVisitRequest>,
) -> Result<HttpResponse> {
    let fingerprint = client_fingerprint(&req);

    match share_service
        .record_visit(&request.share_link, &fingerprint)
        .await
    {
        Ok(visitor) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": {
                "visitor": visitor
            }
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/share/posts/{share_link}",
    tag = "share",
    params(
        ("share_link" = String, Path, description = "分享链接码，格式 {post_id}:{user_id}")
    ),
    responses(
        (status = 200, description = "解析成功", body = SharePost),
        (status = 404, description = "推广帖不存在")
    )
)]
pub async fn resolve_post(
    share_service: web::Data<ShareService>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    match share_service.resolve_share_post(&path.into_inner()).await {
        Ok(post) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": {
                "post": post
            }
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn share_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/share")
            .route("/visit", web::post().to(record_visit))
            .route("/posts/{share_link}", web::get().to(resolve_post)),
    );
}

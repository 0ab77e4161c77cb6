use actix_web::web;
use utoipa::OpenApi;
use utoipa::{
    Modify,
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use crate::handlers;
use crate::models::*;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.as_mut().unwrap();
        components.add_security_scheme(
            "admin_key",
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new("x-admin-key"))),
        )
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::user::register,
        handlers::user::get_user,
        handlers::user::get_earnings,
        handlers::user::get_referrals,
        handlers::share::record_visit,
        handlers::share::resolve_post,
        handlers::withdraw::create_withdraw,
        handlers::withdraw::list_withdraws,
        handlers::withdraw::update_withdraw_status,
        handlers::admin::create_share_post,
        handlers::admin::list_share_posts,
        handlers::admin::list_referrals,
        handlers::admin::approve_referral,
        handlers::admin::approve_share_record,
        handlers::admin::create_grant,
        handlers::admin::list_withdraw_requests,
    ),
    components(
        schemas(
            PlatformUser,
            UserRole,
            UserStatus,
            RegisterUserRequest,
            ReferralRecord,
            ReferralStatus,
            SharePost,
            ShareRecord,
            ShareVisitor,
            ShareType,
            ShareStatus,
            RecordVisitRequest,
            CreateSharePostRequest,
            AdminGrantRequest,
            WithdrawRequest,
            WithdrawStatus,
            CreateWithdrawRequest,
            UpdateWithdrawStatusRequest,
            UserEarnings,
            PaginationParams,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "user", description = "User registration sync and profile API"),
        (name = "share", description = "Share link tracking API"),
        (name = "withdraw", description = "Withdraw request API"),
        (name = "admin", description = "Admin moderation API"),
    ),
    info(
        title = "MediaHub Backend API",
        version = "1.0.0",
        description = "Referral earnings and withdraw bookkeeping REST API documentation",
    ),
    servers(
        (url = "/api/v1", description = "Local server")
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
    .route(
        "/swagger-ui",
        web::get().to(|| async {
            actix_web::HttpResponse::Found()
                .append_header(("Location", "/swagger-ui/"))
                .finish()
        }),
    );
}

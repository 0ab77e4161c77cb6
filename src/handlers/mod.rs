pub mod admin;
pub mod share;
pub mod user;
pub mod withdraw;

pub use admin::admin_config;
pub use share::share_config;
pub use user::user_config;
pub use withdraw::withdraw_config;

use actix_web::HttpRequest;
use actix_web::http::header;

pub(crate) fn client_ip(req: &HttpRequest) -> String {
    req.connection_info()
        .realip_remote_addr()
        .unwrap_or("unknown")
        .to_string()
}

pub(crate) fn client_user_agent(req: &HttpRequest) -> String {
    req.headers()
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string()
}

pub(crate) fn client_fingerprint(req: &HttpRequest) -> String {
    crate::utils::device_fingerprint(&client_ip(req), &client_user_agent(req))
}

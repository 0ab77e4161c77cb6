use crate::error::AppError;
use actix_web::http::Method;
use actix_web::{
    Error,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
};
use futures_util::future::LocalBoxFuture;
use std::future::{Ready, ready};

const ADMIN_KEY_HEADER: &str = "x-admin-key";

// 需要管理员口令的路径配置
struct ProtectedPaths {
    prefix_paths: Vec<&'static str>,
}

impl ProtectedPaths {
    fn new() -> Self {
        Self {
            prefix_paths: vec!["/api/v1/admin"],
        }
    }

    fn requires_admin(&self, method: &Method, path: &str) -> bool {
        if self.prefix_paths.iter().any(|&p| path.starts_with(p)) {
            return true;
        }
        // 提现状态流转也是管理员操作，路径在公共前缀下
        method == Method::PATCH && path.starts_with("/api/v1/withdraw-requests/")
    }
}

pub struct AdminAuthMiddleware {
    api_key: String,
}

impl AdminAuthMiddleware {
    pub fn new(api_key: String) -> Self {
        Self { api_key }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AdminAuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = AdminAuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AdminAuthMiddlewareService {
            service,
            api_key: self.api_key.clone(),
            protected_paths: ProtectedPaths::new(),
        }))
    }
}

pub struct AdminAuthMiddlewareService<S> {
    service: S,
    api_key: String,
    protected_paths: ProtectedPaths,
}

impl<S, B> Service<ServiceRequest> for AdminAuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        // 放行所有 CORS 预检请求
        if req.method() == Method::OPTIONS {
            let fut = self.service.call(req);
            return Box::pin(fut);
        }

        if !self.protected_paths.requires_admin(req.method(), req.path()) {
            let fut = self.service.call(req);
            return Box::pin(fut);
        }

        let provided = req
            .headers()
            .get(ADMIN_KEY_HEADER)
            .and_then(|v| v.to_str().ok());

        match provided {
            Some(key) if key == self.api_key => {
                let fut = self.service.call(req);
                Box::pin(fut)
            }
            _ => {
                let error = AppError::AuthError("Missing or invalid admin key".to_string());
                Box::pin(async move { Err(error.into()) })
            }
        }
    }
}

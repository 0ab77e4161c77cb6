use actix_web::{App, HttpServer, middleware::Logger, web};
use chrono::Local;
use env_logger::{Env, Target};
use std::io::Write; // for env_logger custom formatter

use mediahub_backend::{
    config::Config,
    handlers,
    middlewares::{AdminAuthMiddleware, create_cors},
    services::*,
    storage,
    swagger::swagger_config,
    tasks,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let ts = Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z");
            let level = record.level().as_str().to_ascii_lowercase();
            let msg_json = serde_json::to_string(&format!("{}", record.args()))
                .unwrap_or_else(|_| "\"<invalid utf8>\"".to_string());
            writeln!(
                buf,
                "{{\"timestamp\":\"{}\",\"level\":\"{}\",\"message\":{},\"target\":\"{}\"}}",
                ts,
                level,
                msg_json,
                record.target(),
            )
        })
        .target(Target::Stdout)
        .init();

    // 加载配置
    let config = Config::from_toml().expect("Failed to load configuration file");

    // 探测数据库并初始化记录存储（失败则回退到文件后端）
    let store = storage::connect(&config.storage)
        .await
        .expect("Failed to initialize record store");

    // 创建服务
    let share_service = ShareService::new(store.clone(), config.rewards.share_conversion_coins);
    let referral_service = ReferralService::new(
        store.clone(),
        share_service.clone(),
        config.rewards.clone(),
    );
    let earnings_service = EarningsService::new(store.clone());
    let withdraw_service = WithdrawService::new(store.clone(), earnings_service.clone());
    let user_service = UserService::new(store.clone(), referral_service.clone());

    // 启动后台任务
    tasks::spawn_all(share_service.clone(), config.tasks.visitor_retention_days);

    // 启动HTTP服务器
    log::info!(
        "Starting HTTP server at {}:{}",
        config.server.host,
        config.server.port
    );

    let admin_api_key = config.admin.api_key.clone();
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(create_cors())
            .wrap(AdminAuthMiddleware::new(admin_api_key.clone()))
            .app_data(web::Data::new(user_service.clone()))
            .app_data(web::Data::new(referral_service.clone()))
            .app_data(web::Data::new(share_service.clone()))
            .app_data(web::Data::new(earnings_service.clone()))
            .app_data(web::Data::new(withdraw_service.clone()))
            .configure(swagger_config)
            .service(
                web::scope("/api/v1")
                    .configure(handlers::user_config)
                    .configure(handlers::share_config)
                    .configure(handlers::withdraw_config)
                    .configure(handlers::admin_config),
            )
    })
    .bind((config.server.host.as_str(), config.server.port))?
    .run()
    .await
}

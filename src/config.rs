use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub admin: AdminConfig,
    #[serde(default)]
    pub rewards: RewardsConfig,
    #[serde(default)]
    pub tasks: TasksConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// 文档数据库连接串，探测失败时回退到 data_dir 下的 JSON 文件
    pub database_url: String,
    pub max_connections: u32,
    pub connect_timeout_secs: u64,
    pub data_dir: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminConfig {
    pub api_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewardsConfig {
    /// 推荐注册奖励金币区间 [min, max]
    pub referral_min_coins: i64,
    pub referral_max_coins: i64,
    /// 分享链接转化一次发放的金币数
    pub share_conversion_coins: i64,
}

impl Default for RewardsConfig {
    fn default() -> Self {
        Self {
            referral_min_coins: 5,
            referral_max_coins: 100,
            share_conversion_coins: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TasksConfig {
    /// 分享访客记录保留天数，None 表示永久保留（不开启清理任务）
    #[serde(default)]
    pub visitor_retention_days: Option<i64>,
}

impl Config {
    pub fn from_toml() -> Result<Self, Box<dyn std::error::Error>> {
        let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        use std::io::ErrorKind;

        // 尝试读取配置文件，如果不存在则完全依赖环境变量
        let config_result = std::fs::read_to_string(&config_path);

        let mut config: Config = match config_result {
            Ok(config_str) => {
                // 有配置文件：先解析再用环境变量覆盖
                toml::from_str(&config_str).map_err(|e| format!("解析配置文件失败: {e}"))?
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                // 无配置文件：使用环境变量与默认值构建
                fn get_env(name: &str) -> Option<String> {
                    env::var(name).ok()
                }
                fn get_env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
                    env::var(name)
                        .ok()
                        .and_then(|v| v.parse::<T>().ok())
                        .unwrap_or(default)
                }

                Config {
                    server: ServerConfig {
                        host: get_env("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                        port: get_env_parse("SERVER_PORT", 8080u16),
                    },
                    storage: StorageConfig {
                        database_url: get_env("DATABASE_URL").unwrap_or_default(),
                        max_connections: get_env_parse("DB_MAX_CONNECTIONS", 10u32),
                        connect_timeout_secs: get_env_parse("DB_CONNECT_TIMEOUT_SECS", 5u64),
                        data_dir: get_env("DATA_DIR").unwrap_or_else(|| "data".to_string()),
                    },
                    admin: AdminConfig {
                        api_key: get_env("ADMIN_API_KEY")
                            .unwrap_or_else(|| "change-me-in-production".to_string()),
                    },
                    rewards: RewardsConfig {
                        referral_min_coins: get_env_parse("REFERRAL_MIN_COINS", 5i64),
                        referral_max_coins: get_env_parse("REFERRAL_MAX_COINS", 100i64),
                        share_conversion_coins: get_env_parse("SHARE_CONVERSION_COINS", 10i64),
                    },
                    tasks: TasksConfig {
                        visitor_retention_days: get_env("VISITOR_RETENTION_DAYS")
                            .and_then(|v| v.parse().ok()),
                    },
                }
            }
            Err(e) => {
                return Err(format!("无法读取配置文件 {config_path}: {e}").into());
            }
        };

        // 环境变量覆盖（即便文件存在时也覆盖）
        if let Ok(v) = env::var("SERVER_HOST") {
            config.server.host = v;
        }
        if let Ok(v) = env::var("SERVER_PORT")
            && let Ok(p) = v.parse()
        {
            config.server.port = p;
        }
        if let Ok(v) = env::var("DATABASE_URL") {
            config.storage.database_url = v;
        }
        if let Ok(v) = env::var("DB_MAX_CONNECTIONS")
            && let Ok(mc) = v.parse()
        {
            config.storage.max_connections = mc;
        }
        if let Ok(v) = env::var("DB_CONNECT_TIMEOUT_SECS")
            && let Ok(t) = v.parse()
        {
            config.storage.connect_timeout_secs = t;
        }
        if let Ok(v) = env::var("DATA_DIR") {
            config.storage.data_dir = v;
        }
        if let Ok(v) = env::var("ADMIN_API_KEY") {
            config.admin.api_key = v;
        }
        if let Ok(v) = env::var("REFERRAL_MIN_COINS")
            && let Ok(n) = v.parse()
        {
            config.rewards.referral_min_coins = n;
        }
        if let Ok(v) = env::var("REFERRAL_MAX_COINS")
            && let Ok(n) = v.parse()
        {
            config.rewards.referral_max_coins = n;
        }
        if let Ok(v) = env::var("SHARE_CONVERSION_COINS")
            && let Ok(n) = v.parse()
        {
            config.rewards.share_conversion_coins = n;
        }
        if let Ok(v) = env::var("VISITOR_RETENTION_DAYS")
            && let Ok(n) = v.parse()
        {
            config.tasks.visitor_retention_days = Some(n);
        }

        Ok(config)
    }
}

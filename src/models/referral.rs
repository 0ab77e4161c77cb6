use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ReferralStatus {
    Pending,
    Approved,
}

/// 推荐关系记录：每个被推荐用户至多一条
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReferralRecord {
    pub id: String,
    pub referrer_user_id: String,
    pub referred_user_id: String,
    pub referral_code: String,
    pub coins_earned: i64,
    pub status: ReferralStatus,
    /// 注册时采集的设备指纹，供审核比对
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_fingerprint: Option<String>,
    /// 同一推荐链内指纹重复时置位，只标记不拦截
    #[serde(default)]
    pub flagged: bool,
    pub created_at: DateTime<Utc>,
}

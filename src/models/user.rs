use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    User,
    Admin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    Pending,
    Active,
}

/// 平台用户，首次从身份提供方同步注册时创建，此后按邮箱幂等更新
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlatformUser {
    pub id: String,
    /// 唯一键，始终小写存储
    pub email: String,
    pub name: String,
    pub account_type: String,
    pub role: UserRole,
    pub status: UserStatus,
    pub email_verified: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub firebase_uid: Option<String>,
    /// 创建时生成一次，此后不变
    pub referral_code: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUserRequest {
    #[schema(example = "alice@example.com")]
    pub email: String,
    #[schema(example = "Alice")]
    pub name: String,
    pub firebase_uid: Option<String>,
    pub email_verified: Option<bool>,
    #[schema(example = "free")]
    pub account_type: Option<String>,
    /// 推荐人的邀请码
    #[schema(example = "REF12345678")]
    pub referral_code: Option<String>,
    /// 分享链接携带的转化码
    pub share_code: Option<String>,
}

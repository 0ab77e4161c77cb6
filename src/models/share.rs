use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ShareType {
    Referral,
    ShareLink,
    AdminPost,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ShareStatus {
    Pending,
    Approved,
}

/// 管理端配置的可分享推广帖（弹窗素材），分享流程只读
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SharePost {
    pub id: String,
    pub title: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    /// 弹窗延迟展示毫秒数
    pub show_delay: i64,
    /// 弹窗自动关闭毫秒数，0 表示不自动关闭
    pub close_after: i64,
    /// 单访客最大展示次数
    pub max_displays: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 一次分享收益发放记录，coins_earned 创建后不可变（更正只追加新记录）
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShareRecord {
    pub id: String,
    /// 受益用户
    pub user_id: String,
    pub share_type: ShareType,
    pub share_link: String,
    pub coins_earned: i64,
    pub registration_count: i64,
    pub status: ShareStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_note: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// 分享链接访客，(share_link, visitor_fingerprint) 去重
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShareVisitor {
    pub id: String,
    pub share_link: String,
    pub visitor_fingerprint: String,
    /// 转化后填入新用户ID，至多转化一次
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub converted_to_user_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecordVisitRequest {
    #[schema(example = "p-123:u-456")]
    pub share_link: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateSharePostRequest {
    pub title: String,
    pub url: String,
    pub image_url: Option<String>,
    pub video_url: Option<String>,
    pub show_delay: Option<i64>,
    pub close_after: Option<i64>,
    pub max_displays: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminGrantRequest {
    pub user_id: String,
    pub amount_coins: i64,
    pub admin_note: Option<String>,
}

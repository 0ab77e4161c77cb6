use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum WithdrawStatus {
    Pending,
    Approved,
    Rejected,
}

impl std::fmt::Display for WithdrawStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WithdrawStatus::Pending => write!(f, "pending"),
            WithdrawStatus::Approved => write!(f, "approved"),
            WithdrawStatus::Rejected => write!(f, "rejected"),
        }
    }
}

/// 提现申请：pending -> approved | rejected，终态不可再变
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawRequest {
    pub id: String,
    pub user_id: String,
    pub amount_coins: i64,
    pub status: WithdrawStatus,
    /// 收款目标（支付账号等），由前端透传
    pub destination: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateWithdrawRequest {
    pub user_id: String,
    #[schema(example = 50)]
    pub amount_coins: i64,
    #[schema(example = "paypal:alice@example.com")]
    pub destination: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateWithdrawStatusRequest {
    pub status: WithdrawStatus,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawQuery {
    pub user_id: Option<String>,
    pub status: Option<WithdrawStatus>,
}

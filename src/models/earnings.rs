use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 用户金币余额视图，每次请求基于源记录重新计算，不做缓存
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserEarnings {
    /// 已批准收益减去未被驳回的提现占用
    pub available_coins: i64,
    pub pending_coins: i64,
}

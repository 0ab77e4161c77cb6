use crate::error::AppResult;
use crate::models::{
    ReferralRecord, ReferralStatus, ShareRecord, ShareStatus, UserEarnings, WithdrawRequest,
    WithdrawStatus,
};
use crate::storage::{RecordStore, collections};

/// 金币账本：纯读侧聚合，无缓存
#[derive(Clone)]
pub struct EarningsService {
    store: RecordStore,
}

impl EarningsService {
    pub fn new(store: RecordStore) -> Self {
        Self { store }
    }

    /// 计算某用户的可用/待审余额
    ///
    /// available = 已批准的分享收益 + 已批准的推荐收益 - 未被驳回的提现占用。
    /// pending 提现也计入占用，驳回后这部分金额自动回到 available。
    pub async fn compute_balance(&self, user_id: &str) -> AppResult<UserEarnings> {
        let share_records: Vec<ShareRecord> =
            self.store.load(collections::SHARE_RECORDS).await?;
        let referrals: Vec<ReferralRecord> = self.store.load(collections::REFERRALS).await?;
        let withdrawals: Vec<WithdrawRequest> =
            self.store.load(collections::WITHDRAW_REQUESTS).await?;

        let mut approved = 0i64;
        let mut pending = 0i64;

        for record in share_records.iter().filter(|r| r.user_id == user_id) {
            match record.status {
                ShareStatus::Approved => approved += record.coins_earned,
                ShareStatus::Pending => pending += record.coins_earned,
            }
        }
        for record in referrals.iter().filter(|r| r.referrer_user_id == user_id) {
            match record.status {
                ReferralStatus::Approved => approved += record.coins_earned,
                ReferralStatus::Pending => pending += record.coins_earned,
            }
        }

        let reserved: i64 = withdrawals
            .iter()
            .filter(|w| w.user_id == user_id && w.status != WithdrawStatus::Rejected)
            .map(|w| w.amount_coins)
            .sum();

        Ok(UserEarnings {
            available_coins: approved - reserved,
            pending_coins: pending,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ShareType;
    use chrono::Utc;

    fn service(dir: &tempfile::TempDir) -> EarningsService {
        EarningsService::new(RecordStore::file(dir.path().to_path_buf()))
    }

    fn share_record(user_id: &str, coins: i64, status: ShareStatus) -> ShareRecord {
        ShareRecord {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            share_type: ShareType::ShareLink,
            share_link: "p1:u1".to_string(),
            coins_earned: coins,
            registration_count: 1,
            status,
            admin_note: None,
            created_at: Utc::now(),
        }
    }

    fn referral_record(referrer: &str, coins: i64, status: ReferralStatus) -> ReferralRecord {
        ReferralRecord {
            id: uuid::Uuid::new_v4().to_string(),
            referrer_user_id: referrer.to_string(),
            referred_user_id: uuid::Uuid::new_v4().to_string(),
            referral_code: "REFAAA".to_string(),
            coins_earned: coins,
            status,
            device_fingerprint: None,
            flagged: false,
            created_at: Utc::now(),
        }
    }

    fn withdraw(user_id: &str, amount: i64, status: WithdrawStatus) -> WithdrawRequest {
        let now = Utc::now();
        WithdrawRequest {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            amount_coins: amount,
            status,
            destination: "paypal:x".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn balance_sums_by_status_across_collections() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(&dir);

        svc.store
            .save(
                collections::SHARE_RECORDS,
                &[
                    share_record("u1", 40, ShareStatus::Approved),
                    share_record("u1", 15, ShareStatus::Pending),
                    share_record("u2", 99, ShareStatus::Approved),
                ],
            )
            .await
            .unwrap();
        svc.store
            .save(
                collections::REFERRALS,
                &[
                    referral_record("u1", 60, ReferralStatus::Approved),
                    referral_record("u1", 7, ReferralStatus::Pending),
                ],
            )
            .await
            .unwrap();

        let earnings = svc.compute_balance("u1").await.unwrap();
        assert_eq!(earnings.available_coins, 100);
        assert_eq!(earnings.pending_coins, 22);

        // 无变更时重算结果一致
        let again = svc.compute_balance("u1").await.unwrap();
        assert_eq!(again, earnings);
    }

    #[tokio::test]
    async fn withdrawals_reserve_until_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(&dir);

        svc.store
            .save(
                collections::SHARE_RECORDS,
                &[share_record("u1", 100, ShareStatus::Approved)],
            )
            .await
            .unwrap();
        svc.store
            .save(
                collections::WITHDRAW_REQUESTS,
                &[
                    withdraw("u1", 30, WithdrawStatus::Approved),
                    withdraw("u1", 20, WithdrawStatus::Pending),
                    withdraw("u1", 50, WithdrawStatus::Rejected),
                ],
            )
            .await
            .unwrap();

        let earnings = svc.compute_balance("u1").await.unwrap();
        // 100 - 30 (已批准) - 20 (待审占用)；被驳回的 50 不占用
        assert_eq!(earnings.available_coins, 50);
    }

    #[tokio::test]
    async fn unknown_user_has_zero_balance() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(&dir);

        let earnings = svc.compute_balance("ghost").await.unwrap();
        assert_eq!(earnings.available_coins, 0);
        assert_eq!(earnings.pending_coins, 0);
    }
}

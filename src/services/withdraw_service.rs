use crate::error::{AppError, AppResult};
use crate::models::{CreateWithdrawRequest, WithdrawQuery, WithdrawRequest, WithdrawStatus};
use crate::services::EarningsService;
use crate::storage::{RecordStore, collections};
use chrono::Utc;
use uuid::Uuid;

/// 提现申请管理：余额校验、pending -> approved/rejected 状态机
#[derive(Clone)]
pub struct WithdrawService {
    store: RecordStore,
    earnings_service: EarningsService,
}

impl WithdrawService {
    pub fn new(store: RecordStore, earnings_service: EarningsService) -> Self {
        Self {
            store,
            earnings_service,
        }
    }

    /// 创建提现申请；余额不足时报错且不落任何记录
    pub async fn create(&self, request: CreateWithdrawRequest) -> AppResult<WithdrawRequest> {
        if request.amount_coins <= 0 {
            return Err(AppError::ValidationError(
                "Withdraw amount must be positive".to_string(),
            ));
        }
        if request.destination.trim().is_empty() {
            return Err(AppError::ValidationError(
                "Payout destination is required".to_string(),
            ));
        }

        // 余额校验与写入之间没有跨请求事务，store.update 只保证进程内不交错
        let balance = self
            .earnings_service
            .compute_balance(&request.user_id)
            .await?;
        if request.amount_coins > balance.available_coins {
            return Err(AppError::InsufficientBalance(format!(
                "Requested {} coins but only {} available",
                request.amount_coins, balance.available_coins
            )));
        }

        let now = Utc::now();
        let record = WithdrawRequest {
            id: Uuid::new_v4().to_string(),
            user_id: request.user_id,
            amount_coins: request.amount_coins,
            status: WithdrawStatus::Pending,
            destination: request.destination.trim().to_string(),
            created_at: now,
            updated_at: now,
        };

        let pushed = record.clone();
        self.store
            .update(
                collections::WITHDRAW_REQUESTS,
                move |records: &mut Vec<WithdrawRequest>| {
                    records.push(pushed);
                    Ok(())
                },
            )
            .await?;

        Ok(record)
    }

    /// 状态迁移，只允许 pending -> approved / rejected
    pub async fn update_status(
        &self,
        id: &str,
        new_status: WithdrawStatus,
    ) -> AppResult<WithdrawRequest> {
        let id = id.to_string();
        self.store
            .update(
                collections::WITHDRAW_REQUESTS,
                move |records: &mut Vec<WithdrawRequest>| {
                    let record = records.iter_mut().find(|r| r.id == id).ok_or_else(|| {
                        AppError::NotFound(format!("Withdraw request {id} not found"))
                    })?;

                    match (record.status, new_status) {
                        (WithdrawStatus::Pending, WithdrawStatus::Approved)
                        | (WithdrawStatus::Pending, WithdrawStatus::Rejected) => {
                            record.status = new_status;
                            record.updated_at = Utc::now();
                            Ok(record.clone())
                        }
                        (from, to) => Err(AppError::ValidationError(format!(
                            "Illegal withdraw status transition {from} -> {to}"
                        ))),
                    }
                },
            )
            .await
    }

    pub async fn list(&self, query: &WithdrawQuery) -> AppResult<Vec<WithdrawRequest>> {
        let mut records: Vec<WithdrawRequest> =
            self.store.load(collections::WITHDRAW_REQUESTS).await?;

        if let Some(user_id) = &query.user_id {
            records.retain(|r| &r.user_id == user_id);
        }
        if let Some(status) = query.status {
            records.retain(|r| r.status == status);
        }
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ShareRecord, ShareStatus, ShareType};

    fn services(dir: &tempfile::TempDir) -> WithdrawService {
        let store = RecordStore::file(dir.path().to_path_buf());
        WithdrawService::new(store.clone(), EarningsService::new(store))
    }

    async fn seed_approved_coins(svc: &WithdrawService, user_id: &str, coins: i64) {
        let record = ShareRecord {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            share_type: ShareType::AdminPost,
            share_link: "manual".to_string(),
            coins_earned: coins,
            registration_count: 1,
            status: ShareStatus::Approved,
            admin_note: None,
            created_at: Utc::now(),
        };
        svc.store
            .save(collections::SHARE_RECORDS, &[record])
            .await
            .unwrap();
    }

    fn request(user_id: &str, amount: i64) -> CreateWithdrawRequest {
        CreateWithdrawRequest {
            user_id: user_id.to_string(),
            amount_coins: amount,
            destination: "paypal:alice@example.com".to_string(),
        }
    }

    #[tokio::test]
    async fn overdraw_fails_and_persists_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let svc = services(&dir);
        seed_approved_coins(&svc, "u1", 100).await;

        let err = svc.create(request("u1", 150)).await.unwrap_err();
        assert!(matches!(err, AppError::InsufficientBalance(_)));

        let records: Vec<WithdrawRequest> = svc
            .store
            .load(collections::WITHDRAW_REQUESTS)
            .await
            .unwrap();
        assert!(records.is_empty());

        // 余额不受失败请求影响
        let balance = svc.earnings_service.compute_balance("u1").await.unwrap();
        assert_eq!(balance.available_coins, 100);
    }

    #[tokio::test]
    async fn pending_withdraw_reserves_balance() {
        let dir = tempfile::tempdir().unwrap();
        let svc = services(&dir);
        seed_approved_coins(&svc, "u1", 100).await;

        let first = svc.create(request("u1", 60)).await.unwrap();
        assert_eq!(first.status, WithdrawStatus::Pending);

        // 第二笔只剩 40 可用
        let err = svc.create(request("u1", 50)).await.unwrap_err();
        assert!(matches!(err, AppError::InsufficientBalance(_)));
        assert!(svc.create(request("u1", 40)).await.is_ok());
    }

    #[tokio::test]
    async fn rejected_withdraw_releases_coins() {
        let dir = tempfile::tempdir().unwrap();
        let svc = services(&dir);
        seed_approved_coins(&svc, "u1", 100).await;

        let record = svc.create(request("u1", 50)).await.unwrap();
        let balance = svc.earnings_service.compute_balance("u1").await.unwrap();
        assert_eq!(balance.available_coins, 50);

        svc.update_status(&record.id, WithdrawStatus::Rejected)
            .await
            .unwrap();

        // 驳回后 50 金币回到可用池，且不会被重复扣减
        let balance = svc.earnings_service.compute_balance("u1").await.unwrap();
        assert_eq!(balance.available_coins, 100);
    }

    #[tokio::test]
    async fn approved_withdraw_stays_spent() {
        let dir = tempfile::tempdir().unwrap();
        let svc = services(&dir);
        seed_approved_coins(&svc, "u1", 100).await;

        let record = svc.create(request("u1", 50)).await.unwrap();
        svc.update_status(&record.id, WithdrawStatus::Approved)
            .await
            .unwrap();

        let balance = svc.earnings_service.compute_balance("u1").await.unwrap();
        assert_eq!(balance.available_coins, 50);
    }

    #[tokio::test]
    async fn terminal_states_reject_transitions() {
        let dir = tempfile::tempdir().unwrap();
        let svc = services(&dir);
        seed_approved_coins(&svc, "u1", 100).await;

        let record = svc.create(request("u1", 50)).await.unwrap();
        svc.update_status(&record.id, WithdrawStatus::Approved)
            .await
            .unwrap();

        for target in [
            WithdrawStatus::Pending,
            WithdrawStatus::Approved,
            WithdrawStatus::Rejected,
        ] {
            let err = svc.update_status(&record.id, target).await.unwrap_err();
            assert!(matches!(err, AppError::ValidationError(_)));
        }
    }

    #[tokio::test]
    async fn update_status_unknown_id_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let svc = services(&dir);

        let err = svc
            .update_status("missing", WithdrawStatus::Approved)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn create_validates_input() {
        let dir = tempfile::tempdir().unwrap();
        let svc = services(&dir);

        let err = svc.create(request("u1", 0)).await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));

        let mut bad = request("u1", 10);
        bad.destination = "  ".to_string();
        let err = svc.create(bad).await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }
}

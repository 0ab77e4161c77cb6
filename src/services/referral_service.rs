use crate::config::RewardsConfig;
use crate::error::{AppError, AppResult};
use crate::models::{
    PaginatedResponse, PaginationParams, PlatformUser, ReferralRecord, ReferralStatus,
};
use crate::services::ShareService;
use crate::storage::{RecordStore, collections};
use crate::utils::device_fingerprint;
use chrono::Utc;
use rand::Rng;
use uuid::Uuid;

/// 注册归因处理：把注册请求携带的推荐码/分享码兑换成收益记录
#[derive(Clone)]
pub struct ReferralService {
    store: RecordStore,
    share_service: ShareService,
    rewards: RewardsConfig,
}

impl ReferralService {
    pub fn new(store: RecordStore, share_service: ShareService, rewards: RewardsConfig) -> Self {
        Self {
            store,
            share_service,
            rewards,
        }
    }

    /// 注册后异步调用。任何失败只记日志，注册本身不受影响，也不重试。
    pub async fn process_signup(
        &self,
        new_user_id: &str,
        referral_code: Option<&str>,
        share_code: Option<&str>,
        ip: &str,
        user_agent: &str,
    ) {
        let fingerprint = device_fingerprint(ip, user_agent);

        if let Some(code) = referral_code.map(str::trim).filter(|c| !c.is_empty()) {
            match self.attribute_referral(new_user_id, code, &fingerprint).await {
                Ok(Some(record)) => log::info!(
                    "Referral credited: {} referred {} (+{} coins)",
                    record.referrer_user_id,
                    record.referred_user_id,
                    record.coins_earned
                ),
                Ok(None) => {}
                Err(e) => {
                    log::warn!("Referral attribution failed for user {new_user_id}: {e:?}");
                }
            }
        }

        if let Some(code) = share_code.map(str::trim).filter(|c| !c.is_empty()) {
            if let Err(e) = self
                .share_service
                .convert_share_visit(code, new_user_id, &fingerprint)
                .await
            {
                log::warn!("Share attribution failed for user {new_user_id}: {e:?}");
            }
        }
    }

    /// 按推荐码给推荐人记一笔 pending 收益
    ///
    /// 返回 None 的情况：码不存在、自己推荐自己、该用户已被推荐过。
    /// 同一推荐链内指纹重复只置 flagged，不拦截（审核时人工判断）。
    pub async fn attribute_referral(
        &self,
        new_user_id: &str,
        referral_code: &str,
        fingerprint: &str,
    ) -> AppResult<Option<ReferralRecord>> {
        let users: Vec<PlatformUser> = self.store.load(collections::USERS).await?;

        // 推荐码不保证唯一，按历史行为取首个匹配
        let Some(referrer) = users.iter().find(|u| u.referral_code == referral_code) else {
            log::debug!("Unknown referral code {referral_code}");
            return Ok(None);
        };
        if referrer.id == new_user_id {
            log::debug!("Self-referral attempt by {new_user_id}");
            return Ok(None);
        }

        let referrer_id = referrer.id.clone();
        let min = self.rewards.referral_min_coins;
        let max = self.rewards.referral_max_coins;
        let coins = if min >= max {
            min
        } else {
            rand::thread_rng().gen_range(min..=max)
        };

        let referred_id = new_user_id.to_string();
        let code = referral_code.to_string();
        let fingerprint = fingerprint.to_string();

        self.store
            .update(
                collections::REFERRALS,
                move |records: &mut Vec<ReferralRecord>| {
                    // 一个用户至多被推荐一次
                    if records.iter().any(|r| r.referred_user_id == referred_id) {
                        return Ok(None);
                    }

                    let flagged = records.iter().any(|r| {
                        r.referrer_user_id == referrer_id
                            && r.device_fingerprint.as_deref() == Some(fingerprint.as_str())
                    });
                    if flagged {
                        log::warn!(
                            "Repeated device fingerprint in referral chain of {referrer_id}, record flagged"
                        );
                    }

                    let record = ReferralRecord {
                        id: Uuid::new_v4().to_string(),
                        referrer_user_id: referrer_id,
                        referred_user_id: referred_id,
                        referral_code: code,
                        coins_earned: coins,
                        status: ReferralStatus::Pending,
                        device_fingerprint: Some(fingerprint),
                        flagged,
                        created_at: Utc::now(),
                    };
                    records.push(record.clone());
                    Ok(Some(record))
                },
            )
            .await
    }

    /// 管理员批准一条推荐记录
    pub async fn approve_referral(&self, id: &str) -> AppResult<ReferralRecord> {
        let id = id.to_string();
        self.store
            .update(
                collections::REFERRALS,
                move |records: &mut Vec<ReferralRecord>| {
                    let record = records.iter_mut().find(|r| r.id == id).ok_or_else(|| {
                        AppError::NotFound(format!("Referral record {id} not found"))
                    })?;

                    if record.status != ReferralStatus::Pending {
                        return Err(AppError::ValidationError(
                            "Referral record already reviewed".to_string(),
                        ));
                    }
                    record.status = ReferralStatus::Approved;
                    Ok(record.clone())
                },
            )
            .await
    }

    /// 某用户名下的推荐记录（作为推荐人），按创建时间倒序分页
    pub async fn list_referrals_by_referrer(
        &self,
        user_id: &str,
        params: &PaginationParams,
    ) -> AppResult<PaginatedResponse<ReferralRecord>> {
        let mut records: Vec<ReferralRecord> = self.store.load(collections::REFERRALS).await?;
        records.retain(|r| r.referrer_user_id == user_id);
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(PaginatedResponse::paginate(records, params))
    }

    /// 管理端审核队列
    pub async fn list_referrals_by_status(
        &self,
        status: Option<ReferralStatus>,
    ) -> AppResult<Vec<ReferralRecord>> {
        let mut records: Vec<ReferralRecord> = self.store.load(collections::REFERRALS).await?;
        if let Some(status) = status {
            records.retain(|r| r.status == status);
        }
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{UserRole, UserStatus};

    fn services(dir: &tempfile::TempDir) -> ReferralService {
        let store = RecordStore::file(dir.path().to_path_buf());
        let share_service = ShareService::new(store.clone(), 10);
        ReferralService::new(store, share_service, RewardsConfig::default())
    }

    async fn seed_user(svc: &ReferralService, id: &str, email: &str, referral_code: &str) {
        let now = Utc::now();
        let user = PlatformUser {
            id: id.to_string(),
            email: email.to_string(),
            name: "User".to_string(),
            account_type: "free".to_string(),
            role: UserRole::User,
            status: UserStatus::Active,
            email_verified: true,
            firebase_uid: None,
            referral_code: referral_code.to_string(),
            created_at: now,
            updated_at: now,
        };
        let mut users: Vec<PlatformUser> = svc.store.load(collections::USERS).await.unwrap();
        users.push(user);
        svc.store.save(collections::USERS, &users).await.unwrap();
    }

    #[tokio::test]
    async fn referral_creates_pending_record_with_bounded_coins() {
        let dir = tempfile::tempdir().unwrap();
        let svc = services(&dir);
        seed_user(&svc, "user-b", "b@example.com", "REF12345678").await;

        let record = svc
            .attribute_referral("user-a", "REF12345678", "fp-1")
            .await
            .unwrap()
            .expect("referral should credit");

        assert_eq!(record.referrer_user_id, "user-b");
        assert_eq!(record.referred_user_id, "user-a");
        assert_eq!(record.status, ReferralStatus::Pending);
        assert!((5..=100).contains(&record.coins_earned));
        assert!(!record.flagged);
    }

    #[tokio::test]
    async fn user_is_referred_at_most_once() {
        let dir = tempfile::tempdir().unwrap();
        let svc = services(&dir);
        seed_user(&svc, "user-b", "b@example.com", "REFAAA").await;
        seed_user(&svc, "user-c", "c@example.com", "REFBBB").await;

        let first = svc
            .attribute_referral("user-a", "REFAAA", "fp-1")
            .await
            .unwrap();
        assert!(first.is_some());

        // 同码重复归因，以及换一个推荐人再归因，都不再生成记录
        let repeat = svc
            .attribute_referral("user-a", "REFAAA", "fp-1")
            .await
            .unwrap();
        assert!(repeat.is_none());
        let other = svc
            .attribute_referral("user-a", "REFBBB", "fp-2")
            .await
            .unwrap();
        assert!(other.is_none());

        let records: Vec<ReferralRecord> = svc.store.load(collections::REFERRALS).await.unwrap();
        assert_eq!(records.len(), 1);
    }

    #[tokio::test]
    async fn self_referral_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let svc = services(&dir);
        seed_user(&svc, "user-b", "b@example.com", "REFAAA").await;

        let result = svc
            .attribute_referral("user-b", "REFAAA", "fp-1")
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn unknown_code_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let svc = services(&dir);

        let result = svc
            .attribute_referral("user-a", "REFNOPE", "fp-1")
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn repeated_fingerprint_flags_but_still_credits() {
        let dir = tempfile::tempdir().unwrap();
        let svc = services(&dir);
        seed_user(&svc, "user-b", "b@example.com", "REFAAA").await;

        let first = svc
            .attribute_referral("user-a1", "REFAAA", "fp-same")
            .await
            .unwrap()
            .unwrap();
        assert!(!first.flagged);

        let second = svc
            .attribute_referral("user-a2", "REFAAA", "fp-same")
            .await
            .unwrap()
            .expect("record is still created");
        assert!(second.flagged);
        assert_eq!(second.status, ReferralStatus::Pending);
    }

    #[tokio::test]
    async fn approve_referral_transitions_once() {
        let dir = tempfile::tempdir().unwrap();
        let svc = services(&dir);
        seed_user(&svc, "user-b", "b@example.com", "REFAAA").await;

        let record = svc
            .attribute_referral("user-a", "REFAAA", "fp-1")
            .await
            .unwrap()
            .unwrap();

        let approved = svc.approve_referral(&record.id).await.unwrap();
        assert_eq!(approved.status, ReferralStatus::Approved);

        let err = svc.approve_referral(&record.id).await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[tokio::test]
    async fn process_signup_never_panics_on_bad_codes() {
        let dir = tempfile::tempdir().unwrap();
        let svc = services(&dir);

        // 未知推荐码 + 未知分享码：只打日志，集合不变
        svc.process_signup("user-a", Some("REFNOPE"), Some("ghost:u1"), "1.2.3.4", "ua")
            .await;

        let records: Vec<ReferralRecord> = svc.store.load(collections::REFERRALS).await.unwrap();
        assert!(records.is_empty());
    }
}

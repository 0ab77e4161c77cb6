use crate::error::{AppError, AppResult};
use crate::models::{PlatformUser, RegisterUserRequest, UserRole, UserStatus};
use crate::services::ReferralService;
use crate::storage::{RecordStore, collections};
use crate::utils::{generate_referral_code, normalize_email, validate_email};
use chrono::Utc;
use uuid::Uuid;

/// 用户注册同步：身份提供方登录成功后前端回调，按邮箱幂等 upsert
#[derive(Clone)]
pub struct UserService {
    store: RecordStore,
    referral_service: ReferralService,
}

impl UserService {
    pub fn new(store: RecordStore, referral_service: ReferralService) -> Self {
        Self {
            store,
            referral_service,
        }
    }

    /// upsert 用户并返回记录
    ///
    /// 首次创建时生成推荐码，并把归因作为分离任务抛出去：
    /// 注册立即返回，归因失败只记日志、不重试、不影响注册结果。
    pub async fn register(
        &self,
        request: RegisterUserRequest,
        ip: String,
        user_agent: String,
    ) -> AppResult<PlatformUser> {
        let email = normalize_email(&request.email);
        validate_email(&email)?;
        let name = request.name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::ValidationError("Name is required".to_string()));
        }

        let referral_code = request.referral_code.clone();
        let share_code = request.share_code.clone();
        let now = Utc::now();

        let (user, created) = self
            .store
            .update(collections::USERS, move |users: &mut Vec<PlatformUser>| {
                if let Some(existing) = users.iter_mut().find(|u| u.email == email) {
                    // 已有用户：本次是资料同步，按提供的字段更新
                    existing.name = name;
                    if let Some(account_type) = request.account_type {
                        existing.account_type = account_type;
                    }
                    if let Some(verified) = request.email_verified {
                        existing.email_verified = verified;
                        if verified && existing.status == UserStatus::Pending {
                            existing.status = UserStatus::Active;
                        }
                    }
                    if request.firebase_uid.is_some() {
                        existing.firebase_uid = request.firebase_uid;
                    }
                    existing.updated_at = now;
                    return Ok((existing.clone(), false));
                }

                let id = Uuid::new_v4().to_string();
                let code = generate_referral_code(&id, &email);
                let email_verified = request.email_verified.unwrap_or(false);
                let user = PlatformUser {
                    id,
                    email,
                    name,
                    account_type: request.account_type.unwrap_or_else(|| "free".to_string()),
                    role: UserRole::User,
                    status: if email_verified {
                        UserStatus::Active
                    } else {
                        UserStatus::Pending
                    },
                    email_verified,
                    firebase_uid: request.firebase_uid,
                    referral_code: code,
                    created_at: now,
                    updated_at: now,
                };
                users.push(user.clone());
                Ok((user, true))
            })
            .await?;

        if created {
            let referral_service = self.referral_service.clone();
            let user_id = user.id.clone();
            tokio::spawn(async move {
                referral_service
                    .process_signup(
                        &user_id,
                        referral_code.as_deref(),
                        share_code.as_deref(),
                        &ip,
                        &user_agent,
                    )
                    .await;
            });
        }

        Ok(user)
    }

    pub async fn get_user(&self, id: &str) -> AppResult<PlatformUser> {
        let users: Vec<PlatformUser> = self.store.load(collections::USERS).await?;
        users
            .into_iter()
            .find(|u| u.id == id)
            .ok_or_else(|| AppError::NotFound(format!("User {id} not found")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RewardsConfig;
    use crate::services::ShareService;

    fn service(dir: &tempfile::TempDir) -> UserService {
        let store = RecordStore::file(dir.path().to_path_buf());
        let share_service = ShareService::new(store.clone(), 10);
        let referral_service =
            ReferralService::new(store.clone(), share_service, RewardsConfig::default());
        UserService::new(store, referral_service)
    }

    fn request(email: &str, name: &str) -> RegisterUserRequest {
        RegisterUserRequest {
            email: email.to_string(),
            name: name.to_string(),
            firebase_uid: None,
            email_verified: None,
            account_type: None,
            referral_code: None,
            share_code: None,
        }
    }

    #[tokio::test]
    async fn register_assigns_referral_code_once() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(&dir);

        let user = svc
            .register(request("alice@example.com", "Alice"), "ip".into(), "ua".into())
            .await
            .unwrap();
        assert!(user.referral_code.starts_with("REF"));
        assert_eq!(user.status, UserStatus::Pending);

        // 再次同步：同一条记录，推荐码不变
        let again = svc
            .register(request("Alice@Example.com", "Alice A."), "ip".into(), "ua".into())
            .await
            .unwrap();
        assert_eq!(again.id, user.id);
        assert_eq!(again.referral_code, user.referral_code);
        assert_eq!(again.name, "Alice A.");

        let users: Vec<PlatformUser> = svc.store.load(collections::USERS).await.unwrap();
        assert_eq!(users.len(), 1);
    }

    #[tokio::test]
    async fn verified_sync_activates_pending_user() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(&dir);

        svc.register(request("bob@example.com", "Bob"), "ip".into(), "ua".into())
            .await
            .unwrap();

        let mut verified = request("bob@example.com", "Bob");
        verified.email_verified = Some(true);
        let user = svc
            .register(verified, "ip".into(), "ua".into())
            .await
            .unwrap();
        assert!(user.email_verified);
        assert_eq!(user.status, UserStatus::Active);
    }

    #[tokio::test]
    async fn register_rejects_bad_input() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(&dir);

        let err = svc
            .register(request("not-an-email", "Alice"), "ip".into(), "ua".into())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));

        let err = svc
            .register(request("alice@example.com", "   "), "ip".into(), "ua".into())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[tokio::test]
    async fn get_user_unknown_id_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(&dir);

        let err = svc.get_user("ghost").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}

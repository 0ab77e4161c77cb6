use crate::error::{AppError, AppResult};
use crate::models::{
    CreateSharePostRequest, SharePost, ShareRecord, ShareStatus, ShareType, ShareVisitor,
};
use crate::storage::{RecordStore, collections};
use chrono::{Duration, Utc};
use uuid::Uuid;

/// 分享链接服务：访客追踪、推广帖解析、转化发币
///
/// 分享链接的约定格式为 `"{post_id}:{beneficiary_user_id}"`，
/// 冒号前是推广帖ID，冒号后是收益用户ID。
#[derive(Clone)]
pub struct ShareService {
    store: RecordStore,
    conversion_coins: i64,
}

impl ShareService {
    pub fn new(store: RecordStore, conversion_coins: i64) -> Self {
        Self {
            store,
            conversion_coins,
        }
    }

    /// 记录一次分享链接访问，(share_link, fingerprint) 幂等
    pub async fn record_visit(
        &self,
        share_link: &str,
        fingerprint: &str,
    ) -> AppResult<ShareVisitor> {
        let share_link = share_link.to_string();
        let fingerprint = fingerprint.to_string();

        self.store
            .update(
                collections::SHARE_VISITORS,
                move |visitors: &mut Vec<ShareVisitor>| {
                    if let Some(existing) = visitors.iter().find(|v| {
                        v.share_link == share_link && v.visitor_fingerprint == fingerprint
                    }) {
                        return Ok(existing.clone());
                    }

                    let visitor = ShareVisitor {
                        id: Uuid::new_v4().to_string(),
                        share_link,
                        visitor_fingerprint: fingerprint,
                        converted_to_user_id: None,
                        created_at: Utc::now(),
                    };
                    visitors.push(visitor.clone());
                    Ok(visitor)
                },
            )
            .await
    }

    /// 解析分享链接指向的推广帖
    pub async fn resolve_share_post(&self, share_link: &str) -> AppResult<SharePost> {
        let post_id = share_link.split(':').next().unwrap_or(share_link);
        let posts: Vec<SharePost> = self.store.load(collections::SHARE_POSTS).await?;

        posts.into_iter().find(|p| p.id == post_id).ok_or_else(|| {
            AppError::NotFound(format!("Share post not found for link {share_link}"))
        })
    }

    /// 创建一条新的分享收益记录（pending，待管理员审核）
    pub async fn grant_share_coins(
        &self,
        user_id: &str,
        share_type: ShareType,
        share_link: &str,
        amount: i64,
        admin_note: Option<String>,
    ) -> AppResult<ShareRecord> {
        if amount <= 0 {
            return Err(AppError::ValidationError(
                "Coin amount must be positive".to_string(),
            ));
        }

        let record = ShareRecord {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            share_type,
            share_link: share_link.to_string(),
            coins_earned: amount,
            registration_count: 1,
            status: ShareStatus::Pending,
            admin_note,
            created_at: Utc::now(),
        };

        let pushed = record.clone();
        self.store
            .update(
                collections::SHARE_RECORDS,
                move |records: &mut Vec<ShareRecord>| {
                    records.push(pushed);
                    Ok(())
                },
            )
            .await?;

        Ok(record)
    }

    /// 注册转化：同一 (share_link, fingerprint) 只发一次币
    ///
    /// 返回 None 表示本次注册不产生新发放（链接无收益人或访客已转化过）。
    pub async fn convert_share_visit(
        &self,
        share_link: &str,
        new_user_id: &str,
        fingerprint: &str,
    ) -> AppResult<Option<ShareRecord>> {
        // 链接必须指向存在的推广帖
        self.resolve_share_post(share_link).await?;

        let Some(beneficiary) = share_link
            .split(':')
            .nth(1)
            .filter(|part| !part.is_empty())
            .map(str::to_string)
        else {
            log::debug!("Share link {share_link} carries no beneficiary, skip grant");
            return Ok(None);
        };

        let link = share_link.to_string();
        let fp = fingerprint.to_string();
        let converted_user = new_user_id.to_string();

        let qualified = self
            .store
            .update(
                collections::SHARE_VISITORS,
                move |visitors: &mut Vec<ShareVisitor>| {
                    if let Some(visitor) = visitors
                        .iter_mut()
                        .find(|v| v.share_link == link && v.visitor_fingerprint == fp)
                    {
                        if visitor.converted_to_user_id.is_some() {
                            return Ok(false);
                        }
                        visitor.converted_to_user_id = Some(converted_user);
                        return Ok(true);
                    }

                    // 未记录到访问也算转化，直接落一条已转化的访客
                    visitors.push(ShareVisitor {
                        id: Uuid::new_v4().to_string(),
                        share_link: link,
                        visitor_fingerprint: fp,
                        converted_to_user_id: Some(converted_user),
                        created_at: Utc::now(),
                    });
                    Ok(true)
                },
            )
            .await?;

        if !qualified {
            log::debug!("Repeat conversion on {share_link}, no coins granted");
            return Ok(None);
        }

        let record = self
            .grant_share_coins(
                &beneficiary,
                ShareType::ShareLink,
                share_link,
                self.conversion_coins,
                None,
            )
            .await?;
        Ok(Some(record))
    }

    /// 管理端创建推广帖
    pub async fn create_share_post(&self, request: CreateSharePostRequest) -> AppResult<SharePost> {
        if request.title.trim().is_empty() {
            return Err(AppError::ValidationError("Title is required".to_string()));
        }
        if request.url.trim().is_empty() {
            return Err(AppError::ValidationError("Url is required".to_string()));
        }

        let now = Utc::now();
        let post = SharePost {
            id: Uuid::new_v4().to_string(),
            title: request.title.trim().to_string(),
            url: request.url.trim().to_string(),
            image_url: request.image_url,
            video_url: request.video_url,
            show_delay: request.show_delay.unwrap_or(0),
            close_after: request.close_after.unwrap_or(0),
            max_displays: request.max_displays.unwrap_or(0),
            created_at: now,
            updated_at: now,
        };

        let pushed = post.clone();
        self.store
            .update(
                collections::SHARE_POSTS,
                move |posts: &mut Vec<SharePost>| {
                    posts.push(pushed);
                    Ok(())
                },
            )
            .await?;

        Ok(post)
    }

    pub async fn list_share_posts(&self) -> AppResult<Vec<SharePost>> {
        self.store.load(collections::SHARE_POSTS).await
    }

    /// 管理员批准一条分享收益记录
    pub async fn approve_share_record(&self, id: &str) -> AppResult<ShareRecord> {
        let id = id.to_string();
        self.store
            .update(
                collections::SHARE_RECORDS,
                move |records: &mut Vec<ShareRecord>| {
                    let record = records
                        .iter_mut()
                        .find(|r| r.id == id)
                        .ok_or_else(|| AppError::NotFound(format!("Share record {id} not found")))?;

                    if record.status != ShareStatus::Pending {
                        return Err(AppError::ValidationError(
                            "Share record already reviewed".to_string(),
                        ));
                    }
                    record.status = ShareStatus::Approved;
                    Ok(record.clone())
                },
            )
            .await
    }

    /// 清理超过保留期且未转化的访客记录，返回清理条数
    pub async fn prune_stale_visitors(&self, retention_days: i64) -> AppResult<usize> {
        let cutoff = Utc::now() - Duration::days(retention_days);

        self.store
            .update(
                collections::SHARE_VISITORS,
                move |visitors: &mut Vec<ShareVisitor>| {
                    let before = visitors.len();
                    // 已转化的记录保留，它们承担防重复发币的职责
                    visitors
                        .retain(|v| v.converted_to_user_id.is_some() || v.created_at >= cutoff);
                    Ok(before - visitors.len())
                },
            )
            .await
    }
}

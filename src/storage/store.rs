//! Dual-backend record store.
//!
//! The database backend keeps every record as one JSON document row in the
//! `documents` table (the surrogate row id never leaves this module). When the
//! database is unreachable at startup, the store falls back to one JSON array
//! file per collection under `data_dir`. `save` replaces the whole collection
//! in both modes.

use crate::config::StorageConfig;
use crate::entities::document_entity as documents;
use crate::error::{AppError, AppResult};
use migration::{Migrator, MigratorTrait};
use sea_orm::{
    ActiveValue::Set, ColumnTrait, ConnectOptions, Database, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder, TransactionTrait,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// 启动时探测一次数据库；失败则整个进程使用文件后端
pub async fn connect(config: &StorageConfig) -> AppResult<RecordStore> {
    if !config.database_url.is_empty() {
        let mut opts = ConnectOptions::new(config.database_url.clone());
        opts.max_connections(config.max_connections)
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .sqlx_logging(false);

        match Database::connect(opts).await {
            Ok(conn) => {
                Migrator::up(&conn, None).await?;
                log::info!("Record store ready: database backend");
                return Ok(RecordStore::database(conn));
            }
            Err(e) => {
                log::warn!("Database unreachable, falling back to file storage: {e}");
            }
        }
    }

    log::info!("Record store ready: file backend at {}", config.data_dir);
    Ok(RecordStore::file(PathBuf::from(&config.data_dir)))
}

#[derive(Clone)]
pub struct RecordStore {
    backend: Backend,
    // 串行化进程内的读-改-写，两个请求不会互相覆盖对方的写入
    write_lock: Arc<Mutex<()>>,
}

#[derive(Clone)]
enum Backend {
    Database(DatabaseConnection),
    File(FileStore),
}

impl RecordStore {
    pub fn database(conn: DatabaseConnection) -> Self {
        Self {
            backend: Backend::Database(conn),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn file(data_dir: PathBuf) -> Self {
        Self {
            backend: Backend::File(FileStore::new(data_dir)),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub async fn load<T: DeserializeOwned>(&self, collection: &str) -> AppResult<Vec<T>> {
        match &self.backend {
            Backend::Database(conn) => {
                let rows = documents::Entity::find()
                    .filter(documents::Column::Collection.eq(collection))
                    .order_by_asc(documents::Column::Id)
                    .all(conn)
                    .await?;

                let mut records = Vec::with_capacity(rows.len());
                for row in rows {
                    records.push(serde_json::from_value(row.payload)?);
                }
                Ok(records)
            }
            Backend::File(files) => files.load(collection).await,
        }
    }

    /// 整体替换集合内容（数据库模式为事务内先删后插）
    pub async fn save<T: Serialize>(&self, collection: &str, records: &[T]) -> AppResult<()> {
        match &self.backend {
            Backend::Database(conn) => {
                let mut models = Vec::with_capacity(records.len());
                for record in records {
                    models.push(documents::ActiveModel {
                        collection: Set(collection.to_string()),
                        payload: Set(serde_json::to_value(record)?),
                        ..Default::default()
                    });
                }

                let txn = conn.begin().await?;
                documents::Entity::delete_many()
                    .filter(documents::Column::Collection.eq(collection))
                    .exec(&txn)
                    .await?;
                if !models.is_empty() {
                    documents::Entity::insert_many(models).exec(&txn).await?;
                }
                txn.commit().await?;
                Ok(())
            }
            Backend::File(files) => files.save(collection, records).await,
        }
    }

    /// 加锁的 load-修改-save；`apply` 返回错误时不落盘
    pub async fn update<T, R, F>(&self, collection: &str, apply: F) -> AppResult<R>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce(&mut Vec<T>) -> AppResult<R>,
    {
        let _guard = self.write_lock.lock().await;
        let mut records = self.load(collection).await?;
        let out = apply(&mut records)?;
        self.save(collection, &records).await?;
        Ok(out)
    }
}

#[derive(Clone)]
pub struct FileStore {
    data_dir: PathBuf,
}

impl FileStore {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    fn path(&self, collection: &str) -> PathBuf {
        self.data_dir.join(format!("{collection}.json"))
    }

    pub async fn load<T: DeserializeOwned>(&self, collection: &str) -> AppResult<Vec<T>> {
        let path = self.path(collection);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                // 首次访问：建目录并落一个空数组文件
                tokio::fs::create_dir_all(&self.data_dir).await.map_err(|e| {
                    AppError::StorageUnavailable(format!(
                        "mkdir {}: {e}",
                        self.data_dir.display()
                    ))
                })?;
                tokio::fs::write(&path, b"[]").await.map_err(|e| {
                    AppError::StorageUnavailable(format!("write {}: {e}", path.display()))
                })?;
                b"[]".to_vec()
            }
            Err(e) => {
                return Err(AppError::StorageUnavailable(format!(
                    "read {}: {e}",
                    path.display()
                )));
            }
        };
        Ok(serde_json::from_slice(&bytes)?)
    }

    pub async fn save<T: Serialize>(&self, collection: &str, records: &[T]) -> AppResult<()> {
        tokio::fs::create_dir_all(&self.data_dir)
            .await
            .map_err(|e| {
                AppError::StorageUnavailable(format!("mkdir {}: {e}", self.data_dir.display()))
            })?;

        let path = self.path(collection);
        let bytes = serde_json::to_vec_pretty(records)?;
        tokio::fs::write(&path, bytes).await.map_err(|e| {
            AppError::StorageUnavailable(format!("write {}: {e}", path.display()))
        })?;
        Ok(())
    }
}

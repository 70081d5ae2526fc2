//! 内存文件存储
//!
//! 上传与过滤生成的图纸只保存在内存中，超过保存时长或容量时被淘汰，
//! 服务重启后全部丢失。

use axum::body::Bytes;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

/// 文件来源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileOrigin {
    Upload,
    Remote,
    Filtered,
}

/// 已保存的文件
#[derive(Debug, Clone)]
pub struct StoredFile {
    pub id: Uuid,
    pub name: String,
    pub origin: FileOrigin,
    pub bytes: Bytes,
    pub created_at: DateTime<Utc>,
}

impl StoredFile {
    fn is_expired(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now.signed_duration_since(self.created_at)
            .to_std()
            .map(|age| age > ttl)
            .unwrap_or(false)
    }
}

/// 文件存储
#[derive(Debug)]
pub struct FileStore {
    files: RwLock<HashMap<Uuid, StoredFile>>,
    capacity: usize,
    ttl: Duration,
}

impl FileStore {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            files: RwLock::new(HashMap::new()),
            capacity: capacity.max(1),
            ttl,
        }
    }

    /// 保存文件，返回新分配的 id
    pub async fn insert(&self, name: impl Into<String>, origin: FileOrigin, bytes: Bytes) -> Uuid {
        self.insert_at(name.into(), origin, bytes, Utc::now()).await
    }

    async fn insert_at(
        &self,
        name: String,
        origin: FileOrigin,
        bytes: Bytes,
        created_at: DateTime<Utc>,
    ) -> Uuid {
        let now = Utc::now();
        let mut files = self.files.write().await;

        let before = files.len();
        files.retain(|_, f| !f.is_expired(now, self.ttl));
        if files.len() < before {
            debug!(purged = before - files.len(), "expired files purged");
        }

        while files.len() >= self.capacity {
            let oldest = files
                .values()
                .min_by_key(|f| f.created_at)
                .map(|f| f.id);
            match oldest {
                Some(id) => {
                    files.remove(&id);
                    debug!(%id, "store full, evicted oldest file");
                }
                None => break,
            }
        }

        let id = Uuid::new_v4();
        files.insert(
            id,
            StoredFile {
                id,
                name,
                origin,
                bytes,
                created_at,
            },
        );
        id
    }

    /// 获取文件，已过期的视为不存在
    pub async fn get(&self, id: &Uuid) -> Option<StoredFile> {
        let files = self.files.read().await;
        files
            .get(id)
            .filter(|f| !f.is_expired(Utc::now(), self.ttl))
            .cloned()
    }

    /// 删除文件，返回文件是否存在
    pub async fn remove(&self, id: &Uuid) -> bool {
        self.files.write().await.remove(id).is_some()
    }

    pub async fn len(&self) -> usize {
        self.files.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.files.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(capacity: usize) -> FileStore {
        FileStore::new(capacity, Duration::from_secs(60))
    }

    #[tokio::test]
    async fn insert_get_remove() {
        let store = store(4);
        let id = store
            .insert("plan.dxf", FileOrigin::Upload, Bytes::from_static(b"0\nEOF\n"))
            .await;

        let file = store.get(&id).await.unwrap();
        assert_eq!(file.name, "plan.dxf");
        assert_eq!(file.origin, FileOrigin::Upload);
        assert_eq!(&file.bytes[..], b"0\nEOF\n");

        assert!(store.remove(&id).await);
        assert!(!store.remove(&id).await);
        assert!(store.get(&id).await.is_none());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn evicts_oldest_when_full() {
        let store = store(2);
        let now = Utc::now();
        let first = store
            .insert_at("a".into(), FileOrigin::Upload, Bytes::new(), now - chrono::Duration::seconds(3))
            .await;
        let second = store
            .insert_at("b".into(), FileOrigin::Upload, Bytes::new(), now - chrono::Duration::seconds(2))
            .await;
        let third = store.insert("c", FileOrigin::Filtered, Bytes::new()).await;

        assert_eq!(store.len().await, 2);
        assert!(store.get(&first).await.is_none());
        assert!(store.get(&second).await.is_some());
        assert!(store.get(&third).await.is_some());
    }

    #[tokio::test]
    async fn expired_files_are_purged() {
        let store = store(8);
        let stale = store
            .insert_at(
                "old".into(),
                FileOrigin::Remote,
                Bytes::new(),
                Utc::now() - chrono::Duration::seconds(120),
            )
            .await;
        assert!(store.get(&stale).await.is_none());
        assert_eq!(store.len().await, 1);

        store.insert("new", FileOrigin::Upload, Bytes::new()).await;
        assert_eq!(store.len().await, 1);
    }
}

//! Soul memory: the default `MemoryStore` over Sled with a per-user hot cache.
//!
//! Records are append-only. Keys are `hex(user_id):nanos:uuid`; the hex
//! encoding keeps the user segment free of the `:` separator, so a prefix
//! scan for one user can never pick up another user's records even when one
//! id is a prefix of the other. Relevance scoring is a keyword overlap
//! against the query, newest-first on ties.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use sled::Db;
use uuid::Uuid;

use crate::collaborators::MemoryStore;
use crate::error::OracleError;
use crate::shared::MemoryRecord;

pub struct SoulMemoryStore {
    db: Db,
    /// Hot cache: full record list per user, invalidated on append.
    cache: Arc<DashMap<String, Vec<MemoryRecord>>>,
}

impl SoulMemoryStore {
    pub fn open_path<P: AsRef<Path>>(path: P) -> Result<Self, OracleError> {
        let db = sled::open(path).map_err(OracleError::upstream)?;
        Ok(Self {
            db,
            cache: Arc::new(DashMap::new()),
        })
    }

    fn record_key(record: &MemoryRecord) -> String {
        format!(
            "{}:{}:{}",
            hex_segment(&record.user_id),
            record.timestamp.timestamp_nanos_opt().unwrap_or_default(),
            Uuid::new_v4()
        )
    }

    /// Full history for a user, cache-first then prefix scan.
    fn load_user(&self, user_id: &str) -> Result<Vec<MemoryRecord>, OracleError> {
        if let Some(records) = self.cache.get(user_id) {
            return Ok(records.clone());
        }
        let prefix = format!("{}:", hex_segment(user_id));
        let mut records = Vec::new();
        for entry in self.db.scan_prefix(prefix.as_bytes()) {
            let (_, value) = entry.map_err(OracleError::upstream)?;
            let record: MemoryRecord =
                serde_json::from_slice(&value).map_err(OracleError::upstream)?;
            records.push(record);
        }
        self.cache.insert(user_id.to_string(), records.clone());
        Ok(records)
    }
}

/// Separator-free key segment for a user id. Injective, so distinct ids can
/// never share a key prefix.
fn hex_segment(user_id: &str) -> String {
    user_id.as_bytes().iter().map(|b| format!("{b:02x}")).collect()
}

/// Count of query words appearing in the record content, case-insensitive.
fn overlap_score(query: &str, content: &str) -> usize {
    let content = content.to_lowercase();
    query
        .to_lowercase()
        .split_whitespace()
        .filter(|w| w.len() > 2 && content.contains(*w))
        .count()
}

#[async_trait]
impl MemoryStore for SoulMemoryStore {
    async fn fetch_relevant(
        &self,
        user_id: &str,
        query: &str,
        k: usize,
    ) -> Result<Vec<MemoryRecord>, OracleError> {
        let mut records = self.load_user(user_id)?;
        records.sort_by(|a, b| {
            let sa = overlap_score(query, &a.content);
            let sb = overlap_score(query, &b.content);
            sb.cmp(&sa).then(b.timestamp.cmp(&a.timestamp))
        });
        records.truncate(k);
        Ok(records)
    }

    async fn append(&self, record: MemoryRecord) -> Result<(), OracleError> {
        let key = Self::record_key(&record);
        let value = serde_json::to_vec(&record).map_err(OracleError::upstream)?;
        self.db
            .insert(key.as_bytes(), value)
            .map_err(OracleError::upstream)?;
        self.cache.remove(&record.user_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn record(user: &str, content: &str, age_mins: i64) -> MemoryRecord {
        MemoryRecord {
            user_id: user.to_string(),
            content: content.to_string(),
            element: None,
            source_agent: None,
            confidence: None,
            metadata: serde_json::Map::new(),
            timestamp: Utc::now() - Duration::minutes(age_mins),
        }
    }

    #[tokio::test]
    async fn append_then_fetch_scoped_to_user() {
        let dir = tempfile::tempdir().unwrap();
        let store = SoulMemoryStore::open_path(dir.path()).unwrap();
        store.append(record("u1", "a dream of fire", 5)).await.unwrap();
        store.append(record("u2", "someone else's dream", 1)).await.unwrap();

        let got = store.fetch_relevant("u1", "dream", 5).await.unwrap();
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].user_id, "u1");
    }

    #[tokio::test]
    async fn fetch_ranks_by_overlap_then_recency() {
        let dir = tempfile::tempdir().unwrap();
        let store = SoulMemoryStore::open_path(dir.path()).unwrap();
        store
            .append(record("u1", "planted seeds in the garden", 60))
            .await
            .unwrap();
        store
            .append(record("u1", "the dream about water and the garden", 30))
            .await
            .unwrap();
        store.append(record("u1", "a grocery list", 1)).await.unwrap();

        let got = store.fetch_relevant("u1", "garden dream", 2).await.unwrap();
        assert_eq!(got.len(), 2);
        assert!(got[0].content.contains("dream about water"));
        assert!(got[1].content.contains("planted seeds"));
    }

    #[tokio::test]
    async fn fetch_truncates_to_k() {
        let dir = tempfile::tempdir().unwrap();
        let store = SoulMemoryStore::open_path(dir.path()).unwrap();
        for i in 0..8 {
            store
                .append(record("u1", &format!("note {i}"), i))
                .await
                .unwrap();
        }
        let got = store.fetch_relevant("u1", "note", 5).await.unwrap();
        assert_eq!(got.len(), 5);
    }

    #[tokio::test]
    async fn prefix_shaped_user_ids_stay_isolated() {
        let dir = tempfile::tempdir().unwrap();
        let store = SoulMemoryStore::open_path(dir.path()).unwrap();
        store.append(record("a:b", "private note", 1)).await.unwrap();
        store.append(record("a", "my own note", 1)).await.unwrap();

        let got = store.fetch_relevant("a", "private note", 5).await.unwrap();
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].user_id, "a");

        let got = store.fetch_relevant("a:b", "private note", 5).await.unwrap();
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].user_id, "a:b");
    }

    #[tokio::test]
    async fn empty_history_returns_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = SoulMemoryStore::open_path(dir.path()).unwrap();
        let got = store.fetch_relevant("nobody", "anything", 5).await.unwrap();
        assert!(got.is_empty());
    }
}

//! Key registry - the persisted set of member API keys.
//!
//! The whole set is stored as one JSON array under the `users` slot. Every
//! mutation is a full read-modify-write of that value; there is no per-key
//! locking.
//!
//! # Concurrency
//!
//! Two mutations racing on the same store can lose one update. The service
//! loop handles requests one at a time, and one process is expected per
//! database file.

use crate::db::{self, DbPool};
use crate::error::AppError;
use crate::models::api_key::{KeySet, fingerprint};

/// Storage slot that holds the encoded key set.
pub const KEY_SET_SLOT: &str = "users";

/// Owns every read and write of the key set.
#[derive(Debug, Clone)]
pub struct KeyRegistry {
    pool: DbPool,
}

impl KeyRegistry {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Current key set.
    ///
    /// Never fails: an unreadable slot or an undecodable value both yield the
    /// empty set so authentication keeps working.
    pub async fn list(&self) -> KeySet {
        self.load().await.unwrap_or_else(|e| {
            tracing::warn!("Unable to read key set: {}", e);
            KeySet::default()
        })
    }

    pub async fn contains(&self, key: &str) -> bool {
        self.list().await.contains(key)
    }

    /// Like `contains`, but a failed read is an error instead of a miss.
    pub async fn try_contains(&self, key: &str) -> Result<bool, AppError> {
        Ok(self.load().await?.contains(key))
    }

    /// Append `key` and write the set back.
    ///
    /// Does not check for duplicates; callers test `contains` first.
    pub async fn add(&self, key: &str) -> Result<(), AppError> {
        let mut keys = self.load().await?;
        keys.push(key);
        self.store(&keys).await?;

        tracing::info!(key = %fingerprint(key), total = keys.len(), "API key added");
        Ok(())
    }

    /// Rewrite the set without any occurrence of `key`.
    ///
    /// Removing a key that is not present still rewrites the set and succeeds.
    pub async fn remove(&self, key: &str) -> Result<(), AppError> {
        let mut keys = self.load().await?;
        keys.remove(key);
        self.store(&keys).await?;

        tracing::info!(key = %fingerprint(key), total = keys.len(), "API key removed");
        Ok(())
    }

    /// Read the stored set. Storage errors propagate; a value that does not
    /// decode is the empty set.
    async fn load(&self) -> Result<KeySet, AppError> {
        let Some(raw) = db::get_value(&self.pool, KEY_SET_SLOT).await? else {
            return Ok(KeySet::default());
        };

        let keys = KeySet::decode(&raw);
        if keys.is_empty() && raw.trim() != "[]" {
            tracing::warn!("Stored key set is not a JSON string array, treating as empty");
        }
        Ok(keys)
    }

    async fn store(&self, keys: &KeySet) -> Result<(), AppError> {
        let value = keys.encode().map_err(AppError::Serialization)?;

        db::set_value(&self.pool, KEY_SET_SLOT, &value)
            .await
            .inspect_err(|e| tracing::error!("Unable to write key set: {}", e))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn registry() -> KeyRegistry {
        let pool = db::create_pool(db::IN_MEMORY).await.unwrap();
        db::run_migrations(&pool).await.unwrap();
        KeyRegistry::new(pool)
    }

    #[tokio::test]
    async fn empty_store_lists_nothing() {
        let registry = registry().await;

        assert!(registry.list().await.is_empty());
        assert!(!registry.contains("anything").await);
    }

    #[tokio::test]
    async fn add_then_contains() {
        let registry = registry().await;

        registry.add("abc123").await.unwrap();

        assert!(registry.contains("abc123").await);
        assert_eq!(registry.list().await.len(), 1);
    }

    #[tokio::test]
    async fn add_preserves_insertion_order() {
        let registry = registry().await;

        for key in ["zeta", "alpha", "mid"] {
            registry.add(key).await.unwrap();
        }

        assert_eq!(registry.list().await.into_vec(), vec!["zeta", "alpha", "mid"]);
    }

    #[tokio::test]
    async fn remove_then_not_contains() {
        let registry = registry().await;
        registry.add("abc123").await.unwrap();
        registry.add("other").await.unwrap();

        registry.remove("abc123").await.unwrap();

        assert!(!registry.contains("abc123").await);
        assert_eq!(registry.list().await.into_vec(), vec!["other"]);
    }

    #[tokio::test]
    async fn removing_missing_key_is_a_no_op() {
        let registry = registry().await;
        registry.add("kept").await.unwrap();

        registry.remove("missing").await.unwrap();

        assert_eq!(registry.list().await.into_vec(), vec!["kept"]);
    }

    #[tokio::test]
    async fn corrupt_value_degrades_to_empty_set() {
        let registry = registry().await;
        db::set_value(&registry.pool, KEY_SET_SLOT, "{not json").await.unwrap();

        assert!(registry.list().await.is_empty());

        registry.add("fresh").await.unwrap();
        assert_eq!(registry.list().await.into_vec(), vec!["fresh"]);
    }

    /// Store a value the driver cannot read back as text.
    async fn store_unreadable_slot(registry: &KeyRegistry) {
        sqlx::query("INSERT INTO kv_store (key, value) VALUES (?, X'5B2261225D')")
            .bind(KEY_SET_SLOT)
            .execute(&registry.pool)
            .await
            .unwrap();
    }

    async fn raw_slot(registry: &KeyRegistry) -> Vec<u8> {
        sqlx::query_scalar::<_, Vec<u8>>("SELECT value FROM kv_store WHERE key = ?")
            .bind(KEY_SET_SLOT)
            .fetch_one(&registry.pool)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn unreadable_slot_blocks_mutations() {
        let registry = registry().await;
        store_unreadable_slot(&registry).await;

        assert!(matches!(registry.add("b").await, Err(AppError::Database(_))));
        assert!(matches!(registry.remove("a").await, Err(AppError::Database(_))));
        assert!(matches!(registry.try_contains("a").await, Err(AppError::Database(_))));

        assert_eq!(raw_slot(&registry).await, br#"["a"]"#.to_vec());
    }

    #[tokio::test]
    async fn unreadable_slot_reads_as_empty_for_lookups() {
        let registry = registry().await;
        store_unreadable_slot(&registry).await;

        assert!(registry.list().await.is_empty());
        assert!(!registry.contains("a").await);
    }

    #[tokio::test]
    async fn write_failure_is_reported() {
        let registry = registry().await;
        registry.pool.close().await;

        assert!(matches!(registry.add("abc").await, Err(AppError::Database(_))));
        assert!(matches!(registry.remove("abc").await, Err(AppError::Database(_))));
        assert!(registry.list().await.is_empty());
    }
}

use moka::future::Cache;
use std::time::Duration;

/// Live refresh tokens keyed by `jti`, valued by user id.
///
/// Entries expire with the token TTL; rotation and logout remove them early.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Cache<String, String>,
}

impl SessionStore {
    pub fn new(refresh_ttl_secs: u64) -> Self {
        Self {
            sessions: Cache::builder()
                .max_capacity(500_000) // tune based on memory
                .time_to_live(Duration::from_secs(refresh_ttl_secs))
                .build(),
        }
    }

    pub async fn open(&self, jti: &str, user_id: &str) {
        self.sessions.insert(jti.to_string(), user_id.to_string()).await;
    }

    /// Removes the session and returns its owner; `None` if unknown or already used.
    pub async fn consume(&self, jti: &str) -> Option<String> {
        self.sessions.remove(jti).await
    }

    pub async fn revoke(&self, jti: &str) {
        self.sessions.invalidate(jti).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[actix_web::test]
    async fn sessions_are_single_use() {
        let store = SessionStore::new(60);
        store.open("jti-1", "u1").await;

        assert_eq!(store.consume("jti-1").await.as_deref(), Some("u1"));
        assert_eq!(store.consume("jti-1").await, None);
    }

    #[actix_web::test]
    async fn revoked_sessions_cannot_be_consumed() {
        let store = SessionStore::new(60);
        store.open("jti-2", "u1").await;
        store.revoke("jti-2").await;

        assert_eq!(store.consume("jti-2").await, None);
    }
}

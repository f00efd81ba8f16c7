use crate::types::{AgentConversation, Complexity, Exercise, Methodology, Result};
use async_trait::async_trait;

/// Storage contract consumed by the agents and the dispatcher.
///
/// Methodologies and exercises are read-mostly reference data; the
/// conversation log is append-only and best-effort (callers decide whether
/// an append failure matters — for request-path logging it never does).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Store: Send + Sync {
    /// Fetch a methodology by id. `Ok(None)` when the id is unknown.
    async fn get_methodology(&self, id: &str) -> Result<Option<Methodology>>;

    /// All methodologies, ordered by name. Backs the selection list the
    /// athlete picks a `methodology_id` from.
    async fn list_methodologies(&self) -> Result<Vec<Methodology>>;

    /// List exercises whose complexity is in the allowed set.
    /// Equipment filtering happens in the programmer agent, which knows the
    /// athlete's access tier.
    async fn list_exercises(&self, allowed_complexity: &[Complexity]) -> Result<Vec<Exercise>>;

    /// Append a conversation record.
    async fn append_conversation(&self, record: &AgentConversation) -> Result<()>;

    /// Conversation history for one user, newest first.
    async fn conversations_for_user(
        &self,
        user_id: &str,
        limit: u32,
    ) -> Result<Vec<AgentConversation>>;
}

/// Store provider configuration.
#[derive(Debug, Clone, Default)]
pub enum StoreProvider {
    /// In-memory database (ephemeral, lost on restart).
    #[default]
    Memory,
    /// File-based local database.
    Local {
        /// Path to the database file.
        path: String,
    },
}

impl StoreProvider {
    /// Resolve the provider from an optional database path. Empty and
    /// missing paths both mean the in-memory store.
    pub fn from_path(path: Option<&str>) -> Self {
        match path {
            Some(p) if !p.is_empty() => StoreProvider::Local {
                path: p.to_string(),
            },
            _ => StoreProvider::Memory,
        }
    }

    /// Open the store this provider describes. Returns the concrete store so
    /// the caller can seed reference data before erasing the type.
    pub async fn create_store(&self) -> Result<super::libsql::LibsqlStore> {
        match self {
            StoreProvider::Memory => super::libsql::LibsqlStore::new_memory().await,
            StoreProvider::Local { path } => super::libsql::LibsqlStore::new_local(path).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_resolution_from_path() {
        assert!(matches!(StoreProvider::from_path(None), StoreProvider::Memory));
        assert!(matches!(StoreProvider::from_path(Some("")), StoreProvider::Memory));
        assert!(matches!(
            StoreProvider::from_path(Some("ironpath.db")),
            StoreProvider::Local { path } if path == "ironpath.db"
        ));
    }

    #[tokio::test]
    async fn memory_provider_opens_a_usable_store() {
        let store = StoreProvider::Memory.create_store().await.unwrap();
        assert!(store.needs_seeding().await.unwrap());
    }
}

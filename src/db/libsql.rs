use crate::types::{AgentConversation, AppError, Complexity, Exercise, Methodology, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use libsql::{Builder, Connection, Database};

/// libsql-backed store. Structured columns (equipment lists, programming
/// rules, classifications) are stored as JSON text.
pub struct LibsqlStore {
    db: Database,
}

impl LibsqlStore {
    /// In-memory database, used for tests and default local development.
    pub async fn new_memory() -> Result<Self> {
        let db = Builder::new_local(":memory:")
            .build()
            .await
            .map_err(|e| AppError::Database(format!("Failed to open in-memory db: {}", e)))?;

        let store = Self { db };
        store.initialize_schema().await?;
        Ok(store)
    }

    /// File-based local database.
    pub async fn new_local(path: &str) -> Result<Self> {
        let db = Builder::new_local(path)
            .build()
            .await
            .map_err(|e| AppError::Database(format!("Failed to open local db: {}", e)))?;

        let store = Self { db };
        store.initialize_schema().await?;
        Ok(store)
    }

    pub fn connection(&self) -> Result<Connection> {
        self.db
            .connect()
            .map_err(|e| AppError::Database(format!("Failed to get connection: {}", e)))
    }

    async fn initialize_schema(&self) -> Result<()> {
        let conn = self.connection()?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS methodologies (
                id TEXT PRIMARY KEY,
                name TEXT UNIQUE NOT NULL,
                description TEXT NOT NULL,
                category TEXT NOT NULL,
                prompt_template TEXT NOT NULL,
                programming_rules TEXT NOT NULL,
                knowledge_base TEXT NOT NULL
            )",
            (),
        )
        .await
        .map_err(|e| AppError::Database(format!("Failed to create methodologies table: {}", e)))?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS exercises (
                id TEXT PRIMARY KEY,
                name TEXT UNIQUE NOT NULL,
                category TEXT NOT NULL,
                variation_type TEXT NOT NULL,
                equipment TEXT NOT NULL,
                targets_weak_points TEXT NOT NULL,
                movement_pattern TEXT NOT NULL,
                complexity TEXT NOT NULL
            )",
            (),
        )
        .await
        .map_err(|e| AppError::Database(format!("Failed to create exercises table: {}", e)))?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS agent_conversations (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                agent_type TEXT NOT NULL,
                user_message TEXT NOT NULL,
                intent_classification TEXT,
                agent_response TEXT NOT NULL,
                context TEXT NOT NULL,
                created_at INTEGER NOT NULL
            )",
            (),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to create agent_conversations table: {}", e))
        })?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_conversations_user
             ON agent_conversations(user_id, created_at DESC)",
            (),
        )
        .await
        .map_err(|e| AppError::Database(format!("Failed to create conversation index: {}", e)))?;

        Ok(())
    }

    /// True when the methodology table is empty (fresh database).
    pub async fn needs_seeding(&self) -> Result<bool> {
        let conn = self.connection()?;
        let mut rows = conn
            .query("SELECT COUNT(*) FROM methodologies", ())
            .await
            .map_err(|e| AppError::Database(format!("Failed to count methodologies: {}", e)))?;

        let count: i64 = match rows
            .next()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
        {
            Some(row) => row.get(0).map_err(|e| AppError::Database(e.to_string()))?,
            None => 0,
        };
        Ok(count == 0)
    }

    pub async fn insert_methodology(&self, m: &Methodology) -> Result<()> {
        let conn = self.connection()?;
        conn.execute(
            "INSERT OR REPLACE INTO methodologies
             (id, name, description, category, prompt_template, programming_rules, knowledge_base)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
            (
                m.id.as_str(),
                m.name.as_str(),
                m.description.as_str(),
                m.category.as_str(),
                m.prompt_template.as_str(),
                m.programming_rules.to_string(),
                m.knowledge_base.to_string(),
            ),
        )
        .await
        .map_err(|e| AppError::Database(format!("Failed to insert methodology: {}", e)))?;
        Ok(())
    }

    pub async fn insert_exercise(&self, e: &Exercise) -> Result<()> {
        let conn = self.connection()?;
        let equipment = serde_json::to_string(&e.equipment)
            .map_err(|err| AppError::Database(err.to_string()))?;
        let weak_points = serde_json::to_string(&e.targets_weak_points)
            .map_err(|err| AppError::Database(err.to_string()))?;

        conn.execute(
            "INSERT OR REPLACE INTO exercises
             (id, name, category, variation_type, equipment, targets_weak_points,
              movement_pattern, complexity)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            (
                e.id.as_str(),
                e.name.as_str(),
                e.category.as_str(),
                e.variation_type.as_str(),
                equipment,
                weak_points,
                e.movement_pattern.as_str(),
                e.complexity.as_str(),
            ),
        )
        .await
        .map_err(|err| AppError::Database(format!("Failed to insert exercise: {}", err)))?;
        Ok(())
    }

    fn parse_complexity(raw: &str) -> Result<Complexity> {
        match raw {
            "beginner" => Ok(Complexity::Beginner),
            "intermediate" => Ok(Complexity::Intermediate),
            "advanced" => Ok(Complexity::Advanced),
            other => Err(AppError::Database(format!(
                "Unknown complexity value '{}'",
                other
            ))),
        }
    }

    fn parse_json_column(raw: &str, column: &str) -> Result<serde_json::Value> {
        serde_json::from_str(raw)
            .map_err(|e| AppError::Database(format!("Corrupt JSON in {}: {}", column, e)))
    }
}

#[async_trait]
impl super::traits::Store for LibsqlStore {
    async fn get_methodology(&self, id: &str) -> Result<Option<Methodology>> {
        let conn = self.connection()?;
        let mut rows = conn
            .query(
                "SELECT id, name, description, category, prompt_template,
                        programming_rules, knowledge_base
                 FROM methodologies WHERE id = ?",
                [id],
            )
            .await
            .map_err(|e| AppError::Database(format!("Failed to query methodology: {}", e)))?;

        match rows
            .next()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
        {
            Some(row) => {
                let rules: String = row.get(5).map_err(|e| AppError::Database(e.to_string()))?;
                let kb: String = row.get(6).map_err(|e| AppError::Database(e.to_string()))?;
                Ok(Some(Methodology {
                    id: row.get(0).map_err(|e| AppError::Database(e.to_string()))?,
                    name: row.get(1).map_err(|e| AppError::Database(e.to_string()))?,
                    description: row.get(2).map_err(|e| AppError::Database(e.to_string()))?,
                    category: row.get(3).map_err(|e| AppError::Database(e.to_string()))?,
                    prompt_template: row.get(4).map_err(|e| AppError::Database(e.to_string()))?,
                    programming_rules: Self::parse_json_column(&rules, "programming_rules")?,
                    knowledge_base: Self::parse_json_column(&kb, "knowledge_base")?,
                }))
            }
            None => Ok(None),
        }
    }

    async fn list_methodologies(&self) -> Result<Vec<Methodology>> {
        let conn = self.connection()?;
        let mut rows = conn
            .query(
                "SELECT id, name, description, category, prompt_template,
                        programming_rules, knowledge_base
                 FROM methodologies ORDER BY name",
                (),
            )
            .await
            .map_err(|e| AppError::Database(format!("Failed to list methodologies: {}", e)))?;

        let mut methodologies = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
        {
            let rules: String = row.get(5).map_err(|e| AppError::Database(e.to_string()))?;
            let kb: String = row.get(6).map_err(|e| AppError::Database(e.to_string()))?;
            methodologies.push(Methodology {
                id: row.get(0).map_err(|e| AppError::Database(e.to_string()))?,
                name: row.get(1).map_err(|e| AppError::Database(e.to_string()))?,
                description: row.get(2).map_err(|e| AppError::Database(e.to_string()))?,
                category: row.get(3).map_err(|e| AppError::Database(e.to_string()))?,
                prompt_template: row.get(4).map_err(|e| AppError::Database(e.to_string()))?,
                programming_rules: Self::parse_json_column(&rules, "programming_rules")?,
                knowledge_base: Self::parse_json_column(&kb, "knowledge_base")?,
            });
        }

        Ok(methodologies)
    }

    async fn list_exercises(&self, allowed_complexity: &[Complexity]) -> Result<Vec<Exercise>> {
        if allowed_complexity.is_empty() {
            return Ok(Vec::new());
        }

        let conn = self.connection()?;
        let placeholders = vec!["?"; allowed_complexity.len()].join(", ");
        let sql = format!(
            "SELECT id, name, category, variation_type, equipment, targets_weak_points,
                    movement_pattern, complexity
             FROM exercises WHERE complexity IN ({}) ORDER BY name",
            placeholders
        );
        let params = libsql::params_from_iter(
            allowed_complexity
                .iter()
                .map(|c| c.as_str().to_string())
                .collect::<Vec<_>>(),
        );

        let mut rows = conn
            .query(&sql, params)
            .await
            .map_err(|e| AppError::Database(format!("Failed to query exercises: {}", e)))?;

        let mut exercises = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
        {
            let equipment: String = row.get(4).map_err(|e| AppError::Database(e.to_string()))?;
            let weak_points: String = row.get(5).map_err(|e| AppError::Database(e.to_string()))?;
            let complexity: String = row.get(7).map_err(|e| AppError::Database(e.to_string()))?;

            exercises.push(Exercise {
                id: row.get(0).map_err(|e| AppError::Database(e.to_string()))?,
                name: row.get(1).map_err(|e| AppError::Database(e.to_string()))?,
                category: row.get(2).map_err(|e| AppError::Database(e.to_string()))?,
                variation_type: row.get(3).map_err(|e| AppError::Database(e.to_string()))?,
                equipment: serde_json::from_str(&equipment)
                    .map_err(|e| AppError::Database(format!("Corrupt equipment JSON: {}", e)))?,
                targets_weak_points: serde_json::from_str(&weak_points)
                    .map_err(|e| AppError::Database(format!("Corrupt weak-point JSON: {}", e)))?,
                movement_pattern: row.get(6).map_err(|e| AppError::Database(e.to_string()))?,
                complexity: Self::parse_complexity(&complexity)?,
            });
        }

        Ok(exercises)
    }

    async fn append_conversation(&self, record: &AgentConversation) -> Result<()> {
        let conn = self.connection()?;
        let classification = record
            .intent_classification
            .as_ref()
            .map(|v| v.to_string());

        conn.execute(
            "INSERT INTO agent_conversations
             (id, user_id, agent_type, user_message, intent_classification,
              agent_response, context, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            (
                record.id.as_str(),
                record.user_id.as_str(),
                record.agent_type.as_str(),
                record.user_message.as_str(),
                classification,
                record.agent_response.as_str(),
                record.context.to_string(),
                record.created_at.timestamp(),
            ),
        )
        .await
        .map_err(|e| AppError::Database(format!("Failed to append conversation: {}", e)))?;
        Ok(())
    }

    async fn conversations_for_user(
        &self,
        user_id: &str,
        limit: u32,
    ) -> Result<Vec<AgentConversation>> {
        let conn = self.connection()?;
        let mut rows = conn
            .query(
                "SELECT id, user_id, agent_type, user_message, intent_classification,
                        agent_response, context, created_at
                 FROM agent_conversations
                 WHERE user_id = ? ORDER BY created_at DESC LIMIT ?",
                (user_id, limit as i64),
            )
            .await
            .map_err(|e| AppError::Database(format!("Failed to query conversations: {}", e)))?;

        let mut conversations = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
        {
            let classification: Option<String> =
                row.get(4).map_err(|e| AppError::Database(e.to_string()))?;
            let context: String = row.get(6).map_err(|e| AppError::Database(e.to_string()))?;
            let created_at: i64 = row.get(7).map_err(|e| AppError::Database(e.to_string()))?;

            conversations.push(AgentConversation {
                id: row.get(0).map_err(|e| AppError::Database(e.to_string()))?,
                user_id: row.get(1).map_err(|e| AppError::Database(e.to_string()))?,
                agent_type: row.get(2).map_err(|e| AppError::Database(e.to_string()))?,
                user_message: row.get(3).map_err(|e| AppError::Database(e.to_string()))?,
                intent_classification: classification
                    .map(|raw| Self::parse_json_column(&raw, "intent_classification"))
                    .transpose()?,
                agent_response: row.get(5).map_err(|e| AppError::Database(e.to_string()))?,
                context: Self::parse_json_column(&context, "context")?,
                created_at: DateTime::<Utc>::from_timestamp(created_at, 0)
                    .unwrap_or_else(Utc::now),
            });
        }

        Ok(conversations)
    }
}

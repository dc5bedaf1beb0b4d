use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use duckdb::{params, Connection};
use serde_json::{Map, Value};
use tokio::sync::Mutex;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::application::{CaseRepository, MessageRepository, MessageSubscription, ProfileRepository};
use crate::domain::{
    current_timestamp, AIAnalysis, Case, ChatMessage, DomainError, NewMessage, Role, UserProfile,
};

use super::{messages_key, SubscriptionHub};

/// Durable store for profiles, cases and messages in a single DuckDB file.
pub struct DuckdbChatStore {
    conn: Arc<Mutex<Connection>>,
    hub: Arc<SubscriptionHub>,
}

impl DuckdbChatStore {
    pub fn new(db_path: &Path) -> Result<Self, DomainError> {
        let conn = Connection::open(db_path)
            .map_err(|e| DomainError::storage(format!("Failed to open DuckDB database: {}", e)))?;
        Self::initialize_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            hub: Arc::new(SubscriptionHub::new()),
        })
    }

    pub fn in_memory() -> Result<Self, DomainError> {
        let conn = Connection::open_in_memory().map_err(|e| {
            DomainError::storage(format!("Failed to open DuckDB in-memory DB: {}", e))
        })?;
        Self::initialize_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            hub: Arc::new(SubscriptionHub::new()),
        })
    }

    /// Live listeners on a case's messages.
    pub fn listener_count(&self, uid: &str, case_id: &str) -> usize {
        self.hub.listener_count(&messages_key(uid, case_id))
    }

    /// Message collections that still hold a live channel.
    pub fn channel_count(&self) -> usize {
        self.hub.channel_count()
    }

    fn initialize_schema(conn: &Connection) -> Result<(), DomainError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS user_profiles (
                uid TEXT PRIMARY KEY,
                email TEXT NOT NULL,
                created_at BIGINT NOT NULL,
                fields TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS cases (
                user_id TEXT NOT NULL,
                id TEXT NOT NULL,
                started_by TEXT NOT NULL,
                created_at BIGINT NOT NULL,
                analysis TEXT,
                analysis_updated_at BIGINT,
                PRIMARY KEY (user_id, id)
            );
            CREATE TABLE IF NOT EXISTS messages (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                case_id TEXT NOT NULL,
                role TEXT NOT NULL,
                text TEXT NOT NULL,
                created_at BIGINT NOT NULL,
                sequence BIGINT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_messages_case ON messages(user_id, case_id);
            "#,
        )
        .map_err(|e| DomainError::storage(format!("Failed to initialize schema: {}", e)))?;

        debug!("DuckDB chat schema initialized");
        Ok(())
    }

    fn serialize_analysis(analysis: Option<&AIAnalysis>) -> Result<Option<String>, DomainError> {
        analysis
            .map(serde_json::to_string)
            .transpose()
            .map_err(DomainError::from)
    }

    /// A column that fails to decode reads as no analysis.
    fn deserialize_analysis(json: Option<String>) -> Option<AIAnalysis> {
        let json = json?;
        match serde_json::from_str(&json) {
            Ok(analysis) => Some(analysis),
            Err(e) => {
                warn!("Ignoring undecodable case analysis: {}", e);
                None
            }
        }
    }

    fn case_exists(conn: &Connection, uid: &str, case_id: &str) -> Result<bool, DomainError> {
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM cases WHERE user_id = ?1 AND id = ?2",
                params![uid, case_id],
                |row| row.get(0),
            )
            .map_err(|e| DomainError::storage(format!("Failed to check case: {}", e)))?;
        Ok(count > 0)
    }

    fn query_messages(
        conn: &Connection,
        uid: &str,
        case_id: &str,
    ) -> Result<Vec<ChatMessage>, DomainError> {
        let mut stmt = conn
            .prepare(
                "SELECT id, role, text, created_at, sequence FROM messages \
                 WHERE user_id = ?1 AND case_id = ?2 ORDER BY created_at ASC, sequence ASC",
            )
            .map_err(|e| DomainError::storage(format!("Failed to prepare statement: {}", e)))?;

        let rows = stmt
            .query_map(params![uid, case_id], |row| {
                let role: String = row.get(1)?;
                Ok(ChatMessage::reconstitute(
                    row.get(0)?,
                    Role::from_str(&role),
                    row.get(2)?,
                    row.get(3)?,
                    row.get::<_, i64>(4)? as u64,
                ))
            })
            .map_err(|e| DomainError::storage(format!("Failed to query messages: {}", e)))?;

        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|e| DomainError::storage(format!("Failed to read message row: {}", e)))
    }
}

#[async_trait]
impl ProfileRepository for DuckdbChatStore {
    async fn find_profile(&self, uid: &str) -> Result<Option<UserProfile>, DomainError> {
        let conn = self.conn.lock().await;
        let mut stmt = conn
            .prepare("SELECT email, created_at, fields FROM user_profiles WHERE uid = ?1")
            .map_err(|e| DomainError::storage(format!("Failed to prepare statement: {}", e)))?;

        match stmt.query_row(params![uid], |row| {
            let fields_json: String = row.get(2)?;
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?, fields_json))
        }) {
            Ok((email, created_at, fields_json)) => {
                let fields: Map<String, Value> = serde_json::from_str(&fields_json)?;
                Ok(Some(UserProfile::reconstitute(email, created_at, fields)))
            }
            Err(duckdb::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(DomainError::storage(format!(
                "Failed to query profile: {}",
                e
            ))),
        }
    }

    async fn save_profile(&self, uid: &str, profile: &UserProfile) -> Result<(), DomainError> {
        let fields_json = serde_json::to_string(profile.fields())?;
        let conn = self.conn.lock().await;

        conn.execute(
            r#"
            INSERT INTO user_profiles (uid, email, created_at, fields)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT (uid) DO UPDATE SET
                email = excluded.email,
                created_at = excluded.created_at,
                fields = excluded.fields
            "#,
            params![uid, profile.email(), profile.created_at(), fields_json],
        )
        .map_err(|e| DomainError::storage(format!("Failed to save profile: {}", e)))?;

        Ok(())
    }
}

#[async_trait]
impl CaseRepository for DuckdbChatStore {
    async fn create_case(&self, case: &Case) -> Result<(), DomainError> {
        let analysis_json = Self::serialize_analysis(case.analysis())?;
        let conn = self.conn.lock().await;

        conn.execute(
            r#"
            INSERT INTO cases (user_id, id, started_by, created_at, analysis, analysis_updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                case.user_id(),
                case.id(),
                case.started_by(),
                case.created_at(),
                analysis_json,
                case.analysis_updated_at(),
            ],
        )
        .map_err(|e| DomainError::storage(format!("Failed to create case: {}", e)))?;

        debug!(case_id = case.id(), "Saved case to DuckDB");
        Ok(())
    }

    async fn find_case(&self, uid: &str, case_id: &str) -> Result<Option<Case>, DomainError> {
        let conn = self.conn.lock().await;
        let mut stmt = conn
            .prepare(
                "SELECT id, user_id, started_by, created_at, analysis, analysis_updated_at \
                 FROM cases WHERE user_id = ?1 AND id = ?2",
            )
            .map_err(|e| DomainError::storage(format!("Failed to prepare statement: {}", e)))?;

        match stmt.query_row(params![uid, case_id], |row| {
            let analysis_json: Option<String> = row.get(4)?;
            Ok(Case::reconstitute(
                row.get(0)?,
                row.get(1)?,
                row.get(2)?,
                row.get(3)?,
                Self::deserialize_analysis(analysis_json),
                row.get(5)?,
            ))
        }) {
            Ok(case) => Ok(Some(case)),
            Err(duckdb::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(DomainError::storage(format!("Failed to query case: {}", e))),
        }
    }

    async fn list_cases(&self, uid: &str) -> Result<Vec<Case>, DomainError> {
        let conn = self.conn.lock().await;
        let mut stmt = conn
            .prepare(
                "SELECT id, user_id, started_by, created_at, analysis, analysis_updated_at \
                 FROM cases WHERE user_id = ?1 ORDER BY created_at DESC, id DESC",
            )
            .map_err(|e| DomainError::storage(format!("Failed to prepare statement: {}", e)))?;

        let rows = stmt
            .query_map(params![uid], |row| {
                let analysis_json: Option<String> = row.get(4)?;
                Ok(Case::reconstitute(
                    row.get(0)?,
                    row.get(1)?,
                    row.get(2)?,
                    row.get(3)?,
                    Self::deserialize_analysis(analysis_json),
                    row.get(5)?,
                ))
            })
            .map_err(|e| DomainError::storage(format!("Failed to query cases: {}", e)))?;

        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|e| DomainError::storage(format!("Failed to read case row: {}", e)))
    }

    async fn merge_analysis(
        &self,
        uid: &str,
        case_id: &str,
        analysis: &AIAnalysis,
    ) -> Result<(), DomainError> {
        let analysis_json = serde_json::to_string(analysis)?;
        let conn = self.conn.lock().await;

        let updated = conn
            .execute(
                "UPDATE cases SET analysis = ?1, analysis_updated_at = ?2 \
                 WHERE user_id = ?3 AND id = ?4",
                params![analysis_json, current_timestamp(), uid, case_id],
            )
            .map_err(|e| DomainError::storage(format!("Failed to merge analysis: {}", e)))?;

        if updated == 0 {
            return Err(DomainError::not_found(format!("Case not found: {}", case_id)));
        }
        Ok(())
    }
}

#[async_trait]
impl MessageRepository for DuckdbChatStore {
    async fn append_message(
        &self,
        uid: &str,
        case_id: &str,
        message: NewMessage,
    ) -> Result<ChatMessage, DomainError> {
        let conn = self.conn.lock().await;
        if !Self::case_exists(&conn, uid, case_id)? {
            return Err(DomainError::not_found(format!("Case not found: {}", case_id)));
        }

        let (last_created, last_sequence): (i64, i64) = conn
            .query_row(
                "SELECT COALESCE(MAX(created_at), 0), COALESCE(MAX(sequence), 0) \
                 FROM messages WHERE user_id = ?1 AND case_id = ?2",
                params![uid, case_id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .map_err(|e| DomainError::storage(format!("Failed to read message order: {}", e)))?;

        let stored = ChatMessage::reconstitute(
            Uuid::new_v4().to_string(),
            message.role,
            message.text,
            current_timestamp().max(last_created),
            last_sequence as u64 + 1,
        );

        conn.execute(
            r#"
            INSERT INTO messages (id, user_id, case_id, role, text, created_at, sequence)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                stored.id(),
                uid,
                case_id,
                stored.role().as_str(),
                stored.text(),
                stored.created_at(),
                stored.sequence() as i64,
            ],
        )
        .map_err(|e| DomainError::storage(format!("Failed to append message: {}", e)))?;

        let collection = messages_key(uid, case_id);
        if self.hub.has_listeners(&collection) {
            let snapshot = Self::query_messages(&conn, uid, case_id)?;
            self.hub.publish(&collection, snapshot);
        }

        Ok(stored)
    }

    async fn list_messages(
        &self,
        uid: &str,
        case_id: &str,
    ) -> Result<Vec<ChatMessage>, DomainError> {
        let conn = self.conn.lock().await;
        Self::query_messages(&conn, uid, case_id)
    }

    async fn subscribe(
        &self,
        uid: &str,
        case_id: &str,
    ) -> Result<MessageSubscription, DomainError> {
        let conn = self.conn.lock().await;
        let current = Self::query_messages(&conn, uid, case_id)?;
        Ok(self.hub.subscribe(&messages_key(uid, case_id), current))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Identity;

    #[tokio::test]
    async fn corrupt_analysis_column_reads_as_missing() {
        let store = DuckdbChatStore::in_memory().unwrap();
        let case = Case::start(&Identity::new("u1", None));
        store.create_case(&case).await.unwrap();

        store
            .conn
            .lock()
            .await
            .execute(
                "UPDATE cases SET analysis = '{broken' WHERE id = ?1",
                params![case.id()],
            )
            .unwrap();

        let found = store.find_case("u1", case.id()).await.unwrap().unwrap();
        assert!(found.analysis().is_none());
        assert_eq!(store.list_cases("u1").await.unwrap().len(), 1);
    }
}

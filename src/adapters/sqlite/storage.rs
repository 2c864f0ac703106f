//! `SqliteStorage`: relational `Storage` implementation over the four
//! required tables (`trajectories`, `experiences`, `follow_ups`,
//! `vector_snapshots`), plus `pending_questions` and `conversation_logs`.
//!
//! Grounded on the teacher's `adapters::sqlite` module: runtime-checked
//! `sqlx::query`/`query_as` (no `query!` compile-time macros, since this
//! workspace has no `DATABASE_URL` to check against at build time), one
//! connection pool, explicit transactions around multi-table writes.

use chrono::Timelike;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{
    Experience, FollowUp, FollowUpSource, HorizonAssessment, IntentionSignal, PendingQuestion,
    QualityDimensions, TimeHorizon, Trajectory, VectorSnapshot,
};
use crate::domain::ports::{ConversationRow, Storage};

use super::migrations::Migrator;

pub struct SqliteStorage {
    pool: SqlitePool,
}

impl SqliteStorage {
    pub async fn new(pool: SqlitePool) -> DomainResult<Self> {
        Migrator::new(&pool)
            .run()
            .await
            .map_err(|err| DomainError::StorageError(format!("migration failed: {err}")))?;
        Ok(Self { pool })
    }

    fn map_err(err: sqlx::Error) -> DomainError {
        DomainError::StorageError(err.to_string())
    }
}

#[async_trait::async_trait]
impl Storage for SqliteStorage {
    async fn load_trajectory(&self, user_id: &str) -> DomainResult<Trajectory> {
        let trajectory_row = sqlx::query(
            "SELECT creation_rate, propagation_rate, compounding_direction, current_direction, \
             current_magnitude, current_confidence, current_horizon FROM trajectories WHERE user_id = ?",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Self::map_err)?;

        let Some(row) = trajectory_row else {
            return Ok(Trajectory::new(user_id));
        };

        let mut trajectory = Trajectory::new(user_id);
        trajectory.creation_rate = row.try_get("creation_rate").map_err(Self::map_err)?;
        trajectory.propagation_rate = row.try_get("propagation_rate").map_err(Self::map_err)?;
        trajectory.compounding_direction = row.try_get("compounding_direction").map_err(Self::map_err)?;
        trajectory.current_vector = VectorSnapshot::new(
            row.try_get("current_direction").map_err(Self::map_err)?,
            row.try_get("current_magnitude").map_err(Self::map_err)?,
            row.try_get("current_confidence").map_err(Self::map_err)?,
            parse_horizon(&row.try_get::<String, _>("current_horizon").map_err(Self::map_err)?),
        );

        let snapshot_rows = sqlx::query(
            "SELECT timestamp, direction, magnitude, confidence, horizon FROM vector_snapshots \
             WHERE user_id = ? AND experience_id IS NULL ORDER BY id ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Self::map_err)?;
        for row in snapshot_rows {
            trajectory.vector_history.push(row_to_snapshot(&row)?);
        }

        let experience_rows = sqlx::query(
            "SELECT id, description, context, rating, created_at, provisional_intention, intention_confidence, \
             resonance_score, quality_score, quality_dimensions_json, horizon_assessments_json, propagated, \
             propagation_events_json, matrix_position FROM experiences WHERE user_id = ? ORDER BY created_at ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Self::map_err)?;

        for row in experience_rows {
            let experience = self.hydrate_experience(row, user_id).await?;
            trajectory.experiences.push(experience);
        }

        Ok(trajectory)
    }

    async fn save_trajectory(&self, trajectory: &Trajectory) -> DomainResult<()> {
        let mut tx = self.pool.begin().await.map_err(Self::map_err)?;

        sqlx::query(
            "INSERT INTO trajectories (user_id, creation_rate, propagation_rate, compounding_direction, \
             current_direction, current_magnitude, current_confidence, current_horizon) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?) \
             ON CONFLICT(user_id) DO UPDATE SET creation_rate = excluded.creation_rate, \
             propagation_rate = excluded.propagation_rate, compounding_direction = excluded.compounding_direction, \
             current_direction = excluded.current_direction, current_magnitude = excluded.current_magnitude, \
             current_confidence = excluded.current_confidence, current_horizon = excluded.current_horizon",
        )
        .bind(&trajectory.user_id)
        .bind(trajectory.creation_rate)
        .bind(trajectory.propagation_rate)
        .bind(trajectory.compounding_direction)
        .bind(trajectory.current_vector.direction)
        .bind(trajectory.current_vector.magnitude)
        .bind(trajectory.current_vector.confidence)
        .bind(trajectory.current_vector.horizon.as_str())
        .execute(&mut *tx)
        .await
        .map_err(Self::map_err)?;

        sqlx::query("DELETE FROM vector_snapshots WHERE user_id = ? AND experience_id IS NULL")
            .bind(&trajectory.user_id)
            .execute(&mut *tx)
            .await
            .map_err(Self::map_err)?;
        for snapshot in &trajectory.vector_history {
            insert_snapshot(&mut tx, &trajectory.user_id, None, snapshot).await?;
        }

        for experience in &trajectory.experiences {
            save_experience_tx(&mut tx, &trajectory.user_id, experience).await?;
        }

        tx.commit().await.map_err(Self::map_err)?;
        Ok(())
    }

    async fn list_user_ids(&self) -> DomainResult<Vec<String>> {
        let rows = sqlx::query("SELECT user_id FROM trajectories")
            .fetch_all(&self.pool)
            .await
            .map_err(Self::map_err)?;
        rows.iter().map(|r| r.try_get("user_id").map_err(Self::map_err)).collect()
    }

    async fn load_experience(&self, experience_id: Uuid) -> DomainResult<Option<Experience>> {
        let row = sqlx::query(
            "SELECT id, user_id, description, context, rating, created_at, provisional_intention, \
             intention_confidence, resonance_score, quality_score, quality_dimensions_json, \
             horizon_assessments_json, propagated, propagation_events_json, matrix_position \
             FROM experiences WHERE id = ?",
        )
        .bind(experience_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(Self::map_err)?;

        let Some(row) = row else { return Ok(None) };
        let user_id: String = row.try_get("user_id").map_err(Self::map_err)?;
        Ok(Some(self.hydrate_experience(row, &user_id).await?))
    }

    async fn save_experience(&self, user_id: &str, experience: &Experience) -> DomainResult<()> {
        let mut tx = self.pool.begin().await.map_err(Self::map_err)?;
        save_experience_tx(&mut tx, user_id, experience).await?;
        tx.commit().await.map_err(Self::map_err)?;
        Ok(())
    }

    async fn save_follow_up(&self, _user_id: &str, experience_id: Uuid, follow_up: &FollowUp) -> DomainResult<()> {
        sqlx::query(
            "INSERT INTO follow_ups (id, experience_id, timestamp, source, text, created_something, \
             shared_or_taught, inspired_further_action, creation_magnitude, creation_description) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(follow_up.id.to_string())
        .bind(experience_id.to_string())
        .bind(follow_up.timestamp.to_rfc3339())
        .bind(follow_up.source.as_str())
        .bind(&follow_up.text)
        .bind(follow_up.created_something)
        .bind(follow_up.shared_or_taught)
        .bind(follow_up.inspired_further_action)
        .bind(follow_up.creation_magnitude)
        .bind(&follow_up.creation_description)
        .execute(&self.pool)
        .await
        .map_err(Self::map_err)?;
        Ok(())
    }

    async fn save_pending_question(&self, question: &PendingQuestion) -> DomainResult<()> {
        sqlx::query(
            "INSERT INTO pending_questions (id, experience_id, user_id, text, ask_after, horizon, asked) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(question.id.to_string())
        .bind(question.experience_id.to_string())
        .bind(&question.user_id)
        .bind(&question.text)
        .bind(question.ask_after.to_rfc3339())
        .bind(question.horizon.as_str())
        .bind(question.asked)
        .execute(&self.pool)
        .await
        .map_err(Self::map_err)?;
        Ok(())
    }

    async fn list_pending_questions(&self) -> DomainResult<Vec<PendingQuestion>> {
        let rows = sqlx::query("SELECT id, experience_id, user_id, text, ask_after, horizon, asked FROM pending_questions")
            .fetch_all(&self.pool)
            .await
            .map_err(Self::map_err)?;

        rows.into_iter()
            .map(|row| -> DomainResult<PendingQuestion> {
                Ok(PendingQuestion {
                    id: parse_uuid(&row.try_get::<String, _>("id").map_err(Self::map_err)?)?,
                    experience_id: parse_uuid(&row.try_get::<String, _>("experience_id").map_err(Self::map_err)?)?,
                    user_id: row.try_get("user_id").map_err(Self::map_err)?,
                    text: row.try_get("text").map_err(Self::map_err)?,
                    ask_after: parse_flexible_timestamp(&row.try_get::<String, _>("ask_after").map_err(Self::map_err)?)?,
                    horizon: parse_horizon(&row.try_get::<String, _>("horizon").map_err(Self::map_err)?),
                    asked: row.try_get("asked").map_err(Self::map_err)?,
                    answered_by: None,
                })
            })
            .collect()
    }

    async fn mark_question_asked(&self, question_id: Uuid) -> DomainResult<()> {
        sqlx::query("UPDATE pending_questions SET asked = 1 WHERE id = ?")
            .bind(question_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(Self::map_err)?;
        Ok(())
    }

    async fn log_conversation(&self, row: ConversationRow) -> DomainResult<()> {
        sqlx::query(
            "INSERT INTO conversation_logs (id, user_id, experience_id, role, content, logged_at) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(row.id.to_string())
        .bind(&row.user_id)
        .bind(row.experience_id.map(|id| id.to_string()))
        .bind(&row.role)
        .bind(&row.content)
        .bind(row.logged_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(Self::map_err)?;
        Ok(())
    }

    async fn get_conversation_logs(&self, user_id: &str) -> DomainResult<Vec<ConversationRow>> {
        let rows = sqlx::query(
            "SELECT id, user_id, experience_id, role, content, logged_at FROM conversation_logs \
             WHERE user_id = ? ORDER BY logged_at ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Self::map_err)?;

        rows.into_iter()
            .map(|row| -> DomainResult<ConversationRow> {
                let experience_id: Option<String> = row.try_get("experience_id").map_err(Self::map_err)?;
                Ok(ConversationRow {
                    id: parse_uuid(&row.try_get::<String, _>("id").map_err(Self::map_err)?)?,
                    user_id: row.try_get("user_id").map_err(Self::map_err)?,
                    experience_id: experience_id.map(|s| parse_uuid(&s)).transpose()?,
                    role: row.try_get("role").map_err(Self::map_err)?,
                    content: row.try_get("content").map_err(Self::map_err)?,
                    logged_at: parse_flexible_timestamp(&row.try_get::<String, _>("logged_at").map_err(Self::map_err)?)?,
                })
            })
            .collect()
    }

    async fn health_check(&self) -> DomainResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await.map_err(Self::map_err)?;
        Ok(())
    }
}

impl SqliteStorage {
    async fn hydrate_experience(&self, row: sqlx::sqlite::SqliteRow, user_id: &str) -> DomainResult<Experience> {
        let id = parse_uuid(&row.try_get::<String, _>("id").map_err(Self::map_err)?)?;
        let quality_dimensions: QualityDimensions =
            serde_json::from_str(&row.try_get::<String, _>("quality_dimensions_json").map_err(Self::map_err)?)?;
        let horizon_assessments: Vec<HorizonAssessment> =
            serde_json::from_str(&row.try_get::<String, _>("horizon_assessments_json").map_err(Self::map_err)?)?;
        let propagation_events: Vec<String> =
            serde_json::from_str(&row.try_get::<String, _>("propagation_events_json").map_err(Self::map_err)?)?;

        let follow_up_rows = sqlx::query(
            "SELECT id, experience_id, timestamp, source, text, created_something, shared_or_taught, \
             inspired_further_action, creation_magnitude, creation_description FROM follow_ups \
             WHERE experience_id = ? ORDER BY timestamp ASC",
        )
        .bind(id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(Self::map_err)?;
        let follow_ups = follow_up_rows.iter().map(row_to_follow_up).collect::<DomainResult<Vec<_>>>()?;

        let snapshot_rows = sqlx::query(
            "SELECT timestamp, direction, magnitude, confidence, horizon FROM vector_snapshots \
             WHERE experience_id = ? ORDER BY id ASC",
        )
        .bind(id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(Self::map_err)?;
        let vector_snapshots = snapshot_rows.iter().map(row_to_snapshot).collect::<DomainResult<Vec<_>>>()?;

        Ok(Experience {
            id,
            user_id: user_id.to_string(),
            description: row.try_get("description").map_err(Self::map_err)?,
            context: row.try_get("context").map_err(Self::map_err)?,
            rating: row.try_get("rating").map_err(Self::map_err)?,
            created_at: parse_flexible_timestamp(&row.try_get::<String, _>("created_at").map_err(Self::map_err)?)?,
            follow_ups,
            vector_snapshots,
            horizon_assessments,
            provisional_intention: parse_intention(&row.try_get::<String, _>("provisional_intention").map_err(Self::map_err)?),
            intention_confidence: row.try_get("intention_confidence").map_err(Self::map_err)?,
            resonance_score: row.try_get("resonance_score").map_err(Self::map_err)?,
            quality_score: row.try_get("quality_score").map_err(Self::map_err)?,
            quality_dimensions,
            propagated: row.try_get("propagated").map_err(Self::map_err)?,
            propagation_events,
            matrix_position: row.try_get("matrix_position").map_err(Self::map_err)?,
        })
    }
}

async fn save_experience_tx(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    user_id: &str,
    experience: &Experience,
) -> DomainResult<()> {
    let quality_dimensions_json = serde_json::to_string(&experience.quality_dimensions)?;
    let horizon_assessments_json = serde_json::to_string(&experience.horizon_assessments)?;
    let propagation_events_json = serde_json::to_string(&experience.propagation_events)?;

    sqlx::query(
        "INSERT INTO experiences (id, user_id, description, context, rating, created_at, provisional_intention, \
         intention_confidence, resonance_score, quality_score, quality_dimensions_json, horizon_assessments_json, \
         propagated, propagation_events_json, matrix_position) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) \
         ON CONFLICT(id) DO UPDATE SET description = excluded.description, context = excluded.context, \
         rating = excluded.rating, provisional_intention = excluded.provisional_intention, \
         intention_confidence = excluded.intention_confidence, resonance_score = excluded.resonance_score, \
         quality_score = excluded.quality_score, quality_dimensions_json = excluded.quality_dimensions_json, \
         horizon_assessments_json = excluded.horizon_assessments_json, propagated = excluded.propagated, \
         propagation_events_json = excluded.propagation_events_json, matrix_position = excluded.matrix_position",
    )
    .bind(experience.id.to_string())
    .bind(user_id)
    .bind(&experience.description)
    .bind(&experience.context)
    .bind(experience.rating)
    .bind(experience.created_at.to_rfc3339())
    .bind(experience.provisional_intention.as_str())
    .bind(experience.intention_confidence)
    .bind(experience.resonance_score)
    .bind(experience.quality_score)
    .bind(quality_dimensions_json)
    .bind(horizon_assessments_json)
    .bind(experience.propagated)
    .bind(propagation_events_json)
    .bind(&experience.matrix_position)
    .execute(&mut **tx)
    .await
    .map_err(SqliteStorage::map_err)?;

    sqlx::query("DELETE FROM follow_ups WHERE experience_id = ?")
        .bind(experience.id.to_string())
        .execute(&mut **tx)
        .await
        .map_err(SqliteStorage::map_err)?;
    for follow_up in &experience.follow_ups {
        sqlx::query(
            "INSERT INTO follow_ups (id, experience_id, timestamp, source, text, created_something, \
             shared_or_taught, inspired_further_action, creation_magnitude, creation_description) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(follow_up.id.to_string())
        .bind(experience.id.to_string())
        .bind(follow_up.timestamp.to_rfc3339())
        .bind(follow_up.source.as_str())
        .bind(&follow_up.text)
        .bind(follow_up.created_something)
        .bind(follow_up.shared_or_taught)
        .bind(follow_up.inspired_further_action)
        .bind(follow_up.creation_magnitude)
        .bind(&follow_up.creation_description)
        .execute(&mut **tx)
        .await
        .map_err(SqliteStorage::map_err)?;
    }

    sqlx::query("DELETE FROM vector_snapshots WHERE experience_id = ?")
        .bind(experience.id.to_string())
        .execute(&mut **tx)
        .await
        .map_err(SqliteStorage::map_err)?;
    for snapshot in &experience.vector_snapshots {
        insert_snapshot(tx, user_id, Some(experience.id), snapshot).await?;
    }

    Ok(())
}

async fn insert_snapshot(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    user_id: &str,
    experience_id: Option<Uuid>,
    snapshot: &VectorSnapshot,
) -> DomainResult<()> {
    sqlx::query(
        "INSERT INTO vector_snapshots (user_id, experience_id, timestamp, direction, magnitude, confidence, horizon) \
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(user_id)
    .bind(experience_id.map(|id| id.to_string()))
    .bind(snapshot.timestamp.to_rfc3339())
    .bind(snapshot.direction)
    .bind(snapshot.magnitude)
    .bind(snapshot.confidence)
    .bind(snapshot.horizon.as_str())
    .execute(&mut **tx)
    .await
    .map_err(SqliteStorage::map_err)?;
    Ok(())
}

fn row_to_snapshot(row: &sqlx::sqlite::SqliteRow) -> DomainResult<VectorSnapshot> {
    let timestamp = parse_flexible_timestamp(&row.try_get::<String, _>("timestamp").map_err(SqliteStorage::map_err)?)?;
    Ok(VectorSnapshot::new(
        row.try_get("direction").map_err(SqliteStorage::map_err)?,
        row.try_get("magnitude").map_err(SqliteStorage::map_err)?,
        row.try_get("confidence").map_err(SqliteStorage::map_err)?,
        parse_horizon(&row.try_get::<String, _>("horizon").map_err(SqliteStorage::map_err)?),
    )
    .with_timestamp(timestamp))
}

fn row_to_follow_up(row: &sqlx::sqlite::SqliteRow) -> DomainResult<FollowUp> {
    let timestamp = parse_flexible_timestamp(&row.try_get::<String, _>("timestamp").map_err(SqliteStorage::map_err)?)?;
    let mut follow_up = FollowUp::new(
        parse_uuid(&row.try_get::<String, _>("experience_id").map_err(SqliteStorage::map_err)?)?,
        parse_follow_up_source(&row.try_get::<String, _>("source").map_err(SqliteStorage::map_err)?),
        row.try_get::<String, _>("text").map_err(SqliteStorage::map_err)?,
    )
    .with_timestamp(timestamp);
    follow_up.id = parse_uuid(&row.try_get::<String, _>("id").map_err(SqliteStorage::map_err)?)?;
    follow_up.created_something = row.try_get("created_something").map_err(SqliteStorage::map_err)?;
    follow_up.shared_or_taught = row.try_get("shared_or_taught").map_err(SqliteStorage::map_err)?;
    follow_up.inspired_further_action = row.try_get("inspired_further_action").map_err(SqliteStorage::map_err)?;
    follow_up.creation_magnitude = row.try_get("creation_magnitude").map_err(SqliteStorage::map_err)?;
    follow_up.creation_description = row.try_get("creation_description").map_err(SqliteStorage::map_err)?;
    Ok(follow_up)
}

fn parse_uuid(raw: &str) -> DomainResult<Uuid> {
    Uuid::parse_str(raw).map_err(|err| DomainError::StorageError(format!("invalid uuid {raw}: {err}")))
}

fn parse_horizon(raw: &str) -> TimeHorizon {
    match raw {
        "short_term" => TimeHorizon::ShortTerm,
        "medium_term" => TimeHorizon::MediumTerm,
        "long_term" => TimeHorizon::LongTerm,
        "generational" => TimeHorizon::Generational,
        _ => TimeHorizon::Immediate,
    }
}

fn parse_intention(raw: &str) -> IntentionSignal {
    match raw {
        "creative_intent" => IntentionSignal::CreativeIntent,
        "consumptive_intent" => IntentionSignal::ConsumptiveIntent,
        "mixed" => IntentionSignal::Mixed,
        _ => IntentionSignal::Pending,
    }
}

fn parse_follow_up_source(raw: &str) -> FollowUpSource {
    match raw {
        "behavioral" => FollowUpSource::Behavioral,
        "system_observation" => FollowUpSource::SystemObservation,
        _ => FollowUpSource::UserResponse,
    }
}

/// Parses a sqlite timestamp tolerating 0-9 digits of fractional-second
/// precision (spec.md §9's generalization of the observed 5-digit shim),
/// falling back to RFC3339 for values written by `to_rfc3339()`.
fn parse_flexible_timestamp(raw: &str) -> DomainResult<chrono::DateTime<chrono::Utc>> {
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&chrono::Utc));
    }

    let (main, fraction) = match raw.split_once('.') {
        Some((main, fraction)) => (main, Some(fraction)),
        None => (raw, None),
    };

    let naive = chrono::NaiveDateTime::parse_from_str(main, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S"))
        .map_err(|err| DomainError::StorageError(format!("invalid timestamp {raw}: {err}")))?;

    let nanos = match fraction {
        Some(fraction) if !fraction.is_empty() => {
            let digits: String = fraction.chars().filter(char::is_ascii_digit).take(9).collect();
            let padded = format!("{digits:0<9}");
            padded.parse::<u32>().unwrap_or(0)
        }
        _ => 0,
    };

    let naive_with_nanos = naive.date().and_hms_nano_opt(naive.time().hour(), naive.time().minute(), naive.time().second(), nanos)
        .unwrap_or(naive);

    Ok(chrono::DateTime::<chrono::Utc>::from_naive_utc_and_offset(naive_with_nanos, chrono::Utc))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rfc3339() {
        let parsed = parse_flexible_timestamp("2025-06-15T00:00:00+00:00").unwrap();
        assert_eq!(parsed.format("%Y-%m-%d").to_string(), "2025-06-15");
    }

    #[test]
    fn parses_zero_fractional_digits() {
        let parsed = parse_flexible_timestamp("2025-06-15 12:30:00").unwrap();
        assert_eq!(parsed.format("%H:%M:%S").to_string(), "12:30:00");
    }

    #[test]
    fn parses_five_fractional_digits() {
        let parsed = parse_flexible_timestamp("2025-06-15 12:30:00.12345").unwrap();
        assert_eq!(parsed.format("%H:%M:%S").to_string(), "12:30:00");
    }

    #[test]
    fn parses_nine_fractional_digits() {
        let parsed = parse_flexible_timestamp("2025-06-15 12:30:00.123456789").unwrap();
        assert_eq!(parsed.nanosecond(), 123_456_789);
    }
}

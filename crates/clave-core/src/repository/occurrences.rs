use crate::error::CoreError;
use crate::models::{
    AgendaEntry, Lesson, Occurrence, OccurrenceQueryResult, OccurrenceStatus, RescheduleResult,
    WeeklyAgenda,
};
use crate::recurrence;
use crate::repository::SqliteRepository;
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use sqlx::{QueryBuilder, Sqlite, Transaction};
use tracing::{debug, info};

#[async_trait]
impl super::OccurrenceRepository for SqliteRepository {
    async fn generate_occurrences(
        &self,
        lesson_id: i64,
        weeks: Option<u32>,
    ) -> Result<Vec<Occurrence>, CoreError> {
        let weeks = weeks.unwrap_or(self.schedule().lookahead_weeks);

        let mut tx = self.pool().begin().await?;

        let lesson: Lesson = sqlx::query_as("SELECT * FROM lessons WHERE id = $1")
            .bind(lesson_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| {
                CoreError::NotFound(format!("Lesson with id {} not found", lesson_id))
            })?;

        let weekdays: Vec<i64> = sqlx::query_scalar(
            "SELECT weekday FROM lesson_weekdays WHERE lesson_id = $1 ORDER BY weekday",
        )
        .bind(lesson_id)
        .fetch_all(&mut *tx)
        .await?;

        let created =
            Self::materialize_in_transaction(&mut tx, lesson_id, lesson.start_date, &weekdays, weeks)
                .await?;

        tx.commit().await?;

        info!(
            lesson_id,
            weeks,
            created = created.len(),
            "materialized occurrences"
        );
        Ok(created)
    }

    async fn find_occurrence_by_id(&self, id: i64) -> Result<Option<Occurrence>, CoreError> {
        let occurrence = sqlx::query_as("SELECT * FROM lesson_occurrences WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        Ok(occurrence)
    }

    async fn find_occurrences(
        &self,
        lesson_id: i64,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<OccurrenceQueryResult>, CoreError> {
        let _lesson: Lesson = sqlx::query_as("SELECT * FROM lessons WHERE id = $1")
            .bind(lesson_id)
            .fetch_optional(self.pool())
            .await?
            .ok_or_else(|| {
                CoreError::NotFound(format!("Lesson with id {} not found", lesson_id))
            })?;

        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(
            r#"SELECT
                o.id, o.lesson_id, o.date, o.status, o.created_at,
                r.new_date AS rescheduled_to,
                r.reason AS reschedule_reason
            FROM lesson_occurrences o
            LEFT JOIN occurrence_reschedules r ON r.id = (
                SELECT r2.id FROM occurrence_reschedules r2
                WHERE r2.occurrence_id = o.id
                ORDER BY r2.id DESC
                LIMIT 1
            )
            WHERE o.lesson_id = "#,
        );
        qb.push_bind(lesson_id);

        if let Some(from) = from {
            qb.push(" AND o.date >= ");
            qb.push_bind(from);
        }
        if let Some(to) = to {
            qb.push(" AND o.date <= ");
            qb.push_bind(to);
        }
        qb.push(" ORDER BY o.date");

        let occurrences = qb.build_query_as().fetch_all(self.pool()).await?;
        Ok(occurrences)
    }

    async fn cancel_occurrence(
        &self,
        id: i64,
        reason: Option<String>,
    ) -> Result<Occurrence, CoreError> {
        // Unconditional transition: re-cancelling stays idempotent
        let occurrence: Occurrence = sqlx::query_as(
            r#"UPDATE lesson_occurrences
            SET status = $1
            WHERE id = $2
            RETURNING *"#,
        )
        .bind(OccurrenceStatus::Cancelled)
        .bind(id)
        .fetch_optional(self.pool())
        .await?
        .ok_or_else(|| CoreError::NotFound(format!("Occurrence with id {} not found", id)))?;

        info!(occurrence_id = id, reason = ?reason, "cancelled occurrence");
        Ok(occurrence)
    }

    async fn hold_occurrence(&self, id: i64) -> Result<Occurrence, CoreError> {
        let occurrence: Occurrence = sqlx::query_as(
            r#"UPDATE lesson_occurrences
            SET status = $1
            WHERE id = $2
            RETURNING *"#,
        )
        .bind(OccurrenceStatus::Held)
        .bind(id)
        .fetch_optional(self.pool())
        .await?
        .ok_or_else(|| CoreError::NotFound(format!("Occurrence with id {} not found", id)))?;

        debug!(occurrence_id = id, "marked occurrence held");
        Ok(occurrence)
    }

    async fn reschedule_occurrence(
        &self,
        id: i64,
        new_date: NaiveDate,
        reason: Option<String>,
    ) -> Result<RescheduleResult, CoreError> {
        if new_date <= Utc::now().date_naive() {
            return Err(CoreError::InvalidInput(
                "new date invalid: must be strictly in the future".to_string(),
            ));
        }

        let mut tx = self.pool().begin().await?;

        let source: Occurrence = sqlx::query_as("SELECT * FROM lesson_occurrences WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("Occurrence with id {} not found", id)))?;

        sqlx::query(
            r#"INSERT INTO occurrence_reschedules (occurrence_id, new_date, reason, created_at)
            VALUES ($1, $2, $3, $4)"#,
        )
        .bind(source.id)
        .bind(new_date)
        .bind(&reason)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        let source: Occurrence = sqlx::query_as(
            r#"UPDATE lesson_occurrences
            SET status = $1
            WHERE id = $2
            RETURNING *"#,
        )
        .bind(OccurrenceStatus::Rescheduled)
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        let replacement: Occurrence = sqlx::query_as(
            r#"INSERT INTO lesson_occurrences (lesson_id, date, status, created_at)
            VALUES ($1, $2, $3, $4)
            RETURNING *"#,
        )
        .bind(source.lesson_id)
        .bind(new_date)
        .bind(OccurrenceStatus::Scheduled)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            CoreError::conflict_on_unique(
                e,
                "an occurrence already exists for this lesson on the new date",
            )
        })?;

        tx.commit().await?;

        info!(
            occurrence_id = id,
            replacement_id = replacement.id,
            %new_date,
            "rescheduled occurrence"
        );
        Ok(RescheduleResult {
            source,
            replacement,
        })
    }

    async fn weekly_agenda(&self, anchor: Option<NaiveDate>) -> Result<WeeklyAgenda, CoreError> {
        let anchor = anchor.unwrap_or_else(|| Utc::now().date_naive());
        let (week_start, week_end) = recurrence::week_bounds(anchor);

        let occurrences: Vec<AgendaEntry> = sqlx::query_as(
            r#"SELECT
                o.id, o.lesson_id, o.date, o.status,
                l.instrument, l.shift,
                t.name AS teacher_name,
                t.specialty AS teacher_specialty,
                r.new_date AS rescheduled_to,
                r.reason AS reschedule_reason
            FROM lesson_occurrences o
            JOIN lessons l ON o.lesson_id = l.id
            JOIN teachers t ON l.teacher_id = t.id
            LEFT JOIN occurrence_reschedules r ON r.id = (
                SELECT r2.id FROM occurrence_reschedules r2
                WHERE r2.occurrence_id = o.id
                ORDER BY r2.id DESC
                LIMIT 1
            )
            WHERE o.date BETWEEN $1 AND $2
            ORDER BY o.date, CASE l.shift WHEN 'morning' THEN 0 WHEN 'afternoon' THEN 1 ELSE 2 END"#,
        )
        .bind(week_start)
        .bind(week_end)
        .fetch_all(self.pool())
        .await?;

        Ok(WeeklyAgenda {
            week_start,
            week_end,
            occurrences,
        })
    }
}

impl SqliteRepository {
    /// Materializes occurrences for a weekday pattern within an existing
    /// transaction. The conflict-ignoring insert makes the loop idempotent:
    /// dates that already have an occurrence for the lesson are skipped, so
    /// re-running over an overlapping window never duplicates rows or errors.
    /// Returns only the rows created by this call.
    pub(crate) async fn materialize_in_transaction<'a>(
        tx: &mut Transaction<'a, Sqlite>,
        lesson_id: i64,
        start_date: NaiveDate,
        weekdays: &[i64],
        weeks: u32,
    ) -> Result<Vec<Occurrence>, CoreError> {
        recurrence::validate_weekdays(weekdays)?;

        let candidates = recurrence::expand_weekly(start_date, weekdays, weeks);
        let mut created = Vec::with_capacity(candidates.len());

        for date in candidates {
            let inserted: Option<Occurrence> = sqlx::query_as(
                r#"INSERT INTO lesson_occurrences (lesson_id, date, status, created_at)
                VALUES ($1, $2, $3, $4)
                ON CONFLICT (lesson_id, date) DO NOTHING
                RETURNING *"#,
            )
            .bind(lesson_id)
            .bind(date)
            .bind(OccurrenceStatus::Scheduled)
            .bind(Utc::now())
            .fetch_optional(&mut **tx)
            .await?;

            if let Some(occurrence) = inserted {
                created.push(occurrence);
            }
        }

        Ok(created)
    }
}

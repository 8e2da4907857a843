use crate::error::CoreError;
use crate::models::DashboardSummary;
use crate::recurrence;
use crate::repository::SqliteRepository;
use async_trait::async_trait;
use chrono::Utc;

#[async_trait]
impl super::DashboardRepository for SqliteRepository {
    async fn dashboard_summary(&self) -> Result<DashboardSummary, CoreError> {
        let teachers: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM teachers")
            .fetch_one(self.pool())
            .await?;

        let students: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM students")
            .fetch_one(self.pool())
            .await?;

        let lessons: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM lessons")
            .fetch_one(self.pool())
            .await?;

        let (week_start, week_end) = recurrence::week_bounds(Utc::now().date_naive());
        let occurrences_this_week: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM lesson_occurrences WHERE date BETWEEN $1 AND $2",
        )
        .bind(week_start)
        .bind(week_end)
        .fetch_one(self.pool())
        .await?;

        let pending_payments: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM payments WHERE status = 'pending'")
                .fetch_one(self.pool())
                .await?;

        Ok(DashboardSummary {
            teachers,
            students,
            lessons,
            occurrences_this_week,
            pending_payments,
        })
    }
}

use crate::error::CoreError;
use crate::models::{NewPaymentData, Payment, PaymentFilter, PaymentStatus, Student};
use crate::repository::SqliteRepository;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite};
use tracing::info;

#[async_trait]
impl super::PaymentRepository for SqliteRepository {
    async fn add_payment(&self, data: NewPaymentData) -> Result<Payment, CoreError> {
        if data.amount <= 0.0 {
            return Err(CoreError::InvalidInput(
                "amount must be greater than zero".to_string(),
            ));
        }

        let _student: Student = sqlx::query_as("SELECT * FROM students WHERE id = $1")
            .bind(data.student_id)
            .fetch_optional(self.pool())
            .await?
            .ok_or_else(|| {
                CoreError::NotFound(format!("Student with id {} not found", data.student_id))
            })?;

        let payment: Payment = sqlx::query_as(
            r#"INSERT INTO payments (student_id, amount, due_date, status, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *"#,
        )
        .bind(data.student_id)
        .bind(data.amount)
        .bind(data.due_date)
        .bind(PaymentStatus::Pending)
        .bind(Utc::now())
        .fetch_one(self.pool())
        .await?;

        info!(
            payment_id = payment.id,
            student_id = payment.student_id,
            "recorded payment"
        );
        Ok(payment)
    }

    async fn find_payments(&self, filter: PaymentFilter) -> Result<Vec<Payment>, CoreError> {
        let mut qb: QueryBuilder<Sqlite> =
            QueryBuilder::new("SELECT * FROM payments WHERE 1 = 1");

        if let Some(student_id) = filter.student_id {
            qb.push(" AND student_id = ");
            qb.push_bind(student_id);
        }
        if let Some(status) = filter.status {
            qb.push(" AND status = ");
            qb.push_bind(status);
        }
        qb.push(" ORDER BY due_date, id");

        let payments = qb.build_query_as().fetch_all(self.pool()).await?;
        Ok(payments)
    }

    async fn find_payment_by_id(&self, id: i64) -> Result<Option<Payment>, CoreError> {
        let payment = sqlx::query_as("SELECT * FROM payments WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        Ok(payment)
    }

    async fn process_payment(&self, id: i64) -> Result<Payment, CoreError> {
        let mut tx = self.pool().begin().await?;

        let payment: Payment = sqlx::query_as("SELECT * FROM payments WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("Payment with id {} not found", id)))?;

        // The teacher share comes from the student's most recent enrollment.
        // A student with no enrollment still gets the payment settled, with
        // no share recorded.
        let share_percentage: Option<i64> = sqlx::query_scalar(
            r#"SELECT t.revenue_share_percentage
            FROM lesson_enrollments e
            JOIN lessons l ON l.id = e.lesson_id
            JOIN teachers t ON t.id = l.teacher_id
            WHERE e.student_id = $1
            ORDER BY e.enrolled_at DESC
            LIMIT 1"#,
        )
        .bind(payment.student_id)
        .fetch_optional(&mut *tx)
        .await?;

        let share_amount = share_percentage.map(|p| payment.amount * p as f64 / 100.0);

        let payment: Payment = sqlx::query_as(
            r#"UPDATE payments
            SET status = $1, paid_at = $2, revenue_share_amount = $3
            WHERE id = $4
            RETURNING *"#,
        )
        .bind(PaymentStatus::Paid)
        .bind(Utc::now().date_naive())
        .bind(share_amount)
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(
            payment_id = id,
            share = ?payment.revenue_share_amount,
            "processed payment"
        );
        Ok(payment)
    }

    async fn cancel_payment(&self, id: i64) -> Result<Payment, CoreError> {
        let payment: Payment = sqlx::query_as(
            r#"UPDATE payments
            SET status = $1
            WHERE id = $2
            RETURNING *"#,
        )
        .bind(PaymentStatus::Cancelled)
        .bind(id)
        .fetch_optional(self.pool())
        .await?
        .ok_or_else(|| CoreError::NotFound(format!("Payment with id {} not found", id)))?;

        info!(payment_id = id, "cancelled payment");
        Ok(payment)
    }
}

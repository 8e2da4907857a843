use crate::error::CoreError;
use crate::models::{
    Enrollment, Lesson, LessonQueryResult, NewLessonData, Occurrence, Shift, Student, Teacher,
};
use crate::recurrence;
use crate::repository::SqliteRepository;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite};
use std::str::FromStr;
use tracing::info;

#[async_trait]
impl super::LessonRepository for SqliteRepository {
    async fn configure_lesson(
        &self,
        data: NewLessonData,
    ) -> Result<(Lesson, Vec<Occurrence>), CoreError> {
        if data.instrument.trim().is_empty() {
            return Err(CoreError::InvalidInput("instrument is required".to_string()));
        }
        let shift =
            Shift::from_str(&data.shift).map_err(|e| CoreError::InvalidInput(e.to_string()))?;
        // Validate the whole pattern before anything is written
        recurrence::validate_weekdays(&data.weekdays)?;

        let mut tx = self.pool().begin().await?;

        let _teacher: Teacher = sqlx::query_as("SELECT * FROM teachers WHERE id = $1")
            .bind(data.teacher_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| {
                CoreError::NotFound(format!("Teacher with id {} not found", data.teacher_id))
            })?;

        let lesson: Lesson = sqlx::query_as(
            r#"INSERT INTO lessons (instrument, shift, teacher_id, start_date, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *"#,
        )
        .bind(&data.instrument)
        .bind(shift)
        .bind(data.teacher_id)
        .bind(data.start_date)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await?;

        if !data.weekdays.is_empty() {
            let mut qb: QueryBuilder<Sqlite> =
                QueryBuilder::new("INSERT OR IGNORE INTO lesson_weekdays (lesson_id, weekday) ");
            qb.push_values(data.weekdays.iter(), |mut b, weekday| {
                b.push_bind(lesson.id).push_bind(weekday);
            });
            qb.build().execute(&mut *tx).await?;
        }

        let occurrences = Self::materialize_in_transaction(
            &mut tx,
            lesson.id,
            lesson.start_date,
            &data.weekdays,
            self.schedule().lookahead_weeks,
        )
        .await?;

        tx.commit().await?;

        info!(
            lesson_id = lesson.id,
            created = occurrences.len(),
            "configured lesson"
        );
        Ok((lesson, occurrences))
    }

    async fn find_lessons(&self) -> Result<Vec<LessonQueryResult>, CoreError> {
        let lessons = sqlx::query_as(
            r#"SELECT
                l.id, l.instrument, l.shift, l.teacher_id, l.start_date, l.created_at,
                t.name AS teacher_name,
                GROUP_CONCAT(w.weekday) AS weekdays
            FROM lessons l
            JOIN teachers t ON l.teacher_id = t.id
            LEFT JOIN lesson_weekdays w ON w.lesson_id = l.id
            GROUP BY l.id, l.instrument, l.shift, l.teacher_id, l.start_date, l.created_at, t.name
            ORDER BY l.created_at"#,
        )
        .fetch_all(self.pool())
        .await?;
        Ok(lessons)
    }

    async fn find_lesson_by_id(&self, id: i64) -> Result<Option<LessonQueryResult>, CoreError> {
        let lesson = sqlx::query_as(
            r#"SELECT
                l.id, l.instrument, l.shift, l.teacher_id, l.start_date, l.created_at,
                t.name AS teacher_name,
                GROUP_CONCAT(w.weekday) AS weekdays
            FROM lessons l
            JOIN teachers t ON l.teacher_id = t.id
            LEFT JOIN lesson_weekdays w ON w.lesson_id = l.id
            WHERE l.id = $1
            GROUP BY l.id, l.instrument, l.shift, l.teacher_id, l.start_date, l.created_at, t.name"#,
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await?;
        Ok(lesson)
    }

    async fn find_lesson_weekdays(&self, lesson_id: i64) -> Result<Vec<i64>, CoreError> {
        let weekdays = sqlx::query_scalar(
            "SELECT weekday FROM lesson_weekdays WHERE lesson_id = $1 ORDER BY weekday",
        )
        .bind(lesson_id)
        .fetch_all(self.pool())
        .await?;
        Ok(weekdays)
    }

    async fn delete_lesson(&self, id: i64) -> Result<(), CoreError> {
        let result = sqlx::query("DELETE FROM lessons WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::NotFound(format!(
                "Lesson with id {} not found",
                id
            )));
        }
        Ok(())
    }

    async fn enroll_student(
        &self,
        lesson_id: i64,
        student_id: i64,
    ) -> Result<Enrollment, CoreError> {
        let mut tx = self.pool().begin().await?;

        let _lesson: Lesson = sqlx::query_as("SELECT * FROM lessons WHERE id = $1")
            .bind(lesson_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| {
                CoreError::NotFound(format!("Lesson with id {} not found", lesson_id))
            })?;

        let _student: Student = sqlx::query_as("SELECT * FROM students WHERE id = $1")
            .bind(student_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| {
                CoreError::NotFound(format!("Student with id {} not found", student_id))
            })?;

        let enrollment: Enrollment = sqlx::query_as(
            r#"INSERT INTO lesson_enrollments (lesson_id, student_id, enrolled_at)
            VALUES ($1, $2, $3)
            RETURNING *"#,
        )
        .bind(lesson_id)
        .bind(student_id)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            CoreError::conflict_on_unique(e, "student is already enrolled in this lesson")
        })?;

        tx.commit().await?;
        Ok(enrollment)
    }

    async fn withdraw_student(&self, lesson_id: i64, student_id: i64) -> Result<(), CoreError> {
        let result =
            sqlx::query("DELETE FROM lesson_enrollments WHERE lesson_id = $1 AND student_id = $2")
                .bind(lesson_id)
                .bind(student_id)
                .execute(self.pool())
                .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::NotFound(format!(
                "Enrollment of student {} in lesson {} not found",
                student_id, lesson_id
            )));
        }
        Ok(())
    }

    async fn find_lesson_students(&self, lesson_id: i64) -> Result<Vec<Student>, CoreError> {
        let _lesson: Lesson = sqlx::query_as("SELECT * FROM lessons WHERE id = $1")
            .bind(lesson_id)
            .fetch_optional(self.pool())
            .await?
            .ok_or_else(|| {
                CoreError::NotFound(format!("Lesson with id {} not found", lesson_id))
            })?;

        let students = sqlx::query_as(
            r#"SELECT s.* FROM students s
            JOIN lesson_enrollments e ON e.student_id = s.id
            WHERE e.lesson_id = $1
            ORDER BY s.name"#,
        )
        .bind(lesson_id)
        .fetch_all(self.pool())
        .await?;
        Ok(students)
    }
}

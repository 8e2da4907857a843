use crate::error::CoreError;
use crate::models::{NewStudentData, Student, UpdateStudentData};
use crate::repository::SqliteRepository;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite};

#[async_trait]
impl super::StudentRepository for SqliteRepository {
    async fn add_student(&self, data: NewStudentData) -> Result<Student, CoreError> {
        if data.name.trim().is_empty() {
            return Err(CoreError::InvalidInput("name is required".to_string()));
        }
        if data.email.trim().is_empty() {
            return Err(CoreError::InvalidInput("email is required".to_string()));
        }

        let student: Student = sqlx::query_as(
            r#"INSERT INTO students (name, email, phone, birth_date, instrument, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *"#,
        )
        .bind(&data.name)
        .bind(&data.email)
        .bind(&data.phone)
        .bind(data.birth_date)
        .bind(&data.instrument)
        .bind(Utc::now())
        .fetch_one(self.pool())
        .await
        .map_err(|e| {
            CoreError::conflict_on_unique(e, "a student with this email already exists")
        })?;

        Ok(student)
    }

    async fn find_students(&self) -> Result<Vec<Student>, CoreError> {
        let students = sqlx::query_as("SELECT * FROM students ORDER BY name")
            .fetch_all(self.pool())
            .await?;
        Ok(students)
    }

    async fn find_student_by_id(&self, id: i64) -> Result<Option<Student>, CoreError> {
        let student = sqlx::query_as("SELECT * FROM students WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        Ok(student)
    }

    async fn update_student(
        &self,
        id: i64,
        data: UpdateStudentData,
    ) -> Result<Student, CoreError> {
        let mut tx = self.pool().begin().await?;

        let _current: Student = sqlx::query_as("SELECT * FROM students WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("Student with id {} not found", id)))?;

        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE students SET ");
        let mut updated = false;

        if let Some(name) = &data.name {
            qb.push("name = ");
            qb.push_bind(name);
            updated = true;
        }

        if let Some(email) = &data.email {
            if updated {
                qb.push(", ");
            }
            qb.push("email = ");
            qb.push_bind(email);
            updated = true;
        }

        if let Some(phone) = &data.phone {
            if updated {
                qb.push(", ");
            }
            qb.push("phone = ");
            qb.push_bind(phone);
            updated = true;
        }

        if let Some(birth_date) = &data.birth_date {
            if updated {
                qb.push(", ");
            }
            qb.push("birth_date = ");
            qb.push_bind(birth_date);
            updated = true;
        }

        if let Some(instrument) = &data.instrument {
            if updated {
                qb.push(", ");
            }
            qb.push("instrument = ");
            qb.push_bind(instrument);
            updated = true;
        }

        if updated {
            qb.push(" WHERE id = ");
            qb.push_bind(id);
            qb.build().execute(&mut *tx).await.map_err(|e| {
                CoreError::conflict_on_unique(e, "a student with this email already exists")
            })?;
        }

        let student: Student = sqlx::query_as("SELECT * FROM students WHERE id = $1")
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(student)
    }

    async fn delete_student(&self, id: i64) -> Result<(), CoreError> {
        let result = sqlx::query("DELETE FROM students WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(|e| {
                CoreError::conflict_on_foreign_key(e, "student still has recorded payments")
            })?;

        if result.rows_affected() == 0 {
            return Err(CoreError::NotFound(format!(
                "Student with id {} not found",
                id
            )));
        }
        Ok(())
    }
}

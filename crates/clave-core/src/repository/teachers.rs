use crate::error::CoreError;
use crate::models::{NewTeacherData, Teacher, UpdateTeacherData};
use crate::repository::SqliteRepository;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite};

fn validate_revenue_share(percentage: i64) -> Result<(), CoreError> {
    if !(1..=100).contains(&percentage) {
        return Err(CoreError::InvalidInput(
            "revenue share percentage must be between 1 and 100".to_string(),
        ));
    }
    Ok(())
}

#[async_trait]
impl super::TeacherRepository for SqliteRepository {
    async fn add_teacher(&self, data: NewTeacherData) -> Result<Teacher, CoreError> {
        if data.name.trim().is_empty() {
            return Err(CoreError::InvalidInput("name is required".to_string()));
        }
        if data.email.trim().is_empty() {
            return Err(CoreError::InvalidInput("email is required".to_string()));
        }
        validate_revenue_share(data.revenue_share_percentage)?;

        let teacher: Teacher = sqlx::query_as(
            r#"INSERT INTO teachers (name, email, phone, specialty, max_students_per_slot, revenue_share_percentage, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *"#,
        )
        .bind(&data.name)
        .bind(&data.email)
        .bind(&data.phone)
        .bind(&data.specialty)
        .bind(data.max_students_per_slot.unwrap_or(1))
        .bind(data.revenue_share_percentage)
        .bind(Utc::now())
        .fetch_one(self.pool())
        .await
        .map_err(|e| {
            CoreError::conflict_on_unique(e, "a teacher with this email already exists")
        })?;

        Ok(teacher)
    }

    async fn find_teachers(&self) -> Result<Vec<Teacher>, CoreError> {
        let teachers = sqlx::query_as("SELECT * FROM teachers ORDER BY name")
            .fetch_all(self.pool())
            .await?;
        Ok(teachers)
    }

    async fn find_teacher_by_id(&self, id: i64) -> Result<Option<Teacher>, CoreError> {
        let teacher = sqlx::query_as("SELECT * FROM teachers WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        Ok(teacher)
    }

    async fn update_teacher(
        &self,
        id: i64,
        data: UpdateTeacherData,
    ) -> Result<Teacher, CoreError> {
        if let Some(percentage) = data.revenue_share_percentage {
            validate_revenue_share(percentage)?;
        }

        let mut tx = self.pool().begin().await?;

        // Check the teacher exists before building the update
        let _current: Teacher = sqlx::query_as("SELECT * FROM teachers WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("Teacher with id {} not found", id)))?;

        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE teachers SET ");
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

        if let Some(specialty) = &data.specialty {
            if updated {
                qb.push(", ");
            }
            qb.push("specialty = ");
            qb.push_bind(specialty);
            updated = true;
        }

        if let Some(max_students) = data.max_students_per_slot {
            if updated {
                qb.push(", ");
            }
            qb.push("max_students_per_slot = ");
            qb.push_bind(max_students);
            updated = true;
        }

        if let Some(percentage) = data.revenue_share_percentage {
            if updated {
                qb.push(", ");
            }
            qb.push("revenue_share_percentage = ");
            qb.push_bind(percentage);
            updated = true;
        }

        if updated {
            qb.push(" WHERE id = ");
            qb.push_bind(id);
            qb.build().execute(&mut *tx).await.map_err(|e| {
                CoreError::conflict_on_unique(e, "a teacher with this email already exists")
            })?;
        }

        let teacher: Teacher = sqlx::query_as("SELECT * FROM teachers WHERE id = $1")
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(teacher)
    }

    async fn delete_teacher(&self, id: i64) -> Result<(), CoreError> {
        let result = sqlx::query("DELETE FROM teachers WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(|e| {
                CoreError::conflict_on_foreign_key(e, "teacher still has configured lessons")
            })?;

        if result.rows_affected() == 0 {
            return Err(CoreError::NotFound(format!(
                "Teacher with id {} not found",
                id
            )));
        }
        Ok(())
    }
}

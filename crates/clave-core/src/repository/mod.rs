use crate::db::DbPool;
use crate::error::CoreError;
use crate::models::{
    DashboardSummary, Enrollment, Lesson, LessonQueryResult, NewLessonData, NewPaymentData,
    NewStudentData, NewTeacherData, Occurrence, OccurrenceQueryResult, Payment, PaymentFilter,
    RescheduleResult, ScheduleConfig, Student, Teacher, UpdateStudentData, UpdateTeacherData,
    WeeklyAgenda,
};
use async_trait::async_trait;
use chrono::NaiveDate;

// Re-export domain modules
pub mod lessons;
pub mod occurrences;
pub mod payments;
pub mod stats;
pub mod students;
pub mod teachers;

// Traits are defined in this module and implemented in respective domain modules

/// Domain-specific trait for teacher operations
#[async_trait]
pub trait TeacherRepository {
    async fn add_teacher(&self, data: NewTeacherData) -> Result<Teacher, CoreError>;
    async fn find_teachers(&self) -> Result<Vec<Teacher>, CoreError>;
    async fn find_teacher_by_id(&self, id: i64) -> Result<Option<Teacher>, CoreError>;
    async fn update_teacher(&self, id: i64, data: UpdateTeacherData) -> Result<Teacher, CoreError>;
    async fn delete_teacher(&self, id: i64) -> Result<(), CoreError>;
}

/// Domain-specific trait for student operations
#[async_trait]
pub trait StudentRepository {
    async fn add_student(&self, data: NewStudentData) -> Result<Student, CoreError>;
    async fn find_students(&self) -> Result<Vec<Student>, CoreError>;
    async fn find_student_by_id(&self, id: i64) -> Result<Option<Student>, CoreError>;
    async fn update_student(&self, id: i64, data: UpdateStudentData) -> Result<Student, CoreError>;
    async fn delete_student(&self, id: i64) -> Result<(), CoreError>;
}

/// Domain-specific trait for configured lessons and their enrollments
#[async_trait]
pub trait LessonRepository {
    /// Creates a lesson with its weekday pattern and the default look-ahead
    /// of occurrences, all in one transaction.
    async fn configure_lesson(
        &self,
        data: NewLessonData,
    ) -> Result<(Lesson, Vec<Occurrence>), CoreError>;
    async fn find_lessons(&self) -> Result<Vec<LessonQueryResult>, CoreError>;
    async fn find_lesson_by_id(&self, id: i64) -> Result<Option<LessonQueryResult>, CoreError>;
    async fn find_lesson_weekdays(&self, lesson_id: i64) -> Result<Vec<i64>, CoreError>;
    async fn delete_lesson(&self, id: i64) -> Result<(), CoreError>;
    async fn enroll_student(&self, lesson_id: i64, student_id: i64)
        -> Result<Enrollment, CoreError>;
    async fn withdraw_student(&self, lesson_id: i64, student_id: i64) -> Result<(), CoreError>;
    async fn find_lesson_students(&self, lesson_id: i64) -> Result<Vec<Student>, CoreError>;
}

/// Domain-specific trait for occurrence materialization and lifecycle
#[async_trait]
pub trait OccurrenceRepository {
    /// Materializes occurrences for a lesson's weekday pattern. Existing
    /// (lesson, date) pairs are skipped; only newly created rows are
    /// returned. `weeks` falls back to the configured look-ahead.
    async fn generate_occurrences(
        &self,
        lesson_id: i64,
        weeks: Option<u32>,
    ) -> Result<Vec<Occurrence>, CoreError>;
    async fn find_occurrence_by_id(&self, id: i64) -> Result<Option<Occurrence>, CoreError>;
    /// Lists a lesson's occurrences, optionally bounded by an inclusive date
    /// range, each joined with its most recent reschedule record.
    async fn find_occurrences(
        &self,
        lesson_id: i64,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<OccurrenceQueryResult>, CoreError>;
    async fn cancel_occurrence(&self, id: i64, reason: Option<String>)
        -> Result<Occurrence, CoreError>;
    async fn hold_occurrence(&self, id: i64) -> Result<Occurrence, CoreError>;
    /// Marks the source occurrence `rescheduled`, appends an audit record,
    /// and spawns a replacement `scheduled` occurrence at `new_date`.
    async fn reschedule_occurrence(
        &self,
        id: i64,
        new_date: NaiveDate,
        reason: Option<String>,
    ) -> Result<RescheduleResult, CoreError>;
    /// All occurrences in the Monday-to-Sunday week containing `anchor`
    /// (today when omitted), enriched with lesson and teacher context.
    async fn weekly_agenda(&self, anchor: Option<NaiveDate>) -> Result<WeeklyAgenda, CoreError>;
}

/// Domain-specific trait for payment operations
#[async_trait]
pub trait PaymentRepository {
    async fn add_payment(&self, data: NewPaymentData) -> Result<Payment, CoreError>;
    async fn find_payments(&self, filter: PaymentFilter) -> Result<Vec<Payment>, CoreError>;
    async fn find_payment_by_id(&self, id: i64) -> Result<Option<Payment>, CoreError>;
    /// Marks a payment paid, stamps the payment date, and computes the
    /// teacher revenue share from the student's most recent enrollment.
    async fn process_payment(&self, id: i64) -> Result<Payment, CoreError>;
    async fn cancel_payment(&self, id: i64) -> Result<Payment, CoreError>;
}

/// Domain-specific trait for dashboard aggregates
#[async_trait]
pub trait DashboardRepository {
    async fn dashboard_summary(&self) -> Result<DashboardSummary, CoreError>;
}

/// Main repository trait that composes all domain traits
#[async_trait]
pub trait Repository:
    TeacherRepository
    + StudentRepository
    + LessonRepository
    + OccurrenceRepository
    + PaymentRepository
    + DashboardRepository
{
    // This trait automatically composes all domain-specific repositories
    // Individual domain operations are defined in their respective traits
}

/// SQLite implementation of the repository pattern
pub struct SqliteRepository {
    pool: DbPool,
    schedule: ScheduleConfig,
}

impl SqliteRepository {
    pub fn new(pool: DbPool, schedule: ScheduleConfig) -> Self {
        Self { pool, schedule }
    }

    /// Get a reference to the database pool for internal use across modules
    pub(crate) fn pool(&self) -> &DbPool {
        &self.pool
    }

    /// Get the materialization settings for internal use
    pub(crate) fn schedule(&self) -> &ScheduleConfig {
        &self.schedule
    }
}

// The main Repository trait implementation will automatically be available
// when all domain trait implementations are defined
impl Repository for SqliteRepository {}

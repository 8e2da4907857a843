use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Shift {
    Morning,
    Afternoon,
    Evening,
}

#[derive(Error, Debug, PartialEq)]
#[error("Invalid shift: {0}")]
pub struct ParseShiftError(String);

impl FromStr for Shift {
    type Err = ParseShiftError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "morning" => Ok(Shift::Morning),
            "afternoon" => Ok(Shift::Afternoon),
            "evening" => Ok(Shift::Evening),
            _ => Err(ParseShiftError(s.to_string())),
        }
    }
}

impl std::fmt::Display for Shift {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Shift::Morning => write!(f, "morning"),
            Shift::Afternoon => write!(f, "afternoon"),
            Shift::Evening => write!(f, "evening"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OccurrenceStatus {
    Scheduled,
    Held,
    Cancelled,
    Rescheduled,
}

#[derive(Error, Debug, PartialEq)]
#[error("Invalid occurrence status: {0}")]
pub struct ParseOccurrenceStatusError(String);

impl FromStr for OccurrenceStatus {
    type Err = ParseOccurrenceStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "scheduled" => Ok(OccurrenceStatus::Scheduled),
            "held" => Ok(OccurrenceStatus::Held),
            "cancelled" => Ok(OccurrenceStatus::Cancelled),
            "rescheduled" => Ok(OccurrenceStatus::Rescheduled),
            _ => Err(ParseOccurrenceStatusError(s.to_string())),
        }
    }
}

impl std::fmt::Display for OccurrenceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OccurrenceStatus::Scheduled => write!(f, "scheduled"),
            OccurrenceStatus::Held => write!(f, "held"),
            OccurrenceStatus::Cancelled => write!(f, "cancelled"),
            OccurrenceStatus::Rescheduled => write!(f, "rescheduled"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Cancelled,
}

#[derive(Error, Debug, PartialEq)]
#[error("Invalid payment status: {0}")]
pub struct ParsePaymentStatusError(String);

impl FromStr for PaymentStatus {
    type Err = ParsePaymentStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(PaymentStatus::Pending),
            "paid" => Ok(PaymentStatus::Paid),
            "cancelled" => Ok(PaymentStatus::Cancelled),
            _ => Err(ParsePaymentStatusError(s.to_string())),
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentStatus::Pending => write!(f, "pending"),
            PaymentStatus::Paid => write!(f, "paid"),
            PaymentStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Teacher {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub specialty: Option<String>,
    pub max_students_per_slot: i64,
    pub revenue_share_percentage: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub instrument: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A recurring weekly class template. The weekday pattern lives in
/// `lesson_weekdays`; occurrences are materialized from it on demand.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
    pub id: i64,
    pub instrument: String,
    pub shift: Shift,
    pub teacher_id: i64,
    pub start_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

/// One concrete dated instance of a configured lesson.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Occurrence {
    pub id: i64,
    pub lesson_id: i64,
    pub date: NaiveDate,
    pub status: OccurrenceStatus,
    pub created_at: DateTime<Utc>,
}

/// Append-only audit record written when an occurrence is rescheduled.
/// The highest-id record per occurrence is the current one for reads.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Reschedule {
    pub id: i64,
    pub occurrence_id: i64,
    pub new_date: NaiveDate,
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Enrollment {
    pub lesson_id: i64,
    pub student_id: i64,
    pub enrolled_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: i64,
    pub student_id: i64,
    pub amount: f64,
    pub due_date: NaiveDate,
    pub status: PaymentStatus,
    pub paid_at: Option<NaiveDate>,
    pub revenue_share_amount: Option<f64>,
    pub created_at: DateTime<Utc>,
}

/// Lesson row joined with its teacher's name and the aggregated weekday set.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct LessonQueryResult {
    pub id: i64,
    pub instrument: String,
    pub shift: Shift,
    pub teacher_id: i64,
    pub teacher_name: String,
    pub start_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    /// GROUP_CONCAT of the lesson's weekdays, e.g. "1,3".
    pub weekdays: Option<String>,
}

impl LessonQueryResult {
    /// Parses the aggregated weekday column into a sorted list.
    pub fn weekday_list(&self) -> Vec<i64> {
        let mut days: Vec<i64> = self
            .weekdays
            .as_deref()
            .unwrap_or("")
            .split(',')
            .filter_map(|d| d.trim().parse().ok())
            .collect();
        days.sort_unstable();
        days
    }
}

/// Occurrence row joined with its most recent reschedule record, if any.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct OccurrenceQueryResult {
    pub id: i64,
    pub lesson_id: i64,
    pub date: NaiveDate,
    pub status: OccurrenceStatus,
    pub created_at: DateTime<Utc>,
    pub rescheduled_to: Option<NaiveDate>,
    pub reschedule_reason: Option<String>,
}

/// Agenda row: an occurrence enriched with lesson and teacher context.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AgendaEntry {
    pub id: i64,
    pub lesson_id: i64,
    pub date: NaiveDate,
    pub status: OccurrenceStatus,
    pub instrument: String,
    pub shift: Shift,
    pub teacher_name: String,
    pub teacher_specialty: Option<String>,
    pub rescheduled_to: Option<NaiveDate>,
    pub reschedule_reason: Option<String>,
}

/// Monday-to-Sunday agenda window with its occurrences.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyAgenda {
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
    pub occurrences: Vec<AgendaEntry>,
}

/// Result of rescheduling: the source occurrence (now `rescheduled`) and the
/// replacement spawned at the new date.
#[derive(Debug, Clone)]
pub struct RescheduleResult {
    pub source: Occurrence,
    pub replacement: Occurrence,
}

#[derive(Debug, Clone, Default)]
pub struct NewTeacherData {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub specialty: Option<String>,
    pub max_students_per_slot: Option<i64>,
    pub revenue_share_percentage: i64,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateTeacherData {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<Option<String>>,
    pub specialty: Option<Option<String>>,
    pub max_students_per_slot: Option<i64>,
    pub revenue_share_percentage: Option<i64>,
}

#[derive(Debug, Clone, Default)]
pub struct NewStudentData {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub instrument: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateStudentData {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<Option<String>>,
    pub birth_date: Option<Option<NaiveDate>>,
    pub instrument: Option<Option<String>>,
}

/// Data required to configure a recurring lesson. `shift` arrives as free
/// text and is validated against the enumerated values during configuration.
#[derive(Debug, Clone)]
pub struct NewLessonData {
    pub instrument: String,
    pub shift: String,
    pub teacher_id: i64,
    pub start_date: NaiveDate,
    pub weekdays: Vec<i64>,
}

#[derive(Debug, Clone)]
pub struct NewPaymentData {
    pub student_id: i64,
    pub amount: f64,
    pub due_date: NaiveDate,
}

/// Optional filters for listing payments.
#[derive(Debug, Clone, Default)]
pub struct PaymentFilter {
    pub student_id: Option<i64>,
    pub status: Option<PaymentStatus>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub teachers: i64,
    pub students: i64,
    pub lessons: i64,
    pub occurrences_this_week: i64,
    pub pending_payments: i64,
}

/// Configuration for occurrence materialization.
#[derive(Debug, Clone)]
pub struct ScheduleConfig {
    /// Default look-ahead window, in weeks, when none is supplied
    pub lookahead_weeks: u32,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self { lookahead_weeks: 4 }
    }
}

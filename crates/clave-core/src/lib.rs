//! # Clave Core Library
//!
//! Domain and persistence layer for a music-school administrative backend:
//! recurring lesson schedules, per-date occurrence materialization, occurrence
//! lifecycle (cancel / hold / reschedule), enrollments, and tuition payments
//! with teacher revenue sharing.
//!
//! ## Core Modules
//!
//! - [`db`]: Database connection and migration management
//! - [`models`]: Core data structures and transfer objects
//! - [`recurrence`]: Weekly recurrence expansion and calendar helpers
//! - [`repository`]: Data access layer with Repository pattern
//! - [`error`]: Error types shared across the crate
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use clave_core::{
//!     db,
//!     models::{NewLessonData, ScheduleConfig},
//!     repository::{LessonRepository, SqliteRepository},
//! };
//! use chrono::NaiveDate;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let pool = db::establish_connection("clave.db").await?;
//!     let repo = SqliteRepository::new(pool, ScheduleConfig::default());
//!
//!     // Configure a lesson running Mondays and Wednesdays
//!     let data = NewLessonData {
//!         instrument: "Piano".to_string(),
//!         shift: "morning".to_string(),
//!         teacher_id: 1,
//!         start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
//!         weekdays: vec![1, 3],
//!     };
//!
//!     let (lesson, occurrences) = repo.configure_lesson(data).await?;
//!     println!("lesson {} scheduled {} occurrences", lesson.id, occurrences.len());
//!
//!     Ok(())
//! }
//! ```

pub mod db;
pub mod error;
pub mod models;
pub mod recurrence;
pub mod repository;

use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

use crate::eligibility::{ChampionStatus, PeriodCounts};

#[derive(Debug, Clone)]
pub struct MealServiceDate {
    pub school_code: String,
    pub served_on: NaiveDate,
}

/// Persisted required counts for one school month, produced by the
/// bucketer and upserted keyed on (school_code, year, month).
#[derive(Debug, Clone)]
pub struct ChampionCriteria {
    pub school_code: String,
    pub year: i32,
    pub month: u32,
    pub counts: PeriodCounts,
}

#[derive(Debug, Clone)]
pub struct ActiveUser {
    pub user_id: Uuid,
    pub nickname: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserChampionRecord {
    pub user_id: Uuid,
    pub nickname: String,
    pub achieved: PeriodCounts,
    pub status: ChampionStatus,
}

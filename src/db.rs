use anyhow::Context;
use chrono::NaiveDate;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::calendar;
use crate::eligibility::{ChampionStatus, PeriodCounts};
use crate::models::{ActiveUser, ChampionCriteria, MealServiceDate};

pub async fn init_db(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

pub async fn seed(pool: &PgPool) -> anyhow::Result<()> {
    let school_code = "7081423";
    sqlx::query(
        r#"
        INSERT INTO champion_tracker.schools (code, name, office_code)
        VALUES ($1, $2, $3)
        ON CONFLICT (code) DO UPDATE
        SET name = EXCLUDED.name, office_code = EXCLUDED.office_code
        "#,
    )
    .bind(school_code)
    .bind("Hanbit Elementary")
    .bind("B10")
    .execute(pool)
    .await?;

    // Every school day of June 2025: weekdays minus Memorial Day.
    for day in 1..=30 {
        let served_on = NaiveDate::from_ymd_opt(2025, 6, day).context("invalid seed date")?;
        if calendar::is_weekend(served_on) || calendar::is_fixed_holiday(served_on) {
            continue;
        }
        sqlx::query(
            r#"
            INSERT INTO champion_tracker.meal_days (id, school_code, served_on)
            VALUES ($1, $2, $3)
            ON CONFLICT (school_code, served_on) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(school_code)
        .bind(served_on)
        .execute(pool)
        .await?;
    }

    let users = vec![
        (
            Uuid::parse_str("8f2a1c34-5b8e-4d2f-9c41-7a0d3e6b2f15")?,
            "dotori",
        ),
        (
            Uuid::parse_str("2e9b7d01-4c6a-48f3-b5d2-91e84a7c30ab")?,
            "songpyeon",
        ),
    ];

    for (id, nickname) in &users {
        sqlx::query(
            r#"
            INSERT INTO champion_tracker.users (id, nickname, school_code)
            VALUES ($1, $2, $3)
            ON CONFLICT (nickname) DO UPDATE
            SET school_code = EXCLUDED.school_code
            "#,
        )
        .bind(id)
        .bind(nickname)
        .bind(school_code)
        .execute(pool)
        .await?;
    }

    // dotori answers every quiz of week 1 correctly; songpyeon slips on
    // Thursday.
    let answers = vec![
        (users[0].0, 2, true),
        (users[0].0, 3, true),
        (users[0].0, 4, true),
        (users[0].0, 5, true),
        (users[0].0, 9, true),
        (users[0].0, 10, true),
        (users[1].0, 2, true),
        (users[1].0, 3, true),
        (users[1].0, 4, true),
        (users[1].0, 5, false),
    ];

    for (user_id, day, correct) in answers {
        let answered_on = NaiveDate::from_ymd_opt(2025, 6, day).context("invalid seed date")?;
        sqlx::query(
            r#"
            INSERT INTO champion_tracker.quiz_answers
            (id, user_id, school_code, answered_on, correct)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (user_id, answered_on) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(school_code)
        .bind(answered_on)
        .bind(correct)
        .execute(pool)
        .await?;
    }

    Ok(())
}

/// Meal-service dates for one school inside a half-open window. Callers
/// pass the month's lookahead window so boundary weeks resolve.
pub async fn fetch_meal_dates(
    pool: &PgPool,
    school_code: &str,
    window: (NaiveDate, NaiveDate),
) -> anyhow::Result<Vec<MealServiceDate>> {
    let rows = sqlx::query(
        r#"
        SELECT school_code, served_on
        FROM champion_tracker.meal_days
        WHERE school_code = $1 AND served_on >= $2 AND served_on < $3
        ORDER BY served_on
        "#,
    )
    .bind(school_code)
    .bind(window.0)
    .bind(window.1)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| MealServiceDate {
            school_code: row.get("school_code"),
            served_on: row.get("served_on"),
        })
        .collect())
}

pub async fn upsert_criteria(pool: &PgPool, criteria: &ChampionCriteria) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO champion_tracker.champion_criteria
        (school_code, year, month, week1, week2, week3, week4, week5, month_total, computed_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, now())
        ON CONFLICT (school_code, year, month) DO UPDATE
        SET week1 = EXCLUDED.week1,
            week2 = EXCLUDED.week2,
            week3 = EXCLUDED.week3,
            week4 = EXCLUDED.week4,
            week5 = EXCLUDED.week5,
            month_total = EXCLUDED.month_total,
            computed_at = EXCLUDED.computed_at
        "#,
    )
    .bind(&criteria.school_code)
    .bind(criteria.year)
    .bind(criteria.month as i32)
    .bind(criteria.counts.weeks[0])
    .bind(criteria.counts.weeks[1])
    .bind(criteria.counts.weeks[2])
    .bind(criteria.counts.weeks[3])
    .bind(criteria.counts.weeks[4])
    .bind(criteria.counts.month_total)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn fetch_criteria(
    pool: &PgPool,
    school_code: &str,
    year: i32,
    month: u32,
) -> anyhow::Result<Option<ChampionCriteria>> {
    let row = sqlx::query(
        r#"
        SELECT week1, week2, week3, week4, week5, month_total
        FROM champion_tracker.champion_criteria
        WHERE school_code = $1 AND year = $2 AND month = $3
        "#,
    )
    .bind(school_code)
    .bind(year)
    .bind(month as i32)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|row| ChampionCriteria {
        school_code: school_code.to_string(),
        year,
        month,
        counts: PeriodCounts {
            weeks: [
                row.get("week1"),
                row.get("week2"),
                row.get("week3"),
                row.get("week4"),
                row.get("week5"),
            ],
            month_total: row.get("month_total"),
        },
    }))
}

/// Users with at least one quiz answer for this school inside the window.
pub async fn fetch_active_users(
    pool: &PgPool,
    school_code: &str,
    window: (NaiveDate, NaiveDate),
) -> anyhow::Result<Vec<ActiveUser>> {
    let rows = sqlx::query(
        r#"
        SELECT DISTINCT u.id, u.nickname
        FROM champion_tracker.quiz_answers a
        JOIN champion_tracker.users u ON u.id = a.user_id
        WHERE a.school_code = $1 AND a.answered_on >= $2 AND a.answered_on < $3
        ORDER BY u.nickname
        "#,
    )
    .bind(school_code)
    .bind(window.0)
    .bind(window.1)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| ActiveUser {
            user_id: row.get("id"),
            nickname: row.get("nickname"),
        })
        .collect())
}

pub async fn fetch_nickname(pool: &PgPool, user_id: Uuid) -> anyhow::Result<String> {
    let row = sqlx::query("SELECT nickname FROM champion_tracker.users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await?
        .with_context(|| format!("no user with id {user_id}"))?;
    Ok(row.get("nickname"))
}

pub async fn fetch_correct_answer_dates(
    pool: &PgPool,
    user_id: Uuid,
    school_code: &str,
    window: (NaiveDate, NaiveDate),
) -> anyhow::Result<Vec<NaiveDate>> {
    let rows = sqlx::query(
        r#"
        SELECT answered_on
        FROM champion_tracker.quiz_answers
        WHERE user_id = $1 AND school_code = $2
          AND correct AND answered_on >= $3 AND answered_on < $4
        ORDER BY answered_on
        "#,
    )
    .bind(user_id)
    .bind(school_code)
    .bind(window.0)
    .bind(window.1)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(|row| row.get("answered_on")).collect())
}

pub async fn upsert_champion_record(
    pool: &PgPool,
    user_id: Uuid,
    school_code: &str,
    year: i32,
    month: u32,
    status: &ChampionStatus,
) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO champion_tracker.champion_records
        (user_id, school_code, year, month,
         week1, week2, week3, week4, week5, month_champion, evaluated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, now())
        ON CONFLICT (user_id, school_code, year, month) DO UPDATE
        SET week1 = EXCLUDED.week1,
            week2 = EXCLUDED.week2,
            week3 = EXCLUDED.week3,
            week4 = EXCLUDED.week4,
            week5 = EXCLUDED.week5,
            month_champion = EXCLUDED.month_champion,
            evaluated_at = EXCLUDED.evaluated_at
        "#,
    )
    .bind(user_id)
    .bind(school_code)
    .bind(year)
    .bind(month as i32)
    .bind(status.weeks[0])
    .bind(status.weeks[1])
    .bind(status.weeks[2])
    .bind(status.weeks[3])
    .bind(status.weeks[4])
    .bind(status.month_champion)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn import_csv(pool: &PgPool, csv_path: &std::path::Path) -> anyhow::Result<usize> {
    #[derive(serde::Deserialize)]
    struct CsvRow {
        school_code: String,
        school_name: String,
        served_on: NaiveDate,
    }

    let mut reader = csv::Reader::from_path(csv_path)?;
    let mut inserted = 0usize;

    for result in reader.deserialize::<CsvRow>() {
        let row = result?;
        sqlx::query(
            r#"
            INSERT INTO champion_tracker.schools (code, name)
            VALUES ($1, $2)
            ON CONFLICT (code) DO UPDATE
            SET name = EXCLUDED.name
            "#,
        )
        .bind(&row.school_code)
        .bind(&row.school_name)
        .execute(pool)
        .await?;

        let result = sqlx::query(
            r#"
            INSERT INTO champion_tracker.meal_days (id, school_code, served_on)
            VALUES ($1, $2, $3)
            ON CONFLICT (school_code, served_on) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&row.school_code)
        .bind(row.served_on)
        .execute(pool)
        .await?;

        if result.rows_affected() > 0 {
            inserted += 1;
        }
    }

    Ok(inserted)
}

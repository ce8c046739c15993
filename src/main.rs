use std::collections::BTreeSet;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

mod bucket;
mod calendar;
mod db;
mod eligibility;
mod error;
mod models;
mod report;

use bucket::BucketOptions;
use models::{ActiveUser, ChampionCriteria, UserChampionRecord};

#[derive(Parser)]
#[command(name = "champion-tracker")]
#[command(about = "Weekly and monthly champion tracker for Meal Battle", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the database schema
    InitDb,
    /// Load realistic seed data
    Seed,
    /// Import meal-service dates from a CSV file
    Import {
        #[arg(long)]
        csv: PathBuf,
    },
    /// Compute and store a month's champion criteria from its meal days
    Criteria {
        #[arg(long)]
        school: String,
        #[arg(long)]
        year: i32,
        #[arg(long)]
        month: u32,
        /// Keep Saturdays and Sundays in the buckets
        #[arg(long)]
        keep_weekends: bool,
        /// Keep fixed public holidays in the buckets
        #[arg(long)]
        keep_holidays: bool,
        #[arg(long)]
        json: bool,
    },
    /// Evaluate champion status against stored criteria
    Evaluate {
        #[arg(long)]
        school: String,
        #[arg(long)]
        year: i32,
        #[arg(long)]
        month: u32,
        /// Evaluate a single user instead of everyone with answers
        #[arg(long)]
        user: Option<Uuid>,
        #[arg(long)]
        keep_weekends: bool,
        #[arg(long)]
        keep_holidays: bool,
        #[arg(long)]
        json: bool,
    },
    /// Generate a markdown report
    Report {
        #[arg(long)]
        school: String,
        #[arg(long)]
        year: i32,
        #[arg(long)]
        month: u32,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
}

fn bucket_options(keep_weekends: bool, keep_holidays: bool) -> BucketOptions {
    BucketOptions {
        exclude_weekends: !keep_weekends,
        exclude_fixed_holidays: !keep_holidays,
        include_month_total: true,
    }
}

async fn compute_criteria(
    pool: &PgPool,
    school: &str,
    year: i32,
    month: u32,
    options: BucketOptions,
) -> anyhow::Result<ChampionCriteria> {
    let window = calendar::lookahead_window(year, month)?;
    let meal_days = db::fetch_meal_dates(pool, school, window).await?;
    let dates: BTreeSet<_> = meal_days.iter().map(|day| day.served_on).collect();
    let buckets = bucket::bucket_meal_days(year, month, &dates, options)?;

    Ok(ChampionCriteria {
        school_code: school.to_string(),
        year,
        month,
        counts: eligibility::PeriodCounts::from_buckets(&buckets),
    })
}

async fn evaluate_users(
    pool: &PgPool,
    criteria: &ChampionCriteria,
    users: &[ActiveUser],
    options: BucketOptions,
) -> anyhow::Result<Vec<UserChampionRecord>> {
    let window = calendar::lookahead_window(criteria.year, criteria.month)?;
    let mut records = Vec::with_capacity(users.len());

    for user in users {
        let answer_dates = db::fetch_correct_answer_dates(
            pool,
            user.user_id,
            &criteria.school_code,
            window,
        )
        .await?;
        let dates: BTreeSet<_> = answer_dates.into_iter().collect();
        let buckets = bucket::bucket_meal_days(criteria.year, criteria.month, &dates, options)?;
        let achieved = eligibility::PeriodCounts::from_buckets(&buckets);
        let status = eligibility::evaluate(&criteria.counts, &achieved)?;

        records.push(UserChampionRecord {
            user_id: user.user_id,
            nickname: user.nickname.clone(),
            achieved,
            status,
        });
    }

    Ok(records)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let database_url = std::env::var("DATABASE_URL")
        .context("DATABASE_URL must be set to a production Postgres instance")?;

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .context("failed to connect to Postgres")?;

    match cli.command {
        Commands::InitDb => {
            db::init_db(&pool).await?;
            println!("Schema ready.");
        }
        Commands::Seed => {
            db::seed(&pool).await?;
            println!("Seed data inserted.");
        }
        Commands::Import { csv } => {
            let inserted = db::import_csv(&pool, &csv).await?;
            println!("Inserted {inserted} meal days from {}.", csv.display());
        }
        Commands::Criteria {
            school,
            year,
            month,
            keep_weekends,
            keep_holidays,
            json,
        } => {
            let options = bucket_options(keep_weekends, keep_holidays);
            let criteria = compute_criteria(&pool, &school, year, month, options).await?;
            db::upsert_criteria(&pool, &criteria).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&criteria.counts)?);
            } else {
                println!("Criteria for school {school}, {year}-{month:02}:");
                for (i, required) in criteria.counts.weeks.iter().enumerate() {
                    println!("- week {}: {} meal days", i + 1, required);
                }
                println!("- month total: {} meal days", criteria.counts.month_total);
            }
        }
        Commands::Evaluate {
            school,
            year,
            month,
            user,
            keep_weekends,
            keep_holidays,
            json,
        } => {
            let criteria = db::fetch_criteria(&pool, &school, year, month)
                .await?
                .with_context(|| {
                    format!("no criteria stored for school {school}, {year}-{month:02}; run `criteria` first")
                })?;

            let users = match user {
                Some(user_id) => vec![ActiveUser {
                    user_id,
                    nickname: db::fetch_nickname(&pool, user_id).await?,
                }],
                None => {
                    let window = calendar::lookahead_window(year, month)?;
                    db::fetch_active_users(&pool, &school, window).await?
                }
            };

            if users.is_empty() {
                println!("No quiz answers found for this month.");
                return Ok(());
            }

            let options = bucket_options(keep_weekends, keep_holidays);
            let records = evaluate_users(&pool, &criteria, &users, options).await?;

            for record in &records {
                db::upsert_champion_record(
                    &pool,
                    record.user_id,
                    &school,
                    year,
                    month,
                    &record.status,
                )
                .await?;
            }

            if json {
                println!("{}", serde_json::to_string_pretty(&records)?);
            } else {
                for record in &records {
                    let weeks: Vec<String> = record
                        .status
                        .weeks
                        .iter()
                        .enumerate()
                        .filter(|(_, &won)| won)
                        .map(|(i, _)| format!("week {}", i + 1))
                        .collect();
                    let weeks_label = if weeks.is_empty() {
                        "no champion weeks".to_string()
                    } else {
                        weeks.join(", ")
                    };
                    println!(
                        "- {} ({} of {} correct): {}{}",
                        record.nickname,
                        record.achieved.month_total,
                        criteria.counts.month_total,
                        weeks_label,
                        if record.status.month_champion {
                            " (month champion)"
                        } else {
                            ""
                        }
                    );
                }
            }
        }
        Commands::Report {
            school,
            year,
            month,
            out,
        } => {
            let criteria = db::fetch_criteria(&pool, &school, year, month)
                .await?
                .with_context(|| {
                    format!("no criteria stored for school {school}, {year}-{month:02}; run `criteria` first")
                })?;
            let window = calendar::lookahead_window(year, month)?;
            let users = db::fetch_active_users(&pool, &school, window).await?;
            let records =
                evaluate_users(&pool, &criteria, &users, BucketOptions::default()).await?;
            let report = report::build_report(&criteria, &records);
            std::fs::write(&out, report)?;
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}

use std::fmt::Write;

use crate::models::{ChampionCriteria, UserChampionRecord};

fn week_list(record: &UserChampionRecord) -> String {
    let weeks: Vec<String> = record
        .status
        .weeks
        .iter()
        .enumerate()
        .filter(|(_, &won)| won)
        .map(|(i, _)| format!("week {}", i + 1))
        .collect();

    if weeks.is_empty() {
        "no champion weeks".to_string()
    } else {
        weeks.join(", ")
    }
}

pub fn build_report(criteria: &ChampionCriteria, records: &[UserChampionRecord]) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Meal Battle Champion Report");
    let _ = writeln!(
        output,
        "School {} for {}-{:02}",
        criteria.school_code, criteria.year, criteria.month
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Weekly Criteria");

    for (i, required) in criteria.counts.weeks.iter().enumerate() {
        let _ = writeln!(output, "- week {}: {} meal days", i + 1, required);
    }
    let _ = writeln!(output, "- month total: {} meal days", criteria.counts.month_total);

    let _ = writeln!(output);
    let _ = writeln!(output, "## Champions");

    let champions: Vec<&UserChampionRecord> =
        records.iter().filter(|r| r.status.any()).collect();
    if champions.is_empty() {
        let _ = writeln!(output, "No champions this month.");
    } else {
        for record in &champions {
            let month_note = if record.status.month_champion {
                " (month champion)"
            } else {
                ""
            };
            let _ = writeln!(
                output,
                "- {}: {}{}",
                record.nickname,
                week_list(record),
                month_note
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Standings");

    if records.is_empty() {
        let _ = writeln!(output, "No quiz answers recorded for this month.");
    } else {
        for record in records {
            let _ = writeln!(
                output,
                "- {}: {} of {} correct answers",
                record.nickname,
                record.achieved.month_total,
                criteria.counts.month_total
            );
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eligibility::{ChampionStatus, PeriodCounts};
    use uuid::Uuid;

    #[test]
    fn report_lists_criteria_and_champions() {
        let criteria = ChampionCriteria {
            school_code: "7081423".to_string(),
            year: 2025,
            month: 6,
            counts: PeriodCounts {
                weeks: [4, 5, 5, 5, 1],
                month_total: 20,
            },
        };
        let records = vec![UserChampionRecord {
            user_id: Uuid::new_v4(),
            nickname: "dotori".to_string(),
            achieved: PeriodCounts {
                weeks: [4, 2, 0, 0, 0],
                month_total: 6,
            },
            status: ChampionStatus {
                weeks: [true, false, false, false, false],
                month_champion: false,
            },
        }];

        let report = build_report(&criteria, &records);
        assert!(report.contains("School 7081423 for 2025-06"));
        assert!(report.contains("- week 1: 4 meal days"));
        assert!(report.contains("- dotori: week 1"));
        assert!(report.contains("- dotori: 6 of 20 correct answers"));
    }
}

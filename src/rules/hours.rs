use super::{RuleKind, ViolationRecord};
use crate::config::RuleOptions;
use crate::timeline::Timeline;
use chrono::{Datelike, Duration, NaiveDate};

/// Semaine alignée sur le lundi : (lundi, bloc du premier jour vu, heures).
struct Week {
    monday: NaiveDate,
    block: u8,
    hours: u32,
}

fn weeks(timeline: &Timeline) -> Vec<Week> {
    let mut out: Vec<Week> = Vec::new();
    for day in &timeline.days {
        let monday = day.date - Duration::days(i64::from(day.date.weekday().num_days_from_monday()));
        match out.last_mut() {
            Some(week) if week.monday == monday => week.hours += day.total_hours,
            _ => out.push(Week {
                monday,
                block: day.block,
                hours: day.total_hours,
            }),
        }
    }
    out
}

/// Moyenne glissante sur `averaging_weeks` semaines consécutives.
pub(super) fn weekly_average(timeline: &Timeline, opts: &RuleOptions) -> Vec<ViolationRecord> {
    let span = opts.averaging_weeks.max(1);
    weeks(timeline)
        .windows(span)
        .filter_map(|window| {
            let total: u32 = window.iter().map(|w| w.hours).sum();
            let avg = f64::from(total) / span as f64;
            if avg <= opts.max_weekly_avg_hours {
                return None;
            }
            let first = &window[0];
            let last = &window[span - 1];
            Some(ViolationRecord::new(
                RuleKind::WeeklyAverage,
                timeline,
                first.block,
                first.monday,
                last.monday + Duration::days(6),
                Some(avg),
                format!(
                    "{avg:.1}h/week averaged over {span} weeks (limit {}h)",
                    opts.max_weekly_avg_hours
                ),
            ))
        })
        .collect()
}

/// Plafond 24h (+4h de transmission) par journée.
pub(super) fn max_duty(timeline: &Timeline, opts: &RuleOptions) -> Vec<ViolationRecord> {
    timeline
        .days
        .iter()
        .filter(|day| day.total_hours > opts.max_daily_hours)
        .map(|day| {
            ViolationRecord::new(
                RuleKind::MaxDuty,
                timeline,
                day.block,
                day.date,
                day.date,
                Some(f64::from(day.total_hours)),
                format!(
                    "{}h of duty on one day (limit {}h + 4h handoff)",
                    day.total_hours, opts.max_daily_hours
                ),
            )
        })
        .collect()
}

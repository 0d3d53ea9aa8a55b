//! Contrôle des limites de temps de travail sur les timelines.
//!
//! Six règles indépendantes, évaluées sur la même timeline pour chaque fellow.
//! Déterministe, sans état : deux appels sur les mêmes entrées donnent la même liste.

mod hours;
mod rest;
mod streaks;

use crate::calendar::BlockCalendar;
use crate::config::{ProgramConfig, RuleOptions};
use crate::model::{Fellow, ScheduleSet, Severity, Vacation};
use crate::timeline::{self, Timeline};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RuleKind {
    #[serde(rename = "80hr_weekly_avg")]
    WeeklyAverage,
    #[serde(rename = "24_plus_4_max_duty")]
    MaxDuty,
    #[serde(rename = "8hr_between_shifts")]
    InterShiftRest,
    #[serde(rename = "1_day_off_in_7")]
    DayOffInSeven,
    #[serde(rename = "6_consecutive_nights")]
    ConsecutiveNights,
    #[serde(rename = "14hr_post_call")]
    PostCallRest,
}

impl RuleKind {
    pub const ALL: [RuleKind; 6] = [
        RuleKind::WeeklyAverage,
        RuleKind::MaxDuty,
        RuleKind::InterShiftRest,
        RuleKind::DayOffInSeven,
        RuleKind::ConsecutiveNights,
        RuleKind::PostCallRest,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RuleKind::WeeklyAverage => "80hr_weekly_avg",
            RuleKind::MaxDuty => "24_plus_4_max_duty",
            RuleKind::InterShiftRest => "8hr_between_shifts",
            RuleKind::DayOffInSeven => "1_day_off_in_7",
            RuleKind::ConsecutiveNights => "6_consecutive_nights",
            RuleKind::PostCallRest => "14hr_post_call",
        }
    }

    pub fn severity(self) -> Severity {
        match self {
            RuleKind::InterShiftRest | RuleKind::PostCallRest => Severity::Warn,
            _ => Severity::Error,
        }
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Constat de dépassement d'une règle pour un fellow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViolationRecord {
    pub rule: RuleKind,
    pub severity: Severity,
    pub fellow: String,
    pub block: Option<u8>,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub hours: Option<f64>,
    pub detail: String,
}

impl ViolationRecord {
    pub(crate) fn new(
        rule: RuleKind,
        timeline: &Timeline,
        block: u8,
        start: NaiveDate,
        end: NaiveDate,
        hours: Option<f64>,
        detail: String,
    ) -> Self {
        Self {
            rule,
            severity: rule.severity(),
            fellow: timeline.fellow.clone(),
            block: Some(block),
            start,
            end,
            hours,
            detail,
        }
    }

    /// Même règle, même fellow, même date de début.
    pub fn same_finding(&self, other: &ViolationRecord) -> bool {
        self.rule == other.rule && self.fellow == other.fellow && self.start == other.start
    }
}

/// Évalue les six règles sur une timeline.
pub fn check_timeline(timeline: &Timeline, opts: &RuleOptions) -> Vec<ViolationRecord> {
    let mut out = Vec::new();
    out.extend(hours::weekly_average(timeline, opts));
    out.extend(hours::max_duty(timeline, opts));
    out.extend(rest::between_shifts(timeline, opts));
    out.extend(streaks::days_off(timeline, opts));
    out.extend(streaks::consecutive_nights(timeline, opts));
    out.extend(rest::post_call(timeline, opts));
    sort_violations(&mut out);
    out
}

/// Évalue un sous-ensemble de fellows (utilisé pour les hypothèses de remédiation).
pub fn check_fellows(
    fellows: &[&str],
    schedules: &ScheduleSet,
    calendar: &BlockCalendar,
    vacations: &[Vacation],
    config: &ProgramConfig,
) -> Vec<ViolationRecord> {
    let mut out: Vec<ViolationRecord> = fellows
        .iter()
        .flat_map(|name| {
            let blocks = timeline::vacation_blocks(name, vacations);
            let timeline = timeline::build(name, schedules, calendar, &blocks, config);
            check_timeline(&timeline, &config.rules)
        })
        .collect();
    sort_violations(&mut out);
    out
}

/// Contrôle de tout le roster, trié par date puis par fellow.
pub fn check(
    fellows: &[Fellow],
    schedules: &ScheduleSet,
    calendar: &BlockCalendar,
    vacations: &[Vacation],
    config: &ProgramConfig,
) -> Vec<ViolationRecord> {
    let names: Vec<&str> = fellows.iter().map(|f| f.name.as_str()).collect();
    let out = check_fellows(&names, schedules, calendar, vacations, config);
    tracing::debug!(fellows = names.len(), violations = out.len(), "compliance check");
    out
}

fn sort_violations(out: &mut [ViolationRecord]) {
    out.sort_by(|a, b| {
        a.start
            .cmp(&b.start)
            .then_with(|| a.fellow.cmp(&b.fellow))
            .then_with(|| a.rule.cmp(&b.rule))
            .then_with(|| a.end.cmp(&b.end))
    });
}

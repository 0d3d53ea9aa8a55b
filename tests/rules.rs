#![forbid(unsafe_code)]
mod common;

use chrono::Duration;
use common::{calendar, date, fellows, rotations};
use gardes::rules::{check, check_timeline};
use gardes::{
    DayEntry, DutySchedule, ProgramConfig, RuleKind, RuleOptions, ScheduleSet, Severity,
    ShiftSource, ShiftSpan, ShiftTemplate, Timeline,
};

const DAY12: ShiftTemplate = ShiftTemplate::day(7, 19, 12, false);
const DAY11: ShiftTemplate = ShiftTemplate::day(7, 18, 11, false);
const DAY13: ShiftTemplate = ShiftTemplate::day(6, 19, 13, false);
const NIGHT: ShiftTemplate = ShiftTemplate::night(19, 7, 12);

fn span(template: ShiftTemplate) -> ShiftSpan {
    ShiftSpan::from_template(ShiftSource::Rotation("Synthetic".into()), template)
}

/// Timeline synthétique à partir du lundi 2025-07-07 ; un jour = liste de postes.
fn synthetic(days: Vec<Vec<ShiftTemplate>>) -> Timeline {
    let start = date(2025, 7, 7);
    let entries = days
        .into_iter()
        .enumerate()
        .map(|(idx, shifts)| {
            let mut entry = DayEntry::new(start + Duration::days(idx as i64), (idx / 14 + 1) as u8);
            for t in shifts {
                entry.push(span(t));
            }
            entry
        })
        .collect();
    Timeline::new("Dr Synth", entries)
}

fn of_kind(timeline: &Timeline, kind: RuleKind) -> Vec<gardes::ViolationRecord> {
    check_timeline(timeline, &RuleOptions::default())
        .into_iter()
        .filter(|v| v.rule == kind)
        .collect()
}

fn weeks_of(days_per_week: Vec<ShiftTemplate>, weeks: usize) -> Vec<Vec<ShiftTemplate>> {
    (0..weeks)
        .flat_map(|_| days_per_week.iter().map(|t| vec![*t]).collect::<Vec<_>>())
        .collect()
}

#[test]
fn eighty_five_hour_weeks_break_the_average() {
    let week = vec![DAY12, DAY12, DAY12, DAY12, DAY12, DAY12, DAY13];
    let tl = synthetic(weeks_of(week, 4));
    let found = of_kind(&tl, RuleKind::WeeklyAverage);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].hours, Some(85.0));
    assert_eq!(found[0].severity, Severity::Error);
    assert_eq!(found[0].start, date(2025, 7, 7));
    assert_eq!(found[0].end, date(2025, 8, 3));
}

#[test]
fn seventy_nine_hour_weeks_are_fine() {
    let week = vec![DAY11, DAY11, DAY11, DAY11, DAY11, DAY11, DAY13];
    let tl = synthetic(weeks_of(week, 4));
    assert!(of_kind(&tl, RuleKind::WeeklyAverage).is_empty());
}

#[test]
fn seven_nights_make_one_streak_violation() {
    let mut days: Vec<Vec<ShiftTemplate>> = vec![vec![NIGHT]; 7];
    days.push(vec![]);
    days.extend(vec![vec![NIGHT]; 3]);
    let tl = synthetic(days);

    let found = of_kind(&tl, RuleKind::ConsecutiveNights);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].start, date(2025, 7, 7));
    assert_eq!(found[0].end, date(2025, 7, 13));
}

#[test]
fn trailing_night_streak_is_reported() {
    let mut days: Vec<Vec<ShiftTemplate>> = vec![vec![]; 3];
    days.extend(vec![vec![NIGHT]; 8]);
    let tl = synthetic(days);

    let found = of_kind(&tl, RuleKind::ConsecutiveNights);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].start, date(2025, 7, 10));
    assert_eq!(found[0].end, date(2025, 7, 17));
}

#[test]
fn six_nights_are_allowed() {
    let tl = synthetic(vec![vec![NIGHT]; 6]);
    assert!(of_kind(&tl, RuleKind::ConsecutiveNights).is_empty());
}

#[test]
fn more_than_twenty_four_hours_in_a_day() {
    let tl = synthetic(vec![
        vec![DAY12, DAY12, ShiftTemplate::day(19, 23, 4, false)],
        vec![],
        vec![DAY12, DAY12],
    ]);
    let found = of_kind(&tl, RuleKind::MaxDuty);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].hours, Some(28.0));
}

#[test]
fn night_then_morning_shift_is_short_rest() {
    let tl = synthetic(vec![vec![NIGHT], vec![DAY12], vec![DAY12]]);
    let found = of_kind(&tl, RuleKind::InterShiftRest);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].severity, Severity::Warn);
    assert_eq!(found[0].hours, Some(0.0));
    assert_eq!(found[0].start, date(2025, 7, 7));
    assert_eq!(found[0].end, date(2025, 7, 8));
}

#[test]
fn post_call_day_needs_late_start() {
    let late = ShiftTemplate::day(14, 22, 8, false);
    let tl = synthetic(vec![
        vec![DAY12, DAY12],
        vec![DAY12],
        vec![],
        vec![DAY12, DAY12],
        vec![late],
    ]);
    let found = of_kind(&tl, RuleKind::PostCallRest);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].start, date(2025, 7, 7));
    assert_eq!(found[0].hours, Some(7.0));
}

#[test]
fn overlapping_day_off_windows_are_merged() {
    let mut days: Vec<Vec<ShiftTemplate>> = vec![vec![DAY12]; 35];
    days.extend(vec![vec![]; 21]);
    let tl = synthetic(days);

    let found = of_kind(&tl, RuleKind::DayOffInSeven);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].start, date(2025, 7, 7));
    assert_eq!(found[0].end, date(2025, 7, 7) + Duration::days(37));
}

#[test]
fn four_days_off_per_window_is_enough() {
    let week = vec![DAY12, DAY12, DAY12, DAY12, DAY12, DAY12];
    let mut days = Vec::new();
    for _ in 0..8 {
        days.extend(week.iter().map(|t| vec![*t]));
        days.push(vec![]);
    }
    let tl = synthetic(days);
    assert!(of_kind(&tl, RuleKind::DayOffInSeven).is_empty());
}

#[test]
fn check_is_idempotent_and_sorted() {
    let fellows = fellows();
    let set = ScheduleSet {
        rotations: rotations(&fellows),
        call: DutySchedule::empty(26),
        float: DutySchedule::empty(26),
    };
    let cal = calendar();
    let config = ProgramConfig::default();

    let first = check(&fellows, &set, &cal, &[], &config);
    let second = check(&fellows, &set, &cal, &[], &config);
    assert!(!first.is_empty());
    assert_eq!(first, second);
    for pair in first.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        assert!((a.start, &a.fellow) <= (b.start, &b.fellow));
    }
}

#[test]
fn rule_names_match_report_format() {
    let names: Vec<&str> = RuleKind::ALL.iter().map(|k| k.as_str()).collect();
    assert_eq!(
        names,
        [
            "80hr_weekly_avg",
            "24_plus_4_max_duty",
            "8hr_between_shifts",
            "1_day_off_in_7",
            "6_consecutive_nights",
            "14hr_post_call"
        ]
    );
    assert_eq!(
        serde_json::to_string(&RuleKind::ConsecutiveNights).unwrap(),
        "\"6_consecutive_nights\""
    );
}

#![forbid(unsafe_code)]
mod common;

use common::{calendar, date, row};
use gardes::timeline::{build, vacation_blocks};
use gardes::{
    DutySchedule, DutySlot, ProgramConfig, RotationSchedule, ScheduleSet, ShiftSource, Vacation,
    VacationStatus, WeekendKey,
};
use std::collections::BTreeSet;

fn schedules(labels: &[(usize, &str)]) -> ScheduleSet {
    let mut rotations = RotationSchedule::new();
    rotations.insert("Dr A", row(labels));
    ScheduleSet {
        rotations,
        call: DutySchedule::empty(26),
        float: DutySchedule::empty(26),
    }
}

#[test]
fn weekends_start_on_first_saturday() {
    let cal = calendar();
    let block = cal.get(0).unwrap();
    assert_eq!(block.weekend_saturday(1), date(2025, 7, 12));
    assert_eq!(block.weekend_saturday(2), date(2025, 7, 19));
}

#[test]
fn timeline_spans_whole_calendar() {
    let set = schedules(&[]);
    let tl = build("Dr A", &set, &calendar(), &BTreeSet::new(), &ProgramConfig::default());
    assert_eq!(tl.days.len(), 26 * 14);
    assert_eq!(tl.days[0].date, date(2025, 7, 7));
    assert_eq!(tl.total_hours(), 0);
}

#[test]
fn icu_runs_daily_and_floor_only_on_weekdays() {
    let set = schedules(&[(1, "ICU"), (2, "Floor-A")]);
    let tl = build("Dr A", &set, &calendar(), &BTreeSet::new(), &ProgramConfig::default());

    let icu: u32 = tl.days.iter().filter(|d| d.block == 1).map(|d| d.total_hours).sum();
    assert_eq!(icu, 14 * 12);
    let floor: u32 = tl.days.iter().filter(|d| d.block == 2).map(|d| d.total_hours).sum();
    assert_eq!(floor, 10 * 12);
    assert!(tl.day(date(2025, 7, 26)).unwrap().is_off());
}

#[test]
fn call_and_float_stack_on_rotation_hours() {
    let mut set = schedules(&[(1, "ICU")]);
    set.call.set(WeekendKey::new(1, 1), DutySlot::assigned("Dr A", false));
    set.float.set(WeekendKey::new(1, 2), DutySlot::assigned("Dr A", false));
    let tl = build("Dr A", &set, &calendar(), &BTreeSet::new(), &ProgramConfig::default());

    let saturday = tl.day(date(2025, 7, 12)).unwrap();
    assert_eq!(saturday.total_hours, 24);
    assert!(saturday.shifts.iter().any(|s| s.source == ShiftSource::Call));
    assert_eq!(tl.day(date(2025, 7, 13)).unwrap().total_hours, 24);

    let float_night = tl.day(date(2025, 7, 19)).unwrap();
    assert_eq!(float_night.total_hours, 24);
    assert!(float_night.is_night);
    assert_eq!(tl.day(date(2025, 7, 20)).unwrap().total_hours, 12);
}

#[test]
fn approved_vacation_suppresses_rotation_but_not_call() {
    let mut set = schedules(&[(1, "ICU")]);
    set.call.set(WeekendKey::new(1, 1), DutySlot::assigned("Dr A", false));
    let vacations = vec![Vacation::approved("Dr A", 1, 1)];
    let blocks = vacation_blocks("Dr A", &vacations);
    let tl = build("Dr A", &set, &calendar(), &blocks, &ProgramConfig::default());

    assert!(tl.day(date(2025, 7, 7)).unwrap().is_off());
    assert_eq!(tl.day(date(2025, 7, 12)).unwrap().total_hours, 12);
}

#[test]
fn pending_or_other_leave_keeps_rotation() {
    let mut pending = Vacation::approved("Dr A", 1, 2);
    pending.status = VacationStatus::Pending;
    let mut conference = Vacation::approved("Dr A", 3, 3);
    conference.reason = "Conference".to_string();
    let other = Vacation::approved("Dr B", 4, 4);
    assert!(vacation_blocks("Dr A", &[pending, conference, other]).is_empty());
}

#[test]
fn vacation_label_and_empty_cells_produce_no_shift() {
    let set = schedules(&[(1, "Vacation")]);
    let tl = build("Dr A", &set, &calendar(), &BTreeSet::new(), &ProgramConfig::default());
    assert_eq!(tl.total_hours(), 0);
}

#[test]
fn unknown_rotation_falls_back_to_weekday_day_shift() {
    let set = schedules(&[(1, "Consults")]);
    let tl = build("Dr A", &set, &calendar(), &BTreeSet::new(), &ProgramConfig::default());
    let monday = tl.day(date(2025, 7, 7)).unwrap();
    assert_eq!(monday.total_hours, 8);
    assert_eq!(monday.earliest_start(), Some(8));
    assert!(tl.day(date(2025, 7, 12)).unwrap().is_off());
}

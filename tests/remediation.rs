#![forbid(unsafe_code)]
mod common;

use common::{calendar, date, row};
use gardes::remediation::{suggest, RemediationContext};
use gardes::rules::check;
use gardes::{
    DutyKind, DutySchedule, DutySlot, Edit, Fellow, PgyLevel, ProgramConfig, RotationSchedule,
    RuleKind, ScheduleSet, ViolationRecord, WeekendKey,
};

fn roster() -> Vec<Fellow> {
    vec![
        Fellow::new("Dr A", PgyLevel::Pgy5),
        Fellow::new("Dr B", PgyLevel::Pgy5),
    ]
}

fn find(violations: &[ViolationRecord], rule: RuleKind, fellow: &str) -> ViolationRecord {
    violations
        .iter()
        .find(|v| v.rule == rule && v.fellow == fellow)
        .cloned()
        .unwrap_or_else(|| panic!("no {rule} violation for {fellow}"))
}

#[test]
fn rotation_swap_clears_short_rest() {
    // Nights en bloc 3 puis ICU dès le lundi suivant
    let fellows = roster();
    let mut rotations = RotationSchedule::new();
    rotations.insert("Dr A", row(&[(3, "Nights"), (4, "ICU")]));
    rotations.insert("Dr B", row(&[(3, "Research")]));
    let set = ScheduleSet {
        rotations,
        call: DutySchedule::empty(26),
        float: DutySchedule::empty(26),
    };
    let cal = calendar();
    let config = ProgramConfig::default();

    let violations = check(&fellows, &set, &cal, &[], &config);
    let short_rest = find(&violations, RuleKind::InterShiftRest, "Dr A");
    assert_eq!(short_rest.start, date(2025, 8, 17));
    assert_eq!(short_rest.block, Some(3));

    let ctx = RemediationContext {
        fellows: &fellows,
        schedules: &set,
        calendar: &cal,
        vacations: &[],
        config: &config,
    };
    let before = set.clone();
    let suggestions = suggest(&short_rest, &ctx);
    assert_eq!(set, before);

    let swap = suggestions
        .iter()
        .find(|s| {
            s.edit
                == Edit::RotationSwap {
                    block: 3,
                    fellow: "Dr A".into(),
                    other: "Dr B".into(),
                }
        })
        .expect("swap suggested");
    assert!(swap.net_change <= 0);
    assert_eq!(swap.net_change, -3);
}

#[test]
fn call_reassignment_clears_post_call_rest() {
    let fellows = roster();
    let mut rotations = RotationSchedule::new();
    rotations.insert("Dr A", row(&[(3, "ICU")]));
    rotations.insert("Dr B", row(&[(3, "Research")]));
    let mut call = DutySchedule::empty(26);
    call.set(WeekendKey::new(3, 1), DutySlot::assigned("Dr A", false));
    let set = ScheduleSet {
        rotations,
        call,
        float: DutySchedule::empty(26),
    };
    let cal = calendar();
    let config = ProgramConfig::default();

    let violations = check(&fellows, &set, &cal, &[], &config);
    let post_call = find(&violations, RuleKind::PostCallRest, "Dr A");
    assert_eq!(post_call.start, date(2025, 8, 9));

    let ctx = RemediationContext {
        fellows: &fellows,
        schedules: &set,
        calendar: &cal,
        vacations: &[],
        config: &config,
    };
    let suggestions = suggest(&post_call, &ctx);
    assert!(suggestions.len() <= config.max_suggestions);
    assert!(suggestions.windows(2).all(|w| w[0].net_change <= w[1].net_change));

    let reassign = suggestions
        .iter()
        .find(|s| {
            s.edit
                == Edit::Reassign {
                    duty: DutyKind::Call,
                    key: WeekendKey::new(3, 1),
                    from: "Dr A".into(),
                    to: "Dr B".into(),
                }
        })
        .expect("reassignment suggested");
    assert!(reassign.net_change < 0);
}

#[test]
fn unknown_fellow_yields_no_suggestion() {
    let fellows = roster();
    let set = ScheduleSet {
        rotations: RotationSchedule::new(),
        call: DutySchedule::empty(26),
        float: DutySchedule::empty(26),
    };
    let cal = calendar();
    let config = ProgramConfig::default();
    let violation = ViolationRecord {
        rule: RuleKind::MaxDuty,
        severity: gardes::Severity::Error,
        fellow: "Dr Nobody".into(),
        block: Some(1),
        start: date(2025, 7, 7),
        end: date(2025, 7, 7),
        hours: Some(30.0),
        detail: String::new(),
    };
    let ctx = RemediationContext {
        fellows: &fellows,
        schedules: &set,
        calendar: &cal,
        vacations: &[],
        config: &config,
    };
    assert!(suggest(&violation, &ctx).is_empty());
}

#[test]
fn applying_a_swap_exchanges_labels() {
    let mut set = ScheduleSet {
        rotations: RotationSchedule::new(),
        call: DutySchedule::empty(26),
        float: DutySchedule::empty(26),
    };
    set.rotations.insert("Dr A", row(&[(2, "ICU")]));
    set.rotations.insert("Dr B", row(&[(2, "Clinic")]));

    let edit = Edit::RotationSwap {
        block: 2,
        fellow: "Dr A".into(),
        other: "Dr B".into(),
    };
    gardes::scheduler::apply_edit(&mut set, &edit).unwrap();
    assert_eq!(set.rotations.label("Dr A", 1), "Clinic");
    assert_eq!(set.rotations.label("Dr B", 1), "ICU");

    let stale = Edit::Reassign {
        duty: DutyKind::Float,
        key: WeekendKey::new(2, 1),
        from: "Dr A".into(),
        to: "Dr B".into(),
    };
    assert!(gardes::scheduler::apply_edit(&mut set, &stale).is_err());
    assert_eq!(set.float.assignee(WeekendKey::new(2, 1)), None);
}

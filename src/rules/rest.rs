use super::{RuleKind, ViolationRecord};
use crate::config::RuleOptions;
use crate::timeline::{DayEntry, Timeline};
use chrono::Duration;

/// Paires de jours calendaires consécutifs de la timeline.
fn consecutive_days(timeline: &Timeline) -> impl Iterator<Item = (&DayEntry, &DayEntry)> {
    timeline
        .days
        .windows(2)
        .map(|pair| (&pair[0], &pair[1]))
        .filter(|(a, b)| b.date - a.date == Duration::days(1))
}

/// Repos minimal entre la fin de service d'un jour et le début du lendemain.
/// Un poste de nuit se termine le lendemain matin.
pub(super) fn between_shifts(timeline: &Timeline, opts: &RuleOptions) -> Vec<ViolationRecord> {
    consecutive_days(timeline)
        .filter_map(|(prev, next)| {
            let end = i64::from(prev.latest_end()?);
            let start = 24 + i64::from(next.earliest_start()?);
            let gap = start - end;
            if gap >= opts.min_rest_hours {
                return None;
            }
            Some(ViolationRecord::new(
                RuleKind::InterShiftRest,
                timeline,
                prev.block,
                prev.date,
                next.date,
                Some(gap as f64),
                format!(
                    "{gap}h rest between shifts on {} and {} (minimum {}h)",
                    prev.date, next.date, opts.min_rest_hours
                ),
            ))
        })
        .collect()
}

/// Après une journée de 24h ou plus, le lendemain ne peut commencer avant 14h.
pub(super) fn post_call(timeline: &Timeline, opts: &RuleOptions) -> Vec<ViolationRecord> {
    consecutive_days(timeline)
        .filter(|(prev, _)| prev.total_hours >= opts.post_call_threshold_hours)
        .filter_map(|(prev, next)| {
            let start = next.earliest_start()?;
            if start >= opts.post_call_rest_hours {
                return None;
            }
            Some(ViolationRecord::new(
                RuleKind::PostCallRest,
                timeline,
                prev.block,
                prev.date,
                next.date,
                Some(f64::from(start)),
                format!(
                    "{}h call on {} followed by a shift at {start}:00 on {} (needs {}h off)",
                    prev.total_hours, prev.date, next.date, opts.post_call_rest_hours
                ),
            ))
        })
        .collect()
}

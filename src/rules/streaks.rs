use super::{RuleKind, ViolationRecord};
use crate::config::RuleOptions;
use crate::timeline::Timeline;
use chrono::Duration;

/// Jours de repos sur fenêtre glissante ; les fenêtres fautives qui se chevauchent
/// sont fusionnées en un seul constat.
pub(super) fn days_off(timeline: &Timeline, opts: &RuleOptions) -> Vec<ViolationRecord> {
    let window = opts.day_off_window_days.max(1);
    let days = &timeline.days;
    if days.len() < window {
        return Vec::new();
    }

    // (premier index, dernier index, minimum de jours off)
    let mut groups: Vec<(usize, usize, usize)> = Vec::new();
    for start in 0..=days.len() - window {
        let off = days[start..start + window].iter().filter(|d| d.is_off()).count();
        if off >= opts.min_days_off {
            continue;
        }
        let end = start + window - 1;
        match groups.last_mut() {
            Some(group) if start <= group.1 => {
                group.1 = end;
                group.2 = group.2.min(off);
            }
            _ => groups.push((start, end, off)),
        }
    }

    groups
        .into_iter()
        .map(|(first, last, fewest)| {
            let (from, to) = (&days[first], &days[last]);
            ViolationRecord::new(
                RuleKind::DayOffInSeven,
                timeline,
                from.block,
                from.date,
                to.date,
                None,
                format!(
                    "only {fewest} day(s) off in a {window}-day window (minimum {})",
                    opts.min_days_off
                ),
            )
        })
        .collect()
}

/// Séries de nuits consécutives au-delà du maximum, série finale comprise.
pub(super) fn consecutive_nights(timeline: &Timeline, opts: &RuleOptions) -> Vec<ViolationRecord> {
    let days = &timeline.days;
    let mut out = Vec::new();
    let mut streak: Option<(usize, usize)> = None;

    let close = |streak: Option<(usize, usize)>, out: &mut Vec<ViolationRecord>| {
        let Some((first, last)) = streak else {
            return;
        };
        let length = last - first + 1;
        if length <= opts.max_consecutive_nights {
            return;
        }
        out.push(ViolationRecord::new(
            RuleKind::ConsecutiveNights,
            timeline,
            days[first].block,
            days[first].date,
            days[last].date,
            None,
            format!(
                "{length} consecutive nights (maximum {})",
                opts.max_consecutive_nights
            ),
        ));
    };

    for (idx, day) in days.iter().enumerate() {
        if !day.is_night {
            close(streak.take(), &mut out);
            continue;
        }
        streak = match streak {
            Some((first, last)) if day.date - days[last].date == Duration::days(1) => {
                Some((first, idx))
            }
            previous => {
                close(previous, &mut out);
                Some((idx, idx))
            }
        };
    }
    close(streak, &mut out);

    out
}

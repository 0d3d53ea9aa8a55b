use super::eligibility::Eligibility;
use super::util::{load_ratio, pick_candidate, target_of, Trial};
use super::{relax, AssignOutcome, AssignRequest, RelaxationPolicy};
use crate::model::{DutyKind, Fellow, WeekendKey, NIGHTS};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::BTreeSet;

pub(super) fn assign<R: Rng>(req: &AssignRequest<'_>, rng: &mut R) -> AssignOutcome {
    let fellows = roster_fellows(req);
    let blocks = req.calendar.len();
    if blocks != req.config.block_count {
        tracing::warn!(
            calendar = blocks,
            configured = req.config.block_count,
            "calendar length differs from configured block count"
        );
    }
    let elig = Eligibility::new(req);

    let mut best: Option<Trial> = None;
    for attempt in 0..req.attempts.max(1) {
        let mut trial = Trial::empty(blocks, &fellows);
        fill_floats_strict(req, &elig, &fellows, &mut trial, rng);
        fill_calls_strict(req, &elig, &fellows, &mut trial, rng);

        let score = trial.score();
        tracing::debug!(attempt, score, "strict trial");
        if best.as_ref().map_or(true, |b| score < b.score()) {
            best = Some(trial);
        }
        if score == 0 {
            break;
        }
    }
    let mut trial = best.unwrap_or_else(|| Trial::empty(blocks, &fellows));

    let mut issues = relax::fill_missing(req, &elig, &fellows, &mut trial, rng);
    issues.extend(relax::floats_before_floor(&elig, &trial));

    tracing::info!(
        missing_call = trial.missing(DutyKind::Call),
        missing_float = trial.missing(DutyKind::Float),
        issues = issues.len(),
        "call/float assignment done"
    );

    AssignOutcome {
        call_counts: trial.call_counts,
        float_counts: trial.float_counts,
        call: trial.call,
        float: trial.float,
        issues,
    }
}

/// Fellows présents dans la grille de rotations, dans l'ordre alphabétique.
fn roster_fellows(req: &AssignRequest<'_>) -> Vec<Fellow> {
    let mut fellows: Vec<Fellow> = req
        .fellows
        .iter()
        .filter(|f| {
            let known = req.rotations.row(&f.name).is_some();
            if !known {
                tracing::warn!(fellow = %f.name, "fellow has no rotation row, skipped");
            }
            known
        })
        .cloned()
        .collect();
    fellows.sort_by(|a, b| a.name.cmp(&b.name));
    fellows.dedup_by(|a, b| a.name == b.name);
    fellows
}

fn fill_floats_strict<R: Rng>(
    req: &AssignRequest<'_>,
    elig: &Eligibility<'_>,
    fellows: &[Fellow],
    trial: &mut Trial,
    rng: &mut R,
) {
    for block in 0..req.calendar.len() {
        let number = block_number(block);
        let nights = req
            .rotations
            .first_with(NIGHTS, block)
            .and_then(|name| fellows.iter().find(|f| f.name == name));

        for weekend in [1u8, 2] {
            let key = WeekendKey::new(number, weekend);
            let open = |trial: &Trial, f: &Fellow| {
                elig.admits(DutyKind::Float, RelaxationPolicy::StrictFill, &f.name, block)
                    && trial.count(DutyKind::Float, &f.name) < target_of(req.float_targets, f)
                    && !trial.float.holds_adjacent(&f.name, key)
            };

            // le float du W2 revient de préférence au fellow de Nights
            if weekend == 2 {
                if let Some(fellow) = nights.filter(|f| open(&*trial, *f)) {
                    trial.assign(DutyKind::Float, key, &fellow.name, false);
                    continue;
                }
            }

            let current: &Trial = trial;
            let picked = pick_candidate(
                fellows,
                rng,
                |f| open(current, f),
                |f| {
                    load_ratio(
                        current.count(DutyKind::Float, &f.name),
                        target_of(req.float_targets, f),
                    ) - elig.float_preference(&f.name, block)
                },
            );
            if let Some(fellow) = picked {
                trial.assign(DutyKind::Float, key, &fellow.name, false);
            }
        }
    }
}

fn fill_calls_strict<R: Rng>(
    req: &AssignRequest<'_>,
    elig: &Eligibility<'_>,
    fellows: &[Fellow],
    trial: &mut Trial,
    rng: &mut R,
) {
    for block in 0..req.calendar.len() {
        let number = block_number(block);
        let mut order = [1u8, 2];
        order.shuffle(rng);
        let mut used: BTreeSet<String> = BTreeSet::new();

        for weekend in order {
            let key = WeekendKey::new(number, weekend);
            let current: &Trial = trial;
            let picked = pick_candidate(
                fellows,
                rng,
                |f| {
                    elig.admits(DutyKind::Call, RelaxationPolicy::StrictFill, &f.name, block)
                        && current.count(DutyKind::Call, &f.name) < target_of(req.call_targets, f)
                        && !used.contains(&f.name)
                        && !current.call.holds_adjacent(&f.name, key)
                },
                |f| {
                    load_ratio(
                        current.count(DutyKind::Call, &f.name),
                        target_of(req.call_targets, f),
                    )
                },
            );
            if let Some(fellow) = picked {
                used.insert(fellow.name.clone());
                trial.assign(DutyKind::Call, key, &fellow.name, false);
            }
        }
    }
}

pub(super) fn block_number(block_idx: usize) -> u8 {
    u8::try_from(block_idx + 1).unwrap_or(u8::MAX)
}

use crate::model::{DutyKind, DutySchedule, DutySlot, Fellow, Targets, WeekendKey};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::BTreeMap;

/// Amplitude du bruit ajouté aux scores pour départager les candidats.
const JITTER: f64 = 0.05;

/// Un essai de remplissage : plannings et compteurs courants.
#[derive(Debug, Clone)]
pub(super) struct Trial {
    pub call: DutySchedule,
    pub float: DutySchedule,
    pub call_counts: BTreeMap<String, u32>,
    pub float_counts: BTreeMap<String, u32>,
}

impl Trial {
    pub fn empty(blocks: usize, fellows: &[Fellow]) -> Self {
        let zero: BTreeMap<String, u32> = fellows.iter().map(|f| (f.name.clone(), 0)).collect();
        Self {
            call: DutySchedule::empty(blocks),
            float: DutySchedule::empty(blocks),
            call_counts: zero.clone(),
            float_counts: zero,
        }
    }

    pub fn schedule(&self, kind: DutyKind) -> &DutySchedule {
        match kind {
            DutyKind::Call => &self.call,
            DutyKind::Float => &self.float,
        }
    }

    pub fn count(&self, kind: DutyKind, fellow: &str) -> u32 {
        let counts = match kind {
            DutyKind::Call => &self.call_counts,
            DutyKind::Float => &self.float_counts,
        };
        counts.get(fellow).copied().unwrap_or(0)
    }

    pub fn assign(&mut self, kind: DutyKind, key: WeekendKey, fellow: &str, relaxed: bool) {
        let (schedule, counts) = match kind {
            DutyKind::Call => (&mut self.call, &mut self.call_counts),
            DutyKind::Float => (&mut self.float, &mut self.float_counts),
        };
        schedule.set(key, DutySlot::assigned(fellow, relaxed));
        *counts.entry(fellow.to_string()).or_insert(0) += 1;
    }

    pub fn missing(&self, kind: DutyKind) -> usize {
        self.schedule(kind).empty_keys().count()
    }

    /// Les gardes non pourvues pèsent bien plus lourd que les floats.
    pub fn score(&self) -> usize {
        self.missing(DutyKind::Call) * 500 + self.missing(DutyKind::Float) * 80
    }
}

pub(super) fn target_of(targets: &Targets, fellow: &Fellow) -> u32 {
    targets.get(&fellow.pgy).copied().unwrap_or(0)
}

/// Charge relative ; un objectif nul compte comme 1 pour rester défini.
pub(super) fn load_ratio(count: u32, target: u32) -> f64 {
    f64::from(count) / f64::from(target.max(1))
}

/// Mélange les candidats, filtre, et retient le plus petit score (+ bruit).
pub(super) fn pick_candidate<'f, R, F, S>(
    fellows: &'f [Fellow],
    rng: &mut R,
    mut eligible: F,
    mut score: S,
) -> Option<&'f Fellow>
where
    R: Rng,
    F: FnMut(&Fellow) -> bool,
    S: FnMut(&Fellow) -> f64,
{
    let mut pool: Vec<&Fellow> = fellows.iter().collect();
    pool.shuffle(rng);

    let mut best: Option<(f64, &Fellow)> = None;
    for fellow in pool.into_iter().filter(|f| eligible(f)) {
        let value = score(fellow) + rng.gen_range(0.0..JITTER);
        if best.map_or(true, |(b, _)| value.total_cmp(&b).is_lt()) {
            best = Some((value, fellow));
        }
    }
    best.map(|(_, fellow)| fellow)
}

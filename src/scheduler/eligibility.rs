use super::{AssignRequest, RelaxationPolicy};
use crate::calendar::BlockCalendar;
use crate::config::ProgramConfig;
use crate::model::{DutyKind, PgyLevel, RotationSchedule, FLOOR_A, FLOOR_B, ICU, NIGHTS};
use chrono::Duration;
use std::collections::{BTreeMap, BTreeSet};

/// Blocs couverts par les fenêtres d'examen (index 0-based).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExamWindows {
    hard: BTreeSet<usize>,
    soft: BTreeSet<usize>,
}

impl ExamWindows {
    pub fn resolve(config: &ProgramConfig, calendar: &BlockCalendar) -> Self {
        let mut windows = Self::default();
        for exam in &config.board_exams {
            let Some(exam_block) = calendar.block_of(*exam) else {
                tracing::debug!(%exam, "board exam outside calendar, ignored");
                continue;
            };
            let exam_idx = exam_block.index();
            windows
                .hard
                .extend(exam_idx.saturating_sub(config.exam_hard_window_blocks)..=exam_idx);

            let soft_start = *exam - Duration::weeks(config.exam_soft_window_weeks);
            windows.soft.extend(
                calendar
                    .blocks()
                    .iter()
                    .filter(|b| b.end >= soft_start && b.start <= *exam)
                    .map(|b| b.index()),
            );
        }
        windows
    }

    pub fn is_hard(&self, block_idx: usize) -> bool {
        self.hard.contains(&block_idx)
    }

    pub fn is_soft(&self, block_idx: usize) -> bool {
        self.soft.contains(&block_idx)
    }
}

/// Prédicats d'éligibilité ; fonctions pures du fellow, du bloc et des rotations.
pub(super) struct Eligibility<'a> {
    rotations: &'a RotationSchedule,
    config: &'a ProgramConfig,
    pgy: BTreeMap<&'a str, PgyLevel>,
    windows: ExamWindows,
}

const CALL_BLOCKING: [&str; 3] = [NIGHTS, FLOOR_A, FLOOR_B];
const FLOAT_BLOCKING: [&str; 3] = [ICU, FLOOR_A, FLOOR_B];
const FLOORS: [&str; 2] = [FLOOR_A, FLOOR_B];

impl<'a> Eligibility<'a> {
    pub fn new(req: &AssignRequest<'a>) -> Self {
        Self {
            rotations: req.rotations,
            config: req.config,
            pgy: req
                .fellows
                .iter()
                .map(|f| (f.name.as_str(), f.pgy))
                .collect(),
            windows: ExamWindows::resolve(req.config, req.calendar),
        }
    }

    pub fn pgy(&self, fellow: &str) -> Option<PgyLevel> {
        self.pgy.get(fellow).copied()
    }

    fn label(&self, fellow: &str, block: usize) -> &str {
        self.rotations.label(fellow, block)
    }

    fn in_hard_window(&self, fellow: &str, block: usize) -> bool {
        self.pgy(fellow) == Some(PgyLevel::Pgy6) && self.windows.is_hard(block)
    }

    pub fn in_soft_window(&self, fellow: &str, block: usize) -> bool {
        self.pgy(fellow) == Some(PgyLevel::Pgy6) && self.windows.is_soft(block)
    }

    /// Floor-A/B effectué dans un bloc strictement antérieur.
    pub fn completed_floor_before(&self, fellow: &str, block: usize) -> bool {
        self.rotations.held_any(fellow, &FLOORS, 0..block)
    }

    /// Éligibilité d'un fellow à une garde ou un float sous une politique donnée.
    pub fn admits(
        &self,
        kind: DutyKind,
        policy: RelaxationPolicy,
        fellow: &str,
        block: usize,
    ) -> bool {
        match (kind, policy.uses_strict_eligibility()) {
            (DutyKind::Call, true) => self.call_strict(fellow, block),
            (DutyKind::Call, false) => self.call_relaxed(fellow, block),
            (DutyKind::Float, true) => self.float_strict(fellow, block),
            (DutyKind::Float, false) => self.float_relaxed(fellow, block),
        }
    }

    fn call_base(&self, fellow: &str, block: usize) -> bool {
        let Some(pgy) = self.pgy(fellow) else {
            return false;
        };
        if CALL_BLOCKING.contains(&self.label(fellow, block)) {
            return false;
        }
        if pgy == PgyLevel::Pgy6
            && (self.in_hard_window(fellow, block) || block < self.config.pgy6_call_start_block)
        {
            return false;
        }
        true
    }

    fn call_strict(&self, fellow: &str, block: usize) -> bool {
        if !self.call_base(fellow, block) {
            return false;
        }
        // un PGY-4 doit être passé par l'ICU (bloc courant compris)
        if self.pgy(fellow) == Some(PgyLevel::Pgy4)
            && !self.rotations.held_any(fellow, &[ICU], 0..block + 1)
        {
            return false;
        }
        self.label(fellow, block + 1) != NIGHTS
    }

    fn call_relaxed(&self, fellow: &str, block: usize) -> bool {
        self.call_base(fellow, block)
    }

    fn float_relaxed(&self, fellow: &str, block: usize) -> bool {
        let Some(pgy) = self.pgy(fellow) else {
            return false;
        };
        if FLOAT_BLOCKING.contains(&self.label(fellow, block)) {
            return false;
        }
        if pgy == PgyLevel::Pgy6 {
            if self.in_hard_window(fellow, block) {
                return false;
            }
            if block < self.config.late_float_blocks
                && self.config.late_float_fellows.iter().any(|n| n == fellow)
            {
                return false;
            }
        }
        true
    }

    fn float_strict(&self, fellow: &str, block: usize) -> bool {
        if !self.float_relaxed(fellow, block) {
            return false;
        }
        self.pgy(fellow) != Some(PgyLevel::Pgy4) || self.completed_floor_before(fellow, block)
    }

    /// Bonus de préférence pour le float (rotation légère), moins la pénalité
    /// de fenêtre d'examen souple.
    pub fn float_preference(&self, fellow: &str, block: usize) -> f64 {
        let mut bonus = 0.0;
        if self.config.is_light_rotation(self.label(fellow, block)) {
            bonus += 0.25;
        }
        if self.in_soft_window(fellow, block) {
            bonus -= 0.25;
        }
        bonus
    }
}

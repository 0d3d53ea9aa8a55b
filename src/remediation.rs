use crate::calendar::BlockCalendar;
use crate::config::ProgramConfig;
use crate::model::{DutyKind, Fellow, ScheduleSet, Vacation, WeekendKey};
use crate::rules::{self, ViolationRecord};
use crate::scheduler::{self, Edit};
use serde::Serialize;
use std::collections::BTreeMap;

/// Tout ce qu'il faut pour réévaluer une hypothèse.
#[derive(Debug, Clone, Copy)]
pub struct RemediationContext<'a> {
    pub fellows: &'a [Fellow],
    pub schedules: &'a ScheduleSet,
    pub calendar: &'a BlockCalendar,
    pub vacations: &'a [Vacation],
    pub config: &'a ProgramConfig,
}

/// Modification candidate ; `net_change` < 0 réduit le nombre de violations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Suggestion {
    pub edit: Edit,
    pub net_change: i64,
    pub description: String,
}

/// Cherche des modifications uniques qui font disparaître `violation` sans
/// aggraver le total des deux fellows concernés. Liste vide si rien ne convient.
pub fn suggest(violation: &ViolationRecord, ctx: &RemediationContext<'_>) -> Vec<Suggestion> {
    let fellow = violation.fellow.as_str();
    if !ctx.fellows.iter().any(|f| f.name == fellow) {
        return Vec::new();
    }
    let Some(block) = violation
        .block
        .or_else(|| ctx.calendar.block_of(violation.start).map(|b| b.number))
    else {
        return Vec::new();
    };

    let mut search = Search::new(violation, ctx);
    let mut out = Vec::new();

    let block_idx = usize::from(block).saturating_sub(1);
    for other in ctx.fellows.iter().filter(|f| f.name != fellow) {
        let mine = ctx.schedules.rotations.label(fellow, block_idx);
        let theirs = ctx.schedules.rotations.label(&other.name, block_idx);
        if mine == theirs {
            continue;
        }
        let edit = Edit::RotationSwap {
            block,
            fellow: fellow.to_string(),
            other: other.name.clone(),
        };
        out.extend(search.evaluate(edit, &other.name));
    }

    for duty in [DutyKind::Call, DutyKind::Float] {
        let keys: Vec<WeekendKey> = ctx
            .schedules
            .duty(duty)
            .keys_held_by(fellow)
            .filter(|k| k.block.abs_diff(block) <= 1)
            .collect();
        for key in keys {
            for other in ctx.fellows.iter().filter(|f| f.name != fellow) {
                let edit = Edit::Reassign {
                    duty,
                    key,
                    from: fellow.to_string(),
                    to: other.name.clone(),
                };
                out.extend(search.evaluate(edit, &other.name));
            }
        }
    }

    out.sort_by_key(|s| s.net_change);
    out.truncate(ctx.config.max_suggestions);
    tracing::debug!(rule = %violation.rule, fellow, found = out.len(), "remediation search");
    out
}

struct Search<'v, 'a> {
    violation: &'v ViolationRecord,
    ctx: &'v RemediationContext<'a>,
    baseline: BTreeMap<String, usize>,
}

impl<'v, 'a> Search<'v, 'a> {
    fn new(violation: &'v ViolationRecord, ctx: &'v RemediationContext<'a>) -> Self {
        Self {
            violation,
            ctx,
            baseline: BTreeMap::new(),
        }
    }

    fn baseline_count(&mut self, fellow: &str) -> usize {
        if let Some(count) = self.baseline.get(fellow) {
            return *count;
        }
        let count = self.violations_for(&[fellow], self.ctx.schedules).len();
        self.baseline.insert(fellow.to_string(), count);
        count
    }

    fn violations_for(&self, fellows: &[&str], schedules: &ScheduleSet) -> Vec<ViolationRecord> {
        rules::check_fellows(
            fellows,
            schedules,
            self.ctx.calendar,
            self.ctx.vacations,
            self.ctx.config,
        )
    }

    /// Applique `edit` sur une copie et l'accepte si la violation disparaît
    /// sans que le total de la paire augmente.
    fn evaluate(&mut self, edit: Edit, other: &str) -> Option<Suggestion> {
        let mut hypothetical = self.ctx.schedules.clone();
        scheduler::apply_edit(&mut hypothetical, &edit).ok()?;

        let fellow = self.violation.fellow.clone();
        let before = self.baseline_count(&fellow) + self.baseline_count(other);
        let after = self.violations_for(&[fellow.as_str(), other], &hypothetical);

        if after.iter().any(|v| v.same_finding(self.violation)) || after.len() > before {
            return None;
        }
        let net_change = after.len() as i64 - before as i64;
        Some(Suggestion {
            description: format!("{edit} (net change {net_change:+})"),
            edit,
            net_change,
        })
    }
}

use super::eligibility::Eligibility;
use super::util::{load_ratio, pick_candidate, target_of, Trial};
use super::{AssignRequest, AssignmentIssue, IssueRule, RelaxationPolicy};
use crate::model::{DutyKind, Fellow, PgyLevel, Severity, WeekendKey};
use rand::Rng;

/// Remplit les cases restées vides en appliquant les politiques d'escalade dans l'ordre.
pub(super) fn fill_missing<R: Rng>(
    req: &AssignRequest<'_>,
    elig: &Eligibility<'_>,
    fellows: &[Fellow],
    trial: &mut Trial,
    rng: &mut R,
) -> Vec<AssignmentIssue> {
    let mut issues = Vec::new();

    for kind in [DutyKind::Call, DutyKind::Float] {
        let missing: Vec<WeekendKey> = trial.schedule(kind).empty_keys().collect();
        for key in missing {
            let current: &Trial = trial;
            let filled = RelaxationPolicy::ESCALATION.iter().find_map(|policy| {
                pick_relaxed(req, elig, fellows, current, kind, key, *policy, rng)
                    .map(|fellow| (*policy, fellow))
            });

            match filled {
                Some((policy, fellow)) => {
                    trial.assign(kind, key, &fellow.name, true);
                    let Some(rule) = policy.issue_rule() else {
                        continue;
                    };
                    tracing::debug!(%key, duty = %kind, fellow = %fellow.name, %rule, "relaxed fill");
                    issues.push(AssignmentIssue {
                        duty: kind,
                        severity: Severity::Warn,
                        fellow: Some(fellow.name.clone()),
                        key,
                        rule,
                        detail: relaxed_detail(kind, key, fellow, rule),
                    });
                }
                None => {
                    let (rule, severity) = match kind {
                        DutyKind::Call => (IssueRule::MissingCall, Severity::Error),
                        DutyKind::Float => (IssueRule::MissingFloat, Severity::Warn),
                    };
                    tracing::debug!(%key, duty = %kind, "no candidate after all relaxations");
                    issues.push(AssignmentIssue {
                        duty: kind,
                        severity,
                        fellow: None,
                        key,
                        rule,
                        detail: format!("{kind} {key} left unfilled: no candidate after relaxation"),
                    });
                }
            }
        }
    }

    issues
}

#[allow(clippy::too_many_arguments)]
fn pick_relaxed<'f, R: Rng>(
    req: &AssignRequest<'_>,
    elig: &Eligibility<'_>,
    fellows: &'f [Fellow],
    trial: &Trial,
    kind: DutyKind,
    key: WeekendKey,
    policy: RelaxationPolicy,
    rng: &mut R,
) -> Option<&'f Fellow> {
    let block = key.block_index();
    let targets = match kind {
        DutyKind::Call => req.call_targets,
        DutyKind::Float => req.float_targets,
    };

    pick_candidate(
        fellows,
        rng,
        |f| {
            if !elig.admits(kind, policy, &f.name, block) {
                return false;
            }
            let under = trial.count(kind, &f.name) < target_of(targets, f);
            // un PGY-6 ne dépasse jamais son objectif de gardes
            let may_exceed = policy.may_exceed_target()
                && !(kind == DutyKind::Call && f.pgy == PgyLevel::Pgy6);
            if !under && !may_exceed {
                return false;
            }
            !policy.enforces_adjacency() || !trial.schedule(kind).holds_adjacent(&f.name, key)
        },
        |f| load_ratio(trial.count(kind, &f.name), target_of(targets, f)),
    )
}

fn relaxed_detail(kind: DutyKind, key: WeekendKey, fellow: &Fellow, rule: IssueRule) -> String {
    let what = match rule {
        IssueRule::RelaxedFallback => "relaxed eligibility",
        IssueRule::OverTarget => "count target exceeded",
        IssueRule::IgnoreAdjacency => "adjacency rule ignored",
        _ => "relaxed rule",
    };
    format!("{kind} {key} assigned to {} ({}): {what}", fellow.name, fellow.pgy)
}

/// Floats attribués à un PGY-4 avant tout passage en Floor-A/B.
pub(super) fn floats_before_floor(elig: &Eligibility<'_>, trial: &Trial) -> Vec<AssignmentIssue> {
    trial
        .float
        .iter()
        .filter_map(|(key, slot)| {
            let name = slot.name.as_deref()?;
            if elig.pgy(name) != Some(PgyLevel::Pgy4)
                || elig.completed_floor_before(name, key.block_index())
            {
                return None;
            }
            Some(AssignmentIssue {
                duty: DutyKind::Float,
                severity: Severity::Warn,
                fellow: Some(name.to_string()),
                key,
                rule: IssueRule::FloatBeforeFloor,
                detail: format!("float {key} assigned to PGY-4 {name} before any floor rotation"),
            })
        })
        .collect()
}

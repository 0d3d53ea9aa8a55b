mod assignment;
mod eligibility;
mod mutate;
mod relax;
mod types;
mod util;

pub use eligibility::ExamWindows;
pub use types::{
    AssignOutcome, AssignRequest, AssignmentIssue, Edit, IssueRule, RelaxationPolicy, SchedError,
};

use crate::model::ScheduleSet;
use rand::Rng;

/// Répartit gardes et floats sur tous les week-ends du calendrier.
///
/// Plusieurs essais stricts aléatoires sont tirés ; le meilleur (gardes manquantes
/// ×500, floats manquants ×80) est complété par les politiques de relâchement.
/// N'échoue jamais : les cases impossibles sont signalées dans `issues`.
/// Toute l'aléa passe par `rng` : une même graine redonne le même résultat.
pub fn assign<R: Rng>(req: &AssignRequest<'_>, rng: &mut R) -> AssignOutcome {
    assignment::assign(req, rng)
}

/// Applique une modification (échange de rotations ou réattribution).
pub fn apply_edit(schedules: &mut ScheduleSet, edit: &Edit) -> Result<(), SchedError> {
    mutate::apply_edit(schedules, edit)
}

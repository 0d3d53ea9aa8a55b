use crate::calendar::BlockCalendar;
use crate::config::ProgramConfig;
use crate::model::{DutyKind, DutySchedule, Fellow, RotationSchedule, Severity, Targets, WeekendKey};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Entrées de l'assignation gardes/floats.
#[derive(Debug, Clone, Copy)]
pub struct AssignRequest<'a> {
    pub fellows: &'a [Fellow],
    pub rotations: &'a RotationSchedule,
    pub call_targets: &'a Targets,
    pub float_targets: &'a Targets,
    pub calendar: &'a BlockCalendar,
    pub config: &'a ProgramConfig,
    pub attempts: u32,
}

impl<'a> AssignRequest<'a> {
    pub fn new(
        fellows: &'a [Fellow],
        rotations: &'a RotationSchedule,
        call_targets: &'a Targets,
        float_targets: &'a Targets,
        calendar: &'a BlockCalendar,
        config: &'a ProgramConfig,
    ) -> Self {
        Self {
            fellows,
            rotations,
            call_targets,
            float_targets,
            calendar,
            config,
            attempts: config.attempts,
        }
    }

    pub fn with_attempts(mut self, attempts: u32) -> Self {
        self.attempts = attempts;
        self
    }
}

/// Politique de remplissage, de la plus stricte à la plus permissive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RelaxationPolicy {
    StrictFill,
    RelaxedEligibility,
    OverTarget,
    IgnoreAdjacency,
}

impl RelaxationPolicy {
    /// Ordre d'escalade appliqué aux cases restées vides.
    pub const ESCALATION: [RelaxationPolicy; 3] = [
        RelaxationPolicy::RelaxedEligibility,
        RelaxationPolicy::OverTarget,
        RelaxationPolicy::IgnoreAdjacency,
    ];

    pub fn issue_rule(self) -> Option<IssueRule> {
        match self {
            RelaxationPolicy::StrictFill => None,
            RelaxationPolicy::RelaxedEligibility => Some(IssueRule::RelaxedFallback),
            RelaxationPolicy::OverTarget => Some(IssueRule::OverTarget),
            RelaxationPolicy::IgnoreAdjacency => Some(IssueRule::IgnoreAdjacency),
        }
    }

    pub fn uses_strict_eligibility(self) -> bool {
        self == RelaxationPolicy::StrictFill
    }

    pub fn may_exceed_target(self) -> bool {
        matches!(
            self,
            RelaxationPolicy::OverTarget | RelaxationPolicy::IgnoreAdjacency
        )
    }

    pub fn enforces_adjacency(self) -> bool {
        self != RelaxationPolicy::IgnoreAdjacency
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueRule {
    RelaxedFallback,
    OverTarget,
    IgnoreAdjacency,
    MissingCall,
    MissingFloat,
    FloatBeforeFloor,
}

impl IssueRule {
    pub fn as_str(self) -> &'static str {
        match self {
            IssueRule::RelaxedFallback => "relaxed_fallback",
            IssueRule::OverTarget => "over_target",
            IssueRule::IgnoreAdjacency => "ignore_adjacency",
            IssueRule::MissingCall => "missing_call",
            IssueRule::MissingFloat => "missing_float",
            IssueRule::FloatBeforeFloor => "float_before_floor",
        }
    }
}

impl fmt::Display for IssueRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Problème relevé pendant l'assignation (case relâchée ou non pourvue).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentIssue {
    pub duty: DutyKind,
    pub severity: Severity,
    pub fellow: Option<String>,
    pub key: WeekendKey,
    pub rule: IssueRule,
    pub detail: String,
}

/// Résultat de l'assignation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignOutcome {
    pub call: DutySchedule,
    pub float: DutySchedule,
    pub call_counts: BTreeMap<String, u32>,
    pub float_counts: BTreeMap<String, u32>,
    pub issues: Vec<AssignmentIssue>,
}

/// Modification ponctuelle d'un planning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Edit {
    /// Échange des rotations de deux fellows sur un bloc.
    RotationSwap {
        block: u8,
        fellow: String,
        other: String,
    },
    /// Transfert d'une garde ou d'un float à un autre fellow.
    Reassign {
        duty: DutyKind,
        key: WeekendKey,
        from: String,
        to: String,
    },
}

impl fmt::Display for Edit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Edit::RotationSwap {
                block,
                fellow,
                other,
            } => write!(f, "swap block {block} rotations of {fellow} and {other}"),
            Edit::Reassign { duty, key, from, to } => {
                write!(f, "move {duty} {key} from {from} to {to}")
            }
        }
    }
}

#[derive(Error, Debug)]
pub enum SchedError {
    #[error("unknown fellow: {0}")]
    UnknownFellow(String),
    #[error("unknown weekend: {0}")]
    UnknownWeekend(String),
    #[error("block out of range: {0}")]
    BlockOutOfRange(u8),
    #[error("edit invalid: {0}")]
    InvalidEdit(&'static str),
    #[error("malformed calendar: {0}")]
    MalformedCalendar(String),
}

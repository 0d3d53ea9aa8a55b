#![forbid(unsafe_code)]
//! Gardes : planification des gardes de week-end et night-float d'un fellowship.
//!
//! - Assignation gardes/floats par essais aléatoires puis relâchements successifs.
//! - Timeline jour par jour des heures de chaque fellow.
//! - Six règles de temps de travail, constats triés par date.
//! - Suggestions de modifications ponctuelles pour lever une violation.
//! - Fonctions pures ; l'état (JSON/CSV) reste en dehors du cœur.

pub mod calendar;
pub mod config;
pub mod io;
pub mod model;
pub mod remediation;
pub mod rules;
pub mod scheduler;
pub mod storage;
pub mod timeline;

pub use calendar::{Block, BlockCalendar};
pub use config::{ProgramConfig, RuleOptions, ShiftTemplate};
pub use model::{
    DutyKind, DutySchedule, DutySlot, Fellow, PgyLevel, ProgramState, RotationSchedule,
    ScheduleSet, Severity, Targets, Vacation, VacationStatus, WeekendKey,
};
pub use remediation::{suggest, RemediationContext, Suggestion};
pub use rules::{check, RuleKind, ViolationRecord};
pub use scheduler::{assign, AssignOutcome, AssignRequest, AssignmentIssue, Edit, IssueRule};
pub use storage::{JsonStorage, Storage};
pub use timeline::{build, DayEntry, ShiftSource, ShiftSpan, Timeline};

use crate::calendar::BlockCalendar;
use crate::config::{ProgramConfig, ShiftTemplate};
use crate::model::{ScheduleSet, Vacation};
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::Serialize;
use std::collections::BTreeSet;

/// Garde de week-end : 12h de jour, samedi et dimanche.
pub const CALL_SHIFT: ShiftTemplate = ShiftTemplate::day(7, 19, 12, false);
/// Night-float : 12h de nuit, comptée sur le samedi.
pub const FLOAT_SHIFT: ShiftTemplate = ShiftTemplate::night(19, 7, 12);

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "label", rename_all = "lowercase")]
pub enum ShiftSource {
    Rotation(String),
    Call,
    Float,
}

/// Poste de travail posé sur une journée.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShiftSpan {
    pub source: ShiftSource,
    pub start_hour: u8,
    pub end_hour: u8,
    pub hours: u32,
    pub is_night: bool,
}

impl ShiftSpan {
    pub fn from_template(source: ShiftSource, template: ShiftTemplate) -> Self {
        Self {
            source,
            start_hour: template.start_hour,
            end_hour: template.end_hour,
            hours: template.hours,
            is_night: template.night,
        }
    }

    /// Fin en heures depuis minuit du jour de début (> 24 si le poste déborde).
    pub fn end_offset(&self) -> u32 {
        let end = u32::from(self.end_hour);
        if self.end_hour <= self.start_hour {
            end + 24
        } else {
            end
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayEntry {
    pub date: NaiveDate,
    pub block: u8,
    pub total_hours: u32,
    pub shifts: Vec<ShiftSpan>,
    pub is_night: bool,
}

impl DayEntry {
    pub fn new(date: NaiveDate, block: u8) -> Self {
        Self {
            date,
            block,
            total_hours: 0,
            shifts: Vec::new(),
            is_night: false,
        }
    }

    /// Les heures s'additionnent : une journée peut dépasser un poste nominal.
    pub fn push(&mut self, span: ShiftSpan) {
        self.total_hours += span.hours;
        self.is_night |= span.is_night;
        self.shifts.push(span);
    }

    pub fn is_off(&self) -> bool {
        self.total_hours == 0
    }

    pub fn earliest_start(&self) -> Option<u32> {
        self.shifts.iter().map(|s| u32::from(s.start_hour)).min()
    }

    pub fn latest_end(&self) -> Option<u32> {
        self.shifts.iter().map(ShiftSpan::end_offset).max()
    }
}

/// Reconstitution jour par jour des heures d'un fellow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Timeline {
    pub fellow: String,
    pub days: Vec<DayEntry>,
}

impl Timeline {
    pub fn new<N: Into<String>>(fellow: N, days: Vec<DayEntry>) -> Self {
        Self {
            fellow: fellow.into(),
            days,
        }
    }

    pub fn day(&self, date: NaiveDate) -> Option<&DayEntry> {
        self.index_of(date).map(|idx| &self.days[idx])
    }

    fn day_mut(&mut self, date: NaiveDate) -> Option<&mut DayEntry> {
        self.index_of(date).map(move |idx| &mut self.days[idx])
    }

    fn index_of(&self, date: NaiveDate) -> Option<usize> {
        self.days.binary_search_by_key(&date, |d| d.date).ok()
    }

    pub fn total_hours(&self) -> u32 {
        self.days.iter().map(|d| d.total_hours).sum()
    }
}

/// Blocs de congés approuvés (raison « Vacation ») d'un fellow.
pub fn vacation_blocks(fellow: &str, vacations: &[Vacation]) -> BTreeSet<u8> {
    vacations
        .iter()
        .filter(|v| v.fellow == fellow && v.suppresses_rotation())
        .flat_map(|v| v.start_block..=v.end_block)
        .collect()
}

/// Construit la timeline d'un fellow : rotations, puis gardes et floats par-dessus.
///
/// Un bloc de congés supprime la rotation mais pas une garde déjà attribuée.
pub fn build(
    fellow: &str,
    schedules: &ScheduleSet,
    calendar: &BlockCalendar,
    vacation_blocks: &BTreeSet<u8>,
    config: &ProgramConfig,
) -> Timeline {
    let mut days = Vec::new();

    for block in calendar.blocks() {
        let label = schedules.rotations.label(fellow, block.index());
        let template = if vacation_blocks.contains(&block.number) {
            None
        } else {
            config.template_for(label)
        };

        let mut date = block.start;
        while date <= block.end {
            let mut entry = DayEntry::new(date, block.number);
            if let Some(template) = template {
                if !template.weekdays_only || is_weekday(date) {
                    entry.push(ShiftSpan::from_template(
                        ShiftSource::Rotation(label.to_string()),
                        template,
                    ));
                }
            }
            days.push(entry);
            date = match date.succ_opt() {
                Some(next) => next,
                None => break,
            };
        }
    }

    let mut timeline = Timeline::new(fellow, days);

    for (key, slot) in schedules.call.iter() {
        if slot.name.as_deref() != Some(fellow) {
            continue;
        }
        let Some(block) = calendar.get(key.block_index()) else {
            continue;
        };
        let saturday = block.weekend_saturday(key.weekend);
        for date in [saturday, saturday + Duration::days(1)] {
            if let Some(day) = timeline.day_mut(date) {
                day.push(ShiftSpan::from_template(ShiftSource::Call, CALL_SHIFT));
            }
        }
    }

    for (key, slot) in schedules.float.iter() {
        if slot.name.as_deref() != Some(fellow) {
            continue;
        }
        let Some(block) = calendar.get(key.block_index()) else {
            continue;
        };
        if let Some(day) = timeline.day_mut(block.weekend_saturday(key.weekend)) {
            day.push(ShiftSpan::from_template(ShiftSource::Float, FLOAT_SHIFT));
        }
    }

    timeline
}

fn is_weekday(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

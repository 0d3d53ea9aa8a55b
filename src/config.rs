use crate::model::{FLOOR_A, FLOOR_B, ICU, NIGHTS, VACATION};
use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Gabarit horaire d'une rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftTemplate {
    pub start_hour: u8,
    pub end_hour: u8,
    pub hours: u32,
    #[serde(default)]
    pub night: bool,
    #[serde(default)]
    pub weekdays_only: bool,
}

impl ShiftTemplate {
    pub const fn day(start_hour: u8, end_hour: u8, hours: u32, weekdays_only: bool) -> Self {
        Self {
            start_hour,
            end_hour,
            hours,
            night: false,
            weekdays_only,
        }
    }

    pub const fn night(start_hour: u8, end_hour: u8, hours: u32) -> Self {
        Self {
            start_hour,
            end_hour,
            hours,
            night: true,
            weekdays_only: false,
        }
    }
}

/// Gabarit des rotations sans entrée dédiée.
pub const DEFAULT_ROTATION_SHIFT: ShiftTemplate = ShiftTemplate::day(8, 16, 8, true);

/// Seuils des six règles de temps de travail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleOptions {
    pub max_weekly_avg_hours: f64,
    pub averaging_weeks: usize,
    pub max_daily_hours: u32,
    pub min_rest_hours: i64,
    pub day_off_window_days: usize,
    pub min_days_off: usize,
    pub max_consecutive_nights: usize,
    pub post_call_threshold_hours: u32,
    pub post_call_rest_hours: u32,
}

impl Default for RuleOptions {
    fn default() -> Self {
        Self {
            max_weekly_avg_hours: 80.0,
            averaging_weeks: 4,
            max_daily_hours: 24,
            min_rest_hours: 8,
            day_off_window_days: 28,
            min_days_off: 4,
            max_consecutive_nights: 6,
            post_call_threshold_hours: 24,
            post_call_rest_hours: 14,
        }
    }
}

/// Configuration du programme ; les valeurs par défaut décrivent l'année standard
/// de 26 blocs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgramConfig {
    pub block_count: usize,
    pub attempts: u32,
    pub max_suggestions: usize,
    pub board_exams: Vec<NaiveDate>,
    /// Blocs exclus avant le bloc d'examen (fenêtre dure, PGY-6).
    pub exam_hard_window_blocks: usize,
    /// Semaines avant l'examen pendant lesquelles un PGY-6 est pénalisé.
    pub exam_soft_window_weeks: i64,
    pub pgy6_call_start_block: usize,
    /// PGY-6 exclus du float pendant les `late_float_blocks` premiers blocs.
    pub late_float_fellows: Vec<String>,
    pub late_float_blocks: usize,
    pub light_rotations: Vec<String>,
    pub shift_templates: BTreeMap<String, ShiftTemplate>,
    pub rules: RuleOptions,
}

impl Default for ProgramConfig {
    fn default() -> Self {
        let board_exams = [(2025, 8, 26), (2025, 10, 21), (2026, 1, 13), (2026, 3, 10), (2026, 5, 19)]
            .into_iter()
            .filter_map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d))
            .collect();

        let shift_templates = [
            (NIGHTS, ShiftTemplate::night(19, 7, 12)),
            (ICU, ShiftTemplate::day(7, 19, 12, false)),
            (FLOOR_A, ShiftTemplate::day(7, 19, 12, true)),
            (FLOOR_B, ShiftTemplate::day(7, 19, 12, true)),
            ("Cath", ShiftTemplate::day(7, 17, 10, true)),
            ("EP", ShiftTemplate::day(7, 17, 10, true)),
            ("Echo", ShiftTemplate::day(7, 17, 10, true)),
        ]
        .into_iter()
        .map(|(label, template)| (label.to_string(), template))
        .collect();

        Self {
            block_count: 26,
            attempts: 80,
            max_suggestions: 5,
            board_exams,
            exam_hard_window_blocks: 2,
            exam_soft_window_weeks: 4,
            pgy6_call_start_block: 1,
            late_float_fellows: Vec::new(),
            late_float_blocks: 4,
            light_rotations: ["Research", "Elective", "Clinic"]
                .into_iter()
                .map(String::from)
                .collect(),
            shift_templates,
            rules: RuleOptions::default(),
        }
    }
}

impl ProgramConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read(path).with_context(|| format!("reading config {}", path.display()))?;
        let config: ProgramConfig = serde_json::from_slice(&data)
            .with_context(|| format!("parsing config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.block_count == 0 {
            bail!("block_count must be > 0");
        }
        if self.rules.averaging_weeks == 0 {
            bail!("rules.averaging_weeks must be > 0");
        }
        if self.rules.day_off_window_days == 0 {
            bail!("rules.day_off_window_days must be > 0");
        }
        for (label, template) in &self.shift_templates {
            if template.start_hour > 23 || template.end_hour > 23 {
                bail!("shift template {label}: hours must be within 0..=23");
            }
        }
        Ok(())
    }

    /// Gabarit d'une étiquette de rotation ; `None` pour une case vide ou des congés.
    pub fn template_for(&self, label: &str) -> Option<ShiftTemplate> {
        let label = label.trim();
        if label.is_empty() || label.eq_ignore_ascii_case(VACATION) {
            return None;
        }
        Some(
            self.shift_templates
                .get(label)
                .copied()
                .unwrap_or(DEFAULT_ROTATION_SHIFT),
        )
    }

    pub fn is_light_rotation(&self, label: &str) -> bool {
        self.light_rotations.iter().any(|l| l == label)
    }
}

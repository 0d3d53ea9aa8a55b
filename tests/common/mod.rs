#![allow(dead_code)]
use chrono::NaiveDate;
use gardes::{BlockCalendar, Fellow, PgyLevel, RotationSchedule, Targets};

pub const LABELS: [&str; 13] = [
    "ICU", "Floor-A", "Floor-B", "Nights", "Cath", "Echo", "EP", "Clinic", "Research",
    "Elective", "Consults", "Nuclear", "Imaging",
];

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Année standard, bloc 1 commençant un lundi.
pub fn calendar() -> BlockCalendar {
    BlockCalendar::academic_year(date(2025, 7, 7), 26)
}

/// 13 fellows : 5 PGY-4, 4 PGY-5, 4 PGY-6.
pub fn fellows() -> Vec<Fellow> {
    (0..13)
        .map(|i| {
            let pgy = match i {
                0..=4 => PgyLevel::Pgy4,
                5..=8 => PgyLevel::Pgy5,
                _ => PgyLevel::Pgy6,
            };
            Fellow::new(format!("Fellow {i:02}"), pgy)
        })
        .collect()
}

/// Rotation circulaire : chaque bloc a exactement un fellow par étiquette.
pub fn rotations(fellows: &[Fellow]) -> RotationSchedule {
    let mut schedule = RotationSchedule::new();
    for (i, f) in fellows.iter().enumerate() {
        let row = (0..26)
            .map(|b| LABELS[(i + b) % LABELS.len()].to_string())
            .collect();
        schedule.insert(f.name.clone(), row);
    }
    schedule
}

pub fn targets(pgy4: u32, pgy5: u32, pgy6: u32) -> Targets {
    [
        (PgyLevel::Pgy4, pgy4),
        (PgyLevel::Pgy5, pgy5),
        (PgyLevel::Pgy6, pgy6),
    ]
    .into_iter()
    .collect()
}

/// Ligne de 26 blocs vides avec quelques étiquettes posées (bloc 1-based).
pub fn row(set: &[(usize, &str)]) -> Vec<String> {
    let mut out = vec![String::new(); 26];
    for (block, label) in set {
        out[block - 1] = label.to_string();
    }
    out
}

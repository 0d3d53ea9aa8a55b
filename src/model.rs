use crate::calendar::BlockCalendar;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

pub const NIGHTS: &str = "Nights";
pub const ICU: &str = "ICU";
pub const FLOOR_A: &str = "Floor-A";
pub const FLOOR_B: &str = "Floor-B";
pub const VACATION: &str = "Vacation";

/// Année de formation post-graduée d'un fellow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum PgyLevel {
    Pgy4,
    Pgy5,
    Pgy6,
}

impl PgyLevel {
    pub fn number(self) -> u8 {
        match self {
            PgyLevel::Pgy4 => 4,
            PgyLevel::Pgy5 => 5,
            PgyLevel::Pgy6 => 6,
        }
    }
}

impl TryFrom<u8> for PgyLevel {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            4 => Ok(PgyLevel::Pgy4),
            5 => Ok(PgyLevel::Pgy5),
            6 => Ok(PgyLevel::Pgy6),
            other => Err(format!("PGY level must be 4, 5 or 6 (got {other})")),
        }
    }
}

impl From<PgyLevel> for u8 {
    fn from(value: PgyLevel) -> Self {
        value.number()
    }
}

impl fmt::Display for PgyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PGY-{}", self.number())
    }
}

/// Objectif de gardes (ou de floats) par niveau.
pub type Targets = BTreeMap<PgyLevel, u32>;

/// Fellow : le nom sert d'identifiant unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fellow {
    pub name: String,
    pub pgy: PgyLevel,
}

impl Fellow {
    pub fn new<N: Into<String>>(name: N, pgy: PgyLevel) -> Self {
        Self {
            name: name.into(),
            pgy,
        }
    }
}

/// Grille de rotations : une étiquette par bloc et par fellow (`""` = rien).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RotationSchedule(BTreeMap<String, Vec<String>>);

impl RotationSchedule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<N: Into<String>>(&mut self, fellow: N, labels: Vec<String>) {
        self.0.insert(fellow.into(), labels);
    }

    pub fn row(&self, fellow: &str) -> Option<&[String]> {
        self.0.get(fellow).map(Vec::as_slice)
    }

    pub fn row_mut(&mut self, fellow: &str) -> Option<&mut Vec<String>> {
        self.0.get_mut(fellow)
    }

    /// Étiquette du bloc `block_idx` (0-based), vide si absente.
    pub fn label(&self, fellow: &str, block_idx: usize) -> &str {
        self.0
            .get(fellow)
            .and_then(|row| row.get(block_idx))
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn fellows(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Le fellow a-t-il une des `labels` dans un bloc de `range` ?
    pub fn held_any(&self, fellow: &str, labels: &[&str], range: std::ops::Range<usize>) -> bool {
        range
            .into_iter()
            .any(|idx| labels.contains(&self.label(fellow, idx)))
    }

    /// Premier fellow (ordre alphabétique) portant `label` au bloc donné.
    pub fn first_with(&self, label: &str, block_idx: usize) -> Option<&str> {
        self.fellows().find(|f| self.label(f, block_idx) == label)
    }
}

/// Week-end 1 ou 2 d'un bloc.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WeekendKey {
    pub block: u8,
    pub weekend: u8,
}

impl WeekendKey {
    pub fn new(block: u8, weekend: u8) -> Self {
        Self { block, weekend }
    }

    pub fn block_index(&self) -> usize {
        usize::from(self.block).saturating_sub(1)
    }

    /// Clés voisines au sens de la règle d'adjacence.
    pub fn neighbours(&self) -> [Option<WeekendKey>; 2] {
        if self.weekend == 1 {
            let previous = (self.block > 1).then(|| WeekendKey::new(self.block - 1, 2));
            [Some(WeekendKey::new(self.block, 2)), previous]
        } else {
            [
                Some(WeekendKey::new(self.block, 1)),
                self.block.checked_add(1).map(|b| WeekendKey::new(b, 1)),
            ]
        }
    }

    /// Toutes les clés d'un calendrier de `blocks` blocs.
    pub fn all(blocks: usize) -> impl Iterator<Item = WeekendKey> {
        (1..=blocks).flat_map(|b| {
            let b = u8::try_from(b).unwrap_or(u8::MAX);
            [WeekendKey::new(b, 1), WeekendKey::new(b, 2)]
        })
    }
}

impl fmt::Display for WeekendKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "B{}-W{}", self.block, self.weekend)
    }
}

impl FromStr for WeekendKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || format!("invalid weekend key: {s}");
        let rest = s.trim().strip_prefix('B').ok_or_else(invalid)?;
        let (block, weekend) = rest.split_once("-W").ok_or_else(invalid)?;
        let block: u8 = block.parse().map_err(|_| invalid())?;
        let weekend: u8 = weekend.parse().map_err(|_| invalid())?;
        if block == 0 || !(1..=2).contains(&weekend) {
            return Err(invalid());
        }
        Ok(Self { block, weekend })
    }
}

impl Serialize for WeekendKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for WeekendKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Valeur d'une case de garde ou de float.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "crate::io::RawSlot")]
pub struct DutySlot {
    pub name: Option<String>,
    pub relaxed: bool,
}

impl DutySlot {
    pub fn assigned<N: Into<String>>(name: N, relaxed: bool) -> Self {
        Self {
            name: Some(name.into()),
            relaxed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DutyKind {
    Call,
    Float,
}

impl DutyKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DutyKind::Call => "call",
            DutyKind::Float => "float",
        }
    }
}

impl fmt::Display for DutyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Planning de gardes ou de floats, indexé par `B<n>-W<i>`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DutySchedule(BTreeMap<WeekendKey, DutySlot>);

impl DutySchedule {
    /// Planning vide avec une case par week-end du calendrier.
    pub fn empty(blocks: usize) -> Self {
        Self(WeekendKey::all(blocks).map(|k| (k, DutySlot::default())).collect())
    }

    pub fn get(&self, key: WeekendKey) -> Option<&DutySlot> {
        self.0.get(&key)
    }

    pub fn assignee(&self, key: WeekendKey) -> Option<&str> {
        self.0.get(&key).and_then(|slot| slot.name.as_deref())
    }

    pub fn set(&mut self, key: WeekendKey, slot: DutySlot) {
        self.0.insert(key, slot);
    }

    pub fn iter(&self) -> impl Iterator<Item = (WeekendKey, &DutySlot)> {
        self.0.iter().map(|(k, v)| (*k, v))
    }

    pub fn empty_keys(&self) -> impl Iterator<Item = WeekendKey> + '_ {
        self.0
            .iter()
            .filter(|(_, slot)| slot.name.is_none())
            .map(|(k, _)| *k)
    }

    pub fn keys_held_by<'a>(&'a self, fellow: &'a str) -> impl Iterator<Item = WeekendKey> + 'a {
        self.0
            .iter()
            .filter(move |(_, slot)| slot.name.as_deref() == Some(fellow))
            .map(|(k, _)| *k)
    }

    /// Le fellow tient-il déjà une clé voisine de `key` ?
    pub fn holds_adjacent(&self, fellow: &str, key: WeekendKey) -> bool {
        key.neighbours()
            .into_iter()
            .flatten()
            .any(|k| self.assignee(k) == Some(fellow))
    }

    /// Nombre d'affectations par fellow.
    pub fn counts(&self) -> BTreeMap<String, u32> {
        let mut out = BTreeMap::new();
        for name in self.0.values().filter_map(|slot| slot.name.as_ref()) {
            *out.entry(name.clone()).or_insert(0) += 1;
        }
        out
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Les trois plannings qui déterminent la timeline d'un fellow.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleSet {
    pub rotations: RotationSchedule,
    pub call: DutySchedule,
    pub float: DutySchedule,
}

impl ScheduleSet {
    pub fn duty(&self, kind: DutyKind) -> &DutySchedule {
        match kind {
            DutyKind::Call => &self.call,
            DutyKind::Float => &self.float,
        }
    }

    pub fn duty_mut(&mut self, kind: DutyKind) -> &mut DutySchedule {
        match kind {
            DutyKind::Call => &mut self.call,
            DutyKind::Float => &mut self.float,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warn,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warn => "warn",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VacationStatus {
    Pending,
    Approved,
    Denied,
}

/// Demande de congés sur une plage de blocs (inclusive).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vacation {
    pub fellow: String,
    pub start_block: u8,
    pub end_block: u8,
    pub reason: String,
    pub status: VacationStatus,
}

impl Vacation {
    pub fn approved<N: Into<String>>(fellow: N, start_block: u8, end_block: u8) -> Self {
        Self {
            fellow: fellow.into(),
            start_block,
            end_block,
            reason: VACATION.to_string(),
            status: VacationStatus::Approved,
        }
    }

    /// Seuls les congés approuvés de type « Vacation » suppriment les heures de rotation.
    pub fn suppresses_rotation(&self) -> bool {
        self.status == VacationStatus::Approved && self.reason.eq_ignore_ascii_case(VACATION)
    }
}

/// État complet d'un programme (persisté par la CLI).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProgramState {
    pub fellows: Vec<Fellow>,
    pub calendar: BlockCalendar,
    pub schedules: ScheduleSet,
    #[serde(default)]
    pub vacations: Vec<Vacation>,
    #[serde(default)]
    pub call_targets: Targets,
    #[serde(default)]
    pub float_targets: Targets,
}

impl ProgramState {
    pub fn find_fellow<'a>(&'a self, name: &str) -> Option<&'a Fellow> {
        self.fellows.iter().find(|f| f.name == name)
    }
}

use crate::model::{DutySlot, Fellow, PgyLevel, RotationSchedule};
use crate::rules::ViolationRecord;
use crate::scheduler::AssignmentIssue;
use anyhow::{bail, Context};
use csv::{ReaderBuilder, WriterBuilder};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use thiserror::Error;

/// Case de garde telle qu'elle arrive de l'extérieur : nom nu, `null`, ou objet.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum RawSlot {
    Bare(Option<String>),
    Tagged {
        name: Option<String>,
        #[serde(default)]
        relaxed: bool,
    },
}

impl From<RawSlot> for DutySlot {
    fn from(raw: RawSlot) -> Self {
        let (name, relaxed) = match raw {
            RawSlot::Bare(name) => (name, false),
            RawSlot::Tagged { name, relaxed } => (name, relaxed),
        };
        let name = name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty());
        DutySlot { name, relaxed }
    }
}

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("header mismatch: expected `{expected}`, found `{found}`")]
    HeaderMismatch { expected: String, found: String },
    #[error("unknown fellow: {0}")]
    UnknownFellow(String),
    #[error("duplicate row for fellow: {0}")]
    DuplicateFellow(String),
    #[error("row for {fellow} has {found} rotation cells, expected {expected}")]
    WrongCellCount {
        fellow: String,
        expected: usize,
        found: usize,
    },
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

fn schedule_header(blocks: usize) -> Vec<String> {
    std::iter::once("Fellow".to_string())
        .chain((1..=blocks).map(|b| format!("Block {b}")))
        .collect()
}

/// Export CSV de la grille : header `Fellow,Block 1,…,Block N`.
pub fn write_rotation_csv<W: Write>(
    out: W,
    schedule: &RotationSchedule,
    blocks: usize,
) -> anyhow::Result<()> {
    let mut w = WriterBuilder::new().has_headers(false).from_writer(out);
    w.write_record(schedule_header(blocks))?;
    for (fellow, row) in schedule.iter() {
        let cells = (0..blocks).map(|idx| row.get(idx).map(String::as_str).unwrap_or(""));
        w.write_record(std::iter::once(fellow).chain(cells))?;
    }
    w.flush()?;
    Ok(())
}

pub fn export_rotation_csv<P: AsRef<Path>>(
    path: P,
    schedule: &RotationSchedule,
    blocks: usize,
) -> anyhow::Result<()> {
    let path = path.as_ref();
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    write_rotation_csv(file, schedule, blocks)
}

/// Import CSV de la grille ; tout ou rien.
pub fn read_rotation_csv<R: Read>(
    input: R,
    fellows: &[Fellow],
    blocks: usize,
) -> Result<RotationSchedule, ImportError> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(input);
    let mut records = rdr.records();

    let expected = schedule_header(blocks);
    let header = records.next().transpose()?.unwrap_or_default();
    let found: Vec<&str> = header.iter().map(str::trim).collect();
    if found != expected {
        return Err(ImportError::HeaderMismatch {
            expected: expected.join(","),
            found: found.join(","),
        });
    }

    let known: BTreeSet<&str> = fellows.iter().map(|f| f.name.as_str()).collect();
    let mut schedule = RotationSchedule::new();
    for rec in records {
        let rec = rec?;
        let fellow = rec.get(0).unwrap_or("").trim();
        if fellow.is_empty() && rec.iter().all(|c| c.trim().is_empty()) {
            continue;
        }
        if !known.contains(fellow) {
            return Err(ImportError::UnknownFellow(fellow.to_string()));
        }
        if schedule.row(fellow).is_some() {
            return Err(ImportError::DuplicateFellow(fellow.to_string()));
        }
        let cells: Vec<String> = rec.iter().skip(1).map(|c| c.trim().to_string()).collect();
        if cells.len() != blocks {
            return Err(ImportError::WrongCellCount {
                fellow: fellow.to_string(),
                expected: blocks,
                found: cells.len(),
            });
        }
        schedule.insert(fellow, cells);
    }
    Ok(schedule)
}

/// Remplace `target` seulement si l'import complet réussit.
pub fn import_rotation_csv<P: AsRef<Path>>(
    path: P,
    target: &mut RotationSchedule,
    fellows: &[Fellow],
    blocks: usize,
) -> Result<(), ImportError> {
    let file = File::open(path)?;
    let schedule = read_rotation_csv(file, fellows, blocks)?;
    *target = schedule;
    Ok(())
}

/// Import des fellows : header `name,pgy`.
pub fn import_fellows_csv<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<Fellow>> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_path(path)?;
    let mut out = Vec::new();
    for rec in rdr.records() {
        let rec = rec?;
        let name = rec.get(0).context("missing name")?.trim();
        let pgy = rec.get(1).context("missing pgy")?.trim();
        if name.is_empty() {
            bail!("invalid fellow row (empty name)");
        }
        let pgy: u8 = pgy
            .parse()
            .with_context(|| format!("invalid pgy for fellow {name}"))?;
        let pgy = PgyLevel::try_from(pgy).map_err(anyhow::Error::msg)?;
        if out.iter().any(|f: &Fellow| f.name == name) {
            bail!("duplicate fellow {name}");
        }
        out.push(Fellow::new(name, pgy));
    }
    Ok(out)
}

/// Export CSV des violations : header `type,severity,fellow,block,weekend,rule,detail`.
pub fn write_violations_csv<W: Write>(
    out: W,
    issues: &[AssignmentIssue],
    violations: &[ViolationRecord],
) -> anyhow::Result<()> {
    let mut w = WriterBuilder::new().has_headers(false).from_writer(out);
    w.write_record(["type", "severity", "fellow", "block", "weekend", "rule", "detail"])?;
    for issue in issues {
        let block = issue.key.block.to_string();
        let weekend = issue.key.weekend.to_string();
        w.write_record([
            issue.duty.as_str(),
            issue.severity.as_str(),
            issue.fellow.as_deref().unwrap_or(""),
            block.as_str(),
            weekend.as_str(),
            issue.rule.as_str(),
            issue.detail.as_str(),
        ])?;
    }
    for v in violations {
        let block = v.block.map(|b| b.to_string()).unwrap_or_default();
        let detail = format!("{} to {}: {}", v.start, v.end, v.detail);
        w.write_record([
            "duty_hours",
            v.severity.as_str(),
            v.fellow.as_str(),
            block.as_str(),
            "",
            v.rule.as_str(),
            detail.as_str(),
        ])?;
    }
    w.flush()?;
    Ok(())
}

pub fn export_violations_csv<P: AsRef<Path>>(
    path: P,
    issues: &[AssignmentIssue],
    violations: &[ViolationRecord],
) -> anyhow::Result<()> {
    let path = path.as_ref();
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    write_violations_csv(file, issues, violations)
}

use crate::model::ProgramState;
use anyhow::Context;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

pub trait Storage {
    /// Charge l'état du programme depuis un support.
    fn load(&self) -> anyhow::Result<ProgramState>;
    /// Sauvegarde de manière atomique.
    fn save(&self, state: &ProgramState) -> anyhow::Result<()>;
}

/// État JSON sur disque, réécrit par renommage atomique.
pub struct JsonStorage {
    path: PathBuf,
}

impl JsonStorage {
    pub fn open<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        Ok(Self {
            path: path.as_ref().to_path_buf(),
        })
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }
}

impl Storage for JsonStorage {
    fn load(&self) -> anyhow::Result<ProgramState> {
        let data =
            fs::read(&self.path).with_context(|| format!("reading {}", self.path.display()))?;
        let state: ProgramState = serde_json::from_slice(&data)
            .with_context(|| format!("parsing {}", self.path.display()))?;
        state
            .calendar
            .validate()
            .with_context(|| format!("validating calendar in {}", self.path.display()))?;
        for (fellow, row) in state.schedules.rotations.iter() {
            if row.len() != state.calendar.len() {
                tracing::warn!(
                    fellow,
                    cells = row.len(),
                    blocks = state.calendar.len(),
                    "rotation row length differs from calendar"
                );
            }
        }
        Ok(state)
    }

    fn save(&self, state: &ProgramState) -> anyhow::Result<()> {
        let json = serde_json::to_vec_pretty(state)?;
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut tmp = NamedTempFile::new_in(dir).with_context(|| "creating temp file")?;
        tmp.write_all(&json)?;
        tmp.flush()?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).with_context(|| "atomic rename")?;
        Ok(())
    }
}

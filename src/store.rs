//! Whole-file persistence for the ledger document.
//!
//! The document is read and written wholesale as pretty-printed JSON with
//! non-ASCII text kept verbatim, so the file stays readable and diffable.
//! A missing file is not an error; it loads as the empty seed structure.
//! Writes go to a temp file in the same directory and are renamed into
//! place so a crash mid-write cannot leave a truncated store behind.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::ledger::Ledger;

pub struct LedgerStore {
    path: PathBuf,
}

impl LedgerStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        LedgerStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Default location of the ledger file under the platform data dir.
    pub fn default_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("io", "nwt", "nwt")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.data_dir().join("assets.json"))
    }

    pub fn load(&self) -> Result<Ledger> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "No ledger file, starting empty");
            return Ok(Ledger::default());
        }
        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read ledger file: {}", self.path.display()))?;
        let ledger: Ledger = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse ledger file: {}", self.path.display()))?;
        debug!(path = %self.path.display(), "Loaded ledger");
        Ok(ledger)
    }

    pub fn save(&self, ledger: &Ledger) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
            }
        }

        let mut json = serde_json::to_string_pretty(ledger).context("Failed to encode ledger")?;
        json.push('\n');

        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, json)
            .with_context(|| format!("Failed to write ledger file: {}", tmp_path.display()))?;
        fs::rename(&tmp_path, &self.path).with_context(|| {
            format!("Failed to move ledger file into place: {}", self.path.display())
        })?;
        debug!(path = %self.path.display(), "Saved ledger");
        Ok(())
    }
}

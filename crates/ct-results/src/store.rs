//! Run storage API.

use crate::types::{RunManifest, TimeseriesRecord};
use crate::{ResultsError, ResultsResult};
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Run ids are lowercase hex sha256 digests, see [`crate::compute_run_id`].
pub fn is_valid_run_id(run_id: &str) -> bool {
    run_id.len() == 64
        && run_id
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
}

#[derive(Clone)]
pub struct RunStore {
    root_dir: PathBuf,
}

impl RunStore {
    pub fn new(root_dir: PathBuf) -> ResultsResult<Self> {
        if !root_dir.exists() {
            fs::create_dir_all(&root_dir)?;
        }
        Ok(Self { root_dir })
    }

    /// Store next to the study file, under `.ctsat/runs`.
    pub fn for_study(study_path: &Path) -> ResultsResult<Self> {
        let study_dir = study_path
            .parent()
            .ok_or_else(|| ResultsError::InvalidPath {
                message: "study path has no parent directory".to_string(),
            })?;
        let runs_dir = study_dir.join(".ctsat").join("runs");
        Self::new(runs_dir)
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    fn run_dir(&self, run_id: &str) -> ResultsResult<PathBuf> {
        if !is_valid_run_id(run_id) {
            return Err(ResultsError::InvalidRunId {
                run_id: run_id.to_string(),
            });
        }
        Ok(self.root_dir.join(run_id))
    }

    pub fn has_run(&self, run_id: &str) -> bool {
        self.run_dir(run_id)
            .is_ok_and(|dir| dir.join("manifest.json").exists())
    }

    pub fn save_run(
        &self,
        manifest: &RunManifest,
        records: &[TimeseriesRecord],
    ) -> ResultsResult<()> {
        let run_dir = self.run_dir(&manifest.run_id)?;
        fs::create_dir_all(&run_dir)?;

        let timeseries_file = fs::File::create(run_dir.join("timeseries.jsonl"))?;
        let mut writer = BufWriter::new(timeseries_file);
        for record in records {
            serde_json::to_writer(&mut writer, record)?;
            writer.write_all(b"\n")?;
        }
        writer.flush()?;

        // Manifest last: its presence marks the run as complete.
        let manifest_path = run_dir.join("manifest.json");
        let manifest_json = serde_json::to_string_pretty(manifest)?;
        fs::write(manifest_path, manifest_json)?;

        Ok(())
    }

    pub fn load_manifest(&self, run_id: &str) -> ResultsResult<RunManifest> {
        let manifest_path = self.run_dir(run_id)?.join("manifest.json");

        if !manifest_path.exists() {
            return Err(ResultsError::RunNotFound {
                run_id: run_id.to_string(),
            });
        }

        let content = fs::read_to_string(manifest_path)?;
        let manifest = serde_json::from_str(&content)?;
        Ok(manifest)
    }

    pub fn load_timeseries(&self, run_id: &str) -> ResultsResult<Vec<TimeseriesRecord>> {
        let timeseries_path = self.run_dir(run_id)?.join("timeseries.jsonl");

        if !timeseries_path.exists() {
            return Err(ResultsError::RunNotFound {
                run_id: run_id.to_string(),
            });
        }

        let content = fs::read_to_string(timeseries_path)?;
        let mut records = Vec::new();
        for line in content.lines() {
            if !line.trim().is_empty() {
                let record: TimeseriesRecord = serde_json::from_str(line)?;
                records.push(record);
            }
        }

        Ok(records)
    }

    pub fn list_runs(&self, case_id: &str) -> ResultsResult<Vec<RunManifest>> {
        let mut runs = Vec::new();

        if !self.root_dir.exists() {
            return Ok(runs);
        }

        for entry in fs::read_dir(&self.root_dir)? {
            let entry = entry?;
            if entry.path().is_dir() {
                let run_id = entry.file_name().to_string_lossy().to_string();
                if let Ok(manifest) = self.load_manifest(&run_id)
                    && manifest.case_id == case_id
                {
                    runs.push(manifest);
                }
            }
        }

        runs.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        Ok(runs)
    }

    pub fn delete_run(&self, run_id: &str) -> ResultsResult<()> {
        let run_dir = self.run_dir(run_id)?;
        if run_dir.exists() {
            fs::remove_dir_all(run_dir)?;
        }
        Ok(())
    }

    /// Delete all but the `keep` newest runs of a case. Returns the removed ids,
    /// oldest first.
    pub fn prune_runs(&self, case_id: &str, keep: usize) -> ResultsResult<Vec<String>> {
        let runs = self.list_runs(case_id)?;
        let excess = runs.len().saturating_sub(keep);
        let mut removed = Vec::with_capacity(excess);
        for manifest in runs.into_iter().take(excess) {
            self.delete_run(&manifest.run_id)?;
            removed.push(manifest.run_id);
        }
        Ok(removed)
    }
}

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::Serialize;

/// Written next to the run when a replay does not reproduce its expected hash.
#[derive(Debug, Serialize)]
pub struct MismatchReport<'a> {
    pub scenario: &'a str,
    pub expected: &'a str,
    pub actual: &'a str,
    pub recorded_at: String,
}

#[derive(Debug, Default)]
pub struct DiagnosticsCollector {
    report_dir: PathBuf,
    bug_reports: Vec<PathBuf>,
    scenario_hashes: HashMap<String, String>,
}

impl DiagnosticsCollector {
    pub fn new<P: AsRef<Path>>(report_dir: P) -> Self {
        Self {
            report_dir: report_dir.as_ref().to_path_buf(),
            ..Self::default()
        }
    }

    pub fn record_bug_report(
        &mut self,
        scenario: &Path,
        expected: &str,
        actual: &str,
    ) -> std::io::Result<PathBuf> {
        let now = Utc::now();
        let scenario = scenario.to_string_lossy();
        let report = MismatchReport {
            scenario: &scenario,
            expected,
            actual,
            recorded_at: now.to_rfc3339(),
        };
        let body = serde_yaml::to_string(&report)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

        fs::create_dir_all(&self.report_dir)?;
        let path = self
            .report_dir
            .join(format!("bug_report_{}.yaml", now.timestamp_millis()));
        fs::write(&path, body)?;

        self.bug_reports.push(path.clone());
        Ok(path)
    }

    pub fn record_scenario_hash(&mut self, scenario_path: &Path, hash: &str) {
        self.scenario_hashes.insert(
            scenario_path.to_string_lossy().into_owned(),
            hash.to_string(),
        );
    }

    pub fn scenario_hash(&self, scenario_path: &Path) -> Option<&str> {
        self.scenario_hashes
            .get(scenario_path.to_string_lossy().as_ref())
            .map(String::as_str)
    }

    pub fn bug_reports(&self) -> &[PathBuf] {
        &self.bug_reports
    }
}

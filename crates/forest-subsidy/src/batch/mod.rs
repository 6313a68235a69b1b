//! CSV project imports and batch evaluation against a single subsidy.

mod parser;

use std::io::Read;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::eligibility::domain::{Project, Subsidy};
use crate::eligibility::{EligibilityResult, EligibilityRuleEngine};

#[derive(Debug, thiserror::Error)]
pub enum ProjectImportError {
    #[error("failed to read project CSV: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid project CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error("line {line}: invalid value `{value}` for column `{column}`")]
    InvalidField {
        line: usize,
        column: &'static str,
        value: String,
    },
}

/// Reads project records from CSV. List cells are `;`-separated; empty cells leave
/// the field absent.
pub struct ProjectImporter;

impl ProjectImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<Project>, ProjectImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<Project>, ProjectImportError> {
        parser::parse_projects(reader)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchEntry {
    pub project_name: String,
    pub result: EligibilityResult,
}

/// Verdicts for many projects against one subsidy, all taken at the same instant.
#[derive(Debug, Clone, Serialize)]
pub struct BatchEvaluation {
    pub subsidy_id: String,
    pub evaluated_at: DateTime<Utc>,
    pub entries: Vec<BatchEntry>,
}

impl BatchEvaluation {
    pub fn run(
        engine: &EligibilityRuleEngine,
        projects: &[Project],
        subsidy: &Subsidy,
        now: DateTime<Utc>,
    ) -> Self {
        let entries: Vec<BatchEntry> = projects
            .iter()
            .map(|project| BatchEntry {
                project_name: project.display_name().to_string(),
                result: engine.evaluate_at(project, subsidy, now),
            })
            .collect();

        let batch = Self {
            subsidy_id: subsidy.id.clone(),
            evaluated_at: now,
            entries,
        };
        info!(
            subsidy = %batch.subsidy_id,
            projects = batch.entries.len(),
            eligible = batch.eligible_count(),
            "batch evaluation complete"
        );
        batch
    }

    pub fn eligible_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.result.eligible)
            .count()
    }

    pub fn total_funding(&self) -> f64 {
        self.entries
            .iter()
            .map(|entry| entry.result.total_funding())
            .sum()
    }
}

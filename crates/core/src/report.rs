use serde::Serialize;

/// What happened to one input file. No outcome is fatal to the batch — an
/// unreadable file or an unrecognized layout is recorded and skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum FileOutcome {
    Extracted { items: usize },
    NoItems,
    Failed { message: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub file: String,
    #[serde(flatten)]
    pub outcome: FileOutcome,
}

/// Aggregated outcomes for a whole run, one entry per input file.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    pub files: Vec<FileReport>,
}

impl RunReport {
    pub fn push(&mut self, file: impl Into<String>, outcome: FileOutcome) {
        self.files.push(FileReport { file: file.into(), outcome });
    }

    pub fn total_items(&self) -> usize {
        self.files
            .iter()
            .map(|f| match f.outcome {
                FileOutcome::Extracted { items } => items,
                _ => 0,
            })
            .sum()
    }

    pub fn failed_count(&self) -> usize {
        self.files
            .iter()
            .filter(|f| matches!(f.outcome, FileOutcome::Failed { .. }))
            .count()
    }
}

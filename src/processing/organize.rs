//! Copy categorized documents into topic folders.

use crate::processing::types::{CategorizationReport, PipelineError};
use std::path::{Path, PathBuf};

const FALLBACK_FOLDER: &str = "Unknown";

/// Copy every source file into `output_dir/<topic>[/<sub_topic>]/`.
///
/// Returns the number of files copied. Existing files with the same name are overwritten.
pub fn organize(report: &CategorizationReport, output_dir: &Path) -> Result<usize, PipelineError> {
    let mut copied = 0;
    for row in &report.rows {
        let mut folder = output_dir.join(folder_name(&row.assignment.main_label));
        if !row.assignment.sub_label.trim().is_empty() {
            folder.push(folder_name(&row.assignment.sub_label));
        }
        std::fs::create_dir_all(&folder).map_err(|source| io_error(&folder, source))?;

        let destination = folder.join(&row.document.id);
        std::fs::copy(&row.document.path, &destination)
            .map_err(|source| io_error(&row.document.path, source))?;
        tracing::debug!(
            file = %row.document.id,
            folder = %folder.display(),
            "Copied document"
        );
        copied += 1;
    }

    tracing::info!(copied, output = %output_dir.display(), "Documents organized");
    Ok(copied)
}

/// Folder-safe rendering of a topic label.
pub fn folder_name(label: &str) -> String {
    let cleaned: String = label
        .trim()
        .chars()
        .map(|ch| match ch {
            '/' | '\\' | ':' | '\0' => '_',
            other => other,
        })
        .collect();

    if cleaned.is_empty() || cleaned.chars().all(|ch| ch == '.') {
        FALLBACK_FOLDER.to_string()
    } else {
        cleaned
    }
}

fn io_error(path: &Path, source: std::io::Error) -> PipelineError {
    PipelineError::Io {
        path: PathBuf::from(path),
        source,
    }
}

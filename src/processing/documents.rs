//! Loading plain-text documents from a folder.

use crate::{
    processing::types::{Document, PipelineError},
    qdrant::{compute_content_hash, compute_fuzzy_hash},
};
use std::path::Path;
use walkdir::WalkDir;

/// Extensions read as plain text.
pub const SUPPORTED_EXTENSIONS: [&str; 12] = [
    ".txt", ".md", ".csv", ".log", ".json", ".xml", ".yaml", ".yml", ".ini", ".sql", ".html",
    ".htm",
];

/// Read every supported file directly inside `dir`, ordered by file name.
///
/// Subdirectories are not descended into. Unsupported and blank files are skipped with a log
/// line; invalid UTF-8 is replaced rather than rejected.
pub fn load_documents(dir: &Path) -> Result<Vec<Document>, PipelineError> {
    let mut documents = Vec::new();

    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|error| {
            let path = error.path().unwrap_or(dir).to_path_buf();
            PipelineError::Io {
                path,
                source: error.into(),
            }
        })?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let Some(file_type) = file_type_of(path) else {
            tracing::debug!(path = %path.display(), "Skipping unsupported file");
            continue;
        };

        let bytes = std::fs::read(path).map_err(|source| PipelineError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let text = String::from_utf8_lossy(&bytes).into_owned();
        if text.trim().is_empty() {
            tracing::info!(path = %path.display(), "Skipping empty file");
            continue;
        }

        documents.push(Document {
            id: entry.file_name().to_string_lossy().into_owned(),
            path: path.to_path_buf(),
            sha256: compute_content_hash(&bytes),
            text,
            fuzzy_hash: Some(compute_fuzzy_hash(&bytes)),
            file_type,
        });
    }

    tracing::info!(
        dir = %dir.display(),
        documents = documents.len(),
        "Loaded documents"
    );
    Ok(documents)
}

fn file_type_of(path: &Path) -> Option<String> {
    let extension = path.extension()?.to_str()?.to_lowercase();
    let file_type = format!(".{extension}");
    SUPPORTED_EXTENSIONS
        .contains(&file_type.as_str())
        .then_some(file_type)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn loads_supported_files_in_name_order() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("b.MD"), "# Notes\nfirewall").expect("write");
        fs::write(dir.path().join("a.txt"), "phishing report").expect("write");
        fs::write(dir.path().join("image.png"), [0u8, 1, 2]).expect("write");
        fs::write(dir.path().join("blank.txt"), "   \n").expect("write");
        fs::create_dir(dir.path().join("nested")).expect("mkdir");
        fs::write(dir.path().join("nested").join("c.txt"), "ignored").expect("write");

        let documents = load_documents(dir.path()).expect("load");

        let ids: Vec<&str> = documents.iter().map(|doc| doc.id.as_str()).collect();
        assert_eq!(ids, vec!["a.txt", "b.MD"]);
        assert_eq!(documents[0].file_type, ".txt");
        assert_eq!(documents[1].file_type, ".md");
        assert_eq!(documents[0].sha256, compute_content_hash(b"phishing report"));
        assert_eq!(
            documents[0].fuzzy_hash,
            Some(compute_fuzzy_hash(b"phishing report"))
        );
    }

    #[test]
    fn invalid_utf8_is_replaced() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("latin.txt"), [b'c', b'a', b'f', 0xE9]).expect("write");

        let documents = load_documents(dir.path()).expect("load");
        assert_eq!(documents.len(), 1);
        assert!(documents[0].text.starts_with("caf"));
        assert!(documents[0].text.contains('\u{FFFD}'));
    }

    #[test]
    fn missing_directory_is_an_io_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let error = load_documents(&dir.path().join("absent")).expect_err("missing");
        assert!(matches!(error, PipelineError::Io { .. }));
    }
}

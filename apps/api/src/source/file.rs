use std::path::PathBuf;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::models::{decode_jobs, Job, JobsEnvelope};
use crate::source::{JobSource, SourceError};

/// Reads jobs from a JSON file on every call, so edits show up without a
/// restart. The file holds either a bare array or the API envelope.
pub struct FileJobSource {
    path: PathBuf,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum JobsFile {
    Bare(Vec<Value>),
    Envelope(JobsEnvelope),
}

impl FileJobSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    async fn load(&self) -> Result<Vec<Job>, SourceError> {
        let raw = tokio::fs::read_to_string(&self.path).await?;
        let jobs = match serde_json::from_str::<JobsFile>(&raw)? {
            JobsFile::Bare(items) => decode_jobs(items),
            JobsFile::Envelope(envelope) => envelope.data,
        };
        debug!("Loaded {} jobs from {}", jobs.len(), self.path.display());
        Ok(jobs)
    }
}

#[async_trait]
impl JobSource for FileJobSource {
    async fn fetch_jobs(&self) -> Result<Vec<Job>, SourceError> {
        self.load().await
    }

    async fn fetch_job(&self, id: &str) -> Result<Job, SourceError> {
        self.load()
            .await?
            .into_iter()
            .find(|job| job.id.matches_raw(id))
            .ok_or_else(|| SourceError::NotFound(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::JobId;
    use std::io::Write;

    fn write_temp(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[tokio::test]
    async fn test_reads_bare_array() {
        let file = write_temp(r#"[{ "id": 1, "title": "Tester" }, { "id": 2 }]"#);
        let source = FileJobSource::new(file.path());
        let jobs = source.fetch_jobs().await.unwrap();
        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0].title.as_deref(), Some("Tester"));
    }

    #[tokio::test]
    async fn test_bare_array_skips_bad_records() {
        let file = write_temp(r#"[{ "id": 1 }, { "title": "no id" }, 42]"#);
        let source = FileJobSource::new(file.path());
        let jobs = source.fetch_jobs().await.unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].id, JobId::Int(1));
    }

    #[tokio::test]
    async fn test_reads_envelope() {
        let file = write_temp(
            r#"{ "success": true, "data": [{ "id": "a" }], "pagination": { "totalPages": 1 } }"#,
        );
        let source = FileJobSource::new(file.path());
        let job = source.fetch_job("a").await.unwrap();
        assert_eq!(job.id, JobId::Text("a".to_string()));
    }

    #[tokio::test]
    async fn test_missing_job_is_not_found() {
        let file = write_temp("[]");
        let source = FileJobSource::new(file.path());
        let err = source.fetch_job("9").await.unwrap_err();
        assert!(matches!(err, SourceError::NotFound(id) if id == "9"));
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let source = FileJobSource::new("/nonexistent/jobs.json");
        let err = source.fetch_jobs().await.unwrap_err();
        assert!(matches!(err, SourceError::Io(_)));
    }
}

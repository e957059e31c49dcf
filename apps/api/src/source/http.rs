//! Upstream listing API client.
//!
//! The upstream serves `GET /jobs?page=N&limit=L` as
//! `{ success, message, data, pagination: { totalPages } }`. `fetch_jobs`
//! walks every page so the engine sees the full collection.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::models::{Job, JobsEnvelope};
use crate::source::{JobSource, SourceError};

const MAX_RETRIES: u32 = 3;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
struct UpstreamError {
    message: String,
}

#[derive(Clone, Debug)]
pub struct HttpJobSource {
    client: Client,
    base_url: Url,
    page_limit: u32,
}

impl HttpJobSource {
    pub fn new(base_url: &str, page_limit: u32) -> Result<Self, SourceError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| SourceError::InvalidUrl(format!("{base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(SourceError::InvalidUrl(base_url.to_string()));
        }
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            base_url,
            page_limit: page_limit.max(1),
        })
    }

    /// Appends `segments` to the base path, each percent-encoded as exactly
    /// one path segment.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, SourceError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| SourceError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// GETs `url` and decodes the JSON body. Retries on 429, 5xx and transport
    /// errors with exponential backoff; other statuses fail immediately.
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        query: &[(&str, String)],
    ) -> Result<T, SourceError> {
        let mut last_error: Option<SourceError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                // 1s, 2s
                let delay = Duration::from_millis(1000 * (1 << (attempt - 1)));
                warn!(
                    "Upstream call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = match self.client.get(url.clone()).query(query).send().await {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(SourceError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("Upstream returned {}: {}", status, body);
                last_error = Some(SourceError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<UpstreamError>(&body)
                    .map(|e| e.message)
                    .unwrap_or(body);
                return Err(SourceError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            return Ok(response.json::<T>().await?);
        }

        Err(last_error.unwrap_or(SourceError::Exhausted {
            retries: MAX_RETRIES,
        }))
    }
}

#[async_trait]
impl JobSource for HttpJobSource {
    async fn fetch_jobs(&self) -> Result<Vec<Job>, SourceError> {
        let url = self.endpoint(&["jobs"])?;
        let mut jobs: Vec<Job> = Vec::new();
        let mut page: u64 = 1;

        loop {
            let envelope: JobsEnvelope = self
                .get_json(
                    url.clone(),
                    &[
                        ("limit", self.page_limit.to_string()),
                        ("page", page.to_string()),
                    ],
                )
                .await?;
            if !envelope.success {
                debug!(
                    "Upstream flagged page {} unsuccessful: {}",
                    page,
                    envelope.message.as_deref().unwrap_or_default()
                );
            }

            let fetched = envelope.data.len();
            jobs.extend(envelope.data);
            let total_pages = envelope
                .pagination
                .and_then(|p| p.total_pages)
                .unwrap_or(1);
            debug!("Fetched page {page}/{total_pages} ({fetched} jobs)");

            page += 1;
            if page > total_pages || jobs.is_empty() {
                break;
            }
        }

        info!("Fetched {} jobs from upstream", jobs.len());
        Ok(jobs)
    }

    async fn fetch_job(&self, id: &str) -> Result<Job, SourceError> {
        // "." and ".." would be dropped as segments and resolve elsewhere.
        if matches!(id.trim(), "" | "." | "..") {
            return Err(SourceError::NotFound(id.to_string()));
        }
        let url = self.endpoint(&["jobs", id])?;
        let body: Value = match self.get_json(url, &[]).await {
            Err(SourceError::Api { status: 404, .. }) => {
                return Err(SourceError::NotFound(id.to_string()))
            }
            other => other?,
        };
        // The detail endpoint wraps the job in `data`, older builds did not.
        let job = match body {
            Value::Object(mut map) if map.get("data").is_some_and(Value::is_object) => {
                map.remove("data").unwrap_or_default()
            }
            other => other,
        };
        Ok(serde_json::from_value(job)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use axum::extract::{Path, Query};
    use axum::http::StatusCode as AxumStatus;
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::json;

    use crate::models::JobId;

    const UPSTREAM_TOTAL: usize = 7;

    async fn paged_jobs(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
        let limit: usize = params.get("limit").and_then(|v| v.parse().ok()).unwrap_or(10);
        let page: usize = params.get("page").and_then(|v| v.parse().ok()).unwrap_or(1);
        let data: Vec<Value> = ((page - 1) * limit..(page * limit).min(UPSTREAM_TOTAL))
            .map(|i| json!({ "id": i }))
            .collect();
        Json(json!({
            "success": true,
            "data": data,
            "pagination": {
                "page": page,
                "limit": limit,
                "total": UPSTREAM_TOTAL,
                "totalPages": UPSTREAM_TOTAL.div_ceil(limit),
            },
        }))
    }

    /// Three pages where the middle one came back empty.
    async fn gappy_jobs(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
        let page: u64 = params.get("page").and_then(|v| v.parse().ok()).unwrap_or(1);
        let data = match page {
            1 => json!([{ "id": 1 }]),
            3 => json!([{ "id": 3 }]),
            _ => json!([]),
        };
        Json(json!({ "success": true, "data": data, "pagination": { "totalPages": 3 } }))
    }

    async fn job_detail(Path(id): Path<String>) -> Result<Json<Value>, AxumStatus> {
        if id == "missing" {
            return Err(AxumStatus::NOT_FOUND);
        }
        Ok(Json(json!({ "success": true, "data": { "id": id, "title": "QA" } })))
    }

    async fn admin_secret() -> Json<Value> {
        Json(json!({ "id": 0, "title": "ADMIN SECRET" }))
    }

    async fn spawn_upstream() -> String {
        let app = Router::new()
            .route("/api/jobs", get(paged_jobs))
            .route("/api/jobs/:id", get(job_detail))
            .route("/api/admin/secret", get(admin_secret))
            .route("/gappy/jobs", get(gappy_jobs));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    async fn source_at(path: &str, page_limit: u32) -> HttpJobSource {
        let base = format!("{}{path}", spawn_upstream().await);
        HttpJobSource::new(&base, page_limit).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_jobs_walks_every_page() {
        let source = source_at("/api", 3).await;
        let jobs = source.fetch_jobs().await.unwrap();
        let ids: Vec<JobId> = jobs.into_iter().map(|j| j.id).collect();
        assert_eq!(ids, (0..7).map(JobId::Int).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_fetch_jobs_continues_past_an_empty_page() {
        let source = source_at("/gappy", 1).await;
        let jobs = source.fetch_jobs().await.unwrap();
        let ids: Vec<JobId> = jobs.into_iter().map(|j| j.id).collect();
        assert_eq!(ids, vec![JobId::Int(1), JobId::Int(3)]);
    }

    #[tokio::test]
    async fn test_fetch_job_unwraps_data() {
        let source = source_at("/api", 3).await;
        let job = source.fetch_job("12").await.unwrap();
        assert_eq!(job.id, JobId::Text("12".to_string()));
        assert_eq!(job.title.as_deref(), Some("QA"));
    }

    #[tokio::test]
    async fn test_fetch_job_maps_404_to_not_found() {
        let source = source_at("/api", 3).await;
        let err = source.fetch_job("missing").await.unwrap_err();
        assert!(matches!(err, SourceError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_fetch_job_keeps_id_inside_one_path_segment() {
        let source = source_at("/api", 3).await;
        let job = source.fetch_job("../admin/secret").await.unwrap();
        assert_eq!(job.id, JobId::Text("../admin/secret".to_string()));
        assert_eq!(job.title.as_deref(), Some("QA"));

        for id in ["..", ".", " "] {
            let err = source.fetch_job(id).await.unwrap_err();
            assert!(matches!(err, SourceError::NotFound(_)), "{id:?}: {err}");
        }
    }

    #[test]
    fn test_endpoint_encodes_segments() {
        let source = HttpJobSource::new("http://localhost:5000/api/", 100).unwrap();
        assert_eq!(
            source.endpoint(&["jobs"]).unwrap().as_str(),
            "http://localhost:5000/api/jobs"
        );
        assert_eq!(
            source.endpoint(&["jobs", "a/b?c"]).unwrap().as_str(),
            "http://localhost:5000/api/jobs/a%2Fb%3Fc"
        );
    }

    #[test]
    fn test_invalid_base_url_is_rejected() {
        let err = HttpJobSource::new("not a url", 100).unwrap_err();
        assert!(matches!(err, SourceError::InvalidUrl(_)));
    }

    #[test]
    fn test_page_limit_is_at_least_one() {
        let source = HttpJobSource::new("http://localhost:5000/api", 0).unwrap();
        assert_eq!(source.page_limit, 1);
    }

    #[tokio::test]
    async fn test_unreachable_upstream_reports_http_error() {
        // Port 9 (discard) on localhost refuses connections.
        let source = HttpJobSource::new("http://127.0.0.1:9", 100).unwrap();
        let err = source.fetch_jobs().await.unwrap_err();
        assert!(matches!(err, SourceError::Http(_)), "{err}");
    }
}

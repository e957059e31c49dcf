pub mod job;

pub use job::{decode_jobs, Job, JobId, JobsEnvelope};

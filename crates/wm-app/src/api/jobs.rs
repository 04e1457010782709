//! Dispatch jobs and the driver schedule

use serde_json::Value;
use wm_domain::service::fallback::{with_fallback, ON_VALIDATION};
use wm_types::{HttpMethod, Job, JobPatch, JobStatus, NewJob, Result};

use crate::client::{segment, with_query, ApiClient};

impl ApiClient {
    pub fn list_jobs(&self, status: Option<JobStatus>) -> Result<Vec<Job>> {
        match status {
            Some(status) => self.get(&with_query("/admin/jobs", &[("status", status.as_str())])),
            None => self.get("/admin/jobs"),
        }
    }

    pub fn create_job(&self, job: &NewJob) -> Result<Job> {
        self.post("/admin/jobs", job)
    }

    pub fn patch_job(&self, id: &str, patch: &JobPatch) -> Result<Job> {
        self.patch(&format!("/admin/jobs/{}", segment(id)), patch)
    }

    /// Tasks for a driver.
    ///
    /// Servers answer with either a job list or `{driver, items}`, so the raw
    /// body is returned. Older servers take `?driver=` instead of `?driver_id=`.
    pub fn driver_schedule(&self, driver_id: &str) -> Result<Value> {
        let value = with_fallback(
            ON_VALIDATION,
            || {
                self.request(
                    HttpMethod::Get,
                    &with_query("/driver/schedule", &[("driver_id", driver_id)]),
                    None,
                )
            },
            || {
                self.request(
                    HttpMethod::Get,
                    &with_query("/driver/schedule", &[("driver", driver_id)]),
                    None,
                )
            },
        )?;
        Ok(value)
    }

    pub fn mark_task_done(&self, task_id: &str) -> Result<Value> {
        let value = self.request(
            HttpMethod::Patch,
            &format!("/driver/schedule/{}/done", segment(task_id)),
            None,
        )?;
        Ok(value)
    }
}

/// Task entries of a schedule response, whichever shape it came in
pub fn schedule_items(schedule: &Value) -> &[Value] {
    match schedule {
        Value::Array(items) => items,
        Value::Object(map) => map
            .get("items")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[]),
        _ => &[],
    }
}

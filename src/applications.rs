use chrono::{DateTime, Local, SecondsFormat, Utc};
use std::collections::BTreeMap;

use crate::catalog;
use crate::models::{ApplicationRecord, ApplicationStatus, Job};

/// Persisted shape: job id to record, absent key meaning not applied.
pub type ApplicationsState = BTreeMap<String, ApplicationRecord>;

/// Applied jobs and when they were marked. Only applied jobs have an entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplicationTracker {
    applied: BTreeMap<String, String>,
}

pub struct RecentApplication<'a> {
    pub job: &'a Job,
    pub applied_at: &'a str,
}

impl RecentApplication<'_> {
    /// The application date in local time, or the raw timestamp if it does not parse.
    pub fn local_date(&self) -> String {
        DateTime::parse_from_rfc3339(self.applied_at)
            .map(|at| at.with_timezone(&Local).format("%Y-%m-%d").to_string())
            .unwrap_or_else(|_| self.applied_at.to_string())
    }
}

/// ISO-8601 timestamp with millisecond precision, UTC.
pub fn timestamp(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Millis, true)
}

impl ApplicationTracker {
    /// Keeps only records that say `applied`.
    pub fn from_state(state: ApplicationsState) -> Self {
        let applied = state
            .into_iter()
            .filter(|(_, record)| record.applied)
            .map(|(id, record)| (id, record.applied_at))
            .collect();
        Self { applied }
    }

    pub fn to_state(&self) -> ApplicationsState {
        self.applied
            .iter()
            .map(|(id, at)| {
                let record = ApplicationRecord {
                    applied: true,
                    applied_at: at.clone(),
                };
                (id.clone(), record)
            })
            .collect()
    }

    pub fn status(&self, job_id: &str) -> ApplicationStatus {
        match self.applied.get(job_id) {
            Some(at) => ApplicationStatus::Applied { at: at.clone() },
            None => ApplicationStatus::NotApplied,
        }
    }

    pub fn is_applied(&self, job_id: &str) -> bool {
        self.applied.contains_key(job_id)
    }

    pub fn applied_count(&self) -> usize {
        self.applied.len()
    }

    /// Flips the applied state of `job_id`, stamping `now` when it becomes applied.
    pub fn toggle_applied(&mut self, job_id: &str, now: DateTime<Utc>) -> ApplicationStatus {
        if self.applied.remove(job_id).is_some() {
            return ApplicationStatus::NotApplied;
        }
        let at = timestamp(now);
        self.applied.insert(job_id.to_string(), at.clone());
        ApplicationStatus::Applied { at }
    }

    /// The latest application whose job is still in the catalog.
    ///
    /// Timestamps are compared as strings. If the newest entry's job is gone,
    /// there is no result.
    pub fn most_recent<'a>(&'a self, jobs: &'a [Job]) -> Option<RecentApplication<'a>> {
        let (job_id, applied_at) = self
            .applied
            .iter()
            .filter(|(_, at)| !at.is_empty())
            .max_by(|a, b| a.1.cmp(b.1))?;
        let job = catalog::find(jobs, job_id)?;
        Some(RecentApplication {
            job,
            applied_at: applied_at.as_str(),
        })
    }
}

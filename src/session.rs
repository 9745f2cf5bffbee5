use anyhow::Result;
use chrono::Utc;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::applications::{ApplicationTracker, ApplicationsState, RecentApplication};
use crate::catalog;
use crate::filter;
use crate::models::{ApplicationStatus, EmploymentType, FilterCriteria, Job};
use crate::shortlist::Shortlist;
use crate::store::{APPLIED_KEY, KeyValueStore, RECENT_KEY, SAVED_KEY};

/// One user's browsing session: catalog, shortlist, applications and search.
///
/// Nothing is written to the store until [`Session::hydrate`] has finished.
/// After that, in-memory state is authoritative and every mutation is
/// written through.
pub struct Session {
    store: Arc<dyn KeyValueStore>,
    seed: Vec<Job>,
    jobs: Vec<Job>,
    shortlist: Shortlist,
    applications: ApplicationTracker,
    criteria: FilterCriteria,
    selected: Option<String>,
    hydrated: bool,
    alive: Arc<AtomicBool>,
}

/// Everything read during hydration, applied in one step.
struct Loaded {
    jobs: Vec<Job>,
    saved: Vec<String>,
    applications: ApplicationsState,
    recent: Option<FilterCriteria>,
}

impl Session {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self::with_seed(store, catalog::seed_jobs())
    }

    pub fn with_seed(store: Arc<dyn KeyValueStore>, seed: Vec<Job>) -> Self {
        Self {
            store,
            seed,
            jobs: Vec::new(),
            shortlist: Shortlist::default(),
            applications: ApplicationTracker::default(),
            criteria: FilterCriteria::default(),
            selected: None,
            hydrated: false,
            alive: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Handle that can end the session from elsewhere. Clearing it discards
    /// any hydration still in flight.
    #[cfg(test)]
    pub fn liveness(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.alive)
    }

    fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    #[cfg(test)]
    pub fn is_hydrated(&self) -> bool {
        self.hydrated
    }

    /// Loads persisted state. The session counts as hydrated afterwards even
    /// when a read fails, so later changes are still saved.
    pub async fn hydrate(&mut self) -> Result<()> {
        let loaded = self.load().await;
        if !self.is_alive() {
            tracing::warn!("session closed during hydration, discarding loaded state");
            return loaded.map(|_| ());
        }
        let result = loaded.map(|loaded| self.apply(loaded));
        self.hydrated = true;
        result
    }

    async fn load(&self) -> Result<Loaded> {
        let store = self.store.as_ref();
        let jobs = catalog::load(store, self.seed.clone()).await?;
        let saved: Vec<String> = store.get(SAVED_KEY, Vec::new()).await?;
        let applications: ApplicationsState = store.get(APPLIED_KEY, ApplicationsState::new()).await?;
        let recent: Option<FilterCriteria> = store.get(RECENT_KEY, None).await?;
        Ok(Loaded {
            jobs,
            saved,
            applications,
            recent,
        })
    }

    fn apply(&mut self, loaded: Loaded) {
        self.jobs = loaded.jobs;
        self.shortlist = Shortlist::from_ids(loaded.saved);
        self.applications = ApplicationTracker::from_state(loaded.applications);
        if let Some(recent) = loaded.recent {
            self.criteria = recent;
        }
        tracing::info!(
            jobs = self.jobs.len(),
            saved = self.shortlist.len(),
            applied = self.applications.applied_count(),
            "session hydrated"
        );
    }

    // --- Reads ---

    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn visible_jobs(&self) -> Vec<&Job> {
        filter::filter(&self.jobs, &self.criteria)
    }

    pub fn filters_active(&self) -> bool {
        filter::filters_active(&self.criteria)
    }

    pub fn job(&self, job_id: &str) -> Option<&Job> {
        catalog::find(&self.jobs, job_id)
    }

    pub fn is_saved(&self, job_id: &str) -> bool {
        self.shortlist.contains(job_id)
    }

    pub fn is_applied(&self, job_id: &str) -> bool {
        self.applications.is_applied(job_id)
    }

    pub fn application_status(&self, job_id: &str) -> ApplicationStatus {
        self.applications.status(job_id)
    }

    pub fn saved_count(&self) -> usize {
        self.shortlist.len()
    }

    pub fn applied_count(&self) -> usize {
        self.applications.applied_count()
    }

    pub fn saved_jobs(&self) -> Vec<&Job> {
        self.shortlist.saved_jobs(&self.jobs)
    }

    pub fn most_recent_application(&self) -> Option<RecentApplication<'_>> {
        self.applications.most_recent(&self.jobs)
    }

    pub fn selected_job(&self) -> Option<&Job> {
        self.selected.as_deref().and_then(|id| self.job(id))
    }

    // --- Mutations ---

    pub fn select_job(&mut self, job_id: &str) {
        self.selected = Some(job_id.to_string());
    }

    /// Drops the selection so detail-view toggles become no-ops.
    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    pub async fn toggle_save(&mut self, job_id: &str) -> Result<bool> {
        let saved = self.shortlist.toggle(job_id);
        self.persist_saved().await?;
        Ok(saved)
    }

    /// Removes from the shortlist without ever adding.
    pub async fn remove_saved(&mut self, job_id: &str) -> Result<()> {
        if self.shortlist.remove(job_id) {
            self.persist_saved().await?;
        }
        Ok(())
    }

    pub async fn toggle_applied(&mut self, job_id: &str) -> Result<ApplicationStatus> {
        let status = self.applications.toggle_applied(job_id, Utc::now());
        self.persist_applications().await?;
        Ok(status)
    }

    /// Toggles the saved flag of the selected job. No-op without a selection.
    pub async fn toggle_save_selected(&mut self) -> Result<Option<bool>> {
        match self.selected.clone() {
            Some(id) => self.toggle_save(&id).await.map(Some),
            None => Ok(None),
        }
    }

    pub async fn toggle_applied_selected(&mut self) -> Result<Option<ApplicationStatus>> {
        match self.selected.clone() {
            Some(id) => self.toggle_applied(&id).await.map(Some),
            None => Ok(None),
        }
    }

    pub async fn set_keyword(&mut self, keyword: &str) -> Result<()> {
        self.criteria.keyword = keyword.to_string();
        self.persist_search().await
    }

    pub async fn set_location(&mut self, location: &str) -> Result<()> {
        self.criteria.location = location.to_string();
        self.persist_search().await
    }

    pub async fn set_employment_type(&mut self, employment_type: Option<EmploymentType>) -> Result<()> {
        self.criteria.employment_type = employment_type;
        self.persist_search().await
    }

    pub async fn set_salary_range(&mut self, label: &str) -> Result<()> {
        self.criteria.salary_range = label.to_string();
        self.persist_search().await
    }

    pub async fn set_remote_only(&mut self, remote_only: bool) -> Result<()> {
        self.criteria.remote_only = remote_only;
        self.persist_search().await
    }

    pub async fn toggle_remote_only(&mut self) -> Result<()> {
        self.set_remote_only(!self.criteria.remote_only).await
    }

    /// Clears keyword and location.
    pub async fn clear_search(&mut self) -> Result<()> {
        self.criteria.keyword.clear();
        self.criteria.location.clear();
        self.persist_search().await
    }

    /// Clears employment type, salary range and remote-only.
    pub async fn reset_filters(&mut self) -> Result<()> {
        self.criteria.employment_type = None;
        self.criteria.salary_range.clear();
        self.criteria.remote_only = false;
        self.persist_search().await
    }

    // --- Write-through, gated on hydration ---

    async fn persist_saved(&self) -> Result<()> {
        if !self.hydrated {
            return Ok(());
        }
        self.store.as_ref().set(SAVED_KEY, self.shortlist.ids()).await
    }

    async fn persist_applications(&self) -> Result<()> {
        if !self.hydrated {
            return Ok(());
        }
        self.store.as_ref().set(APPLIED_KEY, &self.applications.to_state()).await
    }

    async fn persist_search(&self) -> Result<()> {
        if !self.hydrated {
            return Ok(());
        }
        self.store.as_ref().set(RECENT_KEY, &self.criteria).await
    }
}

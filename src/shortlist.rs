use crate::models::Job;

/// Saved job ids, in the order they were saved. Never holds duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Shortlist {
    ids: Vec<String>,
}

impl Shortlist {
    /// Builds from persisted ids, dropping repeats.
    pub fn from_ids(ids: Vec<String>) -> Self {
        let mut shortlist = Self::default();
        for id in ids {
            if !shortlist.contains(&id) {
                shortlist.ids.push(id);
            }
        }
        shortlist
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn contains(&self, job_id: &str) -> bool {
        self.ids.iter().any(|id| id == job_id)
    }

    /// Removes `job_id` if saved, appends it otherwise. Returns the new membership.
    pub fn toggle(&mut self, job_id: &str) -> bool {
        if self.remove(job_id) {
            false
        } else {
            self.ids.push(job_id.to_string());
            true
        }
    }

    /// Returns whether anything was removed.
    pub fn remove(&mut self, job_id: &str) -> bool {
        let before = self.ids.len();
        self.ids.retain(|id| id != job_id);
        self.ids.len() != before
    }

    /// Catalog jobs on the shortlist, in catalog order. Dangling ids are skipped.
    pub fn saved_jobs<'a>(&self, jobs: &'a [Job]) -> Vec<&'a Job> {
        jobs.iter().filter(|job| self.contains(&job.id)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::seed_jobs;

    fn list(ids: &[&str]) -> Shortlist {
        Shortlist::from_ids(ids.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn test_toggle_appends_then_removes() {
        let mut shortlist = list(&["pocket-01"]);
        assert!(shortlist.toggle("pocket-03"));
        assert_eq!(shortlist.ids(), ["pocket-01", "pocket-03"]);

        assert!(!shortlist.toggle("pocket-01"));
        assert_eq!(shortlist.ids(), ["pocket-03"]);
    }

    #[test]
    fn test_toggle_twice_is_identity() {
        let original = list(&["pocket-02", "pocket-05"]);
        for id in ["pocket-02", "pocket-09"] {
            let mut shortlist = original.clone();
            shortlist.toggle(id);
            shortlist.toggle(id);
            assert_eq!(shortlist.ids().len(), original.len());
            assert!(original.ids().iter().all(|saved| shortlist.contains(saved)));
        }
    }

    #[test]
    fn test_from_ids_drops_duplicates() {
        let shortlist = list(&["a", "b", "a", "c", "b"]);
        assert_eq!(shortlist.ids(), ["a", "b", "c"]);
    }

    #[test]
    fn test_remove_never_adds() {
        let mut shortlist = list(&["a"]);
        assert!(!shortlist.remove("b"));
        assert!(shortlist.remove("a"));
        assert!(shortlist.is_empty());
    }

    #[test]
    fn test_saved_jobs_skips_dangling_ids() {
        let jobs = seed_jobs();
        let shortlist = list(&["pocket-04", "deleted-job", "pocket-02"]);
        let saved: Vec<&str> = shortlist.saved_jobs(&jobs).iter().map(|j| j.id.as_str()).collect();
        assert_eq!(saved, vec!["pocket-02", "pocket-04"]);
        assert_eq!(shortlist.len(), 3);
    }
}

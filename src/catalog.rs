use anyhow::Result;
use std::collections::HashSet;

use crate::models::{EmploymentType, Job};
use crate::store::{JOBS_KEY, KeyValueStore};

fn job(
    id: &str,
    title: &str,
    company: &str,
    location: &str,
    is_remote: bool,
    salary: &str,
    employment_type: EmploymentType,
    tags: &[&str],
) -> Job {
    Job {
        id: id.to_string(),
        title: title.to_string(),
        company: company.to_string(),
        location: location.to_string(),
        is_remote,
        salary: salary.to_string(),
        employment_type,
        tags: tags.iter().map(|t| t.to_string()).collect(),
    }
}

/// Built-in postings shipped with the app.
pub fn seed_jobs() -> Vec<Job> {
    use EmploymentType::*;
    vec![
        job("pocket-01", "Senior Product Designer", "Nova Systems", "Remote - EU", true,
            "$120k - $150k", FullTime, &["Figma", "Design Systems", "SaaS"]),
        job("pocket-02", "Full-stack Engineer", "Orbit Labs", "San Francisco, CA", true,
            "$140k - $180k", FullTime, &["TypeScript", "Next.js", "Node"]),
        job("pocket-03", "Product Manager - Growth", "Driftwave", "New York, NY", false,
            "$110k - $140k", FullTime, &["Experimentation", "B2B", "Analytics"]),
        job("pocket-04", "Frontend Engineer (React/Next)", "Signal Studio", "Remote - US", true,
            "$90k - $130k", Contract, &["React", "Next.js", "Animations"]),
        job("pocket-05", "Data Analyst", "Northwind Insights", "Austin, TX", false,
            "$80k - $105k", FullTime, &["SQL", "dbt", "Looker"]),
        job("pocket-06", "UX Researcher", "Daybreak", "Remote - Global", true,
            "$90k - $120k", Contract, &["Research", "Remote", "Product Discovery"]),
    ]
}

/// Merges the seed into a previously stored catalog.
///
/// Stored jobs keep their order and data; seed jobs with unseen ids are
/// appended in seed order. With nothing stored the seed is returned as is.
pub fn merge(seed: Vec<Job>, stored: Option<Vec<Job>>) -> Vec<Job> {
    let mut merged = match stored {
        Some(stored) if !stored.is_empty() => stored,
        _ => return seed,
    };
    let mut known: HashSet<String> = merged.iter().map(|j| j.id.clone()).collect();
    for job in seed {
        if known.insert(job.id.clone()) {
            merged.push(job);
        }
    }
    merged
}

/// Loads the durable catalog: read, merge with `seed`, write back.
///
/// The write happens on every load, even when nothing changed.
pub async fn load(store: &dyn KeyValueStore, seed: Vec<Job>) -> Result<Vec<Job>> {
    let stored: Option<Vec<Job>> = store.get(JOBS_KEY, None).await?;
    let stored_len = stored.as_ref().map_or(0, Vec::len);
    let merged = merge(seed, stored);
    tracing::info!(stored = stored_len, total = merged.len(), "catalog loaded");
    store.set(JOBS_KEY, &merged).await?;
    Ok(merged)
}

/// Looks a job up by id.
pub fn find<'a>(jobs: &'a [Job], id: &str) -> Option<&'a Job> {
    jobs.iter().find(|j| j.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn ids(jobs: &[Job]) -> Vec<&str> {
        jobs.iter().map(|j| j.id.as_str()).collect()
    }

    #[test]
    fn test_seed_ids_are_unique() {
        let seed = seed_jobs();
        let unique: HashSet<&str> = seed.iter().map(|j| j.id.as_str()).collect();
        assert_eq!(unique.len(), seed.len());
        assert_eq!(seed.len(), 6);
    }

    #[test]
    fn test_merge_without_stored_returns_seed() {
        assert_eq!(merge(seed_jobs(), None), seed_jobs());
        assert_eq!(merge(seed_jobs(), Some(Vec::new())), seed_jobs());
    }

    #[test]
    fn test_merge_keeps_stored_data_and_order() {
        let mut edited = seed_jobs()[2].clone();
        edited.title = "Edited title".to_string();
        let custom = job("custom-1", "Platform Engineer", "Acme", "Berlin", false,
            "$100k", EmploymentType::Freelance, &[]);
        let stored = vec![custom.clone(), edited.clone()];

        let merged = merge(seed_jobs(), Some(stored));
        assert_eq!(
            ids(&merged),
            vec!["custom-1", "pocket-03", "pocket-01", "pocket-02", "pocket-04", "pocket-05", "pocket-06"]
        );
        assert_eq!(merged[1].title, "Edited title");
    }

    #[test]
    fn test_merge_contains_every_id_once() {
        let stored = vec![seed_jobs()[5].clone(), seed_jobs()[0].clone()];
        let merged = merge(seed_jobs(), Some(stored));
        let unique: HashSet<&str> = merged.iter().map(|j| j.id.as_str()).collect();
        assert_eq!(unique.len(), merged.len());
        assert_eq!(merged.len(), 6);
    }

    #[tokio::test]
    async fn test_load_writes_back_even_when_unchanged() {
        let store = MemoryStore::new();
        let first = load(&store, seed_jobs()).await.unwrap();
        let second = load(&store, seed_jobs()).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(store.write_count(JOBS_KEY).await, 2);
    }

    #[tokio::test]
    async fn test_load_adds_new_seed_jobs_after_stored() {
        let store = MemoryStore::new();
        let old_seed = seed_jobs()[..2].to_vec();
        load(&store, old_seed).await.unwrap();

        let merged = load(&store, seed_jobs()).await.unwrap();
        assert_eq!(merged.len(), 6);
        assert_eq!(ids(&merged)[..2], ["pocket-01", "pocket-02"]);
    }

    #[test]
    fn test_find() {
        let jobs = seed_jobs();
        assert_eq!(find(&jobs, "pocket-05").map(|j| j.company.as_str()), Some("Northwind Insights"));
        assert!(find(&jobs, "gone").is_none());
    }
}

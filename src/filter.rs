use regex::Regex;
use std::sync::OnceLock;

use crate::models::{FilterCriteria, Job, SALARY_RANGES};

fn salary_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(\d[\d,]*)(\s*[kK])?").expect("valid salary pattern"))
}

/// Minimum salary in dollars for a salary-range label. Zero means no threshold.
pub fn salary_threshold(label: &str) -> u64 {
    let label = label.trim();
    if label.is_empty() {
        return 0;
    }
    if let Some((_, min)) = SALARY_RANGES
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(label))
    {
        return *min;
    }
    // Unlisted labels read as "<n>k+"
    let digits: String = label.chars().filter(|c| c.is_ascii_digit()).collect();
    digits
        .parse::<u64>()
        .ok()
        .and_then(|n| n.checked_mul(1000))
        .unwrap_or(0)
}

/// Lower bound of a free-text salary label, in dollars.
///
/// Reads the first number. A `k` suffix or a value under 1000 means thousands.
/// Numbers too large to represent read as unparseable.
pub fn salary_floor(salary: &str) -> Option<u64> {
    let caps = salary_pattern().captures(salary)?;
    let digits: String = caps[1].chars().filter(|c| c.is_ascii_digit()).collect();
    let num = digits.parse::<u64>().ok()?;
    if caps.get(2).is_some() || num < 1000 {
        num.checked_mul(1000)
    } else {
        Some(num)
    }
}

/// True when any of the five fields differs from its default.
pub fn filters_active(criteria: &FilterCriteria) -> bool {
    !criteria.keyword.trim().is_empty()
        || !criteria.location.trim().is_empty()
        || criteria.employment_type.is_some()
        || salary_threshold(&criteria.salary_range) > 0
        || criteria.remote_only
}

/// Jobs passing every active predicate, in input order.
pub fn filter<'a>(jobs: &'a [Job], criteria: &FilterCriteria) -> Vec<&'a Job> {
    let keyword = criteria.keyword.trim().to_lowercase();
    let location = criteria.location.trim().to_lowercase();
    let salary_min = salary_threshold(&criteria.salary_range);

    jobs.iter()
        .filter(|job| {
            if !keyword.is_empty() {
                let target = format!("{} {}", job.title, job.company).to_lowercase();
                if !target.contains(&keyword) {
                    return false;
                }
            }

            if !location.is_empty() {
                let suffix = if job.is_remote { " remote" } else { "" };
                let target = format!("{}{}", job.location, suffix).to_lowercase();
                if !target.contains(&location) {
                    return false;
                }
            }

            if criteria.remote_only && !job.is_remote {
                return false;
            }

            if let Some(wanted) = criteria.employment_type {
                if job.employment_type != wanted {
                    return false;
                }
            }

            // Unparseable salaries pass
            if salary_min > 0 {
                if let Some(floor) = salary_floor(&job.salary) {
                    if floor < salary_min {
                        return false;
                    }
                }
            }

            true
        })
        .collect()
}

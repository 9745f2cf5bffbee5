use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EmploymentType {
    #[serde(rename = "Full-time")]
    FullTime,
    #[serde(rename = "Part-time")]
    PartTime,
    Contract,
    Internship,
    Freelance,
}

impl EmploymentType {
    pub const ALL: [EmploymentType; 5] = [
        EmploymentType::FullTime,
        EmploymentType::PartTime,
        EmploymentType::Contract,
        EmploymentType::Internship,
        EmploymentType::Freelance,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            EmploymentType::FullTime => "Full-time",
            EmploymentType::PartTime => "Part-time",
            EmploymentType::Contract => "Contract",
            EmploymentType::Internship => "Internship",
            EmploymentType::Freelance => "Freelance",
        }
    }

    /// Parses a filter label. "All", "any" and blank mean no filter (`Ok(None)`).
    pub fn parse_filter(label: &str) -> anyhow::Result<Option<Self>> {
        let trimmed = label.trim();
        if trimmed.is_empty()
            || trimmed.eq_ignore_ascii_case("all")
            || trimmed.eq_ignore_ascii_case("any")
        {
            return Ok(None);
        }
        Self::ALL
            .iter()
            .find(|t| t.label().eq_ignore_ascii_case(trimmed))
            .copied()
            .map(Some)
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "Unknown employment type '{}'. Available: All, Full-time, Part-time, Contract, Internship, Freelance",
                    trimmed
                )
            })
    }
}

impl fmt::Display for EmploymentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: String,
    pub title: String,
    pub company: String,
    pub location: String,
    pub is_remote: bool,
    pub salary: String, // free-text label, e.g. "$120k - $150k"
    pub employment_type: EmploymentType,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Salary range labels offered by the filter bar, with their minimum in dollars.
pub const SALARY_RANGES: [(&str, u64); 5] = [
    ("Any", 0),
    ("50k+", 50_000),
    ("80k+", 80_000),
    ("120k+", 120_000),
    ("150k+", 150_000),
];

/// Employment type labels offered by the filter bar.
pub const EMPLOYMENT_FILTERS: [&str; 5] = ["All", "Full-time", "Part-time", "Contract", "Internship"];

/// The five search/filter fields. Also the persisted `recent_searches` snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterCriteria {
    pub keyword: String,
    pub location: String,
    #[serde(with = "employment_filter")]
    pub employment_type: Option<EmploymentType>,
    pub salary_range: String,
    pub remote_only: bool,
}

/// Stored as the bare label, with "" standing for "any".
mod employment_filter {
    use super::*;

    pub fn serialize<S: Serializer>(value: &Option<EmploymentType>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(value.map(|t| t.label()).unwrap_or(""))
    }

    /// Unknown labels restore as "any" so an old snapshot never blocks a session.
    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<EmploymentType>, D::Error> {
        let label = String::deserialize(d)?;
        Ok(EmploymentType::parse_filter(&label).unwrap_or_else(|_| {
            tracing::warn!(label = %label, "unknown employment type in saved search, ignoring");
            None
        }))
    }
}

/// Persisted shape of one `applications` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationRecord {
    pub applied: bool,
    #[serde(default)]
    pub applied_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplicationStatus {
    NotApplied,
    Applied { at: String },
}

impl ApplicationStatus {
    pub fn is_applied(&self) -> bool {
        matches!(self, ApplicationStatus::Applied { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_uses_camel_case_keys() {
        let json = r#"{
            "id": "pocket-01",
            "title": "Senior Product Designer",
            "company": "Nova Systems",
            "location": "Remote - EU",
            "isRemote": true,
            "salary": "$120k - $150k",
            "employmentType": "Full-time",
            "tags": ["Figma"]
        }"#;
        let job: Job = serde_json::from_str(json).unwrap();
        assert!(job.is_remote);
        assert_eq!(job.employment_type, EmploymentType::FullTime);

        let value = serde_json::to_value(&job).unwrap();
        assert_eq!(value["employmentType"], "Full-time");
        assert_eq!(value["isRemote"], true);
    }

    #[test]
    fn test_job_tags_are_optional() {
        let json = r#"{"id":"x","title":"t","company":"c","location":"l",
            "isRemote":false,"salary":"","employmentType":"Freelance"}"#;
        let job: Job = serde_json::from_str(json).unwrap();
        assert!(job.tags.is_empty());
    }

    #[test]
    fn test_parse_filter_labels() {
        assert_eq!(EmploymentType::parse_filter("").unwrap(), None);
        assert_eq!(EmploymentType::parse_filter("All").unwrap(), None);
        assert_eq!(EmploymentType::parse_filter("any").unwrap(), None);
        assert_eq!(
            EmploymentType::parse_filter("contract").unwrap(),
            Some(EmploymentType::Contract)
        );
        assert!(EmploymentType::parse_filter("Gig").is_err());
    }

    #[test]
    fn test_criteria_snapshot_shape() {
        let criteria = FilterCriteria {
            keyword: "design".to_string(),
            employment_type: Some(EmploymentType::PartTime),
            ..Default::default()
        };
        let value = serde_json::to_value(&criteria).unwrap();
        assert_eq!(value["keyword"], "design");
        assert_eq!(value["employmentType"], "Part-time");
        assert_eq!(value["salaryRange"], "");
        assert_eq!(value["remoteOnly"], false);

        let any: FilterCriteria = serde_json::from_str(r#"{"employmentType":""}"#).unwrap();
        assert_eq!(any, FilterCriteria::default());
    }

    #[test]
    fn test_unknown_employment_type_reads_as_any() {
        let criteria: FilterCriteria =
            serde_json::from_str(r#"{"keyword":"design","employmentType":"Temporary"}"#).unwrap();
        assert_eq!(criteria.employment_type, None);
        assert_eq!(criteria.keyword, "design");
    }
}

use std::env;
use std::path::PathBuf;

use crate::db::SqliteStore;

pub const DB_ENV: &str = "POCKETJOBS_DB";
pub const LOG_ENV: &str = "POCKETJOBS_LOG";
pub const LOG_DIR_ENV: &str = "POCKETJOBS_LOG_DIR";

const DEFAULT_LOG_FILTER: &str = "pocketjobs=warn";

#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: PathBuf,
    pub log_filter: String,
    pub log_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> Self {
        let db_path = env::var_os(DB_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(SqliteStore::default_path);
        let log_filter = env::var(LOG_ENV).unwrap_or_else(|_| DEFAULT_LOG_FILTER.to_string());
        // Logs go next to the database unless told otherwise
        let log_dir = env::var_os(LOG_DIR_ENV).map(PathBuf::from).unwrap_or_else(|| {
            db_path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("."))
        });
        Self {
            db_path,
            log_filter,
            log_dir,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_env_overrides_and_defaults() {
        let original = env::var_os(DB_ENV);
        unsafe {
            env::set_var(DB_ENV, "/tmp/pocketjobs-test/jobs.db");
            env::remove_var(LOG_DIR_ENV);
        }

        let config = Config::from_env();

        if let Some(val) = original {
            unsafe { env::set_var(DB_ENV, val); }
        } else {
            unsafe { env::remove_var(DB_ENV); }
        }

        assert_eq!(config.db_path, PathBuf::from("/tmp/pocketjobs-test/jobs.db"));
        assert_eq!(config.log_dir, PathBuf::from("/tmp/pocketjobs-test"));
    }
}

mod applications;
mod catalog;
mod config;
mod db;
mod filter;
mod logging;
mod models;
mod session;
mod shortlist;
mod store;
mod tui;

use anyhow::{Result, anyhow};
use clap::{Parser, Subcommand};
use config::Config;
use db::SqliteStore;
use models::{ApplicationStatus, EmploymentType, Job};
use session::Session;
use std::sync::Arc;
use store::{KeyValueStore, MemoryStore};

#[derive(Parser)]
#[command(name = "pocketjobs")]
#[command(about = "Curated roles in your pocket - search, shortlist, and track applications")]
struct Cli {
    /// Keep everything in memory for this run; nothing is read from or written to disk
    #[arg(long, global = true)]
    in_memory: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database
    Init,

    /// List roles matching the remembered search
    List {
        /// Role or company keyword
        #[arg(short, long)]
        keyword: Option<String>,

        /// Location, or "remote"
        #[arg(short, long)]
        location: Option<String>,

        /// Employment type (All, Full-time, Part-time, Contract, Internship, Freelance)
        #[arg(short = 't', long = "type")]
        employment_type: Option<String>,

        /// Salary range (Any, 50k+, 80k+, 120k+, 150k+)
        #[arg(short, long)]
        salary: Option<String>,

        /// Only remote-friendly roles (pass false to turn off)
        #[arg(short, long, num_args = 0..=1, default_missing_value = "true")]
        remote: Option<bool>,
    },

    /// Show role details
    Show {
        /// Job ID
        id: String,
    },

    /// Save a role to your pocket, or unsave it
    Save {
        /// Job ID
        id: String,
    },

    /// Mark a role as applied, or unmark it
    Apply {
        /// Job ID
        id: String,
    },

    /// List saved roles
    Saved,

    /// Remove a role from your saved list
    Remove {
        /// Job ID
        id: String,
    },

    /// Show saved and application activity
    Profile,

    /// Clear keyword and location
    Clear,

    /// Reset employment type, salary, and remote filters
    Reset,

    /// Browse roles interactively
    Browse,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env();

    // Keep the guard alive until exit so file logs are flushed
    let _guard = match cli.command {
        Commands::Browse => Some(logging::init_file(&config.log_filter, &config.log_dir)?),
        _ => {
            logging::init_stderr(&config.log_filter);
            None
        }
    };

    let store: Arc<dyn KeyValueStore> = if cli.in_memory {
        Arc::new(MemoryStore::new())
    } else {
        let db = SqliteStore::open(&config.db_path)?;
        if let Commands::Init = cli.command {
            db.init()?;
            println!("Database initialized at {}", db.path().display());
            return Ok(());
        }
        db.ensure_initialized()?;
        Arc::new(db)
    };

    let mut session = Session::new(store);
    session.hydrate().await?;
    run(cli.command, &mut session).await
}

async fn run(command: Commands, session: &mut Session) -> Result<()> {
    match command {
        Commands::Init => println!("Nothing to initialize for an in-memory session."),

        Commands::List {
            keyword,
            location,
            employment_type,
            salary,
            remote,
        } => {
            if let Some(keyword) = keyword {
                session.set_keyword(&keyword).await?;
            }
            if let Some(location) = location {
                session.set_location(&location).await?;
            }
            if let Some(label) = employment_type {
                session.set_employment_type(EmploymentType::parse_filter(&label)?).await?;
            }
            if let Some(label) = salary {
                let label = if label.eq_ignore_ascii_case("any") { String::new() } else { label };
                session.set_salary_range(&label).await?;
            }
            if let Some(remote) = remote {
                session.set_remote_only(remote).await?;
            }
            print_listing(session);
        }

        Commands::Show { id } => match session.job(&id) {
            Some(job) => {
                print_job(job);
                if session.is_saved(&id) {
                    println!("Saved: yes");
                }
                if let ApplicationStatus::Applied { at } = session.application_status(&id) {
                    println!("Applied: {}", at);
                }
            }
            None => println!("Job {} not found.", id),
        },

        Commands::Save { id } => {
            let job = require_job(session, &id)?.title.clone();
            if session.toggle_save(&id).await? {
                println!("Saved '{}'. {} in your pocket.", job, plural(session.saved_count(), "job"));
            } else {
                println!("Removed '{}' from saved jobs.", job);
            }
        }

        Commands::Apply { id } => {
            let job = require_job(session, &id)?.title.clone();
            match session.toggle_applied(&id).await? {
                ApplicationStatus::Applied { at } => println!("Marked '{}' as applied ({}).", job, at),
                ApplicationStatus::NotApplied => println!("Unmarked '{}' as applied.", job),
            }
        }

        Commands::Saved => {
            let saved = session.saved_jobs();
            if saved.is_empty() {
                println!("Nothing saved yet. Browse roles and save them to keep them in your pocket.");
            } else {
                println!("{:<12} {:<9} {:<30} {:<20}", "ID", "APPLIED", "TITLE", "COMPANY");
                println!("{}", "-".repeat(74));
                for job in saved {
                    println!(
                        "{:<12} {:<9} {:<30} {:<20}",
                        job.id,
                        if session.is_applied(&job.id) { "yes" } else { "-" },
                        truncate(&job.title, 28),
                        truncate(&job.company, 18)
                    );
                }
            }
        }

        Commands::Remove { id } => {
            let was_saved = session.is_saved(&id);
            session.remove_saved(&id).await?;
            if was_saved {
                println!("Removed {} from saved jobs.", id);
            } else {
                println!("{} was not saved.", id);
            }
        }

        Commands::Profile => {
            println!("Catalog:       {}", plural(session.jobs().len(), "role"));
            println!("Saved roles:   {}", session.saved_count());
            println!("Applications:  {}", session.applied_count());
            match session.most_recent_application() {
                Some(recent) => {
                    println!("\nMost recent application");
                    println!("  {}", recent.job.title);
                    println!("  {}", recent.job.company);
                    println!("  Applied on {}", recent.local_date());
                }
                None => println!("\nNo applications yet."),
            }
        }

        Commands::Clear => {
            session.clear_search().await?;
            print_listing(session);
        }

        Commands::Reset => {
            session.reset_filters().await?;
            print_listing(session);
        }

        Commands::Browse => tui::run_browse(session).await?,
    }

    Ok(())
}

fn require_job<'a>(session: &'a Session, id: &str) -> Result<&'a Job> {
    session.job(id).ok_or_else(|| anyhow!("Job {} not found", id))
}

fn print_listing(session: &Session) {
    let jobs = session.visible_jobs();
    let status = if session.filters_active() { "Filters active" } else { "Curated for you" };
    println!("{} found. {}", plural(jobs.len(), "role"), status);
    if jobs.is_empty() {
        println!("No roles match your filters yet. Try 'pocketjobs clear' or 'pocketjobs reset'.");
        return;
    }
    println!(
        "{:<12} {:<2} {:<30} {:<20} {:<20} {:>14}",
        "ID", "", "TITLE", "COMPANY", "LOCATION", "SALARY"
    );
    println!("{}", "-".repeat(103));
    for job in jobs {
        let saved = if session.is_saved(&job.id) { "*" } else { "" };
        println!(
            "{:<12} {:<2} {:<30} {:<20} {:<20} {:>14}",
            job.id,
            saved,
            truncate(&job.title, 28),
            truncate(&job.company, 18),
            truncate(&job.location, 18),
            job.salary
        );
    }
}

fn print_job(job: &Job) {
    println!("Job {}", job.id);
    println!("Title: {}", job.title);
    println!("Company: {}", job.company);
    if job.is_remote {
        println!("Location: {} (remote friendly)", job.location);
    } else {
        println!("Location: {}", job.location);
    }
    println!("Type: {}", job.employment_type);
    println!("Salary: {}", job.salary);
    if !job.tags.is_empty() {
        println!("Tags: {}", job.tags.join(", "));
    }
}

fn plural(n: usize, noun: &str) -> String {
    format!("{} {}{}", n, noun, if n == 1 { "" } else { "s" })
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Data Analyst", 28), "Data Analyst");
        assert_eq!(truncate("Frontend Engineer (React/Next)", 12), "Frontend ...");
    }

    #[test]
    fn test_plural() {
        assert_eq!(plural(1, "role"), "1 role");
        assert_eq!(plural(0, "role"), "0 roles");
    }

    #[test]
    fn test_cli_parses_filter_flags() {
        let cli = Cli::try_parse_from([
            "pocketjobs", "list", "--keyword", "design", "--type", "Contract", "--remote",
        ])
        .unwrap();
        match cli.command {
            Commands::List { keyword, employment_type, remote, location, salary } => {
                assert_eq!(keyword.as_deref(), Some("design"));
                assert_eq!(employment_type.as_deref(), Some("Contract"));
                assert_eq!(remote, Some(true));
                assert!(location.is_none());
                assert!(salary.is_none());
            }
            _ => panic!("expected list"),
        }
    }
}

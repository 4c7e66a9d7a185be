use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use registry_retention::config::{self, Config};
use registry_retention::domain::RepositoryTags;
use registry_retention::ui;

#[derive(Parser)]
#[command(
    name = "registry-retention",
    about = "Decide which registry tags and bucket folders are safe to delete"
)]
struct Args {
    #[arg(short, long, global = true, help = "Custom configuration file path")]
    config: Option<String>,

    #[arg(short, long, global = true, help = "Log every retention decision")]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check that a release tag date matches its commit date (CI gate)
    CheckReleaseTag {
        #[arg(long, help = "Release tag to check")]
        tag: String,

        #[arg(long, help = "RFC 3339 commit timestamp")]
        commit_date: String,
    },

    /// Print which dated tags are kept and which may be deleted
    KeepSet {
        #[arg(long, help = "Use the snapshot pattern and window instead of the release one")]
        snapshot: bool,

        #[arg(help = "File with one tag per line, stdin when omitted")]
        tags: Option<String>,
    },

    /// Print the disposition of every tag of one project
    Classify {
        #[arg(long, help = "File with '<branch> <last-commit-rfc3339>' per line")]
        branches: Option<String>,

        #[arg(long, help = "Registry repository the tags belong to")]
        repository: Option<String>,

        #[arg(help = "File with one tag per line, stdin when omitted")]
        tags: Option<String>,
    },

    /// Print the snapshot tags that may be deleted
    Snapshots {
        #[arg(help = "File with '<repository> <tag>' per line, stdin when omitted")]
        listing: Option<String>,
    },

    /// Print the bucket folders that may be deleted, per group
    Prune {
        #[arg(long, help = "Pattern with (?P<group>...) and (?P<id>...) captures")]
        pattern: Option<String>,

        #[arg(long, help = "Number of highest ids to keep per group")]
        keep: Option<usize>,

        #[arg(help = "File with one item per line, stdin when omitted")]
        items: Option<String>,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(args.verbose);

    let config = match config::load_config(args.config.as_deref()) {
        Ok(cfg) => cfg,
        Err(e) => {
            ui::display_error(&format!("Error loading config: {}", e));
            std::process::exit(1);
        }
    };

    match args.command {
        Command::CheckReleaseTag { tag, commit_date } => {
            check_release_tag(&config, &tag, &commit_date)
        }
        Command::KeepSet { snapshot, tags } => keep_set(&config, snapshot, tags.as_deref()),
        Command::Classify {
            branches,
            repository,
            tags,
        } => classify(&config, branches.as_deref(), repository, tags.as_deref()),
        Command::Snapshots { listing } => snapshots(&config, listing.as_deref()),
        Command::Prune {
            pattern,
            keep,
            items,
        } => prune(&config, pattern.as_deref(), keep, items.as_deref()),
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn check_release_tag(config: &Config, tag: &str, commit_date: &str) -> Result<()> {
    let engine = config.compile().context("invalid configuration")?;

    if let Err(e) = engine.check_release_tag(tag, commit_date) {
        ui::display_error(&format!("Tag {} is not valid: {}", tag, e));
        std::process::exit(1);
    }

    ui::display_success(&format!("Tag {} is valid", tag));
    Ok(())
}

fn keep_set(config: &Config, snapshot: bool, tags_path: Option<&str>) -> Result<()> {
    let engine = config.compile().context("invalid configuration")?;
    let tags = ui::read_lines(tags_path).context("can not read tags")?;

    let window = if snapshot {
        engine.snapshot_window()
    } else {
        engine.release_window()
    };

    let outcome = window.evaluate(&tags, Utc::now());
    ui::display_window_outcome(&outcome);

    Ok(())
}

fn classify(
    config: &Config,
    branches_path: Option<&str>,
    repository: Option<String>,
    tags_path: Option<&str>,
) -> Result<()> {
    let engine = config.compile().context("invalid configuration")?;
    let tags = ui::read_lines(tags_path).context("can not read tags")?;
    let now = Utc::now();

    let branches = match branches_path {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("can not read branches from {}", path))?;
            ui::parse_branches(&content, now, engine.stale_branch_days())?
        }
        None => Default::default(),
    };
    tracing::info!(
        branches = branches.len(),
        stale = branches.iter().filter(|b| b.stale).count(),
        "loaded branches"
    );

    match repository {
        Some(repository) => {
            let repositories = vec![RepositoryTags::new(repository, tags)];
            let plan = engine.plan_project_at(&repositories, &branches, now);

            ui::display_status(&format!("{} tags to delete", plan.len()));
            for delete in &plan {
                println!("{}", ui::format_delete_line(delete));
            }
        }
        None => {
            for (tag, disposition) in engine.classify_project_at(&tags, &branches, now) {
                println!("{}", ui::format_disposition_line(&tag, disposition));
            }
        }
    }

    Ok(())
}

fn snapshots(config: &Config, listing_path: Option<&str>) -> Result<()> {
    let engine = config.compile().context("invalid configuration")?;
    if !engine.snapshots_enabled() {
        ui::display_status("Snapshot retention is disabled, set [snapshot] enabled = true");
        return Ok(());
    }

    let listing = ui::read_lines(listing_path).context("can not read registry listing")?;
    let repositories = ui::parse_repository_tags(&listing.join("\n"))?;
    let plan = engine.plan_snapshots(&repositories);

    ui::display_status(&format!("{} snapshot tags to delete", plan.len()));
    for delete in &plan {
        println!("{}", ui::format_delete_line(delete));
    }

    Ok(())
}

fn prune(
    config: &Config,
    pattern: Option<&str>,
    keep: Option<usize>,
    items_path: Option<&str>,
) -> Result<()> {
    let retention = config
        .bucket_retention(pattern, keep)
        .context("invalid bucket configuration")?;
    let items = ui::read_lines(items_path).context("can not read items")?;

    let mut failed = false;
    for (group, deletable) in retention.prune(&items) {
        match deletable {
            Ok(deletable) => ui::display_group(&group, &deletable),
            Err(e) => {
                ui::display_error(&format!("Group '{}' skipped: {}", group, e));
                failed = true;
            }
        }
    }

    if failed {
        std::process::exit(1);
    }

    Ok(())
}

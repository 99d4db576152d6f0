//! One-shot feed query
//!
//! Usage: revfeed updates <PROJECT> <SPACE> <DOCUMENT> [--last-update N] [--end-revision N]
//!                        [--type T]... [--custom-field F]... [--link-role R]... [--known ID]...

use clap::Args;
use revfeed_core::model::Revision;
use revfeed_core::upstream::{ContainerPath, UpstreamProvider};
use revfeed_core_types::RequestContext;
use revfeed_engine::{run_updates_query, FeedRequest, FeedSettings, SystemClock};
use revfeed_store::SqliteUpstreamProvider;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Args)]
pub struct UpdatesArgs {
    pub project: String,
    pub space: String,
    pub document: String,

    /// Baseline revision; changes at or before it are not reported
    #[arg(long, default_value_t = 0)]
    pub last_update: u64,

    /// Last revision to report; defaults to the latest known
    #[arg(long)]
    pub end_revision: Option<u64>,

    #[arg(long = "type")]
    pub types: Vec<String>,

    #[arg(long = "custom-field")]
    pub custom_fields: Vec<String>,

    #[arg(long = "link-role")]
    pub link_roles: Vec<String>,

    /// Item already held in sync by the caller
    #[arg(long = "known")]
    pub known: Vec<String>,

    #[arg(long, default_value = super::DEFAULT_DB)]
    pub db: PathBuf,

    #[arg(long)]
    pub time_budget_ms: Option<u64>,
}

pub fn execute(args: UpdatesArgs) -> Result<(), Box<dyn std::error::Error>> {
    if !args.db.exists() {
        return Err(format!("database {} does not exist", args.db.display()).into());
    }

    let mut request = FeedRequest::new(
        ContainerPath::new(args.project, args.space, args.document),
        Revision::new(args.last_update),
    )
    .with_types(args.types)
    .with_custom_fields(args.custom_fields)
    .with_link_roles(args.link_roles)
    .with_known_items(args.known.into_iter().collect());
    if let Some(end) = args.end_revision {
        request = request.with_end_revision(Revision::new(end));
    }

    let settings = args
        .time_budget_ms
        .map(|ms| FeedSettings::with_time_budget(Duration::from_millis(ms)))
        .unwrap_or_default();

    let upstream = SqliteUpstreamProvider::new(&args.db).open()?;
    let envelope = run_updates_query(
        &request,
        upstream.as_ref(),
        &SystemClock,
        &settings,
        &RequestContext::new(),
    )?;

    println!("{}", serde_json::to_string_pretty(&envelope)?);
    Ok(())
}

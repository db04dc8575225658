use std::env;
use std::error::Error;
use std::path::PathBuf;

use anyhow::{anyhow, bail};
use clap::Parser;
use stanza::renderer::console::Console;
use stanza::renderer::Renderer;
use tracing::{debug, info, warn};

use pxt::aggregate::{player_report, Direction, Weighting};
use pxt::classify;
use pxt::contribution::Role;
use pxt::event::MilestoneFlag;
use pxt::print::{
    tabulate_breakdown, tabulate_grid, tabulate_leaderboard, tabulate_partners,
    tabulate_positions, tabulate_ranking, tabulate_roles, tabulate_turnovers,
};
use pxt::ranking::{leaderboard, ranking, roster_stats, Metric};
use pxt::roster::Season;
use pxt::scope::{Half, PartnerSort, Scope};
use pxt::snapshot::{read_json, Snapshot, SnapshotError};
use pxt::xt::XtTable;

#[derive(Debug, clap::Parser, Clone)]
struct Args {
    /// JSON snapshot of events, players, roster minutes and matches
    snapshot: Option<PathBuf>,

    /// player to report on; prints the leaderboard when omitted
    #[clap(short = 'p', long)]
    player: Option<String>,

    /// JSON file with the base scope
    #[clap(long)]
    scope: Option<PathBuf>,

    /// JSON file with a replacement xT table
    #[clap(long)]
    xt: Option<PathBuf>,

    /// team to scope to
    #[clap(short = 't', long)]
    team: Option<String>,

    /// season to scope to, e.g. 2024/25
    #[clap(short = 's', long)]
    season: Option<Season>,

    /// match to scope to (repeatable)
    #[clap(short = 'm', long = "match")]
    matches: Vec<String>,

    /// half to scope to: both, first or second
    #[clap(long)]
    half: Option<Half>,

    /// milestone narrowing the heatmaps and partners
    #[clap(long)]
    milestone: Option<MilestoneFlag>,

    /// partner ordering: count or value
    #[clap(long)]
    sort: Option<PartnerSort>,

    /// number of partners to list
    #[clap(long)]
    limit: Option<usize>,

    /// role for the breakdown, heatmap and leaderboard
    #[clap(short = 'r', long, value_parser = parse_role, default_value = "sender")]
    role: Role,

    /// leaderboard metric
    #[clap(long, default_value = "total")]
    metric: Metric,

    /// heatmap direction: from or to
    #[clap(long, value_parser = parse_direction, default_value = "from")]
    direction: Direction,

    /// heatmap weighting: value or count
    #[clap(long, value_parser = parse_weighting, default_value = "value")]
    weighting: Weighting,

    /// classify untagged legacy events before querying
    #[clap(long)]
    backfill: bool,
}
impl Args {
    fn validate(&self) -> anyhow::Result<()> {
        if self.snapshot.is_none() {
            bail!("snapshot file must be specified");
        }
        if self.limit == Some(0) {
            bail!("partner limit must be positive");
        }
        Ok(())
    }

    fn scope(&self) -> Result<Scope, SnapshotError> {
        let mut scope = match &self.scope {
            Some(path) => read_json(path)?,
            None => Scope::default(),
        };
        if let Some(team) = &self.team {
            scope.team = Some(team.clone());
        }
        if let Some(season) = self.season {
            scope.season = Some(season);
        }
        if !self.matches.is_empty() {
            scope.matches = Some(self.matches.clone());
        }
        if let Some(half) = self.half {
            scope.half = half;
        }
        if let Some(milestone) = self.milestone {
            scope.milestone = Some(milestone);
        }
        if let Some(sort) = self.sort {
            scope.partner_sort = sort;
        }
        if let Some(limit) = self.limit {
            scope.partner_limit = limit;
        }
        Ok(scope)
    }
}
fn parse_role(s: &str) -> anyhow::Result<Role> {
    match s.to_lowercase().as_str() {
        "s" | "sender" => Ok(Role::Sender),
        "r" | "receiver" => Ok(Role::Receiver),
        "d" | "dribbler" => Ok(Role::Dribbler),
        _ => Err(anyhow!("unsupported role {s}")),
    }
}
fn parse_direction(s: &str) -> anyhow::Result<Direction> {
    match s.to_lowercase().as_str() {
        "from" => Ok(Direction::From),
        "to" => Ok(Direction::To),
        _ => Err(anyhow!("unsupported direction {s}")),
    }
}
fn parse_weighting(s: &str) -> anyhow::Result<Weighting> {
    match s.to_lowercase().as_str() {
        "value" | "pxt" => Ok(Weighting::Value),
        "count" => Ok(Weighting::Count),
        _ => Err(anyhow!("unsupported weighting {s}")),
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    if env::var("RUST_BACKTRACE").is_err() {
        env::set_var("RUST_BACKTRACE", "full")
    }
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info")
    }
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    args.validate()?;
    debug!("args: {args:?}");

    let path = args
        .snapshot
        .as_ref()
        .ok_or(anyhow!("snapshot file must be specified"))?;
    let mut snapshot = Snapshot::read_json_file(path)?;
    info!(
        "loaded {} events, {} players, {} matches",
        snapshot.events.len(),
        snapshot.players.len(),
        snapshot.matches.len()
    );
    if args.backfill {
        let untagged = snapshot
            .events
            .iter()
            .filter(|event| event.category.is_none())
            .count();
        snapshot.events = classify::backfill(&snapshot.events);
        info!("stamped {untagged} legacy events");
    }

    let xt = match &args.xt {
        Some(path) => read_json::<XtTable>(path)?,
        None => XtTable::default(),
    };
    let scope = args.scope()?;
    debug!("scope: {scope:?}");

    let Some(player_id) = &args.player else {
        let stats = roster_stats(&snapshot, &xt, &scope);
        let board = leaderboard(&stats, args.role, args.metric);
        info!(
            "{} leaderboard by {}:\n{}",
            args.role,
            args.metric,
            Console::default().render(&tabulate_leaderboard(&board, args.metric))
        );
        return Ok(());
    };

    let name = match snapshot.player(player_id) {
        Some(player) => player.name.as_str(),
        None => {
            warn!("player {player_id} is not in the snapshot");
            player_id.as_str()
        }
    };
    let report = player_report(&snapshot, &xt, &scope, player_id);
    info!(
        "{name}: {} minutes across {} appearances",
        report.minutes, report.appearances
    );
    info!("roles:\n{}", Console::default().render(&tabulate_roles(&report)));
    info!(
        "{} breakdown:\n{}",
        args.role,
        Console::default().render(&tabulate_breakdown(&report.roles[args.role].breakdown))
    );
    info!(
        "{} by position:\n{}",
        args.role,
        Console::default().render(&tabulate_positions(&report.positions, args.role))
    );
    info!(
        "passes to:\n{}",
        Console::default().render(&tabulate_partners(&report.partners_to))
    );
    info!(
        "passes from:\n{}",
        Console::default().render(&tabulate_partners(&report.partners_from))
    );
    info!(
        "turnovers:\n{}",
        Console::default().render(&tabulate_turnovers(&report))
    );

    let precision = match args.weighting {
        Weighting::Value => 3,
        Weighting::Count => 0,
    };
    let grid = report.roles[args.role]
        .heatmap
        .grid(args.direction, args.weighting);
    info!(
        "{} heatmap ({} zone, by {}):\n{}",
        args.role,
        args.direction,
        args.weighting,
        Console::default().render(&tabulate_grid(grid, precision))
    );

    match ranking(&snapshot, &xt, &scope, player_id) {
        Some(ranking) => info!(
            "ranking:\n{}",
            Console::default().render(&tabulate_ranking(&ranking))
        ),
        None => info!("{name} is not on the roster of this scope"),
    }

    Ok(())
}

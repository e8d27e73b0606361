//! CLI command definitions

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// CLI arguments for decider
#[derive(Parser, Debug)]
#[command(name = "decider")]
#[command(author, version, about = "Group decisions by filtered, turn-based elimination")]
#[command(long_about = r#"
Decider helps a group pick one option (a restaurant, an activity, ...) out of
many.

The process has three phases:
1. Filter: hard criteria exclude candidates, soft criteria rank them
2. Eliminate: participants take turns striking candidates, K rounds each
3. Select: the winner is drawn at random from the final M candidates

Skipped or timed-out turns are replayed in a catch-up phase. Timeouts are
applied whenever a session is next touched; nothing runs in the background.

Configuration files are loaded from (in priority order):
1. DECIDER_* environment variables
2. --config <path>     Explicit config file
3. ./decider.toml      Project-level config
4. ~/.config/decider/config.toml   Global config

Example:
  decider create --items sushi,tacos,pho --participants ann,bob -k 1 -m 1
  decider start <SESSION>
  decider eliminate <SESSION> --as ann tacos
  decider status <SESSION> --as bob
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, global = true)]
    pub no_config: bool,

    /// Session storage directory (overrides [storage] data_dir)
    #[arg(long, value_name = "DIR", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Candidate catalog file (defaults to <data-dir>/catalog.json)
    #[arg(long, value_name = "PATH", global = true)]
    pub catalog: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a session from catalog items and a participant list
    Create(CreateArgs),

    /// Apply filters, resolve parameters and start eliminating
    Start(SessionArg),

    /// Eliminate a candidate on your turn
    Eliminate {
        #[command(flatten)]
        session: SessionArg,
        /// Acting participant
        #[arg(long = "as", value_name = "PARTICIPANT")]
        participant: String,
        /// Item to eliminate
        item: String,
    },

    /// Pass on your turn (limited to K skips per session)
    Skip {
        #[command(flatten)]
        session: SessionArg,
        /// Acting participant
        #[arg(long = "as", value_name = "PARTICIPANT")]
        participant: String,
    },

    /// Show session status
    Status {
        #[command(flatten)]
        session: SessionArg,
        /// Show the status from this participant's point of view
        #[arg(long = "as", value_name = "PARTICIPANT")]
        participant: Option<String>,
    },

    /// Cancel a session
    Cancel(SessionArg),

    /// Pin a session
    Pin(SessionArg),

    /// Unpin a session
    Unpin(SessionArg),

    /// List stored sessions
    List,

    /// List feasible (K, M) combinations for a candidate count
    Suggest(SuggestArgs),

    /// Show configuration sources and the effective configuration
    Config,
}

#[derive(Args, Debug)]
pub struct SessionArg {
    /// Session id
    #[arg(value_name = "SESSION")]
    pub session: String,
}

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Candidate item ids (comma separated or repeated)
    #[arg(long, value_name = "ID", value_delimiter = ',', required = true)]
    pub items: Vec<String>,

    /// Participant ids (comma separated or repeated)
    #[arg(long, value_name = "ID", value_delimiter = ',', required = true)]
    pub participants: Vec<String>,

    /// Filter configuration file (TOML or JSON)
    #[arg(long, value_name = "PATH")]
    pub filters: Option<PathBuf>,

    /// Eliminations per participant (defaults to [engine] default_k)
    #[arg(short = 'k', long = "rounds", value_name = "K")]
    pub k: Option<u32>,

    /// Final set size (defaults to [engine] default_m)
    #[arg(short = 'm', long = "final-size", value_name = "M")]
    pub m: Option<u32>,
}

#[derive(Args, Debug)]
pub struct SuggestArgs {
    /// Largest K to consider
    #[arg(short = 'k', long = "max-rounds", value_name = "K", default_value_t = 2)]
    pub max_k: u32,

    /// Largest M to consider
    #[arg(short = 'm', long = "max-final-size", value_name = "M", default_value_t = 3)]
    pub max_m: u32,

    /// Number of participants
    #[arg(short = 'n', long, value_name = "N")]
    pub participants: u32,

    /// Candidates that survived filtering
    #[arg(short = 'a', long, value_name = "COUNT")]
    pub available: usize,
}

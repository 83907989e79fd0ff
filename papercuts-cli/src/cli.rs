use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use papercuts_core::settings::{MAX_SAVER_LEVEL, OptimizeSettings};
use papercuts_core::types::ArtifactKind;

#[derive(Parser, Debug)]
#[command(name = "papercuts")]
#[command(version, about = "Upload, analyze and optimize PDFs for lower ink and page use")]
pub struct Args {
    /// JSON config file with `api_base` / `use_mock` (environment overrides it)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Backend base URL (overrides config file and environment)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Use the in-memory mock backend
    #[arg(long, global = true)]
    pub mock: bool,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Check whether the backend is reachable
    Health,

    /// Print the effective configuration
    Config {
        /// Write the effective configuration to the --config path
        #[arg(long)]
        save: bool,
    },

    /// Upload, analyze and optimize one PDF
    Optimize(OptimizeArgs),

    /// Show a session's current state
    Status { id: String },

    /// Print or save a session's HTML report
    Report {
        id: String,
        /// Write the report here instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Download the original or optimized PDF
    Download {
        id: String,
        #[arg(short, long, value_enum, default_value = "optimized")]
        kind: Artifact,
        #[arg(short, long)]
        out: PathBuf,
    },

    /// Print a session's artifact and report URLs
    Urls { id: String },

    /// Delete a session and its files
    Delete { id: String },

    /// Interactive upload -> results -> preview session
    Shell {
        #[arg(long)]
        user_id: Option<String>,
    },

    /// Serve browser-extension messages as JSON lines on stdin/stdout
    Bridge,

    /// Usage dashboard records
    #[command(subcommand)]
    Dashboard(DashboardCommand),
}

#[derive(ClapArgs, Debug)]
pub struct OptimizeArgs {
    /// PDF to optimize
    pub file: PathBuf,

    #[arg(long)]
    pub user_id: Option<String>,

    #[command(flatten)]
    pub settings: SettingsArgs,

    /// Save the HTML report here after optimizing
    #[arg(long)]
    pub report_out: Option<PathBuf>,
}

#[derive(ClapArgs, Debug, Clone, Copy)]
pub struct SettingsArgs {
    /// Ink saver level, 0-100
    #[arg(long, default_value_t = 50, value_parser = clap::value_parser!(u8).range(0..=MAX_SAVER_LEVEL as i64))]
    pub ink: u8,

    /// Page saver level, 0-100
    #[arg(long, default_value_t = 50, value_parser = clap::value_parser!(u8).range(0..=MAX_SAVER_LEVEL as i64))]
    pub pages: u8,

    /// Allow quality loss in exchange for savings
    #[arg(long)]
    pub no_preserve_quality: bool,

    /// Leave images out of the optimized output
    #[arg(long)]
    pub exclude_images: bool,
}

impl SettingsArgs {
    pub fn to_settings(self) -> OptimizeSettings {
        OptimizeSettings::default()
            .with_ink_saver_level(self.ink)
            .with_page_saver_level(self.pages)
            .with_preserve_quality(!self.no_preserve_quality)
            .with_exclude_images(self.exclude_images)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Artifact {
    Original,
    Optimized,
}

impl From<Artifact> for ArtifactKind {
    fn from(a: Artifact) -> Self {
        match a {
            Artifact::Original => ArtifactKind::Original,
            Artifact::Optimized => ArtifactKind::Optimized,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum DashboardCommand {
    /// List usage sessions, optionally for one user
    Sessions {
        #[arg(long)]
        user_id: Option<String>,
    },

    /// Record a usage session
    CreateSession {
        #[arg(long)]
        user_id: String,
        #[arg(long)]
        pages: u32,
        #[arg(long)]
        ink_use: f64,
        #[arg(long)]
        score: u32,
    },

    /// List users
    Users,

    /// Create a user
    CreateUser {
        #[arg(long)]
        user_id: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        admin: bool,
        #[arg(long)]
        num_user: Option<u32>,
    },

    /// Page total, ink total and average score for one user
    Totals { user_id: String },

    /// Organization-wide summary
    Metrics,
}

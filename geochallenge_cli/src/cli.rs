use clap::{Args, Parser, Subcommand};
use enum_dispatch::enum_dispatch;
use geochallenge::{config::Config, GeoChallenge};
use log::{debug, info};
use spinners::{Spinner, Spinners};

use crate::display::{display_resolutions, display_summary, Resolution};
use crate::error::GeoChallengeCliResult;

const DEFAULT_PROGRESS_SPINNER: Spinners = Spinners::Dots;
const COMPLETE_PROGRESS_STRING: &str = "✔";
const RUNNING_TAIL_STRING: &str = "...";
const GENERATING_STRING: &str = "Fetching rankings for all categories";

/// Trait that defines what to run when a given subcommand is invoked.
#[enum_dispatch]
pub trait RunCommand {
    async fn run(&self, config: Config) -> GeoChallengeCliResult<()>;
}

/// The `generate` command builds the snapshot of the current month and writes it to the
/// snapshot directory.
#[derive(Args, Debug)]
pub struct GenerateCommand {
    #[arg(from_global)]
    quiet: bool,
}

impl RunCommand for GenerateCommand {
    async fn run(&self, config: Config) -> GeoChallengeCliResult<()> {
        info!("Running `generate` subcommand");
        let snapshot_dir = config.snapshot_dir.clone();
        let geo = GeoChallenge::new_with_config(config)?;
        let sp = (!self.quiet).then(|| {
            Spinner::with_timer(
                DEFAULT_PROGRESS_SPINNER,
                GENERATING_STRING.to_string() + RUNNING_TAIL_STRING,
            )
        });
        let generation = geo.generate().await;
        if let Some(mut s) = sp {
            s.stop_with_symbol(COMPLETE_PROGRESS_STRING);
        }
        let path = generation.snapshot.write_to_dir(&snapshot_dir)?;
        display_summary(&generation.summaries);
        println!(
            "\nSnapshot for {} with {} countries written to {}",
            generation.snapshot.meta.season,
            generation.snapshot.countries.len(),
            path.display()
        );
        Ok(())
    }
}

/// The `resolve` command shows which canonical code each country label maps to.
#[derive(Args, Debug)]
pub struct ResolveCommand {
    #[arg(required = true, help = "Country names or labels to resolve")]
    labels: Vec<String>,
    #[arg(long, help = "Print the results as JSON")]
    json: bool,
}

impl RunCommand for ResolveCommand {
    async fn run(&self, config: Config) -> GeoChallengeCliResult<()> {
        info!("Running `resolve` subcommand");
        let geo = GeoChallenge::new_with_config(config)?;
        let resolutions: Vec<Resolution> = self
            .labels
            .iter()
            .map(|label| {
                let code = geo.resolve(label);
                let metadata = code.as_ref().and_then(|code| geo.metadata(code));
                Resolution {
                    label: label.clone(),
                    code: code.map(|code| code.to_string()),
                    name: metadata.as_ref().map(|m| m.name.clone()),
                    flag: metadata.map(|m| m.flag_code),
                }
            })
            .collect();
        debug!("{resolutions:#?}");
        if self.json {
            println!("{}", serde_json::to_string_pretty(&resolutions)?);
        } else {
            display_resolutions(&resolutions);
        }
        Ok(())
    }
}

/// The entrypoint for the CLI.
#[derive(Parser, Debug)]
#[command(version, about="Builds the monthly Geo Challenge country ranking snapshot", long_about = None, name="geochallenge")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
    #[arg(
        short = 'q',
        long = "quiet",
        help = "\
            Do not print progress bar to stdout. Results and logs (when `RUST_LOG`\n\
            is set) will still be printed.",
        global = true
    )]
    quiet: bool,
}

/// Commands contains the list of subcommands avaliable for use in the CLI.
/// Each command should implmement the RunCommand trait and specify the list
/// of arguments it accepts.
#[derive(Subcommand, Debug)]
#[enum_dispatch(RunCommand)]
pub enum Commands {
    /// Generate the snapshot of the current month
    Generate(GenerateCommand),
    /// Show the canonical country code of one or more labels
    Resolve(ResolveCommand),
}

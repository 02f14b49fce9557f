// Native CLI for folio: configuration check and headless replay.

use anyhow::{Context, Result};
use clap::Parser;

use folio::config::{self, CliArgs, Command};
use folio::scenario::{self, ReplayOptions, Scenario};
use folio::{debug, platform};

fn main() -> Result<()> {
    let args = CliArgs::parse();
    platform::init_logging();
    debug::init_from_url_and_storage_once();

    let cfg = config::load(&args).context("Failed to load configuration")?;

    match &args.command {
        Command::Check => {
            cfg.print_summary();
            println!("configuration OK");
        }
        Command::Defaults => {
            print!("{}", folio::config::SiteConfig::default().to_toml()?);
        }
        Command::Replay {
            script,
            json,
            no_observer,
        } => {
            let mut scenario = Scenario::load(script)?;
            if args.viewport_width.is_some() {
                scenario.viewport_width = config::viewport_width(&args)?;
            }
            log::info!(
                "replaying {} ({} steps, {}px)",
                script.display(),
                scenario.steps.len(),
                scenario.viewport_width
            );
            let calls = scenario::replay(
                &scenario,
                cfg,
                ReplayOptions {
                    force_no_observer: *no_observer,
                    ..ReplayOptions::default()
                },
            )?;
            if *json {
                for call in &calls {
                    println!("{}", serde_json::to_string(call)?);
                }
            } else {
                print!("{}", scenario::format_text(&calls));
            }
            log::info!("{} presentation calls", calls.len());
        }
    }
    Ok(())
}

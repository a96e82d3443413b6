use std::time::Duration;

use clap::Subcommand;
use pagetoys_core::countdown::{parse_target, Countdown, CountdownTicker};
use pagetoys_core::{Config, Event};

#[derive(Subcommand)]
pub enum CountdownAction {
    /// Print the remaining time once
    Show {
        /// Target time (RFC 3339 or "YYYY-MM-DD HH:MM:SS"); defaults to config
        #[arg(long)]
        target: Option<String>,
    },
    /// Tick once per second until the target is reached
    Watch {
        #[arg(long)]
        target: Option<String>,
    },
}

fn build(target: Option<String>) -> Result<Countdown, Box<dyn std::error::Error>> {
    let config = Config::load_or_default().countdown;
    let raw = target
        .or(config.target)
        .ok_or("no countdown target; pass --target or set countdown.target")?;
    Ok(Countdown::new(parse_target(&raw)?, config.end_text).with_format(config.format))
}

pub fn run(action: CountdownAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        CountdownAction::Show { target } => {
            let countdown = build(target)?;
            let mut ticker = CountdownTicker::new(countdown);
            if let Some(event) = ticker.tick() {
                println!("{}", serde_json::to_string_pretty(&event)?);
            }
        }
        CountdownAction::Watch { target } => {
            let ticker = CountdownTicker::new(build(target)?);
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_time()
                .build()?;
            runtime.block_on(watch(ticker))?;
        }
    }
    Ok(())
}

async fn watch(mut ticker: CountdownTicker) -> Result<(), serde_json::Error> {
    let mut interval = tokio::time::interval(Duration::from_secs(1));
    loop {
        interval.tick().await;
        match ticker.tick() {
            Some(event @ Event::CountdownFinished { .. }) => {
                println!("{}", serde_json::to_string(&event)?);
                return Ok(());
            }
            Some(event) => println!("{}", serde_json::to_string(&event)?),
            None => return Ok(()),
        }
    }
}

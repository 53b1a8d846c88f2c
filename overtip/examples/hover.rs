//! Simulated hover session against an animated tooltip.
//!
//! Logs go to stderr; event traffic is printed to stdout.

use std::time::Duration;

use log::{LevelFilter, info};
use overtip::prelude::*;
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), TooltipError> {
    let _ = TermLogger::init(
        LevelFilter::Debug,
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    );

    let adapter = AnimatedAdapter::new()
        .show_duration(Duration::from_millis(120))
        .hide_duration(Duration::from_millis(80));
    let tooltip = Tooltip::with_config(TooltipConfig::new("Copy to clipboard"), adapter.clone())?;

    let base = adapter.base().clone();
    tooltip.add_listener_all(move |_, event| {
        println!(
            "{:>10}  (transition {}, hidden={})",
            event.kind.name(),
            event.transition,
            base.is_hidden()
        );
    });

    info!("pointer enters trigger");
    tooltip.show_settled().await?;

    info!("pointer leaves trigger");
    tooltip.hide_settled().await?;

    info!("pointer grazes trigger");
    tooltip.show();
    tokio::time::sleep(Duration::from_millis(30)).await;
    tooltip.hide();
    let outcome = tooltip.hide_settled().await?;
    info!("graze settled: {:?}", outcome);

    info!("trigger disabled while tooltip is open");
    tooltip.set_open(true);
    tooltip.set_disabled(true);
    tokio::time::sleep(Duration::from_millis(200)).await;

    println!(
        "final: open={} hidden={} content={:?}",
        tooltip.is_open(),
        tooltip.is_hidden(),
        tooltip.content()
    );
    Ok(())
}

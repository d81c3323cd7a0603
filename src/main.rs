/// Entry point: config, logging, stage loading, terminal setup, campaign.

mod config;
mod domain;
mod error;
mod logging;
mod sim;
mod ui;

use log::{error, info};
use rand::rngs::StdRng;
use rand::SeedableRng;

use config::GameConfig;
use sim::level::{self, Next};
use ui::input::TermKeys;
use ui::renderer::Terminal;

#[tokio::main]
async fn main() {
    logging::init();
    let config = GameConfig::load();

    // validate everything before touching the terminal
    let stages = match level::load_stages(&config.stages_dir) {
        Ok(s) => s,
        Err(e) => {
            error!("{e}");
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    let mut terminal = Terminal::new();
    if let Err(e) = terminal.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let mut rng = StdRng::from_entropy();
    let result = level::run_campaign(terminal, TermKeys, &config, &stages, &mut rng).await;

    // the campaign owns the terminal handle; restoring it only needs stdout
    if let Err(e) = Terminal::new().cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    match result {
        Ok(end) => {
            info!("finished: {:?}", end.ending);
            println!();
            match end.ending {
                Next::Congrats => println!("All {} stages cleared. Congratulations!", end.cleared),
                _ => println!("Stages cleared: {}/{}", end.cleared, stages.len()),
            }
        }
        Err(e) => {
            error!("{e}");
            eprintln!("Game error: {e}");
            std::process::exit(1);
        }
    }
}

use std::process::ExitCode;

use crate::{bot::twitter::Twitter, config::App, crawler::RemoteFeed, util::datetime};

pub mod bot;
pub mod calculation;
pub mod config;
pub mod crawler;
pub mod declare;
pub mod event;
pub mod logging;
pub mod message;
pub mod util;

#[cfg(all(target_os = "linux", target_env = "musl"))]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();
    scopeguard::defer! {
        logging::flush();
    }

    if let Err(why) = rustls::crypto::ring::default_provider().install_default() {
        logging::error_file_async(format!("Failed to install the rustls provider: {:?}", why));
        return ExitCode::FAILURE;
    }

    let app = match App::get() {
        Ok(app) => app,
        Err(why) => {
            logging::error_file_async(format!(
                "Failed to load the configuration because {:?}",
                why
            ));
            return ExitCode::FAILURE;
        }
    };
    logging::debug_file_async(format!("{:?}", app));

    let publisher = Twitter::new(&app.bot.twitter);
    match event::price_report::execute(&app, &RemoteFeed, &publisher, datetime::today()).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(why) => {
            logging::error_file_async(format!(
                "Failed to run the price report because {:?}",
                why
            ));
            ExitCode::FAILURE
        }
    }
}

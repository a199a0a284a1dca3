use anyhow::{Context, Result};
use chrono::NaiveDate;

use crate::{
    bot::{PostedTweet, Publisher},
    calculation,
    config::App,
    crawler::{self, MarketFeed},
    logging,
    message::{self, Tweet},
};

/// 一次執行的結果
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// 只預覽，沒有發文
    DryRun(Tweet),
    Published { tweet: Tweet, posted: PostedTweet },
}

/// Fetches every source, composes the message and publishes it unless the
/// run is a dry run.
///
/// Source failures only degrade the message. The only errors returned are
/// publishing failures.
pub async fn execute(
    app: &App,
    feed: &(dyn MarketFeed + Sync),
    publisher: &(dyn Publisher + Sync),
    date: NaiveDate,
) -> Result<RunOutcome> {
    let snapshot = crawler::gather(feed, &app.dollar.kinds).await;
    let derived = calculation::derive_all(&snapshot.domestic.quotes, &app.retention);
    let tweet = message::compose(&snapshot, &derived, date);

    print_preview(&tweet);
    logging::info_file_async(format!(
        "Composed {} chars: {}",
        tweet.text.chars().count(),
        tweet.text
    ));

    if app.system.dry_run {
        println!("DRY_RUN=1 → No publica.");
        return Ok(RunOutcome::DryRun(tweet));
    }

    let posted = publisher
        .publish(&tweet.text)
        .await
        .context("Failed to publish the tweet")?;

    println!("OK: Tweet publicado ({}).", posted.id);
    logging::info_file_async(format!("Tweet published with id {}", posted.id));

    Ok(RunOutcome::Published { tweet, posted })
}

fn print_preview(tweet: &Tweet) {
    println!("---- PREVIEW ----");
    println!("{}", tweet.text);
    println!("---- FUENTES ----");
    for line in tweet.sources.lines() {
        println!("{}", line);
    }
}

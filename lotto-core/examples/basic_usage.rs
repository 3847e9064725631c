use lotto_core::{FileCookieStore, Lottery, LotteryConfig, Odds};
use std::sync::Arc;
use tempfile::tempdir;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    // Create temp dir
    let temp_dir = tempdir()?;
    println!("Using temporary directory: {:?}", temp_dir.path());

    let jar = temp_dir.path().join("cookies.json");
    let store = Arc::new(FileCookieStore::with_host(&jar, "app.example.com")?);

    let mut config = LotteryConfig::new("NewCheckout");
    config.odds = Odds::new(1, 4);
    config.debug = true;
    config.on_win = Some(Box::new(|handle| println!("-> '{}' won the draw", handle)));
    config.on_loss = Some(Box::new(|handle| println!("-> '{}' lost the draw", handle)));

    println!("Drawing for 'NewCheckout' at odds {}...", config.odds);
    let mut lottery = Lottery::new(config, store.clone())?;
    let won = lottery.choose()?;

    println!("Decision: {}", if won { "winner" } else { "loser" });

    // A second draw replays the persisted decision instead of re-rolling
    let replay = lottery.choose()?;
    println!("Replay: {} (stable until the record expires)", replay);

    // Static check, no engine needed
    println!(
        "is_winner(\"NewCheckout\") = {}",
        lotto_core::is_winner(store.as_ref(), "NewCheckout")
    );

    println!("\nCookie jar written to {:?}", jar);
    println!("Example completed successfully!");

    Ok(())
}

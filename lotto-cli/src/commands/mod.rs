use chrono::Utc;
use comfy_table::{presets::UTF8_FULL, Table};
use dialoguer::Confirm;
use lotto_core::{
    canonicalize, cookie_name, CookieStore, FileCookieStore, Lottery, LotteryConfig, Odds,
    SeededRandom, COOKIE_PREFIX,
};
use std::sync::Arc;

pub fn draw(
    store: &Arc<FileCookieStore>,
    handle: &str,
    odds: &str,
    expires: u32,
    domain: Option<String>,
    seed: Option<u64>,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let (numerator, denominator) = parse_odds(odds)?;

    let mut config = LotteryConfig::new(handle);
    config.odds = Odds::new(numerator, denominator);
    config.expires_in_days = expires;
    config.cookie_domain = domain;
    config.debug = verbose;
    config.on_win = Some(Box::new(|h| println!("'{}' won the draw", h)));
    config.on_loss = Some(Box::new(|h| println!("'{}' lost the draw", h)));

    println!(
        "Drawing for '{}' at odds {}...",
        canonicalize(handle),
        config.odds
    );

    let mut lottery = match seed {
        Some(seed) => {
            Lottery::with_random(config, store.clone(), Box::new(SeededRandom::new(seed)))?
        }
        None => Lottery::new(config, store.clone())?,
    };

    let won = lottery.choose()?;
    let name = cookie_name(handle);

    println!();
    println!("Decision: {}", if won { "winner" } else { "loser" });
    if let Some(cookie) = store.entries().into_iter().find(|c| c.name == name) {
        println!("Record: {}", cookie.header_string());
    }
    println!("Jar: {}", store.path().display());
    println!();
    println!("Repeated draws replay this decision until the record expires:");
    println!("lotto draw {}", handle);

    Ok(())
}

pub fn check(store: &FileCookieStore, handle: &str) -> Result<(), Box<dyn std::error::Error>> {
    let canonical = canonicalize(handle);

    if lotto_core::is_winner(store, handle) {
        println!("'{}' holds a winning decision.", canonical);
    } else {
        println!("'{}' holds no winning decision.", canonical);
    }

    Ok(())
}

pub fn status(store: &FileCookieStore, handle: &str) -> Result<(), Box<dyn std::error::Error>> {
    let canonical = canonicalize(handle);
    let name = cookie_name(handle);

    let cookie = store
        .entries()
        .into_iter()
        .find(|c| c.name == name)
        .ok_or(format!("No decision recorded for '{}'", canonical))?;

    println!("Decision Status: {}", canonical);
    println!("═══════════════════════════════════");
    println!(
        "Decision: {}",
        match cookie.value.as_str() {
            "true" => "winner",
            "false" => "loser",
            other => other,
        }
    );
    println!(
        "Domain: {}",
        cookie.domain.as_deref().unwrap_or("(host only)")
    );
    println!("Path: {}", cookie.path);
    println!("Expires: {}", cookie.expires.format("%Y-%m-%d %H:%M:%S UTC"));

    if cookie.is_expired(Utc::now()) {
        println!("Expired; the next draw re-rolls.");
    }

    println!();
    println!("Set-Cookie: {}", cookie.header_string());

    Ok(())
}

pub fn list(store: &FileCookieStore) -> Result<(), Box<dyn std::error::Error>> {
    let entries = store.entries();

    if entries.is_empty() {
        println!("No decisions recorded.");
        return Ok(());
    }

    let now = Utc::now();
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Handle", "Decision", "Domain", "Path", "Expires"]);

    for cookie in &entries {
        let handle = cookie
            .name
            .strip_prefix(COOKIE_PREFIX)
            .unwrap_or(&cookie.name);

        let mut decision = match cookie.value.as_str() {
            "true" => "winner".to_string(),
            "false" => "loser".to_string(),
            other => other.to_string(),
        };
        if cookie.is_expired(now) {
            decision.push_str(" (expired)");
        }

        table.add_row(vec![
            handle,
            &decision,
            cookie.domain.as_deref().unwrap_or("-"),
            &cookie.path,
            &cookie.expires.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        ]);
    }

    println!("Decisions in {}:", store.path().display());
    println!("{}", table);

    Ok(())
}

pub fn reset(
    store: &FileCookieStore,
    handle: &str,
    force: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let canonical = canonicalize(handle);
    let name = cookie_name(handle);

    if !store.entries().iter().any(|c| c.name == name) {
        println!("No decision recorded for '{}'.", canonical);
        return Ok(());
    }

    if !force {
        let confirm = Confirm::new()
            .with_prompt(format!(
                "Clear the decision for '{}'? The next draw re-rolls.",
                canonical
            ))
            .default(false)
            .interact()?;

        if !confirm {
            println!("Reset cancelled.");
            return Ok(());
        }
    }

    store.remove(&name);
    println!("Decision for '{}' cleared.", canonical);

    Ok(())
}

fn parse_odds(raw: &str) -> Result<(u32, u32), Box<dyn std::error::Error>> {
    let parse = |part: &str| {
        part.trim().parse::<u32>().map_err(|_| {
            format!(
                "Invalid odds: {}. Use N/D (e.g. 50/100) or a bare percent",
                raw
            )
        })
    };

    match raw.split_once('/') {
        Some((numerator, denominator)) => Ok((parse(numerator)?, parse(denominator)?)),
        None => Ok((parse(raw)?, 100)),
    }
}

use anyhow::{Context, Result};
use clap::Parser;
use exchange_engine::feed::RandomTrendFeed;
use exchange_engine::io::Args;
use exchange_engine::retry::{retry_transient, RetryPolicy};
use exchange_engine::shock::UniformShock;
use exchange_engine::store::{FileStore, MemoryStore, Store};
use exchange_engine::{Engine, Settings};
use log::{debug, error, info, warn};
use market::{ExchangeError, SectorReading, Side, TrendFeed, UserId, ValidationError};
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    info!("=== Gourd Exchange Starting ===");

    // 1. Settings
    let mut settings = Settings::load(args.config.as_deref()).context("Failed to load settings")?;
    if let Some(state) = &args.state {
        settings.storage.state_path = Some(state.clone());
    }

    // 2. Store
    let store: Arc<dyn Store> = match &settings.storage.state_path {
        Some(path) => {
            info!("Persisting state to {}", path.display());
            Arc::new(FileStore::open(path.clone()).context("Failed to open state file")?)
        }
        None => {
            info!("No state path configured, state is kept in memory");
            Arc::new(MemoryStore::new())
        }
    };

    // 3. Engine
    let engine = Arc::new(Engine::new(settings, store, Box::new(UniformShock))?);
    let traders = Arc::new(open_traders(&engine, args.traders)?);
    let policy = RetryPolicy::default();

    // 4. Tick loop
    let mut feed = RandomTrendFeed::new(engine.settings().feed.max_interest);
    let mut ticker =
        tokio::time::interval(Duration::from_millis(engine.settings().feed.tick_interval_ms.max(1)));
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    let mut ticks = 0u64;
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let readings = feed.next_readings(&engine.sectors());
                let engine = engine.clone();
                let traders = traders.clone();
                let outcome = tokio::task::spawn_blocking(move || {
                    run_tick(&engine, &readings, &traders, policy)
                })
                .await;
                if let Err(e) = outcome {
                    error!("Tick task failed: {}", e);
                }

                ticks += 1;
                if args.ticks > 0 && ticks >= args.ticks {
                    break;
                }
            }
            _ = &mut shutdown => {
                info!("Interrupted, shutting down");
                break;
            }
        }
    }

    // 5. Report
    info!("Ran {} ticks", ticks);
    for stock in engine.quotes() {
        info!(
            "{:<6} {:<14} {:>10.2} (high {:.2}, low {:.2})",
            stock.symbol(),
            stock.sector(),
            stock.price(),
            stock.high(),
            stock.low()
        );
    }
    for row in engine.leaderboard() {
        info!(
            "#{:<3} {:<12} net worth {:>12.2} (cash {:.2}, invested {:.2})",
            row.rank, row.username, row.net_worth, row.liquid_assets, row.invested_assets
        );
    }

    Ok(())
}

/// Opens the simulated traders, reusing accounts left by a previous run.
fn open_traders(engine: &Engine, count: usize) -> Result<Vec<UserId>> {
    let mut ids = Vec::with_capacity(count);
    for i in 1..=count {
        let name = format!("trader-{i}");
        let id = match engine.open_account(&name) {
            Ok(account) => account.user_id(),
            Err(ExchangeError::Validation(ValidationError::DuplicateUsername(_))) => engine
                .accounts()
                .into_iter()
                .find(|a| a.username() == name)
                .map(|a| a.user_id())
                .with_context(|| format!("Account {name} vanished"))?,
            Err(e) => return Err(anyhow::Error::new(e).context(format!("Failed to open {name}"))),
        };
        ids.push(id);
    }
    Ok(ids)
}

fn run_tick(engine: &Engine, readings: &[SectorReading], traders: &[UserId], policy: RetryPolicy) {
    for reading in readings {
        let outcome = retry_transient(policy, || {
            engine.ingest_sector_interest(&reading.sector, reading.interest)
        });
        if let Err(e) = outcome {
            warn!("Dropped interest reading for '{}': {}", reading.sector, e);
        }
    }

    let quotes = engine.quotes();
    if quotes.is_empty() {
        return;
    }
    let mut rng = rand::thread_rng();
    for &trader in traders {
        let symbol = quotes[rng.gen_range(0..quotes.len())].symbol().clone();
        let quantity: i64 = rng.gen_range(1..=5);
        let side = if rng.gen_bool(0.5) { Side::Buy } else { Side::Sell };

        let outcome = retry_transient(policy, || match side {
            Side::Buy => engine.buy(trader, symbol.as_str(), quantity),
            Side::Sell => engine.sell(trader, symbol.as_str(), quantity),
        });
        if let Err(e) = outcome {
            debug!("{trader} {side} {symbol} x{quantity} rejected: {e}");
        }
    }
}

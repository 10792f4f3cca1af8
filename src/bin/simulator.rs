//! Streakhold Headless Balance Simulator
//!
//! Drives a population of simulated users through the real engine, one
//! calendar day at a time on a manual clock, and prints the resulting
//! leaderboards and guild state.
//!
//! Usage:
//!   cargo run --bin simulator -- [OPTIONS]
//!
//! Options:
//!   --days N        Days to simulate (default: 60)
//!   --users N       Simulated users (default: 25)
//!   --seed N        RNG seed (default: 42)
//!   --config FILE   Engine config JSON (default: built-in defaults)
//!   --quiet         Only final summary

use chrono::NaiveDate;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use streakhold::{
    Engine, EngineConfig, EngineResult, GroupId, ItemKind, LeaderboardKind, ManualClock,
    MemoryStore, NameBook, UserId,
};

/// Users per group; each group founds one guild.
const GROUP_SIZE: usize = 5;

// ── CLI Configuration ────────────────────────────────────────────────

struct SimConfig {
    days: u32,
    users: usize,
    seed: u64,
    config_path: Option<PathBuf>,
    quiet: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            days: 60,
            users: 25,
            seed: 42,
            config_path: None,
            quiet: false,
        }
    }
}

fn parse_args() -> SimConfig {
    let args: Vec<String> = std::env::args().collect();
    let mut config = SimConfig::default();
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--days" => {
                i += 1;
                config.days = parse_number(&args, i, "--days");
            }
            "--users" => {
                i += 1;
                config.users = parse_number(&args, i, "--users");
            }
            "--seed" => {
                i += 1;
                config.seed = parse_number(&args, i, "--seed");
            }
            "--config" => {
                i += 1;
                match args.get(i) {
                    Some(path) => config.config_path = Some(PathBuf::from(path)),
                    None => usage_error("--config requires a path"),
                }
            }
            "--quiet" => config.quiet = true,
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            other => usage_error(&format!("Unknown argument: {other}")),
        }
        i += 1;
    }
    config
}

fn parse_number<T: std::str::FromStr>(args: &[String], i: usize, flag: &str) -> T {
    match args.get(i).map(|a| a.parse()) {
        Some(Ok(value)) => value,
        _ => usage_error(&format!("{flag} requires a number")),
    }
}

fn usage_error(message: &str) -> ! {
    eprintln!("{message}");
    print_usage();
    std::process::exit(1);
}

fn print_usage() {
    eprintln!(
        "Streakhold Headless Simulator\n\
         \n\
         Usage: simulator [OPTIONS]\n\
         \n\
         Options:\n\
         \x20 --days N        Days to simulate (default: 60)\n\
         \x20 --users N       Simulated users (default: 25)\n\
         \x20 --seed N        RNG seed (default: 42)\n\
         \x20 --config FILE   Engine config JSON\n\
         \x20 --quiet         Only final summary\n\
         \x20 --help, -h      Show this help"
    );
}

// ── Simulated Population ─────────────────────────────────────────────

/// How a simulated user behaves each day.
struct Persona {
    id: UserId,
    group: GroupId,
    /// Chance to check in on any given day
    diligence: f64,
    /// Chance to donate when holding coins
    generosity: f64,
}

fn build_population(count: usize, rng: &mut ChaCha8Rng) -> Vec<Persona> {
    (0..count)
        .map(|n| Persona {
            id: UserId::new(format!("user-{n:03}")),
            group: GroupId::new(format!("group-{}", n / GROUP_SIZE)),
            diligence: rng.gen_range(0.55..0.98),
            generosity: rng.gen_range(0.0..0.3),
        })
        .collect()
}

#[derive(Default)]
struct SimStats {
    engagements: u64,
    backfilled_days: u64,
    tokens_bought: u64,
    donations: u64,
    coins_donated: u64,
    guild_upgrades: u64,
    /// Rejections by reason code
    rejections: BTreeMap<&'static str, u64>,
}

impl SimStats {
    fn record<T>(&mut self, result: &EngineResult<T>) {
        if let Err(e) = result {
            *self.rejections.entry(e.reason_code()).or_insert(0) += 1;
        }
    }
}

// ── Simulation ───────────────────────────────────────────────────────

fn found_guilds(engine: &Engine, population: &[Persona], stats: &mut SimStats) {
    for members in population.chunks(GROUP_SIZE) {
        let Some((founder, rest)) = members.split_first() else {
            continue;
        };
        let co_founders: Vec<UserId> = rest.iter().map(|p| p.id.clone()).collect();
        let name = format!("Hall of {}", founder.group);
        let created = engine.create_guild(&founder.group, &name, &founder.id, &co_founders);
        stats.record(&created);
        if created.is_ok() {
            let elected = engine.elect_lord(&founder.group, &founder.id, &founder.id);
            stats.record(&elected);
        }
    }
}

fn simulate_day(engine: &Engine, population: &[Persona], rng: &mut ChaCha8Rng, stats: &mut SimStats) {
    let price = engine.config().price_of(ItemKind::BackfillToken);

    for persona in population {
        if !rng.gen_bool(persona.diligence) {
            continue;
        }

        // Someone who missed yesterday may patch the gap first.
        if let Ok(inventory) = engine.get_inventory(&persona.id) {
            if inventory.quantity(ItemKind::BackfillToken) > 0 && rng.gen_bool(0.5) {
                let result = engine.perform_backfill(&persona.id, 1, Some(&persona.group));
                if let Ok(outcome) = &result {
                    stats.backfilled_days += u64::from(outcome.tokens_spent);
                }
                stats.record(&result);
            }
        }

        let result = engine.perform_daily_engagement(&persona.id, Some(&persona.group));
        if result.is_ok() {
            stats.engagements += 1;
        }
        stats.record(&result);

        let Ok(progress) = engine.get_progress(&persona.id) else {
            continue;
        };

        if let Some(price) = price {
            if progress.currency >= price * 3 && rng.gen_bool(0.1) {
                let result = engine.purchase_item(&persona.id, ItemKind::BackfillToken, 1);
                if result.is_ok() {
                    stats.tokens_bought += 1;
                }
                stats.record(&result);
            }
        }

        if progress.currency > 0 && rng.gen_bool(persona.generosity) {
            let amount = (progress.currency / 2).max(1);
            let result = engine.donate_to_guild(&persona.group, &persona.id, amount);
            if result.is_ok() {
                stats.donations += 1;
                stats.coins_donated += amount;
            }
            stats.record(&result);
        }
    }

    for founder in population.iter().step_by(GROUP_SIZE) {
        let Ok(view) = engine.get_guild(&founder.group) else {
            continue;
        };
        let Some(lord) = view.guild.lord.clone() else {
            continue;
        };
        let affordable = view.next_upgrade_cost.is_some_and(|cost| {
            view.guild.experience >= cost.experience && view.guild.currency >= cost.currency
        });
        if affordable {
            let result = engine.upgrade_guild(&founder.group, &lord);
            if result.is_ok() {
                stats.guild_upgrades += 1;
            }
            stats.record(&result);
        }
    }
}

fn print_summary(engine: &Engine, population: &[Persona], stats: &SimStats, config: &SimConfig) -> EngineResult<()> {
    println!();
    println!("═══ Simulation Summary ═══");
    println!("  Days:            {}", config.days);
    println!("  Users:           {}", config.users);
    println!("  Seed:            {}", config.seed);
    println!("  Engagements:     {}", stats.engagements);
    println!("  Backfilled days: {}", stats.backfilled_days);
    println!("  Tokens bought:   {}", stats.tokens_bought);
    println!(
        "  Donations:       {} ({} coins)",
        stats.donations, stats.coins_donated
    );
    println!("  Guild upgrades:  {}", stats.guild_upgrades);
    if !stats.rejections.is_empty() {
        println!("  Rejections:");
        for (code, count) in &stats.rejections {
            println!("    {code:<30} {count}");
        }
    }
    println!();

    for kind in LeaderboardKind::ALL {
        println!("{}", engine.get_leaderboard(kind, 5)?);
    }

    if !config.quiet {
        for founder in population.iter().step_by(GROUP_SIZE) {
            if let Ok(view) = engine.get_guild(&founder.group) {
                println!("{view}");
            }
        }
        if let Some(first) = population.first() {
            println!("{}", engine.get_progress(&first.id)?);
            println!("{}", engine.my_rankings(&first.id)?);
        }
    }
    Ok(())
}

fn main() {
    let config = parse_args();

    let default_filter = if config.quiet {
        "streakhold=warn"
    } else {
        "streakhold=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let engine_config = match &config.config_path {
        Some(path) => EngineConfig::load(path).unwrap_or_else(|e| {
            eprintln!("Failed to read {}: {e}", path.display());
            std::process::exit(1);
        }),
        None => EngineConfig::default(),
    }
    .with_seed(config.seed);

    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default();
    let clock = Arc::new(ManualClock::at_date(start));
    let names = Arc::new(NameBook::new());
    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    let population = build_population(config.users, &mut rng);
    for (n, persona) in population.iter().enumerate() {
        names.set(persona.id.clone(), format!("Player {}", n + 1));
    }

    let engine = Engine::new(Arc::new(MemoryStore::new()), engine_config)
        .with_clock(clock.clone())
        .with_names(names);

    let mut stats = SimStats::default();
    found_guilds(&engine, &population, &mut stats);

    for day in 0..config.days {
        simulate_day(&engine, &population, &mut rng, &mut stats);
        if !config.quiet && (day + 1) % 10 == 0 {
            println!("day {:>4}: {} engagements so far", day + 1, stats.engagements);
        }
        clock.advance_days(1);
    }

    if let Err(e) = print_summary(&engine, &population, &stats, &config) {
        eprintln!("Failed to read final state: {e}");
        std::process::exit(1);
    }
}

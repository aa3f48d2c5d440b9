// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::{anyhow, bail, Result};
use chrono::Local;
use std::env;

// Use library instead of local modules
use savings_tracker::{
    export, render, Config, FundTracker, GoalTracker, KeyValueStore, Priority, SqliteStore,
};

const ACTOR: &str = "cli";

fn main() -> Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();
    let config = Config::load()?;

    match args.first().map(String::as_str) {
        None | Some("ui") => run_ui_mode(&config)?,
        Some("funds") => run_funds(&config, &args[1..])?,
        Some("goals") => run_goals(&config, &args[1..])?,
        Some("history") => run_history(&config, &args[1..])?,
        Some("help") | Some("--help") | Some("-h") => print_usage(),
        Some(other) => {
            print_usage();
            bail!("unknown command '{}'", other);
        }
    }

    Ok(())
}

fn print_usage() {
    println!("savings-tracker {}", savings_tracker::VERSION);
    println!();
    println!("USAGE:");
    println!("  savings-tracker [ui]                      Open the terminal UI");
    println!("  savings-tracker funds show                Show gym / weekly / protein balances");
    println!("  savings-tracker funds save <amount>       Record today's savings (once per day)");
    println!("  savings-tracker goals list                List goals");
    println!("  savings-tracker goals add <name> <target> [High|Medium|Low]");
    println!("  savings-tracker goals save <amount>       Split savings across goals by priority");
    println!("  savings-tracker goals edit <id> <amount>  Set a goal, rebalance the others");
    println!("  savings-tracker goals reset <id>          Zero one goal");
    println!("  savings-tracker goals delete <id> --yes   Remove a goal");
    println!("  savings-tracker goals export <file.csv>   Export goals to CSV");
    println!("  savings-tracker history [limit]           Recent activity");
    println!();
    println!("Database: $SAVINGS_DB (default savings.db), config file: $SAVINGS_CONFIG");
}

fn open_store(config: &Config) -> Result<SqliteStore> {
    SqliteStore::open(&config.db_path)
}

fn arg<'a>(args: &'a [String], index: usize, name: &str) -> Result<&'a str> {
    args.get(index)
        .map(String::as_str)
        .ok_or_else(|| anyhow!("missing <{}>", name))
}

// ============================================================================
// FUNDS
// ============================================================================

fn run_funds(config: &Config, args: &[String]) -> Result<()> {
    let mut store = open_store(config)?;
    let mut tracker = FundTracker::load(&store)?.with_actor(ACTOR);

    match args.first().map(String::as_str) {
        None | Some("show") => {}
        Some("save") => {
            let amount = arg(args, 1, "amount")?;
            let today = Local::now().date_naive();

            match tracker.save(&mut store, amount, today) {
                Ok(outcome) => {
                    println!("✓ Saved {}", config.money_f64(outcome.split.gym + outcome.split.weekly + outcome.split.protein));
                    println!(
                        "  gym +{:.2}  weekly +{:.2}  protein +{:.2}",
                        outcome.split.gym, outcome.split.weekly, outcome.split.protein
                    );
                    if outcome.weekly_goal_reached {
                        println!("🎉 Weekly goal reached! Weekly fund reset to 0.");
                    }
                }
                Err(e) => {
                    eprintln!("❌ {}", e);
                    std::process::exit(1);
                }
            }
        }
        Some(other) => bail!("unknown funds command '{}'", other),
    }

    print_funds(config, &tracker);
    Ok(())
}

fn print_funds(config: &Config, tracker: &FundTracker) {
    let funds = tracker.funds();
    let slices = render::fund_slices(&funds);
    let total = funds.total();

    println!();
    println!("💰 Funds (total {})", config.money_f64(total));
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    for slice in &slices {
        println!(
            "  {:<8} {:>12}  {:>5.1}%",
            slice.label,
            config.money_f64(slice.value),
            slice.share(total) * 100.0
        );
    }
    match tracker.last_saved() {
        Some(day) => println!("  Last saved: {}", day),
        None => println!("  Last saved: never"),
    }
}

// ============================================================================
// GOALS
// ============================================================================

fn run_goals(config: &Config, args: &[String]) -> Result<()> {
    let mut store = open_store(config)?;
    let mut tracker = GoalTracker::load(&store)?.with_actor(ACTOR);

    let result = match args.first().map(String::as_str) {
        None | Some("list") => Ok(()),
        Some("add") => {
            let name = arg(args, 1, "name")?;
            let target = arg(args, 2, "target")?;
            let priority = match args.get(3) {
                Some(p) => p.parse::<Priority>().map_err(|e| anyhow!(e))?,
                None => Priority::default(),
            };
            tracker
                .add_goal(&mut store, name, target, priority)
                .map(|goal| println!("✓ Added goal '{}' ({})", goal.name, short_id(&goal.id)))
        }
        Some("save") => {
            let amount = arg(args, 1, "amount")?;
            tracker.deposit(&mut store, amount).map(|outcome| {
                for allocation in &outcome.allocations {
                    println!("✓ {} +{}", allocation.goal_name, config.money(allocation.amount));
                }
            })
        }
        Some("edit") => {
            let id = tracker.resolve_id(arg(args, 1, "id")?)?;
            let amount = arg(args, 2, "amount")?;
            tracker
                .edit_amount(&mut store, &id, amount)
                .map(|goal| println!("✓ '{}' set to {}, other goals rebalanced", goal.name, config.money(goal.amount)))
        }
        Some("reset") => {
            let id = tracker.resolve_id(arg(args, 1, "id")?)?;
            tracker
                .reset(&mut store, &id)
                .map(|_| println!("✓ Goal reset to {}", config.money(0)))
        }
        Some("delete") => {
            let id = tracker.resolve_id(arg(args, 1, "id")?)?;
            if !args.iter().any(|a| a == "--yes" || a == "-y") {
                eprintln!("❌ Deleting a goal needs confirmation: add --yes");
                std::process::exit(1);
            }
            tracker
                .delete(&mut store, &id)
                .map(|goal| println!("✓ Deleted goal '{}'", goal.name))
        }
        Some("export") => {
            let path = arg(args, 1, "file.csv")?;
            let count = export::export_goals(tracker.goals(), std::path::Path::new(path))?;
            println!("✓ Exported {} goals to {}", count, path);
            return Ok(());
        }
        Some(other) => bail!("unknown goals command '{}'", other),
    };

    if let Err(e) = result {
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }

    print_goals(config, &tracker);
    Ok(())
}

fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

fn print_goals(config: &Config, tracker: &GoalTracker) {
    println!();
    println!("🎯 Goals (total savings {})", config.money(tracker.total()));
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    if tracker.is_empty() {
        println!("  No goals yet. Add one with: savings-tracker goals add <name> <target>");
        return;
    }

    for goal in tracker.goals() {
        let progress = render::goal_progress(goal);
        let filled = (progress.ratio() * 20.0).round() as usize;
        let status = if goal.is_complete() {
            "✓ done".to_string()
        } else {
            format!("{}% ({} to go)", progress.percent(), config.money(goal.remaining()))
        };
        println!(
            "  {}  {:<20} {:<6}  {} / {}  [{}{}] {}",
            short_id(&goal.id),
            goal.name,
            goal.priority.as_str(),
            config.money(goal.amount),
            config.money(goal.target),
            "█".repeat(filled),
            "░".repeat(20 - filled),
            status
        );
    }
}

// ============================================================================
// HISTORY
// ============================================================================

fn run_history(config: &Config, args: &[String]) -> Result<()> {
    let limit = match args.first() {
        Some(n) => n.parse::<usize>().map_err(|_| anyhow!("limit must be a number"))?,
        None => 20,
    };

    let store = open_store(config)?;
    let events = store.recent_events(limit)?;

    println!("📜 Recent activity ({} events)", events.len());
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    for event in events {
        println!(
            "  {}  {:<20} {:<10} {}",
            event.timestamp.with_timezone(&Local).format("%Y-%m-%d %H:%M"),
            event.event_type,
            event.actor,
            event.data
        );
    }

    Ok(())
}

// ============================================================================
// UI
// ============================================================================

#[cfg(feature = "tui")]
fn run_ui_mode(config: &Config) -> Result<()> {
    println!("🖥️  Loading Savings Tracker UI...\n");

    let store = open_store(config)?;
    let mut app = ui::App::load(store, config.clone())?;
    ui::run_ui(&mut app)?;

    println!("\n✅ UI closed successfully");

    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode(_config: &Config) -> Result<()> {
    eprintln!("❌ TUI mode not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    eprintln!("   Or use the CLI commands: savings-tracker help");
    std::process::exit(1);
}

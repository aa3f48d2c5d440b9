// Savings Tracker - Web Server
// REST API with Axum

use savings_tracker::api::{router, AppState};
use savings_tracker::{Config, SqliteStore};

#[tokio::main]
async fn main() {
    println!("🌐 Savings Tracker - Web Server");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Invalid configuration: {:#}", e);
            std::process::exit(1);
        }
    };

    // Open database (created on first run)
    let store = match SqliteStore::open(&config.db_path) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("❌ Failed to open database at {:?}: {:#}", config.db_path, e);
            std::process::exit(1);
        }
    };
    println!("✓ Database opened: {:?}", config.db_path);

    let state = match AppState::load(store) {
        Ok(state) => state,
        Err(e) => {
            eprintln!("❌ Failed to load saved data: {}", e);
            std::process::exit(1);
        }
    };
    println!(
        "✓ Loaded {} goals, funds total {}",
        state.goals.goals().len(),
        config.money_f64(state.funds.funds().total())
    );

    let app = router(state.shared());

    // Start server
    let listener = match tokio::net::TcpListener::bind(&config.server_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            eprintln!("❌ Failed to bind to {}: {}", config.server_addr, e);
            std::process::exit(1);
        }
    };

    println!("\n🚀 Server running on http://{}", config.server_addr);
    println!("   API: http://{}/api/goals", config.server_addr);
    println!("\n   Press Ctrl+C to stop\n");

    if let Err(e) = axum::serve(listener, app).await {
        eprintln!("❌ Server error: {}", e);
        std::process::exit(1);
    }
}

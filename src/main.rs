use std::env;

use velotype::{config::Config, db::Store, server, service::Service, tui};

fn help() {
    println!("Usage: velotype [serve] [options]");
    println!();
    println!("With no arguments, starts the terminal typing client.");
    println!();
    println!("Commands:");
    println!("  serve            Run the HTTP score backend");
    println!("Options:");
    println!("  -h               Display this help message");
    println!();
    println!("Environment (serve):");
    println!("  VELOTYPE_PORT         Listen port (default 3000)");
    println!("  VELOTYPE_DB           Database path (default under the data dir)");
    println!("  VELOTYPE_ADMIN_TOKEN  When set, required as x-admin-token on admin routes");
}

fn main() {
    let args: Vec<String> = env::args().collect();

    match args.get(1).map(String::as_str) {
        None => run_client(),
        Some("serve") => run_server(),
        Some("-h") | Some("--help") => help(),
        Some(other) => {
            eprintln!("Invalid argument: {}", other);
            help();
            std::process::exit(2);
        }
    }
}

fn run_client() {
    let config = Config::load();
    let store = match Store::open(&config.db_path) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("could not open database: {}", e);
            std::process::exit(1);
        }
    };
    let service = Service::new(store);
    if let Err(e) = tui::run(&service) {
        eprintln!("client error: {}", e);
        std::process::exit(1);
    }
}

fn run_server() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("velotype=info")),
        )
        .init();

    let config = Config::load();
    if let Err(e) = server::run(config) {
        eprintln!("server error: {}", e);
        std::process::exit(1);
    }
}

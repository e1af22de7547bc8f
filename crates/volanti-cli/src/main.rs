//! Volanti: product catalog search from the command line.

use tracing::info;
use tracing_subscriber::EnvFilter;

use volanti_core::VolantiConfig;
use volanti_search::{ProductSearchEngine, SearchConfig, SearchOutcome};
use volanti_store::{seed, SqliteCatalog};

mod backfill;

const DEFAULT_BACKFILL_LIMIT: usize = 1000;

fn print_help() {
    println!("Volanti - product catalog search");
    println!();
    println!("Usage: volanti <command>");
    println!();
    println!("Commands:");
    println!("  search [query...] [--scores] [--json]  Search products (no query lists the catalog)");
    println!("  seed                                   Replace the catalog with demo data");
    println!("  embed [--limit N]                      Embed products that have no embedding");
    println!("  order <id>                             Show an order and its products");
    println!("  stats                                  Show catalog statistics");
    println!("  help                                   Show this help message");
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();
    let Some(command) = args.get(1) else {
        print_help();
        return Ok(());
    };

    if matches!(command.as_str(), "--help" | "-h" | "help") {
        print_help();
        return Ok(());
    }

    let config = VolantiConfig::from_env()?;
    info!("Data directory: {}", config.data_paths.root.display());
    let store = SqliteCatalog::open(&config.data_paths.catalog_db)
        .map_err(|e| anyhow::anyhow!("Failed to open catalog: {}", e))?;

    match command.as_str() {
        "search" => run_search(&config, &store, &args[2..]),
        "seed" => {
            let report = seed::seed_catalog(&store, &mut rand::thread_rng())?;
            println!(
                "Seeded {} products and {} orders into {}",
                report.products,
                report.orders,
                store.db_path().display()
            );
            Ok(())
        }
        "embed" => {
            let limit = match args.get(2).map(String::as_str) {
                Some("--limit") => args
                    .get(3)
                    .ok_or_else(|| anyhow::anyhow!("--limit needs a value"))?
                    .parse::<usize>()?,
                Some(other) => anyhow::bail!("Unknown option for embed: {}", other),
                None => DEFAULT_BACKFILL_LIMIT,
            };
            let embedder = volanti_infer::create_embedder(&config.embedding);
            let report = backfill::embed_pending_products(&store, embedder.as_ref(), limit)?;
            println!(
                "Embedded {} products ({} failed)",
                report.embedded, report.failed
            );
            if report.failed > 0 {
                std::process::exit(1);
            }
            Ok(())
        }
        "order" => {
            let Some(order_id) = args.get(2) else {
                eprintln!("Usage: volanti order <id>");
                std::process::exit(1);
            };
            match store.get_order(order_id)? {
                Some(order) => {
                    println!("Order {}", order.id);
                    println!("  Status: {}", order.status);
                    println!("  Placed: {}", order.created_at.format("%Y-%m-%d"));
                    match order.estimated_delivery {
                        Some(eta) => println!("  Estimated delivery: {}", eta.format("%Y-%m-%d")),
                        None => println!("  Estimated delivery: -"),
                    }
                    println!("  Total paid: ${:.2}", order.total_paid);
                    for product in &order.products {
                        println!("  - {}: {}", product.name, product.description);
                    }
                }
                None => {
                    eprintln!("Order not found: {}", order_id);
                    std::process::exit(1);
                }
            }
            Ok(())
        }
        "stats" => {
            let stats = store.stats()?;
            println!("Catalog: {}", stats.db_path);
            println!("  Products: {}", stats.total_products);
            println!("  Embedded: {}", stats.embedded_products);
            println!("  Orders:   {}", stats.total_orders);
            Ok(())
        }
        _ => {
            eprintln!("Unknown command: {}. Use 'volanti help' for usage.", command);
            std::process::exit(1);
        }
    }
}

fn run_search(config: &VolantiConfig, store: &SqliteCatalog, args: &[String]) -> anyhow::Result<()> {
    let mut scores = false;
    let mut json = false;
    let mut words = Vec::new();
    for arg in args {
        match arg.as_str() {
            "--scores" => scores = true,
            "--json" => json = true,
            _ => words.push(arg.as_str()),
        }
    }
    let query = words.join(" ");

    let embedder = volanti_infer::create_embedder(&config.embedding);
    let engine = ProductSearchEngine::with_config(
        store,
        embedder.as_ref(),
        SearchConfig::from(&config.search),
    );

    if scores {
        if query.trim().is_empty() {
            anyhow::bail!("--scores needs a query");
        }
        for candidate in engine.search_scored(&query)? {
            println!(
                "{:.4}  {} - {} (${:.2})",
                candidate.score,
                candidate.product.name,
                candidate.product.description,
                candidate.product.price
            );
        }
        return Ok(());
    }

    let outcome = engine.search(Some(&query));
    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    match outcome {
        SearchOutcome::Found { tier, products } => {
            info!("Answered by the {} tier", tier);
            if products.is_empty() {
                println!("No products found.");
            }
            for product in &products {
                println!(
                    "{} - {} (${:.2})",
                    product.name, product.description, product.price
                );
            }
            Ok(())
        }
        SearchOutcome::Failed { message } => {
            eprintln!("{}", message);
            std::process::exit(1);
        }
    }
}

use clap::Parser;
use keyword_forwarder::utils::{logger, validation::Validate};
use keyword_forwarder::{health, BotApiClient, ForwardConfig, ForwarderEngine, RoutingTable};

#[derive(Parser)]
#[command(name = "keyword-forwarder")]
#[command(about = "Forwards chat messages matching configured keywords to destination chats")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "forwarder.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override the poll interval in minutes
    #[arg(long)]
    interval: Option<u64>,

    /// Run a single poll cycle and exit
    #[arg(long)]
    once: bool,

    /// Dry run - show configuration and routing without connecting
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    logger::init_cli_logger(args.verbose);

    tracing::info!("🚀 Starting keyword forwarder");
    tracing::info!("📁 Loading configuration from: {}", args.config);

    let mut config = match ForwardConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    if let Some(minutes) = args.interval {
        config.poll.interval_minutes = Some(minutes);
        tracing::info!("🔧 Poll interval overridden to {} minutes", minutes);
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    tracing::info!("✅ Configuration loaded and validated successfully");

    display_config_summary(&config, &args);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No gateway connection will be made");
        perform_dry_run(&config);
        return Ok(());
    }

    if config.health_enabled() {
        health::spawn(config.health_bind());
    }

    let client = match BotApiClient::new(&config.api) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(1);
        }
    };

    let mut engine = ForwarderEngine::new(client, config);

    let outcome = if args.once {
        match engine.start_up().await {
            Ok(()) => {
                let report = engine.run_once().await;
                tracing::info!(
                    "✅ Cycle complete: {} forwarded, {} copied, {} delivery failures",
                    report.forwarded,
                    report.copied,
                    report.delivery_failures
                );
                println!(
                    "✅ Cycle complete: {} forwarded, {} copied, {} delivery failures",
                    report.forwarded, report.copied, report.delivery_failures
                );
                Ok(())
            }
            Err(e) => Err(e),
        }
    } else {
        engine.run().await
    };

    if let Err(e) = outcome {
        tracing::error!(
            "❌ Forwarder failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

        let exit_code = match e.severity() {
            keyword_forwarder::utils::error::ErrorSeverity::Low => 0,
            keyword_forwarder::utils::error::ErrorSeverity::Medium => 2,
            keyword_forwarder::utils::error::ErrorSeverity::High => 1,
            keyword_forwarder::utils::error::ErrorSeverity::Critical => 3,
        };

        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }

    Ok(())
}

fn display_config_summary(config: &ForwardConfig, args: &Args) {
    println!("📋 Configuration Summary:");
    println!(
        "  Forwarder: {} v{}",
        config.forwarder.name, config.forwarder.version
    );
    println!("  Gateway: {}", config.api.base_url);
    println!("  Check Interval: {} minutes", config.poll_interval_minutes());
    println!("  Backlog Limit: {} messages", config.backlog_limit());
    println!(
        "  Health Endpoint: {}",
        if config.health_enabled() {
            config.health_bind()
        } else {
            "disabled".to_string()
        }
    );
    println!("  Monitoring {} destinations:", config.destinations.len());

    for dest in &config.destinations {
        println!("    • {}: {} sources", dest.name, dest.sources.len());
        for source in &dest.sources {
            println!("      - {}: {} keywords", source.name, source.keywords.len());
        }
    }

    if args.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }

    println!();
}

fn perform_dry_run(config: &ForwardConfig) {
    let routes = RoutingTable::from_config(config);

    println!("🔍 Dry Run Analysis:");
    println!();
    println!("🔀 Routing:");
    println!(
        "  {} unique sources feed {} destinations ({} configured pairs)",
        routes.source_count(),
        routes.destination_count(),
        config.source_count()
    );

    for (source_id, route) in routes.sources() {
        println!("  📨 {} ({})", route.name, source_id);
        for target in &route.targets {
            println!(
                "     → {} on any of: {}",
                routes.dest_name(target.dest_id),
                target.keywords.keywords().join(", ")
            );
        }
    }

    println!();
    println!("✅ Dry run analysis complete. Remove --dry-run to start forwarding.");
}

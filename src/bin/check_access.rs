//! Connectivity doctor: verifies the gateway token and access to every
//! configured chat before the forwarder is deployed.

use anyhow::{Context, Result};
use clap::Parser;
use keyword_forwarder::domain::ports::ChatApi;
use keyword_forwarder::utils::logger;
use keyword_forwarder::utils::validation::Validate;
use keyword_forwarder::{BotApiClient, ForwardConfig};

#[derive(Parser)]
#[command(name = "check-access")]
#[command(about = "Verify gateway credentials and chat access for a forwarder config")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "forwarder.toml")]
    config: String,

    /// Send a test message to each reachable destination
    #[arg(long)]
    send_test: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    logger::init_cli_logger(args.verbose);

    let config = ForwardConfig::from_file(&args.config)
        .with_context(|| format!("loading config file '{}'", args.config))?;
    config.validate().context("configuration is invalid")?;

    let client = BotApiClient::new(&config.api).context("building gateway client")?;

    let me = client
        .get_me()
        .await
        .context("cannot authenticate with the gateway")?;
    println!("✓ Connected as: {}", me.display_name());

    let mut failures = 0usize;

    for dest in &config.destinations {
        match client.get_chat(dest.chat_id).await {
            Ok(info) => {
                println!(
                    "✓ Destination access: {} ({})",
                    dest.name,
                    info.peer.display_name()
                );

                if args.send_test {
                    match client
                        .send_message(dest.chat_id, "🤖 Forwarder connectivity test.", true)
                        .await
                    {
                        Ok(()) => println!("✓ Test message sent to {}", dest.name),
                        Err(e) => {
                            println!("✗ Cannot send message to {}: {}", dest.name, e);
                            failures += 1;
                        }
                    }
                }
            }
            Err(e) => {
                println!(
                    "✗ Cannot access destination {} ({}): {}",
                    dest.name, dest.chat_id, e
                );
                failures += 1;
            }
        }

        for source in &dest.sources {
            match client.get_chat(source.chat_id).await {
                Ok(info) => println!(
                    "✓ Source access: {} ({})",
                    source.name,
                    info.peer.display_name()
                ),
                Err(e) => {
                    println!(
                        "✗ Cannot access source {} ({}): {}",
                        source.name, source.chat_id, e
                    );
                    failures += 1;
                }
            }
        }
    }

    if failures > 0 {
        anyhow::bail!("{} access checks failed", failures);
    }

    println!("✓ All access checks passed");
    Ok(())
}

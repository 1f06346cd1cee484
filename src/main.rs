use std::env;
use std::io::{self, Write};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use ethers::signers::LocalWallet;
use rust_decimal::Decimal;
use tracing::info;
use tracing_subscriber::EnvFilter;

use swap_bot::coingecko_client::CoinGeckoClient;
use swap_bot::configuration::Configuration;
use swap_bot::error::SwapError;
use swap_bot::ethereum_client::EthereumClient;
use swap_bot::resolver::TokenResolver;
use swap_bot::swap::SwapPipeline;
use swap_bot::types::{SwapRequest, SwapStatus};

/// Terminal front end for the swap pipeline: collects token identifiers,
/// amount, and slippage, derives the minimum output amount, and runs the
/// pipeline through confirmation polling. The pipeline itself lives in the
/// library crate and is callable without the menu.
#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    info!("=== SWAP BOT STARTING ===");

    let config =
        Configuration::get_from_environment().context("failed to collect configuration")?;

    let client = EthereumClient::new(&config).await?;
    let resolver = TokenResolver::new(&config.network, CoinGeckoClient::new(&config));
    let pipeline = SwapPipeline::new(&config, client, resolver)?;

    let wallet = collect_wallet()?;
    let confirmation_timeout = Duration::from_secs(config.confirmation_timeout_secs);

    println!("\n=== Uniswap Token Swap Interface ({}) ===", config.network);

    loop {
        println!("\n=== Available Actions ===");
        println!("1. Swap Tokens");
        println!("2. Exit");

        let choice = prompt("\nEnter your choice (1-2): ")?;

        match choice.as_str() {
            "2" => {
                println!("\nExiting...");
                break;
            }
            "1" => {
                if let Err(err) = run_swap(&pipeline, &wallet, confirmation_timeout).await {
                    println!("\nError: {err}");
                }
            }
            _ => println!("\nInvalid choice. Please try again."),
        }
    }

    Ok(())
}

async fn run_swap(
    pipeline: &SwapPipeline,
    wallet: &LocalWallet,
    confirmation_timeout: Duration,
) -> Result<()> {
    let token_in = prompt("\nEnter input token (name, symbol, or address): ")?;
    let token_out = prompt("Enter output token (name, symbol, or address): ")?;

    let amount_in: Decimal = prompt("Enter amount to swap: ")?
        .parse()
        .context("amount must be a decimal number")?;
    let slippage: Decimal = prompt("Enter maximum slippage percentage (e.g., 0.5 for 0.5%): ")?
        .parse()
        .context("slippage must be a decimal number")?;

    // No quoter in scope: the bound is derived from the input amount, which
    // is only meaningful for like-valued pairs.
    let min_amount_out = amount_in * (Decimal::ONE - slippage / Decimal::ONE_HUNDRED);

    println!("\nConfirm Transaction Details:");
    println!("Swap: {} {} -> {}", amount_in, token_in, token_out);
    println!(
        "Minimum output amount (with {}% slippage): {}",
        slippage, min_amount_out
    );

    let confirmation = prompt("\nProceed with swap? (y/n): ")?;
    if confirmation.to_lowercase() != "y" {
        println!("Transaction cancelled");
        return Ok(());
    }

    let request = SwapRequest {
        token_in,
        token_out,
        amount_in,
        min_amount_out,
        deadline: None,
    };

    let tx_hash = pipeline.execute(&request, wallet).await?;

    println!("\nTransaction sent!");
    println!("Transaction hash: 0x{}", hex::encode(tx_hash.as_bytes()));

    match pipeline.await_receipt(tx_hash, confirmation_timeout).await {
        Ok(receipt) => match receipt.status {
            SwapStatus::Success => {
                println!("Transaction confirmed in block {}!", receipt.block_number)
            }
            SwapStatus::Reverted => {
                println!("Transaction reverted in block {}!", receipt.block_number)
            }
        },
        Err(SwapError::Timeout { .. }) => {
            println!(
                "No receipt yet; the transaction may still be pending. Keep the hash to check later."
            )
        }
        Err(err) => return Err(err.into()),
    }

    Ok(())
}

/// The signing credential comes from the environment or an interactive
/// prompt and is threaded explicitly into each submit call; it is never
/// stored in shared state or logged.
fn collect_wallet() -> Result<LocalWallet> {
    let raw_key = match env::var("PRIVATE_KEY") {
        Ok(key) => key,
        Err(_) => prompt("\nEnter your private key: ")?,
    };

    raw_key
        .trim()
        .trim_start_matches("0x")
        .parse::<LocalWallet>()
        .map_err(|_| anyhow!("PRIVATE_KEY is not a valid private key"))
}

fn prompt(label: &str) -> Result<String> {
    print!("{label}");
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

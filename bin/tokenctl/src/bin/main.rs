//! Command line front-end for the L2 token contracts.
//!
//! Read commands need only `rpc_url` from the config file; `transfer`,
//! `wrap`, `unwrap`, `mint` and `deploy` also need a private key.

use alloy_primitives::{utils::format_ether, Address};
use alloy_provider::Provider;
use binding::{FilterOpts, WatchOpts};
use clap::{Parser, Subcommand};
use tokenctl::{config::Config, parse_amount, Contract};
use tokio::sync::mpsc;
use tracing::info;

#[derive(Parser)]
#[command(name = "tokenctl")]
#[command(about = "Query and operate the L2 token contracts")]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "tokenctl.toml")]
    config: String,

    /// Private key for signing transactions (hex string, with or without 0x prefix)
    #[arg(short = 'k', long, env = "PRIVATE_KEY")]
    private_key: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print function selectors and event topics
    Abi { contract: Contract },

    /// Print token metadata and supply
    Info { contract: Contract },

    /// Print the token balance of an account
    Balance { contract: Contract, holder: Address },

    /// Transfer tokens from the signing account
    Transfer {
        contract: Contract,
        to: Address,
        /// Decimal amount in whole tokens
        amount: String,
    },

    /// Wrap native tokens
    Wrap {
        /// Decimal amount in ether units
        amount: String,
    },

    /// Unwrap native tokens
    Unwrap {
        /// Decimal amount in ether units
        amount: String,
    },

    /// Mint tokens (fiat token minter or Kevin owner only)
    Mint {
        contract: Contract,
        to: Address,
        /// Decimal amount in whole tokens
        amount: String,
    },

    /// List historical Transfer events
    Transfers {
        contract: Contract,
        #[arg(long, default_value_t = 0)]
        from_block: u64,
        /// Defaults to the latest block
        #[arg(long)]
        to_block: Option<u64>,
        /// Only transfers sent by these accounts
        #[arg(long)]
        from: Vec<Address>,
        /// Only transfers received by these accounts
        #[arg(long)]
        to: Vec<Address>,
    },

    /// Stream new Transfer events until Ctrl-C
    Watch {
        contract: Contract,
        #[arg(long)]
        from_block: Option<u64>,
    },

    /// Deploy a new instance from the embedded bytecode
    Deploy { contract: Contract },
}

/// Provider signing with the key from `--private-key` or `PRIVATE_KEY`.
fn wallet_provider(cli: &Cli, config: &Config) -> eyre::Result<impl Provider + Clone + 'static> {
    let private_key = cli
        .private_key
        .as_deref()
        .ok_or_else(|| eyre::eyre!("A private key is required (--private-key or PRIVATE_KEY)"))?;

    info!(from = %client::signer_address(private_key)?, "Signing account");
    Ok(client::create_wallet_provider(&config.rpc_url, private_key)?)
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    // needs no endpoint
    if let Command::Abi { contract } = cli.command {
        for line in tokenctl::signature_lines(contract.metadata())? {
            println!("{line}");
        }
        return Ok(());
    }

    let config = Config::from_file(&cli.config)?;
    let tokens = config.token_addresses();

    info!("Loaded config:");
    info!("  RPC URL: {}", config.rpc_url);
    info!("  FiatTokenV2_2: {}", tokens.fiat_token);
    info!("  Governance token: {}", tokens.governance_token);
    info!("  WNativeToken: {}", tokens.wnative_token);

    match &cli.command {
        Command::Abi { .. } => {}
        Command::Info { contract } => {
            let provider = client::create_provider(&config.rpc_url)?;
            let address = contract.address(&tokens);
            let info = tokenctl::token_info(*contract, address, provider).await?;

            println!("contract      {contract} at {address}");
            println!("name          {}", info.name);
            println!("symbol        {}", info.symbol);
            println!("decimals      {}", info.decimals);
            println!(
                "total supply  {}",
                tokenctl::format_amount(info.total_supply, info.decimals)?
            );
            for (field, value) in &info.details {
                println!("{field:<13} {value}");
            }
        }
        Command::Balance { contract, holder } => {
            let provider = client::create_provider(&config.rpc_url)?;
            let address = contract.address(&tokens);
            let decimals = tokenctl::decimals(*contract, address, provider.clone()).await?;
            let balance = tokenctl::balance_of(*contract, address, provider, *holder).await?;

            println!("{}", tokenctl::format_amount(balance, decimals)?);
        }
        Command::Transfer {
            contract,
            to,
            amount,
        } => {
            let provider = wallet_provider(&cli, &config)?;
            let address = contract.address(&tokens);
            let decimals = tokenctl::decimals(*contract, address, provider.clone()).await?;
            let amount = parse_amount(amount, decimals)?;

            let tx_hash = tokenctl::transfer(*contract, address, provider, *to, amount).await?;
            println!("{tx_hash}");
        }
        Command::Wrap { amount } => {
            let provider = wallet_provider(&cli, &config)?;
            let amount = parse_amount(amount, 18)?;

            let tx_hash = tokenctl::wrap(tokens.wnative_token, provider, amount).await?;
            info!(amount = %format_ether(amount), "Wrapped");
            println!("{tx_hash}");
        }
        Command::Unwrap { amount } => {
            let provider = wallet_provider(&cli, &config)?;
            let amount = parse_amount(amount, 18)?;

            let tx_hash = tokenctl::unwrap(tokens.wnative_token, provider, amount).await?;
            info!(amount = %format_ether(amount), "Unwrapped");
            println!("{tx_hash}");
        }
        Command::Mint {
            contract,
            to,
            amount,
        } => {
            let provider = wallet_provider(&cli, &config)?;
            let address = contract.address(&tokens);
            let decimals = tokenctl::decimals(*contract, address, provider.clone()).await?;
            let amount = parse_amount(amount, decimals)?;

            let tx_hash = tokenctl::mint(*contract, address, provider, *to, amount).await?;
            println!("{tx_hash}");
        }
        Command::Transfers {
            contract,
            from_block,
            to_block,
            from,
            to,
        } => {
            let provider = client::create_provider(&config.rpc_url)?;
            let address = contract.address(&tokens);

            let mut opts = FilterOpts::new(*from_block).with_chunk_size(config.log_chunk_size);
            if let Some(to_block) = to_block {
                opts = opts.with_end(*to_block);
            }

            let records =
                tokenctl::transfers(*contract, address, provider, &opts, from, to).await?;
            info!(count = records.len(), "Fetched transfers");

            for record in records {
                print_transfer(&record);
            }
        }
        Command::Watch {
            contract,
            from_block,
        } => {
            let provider = client::create_provider(&config.rpc_url)?;
            let address = contract.address(&tokens);
            let opts = WatchOpts {
                start: *from_block,
                poll_interval: config.poll_interval(),
            };

            let (tx, rx) = mpsc::channel(64);
            let watch = tokenctl::watch_transfers(*contract, address, provider, &opts, tx);

            tokenctl::drive_watch(watch, rx, tokio::signal::ctrl_c(), print_transfer).await?;
        }
        Command::Deploy { contract } => {
            let provider = wallet_provider(&cli, &config)?;
            let deployment = tokenctl::deploy(*contract, provider).await?;

            println!("{contract} deployed at {}", deployment.address);
            println!("tx {}", deployment.tx_hash);
        }
    }

    Ok(())
}

fn print_transfer(record: &tokenctl::TransferRecord) {
    let block = record
        .block_number
        .map_or_else(|| "pending".to_string(), |block| block.to_string());
    println!(
        "{block:>10}  {} -> {}  {}",
        record.from, record.to, record.value
    );
}

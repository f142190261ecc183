// dagsign CLI - offline signing for DAG metagraph data and currency transactions

mod config;
mod fields;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use dagsign_crypto::{
    CurrencyTransaction, SignatureProof, Signed, TransactionReference, TransferParams,
    VerificationResult,
};
use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use crate::config::Config;

/// dagsign - DAG signing protocol tool
#[derive(Parser)]
#[command(name = "dagsign")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Config file (defaults to ~/.dagsign/config.json when present)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Private key as 64 hex characters (repeat for multiple signers)
    #[arg(
        long = "key",
        global = true,
        env = "DAGSIGN_PRIVATE_KEY",
        hide_env_values = true,
        value_name = "HEX"
    )]
    keys: Vec<String>,

    /// File holding a private key
    #[arg(long, global = true, value_name = "PATH")]
    key_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a new key pair
    Keygen {
        /// Print the key pair as JSON
        #[arg(long)]
        json: bool,
    },
    /// Derive the DAG address of a public key
    Address {
        /// Public key hex, with or without the 04 prefix
        public_key: String,
    },
    /// Check that a DAG address is well formed
    Validate { address: String },
    /// Sign a JSON document with one or more keys
    Sign {
        /// JSON document to sign (omit to build one from --field)
        path: Option<PathBuf>,

        /// Sign the DataUpdate encoding
        #[arg(long)]
        data_update: bool,

        /// Add key=value fields to the document (can be specified multiple times)
        #[arg(short, long = "field", value_name = "KEY=VALUE")]
        fields: Vec<String>,

        /// Output path (defaults to <file>.signed.json)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print the signed document without writing to disk
        #[arg(long)]
        dry_run: bool,
    },
    /// Add a signature to a signed document
    Cosign {
        /// Signed document ({"value": ..., "proofs": [...]})
        path: PathBuf,

        #[arg(long)]
        data_update: bool,

        #[arg(long)]
        dry_run: bool,
    },
    /// Verify every signature on a signed document
    Verify {
        path: PathBuf,

        #[arg(long)]
        data_update: bool,
    },
    /// Currency transactions
    Tx {
        #[command(subcommand)]
        action: TxAction,
    },
}

#[derive(Subcommand)]
enum TxAction {
    /// Create and sign a single transfer
    Create {
        /// Destination DAG address
        #[arg(long)]
        to: String,

        /// Amount in tokens
        #[arg(long)]
        amount: f64,

        /// Fee in tokens (defaults to the config's default_fee)
        #[arg(long)]
        fee: Option<f64>,

        #[command(flatten)]
        parent: ParentArgs,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Create a chained batch from a JSON array of transfers
    Batch {
        /// JSON array of {"destination", "amount", "fee"?}
        path: PathBuf,

        #[command(flatten)]
        parent: ParentArgs,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Add a signature to a transaction
    Cosign {
        path: PathBuf,

        #[arg(long)]
        dry_run: bool,
    },
    /// Verify every signature on a transaction
    Verify { path: PathBuf },
    /// Print the transaction hash
    Hash { path: PathBuf },
}

#[derive(clap::Args)]
struct ParentArgs {
    /// Hash of the last accepted transaction
    #[arg(long)]
    parent_hash: String,

    /// Ordinal of the last accepted transaction
    #[arg(long)]
    parent_ordinal: u64,
}

impl ParentArgs {
    fn reference(&self) -> TransactionReference {
        TransactionReference::new(self.parent_hash.clone(), self.parent_ordinal)
    }
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = config::load_config(cli.config.as_deref())?;
    let keys = KeySource {
        keys: &cli.keys,
        key_file: cli.key_file.as_deref(),
        config: &config,
    };

    match cli.command {
        Commands::Keygen { json } => handle_keygen(json),
        Commands::Address { public_key } => handle_address(&public_key),
        Commands::Validate { address } => handle_validate(&address),
        Commands::Sign {
            path,
            data_update,
            fields,
            output,
            dry_run,
        } => handle_sign(
            path.as_deref(),
            &fields,
            data_update || config.data_update,
            output,
            dry_run,
            &keys,
        ),
        Commands::Cosign {
            path,
            data_update,
            dry_run,
        } => handle_cosign(&path, data_update || config.data_update, dry_run, &keys),
        Commands::Verify { path, data_update } => {
            handle_verify(&path, data_update || config.data_update)
        }
        Commands::Tx { action } => handle_tx(action, &keys, &config),
    }
}

/// Where signing keys come from for this invocation.
struct KeySource<'a> {
    keys: &'a [String],
    key_file: Option<&'a Path>,
    config: &'a Config,
}

impl KeySource<'_> {
    fn all(&self) -> Result<Vec<String>> {
        config::resolve_private_keys(self.keys, self.key_file, self.config)
    }

    fn one(&self) -> Result<String> {
        config::resolve_private_key(self.keys, self.key_file, self.config)
    }
}

fn handle_keygen(json: bool) -> Result<()> {
    let key_pair = dagsign_crypto::generate_key_pair();

    if json {
        let out = serde_json::json!({
            "private_key": key_pair.private_key,
            "public_key": key_pair.public_key,
            "address": key_pair.address,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("Address:     {}", key_pair.address);
        println!("Public key:  {}", key_pair.public_key);
        println!("Private key: {}", key_pair.private_key);
        println!();
        println!("{}", "Store the private key yourself - it is not saved anywhere.".yellow());
    }
    Ok(())
}

fn handle_address(public_key: &str) -> Result<()> {
    let address = dagsign_crypto::get_address(public_key)?;
    println!("{}", address);
    Ok(())
}

fn handle_validate(address: &str) -> Result<()> {
    if dagsign_crypto::is_valid_dag_address(address) {
        println!("{} {}", "✓".green().bold(), "Valid DAG address".green());
        Ok(())
    } else {
        eprintln!("{} {}", "✗".red().bold(), "Invalid DAG address".red());
        Err(anyhow!("'{}' is not a valid DAG address", address))
    }
}

fn handle_sign(
    path: Option<&Path>,
    fields: &[String],
    data_update: bool,
    output: Option<PathBuf>,
    dry_run: bool,
    keys: &KeySource<'_>,
) -> Result<()> {
    let document = build_document(path, fields)?;
    let private_keys = keys.all()?;

    let signed = dagsign_crypto::batch_sign(document, &private_keys, data_update)?;
    tracing::debug!(proofs = signed.proofs.len(), data_update, "signed document");

    let output = output.or_else(|| path.map(signed_path));
    match output {
        Some(out) if !dry_run => {
            write_json(&out, &signed)?;
            println!("Signed document written to: {}", out.display());
            print_signers(&signed.proofs);
        }
        _ => println!("{}", serde_json::to_string_pretty(&signed)?),
    }
    Ok(())
}

/// Loads the document at `path` (if any) and overlays `--field` values.
fn build_document(path: Option<&Path>, fields: &[String]) -> Result<Value> {
    let mut document = match path {
        Some(p) => read_json::<Value>(p)?,
        None if fields.is_empty() => {
            return Err(anyhow!("Nothing to sign: pass a JSON file or --field pairs"))
        }
        None => Value::Object(serde_json::Map::new()),
    };

    if fields.is_empty() {
        return Ok(document);
    }

    let Value::Object(target) = &mut document else {
        return Err(anyhow!("--field requires the document to be a JSON object"));
    };
    if let Value::Object(extra) = fields::parse_fields(fields)? {
        target.extend(extra);
    }
    Ok(document)
}

fn handle_cosign(path: &Path, data_update: bool, dry_run: bool, keys: &KeySource<'_>) -> Result<()> {
    let mut signed: Signed<Value> = read_json(path)?;
    for key in keys.all()? {
        signed = dagsign_crypto::add_signature(&signed, &key, data_update)?;
    }

    if dry_run {
        println!("{}", serde_json::to_string_pretty(&signed)?);
    } else {
        write_json(path, &signed)?;
        println!("Signature added to: {}", path.display());
        print_signers(&signed.proofs);
    }
    Ok(())
}

fn handle_verify(path: &Path, data_update: bool) -> Result<()> {
    let signed: Signed<Value> = read_json(path)?;
    let result = dagsign_crypto::verify(&signed, data_update);
    report_verification(&result)
}

fn handle_tx(action: TxAction, keys: &KeySource<'_>, config: &Config) -> Result<()> {
    match action {
        TxAction::Create {
            to,
            amount,
            fee,
            parent,
            output,
        } => {
            let params = TransferParams::new(to, amount).with_fee(fee.unwrap_or(config.default_fee));
            let tx = dagsign_crypto::create_currency_transaction(
                &params,
                &keys.one()?,
                &parent.reference(),
            )?;
            let hash = dagsign_crypto::hash_currency_transaction(&tx)?;
            eprintln!("Transaction hash: {}", hash.value);
            emit(output.as_deref(), &tx)
        }
        TxAction::Batch {
            path,
            parent,
            output,
        } => {
            let transfers: Vec<TransferParams> = read_json(&path)?;
            let batch = dagsign_crypto::create_currency_transaction_batch(
                &transfers,
                &keys.one()?,
                &parent.reference(),
            )?;
            eprintln!("Created {} chained transactions", batch.len());
            emit(output.as_deref(), &batch)
        }
        TxAction::Cosign { path, dry_run } => {
            let mut tx: CurrencyTransaction = read_json(&path)?;
            for key in keys.all()? {
                tx = dagsign_crypto::sign_currency_transaction(&tx, &key)?;
            }
            if dry_run {
                println!("{}", serde_json::to_string_pretty(&tx)?);
            } else {
                write_json(&path, &tx)?;
                println!("Signature added to: {}", path.display());
                print_signers(&tx.proofs);
            }
            Ok(())
        }
        TxAction::Verify { path } => {
            let tx: CurrencyTransaction = read_json(&path)?;
            report_verification(&dagsign_crypto::verify_currency_transaction(&tx))
        }
        TxAction::Hash { path } => {
            let tx: CurrencyTransaction = read_json(&path)?;
            println!("{}", dagsign_crypto::hash_currency_transaction(&tx)?.value);
            Ok(())
        }
    }
}

fn report_verification(result: &VerificationResult) -> Result<()> {
    if result.is_valid {
        println!("{} {}", "✓".green().bold(), "All signatures verified".green());
    } else {
        eprintln!("{} {}", "✗".red().bold(), "Verification failed".red());
    }
    println!();
    println!("  Valid:   {}", result.valid_proofs.len());
    println!("  Invalid: {}", result.invalid_proofs.len());
    for proof in &result.valid_proofs {
        println!("    {} {}", "✓".green(), truncate_id(&proof.id));
    }
    for proof in &result.invalid_proofs {
        println!("    {} {}", "✗".red(), truncate_id(&proof.id));
    }

    if result.is_valid {
        Ok(())
    } else if result.valid_proofs.is_empty() && result.invalid_proofs.is_empty() {
        Err(anyhow!("Document carries no signatures"))
    } else {
        Err(anyhow!(
            "{} of {} signatures failed verification",
            result.invalid_proofs.len(),
            result.valid_proofs.len() + result.invalid_proofs.len()
        ))
    }
}

fn print_signers(proofs: &[SignatureProof]) {
    println!("Signers:");
    for proof in proofs {
        println!("  - {}", truncate_id(&proof.id));
    }
}

/// Truncates a public key id for readability: first 16 + ... + last 8
fn truncate_id(id: &str) -> String {
    if id.len() <= 30 || !id.is_ascii() {
        return id.to_string();
    }
    format!("{}...{}", &id[..16], &id[id.len() - 8..])
}

fn signed_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".signed.json");
    PathBuf::from(name)
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read '{}'", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse '{}'", path.display()))
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(path, json).with_context(|| format!("Failed to write '{}'", path.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o644))?;
    }

    Ok(())
}

/// Writes to `output` when given, otherwise prints to stdout.
fn emit<T: Serialize>(output: Option<&Path>, value: &T) -> Result<()> {
    match output {
        Some(path) => {
            write_json(path, value)?;
            println!("Written to: {}", path.display());
            Ok(())
        }
        None => {
            println!("{}", serde_json::to_string_pretty(value)?);
            Ok(())
        }
    }
}

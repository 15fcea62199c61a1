use std::env;
use std::path::PathBuf;

use wallet_ledger::domain::money;
use wallet_ledger::{Account, AccountId, JsonFileStore, LedgerConfig, LedgerEngine, RecordStore, Wallet};

const USAGE: &str = "usage: wallet_ledger <data-dir> <command>
commands:
  create-account <id> <name>
  deposit <account-id> <amount>
  withdraw <account-id> <amount>
  transfer <from-id> <to-id-or-name> <amount>
  balance <account-id>
  history <account-id>
  flagged";

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    if let Err(e) = run().await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = env::args().skip(1);
    let data_dir = PathBuf::from(args.next().ok_or(USAGE)?);
    let command = args.next().ok_or(USAGE)?;

    let store = JsonFileStore::new(&data_dir);
    let config = LedgerConfig::load_or_default(&data_dir.join("config.json"));

    match command.as_str() {
        "create-account" => {
            let id = AccountId::new(args.next().ok_or(USAGE)?);
            let name = args.next().ok_or(USAGE)?;
            create_account(&store, id, name).await
        }
        "deposit" => {
            let id = AccountId::new(args.next().ok_or(USAGE)?);
            let amount = money::parse_amount(&args.next().ok_or(USAGE)?)?;
            let engine = LedgerEngine::new(store, config);
            let balance = engine.deposit(&id, amount).await?;
            println!("Deposit successful, new balance {balance}");
            Ok(())
        }
        "withdraw" => {
            let id = AccountId::new(args.next().ok_or(USAGE)?);
            let amount = money::parse_amount(&args.next().ok_or(USAGE)?)?;
            let engine = LedgerEngine::new(store, config);
            let receipt = engine.withdraw(&id, amount).await?;
            if receipt.held {
                println!("Withdrawal held for review, fraud status: {}", receipt.fraud);
            } else {
                println!(
                    "Withdrawal successful, new balance {}, fraud status: {}",
                    receipt.new_balance, receipt.fraud
                );
            }
            Ok(())
        }
        "transfer" => {
            let from = AccountId::new(args.next().ok_or(USAGE)?);
            let to_raw = args.next().ok_or(USAGE)?;
            let amount = money::parse_amount(&args.next().ok_or(USAGE)?)?;
            let engine = LedgerEngine::new(store, config);
            let to = resolve_account(&engine, &to_raw).await?;
            let receipt = engine.transfer(&from, &to, amount).await?;
            if receipt.held {
                println!("Transfer held for review, fraud status: {}", receipt.fraud);
            } else {
                println!(
                    "Transfer successful, new balance {}, fraud status: {}",
                    receipt.new_balance, receipt.fraud
                );
            }
            Ok(())
        }
        "balance" => {
            let id = AccountId::new(args.next().ok_or(USAGE)?);
            let engine = LedgerEngine::new(store, config);
            let (balance, currency) = engine.balance(&id).await?;
            println!("{balance} {currency}");
            Ok(())
        }
        "history" => {
            let id = AccountId::new(args.next().ok_or(USAGE)?);
            let engine = LedgerEngine::new(store, config);
            for tx in engine.history(&id).await? {
                println!("{tx}");
            }
            Ok(())
        }
        "flagged" => {
            let engine = LedgerEngine::new(store, config);
            for tx in engine.flagged().await? {
                println!("{tx}");
            }
            Ok(())
        }
        _ => Err(USAGE.into()),
    }
}

/// Registration is out of scope for the ledger; this seeds its invariant
/// directly: every account gets exactly one zero-balance wallet.
async fn create_account(
    store: &JsonFileStore,
    id: AccountId,
    name: String,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut accounts = store.read_accounts().await?;
    if accounts.iter().any(|a| a.id == id) {
        return Err(format!("account {id} already exists").into());
    }
    accounts.push(Account {
        id: id.clone(),
        name,
    });

    let mut wallets = store.read_wallets().await?;
    wallets.push(Wallet::new(id.clone()));

    store.write_accounts(&accounts).await?;
    store.write_wallets(&wallets).await?;
    println!("Created account {id}");
    Ok(())
}

/// A transfer destination may be given as an account id or a display name;
/// unresolved input is passed through as an id so the engine reports
/// RecipientNotFound.
async fn resolve_account<S: RecordStore>(
    engine: &LedgerEngine<S>,
    raw: &str,
) -> Result<AccountId, Box<dyn std::error::Error>> {
    let accounts = engine.accounts().await?;
    let resolved = accounts
        .iter()
        .find(|a| a.id.as_str() == raw)
        .or_else(|| accounts.iter().find(|a| a.name == raw))
        .map(|a| a.id.clone())
        .unwrap_or_else(|| AccountId::new(raw));
    Ok(resolved)
}

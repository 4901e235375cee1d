use evergreen_registry::domain::vault::VaultAccount;
use evergreen_registry::infra::config::{self, Settings};
use evergreen_registry::solana::{Ledger, PdaService, RpcLedger};
use evergreen_registry::VaultService;
use solana_sdk::signer::Signer;
use std::sync::Arc;

fn usage_and_exit() -> ! {
    eprintln!(
        "Usage: cargo run --bin preflight -- [--init-vault-if-missing]\n\
         \n\
         Requires env vars:\n\
           PROGRAM_ID (or VAULT_PROGRAM_ID)\n\
         Optional:\n\
           SOLANA_RPC_URL, USDC_MINT, PINATA_API_KEY, PINATA_SECRET_API_KEY\n\
         And a Solana payer key:\n\
           WALLET_SECRET_KEY, ANCHOR_WALLET or ~/.config/solana/id.json\n"
    );
    std::process::exit(2);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.iter().any(|a| a == "-h" || a == "--help") {
        usage_and_exit();
    }
    let init_vault_if_missing = args.iter().any(|a| a == "--init-vault-if-missing");

    let settings = Settings::from_env()?;
    println!("> Preflight:");
    println!("  SOLANA_RPC_URL={}", settings.solana_rpc_url);
    println!("  PROGRAM_ID={}", settings.program_id);
    println!("  USDC_MINT={}", settings.usdc_mint);
    if settings.pinata_api_key.is_empty() || settings.pinata_secret_api_key.is_empty() {
        eprintln!("  Warning: PINATA_API_KEY / PINATA_SECRET_API_KEY not set; land minting will fail.");
    }

    let payer = config::load_wallet()?;
    let payer_address = payer.pubkey();
    let ledger = Arc::new(RpcLedger::new(settings.solana_rpc_url.clone(), payer));
    let client = ledger.rpc();

    // Basic RPC connectivity
    println!("  RPC version: {}", ledger.cluster_version().await?);

    // Payer balance
    let balance_lamports = client.get_balance(&payer_address).await?;
    let sol = balance_lamports as f64 / 1_000_000_000_f64;
    println!("  Payer: {}", payer_address);
    println!("  Payer balance: {} lamports (~{:.6} SOL)", balance_lamports, sol);
    if balance_lamports < 10_000_000 {
        eprintln!("  Warning: payer balance looks low; minting and vault transactions may fail.");
    }

    // Program account existence
    let program_acct = client.get_account(&settings.program_id).await.map_err(|e| {
        anyhow::anyhow!("Program account not found on cluster: {} ({})", settings.program_id, e)
    })?;
    if !program_acct.executable {
        eprintln!("  Warning: program account exists but is not marked executable.");
    } else {
        println!("  Program account is deployed + executable.");
    }

    // Vault PDAs
    let pdas = PdaService::new(settings.program_id).vault_pdas();
    println!("  Vault PDA: {}", pdas.vault);
    println!("  EVG-S mint PDA: {}", pdas.evg_s_mint);
    println!("  Treasury PDA: {}", pdas.treasury);
    println!("  Fee PDA: {}", pdas.fee);

    let vault_data = match ledger.account_data(&pdas.vault).await? {
        Some(data) => data,
        None if init_vault_if_missing => {
            println!("  Vault missing -> initializing...");
            let service = VaultService::new(ledger.clone(), settings.program_id, settings.usdc_mint);
            let result = service.initialize_vault(None).await?;
            println!("  Vault initialized: {}", result.tx);
            ledger
                .account_data(&pdas.vault)
                .await?
                .ok_or_else(|| anyhow::anyhow!("Vault still missing after initialize"))?
        }
        None => {
            return Err(anyhow::anyhow!(
                "Vault account does not exist. Re-run with --init-vault-if-missing"
            ))
        }
    };

    let vault = VaultAccount::try_from_bytes(&vault_data)?;
    println!(
        "  Vault is readable: authority={} usdc_mint={} evg_s_supply={} evg_l_tokens={}",
        vault.authority, vault.usdc_mint, vault.total_evg_s_supply, vault.total_evg_l_tokens
    );
    if vault.usdc_mint != settings.usdc_mint {
        eprintln!(
            "  Warning: vault USDC mint {} differs from USDC_MINT {}",
            vault.usdc_mint, settings.usdc_mint
        );
    }

    println!("> Preflight OK.");
    Ok(())
}

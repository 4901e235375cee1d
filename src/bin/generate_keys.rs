use evergreen_registry::infra::config::{DEVNET_USDC_MINT, MAINNET_USDC_MINT};
use solana_sdk::signer::keypair::{write_keypair_file, Keypair};
use solana_sdk::signer::Signer;
use std::path::{Path, PathBuf};

const ANCHOR_WALLET_FILE: &str = "anchor-wallet-keypair.json";
const VAULT_PROGRAM_FILE: &str = "vault-program-keypair.json";
const VAULT_ACCOUNT_FILE: &str = "vault-account-keypair.json";

fn usage_and_exit() -> ! {
    eprintln!(
        "Usage: cargo run --bin generate_keys -- [--out <dir>] [--force]\n\
         \n\
         Writes anchor-wallet, vault-program and vault-account keypairs (JSON byte arrays)\n\
         into <dir> (default: keys/). Existing files are kept unless --force is given.\n"
    );
    std::process::exit(2);
}

fn write_new_keypair(dir: &Path, file_name: &str, force: bool) -> anyhow::Result<(Keypair, PathBuf)> {
    let path = dir.join(file_name);
    if path.exists() && !force {
        return Err(anyhow::anyhow!(
            "{} already exists; pass --force to overwrite",
            path.display()
        ));
    }
    let keypair = Keypair::new();
    write_keypair_file(&keypair, &path)
        .map_err(|e| anyhow::anyhow!("Failed to write {}: {}", path.display(), e))?;
    Ok((keypair, path))
}

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.iter().any(|a| a == "-h" || a == "--help") {
        usage_and_exit();
    }
    let force = args.iter().any(|a| a == "--force");
    let out_dir = match args.iter().position(|a| a == "--out") {
        Some(i) => match args.get(i + 1) {
            Some(dir) => PathBuf::from(shellexpand::tilde(dir).to_string()),
            None => usage_and_exit(),
        },
        None => PathBuf::from("keys"),
    };

    std::fs::create_dir_all(&out_dir)?;

    let (anchor_wallet, anchor_wallet_path) = write_new_keypair(&out_dir, ANCHOR_WALLET_FILE, force)?;
    println!("Anchor Wallet Public Key: {}", anchor_wallet.pubkey());

    let (vault_program, _) = write_new_keypair(&out_dir, VAULT_PROGRAM_FILE, force)?;
    println!("Vault Program ID: {}", vault_program.pubkey());

    let (vault_account, _) = write_new_keypair(&out_dir, VAULT_ACCOUNT_FILE, force)?;
    println!("Vault Account: {}", vault_account.pubkey());

    println!("\nUSDC Mint Addresses:");
    println!("Devnet: {}", DEVNET_USDC_MINT);
    println!("Mainnet: {}", MAINNET_USDC_MINT);

    let anchor_wallet_path = std::fs::canonicalize(&anchor_wallet_path).unwrap_or(anchor_wallet_path);
    println!("\nKeys generated successfully!");
    println!("Update your .env file with these values:\n");
    println!("ANCHOR_WALLET={}", anchor_wallet_path.display());
    println!("VAULT_PROGRAM_ID={}", vault_program.pubkey());
    println!("VAULT_ACCOUNT={}", vault_account.pubkey());
    println!("USDC_MINT={} # Devnet USDC", DEVNET_USDC_MINT);
    Ok(())
}

//! Shared harness: an in-memory ledger, a fake Pinata server and the router on an ephemeral port.
#![allow(dead_code)]

use async_trait::async_trait;
use axum::extract::{Multipart, Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use evergreen_registry::domain::vault::VaultAccount;
use evergreen_registry::infra::config::Settings;
use evergreen_registry::solana::{Ledger, NftRecord, PdaService, TokenAmount, TokenHolding};
use evergreen_registry::{transport, NftService, PinataClient, VaultService};
use serde_json::{json, Value as JsonValue};
use sha2::{Digest, Sha256};
use solana_program::{instruction::Instruction, pubkey::Pubkey};
use solana_sdk::signature::Signature;
use solana_sdk::signer::{keypair::Keypair, Signer};
use solana_sdk::transaction::Transaction;
use spl_associated_token_account::get_associated_token_address;
use std::collections::HashMap;
use std::path::{Path as FsPath, PathBuf};
use std::sync::{Arc, Mutex};

pub const FAKE_PINATA_KEY: &str = "test-key";
pub const FAKE_PINATA_SECRET: &str = "test-secret";

/// One `Ledger::submit` call as the ledger saw it.
#[derive(Debug, Clone)]
pub struct Submission {
    pub instructions: Vec<Instruction>,
    pub extra_signers: Vec<Pubkey>,
    pub signature: Signature,
}

#[derive(Default)]
struct LedgerState {
    accounts: HashMap<Pubkey, Vec<u8>>,
    holdings: HashMap<Pubkey, Vec<TokenHolding>>,
    balances: HashMap<Pubkey, TokenAmount>,
    nfts: HashMap<Pubkey, NftRecord>,
    owners: HashMap<Pubkey, Pubkey>,
    submissions: Vec<Submission>,
    forwarded: Vec<Transaction>,
    unreachable: bool,
}

/// Ledger that answers reads from seeded state and records writes.
pub struct MemoryLedger {
    authority: Keypair,
    state: Mutex<LedgerState>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self {
            authority: Keypair::new(),
            state: Mutex::new(LedgerState::default()),
        }
    }

    pub fn set_unreachable(&self) {
        self.state.lock().unwrap().unreachable = true;
    }

    pub fn seed_account(&self, address: Pubkey, data: Vec<u8>) {
        self.state.lock().unwrap().accounts.insert(address, data);
    }

    pub fn seed_balance(&self, token_account: Pubkey, amount: u64, decimals: u8) {
        self.state
            .lock()
            .unwrap()
            .balances
            .insert(token_account, TokenAmount { amount, decimals });
    }

    /// Registers a land NFT held by `owner`, updated by the service wallet.
    pub fn seed_nft(&self, owner: Pubkey, name: &str, uri: &str) -> Pubkey {
        let mint = Pubkey::new_unique();
        let mut state = self.state.lock().unwrap();
        state.nfts.insert(
            mint,
            NftRecord {
                mint,
                name: name.to_string(),
                symbol: "EVGL".to_string(),
                uri: uri.to_string(),
                update_authority: self.authority.pubkey(),
                burned: false,
            },
        );
        state.owners.insert(mint, owner);
        state.holdings.entry(owner).or_default().push(TokenHolding {
            address: get_associated_token_address(&owner, &mint),
            mint,
            amount: 1,
            decimals: 0,
        });
        mint
    }

    /// A fungible holding that listings must skip.
    pub fn seed_fungible_holding(&self, owner: Pubkey, amount: u64) {
        let mint = Pubkey::new_unique();
        self.state.lock().unwrap().holdings.entry(owner).or_default().push(TokenHolding {
            address: get_associated_token_address(&owner, &mint),
            mint,
            amount,
            decimals: 6,
        });
    }

    pub fn burn(&self, mint: &Pubkey) {
        if let Some(record) = self.state.lock().unwrap().nfts.get_mut(mint) {
            record.burned = true;
        }
    }

    pub fn submissions(&self) -> Vec<Submission> {
        self.state.lock().unwrap().submissions.clone()
    }

    pub fn forwarded(&self) -> Vec<Transaction> {
        self.state.lock().unwrap().forwarded.clone()
    }
}

#[async_trait]
impl Ledger for MemoryLedger {
    fn authority(&self) -> Pubkey {
        self.authority.pubkey()
    }

    async fn cluster_version(&self) -> anyhow::Result<String> {
        if self.state.lock().unwrap().unreachable {
            return Err(anyhow::anyhow!("connection refused"));
        }
        Ok("2.2.0".to_string())
    }

    async fn submit(
        &self,
        instructions: Vec<Instruction>,
        extra_signers: Vec<Keypair>,
    ) -> anyhow::Result<Signature> {
        let signature = Signature::new_unique();
        self.state.lock().unwrap().submissions.push(Submission {
            instructions,
            extra_signers: extra_signers.iter().map(|k| k.pubkey()).collect(),
            signature,
        });
        Ok(signature)
    }

    async fn submit_signed(&self, transaction: Transaction) -> anyhow::Result<Signature> {
        let signature = transaction.signatures[0];
        self.state.lock().unwrap().forwarded.push(transaction);
        Ok(signature)
    }

    async fn account_data(&self, address: &Pubkey) -> anyhow::Result<Option<Vec<u8>>> {
        Ok(self.state.lock().unwrap().accounts.get(address).cloned())
    }

    async fn rent_exempt_minimum(&self, data_len: usize) -> anyhow::Result<u64> {
        Ok((data_len as u64 + 128) * 6_960)
    }

    async fn token_holdings(&self, owner: &Pubkey) -> anyhow::Result<Vec<TokenHolding>> {
        Ok(self.state.lock().unwrap().holdings.get(owner).cloned().unwrap_or_default())
    }

    async fn token_balance(&self, token_account: &Pubkey) -> anyhow::Result<Option<TokenAmount>> {
        Ok(self.state.lock().unwrap().balances.get(token_account).copied())
    }

    async fn nft_record(&self, mint: &Pubkey) -> anyhow::Result<Option<NftRecord>> {
        Ok(self.state.lock().unwrap().nfts.get(mint).cloned())
    }

    async fn nft_owner(&self, mint: &Pubkey) -> anyhow::Result<Option<Pubkey>> {
        Ok(self.state.lock().unwrap().owners.get(mint).copied())
    }
}

#[derive(Default)]
struct PinStore {
    json: HashMap<String, JsonValue>,
    files: HashMap<String, (String, Vec<u8>)>,
}

/// In-process stand-in for the Pinata API and its gateway.
#[derive(Clone, Default)]
pub struct FakePinata {
    store: Arc<Mutex<PinStore>>,
}

fn fake_hash(bytes: &[u8]) -> String {
    format!("Qm{}", &hex::encode(Sha256::digest(bytes))[..44])
}

fn authorized(headers: &HeaderMap) -> bool {
    headers.get("pinata_api_key").and_then(|v| v.to_str().ok()) == Some(FAKE_PINATA_KEY)
        && headers.get("pinata_secret_api_key").and_then(|v| v.to_str().ok()) == Some(FAKE_PINATA_SECRET)
}

fn pin_response(hash: &str, size: usize) -> Json<JsonValue> {
    Json(json!({ "IpfsHash": hash, "PinSize": size, "Timestamp": "2024-01-01T00:00:00Z" }))
}

async fn pin_json(
    State(pinata): State<FakePinata>,
    headers: HeaderMap,
    Json(document): Json<JsonValue>,
) -> Result<Json<JsonValue>, StatusCode> {
    if !authorized(&headers) {
        return Err(StatusCode::UNAUTHORIZED);
    }
    let bytes = serde_json::to_vec(&document).map_err(|_| StatusCode::BAD_REQUEST)?;
    let hash = fake_hash(&bytes);
    pinata.store.lock().unwrap().json.insert(hash.clone(), document);
    Ok(pin_response(&hash, bytes.len()))
}

async fn pin_file(
    State(pinata): State<FakePinata>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Json<JsonValue>, StatusCode> {
    if !authorized(&headers) {
        return Err(StatusCode::UNAUTHORIZED);
    }
    while let Some(field) = multipart.next_field().await.map_err(|_| StatusCode::BAD_REQUEST)? {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let bytes = field.bytes().await.map_err(|_| StatusCode::BAD_REQUEST)?;
        let hash = fake_hash(&bytes);
        pinata
            .store
            .lock()
            .unwrap()
            .files
            .insert(hash.clone(), (file_name, bytes.to_vec()));
        return Ok(pin_response(&hash, bytes.len()));
    }
    Err(StatusCode::BAD_REQUEST)
}

async fn gateway(State(pinata): State<FakePinata>, Path(hash): Path<String>) -> Result<Json<JsonValue>, StatusCode> {
    pinata
        .store
        .lock()
        .unwrap()
        .json
        .get(&hash)
        .cloned()
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

impl FakePinata {
    /// Serves the fake on an ephemeral port and returns its base URL.
    pub async fn spawn(&self) -> String {
        let router = Router::new()
            .route("/pinning/pinJSONToIPFS", post(pin_json))
            .route("/pinning/pinFileToIPFS", post(pin_file))
            .route("/ipfs/:hash", get(gateway))
            .with_state(self.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://127.0.0.1:{}", port)
    }

    /// Pins a document directly, as if a previous mint had done it.
    pub fn preload_json(&self, document: JsonValue) -> String {
        let hash = fake_hash(&serde_json::to_vec(&document).unwrap());
        self.store.lock().unwrap().json.insert(hash.clone(), document);
        format!("ipfs://{}", hash)
    }

    pub fn json(&self, uri: &str) -> Option<JsonValue> {
        let hash = uri.trim_start_matches("ipfs://");
        self.store.lock().unwrap().json.get(hash).cloned()
    }

    pub fn file_names(&self) -> Vec<String> {
        self.store.lock().unwrap().files.values().map(|(name, _)| name.clone()).collect()
    }

    pub fn json_count(&self) -> usize {
        self.store.lock().unwrap().json.len()
    }
}

pub struct TestApp {
    pub base_url: String,
    pub client: reqwest::Client,
    pub ledger: Arc<MemoryLedger>,
    pub pinata: FakePinata,
    pub settings: Settings,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn authority(&self) -> Pubkey {
        self.ledger.authority()
    }

    pub fn pdas(&self) -> PdaService {
        PdaService::new(self.settings.program_id)
    }

    /// Writes an initialized vault account at the vault PDA.
    pub fn seed_vault(&self, total_evg_s_supply: u64, total_evg_l_tokens: u64) -> VaultAccount {
        let pdas = self.pdas().vault_pdas();
        let vault = VaultAccount {
            authority: self.authority(),
            usdc_mint: self.settings.usdc_mint,
            total_evg_s_supply,
            total_evg_l_tokens,
            treasury_account: pdas.treasury,
            fee_account: pdas.fee,
        };
        self.ledger.seed_account(pdas.vault, vault.to_bytes());
        vault
    }

    /// USDC held by the vault PDA's associated token account.
    pub fn seed_vault_usdc(&self, amount: u64) {
        let vault = self.pdas().vault_pdas().vault;
        let ata = get_associated_token_address(&vault, &self.settings.usdc_mint);
        self.ledger.seed_balance(ata, amount, 6);
    }
}

/// Starts the fake Pinata and the API router, both on ephemeral ports.
pub async fn spawn_app() -> TestApp {
    let pinata = FakePinata::default();
    let pinata_url = pinata.spawn().await;

    let settings = Settings {
        solana_rpc_url: "http://127.0.0.1:8899".to_string(),
        program_id: Pubkey::new_unique(),
        usdc_mint: Pubkey::new_unique(),
        pinata_api_url: pinata_url.clone(),
        pinata_gateway_url: format!("{}/ipfs", pinata_url),
        pinata_api_key: FAKE_PINATA_KEY.to_string(),
        pinata_secret_api_key: FAKE_PINATA_SECRET.to_string(),
        port: 0,
        uploads_dir: std::env::temp_dir().join(format!("evergreen-uploads-{}", Pubkey::new_unique())),
        default_image: "https://example.com/default.png".to_string(),
        max_upload_bytes: 1024 * 1024,
    };

    let ledger = Arc::new(MemoryLedger::new());
    let dyn_ledger: Arc<dyn Ledger> = ledger.clone();
    let app_state = transport::http::AppState {
        nft_service: Arc::new(NftService::new(dyn_ledger.clone(), PinataClient::new(&settings), &settings)),
        vault_service: Arc::new(VaultService::new(dyn_ledger.clone(), settings.program_id, settings.usdc_mint)),
        ledger: dyn_ledger,
    };
    let router = transport::http::create_router(app_state, settings.max_upload_bytes);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    TestApp {
        base_url: format!("http://127.0.0.1:{}", port),
        client: reqwest::Client::new(),
        ledger,
        pinata,
        settings,
    }
}

pub fn uploads_in(dir: &FsPath) -> Vec<PathBuf> {
    std::fs::read_dir(dir)
        .map(|entries| entries.filter_map(|e| e.ok()).map(|e| e.path()).collect())
        .unwrap_or_default()
}

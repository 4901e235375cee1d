// Instruction sequences for minting and moving land NFTs (SPL token + Metaplex).

use crate::infra::solana::pda::{master_edition_pda, metadata_pda};
use mpl_token_metadata::instructions::{CreateMasterEditionV3Builder, CreateMetadataAccountV3Builder};
use mpl_token_metadata::types::DataV2;
use solana_program::{instruction::Instruction, program_pack::Pack, pubkey::Pubkey};
use solana_system_interface::instruction as system_instruction;
use spl_associated_token_account::{
    get_associated_token_address, instruction::create_associated_token_account_idempotent,
};

/// Metaplex limits on the metadata strings, in bytes.
pub const MAX_NAME_LENGTH: usize = 32;
pub const MAX_SYMBOL_LENGTH: usize = 10;
pub const MAX_URI_LENGTH: usize = 200;

/// What goes into the on-chain metadata account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OnChainMetadata {
    pub name: String,
    pub symbol: String,
    pub uri: String,
}

impl OnChainMetadata {
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("NFT name is required".to_string());
        }
        if self.name.len() > MAX_NAME_LENGTH {
            return Err(format!("NFT name exceeds {} bytes", MAX_NAME_LENGTH));
        }
        if self.symbol.len() > MAX_SYMBOL_LENGTH {
            return Err(format!("NFT symbol exceeds {} bytes", MAX_SYMBOL_LENGTH));
        }
        if self.uri.len() > MAX_URI_LENGTH {
            return Err(format!("Metadata URI exceeds {} bytes", MAX_URI_LENGTH));
        }
        Ok(())
    }
}

/// Creates `mint`, mints one unit to the authority's ATA, then attaches metadata and a
/// master edition with max supply 0. The mint keypair must co-sign.
pub fn mint_nft_instructions(
    authority: &Pubkey,
    mint: &Pubkey,
    mint_rent_lamports: u64,
    metadata: &OnChainMetadata,
) -> anyhow::Result<Vec<Instruction>> {
    let token_program = spl_token::ID;
    let authority_ata = get_associated_token_address(authority, mint);

    let create_mint = system_instruction::create_account(
        authority,
        mint,
        mint_rent_lamports,
        spl_token::state::Mint::LEN as u64,
        &token_program,
    );
    let init_mint =
        spl_token::instruction::initialize_mint2(&token_program, mint, authority, Some(authority), 0)?;
    let create_ata =
        create_associated_token_account_idempotent(authority, authority, mint, &token_program);
    let mint_one =
        spl_token::instruction::mint_to(&token_program, mint, &authority_ata, authority, &[], 1)?;

    let metadata_account = metadata_pda(mint);
    let create_metadata = CreateMetadataAccountV3Builder::new()
        .metadata(metadata_account)
        .mint(*mint)
        .mint_authority(*authority)
        .payer(*authority)
        .update_authority(*authority, true)
        .data(DataV2 {
            name: metadata.name.clone(),
            symbol: metadata.symbol.clone(),
            uri: metadata.uri.clone(),
            seller_fee_basis_points: 0,
            creators: None,
            collection: None,
            uses: None,
        })
        .is_mutable(true)
        .instruction();

    let create_edition = CreateMasterEditionV3Builder::new()
        .edition(master_edition_pda(mint))
        .mint(*mint)
        .update_authority(*authority)
        .mint_authority(*authority)
        .payer(*authority)
        .metadata(metadata_account)
        .max_supply(0)
        .instruction();

    Ok(vec![
        create_mint,
        init_mint,
        create_ata,
        mint_one,
        create_metadata,
        create_edition,
    ])
}

/// Moves the single unit of `mint` from `from`'s ATA to `to`'s ATA (created if missing).
pub fn transfer_nft_instructions(
    payer: &Pubkey,
    from: &Pubkey,
    to: &Pubkey,
    mint: &Pubkey,
) -> anyhow::Result<Vec<Instruction>> {
    let token_program = spl_token::ID;
    let source = get_associated_token_address(from, mint);
    let destination = get_associated_token_address(to, mint);

    let create_destination = create_associated_token_account_idempotent(payer, to, mint, &token_program);
    let transfer = spl_token::instruction::transfer_checked(
        &token_program,
        &source,
        mint,
        &destination,
        from,
        &[],
        1,
        0,
    )?;
    Ok(vec![create_destination, transfer])
}

//! Instruction processing

#![allow(deprecated)] // system_instruction deprecation - will migrate when solana_system_interface is stable

use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{
    account_info::{next_account_info, AccountInfo},
    clock::Clock,
    entrypoint::ProgramResult,
    msg,
    program::{invoke, invoke_signed, set_return_data},
    program_error::ProgramError,
    program_pack::Pack,
    pubkey::Pubkey,
    rent::Rent,
    system_instruction, system_program,
    sysvar::Sysvar,
};
use spl_associated_token_account::get_associated_token_address_with_program_id;
use spl_token::state::Account as PaymentAccount;
use spl_token_2022::{
    extension::{metadata_pointer, ExtensionType},
    instruction::AuthorityType,
    state::Mint as OwnershipMint,
};
use spl_token_metadata_interface::state::TokenMetadata;

use crate::{
    error::GiftCardError,
    events,
    gift_card_token_name,
    instruction::GiftCardInstruction,
    state::{find_gift_card_address, find_vault_address, seeds, GiftCard, GiftCardStatus},
    validation::{
        load_gift_card, require_active, require_escrow, require_possession, require_program,
        require_recorded_owner, require_signer, store_gift_card, unpack_ownership_account,
        unpack_payment_account,
    },
    GIFT_CARD_SYMBOL, MAX_MERCHANT_NAME_LEN, MAX_URI_LEN, OWNERSHIP_TOKEN_DECIMALS,
};

pub struct Processor;

impl Processor {
    pub fn process(
        program_id: &Pubkey,
        accounts: &[AccountInfo],
        instruction_data: &[u8],
    ) -> ProgramResult {
        let instruction = GiftCardInstruction::try_from_slice(instruction_data)
            .map_err(|_| GiftCardError::InvalidInstructionData)?;

        match instruction {
            GiftCardInstruction::Mint {
                amount,
                expiry_timestamp,
                merchant_name,
                merchant,
                uri,
            } => {
                msg!("Instruction: Mint");
                Self::process_mint(
                    program_id,
                    accounts,
                    amount,
                    expiry_timestamp,
                    merchant_name,
                    merchant,
                    uri,
                )
            }
            GiftCardInstruction::Transfer => {
                msg!("Instruction: Transfer");
                Self::process_transfer(program_id, accounts)
            }
            GiftCardInstruction::Redeem { amount_to_redeem } => {
                msg!("Instruction: Redeem");
                Self::process_redeem(program_id, accounts, amount_to_redeem)
            }
            GiftCardInstruction::BurnExpired => {
                msg!("Instruction: BurnExpired");
                Self::process_burn_expired(program_id, accounts)
            }
            GiftCardInstruction::GetStatus => {
                msg!("Instruction: GetStatus");
                Self::process_get_status(program_id, accounts)
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn process_mint(
        program_id: &Pubkey,
        accounts: &[AccountInfo],
        amount: u64,
        expiry_timestamp: i64,
        merchant_name: String,
        merchant: Pubkey,
        uri: String,
    ) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let issuer = next_account_info(account_info_iter)?;
        let ownership_mint = next_account_info(account_info_iter)?;
        let gift_card_account = next_account_info(account_info_iter)?;
        let payment_mint = next_account_info(account_info_iter)?;
        let issuer_payment_account = next_account_info(account_info_iter)?;
        let escrow_vault = next_account_info(account_info_iter)?;
        let issuer_ownership_account = next_account_info(account_info_iter)?;
        let token_program = next_account_info(account_info_iter)?;
        let token_2022_program = next_account_info(account_info_iter)?;
        let associated_token_program = next_account_info(account_info_iter)?;
        let system_program_account = next_account_info(account_info_iter)?;

        // Validate inputs
        if amount == 0 {
            return Err(GiftCardError::InvalidAmount.into());
        }
        if merchant_name.len() > MAX_MERCHANT_NAME_LEN {
            return Err(GiftCardError::NameTooLong.into());
        }
        if uri.len() > MAX_URI_LEN {
            return Err(GiftCardError::UriTooLong.into());
        }
        let clock = Clock::get()?;
        if expiry_timestamp <= clock.unix_timestamp {
            return Err(GiftCardError::InvalidExpiry.into());
        }
        if !issuer.is_signer || !ownership_mint.is_signer {
            return Err(ProgramError::MissingRequiredSignature);
        }
        require_program(token_program, &spl_token::id())?;
        require_program(token_2022_program, &spl_token_2022::id())?;
        require_program(associated_token_program, &spl_associated_token_account::id())?;
        require_program(system_program_account, &system_program::id())?;

        // Derive record and vault PDAs from the ownership token identity
        let (gift_card_pda, gift_card_bump) =
            find_gift_card_address(ownership_mint.key, program_id);
        if gift_card_pda != *gift_card_account.key {
            return Err(GiftCardError::InvalidPda.into());
        }
        let (vault_pda, vault_bump) = find_vault_address(ownership_mint.key, program_id);
        if vault_pda != *escrow_vault.key {
            return Err(GiftCardError::InvalidPda.into());
        }
        let issuer_ata = get_associated_token_address_with_program_id(
            issuer.key,
            ownership_mint.key,
            &spl_token_2022::id(),
        );
        if issuer_ata != *issuer_ownership_account.key {
            return Err(GiftCardError::InvalidTokenAccount.into());
        }

        // Check if the card already exists
        if gift_card_account.data_len() > 0
            && GiftCard::unpack(&gift_card_account.data.borrow()).is_ok()
        {
            return Err(GiftCardError::CardAlreadyExists.into());
        }

        // Funding source must be the issuer's own account for the payment mint
        let funding = unpack_payment_account(issuer_payment_account)?;
        if funding.owner != *issuer.key || funding.mint != *payment_mint.key {
            return Err(GiftCardError::InvalidTokenAccount.into());
        }
        if funding.amount < amount {
            return Err(GiftCardError::InsufficientFunds.into());
        }

        let rent = Rent::get()?;
        let bump = [gift_card_bump];
        let gift_card_seeds: &[&[u8]] =
            &[seeds::GIFT_CARD_SEED, ownership_mint.key.as_ref(), &bump];

        // Create gift card record account
        invoke_signed(
            &system_instruction::create_account(
                issuer.key,
                gift_card_account.key,
                rent.minimum_balance(GiftCard::LEN),
                GiftCard::LEN as u64,
                program_id,
            ),
            &[issuer.clone(), gift_card_account.clone(), system_program_account.clone()],
            &[gift_card_seeds],
        )?;

        // Create the ownership mint. The record PDA is permanent delegate so that
        // the token can be burned from any holder, and mint authority until the
        // single unit exists.
        let token_metadata = TokenMetadata {
            mint: *ownership_mint.key,
            name: gift_card_token_name(&merchant_name),
            symbol: GIFT_CARD_SYMBOL.to_string(),
            uri: uri.clone(),
            ..Default::default()
        };
        let mint_space = ExtensionType::try_calculate_account_len::<OwnershipMint>(&[
            ExtensionType::PermanentDelegate,
            ExtensionType::MetadataPointer,
        ])?;
        let mint_lamports = rent.minimum_balance(mint_space + token_metadata.tlv_size_of()?);

        invoke(
            &system_instruction::create_account(
                issuer.key,
                ownership_mint.key,
                mint_lamports,
                mint_space as u64,
                &spl_token_2022::id(),
            ),
            &[issuer.clone(), ownership_mint.clone(), system_program_account.clone()],
        )?;
        invoke(
            &spl_token_2022::instruction::initialize_permanent_delegate(
                &spl_token_2022::id(),
                ownership_mint.key,
                &gift_card_pda,
            )?,
            &[ownership_mint.clone(), token_2022_program.clone()],
        )?;
        invoke(
            &metadata_pointer::instruction::initialize(
                &spl_token_2022::id(),
                ownership_mint.key,
                Some(gift_card_pda),
                Some(*ownership_mint.key),
            )?,
            &[ownership_mint.clone(), token_2022_program.clone()],
        )?;
        invoke(
            &spl_token_2022::instruction::initialize_mint2(
                &spl_token_2022::id(),
                ownership_mint.key,
                &gift_card_pda,
                None,
                OWNERSHIP_TOKEN_DECIMALS,
            )?,
            &[ownership_mint.clone(), token_2022_program.clone()],
        )?;
        invoke_signed(
            &spl_token_metadata_interface::instruction::initialize(
                &spl_token_2022::id(),
                ownership_mint.key,
                &gift_card_pda,
                ownership_mint.key,
                &gift_card_pda,
                token_metadata.name,
                token_metadata.symbol,
                token_metadata.uri,
            ),
            &[
                ownership_mint.clone(),
                gift_card_account.clone(),
                token_2022_program.clone(),
            ],
            &[gift_card_seeds],
        )?;

        // Create vault token account
        invoke_signed(
            &system_instruction::create_account(
                issuer.key,
                escrow_vault.key,
                rent.minimum_balance(PaymentAccount::LEN),
                PaymentAccount::LEN as u64,
                &spl_token::id(),
            ),
            &[issuer.clone(), escrow_vault.clone(), system_program_account.clone()],
            &[&[seeds::VAULT_SEED, ownership_mint.key.as_ref(), &[vault_bump]]],
        )?;

        // Initialize vault token account
        invoke(
            &spl_token::instruction::initialize_account3(
                &spl_token::id(),
                escrow_vault.key,
                payment_mint.key,
                gift_card_account.key, // record PDA is the authority
            )?,
            &[escrow_vault.clone(), payment_mint.clone(), token_program.clone()],
        )?;

        // Mint the single ownership token to the issuer, then revoke mint authority
        invoke(
            &spl_associated_token_account::instruction::create_associated_token_account(
                issuer.key,
                issuer.key,
                ownership_mint.key,
                &spl_token_2022::id(),
            ),
            &[
                issuer.clone(),
                issuer_ownership_account.clone(),
                issuer.clone(),
                ownership_mint.clone(),
                system_program_account.clone(),
                token_2022_program.clone(),
                associated_token_program.clone(),
            ],
        )?;
        invoke_signed(
            &spl_token_2022::instruction::mint_to(
                &spl_token_2022::id(),
                ownership_mint.key,
                issuer_ownership_account.key,
                &gift_card_pda,
                &[],
                1,
            )?,
            &[
                ownership_mint.clone(),
                issuer_ownership_account.clone(),
                gift_card_account.clone(),
                token_2022_program.clone(),
            ],
            &[gift_card_seeds],
        )?;
        invoke_signed(
            &spl_token_2022::instruction::set_authority(
                &spl_token_2022::id(),
                ownership_mint.key,
                None,
                AuthorityType::MintTokens,
                &gift_card_pda,
                &[],
            )?,
            &[
                ownership_mint.clone(),
                gift_card_account.clone(),
                token_2022_program.clone(),
            ],
            &[gift_card_seeds],
        )?;

        // Transfer face value to vault
        invoke(
            &spl_token::instruction::transfer(
                &spl_token::id(),
                issuer_payment_account.key,
                escrow_vault.key,
                issuer.key,
                &[],
                amount,
            )?,
            &[
                issuer_payment_account.clone(),
                escrow_vault.clone(),
                issuer.clone(),
                token_program.clone(),
            ],
        )?;

        // Initialize gift card state
        let gift_card = GiftCard::new(
            *issuer.key,
            merchant,
            merchant_name,
            amount,
            *ownership_mint.key,
            *escrow_vault.key,
            clock.unix_timestamp,
            expiry_timestamp,
            gift_card_bump,
        );
        store_gift_card(gift_card_account, &gift_card)?;

        events::emit_gift_card_minted(
            gift_card_account.key,
            issuer.key,
            &merchant,
            amount,
            expiry_timestamp,
            ownership_mint.key,
        );
        Ok(())
    }

    fn process_transfer(program_id: &Pubkey, accounts: &[AccountInfo]) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let current_owner = next_account_info(account_info_iter)?;
        let new_owner = next_account_info(account_info_iter)?;
        let ownership_mint = next_account_info(account_info_iter)?;
        let gift_card_account = next_account_info(account_info_iter)?;
        let current_owner_account = next_account_info(account_info_iter)?;
        let new_owner_account = next_account_info(account_info_iter)?;
        let token_2022_program = next_account_info(account_info_iter)?;
        let associated_token_program = next_account_info(account_info_iter)?;
        let system_program_account = next_account_info(account_info_iter)?;

        let mut gift_card = load_gift_card(program_id, gift_card_account, ownership_mint.key)?;

        // Authorization is the stored owner field, not token possession
        require_active(&gift_card)?;
        require_recorded_owner(&gift_card, current_owner)?;
        require_signer(current_owner)?;

        let clock = Clock::get()?;
        if gift_card.is_expired_at(clock.unix_timestamp) {
            return Err(GiftCardError::CardExpired.into());
        }

        require_program(token_2022_program, &spl_token_2022::id())?;
        require_program(associated_token_program, &spl_associated_token_account::id())?;
        require_program(system_program_account, &system_program::id())?;
        let new_owner_ata = get_associated_token_address_with_program_id(
            new_owner.key,
            ownership_mint.key,
            &spl_token_2022::id(),
        );
        if new_owner_ata != *new_owner_account.key {
            return Err(GiftCardError::InvalidTokenAccount.into());
        }

        // Create the new owner's holder account if absent
        invoke(
            &spl_associated_token_account::instruction::create_associated_token_account_idempotent(
                current_owner.key,
                new_owner.key,
                ownership_mint.key,
                &spl_token_2022::id(),
            ),
            &[
                current_owner.clone(),
                new_owner_account.clone(),
                new_owner.clone(),
                ownership_mint.clone(),
                system_program_account.clone(),
                token_2022_program.clone(),
                associated_token_program.clone(),
            ],
        )?;

        invoke(
            &spl_token_2022::instruction::transfer_checked(
                &spl_token_2022::id(),
                current_owner_account.key,
                ownership_mint.key,
                new_owner_account.key,
                current_owner.key,
                &[],
                1,
                OWNERSHIP_TOKEN_DECIMALS,
            )?,
            &[
                current_owner_account.clone(),
                ownership_mint.clone(),
                new_owner_account.clone(),
                current_owner.clone(),
                token_2022_program.clone(),
            ],
        )?;

        let old_owner = gift_card.current_owner;
        gift_card.current_owner = *new_owner.key;
        store_gift_card(gift_card_account, &gift_card)?;

        events::emit_gift_card_transferred(
            gift_card_account.key,
            &old_owner,
            new_owner.key,
            ownership_mint.key,
        );
        Ok(())
    }

    fn process_redeem(
        program_id: &Pubkey,
        accounts: &[AccountInfo],
        amount_to_redeem: Option<u64>,
    ) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let redeemer = next_account_info(account_info_iter)?;
        let gift_card_account = next_account_info(account_info_iter)?;
        let ownership_mint = next_account_info(account_info_iter)?;
        let redeemer_ownership_account = next_account_info(account_info_iter)?;
        let escrow_vault = next_account_info(account_info_iter)?;
        let redeemer_payment_account = next_account_info(account_info_iter)?;
        let token_program = next_account_info(account_info_iter)?;
        let token_2022_program = next_account_info(account_info_iter)?;

        let mut gift_card = load_gift_card(program_id, gift_card_account, ownership_mint.key)?;

        // Authorization is token possession, not the stored owner field
        require_active(&gift_card)?;
        require_signer(redeemer)?;
        require_possession(redeemer_ownership_account, ownership_mint.key, redeemer)?;

        let clock = Clock::get()?;
        if gift_card.is_expired_at(clock.unix_timestamp) {
            return Err(GiftCardError::CardExpired.into());
        }

        let redeem_amount = amount_to_redeem.unwrap_or(gift_card.remaining_balance);
        if redeem_amount == 0 || redeem_amount > gift_card.remaining_balance {
            return Err(GiftCardError::InvalidAmount.into());
        }

        require_escrow(&gift_card, escrow_vault)?;
        require_program(token_program, &spl_token::id())?;
        require_program(token_2022_program, &spl_token_2022::id())?;

        let mint_key = gift_card.mint;
        let bump = [gift_card.bump];
        let gift_card_seeds: &[&[u8]] = &[seeds::GIFT_CARD_SEED, mint_key.as_ref(), &bump];

        // Transfer tokens from vault to redeemer
        invoke_signed(
            &spl_token::instruction::transfer(
                &spl_token::id(),
                escrow_vault.key,
                redeemer_payment_account.key,
                gift_card_account.key,
                &[],
                redeem_amount,
            )?,
            &[
                escrow_vault.clone(),
                redeemer_payment_account.clone(),
                gift_card_account.clone(),
                token_program.clone(),
            ],
            &[gift_card_seeds],
        )?;

        gift_card.remaining_balance -= redeem_amount;

        if gift_card.remaining_balance == 0 {
            Self::burn_ownership_token(
                redeemer_ownership_account,
                ownership_mint,
                gift_card_account,
                token_2022_program,
                gift_card_seeds,
            )?;
            gift_card.status = GiftCardStatus::Redeemed;
        }

        store_gift_card(gift_card_account, &gift_card)?;

        events::emit_gift_card_redeemed(
            gift_card_account.key,
            redeemer.key,
            redeem_amount,
            gift_card.remaining_balance,
            ownership_mint.key,
        );
        Ok(())
    }

    fn process_burn_expired(program_id: &Pubkey, accounts: &[AccountInfo]) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let caller = next_account_info(account_info_iter)?;
        let gift_card_account = next_account_info(account_info_iter)?;
        let ownership_mint = next_account_info(account_info_iter)?;
        let holder_ownership_account = next_account_info(account_info_iter)?;
        let escrow_vault = next_account_info(account_info_iter)?;
        let issuer_payment_account = next_account_info(account_info_iter)?;
        let token_program = next_account_info(account_info_iter)?;
        let token_2022_program = next_account_info(account_info_iter)?;

        let mut gift_card = load_gift_card(program_id, gift_card_account, ownership_mint.key)?;

        require_active(&gift_card)?;
        require_signer(caller)?;

        // Permissionless: the only gate is the clock
        let clock = Clock::get()?;
        if !gift_card.is_expired_at(clock.unix_timestamp) {
            return Err(GiftCardError::InvalidExpiry.into());
        }

        let holder = unpack_ownership_account(holder_ownership_account, ownership_mint.key)?;
        if holder.amount != 1 {
            return Err(GiftCardError::InvalidTokenAccount.into());
        }
        // Funds always return to the issuer, whoever calls
        let destination = unpack_payment_account(issuer_payment_account)?;
        if destination.owner != gift_card.issuer {
            return Err(GiftCardError::InvalidTokenAccount.into());
        }
        require_escrow(&gift_card, escrow_vault)?;
        require_program(token_program, &spl_token::id())?;
        require_program(token_2022_program, &spl_token_2022::id())?;

        let mint_key = gift_card.mint;
        let bump = [gift_card.bump];
        let gift_card_seeds: &[&[u8]] = &[seeds::GIFT_CARD_SEED, mint_key.as_ref(), &bump];

        let reclaimed_amount = gift_card.remaining_balance;
        if reclaimed_amount > 0 {
            invoke_signed(
                &spl_token::instruction::transfer(
                    &spl_token::id(),
                    escrow_vault.key,
                    issuer_payment_account.key,
                    gift_card_account.key,
                    &[],
                    reclaimed_amount,
                )?,
                &[
                    escrow_vault.clone(),
                    issuer_payment_account.clone(),
                    gift_card_account.clone(),
                    token_program.clone(),
                ],
                &[gift_card_seeds],
            )?;
        }

        Self::burn_ownership_token(
            holder_ownership_account,
            ownership_mint,
            gift_card_account,
            token_2022_program,
            gift_card_seeds,
        )?;

        gift_card.remaining_balance = 0;
        gift_card.status = GiftCardStatus::Expired;
        store_gift_card(gift_card_account, &gift_card)?;

        events::emit_gift_card_expired(
            gift_card_account.key,
            &gift_card.issuer,
            caller.key,
            reclaimed_amount,
            ownership_mint.key,
        );
        Ok(())
    }

    fn process_get_status(program_id: &Pubkey, accounts: &[AccountInfo]) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let gift_card_account = next_account_info(account_info_iter)?;
        let ownership_mint = next_account_info(account_info_iter)?;

        let gift_card = load_gift_card(program_id, gift_card_account, ownership_mint.key)?;

        msg!("Gift Card Status:");
        msg!("  Mint: {}", gift_card.mint);
        msg!("  Issuer: {}", gift_card.issuer);
        msg!("  Current Owner: {}", gift_card.current_owner);
        msg!("  Merchant: {}", gift_card.merchant);
        msg!("  Merchant Name: {}", gift_card.merchant_name);
        msg!("  Original Amount: {}", gift_card.amount);
        msg!("  Remaining Balance: {}", gift_card.remaining_balance);
        msg!("  Status: {:?}", gift_card.status);
        msg!("  Created At: {}", gift_card.created_at);
        msg!("  Expiry: {}", gift_card.expiry_timestamp);

        set_return_data(&gift_card.try_to_vec()?);
        Ok(())
    }

    /// Burn the single ownership token from `holder_account`, signing as the
    /// record PDA in its role as the mint's permanent delegate.
    fn burn_ownership_token<'a>(
        holder_account: &AccountInfo<'a>,
        ownership_mint: &AccountInfo<'a>,
        gift_card_account: &AccountInfo<'a>,
        token_2022_program: &AccountInfo<'a>,
        gift_card_seeds: &[&[u8]],
    ) -> ProgramResult {
        invoke_signed(
            &spl_token_2022::instruction::burn(
                &spl_token_2022::id(),
                holder_account.key,
                ownership_mint.key,
                gift_card_account.key,
                &[],
                1,
            )?,
            &[
                holder_account.clone(),
                ownership_mint.clone(),
                gift_card_account.clone(),
                token_2022_program.clone(),
            ],
            &[gift_card_seeds],
        )
    }
}

//! Account checks shared by the instruction handlers.
//!
//! Ownership is verified by two independent capabilities: the record's stored
//! `current_owner` (authorizes Transfer) and actual possession of the ownership
//! token (authorizes Redeem). Handlers compose the one they need.

use solana_program::{
    account_info::AccountInfo, entrypoint::ProgramResult, program_error::ProgramError,
    program_pack::Pack, pubkey::Pubkey,
};
use spl_token::state::Account as PaymentAccount;
use spl_token_2022::{extension::StateWithExtensions, state::Account as OwnershipAccount};

use crate::{
    error::GiftCardError,
    state::{seeds, GiftCard},
};

/// Load the record stored at `record_info` and confirm it belongs to `mint`.
pub fn load_gift_card(
    program_id: &Pubkey,
    record_info: &AccountInfo,
    mint: &Pubkey,
) -> Result<GiftCard, ProgramError> {
    if record_info.owner != program_id {
        return Err(GiftCardError::InvalidAccountOwner.into());
    }
    let record = GiftCard::unpack(&record_info.data.borrow())?;
    if record.mint != *mint {
        return Err(GiftCardError::InvalidPda.into());
    }
    let expected = Pubkey::create_program_address(
        &[seeds::GIFT_CARD_SEED, mint.as_ref(), &[record.bump]],
        program_id,
    )
    .map_err(|_| GiftCardError::InvalidPda)?;
    if expected != *record_info.key {
        return Err(GiftCardError::InvalidPda.into());
    }
    Ok(record)
}

/// Write the record back into its account.
pub fn store_gift_card(record_info: &AccountInfo, record: &GiftCard) -> ProgramResult {
    record.pack(&mut record_info.data.borrow_mut()[..])
}

pub fn require_active(record: &GiftCard) -> ProgramResult {
    if record.status.is_terminal() {
        return Err(GiftCardError::AlreadyTerminal.into());
    }
    Ok(())
}

pub fn require_signer(account: &AccountInfo) -> ProgramResult {
    if !account.is_signer {
        return Err(ProgramError::MissingRequiredSignature);
    }
    Ok(())
}

pub fn require_program(account: &AccountInfo, expected: &Pubkey) -> ProgramResult {
    if account.key != expected {
        return Err(ProgramError::IncorrectProgramId);
    }
    Ok(())
}

/// Transfer authorization: the signer must match the record's stored owner.
pub fn require_recorded_owner(record: &GiftCard, signer: &AccountInfo) -> ProgramResult {
    if record.current_owner != *signer.key {
        return Err(GiftCardError::NotCurrentOwner.into());
    }
    Ok(())
}

/// Unpack a Token-2022 account of the ownership mint.
pub fn unpack_ownership_account(
    account: &AccountInfo,
    mint: &Pubkey,
) -> Result<OwnershipAccount, ProgramError> {
    if account.owner != &spl_token_2022::id() {
        return Err(GiftCardError::InvalidTokenAccount.into());
    }
    let data = account.data.borrow();
    let state = StateWithExtensions::<OwnershipAccount>::unpack(&data)
        .map_err(|_| GiftCardError::InvalidTokenAccount)?;
    if state.base.mint != *mint {
        return Err(GiftCardError::InvalidTokenAccount.into());
    }
    Ok(state.base)
}

/// Whether `account` is `holder`'s account for `mint` and contains the single
/// ownership token.
pub fn holds_ownership_token(account: &AccountInfo, mint: &Pubkey, holder: &Pubkey) -> bool {
    match unpack_ownership_account(account, mint) {
        Ok(state) => state.owner == *holder && state.amount == 1,
        Err(_) => false,
    }
}

/// Redeem authorization: the signer must actually hold the ownership token.
pub fn require_possession(
    account: &AccountInfo,
    mint: &Pubkey,
    signer: &AccountInfo,
) -> ProgramResult {
    if !holds_ownership_token(account, mint, signer.key) {
        return Err(GiftCardError::NotOwnedByMerchant.into());
    }
    Ok(())
}

/// Unpack an SPL Token account of the payment asset.
pub fn unpack_payment_account(account: &AccountInfo) -> Result<PaymentAccount, ProgramError> {
    if account.owner != &spl_token::id() {
        return Err(GiftCardError::InvalidTokenAccount.into());
    }
    PaymentAccount::unpack(&account.data.borrow())
        .map_err(|_| GiftCardError::InvalidTokenAccount.into())
}

/// The vault passed in must be the one the record was created with.
pub fn require_escrow(record: &GiftCard, vault: &AccountInfo) -> ProgramResult {
    if record.escrow_account != *vault.key {
        return Err(GiftCardError::InvalidPda.into());
    }
    Ok(())
}

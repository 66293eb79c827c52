//! Error types

use solana_program::program_error::ProgramError;
use thiserror::Error;

/// Every variant maps to `ProgramError::Custom(index)`; do not reorder.
#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GiftCardError {
    #[error("Not the current owner")]
    NotCurrentOwner,

    #[error("Ownership token not held by redeemer")]
    NotOwnedByMerchant,

    #[error("Invalid amount")]
    InvalidAmount,

    #[error("Invalid expiry")]
    InvalidExpiry,

    #[error("Gift card is redeemed or expired")]
    AlreadyTerminal,

    #[error("Insufficient funds")]
    InsufficientFunds,

    #[error("Merchant name too long")]
    NameTooLong,

    #[error("Metadata uri too long")]
    UriTooLong,

    #[error("Gift card has expired")]
    CardExpired,

    #[error("Gift card already exists")]
    CardAlreadyExists,

    #[error("Invalid instruction data")]
    InvalidInstructionData,

    #[error("Invalid PDA")]
    InvalidPda,

    #[error("Invalid account owner")]
    InvalidAccountOwner,

    #[error("Account not initialized")]
    AccountNotInitialized,

    #[error("Invalid token account")]
    InvalidTokenAccount,
}

impl From<GiftCardError> for ProgramError {
    fn from(e: GiftCardError) -> Self {
        ProgramError::Custom(e as u32)
    }
}

//! Account state definitions

use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{program_error::ProgramError, pubkey::Pubkey};

use crate::{error::GiftCardError, MAX_MERCHANT_NAME_LEN};

/// Lifecycle of a gift card. `Redeemed` and `Expired` are terminal.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GiftCardStatus {
    Active,
    Redeemed,
    Expired,
}

impl GiftCardStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, GiftCardStatus::Active)
    }
}

/// Gift card record, one per ownership token.
/// PDA seeds: ["gift_card", ownership_mint]
///
/// The record PDA is also the authority of the escrow vault and the permanent
/// delegate of the ownership mint.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct GiftCard {
    /// Discriminator for account type
    pub discriminator: [u8; 8],
    /// Funded the card; receives the balance back on expiry
    pub issuer: Pubkey,
    /// Authorizes the next transfer
    pub current_owner: Pubkey,
    /// Designated redeemer (informational)
    pub merchant: Pubkey,
    /// Display label, at most `MAX_MERCHANT_NAME_LEN` bytes
    pub merchant_name: String,
    /// Face value in the payment asset's smallest unit
    pub amount: u64,
    /// Redeemable value still held in escrow
    pub remaining_balance: u64,
    /// Ownership token mint
    pub mint: Pubkey,
    /// Escrow vault token account
    pub escrow_account: Pubkey,
    pub created_at: i64,
    pub expiry_timestamp: i64,
    pub status: GiftCardStatus,
    /// PDA bump seed
    pub bump: u8,
}

impl GiftCard {
    pub const DISCRIMINATOR: [u8; 8] = *b"GIFTCARD";
    // discriminator + issuer + current_owner + merchant + name (len prefix + bytes)
    // + amount + remaining_balance + mint + escrow + created_at + expiry + status + bump
    // = 238 bytes
    pub const LEN: usize =
        8 + 32 + 32 + 32 + (4 + MAX_MERCHANT_NAME_LEN) + 8 + 8 + 32 + 32 + 8 + 8 + 1 + 1;

    #[allow(clippy::too_many_arguments)]
    pub fn new(
        issuer: Pubkey,
        merchant: Pubkey,
        merchant_name: String,
        amount: u64,
        mint: Pubkey,
        escrow_account: Pubkey,
        created_at: i64,
        expiry_timestamp: i64,
        bump: u8,
    ) -> Self {
        Self {
            discriminator: Self::DISCRIMINATOR,
            issuer,
            current_owner: issuer,
            merchant,
            merchant_name,
            amount,
            remaining_balance: amount,
            mint,
            escrow_account,
            created_at,
            expiry_timestamp,
            status: GiftCardStatus::Active,
            bump,
        }
    }

    /// Decode a record from account data.
    ///
    /// The account is sized for the longest merchant name, so shorter records
    /// leave zero padding after the encoded fields; only the prefix is read.
    pub fn unpack(data: &[u8]) -> Result<Self, ProgramError> {
        let mut buf = data;
        let record = Self::deserialize(&mut buf)
            .map_err(|_| ProgramError::from(GiftCardError::AccountNotInitialized))?;
        if record.discriminator != Self::DISCRIMINATOR {
            return Err(GiftCardError::AccountNotInitialized.into());
        }
        Ok(record)
    }

    pub fn pack(&self, data: &mut [u8]) -> Result<(), ProgramError> {
        self.serialize(&mut &mut data[..])?;
        Ok(())
    }

    pub fn is_expired_at(&self, now: i64) -> bool {
        now > self.expiry_timestamp
    }
}

/// Seeds for PDA derivation
pub mod seeds {
    pub const GIFT_CARD_SEED: &[u8] = b"gift_card";
    pub const VAULT_SEED: &[u8] = b"vault";
}

pub fn find_gift_card_address(mint: &Pubkey, program_id: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[seeds::GIFT_CARD_SEED, mint.as_ref()], program_id)
}

pub fn find_vault_address(mint: &Pubkey, program_id: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[seeds::VAULT_SEED, mint.as_ref()], program_id)
}

//! Gift Card Program (Native Solana)
//!
//! Each gift card is a single Token-2022 ownership token paired with a record
//! that custodies an SPL token balance in a program-owned escrow vault. Holders
//! redeem against the vault; unused value returns to the issuer after expiry.

pub mod error;
pub mod events;
pub mod instruction;
pub mod processor;
pub mod state;
pub mod validation;

#[cfg(not(feature = "no-entrypoint"))]
mod entrypoint;

pub use solana_program;

// Re-export for tests
pub use error::GiftCardError;
pub use instruction::GiftCardInstruction;
pub use state::{GiftCard, GiftCardStatus};

/// Longest merchant name stored in a record, in bytes
pub const MAX_MERCHANT_NAME_LEN: usize = 32;

/// Longest metadata uri accepted at mint, in bytes
pub const MAX_URI_LEN: usize = 200;

/// Symbol written into every ownership token's metadata
pub const GIFT_CARD_SYMBOL: &str = "GIFTCARD";

/// Ownership tokens are indivisible
pub const OWNERSHIP_TOKEN_DECIMALS: u8 = 0;

/// Display name written into the ownership token's metadata
pub fn gift_card_token_name(merchant_name: &str) -> String {
    format!("Gift Card - {}", merchant_name)
}

//! Event definitions for the gift card program.
//!
//! Events are emitted via solana_program::msg! and can be parsed from transaction logs.

use solana_program::{msg, pubkey::Pubkey};

/// Emitted when a card is issued and its face value locked in escrow.
pub fn emit_gift_card_minted(
    gift_card: &Pubkey,
    issuer: &Pubkey,
    merchant: &Pubkey,
    amount: u64,
    expiry_timestamp: i64,
    mint: &Pubkey,
) {
    msg!(
        "GiftCardMinted: gift_card={}, issuer={}, merchant={}, amount={}, expiry={}, mint={}",
        gift_card,
        issuer,
        merchant,
        amount,
        expiry_timestamp,
        mint
    );
}

/// Emitted when the ownership token changes hands through the program.
pub fn emit_gift_card_transferred(gift_card: &Pubkey, from: &Pubkey, to: &Pubkey, mint: &Pubkey) {
    msg!(
        "GiftCardTransferred: gift_card={}, from={}, to={}, mint={}",
        gift_card,
        from,
        to,
        mint
    );
}

/// Emitted on every redemption, partial or full.
pub fn emit_gift_card_redeemed(
    gift_card: &Pubkey,
    redeemer: &Pubkey,
    amount: u64,
    remaining_balance: u64,
    mint: &Pubkey,
) {
    msg!(
        "GiftCardRedeemed: gift_card={}, redeemer={}, amount={}, remaining={}, mint={}",
        gift_card,
        redeemer,
        amount,
        remaining_balance,
        mint
    );
}

/// Emitted when an expired card is cleaned up and its balance returned.
pub fn emit_gift_card_expired(
    gift_card: &Pubkey,
    issuer: &Pubkey,
    caller: &Pubkey,
    reclaimed_amount: u64,
    mint: &Pubkey,
) {
    msg!(
        "GiftCardExpired: gift_card={}, issuer={}, caller={}, reclaimed={}, mint={}",
        gift_card,
        issuer,
        caller,
        reclaimed_amount,
        mint
    );
}

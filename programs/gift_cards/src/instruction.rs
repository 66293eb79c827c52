//! Instruction definitions

use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::pubkey::Pubkey;

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub enum GiftCardInstruction {
    /// Issue a gift card: create the ownership token, lock `amount` in escrow
    /// and record the card
    ///
    /// Accounts expected:
    /// 0. `[writable, signer]` Issuer
    /// 1. `[writable, signer]` Ownership mint (fresh keypair)
    /// 2. `[writable]` Gift card record (PDA)
    /// 3. `[]` Payment mint
    /// 4. `[writable]` Issuer payment token account
    /// 5. `[writable]` Escrow vault (PDA)
    /// 6. `[writable]` Issuer ownership token account (associated, created here)
    /// 7. `[]` SPL Token program
    /// 8. `[]` Token-2022 program
    /// 9. `[]` Associated token account program
    /// 10. `[]` System program
    Mint {
        amount: u64,
        expiry_timestamp: i64,
        merchant_name: String,
        merchant: Pubkey,
        uri: String,
    },

    /// Move the ownership token to a new owner. Authorized by the record's
    /// stored `current_owner`.
    ///
    /// Accounts expected:
    /// 0. `[writable, signer]` Current owner
    /// 1. `[]` New owner
    /// 2. `[]` Ownership mint
    /// 3. `[writable]` Gift card record (PDA)
    /// 4. `[writable]` Current owner ownership token account
    /// 5. `[writable]` New owner ownership token account (associated, created if absent)
    /// 6. `[]` Token-2022 program
    /// 7. `[]` Associated token account program
    /// 8. `[]` System program
    Transfer,

    /// Release escrowed funds to whoever holds the ownership token. Redeems the
    /// full remaining balance when `amount_to_redeem` is `None`; burns the token
    /// once the balance reaches zero.
    ///
    /// Accounts expected:
    /// 0. `[signer]` Redeemer
    /// 1. `[writable]` Gift card record (PDA)
    /// 2. `[writable]` Ownership mint
    /// 3. `[writable]` Redeemer ownership token account
    /// 4. `[writable]` Escrow vault (PDA)
    /// 5. `[writable]` Redeemer payment token account
    /// 6. `[]` SPL Token program
    /// 7. `[]` Token-2022 program
    Redeem { amount_to_redeem: Option<u64> },

    /// Return the remaining balance of an expired card to its issuer and burn
    /// the ownership token. Anyone may call this.
    ///
    /// Accounts expected:
    /// 0. `[signer]` Caller
    /// 1. `[writable]` Gift card record (PDA)
    /// 2. `[writable]` Ownership mint
    /// 3. `[writable]` Holder ownership token account
    /// 4. `[writable]` Escrow vault (PDA)
    /// 5. `[writable]` Issuer payment token account
    /// 6. `[]` SPL Token program
    /// 7. `[]` Token-2022 program
    BurnExpired,

    /// Log the record and publish it as return data
    ///
    /// Accounts expected:
    /// 0. `[]` Gift card record (PDA)
    /// 1. `[]` Ownership mint
    GetStatus,
}

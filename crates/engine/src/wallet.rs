//! Wallet book — a user's tracked wallet addresses.
//!
//! Addresses are validated against their chain's format, deduplicated on the
//! lowercased address, and gated by the `wallets` quota of the owner's tier.

use chrono::{DateTime, Utc};
use thiserror::Error;

use whale_common::types::{Chain, Feature, Quota, SubscriptionTier, TokenBalance, WalletEntry};

use crate::limits::check_access;

const BASE58_ALPHABET: &str = "123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";
const BECH32_ALPHABET: &str = "qpzry9x8gf2tvdw0s3jn54khce6mua7l";

#[derive(Debug, Error, PartialEq)]
pub enum WalletError {
    #[error("Invalid {chain} address '{address}'")]
    InvalidAddress { chain: Chain, address: String },

    #[error("Wallet '{0}' is already tracked")]
    Duplicate(String),

    #[error("Wallet limit reached ({limit}) for {tier} plan")]
    LimitReached { tier: SubscriptionTier, limit: Quota },
}

/// Canonical form used for uniqueness checks.
pub fn normalize_address(address: &str) -> String {
    address.trim().to_ascii_lowercase()
}

/// Check an address against the format of `chain`. Checksums are not verified.
pub fn is_valid_address(chain: Chain, address: &str) -> bool {
    let address = address.trim();
    match chain {
        Chain::Evm => address
            .strip_prefix("0x")
            .or_else(|| address.strip_prefix("0X"))
            .is_some_and(|digits| digits.len() == 40 && hex::decode(digits).is_ok()),
        Chain::Bitcoin => is_valid_bitcoin_address(address),
    }
}

fn is_valid_bitcoin_address(address: &str) -> bool {
    let lower = address.to_ascii_lowercase();
    if let Some(data) = lower.strip_prefix("bc1") {
        // bech32 must be single-case
        let single_case = address == lower || address == address.to_ascii_uppercase();
        return single_case
            && (14..=74).contains(&address.len())
            && data.chars().all(|c| BECH32_ALPHABET.contains(c));
    }

    (address.starts_with('1') || address.starts_with('3'))
        && (26..=35).contains(&address.len())
        && address.chars().all(|c| BASE58_ALPHABET.contains(c))
}

/// The set of wallets tracked by one user.
#[derive(Debug, Clone, Default)]
pub struct WalletBook {
    entries: Vec<WalletEntry>,
}

impl WalletBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a new wallet if the address is valid, unseen, and within the tier's quota.
    pub fn add(
        &mut self,
        tier: SubscriptionTier,
        chain: Chain,
        address: &str,
        alias: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<&WalletEntry, WalletError> {
        let address = address.trim();
        if !is_valid_address(chain, address) {
            return Err(WalletError::InvalidAddress {
                chain,
                address: address.to_string(),
            });
        }

        if self.position(address).is_some() {
            return Err(WalletError::Duplicate(address.to_string()));
        }

        let decision = check_access(tier, Feature::Wallets, self.entries.len() as u64);
        if !decision.allowed {
            return Err(WalletError::LimitReached {
                tier,
                limit: decision.limit,
            });
        }

        self.entries.push(WalletEntry {
            chain,
            address: address.to_string(),
            alias: alias.filter(|a| !a.trim().is_empty()),
            created_at: now,
            balances: Vec::new(),
        });

        tracing::info!(%chain, address, count = self.entries.len(), "Wallet added");
        Ok(&self.entries[self.entries.len() - 1])
    }

    /// Stop tracking a wallet. Returns the removed entry, if any.
    pub fn remove(&mut self, address: &str) -> Option<WalletEntry> {
        let idx = self.position(address)?;
        Some(self.entries.remove(idx))
    }

    pub fn get(&self, address: &str) -> Option<&WalletEntry> {
        self.position(address).map(|idx| &self.entries[idx])
    }

    /// Replace the derived balances of a tracked wallet.
    pub fn set_balances(&mut self, address: &str, balances: Vec<TokenBalance>) -> bool {
        match self.position(address) {
            Some(idx) => {
                self.entries[idx].balances = balances;
                true
            }
            None => false,
        }
    }

    pub fn entries(&self) -> &[WalletEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn position(&self, address: &str) -> Option<usize> {
        let key = normalize_address(address);
        self.entries
            .iter()
            .position(|e| normalize_address(&e.address) == key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EVM: &str = "0x742d35Cc6634C0532925a3b844Bc454e4438f44e";
    const EVM_2: &str = "0x00000000219ab540356cBB839Cbe05303d7705Fa";

    #[test]
    fn test_evm_address_format() {
        assert!(is_valid_address(Chain::Evm, EVM));
        assert!(is_valid_address(Chain::Evm, &EVM.to_lowercase()));
        assert!(!is_valid_address(Chain::Evm, "742d35Cc6634C0532925a3b844Bc454e4438f44e"));
        assert!(!is_valid_address(Chain::Evm, "0x742d35Cc6634C0532925a3b844Bc454e4438f44"));
        assert!(!is_valid_address(Chain::Evm, "0xZZ2d35Cc6634C0532925a3b844Bc454e4438f44e"));
    }

    #[test]
    fn test_bitcoin_address_format() {
        assert!(is_valid_address(Chain::Bitcoin, "1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa"));
        assert!(is_valid_address(Chain::Bitcoin, "3J98t1WpEZ73CNmQviecrnyiWrnqRhWNLy"));
        assert!(is_valid_address(
            Chain::Bitcoin,
            "bc1qar0srrr7xfkvy5l643lydnw9re59gtzzwf5mdq"
        ));
        assert!(!is_valid_address(
            Chain::Bitcoin,
            "bc1qAr0srrr7xfkvy5l643lydnw9re59gtzzwf5mdq"
        ));
        // 0, O, I and l are not base58
        assert!(!is_valid_address(Chain::Bitcoin, "1A1zP1eP5QGefi2DMPTfTL5SLmv7Div0Na"));
        assert!(!is_valid_address(Chain::Bitcoin, EVM));
    }

    fn track(
        book: &mut WalletBook,
        tier: SubscriptionTier,
        address: &str,
    ) -> Result<(), WalletError> {
        book.add(tier, Chain::Evm, address, None, Utc::now()).map(|_| ())
    }

    #[test]
    fn test_duplicate_is_case_insensitive() {
        let mut book = WalletBook::new();
        track(&mut book, SubscriptionTier::Pro, EVM).unwrap();
        let shouted = EVM.to_uppercase().replace("0X", "0x");
        let err = track(&mut book, SubscriptionTier::Pro, &shouted).unwrap_err();
        assert!(matches!(err, WalletError::Duplicate(_)));
        assert_eq!(book.len(), 1);
    }

    #[test]
    fn test_free_tier_allows_one_wallet() {
        let mut book = WalletBook::new();
        track(&mut book, SubscriptionTier::Free, EVM).unwrap();
        let err = track(&mut book, SubscriptionTier::Free, EVM_2).unwrap_err();
        assert_eq!(
            err,
            WalletError::LimitReached {
                tier: SubscriptionTier::Free,
                limit: Quota::Limited(1),
            }
        );
    }

    #[test]
    fn test_remove_frees_quota() {
        let mut book = WalletBook::new();
        track(&mut book, SubscriptionTier::Free, EVM).unwrap();
        assert!(book.remove(&EVM.to_lowercase()).is_some());
        assert!(book.is_empty());
        track(&mut book, SubscriptionTier::Free, EVM_2).unwrap();
        assert!(book.get(EVM_2).is_some());
    }

    #[test]
    fn test_invalid_address_rejected_before_quota() {
        let mut book = WalletBook::new();
        let err = track(&mut book, SubscriptionTier::Free, "not-an-address").unwrap_err();
        assert!(matches!(err, WalletError::InvalidAddress { .. }));
    }

    #[test]
    fn test_set_balances_and_blank_alias() {
        let mut book = WalletBook::new();
        let entry = book
            .add(SubscriptionTier::Basic, Chain::Evm, EVM, Some("  ".into()), Utc::now())
            .unwrap();
        assert_eq!(entry.alias, None);

        let balances = vec![TokenBalance::new("ETH".into(), None, 1.0, Some(2000.0))];
        assert!(book.set_balances(EVM, balances));
        assert_eq!(book.get(EVM).unwrap().balances.len(), 1);
        assert!(!book.set_balances(EVM_2, Vec::new()));
    }
}

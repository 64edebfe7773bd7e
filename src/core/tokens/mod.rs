//! Token registry
//!
//! Mutable catalog of the tokens a processor instance will transfer. Every
//! payment resolves its token here first; a token that is not registered
//! cannot be sent.

use log::{debug, info};
use solana_sdk::pubkey::Pubkey;
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::RwLock;

use crate::shared::constants;
use crate::shared::error::PaymentError;
use crate::shared::types::{TokenDescriptor, TokenInfo};

/// Thread-safe token catalog keyed by symbol.
pub struct TokenRegistry {
    tokens: RwLock<HashMap<String, TokenInfo>>,
}

impl TokenRegistry {
    /// An empty registry. Nothing is transferable until tokens are added.
    pub fn new() -> Self {
        Self {
            tokens: RwLock::new(HashMap::new()),
        }
    }

    /// A registry pre-seeded with the native coin.
    pub fn with_defaults() -> Self {
        let registry = Self::new();
        {
            let mut tokens = registry.tokens.write().unwrap_or_else(|e| e.into_inner());
            let native = TokenInfo::native();
            tokens.insert(native.symbol.clone(), native);
        }
        registry
    }

    /// Register a token, replacing any previous entry under the same symbol.
    ///
    /// Unspecified fields receive defaults: the symbol doubles as the name,
    /// decimals fall back to 9, and the transfer cap to 1000. A non-native
    /// token must carry a mint address and a native one must not.
    pub fn add(&self, descriptor: TokenDescriptor) -> Result<TokenInfo, PaymentError> {
        if descriptor.symbol.trim().is_empty() {
            return Err(PaymentError::invalid_token("Symbol must not be empty"));
        }
        let mint_address = match (&descriptor.mint_address, descriptor.is_native) {
            (Some(_), true) => {
                return Err(PaymentError::invalid_token(
                    "A native token must not carry a mint address",
                ));
            }
            (None, false) => {
                return Err(PaymentError::invalid_token(format!(
                    "Token {} requires a mint address",
                    descriptor.symbol
                )));
            }
            (Some(mint), false) => Some(Pubkey::from_str(mint).map_err(|_| {
                PaymentError::invalid_token(format!("Invalid mint address: {}", mint))
            })?),
            (None, true) => None,
        };

        let info = TokenInfo {
            symbol: descriptor.symbol.clone(),
            name: descriptor.name.unwrap_or_else(|| descriptor.symbol.clone()),
            mint_address,
            decimals: descriptor.decimals.unwrap_or(constants::DEFAULT_TOKEN_DECIMALS),
            max_transfer_amount: descriptor
                .max_transfer_amount
                .unwrap_or(constants::DEFAULT_MAX_TRANSFER),
            logo_url: descriptor.logo_url,
            is_native: descriptor.is_native,
        };

        let mut tokens = self.tokens.write().unwrap_or_else(|e| e.into_inner());
        let replaced = tokens.insert(info.symbol.clone(), info.clone()).is_some();
        if replaced {
            info!("Replaced registry entry for token {}", info.symbol);
        } else {
            debug!("Registered token {}", info.symbol);
        }
        Ok(info)
    }

    /// Look a token up by symbol, then by exact mint address string.
    pub fn get(&self, identifier: &str) -> Option<TokenInfo> {
        let tokens = self.tokens.read().unwrap_or_else(|e| e.into_inner());
        if let Some(info) = tokens.get(identifier) {
            return Some(info.clone());
        }
        tokens
            .values()
            .find(|info| {
                info.mint_address
                    .map(|mint| mint.to_string() == identifier)
                    .unwrap_or(false)
            })
            .cloned()
    }

    /// Remove a token by symbol. Returns whether an entry was removed.
    pub fn remove(&self, symbol: &str) -> bool {
        let mut tokens = self.tokens.write().unwrap_or_else(|e| e.into_inner());
        tokens.remove(symbol).is_some()
    }

    /// Snapshot of every registered token.
    pub fn list(&self) -> Vec<TokenInfo> {
        let tokens = self.tokens.read().unwrap_or_else(|e| e.into_inner());
        tokens.values().cloned().collect()
    }
}

impl Default for TokenRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(symbol: &str, mint: Option<&str>) -> TokenDescriptor {
        TokenDescriptor {
            symbol: symbol.to_string(),
            mint_address: mint.map(|m| m.to_string()),
            ..TokenDescriptor::default()
        }
    }

    #[test]
    fn test_defaults_seed_native_coin() {
        let registry = TokenRegistry::with_defaults();
        let sol = registry.get("SOL").unwrap();
        assert!(sol.is_native);
        assert_eq!(sol.decimals, 9);
        assert_eq!(sol.max_transfer_amount, 100.0);
        // Repeated lookups return equal values absent a mutation
        assert_eq!(registry.get("SOL").unwrap(), sol);
    }

    #[test]
    fn test_empty_registry_has_no_native_entry() {
        let registry = TokenRegistry::new();
        assert!(registry.get("SOL").is_none());
        assert!(registry.list().is_empty());
    }

    #[test]
    fn test_add_fills_defaults() {
        let registry = TokenRegistry::new();
        let mint = Pubkey::new_unique().to_string();
        let info = registry.add(descriptor("USDX", Some(&mint))).unwrap();
        assert_eq!(info.name, "USDX");
        assert_eq!(info.decimals, 9);
        assert_eq!(info.max_transfer_amount, 1000.0);
        assert!(!info.is_native);
    }

    #[test]
    fn test_add_rejects_bad_descriptors() {
        let registry = TokenRegistry::new();

        let err = registry.add(descriptor("", None)).unwrap_err();
        assert!(matches!(err, PaymentError::InvalidToken(_)));

        // SPL token without a mint
        let err = registry.add(descriptor("USDX", None)).unwrap_err();
        assert!(matches!(err, PaymentError::InvalidToken(_)));

        // Native token with a mint
        let mint = Pubkey::new_unique().to_string();
        let mut native = descriptor("SOL", Some(&mint));
        native.is_native = true;
        assert!(registry.add(native).is_err());

        let err = registry.add(descriptor("BAD", Some("not-a-mint"))).unwrap_err();
        assert!(matches!(err, PaymentError::InvalidToken(_)));
    }

    #[test]
    fn test_get_by_mint_address() {
        let registry = TokenRegistry::new();
        let mint = Pubkey::new_unique();
        registry
            .add(descriptor("USDX", Some(&mint.to_string())))
            .unwrap();

        let by_mint = registry.get(&mint.to_string()).unwrap();
        assert_eq!(by_mint.symbol, "USDX");
    }

    #[test]
    fn test_add_replaces_existing_symbol() {
        let registry = TokenRegistry::new();
        let mint = Pubkey::new_unique().to_string();
        registry.add(descriptor("USDX", Some(&mint))).unwrap();

        let mut updated = descriptor("USDX", Some(&mint));
        updated.decimals = Some(6);
        registry.add(updated).unwrap();

        assert_eq!(registry.get("USDX").unwrap().decimals, 6);
        assert_eq!(registry.list().len(), 1);
    }

    #[test]
    fn test_remove() {
        let registry = TokenRegistry::with_defaults();
        assert!(registry.remove("SOL"));
        assert!(!registry.remove("SOL"));
        assert!(registry.get("SOL").is_none());
    }
}

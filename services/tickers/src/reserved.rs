//! Symbols which can never be claimed.

use std::collections::BTreeSet;

/// Platform-wide reserved tickers: chain and currency names, NFT and DeFi
/// jargon, and deployment lifecycle words.
const RESERVED: &[&str] = &[
    "SOL", "BTC", "ETH", "USDC", "USDT", "LOS", "LOL", "404", "NFT", "DAO", "DEFI", "WEB3", "GAME",
    "ART", "META", "AI", "VR", "AR", "PFP", "AVATAR", "COLLECTIBLE", "TRADING", "CARD", "TOKEN",
    "COIN", "CRYPTO", "BLOCKCHAIN", "SMART", "CONTRACT", "DAPP", "PLATFORM", "MARKETPLACE",
    "AUCTION", "BID", "SELL", "BUY", "TRADE", "SWAP", "BRIDGE", "STAKING", "YIELD", "FARMING",
    "LIQUIDITY", "POOL", "VAULT", "STRATEGY", "PROTOCOL", "GOVERNANCE", "VOTE", "PROPOSAL",
    "TREASURY", "FUND", "GRANT", "BOUNTY", "REWARD", "INCENTIVE", "BONUS", "AIRDROP", "CLAIM",
    "VERIFY", "KYC", "AML", "COMPLIANCE", "SECURITY", "AUDIT", "TEST", "DEMO", "BETA", "ALPHA",
    "MAINNET", "TESTNET", "DEV", "STAGING", "PRODUCTION", "LIVE", "OFFLINE", "MAINTENANCE",
    "UPGRADE", "MIGRATION", "DEPRECATED", "LEGACY", "OLD", "NEW",
];

/// Immutable set of reserved symbols, held in normalized (uppercase) form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservedWords {
    words: BTreeSet<String>,
}

impl Default for ReservedWords {
    fn default() -> Self {
        Self::new()
    }
}

impl ReservedWords {
    /// The built-in platform list.
    pub fn new() -> Self {
        Self::with_extra(std::iter::empty::<&str>())
    }

    /// The built-in list plus `extra` words.
    pub fn with_extra<I, S>(extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words = RESERVED
            .iter()
            .map(|word| word.to_string())
            .chain(
                extra
                    .into_iter()
                    .map(|word| crate::record::normalize(word.as_ref())),
            )
            .filter(|word| !word.is_empty())
            .collect::<BTreeSet<_>>();

        tracing::debug!(count = words.len(), "Loaded reserved tickers");
        Self { words }
    }

    /// Whether `symbol` may never be registered. `symbol` must already be normalized.
    pub fn is_reserved(&self, symbol: &str) -> bool {
        self.words.contains(symbol)
    }

    /// Number of reserved words.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

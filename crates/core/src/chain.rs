//! Chains the bridge agents can act on, plus the Wormhole chain-id table
//! used when rendering explorer data.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A chain the agents may transfer, wrap or stake on.
///
/// Parsing is case-sensitive: `"ethereum"` is rejected so the model is asked
/// to correct itself instead of the executor guessing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Chain {
    Ethereum,
    Solana,
}

impl Chain {
    pub const ALL: [Chain; 2] = [Chain::Ethereum, Chain::Solana];

    pub fn as_str(self) -> &'static str {
        match self {
            Chain::Ethereum => "Ethereum",
            Chain::Solana => "Solana",
        }
    }

    /// Wormhole chain id.
    pub fn wormhole_id(self) -> u16 {
        match self {
            Chain::Ethereum => 2,
            Chain::Solana => 1,
        }
    }

    /// Address of the wrapped native token (WETH / wSOL).
    pub fn native_token_address(self) -> &'static str {
        match self {
            Chain::Ethereum => "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2",
            Chain::Solana => "So11111111111111111111111111111111111111112",
        }
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownChain(pub String);

impl fmt::Display for UnknownChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unsupported chain '{}' (expected Ethereum or Solana)", self.0)
    }
}

impl std::error::Error for UnknownChain {}

impl FromStr for Chain {
    type Err = UnknownChain;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Ethereum" => Ok(Chain::Ethereum),
            "Solana" => Ok(Chain::Solana),
            other => Err(UnknownChain(other.to_string())),
        }
    }
}

const WORMHOLE_CHAINS: &[(&str, u16)] = &[
    ("Solana", 1),
    ("Ethereum", 2),
    ("Terra", 3),
    ("BNB Smart Chain", 4),
    ("Polygon", 5),
    ("Avalanche", 6),
    ("Oasis", 7),
    ("Algorand", 8),
    ("Fantom", 10),
    ("Karura", 11),
    ("Acala", 12),
    ("Kaia", 13),
    ("Celo", 14),
    ("NEAR", 15),
    ("Moonbeam", 16),
    ("Neon", 17),
    ("Terra 2.0", 18),
    ("Injective", 19),
    ("Osmosis", 20),
    ("Sui", 21),
    ("Aptos", 22),
    ("Arbitrum", 23),
    ("Optimism", 24),
    ("Gnosis", 25),
    ("Pythnet", 26),
    ("XPLA", 28),
    ("Base", 30),
    ("Sei", 32),
    ("Scroll", 34),
    ("Mantle", 35),
    ("Blast", 36),
    ("X Layer", 37),
    ("Linea", 38),
    ("Berachain", 39),
    ("Seievm", 40),
    ("SNAXchain", 43),
    ("Unichain", 44),
    ("World Chain", 45),
    ("Ink", 46),
    ("HyperEVM", 47),
    ("Monad", 48),
    ("Mezo", 50),
    ("Cosmos Hub", 4000),
    ("Evmos", 4001),
    ("Kujira", 4002),
    ("Neutron", 4003),
    ("Celestia", 4004),
    ("Stargaze", 4005),
    ("SEDA", 4006),
    ("Dymension", 4007),
    ("Provenance", 4008),
    ("Noble", 4009),
];

/// Human name for a Wormhole chain id, if known.
pub fn wormhole_chain_name(id: u16) -> Option<&'static str> {
    WORMHOLE_CHAINS
        .iter()
        .find(|(_, chain_id)| *chain_id == id)
        .map(|(name, _)| *name)
}

/// Wormhole chain id for a human name (exact match).
pub fn wormhole_chain_id(name: &str) -> Option<u16> {
    WORMHOLE_CHAINS
        .iter()
        .find(|(chain_name, _)| *chain_name == name)
        .map(|(_, id)| *id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_is_case_sensitive() {
        assert_eq!("Ethereum".parse::<Chain>(), Ok(Chain::Ethereum));
        assert_eq!("Solana".parse::<Chain>(), Ok(Chain::Solana));
        assert!("ethereum".parse::<Chain>().is_err());
        assert!("Mars".parse::<Chain>().is_err());
    }

    #[test]
    fn chain_ids_match_table() {
        for chain in Chain::ALL {
            assert_eq!(wormhole_chain_id(chain.as_str()), Some(chain.wormhole_id()));
        }
    }

    #[test]
    fn unknown_ids_have_no_name() {
        assert_eq!(wormhole_chain_name(30), Some("Base"));
        assert_eq!(wormhole_chain_name(4009), Some("Noble"));
        assert_eq!(wormhole_chain_name(9999), None);
    }
}

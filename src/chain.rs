use alloy::primitives::{Address, FixedBytes};
use log::*;
use once_cell::sync::Lazy;
use std::collections::HashMap;

use crate::macros::parse_address;

#[derive(Debug, Clone)]
pub struct ChainData {
    pub id: u64,
    pub name: &'static str,
    pub deposit_contract: Address,
    pub genesis_fork_version: FixedBytes<4>,
}

/// Known networks, anything else is treated as a devnet and
/// skips the network consistency checks
pub static CHAINDATA: Lazy<HashMap<u64, ChainData>> = Lazy::new(|| {
    let mut m = HashMap::new();
    m.insert(1, CHAIN_ETH_MAINNET.clone());
    m.insert(17000, CHAIN_ETH_HOLESKY.clone());
    m.insert(560048, CHAIN_ETH_HOODI.clone());
    m
});

pub fn chain_data(chain_id: u64) -> Option<&'static ChainData> {
    let chain = CHAINDATA.get(&chain_id);
    trace!("chain {chain_id}: {:?}", chain);
    chain
}

static CHAIN_ETH_MAINNET: Lazy<ChainData> = Lazy::new(|| ChainData {
    id: 1,
    name: "mainnet",
    deposit_contract: parse_address!("0x00000000219ab540356cBB839Cbe05303d7705Fa"),
    genesis_fork_version: FixedBytes([0x00, 0x00, 0x00, 0x00]),
});

static CHAIN_ETH_HOLESKY: Lazy<ChainData> = Lazy::new(|| ChainData {
    id: 17000,
    name: "holesky",
    deposit_contract: parse_address!("0x4242424242424242424242424242424242424242"),
    genesis_fork_version: FixedBytes([0x01, 0x01, 0x70, 0x00]),
});

static CHAIN_ETH_HOODI: Lazy<ChainData> = Lazy::new(|| ChainData {
    id: 560048,
    name: "hoodi",
    deposit_contract: parse_address!("0x00000000219ab540356cBB839Cbe05303d7705Fa"),
    genesis_fork_version: FixedBytes([0x10, 0x00, 0x09, 0x10]),
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_known_and_unknown() {
        let holesky = chain_data(17000).unwrap();
        assert_eq!(holesky.name, "holesky");
        assert_eq!(
            holesky.deposit_contract,
            parse_address!("0x4242424242424242424242424242424242424242")
        );
        assert!(chain_data(31337).is_none());
    }
}

//! SSZ containers of the phase0 deposit flow.
//!
//! https://github.com/ethereum/consensus-specs/blob/dev/specs/phase0/beacon-chain.md#depositmessage

use alloy::primitives::{B256, FixedBytes};
use blst::{
    BLST_ERROR,
    min_pk::{PublicKey, Signature},
};
use tree_hash::TreeHash;

/// `DOMAIN_DEPOSIT` domain type
pub const DOMAIN_DEPOSIT: [u8; 4] = [0x03, 0x00, 0x00, 0x00];

/// Ciphersuite used for proof of possession signatures
pub const BLS_DST: &[u8] = b"BLS_SIG_BLS12381G2_XMD:SHA-256_SSWU_RO_POP_";

#[derive(Debug, tree_hash_derive::TreeHash)]
pub struct DepositMessage {
    /// Validator public key
    pub pubkey: FixedBytes<48>,
    /// Withdrawal credentials
    pub withdrawal_credentials: B256,
    /// Amount of ether deposited in gwei
    pub amount: u64,
}

#[derive(Debug, tree_hash_derive::TreeHash)]
pub struct DepositData {
    /// Validator public key
    pub pubkey: FixedBytes<48>,
    /// Withdrawal credentials
    pub withdrawal_credentials: B256,
    /// Amount of ether deposited in gwei
    pub amount: u64,
    /// Deposit signature
    pub signature: FixedBytes<96>,
}

#[derive(Debug, tree_hash_derive::TreeHash)]
struct ForkData {
    current_version: FixedBytes<4>,
    genesis_validators_root: B256,
}

#[derive(Debug, tree_hash_derive::TreeHash)]
struct SigningData {
    object_root: B256,
    domain: B256,
}

/// `DOMAIN_DEPOSIT` over the genesis fork version and a zero validators root
pub fn compute_deposit_domain(fork_version: FixedBytes<4>) -> B256 {
    let fork_data_root = ForkData {
        current_version: fork_version,
        genesis_validators_root: B256::ZERO,
    }
    .tree_hash_root();
    let mut domain = [0u8; 32];
    domain[..4].copy_from_slice(&DOMAIN_DEPOSIT);
    domain[4..].copy_from_slice(&fork_data_root[..28]);
    B256::from(domain)
}

pub fn compute_signing_root(object_root: B256, domain: B256) -> B256 {
    SigningData {
        object_root,
        domain,
    }
    .tree_hash_root()
}

/// Returns false for undecodable keys/signatures as well as bad signatures
pub fn verify_signature(
    pubkey: &FixedBytes<48>,
    signature: &FixedBytes<96>,
    signing_root: &B256,
) -> bool {
    let Ok(pubkey) = PublicKey::from_bytes(pubkey.as_slice()) else {
        return false;
    };
    let Ok(signature) = Signature::from_bytes(signature.as_slice()) else {
        return false;
    };
    signature.verify(true, signing_root.as_slice(), BLS_DST, &[], &pubkey, true)
        == BLST_ERROR::BLST_SUCCESS
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::hex;

    #[test]
    fn deposit_domain_layout() {
        let domain = compute_deposit_domain(FixedBytes([0x01, 0x01, 0x70, 0x00]));
        assert_eq!(&domain[..4], &DOMAIN_DEPOSIT);
        let other = compute_deposit_domain(FixedBytes([0x00, 0x00, 0x00, 0x00]));
        assert_eq!(&other[..4], &DOMAIN_DEPOSIT);
        assert_ne!(domain, other, "fork version must change the domain");
    }

    #[test]
    fn mainnet_deposit_domain() {
        // compute_domain(DOMAIN_DEPOSIT, GENESIS_FORK_VERSION=0x00000000)
        assert_eq!(
            hex::encode(compute_deposit_domain(FixedBytes([0u8; 4]))),
            "03000000f5a5fd42d16a20302798ef6ed309979b43003d2320d9f0e8ea9831a9"
        );
    }

    #[test]
    fn sign_and_verify() {
        let sk = blst::min_pk::SecretKey::key_gen(&[42u8; 32], &[]).unwrap();
        let pubkey = FixedBytes::<48>::from(sk.sk_to_pk().compress());
        let root = compute_signing_root(B256::repeat_byte(0x11), B256::repeat_byte(0x22));
        let signature = FixedBytes::<96>::from(sk.sign(root.as_slice(), BLS_DST, &[]).compress());

        assert!(verify_signature(&pubkey, &signature, &root));
        assert!(!verify_signature(
            &pubkey,
            &signature,
            &B256::repeat_byte(0x33)
        ));
        assert!(!verify_signature(
            &FixedBytes::<48>::repeat_byte(0xff),
            &signature,
            &root
        ));
    }
}

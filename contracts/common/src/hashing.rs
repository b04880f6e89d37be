use soroban_sdk::{xdr::ToXdr, Bytes, BytesN, Env, String};

use crate::types::CallBundle;

pub fn description_hash(env: &Env, description: &String) -> BytesN<32> {
    env.crypto().sha256(&description.clone().to_xdr(env)).to_bytes()
}

/// Canonical identity of a governance action: SHA-256 over the XDR encoding
/// of the bundle followed by the description hash.
pub fn proposal_hash(env: &Env, bundle: &CallBundle, description_hash: &BytesN<32>) -> BytesN<32> {
    let mut preimage = bundle.clone().to_xdr(env);
    preimage.append(&Bytes::from(description_hash.clone()));
    env.crypto().sha256(&preimage).to_bytes()
}

/// Storage key for a module name.
pub fn module_key(env: &Env, name: &String) -> BytesN<32> {
    env.crypto().sha256(&name.clone().to_xdr(env)).to_bytes()
}

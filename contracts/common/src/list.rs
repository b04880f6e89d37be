//! Append-only lists kept as one persistent entry per element plus a length
//! entry. Appending touches two small entries however long the list is, and
//! readers page through it.

use soroban_sdk::{Env, IntoVal, TryFromVal, Val, Vec};

use crate::ttl::bump_persistent;

/// Upper bound on the number of elements a single page read returns.
pub const MAX_PAGE: u32 = 100;

pub fn list_len<K>(env: &Env, len_key: &K) -> u32
where
    K: IntoVal<Env, Val>,
{
    env.storage().persistent().get(len_key).unwrap_or(0)
}

/// Stores `value` at the next position and returns that position.
pub fn list_push<K, I, V>(env: &Env, len_key: &K, item_key: impl Fn(u32) -> I, value: &V) -> u32
where
    K: IntoVal<Env, Val>,
    I: IntoVal<Env, Val>,
    V: IntoVal<Env, Val>,
{
    let position = list_len(env, len_key);
    let key = item_key(position);
    env.storage().persistent().set(&key, value);
    bump_persistent(env, &key);
    env.storage().persistent().set(len_key, &(position + 1));
    bump_persistent(env, len_key);
    position
}

/// Reads up to `limit` elements (capped at [`MAX_PAGE`]) starting at `start`.
pub fn list_page<K, I, V>(
    env: &Env,
    len_key: &K,
    item_key: impl Fn(u32) -> I,
    start: u32,
    limit: u32,
) -> Vec<V>
where
    K: IntoVal<Env, Val>,
    I: IntoVal<Env, Val>,
    V: IntoVal<Env, Val> + TryFromVal<Env, Val>,
{
    let end = start
        .saturating_add(limit.min(MAX_PAGE))
        .min(list_len(env, len_key));
    let mut page = Vec::new(env);
    for position in start..end {
        if let Some(value) = env.storage().persistent().get::<I, V>(&item_key(position)) {
            page.push_back(value);
        }
    }
    page
}

use soroban_sdk::{Env, IntoVal, Val};

pub const DAY_IN_LEDGERS: u32 = 17_280;

pub const INSTANCE_BUMP_LEDGERS: u32 = 7 * DAY_IN_LEDGERS;
pub const INSTANCE_THRESHOLD_LEDGERS: u32 = INSTANCE_BUMP_LEDGERS - DAY_IN_LEDGERS;

pub const PERSISTENT_BUMP_LEDGERS: u32 = 30 * DAY_IN_LEDGERS;
pub const PERSISTENT_THRESHOLD_LEDGERS: u32 = PERSISTENT_BUMP_LEDGERS - DAY_IN_LEDGERS;

pub fn bump_instance(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(INSTANCE_THRESHOLD_LEDGERS, INSTANCE_BUMP_LEDGERS);
}

pub fn bump_persistent<K>(env: &Env, key: &K)
where
    K: IntoVal<Env, Val>,
{
    env.storage()
        .persistent()
        .extend_ttl(key, PERSISTENT_THRESHOLD_LEDGERS, PERSISTENT_BUMP_LEDGERS);
}

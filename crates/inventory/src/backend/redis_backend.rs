use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{cmd, Client, Script};
use std::time::Duration;

use super::InventoryBackend;
use crate::fingerprint::{Fingerprint, FINGERPRINT_HEX_LEN};
use crate::InventoryError;

const DEDUP_KEY: &str = "unique_jokes_hashes";
const POOL_KEY: &str = "random_jokes";
const LEASE_KEY: &str = "is_fetching_jokes";

// Pool members are `<64 hex fingerprint><canonical json>` so the take script
// can drop the dedup entry without hashing inside Redis.
const INSERT_SCRIPT: &str = r#"
if redis.call('SADD', KEYS[1], ARGV[1]) == 0 then
  return 0
end
redis.call('ZADD', KEYS[2], ARGV[3], ARGV[2])
return 1
"#;

const TAKE_SCRIPT: &str = r#"
local member = redis.call('ZRANDMEMBER', KEYS[2])
if not member then
  return false
end
redis.call('ZREM', KEYS[2], member)
redis.call('SREM', KEYS[1], string.sub(member, 1, tonumber(ARGV[1])))
return member
"#;

/// Key names used by [`RedisBackend`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedisKeys {
    pub dedup: String,
    pub pool: String,
    pub lease: String,
}

impl RedisKeys {
    pub fn new(namespace: Option<&str>) -> Self {
        let key = |base: &str| match namespace {
            Some(ns) if !ns.is_empty() => format!("{ns}:{base}"),
            _ => base.to_string(),
        };
        Self {
            dedup: key(DEDUP_KEY),
            pool: key(POOL_KEY),
            lease: key(LEASE_KEY),
        }
    }
}

impl Default for RedisKeys {
    fn default() -> Self {
        Self::new(None)
    }
}

/// Redis-backed inventory shared by any number of server processes.
///
/// Dedup index is a SET, the servable pool a ZSET scored with a uniform
/// random `f64`, the fetch lease a string set with `NX PX`.
pub struct RedisBackend {
    conn: ConnectionManager,
    keys: RedisKeys,
    insert_script: Script,
    take_script: Script,
}

impl RedisBackend {
    pub async fn connect(url: &str, keys: RedisKeys) -> Result<Self, InventoryError> {
        let client = Client::open(url)?;
        let conn = ConnectionManager::new(client).await?;
        tracing::info!(dedup = %keys.dedup, pool = %keys.pool, "connected to redis inventory");
        Ok(Self {
            conn,
            keys,
            insert_script: Script::new(INSERT_SCRIPT),
            take_script: Script::new(TAKE_SCRIPT),
        })
    }
}

fn split_member(member: &str) -> Result<&str, InventoryError> {
    if member.len() < FINGERPRINT_HEX_LEN || !member.is_char_boundary(FINGERPRINT_HEX_LEN) {
        return Err(InventoryError::Corrupt(format!(
            "pool member shorter than fingerprint prefix ({} bytes)",
            member.len()
        )));
    }
    Ok(&member[FINGERPRINT_HEX_LEN..])
}

#[async_trait]
impl InventoryBackend for RedisBackend {
    async fn insert(
        &self,
        fingerprint: &Fingerprint,
        canonical: &str,
    ) -> Result<bool, InventoryError> {
        let mut conn = self.conn.clone();
        let fp_hex = fingerprint.to_hex();
        let member = format!("{fp_hex}{canonical}");
        let score = fastrand::f64();
        let added: i64 = self
            .insert_script
            .key(&self.keys.dedup)
            .key(&self.keys.pool)
            .arg(&fp_hex)
            .arg(&member)
            .arg(score)
            .invoke_async(&mut conn)
            .await?;
        Ok(added == 1)
    }

    async fn take_random(&self) -> Result<Option<String>, InventoryError> {
        let mut conn = self.conn.clone();
        let member: Option<String> = self
            .take_script
            .key(&self.keys.dedup)
            .key(&self.keys.pool)
            .arg(FINGERPRINT_HEX_LEN)
            .invoke_async(&mut conn)
            .await?;
        match member {
            Some(member) => Ok(Some(split_member(&member)?.to_string())),
            None => Ok(None),
        }
    }

    async fn count(&self) -> Result<usize, InventoryError> {
        let mut conn = self.conn.clone();
        let count: usize = cmd("ZCARD")
            .arg(&self.keys.pool)
            .query_async(&mut conn)
            .await?;
        Ok(count)
    }

    async fn dedup_len(&self) -> Result<usize, InventoryError> {
        let mut conn = self.conn.clone();
        let count: usize = cmd("SCARD")
            .arg(&self.keys.dedup)
            .query_async(&mut conn)
            .await?;
        Ok(count)
    }

    async fn try_acquire_lease(&self, ttl: Duration) -> Result<bool, InventoryError> {
        let mut conn = self.conn.clone();
        let ttl_ms = ttl.as_millis().clamp(1, u64::MAX as u128) as u64;
        let reply: Option<String> = cmd("SET")
            .arg(&self.keys.lease)
            .arg("true")
            .arg("NX")
            .arg("PX")
            .arg(ttl_ms)
            .query_async(&mut conn)
            .await?;
        Ok(reply.is_some())
    }

    async fn release_lease(&self) -> Result<(), InventoryError> {
        let mut conn = self.conn.clone();
        let _: i64 = cmd("DEL")
            .arg(&self.keys.lease)
            .query_async(&mut conn)
            .await?;
        Ok(())
    }

    async fn lease_held(&self) -> Result<bool, InventoryError> {
        let mut conn = self.conn.clone();
        let exists: bool = cmd("EXISTS")
            .arg(&self.keys.lease)
            .query_async(&mut conn)
            .await?;
        Ok(exists)
    }

    fn name(&self) -> &'static str {
        "redis"
    }
}

use std::{sync::Arc, time::Duration};

use chrono::Utc;
use deadpool_redis::{Config as RedisConfig, Pool, Runtime};
use derive_more::Display;
use redis::{AsyncCommands, Script};
use uuid::Uuid;

use super::rate_limiter::RateDecision;

// Prune, count and record in one round trip; Redis runs scripts atomically.
const SLIDING_WINDOW_SCRIPT: &str = r#"
local key = KEYS[1]
local now = tonumber(ARGV[1])
local window = tonumber(ARGV[2])
local limit = tonumber(ARGV[3])
redis.call('ZREMRANGEBYSCORE', key, 0, now - window)
local used = redis.call('ZCARD', key)
if used < limit then
  redis.call('ZADD', key, now, ARGV[4])
  redis.call('PEXPIRE', key, window)
  return {1, limit - used - 1}
end
return {0, 0}
"#;

#[derive(Debug, Display)]
pub enum LimiterStoreError {
    #[display("Redis connection failed: {_0}")]
    Connection(String),

    #[display("Redis operation failed: {_0}")]
    Operation(String),
}

impl From<redis::RedisError> for LimiterStoreError {
    fn from(err: redis::RedisError) -> Self {
        LimiterStoreError::Operation(err.to_string())
    }
}

/// Sliding-window counters kept in a Redis sorted set per client.
#[derive(Clone)]
pub struct RedisWindowStore {
    pool: Pool,
    limit: u32,
    window_size: Duration,
    script: Arc<Script>,
}

impl RedisWindowStore {
    pub fn connect(url: &str, limit: u32, window_size: Duration) -> Result<Self, LimiterStoreError> {
        let pool = RedisConfig::from_url(url)
            .create_pool(Some(Runtime::Tokio1))
            .map_err(|e| LimiterStoreError::Connection(e.to_string()))?;

        Ok(Self {
            pool,
            limit,
            window_size,
            script: Arc::new(Script::new(SLIDING_WINDOW_SCRIPT)),
        })
    }

    pub async fn check(&self, key: &str) -> Result<RateDecision, LimiterStoreError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| LimiterStoreError::Connection(e.to_string()))?;

        let now_ms = Utc::now().timestamp_millis();
        let window_ms = self.window_size.as_millis() as i64;
        let member = format!("{}-{}", now_ms, Uuid::new_v4());

        let result: Vec<i64> = self
            .script
            .key(key)
            .arg(now_ms)
            .arg(window_ms)
            .arg(self.limit)
            .arg(member)
            .invoke_async(&mut conn)
            .await?;

        match result.as_slice() {
            [1, remaining] => Ok(RateDecision::allow((*remaining).max(0) as u32)),
            [0, _] => Ok(RateDecision::deny(self.window_size.as_secs().max(1))),
            other => Err(LimiterStoreError::Operation(format!(
                "unexpected script reply: {:?}",
                other
            ))),
        }
    }

    pub async fn ping(&self) -> Result<(), LimiterStoreError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| LimiterStoreError::Connection(e.to_string()))?;
        let pong: String = conn.ping().await?;
        if pong == "PONG" {
            Ok(())
        } else {
            Err(LimiterStoreError::Operation(format!("unexpected PING reply: {pong}")))
        }
    }
}

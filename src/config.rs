use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use crate::error::AppError;
use crate::remote::RestConfig;

const DEFAULT_BIND: &str = "127.0.0.1:3000";
const DEFAULT_POLL_SECS: u64 = 30;

#[derive(Clone, Debug)]
pub enum Backend {
    Rest(RestConfig),
    Memory,
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub backend: Backend,
    pub user_id: String,
    pub access_token: String,
    pub bind: SocketAddr,
    /// `None` disables the interval feed.
    pub poll_interval: Option<Duration>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.is_empty())
                .ok_or_else(|| AppError::Config(format!("{} is not set", key)))
        };

        let backend = match lookup("TASKDASH_BACKEND").as_deref().unwrap_or("rest") {
            "rest" => Backend::Rest(RestConfig::new(
                required("TASKDASH_BACKEND_URL")?,
                required("TASKDASH_API_KEY")?,
            )),
            "memory" => Backend::Memory,
            other => {
                return Err(AppError::Config(format!("unknown TASKDASH_BACKEND: {}", other)));
            }
        };

        let user_id = required("TASKDASH_USER_ID")?;
        let access_token = lookup("TASKDASH_ACCESS_TOKEN").unwrap_or_default();

        let bind = lookup("TASKDASH_BIND")
            .unwrap_or_else(|| DEFAULT_BIND.to_string())
            .parse::<SocketAddr>()
            .map_err(|e| AppError::Config(format!("invalid TASKDASH_BIND: {}", e)))?;

        let poll_secs = match lookup("TASKDASH_POLL_SECS") {
            Some(raw) => raw
                .parse::<u64>()
                .map_err(|e| AppError::Config(format!("invalid TASKDASH_POLL_SECS: {}", e)))?,
            None => DEFAULT_POLL_SECS,
        };
        let poll_interval = (poll_secs > 0).then(|| Duration::from_secs(poll_secs));

        Ok(Self {
            backend,
            user_id,
            access_token,
            bind,
            poll_interval,
        })
    }
}

use crate::permissions::AccessPolicy;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::net::SocketAddr;
use std::path::PathBuf;

pub const DEFAULT_BIND: &str = "0.0.0.0:3000";
pub const DEFAULT_DATABASE: &str = "office-api.db";

// Server configuration sourced from environment variables, optionally
// overridden by a YAML file named in OFFICE_API_CONFIG.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub database_path: PathBuf,
    pub policy: AccessPolicy,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ServerConfigOverride {
    bind_addr: Option<String>,
    database_path: Option<PathBuf>,
    allowed_offices: Option<Vec<i64>>,
    allowed_programs: Option<Vec<i64>>,
    approver_program: Option<i64>,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        let bind_addr = std::env::var("OFFICE_API_BIND")
            .unwrap_or_else(|_| DEFAULT_BIND.to_string())
            .parse()
            .with_context(|| "parse OFFICE_API_BIND")?;
        let database_path = std::env::var("OFFICE_API_DB")
            .unwrap_or_else(|_| DEFAULT_DATABASE.to_string())
            .into();
        Ok(Self {
            bind_addr,
            database_path,
            policy: AccessPolicy::default(),
        })
    }

    pub fn from_env_or_yaml() -> Result<Self> {
        let mut config = Self::from_env()?;
        if let Ok(path) = std::env::var("OFFICE_API_CONFIG") {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("read OFFICE_API_CONFIG: {path}"))?;
            config.apply_yaml(&contents)?;
        }
        Ok(config)
    }

    pub fn apply_yaml(&mut self, contents: &str) -> Result<()> {
        let override_cfg: ServerConfigOverride =
            serde_yaml::from_str(contents).with_context(|| "parse server config yaml")?;
        if let Some(value) = override_cfg.bind_addr {
            self.bind_addr = value.parse().with_context(|| "parse bind_addr")?;
        }
        if let Some(value) = override_cfg.database_path {
            self.database_path = value;
        }
        if let Some(value) = override_cfg.allowed_offices {
            self.policy.allowed_offices = value;
        }
        if let Some(value) = override_cfg.allowed_programs {
            self.policy.allowed_programs = value;
        }
        if let Some(value) = override_cfg.approver_program {
            self.policy.approver_program = value;
        }
        Ok(())
    }
}

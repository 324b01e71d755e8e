use std::net::IpAddr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Address to bind.
    #[serde(default = "default_host")]
    pub host: IpAddr,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Prefix stripped from request paths before permission matching, and
    /// under which the API routes are mounted.
    #[serde(default = "default_base_path")]
    pub base_path: String,

    /// Maximum accepted request body, in bytes.
    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,
}

fn default_host() -> IpAddr {
    IpAddr::from([127, 0, 0, 1])
}

fn default_port() -> u16 {
    8080
}

fn default_base_path() -> String {
    "/api/v1".to_string()
}

fn default_body_limit() -> usize {
    1024 * 1024
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            base_path: default_base_path(),
            body_limit_bytes: default_body_limit(),
        }
    }
}

impl ServerConfig {
    pub fn validate(&self) -> Result<(), String> {
        if !self.base_path.is_empty() && !self.base_path.starts_with('/') {
            return Err(format!(
                "server.base_path must be empty or start with '/', got '{}'",
                self.base_path
            ));
        }
        if self.base_path.len() > 1 && self.base_path.ends_with('/') {
            return Err("server.base_path must not end with '/'".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert!(ServerConfig::default().validate().is_ok());
    }

    #[test]
    fn trailing_slash_rejected() {
        let config = ServerConfig {
            base_path: "/api/".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn empty_base_path_allowed() {
        let config = ServerConfig {
            base_path: String::new(),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }
}

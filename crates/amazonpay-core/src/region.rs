//! # Region and Environment
//!
//! Where requests go. Both are fixed when the client is constructed.

use crate::error::AmazonPayError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Amazon Pay marketplace region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    /// North America (`na`, `us`)
    Na,
    /// Europe and UK (`eu`, `de`, `uk`)
    Eu,
    /// Japan (`jp`, `fe`)
    Jp,
}

impl Region {
    /// Region code sent in the `x-amz-pay-region` header
    pub fn as_str(&self) -> &'static str {
        match self {
            Region::Na => "na",
            Region::Eu => "eu",
            Region::Jp => "jp",
        }
    }

    /// API host for this region
    pub fn api_host(&self) -> &'static str {
        match self {
            Region::Na => "pay-api.amazon.com",
            Region::Eu => "pay-api.amazon.eu",
            Region::Jp => "pay-api.amazon.jp",
        }
    }
}

impl FromStr for Region {
    type Err = AmazonPayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "na" | "us" => Ok(Region::Na),
            "eu" | "de" | "uk" => Ok(Region::Eu),
            "jp" | "fe" => Ok(Region::Jp),
            other => Err(AmazonPayError::Configuration(format!(
                "unknown region code: {other:?} (expected na, us, eu, de, uk, jp or fe)"
            ))),
        }
    }
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sandbox or live API environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Sandbox,
    Live,
}

impl Environment {
    pub fn from_sandbox_flag(sandbox: bool) -> Self {
        if sandbox {
            Environment::Sandbox
        } else {
            Environment::Live
        }
    }

    /// URL path segment for this environment
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Sandbox => "sandbox",
            Environment::Live => "live",
        }
    }

    pub fn is_sandbox(&self) -> bool {
        matches!(self, Environment::Sandbox)
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_aliases() {
        assert_eq!("us".parse::<Region>().unwrap(), Region::Na);
        assert_eq!("UK".parse::<Region>().unwrap(), Region::Eu);
        assert_eq!("de".parse::<Region>().unwrap(), Region::Eu);
        assert_eq!("jp".parse::<Region>().unwrap(), Region::Jp);
        assert_eq!("fe".parse::<Region>().unwrap(), Region::Jp);
    }

    #[test]
    fn test_unknown_region_is_configuration_error() {
        let err = "mars".parse::<Region>().unwrap_err();
        assert!(matches!(err, AmazonPayError::Configuration(_)));
    }

    #[test]
    fn test_hosts() {
        assert_eq!(Region::Na.api_host(), "pay-api.amazon.com");
        assert_eq!(Region::Eu.api_host(), "pay-api.amazon.eu");
        assert_eq!(Region::Jp.api_host(), "pay-api.amazon.jp");
    }

    #[test]
    fn test_environment_flag() {
        assert_eq!(Environment::from_sandbox_flag(true), Environment::Sandbox);
        assert_eq!(Environment::from_sandbox_flag(false).as_str(), "live");
    }
}

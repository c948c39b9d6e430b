//! API type visibility.
//!
//! Controls which categories of platform API a loader built from the library
//! may see. The configuration carries a comma or space separated list, e.g.
//! `"spec, api, stable"`.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use super::{split_list, ConfigError};

/// A category of API that can be made visible to library consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ApiType {
    /// Standard specification APIs.
    Spec,
    /// Platform-specific public APIs.
    PlatformApi,
    /// General application APIs.
    Api,
    /// APIs marked stable.
    Stable,
    /// Third-party APIs bundled with the platform.
    ThirdParty,
}

impl ApiType {
    /// All API types, in canonical order.
    pub const ALL: [ApiType; 5] = [
        ApiType::Spec,
        ApiType::PlatformApi,
        ApiType::Api,
        ApiType::Stable,
        ApiType::ThirdParty,
    ];

    /// Configuration spelling of this API type.
    pub fn as_str(&self) -> &'static str {
        match self {
            ApiType::Spec => "spec",
            ApiType::PlatformApi => "platform-api",
            ApiType::Api => "api",
            ApiType::Stable => "stable",
            ApiType::ThirdParty => "third-party",
        }
    }
}

impl fmt::Display for ApiType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApiType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        ApiType::ALL
            .into_iter()
            .find(|t| t.as_str() == normalized)
            .ok_or_else(|| ConfigError::UnknownApiType(s.trim().to_string()))
    }
}

/// The set of API types visible to a library's consumers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ApiVisibility(BTreeSet<ApiType>);

impl ApiVisibility {
    /// A visibility set containing exactly the given types.
    pub fn new(types: impl IntoIterator<Item = ApiType>) -> Self {
        Self(types.into_iter().collect())
    }

    /// Parse a comma or space separated list.
    ///
    /// An empty list yields the default visibility.
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let types = split_list(raw)
            .map(ApiType::from_str)
            .collect::<Result<BTreeSet<_>, _>>()?;
        if types.is_empty() {
            return Ok(Self::default());
        }
        Ok(Self(types))
    }

    /// Whether the given API type is visible.
    pub fn contains(&self, api: ApiType) -> bool {
        self.0.contains(&api)
    }

    /// Visible API types in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = ApiType> + '_ {
        self.0.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for ApiVisibility {
    /// Everything except third-party APIs.
    fn default() -> Self {
        Self::new([
            ApiType::Spec,
            ApiType::PlatformApi,
            ApiType::Api,
            ApiType::Stable,
        ])
    }
}

impl fmt::Display for ApiVisibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<_> = self.iter().map(|t| t.as_str()).collect();
        write!(f, "{}", names.join(","))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mixed_separators() {
        let vis = ApiVisibility::parse("spec, third-party stable").unwrap();
        assert_eq!(vis.len(), 3);
        assert!(vis.contains(ApiType::Spec));
        assert!(vis.contains(ApiType::ThirdParty));
        assert!(vis.contains(ApiType::Stable));
        assert!(!vis.contains(ApiType::Api));
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        let vis = ApiVisibility::parse("SPEC,Platform-API").unwrap();
        assert!(vis.contains(ApiType::PlatformApi));
    }

    #[test]
    fn test_parse_empty_is_default() {
        assert_eq!(ApiVisibility::parse("").unwrap(), ApiVisibility::default());
    }

    #[test]
    fn test_parse_unknown_type_fails() {
        let err = ApiVisibility::parse("spec, internal").unwrap_err();
        assert!(matches!(err, ConfigError::UnknownApiType(ref t) if t == "internal"));
    }

    #[test]
    fn test_default_excludes_third_party() {
        let vis = ApiVisibility::default();
        assert!(!vis.contains(ApiType::ThirdParty));
        assert_eq!(vis.to_string(), "spec,platform-api,api,stable");
    }

    #[test]
    fn test_serializes_as_list() {
        let vis = ApiVisibility::new([ApiType::ThirdParty, ApiType::Spec]);
        let json = serde_json::to_string(&vis).unwrap();
        assert_eq!(json, r#"["spec","third-party"]"#);
    }
}

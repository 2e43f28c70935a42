use std::fmt;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RouteSpec {
    pub method: HttpMethod,
    pub path: String,
}

impl RouteSpec {
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Result<Self, ContractError> {
        let path = path.into();
        if !path.starts_with("/api/") {
            return Err(ContractError::InvalidRoutePath(path));
        }
        Ok(Self { method, path })
    }
}

impl fmt::Display for RouteSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.path)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ContractError {
    #[error("route path must start with '/api/' but was '{0}'")]
    InvalidRoutePath(String),

    #[error("duplicate route in contract list: {0}")]
    DuplicateRoute(RouteSpec),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn route_paths_live_under_api_prefix() {
        let spec = RouteSpec::new(HttpMethod::Post, "/api/convert/single").expect("valid route");
        assert_eq!(spec.to_string(), "POST /api/convert/single");
        assert!(matches!(
            RouteSpec::new(HttpMethod::Get, "/health"),
            Err(ContractError::InvalidRoutePath(_))
        ));
    }
}

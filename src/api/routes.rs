use std::collections::BTreeSet;

use crate::contract::{ContractError, HttpMethod, RouteSpec};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteDefinition {
    pub spec: RouteSpec,
    pub handler_id: String,
}

pub fn route_catalog() -> Result<Vec<RouteDefinition>, ContractError> {
    let mut out = Vec::with_capacity(CONTRACT_ROUTES.len());
    let mut seen = BTreeSet::new();

    for (method, path) in CONTRACT_ROUTES {
        let spec = RouteSpec::new(*method, *path)?;
        if !seen.insert(spec.clone()) {
            return Err(ContractError::DuplicateRoute(spec));
        }

        out.push(RouteDefinition {
            handler_id: handler_id_for(spec.method, spec.path.as_str()),
            spec,
        });
    }

    Ok(out)
}

fn handler_id_for(method: HttpMethod, path: &str) -> String {
    let mut tokens = vec![method.as_str().to_ascii_lowercase()];
    tokens.extend(
        path.trim_matches('/')
            .split('/')
            .filter(|part| !part.is_empty() && *part != "api")
            .map(|part| part.replace('-', "_")),
    );
    tokens.join("_")
}

pub const CONTRACT_ROUTES: &[(HttpMethod, &str)] = &[
    (HttpMethod::Get, "/api/health"),
    (HttpMethod::Get, "/api/config"),
    (HttpMethod::Post, "/api/config"),
    (HttpMethod::Post, "/api/config/validate"),
    (HttpMethod::Post, "/api/convert/single"),
    (HttpMethod::Post, "/api/convert/batch"),
];

//! Path routing
//!
//! Requests are matched against an ordered prefix table. A more specific
//! prefix always precedes its parent (`/api/domains/allow/exact` before
//! `/api/domains/allow` before `/api/domains`); otherwise an exact or regex
//! sub-list would be captured by its broader scope.
//!
//! Whatever follows the matched prefix is the item argument:
//!
//! | Path                                  | Variant               | Argument        |
//! |---------------------------------------|-----------------------|-----------------|
//! | `/api/domains/deny/exact`             | DomainList(Deny,Exact) | none           |
//! | `/api/domains/deny/exact/ads.example` | DomainList(Deny,Exact) | `ads.example`  |
//! | `/api/groups/my%20group`              | Groups                | `my group`      |

use std::borrow::Cow;
use thiserror::Error;

use crate::variant::{Kind, ListVariant, Scope};

/// One entry of the routing table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    pub prefix: &'static str,
    pub variant: ListVariant,
}

/// Routing table, most specific prefixes first
pub const ROUTES: &[Route] = &[
    Route {
        prefix: "/api/groups",
        variant: ListVariant::Groups,
    },
    Route {
        prefix: "/api/adlists",
        variant: ListVariant::Adlists,
    },
    Route {
        prefix: "/api/clients",
        variant: ListVariant::Clients,
    },
    Route {
        prefix: "/api/domains/allow/exact",
        variant: ListVariant::domains(Scope::Allow, Kind::Exact),
    },
    Route {
        prefix: "/api/domains/allow/regex",
        variant: ListVariant::domains(Scope::Allow, Kind::Regex),
    },
    Route {
        prefix: "/api/domains/allow",
        variant: ListVariant::domains(Scope::Allow, Kind::Any),
    },
    Route {
        prefix: "/api/domains/deny/exact",
        variant: ListVariant::domains(Scope::Deny, Kind::Exact),
    },
    Route {
        prefix: "/api/domains/deny/regex",
        variant: ListVariant::domains(Scope::Deny, Kind::Regex),
    },
    Route {
        prefix: "/api/domains/deny",
        variant: ListVariant::domains(Scope::Deny, Kind::Any),
    },
    Route {
        prefix: "/api/domains/exact",
        variant: ListVariant::domains(Scope::Any, Kind::Exact),
    },
    Route {
        prefix: "/api/domains/regex",
        variant: ListVariant::domains(Scope::Any, Kind::Regex),
    },
    Route {
        prefix: "/api/domains",
        variant: ListVariant::domains(Scope::Any, Kind::Any),
    },
];

/// A successfully routed path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub variant: ListVariant,
    /// Single-item identity; `None` addresses the whole collection
    pub argument: Option<String>,
    /// Static property of the variant
    pub mutable: bool,
}

/// Routing failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
    #[error("no list matches the path")]
    NoMatch,

    #[error("item argument is not valid percent-encoded UTF-8")]
    BadArgument,
}

/// Resolve a request path to a list and an optional argument
///
/// Any query string is ignored.
pub fn resolve(path: &str) -> Result<Resolved, RouteError> {
    let path = path.split_once('?').map_or(path, |(path, _query)| path);

    for route in ROUTES {
        let Some(rest) = path.strip_prefix(route.prefix) else {
            continue;
        };

        let argument = match rest {
            "" | "/" => None,
            _ => match rest.strip_prefix('/') {
                Some(raw) => Some(decode_argument(raw)?),
                // `/api/domains/allowance.com` is an argument of `/api/domains`
                None => continue,
            },
        };

        return Ok(Resolved {
            variant: route.variant,
            argument,
            mutable: route.variant.is_mutable(),
        });
    }

    Err(RouteError::NoMatch)
}

fn decode_argument(raw: &str) -> Result<String, RouteError> {
    urlencoding::decode(raw)
        .map(Cow::into_owned)
        .map_err(|_| RouteError::BadArgument)
}

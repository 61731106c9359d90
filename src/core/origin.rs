use std::collections::HashSet;
use thiserror::Error;
use url::Url;

/// A configured allowed origin that is not a `scheme://host[:port]` URL
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid allowed origin {0:?}: expected scheme://host[:port]")]
pub struct InvalidOrigin(pub String);

/// Origins allowed to call the public endpoints
///
/// Entries are normalised to `scheme://host[:port]` once, at construction.
/// An empty list allows every request.
#[derive(Debug, Clone, Default)]
pub struct AllowedOrigins {
    origins: HashSet<String>,
}

impl AllowedOrigins {
    /// Fails on the first entry that does not parse, so a mistyped list
    /// never degrades into the allow-all empty list.
    pub fn new<S: AsRef<str>>(configured: &[S]) -> Result<Self, InvalidOrigin> {
        let origins = configured
            .iter()
            .map(|raw| {
                normalize_origin(raw.as_ref()).ok_or_else(|| InvalidOrigin(raw.as_ref().to_string()))
            })
            .collect::<Result<HashSet<_>, _>>()?;

        Ok(Self { origins })
    }

    pub fn is_empty(&self) -> bool {
        self.origins.is_empty()
    }

    /// Normalised origins, for building the CORS policy
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.origins.iter().map(String::as_str)
    }

    /// Check the `Origin` header, falling back to `Referer` when it is absent
    pub fn permits(&self, origin: Option<&str>, referer: Option<&str>) -> bool {
        if self.origins.is_empty() {
            return true;
        }

        let candidate = match origin {
            Some(origin) => normalize_origin(origin),
            None => referer.and_then(normalize_origin),
        };

        candidate.is_some_and(|c| self.origins.contains(&c))
    }
}

/// Reduce a URL to its serialised origin; opaque origins (e.g. "null") yield None
pub fn normalize_origin(raw: &str) -> Option<String> {
    let url = Url::parse(raw.trim()).ok()?;
    let origin = url.origin();

    if origin.is_tuple() {
        Some(origin.ascii_serialization())
    } else {
        None
    }
}

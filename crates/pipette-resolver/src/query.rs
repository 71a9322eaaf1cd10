//! Units of resolution work.

use pipette_core::condition::{format_conditions, parse_conditions, Condition};

/// A request to install one package.
///
/// `package_name` still carries any `[extra,...]` suffix until the extras
/// are split off.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub package_name: String,
    pub conditions: Vec<Condition>,
    /// Introduced by another package rather than asked for by the user.
    pub is_dependency: bool,
}

impl Request {
    /// Build from a specifier such as `requests[socks]>=2.0`.
    pub fn parse(spec: &str, is_dependency: bool) -> Self {
        let (package_name, conditions) = parse_conditions(spec);
        Self {
            package_name,
            conditions,
            is_dependency,
        }
    }

    /// `name<conditions>` for messages.
    pub fn describe(&self) -> String {
        format!("{}{}", self.package_name, format_conditions(&self.conditions))
    }
}

/// An entry of the install queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    /// Install the package.
    Direct(Request),
    /// Install `base`; once it is present, expand the extras of `deferred`.
    AwaitingBase { base: Request, deferred: Request },
}

impl Query {
    pub fn request(&self) -> &Request {
        match self {
            Query::Direct(request) => request,
            Query::AwaitingBase { base, .. } => base,
        }
    }

    pub fn into_parts(self) -> (Request, Option<Request>) {
        match self {
            Query::Direct(request) => (request, None),
            Query::AwaitingBase { base, deferred } => (base, Some(deferred)),
        }
    }
}

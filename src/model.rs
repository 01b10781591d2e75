use serde::{Serialize, Serializer};
use std::fmt;

pub const CONTROLLER_SUFFIX: &str = "Controller";
pub const NAMESPACE_SEPARATOR: &str = "::";
pub const WILDCARD_ACTION: &str = "*";

/// Namespace-qualified controller, e.g. `Admin::Test::PostsController`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ControllerId {
    pub namespaces: Vec<String>,
    pub name: String,
}

impl ControllerId {
    pub fn new(namespaces: Vec<String>, name: impl Into<String>) -> Self {
        Self {
            namespaces,
            name: name.into(),
        }
    }
}

impl fmt::Display for ControllerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for namespace in &self.namespaces {
            write!(f, "{namespace}{NAMESPACE_SEPARATOR}")?;
        }
        write!(f, "{}{CONTROLLER_SUFFIX}", self.name)
    }
}

impl Serialize for ControllerId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ActionId {
    Named(String),
    /// The path carries a dynamic `:action` segment.
    Wildcard,
}

impl ActionId {
    pub fn named(name: impl Into<String>) -> Self {
        ActionId::Named(name.into())
    }

    pub fn is_wildcard(&self) -> bool {
        matches!(self, ActionId::Wildcard)
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionId::Named(name) => f.write_str(name),
            ActionId::Wildcard => f.write_str(WILDCARD_ACTION),
        }
    }
}

impl Serialize for ActionId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Route {
    pub controller: ControllerId,
    pub action: ActionId,
}

impl Route {
    pub fn new(controller: ControllerId, action: ActionId) -> Self {
        Self { controller, action }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.controller, self.action)
    }
}

#[derive(Debug, Serialize, Clone)]
pub struct RouteRecord {
    pub route: String,
    pub controller: ControllerId,
    pub action: ActionId,
}

impl From<&Route> for RouteRecord {
    fn from(route: &Route) -> Self {
        RouteRecord {
            route: route.to_string(),
            controller: route.controller.clone(),
            action: route.action.clone(),
        }
    }
}

#[derive(Debug, Serialize, Clone, Default)]
pub struct RunStats {
    pub scanned: usize,
    pub prepared: usize,
    pub errors: usize,
    pub routes: usize,
    pub duration_ms: u64,
}

#[derive(Debug, Serialize)]
pub struct RouteTable {
    pub routes: Vec<RouteRecord>,
    pub digest: String,
    pub stats: RunStats,
}

#[derive(Debug, Serialize, Clone)]
pub struct RouteFile {
    pub path: String,
    pub hash: String,
    pub size: i64,
}

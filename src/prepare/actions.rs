use crate::prepare::node::{Options, Value};

pub const RESOURCES_ACTIONS: &[&str] = &["index", "show", "new", "create", "edit", "update", "destroy"];
pub const RESOURCE_ACTIONS: &[&str] = &["show", "new", "create", "edit", "update", "destroy"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    /// `resources :posts`
    Plural,
    /// `resource :profile`
    Singular,
}

impl ResourceKind {
    pub fn from_call_name(name: &str) -> Option<Self> {
        match name {
            "resources" => Some(ResourceKind::Plural),
            "resource" => Some(ResourceKind::Singular),
            _ => None,
        }
    }

    pub fn standard_actions(self) -> &'static [&'static str] {
        match self {
            ResourceKind::Plural => RESOURCES_ACTIONS,
            ResourceKind::Singular => RESOURCE_ACTIONS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionFilter {
    All,
    Nothing,
    Only(Vec<String>),
    Except(Vec<String>),
}

impl ActionFilter {
    /// `:only` wins when both options are present.
    pub fn from_options(options: &Options) -> Self {
        if let Some(only) = options.get("only") {
            return match sentinel(only) {
                Some(Sentinel::All) => ActionFilter::All,
                Some(Sentinel::None) => ActionFilter::Nothing,
                None => ActionFilter::Only(only.names()),
            };
        }
        if let Some(except) = options.get("except") {
            return match sentinel(except) {
                Some(Sentinel::All) => ActionFilter::Nothing,
                Some(Sentinel::None) => ActionFilter::All,
                None => ActionFilter::Except(except.names()),
            };
        }
        ActionFilter::All
    }
}

enum Sentinel {
    All,
    None,
}

fn sentinel(value: &Value) -> Option<Sentinel> {
    match value.as_name()? {
        "all" => Some(Sentinel::All),
        "none" => Some(Sentinel::None),
        _ => None,
    }
}

/// Member and collection actions; hash (`{ :list => :get }`) and array
/// (`[:list]`) spellings normalize to the same ordered names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extensions {
    pub member: Vec<String>,
    pub collection: Vec<String>,
}

impl Extensions {
    pub fn from_options(options: &Options) -> Self {
        Self {
            member: options.get("member").map(Value::names).unwrap_or_default(),
            collection: options
                .get("collection")
                .map(Value::names)
                .unwrap_or_default(),
        }
    }
}

pub fn synthesize(kind: ResourceKind, filter: &ActionFilter, extensions: &Extensions) -> Vec<String> {
    let standard = kind.standard_actions();
    let mut actions: Vec<String> = match filter {
        ActionFilter::All => standard.iter().map(|a| a.to_string()).collect(),
        ActionFilter::Nothing => Vec::new(),
        ActionFilter::Only(subset) => standard
            .iter()
            .filter(|action| subset.iter().any(|name| name == *action))
            .map(|a| a.to_string())
            .collect(),
        ActionFilter::Except(subset) => standard
            .iter()
            .filter(|action| !subset.iter().any(|name| name == *action))
            .map(|a| a.to_string())
            .collect(),
    };
    actions.extend(extensions.member.iter().cloned());
    actions.extend(extensions.collection.iter().cloned());
    actions
}

pub fn synthesize_from_options(kind: ResourceKind, options: &Options) -> Vec<String> {
    synthesize(
        kind,
        &ActionFilter::from_options(options),
        &Extensions::from_options(options),
    )
}

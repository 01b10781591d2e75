use crate::model::ControllerId;
use crate::prepare::actions::ResourceKind;
use crate::prepare::node::{Options, Value};
use crate::prepare::scope::ScopeStack;
use heck::ToUpperCamelCase;

const IRREGULAR_PLURALS: &[(&str, &str)] = &[
    ("person", "people"),
    ("man", "men"),
    ("woman", "women"),
    ("child", "children"),
    ("mouse", "mice"),
    ("ox", "oxen"),
];

// singular words ending in `s`; any other trailing `s` is taken as plural
const ES_AFTER_S: &[&str] = &["status", "alias", "bus", "virus", "campus"];

const UNCOUNTABLE: &[&str] = &[
    "equipment",
    "information",
    "rice",
    "money",
    "species",
    "series",
    "fish",
    "sheep",
    "jeans",
    "police",
];

/// `high_voltage/pages` -> `["HighVoltage", "Pages"]`.
pub fn camelize_path(path: &str) -> Vec<String> {
    path.split('/')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| part.to_upper_camel_case())
        .collect()
}

/// Rails-style pluralization of the last word of a snake_case name, enough
/// for controller naming of singular resources.
pub fn pluralize(word: &str) -> String {
    let (head, last) = match word.rfind('_') {
        Some(index) => word.split_at(index + 1),
        None => ("", word),
    };
    let lower = last.to_ascii_lowercase();
    if lower.is_empty() || UNCOUNTABLE.contains(&lower.as_str()) {
        return word.to_string();
    }
    if let Some((_, plural)) = IRREGULAR_PLURALS.iter().find(|(single, _)| *single == lower) {
        return format!("{head}{plural}");
    }
    let plural = if lower.ends_with('s') {
        if lower.ends_with("ss") || ES_AFTER_S.iter().any(|suffix| lower.ends_with(suffix)) {
            format!("{last}es")
        } else {
            last.to_string()
        }
    } else if lower.ends_with('x')
        || lower.ends_with('z')
        || lower.ends_with("ch")
        || lower.ends_with("sh")
    {
        format!("{last}es")
    } else if lower.ends_with('y') && !ends_with_vowel_y(&lower) {
        format!("{}ies", &last[..last.len() - 1])
    } else {
        format!("{last}s")
    };
    format!("{head}{plural}")
}

fn ends_with_vowel_y(word: &str) -> bool {
    let mut chars = word.chars().rev();
    chars.next();
    matches!(chars.next(), Some('a' | 'e' | 'i' | 'o' | 'u'))
}

/// The unqualified controller path a resource declaration maps to.
pub fn resource_stem(name: &str, kind: ResourceKind, options: &Options) -> String {
    if let Some(controller) = options.get("controller").and_then(Value::as_name) {
        return controller.to_string();
    }
    match kind {
        ResourceKind::Plural => name.to_string(),
        ResourceKind::Singular => pluralize(name),
    }
}

pub fn module_option(options: &Options) -> Option<&str> {
    options.get("module").and_then(Value::as_name)
}

/// Qualifies a controller path (`posts`, `admin/posts`) with the active scope
/// prefix and the call's own `:module`.
pub fn resolve_controller(
    stem: &str,
    module: Option<&str>,
    scopes: &ScopeStack,
) -> Option<ControllerId> {
    let stem = stem.trim().trim_start_matches('/');
    if !is_controller_path(stem) {
        return None;
    }
    let mut parts = camelize_path(stem);
    let name = parts.pop()?;
    let mut namespaces = scopes.controller_prefix();
    if let Some(module) = module {
        namespaces.extend(camelize_path(module));
    }
    namespaces.extend(parts);
    Some(ControllerId::new(namespaces, name))
}

fn is_controller_path(stem: &str) -> bool {
    !stem.is_empty()
        && stem
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '/')
}

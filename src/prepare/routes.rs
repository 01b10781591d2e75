//! Route-DSL recognizer: walks the lowered call tree depth-first and appends
//! the routes each declaration would generate.
//!
//! Shapes are decided purely by syntax (call name, receiver, argument shape,
//! enclosing block); nothing looks at previously emitted routes. Unknown or
//! malformed shapes never fail the walk, they just emit nothing.

use crate::config::Config;
use crate::model::{ActionId, ControllerId, Route};
use crate::prepare::actions::{self, ResourceKind};
use crate::prepare::controller::{module_option, resolve_controller, resource_stem};
use crate::prepare::node::{Block, Call, Options, Receiver, Value};
use crate::prepare::scope::{Frame, ScopeStack};
use crate::registry::RouteRegistry;
use std::collections::HashMap;
use tracing::{debug, trace, warn};

const DEFAULT_ROUTE_SEGMENTS: &[&str] = &[":controller", ":action", ":id", ":format"];

#[derive(Debug, Clone, Copy)]
enum Context<'c> {
    Top,
    /// Directly inside a `resources`/`resource` block.
    Resource(&'c ControllerId),
    /// Inside `member do` / `collection do` of a resource.
    Extension(&'c ControllerId),
}

impl<'c> Context<'c> {
    fn controller(self) -> Option<&'c ControllerId> {
        match self {
            Context::Top => None,
            Context::Resource(controller) | Context::Extension(controller) => Some(controller),
        }
    }
}

pub struct RouteRecognizer<'r> {
    registry: &'r mut RouteRegistry,
    scopes: ScopeStack,
    /// Block parameters yielded by enclosing routing blocks (`map`, `admin`).
    receivers: Vec<String>,
    /// `concern :name do ... end` bodies, replayed where a resource uses them.
    concerns: HashMap<String, Block>,
    max_nesting: usize,
    depth: usize,
    emitted: usize,
}

impl<'r> RouteRecognizer<'r> {
    pub fn new(registry: &'r mut RouteRegistry) -> Self {
        Self {
            registry,
            scopes: ScopeStack::new(),
            receivers: Vec::new(),
            concerns: HashMap::new(),
            max_nesting: Config::get().max_nesting,
            depth: 0,
            emitted: 0,
        }
    }

    pub fn with_max_nesting(mut self, max_nesting: usize) -> Self {
        self.max_nesting = max_nesting;
        self
    }

    /// Walks one file's top-level calls; returns the number of routes
    /// appended.
    pub fn recognize(&mut self, calls: &[Call]) -> usize {
        self.scopes.clear();
        self.receivers.clear();
        self.concerns.clear();
        self.depth = 0;
        let before = self.emitted;
        for call in calls {
            self.visit(call, Context::Top);
        }
        self.emitted - before
    }

    fn visit(&mut self, call: &Call, ctx: Context<'_>) {
        if !self.is_routing_receiver(call) {
            // `Foo::Application.routes.draw do |map|` and friends
            self.visit_block(call, ctx);
            return;
        }
        if let Some(kind) = ResourceKind::from_call_name(&call.name) {
            self.visit_resource(call, kind);
            return;
        }
        match call.name.as_str() {
            "namespace" => self.visit_namespace(call),
            "scope" => self.visit_scope(call),
            "with_options" => self.visit_with_options(call, ctx),
            "member" | "collection" => self.visit_extension(call, ctx),
            "concern" => self.define_concern(call),
            "concerns" => self.visit_concerns(call, ctx),
            "get" | "post" | "put" | "patch" | "delete" | "match" | "connect" | "root" => {
                self.visit_verb(call, ctx)
            }
            _ => self.visit_other(call, ctx),
        }
    }

    fn is_routing_receiver(&self, call: &Call) -> bool {
        match &call.receiver {
            None => true,
            Some(Receiver::Local(name)) => self.receivers.iter().any(|r| r == name),
            Some(Receiver::Expr(_)) => false,
        }
    }

    fn visit_block(&mut self, call: &Call, ctx: Context<'_>) {
        if let Some(block) = &call.block {
            self.walk_block(block, call.line, ctx);
        }
    }

    fn walk_block(&mut self, block: &Block, line: usize, ctx: Context<'_>) {
        if self.depth >= self.max_nesting {
            warn!(
                line,
                max_nesting = self.max_nesting,
                "routing block nested too deeply, skipping"
            );
            return;
        }
        self.depth += 1;
        if let Some(param) = &block.param {
            self.receivers.push(param.clone());
        }
        for child in &block.body {
            self.visit(child, ctx);
        }
        if block.param.is_some() {
            self.receivers.pop();
        }
        self.depth -= 1;
    }

    fn visit_resource(&mut self, call: &Call, kind: ResourceKind) {
        let options = self.scopes.merge(&call.options);
        let names: Vec<&str> = call.args.iter().filter_map(Value::as_name).collect();
        if names.is_empty() {
            trace!(line = call.line, "resource declaration without names");
            return;
        }
        let actions = actions::synthesize_from_options(kind, &options);
        let module = module_option(&options);
        for name in names {
            let stem = resource_stem(name, kind, &options);
            let Some(controller) = resolve_controller(&stem, module, &self.scopes) else {
                debug!(line = call.line, name, "unresolvable resource controller");
                continue;
            };
            debug!(
                line = call.line,
                controller = %controller,
                actions = actions.len(),
                "resource routes"
            );
            for action in &actions {
                self.emit(&controller, ActionId::named(action.as_str()));
            }
            if let Some(concerns) = options.get("concerns") {
                for concern in concerns.names() {
                    self.apply_concern(&concern, call.line, &controller);
                }
            }
            self.visit_block(call, Context::Resource(&controller));
        }
    }

    fn visit_namespace(&mut self, call: &Call) {
        let Some(name) = call.first_arg().and_then(Value::as_name) else {
            trace!(line = call.line, "namespace without a name");
            return;
        };
        let segment = module_option(&call.options).unwrap_or(name);
        self.scopes.push(Frame::namespace(segment));
        self.visit_block(call, Context::Top);
        self.scopes.pop();
    }

    fn visit_scope(&mut self, call: &Call) {
        let module = module_option(&call.options);
        let controller = call.options.get("controller").cloned();
        self.scopes.push(Frame::scope(module, controller));
        self.visit_block(call, Context::Top);
        self.scopes.pop();
    }

    fn visit_with_options(&mut self, call: &Call, ctx: Context<'_>) {
        self.scopes.push(Frame::with_options(call.options.clone()));
        self.visit_block(call, ctx);
        self.scopes.pop();
    }

    fn visit_extension(&mut self, call: &Call, ctx: Context<'_>) {
        match ctx.controller() {
            Some(controller) => self.visit_block(call, Context::Extension(controller)),
            None => {
                trace!(line = call.line, name = %call.name, "member/collection outside a resource");
                self.visit_block(call, ctx);
            }
        }
    }

    /// Definitions emit nothing by themselves.
    fn define_concern(&mut self, call: &Call) {
        let (Some(name), Some(block)) = (call.first_arg().and_then(Value::as_name), &call.block)
        else {
            trace!(line = call.line, "concern without a name or block");
            return;
        };
        self.concerns.insert(name.to_string(), block.clone());
    }

    /// `concerns :commentable` inside a resource block.
    fn visit_concerns(&mut self, call: &Call, ctx: Context<'_>) {
        let Some(controller) = ctx.controller() else {
            trace!(line = call.line, "concerns outside a resource");
            return;
        };
        for name in call.args.iter().flat_map(Value::names) {
            self.apply_concern(&name, call.line, controller);
        }
    }

    fn apply_concern(&mut self, name: &str, line: usize, controller: &ControllerId) {
        let Some(block) = self.concerns.get(name).cloned() else {
            debug!(line, concern = name, "unknown concern");
            return;
        };
        self.walk_block(&block, line, Context::Resource(controller));
    }

    fn visit_other(&mut self, call: &Call, ctx: Context<'_>) {
        let named_route = matches!(call.receiver, Some(Receiver::Local(_)))
            && matches!(call.first_arg(), Some(Value::Str(_)));
        if named_route {
            // map.login '/login', :controller => 'sessions', :action => 'new'
            trace!(line = call.line, label = %call.name, "named route");
            self.visit_verb(call, ctx);
            return;
        }
        if call.block.is_some() {
            self.visit_block(call, ctx);
        } else {
            trace!(line = call.line, name = %call.name, "ignored call");
        }
    }

    fn visit_verb(&mut self, call: &Call, ctx: Context<'_>) {
        let options = self.scopes.merge(&call.options);
        if let Some(controller) = ctx.controller() {
            if call.name != "root" && !has_explicit_target(call, &options) {
                for action in member_action_names(call) {
                    self.emit(controller, ActionId::named(action));
                }
                return;
            }
        }
        match self.direct_route(call, &options) {
            Some(route) => {
                trace!(line = call.line, route = %route, "direct route");
                self.emit_route(route);
            }
            None => debug!(line = call.line, name = %call.name, "mapping produced no route"),
        }
    }

    fn direct_route(&self, call: &Call, options: &Options) -> Option<Route> {
        let redirected = options
            .get("to")
            .is_some_and(|target| target.is_call_named("redirect"))
            || call
                .options
                .path_mappings()
                .any(|(_, target)| target.is_call_named("redirect"));
        if redirected {
            debug!(line = call.line, "redirect");
            return None;
        }

        if let Some((path, target)) = call.options.path_mappings().next() {
            return match target {
                Value::Str(target) => self.route_from_target(target, options),
                Value::Symbol(action) => {
                    self.route_with_controller(options, Some(action.as_str()), Some(path))
                }
                _ => None,
            };
        }

        let path = call.first_arg().and_then(Value::as_str);
        if let Some(target) = options.get("to") {
            return match target {
                Value::Str(target) => self.route_from_target(target, options),
                Value::Symbol(action) => {
                    self.route_with_controller(options, Some(action.as_str()), path)
                }
                _ => None,
            };
        }
        if call.name == "root" {
            if let Some(target) = path.filter(|path| path.contains('#')) {
                return self.route_from_target(target, options);
            }
        }
        if options.contains("controller") || self.scopes.default_controller().is_some() {
            let action = options.get("action").and_then(Value::as_name);
            return self.route_with_controller(options, action, path);
        }
        path.and_then(|path| self.route_from_path(path, options))
    }

    /// `controller#action`; an empty side means the mapping is malformed.
    fn route_from_target(&self, target: &str, options: &Options) -> Option<Route> {
        let (controller, action) = target.split_once('#')?;
        let (controller, action) = (controller.trim(), action.trim());
        if controller.is_empty() || action.is_empty() {
            debug!(target, "malformed controller#action mapping");
            return None;
        }
        let controller = resolve_controller(controller, module_option(options), &self.scopes)?;
        Some(Route::new(controller, ActionId::named(action)))
    }

    fn route_with_controller(
        &self,
        options: &Options,
        action: Option<&str>,
        path: Option<&str>,
    ) -> Option<Route> {
        let stem = options
            .get("controller")
            .or_else(|| self.scopes.default_controller())
            .and_then(Value::as_name)?;
        let controller = resolve_controller(stem, module_option(options), &self.scopes)?;
        let action = match action {
            Some(action) => ActionId::named(action),
            None => action_from_path(path)?,
        };
        Some(Route::new(controller, action))
    }

    /// `get 'posts/show'` style: leading segments name the controller, the
    /// last one the action.
    fn route_from_path(&self, path: &str, options: &Options) -> Option<Route> {
        if is_default_route(path) {
            debug!(path, "default catch-all route");
            return None;
        }
        let segments = static_segments(path)?;
        let (action, controller_parts) = segments.split_last()?;
        if controller_parts.is_empty() {
            return None;
        }
        let controller = resolve_controller(
            &controller_parts.join("/"),
            module_option(options),
            &self.scopes,
        )?;
        Some(Route::new(controller, ActionId::named(*action)))
    }

    fn emit(&mut self, controller: &ControllerId, action: ActionId) {
        self.emit_route(Route::new(controller.clone(), action));
    }

    fn emit_route(&mut self, route: Route) {
        self.registry.append(route);
        self.emitted += 1;
    }
}

/// A verb inside a resource block maps to its own controller only when it
/// names one (`'path' => 'c#a'`, `to:`, `:controller`) or redirects.
fn has_explicit_target(call: &Call, options: &Options) -> bool {
    options.contains("to")
        || options.contains("controller")
        || call
            .options
            .path_mappings()
            .any(|(_, target)| !matches!(target, Value::Symbol(_)))
}

/// Action names a bare verb contributes to its enclosing resource:
/// `post :stop`, `get 'preview'`, `get [:a, :b]`, `get 'x' => :show`.
fn member_action_names(call: &Call) -> Vec<String> {
    let mut names: Vec<String> = match call.first_arg() {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_name)
            .filter_map(action_name_from_path)
            .collect(),
        Some(value) => value
            .as_name()
            .and_then(action_name_from_path)
            .into_iter()
            .collect(),
        None => Vec::new(),
    };
    if names.is_empty() {
        names.extend(
            call.options
                .path_mappings()
                .filter_map(|(_, target)| target.as_symbol())
                .map(|action| action.to_string()),
        );
    }
    names
}

fn action_name_from_path(raw: &str) -> Option<String> {
    let last = raw.trim().trim_matches('/').rsplit('/').next()?;
    let last = last.split(['.', '(']).next().unwrap_or(last);
    if last.is_empty() || is_dynamic_segment(last) {
        None
    } else {
        Some(last.to_string())
    }
}

fn action_from_path(path: Option<&str>) -> Option<ActionId> {
    let Some(path) = path else {
        return Some(ActionId::named("index"));
    };
    if has_action_placeholder(path) {
        return Some(ActionId::Wildcard);
    }
    let trimmed = path.trim().trim_matches('/');
    if trimmed.is_empty() {
        return Some(ActionId::named("index"));
    }
    action_name_from_path(trimmed).map(ActionId::Named)
}

/// A whole `:action` segment; `:action_id` and friends do not count.
fn has_action_placeholder(path: &str) -> bool {
    path.split(['/', '(', ')', '.']).any(|segment| segment == ":action")
}

fn is_dynamic_segment(segment: &str) -> bool {
    segment.starts_with(':') || segment.starts_with('*') || segment.contains('(')
}

/// Static path segments with any `(.:format)` suffix removed; `None` when a
/// segment is dynamic.
fn static_segments(path: &str) -> Option<Vec<&str>> {
    let path = path.split('(').next().unwrap_or(path);
    let mut segments = Vec::new();
    for segment in path.split('/').filter(|segment| !segment.is_empty()) {
        if is_dynamic_segment(segment) {
            return None;
        }
        segments.push(segment.split('.').next().unwrap_or(segment));
    }
    Some(segments)
}

/// `:controller(/:action(/:id(.:format)))`, `:controller/:action/:id`, ...
pub fn is_default_route(path: &str) -> bool {
    let flattened: String = path.chars().filter(|ch| *ch != '(' && *ch != ')').collect();
    let segments: Vec<&str> = flattened
        .split(['/', '.'])
        .filter(|segment| !segment.is_empty())
        .collect();
    segments.contains(&":controller")
        && segments
            .iter()
            .all(|segment| DEFAULT_ROUTE_SEGMENTS.contains(segment))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_default_routes() {
        assert!(is_default_route(":controller(/:action(/:id(.:format)))"));
        assert!(is_default_route(":controller/:action/:id"));
        assert!(is_default_route("/:controller/:action/:id.:format"));
        assert!(!is_default_route("internal/:action/*whatever"));
        assert!(!is_default_route("/posts/:id"));
    }

    #[test]
    fn derives_actions_from_paths() {
        assert_eq!(action_from_path(None), Some(ActionId::named("index")));
        assert_eq!(action_from_path(Some("/")), Some(ActionId::named("index")));
        assert_eq!(
            action_from_path(Some("internal/:action/*whatever")),
            Some(ActionId::Wildcard)
        );
        assert_eq!(action_from_path(Some("/about")), Some(ActionId::named("about")));
        assert_eq!(action_from_path(Some("/posts/:id")), None);
    }

    #[test]
    fn only_a_whole_action_segment_is_a_wildcard() {
        assert_eq!(action_from_path(Some("foo/:action_id")), None);
        assert_eq!(action_from_path(Some("foo/:actions")), None);
        assert_eq!(
            action_from_path(Some("foo(/:action(.:format))")),
            Some(ActionId::Wildcard)
        );
        assert_eq!(
            action_from_path(Some("/reports/:action.:format")),
            Some(ActionId::Wildcard)
        );
    }

    #[test]
    fn splits_static_segments() {
        assert_eq!(static_segments("posts/show"), Some(vec!["posts", "show"]));
        assert_eq!(
            static_segments("/admin/posts/list(.:format)"),
            Some(vec!["admin", "posts", "list"])
        );
        assert_eq!(static_segments("/posts/:id"), None);
    }

    #[test]
    fn member_names_from_bare_verbs() {
        let call = Call {
            receiver: None,
            name: "get".into(),
            args: vec![Value::Array(vec![
                Value::Symbol("search".into()),
                Value::Str("/preview".into()),
            ])],
            options: Options::new(),
            block: None,
            line: 1,
        };
        assert_eq!(member_action_names(&call), vec!["search", "preview"]);
    }
}

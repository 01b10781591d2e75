use crate::prepare::controller::camelize_path;
use crate::prepare::node::{Options, Value};

/// One lexical routing frame, live for the duration of its block.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Camelized controller-prefix segments.
    pub segments: Vec<String>,
    /// `scope controller: :users`, consumed by verb routes only.
    pub controller: Option<Value>,
    /// `with_options` defaults, merged into every nested call.
    pub defaults: Options,
}

impl Frame {
    pub fn namespace(name: &str) -> Self {
        Self {
            segments: camelize_path(name),
            controller: None,
            defaults: Options::new(),
        }
    }

    /// A scope adds a prefix segment only when it names a `:module`.
    pub fn scope(module: Option<&str>, controller: Option<Value>) -> Self {
        Self {
            segments: module.map(camelize_path).unwrap_or_default(),
            controller,
            defaults: Options::new(),
        }
    }

    pub fn with_options(defaults: Options) -> Self {
        Self {
            segments: Vec::new(),
            controller: None,
            defaults,
        }
    }
}

#[derive(Debug, Default)]
pub struct ScopeStack {
    frames: Vec<Frame>,
}

impl ScopeStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, frame: Frame) {
        self.frames.push(frame);
    }

    pub fn pop(&mut self) -> Option<Frame> {
        self.frames.pop()
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn clear(&mut self) {
        self.frames.clear();
    }

    pub fn controller_prefix(&self) -> Vec<String> {
        self.frames
            .iter()
            .flat_map(|frame| frame.segments.iter().cloned())
            .collect()
    }

    /// `with_options` defaults visible here, inner frames overriding outer.
    pub fn default_options(&self) -> Options {
        self.frames
            .iter()
            .fold(Options::new(), |acc, frame| frame.defaults.merged_over(&acc))
    }

    /// Innermost `scope controller:` value.
    pub fn default_controller(&self) -> Option<&Value> {
        self.frames
            .iter()
            .rev()
            .find_map(|frame| frame.controller.as_ref())
    }

    /// Call options layered over the inherited defaults.
    pub fn merge(&self, options: &Options) -> Options {
        options.merged_over(&self.default_options())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sym(name: &str) -> Value {
        Value::Symbol(name.to_string())
    }

    #[test]
    fn namespaces_compose_outermost_first() {
        let mut stack = ScopeStack::new();
        stack.push(Frame::namespace("admin"));
        stack.push(Frame::namespace("test"));
        assert_eq!(stack.controller_prefix(), vec!["Admin", "Test"]);
        stack.pop();
        assert_eq!(stack.controller_prefix(), vec!["Admin"]);
        stack.pop();
        assert!(stack.controller_prefix().is_empty());
    }

    #[test]
    fn bare_scope_adds_no_segment() {
        let mut stack = ScopeStack::new();
        stack.push(Frame::scope(None, None));
        assert!(stack.controller_prefix().is_empty());
        stack.push(Frame::scope(Some("admin"), None));
        assert_eq!(stack.controller_prefix(), vec!["Admin"]);
    }

    #[test]
    fn slash_separated_namespace_splits_into_segments() {
        let mut stack = ScopeStack::new();
        stack.push(Frame::namespace("api/v1"));
        assert_eq!(stack.controller_prefix(), vec!["Api", "V1"]);
    }

    #[test]
    fn with_options_defaults_merge_inner_over_outer() {
        let mut outer = Options::new();
        outer.push(sym("controller"), Value::Str("sessions".into()));
        outer.push(sym("action"), Value::Str("new".into()));
        let mut inner = Options::new();
        inner.push(sym("action"), Value::Str("create".into()));
        let mut stack = ScopeStack::new();
        stack.push(Frame::with_options(outer));
        stack.push(Frame::with_options(inner));

        let mut explicit = Options::new();
        explicit.push(sym("only"), Value::Array(vec![sym("index")]));
        let merged = stack.merge(&explicit);
        assert_eq!(merged.get("controller"), Some(&Value::Str("sessions".into())));
        assert_eq!(merged.get("action"), Some(&Value::Str("create".into())));
        assert!(merged.contains("only"));
        assert!(stack.controller_prefix().is_empty());
    }

    #[test]
    fn scope_controller_is_not_a_default_option() {
        let mut stack = ScopeStack::new();
        stack.push(Frame::scope(None, Some(sym("users"))));
        assert!(stack.default_options().is_empty());
        assert_eq!(stack.default_controller(), Some(&sym("users")));
        stack.pop();
        assert!(stack.default_controller().is_none());
    }
}

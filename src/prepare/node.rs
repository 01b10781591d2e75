//! Owned call-tree view over the tree-sitter Ruby syntax tree.
//!
//! Lowering happens once per file. The recognizer only ever sees [`Call`],
//! [`Value`] and [`Options`], never tree-sitter nodes.

use tree_sitter::Node;

#[derive(Debug, Clone, PartialEq)]
pub enum Receiver {
    /// A bare identifier such as the `map` yielded by `draw do |map|`.
    Local(String),
    Expr(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub receiver: Option<Receiver>,
    pub name: String,
    pub args: Vec<Value>,
    pub options: Options,
    pub block: Option<Block>,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub param: Option<String>,
    pub body: Vec<Call>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Symbol(String),
    Str(String),
    /// String literal containing interpolation.
    Dynamic(String),
    Array(Vec<Value>),
    Hash(Options),
    Call(Box<Call>),
    Const(String),
    Regex(String),
    Other(String),
}

/// Order-preserving option mapping; keys are usually symbols but path
/// mappings (`'/posts' => 'posts#index'`) use string keys.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Options(Vec<(Value, Value)>);

impl Call {
    pub fn first_arg(&self) -> Option<&Value> {
        self.args.first()
    }

    pub fn block_param(&self) -> Option<&str> {
        self.block.as_ref().and_then(|block| block.param.as_deref())
    }
}

impl Value {
    /// Symbol or plain string content.
    pub fn as_name(&self) -> Option<&str> {
        match self {
            Value::Symbol(name) | Value::Str(name) => Some(name.as_str()),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(value) => Some(value.as_str()),
            _ => None,
        }
    }

    pub fn as_symbol(&self) -> Option<&str> {
        match self {
            Value::Symbol(value) => Some(value.as_str()),
            _ => None,
        }
    }

    pub fn is_call_named(&self, name: &str) -> bool {
        matches!(self, Value::Call(call) if call.name == name)
    }

    /// Flattens a single name, an array of names or the keys of a hash into
    /// an ordered list.
    pub fn names(&self) -> Vec<String> {
        match self {
            Value::Symbol(name) | Value::Str(name) => vec![name.clone()],
            Value::Array(items) => items
                .iter()
                .filter_map(|item| item.as_name().map(|name| name.to_string()))
                .collect(),
            Value::Hash(options) => options.keys().map(|key| key.to_string()).collect(),
            _ => Vec::new(),
        }
    }
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn push(&mut self, key: Value, value: Value) {
        self.0.push((key, value));
    }

    pub fn iter(&self) -> std::slice::Iter<'_, (Value, Value)> {
        self.0.iter()
    }

    /// Later duplicates win, as in a Ruby hash literal.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0
            .iter()
            .rev()
            .find(|(key, _)| key.as_name() == Some(name))
            .map(|(_, value)| value)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().filter_map(|(key, _)| key.as_name())
    }

    /// Replaces an existing entry with the same key name in place, otherwise
    /// appends.
    pub fn insert(&mut self, key: Value, value: Value) {
        let existing = key
            .as_name()
            .and_then(|name| self.0.iter().position(|(k, _)| k.as_name() == Some(name)));
        match existing {
            Some(index) => self.0[index] = (key, value),
            None => self.0.push((key, value)),
        }
    }

    /// `self` layered over `defaults`: explicit entries win.
    pub fn merged_over(&self, defaults: &Options) -> Options {
        let mut merged = defaults.clone();
        for (key, value) in &self.0 {
            merged.insert(key.clone(), value.clone());
        }
        merged
    }

    /// `'path' => target` pairs, in written order.
    pub fn path_mappings(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().filter_map(|(key, value)| match key {
            Value::Str(path) => Some((path.as_str(), value)),
            _ => None,
        })
    }
}

impl<'a> IntoIterator for &'a Options {
    type Item = &'a (Value, Value);
    type IntoIter = std::slice::Iter<'a, (Value, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

pub fn lower_program(root: Node<'_>, source: &str) -> Vec<Call> {
    let mut calls = Vec::new();
    collect_statements(root, source, &mut calls);
    calls
}

fn collect_statements(node: Node<'_>, source: &str, out: &mut Vec<Call>) {
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        collect_statement(child, source, out);
    }
}

fn collect_statement(node: Node<'_>, source: &str, out: &mut Vec<Call>) {
    match node.kind() {
        "comment" => {}
        "call" => {
            if let Some(call) = lower_call(node, source) {
                out.push(call);
            }
        }
        // if/unless/begin bodies, body_statement, ERROR recovery nodes
        _ => collect_statements(node, source, out),
    }
}

fn lower_call(node: Node<'_>, source: &str) -> Option<Call> {
    let method = node.child_by_field_name("method")?;
    let name = node_text(method, source);
    if name.is_empty() {
        return None;
    }
    let receiver = node
        .child_by_field_name("receiver")
        .map(|receiver| lower_receiver(receiver, source));
    let mut args = Vec::new();
    let mut options = Options::new();
    if let Some(arguments) = node.child_by_field_name("arguments") {
        lower_arguments(arguments, source, &mut args, &mut options);
    }
    let block = node
        .child_by_field_name("block")
        .map(|block| lower_block(block, source));
    Some(Call {
        receiver,
        name,
        args,
        options,
        block,
        line: node.start_position().row + 1,
    })
}

fn lower_receiver(node: Node<'_>, source: &str) -> Receiver {
    let text = node_text(node, source);
    if node.kind() == "identifier" {
        Receiver::Local(text)
    } else {
        Receiver::Expr(text)
    }
}

fn lower_arguments(node: Node<'_>, source: &str, args: &mut Vec<Value>, options: &mut Options) {
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        match child.kind() {
            "comment" | "block_argument" => {}
            "pair" => {
                if let Some((key, value)) = lower_pair(child, source) {
                    options.push(key, value);
                }
            }
            _ => args.push(lower_value(child, source)),
        }
    }
    if options.is_empty() && matches!(args.last(), Some(Value::Hash(_))) {
        if let Some(Value::Hash(hash)) = args.pop() {
            *options = hash;
        }
    }
}

fn lower_pair(node: Node<'_>, source: &str) -> Option<(Value, Value)> {
    let key = node.child_by_field_name("key")?;
    let value = node.child_by_field_name("value")?;
    Some((lower_value(key, source), lower_value(value, source)))
}

fn lower_block(node: Node<'_>, source: &str) -> Block {
    let params = node.child_by_field_name("parameters");
    let param = params.and_then(|params| {
        let mut cursor = params.walk();
        let first = params
            .named_children(&mut cursor)
            .find(|child| child.kind() == "identifier");
        first.map(|child| node_text(child, source))
    });
    let mut body = Vec::new();
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        if child.kind() == "block_parameters" {
            continue;
        }
        collect_statement(child, source, &mut body);
    }
    Block { param, body }
}

fn lower_value(node: Node<'_>, source: &str) -> Value {
    match node.kind() {
        "simple_symbol" => Value::Symbol(node_text(node, source).trim_start_matches(':').to_string()),
        "hash_key_symbol" | "bare_symbol" => Value::Symbol(node_text(node, source)),
        "delimited_symbol" => match string_value(node, source) {
            Value::Str(content) => Value::Symbol(content),
            other => other,
        },
        "string" | "bare_string" => string_value(node, source),
        "array" | "string_array" | "symbol_array" => {
            let mut items = Vec::new();
            let mut cursor = node.walk();
            for child in node.named_children(&mut cursor) {
                if child.kind() != "comment" {
                    items.push(lower_value(child, source));
                }
            }
            Value::Array(items)
        }
        "hash" => {
            let mut options = Options::new();
            let mut cursor = node.walk();
            for child in node.named_children(&mut cursor) {
                if child.kind() == "pair" {
                    if let Some((key, value)) = lower_pair(child, source) {
                        options.push(key, value);
                    }
                }
            }
            Value::Hash(options)
        }
        "call" => match lower_call(node, source) {
            Some(call) => Value::Call(Box::new(call)),
            None => Value::Other(node_text(node, source)),
        },
        "parenthesized_statements" => {
            let mut cursor = node.walk();
            let first = node
                .named_children(&mut cursor)
                .find(|child| child.kind() != "comment");
            match first {
                Some(child) => lower_value(child, source),
                None => Value::Other(node_text(node, source)),
            }
        }
        "constant" | "scope_resolution" => Value::Const(node_text(node, source)),
        "regex" => Value::Regex(node_text(node, source)),
        _ => Value::Other(node_text(node, source)),
    }
}

fn string_value(node: Node<'_>, source: &str) -> Value {
    let mut content = String::new();
    let mut dynamic = false;
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        match child.kind() {
            "interpolation" => {
                dynamic = true;
                content.push_str(&node_text(child, source));
            }
            _ => content.push_str(raw_text(child, source)),
        }
    }
    if dynamic {
        Value::Dynamic(content)
    } else {
        Value::Str(content)
    }
}

fn raw_text<'s>(node: Node<'_>, source: &'s str) -> &'s str {
    source.get(node.start_byte()..node.end_byte()).unwrap_or("")
}

fn node_text(node: Node<'_>, source: &str) -> String {
    raw_text(node, source).trim().to_string()
}

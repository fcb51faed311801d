use std::collections::HashSet;

use tree_sitter::Node;

use super::{Parser, create_ts_parser, first_error_node, get_node_text, node_line};
use crate::constants::python::{MAX_CALLS_PER_FUNCTION, MAX_GLOBAL_VALUE_LEN};
use crate::types::{Declaration, DeclarationKind, Extractor, MapError, Modifier, Outline, Result};

pub struct PythonParser;

impl PythonParser {
    pub fn new() -> Result<Self> {
        // Validate that the language is available
        let _ = create_ts_parser(tree_sitter_python::LANGUAGE, "Python")?;
        Ok(Self)
    }
}

impl Parser for PythonParser {
    fn parse(&self, source: &str) -> Result<Vec<Declaration>> {
        let mut parser = create_ts_parser(tree_sitter_python::LANGUAGE, "Python")?;
        let tree = parser
            .parse(source, None)
            .ok_or_else(|| MapError::parse(1, "Failed to parse Python source"))?;
        let root = tree.root_node();

        if let Some(error) = first_error_node(root) {
            let line = node_line(error);
            let message = if error.is_missing() {
                format!("missing `{}`", error.kind())
            } else {
                "invalid syntax".to_string()
            };
            tracing::debug!("Python parse error at line {}: {}", line, message);
            return Err(MapError::parse(line, message));
        }

        let mut extractor = ModuleExtractor::new(root, source.as_bytes());
        extractor.extract();
        Ok(extractor.outline.into_vec())
    }

    fn extractor(&self) -> Extractor {
        Extractor::PythonAst
    }
}

// =============================================================================
// Module Walk
// =============================================================================

struct ModuleExtractor<'a> {
    root: Node<'a>,
    content: &'a [u8],
    top_level_functions: HashSet<String>,
    outline: Outline,
}

impl<'a> ModuleExtractor<'a> {
    fn new(root: Node<'a>, content: &'a [u8]) -> Self {
        let mut cursor = root.walk();
        let top_level_functions = root
            .named_children(&mut cursor)
            .filter_map(|child| {
                let (definition, _) = unwrap_decorated(child);
                if definition.kind() != "function_definition" {
                    return None;
                }
                definition
                    .child_by_field_name("name")
                    .map(|name| get_node_text(name, content).to_string())
            })
            .collect();

        Self {
            root,
            content,
            top_level_functions,
            outline: Outline::new(),
        }
    }

    fn text(&self, node: Node) -> &'a str {
        get_node_text(node, self.content)
    }

    fn module_children(&self) -> Vec<Node<'a>> {
        let mut cursor = self.root.walk();
        self.root.named_children(&mut cursor).collect()
    }

    fn extract(&mut self) {
        for child in self.module_children() {
            match child.kind() {
                "import_statement" => self.import(child),
                "import_from_statement" | "future_import_statement" => self.from_import(child),
                "expression_statement" => {
                    if let Some(assignment) = child
                        .named_child(0)
                        .filter(|n| n.kind() == "assignment")
                    {
                        self.assignment(assignment);
                    }
                }
                "function_definition" | "class_definition" | "decorated_definition" => {
                    self.definition(child, None);
                }
                _ => {}
            }
        }
    }

    fn field_texts(&self, node: Node, field: &str) -> Vec<String> {
        let mut cursor = node.walk();
        node.children_by_field_name(field, &mut cursor)
            .map(|n| collapse(self.text(n)))
            .collect()
    }

    fn import(&mut self, node: Node) {
        let names = self.field_texts(node, "name");
        self.outline.push(Declaration::new(
            DeclarationKind::Import,
            names.join(", "),
            node_line(node),
        ));
    }

    fn from_import(&mut self, node: Node) {
        let module = match node.child_by_field_name("module_name") {
            Some(module) => collapse(self.text(module)),
            None => "__future__".to_string(),
        };

        let mut names = self.field_texts(node, "name");
        let mut cursor = node.walk();
        if node
            .named_children(&mut cursor)
            .any(|n| n.kind() == "wildcard_import")
        {
            names.push("*".to_string());
        }

        self.outline.push(
            Declaration::new(DeclarationKind::Import, module, node_line(node))
                .with_detail(names.join(", ")),
        );
    }

    fn assignment(&mut self, node: Node) {
        // `A = B = value` nests as assignment(left: A, right: assignment(left: B, ...))
        let mut targets = Vec::new();
        let mut current = node;
        let mut annotation = None;
        let value = loop {
            if let Some(left) = current.child_by_field_name("left") {
                targets.push(left);
            }
            if annotation.is_none() {
                annotation = current.child_by_field_name("type");
            }
            match current.child_by_field_name("right") {
                Some(right) if right.kind() == "assignment" => current = right,
                right => break right,
            }
        };

        let line = node_line(node);
        let signature = annotation.map(|t| format!(": {}", collapse(self.text(t))));

        let upper: Vec<&str> = targets
            .iter()
            .filter(|t| t.kind() == "identifier")
            .map(|t| self.text(*t))
            .filter(|name| is_upper_case(name))
            .collect();

        if !upper.is_empty() {
            let mut decl = Declaration::new(DeclarationKind::Constant, upper.join(", "), line);
            if let Some(signature) = signature {
                decl = decl.with_signature(signature);
            }
            self.outline.push(decl);
            return;
        }

        let [target] = targets.as_slice() else {
            return;
        };
        if target.kind() != "identifier" {
            return;
        }
        let name = self.text(*target);
        if name.starts_with('_') {
            return;
        }
        let Some(value) = value.filter(|v| is_plain_literal(*v)) else {
            return;
        };
        let literal = self.text(value);
        if literal.contains('\n') || literal.chars().count() > MAX_GLOBAL_VALUE_LEN {
            return;
        }

        let mut decl = Declaration::new(DeclarationKind::Global, name, line).with_detail(literal);
        if let Some(signature) = signature {
            decl = decl.with_signature(signature);
        }
        self.outline.push(decl);
    }

    fn definition(&mut self, node: Node, parent: Option<usize>) {
        let (definition, decorators) = unwrap_decorated(node);
        let annotations: Vec<String> = decorators
            .iter()
            .map(|d| format!("@{}", collapse(self.text(*d).trim_start_matches('@').trim())))
            .collect();

        match definition.kind() {
            "function_definition" => self.function(definition, annotations, parent),
            "class_definition" => self.class(definition, annotations, parent),
            _ => {}
        }
    }

    fn function(&mut self, node: Node, annotations: Vec<String>, parent: Option<usize>) {
        let Some(name_node) = node.child_by_field_name("name") else {
            return;
        };
        let name = self.text(name_node);

        let mut signature = format!("({})", self.parameters(node).join(", "));
        if let Some(ret) = node.child_by_field_name("return_type") {
            signature.push_str(&format!(" -> {}", collapse(self.text(ret))));
        }

        let kind = if parent.is_some() {
            DeclarationKind::Method
        } else {
            DeclarationKind::Function
        };
        let mut decl = Declaration::new(kind, name, node_line(node)).with_signature(signature);

        if node.child(0).is_some_and(|c| c.kind() == "async") {
            decl = decl.with_modifier(Modifier::Async);
        }
        if is_private(name) {
            decl = decl.with_modifier(Modifier::Private);
        }
        if annotations.iter().any(|a| a == "@staticmethod") {
            decl = decl.with_modifier(Modifier::Static);
        }
        if annotations
            .iter()
            .any(|a| decorator_path(a).ends_with("abstractmethod"))
        {
            decl = decl.with_modifier(Modifier::Abstract);
        }

        let calls = node
            .child_by_field_name("body")
            .map(|body| self.calls(body))
            .unwrap_or_default();

        self.outline.push(
            decl.with_annotations(annotations)
                .with_calls(calls)
                .with_parent(parent),
        );
    }

    fn class(&mut self, node: Node, annotations: Vec<String>, parent: Option<usize>) {
        let Some(name_node) = node.child_by_field_name("name") else {
            return;
        };

        let mut decl = Declaration::new(DeclarationKind::Class, self.text(name_node), node_line(node))
            .with_annotations(annotations)
            .with_parent(parent);
        if let Some(superclasses) = node.child_by_field_name("superclasses") {
            let mut cursor = superclasses.walk();
            let bases: Vec<String> = superclasses
                .named_children(&mut cursor)
                .filter(|n| n.kind() != "keyword_argument" && n.kind() != "comment")
                .map(|n| collapse(self.text(n)))
                .collect();
            if !bases.is_empty() {
                decl = decl.with_signature(format!("({})", bases.join(", ")));
            }
        }
        let class = self.outline.push(decl);

        let Some(body) = node.child_by_field_name("body") else {
            return;
        };
        let mut cursor = body.walk();
        let members: Vec<Node> = body.named_children(&mut cursor).collect();
        for member in members {
            if matches!(
                member.kind(),
                "function_definition" | "class_definition" | "decorated_definition"
            ) {
                self.definition(member, Some(class));
            }
        }
    }

    /// Parameter names in source order, without bare `*` and `/`
    fn parameters(&self, function: Node) -> Vec<String> {
        let Some(params) = function.child_by_field_name("parameters") else {
            return Vec::new();
        };
        let mut cursor = params.walk();
        params
            .named_children(&mut cursor)
            .filter_map(|param| match param.kind() {
                "identifier" | "list_splat_pattern" | "dictionary_splat_pattern" => {
                    Some(self.text(param).to_string())
                }
                "default_parameter" | "typed_default_parameter" => param
                    .child_by_field_name("name")
                    .map(|n| self.text(n).to_string()),
                "typed_parameter" => param.named_child(0).map(|n| self.text(n).to_string()),
                "keyword_separator" | "positional_separator" | "comment" => None,
                _ => Some(collapse(self.text(param))),
            })
            .collect()
    }

    /// Same-file top-level functions called anywhere in `body`
    fn calls(&self, body: Node) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut calls = Vec::new();
        let mut stack = vec![body];

        while let Some(node) = stack.pop() {
            if node.kind() == "call"
                && let Some(callee) = node.child_by_field_name("function")
            {
                let name = match callee.kind() {
                    "identifier" => Some(self.text(callee)),
                    "attribute" => callee
                        .child_by_field_name("attribute")
                        .map(|attr| self.text(attr)),
                    _ => None,
                };
                if let Some(name) = name
                    && self.top_level_functions.contains(name)
                    && seen.insert(name)
                {
                    calls.push(name.to_string());
                }
            }

            // Reverse push keeps source order on pop
            let mut cursor = node.walk();
            let children: Vec<Node> = node.named_children(&mut cursor).collect();
            stack.extend(children.into_iter().rev());
        }

        calls.truncate(MAX_CALLS_PER_FUNCTION);
        calls
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Split a `decorated_definition` into its definition and decorators
fn unwrap_decorated(node: Node) -> (Node, Vec<Node>) {
    if node.kind() != "decorated_definition" {
        return (node, Vec::new());
    }
    let mut cursor = node.walk();
    let decorators = node
        .named_children(&mut cursor)
        .filter(|n| n.kind() == "decorator")
        .collect();
    let definition = node.child_by_field_name("definition").unwrap_or(node);
    (definition, decorators)
}

fn collapse(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// `MAX_SIZE`, `V2`: no lower-case letters and at least one upper-case one
fn is_upper_case(name: &str) -> bool {
    name.chars().any(|c| c.is_uppercase()) && !name.chars().any(|c| c.is_lowercase())
}

fn is_private(name: &str) -> bool {
    let dunder = name.len() > 4 && name.starts_with("__") && name.ends_with("__");
    name.starts_with('_') && !dunder
}

/// Decorator without its call arguments: `@app.route('/')` becomes `app.route`
fn decorator_path(annotation: &str) -> &str {
    let path = annotation.trim_start_matches('@');
    path.split('(').next().unwrap_or(path).trim()
}

fn is_plain_literal(node: Node) -> bool {
    match node.kind() {
        "integer" | "float" | "true" | "false" => true,
        "string" => {
            let mut cursor = node.walk();
            !node
                .named_children(&mut cursor)
                .any(|n| n.kind() == "interpolation")
        }
        _ => false,
    }
}

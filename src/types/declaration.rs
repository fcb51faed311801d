//! Declarations
//!
//! One [`Declaration`] per structural element discovered in a source file.
//! Parent links are indices back into the same sequence; [`Outline`] is the
//! collector that keeps those links pointing backwards at containers only.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of structural element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclarationKind {
    Import,
    Namespace,
    Constant,
    Global,
    Function,
    Class,
    Method,
    StateVariable,
    EffectBlock,
    LocalFunction,
    UiGuard,
    CallHint,
    TodoMarker,
}

impl DeclarationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Import => "import",
            Self::Namespace => "namespace",
            Self::Constant => "constant",
            Self::Global => "global",
            Self::Function => "function",
            Self::Class => "class",
            Self::Method => "method",
            Self::StateVariable => "state_variable",
            Self::EffectBlock => "effect_block",
            Self::LocalFunction => "local_function",
            Self::UiGuard => "ui_guard",
            Self::CallHint => "call_hint",
            Self::TodoMarker => "todo_marker",
        }
    }

    /// Only classes and namespaces may contain other declarations
    pub fn is_container(&self) -> bool {
        matches!(self, Self::Class | Self::Namespace)
    }
}

impl fmt::Display for DeclarationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declaration modifier; set order is render order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modifier {
    Public,
    Protected,
    Private,
    Internal,
    Static,
    Abstract,
    Final,
    Open,
    Override,
    Async,
    Suspend,
    Composable,
    Data,
    Sealed,
}

impl Modifier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Protected => "protected",
            Self::Private => "private",
            Self::Internal => "internal",
            Self::Static => "static",
            Self::Abstract => "abstract",
            Self::Final => "final",
            Self::Open => "open",
            Self::Override => "override",
            Self::Async => "async",
            Self::Suspend => "suspend",
            Self::Composable => "composable",
            Self::Data => "data",
            Self::Sealed => "sealed",
        }
    }

    /// Map a source keyword to a modifier (`pub`-style visibility included)
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "public" => Some(Self::Public),
            "protected" => Some(Self::Protected),
            "private" => Some(Self::Private),
            "internal" => Some(Self::Internal),
            "static" => Some(Self::Static),
            "abstract" => Some(Self::Abstract),
            "final" => Some(Self::Final),
            "open" => Some(Self::Open),
            "override" => Some(Self::Override),
            "async" => Some(Self::Async),
            "suspend" => Some(Self::Suspend),
            "data" => Some(Self::Data),
            "sealed" => Some(Self::Sealed),
            _ => None,
        }
    }

    pub fn is_visibility(&self) -> bool {
        matches!(
            self,
            Self::Public | Self::Protected | Self::Private | Self::Internal
        )
    }
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One discovered structural element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Declaration {
    pub kind: DeclarationKind,
    pub name: String,
    /// Parameter list and return text for callables, heritage clause for classes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    /// Kind-specific extra text (class keyword, literal value, raw TODO line)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// 1-based
    pub start_line: u32,
    #[serde(skip_serializing_if = "BTreeSet::is_empty", default)]
    pub modifiers: BTreeSet<Modifier>,
    /// Index of the enclosing class or namespace in the same sequence
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<usize>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub annotations: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub calls: Vec<String>,
}

impl Declaration {
    pub fn new(kind: DeclarationKind, name: impl Into<String>, start_line: u32) -> Self {
        Self {
            kind,
            name: name.into(),
            signature: None,
            detail: None,
            start_line,
            modifiers: BTreeSet::new(),
            parent: None,
            annotations: Vec::new(),
            calls: Vec::new(),
        }
    }

    pub fn with_signature(mut self, signature: impl Into<String>) -> Self {
        self.signature = Some(signature.into());
        self
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn with_modifier(mut self, modifier: Modifier) -> Self {
        self.modifiers.insert(modifier);
        self
    }

    pub fn with_modifiers(mut self, modifiers: impl IntoIterator<Item = Modifier>) -> Self {
        self.modifiers.extend(modifiers);
        self
    }

    pub fn with_parent(mut self, parent: Option<usize>) -> Self {
        self.parent = parent;
        self
    }

    pub fn with_annotations(mut self, annotations: Vec<String>) -> Self {
        self.annotations = annotations;
        self
    }

    pub fn with_calls(mut self, calls: Vec<String>) -> Self {
        self.calls = calls;
        self
    }

    pub fn has_modifier(&self, modifier: Modifier) -> bool {
        self.modifiers.contains(&modifier)
    }
}

// =============================================================================
// Outline Collector
// =============================================================================

/// Ordered declaration sequence with validated parent links
#[derive(Debug, Default)]
pub struct Outline {
    declarations: Vec<Declaration>,
}

impl Outline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a declaration and return its index.
    ///
    /// A parent that is not an earlier container on a strictly earlier line
    /// is dropped.
    pub fn push(&mut self, mut declaration: Declaration) -> usize {
        if let Some(parent) = declaration.parent {
            let valid = self.declarations.get(parent).is_some_and(|p| {
                p.kind.is_container() && p.start_line < declaration.start_line
            });
            if !valid {
                tracing::debug!(
                    "Dropping parent link {} for {} '{}' at L{}",
                    parent,
                    declaration.kind,
                    declaration.name,
                    declaration.start_line
                );
                declaration.parent = None;
            }
        }
        self.declarations.push(declaration);
        self.declarations.len() - 1
    }

    pub fn get(&self, index: usize) -> Option<&Declaration> {
        self.declarations.get(index)
    }

    pub fn into_vec(self) -> Vec<Declaration> {
        self.declarations
    }
}

/// Nesting depth of a declaration, following parent links
pub fn nesting_depth(declarations: &[Declaration], index: usize) -> usize {
    let mut depth = 0;
    let mut current = declarations.get(index).and_then(|d| d.parent);
    while let Some(parent) = current {
        // Parents always point backwards, so this terminates
        if parent >= index || depth >= declarations.len() {
            break;
        }
        depth += 1;
        current = declarations.get(parent).and_then(|d| d.parent);
    }
    depth
}

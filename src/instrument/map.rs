//! TraceId → syntax map
//!
//! Built once per instrumentation run and read-only afterwards; it is the
//! join key between the static sources and the runtime id stream.
//!
//! @module instrument/map

use std::collections::BTreeMap;

use crate::parse::{SourceSet, SyntaxKind, SyntaxNode, SyntaxRef};

/// Trace id as written by the instrumented program
pub type TraceId = u32;

/// Closed set of traceable units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TraceKind {
    /// Method body; entered through a textual call in the caller
    Method,
    /// Constructor body; entered through an object creation
    Constructor,
    /// Instance initializer block; runs as part of an object creation
    Initializer,
    /// `static { ... }`; runs once when its class loads
    StaticInit,
    /// Plain block statement (nested block, try/catch/finally, ...)
    Block,
    /// `if` consequence or alternative
    Branch,
    For,
    ForEach,
    While,
    DoWhile,
}

impl TraceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Method => "method",
            Self::Constructor => "constructor",
            Self::Initializer => "initializer",
            Self::StaticInit => "static-initializer",
            Self::Block => "block",
            Self::Branch => "branch",
            Self::For => "for",
            Self::ForEach => "for-each",
            Self::While => "while",
            Self::DoWhile => "do-while",
        }
    }

    /// Loop units count iterations among their siblings
    pub fn is_loop(&self) -> bool {
        match self {
            Self::For | Self::ForEach | Self::While | Self::DoWhile => true,
            Self::Method
            | Self::Constructor
            | Self::Initializer
            | Self::StaticInit
            | Self::Block
            | Self::Branch => false,
        }
    }

    /// How a unit attaches to the code that was running when it started
    pub fn binding(&self) -> Binding {
        match self {
            Self::Method => Binding::CallSite,
            Self::Constructor | Self::Initializer => Binding::CreationSite,
            Self::StaticInit => Binding::ClassInit,
            Self::Block | Self::Branch | Self::For | Self::ForEach | Self::While | Self::DoWhile => {
                Binding::Nested
            }
        }
    }

    /// Loop kind for a loop statement
    pub fn for_loop(kind: SyntaxKind) -> Option<Self> {
        match kind {
            SyntaxKind::ForStatement => Some(Self::For),
            SyntaxKind::EnhancedForStatement => Some(Self::ForEach),
            SyntaxKind::WhileStatement => Some(Self::While),
            SyntaxKind::DoStatement => Some(Self::DoWhile),
            _ => None,
        }
    }
}

/// Attachment rule of a traceable unit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding {
    /// Matched against a method call or method reference
    CallSite,
    /// Matched against an object creation
    CreationSite,
    /// Syntactically inside the running unit
    Nested,
    /// Class loading; not tied to any expression
    ClassInit,
}

/// What a trace id points at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceTarget {
    pub node: SyntaxRef,
    pub kind: TraceKind,
}

/// Immutable TraceId → target map
#[derive(Debug, Clone, Default)]
pub struct TraceMap {
    targets: BTreeMap<TraceId, TraceTarget>,
}

impl TraceMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, id: TraceId, target: TraceTarget) {
        let previous = self.targets.insert(id, target);
        debug_assert!(previous.is_none(), "trace id {} assigned twice", id);
    }

    pub fn get(&self, id: TraceId) -> Option<&TraceTarget> {
        self.targets.get(&id)
    }

    /// Resolve an id to its syntax node
    pub fn node<'s>(&self, sources: &'s SourceSet, id: TraceId) -> Option<SyntaxNode<'s>> {
        self.get(id).map(|t| sources.node(t.node))
    }

    pub fn iter(&self) -> impl Iterator<Item = (TraceId, &TraceTarget)> {
        self.targets.iter().map(|(id, t)| (*id, t))
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

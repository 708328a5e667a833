//! Owned syntax arena
//!
//! Tree-sitter trees borrow their source and hand out nodes tied to the tree
//! lifetime. The engines need stable, copyable handles that live in maps, so
//! every parsed file is lowered into a flat arena of `NodeData` in pre-order.
//! Node ids therefore follow document order.
//!
//! @module parse/syntax

use std::ops::Range;
use std::path::{Path, PathBuf};

use super::range::SourceRange;

// =============================================================================
// KINDS
// =============================================================================

/// Node kinds the engines care about; everything else is `Other`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyntaxKind {
    Program,
    ClassDeclaration,
    ClassBody,
    MethodDeclaration,
    ConstructorDeclaration,
    ConstructorBody,
    ExplicitConstructorInvocation,
    StaticInitializer,
    LambdaExpression,
    ObjectCreationExpression,
    Block,
    IfStatement,
    ForStatement,
    EnhancedForStatement,
    WhileStatement,
    DoStatement,
    ExpressionStatement,
    LocalVariableDeclaration,
    FieldDeclaration,
    VariableDeclarator,
    MethodInvocation,
    MethodReference,
    ParenthesizedExpression,
    Identifier,
    Other,
}

impl SyntaxKind {
    /// Map a tree-sitter-java node kind
    pub fn from_ts(kind: &str) -> Self {
        match kind {
            "program" => Self::Program,
            "class_declaration" => Self::ClassDeclaration,
            "class_body" => Self::ClassBody,
            "method_declaration" => Self::MethodDeclaration,
            "constructor_declaration" => Self::ConstructorDeclaration,
            "constructor_body" => Self::ConstructorBody,
            "explicit_constructor_invocation" => Self::ExplicitConstructorInvocation,
            "static_initializer" => Self::StaticInitializer,
            "lambda_expression" => Self::LambdaExpression,
            "object_creation_expression" => Self::ObjectCreationExpression,
            "block" => Self::Block,
            "if_statement" => Self::IfStatement,
            "for_statement" => Self::ForStatement,
            "enhanced_for_statement" => Self::EnhancedForStatement,
            "while_statement" => Self::WhileStatement,
            "do_statement" => Self::DoStatement,
            "expression_statement" => Self::ExpressionStatement,
            "local_variable_declaration" => Self::LocalVariableDeclaration,
            "field_declaration" => Self::FieldDeclaration,
            "variable_declarator" => Self::VariableDeclarator,
            "method_invocation" => Self::MethodInvocation,
            "method_reference" => Self::MethodReference,
            "parenthesized_expression" => Self::ParenthesizedExpression,
            "identifier" => Self::Identifier,
            _ => Self::Other,
        }
    }

    /// Loop statements carry a `body` field
    pub fn is_loop(&self) -> bool {
        matches!(
            self,
            Self::ForStatement | Self::EnhancedForStatement | Self::WhileStatement | Self::DoStatement
        )
    }
}

// =============================================================================
// ARENA
// =============================================================================

/// Index of a node inside its file's arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub u32);

/// Index of a file inside a `SourceSet`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FileId(pub u32);

/// Copyable handle to a node anywhere in a `SourceSet`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SyntaxRef {
    pub file: FileId,
    pub node: NodeId,
}

/// One lowered syntax node
#[derive(Debug, Clone)]
pub struct NodeData {
    pub kind: SyntaxKind,
    /// Raw tree-sitter kind, kept for diagnostics
    pub ts_kind: &'static str,
    pub range: SourceRange,
    pub bytes: Range<usize>,
    pub parent: Option<NodeId>,
    /// Named, non-comment children in source order
    pub children: Vec<NodeId>,
    /// (field name, child) pairs; a field may repeat (`init`, `update`)
    pub fields: Vec<(&'static str, NodeId)>,
    /// Source text, identifiers only
    pub text: Option<String>,
}

/// A parsed source file
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// Path relative to the project root
    pub path: PathBuf,
    pub text: String,
    pub nodes: Vec<NodeData>,
    /// Tree-sitter reported ERROR/MISSING nodes
    pub has_errors: bool,
}

impl SourceFile {
    /// Root node (`program`)
    pub fn root(&self) -> SyntaxNode<'_> {
        SyntaxNode {
            file: self,
            id: NodeId(0),
        }
    }

    pub fn node(&self, id: NodeId) -> SyntaxNode<'_> {
        SyntaxNode { file: self, id }
    }

    /// All nodes in document order
    pub fn iter(&self) -> impl Iterator<Item = SyntaxNode<'_>> {
        (0..self.nodes.len() as u32).map(move |i| self.node(NodeId(i)))
    }

    /// File name without directories (`Main.java`)
    pub fn simple_name(&self) -> String {
        simple_file_name(&self.path)
    }
}

/// File name component of a path-like string
pub fn simple_file_name(path: impl AsRef<Path>) -> String {
    path.as_ref()
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

// =============================================================================
// NODE HANDLE
// =============================================================================

/// Borrowed view of one node: kind, range, children, optional name
#[derive(Clone, Copy)]
pub struct SyntaxNode<'a> {
    file: &'a SourceFile,
    id: NodeId,
}

impl<'a> SyntaxNode<'a> {
    #[inline]
    fn data(&self) -> &'a NodeData {
        &self.file.nodes[self.id.0 as usize]
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn file(&self) -> &'a SourceFile {
        self.file
    }

    pub fn kind(&self) -> SyntaxKind {
        self.data().kind
    }

    pub fn ts_kind(&self) -> &'static str {
        self.data().ts_kind
    }

    pub fn range(&self) -> SourceRange {
        self.data().range
    }

    pub fn bytes(&self) -> Range<usize> {
        self.data().bytes.clone()
    }

    pub fn parent(&self) -> Option<SyntaxNode<'a>> {
        self.data().parent.map(|p| self.file.node(p))
    }

    pub fn children(&self) -> impl Iterator<Item = SyntaxNode<'a>> + 'a {
        let file = self.file;
        self.data().children.iter().map(move |&c| file.node(c))
    }

    /// First child stored under `field`
    pub fn field(&self, field: &str) -> Option<SyntaxNode<'a>> {
        self.data()
            .fields
            .iter()
            .find(|(name, _)| *name == field)
            .map(|&(_, c)| self.file.node(c))
    }

    /// Every child stored under `field`, in source order
    pub fn fields(&self, field: &str) -> Vec<SyntaxNode<'a>> {
        self.data()
            .fields
            .iter()
            .filter(|(name, _)| *name == field)
            .map(|&(_, c)| self.file.node(c))
            .collect()
    }

    /// Field under which this node hangs off its parent
    pub fn field_in_parent(&self) -> Option<&'static str> {
        let parent = self.data().parent?;
        self.file.nodes[parent.0 as usize]
            .fields
            .iter()
            .find(|(_, c)| *c == self.id)
            .map(|(name, _)| *name)
    }

    /// Identifier text (identifiers only)
    pub fn text(&self) -> Option<&'a str> {
        self.data().text.as_deref()
    }

    /// Raw source text covered by the node
    pub fn source_text(&self) -> &'a str {
        self.file.text.get(self.bytes()).unwrap_or_default()
    }

    /// The `name` field (method, invocation, declarator)
    pub fn name_node(&self) -> Option<SyntaxNode<'a>> {
        self.field("name")
    }

    /// Text of the `name` field
    pub fn name(&self) -> Option<&'a str> {
        self.name_node().and_then(|n| n.text())
    }

    /// Ancestors, nearest first
    pub fn ancestors(&self) -> impl Iterator<Item = SyntaxNode<'a>> + 'a {
        std::iter::successors(self.parent(), |n| n.parent())
    }

    /// Nesting depth (root = 0)
    pub fn depth(&self) -> usize {
        self.ancestors().count()
    }

    /// Strip any number of wrapping parentheses
    pub fn unparenthesized(self) -> SyntaxNode<'a> {
        let mut node = self;
        while node.kind() == SyntaxKind::ParenthesizedExpression {
            match node.children().next() {
                Some(inner) => node = inner,
                None => break,
            }
        }
        node
    }
}

impl std::fmt::Debug for SyntaxNode<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}#{} {} @ {}",
            self.file.path.display(),
            self.id.0,
            self.ts_kind(),
            self.range()
        )
    }
}

// =============================================================================
// SOURCE SET
// =============================================================================

/// Every parsed file of one analyzed project
#[derive(Debug, Clone, Default)]
pub struct SourceSet {
    pub files: Vec<SourceFile>,
}

impl SourceSet {
    pub fn new(mut files: Vec<SourceFile>) -> Self {
        files.sort_by(|a, b| a.path.cmp(&b.path));
        Self { files }
    }

    pub fn file(&self, id: FileId) -> &SourceFile {
        &self.files[id.0 as usize]
    }

    pub fn node(&self, r: SyntaxRef) -> SyntaxNode<'_> {
        self.file(r.file).node(r.node)
    }

    /// (FileId, file) pairs in set order
    pub fn iter(&self) -> impl Iterator<Item = (FileId, &SourceFile)> {
        self.files
            .iter()
            .enumerate()
            .map(|(i, f)| (FileId(i as u32), f))
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

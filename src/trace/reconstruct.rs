//! Trace Reconstruction Engine
//!
//! Rebuilds the dynamic execution tree from the TraceId → syntax map and the
//! runtime token stream in a single pass, without backtracking. Each popped
//! id becomes a node whose body is scanned statement by statement; the next
//! token decides whether a statement spawned a child (method call, object
//! creation, nested block, branch, loop iteration) or only contributes its
//! own range.
//!
//! Activations live on an explicit stack, so the depth of the traced program
//! never grows the native stack.
//!
//! @module trace/reconstruct

use std::collections::HashMap;

use tracing::{debug, info, warn};

use super::stream::TraceStream;
use super::types::{JumpLink, TraceTree};
use crate::core::error::{Error, Result};
use crate::instrument::{declaring_class, Binding, TraceId, TraceKind, TraceMap, TraceTarget};
use crate::parse::{SourceRange, SourceSet, SyntaxKind, SyntaxNode};

/// Superclass links followed before giving up on a cyclic hierarchy
const MAX_ANCESTRY: usize = 64;

/// Output of one reconstruction
#[derive(Debug, Clone)]
pub struct Reconstruction {
    pub tree: TraceTree,
    /// Tokens left once the root's child completed
    pub unconsumed_tokens: usize,
}

/// Reconstructs trees for one instrumented source set
pub struct Reconstructor<'a> {
    sources: &'a SourceSet,
    map: &'a TraceMap,
    allow_partial: bool,
}

impl<'a> Reconstructor<'a> {
    pub fn new(sources: &'a SourceSet, map: &'a TraceMap) -> Self {
        Self {
            sources,
            map,
            allow_partial: false,
        }
    }

    /// Return the tree built so far instead of failing with
    /// `IncompleteTrace` when tokens are left over
    pub fn allow_partial(mut self, allow_partial: bool) -> Self {
        self.allow_partial = allow_partial;
        self
    }

    pub fn run(&self, stream: TraceStream) -> Result<Reconstruction> {
        let total = stream.len();
        let mut walk = Walk::new(self.sources, self.map, stream);
        walk.run_root()?;

        let remaining = walk.stream.remaining();
        if remaining > 0 {
            if !self.allow_partial {
                return Err(Error::IncompleteTrace { remaining, total });
            }
            warn!(remaining, total, "Trace tokens left unconsumed");
        }

        info!(nodes = walk.tree.len(), tokens = total, "Reconstructed trace");
        Ok(Reconstruction {
            tree: walk.tree,
            unconsumed_tokens: remaining,
        })
    }
}

// =============================================================================
// WALK STATE
// =============================================================================

/// Next child of the frame being filled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cursor {
    /// Not determined yet; peek the stream
    Unset,
    /// A child was created; its extent is still ahead in the scan
    Child(SourceRange),
    /// No further children at this level
    Exhausted,
}

/// A piece of a scope: a syntax node or a synthesized span
#[derive(Clone, Copy)]
enum Piece<'a> {
    Node(SyntaxNode<'a>),
    Span(SourceRange),
}

impl<'a> Piece<'a> {
    fn range(&self) -> SourceRange {
        match self {
            Self::Node(node) => node.range(),
            Self::Span(range) => *range,
        }
    }
}

/// Per-node state while its body is scanned
struct Frame<'a> {
    index: usize,
    target: TraceTarget,
    node: SyntaxNode<'a>,
    /// Call and creation expressions already bound in this activation
    consumed_calls: Vec<SourceRange>,
    /// Extents of children created so far
    child_markers: Vec<SourceRange>,
    /// Creation whose constructor chain has started but not finished
    open_creation: Option<SyntaxNode<'a>>,
    /// Creation bound most recently
    last_creation: Option<SyntaxNode<'a>>,
}

/// How a node was entered from its parent
enum Entry {
    /// First node under the tree root
    Root,
    /// Through a call or creation expression
    Site {
        link: JumpLink,
        landing: Option<JumpLink>,
        /// Extent inside the parent's scan, when the site lies there
        marker: Option<SourceRange>,
    },
    /// Syntactically nested in the parent; `header` is a loop's header
    Nested {
        extent: SourceRange,
        header: Option<SourceRange>,
    },
    /// Class loading; no expression in the parent caused it
    Detached,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    /// Determine the cursor for the current piece
    Pick,
    /// Scan the piece's guard expressions
    Guards,
    /// Descend again into the piece, or record it and move on
    Settle,
}

/// One list of pieces being scanned: a scope, or a statement's guards
struct Level<'a> {
    pieces: Vec<Piece<'a>>,
    next: usize,
    step: Step,
    /// The current piece holds a child and is not an own range
    skip: bool,
}

impl<'a> Level<'a> {
    fn new(pieces: Vec<Piece<'a>>) -> Self {
        Self {
            pieces,
            next: 0,
            step: Step::Pick,
            skip: false,
        }
    }
}

/// A node whose body is being scanned
struct Activation<'a> {
    frame: Frame<'a>,
    parent: usize,
    entry: Entry,
    cursor: Cursor,
    levels: Vec<Level<'a>>,
}

enum Progress<'a> {
    /// A child was bound; scan it before resuming
    Enter(Activation<'a>),
    Finished,
}

enum Next<'a> {
    Cursor(Cursor),
    Enter(Activation<'a>),
}

/// A call or creation expression in a scope
#[derive(Clone, Copy)]
struct Site<'a> {
    node: SyntaxNode<'a>,
    /// Inside a lambda or anonymous class body; runs whenever invoked
    deferred: bool,
}

struct Walk<'a> {
    sources: &'a SourceSet,
    map: &'a TraceMap,
    /// Class declarations by simple name; the first declaration wins
    classes: HashMap<&'a str, SyntaxNode<'a>>,
    stream: TraceStream,
    tree: TraceTree,
}

impl<'a> Walk<'a> {
    fn new(sources: &'a SourceSet, map: &'a TraceMap, stream: TraceStream) -> Self {
        let mut classes = HashMap::new();
        for node in sources.files.iter().flat_map(|f| f.iter()) {
            if node.kind() != SyntaxKind::ClassDeclaration {
                continue;
            }
            if let Some(name) = node.name() {
                classes.entry(name).or_insert(node);
            }
        }
        Self {
            sources,
            map,
            classes,
            stream,
            tree: TraceTree::new(),
        }
    }

    fn target(&self, id: TraceId) -> Result<TraceTarget> {
        self.map
            .get(id)
            .copied()
            .ok_or(Error::UnknownTraceId { id })
    }

    /// Hang the first unit under the root; static initializers that ran
    /// before it are its earlier siblings
    fn run_root(&mut self) -> Result<()> {
        while let Some(id) = self.stream.pop() {
            let target = self.target(id)?;
            let root = self.open(0, id, target, Entry::Root);
            self.drive(root)?;
            if target.kind != TraceKind::StaticInit {
                break;
            }
        }
        Ok(())
    }

    /// Scan `root` and everything it enters to completion
    fn drive(&mut self, root: Activation<'a>) -> Result<()> {
        let mut stack = vec![root];
        while let Some(top) = stack.last_mut() {
            match self.advance(top)? {
                Progress::Enter(child) => stack.push(child),
                Progress::Finished => {
                    if let Some(done) = stack.pop() {
                        self.close(done, stack.last_mut());
                    }
                }
            }
        }
        Ok(())
    }

    /// Create the node for an already popped id
    fn open(&mut self, parent: usize, id: TraceId, target: TraceTarget, entry: Entry) -> Activation<'a> {
        let sources: &'a SourceSet = self.sources;
        let node = sources.node(target.node);
        let index = self.tree.push_child(parent, id);
        let scope = scope_statements(node, target.kind)
            .into_iter()
            .map(Piece::Node)
            .collect();

        Activation {
            frame: Frame {
                index,
                target,
                node,
                consumed_calls: Vec::new(),
                child_markers: Vec::new(),
                open_creation: None,
                last_creation: None,
            },
            parent,
            entry,
            cursor: Cursor::Unset,
            levels: vec![Level::new(scope)],
        }
    }

    /// Scan pieces in order, collecting own ranges, until a child must be
    /// entered or the body is done
    fn advance(&mut self, act: &mut Activation<'a>) -> Result<Progress<'a>> {
        loop {
            let Some(level) = act.levels.last_mut() else {
                return Ok(Progress::Finished);
            };
            let Some(&piece) = level.pieces.get(level.next) else {
                act.levels.pop();
                continue;
            };

            match level.step {
                Step::Pick => {
                    level.step = Step::Guards;
                    if act.cursor == Cursor::Unset {
                        match self.next_child(&mut act.frame)? {
                            Next::Cursor(cursor) => act.cursor = cursor,
                            Next::Enter(child) => return Ok(Progress::Enter(child)),
                        }
                    }
                }
                Step::Guards => {
                    level.step = Step::Settle;
                    if let Piece::Node(stmt) = piece {
                        let guards = guard_pieces(stmt);
                        if !guards.is_empty() {
                            act.levels.push(Level::new(guards));
                        }
                    }
                }
                Step::Settle => {
                    let range = piece.range();
                    match act.cursor {
                        // The child sits inside this piece; look for the
                        // next one before moving on.
                        Cursor::Child(marker) if range.contains(&marker) => {
                            act.cursor = Cursor::Unset;
                            level.skip = true;
                            level.step = Step::Pick;
                            continue;
                        }
                        // Rebound to a site already scanned past
                        Cursor::Child(marker) if marker.end() < range.begin() => {
                            act.cursor = Cursor::Unset;
                            level.step = Step::Pick;
                            continue;
                        }
                        // The child left no trace in this scope
                        Cursor::Unset => {
                            level.step = Step::Pick;
                            continue;
                        }
                        Cursor::Child(_) | Cursor::Exhausted => {}
                    }

                    let skip = std::mem::replace(&mut level.skip, false);
                    level.next += 1;
                    level.step = Step::Pick;
                    if !skip {
                        self.add_range(&act.frame, range);
                    }
                }
            }
        }
    }

    /// Finish a scanned node and hand control back to its parent
    fn close(&mut self, done: Activation<'a>, parent: Option<&mut Activation<'a>>) {
        let Activation {
            frame,
            parent: parent_index,
            entry,
            ..
        } = done;
        let kind = frame.target.kind;

        if kind == TraceKind::For {
            for update in frame.node.fields("update") {
                self.add_range(&frame, update.range());
            }
        }

        let iteration = if kind.is_loop() {
            let nodes = self.tree.nodes();
            let trace_id = &nodes[frame.index].trace_id;
            Some(
                nodes[parent_index]
                    .children_indices
                    .iter()
                    .filter(|&&c| nodes[c].trace_id == *trace_id)
                    .count() as u32,
            )
        } else {
            None
        };

        let method_name = match kind {
            TraceKind::Method | TraceKind::Constructor => frame.node.name().map(str::to_string),
            _ => None,
        };

        if let Some(node) = self.tree.get_mut(frame.index) {
            node.iteration = iteration;
            node.method_name = method_name;
            if let Entry::Site { link, landing, .. } = &entry {
                node.link = Some(link.clone());
                node.out_links.extend(landing.clone());
                node.out_index = Some(parent_index);
            }
        }

        debug!(index = frame.index, kind = kind.as_str(), "Materialized");

        let Some(parent) = parent else {
            return;
        };
        let marker = match entry {
            Entry::Site { marker, .. } => marker,
            Entry::Nested { extent, header } => {
                // Calls in the loop header run again on every iteration.
                if let Some(header) = header {
                    parent.frame.consumed_calls.retain(|c| !header.contains(c));
                }
                Some(extent)
            }
            Entry::Root | Entry::Detached => None,
        };
        match marker {
            Some(marker) => {
                parent.frame.child_markers.push(marker);
                parent.cursor = Cursor::Child(marker);
            }
            None => parent.cursor = Cursor::Unset,
        }
    }

    /// Decide whether the next token is a child of `frame`
    fn next_child(&mut self, frame: &mut Frame<'a>) -> Result<Next<'a>> {
        let Some(id) = self.stream.peek() else {
            return Ok(Next::Cursor(Cursor::Exhausted));
        };
        let target = self.target(id)?;
        let sources: &'a SourceSet = self.sources;
        let unit = sources.node(target.node);

        let bound = match target.kind.binding() {
            Binding::CallSite => self.bind_call(frame, unit),
            Binding::CreationSite => self.bind_creation(frame, unit),
            Binding::ClassInit => Some(Entry::Detached),
            Binding::Nested => None,
        };
        let entry = match bound {
            Some(entry) => Some(entry),
            None => nested_entry(frame, target, unit),
        };

        match entry {
            Some(entry) => {
                self.stream.pop();
                Ok(Next::Enter(self.open(frame.index, id, target, entry)))
            }
            None => {
                debug!(id, index = frame.index, "No site for next token");
                Ok(Next::Cursor(Cursor::Exhausted))
            }
        }
    }

    /// Bind a method to a call in the frame's scope, or to a call run while
    /// an object created there was set up
    fn bind_call(&self, frame: &mut Frame<'a>, method: SyntaxNode<'a>) -> Option<Entry> {
        let name = method.name()?;
        let landing = landing(method);

        let is_call = |node: SyntaxNode<'a>| call_name(node) == Some(name);
        if let Some(site) = pick_site(frame, is_call) {
            let range = site.node.range();
            consume(frame, range);
            return Some(Entry::Site {
                link: JumpLink::new(&frame.node.file().path, range),
                landing,
                marker: Some(range),
            });
        }

        let call = self.construction_call(frame, name)?;
        let range = call.range();
        let marker = (std::ptr::eq(call.file(), frame.node.file())
            && frame.node.range().contains(&range))
        .then_some(range);
        Some(Entry::Site {
            link: JumpLink::new(&call.file().path, range),
            landing,
            marker,
        })
    }

    /// Call named `name` in a field initializer or explicit constructor
    /// invocation of a class being instantiated by the frame
    fn construction_call(&self, frame: &Frame<'a>, name: &str) -> Option<SyntaxNode<'a>> {
        let pending = scope_sites(frame)
            .into_iter()
            .filter(|s| {
                s.node.kind() == SyntaxKind::ObjectCreationExpression
                    && !frame.consumed_calls.contains(&s.node.range())
            })
            .map(|s| s.node);
        let candidates = frame
            .open_creation
            .into_iter()
            .chain(pending)
            .chain(frame.last_creation);

        let mut sites = Vec::new();
        for creation in candidates {
            let Some(created) = created_type(creation) else {
                continue;
            };
            for class in self.ancestry(created) {
                for expr in construction_exprs(class) {
                    sites.clear();
                    collect_sites(expr, false, &mut sites);
                    if let Some(site) = sites.iter().find(|s| call_name(s.node) == Some(name)) {
                        return Some(site.node);
                    }
                }
            }
        }
        None
    }

    /// Bind a constructor or instance initializer to the creation that
    /// runs it
    fn bind_creation(&self, frame: &mut Frame<'a>, unit: SyntaxNode<'a>) -> Option<Entry> {
        let class = declaring_class(unit)?;
        let class_name = class.name()?;
        let creates = |creation: SyntaxNode<'a>| {
            created_type(creation)
                .map(|t| self.ancestry(t).iter().any(|c| same_node(*c, class)))
                .unwrap_or(false)
        };

        let creation = match frame.open_creation.filter(|c| creates(*c)) {
            Some(open) => open,
            None => {
                let fresh = pick_site(frame, |node| {
                    node.kind() == SyntaxKind::ObjectCreationExpression && creates(node)
                });
                match fresh {
                    Some(site) => {
                        consume(frame, site.node.range());
                        site.node
                    }
                    None => frame.last_creation.filter(|c| creates(*c))?,
                }
            }
        };

        // The chain ends in the nearest class that runs setup code of its own
        let created = created_type(creation)?;
        let innermost = self
            .ancestry(created)
            .into_iter()
            .find(|c| runs_setup_code(*c))
            .map(|nearest| same_node(nearest, class))
            .unwrap_or(false);
        let last_step = if unit.kind() == SyntaxKind::ConstructorDeclaration {
            class_name != created || arity_matches(unit, creation)
        } else {
            !declares_constructor(class) && is_last_initializer(unit, class)
        };
        let completes = innermost && last_step;

        frame.last_creation = Some(creation);
        frame.open_creation = if completes { None } else { Some(creation) };

        let range = creation.range();
        Some(Entry::Site {
            link: JumpLink::new(&frame.node.file().path, range),
            landing: landing(unit),
            marker: Some(range),
        })
    }

    /// `name` and its project superclasses, nearest first
    fn ancestry(&self, name: &str) -> Vec<SyntaxNode<'a>> {
        let mut chain: Vec<SyntaxNode<'a>> = Vec::new();
        let mut next = Some(name);
        while let Some(name) = next.take() {
            if chain.len() >= MAX_ANCESTRY {
                break;
            }
            let Some(&class) = self.classes.get(name) else {
                break;
            };
            next = class
                .field("superclass")
                .and_then(|s| s.children().next())
                .map(|t| simple_type_name(t.source_text()));
            chain.push(class);
        }
        chain
    }

    /// Record an executed range, keeping own ranges disjoint from children
    fn add_range(&mut self, frame: &Frame<'a>, range: SourceRange) {
        if frame.child_markers.iter().any(|m| range.contains(m)) {
            return;
        }
        let Some(entry) = self.tree.get_mut(frame.index) else {
            return;
        };
        if entry.ranges.iter().any(|r| r.contains(&range)) {
            return;
        }
        entry.ranges.retain(|r| !range.contains(r));
        entry.ranges.push(range);
    }
}

// =============================================================================
// SYNTAX HELPERS
// =============================================================================

/// Statements making up the body scanned for a unit
fn scope_statements(node: SyntaxNode<'_>, kind: TraceKind) -> Vec<SyntaxNode<'_>> {
    let body = match kind {
        TraceKind::Block | TraceKind::Branch | TraceKind::Initializer => Some(node),
        TraceKind::StaticInit => node.children().find(|c| c.kind() == SyntaxKind::Block),
        TraceKind::Method
        | TraceKind::Constructor
        | TraceKind::For
        | TraceKind::ForEach
        | TraceKind::While
        | TraceKind::DoWhile => node.field("body"),
    };
    // `super(...)`/`this(...)` runs before the constructor's trace call
    body.map(|b| {
        b.children()
            .filter(|c| c.kind() != SyntaxKind::ExplicitConstructorInvocation)
            .collect()
    })
    .unwrap_or_default()
}

/// Sub-expressions evaluated before a statement's body
fn guard_pieces(stmt: SyntaxNode<'_>) -> Vec<Piece<'_>> {
    match stmt.kind() {
        SyntaxKind::IfStatement | SyntaxKind::WhileStatement | SyntaxKind::DoStatement => stmt
            .field("condition")
            .map(|c| vec![Piece::Node(c.unparenthesized())])
            .unwrap_or_default(),
        SyntaxKind::ForStatement => stmt
            .fields("init")
            .into_iter()
            .chain(stmt.field("condition"))
            .map(Piece::Node)
            .collect(),
        SyntaxKind::EnhancedForStatement => {
            let mut pieces = Vec::new();
            if let (Some(ty), Some(name)) = (stmt.field("type"), stmt.field("name")) {
                pieces.push(Piece::Span(SourceRange::spanning(ty.range(), name.range())));
            }
            if let Some(value) = stmt.field("value") {
                pieces.push(Piece::Node(value));
            }
            pieces
        }
        _ => Vec::new(),
    }
}

/// Plain nested child: a unit strictly inside the frame's own node
fn nested_entry(frame: &Frame<'_>, target: TraceTarget, unit: SyntaxNode<'_>) -> Option<Entry> {
    let same_file = target.node.file == frame.target.node.file;
    if !same_file || !frame.node.range().strictly_contains(&unit.range()) {
        return None;
    }
    Some(if target.kind.is_loop() {
        Entry::Nested {
            extent: unit.field("body").unwrap_or(unit).range(),
            header: Some(unit.range()),
        }
    } else {
        Entry::Nested {
            extent: unit.range(),
            header: None,
        }
    })
}

fn is_anonymous_body(node: SyntaxNode<'_>) -> bool {
    node.kind() == SyntaxKind::ClassBody
        && node
            .parent()
            .map(|p| p.kind() == SyntaxKind::ObjectCreationExpression)
            .unwrap_or(false)
}

/// Calls, method references and creations of `node` in evaluation (post-)
/// order. Nested blocks and class bodies belong to other frames; lambda and
/// anonymous class bodies are collected as deferred.
fn collect_sites<'a>(node: SyntaxNode<'a>, deferred: bool, out: &mut Vec<Site<'a>>) {
    let deferred = if node.kind() == SyntaxKind::LambdaExpression || is_anonymous_body(node) {
        true
    } else if !deferred && matches!(node.kind(), SyntaxKind::Block | SyntaxKind::ClassBody) {
        return;
    } else {
        deferred
    };
    for child in node.children() {
        collect_sites(child, deferred, out);
    }
    if matches!(
        node.kind(),
        SyntaxKind::MethodInvocation
            | SyntaxKind::MethodReference
            | SyntaxKind::ObjectCreationExpression
    ) {
        out.push(Site { node, deferred });
    }
}

fn scope_sites<'a>(frame: &Frame<'a>) -> Vec<Site<'a>> {
    let mut sites = Vec::new();
    for stmt in scope_statements(frame.node, frame.target.kind) {
        collect_sites(stmt, false, &mut sites);
    }
    sites
}

/// First unconsumed site accepted by `wanted`. Deferred sites run whenever
/// their body is invoked, so once consumed they stay available behind every
/// unconsumed site.
fn pick_site<'a>(frame: &Frame<'a>, wanted: impl Fn(SyntaxNode<'a>) -> bool) -> Option<Site<'a>> {
    let sites: Vec<Site<'a>> = scope_sites(frame)
        .into_iter()
        .filter(|s| wanted(s.node))
        .collect();
    sites
        .iter()
        .find(|s| !frame.consumed_calls.contains(&s.node.range()))
        .or_else(|| sites.iter().find(|s| s.deferred))
        .copied()
}

fn consume(frame: &mut Frame<'_>, range: SourceRange) {
    if !frame.consumed_calls.contains(&range) {
        frame.consumed_calls.push(range);
    }
}

/// Method name a call or method reference targets
fn call_name<'a>(node: SyntaxNode<'a>) -> Option<&'a str> {
    match node.kind() {
        SyntaxKind::MethodInvocation => node.name(),
        SyntaxKind::MethodReference => node
            .children()
            .filter(|c| c.kind() == SyntaxKind::Identifier)
            .last()
            .and_then(|c| c.text()),
        _ => None,
    }
}

/// Name range of the entered declaration
fn landing(unit: SyntaxNode<'_>) -> Option<JumpLink> {
    unit.name_node()
        .map(|name| JumpLink::new(&unit.file().path, name.range()))
}

fn same_node(a: SyntaxNode<'_>, b: SyntaxNode<'_>) -> bool {
    std::ptr::eq(a.file(), b.file()) && a.id() == b.id()
}

/// `pkg.Outer.Inner<T>` → `Inner`
fn simple_type_name(text: &str) -> &str {
    let base = text.split('<').next().unwrap_or(text).trim();
    base.rsplit('.').next().unwrap_or(base).trim()
}

fn created_type<'a>(creation: SyntaxNode<'a>) -> Option<&'a str> {
    creation
        .field("type")
        .map(|t| simple_type_name(t.source_text()))
}

fn class_members<'a>(class: SyntaxNode<'a>) -> Vec<SyntaxNode<'a>> {
    class
        .field("body")
        .map(|b| b.children().collect())
        .unwrap_or_default()
}

/// Class declares a constructor or an instance initializer
fn runs_setup_code(class: SyntaxNode<'_>) -> bool {
    class_members(class).iter().any(|m| {
        matches!(
            m.kind(),
            SyntaxKind::ConstructorDeclaration | SyntaxKind::Block
        )
    })
}

fn declares_constructor(class: SyntaxNode<'_>) -> bool {
    class_members(class)
        .iter()
        .any(|m| m.kind() == SyntaxKind::ConstructorDeclaration)
}

fn is_last_initializer(unit: SyntaxNode<'_>, class: SyntaxNode<'_>) -> bool {
    class_members(class)
        .into_iter()
        .filter(|m| m.kind() == SyntaxKind::Block)
        .last()
        .map(|last| same_node(last, unit))
        .unwrap_or(false)
}

/// Parameter count fits the creation's argument count
fn arity_matches(constructor: SyntaxNode<'_>, creation: SyntaxNode<'_>) -> bool {
    let params: Vec<SyntaxNode<'_>> = constructor
        .field("parameters")
        .map(|p| p.children().collect())
        .unwrap_or_default();
    let args = creation
        .field("arguments")
        .map(|a| a.children().count())
        .unwrap_or(0);
    if params.iter().any(|p| p.ts_kind() == "spread_parameter") {
        args + 1 >= params.len()
    } else {
        args == params.len()
    }
}

fn is_static(member: SyntaxNode<'_>) -> bool {
    member.children().any(|c| {
        c.ts_kind() == "modifiers" && c.source_text().split_whitespace().any(|w| w == "static")
    })
}

/// Expressions evaluated while an instance is set up, outside any traced
/// unit: instance field initializers and `super(...)`/`this(...)` calls
fn construction_exprs<'a>(class: SyntaxNode<'a>) -> Vec<SyntaxNode<'a>> {
    let mut exprs = Vec::new();
    for member in class_members(class) {
        match member.kind() {
            SyntaxKind::FieldDeclaration if !is_static(member) => exprs.extend(
                member
                    .children()
                    .filter(|c| c.kind() == SyntaxKind::VariableDeclarator),
            ),
            SyntaxKind::ConstructorDeclaration => {
                if let Some(body) = member.field("body") {
                    exprs.extend(
                        body.children()
                            .filter(|c| c.kind() == SyntaxKind::ExplicitConstructorInvocation),
                    );
                }
            }
            _ => {}
        }
    }
    exprs
}

// =============================================================================
// TESTS
// =============================================================================

mod loader;
mod range;
mod syntax;
mod treesitter;
mod walker;

pub use loader::{load_sources, parse_sources};
pub use range::{Position, SourceRange};
pub use syntax::{
    simple_file_name, FileId, NodeData, NodeId, SourceFile, SourceSet, SyntaxKind, SyntaxNode,
    SyntaxRef,
};
pub use treesitter::parse_java;
pub use walker::FileWalker;

//! model
//!
//! The static command tree.
//!
//! # Architecture
//!
//! The tree is built once at startup from whatever discovery mechanism the
//! host uses (here: explicit registration through [`CommandSetBuilder`]).
//! Building consumes the builder, so the tree cannot be modified once the
//! first resolution can happen; it is read-only for the rest of the process
//! and safe to share between threads.
//!
//! ```text
//! GroupNode (root, application-scope filters)
//! ├── LeafNode "hello"          -> Invocable { parameters, body }
//! ├── LeafNode "forward"        -> Forwarded { target: ["forward-target"], .. }
//! └── GroupNode "nested"        (group-scope filters)
//!     ├── LeafNode "hello"
//!     └── LeafNode "bye"
//! ```
//!
//! # Invariants
//!
//! - Sibling names (and aliases) are case-sensitively unique
//! - A group with exactly one leaf child may be addressed without naming it
//! - Forward targets always point at a leaf with its own body

pub mod body;
pub mod builder;
pub mod param;
pub mod value;

pub use body::{BodyFuture, CommandBody, IntoExitCode};
pub use builder::{CommandSetBuilder, ForwardTarget, GroupDecl, LeafDecl};
pub use param::{
    ArgumentDescriptor, FlatParameter, GroupDescriptor, OptionDescriptor, Param,
    ParameterDescriptor, ParameterList, ServiceDescriptor,
};
pub use value::{EnumType, FromValue, Value, ValueType};

use std::sync::Arc;

use thiserror::Error;

use crate::core::types::{ProgramInfo, TypeError};
use crate::engine::pipeline::FilterDescriptor;

/// Errors from building a command tree.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    InvalidName(#[from] TypeError),

    #[error("duplicate command '{name}' in '{scope}'")]
    DuplicateCommand { scope: String, name: String },

    #[error("default command '{name}' is not a command in '{scope}'")]
    DefaultLeafNotFound { scope: String, name: String },

    #[error("forward target '{target}' is not a command with its own body")]
    ForwardTargetNotFound { target: String },

    #[error("forwarding command '{name}' cannot declare its own parameters")]
    ForwardedLeafHasParameters { name: String },

    #[error("duplicate parameter '{name}'")]
    DuplicateParameter { name: String },

    #[error("duplicate short alias '-{alias}'")]
    DuplicateShortAlias { alias: char },

    #[error("invalid option name '{name}'")]
    InvalidOptionName { name: String },

    #[error("argument '{argument}' is an array but not the last positional argument")]
    VariadicArgumentNotLast { argument: String },

    #[error("parameter group '{group}' is nested inside another group")]
    NestedParameterGroup { group: String },

    #[error("parameter '{parameter}' has a nested array type")]
    NestedArray { parameter: String },

    #[error("parameter '{parameter}' is not an option and cannot stop parsing")]
    StopParsingRequiresOption { parameter: String },

    #[error("default value '{value}' of parameter '{parameter}' is not a valid {expected}")]
    DefaultTypeMismatch {
        parameter: String,
        value: String,
        expected: String,
    },
}

/// The built command tree.
#[derive(Debug)]
pub struct CommandTree {
    program: ProgramInfo,
    root: GroupNode,
}

impl CommandTree {
    pub(crate) fn new(program: ProgramInfo, root: GroupNode) -> Self {
        Self { program, root }
    }

    pub fn program(&self) -> &ProgramInfo {
        &self.program
    }

    pub fn root(&self) -> &GroupNode {
        &self.root
    }
}

/// A node of the command tree.
#[derive(Debug)]
pub enum CommandNode {
    Group(GroupNode),
    Leaf(LeafNode),
}

impl CommandNode {
    pub fn name(&self) -> &str {
        match self {
            CommandNode::Group(g) => &g.name,
            CommandNode::Leaf(l) => &l.name,
        }
    }

    pub fn aliases(&self) -> &[String] {
        match self {
            CommandNode::Group(g) => &g.aliases,
            CommandNode::Leaf(l) => &l.aliases,
        }
    }

    pub fn description(&self) -> &str {
        match self {
            CommandNode::Group(g) => &g.description,
            CommandNode::Leaf(l) => &l.description,
        }
    }

    /// Case-sensitive match against the name or an alias.
    pub fn answers_to(&self, token: &str) -> bool {
        self.name() == token || self.aliases().iter().any(|a| a == token)
    }
}

/// A child slot: the node plus how many of the parent's filters it sees.
///
/// Filters registered on a scope apply only to children registered after
/// them, so each child records the parent's filter count at registration.
#[derive(Debug)]
pub struct ChildNode {
    pub node: CommandNode,
    pub visible_filters: usize,
}

/// A command group: dispatches to named children or renders an index.
#[derive(Debug)]
pub struct GroupNode {
    pub(crate) name: String,
    pub(crate) aliases: Vec<String>,
    pub(crate) description: String,
    pub(crate) filters: Vec<FilterDescriptor>,
    pub(crate) children: Vec<ChildNode>,
    pub(crate) default_leaf: Option<usize>,
}

impl GroupNode {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Filters registered on this scope, in registration order.
    pub fn filters(&self) -> &[FilterDescriptor] {
        &self.filters
    }

    pub fn children(&self) -> impl Iterator<Item = &CommandNode> {
        self.children.iter().map(|c| &c.node)
    }

    /// The child answering to `token`, if any.
    pub fn child(&self, token: &str) -> Option<&ChildNode> {
        self.children.iter().find(|c| c.node.answers_to(token))
    }

    /// Whether the group holds exactly one child and no default leaf.
    pub fn is_single_command(&self) -> bool {
        self.default_leaf.is_none() && self.children.len() == 1
    }

    /// The leaf that runs when no child is named: the default leaf, or the
    /// only child when the group holds exactly one leaf.
    pub fn implicit_leaf(&self) -> Option<(&LeafNode, usize)> {
        let slot = match self.default_leaf {
            Some(index) => self.children.get(index),
            None if self.children.len() == 1 => self.children.first(),
            None => None,
        }?;
        match &slot.node {
            CommandNode::Leaf(leaf) => Some((leaf, slot.visible_filters)),
            CommandNode::Group(_) => None,
        }
    }

    /// Every name and alias of the children, in registration order.
    pub fn child_names(&self) -> impl Iterator<Item = &str> {
        self.children.iter().flat_map(|c| {
            std::iter::once(c.node.name()).chain(c.node.aliases().iter().map(String::as_str))
        })
    }
}

/// Filters attached to one command registration.
#[derive(Debug, Clone, Default)]
pub struct LeafFilters {
    /// Declaration-site filters (leaf scope).
    pub declared: Vec<FilterDescriptor>,
    /// Filters attached to this registration (invocation scope).
    pub invocation: Vec<FilterDescriptor>,
}

/// Parameters and body of an executable command.
#[derive(Debug)]
pub struct Invocable {
    pub parameters: ParameterList,
    pub body: CommandBody,
}

/// A leaf whose parameters and body come from another leaf.
#[derive(Debug, Clone)]
pub struct Forwarded {
    /// Path of the target leaf from the root.
    pub target: Vec<String>,
    pub invocable: Arc<Invocable>,
    /// The target's own filters, composed inside the forwarding leaf's.
    pub target_filters: LeafFilters,
}

/// Built-in behaviors a leaf may forward to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltInAction {
    /// Render help for the group enclosing the leaf.
    ShowHelp,
    /// Render the program version.
    ShowVersion,
}

/// What running a leaf does.
#[derive(Debug, Clone)]
pub enum LeafAction {
    Invoke(Arc<Invocable>),
    Forward(Forwarded),
    BuiltIn(BuiltInAction),
}

/// A directly executable command.
#[derive(Debug)]
pub struct LeafNode {
    pub(crate) name: String,
    pub(crate) aliases: Vec<String>,
    pub(crate) description: String,
    pub(crate) filters: LeafFilters,
    pub(crate) action: LeafAction,
}

impl LeafNode {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// The leaf's own filters (for a forwarding leaf, the forwarding side).
    pub fn filters(&self) -> &LeafFilters {
        &self.filters
    }

    pub fn action(&self) -> &LeafAction {
        &self.action
    }

    /// The invocable that runs for this leaf, following a forward.
    pub fn invocable(&self) -> Option<&Invocable> {
        match &self.action {
            LeafAction::Invoke(invocable) => Some(invocable),
            LeafAction::Forward(forwarded) => Some(&forwarded.invocable),
            LeafAction::BuiltIn(_) => None,
        }
    }

    /// Parameters bound for this leaf (empty for built-in actions).
    pub fn parameters(&self) -> Option<&ParameterList> {
        self.invocable().map(|i| &i.parameters)
    }
}

//! engine::resolver
//!
//! Command resolution: walking the tree with the leading positional tokens.
//!
//! # Algorithm
//!
//! Starting at the root group, each leading token that does not start with
//! `-` is matched against the current group's children:
//!
//! - a matching group is entered and descent continues
//! - a matching leaf ends descent, except that the only leaf of a group
//!   is not matched by name when it declares positional arguments
//! - no match falls back to the group's implicit leaf (default leaf, or
//!   the only child), passing the token on as an argument; without one
//!   the token is an unknown command
//!
//! Descent also stops at the first option-like token or at the end of
//! input; the group's implicit leaf runs if it has one, otherwise the
//! group itself is the resolution point (index or help).

use thiserror::Error;

use crate::core::config::schema::AppOptions;
use crate::core::naming::similar_names;
use crate::engine::pipeline::FilterDescriptor;
use crate::model::{ChildNode, CommandNode, CommandTree, GroupNode, LeafNode};

/// Errors from interactive resolution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("'{token}' is not a command. See '--help' for usage.")]
    UnknownCommand {
        token: String,
        /// Path of the group where matching failed.
        path: Vec<String>,
        /// Similar sibling names, most similar first.
        suggestions: Vec<String>,
    },
}

/// A group passed through on the way to the resolved node, with the number
/// of its filters that apply to the next step.
#[derive(Debug, Clone, Copy)]
pub struct ScopeStep<'t> {
    pub group: &'t GroupNode,
    pub visible: usize,
}

impl<'t> ScopeStep<'t> {
    /// The group's filters that wrap the next step, in registration order.
    pub fn visible_filters(&self) -> &'t [FilterDescriptor] {
        let filters = self.group.filters();
        &filters[..self.visible.min(filters.len())]
    }
}

/// A resolved leaf.
#[derive(Debug, Clone)]
pub struct ResolvedLeaf<'t> {
    pub leaf: &'t LeafNode,
    /// Group holding the leaf.
    pub parent: &'t GroupNode,
    /// Groups from the root to `parent`, inclusive.
    pub trail: Vec<ScopeStep<'t>>,
    /// Command names as typed (without the leaf name when it was implicit).
    pub path: Vec<String>,
    /// Whether the leaf was selected without being named.
    pub implicit: bool,
    /// Number of leading tokens consumed as command names.
    pub consumed: usize,
}

impl ResolvedLeaf<'_> {
    /// Full path from the root, including the leaf name.
    pub fn command_path(&self) -> Vec<String> {
        let mut path = self.path.clone();
        if self.implicit {
            path.push(self.leaf.name().to_string());
        }
        path
    }

    /// Whether the leaf answers for the program itself (no command typed).
    pub fn at_root(&self) -> bool {
        self.path.is_empty()
    }
}

/// A group addressed without a runnable leaf.
#[derive(Debug, Clone)]
pub struct ResolvedGroup<'t> {
    pub group: &'t GroupNode,
    pub path: Vec<String>,
    pub consumed: usize,
}

impl ResolvedGroup<'_> {
    pub fn at_root(&self) -> bool {
        self.path.is_empty()
    }
}

/// Outcome of resolution.
#[derive(Debug, Clone)]
pub enum Resolution<'t> {
    Leaf(ResolvedLeaf<'t>),
    Group(ResolvedGroup<'t>),
}

impl Resolution<'_> {
    pub fn consumed(&self) -> usize {
        match self {
            Resolution::Leaf(l) => l.consumed,
            Resolution::Group(g) => g.consumed,
        }
    }
}

/// Walks a command tree.
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'t> {
    tree: &'t CommandTree,
    threshold: f64,
    max_suggestions: usize,
}

impl<'t> Resolver<'t> {
    pub fn new(tree: &'t CommandTree, options: &AppOptions) -> Self {
        Self {
            tree,
            threshold: options.suggestion_threshold,
            max_suggestions: options.max_suggestions,
        }
    }

    /// Resolve the command addressed by the leading tokens.
    ///
    /// # Errors
    ///
    /// Returns `ResolveError::UnknownCommand` with similar sibling names
    /// when a token matches no child and the group has no implicit leaf.
    pub fn resolve(&self, tokens: &[String]) -> Result<Resolution<'t>, ResolveError> {
        let mut group = self.tree.root();
        let mut trail: Vec<ScopeStep<'t>> = Vec::new();
        let mut path: Vec<String> = Vec::new();
        let mut consumed = 0;

        loop {
            let token = tokens
                .get(consumed)
                .filter(|t| !t.starts_with('-'))
                .map(String::as_str);

            let named = token
                .and_then(|t| group.child(t))
                .filter(|slot| !takes_own_name_as_value(group, slot));

            if let Some(slot) = named {
                consumed += 1;
                path.push(slot.node.name().to_string());
                trail.push(ScopeStep {
                    group,
                    visible: slot.visible_filters,
                });
                match &slot.node {
                    CommandNode::Group(child) => {
                        group = child;
                        continue;
                    }
                    CommandNode::Leaf(leaf) => {
                        tracing::debug!(path = %path.join(" "), "resolved leaf");
                        return Ok(Resolution::Leaf(ResolvedLeaf {
                            leaf,
                            parent: group,
                            trail,
                            path,
                            implicit: false,
                            consumed,
                        }));
                    }
                }
            }

            if let Some((leaf, visible)) = group.implicit_leaf() {
                tracing::debug!(path = %path.join(" "), leaf = %leaf.name(), "resolved implicit leaf");
                trail.push(ScopeStep { group, visible });
                return Ok(Resolution::Leaf(ResolvedLeaf {
                    leaf,
                    parent: group,
                    trail,
                    path,
                    implicit: true,
                    consumed,
                }));
            }

            return match token {
                Some(token) => {
                    let suggestions = similar_names(
                        token,
                        group.child_names(),
                        self.threshold,
                        self.max_suggestions,
                    );
                    tracing::debug!(token, ?suggestions, "unknown command");
                    Err(ResolveError::UnknownCommand {
                        token: token.to_string(),
                        path,
                        suggestions,
                    })
                }
                None => {
                    tracing::debug!(path = %path.join(" "), "resolved group");
                    Ok(Resolution::Group(ResolvedGroup {
                        group,
                        path,
                        consumed,
                    }))
                }
            };
        }
    }
}

/// In single-command mode a leaf with positional arguments is never
/// addressed by name, so its name can still be passed as a value.
fn takes_own_name_as_value(group: &GroupNode, slot: &ChildNode) -> bool {
    match &slot.node {
        CommandNode::Leaf(leaf) if group.is_single_command() => leaf
            .parameters()
            .is_some_and(|p| p.arguments().next().is_some()),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::schema::NameCase;
    use crate::core::types::ProgramInfo;
    use crate::engine::pipeline::FilterScope;
    use crate::model::{CommandBody, CommandSetBuilder, Param, ValueType};

    fn strings(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|s| s.to_string()).collect()
    }

    fn noop() -> CommandBody {
        CommandBody::from_fn(|_| Ok(()))
    }

    fn tree(configure: impl FnOnce(&mut CommandSetBuilder)) -> CommandTree {
        let mut set = CommandSetBuilder::new(FilterScope::Application);
        configure(&mut set);
        set.build_tree(ProgramInfo::new("prog"), NameCase::Kebab)
            .unwrap()
    }

    fn nested() -> CommandTree {
        tree(|set| {
            set.add_leaf("konnichiwa", noop());
            set.add_group("nested", |g| {
                g.add_leaf("hello", noop());
                g.add_leaf("bye", noop());
            });
            set.add_leaf("exit-code", noop());
        })
    }

    #[test]
    fn descends_into_groups() {
        let tree = nested();
        let resolver = Resolver::new(&tree, &AppOptions::default());
        let Resolution::Leaf(leaf) = resolver.resolve(&strings(&["nested", "hello", "Karen"])).unwrap()
        else {
            panic!("expected leaf");
        };
        assert_eq!(leaf.leaf.name(), "hello");
        assert_eq!(leaf.path, ["nested", "hello"]);
        assert_eq!(leaf.consumed, 2);
        assert_eq!(leaf.trail.len(), 2);
        assert!(!leaf.at_root());
    }

    #[test]
    fn only_an_unnamed_root_leaf_is_at_root() {
        let single = tree(|set| {
            set.add_leaf("run", noop());
        });
        let resolver = Resolver::new(&single, &AppOptions::default());
        let Resolution::Leaf(implicit) = resolver.resolve(&strings(&["x"])).unwrap() else {
            panic!("expected leaf");
        };
        assert!(implicit.implicit);
        assert!(implicit.at_root());
        assert_eq!(implicit.command_path(), ["run"]);

        let Resolution::Leaf(named) = resolver.resolve(&strings(&["run"])).unwrap() else {
            panic!("expected leaf");
        };
        assert!(!named.at_root());
    }

    #[test]
    fn group_without_token_is_index() {
        let tree = nested();
        let resolver = Resolver::new(&tree, &AppOptions::default());
        let Resolution::Group(group) = resolver.resolve(&strings(&["nested"])).unwrap() else {
            panic!("expected group");
        };
        assert_eq!(group.group.name(), "nested");
        assert!(!group.at_root());
    }

    #[test]
    fn option_token_stops_descent() {
        let tree = nested();
        let resolver = Resolver::new(&tree, &AppOptions::default());
        let resolution = resolver.resolve(&strings(&["--help", "nested"])).unwrap();
        assert!(matches!(resolution, Resolution::Group(ref g) if g.at_root()));
        assert_eq!(resolution.consumed(), 0);
    }

    #[test]
    fn unknown_command_suggests_similar() {
        let tree = nested();
        let resolver = Resolver::new(&tree, &AppOptions::default());
        let err = resolver.resolve(&strings(&["axit-mode"])).unwrap_err();
        let ResolveError::UnknownCommand {
            token, suggestions, ..
        } = err;
        assert_eq!(token, "axit-mode");
        assert_eq!(suggestions, vec!["exit-code"]);
    }

    #[test]
    fn single_leaf_runs_without_name() {
        let tree = tree(|set| {
            set.add_leaf("hello", noop());
        });
        let resolver = Resolver::new(&tree, &AppOptions::default());

        let Resolution::Leaf(leaf) = resolver.resolve(&strings(&["Karen"])).unwrap() else {
            panic!("expected leaf");
        };
        assert!(leaf.implicit);
        assert_eq!(leaf.consumed, 0);
        assert_eq!(leaf.command_path(), ["hello"]);

        let Resolution::Leaf(named) = resolver.resolve(&strings(&["hello", "Karen"])).unwrap()
        else {
            panic!("expected leaf");
        };
        assert!(!named.implicit);
        assert_eq!(named.consumed, 1);
    }

    #[test]
    fn single_leaf_with_arguments_keeps_its_name_as_value() {
        let tree = tree(|set| {
            set.add_leaf("hello", noop())
                .param(Param::argument("name", ValueType::String));
        });
        let resolver = Resolver::new(&tree, &AppOptions::default());

        let Resolution::Leaf(leaf) = resolver.resolve(&strings(&["hello"])).unwrap() else {
            panic!("expected leaf");
        };
        assert!(leaf.implicit);
        assert_eq!(leaf.consumed, 0);
    }

    #[test]
    fn default_leaf_takes_unmatched_tokens() {
        let tree = tree(|set| {
            set.add_leaf("run", noop());
            set.add_leaf("list", noop());
            set.set_default_leaf("run");
        });
        let resolver = Resolver::new(&tree, &AppOptions::default());
        let Resolution::Leaf(leaf) = resolver.resolve(&strings(&["file.txt"])).unwrap() else {
            panic!("expected leaf");
        };
        assert_eq!(leaf.leaf.name(), "run");
        assert_eq!(leaf.consumed, 0);
    }

    #[test]
    fn matching_is_case_sensitive() {
        let tree = nested();
        let resolver = Resolver::new(&tree, &AppOptions::default());
        assert!(resolver.resolve(&strings(&["Nested"])).is_err());
    }
}

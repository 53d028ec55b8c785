//! model::builder
//!
//! Explicit registration of commands into a [`CommandTree`].
//!
//! # Build phases
//!
//! Registration is append-only and produces declarations only. Building
//! runs in two passes over the declarations:
//!
//! 1. Every leaf with its own body is classified and registered under its
//!    normalized path, so forward targets can point anywhere in the tree
//!    regardless of registration order.
//! 2. The node tree is assembled, sibling names are checked for
//!    uniqueness, and forward targets are resolved against the registry.
//!
//! Building consumes the builder; a tree cannot be extended afterwards.

use std::collections::HashMap;
use std::sync::Arc;

use super::body::CommandBody;
use super::param::{Param, ParameterList};
use super::{
    BuildError, BuiltInAction, ChildNode, CommandNode, CommandTree, Forwarded, GroupNode,
    Invocable, LeafAction, LeafFilters, LeafNode,
};
use crate::core::config::schema::NameCase;
use crate::core::naming::to_kebab_case;
use crate::core::types::{CommandName, ProgramInfo};
use crate::engine::pipeline::{CommandFilter, FilterDescriptor, FilterScope};

/// Where a forwarding leaf sends its invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ForwardTarget {
    /// Another leaf, addressed by its path from the root.
    Command(Vec<String>),
    /// Help for the group enclosing the forwarding leaf.
    ShowHelp,
    /// The program version.
    ShowVersion,
}

impl ForwardTarget {
    /// Target a leaf by path segments.
    pub fn command<I, S>(path: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ForwardTarget::Command(path.into_iter().map(Into::into).collect())
    }
}

#[derive(Debug)]
enum LeafSource {
    Body(CommandBody),
    Forward(ForwardTarget),
}

/// A leaf registration. Returned by [`CommandSetBuilder::add_leaf`] for
/// further configuration.
#[derive(Debug)]
pub struct LeafDecl {
    name: String,
    aliases: Vec<String>,
    description: String,
    params: Vec<Param>,
    filters: LeafFilters,
    source: LeafSource,
}

impl LeafDecl {
    fn new(name: String, source: LeafSource) -> Self {
        Self {
            name,
            aliases: Vec::new(),
            description: String::new(),
            params: Vec::new(),
            filters: LeafFilters::default(),
            source,
        }
    }

    /// Append one parameter declaration.
    pub fn param(&mut self, param: Param) -> &mut Self {
        self.params.push(param);
        self
    }

    /// Append several parameter declarations in order.
    pub fn params(&mut self, params: impl IntoIterator<Item = Param>) -> &mut Self {
        self.params.extend(params);
        self
    }

    pub fn alias(&mut self, alias: impl Into<String>) -> &mut Self {
        self.aliases.push(alias.into());
        self
    }

    pub fn description(&mut self, description: impl Into<String>) -> &mut Self {
        self.description = description.into();
        self
    }

    /// Attach a declaration-site filter (leaf scope).
    pub fn filter(&mut self, filter: impl CommandFilter + 'static) -> &mut Self {
        self.filters
            .declared
            .push(FilterDescriptor::new(FilterScope::Leaf, filter));
        self
    }

    /// Attach a filter to this registration (invocation scope, innermost).
    pub fn with_filter(&mut self, filter: impl CommandFilter + 'static) -> &mut Self {
        self.filters
            .invocation
            .push(FilterDescriptor::new(FilterScope::Invocation, filter));
        self
    }
}

/// A group registration.
#[derive(Debug)]
pub struct GroupDecl {
    name: String,
    aliases: Vec<String>,
    description: String,
    commands: CommandSetBuilder,
}

impl GroupDecl {
    pub fn alias(&mut self, alias: impl Into<String>) -> &mut Self {
        self.aliases.push(alias.into());
        self
    }

    pub fn description(&mut self, description: impl Into<String>) -> &mut Self {
        self.description = description.into();
        self
    }
}

#[derive(Debug, Clone, Copy)]
enum Entry {
    Leaf(usize),
    Group(usize),
}

/// Registration surface for one scope (the application root or a group).
#[derive(Debug)]
pub struct CommandSetBuilder {
    scope: FilterScope,
    filters: Vec<FilterDescriptor>,
    leaves: Vec<(LeafDecl, usize)>,
    groups: Vec<(GroupDecl, usize)>,
    order: Vec<Entry>,
    default_leaf: Option<String>,
}

impl CommandSetBuilder {
    pub(crate) fn new(scope: FilterScope) -> Self {
        Self {
            scope,
            filters: Vec::new(),
            leaves: Vec::new(),
            groups: Vec::new(),
            order: Vec::new(),
            default_leaf: None,
        }
    }

    /// Register a filter for this scope.
    ///
    /// The filter wraps every command registered after this call in this
    /// scope and below; commands registered earlier are not affected.
    pub fn use_filter(&mut self, filter: impl CommandFilter + 'static) -> &mut Self {
        self.filters.push(FilterDescriptor::new(self.scope, filter));
        self
    }

    /// Register an executable command.
    pub fn add_leaf(&mut self, name: impl Into<String>, body: CommandBody) -> &mut LeafDecl {
        self.push_leaf(LeafDecl::new(name.into(), LeafSource::Body(body)))
    }

    /// Register a command that runs another command's parameters and body,
    /// or a built-in action, under its own name.
    pub fn add_forwarded_leaf(
        &mut self,
        name: impl Into<String>,
        target: ForwardTarget,
    ) -> &mut LeafDecl {
        self.push_leaf(LeafDecl::new(name.into(), LeafSource::Forward(target)))
    }

    /// Register a group and its children.
    pub fn add_group(
        &mut self,
        name: impl Into<String>,
        configure: impl FnOnce(&mut CommandSetBuilder),
    ) -> &mut GroupDecl {
        let mut commands = CommandSetBuilder::new(FilterScope::Group);
        configure(&mut commands);

        let visible = self.filters.len();
        self.groups.push((
            GroupDecl {
                name: name.into(),
                aliases: Vec::new(),
                description: String::new(),
                commands,
            },
            visible,
        ));
        let index = self.groups.len() - 1;
        self.order.push(Entry::Group(index));
        &mut self.groups[index].0
    }

    /// Run the named leaf when no child token matches.
    pub fn set_default_leaf(&mut self, name: impl Into<String>) -> &mut Self {
        self.default_leaf = Some(name.into());
        self
    }

    fn push_leaf(&mut self, decl: LeafDecl) -> &mut LeafDecl {
        let visible = self.filters.len();
        self.leaves.push((decl, visible));
        let index = self.leaves.len() - 1;
        self.order.push(Entry::Leaf(index));
        &mut self.leaves[index].0
    }

    /// Build the tree rooted at this scope.
    ///
    /// # Errors
    ///
    /// Returns the first `BuildError` found: invalid or duplicate names,
    /// parameter classification failures, a missing default leaf, or a
    /// forward target that is not a leaf with its own body.
    pub(crate) fn build_tree(
        self,
        program: ProgramInfo,
        case: NameCase,
    ) -> Result<CommandTree, BuildError> {
        let ctx = BuildContext { case };

        let mut registry = HashMap::new();
        ctx.register(&self, &[], &mut registry)?;

        let root = ctx.assemble(
            self,
            GroupHeader {
                name: program.name.clone(),
                aliases: Vec::new(),
                description: program.description.clone(),
            },
            &[],
            &registry,
        )?;
        tracing::debug!(program = %program.name, "command tree built");
        Ok(CommandTree::new(program, root))
    }
}

struct GroupHeader {
    name: String,
    aliases: Vec<String>,
    description: String,
}

#[derive(Clone)]
struct Registered {
    invocable: Arc<Invocable>,
    filters: LeafFilters,
}

type Registry = HashMap<Vec<String>, Registered>;

struct BuildContext {
    case: NameCase,
}

impl BuildContext {
    fn normalize(&self, name: &str) -> Result<String, BuildError> {
        let converted = match self.case {
            NameCase::Kebab => to_kebab_case(name),
            NameCase::Verbatim => name.to_string(),
        };
        Ok(CommandName::new(converted)?.as_str().to_string())
    }

    fn child_path(&self, prefix: &[String], name: &str) -> Result<Vec<String>, BuildError> {
        let mut path = prefix.to_vec();
        path.push(self.normalize(name)?);
        Ok(path)
    }

    fn register(
        &self,
        set: &CommandSetBuilder,
        prefix: &[String],
        registry: &mut Registry,
    ) -> Result<(), BuildError> {
        for (decl, _) in &set.leaves {
            let LeafSource::Body(body) = &decl.source else {
                continue;
            };
            let path = self.child_path(prefix, &decl.name)?;
            let parameters = ParameterList::new(&decl.params)?;
            registry.insert(
                path,
                Registered {
                    invocable: Arc::new(Invocable {
                        parameters,
                        body: body.clone(),
                    }),
                    filters: decl.filters.clone(),
                },
            );
        }
        for (decl, _) in &set.groups {
            let path = self.child_path(prefix, &decl.name)?;
            self.register(&decl.commands, &path, registry)?;
        }
        Ok(())
    }

    fn assemble(
        &self,
        set: CommandSetBuilder,
        header: GroupHeader,
        prefix: &[String],
        registry: &Registry,
    ) -> Result<GroupNode, BuildError> {
        let scope = if prefix.is_empty() {
            header.name.clone()
        } else {
            prefix.join(" ")
        };

        let CommandSetBuilder {
            filters,
            leaves,
            groups,
            order,
            default_leaf,
            ..
        } = set;

        let mut leaves: Vec<Option<(LeafDecl, usize)>> = leaves.into_iter().map(Some).collect();
        let mut groups: Vec<Option<(GroupDecl, usize)>> = groups.into_iter().map(Some).collect();

        let mut children: Vec<ChildNode> = Vec::with_capacity(order.len());
        let mut taken: Vec<String> = Vec::new();

        for entry in order {
            let child = match entry {
                Entry::Leaf(i) => match leaves.get_mut(i).and_then(Option::take) {
                    Some((decl, visible)) => ChildNode {
                        node: CommandNode::Leaf(self.leaf(decl, prefix, registry)?),
                        visible_filters: visible,
                    },
                    None => continue,
                },
                Entry::Group(i) => match groups.get_mut(i).and_then(Option::take) {
                    Some((decl, visible)) => {
                        let path = self.child_path(prefix, &decl.name)?;
                        let header = GroupHeader {
                            name: self.normalize(&decl.name)?,
                            aliases: self.aliases(&decl.aliases)?,
                            description: decl.description,
                        };
                        ChildNode {
                            node: CommandNode::Group(self.assemble(
                                decl.commands,
                                header,
                                &path,
                                registry,
                            )?),
                            visible_filters: visible,
                        }
                    }
                    None => continue,
                },
            };

            let names = std::iter::once(child.node.name())
                .chain(child.node.aliases().iter().map(String::as_str));
            for name in names {
                if taken.iter().any(|t| t == name) {
                    return Err(BuildError::DuplicateCommand {
                        scope: scope.clone(),
                        name: name.to_string(),
                    });
                }
                taken.push(name.to_string());
            }
            children.push(child);
        }

        let default_leaf = match default_leaf {
            Some(name) => {
                let normalized = self.normalize(&name)?;
                let index = children
                    .iter()
                    .position(|c| {
                        matches!(c.node, CommandNode::Leaf(_)) && c.node.name() == normalized
                    })
                    .ok_or(BuildError::DefaultLeafNotFound {
                        scope: scope.clone(),
                        name,
                    })?;
                Some(index)
            }
            None => None,
        };

        Ok(GroupNode {
            name: header.name,
            aliases: header.aliases,
            description: header.description,
            filters,
            children,
            default_leaf,
        })
    }

    fn aliases(&self, aliases: &[String]) -> Result<Vec<String>, BuildError> {
        aliases
            .iter()
            .map(|a| Ok(CommandName::new(a.clone())?.as_str().to_string()))
            .collect()
    }

    fn leaf(
        &self,
        decl: LeafDecl,
        prefix: &[String],
        registry: &Registry,
    ) -> Result<LeafNode, BuildError> {
        let name = self.normalize(&decl.name)?;
        let aliases = self.aliases(&decl.aliases)?;

        let action = match decl.source {
            LeafSource::Body(_) => {
                let path = self.child_path(prefix, &decl.name)?;
                let registered =
                    registry
                        .get(&path)
                        .ok_or_else(|| BuildError::ForwardTargetNotFound {
                            target: path.join(" "),
                        })?;
                LeafAction::Invoke(Arc::clone(&registered.invocable))
            }
            LeafSource::Forward(target) => {
                if !decl.params.is_empty() {
                    return Err(BuildError::ForwardedLeafHasParameters { name });
                }
                match target {
                    ForwardTarget::ShowHelp => LeafAction::BuiltIn(BuiltInAction::ShowHelp),
                    ForwardTarget::ShowVersion => LeafAction::BuiltIn(BuiltInAction::ShowVersion),
                    ForwardTarget::Command(segments) => {
                        let target = segments
                            .iter()
                            .map(|s| self.normalize(s))
                            .collect::<Result<Vec<_>, _>>()?;
                        let registered = registry.get(&target).ok_or_else(|| {
                            BuildError::ForwardTargetNotFound {
                                target: segments.join(" "),
                            }
                        })?;
                        tracing::debug!(leaf = %name, target = %target.join(" "), "forward resolved");
                        LeafAction::Forward(Forwarded {
                            target,
                            invocable: Arc::clone(&registered.invocable),
                            target_filters: registered.filters.clone(),
                        })
                    }
                }
            }
        };

        Ok(LeafNode {
            name,
            aliases,
            description: decl.description,
            filters: decl.filters,
            action,
        })
    }
}

//! model::param
//!
//! Parameter declarations, classification, and flattening.
//!
//! # Overview
//!
//! A host registers parameters as [`Param`] declarations: a member name, a
//! value type and an optional marker (argument, option, service, group).
//! At build time each declaration is classified into a
//! [`ParameterDescriptor`]:
//!
//! 1. An explicit argument marker wins.
//! 2. An explicit service marker wins.
//! 3. A group marker classifies its members recursively (one level deep).
//! 4. Everything else is a named option whose long name is the member
//!    name in kebab-case.
//!
//! [`ParameterList`] then flattens groups into the owning command's
//! binding order, at the position the group itself occupies.
//!
//! # Invariants
//!
//! - Positional order is the declared order after flattening
//! - Only the last positional argument may be an array
//! - Option long names and short aliases are unique within a command

use std::any::Any;

use super::value::{Value, ValueType};
use super::BuildError;
use crate::completion::source::{Candidate, CandidateProvider, CandidateSource};
use crate::core::naming::to_kebab_case;
use crate::engine::services::ServiceKey;

#[derive(Debug, Clone)]
enum Marker {
    Unmarked,
    Argument,
    Option,
    Service(ServiceKey),
    Group(Vec<Param>),
}

/// A parameter declaration, as produced by command discovery.
///
/// # Example
///
/// ```
/// use trellis::model::{Param, ValueType};
///
/// let params = vec![
///     Param::option("a", ValueType::Int),
///     Param::option("b", ValueType::String).stop_parsing(),
///     Param::argument("arg0", ValueType::String),
///     Param::argument("args", ValueType::array(ValueType::String)),
/// ];
/// assert_eq!(params.len(), 4);
/// ```
#[derive(Debug, Clone)]
pub struct Param {
    member: String,
    marker: Marker,
    value_type: ValueType,
    name: Option<String>,
    short: Option<char>,
    default: Option<Value>,
    optional: bool,
    stop_parsing: bool,
    description: String,
    candidates: Option<CandidateSource>,
}

impl Param {
    fn with_marker(member: impl Into<String>, marker: Marker, value_type: ValueType) -> Self {
        Self {
            member: member.into(),
            marker,
            value_type,
            name: None,
            short: None,
            default: None,
            optional: false,
            stop_parsing: false,
            description: String::new(),
            candidates: None,
        }
    }

    /// An unmarked parameter; classified as a named option.
    pub fn new(member: impl Into<String>, value_type: ValueType) -> Self {
        Self::with_marker(member, Marker::Unmarked, value_type)
    }

    /// A positional argument.
    pub fn argument(member: impl Into<String>, value_type: ValueType) -> Self {
        Self::with_marker(member, Marker::Argument, value_type)
    }

    /// A named option.
    pub fn option(member: impl Into<String>, value_type: ValueType) -> Self {
        Self::with_marker(member, Marker::Option, value_type)
    }

    /// A boolean flag option.
    pub fn flag(member: impl Into<String>) -> Self {
        Self::with_marker(member, Marker::Option, ValueType::Bool)
    }

    /// A parameter resolved by the service resolver instead of the command line.
    pub fn service<T: Any + Send + Sync>(member: impl Into<String>) -> Self {
        Self::with_marker(member, Marker::Service(ServiceKey::of::<T>()), ValueType::String)
    }

    /// A reusable group of parameters, flattened into the owning command.
    pub fn group(member: impl Into<String>, members: Vec<Param>) -> Self {
        Self::with_marker(member, Marker::Group(members), ValueType::String)
    }

    /// Override the derived long name (options) or display name (arguments).
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Single-character short alias (options only).
    pub fn short(mut self, alias: char) -> Self {
        self.short = Some(alias);
        self
    }

    /// Value used when the parameter is absent.
    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Allow the parameter to be absent without a default.
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// After this option is consumed, every remaining token is positional.
    pub fn stop_parsing(mut self) -> Self {
        self.stop_parsing = true;
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Static completion candidates.
    pub fn candidates<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values = values.into_iter().map(|v| Candidate::new(v, "")).collect();
        self.candidates = Some(CandidateSource::Static(values));
        self
    }

    /// Completion candidates computed on the fly.
    pub fn candidates_from(mut self, provider: impl CandidateProvider + 'static) -> Self {
        self.candidates = Some(CandidateSource::provider(provider));
        self
    }
}

/// A classified positional argument.
#[derive(Debug, Clone)]
pub struct ArgumentDescriptor {
    pub name: String,
    pub member: String,
    pub value_type: ValueType,
    pub default: Option<Value>,
    pub optional: bool,
    pub description: String,
    pub candidates: Option<CandidateSource>,
}

impl ArgumentDescriptor {
    /// Arrays accept zero tokens, so they are never required.
    pub fn is_required(&self) -> bool {
        self.default.is_none() && !self.optional && !self.value_type.is_array()
    }
}

/// A classified named option.
#[derive(Debug, Clone)]
pub struct OptionDescriptor {
    /// Long name, without the leading `--`.
    pub name: String,
    pub member: String,
    pub short: Option<char>,
    pub value_type: ValueType,
    pub default: Option<Value>,
    pub optional: bool,
    pub stop_parsing: bool,
    pub description: String,
    pub candidates: Option<CandidateSource>,
}

impl OptionDescriptor {
    pub fn is_flag(&self) -> bool {
        self.value_type.is_flag()
    }

    pub fn is_required(&self) -> bool {
        self.default.is_none() && !self.is_flag() && !self.optional
    }
}

/// A parameter supplied by the service resolver.
#[derive(Debug, Clone)]
pub struct ServiceDescriptor {
    pub member: String,
    pub key: ServiceKey,
}

/// A classified parameter group.
#[derive(Debug, Clone)]
pub struct GroupDescriptor {
    pub member: String,
    pub members: Vec<ParameterDescriptor>,
}

/// A classified parameter declaration.
#[derive(Debug, Clone)]
pub enum ParameterDescriptor {
    Argument(ArgumentDescriptor),
    Option(OptionDescriptor),
    Service(ServiceDescriptor),
    Group(GroupDescriptor),
}

/// A parameter in flattened binding order.
#[derive(Debug, Clone)]
pub enum FlatParameter {
    Argument(ArgumentDescriptor),
    Option(OptionDescriptor),
    Service(ServiceDescriptor),
}

impl FlatParameter {
    pub fn member(&self) -> &str {
        match self {
            FlatParameter::Argument(a) => &a.member,
            FlatParameter::Option(o) => &o.member,
            FlatParameter::Service(s) => &s.member,
        }
    }
}

/// Classify a list of declarations.
///
/// # Errors
///
/// Returns a `BuildError` for groups nested more than one level deep,
/// stop-parsing on a non-option, nested array types, or a default value
/// that does not fit the declared type.
pub fn classify(params: &[Param]) -> Result<Vec<ParameterDescriptor>, BuildError> {
    params.iter().map(|p| classify_one(p, 0)).collect()
}

fn classify_one(param: &Param, depth: usize) -> Result<ParameterDescriptor, BuildError> {
    if let ValueType::Array(inner) = &param.value_type {
        if inner.is_array() {
            return Err(BuildError::NestedArray {
                parameter: param.member.clone(),
            });
        }
    }

    if let Some(default) = &param.default {
        if !param.value_type.accepts(default) {
            return Err(BuildError::DefaultTypeMismatch {
                parameter: param.member.clone(),
                value: default.to_string(),
                expected: param.value_type.to_string(),
            });
        }
    }

    let descriptor = match &param.marker {
        Marker::Argument => {
            if param.stop_parsing {
                return Err(BuildError::StopParsingRequiresOption {
                    parameter: param.member.clone(),
                });
            }
            ParameterDescriptor::Argument(ArgumentDescriptor {
                name: param
                    .name
                    .clone()
                    .unwrap_or_else(|| to_kebab_case(&param.member)),
                member: param.member.clone(),
                value_type: param.value_type.clone(),
                default: param.default.clone(),
                optional: param.optional,
                description: param.description.clone(),
                candidates: param.candidates.clone(),
            })
        }
        Marker::Service(key) => ParameterDescriptor::Service(ServiceDescriptor {
            member: param.member.clone(),
            key: *key,
        }),
        Marker::Group(members) => {
            if depth > 0 {
                return Err(BuildError::NestedParameterGroup {
                    group: param.member.clone(),
                });
            }
            let members = members
                .iter()
                .map(|m| classify_one(m, depth + 1))
                .collect::<Result<Vec<_>, _>>()?;
            ParameterDescriptor::Group(GroupDescriptor {
                member: param.member.clone(),
                members,
            })
        }
        Marker::Option | Marker::Unmarked => {
            let name = param
                .name
                .clone()
                .unwrap_or_else(|| to_kebab_case(&param.member));
            if name.is_empty() || name.starts_with('-') || name.contains('=') {
                return Err(BuildError::InvalidOptionName { name });
            }
            ParameterDescriptor::Option(OptionDescriptor {
                name,
                member: param.member.clone(),
                short: param.short,
                value_type: param.value_type.clone(),
                default: param.default.clone(),
                optional: param.optional,
                stop_parsing: param.stop_parsing,
                description: param.description.clone(),
                candidates: param.candidates.clone(),
            })
        }
    };
    Ok(descriptor)
}

/// The classified parameters of one command, with the flattened binding order.
#[derive(Debug, Clone, Default)]
pub struct ParameterList {
    declared: Vec<ParameterDescriptor>,
    flat: Vec<FlatParameter>,
}

impl ParameterList {
    /// Classify, flatten, and validate a command's declarations.
    ///
    /// # Errors
    ///
    /// Returns a `BuildError` when classification fails or the flattened
    /// list violates a uniqueness or ordering invariant.
    pub fn new(params: &[Param]) -> Result<Self, BuildError> {
        let declared = classify(params)?;

        let mut flat = Vec::new();
        for descriptor in &declared {
            flatten_into(descriptor, &mut flat);
        }

        let list = Self { declared, flat };
        list.validate()?;
        Ok(list)
    }

    fn validate(&self) -> Result<(), BuildError> {
        let mut members: Vec<&str> = Vec::new();
        let mut long_names: Vec<&str> = Vec::new();
        let mut shorts: Vec<char> = Vec::new();

        for param in &self.flat {
            if members.contains(&param.member()) {
                return Err(BuildError::DuplicateParameter {
                    name: param.member().to_string(),
                });
            }
            members.push(param.member());

            if let FlatParameter::Option(option) = param {
                if long_names.contains(&option.name.as_str()) {
                    return Err(BuildError::DuplicateParameter {
                        name: option.name.clone(),
                    });
                }
                long_names.push(&option.name);

                if let Some(alias) = option.short {
                    if shorts.contains(&alias) {
                        return Err(BuildError::DuplicateShortAlias { alias });
                    }
                    shorts.push(alias);
                }
            }
        }

        let arguments: Vec<&ArgumentDescriptor> = self.arguments().collect();
        if let Some((_, init)) = arguments.split_last() {
            if let Some(variadic) = init.iter().find(|a| a.value_type.is_array()) {
                return Err(BuildError::VariadicArgumentNotLast {
                    argument: variadic.name.clone(),
                });
            }
        }
        Ok(())
    }

    /// Descriptors as declared (groups not flattened).
    pub fn declared(&self) -> &[ParameterDescriptor] {
        &self.declared
    }

    /// Parameters in binding order, groups spliced in place.
    pub fn flat(&self) -> &[FlatParameter] {
        &self.flat
    }

    pub fn options(&self) -> impl Iterator<Item = &OptionDescriptor> {
        self.flat.iter().filter_map(|p| match p {
            FlatParameter::Option(o) => Some(o),
            _ => None,
        })
    }

    pub fn arguments(&self) -> impl Iterator<Item = &ArgumentDescriptor> {
        self.flat.iter().filter_map(|p| match p {
            FlatParameter::Argument(a) => Some(a),
            _ => None,
        })
    }

    pub fn services(&self) -> impl Iterator<Item = &ServiceDescriptor> {
        self.flat.iter().filter_map(|p| match p {
            FlatParameter::Service(s) => Some(s),
            _ => None,
        })
    }

    /// Find an option by its long name.
    pub fn option(&self, long: &str) -> Option<&OptionDescriptor> {
        self.options().find(|o| o.name == long)
    }

    /// Find an argument by its display name.
    pub fn argument(&self, name: &str) -> Option<&ArgumentDescriptor> {
        self.arguments().find(|a| a.name == name)
    }

    /// Whether any option claims `alias` as its short name.
    pub fn claims_short(&self, alias: char) -> bool {
        self.options().any(|o| o.short == Some(alias))
    }

    pub fn is_empty(&self) -> bool {
        self.flat.is_empty()
    }
}

fn flatten_into(descriptor: &ParameterDescriptor, flat: &mut Vec<FlatParameter>) {
    match descriptor {
        ParameterDescriptor::Argument(a) => flat.push(FlatParameter::Argument(a.clone())),
        ParameterDescriptor::Option(o) => flat.push(FlatParameter::Option(o.clone())),
        ParameterDescriptor::Service(s) => flat.push(FlatParameter::Service(s.clone())),
        ParameterDescriptor::Group(g) => {
            for member in &g.members {
                flatten_into(member, flat);
            }
        }
    }
}

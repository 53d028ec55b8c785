//! engine::binder
//!
//! Binding a [`ParsedCommandLine`] to a command's parameters.
//!
//! # Algorithm
//!
//! 1. Service parameters are resolved first; the first failure aborts
//!    binding with `ServiceResolutionFailed`.
//! 2. Unknown options are reported.
//! 3. Options are looked up by long name (short aliases were mapped by the
//!    tokenizer). Absent options take their default; flags default to
//!    `false`; anything else absent is `RequiredOptionMissing`.
//! 4. Positional arguments consume tokens in declared order. A trailing
//!    array argument consumes every remaining token.
//!
//! Steps 2 to 4 collect every error before returning.

use std::any::Any;
use std::sync::Arc;

use thiserror::Error;

use super::convert::convert;
use super::services::{ServiceError, ServiceRef, ServiceResolver};
use crate::model::{ArgumentDescriptor, FromValue, OptionDescriptor, ParameterList, Value};
use crate::parse::ParsedCommandLine;

/// Errors from binding.
#[derive(Debug, Error)]
pub enum BindError {
    #[error("Option '--{option}' is required.")]
    RequiredOptionMissing { option: String },

    #[error("Argument '{argument}' is required.")]
    RequiredArgumentMissing { argument: String },

    #[error("{parameter} requires {target} value. '{raw}' is not a valid {target}.")]
    ValueConversionFailed {
        /// `Option '--name'` or `Argument 'name'`.
        parameter: String,
        raw: String,
        target: String,
    },

    #[error("Unknown option '{option}'.")]
    UnknownOption { option: String },

    #[error("Service for parameter '{member}' could not be resolved: {source}")]
    ServiceResolutionFailed {
        member: String,
        #[source]
        source: ServiceError,
    },
}

/// Values bound for one invocation, keyed by member name.
#[derive(Debug, Clone, Default)]
pub struct BoundArguments {
    values: Vec<(String, Value)>,
    services: Vec<(String, ServiceRef)>,
}

impl BoundArguments {
    pub fn value(&self, member: &str) -> Option<&Value> {
        self.values
            .iter()
            .find(|(name, _)| name == member)
            .map(|(_, value)| value)
    }

    pub fn get<T: FromValue>(&self, member: &str) -> Option<T> {
        self.value(member).and_then(T::from_value)
    }

    /// Whether a value was bound (explicitly or from a default).
    pub fn contains(&self, member: &str) -> bool {
        self.value(member).is_some()
    }

    pub fn service<T: Any + Send + Sync>(&self, member: &str) -> Option<Arc<T>> {
        self.services
            .iter()
            .find(|(name, _)| name == member)
            .and_then(|(_, service)| Arc::clone(service).downcast::<T>().ok())
    }

    /// Bound values in binding order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(name, value)| (name.as_str(), value))
    }
}

/// Bind `parsed` to `parameters`.
///
/// # Errors
///
/// Returns every binding error found, or the single service failure.
pub async fn bind(
    parameters: &ParameterList,
    parsed: &ParsedCommandLine,
    services: &dyn ServiceResolver,
) -> Result<BoundArguments, Vec<BindError>> {
    let mut bound = BoundArguments::default();

    for service in parameters.services() {
        let resolved = services.resolve(service.key).await.map_err(|source| {
            vec![BindError::ServiceResolutionFailed {
                member: service.member.clone(),
                source,
            }]
        })?;
        bound.services.push((service.member.clone(), resolved));
    }

    let mut errors: Vec<BindError> = parsed
        .unknown_options()
        .iter()
        .map(|o| BindError::UnknownOption {
            option: o.name.clone(),
        })
        .collect();

    for option in parameters.options() {
        match bind_option(option, parsed) {
            Ok(Some(value)) => bound.values.push((option.member.clone(), value)),
            Ok(None) => {}
            Err(e) => errors.push(e),
        }
    }

    let tokens = parsed.arguments();
    let mut next = 0;
    for argument in parameters.arguments() {
        let raw: &[String] = if argument.value_type.is_array() {
            let rest = &tokens[next.min(tokens.len())..];
            next = tokens.len();
            rest
        } else if let Some(token) = tokens.get(next) {
            next += 1;
            std::slice::from_ref(token)
        } else {
            &[]
        };

        match bind_argument(argument, raw) {
            Ok(Some(value)) => bound.values.push((argument.member.clone(), value)),
            Ok(None) => {}
            Err(e) => errors.extend(e),
        }
    }

    if next < tokens.len() {
        tracing::warn!(ignored = ?&tokens[next..], "extra positional arguments ignored");
    }

    if errors.is_empty() {
        tracing::debug!(count = bound.values.len(), "arguments bound");
        Ok(bound)
    } else {
        Err(errors)
    }
}

fn bind_option(
    option: &OptionDescriptor,
    parsed: &ParsedCommandLine,
) -> Result<Option<Value>, BindError> {
    let occurrences: Vec<Option<&str>> = parsed.values(&option.name).collect();
    let failed = |raw: &str, target: String| BindError::ValueConversionFailed {
        parameter: format!("Option '--{}'", option.name),
        raw: raw.to_string(),
        target,
    };

    if occurrences.is_empty() {
        return match &option.default {
            Some(default) => Ok(Some(default.clone())),
            None if option.is_flag() => Ok(Some(Value::Bool(false))),
            None if option.optional => Ok(None),
            None => Err(BindError::RequiredOptionMissing {
                option: option.name.clone(),
            }),
        };
    }

    if option.value_type.is_array() {
        let items = occurrences
            .iter()
            .map(|raw| {
                let raw = raw.unwrap_or("true");
                convert(raw, &option.value_type).map_err(|target| failed(raw, target))
            })
            .collect::<Result<Vec<_>, _>>()?;
        return Ok(Some(Value::Array(items)));
    }

    match occurrences.last().copied().flatten() {
        Some(raw) => convert(raw, &option.value_type)
            .map(Some)
            .map_err(|target| failed(raw, target)),
        None => Ok(Some(Value::Bool(true))),
    }
}

fn bind_argument(
    argument: &ArgumentDescriptor,
    raw: &[String],
) -> Result<Option<Value>, Vec<BindError>> {
    let failed = |raw: &str, target: String| BindError::ValueConversionFailed {
        parameter: format!("Argument '{}'", argument.name),
        raw: raw.to_string(),
        target,
    };

    if argument.value_type.is_array() {
        if raw.is_empty() {
            if let Some(default) = &argument.default {
                return Ok(Some(default.clone()));
            }
        }
        let mut items = Vec::with_capacity(raw.len());
        let mut errors = Vec::new();
        for token in raw {
            match convert(token, &argument.value_type) {
                Ok(value) => items.push(value),
                Err(target) => errors.push(failed(token, target)),
            }
        }
        return if errors.is_empty() {
            Ok(Some(Value::Array(items)))
        } else {
            Err(errors)
        };
    }

    match raw.first() {
        Some(token) => convert(token, &argument.value_type)
            .map(Some)
            .map_err(|target| vec![failed(token, target)]),
        None => match &argument.default {
            Some(default) => Ok(Some(default.clone())),
            None if argument.optional => Ok(None),
            None => Err(vec![BindError::RequiredArgumentMissing {
                argument: argument.name.clone(),
            }]),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::services::ServiceCollection;
    use crate::model::{Param, ValueType};
    use crate::parse::{tokenize, OptionTable};

    fn strings(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|s| s.to_string()).collect()
    }

    fn bind_tokens(
        params: &[Param],
        tokens: &[&str],
    ) -> Result<BoundArguments, Vec<BindError>> {
        let parameters = ParameterList::new(params).unwrap();
        let parsed = tokenize(&strings(tokens), &OptionTable::from_parameters(&parameters)).unwrap();
        tokio_test::block_on(bind(&parameters, &parsed, &ServiceCollection::new()))
    }

    #[test]
    fn stop_parsing_example_binds() {
        let bound = bind_tokens(
            &[
                Param::option("a", ValueType::Int),
                Param::option("b", ValueType::String).stop_parsing(),
                Param::argument("arg0", ValueType::String),
                Param::argument("args", ValueType::array(ValueType::String)),
            ],
            &["--a", "123", "--b", "valueB", "A", "B", "C", "D"],
        )
        .unwrap();

        assert_eq!(bound.get::<i64>("a"), Some(123));
        assert_eq!(bound.get::<String>("b").as_deref(), Some("valueB"));
        assert_eq!(bound.get::<String>("arg0").as_deref(), Some("A"));
        assert_eq!(
            bound.get::<Vec<String>>("args"),
            Some(vec!["B".into(), "C".into(), "D".into()])
        );
    }

    #[test]
    fn errors_are_collected() {
        let errors = bind_tokens(
            &[
                Param::new("OptionRequired", ValueType::String),
                Param::option("count", ValueType::Int),
                Param::argument("arg0", ValueType::String),
            ],
            &["--count", "many", "--bogus"],
        )
        .unwrap_err();

        let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
        assert_eq!(
            messages,
            vec![
                "Unknown option '--bogus'.",
                "Option '--option-required' is required.",
                "Option '--count' requires Int value. 'many' is not a valid Int.",
                "Argument 'arg0' is required.",
            ]
        );
    }

    #[test]
    fn supplying_required_option_clears_error() {
        let params = [Param::new("OptionRequired", ValueType::String)];
        assert!(bind_tokens(&params, &[]).is_err());

        let bound = bind_tokens(&params, &["--option-required", "alice"]).unwrap();
        assert_eq!(bound.get::<String>("OptionRequired").as_deref(), Some("alice"));
    }

    #[test]
    fn defaults_and_flags() {
        let bound = bind_tokens(
            &[
                Param::flag("verbose"),
                Param::new("greeting", ValueType::String).default("hello"),
                Param::argument("name", ValueType::String).optional(),
            ],
            &[],
        )
        .unwrap();

        assert_eq!(bound.get::<bool>("verbose"), Some(false));
        assert_eq!(bound.get::<String>("greeting").as_deref(), Some("hello"));
        assert!(!bound.contains("name"));
    }

    #[test]
    fn last_occurrence_wins_and_arrays_collect() {
        let bound = bind_tokens(
            &[
                Param::option("name", ValueType::String),
                Param::option("tag", ValueType::array(ValueType::String)),
            ],
            &["--name", "a", "--tag", "x", "--name", "b", "--tag", "y"],
        )
        .unwrap();

        assert_eq!(bound.get::<String>("name").as_deref(), Some("b"));
        assert_eq!(
            bound.get::<Vec<String>>("tag"),
            Some(vec!["x".into(), "y".into()])
        );
    }

    #[test]
    fn array_option_without_default_is_required() {
        let errors = bind_tokens(&[Param::option("tag", ValueType::array(ValueType::String))], &[])
            .unwrap_err();
        assert!(matches!(errors[0], BindError::RequiredOptionMissing { .. }));
    }

    #[test]
    fn flag_accepts_inline_bool() {
        let bound = bind_tokens(&[Param::flag("verbose")], &["--verbose=false"]).unwrap();
        assert_eq!(bound.get::<bool>("verbose"), Some(false));
    }

    #[test]
    fn missing_service_fails_fast() {
        let errors = bind_tokens(
            &[
                Param::service::<String>("name"),
                Param::option("age", ValueType::Int),
            ],
            &[],
        )
        .unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(matches!(
            errors[0],
            BindError::ServiceResolutionFailed { .. }
        ));
    }

    #[tokio::test]
    async fn service_is_bound_by_member() {
        let mut services = ServiceCollection::new();
        services.add_instance(String::from("Alice"));
        let parameters = ParameterList::new(&[Param::service::<String>("name")]).unwrap();
        let parsed = ParsedCommandLine::default();

        let bound = bind(&parameters, &parsed, &services).await.unwrap();
        assert_eq!(bound.service::<String>("name").unwrap().as_str(), "Alice");
        assert!(bound.service::<u32>("name").is_none());
    }
}

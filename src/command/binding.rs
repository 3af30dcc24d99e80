//! Parameter binding from invocation arguments and pipeline records

use super::invocation::CommandInvocation;
use super::{CommandInput, CommandSpec, ParameterSpec};
use crate::error::{Error, Result};
use std::collections::BTreeMap;

/// Parameter values keyed by their declared name
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BoundParameters {
    values: BTreeMap<&'static str, String>,
}

impl BoundParameters {
    /// Value of a parameter (case-insensitive)
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Whether a parameter has a value
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Number of bound parameters
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether nothing is bound
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn set(&mut self, param: &ParameterSpec, value: String) {
        self.values.insert(param.name, value);
    }
}

/// Bind named and positional arguments, ignoring any upstream record
///
/// # Errors
///
/// [`Error::ParameterBinding`] for unknown or repeated parameter names and
/// for positional arguments nothing accepts.
pub fn bind_arguments(spec: &CommandSpec, invocation: &CommandInvocation) -> Result<BoundParameters> {
    let mut bound = BoundParameters::default();

    for (name, value) in invocation.named_args() {
        let param = spec.parameter(name).ok_or_else(|| {
            binding_error(
                spec,
                format!("a parameter cannot be found that matches parameter name '{name}'"),
            )
        })?;
        if bound.contains(param.name) {
            return Err(binding_error(
                spec,
                format!("parameter '{}' was specified more than once", param.name),
            ));
        }
        bound.set(param, value.clone());
    }

    let open: Vec<&ParameterSpec> = spec
        .positional_parameters()
        .filter(|p| !bound.contains(p.name))
        .collect();
    let mut open_positions = open.into_iter();
    for value in invocation.positional_args() {
        let param = open_positions.next().ok_or_else(|| {
            binding_error(
                spec,
                format!("a positional parameter cannot be found that accepts argument '{value}'"),
            )
        })?;
        bound.set(param, value.clone());
    }

    Ok(bound)
}

/// Bind everything an invocation carries and check mandatory parameters
///
/// Explicit arguments win over values taken from the upstream record.
pub fn bind_input(spec: &CommandSpec, invocation: &CommandInvocation) -> Result<CommandInput> {
    let mut parameters = bind_arguments(spec, invocation)?;
    if let Some(record) = invocation.input() {
        bind_record(spec, &mut parameters, record)?;
    }
    check_mandatory(spec, &parameters)?;
    Ok(CommandInput {
        parameters,
        record: invocation.input().cloned(),
    })
}

fn bind_record(
    spec: &CommandSpec,
    parameters: &mut BoundParameters,
    record: &serde_json::Value,
) -> Result<()> {
    let mut bound_any = false;

    match record {
        serde_json::Value::Object(properties) => {
            for param in spec.parameters.iter().filter(|p| p.from_pipeline_by_name) {
                if parameters.contains(param.name) {
                    continue;
                }
                let value = properties
                    .iter()
                    .find(|(k, _)| k.eq_ignore_ascii_case(param.name))
                    .and_then(|(_, v)| scalar_to_string(v));
                if let Some(value) = value {
                    parameters.set(param, value);
                    bound_any = true;
                }
            }
        }
        other => {
            if let Some(value) = scalar_to_string(other)
                && let Some(param) = spec
                    .parameters
                    .iter()
                    .find(|p| p.from_pipeline && !parameters.contains(p.name))
            {
                parameters.set(param, value);
                bound_any = true;
            }
        }
    }

    if bound_any {
        Ok(())
    } else {
        Err(binding_error(
            spec,
            format!("the input object {record} cannot be bound to any parameters"),
        ))
    }
}

fn check_mandatory(spec: &CommandSpec, parameters: &BoundParameters) -> Result<()> {
    match spec
        .parameters
        .iter()
        .find(|p| p.mandatory && !parameters.contains(p.name))
    {
        Some(missing) => Err(binding_error(
            spec,
            format!("missing mandatory parameter '{}'", missing.name),
        )),
        None => Ok(()),
    }
}

fn scalar_to_string(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn binding_error(spec: &CommandSpec, message: String) -> Error {
    Error::ParameterBinding {
        command: spec.name.to_string(),
        message,
    }
}

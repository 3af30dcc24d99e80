//! Commands and their begin/process/end lifecycle
//!
//! A [`Command`] is driven by [`run_lifecycle`]:
//! 1. `begin` once, before any input
//! 2. `process` once per input record (zero times for an empty upstream)
//! 3. `end` once, always, even when earlier phases failed
//!
//! A phase that returns `Err` costs exactly one Error record in the sink;
//! the failure never escapes the lifecycle.

mod binding;
mod get_track;
mod invocation;
mod registry;
mod save_track;

pub use binding::{BoundParameters, bind_arguments, bind_input};
pub use get_track::{GET_TRACK, GetTrackCommand};
pub use invocation::CommandInvocation;
pub use registry::{CommandFactory, CommandRegistry};
pub use save_track::{SAVE_TRACK, SaveTrackCommand};

use crate::Result;
use crate::error::ErrorInfo;
use crate::sink::DiagnosticSink;
use async_trait::async_trait;
use tracing::debug;

/// Declared parameter of a command
#[derive(Debug)]
pub struct ParameterSpec {
    /// Canonical parameter name (e.g. "TrackUrl")
    pub name: &'static str,
    /// Position for positional binding, if the parameter accepts one
    pub position: Option<usize>,
    /// Whether the parameter must be bound before `process` runs
    pub mandatory: bool,
    /// Accepts a scalar upstream record as its value
    pub from_pipeline: bool,
    /// Accepts an upstream object property with the same name
    pub from_pipeline_by_name: bool,
}

/// Declared shape of a command
#[derive(Debug)]
pub struct CommandSpec {
    /// "Verb-Noun" command name
    pub name: &'static str,
    /// Parameters in declaration order
    pub parameters: &'static [ParameterSpec],
}

impl CommandSpec {
    /// Look up a parameter by name (case-insensitive)
    pub fn parameter(&self, name: &str) -> Option<&'static ParameterSpec> {
        self.parameters
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
    }

    /// Parameters that accept positional arguments, by position
    pub fn positional_parameters(&self) -> impl Iterator<Item = &'static ParameterSpec> {
        let mut positional: Vec<&'static ParameterSpec> = self
            .parameters
            .iter()
            .filter(|p| p.position.is_some())
            .collect();
        positional.sort_by_key(|p| p.position);
        positional.into_iter()
    }
}

/// One unit of work handed to [`Command::process`]
#[derive(Clone, Debug, PartialEq)]
pub struct CommandInput {
    /// Parameters bound from arguments and the upstream record
    pub parameters: BoundParameters,
    /// The upstream record this input came from, if any
    pub record: Option<serde_json::Value>,
}

/// A stateful unit of work with a begin/process/end lifecycle
///
/// The default `begin` and `end` write the Verbose markers `"Begin!"` and
/// `"End!"`; commands that override them should keep doing so.
#[async_trait]
pub trait Command: Send {
    /// Runs once before any input is processed
    async fn begin(&mut self, sink: &mut DiagnosticSink) -> Result<()> {
        sink.write_verbose("Begin!");
        Ok(())
    }

    /// Runs once per input
    async fn process(&mut self, input: &CommandInput, sink: &mut DiagnosticSink) -> Result<()>;

    /// Runs once after all inputs, whatever happened before
    async fn end(&mut self, sink: &mut DiagnosticSink) -> Result<()> {
        sink.write_verbose("End!");
        Ok(())
    }
}

/// Drive a command through its lifecycle over a sequence of inputs
///
/// Inputs that failed to bind arrive as `Err` and are reported without
/// calling `process`. If `begin` fails no input is processed, but `end`
/// still runs.
pub async fn run_lifecycle<I>(
    spec: &CommandSpec,
    command: &mut dyn Command,
    inputs: I,
    sink: &mut DiagnosticSink,
) where
    I: IntoIterator<Item = Result<CommandInput>>,
{
    debug!(command = spec.name, "begin");
    let began = match command.begin(sink).await {
        Ok(()) => true,
        Err(e) => {
            sink.write_error(ErrorInfo::from(&e).with_source(spec.name));
            false
        }
    };

    if began {
        let mut processed = 0usize;
        for input in inputs {
            match input {
                Ok(input) => {
                    if let Err(e) = command.process(&input, sink).await {
                        let info = ErrorInfo::from(&e);
                        let info = match input.record {
                            Some(record) => info.with_source(record),
                            None => info,
                        };
                        sink.write_error(info);
                    }
                }
                Err(e) => sink.write_error(ErrorInfo::from(&e).with_source(spec.name)),
            }
            processed += 1;
        }
        debug!(command = spec.name, processed, "inputs processed");
    }

    if let Err(e) = command.end(sink).await {
        sink.write_error(ErrorInfo::from(&e).with_source(spec.name));
    }
    debug!(command = spec.name, "end");
}

//! Script host: parse a script and run its pipelines against a sink
//!
//! Failures come in two tiers:
//! - host-level: the script cannot be parsed or read. Returned as `Err` and
//!   nothing runs.
//! - command-level: an unknown command, a bad argument, or a failing
//!   download. Written to the sink as one Error record; the script keeps
//!   going.

mod script;

pub use script::{Script, ScriptPipeline, parse_script};

use crate::command::{
    Command, CommandInput, CommandInvocation, CommandRegistry, CommandSpec, bind_arguments,
    bind_input, run_lifecycle,
};
use crate::config::Config;
use crate::download::TrackDownloader;
use crate::error::{Error, ErrorInfo, Result};
use crate::sink::DiagnosticSink;
use crate::types::DiagnosticRecord;
use std::path::Path;
use tracing::{debug, info};

/// Runs scripts of registered commands
pub struct ScriptHost {
    registry: CommandRegistry,
}

struct ResolvedStage<'a> {
    spec: &'static CommandSpec,
    command: Box<dyn Command>,
    invocation: &'a CommandInvocation,
}

impl ScriptHost {
    /// Host over an explicit registry
    pub fn new(registry: CommandRegistry) -> Self {
        Self { registry }
    }

    /// Host with the track commands bound to `downloader`
    pub fn with_downloader(downloader: TrackDownloader) -> Self {
        Self::new(CommandRegistry::with_track_commands(downloader))
    }

    /// Host for the real system and remote service
    pub fn from_config(config: Config) -> Result<Self> {
        Ok(Self::with_downloader(TrackDownloader::from_config(config)?))
    }

    /// Commands available to scripts
    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    /// Mutable access for registering extra commands
    pub fn registry_mut(&mut self) -> &mut CommandRegistry {
        &mut self.registry
    }

    /// Run a script and return its Output payloads in order
    ///
    /// # Errors
    ///
    /// Only when the script fails to parse. Command failures are not
    /// returned here; use [`invoke_with_diagnostics`](Self::invoke_with_diagnostics)
    /// to see them.
    pub async fn invoke(&self, script: &str) -> Result<Vec<serde_json::Value>> {
        let mut sink = DiagnosticSink::new();
        self.invoke_into(script, &mut sink).await?;
        Ok(sink.outputs().cloned().collect())
    }

    /// Run a script and return every record it produced
    pub async fn invoke_with_diagnostics(&self, script: &str) -> Result<Vec<DiagnosticRecord>> {
        let mut sink = DiagnosticSink::new();
        self.invoke_into(script, &mut sink).await?;
        Ok(sink.into_records())
    }

    /// Read a script file and run it
    ///
    /// # Errors
    ///
    /// [`Error::Read`] if the file cannot be read, or a parse error.
    pub async fn invoke_file(&self, path: &Path) -> Result<Vec<DiagnosticRecord>> {
        let body = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| Error::Read {
                path: path.to_path_buf(),
                source,
            })?;
        self.invoke_with_diagnostics(&body).await
    }

    /// Run a script on a private current-thread runtime
    ///
    /// # Errors
    ///
    /// [`Error::Other`] when called from inside a Tokio runtime, where
    /// blocking would stall it; await
    /// [`invoke_with_diagnostics`](Self::invoke_with_diagnostics) instead.
    pub fn invoke_blocking(&self, script: &str) -> Result<Vec<DiagnosticRecord>> {
        if tokio::runtime::Handle::try_current().is_ok() {
            return Err(Error::Other(
                "invoke_blocking cannot run inside an async runtime".to_string(),
            ));
        }
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        runtime.block_on(self.invoke_with_diagnostics(script))
    }

    /// Run a script, writing every record into `sink`
    ///
    /// The whole script is parsed before the first command runs.
    pub async fn invoke_into(&self, script: &str, sink: &mut DiagnosticSink) -> Result<()> {
        let parsed = parse_script(script)?;
        info!(pipelines = parsed.pipelines.len(), "running script");

        for pipeline in &parsed.pipelines {
            self.run_pipeline(pipeline, sink).await;
        }

        info!(records = sink.len(), "script finished");
        Ok(())
    }

    async fn run_pipeline(&self, pipeline: &ScriptPipeline, sink: &mut DiagnosticSink) {
        let mut stages = match self.resolve_stages(pipeline) {
            Ok(stages) => stages,
            Err((e, name)) => {
                debug!(line = pipeline.line, error = %e, "skipping pipeline");
                sink.write_error(ErrorInfo::from(&e).with_source(name));
                return;
            }
        };

        let last = stages.len().saturating_sub(1);
        let mut upstream: Option<Vec<serde_json::Value>> = None;

        for (index, stage) in stages.iter_mut().enumerate() {
            let inputs: Vec<Result<CommandInput>> = match upstream.take() {
                None => vec![bind_input(stage.spec, stage.invocation)],
                Some(records) => records
                    .into_iter()
                    .map(|record| bind_input(stage.spec, &stage.invocation.with_input(record)))
                    .collect(),
            };

            let capture = index < last;
            if capture {
                sink.begin_capture();
            }
            run_lifecycle(stage.spec, stage.command.as_mut(), inputs, sink).await;
            if capture {
                upstream = Some(sink.end_capture());
            }
        }
    }

    /// Resolve every stage and check its explicit arguments before any runs
    ///
    /// The first stage has no upstream, so its mandatory parameters must
    /// already be satisfied.
    fn resolve_stages<'a>(
        &self,
        pipeline: &'a ScriptPipeline,
    ) -> std::result::Result<Vec<ResolvedStage<'a>>, (Error, String)> {
        let mut stages = Vec::with_capacity(pipeline.stages.len());

        for (index, invocation) in pipeline.stages.iter().enumerate() {
            let name = invocation.name().to_string();
            let (spec, command) = self.registry.resolve(&name).map_err(|e| (e, name.clone()))?;
            if index == 0 {
                bind_input(spec, invocation).map_err(|e| (e, name.clone()))?;
            } else {
                bind_arguments(spec, invocation).map_err(|e| (e, name.clone()))?;
            }
            stages.push(ResolvedStage {
                spec,
                command,
                invocation,
            });
        }

        Ok(stages)
    }
}

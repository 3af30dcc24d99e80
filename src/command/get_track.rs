//! `Get-Track`: look up a track without downloading it

use super::{Command, CommandInput, CommandSpec, ParameterSpec};
use crate::Result;
use crate::download::TrackDownloader;
use crate::error::ErrorInfo;
use crate::sink::DiagnosticSink;
use crate::types::TrackInfo;
use async_trait::async_trait;

/// `Get-Track [-TrackUrl] <locator>`
pub static GET_TRACK: CommandSpec = CommandSpec {
    name: "Get-Track",
    parameters: &[ParameterSpec {
        name: "TrackUrl",
        position: Some(0),
        mandatory: true,
        from_pipeline: true,
        from_pipeline_by_name: true,
    }],
};

/// Emits a [`TrackInfo`] object per locator, which pipes into `Save-Track`
pub struct GetTrackCommand {
    downloader: TrackDownloader,
}

impl GetTrackCommand {
    /// Create the command around a downloader
    pub fn new(downloader: TrackDownloader) -> Self {
        Self { downloader }
    }
}

#[async_trait]
impl Command for GetTrackCommand {
    async fn process(&mut self, input: &CommandInput, sink: &mut DiagnosticSink) -> Result<()> {
        let locator = input.parameters.get("TrackUrl").unwrap_or_default();

        match self.downloader.fetch_metadata(locator).await {
            Ok(track) => sink.write_object(&TrackInfo::from(&track))?,
            Err(e) => sink.write_error(ErrorInfo::from(&e).with_source(locator)),
        }
        Ok(())
    }
}

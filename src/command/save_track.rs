//! `Save-Track`: download a track into the user's Tracks directory

use super::{Command, CommandInput, CommandSpec, ParameterSpec};
use crate::Result;
use crate::download::TrackDownloader;
use crate::sink::DiagnosticSink;
use crate::types::{DownloadResult, ProgressRecord, TransferProgress};
use async_trait::async_trait;

/// Report progress at most once per this many bytes when the size is unknown
const UNKNOWN_SIZE_REPORT_INTERVAL: u64 = 1024 * 1024;

/// `Save-Track [-TrackUrl] <locator>`
pub static SAVE_TRACK: CommandSpec = CommandSpec {
    name: "Save-Track",
    parameters: &[ParameterSpec {
        name: "TrackUrl",
        position: Some(0),
        mandatory: true,
        from_pipeline: true,
        from_pipeline_by_name: true,
    }],
};

/// Writes the saved file's absolute path as a string on success, or one
/// Error record on failure; never both.
pub struct SaveTrackCommand {
    downloader: TrackDownloader,
}

impl SaveTrackCommand {
    /// Create the command around a downloader
    pub fn new(downloader: TrackDownloader) -> Self {
        Self { downloader }
    }
}

#[async_trait]
impl Command for SaveTrackCommand {
    async fn process(&mut self, input: &CommandInput, sink: &mut DiagnosticSink) -> Result<()> {
        let locator = input.parameters.get("TrackUrl").unwrap_or_default();
        sink.write_debug(format!("Saving track from {}", locator));

        let mut throttle = ProgressThrottle::default();
        let result = self
            .downloader
            .run(locator, &mut |progress| {
                if let Some(record) = throttle.next(progress) {
                    sink.write_progress(record);
                }
            })
            .await;

        match result {
            DownloadResult::Saved(path) => {
                sink.write_output(serde_json::Value::String(
                    path.to_string_lossy().into_owned(),
                ));
            }
            DownloadResult::Failed(info) => sink.write_error(info),
        }
        Ok(())
    }
}

/// Turns raw byte counts into a modest number of progress records
#[derive(Default)]
struct ProgressThrottle {
    last_percent: Option<u8>,
    last_bytes: u64,
}

impl ProgressThrottle {
    fn next(&mut self, progress: TransferProgress) -> Option<ProgressRecord> {
        match progress.percent() {
            Some(percent) => {
                if self.last_percent == Some(percent) {
                    return None;
                }
                self.last_percent = Some(percent);
            }
            None => {
                if self.last_bytes != 0
                    && progress.bytes_written - self.last_bytes < UNKNOWN_SIZE_REPORT_INTERVAL
                {
                    return None;
                }
            }
        }
        self.last_bytes = progress.bytes_written;

        Some(ProgressRecord {
            activity: SAVE_TRACK.name.to_string(),
            status: format!("{} bytes written", progress.bytes_written),
            percent_complete: progress.percent(),
        })
    }
}

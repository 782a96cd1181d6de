//! Download state machine and the channel an external downloader reports on.
//!
//! The downloader runs on its own schedule; it publishes the latest update on
//! a `tokio::sync::watch` channel and the per-frame tick folds it into the
//! association with [`DownloadMonitor::poll`].

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::video::config::VideoAssociation;

/// Local availability of an association's video
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DownloadState {
    /// Never started, or the file is missing
    #[default]
    NotDownloaded,
    Downloading,
    Downloaded,
    /// Aborted by the user
    Cancelled,
}

/// Latest state reported by a downloader
#[derive(Debug, Clone, PartialEq)]
pub enum DownloadUpdate {
    Pending,
    /// Fraction 0.0 to 1.0
    Progress(f32),
    /// Finished; `file` is the name written inside the level directory
    Completed { file: String },
    Cancelled,
}

/// External collaborator that fetches video bytes
pub trait Downloader {
    fn start_download(&mut self, video_id: &str, reporter: DownloadReporter);
    fn cancel_download(&mut self, video_id: &str);
}

/// Sending half, owned by the downloader
#[derive(Debug)]
pub struct DownloadReporter {
    tx: watch::Sender<DownloadUpdate>,
}

impl DownloadReporter {
    pub fn progress(&self, fraction: f32) {
        self.tx.send_replace(DownloadUpdate::Progress(fraction));
    }

    pub fn completed(&self, file: impl Into<String>) {
        self.tx.send_replace(DownloadUpdate::Completed { file: file.into() });
    }

    pub fn cancelled(&self) {
        self.tx.send_replace(DownloadUpdate::Cancelled);
    }
}

/// Receiving half, polled from the tick that owns the association
#[derive(Debug)]
pub struct DownloadMonitor {
    rx: watch::Receiver<DownloadUpdate>,
    closed: bool,
}

/// Create a connected reporter/monitor pair
pub fn download_channel() -> (DownloadReporter, DownloadMonitor) {
    let (tx, rx) = watch::channel(DownloadUpdate::Pending);
    (DownloadReporter { tx }, DownloadMonitor { rx, closed: false })
}

impl DownloadMonitor {
    /// Apply the newest update, if any. Returns true when something was applied.
    pub fn poll(&mut self, association: &mut VideoAssociation) -> bool {
        if self.closed {
            return false;
        }

        let changed = match self.rx.has_changed() {
            Ok(changed) => changed,
            Err(_) => {
                // Reporter dropped: apply whatever it left behind, then stop.
                self.closed = true;
                true
            }
        };
        if !changed {
            return false;
        }

        let update = self.rx.borrow_and_update().clone();
        apply_update(association, &update);

        if self.closed && association.download_state == DownloadState::Downloading {
            warn!(video_id = %association.video_id, "Downloader went away without finishing");
            association.download_state = DownloadState::NotDownloaded;
        }
        true
    }

    /// True once the reporter has been dropped and its last update applied
    pub fn is_finished(&self) -> bool {
        self.closed
    }
}

fn apply_update(association: &mut VideoAssociation, update: &DownloadUpdate) {
    match update {
        DownloadUpdate::Pending => {}
        DownloadUpdate::Progress(_) if association.download_state == DownloadState::Cancelled => {
            debug!(video_id = %association.video_id, "Ignoring progress after cancel");
        }
        DownloadUpdate::Progress(fraction) => {
            association.download_state = DownloadState::Downloading;
            association.download_progress = fraction.clamp(0.0, 1.0);
            debug!(
                video_id = %association.video_id,
                progress = association.download_progress,
                "Download progress"
            );
        }
        DownloadUpdate::Completed { file } => {
            if association.video_file.as_deref() != Some(file.as_str()) {
                association.video_file = Some(file.clone());
                association.needs_to_save = true;
            }
            association.download_state = DownloadState::Downloaded;
            association.download_progress = 1.0;
            info!(video_id = %association.video_id, file = %file, "Download finished");
        }
        DownloadUpdate::Cancelled => {
            association.download_state = DownloadState::Cancelled;
            info!(video_id = %association.video_id, "Download cancelled");
        }
    }
}

/// Hand the association's video to a downloader and start tracking it
pub fn begin_download(
    association: &mut VideoAssociation,
    downloader: &mut dyn Downloader,
) -> DownloadMonitor {
    let (reporter, monitor) = download_channel();
    association.download_state = DownloadState::Downloading;
    association.download_progress = 0.0;
    info!(video_id = %association.video_id, "Starting download");
    downloader.start_download(&association.video_id, reporter);
    monitor
}

/// User-initiated abort
pub fn cancel_download(association: &mut VideoAssociation, downloader: &mut dyn Downloader) {
    downloader.cancel_download(&association.video_id);
    association.download_state = DownloadState::Cancelled;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingDownloader {
        reporter: Option<DownloadReporter>,
        cancelled: Vec<String>,
    }

    impl Downloader for RecordingDownloader {
        fn start_download(&mut self, _video_id: &str, reporter: DownloadReporter) {
            self.reporter = Some(reporter);
        }

        fn cancel_download(&mut self, video_id: &str) {
            self.cancelled.push(video_id.to_string());
            if let Some(reporter) = self.reporter.take() {
                reporter.cancelled();
            }
        }
    }

    #[test]
    fn test_progress_then_completion() {
        let mut association = VideoAssociation::new("abc").unwrap();
        let mut downloader = RecordingDownloader::default();
        let mut monitor = begin_download(&mut association, &mut downloader);
        assert_eq!(association.download_state, DownloadState::Downloading);

        // Nothing reported yet
        assert!(!monitor.poll(&mut association));

        let reporter = downloader.reporter.take().unwrap();
        reporter.progress(0.25);
        reporter.progress(1.5);
        assert!(monitor.poll(&mut association));
        assert_eq!(association.download_progress, 1.0);
        assert_eq!(association.download_state, DownloadState::Downloading);

        reporter.completed("abc.mp4");
        drop(reporter);
        assert!(monitor.poll(&mut association));
        assert_eq!(association.download_state, DownloadState::Downloaded);
        assert_eq!(association.video_file.as_deref(), Some("abc.mp4"));
        assert!(association.needs_to_save);
        assert!(monitor.is_finished());
        assert!(!monitor.poll(&mut association));
    }

    #[test]
    fn test_cancel_is_distinct_from_not_downloaded() {
        let mut association = VideoAssociation::new("abc").unwrap();
        let mut downloader = RecordingDownloader::default();
        let mut monitor = begin_download(&mut association, &mut downloader);

        cancel_download(&mut association, &mut downloader);
        assert_eq!(association.download_state, DownloadState::Cancelled);
        assert_eq!(downloader.cancelled, vec!["abc".to_string()]);

        monitor.poll(&mut association);
        assert_eq!(association.download_state, DownloadState::Cancelled);
    }

    #[test]
    fn test_late_progress_does_not_undo_cancel() {
        let mut association = VideoAssociation::new("abc").unwrap();
        let mut downloader = RecordingDownloader::default();
        let mut monitor = begin_download(&mut association, &mut downloader);
        let reporter = downloader.reporter.take().unwrap();

        cancel_download(&mut association, &mut downloader);
        reporter.progress(0.4);
        assert!(monitor.poll(&mut association));
        assert_eq!(association.download_state, DownloadState::Cancelled);
        assert_eq!(association.download_progress, 0.0);

        drop(reporter);
        monitor.poll(&mut association);
        assert_eq!(association.download_state, DownloadState::Cancelled);
    }

    #[test]
    fn test_dropped_reporter_resets_unfinished_download() {
        let mut association = VideoAssociation::new("abc").unwrap();
        let (reporter, mut monitor) = download_channel();
        reporter.progress(0.5);
        drop(reporter);

        assert!(monitor.poll(&mut association));
        assert_eq!(association.download_state, DownloadState::NotDownloaded);
    }
}

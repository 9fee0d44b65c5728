//! Async work started by the session
//!
//! [`Session::update`](super::state::Session::update) never blocks. Anything that
//! touches the disk, the rasterizer or the delegate comes back as a [`Job`]; the
//! host runs it and feeds the returned [`Msg`] back into the session.

use std::sync::Arc;

use crate::analysis::{AnalysisDelegate, AnalysisMode, AnalysisRequest};
use crate::capture::{Compositor, ImageSource, SkiaCompositor, SourceImage};
use crate::error::Error;
use crate::export::{DownloadSink, ExportRequest, run_export_blocking};

use super::messages::{AnalysisTicket, ExportTicket, LoadTicket, Msg};

/// Collaborators a job may need
#[derive(Clone)]
pub struct Services {
    pub compositor: Arc<dyn Compositor>,
    pub sink: Arc<dyn DownloadSink>,
    pub delegate: Option<Arc<dyn AnalysisDelegate>>,
}

impl Services {
    pub fn new(sink: Arc<dyn DownloadSink>) -> Self {
        Self {
            compositor: Arc::new(SkiaCompositor),
            sink,
            delegate: None,
        }
    }

    pub fn with_delegate(mut self, delegate: Arc<dyn AnalysisDelegate>) -> Self {
        self.delegate = Some(delegate);
        self
    }
}

pub enum Job {
    Load {
        ticket: LoadTicket,
        source: ImageSource,
    },
    Export {
        ticket: ExportTicket,
        request: Box<ExportRequest>,
    },
    Analyze {
        ticket: AnalysisTicket,
        mode: AnalysisMode,
        image: SourceImage,
    },
}

impl std::fmt::Debug for Job {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Job::Load { ticket, source } => f
                .debug_struct("Load")
                .field("ticket", ticket)
                .field("source", &source.describe())
                .finish(),
            Job::Export { ticket, request } => f
                .debug_struct("Export")
                .field("ticket", ticket)
                .field("format", &request.format)
                .finish(),
            Job::Analyze { ticket, mode, .. } => f
                .debug_struct("Analyze")
                .field("ticket", ticket)
                .field("mode", mode)
                .finish(),
        }
    }
}

impl Job {
    /// Run to completion, producing the message that reports the outcome
    pub async fn run(self, services: &Services) -> Msg {
        match self {
            Job::Load { ticket, source } => Msg::ImageLoaded(ticket, source.load().await),
            Job::Export { ticket, request } => {
                let result = run_export_blocking(
                    *request,
                    Arc::clone(&services.compositor),
                    Arc::clone(&services.sink),
                )
                .await;
                Msg::ExportFinished(ticket, result)
            }
            Job::Analyze {
                ticket,
                mode,
                image,
            } => {
                let result = match &services.delegate {
                    Some(delegate) => {
                        let request = AnalysisRequest::from_image(mode, &image);
                        delegate.analyze(request).await
                    }
                    None => Err(Error::Delegate("no analysis service configured".to_string())),
                };
                Msg::AnalysisFinished(ticket, result)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::DirectorySink;
    use crate::session::{Session, SessionSettings};
    use image::RgbaImage;

    fn png_bytes() -> Vec<u8> {
        let mut out = Vec::new();
        crate::export::write_png(&mut out, &RgbaImage::from_pixel(8, 8, image::Rgba([90, 90, 90, 255])))
            .unwrap();
        out
    }

    async fn drive(session: &mut Session, services: &Services, msg: Msg) {
        if let Some(job) = session.update(msg) {
            let reply = job.run(services).await;
            assert!(session.update(reply).is_none());
        }
    }

    #[tokio::test]
    async fn test_load_then_export_round() {
        let dir = tempfile::tempdir().unwrap();
        let services = Services::new(Arc::new(DirectorySink::new(dir.path())));
        let mut session = Session::new(SessionSettings::default());

        drive(&mut session, &services, Msg::LoadImage(ImageSource::Bytes(png_bytes()))).await;
        assert!(session.image().is_some());

        drive(&mut session, &services, Msg::Export).await;
        let artifact = session.last_export().unwrap();
        assert_eq!((artifact.width, artifact.height), (1800, 1800));
        assert!(artifact.path.exists());
        assert!(!session.tasks().is_exporting());
    }

    #[tokio::test]
    async fn test_analysis_without_delegate_is_delegate_error() {
        let dir = tempfile::tempdir().unwrap();
        let services = Services::new(Arc::new(DirectorySink::new(dir.path())));
        let mut session = Session::new(SessionSettings::default());
        drive(&mut session, &services, Msg::LoadImage(ImageSource::Bytes(png_bytes()))).await;

        drive(&mut session, &services, Msg::Analyze(AnalysisMode::Alignment)).await;
        assert!(!session.tasks().is_analyzing());
        assert_eq!(
            session.notice().unwrap().category,
            crate::error::ErrorCategory::Delegate
        );
    }
}

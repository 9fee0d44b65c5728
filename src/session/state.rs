//! Canvas session state and its message handler

use crate::analysis::AnalysisReport;
use crate::capture::{Composition, SourceImage};
use crate::domain::{ImageTransform, OverlayConfig, Size};
use crate::error::{Error, ErrorCategory};
use crate::export::{ExportArtifact, ExportOptions, ExportRequest};
use crate::gesture::{GestureConfig, GestureController};

use super::jobs::Job;
use super::messages::{
    AnalysisTicket, ControlMsg, ExportTicket, ImageId, LoadTicket, Msg, OverlayMsg,
};

/// Starting values for a session
#[derive(Clone, Debug, Default)]
pub struct SessionSettings {
    pub gesture: GestureConfig,
    pub overlay: OverlayConfig,
    pub viewport: Size,
    pub guide_side: Option<f32>,
    pub export: ExportOptions,
}

/// A user-facing error message
#[derive(Clone, Debug, PartialEq)]
pub struct Notice {
    pub category: ErrorCategory,
    pub message: String,
}

impl From<&Error> for Notice {
    fn from(error: &Error) -> Self {
        Self {
            category: error.category(),
            message: error.to_string(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct LoadedImage {
    pub id: ImageId,
    pub image: SourceImage,
}

/// In-flight slots for the single-shot async tasks
#[derive(Clone, Debug, Default)]
pub struct TaskState {
    pub pending_load: Option<LoadTicket>,
    pub export: Option<ExportTicket>,
    pub analysis: Option<AnalysisTicket>,
    next_seq: u64,
}

impl TaskState {
    fn next(&mut self) -> u64 {
        self.next_seq += 1;
        self.next_seq
    }

    pub fn is_exporting(&self) -> bool {
        self.export.is_some()
    }

    pub fn is_analyzing(&self) -> bool {
        self.analysis.is_some()
    }
}

/// Everything one canvas owns. Mutated only through [`Session::update`].
#[derive(Debug)]
pub struct Session {
    transform: ImageTransform,
    overlay: OverlayConfig,
    gestures: GestureController,
    image: Option<LoadedImage>,
    viewport: Size,
    guide_side: Option<f32>,
    export_options: ExportOptions,
    tasks: TaskState,
    analysis: Option<AnalysisReport>,
    last_export: Option<ExportArtifact>,
    notice: Option<Notice>,
    next_image_id: u64,
}

impl Session {
    pub fn new(settings: SessionSettings) -> Self {
        Self {
            transform: ImageTransform::IDENTITY,
            overlay: settings.overlay,
            gestures: GestureController::new(settings.gesture),
            image: None,
            viewport: settings.viewport,
            guide_side: settings.guide_side,
            export_options: settings.export,
            tasks: TaskState::default(),
            analysis: None,
            last_export: None,
            notice: None,
            next_image_id: 0,
        }
    }

    pub fn transform(&self) -> &ImageTransform {
        &self.transform
    }

    pub fn overlay(&self) -> &OverlayConfig {
        &self.overlay
    }

    pub fn gestures(&self) -> &GestureController {
        &self.gestures
    }

    pub fn image(&self) -> Option<&LoadedImage> {
        self.image.as_ref()
    }

    pub fn viewport(&self) -> Size {
        self.viewport
    }

    pub fn tasks(&self) -> &TaskState {
        &self.tasks
    }

    pub fn analysis(&self) -> Option<&AnalysisReport> {
        self.analysis.as_ref()
    }

    pub fn last_export(&self) -> Option<&ExportArtifact> {
        self.last_export.as_ref()
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// The composition currently on screen, if a photo is loaded
    pub fn composition(&self) -> Option<Composition> {
        let loaded = self.image.as_ref()?;
        Some(Composition {
            viewport: self.viewport,
            image: loaded.image.rgba.clone(),
            transform: self.transform,
            overlay: self.overlay,
            guide_side: self.guide_side,
        })
    }

    /// Handle one message; returns async work for the host to run
    pub fn update(&mut self, msg: Msg) -> Option<Job> {
        match msg {
            Msg::Input(event) => {
                let outcome = self.gestures.dispatch(&event, &mut self.transform);
                log::trace!("gesture {:?} -> {:?}", event, outcome);
                None
            }
            Msg::Control(control) => {
                self.handle_control(control);
                None
            }
            Msg::Overlay(overlay) => {
                self.handle_overlay(overlay);
                None
            }
            Msg::Resize(size) => {
                self.viewport = size;
                None
            }
            Msg::LoadImage(source) => {
                let ticket = LoadTicket(self.tasks.next());
                log::info!("Loading image from {}", source.describe());
                self.tasks.pending_load = Some(ticket);
                Some(Job::Load { ticket, source })
            }
            Msg::ImageLoaded(ticket, result) => {
                self.handle_image_loaded(ticket, result);
                None
            }
            Msg::Export => self.start_export(),
            Msg::ExportFinished(ticket, result) => {
                self.handle_export_finished(ticket, result);
                None
            }
            Msg::Analyze(mode) => self.start_analysis(mode),
            Msg::AnalysisFinished(ticket, result) => {
                self.handle_analysis_finished(ticket, result);
                None
            }
            Msg::DismissNotice => {
                self.notice = None;
                None
            }
        }
    }

    fn handle_control(&mut self, control: ControlMsg) {
        let step = self.gestures.config().wheel_step;
        match control {
            ControlMsg::Reset => {
                self.transform.reset();
                self.overlay.reset_geometry();
                self.gestures.clear();
            }
            ControlMsg::RotateBy(delta) => self.transform.adjust_rotation(delta),
            ControlMsg::SetRotation(deg) => self.transform.set_rotation(deg),
            ControlMsg::ZoomIn => self.transform.zoom_by(step),
            ControlMsg::ZoomOut => self.transform.zoom_by(-step),
            ControlMsg::SetScale(scale) => self.transform.set_scale(scale),
            ControlMsg::SetTranslate(point) => self.transform.set_translate(point),
        }
        log::debug!("transform now {:?}", self.transform);
    }

    fn handle_overlay(&mut self, msg: OverlayMsg) {
        match msg {
            OverlayMsg::SetKind(kind) => self.overlay.kind = kind,
            OverlayMsg::CycleKind => self.overlay.kind = self.overlay.kind.next(),
            OverlayMsg::SetColor(color) => self.overlay.color = color,
            OverlayMsg::SetRotation(deg) if deg.is_finite() => self.overlay.set_rotation(deg),
            OverlayMsg::SetScalePercent(pct) if !pct.is_nan() => {
                self.overlay.set_scale_percent(pct)
            }
            OverlayMsg::SetOffset(x, y) if x.is_finite() && y.is_finite() => {
                self.overlay.offset_x = x;
                self.overlay.offset_y = y;
            }
            OverlayMsg::ResetGeometry => self.overlay.reset_geometry(),
            other => log::warn!("Ignoring out-of-range overlay value: {:?}", other),
        }
    }

    fn handle_image_loaded(&mut self, ticket: LoadTicket, result: crate::error::Result<SourceImage>) {
        if self.tasks.pending_load != Some(ticket) {
            log::warn!("Discarding superseded image load {:?}", ticket);
            return;
        }
        self.tasks.pending_load = None;

        match result {
            Ok(image) => {
                self.next_image_id += 1;
                let id = ImageId(self.next_image_id);
                log::info!(
                    "Image {:?} loaded: {}x{}",
                    id,
                    image.width(),
                    image.height()
                );
                self.image = Some(LoadedImage { id, image });
                self.transform.reset();
                self.gestures.clear();
                self.analysis = None;
                self.notice = None;
            }
            Err(e) => {
                log::error!("Image load failed: {}", e);
                self.notice = Some(Notice::from(&e));
            }
        }
    }

    fn start_export(&mut self) -> Option<Job> {
        if let Some(ticket) = self.tasks.export {
            log::warn!("Export already in progress ({:?}), ignoring", ticket);
            return None;
        }
        let Some(composition) = self.composition() else {
            let e = Error::Capture("no image to export".to_string());
            log::warn!("{}", e);
            self.notice = Some(Notice::from(&e));
            return None;
        };

        let ticket = ExportTicket(self.tasks.next());
        self.tasks.export = Some(ticket);
        let request = ExportRequest::new(composition, &self.export_options);
        Some(Job::Export {
            ticket,
            request: Box::new(request),
        })
    }

    fn handle_export_finished(
        &mut self,
        ticket: ExportTicket,
        result: crate::error::Result<ExportArtifact>,
    ) {
        if self.tasks.export != Some(ticket) {
            log::warn!("Ignoring completion of unknown export {:?}", ticket);
            return;
        }
        self.tasks.export = None;

        match result {
            Ok(artifact) => {
                log::info!("Export delivered: {}", artifact.path.display());
                self.last_export = Some(artifact);
            }
            Err(e) => {
                log::error!("Export failed: {}", e);
                self.notice = Some(Notice::from(&e));
            }
        }
    }

    fn start_analysis(&mut self, mode: crate::analysis::AnalysisMode) -> Option<Job> {
        if let Some(ticket) = self.tasks.analysis {
            log::warn!("Analysis already in progress ({:?}), ignoring", ticket);
            return None;
        }
        let Some(loaded) = self.image.as_ref() else {
            let e = Error::Delegate("no image to analyze".to_string());
            log::warn!("{}", e);
            self.notice = Some(Notice::from(&e));
            return None;
        };

        let ticket = AnalysisTicket {
            seq: self.tasks.next(),
            image: loaded.id,
        };
        self.tasks.analysis = Some(ticket);
        Some(Job::Analyze {
            ticket,
            mode,
            image: loaded.image.clone(),
        })
    }

    fn handle_analysis_finished(
        &mut self,
        ticket: AnalysisTicket,
        result: crate::error::Result<AnalysisReport>,
    ) {
        if self.tasks.analysis == Some(ticket) {
            self.tasks.analysis = None;
        } else {
            log::warn!("Ignoring completion of unknown analysis {:?}", ticket);
            return;
        }

        let current = self.image.as_ref().map(|loaded| loaded.id);
        if current != Some(ticket.image) {
            log::warn!(
                "Discarding analysis for {:?}; current image is {:?}",
                ticket.image,
                current
            );
            return;
        }

        match result {
            Ok(report) => {
                log::info!("Analysis ready: {}", report.summary());
                self.analysis = Some(report);
            }
            Err(e) => {
                log::error!("Analysis failed: {}", e);
                self.notice = Some(Notice::from(&e));
            }
        }
    }
}

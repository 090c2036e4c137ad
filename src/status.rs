//! Persistent visual motion indicator.
//!
//! The display follows the latest classification with no debounce: every sampled frame
//! re-renders it, and the rendered view depends on that frame's result alone.

use serde::Serialize;

use crate::classification::ClassificationResult;
use crate::message::AnnouncementMessage;

/// Label shown whenever the latest frame is not a detection.
pub const NO_MOTION_LABEL: &str = "No Motion";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusTone {
    Neutral,
    Alert,
}

/// What the indicator currently shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusView {
    pub tone: StatusTone,
    pub background: &'static str,
    pub foreground: &'static str,
    pub label: String,
}

impl StatusView {
    pub fn neutral() -> Self {
        Self {
            tone: StatusTone::Neutral,
            background: "#2e7d32",
            foreground: "#ffffff",
            label: NO_MOTION_LABEL.to_owned(),
        }
    }

    pub fn alert(message: &AnnouncementMessage) -> Self {
        Self {
            tone: StatusTone::Alert,
            background: "#c62828",
            foreground: "#ffffff",
            label: message.as_str().to_owned(),
        }
    }
}

/// The visual output surface: one persistent element with colours and a label.
pub trait StatusSurface {
    fn render(&mut self, view: &StatusView);
}

impl<S: StatusSurface + ?Sized> StatusSurface for Box<S> {
    fn render(&mut self, view: &StatusView) {
        (**self).render(view)
    }
}

pub struct StatusDisplay<S> {
    surface: S,
    neutral: StatusView,
    alert: StatusView,
    current: StatusTone,
}

impl<S: StatusSurface> StatusDisplay<S> {
    /// Create a display and render the neutral state.
    pub fn new(mut surface: S, message: &AnnouncementMessage) -> Self {
        let neutral = StatusView::neutral();
        surface.render(&neutral);
        Self {
            surface,
            neutral,
            alert: StatusView::alert(message),
            current: StatusTone::Neutral,
        }
    }

    /// Render the view for `result` and return it.
    pub fn update(&mut self, result: ClassificationResult) -> &StatusView {
        let view = match result {
            ClassificationResult::MotionDetected => &self.alert,
            ClassificationResult::NoMotion | ClassificationResult::NotReady => &self.neutral,
        };
        self.current = view.tone;
        self.surface.render(view);
        view
    }

    pub fn current(&self) -> &StatusView {
        match self.current {
            StatusTone::Alert => &self.alert,
            StatusTone::Neutral => &self.neutral,
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }
}

use papercuts_core::metrics;
use papercuts_core::pdf::PdfSession;
use papercuts_core::settings::OptimizeSettings;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStep {
    #[default]
    Upload,
    Results,
    Preview,
}

impl WorkflowStep {
    pub const ALL: [WorkflowStep; 3] = [Self::Upload, Self::Results, Self::Preview];

    pub fn label(self) -> &'static str {
        match self {
            Self::Upload => "Upload",
            Self::Results => "Results",
            Self::Preview => "Preview",
        }
    }

    pub fn index(self) -> usize {
        match self {
            Self::Upload => 0,
            Self::Results => 1,
            Self::Preview => 2,
        }
    }
}

/// Snapshot of the controller for rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkflowStatus {
    pub step: WorkflowStep,
    pub session: Option<PdfSession>,
    pub settings: OptimizeSettings,
    pub is_loading: bool,
    pub error: Option<String>,

    // None until a health check has run.
    pub connected: Option<bool>,
}

impl WorkflowStatus {
    pub fn has_session(&self) -> bool {
        self.session.is_some()
    }

    // Derived values are computed on every call, never stored.
    pub fn pages_saved(&self) -> Option<i64> {
        self.session.as_ref().map(metrics::pages_saved)
    }

    pub fn ink_reduced_percent(&self) -> Option<i64> {
        self.session.as_ref().map(metrics::ink_reduced_percent)
    }

    pub fn preview_suggestions(&self) -> &[String] {
        self.session
            .as_ref()
            .map(metrics::preview_suggestions)
            .unwrap_or_default()
    }

    pub fn is_offline(&self) -> bool {
        self.connected == Some(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steps_are_ordered() {
        let idx: Vec<usize> = WorkflowStep::ALL.iter().map(|s| s.index()).collect();
        assert_eq!(idx, vec![0, 1, 2]);
        assert_eq!(WorkflowStep::default(), WorkflowStep::Upload);
    }

    #[test]
    fn empty_status_has_no_metrics() {
        let s = WorkflowStatus {
            step: WorkflowStep::Upload,
            session: None,
            settings: OptimizeSettings::default(),
            is_loading: false,
            error: None,
            connected: None,
        };
        assert_eq!(s.pages_saved(), None);
        assert!(s.preview_suggestions().is_empty());
        assert!(!s.is_offline());
    }
}

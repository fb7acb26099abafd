//! Pure state-to-view mapping
//!
//! A front end renders [`View`] and turns button presses into
//! [`crate::Intent`]s. Nothing here performs I/O.

use kyc_core::{DocumentKind, ReviewField};

use crate::script;
use crate::state_machine::{FlowState, PermissionKind, Step};

/// Which live video the screen shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoFeed {
    /// Camera feed used for document and face capture
    Camera,
    /// Preview beside the attestation before reading starts
    ConfirmPreview,
    /// Preview while the attestation is being read
    RecordingPreview,
}

/// Buttons offered on a screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Allow,
    Capture(DocumentKind),
    ConfirmDetails,
    ReadyToRead,
}

impl Control {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Allow => "Allow",
            Self::Capture(DocumentKind::Face) => "Capture Face",
            Self::Capture(_) => "Capture",
            Self::ConfirmDetails => "Confirm",
            Self::ReadyToRead => "I'm ready to read",
        }
    }
}

/// Everything a front end needs to draw the current screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct View {
    /// Step label, e.g. `capture:pan`
    pub step: &'static str,
    pub heading: String,
    /// Attestation text on the legal screens
    pub statement: Option<String>,
    pub notice: Option<String>,
    pub show_logo: bool,
    pub video: Option<VideoFeed>,
    /// Editable rows, only on the review screens
    pub fields: Vec<ReviewField>,
    pub controls: Vec<Control>,
}

impl View {
    fn new(state: &FlowState, heading: impl Into<String>) -> Self {
        Self {
            step: state.step.label(),
            heading: heading.into(),
            statement: None,
            notice: state.notice.clone(),
            show_logo: false,
            video: None,
            fields: Vec::new(),
            controls: Vec::new(),
        }
    }

    fn with_controls(mut self, controls: impl IntoIterator<Item = Control>) -> Self {
        self.controls.extend(controls);
        self
    }

    fn with_video(mut self, feed: VideoFeed) -> Self {
        self.video = Some(feed);
        self
    }

    pub fn offers(&self, control: Control) -> bool {
        self.controls.contains(&control)
    }
}

/// Map flow state to the screen for it
pub fn render(state: &FlowState) -> View {
    match &state.step {
        Step::Permission(kind) => {
            let mut view = View::new(state, script::permission_prompt(*kind))
                .with_controls([Control::Allow]);
            view.show_logo = *kind == PermissionKind::Microphone;
            view
        }

        Step::Capture(kind) => View::new(state, script::capture_prompt(*kind))
            .with_video(VideoFeed::Camera)
            .with_controls([Control::Capture(*kind)]),

        Step::MatchComparing => {
            View::new(state, script::COMPARING_HEADING).with_video(VideoFeed::Camera)
        }

        Step::DetailsFetching => View::new(state, script::FACE_MATCHED),

        Step::ReviewEditing | Step::ReviewSubmitting => {
            let mut view = View::new(state, script::REVIEW_HEADING);
            view.fields = state
                .review
                .as_ref()
                .map(|review| review.fields().to_vec())
                .unwrap_or_default();
            if state.step == Step::ReviewEditing {
                view.controls.push(Control::ConfirmDetails);
            }
            view
        }

        Step::LegalPrompt => {
            let mut view = View::new(state, script::LEGAL_HEADING)
                .with_video(VideoFeed::ConfirmPreview)
                .with_controls([Control::ReadyToRead]);
            view.statement = Some(state.legal_statement());
            view
        }

        Step::LegalRecording => {
            let mut view =
                View::new(state, script::RECORDING_HEADING).with_video(VideoFeed::RecordingPreview);
            view.statement = Some(state.legal_statement());
            view
        }

        Step::Complete => View::new(state, script::thank_you(state.signatory.as_deref())),

        Step::Blocked { message } | Step::Error { message } => View::new(state, message.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kyc_core::{ExtractedDetails, ReviewDetails, PLACEHOLDER, REVIEW_FIELDS};

    fn at(step: Step) -> FlowState {
        FlowState {
            step,
            ..FlowState::new()
        }
    }

    #[test]
    fn test_first_permission_shows_logo() {
        let view = render(&FlowState::new());
        assert_eq!(view.step, "permission:mic");
        assert!(view.show_logo);
        assert_eq!(view.controls, vec![Control::Allow]);

        let view = render(&at(Step::Permission(PermissionKind::Audio)));
        assert!(!view.show_logo);
    }

    #[test]
    fn test_capture_screen_offers_matching_control() {
        let view = render(&at(Step::Capture(DocumentKind::Face)));
        assert_eq!(view.video, Some(VideoFeed::Camera));
        assert!(view.offers(Control::Capture(DocumentKind::Face)));
        assert!(!view.offers(Control::Capture(DocumentKind::Aadhaar)));
        assert_eq!(view.controls[0].label(), "Capture Face");
    }

    #[test]
    fn test_comparing_has_no_controls() {
        let view = render(&at(Step::MatchComparing));
        assert_eq!(view.heading, script::COMPARING_HEADING);
        assert!(view.controls.is_empty());
    }

    #[test]
    fn test_review_renders_every_field_with_placeholders() {
        let mut state = at(Step::ReviewEditing);
        state.review = Some(ReviewDetails::from_extracted(&ExtractedDetails::new()));

        let view = render(&state);
        let labels: Vec<&str> = view.fields.iter().map(|f| f.label.as_str()).collect();
        assert_eq!(labels, REVIEW_FIELDS.to_vec());
        assert!(view.fields.iter().all(|f| f.value == PLACEHOLDER));
        assert!(view.offers(Control::ConfirmDetails));

        state.step = Step::ReviewSubmitting;
        assert!(render(&state).controls.is_empty());
    }

    #[test]
    fn test_legal_screens_show_statement() {
        let mut state = at(Step::LegalPrompt);
        state.signatory = Some("Asha Rao".to_string());

        let view = render(&state);
        assert_eq!(view.video, Some(VideoFeed::ConfirmPreview));
        assert!(view
            .statement
            .as_deref()
            .is_some_and(|s| s.starts_with("Asha Rao, please read")));
        assert!(view.offers(Control::ReadyToRead));

        state.step = Step::LegalRecording;
        let view = render(&state);
        assert_eq!(view.video, Some(VideoFeed::RecordingPreview));
        assert!(view.controls.is_empty());
    }

    #[test]
    fn test_terminal_screens() {
        let view = render(&at(Step::Error {
            message: script::FETCH_ERROR.to_string(),
        }));
        assert_eq!(view.heading, script::FETCH_ERROR);
        assert!(view.controls.is_empty());

        let view = render(&at(Step::Complete));
        assert_eq!(view.heading, "Thank you! Your KYC is completed.");
    }

    #[test]
    fn test_notice_is_rendered() {
        let mut state = at(Step::Permission(PermissionKind::Audio));
        state.notice = Some(script::RECORDING_UNAVAILABLE.to_string());
        assert_eq!(
            render(&state).notice.as_deref(),
            Some(script::RECORDING_UNAVAILABLE)
        );
    }
}

//! Pure state machine for the KYC flow
//!
//! This module implements a pure functional state machine with NO I/O.
//! All state transitions are deterministic and testable.
//!
//! Key design principles:
//! - Pure function: transition(state, event) -> (state, actions)
//! - Every side effect is an [`Action`] executed by the controller
//! - Invalid transitions go to the error step (never panic)
//! - Terminal steps ignore every event

use kyc_backend::FaceOutcome;
use kyc_core::config::AttestationConfig;
use kyc_core::{CaptureSet, CapturedImage, DocumentKind, ExtractedDetails, ReviewDetails};

use crate::script;

/// Permission prompts, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PermissionKind {
    Microphone,
    Audio,
    Location,
}

/// Where the user is in the flow
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Permission(PermissionKind),
    Capture(DocumentKind),
    /// Waiting on the face-match verdict
    MatchComparing,
    /// Settling pending verifications and fetching extracted details
    DetailsFetching,
    ReviewEditing,
    /// Edits pushed, waiting for the backend to answer
    ReviewSubmitting,
    LegalPrompt,
    LegalRecording,
    Complete,
    /// A media permission was refused; only a restart recovers
    Blocked { message: String },
    /// A verification call failed; only a restart recovers
    Error { message: String },
}

impl Step {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete | Self::Blocked { .. } | Self::Error { .. })
    }

    /// Stable label, e.g. `permission:mic` or `match:comparing`
    pub fn label(&self) -> &'static str {
        match self {
            Self::Permission(PermissionKind::Microphone) => "permission:mic",
            Self::Permission(PermissionKind::Audio) => "permission:audio",
            Self::Permission(PermissionKind::Location) => "permission:location",
            Self::Capture(DocumentKind::Aadhaar) => "capture:aadhaar",
            Self::Capture(DocumentKind::Pan) => "capture:pan",
            Self::Capture(DocumentKind::Face) => "capture:face",
            Self::MatchComparing => "match:comparing",
            Self::DetailsFetching => "details:fetching",
            Self::ReviewEditing => "review:editing",
            Self::ReviewSubmitting => "review:submitting",
            Self::LegalPrompt => "confirm:legal-prompt",
            Self::LegalRecording => "confirm:recording",
            Self::Complete => "complete",
            Self::Blocked { .. } => "blocked",
            Self::Error { .. } => "error",
        }
    }
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Everything the flow knows, passed through every transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowState {
    pub step: Step,
    /// Latest capture of each kind
    pub captures: CaptureSet,
    /// Set after a face mismatch; the next Aadhaar capture re-runs the match
    pub retry_face: bool,
    pub review: Option<ReviewDetails>,
    /// Name used in the attestation and the closing message
    pub signatory: Option<String>,
    /// Non-blocking message for the current screen
    pub notice: Option<String>,
    /// Lender named in the attestation
    pub lender: String,
}

impl FlowState {
    pub fn new() -> Self {
        Self {
            step: Step::Permission(PermissionKind::Microphone),
            captures: CaptureSet::default(),
            retry_face: false,
            review: None,
            signatory: None,
            notice: None,
            lender: AttestationConfig::default().lender,
        }
    }

    pub fn with_lender(mut self, lender: impl Into<String>) -> Self {
        self.lender = lender.into();
        self
    }

    /// Side effects of entering the initial step
    pub fn initial_actions(&self) -> Vec<Action> {
        vec![Action::Narrate {
            text: script::permission_prompt(PermissionKind::Microphone).to_string(),
        }]
    }

    /// The attestation text for the current signatory
    pub fn legal_statement(&self) -> String {
        script::legal_statement(self.signatory.as_deref(), &self.lender)
    }

    /// Move to `step`, clearing the previous screen's notice
    fn advance(mut self, step: Step) -> Self {
        if self.step != step {
            self.notice = None;
        }
        self.step = step;
        self
    }
}

impl Default for FlowState {
    fn default() -> Self {
        Self::new()
    }
}

/// Inputs to the state machine: user actions and outcomes of side effects
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// User pressed "Allow" on a permission prompt
    Acknowledged,
    /// Background recording could not start
    RecordingUnavailable { message: String },
    /// Camera stream is open
    CameraReady,
    /// A media permission was refused
    PermissionDenied { message: String },
    /// A frame was captured for the current capture step
    Captured { image: CapturedImage },
    /// Frame grab failed
    CaptureFailed { message: String },
    /// Face-match verdict arrived
    FaceVerified { outcome: FaceOutcome },
    /// A verification call or the pending join failed
    VerificationFailed { message: String },
    /// Consolidated details arrived
    DetailsLoaded { details: ExtractedDetails },
    /// The details call failed
    DetailsFailed { message: String },
    /// User changed a review field
    FieldEdited { label: String, value: String },
    /// User confirmed the review form
    ReviewConfirmed,
    /// The review update call finished, successfully or not
    UpdateSettled,
    /// User is ready to read the attestation
    ReadyToRead,
    /// Recording stopped and its upload finished
    RecordingFinished,
}

/// Fixed waits, resolved to durations by the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pause {
    /// After a face match, before settling pending verifications
    MatchSettle,
    /// Time to read the attestation on camera
    ReadingTime,
}

/// Side effects to execute after a transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Speak a prompt
    Narrate { text: String },
    /// Start the combined screen+microphone recording
    StartRecording,
    /// Open the camera for document capture
    OpenCamera,
    /// Submit a document image without waiting for the answer
    SubmitDocument { image: CapturedImage },
    /// Optionally re-submit Aadhaar, then submit the face and await the verdict
    VerifyFace {
        resubmit: Option<CapturedImage>,
        face: CapturedImage,
    },
    /// Wait a fixed time
    Wait { pause: Pause },
    /// Await every pending document verification, then fetch details
    SettleAndFetchDetails,
    /// Push the reviewed fields to the backend
    PushReview { review: ReviewDetails },
    /// Show a live camera preview
    OpenPreview,
    /// Stop the recording and upload it
    FinishRecording,
    /// Log activity
    Log { message: String },
}

fn narrate(text: impl Into<String>) -> Action {
    Action::Narrate { text: text.into() }
}

fn log(message: impl Into<String>) -> Action {
    Action::Log {
        message: message.into(),
    }
}

/// Pure state transition function
///
/// Takes current state and event, returns new state and actions to execute.
/// This function is completely deterministic and has no side effects.
///
/// # Invalid Transitions
/// An event a non-terminal step cannot handle moves the flow to
/// [`Step::Error`]. Terminal steps ignore every event.
/// This function never panics.
pub fn transition(state: FlowState, event: Event) -> (FlowState, Vec<Action>) {
    if state.step.is_terminal() {
        let message = format!("Ignoring {:?} in terminal step {}", event, state.step);
        return (state, vec![log(message)]);
    }

    match (state.step.clone(), event) {
        // Permission prompts
        (Step::Permission(PermissionKind::Microphone), Event::Acknowledged) => {
            let next = state.advance(Step::Permission(PermissionKind::Audio));
            let actions = vec![
                Action::StartRecording,
                narrate(script::permission_prompt(PermissionKind::Audio)),
            ];
            (next, actions)
        }

        (Step::Permission(PermissionKind::Audio), Event::Acknowledged) => {
            let next = state.advance(Step::Permission(PermissionKind::Location));
            (next, vec![narrate(script::permission_prompt(PermissionKind::Location))])
        }

        (Step::Permission(PermissionKind::Location), Event::Acknowledged) => {
            (state, vec![Action::OpenCamera])
        }

        (Step::Permission(PermissionKind::Location), Event::CameraReady) => {
            let next = state.advance(Step::Capture(DocumentKind::Aadhaar));
            (next, vec![narrate(script::capture_prompt(DocumentKind::Aadhaar))])
        }

        // Recording trouble never blocks the flow
        (_, Event::RecordingUnavailable { message }) => {
            let mut next = state;
            next.notice = Some(script::RECORDING_UNAVAILABLE.to_string());
            (next, vec![log(format!("Recording unavailable: {}", message))])
        }

        (_, Event::PermissionDenied { message }) => {
            let next = state.advance(Step::Blocked {
                message: script::CAMERA_DENIED.to_string(),
            });
            (next, vec![log(format!("Permission denied: {}", message))])
        }

        // Captures
        (Step::Capture(expected), Event::Captured { image }) if image.kind == expected => {
            let mut next = state;
            next.captures.store(image.clone());
            next.notice = None;

            match expected {
                DocumentKind::Aadhaar if next.retry_face => match next.captures.face.clone() {
                    Some(face) => {
                        let next = next.advance(Step::MatchComparing);
                        let actions = vec![
                            narrate(script::COMPARING),
                            Action::VerifyFace {
                                resubmit: Some(image),
                                face,
                            },
                        ];
                        (next, actions)
                    }
                    None => {
                        let next = next.advance(Step::Error {
                            message: script::PROCESSING_ERROR.to_string(),
                        });
                        (next, vec![log("Face retry requested without a held face image")])
                    }
                },
                DocumentKind::Aadhaar => {
                    let next = next.advance(Step::Capture(DocumentKind::Pan));
                    let actions = vec![
                        Action::SubmitDocument { image },
                        narrate(script::AADHAAR_CAPTURED),
                        narrate(script::capture_prompt(DocumentKind::Pan)),
                    ];
                    (next, actions)
                }
                DocumentKind::Pan => {
                    let next = next.advance(Step::Capture(DocumentKind::Face));
                    let actions = vec![
                        Action::SubmitDocument { image },
                        narrate(script::PAN_CAPTURED),
                        narrate(script::capture_prompt(DocumentKind::Face)),
                    ];
                    (next, actions)
                }
                DocumentKind::Face => {
                    let next = next.advance(Step::MatchComparing);
                    let actions = vec![
                        narrate(script::COMPARING),
                        Action::VerifyFace {
                            resubmit: None,
                            face: image,
                        },
                    ];
                    (next, actions)
                }
            }
        }

        (Step::Capture(_), Event::CaptureFailed { message }) => {
            let mut next = state;
            next.notice = Some(script::CAPTURE_RETRY.to_string());
            (next, vec![log(format!("Capture failed: {}", message))])
        }

        // Face-match gate
        (Step::MatchComparing, Event::FaceVerified { outcome }) => match outcome {
            FaceOutcome::Match => {
                let mut next = state.advance(Step::DetailsFetching);
                next.retry_face = false;
                let actions = vec![
                    narrate(script::FACE_MATCHED),
                    Action::Wait {
                        pause: Pause::MatchSettle,
                    },
                    Action::SettleAndFetchDetails,
                ];
                (next, actions)
            }
            FaceOutcome::Mismatch { reason } => {
                let mut next = state.advance(Step::Capture(DocumentKind::Aadhaar));
                next.retry_face = true;
                let actions = vec![
                    log(format!("Face mismatch: {}", reason)),
                    narrate(script::FACE_MISMATCH),
                    narrate(script::capture_prompt(DocumentKind::Aadhaar)),
                ];
                (next, actions)
            }
        },

        (Step::MatchComparing, Event::VerificationFailed { message })
        | (Step::DetailsFetching, Event::VerificationFailed { message }) => {
            let next = state.advance(Step::Error {
                message: script::PROCESSING_ERROR.to_string(),
            });
            (next, vec![log(format!("Verification failed: {}", message))])
        }

        // Details
        (Step::DetailsFetching, Event::DetailsLoaded { details }) => {
            let mut next = state.advance(Step::ReviewEditing);
            next.review = Some(ReviewDetails::from_extracted(&details));
            (next, vec![narrate(script::REVIEW_PROMPT)])
        }

        (Step::DetailsFetching, Event::DetailsFailed { message }) => {
            let next = state.advance(Step::Error {
                message: script::FETCH_ERROR.to_string(),
            });
            (next, vec![log(format!("Details fetch failed: {}", message))])
        }

        // Review
        (Step::ReviewEditing, Event::FieldEdited { label, value }) => {
            let mut next = state;
            let updated = next
                .review
                .as_mut()
                .map(|review| review.set(&label, value))
                .unwrap_or(false);
            if updated {
                (next, vec![])
            } else {
                (next, vec![log(format!("Ignoring edit of unknown field '{}'", label))])
            }
        }

        (Step::ReviewEditing, Event::ReviewConfirmed) => match state.review.clone() {
            Some(review) => {
                let next = state.advance(Step::ReviewSubmitting);
                (next, vec![Action::PushReview { review }])
            }
            None => {
                let next = state.advance(Step::Error {
                    message: script::PROCESSING_ERROR.to_string(),
                });
                (next, vec![log("Review confirmed without details")])
            }
        },

        (Step::ReviewSubmitting, Event::UpdateSettled) => {
            let mut next = state.advance(Step::LegalPrompt);
            next.signatory = next.review.as_ref().and_then(ReviewDetails::display_name);
            let actions = vec![narrate(next.legal_statement()), Action::OpenPreview];
            (next, actions)
        }

        // Legal attestation
        (Step::LegalPrompt, Event::ReadyToRead) => {
            let next = state.advance(Step::LegalRecording);
            let actions = vec![
                Action::OpenPreview,
                Action::Wait {
                    pause: Pause::ReadingTime,
                },
                Action::FinishRecording,
            ];
            (next, actions)
        }

        (Step::LegalRecording, Event::RecordingFinished) => {
            let next = state.advance(Step::Complete);
            let actions = vec![
                narrate(script::thank_you(next.signatory.as_deref())),
                log("KYC flow completed"),
            ];
            (next, actions)
        }

        // All other invalid transitions
        (step, event) => {
            let message = format!("Invalid state transition: {} cannot handle {:?}", step, event);
            let next = state.advance(Step::Error {
                message: script::PROCESSING_ERROR.to_string(),
            });
            (next, vec![log(message)])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kyc_core::{FIELD_FULL_NAME, PLACEHOLDER};

    fn image(kind: DocumentKind, payload: &str) -> CapturedImage {
        CapturedImage::from_bytes(kind, "image/png", payload.as_bytes())
    }

    fn captured(kind: DocumentKind, payload: &str) -> Event {
        Event::Captured {
            image: image(kind, payload),
        }
    }

    fn at(step: Step) -> FlowState {
        FlowState {
            step,
            ..FlowState::new()
        }
    }

    fn narrations(actions: &[Action]) -> Vec<&str> {
        actions
            .iter()
            .filter_map(|a| match a {
                Action::Narrate { text } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Drive a fresh state up to the face-match gate
    fn through_face_capture() -> FlowState {
        let mut state = at(Step::Capture(DocumentKind::Aadhaar));
        for (kind, payload) in [
            (DocumentKind::Aadhaar, "a1"),
            (DocumentKind::Pan, "p1"),
            (DocumentKind::Face, "f1"),
        ] {
            state = transition(state, captured(kind, payload)).0;
        }
        state
    }

    #[test]
    fn test_initial_state_narrates_microphone_prompt() {
        let state = FlowState::new();
        assert_eq!(state.step.label(), "permission:mic");
        assert_eq!(
            narrations(&state.initial_actions()),
            vec![script::permission_prompt(PermissionKind::Microphone)]
        );
    }

    #[test]
    fn test_permissions_advance_only_on_acknowledgment() {
        let (state, actions) = transition(FlowState::new(), Event::Acknowledged);
        assert_eq!(state.step, Step::Permission(PermissionKind::Audio));
        assert_eq!(actions[0], Action::StartRecording);

        let (state, actions) = transition(state, Event::Acknowledged);
        assert_eq!(state.step, Step::Permission(PermissionKind::Location));
        assert!(!actions.contains(&Action::StartRecording));

        // Acknowledging location opens the camera but waits for it
        let (state, actions) = transition(state, Event::Acknowledged);
        assert_eq!(state.step, Step::Permission(PermissionKind::Location));
        assert_eq!(actions, vec![Action::OpenCamera]);

        let (state, _) = transition(state, Event::CameraReady);
        assert_eq!(state.step, Step::Capture(DocumentKind::Aadhaar));
    }

    #[test]
    fn test_non_acknowledgment_events_do_not_advance_permissions() {
        let (state, _) = transition(FlowState::new(), Event::ReadyToRead);
        assert!(matches!(state.step, Step::Error { .. }));

        let (state, _) = transition(FlowState::new(), Event::CameraReady);
        assert!(matches!(state.step, Step::Error { .. }));
    }

    #[test]
    fn test_recording_unavailable_sets_notice_until_next_step() {
        let (state, _) = transition(FlowState::new(), Event::Acknowledged);
        let (state, _) = transition(
            state,
            Event::RecordingUnavailable {
                message: "display denied".to_string(),
            },
        );
        assert_eq!(state.step, Step::Permission(PermissionKind::Audio));
        assert_eq!(state.notice.as_deref(), Some(script::RECORDING_UNAVAILABLE));

        let (state, _) = transition(state, Event::Acknowledged);
        assert!(state.notice.is_none());
    }

    #[test]
    fn test_camera_denied_blocks() {
        let (state, _) = transition(
            at(Step::Permission(PermissionKind::Location)),
            Event::PermissionDenied {
                message: "NotAllowedError".to_string(),
            },
        );
        assert_eq!(
            state.step,
            Step::Blocked {
                message: script::CAMERA_DENIED.to_string()
            }
        );
    }

    #[test]
    fn test_document_captures_are_fire_and_forget() {
        let (state, actions) = transition(
            at(Step::Capture(DocumentKind::Aadhaar)),
            captured(DocumentKind::Aadhaar, "a1"),
        );
        assert_eq!(state.step, Step::Capture(DocumentKind::Pan));
        assert!(matches!(&actions[0], Action::SubmitDocument { image } if image.kind == DocumentKind::Aadhaar));
        assert_eq!(
            narrations(&actions),
            vec![
                script::AADHAAR_CAPTURED,
                script::capture_prompt(DocumentKind::Pan)
            ]
        );

        let (state, actions) = transition(state, captured(DocumentKind::Pan, "p1"));
        assert_eq!(state.step, Step::Capture(DocumentKind::Face));
        assert!(matches!(&actions[0], Action::SubmitDocument { image } if image.kind == DocumentKind::Pan));
        assert!(state.captures.aadhaar.is_some());
        assert!(state.captures.pan.is_some());
    }

    #[test]
    fn test_face_capture_awaits_verdict() {
        let state = through_face_capture();
        assert_eq!(state.step, Step::MatchComparing);
        assert!(state.captures.face.is_some());
    }

    #[test]
    fn test_wrong_capture_kind_is_invalid() {
        let (state, _) = transition(
            at(Step::Capture(DocumentKind::Pan)),
            captured(DocumentKind::Face, "f1"),
        );
        assert!(matches!(state.step, Step::Error { .. }));
    }

    #[test]
    fn test_capture_failure_keeps_step_with_notice() {
        let (state, _) = transition(
            at(Step::Capture(DocumentKind::Pan)),
            Event::CaptureFailed {
                message: "no frame".to_string(),
            },
        );
        assert_eq!(state.step, Step::Capture(DocumentKind::Pan));
        assert_eq!(state.notice.as_deref(), Some(script::CAPTURE_RETRY));
    }

    #[test]
    fn test_face_mismatch_routes_back_to_aadhaar() {
        let (state, actions) = transition(
            through_face_capture(),
            Event::FaceVerified {
                outcome: FaceOutcome::Mismatch {
                    reason: "face_match=false".to_string(),
                },
            },
        );
        assert_eq!(state.step, Step::Capture(DocumentKind::Aadhaar));
        assert!(state.retry_face);
        assert!(narrations(&actions).contains(&script::FACE_MISMATCH));
    }

    #[test]
    fn test_retry_aadhaar_resubmits_held_face() {
        let held_face = image(DocumentKind::Face, "f1");
        let (state, _) = transition(
            through_face_capture(),
            Event::FaceVerified {
                outcome: FaceOutcome::Mismatch {
                    reason: "blurry".to_string(),
                },
            },
        );

        let (state, actions) = transition(state, captured(DocumentKind::Aadhaar, "a2"));
        assert_eq!(state.step, Step::MatchComparing);
        assert!(!actions
            .iter()
            .any(|a| matches!(a, Action::SubmitDocument { .. })));
        assert!(actions.contains(&Action::VerifyFace {
            resubmit: Some(image(DocumentKind::Aadhaar, "a2")),
            face: held_face,
        }));
    }

    #[test]
    fn test_face_match_clears_retry_and_waits_before_fetch() {
        let mut state = through_face_capture();
        state.retry_face = true;

        let (state, actions) = transition(
            state,
            Event::FaceVerified {
                outcome: FaceOutcome::Match,
            },
        );
        assert_eq!(state.step, Step::DetailsFetching);
        assert!(!state.retry_face);
        assert_eq!(
            actions,
            vec![
                Action::Narrate {
                    text: script::FACE_MATCHED.to_string()
                },
                Action::Wait {
                    pause: Pause::MatchSettle
                },
                Action::SettleAndFetchDetails,
            ]
        );
    }

    #[test]
    fn test_face_verification_failure_is_terminal() {
        let (state, _) = transition(
            through_face_capture(),
            Event::VerificationFailed {
                message: "500".to_string(),
            },
        );
        assert_eq!(
            state.step,
            Step::Error {
                message: script::PROCESSING_ERROR.to_string()
            }
        );

        // No further transitions
        let (after, actions) = transition(state.clone(), Event::Acknowledged);
        assert_eq!(after, state);
        assert!(matches!(actions.as_slice(), [Action::Log { .. }]));
    }

    #[test]
    fn test_details_failure_messages() {
        let (state, _) = transition(
            at(Step::DetailsFetching),
            Event::VerificationFailed {
                message: "pan rejected".to_string(),
            },
        );
        assert_eq!(state.step.label(), "error");
        assert!(matches!(&state.step, Step::Error { message } if message == script::PROCESSING_ERROR));

        let (state, _) = transition(
            at(Step::DetailsFetching),
            Event::DetailsFailed {
                message: "500".to_string(),
            },
        );
        assert!(matches!(&state.step, Step::Error { message } if message == script::FETCH_ERROR));
    }

    #[test]
    fn test_review_edit_and_confirm() {
        let details: ExtractedDetails = [("aadhaar_name", "ASHA R")].into_iter().collect();
        let (state, _) = transition(at(Step::DetailsFetching), Event::DetailsLoaded { details });
        assert_eq!(state.step, Step::ReviewEditing);
        let review = state.review.as_ref().unwrap();
        assert_eq!(review.get(FIELD_FULL_NAME), Some("ASHA R"));
        assert_eq!(review.get("PAN Number"), Some(PLACEHOLDER));

        let (state, actions) = transition(
            state,
            Event::FieldEdited {
                label: FIELD_FULL_NAME.to_string(),
                value: "Asha Rao".to_string(),
            },
        );
        assert!(actions.is_empty());

        let (state, actions) = transition(state, Event::ReviewConfirmed);
        assert_eq!(state.step, Step::ReviewSubmitting);
        match &actions[0] {
            Action::PushReview { review } => {
                assert_eq!(review.get(FIELD_FULL_NAME), Some("Asha Rao"))
            }
            other => panic!("unexpected action {:?}", other),
        }

        let (state, actions) = transition(state, Event::UpdateSettled);
        assert_eq!(state.step, Step::LegalPrompt);
        assert_eq!(state.signatory.as_deref(), Some("Asha Rao"));
        assert!(narrations(&actions)[0].starts_with("Asha Rao, please read the following statement"));
        assert!(actions.contains(&Action::OpenPreview));
    }

    #[test]
    fn test_placeholder_name_is_not_a_signatory() {
        let (state, _) = transition(
            at(Step::DetailsFetching),
            Event::DetailsLoaded {
                details: ExtractedDetails::new(),
            },
        );
        let (state, _) = transition(state, Event::ReviewConfirmed);
        let (state, _) = transition(state, Event::UpdateSettled);
        assert!(state.signatory.is_none());
        assert!(state.legal_statement().starts_with("Please read"));
    }

    #[test]
    fn test_legal_recording_to_completion() {
        let mut state = at(Step::LegalPrompt);
        state.signatory = Some("Asha Rao".to_string());

        let (state, actions) = transition(state, Event::ReadyToRead);
        assert_eq!(state.step, Step::LegalRecording);
        assert_eq!(
            actions,
            vec![
                Action::OpenPreview,
                Action::Wait {
                    pause: Pause::ReadingTime
                },
                Action::FinishRecording,
            ]
        );

        let (state, actions) = transition(state, Event::RecordingFinished);
        assert_eq!(state.step, Step::Complete);
        assert_eq!(
            narrations(&actions),
            vec!["Thank you, Asha Rao! Your KYC is completed."]
        );
    }

    #[test]
    fn test_terminal_states_ignore_all_events() {
        for step in [
            Step::Complete,
            Step::Blocked {
                message: script::CAMERA_DENIED.to_string(),
            },
            Step::Error {
                message: script::PROCESSING_ERROR.to_string(),
            },
        ] {
            let state = at(step.clone());
            let (after, _) = transition(state, Event::ReadyToRead);
            assert_eq!(after.step, step);
        }
    }

    #[test]
    fn test_step_labels() {
        assert_eq!(Step::MatchComparing.to_string(), "match:comparing");
        assert_eq!(Step::LegalPrompt.label(), "confirm:legal-prompt");
        assert_eq!(Step::Capture(DocumentKind::Pan).label(), "capture:pan");
    }
}

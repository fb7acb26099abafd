//! Flow controller: executes state machine actions
//!
//! The controller owns the [`FlowState`] and is the only place that calls
//! [`transition`]. Each user [`Intent`] becomes an [`Event`]; the actions a
//! transition returns run against the backend and the media devices, and
//! their outcomes are queued as further events until the flow settles.
//!
//! Screens change while a dispatch is still running (comparing faces,
//! fetching details, recording the attestation). Front ends that want to
//! show them call [`FlowController::subscribe`] and draw every [`View`]
//! published there.

use std::collections::VecDeque;
use std::sync::Arc;

use kyc_backend::VerificationBackend;
use kyc_core::config::{RecordingConfig, TimingConfig};
use kyc_core::fail_open::fail_open;
use kyc_core::{DocumentKind, KycConfig, SessionId};
use kyc_media::{AudioSink, MediaDevices, MediaStream, Recorder, SpeechSynth};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::narration::Narrator;
use crate::pending::PendingVerifications;
use crate::state_machine::{transition, Action, Event, FlowState, Pause, Step};
use crate::verifier::Verifier;
use crate::view::{render, Control, View};

/// What the user did on the current screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// Pressed "Allow" on a permission prompt
    Allow,
    /// Pressed the capture button of the current capture step
    Capture,
    /// Changed a review field
    EditField { label: String, value: String },
    /// Confirmed the review form
    ConfirmDetails,
    /// Ready to read the attestation
    ReadyToRead,
}

pub struct FlowController {
    state: FlowState,
    verifier: Verifier,
    narrator: Narrator,
    media: Arc<dyn MediaDevices>,
    timing: TimingConfig,
    recording: RecordingConfig,
    recorder: Option<Recorder>,
    camera: Option<MediaStream>,
    pending: PendingVerifications,
    /// Actions not yet executed, oldest first
    actions: VecDeque<Action>,
    /// Outcomes not yet fed to the state machine
    events: VecDeque<Event>,
    views: Option<mpsc::UnboundedSender<View>>,
    published: Option<(&'static str, Option<String>)>,
    started: bool,
}

impl FlowController {
    pub fn new(
        config: &KycConfig,
        backend: Arc<dyn VerificationBackend>,
        media: Arc<dyn MediaDevices>,
        synth: Arc<dyn SpeechSynth>,
        audio: Arc<dyn AudioSink>,
    ) -> Self {
        let mut narrator = Narrator::new(backend.clone(), audio, synth);
        if !config.narration.remote_tts {
            narrator = narrator.on_device_only();
        }

        Self {
            state: FlowState::new().with_lender(config.attestation.lender.clone()),
            verifier: Verifier::new(backend),
            narrator,
            media,
            timing: config.timing.clone(),
            recording: config.recording.clone(),
            recorder: None,
            camera: None,
            pending: PendingVerifications::new(),
            actions: VecDeque::new(),
            events: VecDeque::new(),
            views: None,
            published: None,
            started: false,
        }
    }

    /// Receive a [`View`] every time the screen changes
    ///
    /// A view is published as soon as the step (or its notice) changes,
    /// before that step's narration and other side effects run. Only the
    /// latest subscriber receives views.
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<View> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.views = Some(tx);
        self.published = None;
        self.publish();
        rx
    }

    pub fn state(&self) -> &FlowState {
        &self.state
    }

    pub fn view(&self) -> View {
        render(&self.state)
    }

    pub fn session(&self) -> Option<SessionId> {
        self.verifier.session()
    }

    /// Number of document verifications not yet joined
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Whether actions or events are still waiting to run
    pub fn is_busy(&self) -> bool {
        !self.actions.is_empty() || !self.events.is_empty()
    }

    /// Run the side effects of the initial step
    pub async fn start(&mut self) -> View {
        if self.started {
            debug!("Flow already started");
            return self.resume().await;
        }
        self.started = true;
        info!("Starting KYC flow at {}", self.state.step);

        self.publish();
        tokio::task::yield_now().await;
        self.actions.extend(self.state.initial_actions());
        self.settle().await;
        self.view()
    }

    /// Apply a user intent and run the flow until it waits for the user again
    ///
    /// # Cancel safety
    /// Queued work lives on the controller. If this future is dropped, the
    /// action in progress is abandoned and everything after it runs on the
    /// next [`dispatch`](Self::dispatch) or [`resume`](Self::resume).
    pub async fn dispatch(&mut self, intent: Intent) -> View {
        self.settle().await;

        match self.event_for(intent).await {
            Some(event) => {
                self.events.push_back(event);
                self.settle().await;
            }
            None => debug!("Intent not offered at {}", self.state.step),
        }
        self.view()
    }

    /// Finish work left behind by an interrupted dispatch
    pub async fn resume(&mut self) -> View {
        self.settle().await;
        self.view()
    }

    async fn event_for(&self, intent: Intent) -> Option<Event> {
        let view = self.view();
        match intent {
            Intent::Allow if view.offers(Control::Allow) => Some(Event::Acknowledged),
            Intent::Capture => match self.state.step {
                Step::Capture(kind) if view.offers(Control::Capture(kind)) => {
                    Some(self.capture(kind).await)
                }
                _ => None,
            },
            Intent::EditField { label, value } if self.state.step == Step::ReviewEditing => {
                Some(Event::FieldEdited { label, value })
            }
            Intent::ConfirmDetails if view.offers(Control::ConfirmDetails) => {
                Some(Event::ReviewConfirmed)
            }
            Intent::ReadyToRead if view.offers(Control::ReadyToRead) => Some(Event::ReadyToRead),
            _ => None,
        }
    }

    async fn capture(&self, kind: DocumentKind) -> Event {
        let Some(camera) = self.camera.as_ref() else {
            return Event::CaptureFailed {
                message: "Camera is not open".to_string(),
            };
        };

        match self.media.grab_frame(camera, kind).await {
            Ok(image) => {
                debug!("Captured {} frame ({} bytes encoded)", kind, image.encoded_len());
                Event::Captured { image }
            }
            Err(e) => Event::CaptureFailed {
                message: e.to_string(),
            },
        }
    }

    /// Drain queued actions and events until the flow waits for the user
    ///
    /// Actions of a transition run before the events they produce are
    /// applied, in order.
    async fn settle(&mut self) {
        loop {
            if let Some(action) = self.actions.pop_front() {
                if let Some(event) = self.execute(action).await {
                    self.events.push_back(event);
                }
                continue;
            }

            let Some(event) = self.events.pop_front() else {
                break;
            };
            self.apply(event);
            // Let subscribers draw the new screen before its side effects run
            tokio::task::yield_now().await;
        }
    }

    fn apply(&mut self, event: Event) {
        let before = self.state.step.clone();
        let (next, actions) = transition(std::mem::take(&mut self.state), event);
        self.state = next;

        if self.state.step != before {
            info!("Step: {} -> {}", before, self.state.step);
            if let Step::Error { message } | Step::Blocked { message } = &self.state.step {
                error!("Flow stopped at {}: {}", self.state.step, message);
            }
        }

        self.publish();
        self.actions.extend(actions);
    }

    fn publish(&mut self) {
        let Some(views) = self.views.as_ref() else {
            return;
        };

        let key = (self.state.step.label(), self.state.notice.clone());
        if self.published.as_ref() == Some(&key) {
            return;
        }

        if views.send(render(&self.state)).is_err() {
            debug!("View subscriber dropped");
            self.views = None;
        }
        self.published = Some(key);
    }

    async fn execute(&mut self, action: Action) -> Option<Event> {
        match action {
            Action::Narrate { text } => {
                let channel = self.narrator.speak(&text).await;
                debug!("Narrated via {:?}", channel);
                None
            }

            Action::StartRecording => {
                match Recorder::start(self.media.as_ref(), &self.recording.mime_type).await {
                    Ok(recorder) => {
                        self.recorder = Some(recorder);
                        None
                    }
                    Err(e) => Some(Event::RecordingUnavailable {
                        message: e.to_string(),
                    }),
                }
            }

            Action::OpenCamera => match self.media.request_camera().await {
                Ok(stream) => {
                    self.camera = Some(stream);
                    Some(Event::CameraReady)
                }
                Err(e) => Some(Event::PermissionDenied {
                    message: e.to_string(),
                }),
            },

            Action::SubmitDocument { image } => {
                let kind = image.kind;
                let handle = self.verifier.spawn_submit(image);
                self.pending.track(kind, handle);
                None
            }

            Action::VerifyFace { resubmit, face } => {
                if let Some(aadhaar) = resubmit {
                    if let Err(e) = self.verifier.submit(&aadhaar).await {
                        return Some(Event::VerificationFailed {
                            message: e.to_string(),
                        });
                    }
                }

                match self.verifier.submit(&face).await {
                    Ok(response) => Some(Event::FaceVerified {
                        outcome: response.face_outcome(),
                    }),
                    Err(e) => Some(Event::VerificationFailed {
                        message: e.to_string(),
                    }),
                }
            }

            Action::Wait { pause } => {
                let duration = match pause {
                    Pause::MatchSettle => self.timing.match_settle(),
                    Pause::ReadingTime => self.timing.recording_duration(),
                };
                debug!("Waiting {:?} ({:?})", duration, pause);
                tokio::time::sleep(duration).await;
                None
            }

            Action::SettleAndFetchDetails => {
                if let Err(e) = self.pending.join_all().await {
                    return Some(Event::VerificationFailed {
                        message: e.to_string(),
                    });
                }

                match self.verifier.fetch_details().await {
                    Ok(details) => {
                        info!("Loaded {} extracted fields", details.len());
                        Some(Event::DetailsLoaded { details })
                    }
                    Err(e) => Some(Event::DetailsFailed {
                        message: e.to_string(),
                    }),
                }
            }

            Action::PushReview { review } => {
                let verifier = self.verifier.clone();
                fail_open("review_update", || async move {
                    verifier.update_details(&review).await
                })
                .await;
                Some(Event::UpdateSettled)
            }

            Action::OpenPreview => {
                let live = self.camera.as_ref().is_some_and(MediaStream::is_active);
                if !live {
                    match self.media.request_camera().await {
                        Ok(stream) => self.camera = Some(stream),
                        Err(e) => warn!("Camera preview unavailable: {}", e),
                    }
                }
                None
            }

            Action::FinishRecording => {
                self.finish_recording().await;
                if let Some(camera) = self.camera.take() {
                    camera.stop();
                }
                Some(Event::RecordingFinished)
            }

            Action::Log { message } => {
                info!("{}", message);
                None
            }
        }
    }

    async fn finish_recording(&mut self) {
        let Some(recorder) = self.recorder.take() else {
            warn!("No recording to upload");
            return;
        };

        let recording = match recorder.stop(self.media.as_ref()).await {
            Ok(recording) => recording,
            Err(e) => {
                warn!("Failed to stop recording: {}", e);
                return;
            }
        };

        let verifier = self.verifier.clone();
        let config = self.recording.clone();
        if let Some(receipt) = fail_open("recording_upload", || async move {
            verifier.upload_recording(recording, &config).await
        })
        .await
        {
            info!("Recording uploaded: {:?}", receipt.url);
        }
    }
}

//! Terminal front end for the flow controller

use anyhow::{bail, Result};
use async_trait::async_trait;
use kyc_flow::{Control, FlowController, Intent, VideoFeed, View};
use kyc_media::SpeechSynth;
use std::future::Future;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines, Stdin};
use tokio::sync::mpsc::UnboundedReceiver;

/// "On-device" speech for a terminal: prints what would be spoken
pub struct TerminalSpeech;

#[async_trait]
impl SpeechSynth for TerminalSpeech {
    async fn speak(&self, text: &str) -> kyc_core::Result<()> {
        println!("  (voice) {}", text);
        Ok(())
    }
}

pub struct TerminalDriver {
    input: Lines<BufReader<Stdin>>,
}

impl Default for TerminalDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalDriver {
    pub fn new() -> Self {
        Self {
            input: BufReader::new(tokio::io::stdin()).lines(),
        }
    }

    /// Drive `flow` until it reaches a screen without controls
    ///
    /// Screens are printed as the controller publishes them, including the
    /// ones shown while a step is still working.
    pub async fn run(&mut self, flow: &mut FlowController) -> Result<View> {
        let mut views = flow.subscribe();
        let mut view = follow(&mut views, flow.start()).await;

        loop {
            let Some(control) = view.controls.first().copied() else {
                return Ok(view);
            };

            if control == Control::ConfirmDetails {
                for field in &view.fields {
                    let answer = self
                        .ask(&format!("{} [{}]: ", field.label, field.value))
                        .await?;
                    let answer = answer.trim();
                    if !answer.is_empty() && answer != field.value {
                        flow.dispatch(Intent::EditField {
                            label: field.label.clone(),
                            value: answer.to_string(),
                        })
                        .await;
                    }
                }
            } else {
                self.ask(&format!("Press Enter to {} ", control.label()))
                    .await?;
            }

            view = follow(&mut views, flow.dispatch(intent_for(control))).await;
        }
    }

    async fn ask(&mut self, prompt: &str) -> Result<String> {
        let mut stdout = tokio::io::stdout();
        stdout.write_all(prompt.as_bytes()).await?;
        stdout.flush().await?;

        match self.input.next_line().await? {
            Some(line) => Ok(line),
            None => bail!("Input closed before the flow finished"),
        }
    }
}

/// Print published views while `work` runs, then whatever is left
async fn follow(views: &mut UnboundedReceiver<View>, work: impl Future<Output = View>) -> View {
    tokio::pin!(work);
    let view = loop {
        tokio::select! {
            biased;
            Some(published) = views.recv() => print_view(&published),
            view = &mut work => break view,
        }
    };
    while let Ok(published) = views.try_recv() {
        print_view(&published);
    }
    view
}

fn intent_for(control: Control) -> Intent {
    match control {
        Control::Allow => Intent::Allow,
        Control::Capture(_) => Intent::Capture,
        Control::ConfirmDetails => Intent::ConfirmDetails,
        Control::ReadyToRead => Intent::ReadyToRead,
    }
}

fn print_view(view: &View) {
    println!();
    if view.show_logo {
        println!("KYC Verification");
    }
    println!("[{}] {}", view.step, view.heading);

    if let Some(notice) = &view.notice {
        println!("! {}", notice);
    }
    match view.video {
        Some(VideoFeed::Camera) => println!("  [camera]"),
        Some(VideoFeed::ConfirmPreview) => println!("  [camera preview]"),
        Some(VideoFeed::RecordingPreview) => println!("  [recording]"),
        None => {}
    }
    if let Some(statement) = &view.statement {
        println!("\n  \"{}\"\n", statement);
    }
    if !view.fields.is_empty() {
        let width = view.fields.iter().map(|f| f.label.len()).max().unwrap_or(0);
        for field in &view.fields {
            println!("  {:width$}  {}", field.label, field.value, width = width);
        }
    }
}

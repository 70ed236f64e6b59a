//! Renderer command dispatch.
//!
//! Turns a logical command into the ordered AVTransport calls that carry it
//! out. Each call opens its own transport session; nothing is retried.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::protocol_constants::{DEFAULT_INSTANCE_ID, NORMAL_PLAY_SPEED};
use crate::services::renderer_registry::Renderer;
use crate::upnp::description::DescriptionError;
use crate::upnp::soap::SoapError;
use crate::upnp::{TransportConnector, TransportControl};

/// Single-call transport commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RendererAction {
    Play,
    Stop,
    Previous,
    Next,
    Pause,
}

impl fmt::Display for RendererAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Play => "Play",
            Self::Stop => "Stop",
            Self::Previous => "Previous",
            Self::Next => "Next",
            Self::Pause => "Pause",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum PlaybackError {
    /// The renderer could not be reached or has no AVTransport service.
    #[error("cannot control renderer '{renderer}': {source}")]
    Connect {
        renderer: String,
        #[source]
        source: DescriptionError,
    },

    /// The renderer rejected a transport command.
    #[error("{action} failed on renderer '{renderer}': {source}")]
    Command {
        action: RendererAction,
        renderer: String,
        #[source]
        source: SoapError,
    },
}

pub type PlaybackResult<T> = Result<T, PlaybackError>;

/// A file that could not be added to the renderer queue.
#[derive(Debug)]
pub struct QueueFailure {
    pub uri: String,
    pub reason: SoapError,
}

/// Outcome of the trailing `Play` of a queue.
#[derive(Debug)]
pub enum PlayOutcome {
    /// The queue was empty; nothing was sent.
    NotSent,
    Started,
    Failed(SoapError),
}

/// Summary of a [`ActionDispatcher::play_queue`] run.
#[derive(Debug)]
pub struct QueueReport {
    /// Number of files the renderer accepted.
    pub enqueued: usize,
    pub failures: Vec<QueueFailure>,
    pub play: PlayOutcome,
}

impl QueueReport {
    /// True when every file was queued and playback started.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty() && matches!(self.play, PlayOutcome::Started)
    }
}

/// Sends transport commands to renderers.
pub struct ActionDispatcher {
    connector: Arc<dyn TransportConnector>,
}

impl ActionDispatcher {
    pub fn new(connector: Arc<dyn TransportConnector>) -> Self {
        Self { connector }
    }

    async fn connect(&self, renderer: &Renderer) -> PlaybackResult<Box<dyn TransportControl>> {
        self.connector
            .connect(&renderer.location)
            .await
            .map_err(|source| PlaybackError::Connect {
                renderer: renderer.name.clone(),
                source,
            })
    }

    /// Issues a single transport command on instance 0.
    ///
    /// # Errors
    /// [`PlaybackError::Connect`] if the renderer cannot be reached,
    /// [`PlaybackError::Command`] if it rejects the command.
    pub async fn perform_action(
        &self,
        renderer: &Renderer,
        action: RendererAction,
    ) -> PlaybackResult<()> {
        let transport = self.connect(renderer).await?;
        log::info!("[Dispatcher] {} on {}", action, renderer.name);

        let result = match action {
            RendererAction::Play => transport.play(DEFAULT_INSTANCE_ID, NORMAL_PLAY_SPEED).await,
            RendererAction::Stop => transport.stop(DEFAULT_INSTANCE_ID).await,
            RendererAction::Previous => transport.previous(DEFAULT_INSTANCE_ID).await,
            RendererAction::Next => transport.next(DEFAULT_INSTANCE_ID).await,
            RendererAction::Pause => transport.pause(DEFAULT_INSTANCE_ID).await,
        };

        result.map_err(|source| PlaybackError::Command {
            action,
            renderer: renderer.name.clone(),
            source,
        })
    }

    /// Replaces the renderer queue with `files` and starts playback.
    ///
    /// The first file becomes the current media, every following file is
    /// queued as next media, then `Play` is sent regardless of enqueue
    /// failures. Per-file failures are logged and reported, not returned.
    ///
    /// # Errors
    /// Only [`PlaybackError::Connect`]; once connected the report carries
    /// every outcome.
    pub async fn play_queue(
        &self,
        renderer: &Renderer,
        files: &[String],
    ) -> PlaybackResult<QueueReport> {
        let mut report = QueueReport {
            enqueued: 0,
            failures: Vec::new(),
            play: PlayOutcome::NotSent,
        };
        if files.is_empty() {
            log::warn!("[Dispatcher] Nothing to queue on {}", renderer.name);
            return Ok(report);
        }

        let transport = self.connect(renderer).await?;

        for (i, uri) in files.iter().enumerate() {
            log::info!("[Dispatcher] Sending media {} to {}", uri, renderer.name);
            let result = if i == 0 {
                transport
                    .set_av_transport_uri(DEFAULT_INSTANCE_ID, uri, "")
                    .await
            } else {
                transport
                    .set_next_av_transport_uri(DEFAULT_INSTANCE_ID, uri, "")
                    .await
            };

            match result {
                Ok(()) => report.enqueued += 1,
                Err(e) => {
                    log::warn!("[Dispatcher] Cannot queue {}: {}", uri, e);
                    report.failures.push(QueueFailure {
                        uri: uri.clone(),
                        reason: e,
                    });
                }
            }
        }

        report.play = match transport.play(DEFAULT_INSTANCE_ID, NORMAL_PLAY_SPEED).await {
            Ok(()) => PlayOutcome::Started,
            Err(e) => {
                log::warn!("[Dispatcher] Play failed on {}: {}", renderer.name, e);
                PlayOutcome::Failed(e)
            }
        };

        log::info!(
            "[Dispatcher] Queued {}/{} file(s) on {}",
            report.enqueued,
            files.len(),
            renderer.name
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    use crate::upnp::description::DescriptionResult;
    use crate::upnp::soap::SoapResult;

    #[derive(Clone, Default)]
    struct RecordingTransport {
        calls: Arc<Mutex<Vec<String>>>,
        fail_uri: Option<String>,
        fail_play: bool,
    }

    impl RecordingTransport {
        fn record(&self, call: String) {
            self.calls.lock().unwrap().push(call);
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn rejected() -> SoapError {
            SoapError::HttpStatus {
                status: 500,
                reason: "Internal Server Error".to_string(),
                fault: None,
            }
        }
    }

    #[async_trait]
    impl TransportControl for RecordingTransport {
        async fn play(&self, instance: u32, speed: &str) -> SoapResult<()> {
            self.record(format!("Play({instance},{speed})"));
            if self.fail_play {
                return Err(Self::rejected());
            }
            Ok(())
        }

        async fn pause(&self, instance: u32) -> SoapResult<()> {
            self.record(format!("Pause({instance})"));
            Ok(())
        }

        async fn stop(&self, instance: u32) -> SoapResult<()> {
            self.record(format!("Stop({instance})"));
            Ok(())
        }

        async fn next(&self, instance: u32) -> SoapResult<()> {
            self.record(format!("Next({instance})"));
            Ok(())
        }

        async fn previous(&self, instance: u32) -> SoapResult<()> {
            self.record(format!("Previous({instance})"));
            Err(Self::rejected())
        }

        async fn set_av_transport_uri(
            &self,
            instance: u32,
            uri: &str,
            metadata: &str,
        ) -> SoapResult<()> {
            self.record(format!("SetAVTransportURI({instance},{uri},{metadata})"));
            if self.fail_uri.as_deref() == Some(uri) {
                return Err(Self::rejected());
            }
            Ok(())
        }

        async fn set_next_av_transport_uri(
            &self,
            instance: u32,
            uri: &str,
            metadata: &str,
        ) -> SoapResult<()> {
            self.record(format!("SetNextAVTransportURI({instance},{uri},{metadata})"));
            if self.fail_uri.as_deref() == Some(uri) {
                return Err(Self::rejected());
            }
            Ok(())
        }
    }

    struct MockConnector {
        transport: Option<RecordingTransport>,
    }

    #[async_trait]
    impl TransportConnector for MockConnector {
        async fn connect(&self, location: &str) -> DescriptionResult<Box<dyn TransportControl>> {
            match &self.transport {
                Some(t) => Ok(Box::new(t.clone())),
                None => Err(DescriptionError::ServiceNotFound {
                    location: location.to_string(),
                    service: "AVTransport",
                }),
            }
        }
    }

    fn dispatcher(transport: &RecordingTransport) -> ActionDispatcher {
        ActionDispatcher::new(Arc::new(MockConnector {
            transport: Some(transport.clone()),
        }))
    }

    fn renderer() -> Renderer {
        Renderer {
            name: "Living Room TV".to_string(),
            location: "http://192.168.1.30:49152/description.xml".to_string(),
            used: true,
        }
    }

    fn files(uris: &[&str]) -> Vec<String> {
        uris.iter().map(|u| u.to_string()).collect()
    }

    #[tokio::test]
    async fn queue_sets_first_then_next_then_plays() {
        let transport = RecordingTransport::default();
        let report = dispatcher(&transport)
            .play_queue(&renderer(), &files(&["f1", "f2", "f3"]))
            .await
            .unwrap();

        assert_eq!(
            transport.calls(),
            vec![
                "SetAVTransportURI(0,f1,)",
                "SetNextAVTransportURI(0,f2,)",
                "SetNextAVTransportURI(0,f3,)",
                "Play(0,1)",
            ]
        );
        assert_eq!(report.enqueued, 3);
        assert!(report.is_complete());
    }

    #[tokio::test]
    async fn queue_failure_does_not_stop_the_rest() {
        let transport = RecordingTransport {
            fail_uri: Some("f2".to_string()),
            ..Default::default()
        };
        let report = dispatcher(&transport)
            .play_queue(&renderer(), &files(&["f1", "f2", "f3"]))
            .await
            .unwrap();

        assert_eq!(
            transport.calls(),
            vec![
                "SetAVTransportURI(0,f1,)",
                "SetNextAVTransportURI(0,f2,)",
                "SetNextAVTransportURI(0,f3,)",
                "Play(0,1)",
            ]
        );
        assert_eq!(report.enqueued, 2);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].uri, "f2");
        assert!(matches!(report.play, PlayOutcome::Started));
        assert!(!report.is_complete());
    }

    #[tokio::test]
    async fn play_is_sent_even_when_first_file_fails() {
        let transport = RecordingTransport {
            fail_uri: Some("f1".to_string()),
            fail_play: true,
            ..Default::default()
        };
        let report = dispatcher(&transport)
            .play_queue(&renderer(), &files(&["f1"]))
            .await
            .unwrap();

        assert_eq!(
            transport.calls(),
            vec!["SetAVTransportURI(0,f1,)", "Play(0,1)"]
        );
        assert_eq!(report.enqueued, 0);
        assert!(matches!(report.play, PlayOutcome::Failed(_)));
    }

    #[tokio::test]
    async fn empty_queue_sends_nothing() {
        let transport = RecordingTransport::default();
        let report = dispatcher(&transport)
            .play_queue(&renderer(), &[])
            .await
            .unwrap();

        assert!(transport.calls().is_empty());
        assert!(matches!(report.play, PlayOutcome::NotSent));
    }

    #[tokio::test]
    async fn connect_failure_aborts_before_any_call() {
        let dispatcher = ActionDispatcher::new(Arc::new(MockConnector { transport: None }));

        let err = dispatcher
            .play_queue(&renderer(), &files(&["f1"]))
            .await
            .unwrap_err();
        assert!(matches!(err, PlaybackError::Connect { .. }));

        let err = dispatcher
            .perform_action(&renderer(), RendererAction::Stop)
            .await
            .unwrap_err();
        assert!(matches!(err, PlaybackError::Connect { .. }));
    }

    #[tokio::test]
    async fn actions_map_to_single_calls() {
        let transport = RecordingTransport::default();
        let dispatcher = dispatcher(&transport);

        for action in [
            RendererAction::Play,
            RendererAction::Pause,
            RendererAction::Stop,
            RendererAction::Next,
        ] {
            dispatcher.perform_action(&renderer(), action).await.unwrap();
        }

        assert_eq!(
            transport.calls(),
            vec!["Play(0,1)", "Pause(0)", "Stop(0)", "Next(0)"]
        );
    }

    #[tokio::test]
    async fn rejected_action_is_a_command_error() {
        let transport = RecordingTransport::default();
        let err = dispatcher(&transport)
            .perform_action(&renderer(), RendererAction::Previous)
            .await
            .unwrap_err();

        match err {
            PlaybackError::Command { action, .. } => assert_eq!(action, RendererAction::Previous),
            other => panic!("expected Command error, got {other:?}"),
        }
        assert_eq!(transport.calls(), vec!["Previous(0)"]);
    }
}

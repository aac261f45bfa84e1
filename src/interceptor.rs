use anyhow::Result;

use crate::clipboard::ClipboardBackend;
use crate::extract::Pipeline;
use crate::format::format_output;
use crate::host::{Host, KeyEvent, PasteGesture};
use crate::models::{ClipboardKind, ExtractionResult, PasteEvent};
use crate::storage::ResolvedConfig;

/// Interceptor state between and during paste events
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum InterceptorState {
    /// Waiting for the next paste gesture
    #[default]
    Idle,
    /// Processing one paste gesture to completion
    Handling,
}

/// What a handled paste ended up injecting
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PasteOutcome {
    /// Formatted path of a saved image
    ImagePath(String),
    /// Clipboard text, verbatim
    Text(String),
    /// Image extraction failed and the text fallback was injected
    TextFallback(String),
    /// Nothing to paste
    Nothing,
    /// No active session; nothing injected
    NoSession,
    /// Key event was not the paste gesture
    Ignored,
}

impl PasteOutcome {
    /// Text handed to the host, if any
    pub fn injected(&self) -> Option<&str> {
        match self {
            PasteOutcome::ImagePath(t) | PasteOutcome::Text(t) | PasteOutcome::TextFallback(t) => {
                Some(t)
            }
            _ => None,
        }
    }
}

/// Drives classify → extract → format → inject for each paste gesture
pub struct Interceptor {
    config: ResolvedConfig,
    clipboard: Box<dyn ClipboardBackend>,
    pipeline: Pipeline,
    gesture: PasteGesture,
    state: InterceptorState,
}

impl Interceptor {
    pub fn new(
        config: ResolvedConfig,
        clipboard: Box<dyn ClipboardBackend>,
        pipeline: Pipeline,
    ) -> Self {
        Interceptor {
            config,
            clipboard,
            pipeline,
            gesture: PasteGesture::default(),
            state: InterceptorState::Idle,
        }
    }

    pub fn state(&self) -> InterceptorState {
        self.state
    }

    /// Subscribe and process events one at a time until the host closes the stream.
    /// Only subscription or event-stream failures are returned; per-event failures
    /// are logged and the loop returns to Idle.
    pub fn run(&mut self, host: &mut dyn Host) -> Result<()> {
        host.subscribe(&self.gesture)?;
        log::info!(
            "Intercepting paste via {} clipboard, strategies {:?}",
            self.clipboard.name(),
            self.pipeline.strategy_names()
        );

        while let Some(key) = host.next_event()? {
            let outcome = self.handle_key(host, &key);
            log::debug!("Paste outcome: {:?}", outcome);
        }

        Ok(())
    }

    /// Handle one key event from the host
    pub fn handle_key(&mut self, host: &mut dyn Host, key: &KeyEvent) -> PasteOutcome {
        if !self.gesture.matches(key) {
            log::trace!("Ignoring key {} {:?}", key.keycode, key.modifiers);
            return PasteOutcome::Ignored;
        }
        self.handle(host, PasteEvent)
    }

    /// Handle one paste gesture to completion
    pub fn handle(&mut self, host: &mut dyn Host, _event: PasteEvent) -> PasteOutcome {
        self.state = InterceptorState::Handling;
        let outcome = self.process(host);
        self.state = InterceptorState::Idle;
        outcome
    }

    fn process(&self, host: &mut dyn Host) -> PasteOutcome {
        let Some(session) = host.active_session() else {
            log::warn!("Paste gesture with no active session, ignoring");
            return PasteOutcome::NoSession;
        };

        let kind = self.clipboard.classify();
        log::debug!("Clipboard holds {}", kind.label());

        let outcome = match kind {
            ClipboardKind::Image(image) => {
                match self.pipeline.extract(
                    &image,
                    &self.config.save_directory,
                    &self.config.filename_template,
                ) {
                    ExtractionResult::Saved(path) => {
                        PasteOutcome::ImagePath(format_output(&self.config.output_template, &path))
                    }
                    ExtractionResult::Failed(reason) => {
                        log::warn!("Image extraction failed, pasting text instead: {}", reason);
                        match self.clipboard.read_text() {
                            Some(text) => PasteOutcome::TextFallback(text),
                            None => PasteOutcome::Nothing,
                        }
                    }
                }
            }
            ClipboardKind::Text(text) if !text.is_empty() => PasteOutcome::Text(text),
            ClipboardKind::Text(_) | ClipboardKind::Empty => PasteOutcome::Nothing,
        };

        if let Some(text) = outcome.injected() {
            if let Err(e) = host.inject(&session, text) {
                log::error!("Failed to inject paste into session {}: {:#}", session, e);
            }
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::{ExtractError, ExtractionStrategy};
    use crate::host::{Modifier, SessionId};
    use crate::models::{ClipboardImage, ImageFormat};
    use anyhow::anyhow;
    use std::collections::VecDeque;
    use std::fs;
    use std::path::Path;
    use std::sync::{Arc, Mutex};

    /// Clipboard with fixed contents; `text` is what a raw text fetch returns
    struct FakeClipboard {
        kind: ClipboardKind,
        text: Option<String>,
    }

    impl ClipboardBackend for FakeClipboard {
        fn classify(&self) -> ClipboardKind {
            self.kind.clone()
        }

        fn read_text(&self) -> Option<String> {
            self.text.clone()
        }

        fn name(&self) -> &'static str {
            "fake"
        }
    }

    struct WritesImage;

    impl ExtractionStrategy for WritesImage {
        fn name(&self) -> &'static str {
            "writes"
        }

        fn extract(&self, _image: &ClipboardImage, target: &Path) -> Result<(), ExtractError> {
            fs::write(target, b"png")?;
            Ok(())
        }
    }

    struct AlwaysFails;

    impl ExtractionStrategy for AlwaysFails {
        fn name(&self) -> &'static str {
            "fails"
        }

        fn extract(&self, _image: &ClipboardImage, _target: &Path) -> Result<(), ExtractError> {
            Err(ExtractError::Timeout {
                tool: "fails".into(),
                after: std::time::Duration::from_secs(10),
            })
        }
    }

    #[derive(Default)]
    struct FakeHost {
        events: VecDeque<KeyEvent>,
        session: Option<SessionId>,
        injected: Arc<Mutex<Vec<(SessionId, String)>>>,
        subscribed: bool,
        fail_subscribe: bool,
    }

    impl Host for FakeHost {
        fn subscribe(&mut self, _gesture: &PasteGesture) -> Result<()> {
            if self.fail_subscribe {
                return Err(anyhow!("host refused subscription"));
            }
            self.subscribed = true;
            Ok(())
        }

        fn next_event(&mut self) -> Result<Option<KeyEvent>> {
            Ok(self.events.pop_front())
        }

        fn active_session(&mut self) -> Option<SessionId> {
            self.session.clone()
        }

        fn inject(&mut self, session: &SessionId, text: &str) -> Result<()> {
            self.injected
                .lock()
                .unwrap()
                .push((session.clone(), text.to_string()));
            Ok(())
        }
    }

    fn host_with_session() -> FakeHost {
        FakeHost {
            session: Some(SessionId("s".into())),
            ..Default::default()
        }
    }

    fn config(dir: &Path, output_template: &str) -> ResolvedConfig {
        ResolvedConfig {
            save_directory: dir.to_path_buf(),
            filename_template: "%Y%m%d_%H%M%S".into(),
            output_template: output_template.into(),
            source: None,
        }
    }

    fn image() -> ClipboardKind {
        ClipboardKind::Image(ClipboardImage::new(ImageFormat::Png))
    }

    fn interceptor(
        dir: &Path,
        kind: ClipboardKind,
        text: Option<&str>,
        strategy: Box<dyn ExtractionStrategy>,
    ) -> Interceptor {
        Interceptor::new(
            config(dir, "{path}"),
            Box::new(FakeClipboard {
                kind,
                text: text.map(String::from),
            }),
            Pipeline::new(vec![strategy]),
        )
    }

    fn injected(host: &FakeHost) -> Vec<String> {
        host.injected
            .lock()
            .unwrap()
            .iter()
            .map(|(_, t)| t.clone())
            .collect()
    }

    #[test]
    fn test_empty_injects_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        let mut host = host_with_session();
        let mut i = interceptor(tmp.path(), ClipboardKind::Empty, None, Box::new(WritesImage));

        assert_eq!(i.handle(&mut host, PasteEvent), PasteOutcome::Nothing);
        assert!(injected(&host).is_empty());
    }

    #[test]
    fn test_text_injected_verbatim() {
        let tmp = tempfile::tempdir().unwrap();
        let mut host = host_with_session();
        let text = "  cargo test\n";
        let mut i = interceptor(
            tmp.path(),
            ClipboardKind::Text(text.into()),
            Some(text),
            Box::new(WritesImage),
        );

        assert_eq!(i.handle(&mut host, PasteEvent), PasteOutcome::Text(text.into()));
        assert_eq!(injected(&host), vec![text]);
        // No image files written for text
        assert_eq!(fs::read_dir(tmp.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_image_injects_formatted_path() {
        let tmp = tempfile::tempdir().unwrap();
        let mut host = host_with_session();
        let mut i = Interceptor::new(
            config(tmp.path(), "@{filename} in {dir}"),
            Box::new(FakeClipboard {
                kind: image(),
                text: None,
            }),
            Pipeline::new(vec![Box::new(WritesImage)]),
        );

        let outcome = i.handle(&mut host, PasteEvent);
        let PasteOutcome::ImagePath(text) = &outcome else {
            panic!("expected image path, got {:?}", outcome);
        };

        let saved: Vec<_> = fs::read_dir(tmp.path())
            .unwrap()
            .map(|e| e.unwrap().path())
            .collect();
        assert_eq!(saved.len(), 1);
        let expected = format_output("@{filename} in {dir}", &saved[0]);
        assert_eq!(text, &expected);
        assert_eq!(injected(&host), vec![expected]);
    }

    #[test]
    fn test_failed_extraction_falls_back_to_text() {
        let tmp = tempfile::tempdir().unwrap();
        let mut host = host_with_session();
        let mut i = interceptor(tmp.path(), image(), Some("fallback"), Box::new(AlwaysFails));

        assert_eq!(
            i.handle(&mut host, PasteEvent),
            PasteOutcome::TextFallback("fallback".into())
        );
        assert_eq!(injected(&host), vec!["fallback"]);
        assert_eq!(fs::read_dir(tmp.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_failed_extraction_without_text_is_noop() {
        let tmp = tempfile::tempdir().unwrap();
        let mut host = host_with_session();
        let mut i = interceptor(tmp.path(), image(), None, Box::new(AlwaysFails));

        assert_eq!(i.handle(&mut host, PasteEvent), PasteOutcome::Nothing);
        assert!(injected(&host).is_empty());
    }

    #[test]
    fn test_no_session_aborts() {
        let tmp = tempfile::tempdir().unwrap();
        let mut host = FakeHost::default();
        let mut i = interceptor(tmp.path(), image(), Some("x"), Box::new(WritesImage));

        assert_eq!(i.handle(&mut host, PasteEvent), PasteOutcome::NoSession);
        assert!(injected(&host).is_empty());
        // Aborted before classification: nothing saved
        assert_eq!(fs::read_dir(tmp.path()).unwrap().count(), 0);
        assert_eq!(i.state(), InterceptorState::Idle);
    }

    #[test]
    fn test_non_paste_keys_ignored() {
        let tmp = tempfile::tempdir().unwrap();
        let mut host = host_with_session();
        let mut i = interceptor(
            tmp.path(),
            ClipboardKind::Text("t".into()),
            Some("t"),
            Box::new(WritesImage),
        );

        let key = KeyEvent {
            keycode: 9,
            modifiers: vec![Modifier::Control],
        };
        assert_eq!(i.handle_key(&mut host, &key), PasteOutcome::Ignored);
        assert!(injected(&host).is_empty());
    }

    #[test]
    fn test_run_handles_events_in_order() {
        let tmp = tempfile::tempdir().unwrap();
        let mut host = host_with_session();
        let paste = PasteGesture::default().event();
        host.events.extend([
            paste.clone(),
            KeyEvent {
                keycode: 1,
                modifiers: vec![],
            },
            paste.clone(),
            paste,
        ]);
        let mut i = interceptor(
            tmp.path(),
            ClipboardKind::Text("abc".into()),
            Some("abc"),
            Box::new(WritesImage),
        );

        i.run(&mut host).unwrap();
        assert!(host.subscribed);
        assert_eq!(injected(&host), vec!["abc", "abc", "abc"]);
        assert_eq!(i.state(), InterceptorState::Idle);
    }

    #[test]
    fn test_consecutive_image_pastes_get_distinct_files() {
        let tmp = tempfile::tempdir().unwrap();
        let mut host = host_with_session();
        let paste = PasteGesture::default().event();
        host.events.extend([paste.clone(), paste]);
        let mut i = interceptor(tmp.path(), image(), None, Box::new(WritesImage));

        i.run(&mut host).unwrap();
        let paths = injected(&host);
        assert_eq!(paths.len(), 2);
        assert_ne!(paths[0], paths[1]);
        assert_eq!(fs::read_dir(tmp.path()).unwrap().count(), 2);
    }

    #[test]
    fn test_subscription_failure_is_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        let mut host = FakeHost {
            fail_subscribe: true,
            ..Default::default()
        };
        let mut i = interceptor(tmp.path(), ClipboardKind::Empty, None, Box::new(WritesImage));

        assert!(i.run(&mut host).is_err());
    }
}

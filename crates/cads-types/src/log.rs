use std::fmt;

use tracing::Dispatch;

/// Logging capability handed to readers, writers and stores.
///
/// Components never install or consult a process-wide logger of their own.
/// Events are emitted inside [`Logger::scope`], which routes them to the
/// injected dispatch. A default `Logger` carries no dispatch and leaves
/// events to whatever subscriber the embedding application has set.
#[derive(Clone, Default)]
pub struct Logger {
    dispatch: Option<Dispatch>,
}

impl Logger {
    /// Route events to the given dispatch.
    pub fn new(dispatch: Dispatch) -> Self {
        Self {
            dispatch: Some(dispatch),
        }
    }

    /// A logger that discards every event.
    pub fn silent() -> Self {
        Self::new(Dispatch::none())
    }

    /// Returns `true` if this logger carries its own dispatch.
    pub fn is_injected(&self) -> bool {
        self.dispatch.is_some()
    }

    /// Run `f` with this logger's dispatch as the current default.
    pub fn scope<T>(&self, f: impl FnOnce() -> T) -> T {
        match &self.dispatch {
            Some(dispatch) => tracing::dispatcher::with_default(dispatch, f),
            None => f(),
        }
    }
}

impl From<Dispatch> for Logger {
    fn from(dispatch: Dispatch) -> Self {
        Self::new(dispatch)
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("injected", &self.is_injected())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::{Arc, Mutex};

    use super::*;

    #[derive(Clone, Default)]
    struct Buffer(Arc<Mutex<Vec<u8>>>);

    impl Write for Buffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl Buffer {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    fn capture(buf: &Buffer) -> Dispatch {
        let writer = buf.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .finish();
        Dispatch::new(subscriber)
    }

    #[test]
    fn injected_dispatch_receives_events() {
        let buf = Buffer::default();
        let logger = Logger::new(capture(&buf));
        logger.scope(|| tracing::debug!("hello from scope"));
        assert!(buf.contents().contains("hello from scope"));
    }

    #[test]
    fn silent_logger_overrides_ambient_subscriber() {
        let buf = Buffer::default();
        let ambient = capture(&buf);
        tracing::dispatcher::with_default(&ambient, || {
            Logger::silent().scope(|| tracing::debug!("should not appear"));
            Logger::default().scope(|| tracing::debug!("falls through"));
        });
        let out = buf.contents();
        assert!(!out.contains("should not appear"));
        assert!(out.contains("falls through"));
    }

    #[test]
    fn scope_returns_closure_value() {
        assert_eq!(Logger::default().scope(|| 7), 7);
        assert!(!Logger::default().is_injected());
        assert!(Logger::silent().is_injected());
    }
}

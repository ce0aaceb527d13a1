//! Tracing setup with a level that can be replaced after startup

use tracing::Subscriber;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, reload, EnvFilter, Registry};

pub type FilterHandle = reload::Handle<EnvFilter, Registry>;

/// Registry with a reloadable filter and a fmt layer writing to `make_writer`.
pub fn subscriber<W>(
    initial: EnvFilter,
    make_writer: W,
) -> (impl Subscriber + Send + Sync + 'static, FilterHandle)
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let (filter, handle) = reload::Layer::new(initial);
    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_ansi(false).with_writer(make_writer));
    (subscriber, handle)
}

/// Swap the active filter for `level` (an `EnvFilter` directive string).
pub fn apply_level(handle: &FilterHandle, level: &str) -> Result<(), reload::Error> {
    handle.reload(EnvFilter::new(level))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::{Arc, Mutex};

    use crate::config::SessionConfig;

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Captured {
        fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_config_warnings_reach_subscriber_before_level_applied() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.toml");
        std::fs::write(&path, "[session\napp_label = ").unwrap();

        let out = Captured::default();
        let writer = out.clone();
        let (subscriber, handle) = subscriber(EnvFilter::new("info"), move || writer.clone());

        tracing::subscriber::with_default(subscriber, || {
            let config = SessionConfig::load_or_default(path.to_str().unwrap());
            assert_eq!(config.session.log_level, "info");
            apply_level(&handle, "error").unwrap();
            tracing::warn!("after reload");
        });

        let text = out.text();
        assert!(text.contains("Error parsing config"), "captured: {}", text);
        assert!(!text.contains("after reload"), "captured: {}", text);
    }
}

use tracing::Dispatch;
use tracing::dispatcher::{self, DefaultGuard};
use tracing::subscriber::NoSubscriber;

/// Mutes every tracing event of the current thread while alive.
///
/// The previous default dispatcher is restored when the guard drops, which
/// also happens while unwinding or on an early `?` return.
pub struct OutputSilencer {
    _guard: DefaultGuard,
}

impl OutputSilencer {
    pub fn new() -> Self {
        Self {
            _guard: dispatcher::set_default(&Dispatch::new(NoSubscriber::default())),
        }
    }
}

impl Default for OutputSilencer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{HarnessError, Result};

    fn muted() -> bool {
        dispatcher::get_default(|d| d.is::<NoSubscriber>())
    }

    fn with_registry() -> DefaultGuard {
        dispatcher::set_default(&Dispatch::new(tracing_subscriber::registry()))
    }

    fn failing_under_silencer() -> Result<()> {
        let _silencer: OutputSilencer = OutputSilencer::new();
        assert!(muted());
        Err(HarnessError::InvalidInput("x".into()))
    }

    #[test]
    fn restores_on_drop_and_on_error() {
        let _registry: DefaultGuard = with_registry();
        assert!(!muted());
        {
            let _silencer: OutputSilencer = OutputSilencer::new();
            assert!(muted());
        }
        assert!(!muted());
        assert!(failing_under_silencer().is_err());
        assert!(!muted());
    }

    #[test]
    fn restores_on_panic() {
        let _registry: DefaultGuard = with_registry();
        let caught = std::panic::catch_unwind(|| {
            let _silencer: OutputSilencer = OutputSilencer::new();
            panic!("evaluation panicked");
        });
        assert!(caught.is_err());
        assert!(!muted());
    }
}

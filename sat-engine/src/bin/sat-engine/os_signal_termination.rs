use sat_engine::termination::CancellationToken;
use sat_engine::termination::TerminationCondition;

/// A [`TerminationCondition`] which triggers on SIGINT or SIGTERM.
///
/// The signal handlers set the flag of the engine's [`CancellationToken`], so the engine also
/// stops at its own cancellation points.
#[derive(Clone, Debug)]
pub(crate) struct OsSignal {
    token: CancellationToken,
}

impl OsSignal {
    /// Install the signal handlers on the flag of `token`.
    pub(crate) fn install(token: CancellationToken) -> std::io::Result<OsSignal> {
        const TERMINATION_SIGNALS: &[std::ffi::c_int] =
            &[signal_hook::consts::SIGINT, signal_hook::consts::SIGTERM];

        for &signal in TERMINATION_SIGNALS {
            let _ = signal_hook::flag::register(signal, token.flag())?;
        }

        Ok(OsSignal { token })
    }
}

impl TerminationCondition for OsSignal {
    fn should_stop(&mut self) -> bool {
        self.token.is_cancelled()
    }
}

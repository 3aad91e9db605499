//! Capability interfaces the host injects at engine construction. The
//! interpreter core has no dependency on any concrete collaborator and can
//! be driven with stub gates in tests.

/// Asked between statements; a `true` answer aborts the run.
pub trait GameGate: Send + Sync {
    fn is_game_over(&self) -> bool;
}

/// Admission control: whether a run may start, and notification when a
/// registered run finishes (by completion or abort).
pub trait RunAdmission: Send + Sync {
    fn try_register_run(&self) -> bool;
    fn run_completed(&self);
}

/// Default gate: the game is never over.
#[derive(Debug, Default)]
pub struct OpenGameGate;

impl GameGate for OpenGameGate {
    fn is_game_over(&self) -> bool {
        false
    }
}

/// Default admission: every run is allowed, completions are ignored.
#[derive(Debug, Default)]
pub struct OpenAdmission;

impl RunAdmission for OpenAdmission {
    fn try_register_run(&self) -> bool {
        true
    }

    fn run_completed(&self) {}
}

//! Decides whether a mutation must be written through to storage.

/// Autosave disposition of a runtime data lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AutosaveState {
    /// `init()` has not completed; mutations are kept in memory only.
    #[default]
    PreInit,
    /// Every effective change is saved immediately.
    Active,
    /// Saving on change has been switched off. Nothing leaves this state
    /// except `reset()`, which starts a new lifecycle.
    Suspended,
}

#[derive(Debug, Default)]
pub struct AutosaveController {
    loaded: bool,
    disabled: bool,
}

impl AutosaveController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> AutosaveState {
        if self.disabled {
            AutosaveState::Suspended
        } else if self.loaded {
            AutosaveState::Active
        } else {
            AutosaveState::PreInit
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn mark_loaded(&mut self) {
        self.loaded = true;
    }

    /// One-way switch for the current lifecycle.
    pub fn disable(&mut self) {
        self.disabled = true;
    }

    /// Whether a mutation that did or did not change the stored value must be saved.
    pub fn should_save(&self, changed: bool) -> bool {
        changed && self.state() == AutosaveState::Active
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pre_init_never_saves() {
        let controller = AutosaveController::new();
        assert_eq!(controller.state(), AutosaveState::PreInit);
        assert!(!controller.should_save(true));
    }

    #[test]
    fn active_saves_only_changes() {
        let mut controller = AutosaveController::new();
        controller.mark_loaded();
        assert_eq!(controller.state(), AutosaveState::Active);
        assert!(controller.should_save(true));
        assert!(!controller.should_save(false));
    }

    #[test]
    fn suspension_survives_loading() {
        let mut controller = AutosaveController::new();
        controller.mark_loaded();
        controller.disable();
        controller.mark_loaded();
        assert_eq!(controller.state(), AutosaveState::Suspended);
        assert!(!controller.should_save(true));

        let mut early = AutosaveController::new();
        early.disable();
        early.mark_loaded();
        assert_eq!(early.state(), AutosaveState::Suspended);
        assert!(early.is_loaded());
    }

    #[test]
    fn reset_starts_a_new_lifecycle() {
        let mut controller = AutosaveController::new();
        controller.mark_loaded();
        controller.disable();
        controller.reset();
        assert_eq!(controller.state(), AutosaveState::PreInit);
        assert!(!controller.is_loaded());
    }
}

//! Live wizard sessions keyed by the history entry that opened them.

use command_result_contract::HistoryEntryId;
use indexmap::IndexMap;
use wizard_engine::{reduce_wizard, WizardAction, WizardEffect, WizardSession};

use crate::RuntimeError;

#[derive(Debug, Clone, Default)]
/// Registry of live wizard sessions in history order.
pub struct WizardRegistry {
    sessions: IndexMap<HistoryEntryId, WizardSession>,
}

impl WizardRegistry {
    /// Registers a session. An existing session for the same entry is kept so re-rendering an
    /// entry never resets in-progress input. Returns `true` when the session was inserted.
    pub fn open(&mut self, session: WizardSession) -> bool {
        let entry_id = session.entry_id();
        if self.sessions.contains_key(&entry_id) {
            return false;
        }
        self.sessions.insert(entry_id, session);
        true
    }

    /// Session opened by `entry_id`.
    pub fn get(&self, entry_id: HistoryEntryId) -> Option<&WizardSession> {
        self.sessions.get(&entry_id)
    }

    /// Runs the wizard reducer against one session.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::UnknownWizard`] for unregistered entries and
    /// [`RuntimeError::Wizard`] when the reducer rejects the action.
    pub fn apply(
        &mut self,
        entry_id: HistoryEntryId,
        action: WizardAction,
    ) -> Result<Vec<WizardEffect>, RuntimeError> {
        let session = self
            .sessions
            .get_mut(&entry_id)
            .ok_or(RuntimeError::UnknownWizard(entry_id))?;
        Ok(reduce_wizard(session, action)?)
    }

    /// Drops the session for an evicted history entry.
    pub fn remove(&mut self, entry_id: HistoryEntryId) -> Option<WizardSession> {
        self.sessions.shift_remove(&entry_id)
    }

    /// Number of registered sessions.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Whether no session is registered.
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

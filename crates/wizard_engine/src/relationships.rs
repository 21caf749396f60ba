//! Step-scoped relationship editor.
//!
//! The editor owns one transient draft. Confirming moves the draft into the step's list under a
//! client-generated id; cancelling drops it without touching the list.

use command_result_contract::{RelationTarget, RelationType, Relationship};

/// Upper bound on links collected by one relationship step.
pub const MAX_RELATIONSHIPS: usize = 32;
/// Prefix for ids assigned before the backend has seen a relationship.
pub const LOCAL_ID_PREFIX: &str = "local-";

/// Relationship being composed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationshipDraft {
    /// Chosen target, if any.
    pub target_id: Option<String>,
    /// Chosen link type.
    pub relation_type: RelationType,
    /// Optional note.
    pub description: String,
}

impl Default for RelationshipDraft {
    fn default() -> Self {
        Self {
            target_id: None,
            relation_type: RelationType::Uses,
            description: String::new(),
        }
    }
}

/// Why a draft could not be confirmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmRejection {
    /// No draft is open.
    NoDraft,
    /// The draft has no target or the target is not offered by the step.
    UnknownTarget,
    /// The same target and type are already linked.
    Duplicate,
    /// The step already holds [`MAX_RELATIONSHIPS`] links.
    Full,
}

/// Draft holder plus client id sequence for one relationship step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelationshipEditor {
    draft: Option<RelationshipDraft>,
    next_local_id: u64,
}

impl RelationshipEditor {
    /// Returns the open draft.
    pub fn draft(&self) -> Option<&RelationshipDraft> {
        self.draft.as_ref()
    }

    /// Opens an empty draft unless one is already open.
    pub fn begin(&mut self) {
        if self.draft.is_none() {
            self.draft = Some(RelationshipDraft::default());
        }
    }

    fn draft_mut(&mut self) -> &mut RelationshipDraft {
        self.draft.get_or_insert_with(RelationshipDraft::default)
    }

    /// Sets the draft target, opening a draft if needed.
    pub fn set_target(&mut self, target_id: impl Into<String>) {
        let target_id = target_id.into();
        self.draft_mut().target_id = if target_id.trim().is_empty() {
            None
        } else {
            Some(target_id)
        };
    }

    /// Sets the draft link type, opening a draft if needed.
    pub fn set_relation_type(&mut self, relation_type: RelationType) {
        self.draft_mut().relation_type = relation_type;
    }

    /// Sets the draft description, opening a draft if needed.
    pub fn set_description(&mut self, description: impl Into<String>) {
        self.draft_mut().description = description.into();
    }

    /// Discards the draft.
    pub fn cancel(&mut self) {
        self.draft = None;
    }

    /// Checks whether the open draft would be accepted.
    pub fn check(
        &self,
        links: &[Relationship],
        targets: &[RelationTarget],
    ) -> Result<(), ConfirmRejection> {
        let draft = self.draft.as_ref().ok_or(ConfirmRejection::NoDraft)?;
        let target_id = draft
            .target_id
            .as_deref()
            .filter(|id| targets.iter().any(|target| target.id == *id))
            .ok_or(ConfirmRejection::UnknownTarget)?;
        if links
            .iter()
            .any(|link| link.target_id == target_id && link.relation_type == draft.relation_type)
        {
            return Err(ConfirmRejection::Duplicate);
        }
        if links.len() >= MAX_RELATIONSHIPS {
            return Err(ConfirmRejection::Full);
        }
        Ok(())
    }

    /// Moves the draft into `links` and clears it. Returns the new client id.
    ///
    /// A rejected draft stays open so the user can correct it.
    pub fn confirm(
        &mut self,
        links: &mut Vec<Relationship>,
        targets: &[RelationTarget],
    ) -> Result<String, ConfirmRejection> {
        self.check(links, targets)?;
        let Some(draft) = self.draft.take() else {
            return Err(ConfirmRejection::NoDraft);
        };
        let Some(target_id) = draft.target_id else {
            return Err(ConfirmRejection::UnknownTarget);
        };

        self.next_local_id += 1;
        let id = format!("{LOCAL_ID_PREFIX}{}", self.next_local_id);
        let description = draft.description.trim();
        links.push(Relationship {
            id: id.clone(),
            target_id,
            relation_type: draft.relation_type,
            description: (!description.is_empty()).then(|| description.to_string()),
        });
        Ok(id)
    }

    /// Removes a link by id. Returns whether anything was removed.
    pub fn remove(links: &mut Vec<Relationship>, id: &str) -> bool {
        let before = links.len();
        links.retain(|link| link.id != id);
        links.len() != before
    }
}

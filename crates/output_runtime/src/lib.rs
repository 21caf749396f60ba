//! Command result output runtime.
//!
//! [`dispatcher::dispatch`] turns one [`CommandResult`](command_result_contract::CommandResult)
//! into a [`RenderedOutput`] by walking the ordered [`shapes::SHAPE_PRIORITY`] table, and returns
//! project, navigation, theme, and wizard effects as data. [`OutputRuntime`] owns history and live
//! wizards and executes those effects against injected [`host`] services.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod config;
pub mod dispatcher;
pub mod host;
mod render;
pub mod runtime;
pub mod shapes;
pub mod stylesheet;
pub mod theme;
pub mod views;
pub mod wizards;

use command_result_contract::HistoryEntryId;
use thiserror::Error;
use wizard_engine::WizardError;

pub use config::{ConfigError, OutputConfig};
pub use dispatcher::{
    dispatch, render_passive, side_effects, DispatchContext, DispatchEffect, Dispatched,
};
pub use runtime::{HistoryEntry, Notice, OutputHosts, OutputRuntime};
pub use shapes::{classify, PayloadShape};
pub use theme::{ThemeActivation, ThemeError};
pub use views::{OutputBody, RenderedOutput, WizardBody};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
/// Output runtime errors surfaced to callers.
pub enum RuntimeError {
    /// No live wizard is registered for the entry.
    #[error("no live wizard for {0}")]
    UnknownWizard(HistoryEntryId),
    /// The wizard reducer rejected the action.
    #[error(transparent)]
    Wizard(#[from] WizardError),
}

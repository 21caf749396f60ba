//! View models produced by the dispatcher and consumed by the terminal UI.

use command_result_contract::{HistoryEntryId, ResultKind};
use wizard_engine::ArchivedSummary;

use crate::shapes::PayloadShape;

#[derive(Debug, Clone, PartialEq)]
/// One rendered history entry.
pub struct RenderedOutput {
    /// Result category.
    pub kind: ResultKind,
    /// Icon token for `kind`.
    pub icon: &'static str,
    /// Headline. Always shown.
    pub message: String,
    /// Shape the payload was classified as, when a body was considered.
    pub shape: Option<PayloadShape>,
    /// Payload rendering. `None` for prompts and empty payloads.
    pub body: Option<OutputBody>,
    /// Project link built from result metadata.
    pub context: Option<ProjectContext>,
    /// Follow-up commands.
    pub suggestions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Project the result belongs to.
pub struct ProjectContext {
    /// Project id.
    pub project_id: String,
    /// Display name, falling back to the id.
    pub label: String,
    /// Action token from metadata.
    pub action: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
/// Leaf rendering for one payload shape.
pub enum OutputBody {
    /// Guided flow, live or replayed.
    Wizard(WizardBody),
    /// Confirm/cancel prompt.
    Confirmation(ConfirmationView),
    /// Nested results of a batch command.
    Batch(Vec<BatchItem>),
    /// Command reference.
    Help(Vec<HelpSection>),
    /// Search hits.
    Search(SearchView),
    /// Entity list (projects, todos, notes, and similar).
    List(ListView),
    /// Relationship table.
    Relationships(Vec<RelationshipRow>),
    /// Theme picker list.
    Themes(Vec<ThemeRow>),
    /// Tag cloud.
    Tags(Vec<TagRow>),
    /// Single entity.
    Detail(DetailView),
    /// Counters.
    Stats(Vec<Field>),
    /// Settings listing.
    Settings(Vec<Field>),
    /// Technology stack groups.
    Stack(Vec<StackGroup>),
    /// Pre-rendered text.
    Content(String),
    /// Theme activation notice.
    ThemeChange(ThemeChangeView),
    /// Generic structured listing.
    KeyValue(Vec<KeyValueRow>),
    /// Serialized dump.
    Raw(String),
}

#[derive(Debug, Clone, PartialEq)]
/// Wizard rendering mode.
pub enum WizardBody {
    /// Interactive session owned by the runtime registry.
    Live(HistoryEntryId),
    /// Read-only summary from a persisted record.
    Archived(ArchivedSummary),
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Confirmation prompt.
pub struct ConfirmationView {
    /// Extra warning text.
    pub prompt: Option<String>,
    /// Command run on confirm.
    pub confirm_command: String,
    /// Command run on cancel, if any.
    pub cancel_command: Option<String>,
    /// Whether the confirm action destroys data.
    pub destructive: bool,
}

#[derive(Debug, Clone, PartialEq)]
/// One result inside a batch.
pub struct BatchItem {
    /// Command that produced it.
    pub command: Option<String>,
    /// Nested rendering.
    pub output: RenderedOutput,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Help commands under one category.
pub struct HelpSection {
    /// Category heading.
    pub category: String,
    /// Commands in payload order.
    pub commands: Vec<HelpCommand>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// One help entry.
pub struct HelpCommand {
    /// Usage syntax.
    pub syntax: String,
    /// Description.
    pub description: Option<String>,
    /// Alternate names.
    pub aliases: Vec<String>,
    /// Example invocations.
    pub examples: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Search result listing.
pub struct SearchView {
    /// Query text.
    pub query: String,
    /// Hits in payload order.
    pub hits: Vec<SearchHit>,
    /// Total reported by the backend, or the hit count.
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// One search hit.
pub struct SearchHit {
    /// Entity kind.
    pub kind: Option<String>,
    /// Title.
    pub title: String,
    /// Matching excerpt.
    pub snippet: Option<String>,
    /// Entity id.
    pub id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Entity family of a [`ListView`].
pub enum ListKind {
    /// Projects.
    Projects,
    /// Todos.
    Todos,
    /// Notes.
    Notes,
    /// Dev log entries.
    DevLog,
    /// Architecture components.
    Components,
    /// Ideas.
    Ideas,
    /// Activity feed.
    Activity,
    /// Team members.
    Members,
    /// Notifications.
    Notifications,
}

impl ListKind {
    /// Section heading.
    pub const fn heading(self) -> &'static str {
        match self {
            Self::Projects => "Projects",
            Self::Todos => "Todos",
            Self::Notes => "Notes",
            Self::DevLog => "Dev log",
            Self::Components => "Components",
            Self::Ideas => "Ideas",
            Self::Activity => "Activity",
            Self::Members => "Members",
            Self::Notifications => "Notifications",
        }
    }

    /// Text shown for an empty list.
    pub const fn empty_text(self) -> &'static str {
        match self {
            Self::Projects => "No projects yet.",
            Self::Todos => "No todos.",
            Self::Notes => "No notes.",
            Self::DevLog => "No dev log entries.",
            Self::Components => "No components.",
            Self::Ideas => "No ideas.",
            Self::Activity => "No recent activity.",
            Self::Members => "No members.",
            Self::Notifications => "No notifications.",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Entity list.
pub struct ListView {
    /// Entity family.
    pub kind: ListKind,
    /// Rows up to the configured limit.
    pub rows: Vec<ListRow>,
    /// Rows left out by the limit.
    pub truncated: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// One entity row.
pub struct ListRow {
    /// Entity id.
    pub id: Option<String>,
    /// Primary text.
    pub title: String,
    /// Secondary text.
    pub detail: Option<String>,
    /// Status chip.
    pub status: Option<String>,
    /// Extra chips.
    pub badges: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// One relationship.
pub struct RelationshipRow {
    /// Source entity.
    pub source: String,
    /// Link type.
    pub relation_type: String,
    /// Target entity.
    pub target: String,
    /// Note.
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// One selectable theme.
pub struct ThemeRow {
    /// Theme id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Whether the theme is seed-derived.
    pub custom: bool,
    /// Whether the theme is active.
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// One tag.
pub struct TagRow {
    /// Tag text.
    pub name: String,
    /// Usage count.
    pub count: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Entity family of a [`DetailView`].
pub enum DetailKind {
    /// Project.
    Project,
    /// Todo.
    Todo,
    /// Note.
    Note,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Single entity.
pub struct DetailView {
    /// Entity family.
    pub kind: DetailKind,
    /// Heading.
    pub title: String,
    /// Scalar fields in payload order.
    pub fields: Vec<Field>,
    /// Long-form text.
    pub body: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Label/value pair.
pub struct Field {
    /// Humanized key.
    pub label: String,
    /// Display text.
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Stack items under one category.
pub struct StackGroup {
    /// Category heading.
    pub category: String,
    /// Item names.
    pub items: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Theme activation notice.
pub struct ThemeChangeView {
    /// Activated theme id.
    pub theme_id: String,
    /// Whether a derived stylesheet is injected.
    pub custom: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// One line of the generic listing.
pub struct KeyValueRow {
    /// Nesting level.
    pub depth: usize,
    /// Key or array index.
    pub key: String,
    /// Scalar text; `None` for a nested section header.
    pub value: Option<String>,
}

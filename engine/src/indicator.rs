//! Status bar item: label, color and visibility for one linter.

use jsstyle_types::{LinterProfile, Status, TextDocument};

use crate::{Command, EditorHost, LinterSession, ServerLauncher};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusColor {
    Warning,
    Error,
}

impl StatusColor {
    /// Theme color name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            StatusColor::Warning => "yellow",
            StatusColor::Error => "darkred",
        }
    }

    fn for_status(status: Status) -> Option<Self> {
        match status {
            Status::Ok => None,
            Status::Warn => Some(StatusColor::Warning),
            Status::Error => Some(StatusColor::Error),
        }
    }
}

/// Everything the host needs to draw the indicator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusView {
    pub text: String,
    pub tooltip: Option<String>,
    pub color: Option<StatusColor>,
    pub visible: bool,
    /// Command run when the item is clicked.
    pub command: String,
}

/// Shown only while the server runs, and then either because something is
/// wrong or because the focused document is one we lint.
pub(crate) fn indicator_visible(running: bool, status: Status, language_id: Option<&str>) -> bool {
    running
        && (!status.is_ok()
            || language_id.is_some_and(|id| jsstyle_types::SUPPORTED_LANGUAGES.contains(&id)))
}

pub(crate) fn status_label(profile: &LinterProfile, status: Status) -> String {
    if status.is_ok() {
        profile.display_name.to_string()
    } else {
        format!("{}!", profile.display_name)
    }
}

impl<H: EditorHost, L: ServerLauncher> LinterSession<H, L> {
    /// Record a status reported by the server and redraw.
    pub fn set_status(&mut self, status: Status) {
        tracing::debug!(linter = self.profile.scope, status = status.label(), "Status changed");
        self.status = status;
        self.refresh_indicator();
    }

    /// The focused editor changed. Status is left as is.
    pub fn on_active_editor_changed(&mut self, document: Option<&TextDocument>) {
        let view = self.status_view_for(document.map(|doc| doc.language_id.as_str()));
        self.host.render_status(&view);
    }

    #[must_use]
    pub fn status_view(&self) -> StatusView {
        let active = self.host.active_document();
        self.status_view_for(active.as_ref().map(|doc| doc.language_id.as_str()))
    }

    pub(crate) fn refresh_indicator(&mut self) {
        let view = self.status_view();
        self.host.render_status(&view);
    }

    fn status_view_for(&self, language_id: Option<&str>) -> StatusView {
        StatusView {
            text: status_label(&self.profile, self.status),
            tooltip: self.tooltip.clone(),
            color: StatusColor::for_status(self.status),
            visible: indicator_visible(self.running, self.status, language_id),
            command: self.profile.command_id(Command::ShowOutputChannel.name()),
        }
    }
}

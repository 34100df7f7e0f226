//! Commands the host can invoke by id.

use serde::de::DeserializeOwned;
use thiserror::Error;

use jsstyle_types::{LinterProfile, TextEdit};

use crate::{ApplyOutcome, EditorHost, LinterSession, ServerLauncher};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    ApplySingleFix,
    ApplySameFixes,
    ApplyAllFixes,
    ExecuteAutofix,
    ShowOutputChannel,
}

impl Command {
    pub const ALL: [Command; 5] = [
        Command::ApplySingleFix,
        Command::ApplySameFixes,
        Command::ApplyAllFixes,
        Command::ExecuteAutofix,
        Command::ShowOutputChannel,
    ];

    /// Unscoped command name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Command::ApplySingleFix => "applySingleFix",
            Command::ApplySameFixes => "applySameFixes",
            Command::ApplyAllFixes => "applyAllFixes",
            Command::ExecuteAutofix => "executeAutofix",
            Command::ShowOutputChannel => "showOutputChannel",
        }
    }

    /// Resolve a scoped id such as `standard.applyAllFixes`.
    #[must_use]
    pub fn parse(profile: &LinterProfile, id: &str) -> Option<Self> {
        let name = id.strip_prefix(profile.scope)?.strip_prefix('.')?;
        Self::ALL.into_iter().find(|command| command.name() == name)
    }
}

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("unknown command '{0}'")]
    Unknown(String),
    #[error("{command}: missing argument {index}")]
    MissingArgument { command: String, index: usize },
    #[error("{command}: invalid argument {index}")]
    InvalidArgument {
        command: String,
        index: usize,
        #[source]
        source: serde_json::Error,
    },
}

impl<H: EditorHost, L: ServerLauncher> LinterSession<H, L> {
    /// Every command id this session answers to.
    #[must_use]
    pub fn command_ids(&self) -> Vec<String> {
        Command::ALL
            .iter()
            .map(|command| self.profile.command_id(command.name()))
            .collect()
    }

    /// Run a command. The apply commands take `[uri, documentVersion, edits]`.
    /// Returns what happened to the edits, if any were involved.
    pub async fn execute_command(
        &mut self,
        id: &str,
        args: &[serde_json::Value],
    ) -> Result<Option<ApplyOutcome>, CommandError> {
        let command =
            Command::parse(&self.profile, id).ok_or_else(|| CommandError::Unknown(id.to_string()))?;
        tracing::debug!(linter = self.profile.scope, command = command.name(), "Executing command");

        match command {
            Command::ApplySingleFix | Command::ApplySameFixes | Command::ApplyAllFixes => {
                let uri: String = argument(id, args, 0)?;
                let version: i32 = argument(id, args, 1)?;
                let edits: Vec<TextEdit> = argument(id, args, 2)?;
                Ok(Some(self.apply_text_edits(&uri, version, &edits)))
            }
            Command::ExecuteAutofix => Ok(self.run_auto_fix().await),
            Command::ShowOutputChannel => {
                self.host.show_output(false);
                Ok(None)
            }
        }
    }
}

fn argument<T: DeserializeOwned>(
    command: &str,
    args: &[serde_json::Value],
    index: usize,
) -> Result<T, CommandError> {
    let value = args.get(index).ok_or_else(|| CommandError::MissingArgument {
        command: command.to_string(),
        index,
    })?;
    T::deserialize(value).map_err(|source| CommandError::InvalidArgument {
        command: command.to_string(),
        index,
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsstyle_types::{SEMISTANDARD, STANDARD};
    use serde_json::json;

    #[test]
    fn parse_scoped_ids() {
        assert_eq!(
            Command::parse(&STANDARD, "standard.applyAllFixes"),
            Some(Command::ApplyAllFixes)
        );
        assert_eq!(
            Command::parse(&SEMISTANDARD, "semistandard.executeAutofix"),
            Some(Command::ExecuteAutofix)
        );
        assert_eq!(Command::parse(&STANDARD, "semistandard.applyAllFixes"), None);
        assert_eq!(Command::parse(&STANDARD, "standard.unknown"), None);
        assert_eq!(Command::parse(&STANDARD, "standardapplyAllFixes"), None);
    }

    #[test]
    fn every_command_round_trips() {
        for command in Command::ALL {
            let id = STANDARD.command_id(command.name());
            assert_eq!(Command::parse(&STANDARD, &id), Some(command));
        }
    }

    #[test]
    fn argument_errors() {
        let args = [json!("file:///a.js"), json!("five")];
        assert_eq!(
            argument::<String>("standard.applyAllFixes", &args, 0).unwrap(),
            "file:///a.js"
        );
        assert!(matches!(
            argument::<i32>("standard.applyAllFixes", &args, 1),
            Err(CommandError::InvalidArgument { index: 1, .. })
        ));
        assert!(matches!(
            argument::<Vec<TextEdit>>("standard.applyAllFixes", &args, 2),
            Err(CommandError::MissingArgument { index: 2, .. })
        ));
    }
}

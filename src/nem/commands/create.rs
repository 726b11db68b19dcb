use crate::commands::{helpers, CmdMessage, CmdResult, Prompter};
use crate::error::{NemError, Result, StoreError};
use crate::mnemonic::derive_code;
use crate::model::{Command, COMMANDS_TABLE};
use crate::resolve::resolve_codes;
use crate::store::{LayerSelection, LayeredStore, StorageBackend};

/// Adds a command to the closest layer under a derived code.
pub fn run<B: StorageBackend, S: AsRef<str>>(
    store: &mut LayeredStore<B>,
    words: &[S],
    prompter: &mut dyn Prompter,
) -> Result<CmdResult> {
    let cmd = words
        .iter()
        .map(|w| w.as_ref())
        .collect::<Vec<_>>()
        .join(" ");
    if cmd.trim().is_empty() {
        return Err(NemError::Api("please specify a command to create".into()));
    }
    let closest = store.closest().cloned().ok_or(StoreError::NoLayers)?;

    let taken = helpers::closest_codes(store)?;
    let code = derive_code(&cmd, &taken);
    if code.is_empty() {
        return Err(NemError::Api(format!(
            "could not derive a code for `{}`",
            cmd
        )));
    }

    let shadowed = resolve_codes(store)?
        .get(&code)
        .filter(|entry| entry.cmd != cmd)
        .map(|entry| entry.cmd.clone());

    let desc = prompter.ask("command description").unwrap_or_default();
    let command = Command::new(cmd, code, desc);
    store.add(COMMANDS_TABLE, command.to_record(), &LayerSelection::Closest)?;

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "added command: {} [{}] to {}",
        command.cmd, command.code, closest
    )));
    if let Some(other) = shadowed {
        result.add_message(CmdMessage::warning(format!(
            "[{}] was also `{}` from a farther nem file, which now gets a numbered code",
            command.code, other
        )));
    }
    result.affected.push(command);
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::helpers::fixtures::{two_layers, PROJECT};
    use crate::commands::NoPrompt;
    use crate::store::LayerId;

    struct Answer(&'static str);

    impl Prompter for Answer {
        fn ask(&mut self, _label: &str) -> Option<String> {
            Some(self.0.to_string())
        }
    }

    #[test]
    fn adds_to_closest_layer_with_derived_code() {
        let mut store = two_layers(&[], &[]);
        let result = run(&mut store, &["git", "status"], &mut Answer("show status")).unwrap();

        assert_eq!(result.affected[0].code, "gs");
        assert_eq!(result.affected[0].desc, "show status");
        let closest = &store.layers()[0];
        assert_eq!(closest.id(), &LayerId::from(PROJECT));
        assert_eq!(closest.rows(COMMANDS_TABLE).len(), 1);
    }

    #[test]
    fn derived_code_avoids_closest_layer_codes() {
        let mut store = two_layers(&[("gs", "git stash")], &[]);
        let result = run(&mut store, &["git", "status"], &mut NoPrompt).unwrap();
        assert_eq!(result.affected[0].code, "gsf");
        assert_eq!(result.affected[0].desc, "");
    }

    #[test]
    fn warns_when_a_farther_code_gets_shadowed() {
        let mut store = two_layers(&[], &[("gs", "git stash")]);
        let result = run(&mut store, &["git", "status"], &mut NoPrompt).unwrap();
        assert_eq!(result.affected[0].code, "gs");
        assert_eq!(result.messages.len(), 2);
        assert_eq!(
            result.messages[1].level,
            crate::commands::MessageLevel::Warning
        );
    }

    #[test]
    fn records_placeholders() {
        let mut store = two_layers(&[], &[]);
        let result = run(
            &mut store,
            &["git", "push", "{remote=origin}"],
            &mut NoPrompt,
        )
        .unwrap();
        assert_eq!(result.affected[0].code, "gp");
        assert_eq!(result.affected[0].arg_count, 1);
    }

    #[test]
    fn empty_command_is_rejected() {
        let mut store = two_layers(&[], &[]);
        let words: [&str; 0] = [];
        assert!(run(&mut store, &words, &mut NoPrompt).is_err());
    }
}

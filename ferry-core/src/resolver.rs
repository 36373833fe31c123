//! Selecting the subcommand and its arguments from positional tokens.
//!
//! Grammar: `[subcommand] config_path [workflow_name [source_ref]]`. The
//! subcommand may be omitted, in which case the default command runs. A first
//! token ending in [`DEFAULT_CONFIG_FILENAME`] is always read as a config
//! path, so a subcommand whose name ends with that suffix cannot be selected
//! explicitly.

use std::collections::HashMap;

use crate::commands::{self, FerryCommand};
use crate::config::DEFAULT_CONFIG_FILENAME;
use crate::error::{FerryError, Result};

/// The subcommand chosen for this invocation and the arguments it receives.
pub struct CommandWithArgs<'a> {
    command: &'a dyn FerryCommand,
    args: Vec<String>,
}

impl<'a> CommandWithArgs<'a> {
    pub fn command(&self) -> &'a dyn FerryCommand {
        self.command
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn into_parts(self) -> (&'a dyn FerryCommand, Vec<String>) {
        (self.command, self.args)
    }
}

impl std::fmt::Debug for CommandWithArgs<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandWithArgs")
            .field("command", &self.command.name())
            .field("args", &self.args)
            .finish()
    }
}

/// Resolve positional tokens against `commands` (keyed by lower-case name).
pub fn resolve<'a>(
    positional: &[String],
    commands: &'a HashMap<String, Box<dyn FerryCommand>>,
    default_command: &'a dyn FerryCommand,
) -> Result<CommandWithArgs<'a>> {
    let Some(first_arg) = positional.first() else {
        return Ok(CommandWithArgs {
            command: default_command,
            args: Vec::new(),
        });
    };

    // The default command takes a config path as its first argument.
    if first_arg.ends_with(DEFAULT_CONFIG_FILENAME) {
        return Ok(CommandWithArgs {
            command: default_command,
            args: positional.to_vec(),
        });
    }

    match commands.get(&first_arg.to_lowercase()) {
        Some(command) => Ok(CommandWithArgs {
            command: command.as_ref(),
            args: positional[1..].to_vec(),
        }),
        None => {
            let mut available: Vec<String> = commands.keys().cloned().collect();
            available.sort();
            Err(FerryError::InvalidCommand {
                command: first_arg.clone(),
                available,
            })
        }
    }
}

/// Named subcommands plus the one that runs when none is named.
pub struct CommandRegistry {
    commands: HashMap<String, Box<dyn FerryCommand>>,
    default_name: String,
}

impl CommandRegistry {
    /// Build a registry whose default is `default_command`, which is also registered by name.
    pub fn new(default_command: Box<dyn FerryCommand>) -> Self {
        let default_name = default_command.name().to_lowercase();
        let mut commands: HashMap<String, Box<dyn FerryCommand>> = HashMap::new();
        commands.insert(default_name.clone(), default_command);
        Self {
            commands,
            default_name,
        }
    }

    /// `migrate` (default), `validate` and `info`.
    pub fn standard() -> Self {
        Self::new(Box::new(commands::migrate::MigrateCmd))
            .register(Box::new(commands::validate::ValidateCmd))
            .register(Box::new(commands::info::InfoCmd))
    }

    /// Add a command under its lower-cased name, replacing any previous one.
    pub fn register(mut self, command: Box<dyn FerryCommand>) -> Self {
        let name = command.name().to_lowercase();
        if name == self.default_name {
            log::warn!("Replacing default command; name={}", name);
        }
        self.commands.insert(name, command);
        self
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.commands.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn default_command(&self) -> &dyn FerryCommand {
        // The default is inserted at construction and register() only replaces entries.
        self.commands[&self.default_name].as_ref()
    }

    pub fn resolve(&self, positional: &[String]) -> Result<CommandWithArgs<'_>> {
        resolve(positional, &self.commands, self.default_command())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{CommandContext, CommandOutcome};

    struct Named(&'static str);

    impl FerryCommand for Named {
        fn name(&self) -> &'static str {
            self.0
        }

        fn execute(&self, _args: &[String], _ctx: &mut CommandContext) -> Result<CommandOutcome> {
            unimplemented!("not executed in resolver tests")
        }
    }

    fn tokens(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    fn registry() -> CommandRegistry {
        CommandRegistry::new(Box::new(Named("migrate")))
            .register(Box::new(Named("validate")))
            .register(Box::new(Named("info")))
    }

    #[test]
    fn test_empty_tokens_select_default() {
        let registry = registry();
        let resolved = registry.resolve(&[]).unwrap();
        assert_eq!(resolved.command().name(), "migrate");
        assert!(resolved.args().is_empty());
    }

    #[test]
    fn test_config_path_selects_default_with_all_tokens() {
        let registry = registry();
        let args = tokens(&["path/to/ferry.toml", "default", "main"]);
        let resolved = registry.resolve(&args).unwrap();
        assert_eq!(resolved.command().name(), "migrate");
        assert_eq!(resolved.args(), args.as_slice());
    }

    #[test]
    fn test_bare_config_filename() {
        let registry = registry();
        let resolved = registry.resolve(&tokens(&["ferry.toml"])).unwrap();
        assert_eq!(resolved.command().name(), "migrate");
        assert_eq!(resolved.args(), tokens(&["ferry.toml"]).as_slice());
    }

    #[test]
    fn test_named_command_case_insensitive() {
        let registry = registry();
        let resolved = registry.resolve(&tokens(&["VALIDATE", "cfg.sky"])).unwrap();
        assert_eq!(resolved.command().name(), "validate");
        assert_eq!(resolved.args(), tokens(&["cfg.sky"]).as_slice());
    }

    #[test]
    fn test_explicit_default_command_drops_name() {
        let registry = registry();
        let resolved = registry
            .resolve(&tokens(&["migrate", "ferry.toml", "wf"]))
            .unwrap();
        assert_eq!(resolved.command().name(), "migrate");
        assert_eq!(resolved.args(), tokens(&["ferry.toml", "wf"]).as_slice());
    }

    #[test]
    fn test_unknown_command_lists_sorted_names() {
        let registry = registry();
        let err = registry.resolve(&tokens(&["bogus", "x"])).unwrap_err();
        match &err {
            FerryError::InvalidCommand { command, available } => {
                assert_eq!(command, "bogus");
                assert_eq!(available, &tokens(&["info", "migrate", "validate"]));
            }
            other => panic!("expected InvalidCommand, got {:?}", other),
        }
        assert_eq!(
            err.to_string(),
            "Invalid subcommand 'bogus'. Available commands: [info, migrate, validate]"
        );
    }

    #[test]
    fn test_sorted_regardless_of_insertion_order() {
        for order in [
            ["zeta", "alpha", "mid"],
            ["mid", "zeta", "alpha"],
            ["alpha", "mid", "zeta"],
        ] {
            let mut registry = CommandRegistry::new(Box::new(Named("migrate")));
            for name in order {
                registry = registry.register(Box::new(Named(name)));
            }
            match registry.resolve(&tokens(&["nope"])).unwrap_err() {
                FerryError::InvalidCommand { available, .. } => {
                    assert_eq!(available, tokens(&["alpha", "mid", "migrate", "zeta"]))
                }
                other => panic!("expected InvalidCommand, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_suffix_shadows_command_name() {
        let registry = registry().register(Box::new(Named("export-ferry.toml")));
        let resolved = registry
            .resolve(&tokens(&["export-ferry.toml", "x"]))
            .unwrap();
        assert_eq!(resolved.command().name(), "migrate");
        assert_eq!(resolved.args().len(), 2);
    }

    #[test]
    fn test_free_function_with_separate_default() {
        let mut commands: HashMap<String, Box<dyn FerryCommand>> = HashMap::new();
        commands.insert("info".to_string(), Box::new(Named("info")));
        let default = Named("migrate");
        let resolved = resolve(&tokens(&["a/ferry.toml"]), &commands, &default).unwrap();
        assert_eq!(resolved.command().name(), "migrate");
        let (command, args) = resolve(&tokens(&["Info", "a", "b"]), &commands, &default)
            .unwrap()
            .into_parts();
        assert_eq!(command.name(), "info");
        assert_eq!(args, tokens(&["a", "b"]));
    }

    #[test]
    fn test_standard_registry() {
        let registry = CommandRegistry::standard();
        assert_eq!(registry.names(), tokens(&["info", "migrate", "validate"]));
        assert_eq!(registry.default_command().name(), "migrate");
    }
}

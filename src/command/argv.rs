//! Argument vector tokenization.
//!
//! The untyped pass knows nothing about the command and only separates
//! positional tokens from option-shaped ones. The typed pass is run once the
//! command is known and is driven by the command's [`ParserConfig`].

use std::collections::HashSet;

use clap::{Arg, ArgAction};

use super::options::{OptionSpec, OptionType, OptionValue, ParsedOptions, ParserConfig};

pub const LOGLEVEL_OPTION: &str = "loglevel";
pub const NO_INTERACTIVE_OPTION: &str = "no-interactive";

const INPUTS_ID: &str = "__inputs";

/// Global options that always take a value, even before the command is known.
const GLOBAL_VALUE_OPTIONS: &[&str] = &[LOGLEVEL_OPTION];

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UntypedArgs {
    pub positionals: Vec<String>,
    pub options: Vec<(String, Option<String>)>,
}

impl UntypedArgs {
    pub fn parse(args: &[String]) -> Self {
        let mut parsed = Self::default();
        let mut iter = args.iter().peekable();

        while let Some(arg) = iter.next() {
            if arg == "--" {
                parsed.positionals.extend(iter.by_ref().cloned());
                break;
            }

            if let Some(long) = arg.strip_prefix("--") {
                match long.split_once('=') {
                    Some((name, value)) => parsed
                        .options
                        .push((name.to_string(), Some(value.to_string()))),
                    None if GLOBAL_VALUE_OPTIONS.contains(&long) => {
                        let value = iter.next_if(|next| !next.starts_with('-')).cloned();
                        parsed.options.push((long.to_string(), value));
                    }
                    None => parsed.options.push((long.to_string(), None)),
                }
            } else if arg.len() > 1 && arg.starts_with('-') {
                for c in arg[1..].chars() {
                    parsed.options.push((c.to_string(), None));
                }
            } else {
                parsed.positionals.push(arg.clone());
            }
        }

        parsed
    }

    pub fn value_of(&self, name: &str) -> Option<&str> {
        self.options
            .iter()
            .rev()
            .find(|(n, _)| n == name)
            .and_then(|(_, v)| v.as_deref())
    }

    pub fn has(&self, name: &str) -> bool {
        self.options.iter().any(|(n, _)| n == name)
    }
}

/// Result of the typed pass.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TypedArgs {
    pub positionals: Vec<String>,
    pub options: ParsedOptions,
}

pub fn parse_typed(config: &ParserConfig, args: &[String]) -> Result<TypedArgs, clap::Error> {
    let command = build_parser(config);
    let matches = command.try_get_matches_from(args)?;

    let positionals = matches
        .get_many::<String>(INPUTS_ID)
        .map(|values| values.cloned().collect())
        .unwrap_or_default();

    let mut options = ParsedOptions::new();
    for name in config.names() {
        let declared_default = config
            .default
            .get(name)
            .cloned()
            .unwrap_or(OptionValue::Null);

        let value = match config.type_of(name) {
            Some(OptionType::Boolean) => {
                if matches.get_flag(name) {
                    OptionValue::Bool(true)
                } else {
                    declared_default
                }
            }
            _ => matches
                .get_one::<String>(name)
                .map(|v| OptionValue::String(v.clone()))
                .unwrap_or(declared_default),
        };
        options.insert(name, value);
    }

    Ok(TypedArgs {
        positionals,
        options,
    })
}

/// Checks that `options` can drive the typed pass. Every long name and alias
/// must be well formed and used once, and none may shadow a global option.
pub fn check_option_flags(options: &[OptionSpec]) -> Result<(), String> {
    let mut seen = HashSet::new();
    for option in options {
        for flag in std::iter::once(&option.name).chain(&option.aliases) {
            let malformed = flag.is_empty()
                || flag.starts_with('-')
                || flag == INPUTS_ID
                || flag.contains(|c: char| c.is_whitespace() || c == '=');
            if malformed {
                return Err(format!("option '{}' declares invalid flag '{}'", option.name, flag));
            }
            if flag == LOGLEVEL_OPTION || flag == NO_INTERACTIVE_OPTION {
                return Err(format!(
                    "option '{}' shadows the global option --{}",
                    option.name, flag
                ));
            }
            if !seen.insert(flag.as_str()) {
                return Err(format!("flag '{}' is declared more than once", flag));
            }
        }
    }
    Ok(())
}

fn build_parser(config: &ParserConfig) -> clap::Command {
    let mut command = clap::Command::new("ionic")
        .no_binary_name(true)
        .disable_help_flag(true)
        .disable_version_flag(true)
        .args_override_self(true)
        .arg(
            Arg::new(INPUTS_ID)
                .value_name("INPUTS")
                .num_args(1..)
                .action(ArgAction::Append),
        );

    for name in config.names() {
        let mut arg = Arg::new(name.to_string()).long(name.to_string());
        arg = match config.type_of(name) {
            Some(OptionType::Boolean) => arg.action(ArgAction::SetTrue),
            _ => arg.num_args(1).action(ArgAction::Set),
        };

        let mut has_short = false;
        for alias in config.alias.get(name).into_iter().flatten() {
            let mut chars = alias.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) if !has_short => {
                    arg = arg.short(c);
                    has_short = true;
                }
                (Some(c), None) => arg = arg.short_alias(c),
                _ => arg = arg.alias(alias.clone()),
            }
        }

        command = command.arg(arg);
    }

    if config.type_of(LOGLEVEL_OPTION).is_none() {
        command = command.arg(
            Arg::new(LOGLEVEL_OPTION)
                .long(LOGLEVEL_OPTION)
                .num_args(1)
                .action(ArgAction::Set),
        );
    }
    if config.type_of(NO_INTERACTIVE_OPTION).is_none() {
        command = command.arg(
            Arg::new(NO_INTERACTIVE_OPTION)
                .long(NO_INTERACTIVE_OPTION)
                .action(ArgAction::SetTrue),
        );
    }

    command
}

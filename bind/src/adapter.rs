//! Clap integration.
//!
//! Exposes a [`BoundCommand`]'s flat parameter list to clap, the hosting
//! framework that introspects declared parameters: boolean kinds become
//! `SetTrue` flags, choice kinds get possible-value parsers, everything else
//! becomes a valued option carrying the spec's default. Token parsing stays
//! clap's job; this module only translates shapes in both directions.

use clap::builder::PossibleValuesParser;
use clap::{Arg, ArgAction, ArgMatches, Command};
use serde_json::Value;

use crate::decorate::BoundCommand;
use crate::resolve::PrimitiveKind;

/// Builds a `clap::Command` mirroring the bound command's parameter list.
///
/// # Examples
///
/// ```
/// use command_bind::{decorate, to_clap_command};
/// use command_bind_core::{FieldSpec, ModelSchema, Outcome, TypeExpr};
/// use serde_json::json;
///
/// let schema = ModelSchema::new("greet")
///     .with_field(FieldSpec::required("name", TypeExpr::String))
///     .with_field(FieldSpec::optional("verbose", TypeExpr::Boolean).with_default(json!(false)));
///
/// let command = decorate(&schema, |_| Outcome::success(json!("ok"))).unwrap();
/// let clap_cmd = to_clap_command(&command);
///
/// let matches = clap_cmd
///     .try_get_matches_from(["greet", "--name", "x", "--verbose"])
///     .unwrap();
/// assert!(matches.get_flag("verbose"));
/// ```
pub fn to_clap_command(command: &BoundCommand) -> Command {
    let mut cmd = Command::new(command.name().to_string());

    for spec in command.params() {
        let long = spec.cli_name.trim_start_matches("--").to_string();
        let mut arg = Arg::new(spec.field_name.clone()).long(long);

        if let Some(help) = &spec.help {
            arg = arg.help(help.clone());
        }

        if spec.is_flag {
            arg = arg.action(ArgAction::SetTrue);
        } else {
            arg = arg.action(ArgAction::Set);
            if let PrimitiveKind::Choice(choices) = &spec.kind {
                arg = arg.value_parser(PossibleValuesParser::new(choices.clone()));
            }
            if let Some(rendered) = render_default(&spec.default) {
                arg = arg.default_value(rendered);
            }
        }

        cmd = cmd.arg(arg);
    }

    cmd
}

/// Invokes the bound command from parsed matches.
///
/// Values arrive from clap as text; kind coercion and constraint checks run
/// in the validation bridge as usual.
pub fn invoke_from_matches(command: &BoundCommand, matches: &ArgMatches) -> String {
    let mut args: Vec<(&str, Value)> = Vec::new();

    for spec in command.params() {
        if spec.is_flag {
            args.push((
                spec.field_name.as_str(),
                Value::Bool(matches.get_flag(&spec.field_name)),
            ));
        } else if let Some(raw) = matches.get_one::<String>(&spec.field_name) {
            args.push((spec.field_name.as_str(), Value::String(raw.clone())));
        }
    }

    command.invoke(&args)
}

/// Text rendering of a spec default for clap, `None` when the parameter
/// should stay defaultless (null defaults on optional kinds).
fn render_default(default: &Value) -> Option<String> {
    match default {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

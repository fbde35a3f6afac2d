//! Clap dispatch example.
//!
//! Shows the flat parameter list being handed to clap: the schema becomes a
//! real `clap::Command`, clap parses argv, and the matches are bound back
//! into a validated model for the handler.
//!
//! ```bash
//! cargo run -p command-bind-demos --example clap_dispatch -- --name api --verbose
//! ```

use command_bind::{decorate, invoke_from_matches, to_clap_command};
use command_bind_core::{FieldSpec, ModelSchema, Outcome, TypeExpr};
use serde_json::json;

fn main() {
    let schema = ModelSchema::new("deploy")
        .with_field(FieldSpec::required("name", TypeExpr::String).with_description("Service name"))
        .with_field(
            FieldSpec::optional("retry_count", TypeExpr::Integer)
                .with_default(json!(3))
                .with_description("Retry attempts"),
        )
        .with_field(
            FieldSpec::optional("verbose", TypeExpr::Boolean)
                .with_default(json!(false))
                .with_description("Verbose output"),
        );

    let command = decorate(&schema, |m| {
        let mut line = format!(
            "deploying {} with {} retries",
            m.get("name").unwrap().as_str().unwrap(),
            m.get("retry_count").unwrap()
        );
        if m.get("verbose").unwrap() == &json!(true) {
            line.push_str(" (verbose)");
        }
        Outcome::success(json!(line))
    })
    .expect("schema should compile");

    let matches = to_clap_command(&command).get_matches();
    println!("{}", invoke_from_matches(&command, &matches));
}

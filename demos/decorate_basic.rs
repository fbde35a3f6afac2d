//! Basic decoration example.
//!
//! Builds a schema, decorates a handler, and invokes the resulting command
//! with flat named arguments — including a validation failure path.
//!
//! ```bash
//! cargo run -p command-bind-demos --example decorate_basic
//! ```

use command_bind::decorate;
use command_bind_core::{FieldSpec, ModelSchema, Outcome, TypeExpr};
use serde_json::json;

fn main() {
    let schema = ModelSchema::new("deploy")
        .with_description("Deploy a service")
        .with_field(FieldSpec::required("name", TypeExpr::String).with_description("Service name"))
        .with_field(
            FieldSpec::optional("retries", TypeExpr::Integer)
                .with_default(json!(3))
                .with_description("Retry attempts"),
        )
        .with_field(
            FieldSpec::optional("env", TypeExpr::Literal(vec![json!("staging"), json!("prod")]))
                .with_default(json!("staging")),
        );

    let command = decorate(&schema, |m| {
        Outcome::success(json!(format!(
            "deploying {} to {} ({} retries)",
            m.get("name").unwrap().as_str().unwrap(),
            m.get("env").unwrap().as_str().unwrap(),
            m.get("retries").unwrap()
        )))
    })
    .expect("schema should compile");

    println!("=== Declared parameters ===");
    for param in command.params() {
        println!(
            "  {} ({}) default={}",
            param.cli_name, param.kind, param.default
        );
    }

    println!("\n=== Invocations ===");
    println!("{}", command.invoke(&[("name", json!("api"))]));
    println!(
        "{}",
        command.invoke(&[("name", json!("api")), ("env", json!("prod"))])
    );
    // Validation failure comes back as text, not a panic.
    println!("{}", command.invoke(&[("name", json!("api")), ("env", json!("qa"))]));
}

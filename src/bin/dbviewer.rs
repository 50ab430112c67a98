use anyhow::Result;
use dbviewer::cli::{actions, actions::Action, start, telemetry};

// Main function
#[tokio::main]
async fn main() -> Result<()> {
    // Start the program
    let action = start()?;

    // Handle the action
    let result = match action {
        Action::Server(args) => actions::server::execute(args).await,
        Action::HashPassword { password } => actions::hash_password::execute(&password),
    };

    telemetry::shutdown_tracer();

    result
}

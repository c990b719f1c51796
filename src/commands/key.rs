use clap::Subcommand;

use crate::errors::AppError;
use crate::services::api_key::mask_api_key;
use crate::state::AppState;

#[derive(Subcommand, Debug)]
pub enum KeyCommand {
    /// Store an API key (must start with "sk-")
    Set { key: String },
    /// Forget the stored API key
    Clear,
    /// Show the stored API key, masked
    Show,
}

pub fn run(action: KeyCommand, state: &mut AppState) -> Result<(), AppError> {
    match action {
        KeyCommand::Set { key } => {
            state.workspace.set_api_key(&key)?;
            println!("API key saved");
        }
        KeyCommand::Clear => {
            state.workspace.clear_api_key()?;
            println!("API key removed");
        }
        KeyCommand::Show => match state.workspace.api_key() {
            Some(key) => println!("{}", mask_api_key(key)),
            None => println!("No API key set"),
        },
    }
    Ok(())
}

//! CLI subcommands. Each handler takes the loaded [`AppState`] and prints its
//! result to stdout.

pub mod assistant;
pub mod chat;
pub mod chunk;
pub mod documents;
pub mod key;

use clap::Subcommand;
use std::path::PathBuf;

use crate::errors::AppError;
use crate::state::AppState;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Manage the stored DeepSeek API key
    Key {
        #[command(subcommand)]
        action: key::KeyCommand,
    },
    /// Initialize the remote assistant for the stored API key
    Init,
    /// Upload a PDF for ingestion and open a conversation about it
    Upload {
        /// Path to the PDF file
        file: PathBuf,
    },
    /// List uploaded documents
    Docs,
    /// Make a document the active one
    Select {
        /// Document id (as shown by `docs`)
        id: String,
    },
    /// Delete a document and its conversation
    Delete {
        /// Document id (as shown by `docs`)
        id: String,
    },
    /// Ask a question about the active document
    Ask {
        /// The question; multiple words are joined with spaces
        #[arg(required = true, num_args = 1..)]
        question: Vec<String>,
    },
    /// Print the active document's conversation
    Messages,
    /// Print the assistant's chat history as held by the backend
    History,
    /// Reset the remote knowledge base
    Reset,
    /// Extract and chunk a document locally, without contacting the backend
    Chunk(chunk::ChunkArgs),
}

pub async fn run(command: Command, state: &mut AppState) -> Result<(), AppError> {
    match command {
        Command::Key { action } => key::run(action, state),
        Command::Init => assistant::initialize(state).await,
        Command::Upload { file } => documents::upload(state, &file).await,
        Command::Docs => documents::list(state),
        Command::Select { id } => documents::select(state, &id),
        Command::Delete { id } => documents::delete(state, &id),
        Command::Ask { question } => chat::ask(state, &question.join(" ")).await,
        Command::Messages => chat::messages(state),
        Command::History => chat::history(state).await,
        Command::Reset => assistant::reset(state).await,
        Command::Chunk(args) => chunk::run(args, state).await,
    }
}

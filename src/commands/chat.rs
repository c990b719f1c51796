use crate::errors::AppError;
use crate::state::AppState;

pub async fn ask(state: &mut AppState, question: &str) -> Result<(), AppError> {
    let response = state.workspace.ask(&state.client, question).await?;
    println!("{}", response.answer);
    Ok(())
}

pub fn messages(state: &AppState) -> Result<(), AppError> {
    let conv = state.workspace.active_conversation().ok_or_else(|| {
        AppError::Validation("Select or upload a document to start a conversation".to_string())
    })?;

    for message in &conv.messages {
        println!("{}: {}", message.role, message.content);
    }
    Ok(())
}

pub async fn history(state: &AppState) -> Result<(), AppError> {
    let ctx = state.workspace.request_context()?;
    let response = state.client.chat_history(&ctx).await?;

    if response.history.is_empty() {
        println!("No chat history");
    }
    for entry in response.history {
        println!("{}: {}", entry.role, entry.content);
    }
    Ok(())
}

use crate::errors::AppError;
use crate::state::AppState;

pub async fn initialize(state: &AppState) -> Result<(), AppError> {
    let ctx = state.workspace.request_context()?;
    let response = state.client.initialize(&ctx).await?;
    println!("{}", response.message);
    Ok(())
}

pub async fn reset(state: &AppState) -> Result<(), AppError> {
    let ctx = state.workspace.request_context()?;
    let response = state.client.reset(&ctx).await?;
    println!("{}", response.message);
    Ok(())
}

pub mod api_client;
pub mod api_key;
pub mod text_extract;
pub mod text_processing;

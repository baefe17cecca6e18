pub mod api_error;
pub mod pipeline_error;

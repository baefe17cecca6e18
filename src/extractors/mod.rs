pub mod refresh_request;

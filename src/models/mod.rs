use serde::{Deserialize, Serialize};

pub mod chain_view;
pub mod option_chain;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

mod companies;
mod invoices;

pub use companies::*;
pub use invoices::*;

use serde::{Deserialize, Serialize};

/// `{message}` confirmation returned by deletes.
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

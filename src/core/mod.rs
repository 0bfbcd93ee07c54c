pub mod api;
pub mod session;

pub use crate::domain::model::{AudioPayload, ErrorBody, TextMessageRequest, TranscribeResponse};
pub use crate::domain::ports::{ChatBackend, ConfigProvider};
pub use crate::utils::error::Result;

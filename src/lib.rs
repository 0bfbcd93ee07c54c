pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use config::ClientConfig;
pub use core::{
    api::ApiClient,
    session::{render_outcome, ChatCommand, ChatOutcome, ChatSession},
};
pub use domain::model::{AgentReply, AudioPayload, TranscribeResponse};
pub use utils::error::{ClientError, Result};

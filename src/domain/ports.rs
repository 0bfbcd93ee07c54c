use crate::domain::model::{AudioPayload, TranscribeResponse};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait ConfigProvider: Send + Sync {
    fn base_url(&self) -> &str;
    fn audio_file_name(&self) -> &str;
}

/// 聊天後端的操作介面，讓 CLI 流程可以不經網路測試
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn transcribe_audio(&self, payload: AudioPayload) -> Result<TranscribeResponse>;
    async fn send_text_message(&self, message: &str) -> Result<TranscribeResponse>;
    async fn fetch_audio(&self, audio_url: &str) -> Result<Vec<u8>>;
}

use crate::core::{AudioPayload, ChatBackend, ConfigProvider, ErrorBody, TextMessageRequest};
use crate::domain::model::TranscribeResponse;
use crate::utils::error::{ClientError, Result};
use async_trait::async_trait;
use reqwest::{multipart, Client, Response};
use url::Url;

const TRANSCRIBE_PATH: &str = "transcribe";
const TEXT_MESSAGE_PATH: &str = "text-message";

const TRANSCRIBE_FALLBACK: &str = "Failed to transcribe audio";
const TEXT_MESSAGE_FALLBACK: &str = "Failed to send text message";
const FETCH_AUDIO_FALLBACK: &str = "Failed to fetch audio";

/// 聊天後端的 HTTP 客戶端
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
}

impl ApiClient {
    pub fn new<C: ConfigProvider>(config: &C) -> Result<Self> {
        Self::with_client(Client::new(), config)
    }

    pub fn with_client<C: ConfigProvider>(client: Client, config: &C) -> Result<Self> {
        let mut base_url =
            Url::parse(config.base_url()).map_err(|e| ClientError::InvalidConfigValueError {
                field: "base_url".to_string(),
                value: config.base_url().to_string(),
                reason: format!("Invalid URL format: {}", e),
            })?;

        // 確保 join 時保留 base 的路徑，例如 http://host/api/ + transcribe
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// 上傳錄音並回傳後端的原始 JSON
    pub async fn transcribe_audio_raw(&self, payload: AudioPayload) -> Result<serde_json::Value> {
        let url = self.endpoint(TRANSCRIBE_PATH)?;
        tracing::debug!(
            "Uploading {} bytes ({}, {}) to {}",
            payload.len(),
            payload.file_name,
            payload.mime_type,
            url
        );

        let part = multipart::Part::bytes(payload.bytes)
            .file_name(payload.file_name)
            .mime_str(&payload.mime_type)?;
        let form = multipart::Form::new().part("audio", part);

        let response = self.client.post(url).multipart(form).send().await?;
        Self::read_json(response, TRANSCRIBE_FALLBACK).await
    }

    /// 送出文字訊息並回傳後端的原始 JSON
    pub async fn send_text_message_raw(&self, message: &str) -> Result<serde_json::Value> {
        let url = self.endpoint(TEXT_MESSAGE_PATH)?;
        tracing::debug!("Sending text message ({} chars) to {}", message.chars().count(), url);

        let response = self
            .client
            .post(url)
            .json(&TextMessageRequest { message })
            .send()
            .await?;
        Self::read_json(response, TEXT_MESSAGE_FALLBACK).await
    }

    /// 下載回覆語音；相對路徑以 base URL 解析
    pub async fn fetch_audio(&self, audio_url: &str) -> Result<Vec<u8>> {
        let url = self.endpoint(audio_url)?;
        tracing::debug!("Fetching reply audio from {}", url);

        let response = self.client.get(url).send().await?;
        Self::read_success(response, FETCH_AUDIO_FALLBACK).await
    }

    pub async fn transcribe_audio(&self, payload: AudioPayload) -> Result<TranscribeResponse> {
        let value = self.transcribe_audio_raw(payload).await?;
        Ok(serde_json::from_value(value)?)
    }

    pub async fn send_text_message(&self, message: &str) -> Result<TranscribeResponse> {
        let value = self.send_text_message_raw(message).await?;
        Ok(serde_json::from_value(value)?)
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| ClientError::InvalidConfigValueError {
                field: "endpoint".to_string(),
                value: path.to_string(),
                reason: format!("Cannot resolve against {}: {}", self.base_url, e),
            })
    }

    async fn read_json(response: Response, fallback: &str) -> Result<serde_json::Value> {
        let bytes = Self::read_success(response, fallback).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn read_success(response: Response, fallback: &str) -> Result<Vec<u8>> {
        let status = response.status();
        tracing::debug!("API response status: {}", status);

        if !status.is_success() {
            // 讀取失敗也當成空內容處理
            let body = ErrorBody::parse(&response.bytes().await.unwrap_or_default());
            let err = ClientError::ServerError {
                status: status.as_u16(),
                message: body.message_or(fallback),
                details: body.details(),
            };
            tracing::warn!("Request failed with {}: {}", status, err);
            return Err(err);
        }

        let bytes = response.bytes().await?;
        tracing::debug!("Received {} bytes", bytes.len());
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl ChatBackend for ApiClient {
    async fn transcribe_audio(&self, payload: AudioPayload) -> Result<TranscribeResponse> {
        ApiClient::transcribe_audio(self, payload).await
    }

    async fn send_text_message(&self, message: &str) -> Result<TranscribeResponse> {
        ApiClient::send_text_message(self, message).await
    }

    async fn fetch_audio(&self, audio_url: &str) -> Result<Vec<u8>> {
        ApiClient::fetch_audio(self, audio_url).await
    }
}

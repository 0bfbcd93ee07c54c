use crate::utils::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_AUDIO_FILE_NAME: &str = "audio.webm";
pub const DEFAULT_AUDIO_MIME: &str = "audio/webm";

/// `/transcribe` 與 `/text-message` 共用的回應格式
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscribeResponse {
    pub id: String,
    pub transcription: String,
    pub ganesha_response: AgentReply,
    /// 只有語音請求才會附上合成語音的位置
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentReply {
    pub lang: String,
    pub blessing_open: String,
    pub answer: String,
    pub blessing_close: String,
    #[serde(default)]
    pub refusal: bool,
    #[serde(default)]
    pub refusal_reason: Option<String>,
}

impl AgentReply {
    /// 後端送去語音合成的完整文字
    pub fn spoken_text(&self) -> String {
        format!("{}{}{}", self.blessing_open, self.answer, self.blessing_close)
    }

    pub fn refusal_reason(&self) -> Option<&str> {
        if !self.refusal {
            return None;
        }
        self.refusal_reason
            .as_deref()
            .filter(|reason| !reason.is_empty())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TextMessageRequest<'a> {
    pub message: &'a str,
}

/// 失敗回應的內容。欄位型別不固定，所以保留原始 JSON。
#[derive(Debug, Clone, Default)]
pub struct ErrorBody {
    raw: serde_json::Value,
}

impl ErrorBody {
    /// 解析失敗（非 JSON 或空內容）時視為空物件
    pub fn parse(bytes: &[u8]) -> Self {
        let raw: serde_json::Value = serde_json::from_slice(bytes)
            .unwrap_or_else(|_| serde_json::Value::Object(serde_json::Map::new()));
        Self { raw }
    }

    pub fn error(&self) -> Option<String> {
        self.raw.get("error").and_then(truthy_text)
    }

    pub fn details(&self) -> Option<String> {
        self.raw.get("details").and_then(truthy_text)
    }

    /// `error` 欄位有值就用它，否則使用固定訊息
    pub fn message_or(&self, fallback: &str) -> String {
        self.error().unwrap_or_else(|| fallback.to_string())
    }
}

// null、false、0、"" 視為沒有值；其他非字串值以 JSON 文字呈現
fn truthy_text(value: &serde_json::Value) -> Option<String> {
    use serde_json::Value;

    match value {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        other => Some(other.to_string()),
    }
}

/// 要上傳的錄音內容
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioPayload {
    pub bytes: Vec<u8>,
    pub file_name: String,
    pub mime_type: String,
}

impl AudioPayload {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            file_name: DEFAULT_AUDIO_FILE_NAME.to_string(),
            mime_type: DEFAULT_AUDIO_MIME.to_string(),
        }
    }

    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = file_name.into();
        self
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = mime_type.into();
        self
    }

    /// 從檔案讀取錄音，MIME 由副檔名推斷；上傳檔名維持預設值
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        Ok(Self::new(bytes).with_mime_type(mime_for_path(path)))
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

pub fn mime_for_path(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());

    match extension.as_deref() {
        Some("webm") => "audio/webm",
        Some("wav") => "audio/wav",
        Some("ogg") | Some("oga") => "audio/ogg",
        Some("mp3") => "audio/mpeg",
        Some("m4a") => "audio/mp4",
        _ => "application/octet-stream",
    }
}

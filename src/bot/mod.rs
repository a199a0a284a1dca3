use async_trait::async_trait;
use thiserror::Error;

/// OAuth 1.0a 簽章
pub mod oauth;
/// X (Twitter) API v2
pub mod twitter;

/// 發文成功後平台回傳的推文
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostedTweet {
    pub id: String,
}

#[derive(Debug, Error)]
pub enum PublishError {
    /// 未設定的環境變數名稱
    #[error("Missing credentials: {}", .0.join(", "))]
    MissingCredentials(Vec<&'static str>),
    #[error("Authentication failed: {0}")]
    Authentication(String),
    #[error("Failed to submit the tweet: {0}")]
    Submission(String),
}

/// 發佈訊息的平台
#[async_trait]
pub trait Publisher {
    async fn publish(&self, text: &str) -> Result<PostedTweet, PublishError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_error_display() {
        let err = PublishError::MissingCredentials(vec!["X_API_KEY", "X_ACCESS_SECRET"]);
        assert_eq!(
            err.to_string(),
            "Missing credentials: X_API_KEY, X_ACCESS_SECRET"
        );
        assert_eq!(
            PublishError::Submission("403 Forbidden".to_string()).to_string(),
            "Failed to submit the tweet: 403 Forbidden"
        );
    }
}

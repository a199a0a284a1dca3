use anyhow::{anyhow, Result};
use async_trait::async_trait;
use concat_string::concat_string;
use reqwest::header::{self, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};

use crate::{
    bot::{
        oauth::{self, Credentials},
        PostedTweet, PublishError, Publisher,
    },
    config, logging,
    util::http,
};

const BASE_URL: &str = "https://api.x.com";
const USERS_ME_PATH: &str = "/2/users/me";
const TWEETS_PATH: &str = "/2/tweets";

pub struct Twitter {
    config: config::Twitter,
    base_url: String,
}

impl Twitter {
    pub fn new(config: &config::Twitter) -> Self {
        Self::with_base_url(config, BASE_URL)
    }

    fn with_base_url(config: &config::Twitter, base_url: &str) -> Self {
        Self {
            config: config.clone(),
            base_url: base_url.to_string(),
        }
    }

    fn credentials(&self) -> Credentials<'_> {
        Credentials {
            consumer_key: self.config.api_key.trim(),
            consumer_secret: self.config.api_secret.trim(),
            token: self.config.access_token.trim(),
            token_secret: self.config.access_secret.trim(),
        }
    }

    /// 每個請求都重新簽章
    fn signed_headers(&self, method: &str, url: &str) -> Result<HeaderMap> {
        let authorization = oauth::authorization_header(
            method,
            url,
            &[],
            &self.credentials(),
            &oauth::nonce(),
            oauth::timestamp(),
        )?;

        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(&authorization)
                .map_err(|why| anyhow!("Invalid authorization header because {:?}", why))?,
        );

        Ok(headers)
    }

    /// 確認憑證有效，回傳帳號名稱
    async fn verify(&self) -> Result<String> {
        let url = concat_string!(self.base_url, USERS_ME_PATH);
        let headers = self.signed_headers("GET", &url)?;
        let res = http::get_json::<UsersMeResponse>(&url, Some(headers)).await?;

        res.data
            .map(|user| user.username)
            .ok_or_else(|| anyhow!("users/me returned no user: {:?}", res.errors))
    }

    async fn create_tweet(&self, text: &str) -> Result<PostedTweet> {
        let url = concat_string!(self.base_url, TWEETS_PATH);
        let headers = self.signed_headers("POST", &url)?;
        let payload = CreateTweetRequest { text };
        let res = http::post_use_json::<CreateTweetRequest, CreateTweetResponse>(
            &url,
            Some(headers),
            Some(&payload),
        )
        .await?;

        res.data
            .map(|tweet| PostedTweet { id: tweet.id })
            .ok_or_else(|| anyhow!("tweets returned no data: {:?}", res.errors))
    }
}

#[async_trait]
impl Publisher for Twitter {
    async fn publish(&self, text: &str) -> Result<PostedTweet, PublishError> {
        let missing = self.config.missing();
        if !missing.is_empty() {
            return Err(PublishError::MissingCredentials(missing));
        }

        let username = self
            .verify()
            .await
            .map_err(|why| PublishError::Authentication(format!("{:?}", why)))?;
        logging::info_file_async(format!("Authenticated as @{}", username));

        self.create_tweet(text)
            .await
            .map_err(|why| PublishError::Submission(format!("{:?}", why)))
    }
}

#[derive(Debug, Deserialize)]
struct UsersMeResponse {
    data: Option<User>,
    errors: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct User {
    username: String,
}

#[derive(Serialize)]
struct CreateTweetRequest<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct CreateTweetResponse {
    data: Option<CreatedTweet>,
    errors: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct CreatedTweet {
    id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_publish_without_credentials() {
        let mut config = config::Twitter {
            api_key: "key".to_string(),
            ..Default::default()
        };
        config.access_token = "  ".to_string();

        let err = Twitter::new(&config).publish("hola").await.unwrap_err();
        match err {
            PublishError::MissingCredentials(names) => {
                assert_eq!(names, vec!["X_API_SECRET", "X_ACCESS_TOKEN", "X_ACCESS_SECRET"]);
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_publish_unreachable_api() {
        let _ = rustls::crypto::ring::default_provider().install_default();
        let config = config::Twitter {
            api_key: "key".to_string(),
            api_secret: "secret".to_string(),
            access_token: "token".to_string(),
            access_secret: "token secret".to_string(),
        };

        let err = Twitter::with_base_url(&config, "http://127.0.0.1:1")
            .publish("hola")
            .await
            .unwrap_err();

        match err {
            PublishError::Authentication(reason) => {
                assert!(!reason.trim().is_empty());
                assert!(reason.contains("127.0.0.1:1"), "{}", reason);
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_signed_headers() {
        let config = config::Twitter {
            api_key: "key".to_string(),
            api_secret: "secret".to_string(),
            access_token: "token".to_string(),
            access_secret: "token secret".to_string(),
        };

        let headers = Twitter::new(&config)
            .signed_headers("POST", "https://api.x.com/2/tweets")
            .unwrap();
        let value = headers[header::AUTHORIZATION].to_str().unwrap();
        assert!(value.starts_with("OAuth "));
        assert!(value.contains("oauth_token=\"token\""));
    }

    #[test]
    fn test_parse_responses() {
        let created: CreateTweetResponse = serde_json::from_str(
            r#"{"data":{"id":"1846000000000000000","text":"hola","edit_history_tweet_ids":["1846000000000000000"]}}"#,
        )
        .unwrap();
        assert_eq!(created.data.unwrap().id, "1846000000000000000");

        let me: UsersMeResponse = serde_json::from_str(
            r#"{"errors":[{"title":"Unauthorized","type":"about:blank","status":401}]}"#,
        )
        .unwrap();
        assert!(me.data.is_none());
        assert!(me.errors.is_some());
    }

    #[tokio::test]
    #[ignore]
    async fn test_verify() {
        dotenv::dotenv().ok();
        let _ = rustls::crypto::ring::default_provider().install_default();
        let app = config::App::get().unwrap();

        match Twitter::new(&app.bot.twitter).verify().await {
            Ok(username) => logging::debug_file_async(format!("@{}", username)),
            Err(why) => logging::error_file_async(format!("Failed to verify because {:?}", why)),
        }
    }
}

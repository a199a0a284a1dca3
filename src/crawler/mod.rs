use async_trait::async_trait;

use crate::declare::{DomesticBoard, ExchangeRate, RawQuote};

/// 羅薩里奧證券交易所
pub mod bcr;
/// DolarApi
pub mod dolarapi;
/// Stooq
pub mod stooq;

/// 各來源的抓取介面，每個方法都不會失敗，抓不到的資料以缺值表示
#[async_trait]
pub trait MarketFeed {
    async fn domestic(&self) -> DomesticBoard;
    async fn futures(&self) -> Vec<RawQuote>;
    async fn dollar(&self, kind: &str) -> ExchangeRate;
}

/// 從網路抓取的實作
pub struct RemoteFeed;

#[async_trait]
impl MarketFeed for RemoteFeed {
    async fn domestic(&self) -> DomesticBoard {
        bcr::visit().await
    }

    async fn futures(&self) -> Vec<RawQuote> {
        stooq::visit().await
    }

    async fn dollar(&self, kind: &str) -> ExchangeRate {
        dolarapi::visit(kind).await
    }
}

/// 一次執行所抓到的全部資料
#[derive(Debug, Clone, PartialEq)]
pub struct MarketSnapshot {
    pub domestic: DomesticBoard,
    pub futures: Vec<RawQuote>,
    pub dollars: Vec<ExchangeRate>,
}

/// 依序抓取三個來源
pub async fn gather(feed: &(dyn MarketFeed + Sync), kinds: &[String]) -> MarketSnapshot {
    let domestic = feed.domestic().await;
    let futures = feed.futures().await;

    let mut dollars = Vec::with_capacity(kinds.len());
    for kind in kinds {
        dollars.push(feed.dollar(kind).await);
    }

    MarketSnapshot {
        domestic,
        futures,
        dollars,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use crate::declare::SourceUrl;

    use super::*;

    #[derive(Default)]
    struct RecordingFeed {
        calls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl MarketFeed for RecordingFeed {
        async fn domestic(&self) -> DomesticBoard {
            self.calls.lock().unwrap().push("domestic".to_string());
            DomesticBoard::absent("https://bcr")
        }

        async fn futures(&self) -> Vec<RawQuote> {
            self.calls.lock().unwrap().push("futures".to_string());
            Vec::new()
        }

        async fn dollar(&self, kind: &str) -> ExchangeRate {
            self.calls.lock().unwrap().push(kind.to_string());
            ExchangeRate {
                kind: kind.to_string(),
                value: None,
                source_url: SourceUrl::failed(dolarapi::url(kind)),
            }
        }
    }

    #[tokio::test]
    async fn test_gather_requests_every_kind() {
        let feed = RecordingFeed::default();
        let kinds = vec!["oficial".to_string(), "blue".to_string()];

        let snapshot = gather(&feed, &kinds).await;

        assert_eq!(
            *feed.calls.lock().unwrap(),
            vec!["domestic", "futures", "oficial", "blue"]
        );
        assert_eq!(snapshot.dollars.len(), 2);
        assert_eq!(snapshot.dollars[1].kind, "blue");
        assert!(snapshot.dollars[1].source_url.failed);
    }
}

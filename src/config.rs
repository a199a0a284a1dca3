use std::{env, fmt, path::PathBuf, str::FromStr};

use anyhow::Result;
use config::{Config as config_config, File as config_file};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::{declare::Commodity, logging};

const CONFIG_PATH: &str = "app.json";

/// 執行期設定，啟動時建立一次後一路往下傳
#[derive(Serialize, Deserialize, Default, Debug, Clone, PartialEq)]
pub struct App {
    #[serde(default)]
    pub system: System,
    #[serde(default)]
    pub retention: Retention,
    #[serde(default)]
    pub dollar: Dollar,
    #[serde(default)]
    pub bot: Bot,
}

const DRY_RUN: &str = "DRY_RUN";

#[derive(Serialize, Deserialize, Default, Debug, Clone, PartialEq)]
pub struct System {
    /// 只印出訊息，不發文
    #[serde(default)]
    pub dry_run: bool,
}

/// 出口稅率（retenciones），每個品項一個 [0,1) 的比例
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Retention {
    #[serde(default = "Retention::default_soy", rename = "soja")]
    pub soy: Decimal,
    #[serde(default = "Retention::default_grain", rename = "maiz")]
    pub corn: Decimal,
    #[serde(default = "Retention::default_grain", rename = "trigo")]
    pub wheat: Decimal,
    #[serde(default = "Retention::default_sunflower", rename = "girasol")]
    pub sunflower: Decimal,
}

impl Retention {
    fn default_soy() -> Decimal {
        dec!(0.33)
    }

    fn default_grain() -> Decimal {
        dec!(0.12)
    }

    fn default_sunflower() -> Decimal {
        dec!(0.07)
    }

    pub fn rate(&self, commodity: Commodity) -> Decimal {
        match commodity {
            Commodity::Soy => self.soy,
            Commodity::Corn => self.corn,
            Commodity::Wheat => self.wheat,
            Commodity::Sunflower => self.sunflower,
        }
    }

    fn rate_mut(&mut self, commodity: Commodity) -> &mut Decimal {
        match commodity {
            Commodity::Soy => &mut self.soy,
            Commodity::Corn => &mut self.corn,
            Commodity::Wheat => &mut self.wheat,
            Commodity::Sunflower => &mut self.sunflower,
        }
    }

    /// 環境變數名稱，例如 RET_SOJA、RET_MAIZ
    fn env_key(commodity: Commodity) -> String {
        format!("RET_{}", commodity.as_ref().to_uppercase())
    }
}

impl Default for Retention {
    fn default() -> Self {
        Retention {
            soy: Self::default_soy(),
            corn: Self::default_grain(),
            wheat: Self::default_grain(),
            sunflower: Self::default_sunflower(),
        }
    }
}

const DOLAR_KINDS: &str = "DOLAR_KINDS";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Dollar {
    /// dolarapi 的匯率種類，例如 oficial、mep、blue
    #[serde(default = "Dollar::default_kinds")]
    pub kinds: Vec<String>,
}

impl Dollar {
    fn default_kinds() -> Vec<String> {
        vec!["oficial".to_string(), "mep".to_string()]
    }

    fn parse_kinds(text: &str) -> Vec<String> {
        text.split(',')
            .map(|kind| kind.trim().to_lowercase())
            .filter(|kind| !kind.is_empty())
            .collect()
    }
}

impl Default for Dollar {
    fn default() -> Self {
        Dollar {
            kinds: Self::default_kinds(),
        }
    }
}

#[derive(Serialize, Deserialize, Default, Debug, Clone, PartialEq)]
pub struct Bot {
    #[serde(default)]
    pub twitter: Twitter,
}

const X_API_KEY: &str = "X_API_KEY";
const X_API_SECRET: &str = "X_API_SECRET";
const X_ACCESS_TOKEN: &str = "X_ACCESS_TOKEN";
const X_ACCESS_SECRET: &str = "X_ACCESS_SECRET";

#[derive(Serialize, Deserialize, Default, Clone, PartialEq)]
pub struct Twitter {
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub api_secret: String,
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub access_secret: String,
}

impl Twitter {
    /// 回傳未設定（空白）的憑證名稱
    pub fn missing(&self) -> Vec<&'static str> {
        [
            (X_API_KEY, &self.api_key),
            (X_API_SECRET, &self.api_secret),
            (X_ACCESS_TOKEN, &self.access_token),
            (X_ACCESS_SECRET, &self.access_secret),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }
}

impl fmt::Debug for Twitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |s: &str| if s.is_empty() { "" } else { "***" };
        f.debug_struct("Twitter")
            .field("api_key", &redact(&self.api_key))
            .field("api_secret", &redact(&self.api_secret))
            .field("access_token", &redact(&self.access_token))
            .field("access_secret", &redact(&self.access_secret))
            .finish()
    }
}

impl App {
    /// 讀取 app.json（若存在），再用環境變數覆蓋
    pub fn get() -> Result<Self> {
        let config_path = config_path();
        if config_path.exists() {
            let config: App = config_config::builder()
                .add_source(config_file::from(config_path))
                .build()?
                .try_deserialize()?;
            return Ok(config.override_with_env());
        }

        Ok(App::default().override_with_env())
    }

    /// 將來自於 env 的設定值覆蓋掉 json 上的設定值
    fn override_with_env(self) -> Self {
        self.override_with(|key| env::var(key).ok())
    }

    fn override_with<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dry_run) = lookup(DRY_RUN) {
            self.system.dry_run = matches!(
                dry_run.trim().to_lowercase().as_str(),
                "1" | "true" | "yes"
            );
        }

        for commodity in Commodity::DOMESTIC_ORDER {
            let key = Retention::env_key(commodity);
            let Some(text) = lookup(&key) else {
                continue;
            };

            match Decimal::from_str(text.trim()) {
                Ok(rate) if rate >= Decimal::ZERO && rate < Decimal::ONE => {
                    *self.retention.rate_mut(commodity) = rate;
                }
                Ok(rate) => {
                    logging::warn_file_async(format!(
                        "{} must be in [0,1), {} ignored",
                        key, rate
                    ));
                }
                Err(why) => {
                    logging::warn_file_async(format!(
                        "Failed to parse {}='{}' because {:?}",
                        key, text, why
                    ));
                }
            }
        }

        if let Some(kinds) = lookup(DOLAR_KINDS) {
            let kinds = Dollar::parse_kinds(&kinds);
            if !kinds.is_empty() {
                self.dollar.kinds = kinds;
            }
        }

        if let Some(api_key) = lookup(X_API_KEY) {
            self.bot.twitter.api_key = api_key;
        }

        if let Some(api_secret) = lookup(X_API_SECRET) {
            self.bot.twitter.api_secret = api_secret;
        }

        if let Some(access_token) = lookup(X_ACCESS_TOKEN) {
            self.bot.twitter.access_token = access_token;
        }

        if let Some(access_secret) = lookup(X_ACCESS_SECRET) {
            self.bot.twitter.access_secret = access_secret;
        }

        self
    }
}

/// 回傳設定檔的路徑
fn config_path() -> PathBuf {
    PathBuf::from(CONFIG_PATH)
}

use std::sync::Mutex;

use chrono::{format::DelayedFormat, Local};
use once_cell::sync::Lazy;
use strum_macros::Display;

use crate::logging::rotate::Rotate;

pub mod rotate;

static LOGGER: Lazy<Logger> = Lazy::new(|| Logger::new("default"));

#[derive(Debug, Copy, Clone, PartialEq, Display)]
pub enum Level {
    #[strum(serialize = "Info")]
    Info,
    #[strum(serialize = "Warn")]
    Warn,
    #[strum(serialize = "Error")]
    Error,
    #[strum(serialize = "Debug")]
    Debug,
}

/// 寫入 log/%Y-%m-%d-{name}.log 的檔案記錄器
///
/// 排程每次只執行一次就結束，所以這裡同步寫入，結束前呼叫 `flush` 即可，
/// 不需要另外開線程處理。
pub struct Logger {
    rotate: Mutex<Rotate>,
}

impl Logger {
    pub fn new(log_name: &str) -> Self {
        Logger {
            rotate: Mutex::new(Rotate::new(format!("log/%Y-%m-%d-{}.log", log_name))),
        }
    }

    pub fn info<T: Into<String>>(&self, log: T) {
        self.write(Level::Info, log.into());
    }

    pub fn warn<T: Into<String>>(&self, log: T) {
        self.write(Level::Warn, log.into());
    }

    pub fn error<T: Into<String>>(&self, log: T) {
        self.write(Level::Error, log.into());
    }

    pub fn debug<T: Into<String>>(&self, log: T) {
        self.write(Level::Debug, log.into());
    }

    fn write(&self, level: Level, msg: String) {
        let now = Local::now();
        let line = format!("{} {} {}\r\n", now.format("%F %X%.6f"), level, msg);

        match self.rotate.lock() {
            Ok(mut rotate) => {
                if let Err(why) = rotate.write_msg(now, line.as_bytes()) {
                    error_console(format!(
                        "Failed to write log file because {:?}\r\nmsg:{}",
                        why, line
                    ));
                }
            }
            Err(why) => error_console(format!("The log writer is poisoned: {:?}", why)),
        }
    }

    pub fn flush(&self) {
        if let Ok(mut rotate) = self.rotate.lock() {
            rotate.flush_current();
        }
    }
}

pub fn info_file_async<T: Into<String>>(log: T) {
    LOGGER.info(log);
}

/// 來源抓取失敗這類可以繼續執行的狀況，除了寫檔也會印在 console
pub fn warn_file_async<T: Into<String>>(log: T) {
    let log = log.into();
    warn_console(log.clone());
    LOGGER.warn(log);
}

pub fn error_file_async<T: Into<String>>(log: T) {
    let log = log.into();
    error_console(log.clone());
    LOGGER.error(log);
}

pub fn debug_file_async<T: Into<String>>(log: T) {
    LOGGER.debug(log);
}

/// 把緩衝區內容寫進檔案，程式結束前呼叫
pub fn flush() {
    LOGGER.flush();
}

pub fn warn_console(log: String) {
    eprintln!(
        "{} Warn {}",
        Local::now().format("%Y-%m-%d %H:%M:%S.%3f"),
        log
    );
}

pub fn error_console(log: String) {
    eprintln!(
        "{} Error {}",
        DelayedFormat::to_string(&Local::now().format("%Y-%m-%d %H:%M:%S.%3f")),
        log
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_display() {
        assert_eq!(Level::Info.to_string(), "Info");
        assert_eq!(Level::Warn.to_string(), "Warn");
        assert_eq!(Level::Error.to_string(), "Error");
        assert_eq!(Level::Debug.to_string(), "Debug");
    }

    #[test]
    fn test_write_and_flush() {
        let logger = Logger::new("logging-test");
        logger.info("開始 test_write_and_flush");
        logger.warn(format!("warn {}", 1));
        logger.flush();
        logger.debug("結束 test_write_and_flush");
        logger.flush();
    }
}

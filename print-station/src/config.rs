use std::path::PathBuf;
use std::time::Duration;

use chrono_tz::Tz;
use pos_printer::{DEFAULT_WIDTH, ReceiptRenderer, SpoolerConfig};

const DEFAULT_TIMEZONE: Tz = chrono_tz::America::Sao_Paulo;

/// Print station configuration
///
/// # Environment variables
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | PRINTER_NAME | (system default) | Target printer |
/// | RECEIPT_WIDTH | 80 | Receipt width in columns |
/// | TIMEZONE | America/Sao_Paulo | Timezone for receipt dates |
/// | SPOOL_DIR | OS temp dir | Where spool files are written |
/// | LPR_PROGRAM | lpr | Line-printer program (POSIX) |
/// | PRINT_SETTLE_MS | 3000 | Pause after each successful job |
/// | PRINT_TIMEOUT_MS | (none) | Per-job limit; unset waits forever |
/// | LOG_LEVEL | info | Log level (`RUST_LOG` overrides) |
/// | LOG_DIR | (none) | Daily log files go here when set |
///
/// # Example
///
/// ```ignore
/// PRINTER_NAME=EPSON_TM_T20 PRINT_SETTLE_MS=0 print-station sale-42.json
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    pub printer_name: Option<String>,
    pub receipt_width: usize,
    pub timezone: Tz,
    pub spool_dir: PathBuf,
    pub lpr_program: String,
    pub settle_delay_ms: u64,
    /// `None`: a hung spooler holds the queue until it returns
    pub print_timeout_ms: Option<u64>,
    pub log_level: String,
    pub log_dir: Option<PathBuf>,
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Unset or unparsable variables fall back to their defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            printer_name: non_empty("PRINTER_NAME"),
            receipt_width: non_empty("RECEIPT_WIDTH")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(DEFAULT_WIDTH),
            timezone: non_empty("TIMEZONE")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(DEFAULT_TIMEZONE),
            spool_dir: non_empty("SPOOL_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(std::env::temp_dir),
            lpr_program: non_empty("LPR_PROGRAM").unwrap_or_else(|| "lpr".into()),
            settle_delay_ms: non_empty("PRINT_SETTLE_MS")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(3000),
            print_timeout_ms: non_empty("PRINT_TIMEOUT_MS").and_then(|v| v.trim().parse().ok()),
            log_level: non_empty("LOG_LEVEL").unwrap_or_else(|| "info".into()),
            log_dir: non_empty("LOG_DIR").map(PathBuf::from),
        }
    }

    /// Spooler settings derived from this configuration
    pub fn spooler_config(&self) -> SpoolerConfig {
        SpoolerConfig {
            spool_dir: self.spool_dir.clone(),
            lpr_program: self.lpr_program.clone(),
            settle_delay: Duration::from_millis(self.settle_delay_ms),
            timeout: self.print_timeout_ms.map(Duration::from_millis),
        }
    }

    pub fn renderer(&self) -> ReceiptRenderer {
        ReceiptRenderer::new(self.receipt_width, self.timezone)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]);

        assert_eq!(config.printer_name, None);
        assert_eq!(config.receipt_width, 80);
        assert_eq!(config.timezone, chrono_tz::America::Sao_Paulo);
        assert_eq!(config.lpr_program, "lpr");
        assert_eq!(config.settle_delay_ms, 3000);
        assert_eq!(config.print_timeout_ms, None);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.spooler_config().timeout, None);
        assert_eq!(config.renderer().name_width(), 72);
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("PRINTER_NAME", "EPSON_TM_T20"),
            ("RECEIPT_WIDTH", "48"),
            ("TIMEZONE", "UTC"),
            ("SPOOL_DIR", "/var/spool/till"),
            ("PRINT_SETTLE_MS", "0"),
            ("PRINT_TIMEOUT_MS", "15000"),
        ]);

        assert_eq!(config.printer_name.as_deref(), Some("EPSON_TM_T20"));
        assert_eq!(config.timezone, Tz::UTC);
        assert_eq!(config.renderer().name_width(), 40);

        let spooler = config.spooler_config();
        assert_eq!(spooler.spool_dir, PathBuf::from("/var/spool/till"));
        assert_eq!(spooler.settle_delay, Duration::ZERO);
        assert_eq!(spooler.timeout, Some(Duration::from_secs(15)));
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = config_from(&[
            ("PRINTER_NAME", "  "),
            ("RECEIPT_WIDTH", "wide"),
            ("TIMEZONE", "Mars/Olympus_Mons"),
            ("PRINT_TIMEOUT_MS", "-1"),
        ]);

        assert_eq!(config.printer_name, None);
        assert_eq!(config.receipt_width, 80);
        assert_eq!(config.timezone, chrono_tz::America::Sao_Paulo);
        assert_eq!(config.print_timeout_ms, None);
    }
}

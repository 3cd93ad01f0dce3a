//! Spooler adapters for sending raw ESC/POS data
//!
//! Supports:
//! - POSIX: `lpr -o raw` submission to a named CUPS queue
//! - Windows: binary copy to the printer's local share (`\\localhost\<name>`)
//!
//! Commands are built as argument vectors; printer names never pass through
//! a shell.

use crate::error::{PrintError, PrintResult};
use async_trait::async_trait;
use chrono::Utc;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Printer name used when nothing else can be resolved
pub const DEFAULT_PRINTER_NAME: &str = "default";

/// Trait for raw print back-ends
#[async_trait]
pub trait RawSpooler: Send + Sync {
    /// Send raw ESC/POS data to the named printer, bypassing any driver
    /// formatting, and wait until the OS has accepted it
    async fn print_raw(&self, printer_name: &str, data: &[u8]) -> PrintResult<()>;
}

/// Spooler settings
#[derive(Debug, Clone)]
pub struct SpoolerConfig {
    /// Directory for per-job spool files
    pub spool_dir: PathBuf,
    /// Line-printer program (POSIX only)
    pub lpr_program: String,
    /// Wait after a successful submission before reporting success
    pub settle_delay: Duration,
    /// Upper bound for one submission; `None` waits forever
    pub timeout: Option<Duration>,
}

impl Default for SpoolerConfig {
    fn default() -> Self {
        Self {
            spool_dir: std::env::temp_dir(),
            lpr_program: "lpr".to_string(),
            settle_delay: Duration::from_millis(3000),
            timeout: None,
        }
    }
}

/// OS print spooler
///
/// Each job is written to its own spool file, handed to the OS print
/// command, and the file is removed whatever the outcome.
#[derive(Debug)]
pub struct SystemSpooler {
    config: SpoolerConfig,
    seq: AtomicU64,
}

impl SystemSpooler {
    pub fn new(config: SpoolerConfig) -> Self {
        Self {
            config,
            seq: AtomicU64::new(0),
        }
    }

    pub fn config(&self) -> &SpoolerConfig {
        &self.config
    }

    /// Unique spool file path: nanosecond timestamp plus a per-spooler counter
    fn spool_path(&self) -> PathBuf {
        let nanos = Utc::now().timestamp_nanos_opt().unwrap_or_default();
        let seq = self.seq.fetch_add(1, Ordering::Relaxed);
        self.config
            .spool_dir
            .join(format!("receipt-{}-{}.bin", nanos, seq))
    }

    /// Run a submission step, bounded by the configured timeout
    async fn bounded<T>(
        &self,
        what: &str,
        fut: impl Future<Output = PrintResult<T>>,
    ) -> PrintResult<T> {
        match self.config.timeout {
            Some(limit) => tokio::time::timeout(limit, fut).await.map_err(|_| {
                PrintError::Timeout(format!("{} did not finish within {:?}", what, limit))
            })?,
            None => fut.await,
        }
    }

    /// Submit a spool file with `lpr -P <printer> -o raw <file>`
    #[cfg(not(windows))]
    async fn send_file(&self, printer_name: &str, path: &Path) -> PrintResult<()> {
        use tokio::process::Command;

        let program = &self.config.lpr_program;
        let mut cmd = Command::new(program);
        cmd.arg("-P")
            .arg(printer_name)
            .arg("-o")
            .arg("raw")
            .arg(path)
            .kill_on_drop(true);

        let output = self
            .bounded(program, async {
                cmd.output().await.map_err(|source| PrintError::Spawn {
                    program: program.clone(),
                    source,
                })
            })
            .await?;

        if !output.status.success() {
            return Err(PrintError::CommandFailed {
                program: program.clone(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        debug!(output = %stdout.trim(), "Print command finished");
        Ok(())
    }

    /// Copy a spool file byte for byte to the printer's local share
    #[cfg(windows)]
    async fn send_file(&self, printer_name: &str, path: &Path) -> PrintResult<()> {
        let share = format!(r"\\localhost\{}", printer_name);
        let copied = self
            .bounded(&share, async {
                tokio::fs::copy(path, &share).await.map_err(PrintError::Io)
            })
            .await?;

        debug!(bytes = copied, share = %share, "Spool file copied");
        Ok(())
    }
}

#[async_trait]
impl RawSpooler for SystemSpooler {
    #[instrument(skip(self, data), fields(printer = %printer_name, data_len = data.len()))]
    async fn print_raw(&self, printer_name: &str, data: &[u8]) -> PrintResult<()> {
        validate_printer_name(printer_name)?;

        let path = self.spool_path();
        if let Err(e) = tokio::fs::write(&path, data).await {
            let _ = tokio::fs::remove_file(&path).await;
            return Err(e.into());
        }
        debug!(path = %path.display(), "Spool file written");

        let sent = self.send_file(printer_name, &path).await;
        let removed = tokio::fs::remove_file(&path).await;

        match (sent, removed) {
            (Err(e), Err(rm)) => {
                warn!(path = %path.display(), error = %rm, "Failed to remove spool file");
                Err(e)
            }
            (Err(e), Ok(())) => Err(e),
            (Ok(()), Err(rm)) => {
                warn!(path = %path.display(), error = %rm, "Failed to remove spool file");
                Err(PrintError::Io(rm))
            }
            (Ok(()), Ok(())) => {
                info!("Print data sent to spooler");
                if !self.config.settle_delay.is_zero() {
                    tokio::time::sleep(self.config.settle_delay).await;
                }
                Ok(())
            }
        }
    }
}

/// Reject names the OS command cannot take as a single argument or path part
fn validate_printer_name(name: &str) -> PrintResult<()> {
    let invalid = name.trim().is_empty()
        || name.contains('\0')
        || (cfg!(windows) && name.contains(['\\', '/']));

    if invalid {
        return Err(PrintError::InvalidPrinterName(name.to_string()));
    }
    Ok(())
}

/// Resolve a printer name - returns the name if given, else the system
/// default, else [`DEFAULT_PRINTER_NAME`]
pub async fn resolve_printer(name: Option<&str>) -> String {
    if let Some(name) = name.map(str::trim).filter(|n| !n.is_empty()) {
        return name.to_string();
    }

    match default_printer().await {
        Some(name) => {
            info!(printer = %name, "Using system default printer");
            name
        }
        None => {
            warn!("No system default printer, using {:?}", DEFAULT_PRINTER_NAME);
            DEFAULT_PRINTER_NAME.to_string()
        }
    }
}

/// Get the system default printer name (`lpstat -d`)
#[cfg(not(windows))]
pub async fn default_printer() -> Option<String> {
    let output = tokio::process::Command::new("lpstat")
        .arg("-d")
        .output()
        .await
        .ok()?;

    if !output.status.success() {
        return None;
    }
    parse_lpstat_default(&String::from_utf8_lossy(&output.stdout))
}

/// Get the system default printer name
#[cfg(windows)]
pub async fn default_printer() -> Option<String> {
    None
}

/// Parse `system default destination: NAME`
#[cfg(not(windows))]
fn parse_lpstat_default(output: &str) -> Option<String> {
    output
        .lines()
        .find_map(|line| line.split_once("default destination:"))
        .map(|(_, name)| name.trim())
        .filter(|name| !name.is_empty())
        .map(str::to_string)
}

#[cfg(all(test, not(windows)))]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::TempDir;

    fn spooler(dir: &TempDir, program: &str) -> SystemSpooler {
        SystemSpooler::new(SpoolerConfig {
            spool_dir: dir.path().to_path_buf(),
            lpr_program: program.to_string(),
            settle_delay: Duration::ZERO,
            timeout: None,
        })
    }

    fn write_script(dir: &TempDir, body: &str) -> String {
        let path = dir.path().join("fake-lpr");
        std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path.to_string_lossy().into_owned()
    }

    fn is_empty(dir: &TempDir) -> bool {
        std::fs::read_dir(dir.path()).unwrap().next().is_none()
    }

    #[tokio::test]
    async fn test_success_removes_spool_file() {
        let dir = TempDir::new().unwrap();
        let result = spooler(&dir, "true").print_raw("Caixa", b"\x1b@hello").await;

        assert!(result.is_ok());
        assert!(is_empty(&dir));
    }

    #[tokio::test]
    async fn test_command_failure_is_reported() {
        let dir = TempDir::new().unwrap();
        let result = spooler(&dir, "false").print_raw("Caixa", b"data").await;

        assert!(matches!(result, Err(PrintError::CommandFailed { .. })));
        assert!(is_empty(&dir));
    }

    #[tokio::test]
    async fn test_missing_program_is_spawn_error() {
        let dir = TempDir::new().unwrap();
        let result = spooler(&dir, "/nonexistent/lpr")
            .print_raw("Caixa", b"data")
            .await;

        assert!(matches!(result, Err(PrintError::Spawn { .. })));
        assert!(is_empty(&dir));
    }

    #[tokio::test]
    async fn test_invalid_printer_name() {
        let dir = TempDir::new().unwrap();
        let s = spooler(&dir, "true");

        for name in ["", "   ", "bad\0name"] {
            let result = s.print_raw(name, b"data").await;
            assert!(matches!(result, Err(PrintError::InvalidPrinterName(_))));
        }
        assert!(is_empty(&dir));
    }

    #[tokio::test]
    async fn test_arguments_and_payload_reach_command() {
        let spool = TempDir::new().unwrap();
        let scripts = TempDir::new().unwrap();
        let capture = scripts.path().join("captured.bin");
        let args = scripts.path().join("args.txt");
        let program = write_script(
            &scripts,
            &format!(
                "printf '%s\\n' \"$@\" > '{}'\nfor last; do :; done\ncp \"$last\" '{}'",
                args.display(),
                capture.display()
            ),
        );

        let name = "Caixa \"1\" $(id)";
        let data = b"\x1b@\x00\xffreceipt".to_vec();
        spooler(&spool, &program).print_raw(name, &data).await.unwrap();

        assert_eq!(std::fs::read(&capture).unwrap(), data);
        let args = std::fs::read_to_string(&args).unwrap();
        let args: Vec<_> = args.lines().collect();
        assert_eq!(&args[..4], &["-P", name, "-o", "raw"]);
        assert!(args[4].contains("receipt-"));
        assert!(is_empty(&spool));
    }

    #[tokio::test]
    async fn test_stderr_is_surfaced() {
        let spool = TempDir::new().unwrap();
        let scripts = TempDir::new().unwrap();
        let program = write_script(&scripts, "echo 'lpr: printer not found' >&2\nexit 1");

        let err = spooler(&spool, &program)
            .print_raw("Caixa", b"data")
            .await
            .unwrap_err();

        assert!(err.to_string().contains("lpr: printer not found"));
        assert!(is_empty(&spool));
    }

    #[tokio::test]
    async fn test_timeout_kills_command() {
        let spool = TempDir::new().unwrap();
        let scripts = TempDir::new().unwrap();
        let program = write_script(&scripts, "exec sleep 5");

        let mut s = spooler(&spool, &program);
        s.config.timeout = Some(Duration::from_millis(100));

        let result = s.print_raw("Caixa", b"data").await;
        assert!(matches!(result, Err(PrintError::Timeout(_))));
        assert!(is_empty(&spool));
    }

    #[test]
    fn test_spool_paths_are_unique() {
        let dir = TempDir::new().unwrap();
        let s = spooler(&dir, "true");

        assert_ne!(s.spool_path(), s.spool_path());
    }

    #[test]
    fn test_parse_lpstat_default() {
        assert_eq!(
            parse_lpstat_default("system default destination: EPSON_TM_T20\n"),
            Some("EPSON_TM_T20".to_string())
        );
        assert_eq!(parse_lpstat_default("no system default destination\n"), None);
        assert_eq!(parse_lpstat_default(""), None);
    }

    #[tokio::test]
    async fn test_resolve_explicit_printer() {
        assert_eq!(resolve_printer(Some(" Caixa ")).await, "Caixa");
    }
}

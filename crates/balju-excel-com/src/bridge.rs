//! Subprocess management and JSON IPC for the COM bridge process.

use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, Stdio};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;

use balju_com_protocol::{
    Command as BridgeCommand, Request, Response, ResponseData, ResponseResult,
};
use balju_core::ExportError;
use tracing::{debug, info, warn};

use crate::workbook::Workbook;

/// File name of the Windows bridge executable
pub const BRIDGE_EXE_NAME: &str = "balju-com-bridge.exe";

/// Errors from the Excel COM bridge.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("Failed to spawn bridge process: {0}")]
    SpawnFailed(#[from] std::io::Error),

    #[error("Bridge process not running")]
    NotRunning,

    #[error("Failed to send command to bridge: {0}")]
    SendFailed(String),

    #[error("Failed to read response from bridge: {0}")]
    ReadFailed(String),

    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Bridge returned error: {0}")]
    BridgeError(String),

    #[error("Unexpected response data for {0}")]
    UnexpectedResponse(&'static str),

    #[error("Response id {got} does not match request id {expected}")]
    IdMismatch { expected: u64, got: u64 },

    #[error("WINE not found. Install WINE and ensure 'wine' is in PATH.")]
    WineNotFound,

    #[error("Bridge executable not found at: {0}")]
    BridgeExeNotFound(String),
}

impl From<BridgeError> for ExportError {
    fn from(err: BridgeError) -> Self {
        match err {
            BridgeError::WineNotFound
            | BridgeError::BridgeExeNotFound(_)
            | BridgeError::SpawnFailed(_) => ExportError::AutomationUnavailable(err.to_string()),
            other => ExportError::Automation(other.to_string()),
        }
    }
}

/// Configuration for the Excel COM bridge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExcelComConfig {
    /// Path to the `balju-com-bridge.exe` Windows executable.
    /// If None, [`find_bridge_exe`] searches the usual locations.
    pub bridge_exe_path: Option<PathBuf>,

    /// Path to the WINE executable. `None` runs the bridge directly, which
    /// is the default on Windows.
    pub wine_path: Option<PathBuf>,

    /// Optional WINEPREFIX to use (for isolating the WINE environment).
    pub wine_prefix: Option<PathBuf>,
}

impl Default for ExcelComConfig {
    fn default() -> Self {
        Self {
            bridge_exe_path: None,
            wine_path: if cfg!(windows) {
                None
            } else {
                Some(PathBuf::from("wine"))
            },
            wine_prefix: None,
        }
    }
}

impl ExcelComConfig {
    /// The path of a local file as the bridge process sees it
    pub fn host_path(&self, path: &Path) -> String {
        if self.wine_path.is_some() {
            linux_to_wine_path(path)
        } else {
            absolute(path).display().to_string()
        }
    }
}

/// The main handle for communicating with the Excel COM bridge.
///
/// This manages the bridge subprocess lifecycle. Dropping the handle shuts the
/// bridge down (quitting Excel) if [`ExcelBridge::shutdown`] was not called.
pub struct ExcelBridge {
    child: Mutex<Option<Child>>,
    stdin: Mutex<Box<dyn Write + Send>>,
    stdout: Mutex<Box<dyn BufRead + Send>>,
    next_id: AtomicU64,
    shut_down: AtomicBool,
}

impl ExcelBridge {
    /// Start the bridge process and initialize Excel.
    pub fn start(config: &ExcelComConfig) -> Result<Self, BridgeError> {
        let exe_path = config
            .bridge_exe_path
            .clone()
            .unwrap_or_else(find_bridge_exe);

        if !exe_path.exists() {
            return Err(BridgeError::BridgeExeNotFound(
                exe_path.display().to_string(),
            ));
        }

        let mut cmd = match &config.wine_path {
            Some(wine) => {
                let mut cmd = std::process::Command::new(wine);
                if let Some(prefix) = &config.wine_prefix {
                    cmd.env("WINEPREFIX", prefix);
                }
                cmd.arg(&exe_path);
                cmd
            }
            None => std::process::Command::new(&exe_path),
        };

        cmd.stdin(Stdio::piped());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::inherit()); // Bridge diagnostics go to our stderr

        let mut child = cmd.spawn().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound && config.wine_path.is_some() {
                BridgeError::WineNotFound
            } else {
                BridgeError::SpawnFailed(e)
            }
        })?;

        let (stdin, stdout) = match (child.stdin.take(), child.stdout.take()) {
            (Some(stdin), Some(stdout)) => (stdin, stdout),
            _ => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(BridgeError::NotRunning);
            }
        };

        info!(exe = %exe_path.display(), "bridge process started");

        let bridge = Self {
            child: Mutex::new(Some(child)),
            stdin: Mutex::new(Box::new(stdin)),
            stdout: Mutex::new(Box::new(BufReader::new(stdout))),
            next_id: AtomicU64::new(1),
            shut_down: AtomicBool::new(false),
        };

        // Initialize COM and Excel
        bridge.send_command(BridgeCommand::Init)?;

        Ok(bridge)
    }

    /// Talk to a bridge over already connected streams. No process is
    /// spawned and no `Init` is sent.
    pub fn from_streams<R, W>(reader: R, writer: W) -> Self
    where
        R: BufRead + Send + 'static,
        W: Write + Send + 'static,
    {
        Self {
            child: Mutex::new(None),
            stdin: Mutex::new(Box::new(writer)),
            stdout: Mutex::new(Box::new(reader)),
            next_id: AtomicU64::new(1),
            shut_down: AtomicBool::new(false),
        }
    }

    /// Send a command to the bridge and wait for the response.
    fn send_command(&self, command: BridgeCommand) -> Result<Option<ResponseData>, BridgeError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let name = command.name();
        debug!(id, cmd = name, "bridge request");

        let request = Request { id, command };
        let json = serde_json::to_string(&request)?;

        // Send the request
        {
            let mut stdin = self.stdin.lock().map_err(|_| BridgeError::NotRunning)?;
            writeln!(stdin, "{json}").map_err(|e| BridgeError::SendFailed(e.to_string()))?;
            stdin
                .flush()
                .map_err(|e| BridgeError::SendFailed(e.to_string()))?;
        }

        // Read the response
        let response: Response = {
            let mut stdout = self.stdout.lock().map_err(|_| BridgeError::NotRunning)?;
            let mut line = String::new();
            stdout
                .read_line(&mut line)
                .map_err(|e| BridgeError::ReadFailed(e.to_string()))?;

            if line.is_empty() {
                return Err(BridgeError::NotRunning);
            }

            serde_json::from_str(&line)?
        };

        if response.id != id {
            return Err(BridgeError::IdMismatch {
                expected: id,
                got: response.id,
            });
        }

        match response.result {
            ResponseResult::Ok { data } => Ok(data),
            ResponseResult::Error { message } => {
                warn!(id, cmd = name, %message, "bridge command failed");
                Err(BridgeError::BridgeError(message))
            }
        }
    }

    /// Open an existing workbook from a file path.
    ///
    /// The path must be the one the bridge sees; use
    /// [`ExcelComConfig::host_path`] to convert a local path.
    pub fn open_workbook(&self, path: &str) -> Result<Workbook<'_>, BridgeError> {
        let data = self.send_command(BridgeCommand::OpenWorkbook {
            path: path.to_string(),
        })?;
        match data {
            Some(ResponseData::WorkbookHandle { workbook }) => Ok(Workbook::new(self, workbook)),
            _ => Err(BridgeError::UnexpectedResponse("OpenWorkbook")),
        }
    }

    /// Shut down the bridge: close all workbooks, quit Excel, and terminate the process.
    pub fn shutdown(self) -> Result<(), BridgeError> {
        self.finish()
    }

    fn finish(&self) -> Result<(), BridgeError> {
        if self.shut_down.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        let sent = self.send_command(BridgeCommand::Shutdown);

        if let Ok(mut slot) = self.child.lock() {
            if let Some(mut child) = slot.take() {
                if sent.is_err() {
                    let _ = child.kill();
                }
                let _ = child.wait();
            }
        }

        debug!("bridge shut down");
        sent.map(|_| ())
    }

    // -- Internal methods used by Workbook --

    pub(crate) fn ensure_sheet(
        &self,
        workbook: u64,
        sheet: &str,
        header: &[String],
    ) -> Result<bool, BridgeError> {
        let data = self.send_command(BridgeCommand::EnsureSheet {
            workbook,
            sheet: sheet.to_string(),
            header: header.to_vec(),
        })?;
        match data {
            Some(ResponseData::Sheet { created }) => Ok(created),
            _ => Err(BridgeError::UnexpectedResponse("EnsureSheet")),
        }
    }

    pub(crate) fn last_used_row(&self, workbook: u64, sheet: &str) -> Result<u32, BridgeError> {
        let data = self.send_command(BridgeCommand::LastUsedRow {
            workbook,
            sheet: sheet.to_string(),
        })?;
        match data {
            Some(ResponseData::Row { row }) => Ok(row),
            _ => Err(BridgeError::UnexpectedResponse("LastUsedRow")),
        }
    }

    pub(crate) fn clear_rows(
        &self,
        workbook: u64,
        sheet: &str,
        from_row: u32,
    ) -> Result<(), BridgeError> {
        self.send_command(BridgeCommand::ClearRows {
            workbook,
            sheet: sheet.to_string(),
            from_row,
        })?;
        Ok(())
    }

    pub(crate) fn write_rows(
        &self,
        workbook: u64,
        sheet: &str,
        start_row: u32,
        rows: &[Vec<String>],
    ) -> Result<usize, BridgeError> {
        let data = self.send_command(BridgeCommand::WriteRows {
            workbook,
            sheet: sheet.to_string(),
            start_row,
            rows: rows.to_vec(),
        })?;
        match data {
            Some(ResponseData::Written { rows }) => Ok(rows),
            _ => Err(BridgeError::UnexpectedResponse("WriteRows")),
        }
    }

    pub(crate) fn save_workbook(&self, workbook: u64) -> Result<(), BridgeError> {
        self.send_command(BridgeCommand::SaveWorkbook { workbook })?;
        Ok(())
    }

    pub(crate) fn close_workbook(&self, workbook: u64) -> Result<(), BridgeError> {
        self.send_command(BridgeCommand::CloseWorkbook { workbook })?;
        Ok(())
    }
}

impl Drop for ExcelBridge {
    fn drop(&mut self) {
        if let Err(e) = self.finish() {
            warn!(error = %e, "bridge did not shut down cleanly");
        }
    }
}

fn absolute(path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir().unwrap_or_default().join(path)
    }
}

/// Convert a Linux filesystem path to a WINE (Windows) path.
///
/// WINE maps `/` to `Z:\`, so `/home/user/file.xlsb` becomes `Z:\home\user\file.xlsb`.
pub fn linux_to_wine_path(linux_path: &Path) -> String {
    format!("Z:{}", absolute(linux_path).display()).replace('/', "\\")
}

/// Locate the bridge exe next to the current executable or in the cargo
/// target directory, falling back to the working directory.
pub fn find_bridge_exe() -> PathBuf {
    if let Ok(mut exe) = std::env::current_exe() {
        exe.pop();
        let candidate = exe.join(BRIDGE_EXE_NAME);
        if candidate.exists() {
            return candidate;
        }
    }

    for profile in ["release", "debug"] {
        let candidate = PathBuf::from("target/x86_64-pc-windows-gnu")
            .join(profile)
            .join(BRIDGE_EXE_NAME);
        if candidate.exists() {
            return candidate;
        }
    }

    PathBuf::from(BRIDGE_EXE_NAME)
}


#[cfg(test)]
mod tests {
    use super::testing::scripted;
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_wine_path() {
        assert_eq!(
            linux_to_wine_path(Path::new("/home/clerk/orders.xlsb")),
            r"Z:\home\clerk\orders.xlsb"
        );
    }

    #[test]
    fn test_host_path_without_wine() {
        let config = ExcelComConfig {
            wine_path: None,
            ..Default::default()
        };
        let abs = Path::new("/data/orders.xlsb");
        assert_eq!(config.host_path(abs), abs.display().to_string());
    }

    #[test]
    fn test_open_and_shutdown() {
        let (bridge, captured) = scripted(&[
            r#"{"id":1,"status":"ok","data":{"workbook":4}}"#,
            r#"{"id":2,"status":"ok"}"#,
        ]);

        let wb = bridge.open_workbook(r"C:\orders.xlsb").unwrap();
        assert_eq!(wb.handle(), 4);
        bridge.shutdown().unwrap();

        let names: Vec<_> = captured.requests().iter().map(|r| r.command.name()).collect();
        assert_eq!(names, vec!["OpenWorkbook", "Shutdown"]);
    }

    #[test]
    fn test_bridge_error_and_id_mismatch() {
        let (bridge, _) = scripted(&[
            r#"{"id":1,"status":"error","message":"file is locked"}"#,
            r#"{"id":7,"status":"ok"}"#,
        ]);

        match bridge.open_workbook("x") {
            Err(BridgeError::BridgeError(message)) => assert_eq!(message, "file is locked"),
            other => panic!("expected bridge error, got {:?}", other.map(|w| w.handle())),
        }
        assert!(matches!(
            bridge.last_used_row(1, "발주내역"),
            Err(BridgeError::IdMismatch { expected: 2, got: 7 })
        ));
    }

    #[test]
    fn test_closed_stream_is_not_running() {
        let (bridge, _) = scripted(&[]);
        assert!(matches!(
            bridge.save_workbook(1),
            Err(BridgeError::NotRunning)
        ));
        assert!(matches!(bridge.shutdown(), Err(BridgeError::NotRunning)));
    }

    #[test]
    fn test_export_error_mapping() {
        let unavailable: ExportError = BridgeError::WineNotFound.into();
        assert!(matches!(unavailable, ExportError::AutomationUnavailable(_)));

        let failed: ExportError = BridgeError::BridgeError("boom".into()).into();
        assert!(matches!(failed, ExportError::Automation(m) if m.contains("boom")));
    }
}

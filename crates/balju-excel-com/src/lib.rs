//! Excel COM automation client for balju.
//!
//! This crate spawns the `balju-com-bridge.exe` Windows executable (directly
//! on Windows, under WINE elsewhere), which automates Excel through COM,
//! communicating over JSON-over-stdio. [`ExcelComAppender`] uses it to write
//! order rows into an existing `.xlsb` workbook.
//!
//! # Architecture
//!
//! ```text
//! balju (native)
//!     └── ExcelComAppender (WorkbookAppender)
//!           └── ExcelBridge
//!                 └── spawns: [wine] balju-com-bridge.exe
//!                       └── COM: Excel.Application
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use balju_excel_com::{ExcelBridge, ExcelComConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ExcelComConfig::default();
//!     let bridge = ExcelBridge::start(&config)?;
//!     let wb = bridge.open_workbook(&config.host_path("orders.xlsb".as_ref()))?;
//!     let last = wb.last_used_row("발주내역")?;
//!     wb.write_rows("발주내역", last + 1, &[vec!["Acme".to_string()]])?;
//!     wb.save()?;
//!     wb.close()?;
//!     bridge.shutdown()?;
//!     Ok(())
//! }
//! ```

mod appender;
mod bridge;
mod workbook;

pub use appender::ExcelComAppender;
pub use bridge::{find_bridge_exe, linux_to_wine_path, BridgeError, ExcelBridge, ExcelComConfig};
pub use workbook::Workbook;

//! balju COM bridge: a Windows process that writes order rows into Excel
//! workbooks via COM, controlled by JSON commands over stdin/stdout.
//!
//! Runs natively on Windows or under WINE.
//!
//! Protocol: one JSON object per line (newline-delimited JSON).
//! - Reads `Request` objects from stdin
//! - Writes `Response` objects to stdout
//! - Diagnostic messages go to stderr (never stdout)

#[cfg(windows)]
mod dispatch;
#[cfg(windows)]
mod excel;

#[cfg(not(windows))]
fn main() {
    eprintln!("balju-com-bridge must be compiled for Windows (--target x86_64-pc-windows-gnu)");
    eprintln!("and run on Windows or under WINE.");
    std::process::exit(1);
}

#[cfg(windows)]
fn main() {
    use std::io::{self, BufRead, Write};

    use balju_com_protocol::{Command, Request, Response, ResponseResult};

    eprintln!("[balju-com-bridge] Starting up...");

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    let mut excel: Option<excel::ExcelApp> = None;

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                eprintln!("[balju-com-bridge] stdin read error: {e}");
                break;
            }
        };

        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let (response, shutdown) = match serde_json::from_str::<Request>(line) {
            Ok(request) => {
                let shutdown = matches!(request.command, Command::Shutdown);
                (handle_command(&mut excel, &request), shutdown)
            }
            Err(e) => {
                eprintln!("[balju-com-bridge] JSON parse error: {e}");
                // id 0: the request id could not be read
                (Response::error(0, format!("JSON parse error: {e}")), false)
            }
        };

        let json = match serde_json::to_string(&response) {
            Ok(json) => json,
            Err(e) => {
                eprintln!("[balju-com-bridge] failed to encode response: {e}");
                break;
            }
        };
        if writeln!(out, "{json}").and_then(|_| out.flush()).is_err() {
            eprintln!("[balju-com-bridge] stdout closed");
            break;
        }

        if shutdown && matches!(response.result, ResponseResult::Ok { .. }) {
            eprintln!("[balju-com-bridge] Shutdown complete, exiting.");
            break;
        }
    }

    // The client went away without Shutdown; do not leave Excel running
    if let Some(app) = excel.take() {
        eprintln!("[balju-com-bridge] stdin closed, shutting down Excel...");
        let _ = app.shutdown();
        uninit_com();
    }

    eprintln!("[balju-com-bridge] Process exiting.");
}

#[cfg(windows)]
fn handle_command(
    excel: &mut Option<excel::ExcelApp>,
    request: &balju_com_protocol::Request,
) -> balju_com_protocol::Response {
    use balju_com_protocol::{Command, Response, ResponseData, ResponseResult};

    let ok = |data| ResponseResult::Ok { data };

    let result = match &request.command {
        Command::Init => init_com_and_excel(excel),
        Command::OpenWorkbook { path } => with_excel(excel, |app| {
            let workbook = app.open_workbook(path)?;
            Ok(ok(Some(ResponseData::WorkbookHandle { workbook })))
        }),
        Command::EnsureSheet {
            workbook,
            sheet,
            header,
        } => with_excel(excel, |app| {
            let created = app.ensure_sheet(*workbook, sheet, header)?;
            Ok(ok(Some(ResponseData::Sheet { created })))
        }),
        Command::LastUsedRow { workbook, sheet } => with_excel(excel, |app| {
            let row = app.last_used_row(*workbook, sheet)?;
            Ok(ok(Some(ResponseData::Row { row })))
        }),
        Command::ClearRows {
            workbook,
            sheet,
            from_row,
        } => with_excel(excel, |app| {
            app.clear_rows(*workbook, sheet, *from_row)?;
            Ok(ok(None))
        }),
        Command::WriteRows {
            workbook,
            sheet,
            start_row,
            rows,
        } => with_excel(excel, |app| {
            let rows = app.write_rows(*workbook, sheet, *start_row, rows)?;
            Ok(ok(Some(ResponseData::Written { rows })))
        }),
        Command::SaveWorkbook { workbook } => with_excel(excel, |app| {
            app.save_workbook(*workbook)?;
            Ok(ok(None))
        }),
        Command::CloseWorkbook { workbook } => with_excel(excel, |app| {
            app.close_workbook(*workbook)?;
            Ok(ok(None))
        }),
        Command::Shutdown => match excel.take() {
            Some(app) => match app.shutdown() {
                Ok(()) => {
                    uninit_com();
                    ok(None)
                }
                Err(e) => ResponseResult::Error {
                    message: format!("Shutdown failed: {e}"),
                },
            },
            None => ok(None),
        },
    };

    if let ResponseResult::Error { message } = &result {
        eprintln!(
            "[balju-com-bridge] {} failed: {message}",
            request.command.name()
        );
    }

    Response {
        id: request.id,
        result,
    }
}

#[cfg(windows)]
fn init_com_and_excel(excel: &mut Option<excel::ExcelApp>) -> balju_com_protocol::ResponseResult {
    use balju_com_protocol::ResponseResult;
    use windows::Win32::System::Com::{CoInitializeEx, COINIT_APARTMENTTHREADED};

    if excel.is_some() {
        return ResponseResult::Ok { data: None };
    }

    // Excel requires a single-threaded apartment
    unsafe {
        let hr = CoInitializeEx(None, COINIT_APARTMENTTHREADED);
        if let Err(e) = hr.ok() {
            return ResponseResult::Error {
                message: format!("CoInitializeEx failed: {e}"),
            };
        }
    }

    eprintln!("[balju-com-bridge] COM initialized (STA)");

    match excel::ExcelApp::new() {
        Ok(app) => {
            eprintln!("[balju-com-bridge] Excel.Application created");
            *excel = Some(app);
            ResponseResult::Ok { data: None }
        }
        Err(e) => {
            uninit_com();
            ResponseResult::Error {
                message: format!("Failed to create Excel.Application: {e}"),
            }
        }
    }
}

#[cfg(windows)]
fn uninit_com() {
    unsafe {
        windows::Win32::System::Com::CoUninitialize();
    }
    eprintln!("[balju-com-bridge] COM uninitialized");
}

#[cfg(windows)]
fn with_excel(
    excel: &mut Option<excel::ExcelApp>,
    f: impl FnOnce(&mut excel::ExcelApp) -> Result<balju_com_protocol::ResponseResult, String>,
) -> balju_com_protocol::ResponseResult {
    match excel.as_mut() {
        Some(app) => f(app).unwrap_or_else(|message| {
            balju_com_protocol::ResponseResult::Error { message }
        }),
        None => balju_com_protocol::ResponseResult::Error {
            message: "Excel not initialized. Send 'Init' command first.".to_string(),
        },
    }
}

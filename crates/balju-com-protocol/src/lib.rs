//! Shared protocol types for communication between the balju automation
//! client and the Windows COM bridge process.
//!
//! The protocol is JSON-over-stdio: one JSON object per line in each direction.
//! Rows and cells are 1-based, as in Excel.

use serde::{Deserialize, Serialize};

/// A command sent from the client to the bridge process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    /// Monotonically increasing request ID for correlating responses.
    pub id: u64,
    /// The command to execute.
    #[serde(flatten)]
    pub command: Command,
}

/// Commands the client can send to the bridge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cmd", content = "params")]
pub enum Command {
    /// Initialize COM and create a hidden Excel.Application instance with
    /// alerts disabled.
    Init,

    /// Open an existing workbook from a file path (Windows path).
    /// Returns a workbook handle.
    OpenWorkbook { path: String },

    /// Make sure `sheet` exists, adding it after the last sheet when missing.
    /// A newly added sheet gets `header` in row 1.
    EnsureSheet {
        workbook: u64,
        sheet: String,
        header: Vec<String>,
    },

    /// Last used row of the sheet (0 when the sheet is empty).
    LastUsedRow { workbook: u64, sheet: String },

    /// Clear the contents of every row from `from_row` to the last used row.
    ClearRows {
        workbook: u64,
        sheet: String,
        from_row: u32,
    },

    /// Write `rows` as text starting at column A of `start_row`.
    WriteRows {
        workbook: u64,
        sheet: String,
        start_row: u32,
        rows: Vec<Vec<String>>,
    },

    /// Save the workbook in place, keeping its format.
    SaveWorkbook { workbook: u64 },

    /// Close a workbook without saving.
    CloseWorkbook { workbook: u64 },

    /// Shut down the bridge: close all workbooks, quit Excel, uninitialize COM.
    Shutdown,
}

impl Command {
    /// Command name as it appears on the wire
    pub fn name(&self) -> &'static str {
        match self {
            Command::Init => "Init",
            Command::OpenWorkbook { .. } => "OpenWorkbook",
            Command::EnsureSheet { .. } => "EnsureSheet",
            Command::LastUsedRow { .. } => "LastUsedRow",
            Command::ClearRows { .. } => "ClearRows",
            Command::WriteRows { .. } => "WriteRows",
            Command::SaveWorkbook { .. } => "SaveWorkbook",
            Command::CloseWorkbook { .. } => "CloseWorkbook",
            Command::Shutdown => "Shutdown",
        }
    }
}

/// A response sent from the bridge back to the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    /// The request ID this response corresponds to.
    pub id: u64,
    /// The result of the command.
    #[serde(flatten)]
    pub result: ResponseResult,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status")]
pub enum ResponseResult {
    #[serde(rename = "ok")]
    Ok {
        #[serde(skip_serializing_if = "Option::is_none")]
        data: Option<ResponseData>,
    },
    #[serde(rename = "error")]
    Error { message: String },
}

/// Data returned in successful responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResponseData {
    /// Handle to an opened workbook.
    WorkbookHandle { workbook: u64 },
    /// Result of `EnsureSheet`.
    Sheet { created: bool },
    /// Result of `LastUsedRow`.
    Row { row: u32 },
    /// Result of `WriteRows`.
    Written { rows: usize },
}

impl Response {
    /// A successful response without data
    pub fn ok(id: u64) -> Self {
        Self::ok_with(id, None)
    }

    /// A successful response carrying optional data
    pub fn ok_with(id: u64, data: Option<ResponseData>) -> Self {
        Self {
            id,
            result: ResponseResult::Ok { data },
        }
    }

    /// An error response
    pub fn error(id: u64, message: impl Into<String>) -> Self {
        Self {
            id,
            result: ResponseResult::Error {
                message: message.into(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_request_wire_shape() {
        let req = Request {
            id: 7,
            command: Command::WriteRows {
                workbook: 1,
                sheet: "발주내역".into(),
                start_row: 2,
                rows: vec![vec!["Acme".into(), String::new()]],
            },
        };

        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(
            value,
            json!({
                "id": 7,
                "cmd": "WriteRows",
                "params": {
                    "workbook": 1,
                    "sheet": "발주내역",
                    "start_row": 2,
                    "rows": [["Acme", ""]]
                }
            })
        );
        assert_eq!(req.command.name(), "WriteRows");
    }

    #[test]
    fn test_unit_commands() {
        let line = serde_json::to_string(&Request {
            id: 1,
            command: Command::Init,
        })
        .unwrap();
        assert_eq!(line, r#"{"id":1,"cmd":"Init"}"#);

        let parsed: Request = serde_json::from_str(r#"{"id":9,"cmd":"Shutdown"}"#).unwrap();
        assert_eq!(parsed.command, Command::Shutdown);
    }

    #[test]
    fn test_response_data_variants() {
        let cases = [
            (r#"{"id":1,"status":"ok","data":{"workbook":3}}"#, ResponseData::WorkbookHandle { workbook: 3 }),
            (r#"{"id":1,"status":"ok","data":{"created":true}}"#, ResponseData::Sheet { created: true }),
            (r#"{"id":1,"status":"ok","data":{"row":41}}"#, ResponseData::Row { row: 41 }),
            (r#"{"id":1,"status":"ok","data":{"rows":5}}"#, ResponseData::Written { rows: 5 }),
        ];

        for (line, data) in cases {
            let resp: Response = serde_json::from_str(line).unwrap();
            assert_eq!(resp, Response::ok_with(1, Some(data)));
        }
    }

    #[test]
    fn test_error_response() {
        let resp = Response::error(4, "Sheet not found");
        let line = serde_json::to_string(&resp).unwrap();
        assert_eq!(line, r#"{"id":4,"status":"error","message":"Sheet not found"}"#);

        let ok = serde_json::to_string(&Response::ok(5)).unwrap();
        assert_eq!(ok, r#"{"id":5,"status":"ok"}"#);
    }
}

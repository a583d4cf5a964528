//! Spreadsheet writer backed by `rust_xlsxwriter`.

use std::path::PathBuf;

use async_trait::async_trait;
use rust_xlsxwriter::{Workbook, XlsxError};

use super::{ExportSheet, ServiceError, ServiceResult, SpreadsheetWriter};

/// Writes export sheets as `.xlsx` workbooks with a single "Report"
/// worksheet: one header row, one row per record.
#[derive(Debug, Clone)]
pub struct XlsxWriter {
    output_dir: PathBuf,
    sheet_name: String,
}

impl XlsxWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            sheet_name: "Report".to_string(),
        }
    }

    pub fn with_sheet_name(mut self, sheet_name: impl Into<String>) -> Self {
        self.sheet_name = sheet_name.into();
        self
    }
}

impl From<XlsxError> for ServiceError {
    fn from(err: XlsxError) -> Self {
        ServiceError::Export(err.to_string())
    }
}

#[async_trait]
impl SpreadsheetWriter for XlsxWriter {
    async fn write(&self, sheet: &ExportSheet, filename: &str) -> ServiceResult<()> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(&self.sheet_name)?;

        for (col, header) in sheet.headers.iter().enumerate() {
            worksheet.write_string(0, col as u16, header)?;
        }
        for (row, record) in sheet.rows.iter().enumerate() {
            for (col, value) in record.iter().enumerate() {
                worksheet.write_string(row as u32 + 1, col as u16, value)?;
            }
        }

        workbook.save(self.output_dir.join(filename))?;
        Ok(())
    }
}

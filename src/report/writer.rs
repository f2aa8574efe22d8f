// Tabular report writer capability and its xlsx implementation
use crate::model::ReportError;
use crate::report::rows::CellValue;
use rust_xlsxwriter::{Color, Format, FormatBorder, FormatPattern, Workbook};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillKind {
    Pass,
    Fail,
}

impl FillKind {
    fn color(self) -> Color {
        match self {
            FillKind::Pass => Color::RGB(0xC6EFCE),
            FillKind::Fail => Color::RGB(0xFFC7CE),
        }
    }
}

/// Sheet-oriented output. Row index 0 is the header, data rows start at 1.
pub trait TabularReportWriter {
    fn write_sheet(&mut self, name: &str, header: &[&str], rows: Vec<Vec<CellValue>>) -> Result<(), ReportError>;

    fn style_row(&mut self, sheet: &str, row_index: u32, fill: FillKind) -> Result<(), ReportError>;

    /// Thin border on all four sides of every cell in the row.
    fn style_border(&mut self, sheet: &str, row_index: u32) -> Result<(), ReportError>;

    /// Serialises the whole report.
    fn render(&self) -> Result<Vec<u8>, ReportError>;
}

struct SheetBuffer {
    name: String,
    header: Vec<String>,
    rows: Vec<Vec<CellValue>>,
    fills: HashMap<u32, FillKind>,
    borders: HashSet<u32>,
}

/// Buffers sheets and styles, then builds the workbook in one pass on render.
#[derive(Default)]
pub struct XlsxReportWriter {
    sheets: Vec<SheetBuffer>,
}

impl XlsxReportWriter {
    const COLUMN_WIDTH: f64 = 14.0;

    pub fn new() -> Self {
        Self::default()
    }

    fn sheet_mut(&mut self, name: &str) -> Result<&mut SheetBuffer, ReportError> {
        self.sheets
            .iter_mut()
            .find(|s| s.name == name)
            .ok_or_else(|| ReportError::UnknownSheet(name.to_string()))
    }
}

fn cell_format(fill: Option<FillKind>, border: bool) -> Option<Format> {
    if fill.is_none() && !border {
        return None;
    }
    let mut format = Format::new();
    if let Some(fill) = fill {
        format = format
            .set_pattern(FormatPattern::Solid)
            .set_background_color(fill.color());
    }
    if border {
        format = format.set_border(FormatBorder::Thin);
    }
    Some(format)
}

impl TabularReportWriter for XlsxReportWriter {
    fn write_sheet(&mut self, name: &str, header: &[&str], rows: Vec<Vec<CellValue>>) -> Result<(), ReportError> {
        self.sheets.push(SheetBuffer {
            name: name.to_string(),
            header: header.iter().map(|h| h.to_string()).collect(),
            rows,
            fills: HashMap::new(),
            borders: HashSet::new(),
        });
        Ok(())
    }

    fn style_row(&mut self, sheet: &str, row_index: u32, fill: FillKind) -> Result<(), ReportError> {
        self.sheet_mut(sheet)?.fills.insert(row_index, fill);
        Ok(())
    }

    fn style_border(&mut self, sheet: &str, row_index: u32) -> Result<(), ReportError> {
        self.sheet_mut(sheet)?.borders.insert(row_index);
        Ok(())
    }

    fn render(&self) -> Result<Vec<u8>, ReportError> {
        let mut workbook = Workbook::new();

        for sheet in &self.sheets {
            let worksheet = workbook.add_worksheet();
            worksheet.set_name(sheet.name.as_str())?;

            for (col, title) in sheet.header.iter().enumerate() {
                worksheet.write_string(0, col as u16, title.as_str())?;
                worksheet.set_column_width(col as u16, Self::COLUMN_WIDTH)?;
            }

            for (i, cells) in sheet.rows.iter().enumerate() {
                let row = i as u32 + 1;
                let format = cell_format(sheet.fills.get(&row).copied(), sheet.borders.contains(&row));

                for (col, cell) in cells.iter().enumerate() {
                    let col = col as u16;
                    match (cell, format.as_ref()) {
                        (CellValue::Text(text), Some(f)) => {
                            worksheet.write_string_with_format(row, col, text.as_str(), f)?;
                        }
                        (CellValue::Text(text), None) => {
                            worksheet.write_string(row, col, text.as_str())?;
                        }
                        (CellValue::Number(n), Some(f)) => {
                            worksheet.write_number_with_format(row, col, *n, f)?;
                        }
                        (CellValue::Number(n), None) => {
                            worksheet.write_number(row, col, *n)?;
                        }
                        (CellValue::Blank, Some(f)) => {
                            worksheet.write_blank(row, col, f)?;
                        }
                        (CellValue::Blank, None) => {}
                    }
                }
            }
        }

        Ok(workbook.save_to_buffer()?)
    }
}

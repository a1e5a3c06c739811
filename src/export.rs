/*!
 * Export functionality for derived views
 *
 * Writes a provider list (usually a derived view) as JSON, JSON Lines or a
 * flat CSV table.
 */

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

use crate::data_types::*;
use crate::{ExportFormat, Result};

/// Trait for implementing provider list exporters
pub trait ViewExporter {
    /// Write the providers to any writer
    fn write_to(&self, providers: &[Provider], writer: &mut dyn Write) -> Result<()>;

    /// Get the export format
    fn format(&self) -> ExportFormat;

    /// Export the providers to a file
    fn export(&self, providers: &[Provider], path: &Path) -> Result<()> {
        let file = File::create(path)
            .map_err(|e| crate::DirectoryError::io_at(e, path))?;
        let mut writer = BufWriter::new(file);
        self.write_to(providers, &mut writer)?;
        writer.flush()?;
        info!(count = providers.len(), format = %self.format(), path = %path.display(), "exported providers");
        Ok(())
    }
}

/// JSON exporter
pub struct JsonExporter {
    /// Whether to pretty-print the JSON
    pub pretty_print: bool,
    /// Whether to export as JSON Lines (one record per line)
    pub json_lines: bool,
}

impl Default for JsonExporter {
    fn default() -> Self {
        Self {
            pretty_print: true,
            json_lines: false,
        }
    }
}

impl JsonExporter {
    /// Create a new JSON exporter
    pub fn new() -> Self {
        Self::default()
    }

    /// Set pretty printing
    pub fn with_pretty_print(mut self, pretty: bool) -> Self {
        self.pretty_print = pretty;
        self
    }

    /// Set JSON Lines format
    pub fn as_json_lines(mut self) -> Self {
        self.json_lines = true;
        self.pretty_print = false;
        self
    }
}

impl ViewExporter for JsonExporter {
    fn write_to(&self, providers: &[Provider], writer: &mut dyn Write) -> Result<()> {
        if self.json_lines {
            for provider in providers {
                let json = serde_json::to_string(provider)?;
                writeln!(writer, "{}", json)?;
            }
        } else if self.pretty_print {
            serde_json::to_writer_pretty(&mut *writer, providers)?;
            writeln!(writer)?;
        } else {
            serde_json::to_writer(&mut *writer, providers)?;
            writeln!(writer)?;
        }
        Ok(())
    }

    fn format(&self) -> ExportFormat {
        if self.json_lines {
            ExportFormat::JsonLines
        } else {
            ExportFormat::Json
        }
    }
}

/// Column names of the flat CSV export
pub const CSV_COLUMNS: [&str; 7] = [
    "id",
    "name",
    "specialities",
    "fees",
    "experience",
    "consultation_mode",
    "clinic",
];

/// CSV exporter, one row per provider
pub struct CsvExporter {
    /// Whether to include headers
    pub include_headers: bool,
    /// Field delimiter
    pub delimiter: u8,
}

impl Default for CsvExporter {
    fn default() -> Self {
        Self {
            include_headers: true,
            delimiter: b',',
        }
    }
}

impl CsvExporter {
    /// Create a new CSV exporter
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the delimiter
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Set whether the header row is written
    pub fn with_headers(mut self, include: bool) -> Self {
        self.include_headers = include;
        self
    }
}

impl ViewExporter for CsvExporter {
    fn write_to(&self, providers: &[Provider], writer: &mut dyn Write) -> Result<()> {
        let mut csv_writer = csv::WriterBuilder::new()
            .delimiter(self.delimiter)
            .from_writer(writer);

        if self.include_headers {
            csv_writer.write_record(CSV_COLUMNS)?;
        }

        for provider in providers {
            csv_writer.write_record([
                provider.id.as_str(),
                provider.name.as_str(),
                provider.specialities_label().as_str(),
                provider.fees.to_string().as_str(),
                provider.experience.as_str(),
                provider.consultation_mode.as_str(),
                provider.clinic_label().unwrap_or(""),
            ])?;
        }
        csv_writer.flush()?;
        Ok(())
    }

    fn format(&self) -> ExportFormat {
        ExportFormat::Csv
    }
}

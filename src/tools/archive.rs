//! Zip archive tools

use std::fs::{self, File};
use std::io;
use std::path::Path;

use serde_json::json;
use tracing::debug;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::core::types::Arguments;
use crate::tools::args::{required_str, required_str_list};
use crate::tools::registry::CapabilityRegistry;
use crate::tools::{ToolContext, ToolError, ToolResult, ToolSpec};

pub fn register(registry: &mut CapabilityRegistry) {
    registry.register(
        ToolSpec::new(
            "compress_files",
            "Compress files into a zip archive.",
            json!({
                "type": "object",
                "properties": {
                    "files": {"type": "array", "items": {"type": "string"}, "description": "List of file paths to compress"},
                    "output_path": {"type": "string", "description": "Path for the output zip file"}
                },
                "required": ["files", "output_path"]
            }),
        ),
        compress_files,
    );
    registry.register(
        ToolSpec::new(
            "extract_archive",
            "Extract a zip archive.",
            json!({
                "type": "object",
                "properties": {
                    "archive_path": {"type": "string", "description": "Path to the zip file"},
                    "extract_path": {"type": "string", "description": "Directory to extract to"}
                },
                "required": ["archive_path", "extract_path"]
            }),
        ),
        extract_archive,
    );
}

/// Each file is stored flat under its own file name
pub fn compress_files(_ctx: &ToolContext, args: &Arguments) -> ToolResult {
    let files = required_str_list(args, "files")?;
    let output_path = required_str(args, "output_path")?;
    if files.is_empty() {
        return Err(ToolError::invalid("files", "no files given"));
    }

    let mut entries = Vec::with_capacity(files.len());
    for file in &files {
        let path = Path::new(file);
        let name = path
            .file_name()
            .filter(|_| path.is_file())
            .ok_or_else(|| ToolError::invalid("files", format!("'{}' is not a file", file)))?;
        entries.push((path, name.to_string_lossy().into_owned()));
    }
    debug!(output_path, count = entries.len(), "Compressing files");

    let mut writer = ZipWriter::new(File::create(output_path)?);
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
    for (path, name) in entries {
        writer.start_file(name, options)?;
        io::copy(&mut File::open(path)?, &mut writer)?;
    }
    writer.finish()?;
    Ok(true)
}

pub fn extract_archive(_ctx: &ToolContext, args: &Arguments) -> ToolResult {
    let archive_path = required_str(args, "archive_path")?;
    let extract_path = required_str(args, "extract_path")?;
    debug!(archive_path, extract_path, "Extracting archive");

    let mut archive = ZipArchive::new(File::open(archive_path)?)?;
    fs::create_dir_all(extract_path)?;
    // Entries escaping `extract_path` are refused by the zip crate.
    archive.extract(extract_path)?;
    Ok(true)
}

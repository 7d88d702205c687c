//! File and folder tools

use std::fs;
use std::path::{Path, PathBuf};

use globset::GlobBuilder;
use serde_json::json;
use tracing::debug;
use walkdir::WalkDir;

use crate::core::types::Arguments;
use crate::tools::args::{optional_bool, optional_str, required_str};
use crate::tools::registry::CapabilityRegistry;
use crate::tools::{ToolContext, ToolError, ToolResult, ToolSpec};

/// Matches listed in a search notice before the rest is summarized
const SEARCH_LISTING_LIMIT: usize = 20;

pub fn register(registry: &mut CapabilityRegistry) {
    registry.register(
        ToolSpec::new(
            "create_file",
            "Create a file at a specified path.",
            json!({
                "type": "object",
                "properties": {
                    "file_path": {"type": "string", "description": "The full path of the file to create."},
                    "content": {"type": "string", "description": "Optional content to write to the file."}
                },
                "required": ["file_path"]
            }),
        ),
        create_file,
    );
    registry.register(
        ToolSpec::new(
            "create_folder",
            "Create a new folder at specified path.",
            json!({
                "type": "object",
                "properties": {
                    "folder_path": {"type": "string", "description": "The path where the folder should be created."}
                },
                "required": ["folder_path"]
            }),
        ),
        create_folder,
    );
    registry.register(
        ToolSpec::new(
            "move_file",
            "Move a file from one location to another.",
            source_destination_schema(),
        ),
        move_file,
    );
    registry.register(
        ToolSpec::new(
            "copy_file",
            "Copy a file from one location to another.",
            source_destination_schema(),
        ),
        copy_file,
    );
    registry.register(
        ToolSpec::new(
            "delete_file",
            "Delete a file at specified path.",
            json!({
                "type": "object",
                "properties": {
                    "file_path": {"type": "string", "description": "Path of the file to delete"}
                },
                "required": ["file_path"]
            }),
        ),
        delete_file,
    );
    registry.register(
        ToolSpec::new(
            "rename_file",
            "Rename a file, keeping it in the same folder.",
            json!({
                "type": "object",
                "properties": {
                    "old_path": {"type": "string", "description": "Current file path"},
                    "new_name": {"type": "string", "description": "New name for the file"}
                },
                "required": ["old_path", "new_name"]
            }),
        ),
        rename_file,
    );
    registry.register(
        ToolSpec::new(
            "search_files",
            "Search for files matching a pattern.",
            json!({
                "type": "object",
                "properties": {
                    "directory": {"type": "string", "description": "Directory to search in"},
                    "pattern": {"type": "string", "description": "Search pattern (e.g., *.txt)"},
                    "recursive": {"type": "boolean", "description": "Search in subdirectories (default: true)"}
                },
                "required": ["directory", "pattern"]
            }),
        ),
        search_files,
    );
}

fn source_destination_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "source": {"type": "string", "description": "Source file path"},
            "destination": {"type": "string", "description": "Destination path"}
        },
        "required": ["source", "destination"]
    })
}

pub fn create_file(_ctx: &ToolContext, args: &Arguments) -> ToolResult {
    let file_path = required_str(args, "file_path")?;
    let content = optional_str(args, "content")?.unwrap_or("");
    debug!(file_path, "Creating file");

    fs::write(file_path, content)?;
    Ok(true)
}

pub fn create_folder(_ctx: &ToolContext, args: &Arguments) -> ToolResult {
    let folder_path = required_str(args, "folder_path")?;
    debug!(folder_path, "Creating folder");

    fs::create_dir_all(folder_path)?;
    Ok(true)
}

pub fn move_file(_ctx: &ToolContext, args: &Arguments) -> ToolResult {
    let source = required_str(args, "source")?;
    let destination = target_path(source, required_str(args, "destination")?);
    debug!(source, destination = %destination.display(), "Moving file");

    if fs::rename(source, &destination).is_err() {
        // rename fails across filesystems, fall back to copy + delete
        fs::copy(source, &destination)?;
        fs::remove_file(source)?;
    }
    Ok(true)
}

pub fn copy_file(_ctx: &ToolContext, args: &Arguments) -> ToolResult {
    let source = required_str(args, "source")?;
    let destination = target_path(source, required_str(args, "destination")?);
    debug!(source, destination = %destination.display(), "Copying file");

    fs::copy(source, &destination)?;
    Ok(true)
}

pub fn delete_file(_ctx: &ToolContext, args: &Arguments) -> ToolResult {
    let file_path = required_str(args, "file_path")?;
    debug!(file_path, "Deleting file");

    fs::remove_file(file_path)?;
    Ok(true)
}

pub fn rename_file(_ctx: &ToolContext, args: &Arguments) -> ToolResult {
    let old_path = Path::new(required_str(args, "old_path")?);
    let new_name = required_str(args, "new_name")?;
    if new_name.contains(['/', '\\']) {
        return Err(ToolError::invalid("new_name", "must be a bare file name"));
    }

    let new_path = old_path.with_file_name(new_name);
    debug!(old_path = %old_path.display(), new_path = %new_path.display(), "Renaming file");

    fs::rename(old_path, &new_path)?;
    Ok(true)
}

pub fn search_files(ctx: &ToolContext, args: &Arguments) -> ToolResult {
    let directory = required_str(args, "directory")?;
    let pattern = required_str(args, "pattern")?;
    let recursive = optional_bool(args, "recursive")?.unwrap_or(true);

    // A pattern with a directory part is matched against the path relative
    // to `directory`, at any depth when recursive.
    let has_dir = pattern.contains('/');
    let glob = if has_dir && recursive {
        format!("**/{}", pattern)
    } else {
        pattern.to_string()
    };
    let matcher = GlobBuilder::new(&glob)
        .literal_separator(true)
        .build()
        .map_err(|e| ToolError::invalid("pattern", e.to_string()))?
        .compile_matcher();
    if !Path::new(directory).is_dir() {
        return Err(ToolError::invalid("directory", format!("'{}' is not a directory", directory)));
    }

    let max_depth = match (recursive, has_dir) {
        (true, _) => usize::MAX,
        (false, true) => pattern.split('/').count(),
        (false, false) => 1,
    };
    let matches: Vec<PathBuf> = WalkDir::new(directory)
        .max_depth(max_depth)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| {
            if has_dir {
                entry
                    .path()
                    .strip_prefix(directory)
                    .map_or(false, |relative| matcher.is_match(relative))
            } else {
                matcher.is_match(entry.file_name())
            }
        })
        .map(|entry| entry.into_path())
        .collect();
    debug!(directory, pattern, count = matches.len(), "Search finished");

    ctx.notify("Search", search_summary(directory, pattern, &matches));
    Ok(true)
}

fn search_summary(directory: &str, pattern: &str, matches: &[PathBuf]) -> String {
    let mut summary = format!(
        "Found {} file(s) matching '{}' in {}",
        matches.len(),
        pattern,
        directory
    );
    for path in matches.iter().take(SEARCH_LISTING_LIMIT) {
        summary.push_str("\n  ");
        summary.push_str(&path.display().to_string());
    }
    if matches.len() > SEARCH_LISTING_LIMIT {
        summary.push_str(&format!("\n  ... and {} more", matches.len() - SEARCH_LISTING_LIMIT));
    }
    summary
}

/// A destination that is an existing directory receives the source's name
fn target_path(source: &str, destination: &str) -> PathBuf {
    let destination = Path::new(destination);
    match Path::new(source).file_name() {
        Some(name) if destination.is_dir() => destination.join(name),
        _ => destination.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::outcome::Report;
    use crate::command::sink;
    use crate::core::config::WorkerConfig;
    use crate::worker::WorkerManager;
    use std::time::Duration;

    fn args(value: serde_json::Value) -> Arguments {
        value.as_object().cloned().unwrap()
    }

    fn path_str(path: &Path) -> String {
        path.to_string_lossy().into_owned()
    }

    #[test]
    fn test_create_and_delete_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("notes.txt");
        let ctx = ToolContext::detached();

        assert!(create_file(&ctx, &args(json!({"file_path": path_str(&file), "content": "hi"}))).unwrap());
        assert_eq!(fs::read_to_string(&file).unwrap(), "hi");

        assert!(delete_file(&ctx, &args(json!({"file_path": path_str(&file)}))).unwrap());
        assert!(!file.exists());
    }

    #[test]
    fn test_delete_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = ToolContext::detached();
        let missing = dir.path().join("missing.txt");

        let result = delete_file(&ctx, &args(json!({"file_path": path_str(&missing)})));
        assert!(matches!(result, Err(ToolError::Io(_))));
    }

    #[test]
    fn test_create_folder_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let ctx = ToolContext::detached();
        let a = args(json!({"folder_path": path_str(&nested)}));

        assert!(create_folder(&ctx, &a).unwrap());
        assert!(create_folder(&ctx, &a).unwrap());
        assert!(nested.is_dir());
    }

    #[test]
    fn test_move_into_directory_keeps_name() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("report.txt");
        let target_dir = dir.path().join("archive");
        fs::write(&source, "q3").unwrap();
        fs::create_dir(&target_dir).unwrap();

        let ctx = ToolContext::detached();
        let a = args(json!({"source": path_str(&source), "destination": path_str(&target_dir)}));
        assert!(move_file(&ctx, &a).unwrap());

        assert!(!source.exists());
        assert_eq!(fs::read_to_string(target_dir.join("report.txt")).unwrap(), "q3");
    }

    #[test]
    fn test_copy_file() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("a.txt");
        let destination = dir.path().join("b.txt");
        fs::write(&source, "same").unwrap();

        let ctx = ToolContext::detached();
        let a = args(json!({"source": path_str(&source), "destination": path_str(&destination)}));
        assert!(copy_file(&ctx, &a).unwrap());
        assert!(source.exists());
        assert_eq!(fs::read_to_string(destination).unwrap(), "same");
    }

    #[test]
    fn test_rename_stays_in_folder() {
        let dir = tempfile::tempdir().unwrap();
        let old = dir.path().join("draft.md");
        fs::write(&old, "").unwrap();

        let ctx = ToolContext::detached();
        let a = args(json!({"old_path": path_str(&old), "new_name": "final.md"}));
        assert!(rename_file(&ctx, &a).unwrap());
        assert!(dir.path().join("final.md").exists());

        let a = args(json!({"old_path": path_str(&dir.path().join("final.md")), "new_name": "../x.md"}));
        assert!(matches!(rename_file(&ctx, &a), Err(ToolError::InvalidArgument { .. })));
    }

    #[test]
    fn test_search_files_reports_matches() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("a.txt"), "").unwrap();
        fs::write(dir.path().join("b.log"), "").unwrap();
        fs::write(dir.path().join("sub").join("c.txt"), "").unwrap();

        let (notices, stream) = sink::channel();
        let ctx = ToolContext::new(WorkerManager::new(), notices, &WorkerConfig::default());

        let a = args(json!({"directory": path_str(dir.path()), "pattern": "*.txt"}));
        assert!(search_files(&ctx, &a).unwrap());
        match stream.recv_timeout(Duration::from_secs(1)).unwrap() {
            Report::Notice { message, .. } => assert!(message.starts_with("Found 2 file(s)")),
            other => panic!("unexpected report {:?}", other),
        }

        let a = args(json!({"directory": path_str(dir.path()), "pattern": "*.txt", "recursive": false}));
        assert!(search_files(&ctx, &a).unwrap());
        match stream.recv_timeout(Duration::from_secs(1)).unwrap() {
            Report::Notice { message, .. } => assert!(message.starts_with("Found 1 file(s)")),
            other => panic!("unexpected report {:?}", other),
        }
    }

    #[test]
    fn test_search_pattern_with_directory_part() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("sub")).unwrap();
        fs::create_dir_all(dir.path().join("nested").join("sub")).unwrap();
        fs::write(dir.path().join("top.txt"), "").unwrap();
        fs::write(dir.path().join("sub").join("a.txt"), "").unwrap();
        fs::write(dir.path().join("nested").join("sub").join("b.txt"), "").unwrap();
        fs::write(dir.path().join("nested").join("c.txt"), "").unwrap();

        let (notices, stream) = sink::channel();
        let ctx = ToolContext::new(WorkerManager::new(), notices, &WorkerConfig::default());
        let count = |recursive: bool| {
            let a = args(json!({
                "directory": path_str(dir.path()),
                "pattern": "sub/*.txt",
                "recursive": recursive
            }));
            assert!(search_files(&ctx, &a).unwrap());
            match stream.recv_timeout(Duration::from_secs(1)).unwrap() {
                Report::Notice { message, .. } => message,
                other => panic!("unexpected report {:?}", other),
            }
        };

        assert!(count(true).starts_with("Found 2 file(s)"));
        assert!(count(false).starts_with("Found 1 file(s)"));
    }
}

//! File validation, expansion, and prompt embedding.

use std::path::{Component, Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

use arbiter_core::token::estimate_str;
use arbiter_core::{Error, FileHandlingMode, GatewayConfig, Result};

/// Characters of each file kept in summary mode.
const SUMMARY_CHARS: usize = 2_000;

/// Checks caller-supplied paths before any disk access.
///
/// # Errors
/// Returns [`Error::Security`] for empty, relative, or traversing
/// paths. Requests fail here before any dispatch happens.
pub fn validate_paths(paths: &[String]) -> Result<Vec<PathBuf>> {
    let mut validated = Vec::with_capacity(paths.len());
    for raw in paths {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(Error::Security("Empty file path in request".to_owned()));
        }
        let path = PathBuf::from(trimmed);
        if path.components().any(|part| part == Component::ParentDir) {
            return Err(Error::Security(format!(
                "Path '{trimmed}' contains parent-directory traversal"
            )));
        }
        if !path.is_absolute() {
            return Err(Error::Security(format!(
                "Path '{trimmed}' must be absolute"
            )));
        }
        validated.push(path);
    }
    Ok(validated)
}

/// Expands directories to individual files, honoring the configured
/// extension allow-list, excluded directory names, and size limit.
/// Explicitly named files are kept regardless of extension. The result
/// is sorted and deduplicated.
pub fn expand_paths(paths: &[PathBuf], config: &GatewayConfig) -> Vec<String> {
    let mut expanded = Vec::new();
    for path in paths {
        if path.is_dir() {
            expand_directory(path, config, &mut expanded);
        } else {
            expanded.push(path.to_string_lossy().into_owned());
        }
    }
    expanded.sort_unstable();
    expanded.dedup();
    expanded
}

fn expand_directory(root: &Path, config: &GatewayConfig, out: &mut Vec<String>) {
    let walker = WalkDir::new(root).into_iter().filter_entry(|entry| {
        let name = entry.file_name().to_string_lossy();
        !(entry.file_type().is_dir() && config.is_excluded_dir(&name))
    });
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(error) => {
                warn!("Skipping unreadable entry under {}: {error}", root.display());
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let extension = entry
            .path()
            .extension()
            .map(|extension| extension.to_string_lossy())
            .unwrap_or_default();
        if !config.is_allowed_extension(&extension) {
            continue;
        }
        if entry
            .metadata()
            .map(|metadata| metadata.len() > config.max_file_size)
            .unwrap_or(true)
        {
            debug!("Skipping oversized file {}", entry.path().display());
            continue;
        }
        out.push(entry.path().to_string_lossy().into_owned());
    }
}

/// Renders file content for the prompt, spending at most `token_budget`
/// estimated tokens. Unreadable files are skipped with a warning; once
/// the budget runs out the remaining files are listed by path only.
pub async fn build_file_context(
    paths: &[String],
    mode: FileHandlingMode,
    token_budget: usize,
) -> String {
    if paths.is_empty() {
        return String::new();
    }
    if mode == FileHandlingMode::Reference {
        let mut context = String::from("\nFiles for reference (content not included):\n");
        for path in paths {
            context.push_str(&format!("- {path}\n"));
        }
        return context;
    }

    let mut context = String::new();
    let mut remaining = token_budget;
    let mut omitted = Vec::new();
    for path in paths {
        let content = match tokio::fs::read_to_string(path).await {
            Ok(content) => content,
            Err(error) => {
                warn!("Skipping unreadable file {path}: {error}");
                continue;
            }
        };
        let content = match mode {
            FileHandlingMode::Summary if content.len() > SUMMARY_CHARS => {
                let head: String = content.chars().take(SUMMARY_CHARS).collect();
                format!("{head}\n[truncated]")
            }
            _ => content,
        };

        let cost = estimate_str(&content);
        if cost > remaining {
            omitted.push(path.as_str());
            continue;
        }
        remaining -= cost;
        context.push_str(&format!("\n--- {path} ---\n{content}\n"));
    }

    if !omitted.is_empty() {
        context.push_str("\nOmitted for size (paths only):\n");
        for path in omitted {
            context.push_str(&format!("- {path}\n"));
        }
    }
    context
}

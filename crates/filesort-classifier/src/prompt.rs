//! Prompt construction
//!
//! The system prompt fixes the reply schema. The user prompt carries the
//! descriptor, the optional preview and the existing folders.

use std::fmt::Write;

use filesort_core::domain::{Category, FileDescriptor};
use filesort_core::ports::FolderHints;

/// Builds the system prompt listing the allowed categories and reply schema
pub fn system_prompt() -> String {
    let categories = Category::ALL
        .iter()
        .map(|c| c.as_str())
        .collect::<Vec<_>>()
        .join("|");

    format!(
        "You are an expert file organization assistant. Given a file's metadata \
and optionally a preview of its content, decide where it belongs in a \
well-structured home directory.

Reply with a single JSON object and nothing else:
{{
  \"category\": \"{categories}\",
  \"subcategory\": \"short label such as assignment, invoice, screenshot\",
  \"suggested_path\": \"relative/folder/path without the filename\",
  \"confidence\": 0.0 to 1.0,
  \"reasoning\": \"one sentence\",
  \"metadata\": {{
    \"school\": null, \"course\": null, \"semester\": null,
    \"company\": null, \"project\": null
  }}
}}

Use lowercase folder names joined by underscores. Prefer an existing folder \
when one fits. Lower the confidence when the filename and content disagree."
    )
}

/// Builds the user prompt for one file
pub fn user_prompt(descriptor: &FileDescriptor, hints: &FolderHints) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Classify this file.");
    let _ = writeln!(out);
    let _ = writeln!(out, "Filename: {}", descriptor.name());
    let extension = match descriptor.extension() {
        "" => "(none)",
        ext => ext,
    };
    let _ = writeln!(out, "Extension: {extension}");
    if let Some(mb) = descriptor.size_mb() {
        let _ = writeln!(out, "Size: {mb:.2} MB");
    }
    let _ = writeln!(out, "MIME type: {}", descriptor.mime_type());
    if let Some(modified) = descriptor.modified_at() {
        let _ = writeln!(out, "Modified: {}", modified.format("%Y-%m-%d"));
    }

    if let Some(preview) = descriptor.content_preview().filter(|p| !p.trim().is_empty()) {
        let _ = writeln!(out);
        let _ = writeln!(out, "Content preview:");
        let _ = writeln!(out, "\"\"\"");
        let _ = writeln!(out, "{}", preview.trim_end());
        let _ = writeln!(out, "\"\"\"");
    }

    if !hints.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Existing folders:");
        for folder in hints.folders() {
            let _ = writeln!(out, "- {folder}");
        }
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "Examples:");
    let _ = writeln!(
        out,
        "- CS170_HW7.pdf -> homework, uc_berkeley/fall_2025/cs170/homework"
    );
    let _ = writeln!(out, "- Amazon_Invoice_2024.pdf -> receipt, personal/receipts/2024");
    let _ = writeln!(out, "- IMG_2031.HEIC -> media, media/photos");
    let _ = writeln!(out);
    let _ = write!(
        out,
        "Identify the file type, the most specific folder hierarchy, and any \
school, course, semester, company or project it belongs to."
    );

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_prompt_lists_every_category() {
        let p = system_prompt();
        for c in Category::ALL {
            assert!(p.contains(c.as_str()), "missing {c}");
        }
        assert!(p.contains("suggested_path"));
    }

    #[test]
    fn test_user_prompt_minimal() {
        let d = FileDescriptor::new("notes");
        let p = user_prompt(&d, &FolderHints::none());
        assert!(p.contains("Filename: notes"));
        assert!(p.contains("Extension: (none)"));
        assert!(!p.contains("Content preview"));
        assert!(!p.contains("Existing folders"));
    }

    #[test]
    fn test_user_prompt_includes_preview_and_hints() {
        let d = FileDescriptor::new("CS170_HW7.pdf")
            .with_size_bytes(2 * 1024 * 1024)
            .with_mime_type("application/pdf")
            .with_content_preview("Problem 1: shortest paths");
        let hints = FolderHints::new(vec!["school".into(), "school/cs170".into()], 10);

        let p = user_prompt(&d, &hints);
        assert!(p.contains("Size: 2.00 MB"));
        assert!(p.contains("MIME type: application/pdf"));
        assert!(p.contains("Problem 1: shortest paths"));
        assert!(p.contains("- school/cs170"));
    }

    #[test]
    fn test_blank_preview_omitted() {
        let d = FileDescriptor::new("a.txt").with_content_preview("   \n");
        assert!(!user_prompt(&d, &FolderHints::none()).contains("Content preview"));
    }
}

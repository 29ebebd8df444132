//! Session report rendering for `depset resolve` and `depset inspect`.

use super::theme::{Theme, format_size};
use crossterm::style::Stylize;
use depset_core::{FetchError, FileMissingMap, MissingMap, ParseError, WorkingSet};
use depset_schema::{AppFileManifest, FlatEntry};

/// One line of the dependency tree, indented by depth.
pub fn tree_line(entry: &FlatEntry, working_set: &WorkingSet, theme: &Theme) -> String {
    let indent = " ".repeat(2 + entry.depth * theme.layout.indent);
    let detail = working_set
        .repo(&entry.id)
        .map(|dep| format!("{} ({})", dep.version_constraint, dep.release_channel))
        .unwrap_or_default();
    format!(
        "{indent}{} {}",
        entry.id.as_str().with(theme.colors.repo).bold(),
        detail.with(theme.colors.secondary)
    )
}

pub fn print_tree(rows: &[FlatEntry], working_set: &WorkingSet) {
    let theme = Theme::default();
    if rows.is_empty() {
        println!("  {}", "No repositories.".with(theme.colors.secondary));
        return;
    }
    for row in rows {
        println!("{}", tree_line(row, working_set, &theme));
    }
}

pub fn print_files(working_set: &WorkingSet) {
    let theme = Theme::default();
    if working_set.file_count() == 0 {
        return;
    }
    println!();
    for file in working_set.files() {
        let size = if file.content_hash.is_pending() {
            "pending".to_string()
        } else {
            format_size(file.size_bytes)
        };
        let name = format!("{:<width$}", file.name, width = theme.layout.label_width * 3);
        println!(
            "  {} {}",
            name.with(theme.colors.file),
            size.with(theme.colors.secondary)
        );
    }
}

pub fn print_missing(missing: &MissingMap) {
    let theme = Theme::default();
    for (owner, info) in missing {
        for repo in &info.missing_repo_ids {
            println!(
                "  {} {owner} requires repository {repo}, which is not in the set",
                "warning:".with(theme.colors.warning).bold()
            );
        }
        for file in &info.missing_file_names {
            println!(
                "  {} {owner} requires file {file}, which is not in the set",
                "warning:".with(theme.colors.warning).bold()
            );
        }
    }
}

pub fn print_file_missing(missing: &FileMissingMap) {
    let theme = Theme::default();
    for (file, info) in missing {
        for dep in &info.missing_manifest_deps {
            println!(
                "  {} {file} depends on {dep}, no file provides it",
                "warning:".with(theme.colors.warning).bold()
            );
        }
    }
}

pub fn print_manifest_errors<'a>(errors: impl Iterator<Item = (&'a str, &'a ParseError)>) {
    let theme = Theme::default();
    for (file, err) in errors {
        println!(
            "  {} {file}: {err}",
            "unreadable:".with(theme.colors.error).bold()
        );
    }
}

pub fn print_fetch_failures<'a>(failures: impl Iterator<Item = (&'a str, &'a FetchError)>) {
    let theme = Theme::default();
    for (id, err) in failures {
        println!("  {} {id}: {err}", "failed:".with(theme.colors.error).bold());
    }
}

pub fn print_manifest(file: &str, manifest: &AppFileManifest) {
    let theme = Theme::default();
    let lw = theme.layout.label_width;

    println!();
    println!(
        "  {} {}",
        manifest.name.as_str().with(theme.colors.repo).bold(),
        manifest.version.as_str().with(theme.colors.secondary)
    );
    println!("  {:<lw$}{file}", "file");
    println!("  {:<lw$}{}", "publisher", manifest.publisher);
    if !manifest.dependencies.is_empty() {
        let deps: Vec<String> = manifest.dependencies.iter().map(ToString::to_string).collect();
        println!("  {:<lw$}{}", "requires", deps.join(", "));
    }
}

pub fn print_summary(working_set: &WorkingSet, problems: usize) {
    let theme = Theme::default();
    println!();
    let msg = format!(
        "  {} repositories, {} files",
        working_set.repo_count(),
        working_set.file_count()
    );
    if problems == 0 {
        println!("{}", msg.with(theme.colors.success));
    } else {
        println!("{}, {problems} problems", msg.with(theme.colors.warning));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use depset_schema::{ReleaseChannel, RepoDependency};

    #[test]
    fn test_tree_line_indents_by_depth() {
        let mut set = WorkingSet::new();
        set.insert_repo(
            RepoDependency::new("o/y")
                .with_version("1.0")
                .with_channel(ReleaseChannel::Prerelease),
        );
        let entry = FlatEntry {
            id: "o/y".into(),
            depth: 2,
            parent_label: Some("o/x".into()),
        };

        let line = tree_line(&entry, &set, &Theme::default());
        assert!(line.starts_with("      "));
        assert!(line.contains("o/y"));
        assert!(line.contains("1.0 (prerelease)"));
    }
}

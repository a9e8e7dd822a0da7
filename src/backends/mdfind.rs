//! Spotlight integration
//!
//! Calls `mdfind` and maps the matching paths to result options

use std::path::Path;

use crate::core::error::Result;
use crate::core::model::{ItemOptions, ResultList};
use crate::core::util::run_lines;

/// Search the Spotlight index and return the matching paths
pub fn mdfind(query: &str) -> Result<Vec<String>> {
    let paths = run_lines("mdfind", &[query])?;
    tracing::debug!(query, count = paths.len(), "mdfind finished");
    Ok(paths)
}

/// Result options for a file system path: the path is the uid and arg,
/// the file name is the title and the file's own icon is shown.
pub fn path_result(path: &str) -> ItemOptions {
    let title = Path::new(path)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string());

    ItemOptions::new()
        .with_uid(path)
        .with_arg(path)
        .with_title(title)
        .with_subtitle(path)
        .with_icon(format!("fileicon:{}", path))
        .with_type("file")
}

/// Run mdfind and collect one result per path
pub fn find_results(query: &str) -> Result<ResultList> {
    let mut results = ResultList::new();
    for path in mdfind(query)? {
        results.add_result(path_result(&path));
    }
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::render::{to_xml, Payload};

    #[test]
    fn test_path_result() {
        let options = path_result("/Users/me/Documents/report.pdf");
        assert_eq!(options.title, Some("report.pdf".to_string()));
        assert_eq!(options.arg, Some("/Users/me/Documents/report.pdf".to_string()));
        assert_eq!(
            options.icon,
            Some("fileicon:/Users/me/Documents/report.pdf".to_string())
        );
        assert_eq!(options.kind, Some("file".to_string()));
    }

    #[test]
    fn test_path_result_root() {
        assert_eq!(path_result("/").title, Some("/".to_string()));
    }

    #[test]
    fn test_path_result_renders_file_icon() {
        let mut results = ResultList::new();
        results.add_result(path_result("/Applications/Safari.app"));

        let xml = to_xml(&results, Payload::Empty).unwrap().unwrap();
        assert!(xml.contains(r#"<icon type="fileicon">/Applications/Safari.app</icon>"#));
        assert!(xml.contains(r#"type="file""#));
        assert!(xml.contains("<title>Safari.app</title>"));
    }
}

//! Solution bundles from `data/solutions.json`.
//!
//! Solutions only group categories by name; nothing here checks that the
//! referenced categories exist (the lint pass does).

use crate::catalog::model::{SolutionMetadata, read_optional_json};
use crate::error::Result;
use std::path::Path;

pub const SOLUTIONS_MANIFEST: &str = "solutions.json";

/// Load every solution in manifest order. A missing manifest yields none.
pub fn load_solutions(data_dir: &Path) -> Result<Vec<SolutionMetadata>> {
    let path = data_dir.join(SOLUTIONS_MANIFEST);
    let solutions: Vec<SolutionMetadata> = read_optional_json(&path)?.unwrap_or_default();
    tracing::debug!(path = %path.display(), count = solutions.len(), "loaded solutions");
    Ok(solutions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn missing_manifest_yields_no_solutions() {
        let dir = TempDir::new().unwrap();
        assert!(load_solutions(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn domains_are_not_checked_at_load() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(SOLUTIONS_MANIFEST),
            r#"[{"name": "retail", "label": "Retail", "domains": ["crm", "nowhere"]}]"#,
        )
        .unwrap();
        let solutions = load_solutions(dir.path()).unwrap();
        assert_eq!(solutions.len(), 1);
        assert_eq!(solutions[0].domains, vec!["crm", "nowhere"]);
    }
}

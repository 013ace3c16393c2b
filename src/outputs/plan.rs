//! Deciding where aggregated content goes.
//!
//! | `--output` | results | plan |
//! |------------|---------|------|
//! | absent / `false` | any | stdout |
//! | `PATH` | any | one combined file at `PATH` |
//! | bare / `true` | 0 | stdout, so diagnostics stay visible |
//! | bare / `true` | 1 | one file named after the result |
//! | bare / `true` | >1 | one file per result, each named after it |
//!
//! Two results that derive the same filename write to the same path; the
//! later one overwrites the earlier.

use super::filename::derive_filename;
use crate::models::{ArticleResult, OutputPlan, OutputTarget};
use std::path::Path;
use tracing::debug;

/// Compute the output plan.
///
/// # Arguments
///
/// * `results` - Successful results in input order
/// * `target` - The resolved `--output` flag
/// * `output_dir` - Directory that derived filenames are placed under
///
/// # Returns
///
/// The [`OutputPlan`] from the table above. For split files, paths line up
/// with `results`.
pub fn plan(results: &[ArticleResult], target: &OutputTarget, output_dir: &Path) -> OutputPlan {
    let plan = match (target, results) {
        (OutputTarget::Absent, _) => OutputPlan::Stdout,
        (OutputTarget::Path(path), _) => OutputPlan::SingleFile(path.clone()),
        (OutputTarget::Auto, []) => OutputPlan::Stdout,
        (OutputTarget::Auto, [only]) => OutputPlan::SingleFile(output_dir.join(derive_filename(only))),
        (OutputTarget::Auto, many) => OutputPlan::SplitFiles(
            many.iter()
                .map(|result| output_dir.join(derive_filename(result)))
                .collect(),
        ),
    };
    debug!(?plan, results = results.len(), "Planned output");
    plan
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn titled(title: &str) -> ArticleResult {
        ArticleResult {
            title: Some(title.to_string()),
            url: "https://example.com".to_string(),
            content: "body".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_absent_target_prints() {
        let results = vec![titled("A"), titled("B")];
        assert_eq!(plan(&results, &OutputTarget::Absent, Path::new(".")), OutputPlan::Stdout);
        assert_eq!(plan(&[], &OutputTarget::Absent, Path::new(".")), OutputPlan::Stdout);
    }

    #[test]
    fn test_explicit_path_is_always_one_file() {
        let target = OutputTarget::Path(PathBuf::from("out.md"));
        for n in [1, 3] {
            let results: Vec<_> = (0..n).map(|i| titled(&format!("T{i}"))).collect();
            assert_eq!(
                plan(&results, &target, Path::new("ignored")),
                OutputPlan::SingleFile(PathBuf::from("out.md"))
            );
        }
    }

    #[test]
    fn test_auto_single_result_uses_derived_name() {
        let results = vec![titled("My Story")];
        assert_eq!(
            plan(&results, &OutputTarget::Auto, Path::new("dir")),
            OutputPlan::SingleFile(PathBuf::from("dir/my-story.md"))
        );
    }

    #[test]
    fn test_auto_many_results_split_in_order() {
        let results = vec![titled("One"), titled("Two"), titled("Three")];
        assert_eq!(
            plan(&results, &OutputTarget::Auto, Path::new("out")),
            OutputPlan::SplitFiles(vec![
                PathBuf::from("out/one.md"),
                PathBuf::from("out/two.md"),
                PathBuf::from("out/three.md"),
            ])
        );
    }

    #[test]
    fn test_auto_without_results_prints() {
        assert_eq!(plan(&[], &OutputTarget::Auto, Path::new(".")), OutputPlan::Stdout);
    }

    #[test]
    fn test_colliding_names_are_kept() {
        let results = vec![titled("Same"), titled("same!")];
        assert_eq!(
            plan(&results, &OutputTarget::Auto, Path::new("d")),
            OutputPlan::SplitFiles(vec![PathBuf::from("d/same.md"), PathBuf::from("d/same.md")])
        );
    }
}

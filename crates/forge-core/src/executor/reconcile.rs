//! Merge a canonical pipeline definition with previously persisted state.
//!
//! The step pipeline can change between tool versions while a deployment is
//! in flight. Reconciliation produces the pipeline to run next without losing
//! recorded fingerprints, without dropping operator-added steps, and without
//! reordering anything the operator has already watched execute.

use std::collections::HashMap;

use super::step::Step;

/// Merge the canonical step list with the steps persisted by a prior run.
///
/// Walks `previous` in its existing order. A name that still exists
/// canonically takes the canonical definition (command, args and target may
/// have changed between versions) but keeps the previous fingerprint. A name
/// with no canonical counterpart is an operator-added custom step and is kept
/// verbatim. Canonical steps never seen before are appended at the end, in
/// declared order, with an empty fingerprint so their first run is stale.
///
/// Retained steps keep the previous run's order even when the canonical
/// declaration reorders them; continuity of observed order wins over strict
/// canonical ordering.
pub fn reconcile(canonical: Vec<Step>, previous: Vec<Step>) -> Vec<Step> {
    let mut by_name: HashMap<String, usize> = canonical
        .iter()
        .enumerate()
        .map(|(index, step)| (step.name.clone(), index))
        .collect();

    let mut merged = Vec::with_capacity(canonical.len() + previous.len());
    for prev in previous {
        match by_name.remove(&prev.name) {
            Some(index) => {
                let mut step = canonical[index].clone();
                step.sha = prev.sha;
                merged.push(step);
            }
            None => merged.push(prev),
        }
    }

    let mut remaining: Vec<usize> = by_name.into_values().collect();
    remaining.sort_unstable();
    for index in remaining {
        merged.push(canonical[index].clone());
    }

    merged
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;

    fn step(name: &str, sha: &str) -> Step {
        let mut step = Step::new(
            name,
            Path::new("repo"),
            Path::new("repo/terraform"),
            "terraform",
            &["init"],
        );
        step.sha = sha.to_string();
        step
    }

    #[test]
    fn preserves_progress_and_appends_new_steps() {
        let canonical = vec![step("a", ""), step("b", ""), step("c", "")];
        let previous = vec![step("a", "1"), step("b", "2"), step("custom", "3")];

        let merged = reconcile(canonical, previous);

        let summary: Vec<(&str, &str)> = merged
            .iter()
            .map(|s| (s.name.as_str(), s.sha.as_str()))
            .collect();
        assert_eq!(
            summary,
            [("a", "1"), ("b", "2"), ("custom", "3"), ("c", "")]
        );
    }

    #[test]
    fn retained_steps_take_the_canonical_definition() {
        let mut canonical = step("apply", "");
        canonical.command = "terraform".to_string();
        canonical.args = vec!["apply".to_string(), "-auto-approve".to_string()];

        let mut previous = step("apply", "deadbeef");
        previous.command = "tf".to_string();
        previous.args = vec!["apply".to_string()];

        let merged = reconcile(vec![canonical], vec![previous]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].command, "terraform");
        assert_eq!(merged[0].args, ["apply", "-auto-approve"]);
        assert_eq!(merged[0].sha, "deadbeef");
    }

    #[test]
    fn empty_previous_yields_canonical_order() {
        let canonical = vec![step("a", ""), step("b", ""), step("c", "")];
        let merged = reconcile(canonical.clone(), Vec::new());
        assert_eq!(merged, canonical);
    }

    #[test]
    fn previous_order_wins_over_canonical_reordering() {
        let canonical = vec![step("b", ""), step("a", "")];
        let previous = vec![step("a", "1"), step("b", "2")];

        let merged = reconcile(canonical, previous);
        let names: Vec<&str> = merged.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["a", "b"]);
        assert_eq!(merged[0].sha, "1");
        assert_eq!(merged[1].sha, "2");
    }

    #[test]
    fn custom_steps_survive_in_place() {
        let canonical = vec![step("a", ""), step("b", "")];
        let previous = vec![step("a", "1"), step("lint", "9"), step("b", "2")];

        let merged = reconcile(canonical, previous);
        let names: Vec<&str> = merged.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["a", "lint", "b"]);
    }
}

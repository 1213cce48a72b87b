//! Catalog difference reconciliation
//!
//! Classifies measures as added, removed or replaced between two catalog
//! versions, either from the remote diff document or from two full
//! snapshots. Replaced pairs surface only the measures of their new side;
//! the old side stays available on the `DiffCatalog` itself.

use super::catalog_client::CatalogSource;
use super::text_normalizer::TextNormalizer;
use crate::catalog::{flatten, measures_of};
use crate::error::SyncResult;
use crate::models::{Catalog, DiffCatalog, Group, Module, NormalizedMeasure, ReplacedGroup};
use serde::Serialize;
use std::collections::HashMap;

/// Normalized measures per change class
#[derive(Debug, Clone, Default, Serialize)]
pub struct DiffReport {
    pub old_version: String,
    pub new_version: String,
    pub added: Vec<NormalizedMeasure>,
    pub replaced: Vec<NormalizedMeasure>,
    pub removed: Vec<NormalizedMeasure>,
}

impl DiffReport {
    /// Added, then replaced, then removed
    pub fn combined(&self) -> Vec<&NormalizedMeasure> {
        self.added
            .iter()
            .chain(self.replaced.iter())
            .chain(self.removed.iter())
            .collect()
    }

    pub fn into_combined(self) -> Vec<NormalizedMeasure> {
        let mut all = self.added;
        all.extend(self.replaced);
        all.extend(self.removed);
        all
    }

    pub fn len(&self) -> usize {
        self.added.len() + self.replaced.len() + self.removed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Result of asking for a diff that may not exist
#[derive(Debug, Clone)]
pub enum DiffOutcome {
    Available(DiffReport),
    /// No diff document for this version pair
    Unavailable {
        old_version: String,
        new_version: String,
        reason: String,
    },
}

impl DiffOutcome {
    pub fn is_available(&self) -> bool {
        matches!(self, DiffOutcome::Available(_))
    }

    pub fn report(&self) -> Option<&DiffReport> {
        match self {
            DiffOutcome::Available(report) => Some(report),
            DiffOutcome::Unavailable { .. } => None,
        }
    }
}

fn shell(group: &Group, modules: Vec<Module>) -> Group {
    Group {
        id: group.id.clone(),
        title: group.title.clone(),
        parent_id: group.parent_id.clone(),
        subgroups: Vec::new(),
        modules,
        code: group.code.clone(),
    }
}

/// Module id → (root group index, module), over all root groups
fn index_modules(catalog: &Catalog) -> SyncResult<HashMap<&str, (usize, &Module)>> {
    let mut index = HashMap::new();
    for (root_index, root) in catalog.root_groups.iter().enumerate() {
        for module in flatten(root)? {
            if module.id.is_empty() {
                tracing::debug!("Ignoring module without id '{}'", module.display_title());
                continue;
            }
            index.entry(module.id.as_str()).or_insert((root_index, module));
        }
    }
    Ok(index)
}

/// Modules of `catalog` whose id is absent from `other`, wrapped in their root groups
fn only_in(catalog: &Catalog, other: &HashMap<&str, (usize, &Module)>) -> SyncResult<Vec<Group>> {
    let mut groups = Vec::new();
    for root in &catalog.root_groups {
        let modules: Vec<Module> = flatten(root)?
            .into_iter()
            .filter(|m| !m.id.is_empty() && !other.contains_key(m.id.as_str()))
            .cloned()
            .collect();
        if !modules.is_empty() {
            groups.push(shell(root, modules));
        }
    }
    Ok(groups)
}

impl DiffCatalog {
    /// Module-level difference between two snapshots
    ///
    /// Modules are matched by id. A module present on both sides with any
    /// differing content becomes a replaced pair; pairs are grouped by the
    /// (old root, new root) combination they belong to.
    pub fn between(old: &Catalog, new: &Catalog) -> SyncResult<DiffCatalog> {
        let old_index = index_modules(old)?;
        let new_index = index_modules(new)?;

        let added = only_in(new, &old_index)?;
        let removed = only_in(old, &new_index)?;

        let mut pairs: Vec<((usize, usize), Vec<Module>, Vec<Module>)> = Vec::new();
        for (new_root_index, new_root) in new.root_groups.iter().enumerate() {
            for module in flatten(new_root)? {
                let Some(&(old_root_index, previous)) = old_index.get(module.id.as_str()) else {
                    continue;
                };
                if previous == module {
                    continue;
                }
                let key = (old_root_index, new_root_index);
                match pairs.iter_mut().find(|(k, _, _)| *k == key) {
                    Some((_, olds, news)) => {
                        olds.push(previous.clone());
                        news.push(module.clone());
                    }
                    None => pairs.push((key, vec![previous.clone()], vec![module.clone()])),
                }
            }
        }

        let replaced = pairs
            .into_iter()
            .map(|((old_root_index, new_root_index), olds, news)| ReplacedGroup {
                old_value: shell(&old.root_groups[old_root_index], olds),
                new_value: shell(&new.root_groups[new_root_index], news),
            })
            .collect();

        Ok(DiffCatalog {
            old_version: old.version.clone(),
            new_version: new.version.clone(),
            lang: new.lang.clone(),
            added,
            removed,
            replaced,
        })
    }
}

/// Turns diff documents into normalized measure sets
#[derive(Debug, Clone, Default)]
pub struct DiffReconciler {
    normalizer: TextNormalizer,
}

impl DiffReconciler {
    pub fn new(normalizer: TextNormalizer) -> Self {
        Self { normalizer }
    }

    pub fn reconcile(&self, diff: &DiffCatalog) -> SyncResult<DiffReport> {
        let report = DiffReport {
            old_version: diff.old_version.clone(),
            new_version: diff.new_version.clone(),
            added: self.collect("added", diff.added.iter())?,
            replaced: self.collect("replaced", diff.replaced.iter().map(|pair| &pair.new_value))?,
            removed: self.collect("removed", diff.removed.iter())?,
        };

        tracing::info!(
            added = report.added.len(),
            replaced = report.replaced.len(),
            removed = report.removed.len(),
            "Reconciled diff {} -> {}",
            report.old_version,
            report.new_version
        );
        Ok(report)
    }

    pub fn diff_snapshots(&self, old: &Catalog, new: &Catalog) -> SyncResult<DiffReport> {
        self.reconcile(&DiffCatalog::between(old, new)?)
    }

    /// Fetch the diff document and reconcile it
    ///
    /// A diff the source cannot provide is `Unavailable`, not an error.
    /// Malformed trees inside a fetched diff still fail.
    pub async fn reconcile_from_source(
        &self,
        source: &dyn CatalogSource,
        old_version: &str,
        new_version: &str,
    ) -> SyncResult<DiffOutcome> {
        match source.fetch_diff(old_version, new_version).await {
            Ok(diff) => Ok(DiffOutcome::Available(self.reconcile(&diff)?)),
            Err(e) => {
                tracing::warn!(
                    error_code = e.code(),
                    "Diff {} -> {} unavailable: {}",
                    old_version,
                    new_version,
                    e
                );
                Ok(DiffOutcome::Unavailable {
                    old_version: old_version.to_string(),
                    new_version: new_version.to_string(),
                    reason: e.to_string(),
                })
            }
        }
    }

    fn collect<'a>(
        &self,
        section: &str,
        groups: impl Iterator<Item = &'a Group>,
    ) -> SyncResult<Vec<NormalizedMeasure>> {
        let mut measures = Vec::new();
        for group in groups {
            for measure in measures_of(group)? {
                match self.normalizer.normalize_measure_ref(&measure) {
                    Ok(normalized) => measures.push(normalized),
                    Err(e) => tracing::warn!(
                        "Skipping {} measure '{}' in module '{}': {}",
                        section,
                        measure.measure.id,
                        measure.module.display_title(),
                        e
                    ),
                }
            }
        }
        Ok(measures)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Measure, MeasureGroup};

    fn measure(code: &str) -> Measure {
        Measure {
            id: code.to_string(),
            title: Some(format!("{} Pealkiri", code)),
            body: Some("<p>Sisu</p>".to_string()),
            code: Some(code.to_string()),
            ..Default::default()
        }
    }

    fn module(id: &str, codes: &[&str]) -> Module {
        Module {
            id: id.to_string(),
            code: Some(id.to_uppercase()),
            measure_groups: vec![MeasureGroup {
                code: Some("3.2".to_string()),
                measures: codes.iter().map(|c| measure(c)).collect(),
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    fn group(id: &str, modules: Vec<Module>) -> Group {
        Group {
            id: id.to_string(),
            title: Some(id.to_uppercase()),
            modules,
            ..Default::default()
        }
    }

    fn catalog(version: &str, roots: Vec<Group>) -> Catalog {
        Catalog {
            version: version.to_string(),
            root_groups: roots,
            ..Default::default()
        }
    }

    #[test]
    fn test_combined_order() {
        let diff = DiffCatalog {
            old_version: "2022".to_string(),
            new_version: "2023".to_string(),
            added: vec![group("a", vec![module("abc.1", &["ABC.1.M1", "ABC.1.M2"])])],
            removed: vec![group("r", vec![module("rem.1", &["REM.1.M1"])])],
            replaced: vec![ReplacedGroup {
                old_value: group("x", vec![module("old.1", &["OLD.1.M1"])]),
                new_value: group("x", vec![module("new.1", &["NEW.1.M1", "NEW.1.M2", "NEW.1.M3"])]),
            }],
            ..Default::default()
        };

        let report = DiffReconciler::default().reconcile(&diff).unwrap();
        let codes: Vec<&str> = report.combined().iter().map(|m| m.code.as_str()).collect();
        assert_eq!(
            codes,
            vec!["ABC.1.M1", "ABC.1.M2", "NEW.1.M1", "NEW.1.M2", "NEW.1.M3", "REM.1.M1"]
        );
        assert_eq!(report.len(), 6);
    }

    #[test]
    fn test_between_snapshots() {
        let old = catalog(
            "2022",
            vec![group(
                "g",
                vec![
                    module("keep.1", &["KEEP.1.M1"]),
                    module("chg.1", &["CHG.1.M1"]),
                    module("gone.1", &["GONE.1.M1"]),
                ],
            )],
        );
        let new = catalog(
            "2023",
            vec![group(
                "g",
                vec![
                    module("keep.1", &["KEEP.1.M1"]),
                    module("chg.1", &["CHG.1.M1", "CHG.1.M2"]),
                    module("new.1", &["NEW.1.M1"]),
                ],
            )],
        );

        let diff = DiffCatalog::between(&old, &new).unwrap();
        assert_eq!(diff.old_version, "2022");
        assert_eq!(diff.added.len(), 1);
        assert_eq!(diff.added[0].modules[0].id, "new.1");
        assert_eq!(diff.removed[0].modules[0].id, "gone.1");
        assert_eq!(diff.replaced.len(), 1);
        assert_eq!(diff.replaced[0].old_value.modules[0].measure_groups[0].measures.len(), 1);
        assert_eq!(diff.replaced[0].new_value.modules[0].measure_groups[0].measures.len(), 2);

        let report = DiffReconciler::default().diff_snapshots(&old, &new).unwrap();
        assert_eq!(report.added.len(), 1);
        assert_eq!(report.replaced.len(), 2);
        assert_eq!(report.removed.len(), 1);
    }

    #[test]
    fn test_identical_snapshots() {
        let snapshot = catalog("2023", vec![group("g", vec![module("m.1", &["MOD.1.M1"])])]);
        let report = DiffReconciler::default()
            .diff_snapshots(&snapshot, &snapshot.clone())
            .unwrap();
        assert!(report.is_empty());
    }

    #[test]
    fn test_unnormalizable_measure_is_skipped() {
        let mut broken = module("abc.1", &["ABC.1.M1", "ABC.1.M2"]);
        broken.measure_groups[0].measures[1].body = None;
        let diff = DiffCatalog {
            added: vec![group("a", vec![broken])],
            ..Default::default()
        };

        let report = DiffReconciler::default().reconcile(&diff).unwrap();
        assert_eq!(report.added.len(), 1);
    }
}

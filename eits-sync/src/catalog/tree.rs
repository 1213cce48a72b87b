//! Depth-first flattening of group trees
//!
//! For each group, every subgroup is flattened (in order) before the group's
//! own modules are appended. Traversal keeps its own stack so arbitrarily deep
//! subgroup chains never touch the call stack limit.

use crate::error::{SyncError, SyncResult};
use crate::models::{Group, Measure, MeasureGroup, Module};

/// A measure together with the module and measure group it was found in
#[derive(Debug, Clone, Copy)]
pub struct MeasureRef<'a> {
    pub module: &'a Module,
    pub group: &'a MeasureGroup,
    pub measure: &'a Measure,
}

impl<'a> MeasureRef<'a> {
    pub fn module_code(&self) -> &'a str {
        self.module.code.as_deref().unwrap_or("")
    }

    pub fn group_code(&self) -> &'a str {
        self.group.code.as_deref().unwrap_or("")
    }
}

struct Frame<'a> {
    group: &'a Group,
    next_subgroup: usize,
}

/// Flatten one group tree into its modules
///
/// Fails with `MalformedCatalog` when a subgroup repeats the id of a group on
/// the current ancestor path. Groups without an id are not checked.
pub fn flatten(root: &Group) -> SyncResult<Vec<&Module>> {
    let mut modules = Vec::new();
    let mut stack = vec![Frame {
        group: root,
        next_subgroup: 0,
    }];

    loop {
        let next = match stack.last_mut() {
            None => break,
            Some(frame) => {
                let group = frame.group;
                let child = group.subgroups.get(frame.next_subgroup);
                if child.is_some() {
                    frame.next_subgroup += 1;
                }
                child
            }
        };

        match next {
            Some(subgroup) => {
                if !subgroup.id.is_empty()
                    && stack.iter().any(|frame| frame.group.id == subgroup.id)
                {
                    let path: Vec<&str> = stack.iter().map(|f| f.group.id.as_str()).collect();
                    return Err(SyncError::MalformedCatalog(format!(
                        "group '{}' is its own ancestor (path: {})",
                        subgroup.id,
                        path.join(" > ")
                    )));
                }
                stack.push(Frame {
                    group: subgroup,
                    next_subgroup: 0,
                });
            }
            None => {
                if let Some(done) = stack.pop() {
                    modules.extend(done.group.modules.iter());
                }
            }
        }
    }

    tracing::debug!(
        group = %root.display_title(),
        modules = modules.len(),
        "Flattened group"
    );
    Ok(modules)
}

/// Flatten several root groups, concatenating in order
pub fn flatten_all(groups: &[Group]) -> SyncResult<Vec<&Module>> {
    let mut modules = Vec::new();
    for group in groups {
        modules.extend(flatten(group)?);
    }
    Ok(modules)
}

/// Every measure of every flattened module, in flatten order
pub fn measures_of(group: &Group) -> SyncResult<Vec<MeasureRef<'_>>> {
    let mut measures = Vec::new();
    for module in flatten(group)? {
        for measure_group in &module.measure_groups {
            for measure in &measure_group.measures {
                measures.push(MeasureRef {
                    module,
                    group: measure_group,
                    measure,
                });
            }
        }
    }
    Ok(measures)
}

/// Total number of modules held by a group and all of its descendants
pub fn module_count(group: &Group) -> usize {
    let mut count = 0;
    let mut pending = vec![group];
    while let Some(current) = pending.pop() {
        count += current.modules.len();
        pending.extend(current.subgroups.iter());
    }
    count
}

//! Catalog documents for tests

use eits_sync::models::{Catalog, ElementInfo, Group, Measure, MeasureGroup, Module, ModuleContent};

/// Catalog-tree entry for a module
pub fn module_ref(id: &str) -> Module {
    Module {
        id: id.to_string(),
        title: Some(format!("{} pealkiri", id)),
        ..Default::default()
    }
}

pub fn group(id: &str, modules: Vec<Module>, subgroups: Vec<Group>) -> Group {
    Group {
        id: id.to_string(),
        title: Some(format!("Grupp {}", id)),
        modules,
        subgroups,
        ..Default::default()
    }
}

pub fn catalog(version: &str, roots: Vec<Group>) -> Catalog {
    Catalog {
        version: version.to_string(),
        lang: Some("et".to_string()),
        root_groups: roots,
        ..Default::default()
    }
}

/// Well-formed module document with `measure_count` measures
///
/// The module code is the uppercased id.
pub fn module_content(id: &str, measure_count: usize) -> ModuleContent {
    let code = id.to_uppercase();
    let info = |content: &str| ElementInfo {
        title: None,
        content: Some(format!("<p>{}</p>", content)),
    };
    let measures = (1..=measure_count)
        .map(|n| Measure {
            id: format!("{}-m{}", id, n),
            title: Some(format!("{}.M{} Meede {} (C-I)", code, n, n)),
            body: Some(format!("<p>Meetme {} <b>sisu</b></p>", n)),
            assignees: vec!["Infoturbejuht".to_string()],
            security_codes: vec!["C".to_string(), "I".to_string()],
            code: Some(format!("{}.M{}", code, n)),
        })
        .collect();

    ModuleContent {
        version: Some("2023".to_string()),
        lang: Some("et".to_string()),
        id: id.to_string(),
        title: Some(format!("{} Moodul", code)),
        code: Some(code),
        description: vec![info("Eesmärk"), info("Vastutus"), info("Piirid")],
        additional_info: Some(String::new()),
        measure_groups: vec![MeasureGroup {
            id: "base".to_string(),
            code: Some("3.2".to_string()),
            measures,
            ..Default::default()
        }],
        ..Default::default()
    }
}

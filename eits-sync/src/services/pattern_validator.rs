//! Code and title grammars
//!
//! A fixed registry of lexical grammars for measure and module codes and
//! titles. Display forms are what normalization produces (`"CODE: Title"`);
//! raw forms are what the remote catalog serves and tolerate trailing
//! security (`(C-I)`) and responsibility (`[IT]`) annotations.
//!
//! Adding a dialect means adding a row to `GRAMMARS` and a `PatternKind`
//! variant, nothing else.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Grammar selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PatternKind {
    MeasureCode,
    MeasureCodeRaw,
    MeasureTitle,
    MeasureTitleRaw,
    ModuleCode,
    ModuleCodeRaw,
    ModuleTitle,
    ModuleTitleRaw,
}

impl PatternKind {
    pub const ALL: [PatternKind; 8] = [
        PatternKind::MeasureCode,
        PatternKind::MeasureCodeRaw,
        PatternKind::MeasureTitle,
        PatternKind::MeasureTitleRaw,
        PatternKind::ModuleCode,
        PatternKind::ModuleCodeRaw,
        PatternKind::ModuleTitle,
        PatternKind::ModuleTitleRaw,
    ];

    /// Error category shared by the raw and display form of a grammar
    pub fn category(self) -> PatternCategory {
        match self {
            PatternKind::MeasureCode | PatternKind::MeasureCodeRaw => PatternCategory::MeasureCode,
            PatternKind::MeasureTitle | PatternKind::MeasureTitleRaw => {
                PatternCategory::MeasureTitle
            }
            PatternKind::ModuleCode | PatternKind::ModuleCodeRaw => PatternCategory::ModuleCode,
            PatternKind::ModuleTitle | PatternKind::ModuleTitleRaw => PatternCategory::ModuleTitle,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            PatternKind::MeasureCode => "MEASURE_CODE",
            PatternKind::MeasureCodeRaw => "MEASURE_CODE_RAW",
            PatternKind::MeasureTitle => "MEASURE_TITLE",
            PatternKind::MeasureTitleRaw => "MEASURE_TITLE_RAW",
            PatternKind::ModuleCode => "MODULE_CODE",
            PatternKind::ModuleCodeRaw => "MODULE_CODE_RAW",
            PatternKind::ModuleTitle => "MODULE_TITLE",
            PatternKind::ModuleTitleRaw => "MODULE_TITLE_RAW",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for PatternKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Mismatch category, lets callers tell measure from module and code from title
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PatternCategory {
    MeasureCode,
    MeasureTitle,
    ModuleCode,
    ModuleTitle,
}

/// One registry row: the pattern and the named captures it promises
#[derive(Debug)]
pub struct Grammar {
    pub kind: PatternKind,
    pub pattern: &'static str,
    pub captures: &'static [&'static str],
}

/// Indexed by `PatternKind` discriminant
pub static GRAMMARS: &[Grammar] = &[
    Grammar {
        kind: PatternKind::MeasureCode,
        pattern: r"^(?P<measure_code>[A-Z]{3,}(?:\.[0-9E]{1,2})+\.[ME]{1,2}[0-9]{1,2})$",
        captures: &["measure_code"],
    },
    Grammar {
        kind: PatternKind::MeasureCodeRaw,
        pattern: r"^(?P<measure_code>[A-Z]{3,}(?:\.[0-9E]{1,2})+\.[ME]{1,2}[0-9]+)$",
        captures: &["measure_code"],
    },
    Grammar {
        kind: PatternKind::MeasureTitle,
        pattern: r"^(?P<measure_code>[A-Z]{3,}(?:\.[0-9E]{1,2})+\.[ME]{1,2}[0-9]+): (?P<title>[\p{L}\s\-,\(\)\d/]+)$",
        captures: &["measure_code", "title"],
    },
    Grammar {
        kind: PatternKind::MeasureTitleRaw,
        pattern: r"^(?P<measure_code>[A-Z]{3,}(?:\.[0-9E]{1,2})+\.[ME]{1,2}[0-9]{1,2})\s+(?P<title>.+?)(?:\s+(?P<security_code>\([CIA]+[-IA]*?\)))?(?:\s+(?P<responsibility>\[.+\]))?$",
        captures: &["measure_code", "title", "security_code", "responsibility"],
    },
    Grammar {
        kind: PatternKind::ModuleCode,
        pattern: r"^(?P<module_code>[A-Z]{3,}(?:\.[0-9E]{1,2})+)$",
        captures: &["module_code"],
    },
    Grammar {
        kind: PatternKind::ModuleCodeRaw,
        pattern: r"^(?P<module_code>[A-Z]{3,}(?:\.[0-9E]{1,2})+)$",
        captures: &["module_code"],
    },
    Grammar {
        kind: PatternKind::ModuleTitle,
        pattern: r"^(?P<module_code>[A-Z]{3,}(?:\.[0-9E]{1,2})+): (?P<title>[\p{L}\s\-,\(\)\d/]+)$",
        captures: &["module_code", "title"],
    },
    Grammar {
        kind: PatternKind::ModuleTitleRaw,
        pattern: r"^(?P<module_code>[A-Z]{3,}(?:\.[0-9E]{1,2})+):?\s+(?P<title>.+?)$",
        captures: &["module_code", "title"],
    },
];

static COMPILED: Lazy<Vec<Regex>> = Lazy::new(|| {
    GRAMMARS
        .iter()
        .map(|g| Regex::new(g.pattern).expect("grammar patterns are valid"))
        .collect()
});

/// Registry row for a kind
pub fn grammar(kind: PatternKind) -> &'static Grammar {
    &GRAMMARS[kind.index()]
}

/// Successful classification with the grammar's named captures
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternMatch {
    pub kind: PatternKind,
    captures: BTreeMap<&'static str, String>,
}

impl PatternMatch {
    /// Value of a named capture, `None` when the optional group did not participate
    pub fn get(&self, name: &str) -> Option<&str> {
        self.captures.get(name).map(String::as_str)
    }
}

/// Value did not match the requested grammar
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid pattern. String '{value}' doesn't match {kind} format.")]
pub struct PatternMismatch {
    pub kind: PatternKind,
    pub value: String,
}

impl PatternMismatch {
    pub fn category(&self) -> PatternCategory {
        self.kind.category()
    }
}

/// Classify a string against one grammar
pub fn classify(value: &str, kind: PatternKind) -> Result<PatternMatch, PatternMismatch> {
    let grammar = grammar(kind);
    let regex = &COMPILED[kind.index()];

    match regex.captures(value) {
        Some(caps) => {
            let captures = grammar
                .captures
                .iter()
                .filter_map(|name| caps.name(name).map(|m| (*name, m.as_str().to_string())))
                .collect();
            Ok(PatternMatch { kind, captures })
        }
        None => Err(PatternMismatch {
            kind,
            value: value.to_string(),
        }),
    }
}

//! FILENAME: core/pivot-engine/src/error.rs

use std::fmt;

use thiserror::Error;

use crate::definition::CategoryFamily;

/// Which side of a template a missing label belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateAxis {
    Category,
    SubDomain,
    Year,
    Evaluator,
}

impl fmt::Display for TemplateAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TemplateAxis::Category => "category",
            TemplateAxis::SubDomain => "sub-domain",
            TemplateAxis::Year => "year",
            TemplateAxis::Evaluator => "evaluator",
        })
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PivotError {
    #[error("record {record}: {axis} '{label}' is not in the {family} template")]
    MissingDomainValue {
        family: CategoryFamily,
        axis: TemplateAxis,
        label: String,
        record: usize,
    },

    #[error("color table has no {table} color at index {index}")]
    MissingColor { table: &'static str, index: usize },
}

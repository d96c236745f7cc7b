//! FILENAME: core/pivot-engine/src/engine.rs
//! Pivot Engine - The counting core that turns a record batch into cross-tabs.
//!
//! This module takes a batch of normalized records plus a catalog of the
//! exhaustive labels per family, and produces the category pivot (every
//! family against sub-domains, evaluators against years) or a bubble pivot
//! (one record field against another).
//!
//! Algorithm:
//! 1. Build a zero template per family, so every cell exists before counting
//! 2. Validate every label a record would increment against its template
//! 3. Single counting pass: full cross-product of a record's labels, with
//!    one attribution appended per increment
//! 4. Sub-domain totals are counted once per record, independent of family

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use records::{Record, RecordField};

use crate::cache::{Attribution, CrossTab, Domain, OccurrenceCounts, ValueId};
use crate::definition::{
    BubbleAxes, CategoryCatalog, CategoryFamily, UnknownLabelPolicy, EVALUATORS,
};
use crate::error::{PivotError, TemplateAxis};

/// Interned ids of one record's labels along one axis.
type Ids = SmallVec<[ValueId; 4]>;

// ============================================================================
// CATEGORY PIVOT
// ============================================================================

/// Result of [`aggregate`]: one cross-tab per family plus sub-domain totals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryPivot {
    /// Category x sub-domain, indexed by `CategoryFamily::index()`.
    families: Vec<CrossTab>,

    /// Year x evaluator.
    evaluators: CrossTab,

    /// Records per sub-domain, indexed by the sub-domain ValueId.
    totals: Vec<u32>,

    sub_domains: Domain,

    /// Labels dropped under `UnknownLabelPolicy::Ignore`.
    skipped: usize,
}

impl CategoryPivot {
    /// Allocates the zero templates. Every (category, sub-domain) and every
    /// (year, evaluator) cell exists at zero afterwards.
    pub fn template(catalog: &CategoryCatalog, sub_domains: &Domain) -> Self {
        let families = CategoryFamily::DOMAIN_KEYED
            .iter()
            .map(|&family| CrossTab::zeroed(Domain::new(catalog.labels(family)), sub_domains.clone()))
            .collect();
        let evaluators = CrossTab::zeroed(
            Domain::new(catalog.labels(CategoryFamily::EvaluatorsByYear)),
            Domain::new(EVALUATORS),
        );

        CategoryPivot {
            families,
            evaluators,
            totals: vec![0; sub_domains.len()],
            sub_domains: sub_domains.clone(),
            skipped: 0,
        }
    }

    /// The cross-tab of a family. Rows are categories (years for the evaluator
    /// family), columns are sub-domains (evaluators).
    pub fn table(&self, family: CategoryFamily) -> &CrossTab {
        match family {
            CategoryFamily::EvaluatorsByYear => &self.evaluators,
            other => &self.families[other.index()],
        }
    }

    fn table_mut(&mut self, family: CategoryFamily) -> &mut CrossTab {
        match family {
            CategoryFamily::EvaluatorsByYear => &mut self.evaluators,
            other => &mut self.families[other.index()],
        }
    }

    /// Count of one cell. For the evaluator family pass the year as `category`
    /// and the evaluator as `column`.
    pub fn count(&self, family: CategoryFamily, category: &str, column: &str) -> Option<u32> {
        self.table(family).count(category, column)
    }

    pub fn authors(&self, family: CategoryFamily, category: &str, column: &str) -> Option<&[Attribution]> {
        self.table(family).authors(category, column)
    }

    /// Number of records carrying a sub-domain.
    pub fn total(&self, sub_domain: &str) -> Option<u32> {
        let id = self.sub_domains.id_of(sub_domain)?;
        Some(self.totals[id as usize])
    }

    /// `(sub-domain, total)` pairs in sub-domain order.
    pub fn totals(&self) -> impl Iterator<Item = (&str, u32)> + '_ {
        self.sub_domains
            .iter()
            .map(|(id, label)| (label, self.totals[id as usize]))
    }

    pub fn sub_domains(&self) -> &Domain {
        &self.sub_domains
    }

    pub fn skipped_labels(&self) -> usize {
        self.skipped
    }
}

// ============================================================================
// CALCULATOR
// ============================================================================

/// Private state for one aggregation call.
struct CategoryCalculator<'a> {
    records: &'a [Record],
    policy: UnknownLabelPolicy,
    pivot: CategoryPivot,
}

impl<'a> CategoryCalculator<'a> {
    fn new(
        records: &'a [Record],
        catalog: &CategoryCatalog,
        sub_domains: &Domain,
        policy: UnknownLabelPolicy,
    ) -> Self {
        CategoryCalculator {
            records,
            policy,
            pivot: CategoryPivot::template(catalog, sub_domains),
        }
    }

    fn calculate(mut self) -> Result<CategoryPivot, PivotError> {
        // Step 1: Validate before touching any counter
        self.validate()?;

        // Step 2: Count
        for record in self.records {
            self.count_record(record);
        }

        log::debug!(
            target: "PIVOT",
            "aggregate: {} records, {} sub-domains, {} labels skipped",
            self.records.len(),
            self.pivot.sub_domains.len(),
            self.pivot.skipped
        );
        Ok(self.pivot)
    }

    /// Checks every label a record would increment. Under `Reject` the first
    /// unknown label fails the batch; under `Ignore` it is logged and skipped.
    fn validate(&mut self) -> Result<(), PivotError> {
        let mut skipped = 0;
        for (index, record) in self.records.iter().enumerate() {
            // Every domain-keyed family shares the sub-domain axis; report it against the first.
            for label in record.labels(RecordField::SubDomain) {
                if self.pivot.sub_domains.id_of(label).is_none() {
                    self.reject(CategoryFamily::DOMAIN_KEYED[0], TemplateAxis::SubDomain, label, index)?;
                    skipped += 1;
                }
            }

            for family in CategoryFamily::DOMAIN_KEYED {
                let table = self.pivot.table(family);
                for label in record.labels(family.field()) {
                    if table.rows().id_of(label).is_none() {
                        self.reject(family, TemplateAxis::Category, label, index)?;
                        skipped += 1;
                    }
                }
            }

            if let Some(evaluator) = evaluator_of(record) {
                let table = self.pivot.table(CategoryFamily::EvaluatorsByYear);
                if table.rows().id_of(&record.year).is_none() {
                    self.reject(CategoryFamily::EvaluatorsByYear, TemplateAxis::Year, &record.year, index)?;
                    skipped += 1;
                }
                if table.cols().id_of(evaluator).is_none() {
                    self.reject(CategoryFamily::EvaluatorsByYear, TemplateAxis::Evaluator, evaluator, index)?;
                    skipped += 1;
                }
            }
        }
        self.pivot.skipped = skipped;
        Ok(())
    }

    fn reject(
        &self,
        family: CategoryFamily,
        axis: TemplateAxis,
        label: &str,
        record: usize,
    ) -> Result<(), PivotError> {
        match self.policy {
            UnknownLabelPolicy::Reject => Err(PivotError::MissingDomainValue {
                family,
                axis,
                label: label.to_string(),
                record,
            }),
            UnknownLabelPolicy::Ignore => {
                log::warn!(
                    target: "PIVOT",
                    "record {}: skipping {} '{}' not in the {} template",
                    record,
                    axis,
                    label,
                    family
                );
                Ok(())
            }
        }
    }

    fn count_record(&mut self, record: &Record) {
        let attribution = Attribution::of(record);
        let subs = ids_in(self.pivot.sub_domains(), record.labels(RecordField::SubDomain));

        for family in CategoryFamily::DOMAIN_KEYED {
            let table = self.pivot.table_mut(family);
            let categories = ids_in(table.rows(), record.labels(family.field()));
            for &category in &categories {
                for &sub in &subs {
                    table.increment(category, sub, attribution.clone());
                }
            }
        }

        if let Some(evaluator) = evaluator_of(record) {
            let table = self.pivot.table_mut(CategoryFamily::EvaluatorsByYear);
            let year = table.rows().id_of(&record.year);
            let column = table.cols().id_of(evaluator);
            if let (Some(year), Some(column)) = (year, column) {
                table.increment(year, column, attribution);
            }
        }

        for &sub in &subs {
            self.pivot.totals[sub as usize] += 1;
        }
    }
}

/// The evaluator label of a record that can contribute to the evaluator family:
/// both the evaluator and the year must be present.
fn evaluator_of(record: &Record) -> Option<&str> {
    let evaluator = record.evaluators.as_deref()?;
    if record.year.is_empty() {
        return None;
    }
    Some(evaluator)
}

/// Ids of the labels present in a domain. Unknown labels were handled by validation.
fn ids_in(domain: &Domain, labels: &[String]) -> Ids {
    labels.iter().filter_map(|label| domain.id_of(label)).collect()
}

/// Cross-tabulates every category family against sub-domains and evaluators
/// against years.
///
/// `sub_domains` must be the exhaustive list of sub-domains to chart; use
/// [`Domain::sub_domains_of`] to derive it from the batch.
pub fn aggregate(
    records: &[Record],
    catalog: &CategoryCatalog,
    sub_domains: &Domain,
    policy: UnknownLabelPolicy,
) -> Result<CategoryPivot, PivotError> {
    CategoryCalculator::new(records, catalog, sub_domains, policy).calculate()
}

// ============================================================================
// BUBBLE PIVOT
// ============================================================================

/// Result of [`aggregate_pairs`]: `cells[y][x]` co-occurrence counts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BubblePivot {
    x_field: RecordField,
    y_field: RecordField,

    /// Rows are y labels, columns are x labels.
    cells: CrossTab,

    /// Sub-domain occurrence per (y, x) cell, created on first increment.
    sub_domains: FxHashMap<(ValueId, ValueId), OccurrenceCounts>,
}

impl BubblePivot {
    pub fn x_field(&self) -> RecordField {
        self.x_field
    }

    pub fn y_field(&self) -> RecordField {
        self.y_field
    }

    pub fn x_domain(&self) -> &Domain {
        self.cells.cols()
    }

    pub fn y_domain(&self) -> &Domain {
        self.cells.rows()
    }

    pub fn cells(&self) -> &CrossTab {
        &self.cells
    }

    pub fn count(&self, y: &str, x: &str) -> Option<u32> {
        self.cells.count(y, x)
    }

    pub fn authors(&self, y: &str, x: &str) -> Option<&[Attribution]> {
        self.cells.authors(y, x)
    }

    /// Sub-domain occurrence of a cell. None for a cell that was never incremented.
    pub fn sub_domain_counts(&self, y: &str, x: &str) -> Option<&OccurrenceCounts> {
        let key = (self.y_domain().id_of(y)?, self.x_domain().id_of(x)?);
        self.sub_domains.get(&key)
    }

    pub(crate) fn sub_domain_counts_at(&self, y: ValueId, x: ValueId) -> Option<&OccurrenceCounts> {
        self.sub_domains.get(&(y, x))
    }

    /// Largest cell count.
    pub fn max(&self) -> u32 {
        self.cells.max()
    }
}

/// Counts co-occurrence of two record fields.
///
/// Both domains are de-duplicated and sorted. Labels outside a domain are not
/// errors; a record that misses either domain contributes nothing.
pub fn aggregate_pairs(records: &[Record], axes: &BubbleAxes) -> BubblePivot {
    let mut pivot = BubblePivot {
        x_field: axes.x_field,
        y_field: axes.y_field,
        cells: CrossTab::zeroed(Domain::sorted(&axes.y_domain), Domain::sorted(&axes.x_domain)),
        sub_domains: FxHashMap::default(),
    };

    let mut contributing = 0usize;
    for record in records {
        let ys = ids_in(pivot.cells.rows(), record.labels(axes.y_field));
        let xs = ids_in(pivot.cells.cols(), record.labels(axes.x_field));
        if ys.is_empty() || xs.is_empty() {
            continue;
        }
        contributing += 1;

        let attribution = Attribution::of(record);
        for &y in &ys {
            for &x in &xs {
                pivot.cells.increment(y, x, attribution.clone());
                let occurrence = pivot.sub_domains.entry((y, x)).or_default();
                for sub in record.labels(RecordField::SubDomain) {
                    occurrence.bump(sub);
                }
            }
        }
    }

    log::debug!(
        target: "PIVOT",
        "aggregate_pairs: {} x {}, {} of {} records contributed, max {}",
        axes.y_field,
        axes.x_field,
        contributing,
        records.len(),
        pivot.max()
    );
    pivot
}

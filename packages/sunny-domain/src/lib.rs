pub mod catalog;
pub mod dedup;
pub mod grouping;
pub mod intent;
pub mod plan;
pub mod product;
pub mod safety;
pub mod size;
pub mod taxonomy;
pub mod text;

pub use catalog::{Field, LexicalQuery, SemanticMatch, SemanticQuery, TermMatch};
pub use grouping::{GroupedProduct, GroupingRules, Variant};
pub use intent::{SearchIntent, extract_intent};
pub use plan::{MustMatch, MustMatchKind, QueryPlan, build_query_plan};
pub use product::{ImageStatus, Product, ProductFilters, RankedProduct};
pub use taxonomy::{TaxonomyEntry, TaxonomyKind, TaxonomySnapshot};

//! Record query building.

pub mod date_range;
pub mod descriptor;
pub mod paged;

pub use date_range::{DateRange, DateRangeMode};
pub use descriptor::{
    FieldSelector, GroupCondition, GroupOperator, Operator, OrderBy, PagingInfo, QueryDescriptor,
    SortDirection, SubGroup, WhereCondition, WhereGroup,
};
pub use paged::{FilterKind, FilterSpec, PagedQuery, SearchPredicate, TableSpec};

pub mod chimera;
pub mod column_stats;
pub mod domain_association;
pub mod domain_stats;
pub mod filters;
pub mod plots;

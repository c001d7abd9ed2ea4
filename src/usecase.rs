mod expander;
mod migrate_only;
mod migration_planner;
mod migration_schedule;
mod outdated;
mod package_list;
mod peer_validator;
mod record_builder;

#[cfg(test)]
pub(crate) mod fixture;

pub use expander::{expand, Expansion};
pub use migrate_only::{migrate_only_step, normalize_version, require_single_package};
pub use migration_planner::plan;
pub use migration_schedule::schedule;
pub use outdated::{outdated, OutdatedPackage};
pub use package_list::{build_package_list, parse_token, Selection};
pub use peer_validator::{enforce, validate};
pub use record_builder::{build_records, RecordSources};

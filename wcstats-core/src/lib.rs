pub mod aggregate;
pub mod events;
pub mod export;
pub mod filter;
pub mod reader;

pub use aggregate::{
    add_to_avg, aggregate, aggregate_reader, AggregateOptions, Aggregator, MatchRecord, TeamAccumulator,
    TeamSummary, TeamTable,
};
pub use events::{expand_row, match_events, MatchEvent, Outcome, DEFAULT_TOURNAMENT, REQUIRED_COLUMNS};
pub use export::{export_csv, export_json, prettify, print_table, write_csv};
pub use filter::{filter_chain, sort_by_field, CmpOp, Constraint, Field, FieldKind, Mode, Query, Value};
pub use reader::{Row, RowReader};
pub use wcstats_common::{Result, WcStatsError};

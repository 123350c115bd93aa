// Result reshaping: sparse backend statistics into gap-free, plot-ready series

mod series;
pub mod weeks;

pub use series::{
    coverage_series, fill_grouped_lineages, fill_weekly_counts, grouped_lineages_per_week,
    parse_category_counts, parse_grouped_lineages, parse_weekly_pairs, samples_per_week,
    CoverageRow, LineageWeekRecord, WeeklyCount,
};
pub use weeks::{generate_weeks_between, weeks_between, IsoWeek};

pub mod bbox;
pub mod coverage_id;
pub mod forecast_array;
pub mod run_time;
pub mod vertical_level;

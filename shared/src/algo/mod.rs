pub mod parallel;

pub use parallel::process_rows_in_parallel;

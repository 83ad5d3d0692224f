pub mod csv;
pub mod gnuplot;

pub use csv::{parse_csv, read_csv, render_csv, write_csv, CsvError};
pub use gnuplot::{render_script, write_script, DEFAULT_TEMPLATE};

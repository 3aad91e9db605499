pub mod block;
pub mod highlight;
pub mod lines;

pub use block::{parse_block, parse_program};
pub use highlight::highlight;
pub use lines::{split_logical_lines, LogicalLine, INDENT_UNIT};

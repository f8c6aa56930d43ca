pub mod ordering;
pub mod search;

pub use ordering::{order, table_of_contents, NavItem};
pub use search::{filter, highlight_spans, render_highlighted, HighlightSpan};

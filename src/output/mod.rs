pub mod formatter;

pub use formatter::{
    format_embryo, format_features, format_json, format_percent, format_protocol,
    format_success, should_use_colors, Report,
};

//! Turns a console argument list into one line of text.

use crate::value::Value;

/// Formats every argument and joins them with a single space.
///
/// Never fails: an argument that cannot be serialized becomes `placeholder`
/// without affecting its neighbours. An empty list yields an empty string.
pub fn format_args(args: &[Value], placeholder: &str) -> String {
    args.iter()
        .map(|arg| format_arg(arg, placeholder))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Formats a single argument: object-like values as pretty JSON, everything
/// else through its canonical string form.
pub fn format_arg(arg: &Value, placeholder: &str) -> String {
    if !arg.is_object_like() {
        return arg.to_display_string();
    }
    match arg.to_pretty_json() {
        Ok(text) => text,
        Err(e) => {
            tracing::trace!(error = %e, "argument not serializable, using placeholder");
            placeholder.to_string()
        }
    }
}

//! CLI command messaging system
//!
//! Consistent, coloured output for the `wander-client` binary. Responses go to
//! stdout; diagnostics go to stderr so output can be piped.

/// Print CLI command info message
pub fn print_info(title: &str, details: &str) {
    eprint!("\x1b[1;33m[INFO]\x1b[0m {}", title);
    if !details.is_empty() {
        eprintln!("\t {}", details);
    } else {
        eprintln!();
    }
}

/// Print CLI command error
pub fn print_error(title: &str, details: Option<&str>) {
    eprintln!("\x1b[1;31m[ERROR]\x1b[0m {}", title);
    if let Some(details) = details {
        eprintln!("\x1b[1;31m[ERROR]\x1b[0m Details: {}", details);
    }
}

/// Print a response body, pretty-printing JSON.
pub fn print_body(body: &crate::network::ResponseBody) {
    match body {
        crate::network::ResponseBody::Json(value) => match serde_json::to_string_pretty(value) {
            Ok(pretty) => println!("{}", pretty),
            Err(_) => println!("{}", value),
        },
        crate::network::ResponseBody::Text(text) => println!("{}", text),
    }
}

#[macro_export]
macro_rules! print_cmd_info {
    ($title:expr, $($details:tt)*) => {
        $crate::cli_messages::print_info($title, &format!($($details)*))
    };
}

/// Macro for CLI errors
#[macro_export]
macro_rules! print_cmd_error {
    ($title:expr) => {
        $crate::cli_messages::print_error($title, None)
    };
    ($title:expr, $details:expr) => {
        $crate::cli_messages::print_error($title, Some($details))
    };
}

//! User-facing text for HTTP status codes.

/// A sentence suitable for showing to the user after a failed request.
pub fn get_http_error_message(status: u16) -> &'static str {
    match status {
        400 => "The request was invalid. Please check your input and try again.",
        401 => "Your session has expired. Please log in again.",
        403 => "You don't have permission to access this resource.",
        404 => "The requested resource could not be found.",
        408 => "The request timed out. Please try again.",
        409 => "This request conflicts with the current state of the resource.",
        422 => "Some of the information provided is invalid. Please review and try again.",
        429 => "Too many requests. Please wait a moment and try again.",
        500 => "Something went wrong on our end. Please try again later.",
        502 => "We're having trouble reaching our servers. Please try again later.",
        503 => "The service is temporarily unavailable. Please try again later.",
        504 => "The server took too long to respond. Please try again later.",
        400..=499 => "There was a problem with your request. Please try again.",
        _ => "A server error occurred. Please try again later.",
    }
}

/// A short label for the status code.
pub fn get_http_status_message(status: u16) -> &'static str {
    match status {
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        408 => "Request Timeout",
        409 => "Conflict",
        422 => "Unprocessable Entity",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        504 => "Gateway Timeout",
        400..=499 => "Client Error",
        _ => "Server Error",
    }
}

use crate::response::ServerResponse;

/// Appends a header value to the response, avoiding value duplication.
pub fn add_response_header(response: &ServerResponse, name: &str, value: &str) {
    let mut values = response.header_values(name);
    if values.iter().any(|existing| existing == value) {
        return;
    }
    values.push(value.to_string());
    response.set_header_values(name, values);
}

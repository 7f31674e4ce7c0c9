/// Strip anything that looks like an HTML tag and trim the result.
///
/// A tag is a `<` followed by any run of non-`>` characters and a closing `>`.
/// A `<` with no closing `>` after it is kept as typed.
pub fn sanitize_input(input: &str) -> String {
    let mut output = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(start) = rest.find('<') {
        output.push_str(&rest[..start]);
        match rest[start..].find('>') {
            Some(end) => rest = &rest[start + end + 1..],
            None => {
                output.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    output.push_str(rest);
    output.trim().to_string()
}

/// Sanitize an optional free-text field, mapping blank results to `None`.
pub fn sanitize_optional(input: Option<String>) -> Option<String> {
    input
        .map(|s| sanitize_input(&s))
        .filter(|s| !s.is_empty())
}

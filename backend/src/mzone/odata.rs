//! Helpers for building OData `$filter` expressions.
//!
//! Every string literal that ends up inside a filter goes through [`escape_literal`]. An
//! unescaped quote ends the literal early and the filter then matches the wrong vehicle or
//! none at all.

/// Doubles single quotes so the value can sit inside a `'...'` literal.
pub fn escape_literal(value: &str) -> String {
    value.replace('\'', "''")
}

/// `field eq 'value'`, with the value escaped.
pub fn eq(field: &str, value: &str) -> String {
    format!("{} eq '{}'", field, escape_literal(value))
}

/// Joins clauses with `or`.
pub fn any_of(clauses: &[String]) -> String {
    clauses.join(" or ")
}

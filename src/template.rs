// Copyright (c) 2026 Ronan Le Meillat - SCTG Development
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Licensed under the MIT License or the Apache License, Version 2.0

//! `{{fieldName}}` template population.
//!
//! Population is a pure function of the template source and the [`Fields`] map, so the preview
//! and PDF paths always see byte-identical HTML. By default every placeholder must resolve; an
//! unknown token is an [`ErrorKind::UnresolvedPlaceholder`] error instead of leaking into the
//! printed certificate. [`Resolution::Lenient`] keeps unknown tokens verbatim for callers that
//! rely on the old pass-through behaviour.

use std::collections::BTreeMap;

use crate::error::{Error, ErrorKind};

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

/// A value substituted for a placeholder.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldValue {
    /// Plain text, HTML-escaped on substitution.
    Text(String),
    /// Pre-built markup inserted as is.
    Markup(String),
}

impl FieldValue {
    /// The unescaped value.
    pub fn as_str(&self) -> &str {
        match self {
            FieldValue::Text(s) | FieldValue::Markup(s) => s,
        }
    }

    pub fn is_markup(&self) -> bool {
        matches!(self, FieldValue::Markup(_))
    }

    fn write_to(&self, out: &mut String) {
        match self {
            FieldValue::Text(text) => escape_html_into(text, out),
            FieldValue::Markup(markup) => out.push_str(markup),
        }
    }
}

/// Placeholder name to value map.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Fields(BTreeMap<String, FieldValue>);

impl Fields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a plain-text value.
    pub fn text(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), FieldValue::Text(value.into()));
    }

    pub fn insert(&mut self, name: impl Into<String>, value: FieldValue) {
        self.0.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.0.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// What to do with placeholders that have no field.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Resolution {
    /// Fail with the list of unresolved tokens.
    #[default]
    Strict,
    /// Leave unresolved tokens in the output verbatim.
    Lenient,
}

/// An HTML template with `{{fieldName}}` placeholders.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Template {
    source: String,
}

impl Template {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }

    /// The built-in A4 certificate layout.
    pub fn certificate() -> Self {
        Self::new(include_str!(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/templates/certificate.html"
        )))
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Distinct placeholder names in order of first appearance.
    ///
    /// # Examples
    ///
    /// ```
    /// use labcert::template::Template;
    /// let t = Template::new("<p>{{a}} {{b}} {{a}} {{ not a token }}</p>");
    /// assert_eq!(t.placeholders(), vec!["a", "b"]);
    /// ```
    pub fn placeholders(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        scan(&self.source, |segment| {
            if let Segment::Token(name) = segment {
                if !names.contains(&name) {
                    names.push(name);
                }
            }
        });
        names
    }

    /// Placeholders the given fields do not cover.
    pub fn missing_fields(&self, fields: &Fields) -> Vec<String> {
        self.placeholders()
            .into_iter()
            .filter(|name| !fields.contains(name))
            .map(str::to_string)
            .collect()
    }

    /// Populates every placeholder, failing on any unresolved token.
    pub fn populate(&self, fields: &Fields) -> Result<String, Error> {
        self.populate_with(fields, Resolution::Strict)
    }

    /// Populates known placeholders and keeps unknown ones verbatim.
    pub fn populate_lenient(&self, fields: &Fields) -> String {
        let (html, _) = self.substitute(fields);
        html
    }

    pub fn populate_with(&self, fields: &Fields, resolution: Resolution) -> Result<String, Error> {
        let (html, unresolved) = self.substitute(fields);
        if unresolved.is_empty() || resolution == Resolution::Lenient {
            return Ok(html);
        }
        Err(Error::new(
            format!(
                "Template has unresolved placeholder(s): {}",
                unresolved
                    .iter()
                    .map(|t| format!("{}{}{}", OPEN, t, CLOSE))
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            ErrorKind::UnresolvedPlaceholder(unresolved),
        ))
    }

    fn substitute(&self, fields: &Fields) -> (String, Vec<String>) {
        let mut out = String::with_capacity(self.source.len() * 2);
        let mut unresolved: Vec<String> = Vec::new();
        scan(&self.source, |segment| match segment {
            Segment::Literal(text) => out.push_str(text),
            Segment::Token(name) => match fields.get(name) {
                Some(value) => value.write_to(&mut out),
                None => {
                    if !unresolved.iter().any(|u| u == name) {
                        unresolved.push(name.to_string());
                    }
                    out.push_str(OPEN);
                    out.push_str(name);
                    out.push_str(CLOSE);
                }
            },
        });
        (out, unresolved)
    }
}

enum Segment<'a> {
    Literal(&'a str),
    Token(&'a str),
}

fn is_token_name(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Splits `source` into literal text and well-formed `{{name}}` tokens.
fn scan<'a>(source: &'a str, mut visit: impl FnMut(Segment<'a>)) {
    let mut rest = source;
    while let Some(start) = rest.find(OPEN) {
        let after = &rest[start + OPEN.len()..];
        match after.find(CLOSE) {
            Some(end) if is_token_name(&after[..end]) => {
                if start > 0 {
                    visit(Segment::Literal(&rest[..start]));
                }
                visit(Segment::Token(&after[..end]));
                rest = &after[end + CLOSE.len()..];
            }
            _ => {
                // not a placeholder; keep the braces and move past them
                visit(Segment::Literal(&rest[..start + OPEN.len()]));
                rest = after;
            }
        }
    }
    if !rest.is_empty() {
        visit(Segment::Literal(rest));
    }
}

/// Escapes the five HTML-significant characters.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    escape_html_into(s, &mut out);
    out
}

fn escape_html_into(s: &str, out: &mut String) {
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields() -> Fields {
        let mut f = Fields::new();
        f.text("clientName", "Acme & Sons");
        f.insert("rows", FieldValue::Markup("<tr><td>1</td></tr>".into()));
        f
    }

    #[test]
    fn text_is_escaped_markup_is_not() {
        let t = Template::new("<h1>{{clientName}}</h1><table>{{rows}}</table>");
        assert_eq!(
            t.populate(&fields()).unwrap(),
            "<h1>Acme &amp; Sons</h1><table><tr><td>1</td></tr></table>"
        );
    }

    #[test]
    fn strict_population_reports_unresolved_tokens() {
        let t = Template::new("{{clientName}} {{projectName}} {{projectName}} {{version}}");
        let err = t.populate(&fields()).unwrap_err();
        match err.kind() {
            ErrorKind::UnresolvedPlaceholder(tokens) => {
                assert_eq!(tokens, &["projectName", "version"])
            }
            k => panic!("unexpected kind: {:?}", k),
        }
        assert!(err.to_string().contains("{{projectName}}"));
    }

    #[test]
    fn lenient_population_keeps_tokens() {
        let t = Template::new("{{clientName}} / {{projectName}}");
        assert_eq!(
            t.populate_lenient(&fields()),
            "Acme &amp; Sons / {{projectName}}"
        );
    }

    #[test]
    fn malformed_braces_pass_through() {
        let t = Template::new("a {{ b }} c {{ d {{clientName}} }} e {{");
        assert_eq!(
            t.populate(&fields()).unwrap(),
            "a {{ b }} c {{ d Acme &amp; Sons }} e {{"
        );
        assert_eq!(t.placeholders(), vec!["clientName"]);
    }

    #[test]
    fn substituted_values_are_not_rescanned() {
        let mut f = Fields::new();
        f.text("a", "{{b}}");
        let t = Template::new("{{a}}");
        assert_eq!(t.populate(&f).unwrap(), "{{b}}");
    }

    #[test]
    fn population_is_deterministic() {
        let t = Template::new("{{clientName}}{{rows}}");
        let f = fields();
        assert_eq!(t.populate(&f).unwrap(), t.populate(&f).unwrap());
    }

    #[test]
    fn missing_fields_lists_uncovered_placeholders() {
        let t = Template::new("{{clientName}}{{x}}{{rows}}{{y}}");
        assert_eq!(t.missing_fields(&fields()), vec!["x", "y"]);
    }
}

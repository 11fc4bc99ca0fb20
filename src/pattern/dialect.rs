use crate::pattern::predicate::{MatchOp, Predicate};
use std::collections::HashMap;

/// Maps each match operation to a SQL template. `{0}` is replaced by the
/// column and `{1}` by the pattern as a quoted string literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlDialect {
    templates: HashMap<MatchOp, String>,
}

impl Default for SqlDialect {
    fn default() -> Self {
        SqlDialect::standard()
    }
}

impl SqlDialect {
    /// Engines with boolean-returning `regexp_like` and `regexp_matches`
    pub fn standard() -> Self {
        let mut dialect = SqlDialect {
            templates: HashMap::new(),
        };
        dialect
            .register(MatchOp::Like, "{0} like {1}")
            .register(MatchOp::LikeIgnoreCase, "lower({0}) like lower({1})")
            .register(MatchOp::RegexpLike, "regexp_like({0}, {1}) = 1")
            .register(MatchOp::RegexpMatches, "regexp_matches({0}, {1}) = 1")
            .register(MatchOp::SubstringMatches, "substring({0}, {1}) IS NOT NULL");
        dialect
    }

    /// Engines whose `regexp_like` returns a boolean that cannot be compared to 1
    pub fn boolean_coerced_regexp_like() -> Self {
        let mut dialect = SqlDialect::standard();
        dialect.register(
            MatchOp::RegexpLike,
            "(case when (regexp_like({0}, {1})) then 1 else 0 end) = 1",
        );
        dialect
    }

    pub fn register(&mut self, op: MatchOp, template: impl Into<String>) -> &mut Self {
        self.templates.insert(op, template.into());
        self
    }

    pub fn template(&self, op: MatchOp) -> Option<&str> {
        self.templates.get(&op).map(String::as_str)
    }

    /// Render a predicate as a SQL boolean expression
    pub fn render(&self, predicate: &Predicate) -> String {
        match predicate {
            Predicate::Match { column, op, pattern } => {
                let literal = quote_literal(pattern);
                match self.template(*op) {
                    Some(template) => fill_template(template, column, &literal),
                    None => {
                        tracing::warn!(?op, "no SQL template registered, rendering as false");
                        String::from("1 = 0")
                    }
                }
            }
            Predicate::Or(left, right) => format!("({} or {})", self.render(left), self.render(right)),
        }
    }
}

/// SQL string literal with embedded quotes doubled
pub fn quote_literal(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

fn fill_template(template: &str, column: &str, literal: &str) -> String {
    let mut sql = String::with_capacity(template.len() + column.len() + literal.len());
    let mut rest = template;
    while let Some(pos) = rest.find('{') {
        sql.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        if let Some(after) = tail.strip_prefix("{0}") {
            sql.push_str(column);
            rest = after;
        } else if let Some(after) = tail.strip_prefix("{1}") {
            sql.push_str(literal);
            rest = after;
        } else {
            sql.push('{');
            rest = &tail[1..];
        }
    }
    sql.push_str(rest);
    sql
}

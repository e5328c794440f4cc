//! Glob-style name-pattern compiler.
//!
//! User-typed patterns like `public.orders`, `foo*` or `"Mixed""Case"` compile
//! to an optional schema filter and an optional name filter, each an anchored
//! regular-expression source. The filters are applied by the backing store
//! (the `~` operator on Postgres), never evaluated here.

/// A compiled name pattern. `None` means "no filter" for that slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamePattern {
    /// Anchored regex source for the schema, from the text before the last
    /// unquoted `.` in the pattern.
    pub schema: Option<String>,
    /// Anchored regex source for the object name.
    pub name: Option<String>,
}

impl NamePattern {
    /// Compile a raw pattern. Any string is a valid pattern; an unterminated
    /// quote simply ends the scan with quoting still active.
    ///
    /// Scan rules, left to right with a single in-quotes flag:
    /// - `"` toggles quoting; `""` while quoted emits one literal `"`
    /// - outside quotes: uppercase folds to lowercase, `*` becomes `.*`,
    ///   `?` becomes `.`, and `.` commits the accumulator to the schema slot
    ///   (the last unquoted dot wins)
    /// - `$` is always escaped; regex metacharacters are escaped when quoted
    pub fn compile(pattern: &str) -> Self {
        let mut in_quotes = false;
        let mut buf = String::new();
        let mut schema: Option<String> = None;

        let mut chars = pattern.chars().peekable();
        while let Some(c) = chars.next() {
            if c == '"' {
                if in_quotes && chars.peek() == Some(&'"') {
                    buf.push('"');
                    chars.next();
                } else {
                    in_quotes = !in_quotes;
                }
            } else if !in_quotes && c.is_uppercase() {
                buf.extend(c.to_lowercase());
            } else if !in_quotes && c == '*' {
                buf.push_str(".*");
            } else if !in_quotes && c == '?' {
                buf.push('.');
            } else if !in_quotes && c == '.' {
                schema = Some(std::mem::take(&mut buf));
            } else {
                if c == '$' || (in_quotes && "|*+?()[]{}.^\\".contains(c)) {
                    buf.push('\\');
                }
                buf.push(c);
            }
        }

        Self {
            schema: schema.and_then(anchor),
            name: anchor(buf),
        }
    }

    /// True when the pattern compiled to no filters at all.
    pub fn is_empty(&self) -> bool {
        self.schema.is_none() && self.name.is_none()
    }
}

fn anchor(source: String) -> Option<String> {
    if source.is_empty() {
        None
    } else {
        Some(format!("^({source})$"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile(p: &str) -> (Option<String>, Option<String>) {
        let c = NamePattern::compile(p);
        (c.schema, c.name)
    }

    #[test]
    fn quoted_metacharacters_round_trip() {
        // literal `"`, `$` and `*` escaped/expanded exactly
        let (schema, name) = compile(r#"foo*."b""$ar*""#);
        assert_eq!(schema.as_deref(), Some("^(foo.*)$"));
        assert_eq!(name.as_deref(), Some(r#"^(b"\$ar\*)$"#));
    }

    #[test]
    fn compilation_is_idempotent() {
        for p in ["", "foo", "Foo.Bar", r#""A?b".c*"#, "a.b.c"] {
            assert_eq!(compile(p), compile(p));
        }
    }

    #[test]
    fn empty_pattern_matches_everything() {
        assert_eq!(compile(""), (None, None));
    }

    #[test]
    fn no_dot_means_no_schema_filter() {
        for p in ["foo", "FOO*", r#""a.b""#, "x?y"] {
            let (schema, _) = compile(p);
            assert_eq!(schema, None, "pattern {p:?}");
        }
    }

    #[test]
    fn last_unquoted_dot_wins() {
        let (schema, name) = compile("a.b.c");
        // only the segment before the *last* dot survives as schema source
        assert_eq!(schema.as_deref(), Some("^(b)$"));
        assert_eq!(name.as_deref(), Some("^(c)$"));
    }

    #[test]
    fn quoted_dot_is_literal() {
        let (schema, name) = compile(r#""a.b""#);
        assert_eq!(schema, None);
        assert_eq!(name.as_deref(), Some(r#"^(a\.b)$"#));
    }

    #[test]
    fn unquoted_uppercase_folds() {
        let (_, name) = compile("Users");
        assert_eq!(name.as_deref(), Some("^(users)$"));
        // quoted case is preserved
        let (_, name) = compile(r#""Users""#);
        assert_eq!(name.as_deref(), Some("^(Users)$"));
    }

    #[test]
    fn wildcards_expand() {
        let (_, name) = compile("or?er*");
        assert_eq!(name.as_deref(), Some("^(or.er.*)$"));
    }

    #[test]
    fn schema_qualified_pattern() {
        let (schema, name) = compile("public.orders");
        assert_eq!(schema.as_deref(), Some("^(public)$"));
        assert_eq!(name.as_deref(), Some("^(orders)$"));
    }

    #[test]
    fn trailing_dot_leaves_name_unset() {
        let (schema, name) = compile("public.");
        assert_eq!(schema.as_deref(), Some("^(public)$"));
        assert_eq!(name, None);
    }

    #[test]
    fn dollar_escaped_outside_quotes_too() {
        let (_, name) = compile("pg$temp");
        assert_eq!(name.as_deref(), Some(r#"^(pg\$temp)$"#));
    }

    #[test]
    fn unterminated_quote_is_accepted() {
        let (schema, name) = compile(r#""abc"#);
        assert_eq!(schema, None);
        assert_eq!(name.as_deref(), Some("^(abc)$"));
        // a dot inside the dangling quote stays literal
        let (schema, name) = compile(r#""a.b"#);
        assert_eq!(schema, None);
        assert_eq!(name.as_deref(), Some(r#"^(a\.b)$"#));
    }
}

use proptest::prelude::*;
use sqlctx::lexer::step;
use sqlctx::{
    escape_delimited, make_lexer, Dialect, EscapeOptions, Error, IdentKind, LexState, Notary, StringKind, Template,
    Value,
};

/// Self-contained SQL pieces that leave the lexer at top level.
fn balanced_piece(dialect: Dialect) -> BoxedStrategy<String> {
    let common = prop_oneof![
        "[a-z]{1,8}( [0-9]{1,3})?",
        "'[a-z ]{0,8}'",
        "'[a-z]{0,4}''[a-z]{0,4}'",
        "/\\* [a-z' ]{0,8} \\*/",
        "-- [a-z' ]{0,8}\n",
    ];
    match dialect {
        Dialect::MySql => prop_oneof![common, "`[a-z\"' ]{0,8}`", "# [a-z' ]{0,8}\n", "\"[a-z' ]{0,8}\""].boxed(),
        Dialect::Postgres => {
            prop_oneof![common, "\"[a-z' ]{0,8}\"", "\\$\\$[a-z' ]{0,8}\\$\\$", "\\$t\\$[a-z' ]{0,8}\\$t\\$"].boxed()
        }
    }
}

fn chunks(dialect: Dialect) -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(prop::collection::vec(balanced_piece(dialect), 1..4), 1..5).prop_map(|groups| {
        groups
            .into_iter()
            .map(|pieces| format!("SELECT {} ", pieces.join(" ")))
            .collect()
    })
}

fn dialects() -> impl Strategy<Value = Dialect> {
    prop_oneof![Just(Dialect::MySql), Just(Dialect::Postgres)]
}

fn delimited(dialect: Dialect, text: &str, ctx: &LexState) -> String {
    let opts = EscapeOptions::default().forbidding_qualified();
    escape_delimited(dialect, &Value::from(text), ctx, &opts, &Notary::new()).unwrap()
}

/// The escaped text must keep the construct open, and the closing quote must close it.
fn assert_stays_inside(dialect: Dialect, opener: &str, escaped: &str, closer: &str) -> Result<(), TestCaseError> {
    let open = step(dialect, LexState::None, opener, false).unwrap();
    let inside = step(dialect, open.clone(), escaped, true).unwrap();
    prop_assert_eq!(&inside, &open);
    let closed = step(dialect, inside, &format!("{}, 1", closer), true).unwrap();
    prop_assert_eq!(closed, LexState::None);
    Ok(())
}

fn mysql_unescape(s: &str) -> String {
    let mut out = String::new();
    let mut it = s.chars();
    while let Some(c) = it.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match it.next() {
            Some('0') => out.push('\0'),
            Some('b') => out.push('\u{8}'),
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('Z') => out.push('\u{1a}'),
            Some(other) => out.push(other),
            None => {}
        }
    }
    out
}

fn pg_unescape(s: &str) -> String {
    let mut out = String::new();
    let mut it = s.chars();
    while let Some(c) = it.next() {
        match c {
            '\'' => {
                it.next();
                out.push('\'');
            }
            '\\' => match it.next() {
                Some('x') => {
                    let hex: String = [it.next(), it.next()].into_iter().flatten().collect();
                    out.push(char::from(u8::from_str_radix(&hex, 16).unwrap()));
                }
                Some('b') => out.push('\u{8}'),
                Some('t') => out.push('\t'),
                Some('n') => out.push('\n'),
                Some('r') => out.push('\r'),
                Some(other) => out.push(other),
                None => {}
            },
            _ => out.push(c),
        }
    }
    out
}

fn unicode_unescape(s: &str) -> String {
    let mut out = String::new();
    let mut it = s.chars();
    while let Some(c) = it.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let wide = it.clone().next() == Some('+');
        if wide {
            it.next();
        }
        let digits: String = it.by_ref().take(if wide { 6 } else { 4 }).collect();
        let n = u32::from_str_radix(&digits, 16).unwrap();
        out.push(char::from_u32(n).unwrap());
    }
    out
}

proptest! {
    #[test]
    fn balanced_templates_finish_at_top_level(dialect in dialects(), parts in chunks(Dialect::MySql), pg in chunks(Dialect::Postgres)) {
        let parts = if dialect == Dialect::MySql { parts } else { pg };
        let mut lexer = make_lexer(dialect);
        for part in &parts {
            prop_assert_eq!(lexer.feed(Some(part.as_str())).unwrap(), LexState::None);
        }
        prop_assert_eq!(lexer.feed(None).unwrap(), LexState::None);
    }

    #[test]
    fn unbalanced_templates_name_the_open_construct(
        parts in chunks(Dialect::MySql),
        opener in prop_oneof![Just("'"), Just("`"), Just("\""), Just("/*")],
    ) {
        let mut lexer = make_lexer(Dialect::MySql);
        for part in &parts {
            lexer.feed(Some(part.as_str())).unwrap();
        }
        lexer.feed(Some(format!("{}abc", opener).as_str())).unwrap();
        prop_assert_eq!(lexer.feed(None).unwrap_err(), Error::Unclosed { construct: opener.to_string() });
    }

    #[test]
    fn relexing_is_idempotent(parts in chunks(Dialect::Postgres), split in 0usize..4) {
        let mut parts = parts;
        parts.insert(split.min(parts.len()), "SELECT '".into());
        parts.insert(split.min(parts.len() - 1) + 1, "' ".into());
        let a = Template::new(Dialect::Postgres, parts.as_slice()).unwrap();
        let b = Template::new(Dialect::Postgres, parts.as_slice()).unwrap();
        prop_assert_eq!(a.contexts(), b.contexts());
    }

    #[test]
    fn failures_are_sticky(parts in chunks(Dialect::MySql), later in "[a-z ]{0,10}") {
        let mut lexer = make_lexer(Dialect::MySql);
        for part in &parts {
            lexer.feed(Some(part.as_str())).unwrap();
        }
        let first = lexer.feed(Some("SELECT 1 # open")).unwrap_err();
        prop_assert_eq!(lexer.feed(Some(later.as_str())).unwrap_err(), first.clone());
        prop_assert_eq!(lexer.feed(None).unwrap_err(), first);
    }

    #[test]
    fn mysql_strings_round_trip(text in any::<String>()) {
        for (opener, kind) in [("'", StringKind::Single), ("\"", StringKind::Double)] {
            let escaped = delimited(Dialect::MySql, &text, &LexState::StringLiteral(kind));
            assert_stays_inside(Dialect::MySql, opener, &escaped, opener)?;
            prop_assert_eq!(mysql_unescape(&escaped), text.clone());
        }
    }

    #[test]
    fn postgres_strings_round_trip(text in any::<String>()) {
        let plain = delimited(Dialect::Postgres, &text, &LexState::StringLiteral(StringKind::Single));
        assert_stays_inside(Dialect::Postgres, "'", &plain, "'")?;
        prop_assert_eq!(plain.replace("''", "'"), text.clone());

        let e = delimited(Dialect::Postgres, &text, &LexState::StringLiteral(StringKind::Escaped));
        assert_stays_inside(Dialect::Postgres, "E'", &e, "'")?;
        prop_assert_eq!(pg_unescape(&e), text.clone());

        let u = delimited(Dialect::Postgres, &text, &LexState::StringLiteral(StringKind::Unicode));
        assert_stays_inside(Dialect::Postgres, "U&'", &u, "'")?;
        prop_assert_eq!(unicode_unescape(&u), text);
    }

    #[test]
    fn identifiers_round_trip(text in "[^\\x00]{1,16}") {
        let pg = delimited(Dialect::Postgres, &text, &LexState::Identifier(IdentKind::Double));
        assert_stays_inside(Dialect::Postgres, "\"", &pg, "\"")?;
        prop_assert_eq!(pg.replace("\"\"", "\""), text.clone());

        let u = delimited(Dialect::Postgres, &text, &LexState::Identifier(IdentKind::Unicode));
        assert_stays_inside(Dialect::Postgres, "U&\"", &u, "\"")?;
        prop_assert_eq!(unicode_unescape(&u), text);
    }

    #[test]
    fn mysql_identifiers_round_trip(text in "[a-zA-Z0-9 '\"`.\\\\$]{0,12}[a-z]") {
        let escaped = delimited(Dialect::MySql, &text, &LexState::Identifier(IdentKind::Backtick));
        assert_stays_inside(Dialect::MySql, "`", &escaped, "`")?;
        prop_assert_eq!(escaped.replace("``", "`"), text);
    }

    #[test]
    fn dollar_quotes_accept_tag_free_text(text in "[^$]{0,24}") {
        let ctx = LexState::DollarQuote { tag: "body".into() };
        let escaped = delimited(Dialect::Postgres, &text, &ctx);
        prop_assert_eq!(&escaped, &text);
        assert_stays_inside(Dialect::Postgres, "$body$", &escaped, "$body$")?;
    }
}

//! Example consumer: builds a few statements with sqlctx and prints them.
//!
//! Run from repo root: `cargo run -p example-consumer -- '["O'"'"'Brien", 42]'`
//! The optional argument is a JSON array holding a name and an id.
//! `SQLCTX_TIME_ZONE`, `SQLCTX_STRINGIFY_OBJECTS` and `SQLCTX_FORBID_QUALIFIED`
//! (or a `.env` file) change how values render.

use sqlctx::{Dialect, EscapeOptions, Notary, TemplateCache, Value};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("sqlctx=info")),
        )
        .init();

    let options = EscapeOptions::from_env()?;
    let notary = Notary::new();
    let cache = TemplateCache::new();

    let args: Vec<Value> = match std::env::args().nth(1) {
        Some(raw) => match Value::from(serde_json::from_str::<serde_json::Value>(&raw)?) {
            Value::Sequence(items) => items,
            other => vec![other],
        },
        None => vec![Value::from("O'Brien"), Value::from(42)],
    };
    let name = args.first().cloned().unwrap_or(Value::Null);
    let id = args.get(1).cloned().unwrap_or(Value::Null);

    for dialect in [Dialect::MySql, Dialect::Postgres] {
        let quote = dialect.patterns().ident_quote;
        let chunks = [
            format!("SELECT * FROM {q}", q = quote),
            format!("{q} WHERE name = '", q = quote),
            "' OR id IN (".to_string(),
            ")".to_string(),
        ];
        let template = cache.get_or_lex(dialect, &chunks)?;
        let sql = template.interpolate(
            &[Value::from("app.users"), name.clone(), Value::seq([id.clone(), Value::from(7)])],
            &options,
            &notary,
        )?;
        tracing::info!(%dialect, "built statement");
        println!("{}: {}", dialect, sql);
    }

    let stamp = notary.fragment("CURRENT_TIMESTAMP");
    let update = sqlctx::interpolate(
        Dialect::Postgres,
        &["UPDATE accounts SET ", ", seen_at = ", " WHERE id = ", ""],
        &[
            Value::Mapping(vec![("display_name".into(), name), ("active".into(), Value::from(true))]),
            Value::from(stamp),
            id,
        ],
        &options,
        &notary,
    )?;
    println!("postgres: {}", update);
    Ok(())
}

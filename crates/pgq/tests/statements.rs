use bytes::BytesMut;
use chrono::{NaiveDate, TimeZone, Utc};
use pgq::{
    Arg, Dialect, PlaceholderFormat, SqlError, SqlResult, Sqlizer, Value, Valuer, alias, and,
    args, case_of, concat_expr, debug, delete, eq, expr, gt, insert, like, not_eq, placeholders,
    select, statement, update,
};
use tokio_postgres::types::{IsNull, ToSql, Type};

/// A nullable string in the style of database driver wrapper types.
struct NullString {
    value: Option<String>,
}

impl Valuer for NullString {
    fn value(&self) -> SqlResult<Value> {
        Ok(self.value.clone().into())
    }
}

#[test]
fn debug_inlines_arguments() {
    let b = update("table").set("x", 1).set("y", "val");
    assert_eq!(debug(&b), "UPDATE table SET x = '1', y = 'val'");

    let b = delete("table").and_where(and![eq! { "column" => "val" }, eq! { "other" => 1 }]);
    assert_eq!(
        debug(&b),
        "DELETE FROM table WHERE (column = 'val' AND other = '1')"
    );

    let b = insert("table").values(args![1, "test"]);
    assert_eq!(debug(&b), "INSERT INTO table VALUES ('1','test')");
}

#[test]
fn debug_reports_statement_errors() {
    let b = insert("table");
    assert_eq!(
        debug(&b),
        "[SQL error: insert statements must have at least one set of values or select clause]"
    );
}

#[test]
fn sub_select_renumbers_after_outer_markers() {
    let sub = select(&["id"])
        .from("orders")
        .and_where(gt! { "total" => 100 });
    let q = select(&["u.name"])
        .column(alias(sub, "order_ids"))
        .from("users u")
        .and_where(like! { "u.name" => "a%" })
        .to_sql()
        .unwrap();

    // The column sub-select comes first in the text, so it takes $1.
    assert_eq!(
        q.sql,
        "SELECT u.name, (SELECT id FROM orders WHERE total > $1) AS order_ids \
         FROM users u WHERE u.name LIKE $2"
    );
    assert_eq!(q.params, vec![Value::Int(100), Value::Text("a%".into())]);
}

#[test]
fn three_levels_of_nesting() {
    let inner = select(&["team_id"]).from("admins").and_where(expr!("level > ?", 3));
    let middle = select(&["id"])
        .from("teams")
        .and_where(expr!("region = ?", "eu"))
        .and_where(expr!("id IN (?)", inner));
    let q = select(&["*"])
        .from("users")
        .and_where(expr!("active = ?", true))
        .and_where(expr!("team_id IN (?)", middle))
        .and_where(expr!("age > ?", 21))
        .to_sql()
        .unwrap();

    assert_eq!(
        q.sql,
        "SELECT * FROM users WHERE active = $1 AND team_id IN \
         (SELECT id FROM teams WHERE region = $2 AND id IN \
         (SELECT team_id FROM admins WHERE level > $3)) AND age > $4"
    );
    assert_eq!(q.params.len(), 4);
}

#[test]
fn escaped_markers_survive_finalization() {
    let q = select(&["uuid", "\"data\" #> '{tags}' AS tags"])
        .from("nodes")
        .and_where(expr!("\"data\" -> 'tags' ??| array['?']", "tag"))
        .and_where(eq! { "enabled" => true })
        .to_sql()
        .unwrap();
    assert_eq!(
        q.sql,
        "SELECT uuid, \"data\" #> '{tags}' AS tags FROM nodes \
         WHERE \"data\" -> 'tags' ?| array['$1'] AND enabled = $2"
    );
}

#[test]
fn where_noop_is_textually_identical() {
    let with = delete("t").and_where("").and_where(eq! { "a" => 1 }).and_where(None::<&str>);
    let without = delete("t").and_where(eq! { "a" => 1 });
    assert_eq!(with.to_sql().unwrap(), without.to_sql().unwrap());
}

#[test]
fn maps_are_order_independent() {
    let a: pgq::Eq = [("b", 2), ("a", 1)].into_iter().collect();
    let b: pgq::Eq = [("a", 1), ("b", 2)].into_iter().collect();
    assert_eq!(a.to_sql().unwrap(), b.to_sql().unwrap());
    assert_eq!(a.to_sql().unwrap().sql, "a = ? AND b = ?");
}

#[test]
fn valuers_are_unwrapped_before_classification() {
    let q = select(&["*"])
        .from("users")
        .and_where(eq! { "nickname" => Arg::valuer(NullString { value: None }) })
        .and_where(not_eq! { "name" => Arg::valuer(NullString { value: Some("bob".into()) }) })
        .to_sql()
        .unwrap();
    assert_eq!(q.sql, "SELECT * FROM users WHERE nickname IS NULL AND name <> $1");
    assert_eq!(q.params, vec![Value::Text("bob".into())]);
}

#[test]
fn standard_dialect_expands_lists() {
    let q = select(&["*"])
        .from("t")
        .and_where(eq! { "id" => vec![1, 2, 3] }.dialect(Dialect::Standard))
        .to_sql()
        .unwrap();
    assert_eq!(q.sql, "SELECT * FROM t WHERE id IN ($1,$2,$3)");
    assert_eq!(q.params.len(), 3);
}

#[test]
fn concat_builds_dynamic_columns() {
    let name = expr!("CONCAT(?, ' ', ?)", "first", "last");
    let q = select(&[])
        .column(concat_expr!["COALESCE(full_name, ", name, ") AS name"])
        .from("people")
        .to_sql()
        .unwrap();
    assert_eq!(
        q.sql,
        "SELECT COALESCE(full_name, CONCAT($1, ' ', $2)) AS name FROM people"
    );
}

#[test]
fn case_in_update() {
    let q = update("accounts")
        .set(
            "tier",
            case_of("plan").when("'pro'", expr!("?", 2)).else_(expr!("?", 1)),
        )
        .and_where(eq! { "id" => 9 })
        .to_sql()
        .unwrap();
    assert_eq!(
        q.sql,
        "UPDATE accounts SET tier = CASE plan WHEN 'pro' THEN $1 ELSE $2 END WHERE id = $3"
    );
}

#[test]
fn statement_defaults_apply() {
    let tenant = statement().and_where(eq! { "tenant_id" => 42 });
    let q = tenant.select(&["*"]).from("orders").to_sql().unwrap();
    assert_eq!(q.sql, "SELECT * FROM orders WHERE tenant_id = $1");

    let q = tenant
        .clone()
        .placeholder_format(PlaceholderFormat::Question)
        .delete("orders")
        .to_sql()
        .unwrap();
    assert_eq!(q.sql, "DELETE FROM orders WHERE tenant_id = ?");
}

#[test]
fn errors_propagate_unchanged_through_nesting() {
    let bad = select(&["*"]).from("t").and_where(like! { "name" => vec!["a", "b"] });
    let outer = select(&["*"]).from("u").and_where(expr!("id IN (?)", bad));
    let err = outer.to_sql().unwrap_err();
    assert_eq!(err, SqlError::ListLike);
    assert!(err.is_type_error());
}

#[test]
#[should_panic(expected = "failed to build SQL")]
fn must_sql_panics_on_error() {
    select(&[]).from("t").must_sql();
}

#[test]
fn placeholders_helper() {
    assert_eq!(placeholders(0), "");
    assert_eq!(placeholders(4), "?,?,?,?");
}

#[test]
fn params_bind_through_tokio_postgres() {
    let ts = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
    let q = insert("events")
        .columns(&["id", "kind", "at", "payload"])
        .values(args![
            uuid::Uuid::nil(),
            "signup",
            ts,
            serde_json::json!({ "source": "web" }),
        ])
        .to_sql()
        .unwrap();
    assert_eq!(q.sql, "INSERT INTO events (id,kind,at,payload) VALUES ($1,$2,$3,$4)");
    assert_eq!(q.params_ref().len(), 4);
    assert_eq!(q.params[2], Value::Timestamp(ts));
}

#[test]
fn arbitrary_driver_types_bind_as_params() {
    let day = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    let q = select(&["id"])
        .from("events")
        .and_where(eq! { "day" => Arg::param(day) })
        .and_where(expr!("kind = ANY(?)", Arg::param(vec![1i16, 2])))
        .to_sql()
        .unwrap();
    assert_eq!(q.sql, "SELECT id FROM events WHERE day = $1 AND kind = ANY($2)");

    let params = q.params_ref();
    assert_eq!(params.len(), 2);

    let mut buf = BytesMut::new();
    let r = params[0].to_sql_checked(&Type::DATE, &mut buf).unwrap();
    assert!(matches!(r, IsNull::No));
    assert!(params[0].to_sql_checked(&Type::INT4, &mut BytesMut::new()).is_err());
    assert!(params[1].to_sql_checked(&Type::INT2_ARRAY, &mut BytesMut::new()).is_ok());

    let b = delete("events").and_where(eq! { "day" => Arg::param(day) });
    assert_eq!(debug(&b), "DELETE FROM events WHERE day = '<param>'");
}

#[test]
fn values_reject_mismatched_columns() {
    let q = select(&["*"])
        .from("products")
        .and_where(eq! { "price" => 10 })
        .to_sql()
        .unwrap();
    let mut buf = BytesMut::new();
    assert!(q.params[0].to_sql_checked(&Type::FLOAT8, &mut buf).is_err());
    assert!(buf.is_empty());
    assert!(q.params[0].to_sql_checked(&Type::INT8, &mut buf).is_ok());
}

#[test]
fn integers_narrow_to_column_width() {
    let mut buf = BytesMut::new();
    let r = Value::Int(7).to_sql(&Type::INT4, &mut buf).unwrap();
    assert!(matches!(r, IsNull::No));
    assert_eq!(&buf[..], &[0, 0, 0, 7]);

    let mut buf = BytesMut::new();
    assert!(Value::Int(1 << 40).to_sql(&Type::INT2, &mut buf).is_err());

    let mut buf = BytesMut::new();
    let r = Value::Null.to_sql(&Type::TEXT, &mut buf).unwrap();
    assert!(matches!(r, IsNull::Yes));
}

#[test]
fn config_enums_deserialize() {
    let d: Dialect = serde_json::from_str("\"standard\"").unwrap();
    assert_eq!(d, Dialect::Standard);
    let f: PlaceholderFormat = serde_json::from_str("\"dollar\"").unwrap();
    assert_eq!(f, PlaceholderFormat::Dollar);
}

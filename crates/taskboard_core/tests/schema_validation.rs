use taskboard_core::{
    EntitySchema, FieldMap, FieldSpec, FieldValue, Normalize, Record, Rule,
};

const NOW: i64 = 1_700_000_000_000;

fn article_schema() -> EntitySchema {
    EntitySchema::new(
        "article",
        vec![
            FieldSpec::text("title").rule(Rule::Length { min: 1, max: 20 }),
            FieldSpec::text("slug")
                .normalize(Normalize::Trim)
                .normalize(Normalize::Lowercase)
                .rule(Rule::Length { min: 1, max: 40 }),
            FieldSpec::choice("state", ["draft", "published"]).default_value("draft"),
            FieldSpec::integer("revision").rule(Rule::IntRange { min: 1, max: 999 }),
            FieldSpec::date("publish_at").nullable().rule(Rule::FutureDate),
        ],
    )
    .unwrap()
}

fn valid_input() -> FieldMap {
    FieldMap::from([
        ("title".to_string(), FieldValue::from("Launch notes")),
        ("slug".to_string(), FieldValue::from("launch-notes")),
        ("revision".to_string(), FieldValue::from(1)),
    ])
}

#[test]
fn valid_input_passes_and_receives_defaults() {
    let schema = article_schema();
    let validated = schema.validate_record(&valid_input(), NOW).unwrap();

    assert_eq!(validated.get("state"), Some(&FieldValue::from("draft")));
    assert_eq!(validated.get("publish_at"), Some(&FieldValue::Null));
    assert_eq!(validated.get("revision"), Some(&FieldValue::from(1)));
}

#[test]
fn normalization_runs_before_validation() {
    let schema = article_schema();
    let mut input = valid_input();
    input.insert("slug".to_string(), FieldValue::from("  Launch-NOTES  "));

    let validated = schema.validate_record(&input, NOW).unwrap();
    assert_eq!(validated.get("slug"), Some(&FieldValue::from("launch-notes")));
}

#[test]
fn single_violation_names_field_and_rule() {
    let schema = article_schema();
    let mut input = valid_input();
    input.insert("revision".to_string(), FieldValue::from(0));

    let violations = schema.validate_record(&input, NOW).unwrap_err();
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].field, "revision");
    assert_eq!(violations[0].rule, "int_range");
}

#[test]
fn every_failing_field_appears_in_one_report() {
    let schema = article_schema();
    let input = FieldMap::from([
        // title missing entirely
        ("slug".to_string(), FieldValue::from("")),
        ("state".to_string(), FieldValue::from("archived")),
        ("revision".to_string(), FieldValue::from(0)),
        ("publish_at".to_string(), FieldValue::from(NOW - 1)),
        ("bogus".to_string(), FieldValue::from("x")),
    ]);

    let violations = schema.validate_record(&input, NOW).unwrap_err();
    let mut failing: Vec<(&str, &str)> = violations
        .iter()
        .map(|violation| (violation.field.as_str(), violation.rule))
        .collect();
    failing.sort_unstable();

    assert_eq!(
        failing,
        vec![
            ("bogus", "unknown_field"),
            ("publish_at", "future_date"),
            ("revision", "int_range"),
            ("slug", "length"),
            ("state", "one_of"),
            ("title", "required"),
        ]
    );
}

#[test]
fn null_on_nullable_field_skips_rules() {
    let schema = article_schema();
    let mut input = valid_input();
    input.insert("publish_at".to_string(), FieldValue::Null);

    let validated = schema.validate_record(&input, NOW).unwrap();
    assert_eq!(validated.get("publish_at"), Some(&FieldValue::Null));
}

#[test]
fn kind_mismatch_reports_invalid_type() {
    let schema = article_schema();
    let mut input = valid_input();
    input.insert("revision".to_string(), FieldValue::from("one"));

    let violations = schema.validate_record(&input, NOW).unwrap_err();
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].rule, "invalid_type");
}

#[test]
fn field_value_serializes_untagged() {
    let json = serde_json::to_value([
        FieldValue::Null,
        FieldValue::from(42),
        FieldValue::from("work"),
    ])
    .unwrap();
    assert_eq!(json, serde_json::json!([null, 42, "work"]));

    let decoded: Vec<FieldValue> = serde_json::from_value(json).unwrap();
    assert_eq!(
        decoded,
        vec![FieldValue::Null, FieldValue::from(42), FieldValue::from("work")]
    );
}

#[test]
fn record_wire_shape_is_stable() {
    let record = Record {
        id: 7,
        entity: "article".to_string(),
        fields: FieldMap::from([
            ("title".to_string(), FieldValue::from("Launch notes")),
            ("revision".to_string(), FieldValue::from(3)),
            ("publish_at".to_string(), FieldValue::Null),
        ]),
        created_at: NOW,
        updated_at: NOW + 1000,
    };

    let json = serde_json::to_value(&record).unwrap();
    assert_eq!(json["id"], 7);
    assert_eq!(json["entity"], "article");
    assert_eq!(json["fields"]["title"], "Launch notes");
    assert_eq!(json["fields"]["revision"], 3);
    assert!(json["fields"]["publish_at"].is_null());
    assert_eq!(json["created_at"], NOW);
    assert_eq!(json["updated_at"], NOW + 1000);

    let decoded: Record = serde_json::from_value(json).unwrap();
    assert_eq!(decoded, record);
}

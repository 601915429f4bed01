//! Decoding TmpL documents as the frontend writes them.

use serde_json::json;
use tmpl_ir::*;

fn module_json() -> serde_json::Value {
    json!({
        "name": ["fruit.temper"],
        "library_name": "orchard",
        "imports": [{
            "external_name": {"name": {"kind": "exported", "text": "Seed"}},
            "local_name": {"name": {"kind": "source", "base": "Seed", "uid": 4}},
            "path": {"library_name": "std", "to": ["seeds.temper"]}
        }],
        "top_levels": [
            {
                "kind": "module_function",
                "name": {"name": {"kind": "exported", "text": "grow"}},
                "params": {"params": [{
                    "name": {"name": {"kind": "source", "base": "n", "uid": 0}},
                    "type": {"kind": "nominal", "name": {"kind": "well_known", "name": "Int"}},
                    "optional": "false"
                }]},
                "body": {"statements": [
                    {"kind": "while",
                     "test": {"kind": "value", "value": {"kind": "boolean", "value": true}},
                     "body": {"kind": "block", "statements": [
                         {"kind": "break"},
                         {"kind": "continue", "label": "outer"}
                     ]}},
                    {"kind": "return", "expr": {
                        "kind": "call",
                        "callee": {"kind": "support", "code": {"kind": "operator", "op": "PlusIntInt"}},
                        "args": [
                            {"kind": "reference", "id": {"name": {"kind": "source", "base": "n", "uid": 0}}},
                            {"kind": "value", "value": {"kind": "int", "value": 1}}
                        ]
                    }}
                ]}
            },
            {"kind": "test", "name": {"name": {"kind": "temporary", "base": "t", "uid": 0}},
             "raw_name": "grows", "body": {"statements": []}},
            {"kind": "type_connection", "name": {"name": {"kind": "exported", "text": "Tree"}},
             "to": "temper.Tree", "category": "test"}
        ]
    })
}

#[test]
fn test_decode_single_module() {
    let module = decode_module(&module_json().to_string()).unwrap();
    assert_eq!(module.library_name, "orchard");
    assert_eq!(module.imports.len(), 1);
    assert_eq!(
        module.imports[0].path.as_ref().unwrap().require_path(),
        "std/seeds"
    );
    assert_eq!(module.top_levels.len(), 3);

    let TopLevel::ModuleFunction(grow) = &module.top_levels[0] else {
        panic!("expected a module function");
    };
    assert_eq!(grow.name.name, ResolvedName::exported("grow"));
    assert_eq!(grow.params.params[0].optional, TriState::False);
    assert_eq!(grow.category, DependencyCategory::Production);
    assert_eq!(grow.body.statements.len(), 2);

    let Statement::While(w) = &grow.body.statements[0] else {
        panic!("expected a while loop");
    };
    let Statement::Block(body) = w.body.as_ref() else {
        panic!("expected a block");
    };
    assert_eq!(body.statements[0], Statement::Break(Jump::default()));
    assert!(matches!(
        &body.statements[1],
        Statement::Continue(Jump { label: Some(l), .. }) if l == "outer"
    ));

    assert_eq!(module.top_levels[1].category(), DependencyCategory::Test);
    assert_eq!(module.top_levels[2].category(), DependencyCategory::Test);
}

#[test]
fn test_decode_module_lists() {
    let one = module_json();
    let array = json!([one.clone(), one.clone()]).to_string();
    assert_eq!(decode_modules(&array).unwrap().len(), 2);

    let wrapped = json!({"modules": [one.clone()]}).to_string();
    assert_eq!(decode_modules(&wrapped).unwrap().len(), 1);

    assert_eq!(decode_modules(&one.to_string()).unwrap().len(), 1);
}

#[test]
fn test_decode_reports_the_real_problem() {
    let mut bad = module_json();
    bad["top_levels"][0]["kind"] = json!("module_fnuction");
    let err = decode_modules(&bad.to_string()).unwrap_err();
    assert!(err.to_string().contains("module_fnuction"), "{err}");
}

#[test]
fn test_decode_rejects_missing_library() {
    let err = decode_module(r#"{"name": []}"#).unwrap_err();
    assert!(err.to_string().contains("library_name"), "{err}");
}

#[test]
fn test_pure_virtual_detection() {
    let call = build::support(SupportCode::PureVirtual, vec![]);
    assert!(call.is_pure_virtual());
    assert!(!build::int(1).is_pure_virtual());
}

#[test]
fn test_static_subject_decodes() {
    let expr: Expression = serde_json::from_value(json!({
        "kind": "get_backed_property",
        "subject": {"kind": "type", "name": {"kind": "defined",
                    "id": {"name": {"kind": "exported", "text": "D"}}}},
        "property": {"kind": "external", "name": "i"}
    }))
    .unwrap();
    let Expression::GetBackedProperty(get) = expr else {
        panic!("expected a property read");
    };
    assert!(matches!(get.subject, Subject::Type { .. }));
    assert_eq!(get.property, build::external("i"));
}

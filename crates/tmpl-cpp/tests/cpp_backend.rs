//! End-to-end tests for the C++ backend.

use tmpl_common::{BackendId, MetadataKey, MetadataRegistry, OutputFile, OutputPath, Pos};
use tmpl_ir::{
    Backend, BuiltinOperator, InstanceProperty, Member, TopLevel, TriState, Type, WellKnownType,
    build,
};
use tmpl_cpp::CppBackend;

fn translate(top_levels: Vec<TopLevel>) -> Vec<OutputFile> {
    let module = build::module(&["apple.temper"], "fruit", top_levels);
    CppBackend::new()
        .translate_module(&module)
        .expect("module should translate")
}

fn file<'a>(files: &'a [OutputFile], path: &str) -> &'a str {
    files
        .iter()
        .find(|f| f.path == OutputPath::parse(path))
        .map(|f| f.contents.as_str())
        .unwrap_or_else(|| panic!("no file {path}"))
}

fn int() -> Type {
    Type::nominal(WellKnownType::Int)
}

fn apple_type() -> TopLevel {
    let this = build::source("this", 2);
    let count = build::source("count", 1);
    let mut size = build::method(
        "size",
        build::source("size", 5),
        build::params(vec![build::typed_formal(
            this.clone(),
            Type::defined(build::exported("Apple")),
            TriState::False,
        )]),
        Some(vec![build::ret(Some(build::get_backed(
            build::this(this),
            build::internal(count.clone()),
        )))]),
    );
    size.return_type = Some(int());
    build::type_decl(
        build::exported("Apple"),
        vec![
            Member::InstanceProperty(InstanceProperty {
                pos: Pos::synthetic(),
                dot_name: "count".to_string(),
                name: count,
                ty: Some(int()),
            }),
            Member::Method(size),
        ],
    )
}

fn grow() -> TopLevel {
    let n = build::source("n", 3);
    let x = build::source("x", 4);
    let mut func = build::module_fn(
        build::exported("grow"),
        build::params(vec![build::typed_formal(n.clone(), int(), TriState::False)]),
        vec![
            build::local(
                x.clone(),
                Some(build::op(
                    BuiltinOperator::PlusIntInt,
                    vec![build::reference(n), build::int(1)],
                )),
            ),
            build::ret(Some(build::reference(x))),
        ],
    );
    if let TopLevel::ModuleFunction(f) = &mut func {
        f.return_type = Some(int());
    }
    func
}

#[test]
fn test_header_and_source() {
    let files = translate(vec![
        apple_type(),
        grow(),
        build::module_var(build::exported("limit"), Some(build::int(10))),
    ]);
    assert_eq!(files.len(), 2);
    assert_eq!(
        file(&files, "apple.hpp"),
        "\
#ifndef TEMPER_FRUIT_APPLE_HPP
#define TEMPER_FRUIT_APPLE_HPP

#include \"temper-core/core.hpp\"

namespace temper {
namespace fruit {

struct Apple;

struct Apple {
    temper::core::Int count__0;
    static temper::core::Object<Apple> make(temper::core::Int count__0);
    temper::core::Int size();
};

temper::core::Int grow(temper::core::Int n__0);

extern temper::core::AnyValue limit;

} // namespace fruit
} // namespace temper

#endif // TEMPER_FRUIT_APPLE_HPP
"
    );
    assert_eq!(
        file(&files, "apple.cpp"),
        "\
#include \"apple.hpp\"

namespace temper {
namespace fruit {

temper::core::Object<Apple> Apple::make(temper::core::Int count__0) {
    return temper::core::object<Apple>(count__0);
}

temper::core::Int Apple::size() {
    Apple* this__0 = this;
    return this__0->count__0;
}

temper::core::Int grow(temper::core::Int n__0) {
    auto x__0 = n__0 + 1;
    return x__0;
}

temper::core::AnyValue limit = 10;

} // namespace fruit
} // namespace temper
"
    );
}

#[test]
fn test_unsupported_statements_become_comments() {
    let files = translate(vec![build::module_fn(
        build::exported("f"),
        build::params(vec![]),
        vec![
            build::try_(build::block_stmt(vec![]), build::block_stmt(vec![])),
            build::while_(
                build::boolean(true),
                build::block_stmt(vec![build::brk(None)]),
            ),
        ],
    )]);
    let source = file(&files, "apple.cpp");
    assert!(
        source.contains(
            "void f() {\n    // unsupported Try\n    while (true) {\n        // unsupported Break\n    }\n}\n"
        ),
        "{source}"
    );
}

#[test]
fn test_test_only_module_has_no_files() {
    let files = translate(vec![build::test_decl(
        build::exported("t"),
        "t",
        vec![],
    )]);
    assert!(files.is_empty());
}

#[test]
fn test_root_module_is_main() {
    let module = build::module(&[], "fruit", vec![grow()]);
    let files = CppBackend::new().translate_module(&module).unwrap();
    let paths: Vec<String> = files.iter().map(|f| f.path.to_string()).collect();
    assert_eq!(paths, vec!["main.hpp", "main.cpp"]);
}

#[test]
fn test_finish_adds_umbrella_header() {
    let backend = CppBackend::new();
    let mut files = translate(vec![grow()]);
    let mut metadata = MetadataRegistry::new();
    backend.finish("fruit", &mut files, &mut metadata).unwrap();
    assert_eq!(
        file(&files, "fruit.hpp"),
        "#ifndef TEMPER_FRUIT_FRUIT_HPP\n#define TEMPER_FRUIT_FRUIT_HPP\n\n#include \"apple.hpp\"\n\n#endif // TEMPER_FRUIT_FRUIT_HPP\n"
    );
    assert_eq!(
        metadata.get("fruit", &BackendId::new("cpp"), MetadataKey::MainHeaderPath),
        Some("fruit/fruit.hpp")
    );
}

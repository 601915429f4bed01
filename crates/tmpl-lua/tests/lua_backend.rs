//! End-to-end tests for the Lua backend: TmpL trees in, Lua source out.

use tmpl_common::{BackendId, MetadataKey, MetadataRegistry, OutputFile, OutputPath, Pos};
use tmpl_ir::{
    Backend, Import, Member, ModulePath, Statement, TranslateError, TriState, Type, build,
};
use tmpl_lua::{ClosureMode, LuaBackend, LuaOptions};

fn translate(options: LuaOptions, top_levels: Vec<tmpl_ir::TopLevel>) -> Vec<OutputFile> {
    let module = build::module(&["m.temper"], "lib", top_levels);
    LuaBackend::new(options)
        .translate_module(&module)
        .expect("module should translate")
}

fn file<'a>(files: &'a [OutputFile], path: &str) -> &'a str {
    files
        .iter()
        .find(|f| f.path == OutputPath::parse(path))
        .map(|f| f.contents.as_str())
        .unwrap_or_else(|| panic!("no file {path} among {:?}", paths(files)))
}

fn paths(files: &[OutputFile]) -> Vec<String> {
    files.iter().map(|f| f.path.to_string()).collect()
}

fn only_fn(body: Vec<Statement>) -> Vec<OutputFile> {
    translate(
        LuaOptions::default(),
        vec![build::module_fn(build::exported("f"), build::params(vec![]), body)],
    )
}

fn empty() -> Statement {
    build::block_stmt(vec![])
}

// =============================================================================
// Module layout
// =============================================================================

#[test]
fn test_type_with_method_and_module_variable() {
    let apple = build::exported("Apple");
    let this = build::source("this", 0);
    let maybe = build::method(
        "maybe",
        build::source("maybe", 1),
        build::params(vec![build::typed_formal(
            this.clone(),
            Type::defined(apple.clone()),
            TriState::False,
        )]),
        Some(vec![build::ret(Some(build::this(this)))]),
    );
    let fuji = build::module_var(
        build::source("fuji", 2),
        Some(build::call_method(
            build::construct(build::defined(apple.clone()), vec![]),
            "maybe",
            vec![],
        )),
    );
    let module = build::module(
        &["apple.temper"],
        "lib",
        vec![build::type_decl(apple, vec![Member::Method(maybe)]), fuji],
    );
    let files = LuaBackend::default().translate_module(&module).unwrap();

    assert_eq!(paths(&files), vec!["apple.lua"]);
    assert_eq!(
        files[0].contents,
        "local temper = require('temper-core');\n\
         local Apple, fuji__0, exports;\n\
         Apple = temper.type('Apple');\n\
         Apple.methods.maybe = function(this__0)\n  return this__0;\nend;\n\
         fuji__0 = Apple():maybe();\n\
         exports = {};\n\
         exports.Apple = Apple;\n\
         return exports;\n"
    );
}

#[test]
fn test_finish_generates_init_and_records_main_file() {
    let backend = LuaBackend::default();
    let module = build::module(&["sub", "thing.temper"], "lib", vec![]);
    let mut files = backend.translate_module(&module).unwrap();
    let mut metadata = MetadataRegistry::new();
    backend.finish("lib", &mut files, &mut metadata).unwrap();

    assert_eq!(file(&files, "init.lua"), "require('lib/sub/thing');\n");
    assert_eq!(
        metadata.get("lib", &BackendId::new("lua"), MetadataKey::MainFilePath),
        Some("lib/init.lua")
    );
}

#[test]
fn test_root_module_is_the_init_file() {
    let backend = LuaBackend::default();
    let module = build::module(&[], "lib", vec![]);
    let mut files = backend.translate_module(&module).unwrap();
    backend
        .finish("lib", &mut files, &mut MetadataRegistry::new())
        .unwrap();
    assert_eq!(paths(&files), vec!["init.lua"]);
    assert!(file(&files, "init.lua").starts_with("local temper = require('temper-core');"));
}

#[test]
fn test_test_file_imports_hidden_names_through_internal_module() {
    let helper = build::source("helper", 1);
    let files = translate(
        LuaOptions::default(),
        vec![
            build::module_fn(build::exported("pub_fn"), build::params(vec![]), vec![]),
            build::module_fn(helper.clone(), build::params(vec![]), vec![]),
            build::test_decl(
                build::source("t", 2),
                "helper works",
                vec![build::expr_stmt(build::call_fn(helper, vec![]))],
            ),
        ],
    );
    assert_eq!(
        paths(&files),
        vec!["m-internal.lua", "m.lua", "tests/m-test.lua"]
    );
    assert_eq!(
        file(&files, "m.lua"),
        "local imports = require('lib/m-internal');\nreturn {pub_fn = imports.pub_fn};\n"
    );
    let internal = file(&files, "m-internal.lua");
    assert!(internal.contains("exports.pub_fn = pub_fn;\nexports.helper__0 = helper__0;\n"));

    let test = file(&files, "tests/m-test.lua");
    assert!(test.contains("lu_0 = require('luaunit');"));
    assert!(test.contains("lu_0.FAILURE_PREFIX = temper.test_failure_prefix;"));
    assert!(test.contains("helper__0 = temper.import('lib/m-internal', 'helper__0');"));
    assert!(test.contains("temper.test('helper works', function()\n"));
    assert!(test.contains("lu_0.LuaUnit.run(unpack_0({'--pattern', '^Test_%.', unpack_0(arg)}));"));
    assert!(test.ends_with("return exports;\n"));
}

#[test]
fn test_exported_names_need_no_internal_module() {
    let public = build::exported("shown");
    let files = translate(
        LuaOptions::default(),
        vec![
            build::module_fn(public.clone(), build::params(vec![]), vec![]),
            build::test_decl(
                build::source("t", 2),
                "shown",
                vec![build::expr_stmt(build::call_fn(public, vec![]))],
            ),
        ],
    );
    assert_eq!(paths(&files), vec!["m.lua", "tests/m-test.lua"]);
    assert!(
        file(&files, "tests/m-test.lua").contains("shown = temper.import('lib/m', 'shown');")
    );
}

#[test]
fn test_lazy_import_bound_only_when_used() {
    let seed = build::exported("Seed");
    let unused = build::exported("Unused");
    let path = ModulePath {
        library_name: "std".into(),
        to: vec!["seeds.temper".into()],
    };
    let mut module = build::module(
        &["m.temper"],
        "lib",
        vec![build::module_fn(
            build::exported("f"),
            build::params(vec![]),
            vec![build::ret(Some(build::reference(seed.clone())))],
        )],
    );
    for external_name in [seed, unused] {
        module.imports.push(Import {
            pos: Pos::synthetic(),
            local_name: None,
            external_name,
            path: Some(path.clone()),
        });
    }
    let files = LuaBackend::default().translate_module(&module).unwrap();
    let lua = file(&files, "m.lua");
    assert!(lua.contains("Seed = temper.import('std/seeds', 'Seed');"));
    assert!(!lua.contains("Unused"));
}

// =============================================================================
// Control flow
// =============================================================================

#[test]
fn test_break_out_of_try_inside_loop() {
    let files = only_fn(vec![build::while_(
        build::boolean(true),
        build::block_stmt(vec![build::try_(
            build::block_stmt(vec![build::brk(None)]),
            empty(),
        )]),
    )]);
    let lua = file(&files, "m.lua");
    assert!(lua.contains(
        "  while (true) do\n\
         \x20   local ok_0, msg_0, flow_0;\n\
         \x20   ok_0, msg_0, flow_0 = temper.pcall(function()\n\
         \x20     return 'break', 'flow';\n\
         \x20   end);\n\
         \x20   if (ok_0) then\n\
         \x20     if (flow_0 == 'flow') then\n\
         \x20       if (msg_0 == 'break') then\n\
         \x20         break;\n\
         \x20       end\n\
         \x20     end\n\
         \x20   end\n\
         \x20 end\n"
    ));
}

#[test]
fn test_labeled_break_across_two_protected_bodies() {
    let inner = build::try_(
        build::block_stmt(vec![build::brk(Some("outer"))]),
        empty(),
    );
    let files = only_fn(vec![build::labeled(
        "outer",
        build::while_(
            build::boolean(true),
            build::block_stmt(vec![build::try_(build::block_stmt(vec![inner]), empty())]),
        ),
    )]);
    let lua = file(&files, "m.lua");
    assert_eq!(lua.matches("return 'break_outer', 'flow';").count(), 2);
    assert!(lua.contains("if (msg_1 == 'break_outer') then"));
    assert!(lua.contains("if (msg_0 == 'break_outer') then\n"));
    assert!(lua.contains("goto break_outer;"));
    assert!(lua.contains("\n  ::break_outer::\n"));
    assert!(!lua.contains("continue_outer"));
}

#[test]
fn test_labeled_continue_across_two_protected_bodies() {
    let inner = build::try_(
        build::block_stmt(vec![build::cont(Some("outer"))]),
        empty(),
    );
    let files = only_fn(vec![build::labeled(
        "outer",
        build::while_(
            build::boolean(true),
            build::block_stmt(vec![build::try_(build::block_stmt(vec![inner]), empty())]),
        ),
    )]);
    let lua = file(&files, "m.lua");
    // Both protected bodies hand the jump outward; only the loop level jumps.
    assert_eq!(lua.matches("return 'continue_outer', 'flow';").count(), 2);
    assert!(lua.contains("if (msg_1 == 'continue_outer') then"));
    assert!(lua.contains("if (msg_0 == 'continue_outer') then\n"));
    assert_eq!(lua.matches("goto continue_outer;").count(), 1);
    assert!(lua.contains("\n  ::continue_outer::\n"));
    assert!(!lua.contains("break_outer"));
}

#[test]
fn test_return_from_try_at_function_level() {
    let files = only_fn(vec![build::try_(
        build::block_stmt(vec![build::ret(Some(build::int(1)))]),
        build::block_stmt(vec![build::ret(Some(build::int(2)))]),
    )]);
    let lua = file(&files, "m.lua");
    assert!(lua.contains("return 1, 'return';"));
    assert!(lua.contains(
        "  if (ok_0) then\n\
         \x20   if (flow_0 == 'return') then\n\
         \x20     return msg_0;\n\
         \x20   end\n\
         \x20 else\n\
         \x20   return 2;\n\
         \x20 end\n"
    ));
}

#[test]
fn test_continue_jumps_back_to_loop_test() {
    let go = build::source("go", 1);
    let files = only_fn(vec![
        build::local(go.clone(), Some(build::boolean(true))),
        build::while_(
            build::reference(go),
            build::block_stmt(vec![build::cont(None)]),
        ),
    ]);
    let lua = file(&files, "m.lua");
    assert!(lua.contains(
        "  ::continue_0::\n  while (go__0) do\n    goto continue_0;\n  end\n"
    ));
}

#[test]
fn test_unlabeled_break_outside_loop_is_rejected() {
    let module = build::module(
        &["m.temper"],
        "lib",
        vec![build::module_fn(
            build::exported("f"),
            build::params(vec![]),
            vec![build::brk(None)],
        )],
    );
    let err = LuaBackend::default().translate_module(&module).unwrap_err();
    assert!(matches!(err, TranslateError::Invariant { .. }));
    assert!(err.to_string().contains("break outside of any loop"));
}

#[test]
fn test_computed_jump_is_unsupported() {
    let module = build::module(
        &["m.temper"],
        "lib",
        vec![build::init_block(vec![Statement::ComputedJump(
            Default::default(),
        )])],
    );
    let err = LuaBackend::default().translate_module(&module).unwrap_err();
    assert_eq!(err.to_string(), "unsupported ComputedJump");
}

// =============================================================================
// Closure modes
// =============================================================================

fn mutating_try() -> Vec<Statement> {
    let x = build::source("x", 1);
    vec![
        build::local(x.clone(), Some(build::int(1))),
        build::try_(
            build::block_stmt(vec![build::assign(x, build::int(2))]),
            empty(),
        ),
    ]
}

#[test]
fn test_inline_table_closure_copies_captures_back() {
    let files = translate(
        LuaOptions {
            closure_mode: ClosureMode::InlineTable,
            wrap_funcs: false,
        },
        vec![build::module_fn(
            build::exported("g"),
            build::params(vec![]),
            mutating_try(),
        )],
    );
    let lua = file(&files, "m.lua");
    assert!(lua.contains("obj_0 = {x__0};"));
    assert!(lua.contains("temper.pcall(function(obj_0)\n    obj_0[1] = 2;\n  end, obj_0);"));
    assert!(lua.contains("x__0 = obj_0[1];"));
}

#[test]
fn test_global_table_closure_hoists_the_body() {
    let files = translate(
        LuaOptions {
            closure_mode: ClosureMode::GlobalTable,
            wrap_funcs: false,
        },
        vec![build::module_fn(
            build::exported("g"),
            build::params(vec![]),
            mutating_try(),
        )],
    );
    let lua = file(&files, "m.lua");
    let hoisted = lua.find("f_0 = function(obj_0)").expect("hoisted body");
    let function = lua.find("g = function()").expect("module function");
    assert!(hoisted < function);
    assert!(lua.contains("temper.pcall(f_0, obj_0);"));
}

// =============================================================================
// Functions and locals
// =============================================================================

#[test]
fn test_optional_parameter_defaults_to_null() {
    let files = translate(
        LuaOptions::default(),
        vec![build::module_fn(
            build::exported("f"),
            build::params(vec![build::formal(build::source("p", 1))]),
            vec![],
        )],
    );
    assert!(file(&files, "m.lua").contains(
        "f = function(p__0)\n  if (p__0 == nil) then\n    p__0 = temper.null;\n  end\nend;"
    ));
}

#[test]
fn test_wrap_funcs_names_each_function() {
    let files = translate(
        LuaOptions {
            closure_mode: ClosureMode::Basic,
            wrap_funcs: true,
        },
        vec![build::module_fn(build::exported("f"), build::params(vec![]), vec![])],
    );
    assert!(file(&files, "m.lua").contains("f = temper.wrap_func('::f', function()\nend);"));
}

fn many_locals(count: u32) -> Vec<OutputFile> {
    only_fn(
        (0..count)
            .map(|i| build::local(build::source("v", i), Some(build::int(i as i32))))
            .collect(),
    )
}

#[test]
fn test_locals_below_ceiling_stay_locals() {
    let lua = many_locals(127);
    let lua = file(&lua, "m.lua");
    assert!(!lua.contains("env_t"));
    assert!(lua.contains("v__126 = 126;"));
}

#[test]
fn test_locals_at_ceiling_move_into_table() {
    let lua = many_locals(128);
    let lua = file(&lua, "m.lua");
    assert!(lua.contains("local env_t1 = {};"));
    assert!(lua.contains("env_t1.v__0 = 0;"));
    assert!(lua.contains("env_t1.v__127 = 127;"));
}

fn loop_with_locals(count: u32) -> Vec<OutputFile> {
    let locals = (0..count)
        .map(|i| build::local(build::source("v", i), Some(build::int(i as i32))))
        .collect();
    only_fn(vec![
        build::local(build::source("a", 200), Some(build::int(0))),
        build::while_(build::boolean(true), build::block_stmt(locals)),
    ])
}

#[test]
fn test_loop_body_below_ceiling_stays_locals() {
    let files = loop_with_locals(127);
    let lua = file(&files, "m.lua");
    assert!(!lua.contains("env_t"));
    assert!(lua.contains("a__0 = 0;"));
}

#[test]
fn test_loop_body_at_ceiling_gets_its_own_table() {
    let files = loop_with_locals(128);
    let lua = file(&files, "m.lua");
    let table = lua.find("local env_t1 = {};").expect("loop body should get a table");
    let lp = lua.find("while (true) do").expect("loop");
    assert!(lp < table, "table belongs inside the loop body:\n{lua}");
    assert!(lua.contains("env_t1.v__127 = 127;"));
    assert!(!lua.contains("env_t1.a__0"));
    assert!(lua.contains("a__0 = 0;"));
}

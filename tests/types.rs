use aslc::{
    parse::{BasicType, BinaryOp, TypeSpec},
    symtable::{SymTable, SymTableError, SymbolKind},
    types::{Type, TypesMgr},
};

#[test]
fn equal_types_share_an_id() {
    let mut types = TypesMgr::new();
    let int = types.create_integer_ty();
    assert_eq!(int, types.create_integer_ty());
    assert_ne!(int, types.create_float_ty());

    let a = types.create_array_ty(4, int);
    let b = types.create_declared_ty(&TypeSpec::Array {
        size: 4,
        elem: BasicType::Int,
    });
    assert_eq!(a, b);
    assert_ne!(a, types.create_array_ty(5, int));

    let void = types.create_void_ty();
    let f = types.create_function_ty(vec![int, a], void);
    assert_eq!(f, types.create_function_ty(vec![int, a], void));
    assert_ne!(f, types.create_function_ty(vec![a, int], void));
    assert_eq!(
        types.get(f),
        &Type::Function {
            params: vec![int, a],
            ret: void
        }
    );
}

#[test]
fn classification() {
    let mut types = TypesMgr::new();
    let int = types.create_integer_ty();
    let float = types.create_float_ty();
    let boolean = types.create_boolean_ty();
    let ch = types.create_character_ty();
    let void = types.create_void_ty();
    let err = types.create_error_ty();
    let arr = types.create_array_ty(3, ch);
    let proc = types.create_function_ty(vec![], void);
    let func = types.create_function_ty(vec![int], float);

    assert!(types.is_numeric_ty(int) && types.is_numeric_ty(float));
    assert!(!types.is_numeric_ty(ch));
    for t in [int, float, boolean, ch] {
        assert!(types.is_primitive_ty(t));
    }
    for t in [void, err, arr, proc] {
        assert!(!types.is_primitive_ty(t));
    }
    assert!(types.is_error_ty(err));
    assert!(types.is_array_ty(arr));
    assert!(types.is_function_ty(func));
    assert!(types.is_void_function(proc));
    assert!(!types.is_void_function(func));
    assert!(!types.is_void_function(void));
}

#[test]
fn copy_and_compare_rules() {
    let mut types = TypesMgr::new();
    let int = types.create_integer_ty();
    let float = types.create_float_ty();
    let boolean = types.create_boolean_ty();
    let ch = types.create_character_ty();
    let a3 = types.create_array_ty(3, int);
    let b3 = types.create_array_ty(3, int);

    assert!(types.copyable_types(float, int));
    assert!(!types.copyable_types(int, float));
    assert!(types.copyable_types(a3, b3));
    assert!(!types.copyable_types(ch, int));

    assert!(types.comparable_types(int, float, BinaryOp::LessThan));
    assert!(types.comparable_types(ch, ch, BinaryOp::GreaterThanEqual));
    assert!(!types.comparable_types(boolean, boolean, BinaryOp::LessThan));
    assert!(types.comparable_types(boolean, boolean, BinaryOp::Equal));
    assert!(!types.comparable_types(boolean, int, BinaryOp::NotEqual));
    assert!(!types.comparable_types(a3, b3, BinaryOp::Equal));
}

#[test]
fn sizes_and_accessors() {
    let mut types = TypesMgr::new();
    let int = types.create_integer_ty();
    let float = types.create_float_ty();
    let void = types.create_void_ty();
    let arr = types.create_array_ty(7, float);
    let func = types.create_function_ty(vec![int, arr], float);

    assert_eq!(types.size_of(int), 1);
    assert_eq!(types.size_of(arr), 7);
    assert_eq!(types.size_of(void), 0);
    assert_eq!(types.size_of(func), 0);

    assert_eq!(types.num_of_parameters(func), 2);
    assert_eq!(types.parameter_type(func, 1), Some(arr));
    assert_eq!(types.parameter_type(func, 2), None);
    assert_eq!(types.func_return_type(func), float);
    assert_eq!(types.array_size(arr), 7);
    assert_eq!(types.array_elem_type(arr), float);
    // non-array and non-function types answer with themselves
    assert_eq!(types.array_elem_type(int), int);
    assert_eq!(types.func_return_type(int), int);
}

#[test]
fn printable_names() {
    let mut types = TypesMgr::new();
    let int = types.create_integer_ty();
    let ch = types.create_character_ty();
    let void = types.create_void_ty();
    let arr = types.create_array_ty(10, ch);
    let func = types.create_function_ty(vec![int, arr], void);

    assert_eq!(types.to_string(int), "int");
    assert_eq!(types.to_string(arr), "array<10,char>");
    assert_eq!(types.to_string(func), "function<(int,array<10,char>):void>");
}

#[test]
fn scopes_resolve_innermost_first() {
    let mut types = TypesMgr::new();
    let int = types.create_integer_ty();
    let float = types.create_float_ty();
    let mut symbols = SymTable::new();

    let global = symbols.push_new_scope("$global$");
    symbols.add_function("x", int).unwrap();
    let local = symbols.push_new_scope("f");
    assert!(!symbols.find_in_current_scope("x"));
    assert_eq!(symbols.find_in_stack("x"), Some(global));
    assert!(symbols.is_function_class("x"));

    symbols.add_parameter("x", float).unwrap();
    symbols.add_local_var("y", int).unwrap();
    assert!(symbols.find_in_current_scope("x"));
    assert_eq!(symbols.find_in_stack("x"), Some(local));
    assert_eq!(symbols.get_type("x"), Some(float));
    assert!(symbols.is_parameter_class("x"));
    assert!(!symbols.is_function_class("x"));
    assert_eq!(symbols.get_type("nope"), None);

    assert_eq!(symbols.pop_scope(), Ok(local));
    assert_eq!(symbols.get_type("x"), Some(int));
    assert_eq!(symbols.get_type("y"), None);

    // scopes survive popping and can be re-entered
    symbols.push_this_scope(local).unwrap();
    assert_eq!(symbols.get_type("y"), Some(int));
    let names: Vec<_> = symbols
        .scope(local)
        .unwrap()
        .symbols()
        .map(|(name, sym)| (name.to_string(), sym.kind))
        .collect();
    assert_eq!(
        names,
        vec![
            ("x".to_string(), SymbolKind::Parameter),
            ("y".to_string(), SymbolKind::Variable)
        ]
    );
}

#[test]
fn scope_stack_misuse_is_an_error() {
    let mut types = TypesMgr::new();
    let int = types.create_integer_ty();
    let mut symbols = SymTable::new();

    assert_eq!(symbols.pop_scope(), Err(SymTableError::ScopeUnderflow));
    assert_eq!(
        symbols.add_local_var("x", int),
        Err(SymTableError::ScopeUnderflow)
    );
    assert!(symbols.push_this_scope(aslc::symtable::ScopeId(3)).is_err());
    assert_eq!(
        symbols.current_function_ty(),
        Err(SymTableError::NoCurrentFunction)
    );
}

#[test]
fn main_must_be_a_parameterless_procedure() {
    let mut types = TypesMgr::new();
    let int = types.create_integer_ty();
    let void = types.create_void_ty();

    let mut symbols = SymTable::new();
    assert!(symbols.no_main_properly_declared(&types));
    symbols.push_new_scope("$global$");
    assert!(symbols.no_main_properly_declared(&types));

    let bad = types.create_function_ty(vec![int], void);
    symbols.add_function("main", bad).unwrap();
    assert!(symbols.no_main_properly_declared(&types));

    let mut symbols = SymTable::new();
    symbols.push_new_scope("$global$");
    let returns_int = types.create_function_ty(vec![], int);
    symbols.add_function("main", returns_int).unwrap();
    assert!(symbols.no_main_properly_declared(&types));

    let mut symbols = SymTable::new();
    symbols.push_new_scope("$global$");
    let good = types.create_function_ty(vec![], void);
    symbols.add_function("main", good).unwrap();
    assert!(!symbols.no_main_properly_declared(&types));
}

use pipette_core::environment::MarkerEnvironment;
use pipette_core::marker::{compare_markers, match_extra_marker, mentions_extra};
use pipette_util::errors::PipetteError;

fn linux_311() -> MarkerEnvironment {
    MarkerEnvironment {
        python_version: "3.11".to_string(),
        python_full_version: "3.11.4".to_string(),
        sys_platform: "linux".to_string(),
        platform_system: "Linux".to_string(),
        platform_machine: "x86_64".to_string(),
        os_name: "posix".to_string(),
        implementation_name: "cpython".to_string(),
        platform_python_implementation: "CPython".to_string(),
    }
}

#[test]
fn test_single_markers() {
    let env = linux_311();
    assert!(compare_markers("python_version >= '3.8'", &env).unwrap());
    assert!(!compare_markers("python_version == '3.0'", &env).unwrap());
    assert!(compare_markers("sys_platform == 'linux'", &env).unwrap());
    assert!(!compare_markers("sys_platform == 'some_unknown'", &env).unwrap());
    assert!(compare_markers("extra == 'some_extra'", &env).unwrap());
    assert!(compare_markers("python_full_version < \"3.11.5\"", &env).unwrap());
    assert!(compare_markers("platform_python_implementation != 'PyPy'", &env).unwrap());
}

#[test]
fn test_empty_expression_is_true() {
    assert!(compare_markers("", &linux_311()).unwrap());
    assert!(compare_markers("   ", &linux_311()).unwrap());
}

#[test]
fn test_grouped_expression() {
    let env = linux_311();
    assert!(compare_markers("(sys_platform == 'linux' and true) or false", &env).unwrap());
    assert!(!compare_markers("(sys_platform == 'win32' or false) and true", &env).unwrap());
    assert!(compare_markers(
        "((python_version < '3.9') or (sys_platform == 'linux'))",
        &env
    )
    .unwrap());
}

#[test]
fn test_left_to_right_fold() {
    let env = linux_311();
    // (true or false) and false
    assert!(!compare_markers("true or false and false", &env).unwrap());
    // (false and true) or true
    assert!(compare_markers("false and true or true", &env).unwrap());
    assert!(!compare_markers("extra == 'a' and true and false and true", &env).unwrap());
}

#[test]
fn test_reversed_operands() {
    let env = linux_311();
    assert!(compare_markers("'3.8' <= python_version", &env).unwrap());
    assert!(compare_markers("'linux' == sys_platform", &env).unwrap());
}

#[test]
fn test_membership() {
    let env = linux_311();
    assert!(compare_markers("sys_platform in 'linux darwin'", &env).unwrap());
    assert!(compare_markers("sys_platform not in 'win32 cygwin'", &env).unwrap());
}

#[test]
fn test_unknown_marker() {
    let err = compare_markers("unknown == 'value'", &linux_311()).unwrap_err();
    assert!(matches!(err, PipetteError::UnexpectedMarker { marker } if marker == "unknown"));
}

#[test]
fn test_unknown_marker_fails_even_when_short_circuitable() {
    let err = compare_markers("false and unknown == 'value'", &linux_311()).unwrap_err();
    assert!(matches!(err, PipetteError::UnexpectedMarker { .. }));
}

#[test]
fn test_unexpected_operator() {
    let env = linux_311();
    assert!(matches!(
        compare_markers("sys_platform ~= 'linux'", &env),
        Err(PipetteError::UnexpectedOperator { .. })
    ));
    assert!(matches!(
        compare_markers("python_version => '3.8'", &env),
        Err(PipetteError::UnexpectedOperator { .. })
    ));
}

#[test]
fn test_syntax_errors() {
    let env = linux_311();
    for expr in [
        "python_version >=",
        ">= '3.0'",
        "sys_platform == 'linux' and",
        "(sys_platform == 'linux'",
        "sys_platform == 'linux')",
        "sys_platform == 'linux' python_version >= '3'",
    ] {
        assert!(
            matches!(compare_markers(expr, &env), Err(PipetteError::Syntax { .. })),
            "{expr} should be a syntax error"
        );
    }
}

#[test]
fn test_match_extra_marker() {
    assert!(match_extra_marker("extra == 'test'", "test").unwrap());
    assert!(!match_extra_marker("extra == 'test'", "test2").unwrap());
    assert!(match_extra_marker(
        "(python_version < '3.8') and extra == 'Use_Chardet'",
        "use-chardet"
    )
    .unwrap());
    assert!(matches!(
        match_extra_marker("extra ==", ""),
        Err(PipetteError::Syntax { .. })
    ));
}

#[test]
fn test_mentions_extra() {
    assert!(mentions_extra("python_version >= '3' and extra == 'x'").unwrap());
    assert!(!mentions_extra("python_version >= '3'").unwrap());
}

#[test]
fn test_environment_evaluate() {
    assert!(linux_311()
        .evaluate("os_name == 'posix' and platform_machine == 'x86_64'")
        .unwrap());
}

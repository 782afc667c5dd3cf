//! Integration tests for the tree builder.

use smellcheck::parser::{build, Span};

#[test]
fn test_valid_sources_build() {
    let sources = [
        "",
        "\n\n",
        "# only a comment\n",
        "x = 1",
        "import os\nfrom typing import List\n",
        "async def fetch(url):\n    async with session.get(url) as r:\n        return await r.json()\n",
        "class A(B, metaclass=M):\n    @property\n    def x(self):\n        return self._x\n",
        "match cmd:\n    case [\"go\", d]:\n        move(d)\n    case _:\n        pass\n",
        "squares = [n * n for n in range(10) if n % 2]\n",
        "f = lambda *a, **k: (a, k)\n",
        "def g(x: int, /, y: str = \"\", *, z) -> None: ...\n",
        "print(\"hello\")\nexec(code)\nmode = 0o777\ndel cache[key], self.x\n",
        "try:\n    run()\nexcept ValueError as e:\n    raise RuntimeError(e) from e\n",
    ];

    for source in sources {
        let tree = build(source).unwrap_or_else(|e| panic!("{:?} should parse: {}", source, e));
        assert_eq!(tree.root().kind(), "module");
        assert_eq!(tree.source(), source);
    }
}

#[test]
fn test_root_spans_whole_input() {
    let source = "\n\ndef f():\n    return 2\n\n\n";
    let tree = build(source).expect("should parse");
    let span = tree.span();
    assert_eq!(span, Span::whole(source));
    assert_eq!(span.start_line, 1);
    assert_eq!(span.start_col, 1);
    assert_eq!(span.end_line, 7);
}

#[test]
fn test_invalid_sources_fail_with_syntax_error() {
    let sources = [
        "def f(:\n    pass\n",
        "x = (1, 2\n",
        "if True\n    pass\n",
        "return [1, 2,\n",
        "class :\n",
        "total =\n",
        "def f():\nreturn 1\n",
        "x = 1\n    y = 2\n",
        "def f():\n    a = 1\n      b = 2\n",
        "print \"hello\"\n",
        "exec \"x = 1\"\n",
        "x = 10L\n",
        "try:\n    pass\nexcept ValueError, e:\n    pass\n",
        "x = `y`\n",
        "raise E, 'msg'\n",
        "mode = 0777\n",
        "del f()\n",
    ];

    for source in sources {
        let err = build(source).expect_err(source);
        let syntax = err
            .as_syntax()
            .unwrap_or_else(|| panic!("{:?} should be a syntax error, got {}", source, err));
        assert!(syntax.line >= 1, "{:?}", source);
        assert!(syntax.column >= 1, "{:?}", source);
        assert!(err.to_string().contains("invalid Python syntax"));
    }
}

#[test]
fn test_syntax_error_points_at_offending_line() {
    let err = build("a = 1\nb = 2\nc = (3 +\n").unwrap_err();
    let syntax = err.as_syntax().expect("syntax error");
    assert!(syntax.line >= 3, "line was {}", syntax.line);
}

#[test]
fn test_node_navigation() {
    let tree = build("def area(w, h):\n    return w * h\n").expect("should parse");
    let func = tree
        .preorder()
        .find(|n| n.kind() == "function_definition")
        .expect("function");

    let name = func.child_by_field("name").expect("name");
    assert_eq!(name.text(), "area");
    assert_eq!((name.line(), name.column()), (1, 5));

    let ret = func
        .preorder()
        .find(|n| n.kind() == "return_statement")
        .expect("return");
    assert_eq!(ret.line(), 2);
    assert_eq!(ret.parent().map(|p| p.kind()), Some("block"));
    assert_eq!(
        ret.ancestor(|n| n.kind() == "function_definition"),
        Some(func)
    );
}

#[test]
fn test_preorder_is_deterministic() {
    let source = "for i in range(3):\n    if i:\n        print(i)\n";
    let kinds = || -> Vec<&'static str> {
        build(source)
            .expect("should parse")
            .preorder()
            .map(|n| n.kind())
            .collect()
    };
    let first = kinds();
    assert_eq!(first, kinds());
    assert_eq!(first[0], "module");
    assert_eq!(first[1], "for_statement");
}

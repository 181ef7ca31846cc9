use std::cell::Cell;
use std::fmt::Write as _;

use expect_test::{Expect, expect};
use lunette_inputs::LineIndex;
use lunette_parse::parse;
use lunette_syntax::TextSize;

use super::*;

fn run(
    text: &str,
    range: Option<TextRange>,
    cancel: &Cancellation,
) -> Result<Vec<SemanticToken>, Cancelled> {
    let parse = parse(text);
    let bindings = Bindings::build(parse.syntax_node());
    let line_index = LineIndex::new(text);
    let mapper = SpanMapper::new(text, &line_index, PositionEncoding::Utf16);
    highlight(parse.syntax_node(), &bindings, mapper, &HighlightConfig::default(), range, cancel)
}

fn assert_in_order(tokens: &[SemanticToken]) {
    for token in tokens {
        assert!(token.length > 0, "empty token {token}");
    }
    for pair in tokens.windows(2) {
        let [before, after] = pair else { unreachable!() };
        assert!(
            (before.line, before.column + before.length) <= (after.line, after.column),
            "{before} overlaps or follows {after}"
        );
    }
}

/// One line per token with the text it covers. Fixtures are ASCII, so
/// UTF-16 columns index characters.
fn render(text: &str, tokens: &[SemanticToken]) -> String {
    let lines = text.lines().collect::<Vec<_>>();
    let mut buf = String::new();
    for token in tokens {
        let covered = lines[token.line as usize]
            .chars()
            .skip(token.column as usize)
            .take(token.length as usize)
            .collect::<String>();
        _ = writeln!(buf, "{token} `{covered}`");
    }
    buf
}

#[track_caller]
fn check(text: &str, expect: Expect) {
    let tokens = run(text, None, &Cancellation::new()).unwrap();
    assert_in_order(&tokens);
    expect.assert_eq(&render(text, &tokens));
}

#[test]
fn reassigned_local() {
    check(
        "local x = 1\nx = 2\nprint(x)\n",
        expect![[r#"
            0:0 5 keyword `local`
            0:6 1 variable [declaration] `x`
            0:8 1 operator `=`
            0:10 1 number `1`
            1:0 1 variable `x`
            1:2 1 operator `=`
            1:4 1 number `2`
            2:0 5 function [static, defaultLibrary] `print`
            2:6 1 variable `x`
        "#]],
    );
}

#[test]
fn called_field() {
    check(
        "local foo = {}\nfoo.bar()\n",
        expect![[r#"
            0:0 5 keyword `local`
            0:6 3 variable [declaration, readonly] `foo`
            0:10 1 operator `=`
            1:0 3 variable [readonly] `foo`
            1:4 3 function `bar`
        "#]],
    );
}

#[test]
fn method_definition() {
    check(
        r#"local Stack = {}
function Stack:push(value)
  self.items[#self.items + 1] = value
end
"#,
        expect![[r#"
            0:0 5 keyword `local`
            0:6 5 variable [declaration, readonly] `Stack`
            0:12 1 operator `=`
            1:0 8 keyword `function`
            1:9 5 variable [readonly] `Stack`
            1:15 4 method [declaration] `push`
            1:20 5 variable [declaration, readonly] `value`
            2:2 4 variable [readonly] `self`
            2:7 5 property `items`
            2:13 1 operator `#`
            2:14 4 variable [readonly] `self`
            2:19 5 property `items`
            2:25 1 operator `+`
            2:27 1 number `1`
            2:30 1 operator `=`
            2:32 5 variable [readonly] `value`
            3:0 3 keyword `end`
        "#]],
    );
}

#[test]
fn globals_and_standard_library() {
    check(
        r#"count = 0
function bump() count = count + 1 end
print(string.format("%d", count), undefined)
"#,
        expect![[r#"
            0:0 5 variable [static] `count`
            0:6 1 operator `=`
            0:8 1 number `0`
            1:0 8 keyword `function`
            1:9 4 function [declaration, readonly, static] `bump`
            1:16 5 variable [static] `count`
            1:22 1 operator `=`
            1:24 5 variable [static] `count`
            1:30 1 operator `+`
            1:32 1 number `1`
            1:34 3 keyword `end`
            2:0 5 function [static, defaultLibrary] `print`
            2:6 6 type [static, defaultLibrary] `string`
            2:13 6 function `format`
            2:20 4 string `"%d"`
            2:26 5 variable [static] `count`
        "#]],
    );
}

#[test]
fn comments_and_multi_line_tokens() {
    check(
        r#"#!/usr/bin/env lua
-- line comment
local s = [[a
b]] --[[ block
comment ]]
"#,
        expect![[r#"
            0:0 18 comment `#!/usr/bin/env lua`
            1:0 15 comment `-- line comment`
            2:0 5 keyword `local`
            2:6 1 variable [declaration, readonly] `s`
            2:8 1 operator `=`
            2:10 3 string `[[a`
            3:0 3 string `b]]`
            3:4 10 comment `--[[ block`
            4:0 10 comment `comment ]]`
        "#]],
    );
}

#[test]
fn operators_outside_expressions() {
    check(
        "local x <const> = -1\nlocal y = x - 2\n",
        expect![[r#"
            0:0 5 keyword `local`
            0:6 1 variable [declaration, readonly] `x`
            0:16 1 operator `=`
            0:18 1 operator `-`
            0:19 1 number `1`
            1:0 5 keyword `local`
            1:6 1 variable [declaration, readonly] `y`
            1:8 1 operator `=`
            1:10 1 variable [readonly] `x`
            1:12 1 operator `-`
            1:14 1 number `2`
        "#]],
    );
}

#[test]
fn tables_and_logic() {
    check(
        r#"local t = { name = "lua", [1] = true, nil }
if not t.name and t[1] then return end
"#,
        expect![[r#"
            0:0 5 keyword `local`
            0:6 1 variable [declaration, readonly] `t`
            0:8 1 operator `=`
            0:12 4 property `name`
            0:17 1 operator `=`
            0:19 5 string `"lua"`
            0:27 1 number `1`
            0:30 1 operator `=`
            0:32 4 keyword `true`
            0:38 3 keyword `nil`
            1:0 2 keyword `if`
            1:3 3 operator `not`
            1:7 1 variable [readonly] `t`
            1:9 4 property `name`
            1:14 3 operator `and`
            1:18 1 variable [readonly] `t`
            1:20 1 number `1`
            1:23 4 keyword `then`
            1:28 6 keyword `return`
            1:35 3 keyword `end`
        "#]],
    );
}

#[test]
fn loops() {
    check(
        "for i = 1, 3 do print(i) end\nfor k, v in pairs(t) do end\n",
        expect![[r#"
            0:0 3 keyword `for`
            0:4 1 variable [declaration, readonly] `i`
            0:6 1 operator `=`
            0:8 1 number `1`
            0:11 1 number `3`
            0:13 2 keyword `do`
            0:16 5 function [static, defaultLibrary] `print`
            0:22 1 variable [readonly] `i`
            0:25 3 keyword `end`
            1:0 3 keyword `for`
            1:4 1 variable [declaration, readonly] `k`
            1:7 1 variable [declaration, readonly] `v`
            1:9 2 keyword `in`
            1:12 5 function [static, defaultLibrary] `pairs`
            1:21 2 keyword `do`
            1:24 3 keyword `end`
        "#]],
    );
}

#[test]
fn local_shadows_standard_name() {
    check(
        "local function print(...) return ... end\nprint(1)\n",
        expect![[r#"
            0:0 5 keyword `local`
            0:6 8 keyword `function`
            0:15 5 function [declaration, readonly] `print`
            0:26 6 keyword `return`
            0:37 3 keyword `end`
            1:0 5 function [readonly] `print`
            1:6 1 number `1`
        "#]],
    );
}

#[test]
fn lua54_names_only() {
    check(
        "warn('@on')\nprint(unpack)\n_G.x = 1\n",
        expect![[r#"
            0:0 4 function [static, defaultLibrary] `warn`
            0:5 5 string `'@on'`
            1:0 5 function [static, defaultLibrary] `print`
            2:0 2 type [static, defaultLibrary] `_G`
            2:3 1 property `x`
            2:5 1 operator `=`
            2:7 1 number `1`
        "#]],
    );
}

#[test]
fn unresolved_callees() {
    // Unknown callees are left alone, and a called library table stays a type.
    check(
        "undefined_fn(1)\nstring(1)\n",
        expect![[r#"
            0:13 1 number `1`
            1:0 6 type [static, defaultLibrary] `string`
            1:7 1 number `1`
        "#]],
    );
}

#[test]
fn comments_in_declarations_stay_plain() {
    check(
        "local\n--[[ doc ]] x = 1\n",
        expect![[r#"
            0:0 5 keyword `local`
            1:0 11 comment `--[[ doc ]]`
            1:12 1 variable [declaration, readonly] `x`
            1:14 1 operator `=`
            1:16 1 number `1`
        "#]],
    );
}

#[test]
fn readonly_follows_write_count() {
    let text = "local a\nlocal b = 1\nlocal c = 1\nc = 2\nreturn a, b, c\n";
    let tokens = run(text, None, &Cancellation::new()).unwrap();
    let last_line = tokens.iter().filter(|token| token.line == 4);
    let readonly = last_line
        .filter(|token| token.token_type == SemanticTokenType::Variable)
        .map(|token| token.modifiers.contains(SemanticTokenModifier::READONLY))
        .collect::<Vec<_>>();
    assert_eq!(readonly, [true, true, false]);
}

#[test]
fn broken_code_still_highlights() {
    let text = "local x = = 1\nfunction (\nprint(x\n";
    let tokens = run(text, None, &Cancellation::new()).unwrap();
    assert_in_order(&tokens);
    assert_eq!(tokens[0].to_string(), "0:0 5 keyword");
}

#[test]
fn range_limits_reported_tokens() {
    let text = "local a = 1\nlocal b = 2\nlocal c = 3\n";
    let second_line = TextRange::new(TextSize::new(12), TextSize::new(23));
    let tokens = run(text, Some(second_line), &Cancellation::new()).unwrap();
    expect![[r#"
        1:0 5 keyword `local`
        1:6 1 variable [declaration, readonly] `b`
        1:8 1 operator `=`
        1:10 1 number `2`
    "#]]
    .assert_eq(&render(text, &tokens));
}

#[test]
fn range_excludes_adjacent_tokens() {
    let text = "local a = 1\nlocal b = 2\n";
    // Starts where `1` ends and ends where `b` starts.
    let range = TextRange::new(TextSize::new(11), TextSize::new(18));
    let tokens = run(text, Some(range), &Cancellation::new()).unwrap();
    expect![[r#"
        1:0 5 keyword `local`
    "#]]
    .assert_eq(&render(text, &tokens));
}

#[test]
fn cancelled_before_start() {
    let cancel = Cancellation::new();
    cancel.cancel();
    assert_eq!(run("local x = 1\nprint(x)\n", None, &cancel), Err(Cancelled));
}

#[test]
fn resolver_decides_variables() {
    struct Nothing;

    impl ResolveVariable for Nothing {
        fn resolve(&self, _: SyntaxNode<'_>) -> Option<&VariableInfo> {
            None
        }
    }

    let text = "local x = 1\nprint(x)\n";
    let parse = parse(text);
    let line_index = LineIndex::new(text);
    let mapper = SpanMapper::new(text, &line_index, PositionEncoding::Utf16);
    let config = HighlightConfig::default();
    let tokens =
        highlight(parse.syntax_node(), &Nothing, mapper, &config, None, &Cancellation::new())
            .unwrap();

    // Without bindings only standard names remain.
    let names = tokens
        .iter()
        .filter(|token| {
            !matches!(
                token.token_type,
                SemanticTokenType::Keyword | SemanticTokenType::Operator | SemanticTokenType::Number
            )
        })
        .map(ToString::to_string)
        .collect::<Vec<_>>();
    assert_eq!(names, ["1:0 5 function [static, defaultLibrary]"]);
}

#[test]
fn cancelled_mid_walk() {
    struct CancelOnResolve<'a> {
        bindings: Bindings,
        cancel: &'a Cancellation,
        calls: Cell<usize>,
    }

    impl ResolveVariable for CancelOnResolve<'_> {
        fn resolve(&self, node: SyntaxNode<'_>) -> Option<&VariableInfo> {
            self.calls.set(self.calls.get() + 1);
            self.cancel.cancel();
            self.bindings.resolve(node)
        }
    }

    // Nothing between the first name and `return x` is a call or a
    // declaration, so only the per-node check can stop the walk.
    let text = "local x = 1 + (2 * 3)\nreturn x\n";
    let parse = parse(text);
    let cancel = Cancellation::new();
    let resolver = CancelOnResolve {
        bindings: Bindings::build(parse.syntax_node()),
        cancel: &cancel,
        calls: Cell::new(0),
    };
    let line_index = LineIndex::new(text);
    let mapper = SpanMapper::new(text, &line_index, PositionEncoding::Utf16);
    let config = HighlightConfig::default();

    let result = highlight(parse.syntax_node(), &resolver, mapper, &config, None, &cancel);
    assert_eq!(result, Err(Cancelled));
    assert_eq!(resolver.calls.get(), 1);
}

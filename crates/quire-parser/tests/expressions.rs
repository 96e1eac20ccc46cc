use quire_parser::{parse, parse_function_def, wire};
use quire_builtins::StatementKind;

const SEP: char = wire::RPN_SEP;

fn rpn(input: &str) -> String {
    parse(input, true).unwrap().1
}

fn tokens(program: &str) -> Vec<String> {
    program.split(SEP).map(str::to_string).collect()
}

#[test]
fn shunting_yard_respects_precedence() {
    assert_eq!(
        tokens(&rpn("2 + 3 \u{00d7} 4")),
        vec!["\u{00ae}2/1", "\u{00ae}3/1", "\u{00ae}4/1", "\u{00d7}", "+"]
    );
    assert_eq!(
        tokens(&rpn("(2 + 3) \u{00d7} 4")),
        vec!["\u{00ae}2/1", "\u{00ae}3/1", "+", "\u{00ae}4/1", "\u{00d7}"]
    );
}

#[test]
fn exponentiation_is_right_associative() {
    assert_eq!(
        tokens(&rpn("2^3^2")),
        vec!["\u{00ae}2/1", "\u{00ae}3/1", "\u{00ae}2/1", "^", "^"]
    );
}

#[test]
fn unary_minus_binds_below_the_exponent() {
    assert_eq!(
        tokens(&rpn("-2^2")),
        vec!["\u{00ae}2/1", "\u{00ae}2/1", "^", "~"]
    );
}

#[test]
fn implicit_multiplication_matches_explicit() {
    assert_eq!(rpn("2a"), rpn("2 \u{00d7} a"));
    assert_eq!(rpn("(2)(3)"), rpn("2 \u{00d7} 3"));
    assert_eq!(rpn("2 a b"), rpn("2 \u{00d7} a \u{00d7} b"));
}

#[test]
fn implicit_multiplication_binds_tighter_than_division() {
    // 1/2a reads as 1/(2·a) in the program text.
    assert_eq!(
        tokens(&rpn("1/2a")),
        vec![
            "\u{00ae}1/1",
            "\u{00ae}2/1",
            "\u{00bf}a",
            "\u{00d7}",
            "/"
        ]
    );
}

#[test]
fn chained_comparisons_stay_flat() {
    assert_eq!(
        tokens(&rpn("1 < 2 < 3")),
        vec!["\u{00ae}1/1", "\u{00ae}2/1", "<", "\u{00ae}3/1", "<"]
    );
}

#[test]
fn function_calls_carry_their_arity() {
    assert_eq!(tokens(&rpn("sin(x)")), vec!["\u{00bf}x", "sin"]);
    assert_eq!(
        tokens(&rpn("f(x, y)")),
        vec!["\u{00bf}x", "\u{00bf}y", "function", "f", "2"]
    );
    assert_eq!(
        tokens(&rpn("max(1, 2, 3)")),
        vec![
            "\u{00ae}1/1",
            "\u{00ae}2/1",
            "\u{00ae}3/1",
            "function",
            "max",
            "3"
        ]
    );
}

#[test]
fn function_exponent_sugar() {
    // sin²(x) squares the call result.
    assert_eq!(
        tokens(&rpn("sin\u{00b2}(x)")),
        vec!["\u{00bf}x", "sin", "\u{00ae}2/1", "^"]
    );
    // sin⁻¹(x) is the inverse function, recognized by syntax.
    assert_eq!(
        tokens(&rpn("sin\u{207b}\u{00b9}(x)")),
        vec!["\u{00bf}x", "asin"]
    );
}

#[test]
fn matrices_are_reclassified_on_separators() {
    assert_eq!(
        tokens(&rpn("(1, 2; 3, 4)")),
        vec![
            "\u{00ae}1/1",
            "\u{00ae}2/1",
            "\u{00ae}3/1",
            "\u{00ae}4/1",
            "matrix",
            "2",
            "2"
        ]
    );
    assert_eq!(
        tokens(&rpn("(5, 6, 7)")),
        vec![
            "\u{00ae}5/1",
            "\u{00ae}6/1",
            "\u{00ae}7/1",
            "matrix",
            "1",
            "3"
        ]
    );
}

#[test]
fn ragged_matrix_rows_are_rejected() {
    assert!(parse("(1, 2; 3)", true).is_err());
}

#[test]
fn accessor_brackets_carry_argument_counts() {
    assert_eq!(
        tokens(&rpn("v[2]")),
        vec!["\u{00bf}v", "\u{00ae}2/1", "[]", "1"]
    );
    assert_eq!(
        tokens(&rpn("M[1, 2]")),
        vec!["\u{00bf}M", "\u{00ae}1/1", "\u{00ae}2/1", "[]", "2"]
    );
}

#[test]
fn cases_keep_branches_lazy() {
    let program = rpn("{1/0 if false; 5 otherwise}");
    let toks = tokens(&program);
    assert_eq!(toks[0], "false");
    assert_eq!(toks[1], "true");
    assert_eq!(toks[2], "cases");
    assert_eq!(toks[3], "2");
    // Branch slices use the alternate separator internally.
    assert!(toks[4].contains(wire::BRANCH_SEP));
    assert_eq!(
        wire::unembed_branch(&toks[4]),
        format!("\u{00ae}1/1{SEP}\u{00ae}0/1{SEP}/")
    );
    assert_eq!(toks[5], "\u{00ae}5/1");
}

#[test]
fn nested_cases_are_rejected() {
    assert!(parse("{{1 if a; 2 otherwise} if b; 3 otherwise}", true).is_err());
}

#[test]
fn quantity_literals_emit_apply_unit() {
    assert_eq!(
        tokens(&rpn("'3 m' + '2 s'")),
        vec![
            "\u{00ae}3/1",
            "applyUnit",
            "m",
            "\u{00ae}2/1",
            "applyUnit",
            "s",
            "+"
        ]
    );
    // A bare unit applies to the preceding factor.
    assert_eq!(
        tokens(&rpn("9.807 'm/s\u{00b2}'")),
        vec!["\u{00ae}9807/1000", "applyUnit", "m/s\u{00b2}"]
    );
}

#[test]
fn assignment_prefix_is_display_only() {
    let (render, program) = parse("x = 2 + 2", true).unwrap();
    assert!(render.starts_with("x = "));
    assert_eq!(
        tokens(&program),
        vec!["\u{00ae}2/1", "\u{00ae}2/1", "+"]
    );
}

#[test]
fn render_only_mode_produces_no_program() {
    let (render, program) = parse("2 + 2", false).unwrap();
    assert!(!render.is_empty());
    assert!(program.is_empty());
}

#[test]
fn outstanding_delimiters_close_at_the_end() {
    // Per the compiler contract, an unclosed group is closed, not
    // rejected.
    let program = rpn("2 \u{00d7} (3 + 4");
    assert_eq!(
        tokens(&program),
        vec!["\u{00ae}2/1", "\u{00ae}3/1", "\u{00ae}4/1", "+", "\u{00d7}"]
    );
}

#[test]
fn function_definitions_build_flat_statement_lists() {
    let func = parse_function_def(
        "function sumto(n)\n\
         total = 0\n\
         i = 1\n\
         while i <= n\n\
         total = total + i\n\
         i = i + 1\n\
         end\n\
         return total\n\
         end",
    )
    .unwrap();
    assert_eq!(func.name, "sumto");
    assert_eq!(func.params, vec!["n".to_string()]);
    assert_eq!(func.statements[2].kind, StatementKind::While);
    // The while opener records the index of its matching end.
    assert_eq!(func.statements[2].end_index, 5);
    assert_eq!(func.statements[5].kind, StatementKind::End);
    assert_eq!(func.statements[6].kind, StatementKind::Return);
}

#[test]
fn else_if_chains_share_one_end() {
    let func = parse_function_def(
        "function grade(x)\n\
         if x >= 90\n\
         g = \"A\"\n\
         else if x >= 80\n\
         g = \"B\"\n\
         else\n\
         g = \"C\"\n\
         end\n\
         return g\n\
         end",
    )
    .unwrap();
    let end_idx = func.statements[0].end_index;
    assert_eq!(func.statements[end_idx].kind, StatementKind::End);
    assert_eq!(func.statements[2].kind, StatementKind::ElseIf);
    assert_eq!(func.statements[2].end_index, end_idx);
    assert_eq!(func.statements[4].kind, StatementKind::Else);
    assert_eq!(func.statements[4].end_index, end_idx);
}

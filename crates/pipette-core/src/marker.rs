//! Environment marker evaluation (`python_version >= '3.8' and extra == 'socks'`).
//!
//! Evaluation rewrites the innermost parenthesized group to a `true`/`false`
//! literal until no parentheses remain, then folds the flat list of operands
//! strictly left to right. `and` and `or` have the same precedence here:
//! `a or b and c` is `(a or b) and c`, unlike Python.
//!
//! Every operand is evaluated before folding, so an unknown marker is an error
//! even when the result would not depend on it.

use pipette_util::errors::PipetteError;

use crate::condition::normalize_name;
use crate::environment::MarkerEnvironment;
use crate::version::compare_version;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Word(String),
    Quoted(String),
    Op(String),
    And,
    Or,
    Bool(bool),
}

/// One side of a comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Side {
    Marker(String),
    Literal(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Comparison {
    left: Side,
    op: String,
    right: Side,
}

impl Comparison {
    fn marker(&self) -> &str {
        match (&self.left, &self.right) {
            (Side::Marker(m), _) | (_, Side::Marker(m)) => m,
            _ => "",
        }
    }

    fn literal(&self) -> &str {
        match (&self.left, &self.right) {
            (Side::Literal(v), _) | (_, Side::Literal(v)) => v,
            _ => "",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Operand {
    Literal(bool),
    Compare(Comparison),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Logic {
    And,
    Or,
}

/// What a marker name refers to in the environment.
#[derive(Clone, Copy)]
enum MarkerValue<'a> {
    Version(&'a str),
    Text(&'a str),
    Extra,
}

fn is_op_char(c: char) -> bool {
    matches!(c, '<' | '>' | '=' | '!' | '~')
}

fn tokenize(expr: &str) -> Result<Vec<Token>, PipetteError> {
    let mut tokens = Vec::new();
    let mut chars = expr.chars().peekable();

    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
        } else if c == '\'' || c == '"' {
            chars.next();
            let mut value = String::new();
            loop {
                match chars.next() {
                    Some(q) if q == c => break,
                    Some(other) => value.push(other),
                    None => return Err(PipetteError::syntax(expr)),
                }
            }
            tokens.push(Token::Quoted(value));
        } else if is_op_char(c) {
            let mut op = String::new();
            while let Some(&o) = chars.peek() {
                if !is_op_char(o) {
                    break;
                }
                op.push(o);
                chars.next();
            }
            tokens.push(Token::Op(op));
        } else if c == '(' || c == ')' {
            return Err(PipetteError::syntax(expr));
        } else {
            let mut word = String::new();
            while let Some(&w) = chars.peek() {
                if w.is_whitespace() || is_op_char(w) || matches!(w, '\'' | '"' | '(' | ')') {
                    break;
                }
                word.push(w);
                chars.next();
            }
            tokens.push(match word.as_str() {
                "and" => Token::And,
                "or" => Token::Or,
                "true" => Token::Bool(true),
                "false" => Token::Bool(false),
                "in" => Token::Op("in".to_string()),
                "not" => Token::Op("not".to_string()),
                _ => Token::Word(word),
            });
        }
    }

    // `not in` arrives as two operator tokens
    let mut merged: Vec<Token> = Vec::with_capacity(tokens.len());
    for token in tokens {
        if let (Some(Token::Op(prev)), Token::Op(next)) = (merged.last_mut(), &token) {
            if prev == "not" && next == "in" {
                *prev = "not in".to_string();
                continue;
            }
        }
        merged.push(token);
    }
    Ok(merged)
}

fn side(token: Option<Token>, expr: &str) -> Result<Side, PipetteError> {
    match token {
        Some(Token::Word(w)) => Ok(Side::Marker(w)),
        Some(Token::Quoted(v)) => Ok(Side::Literal(v)),
        _ => Err(PipetteError::syntax(expr)),
    }
}

/// Split a parenthesis-free expression into operands and the logical
/// operators between them.
fn parse_flat(expr: &str) -> Result<(Vec<Operand>, Vec<Logic>), PipetteError> {
    let mut tokens = tokenize(expr)?.into_iter();
    let mut operands = Vec::new();
    let mut logic = Vec::new();

    loop {
        let operand = match tokens.next() {
            None if operands.is_empty() => break,
            Some(Token::Bool(b)) => Operand::Literal(b),
            first @ Some(Token::Word(_) | Token::Quoted(_)) => {
                let left = side(first, expr)?;
                let op = match tokens.next() {
                    Some(Token::Op(op)) => op,
                    _ => return Err(PipetteError::syntax(expr)),
                };
                let right = side(tokens.next(), expr)?;
                if matches!((&left, &right), (Side::Marker(_), Side::Marker(_)))
                    || matches!((&left, &right), (Side::Literal(_), Side::Literal(_)))
                {
                    return Err(PipetteError::syntax(expr));
                }
                Operand::Compare(Comparison { left, op, right })
            }
            _ => return Err(PipetteError::syntax(expr)),
        };
        operands.push(operand);

        match tokens.next() {
            None => break,
            Some(Token::And) => logic.push(Logic::And),
            Some(Token::Or) => logic.push(Logic::Or),
            Some(_) => return Err(PipetteError::syntax(expr)),
        }
    }

    Ok((operands, logic))
}

fn lookup<'a>(env: &'a MarkerEnvironment, marker: &str) -> Result<MarkerValue<'a>, PipetteError> {
    Ok(match marker {
        "python_version" => MarkerValue::Version(&env.python_version),
        "python_full_version" => MarkerValue::Version(&env.python_full_version),
        "extra" => MarkerValue::Extra,
        "sys_platform" => MarkerValue::Text(&env.sys_platform),
        "platform_system" => MarkerValue::Text(&env.platform_system),
        "platform_machine" => MarkerValue::Text(&env.platform_machine),
        "os_name" => MarkerValue::Text(&env.os_name),
        "implementation_name" => MarkerValue::Text(&env.implementation_name),
        "platform_python_implementation" => {
            MarkerValue::Text(&env.platform_python_implementation)
        }
        _ => {
            return Err(PipetteError::UnexpectedMarker {
                marker: marker.to_string(),
            })
        }
    })
}

fn evaluate_comparison(cmp: &Comparison, env: &MarkerEnvironment) -> Result<bool, PipetteError> {
    let value = lookup(env, cmp.marker())?;
    let env_value = match value {
        // extra membership is decided by `match_extra_marker`
        MarkerValue::Extra => return Ok(true),
        MarkerValue::Version(v) | MarkerValue::Text(v) => v,
    };
    let resolve = |s: &Side| match s {
        Side::Marker(_) => env_value.to_string(),
        Side::Literal(v) => v.clone(),
    };
    let (left, right) = (resolve(&cmp.left), resolve(&cmp.right));

    match (value, cmp.op.as_str()) {
        (_, "in") => Ok(right.contains(left.as_str())),
        (_, "not in") => Ok(!right.contains(left.as_str())),
        (MarkerValue::Version(_), op) => compare_version(&left, op, &right),
        (_, "==") => Ok(left == right),
        (_, "!=") => Ok(left != right),
        (_, op) => Err(PipetteError::UnexpectedOperator {
            operator: op.to_string(),
        }),
    }
}

/// Evaluate a parenthesis-free expression.
fn evaluate_flat(expr: &str, env: &MarkerEnvironment) -> Result<bool, PipetteError> {
    let (operands, logic) = parse_flat(expr)?;
    if operands.is_empty() {
        return Ok(true);
    }

    let results = operands
        .iter()
        .map(|operand| match operand {
            Operand::Literal(b) => Ok(*b),
            Operand::Compare(cmp) => evaluate_comparison(cmp, env),
        })
        .collect::<Result<Vec<bool>, PipetteError>>()?;

    let mut acc = results[0];
    for (logic, next) in logic.iter().zip(&results[1..]) {
        acc = match logic {
            Logic::And => acc && *next,
            Logic::Or => acc || *next,
        };
    }
    Ok(acc)
}

/// Byte offsets of the first closing parenthesis and the opening one nearest
/// before it, or `None` when the expression has no parentheses left.
fn innermost_group(expr: &str) -> Result<Option<(usize, usize)>, PipetteError> {
    let mut open = None;
    for (i, c) in expr.char_indices() {
        match c {
            '(' => open = Some(i),
            ')' => {
                return match open {
                    Some(start) => Ok(Some((start, i))),
                    None => Err(PipetteError::syntax(expr)),
                }
            }
            _ => {}
        }
    }
    match open {
        Some(_) => Err(PipetteError::syntax(expr)),
        None => Ok(None),
    }
}

/// Evaluate a full marker expression against `env`. An empty expression is true.
pub fn compare_markers(expr: &str, env: &MarkerEnvironment) -> Result<bool, PipetteError> {
    let mut expr = expr.to_string();
    while let Some((start, end)) = innermost_group(&expr)? {
        let result = evaluate_flat(&expr[start + 1..end], env)?;
        expr = format!("{} {} {}", &expr[..start], result, &expr[end + 1..]);
    }
    evaluate_flat(&expr, env)
}

/// Check whether the expression contains an `extra == '<extra>'` clause,
/// ignoring grouping and the logical operators. Names are compared after
/// normalisation.
pub fn match_extra_marker(expr: &str, extra: &str) -> Result<bool, PipetteError> {
    let wanted = normalize_name(extra);
    Ok(extra_clauses(expr)?
        .iter()
        .any(|cmp| cmp.op == "==" && normalize_name(cmp.literal()) == wanted))
}

/// Whether any clause of the expression tests the `extra` marker.
pub fn mentions_extra(expr: &str) -> Result<bool, PipetteError> {
    Ok(!extra_clauses(expr)?.is_empty())
}

fn extra_clauses(expr: &str) -> Result<Vec<Comparison>, PipetteError> {
    let flat: String = expr.chars().filter(|c| *c != '(' && *c != ')').collect();
    let (operands, _) = parse_flat(&flat)?;
    Ok(operands
        .into_iter()
        .filter_map(|operand| match operand {
            Operand::Compare(cmp) if cmp.marker() == "extra" => Some(cmp),
            _ => None,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenizes_attached_operators() {
        let tokens = tokenize("python_version>='3.6'").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Word("python_version".to_string()),
                Token::Op(">=".to_string()),
                Token::Quoted("3.6".to_string()),
            ]
        );
    }

    #[test]
    fn merges_not_in() {
        let tokens = tokenize("sys_platform not in 'win32 cygwin'").unwrap();
        assert_eq!(tokens[1], Token::Op("not in".to_string()));
    }

    #[test]
    fn parses_operands_and_logic() {
        let (operands, logic) =
            parse_flat("test >= '1.0' and test2 != '3' or test3 > 'some_var'").unwrap();
        assert_eq!(operands.len(), 3);
        assert_eq!(logic, vec![Logic::And, Logic::Or]);

        let (operands, logic) = parse_flat("true and true").unwrap();
        assert_eq!(operands, vec![Operand::Literal(true), Operand::Literal(true)]);
        assert_eq!(logic, vec![Logic::And]);

        let (operands, _) = parse_flat("").unwrap();
        assert!(operands.is_empty());
    }

    #[test]
    fn rejects_incomplete_comparisons() {
        for expr in [
            "test >=",
            "<= '3.0'",
            ">=",
            "test >= '3.0' and test >=",
            "true and",
            "true true",
            "== 'test' extra == 'socks'",
            "'a' == 'b'",
            "extra == 'x",
        ] {
            assert!(
                matches!(parse_flat(expr), Err(PipetteError::Syntax { .. })),
                "{expr} should be rejected"
            );
        }
    }

    #[test]
    fn innermost_group_positions() {
        assert_eq!(innermost_group("()").unwrap(), Some((0, 1)));
        assert_eq!(innermost_group("((()))").unwrap(), Some((2, 3)));
        assert_eq!(innermost_group("no groups").unwrap(), None);
        assert!(innermost_group("((((").is_err());
        assert!(innermost_group(") and (").is_err());
    }
}

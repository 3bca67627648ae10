//! Filter parser using nom
//!
//! Parses filter strings into condition triples.

use nom::{
    branch::alt,
    bytes::complete::{tag, tag_no_case, take_while1},
    character::complete::{char, digit1, multispace0, multispace1, none_of},
    combinator::{map, opt, value},
    multi::{many0, separated_list0},
    sequence::{delimited, preceded, tuple},
    IResult,
};

use crate::ast::{Condition, Literal, Operator};
use crate::error::ParseError;

/// Parse a complete filter: zero or more conditions joined with `and`.
pub fn parse_filter(input: &str) -> Result<Vec<Condition>, ParseError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }

    let (remaining, conditions) = filter(trimmed)?;

    let remaining = remaining.trim();
    if !remaining.is_empty() {
        return Err(ParseError::new(format!(
            "Unexpected trailing content: {}",
            remaining
        )));
    }

    Ok(conditions)
}

fn filter(input: &str) -> IResult<&str, Vec<Condition>> {
    let (input, first) = condition(input)?;
    let (input, rest) = many0(preceded(
        tuple((multispace1, tag_no_case("and"), multispace1)),
        condition,
    ))(input)?;

    let mut conditions = vec![first];
    conditions.extend(rest);
    Ok((input, conditions))
}

fn condition(input: &str) -> IResult<&str, Condition> {
    alt((in_condition, contains_condition, like_condition, comparison))(input)
}

fn comparison(input: &str) -> IResult<&str, Condition> {
    let (input, field) = field_name(input)?;
    let (input, _) = multispace0(input)?;
    let (input, op) = comparison_operator(input)?;
    let (input, _) = multispace0(input)?;
    let (input, val) = literal(input)?;

    Ok((input, Condition::new(field, op, val)))
}

fn comparison_operator(input: &str) -> IResult<&str, Operator> {
    alt((
        value(Operator::Eq, tag("==")),
        value(Operator::Ne, tag("!=")),
        value(Operator::Le, tag("<=")),
        value(Operator::Lt, tag("<")),
        value(Operator::Ge, tag(">=")),
        value(Operator::Gt, tag(">")),
    ))(input)
}

fn in_condition(input: &str) -> IResult<&str, Condition> {
    let (input, field) = field_name(input)?;
    let (input, _) = multispace1(input)?;
    let (input, negated) = opt(tuple((tag_no_case("not"), multispace1)))(input)?;
    let (input, _) = tag_no_case("in")(input)?;
    let (input, _) = multispace0(input)?;
    let (input, values) = array_literal(input)?;

    let op = if negated.is_some() {
        Operator::NotIn
    } else {
        Operator::In
    };
    Ok((input, Condition::new(field, op, Literal::Array(values))))
}

fn contains_condition(input: &str) -> IResult<&str, Condition> {
    let (input, field) = field_name(input)?;
    let (input, _) = multispace1(input)?;
    let (input, _) = tag_no_case("contains")(input)?;
    let (input, _) = multispace1(input)?;
    let (input, val) = literal(input)?;

    Ok((input, Condition::new(field, Operator::Contains, val)))
}

fn like_condition(input: &str) -> IResult<&str, Condition> {
    let (input, field) = field_name(input)?;
    let (input, _) = multispace1(input)?;
    let (input, _) = tag_no_case("like")(input)?;
    let (input, _) = multispace1(input)?;
    let (input, pattern) = string_literal(input)?;

    Ok((
        input,
        Condition::new(field, Operator::Like, Literal::String(pattern)),
    ))
}

// ============================================================================
// Primitives
// ============================================================================

fn field_name(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_alphanumeric() || c == '_' || c == '-')(input)
}

fn literal(input: &str) -> IResult<&str, Literal> {
    alt((
        value(Literal::Null, tag_no_case("null")),
        value(Literal::Bool(true), tag_no_case("true")),
        value(Literal::Bool(false), tag_no_case("false")),
        map(float_literal, Literal::Float),
        map(integer_literal, Literal::Int),
        map(string_literal, Literal::String),
        map(array_literal, Literal::Array),
    ))(input)
}

fn integer_literal(input: &str) -> IResult<&str, i64> {
    let (input, neg) = opt(char('-'))(input)?;
    let (input, digits) = digit1(input)?;
    let val: i64 = digits.parse().unwrap_or(0);
    Ok((input, if neg.is_some() { -val } else { val }))
}

fn float_literal(input: &str) -> IResult<&str, f64> {
    let (input, neg) = opt(char('-'))(input)?;
    let (input, int_part) = digit1(input)?;
    let (input, _) = char('.')(input)?;
    let (input, frac_part) = digit1(input)?;
    let val: f64 = format!("{}.{}", int_part, frac_part).parse().unwrap_or(0.0);
    Ok((input, if neg.is_some() { -val } else { val }))
}

fn string_literal(input: &str) -> IResult<&str, String> {
    alt((
        delimited(
            char('\''),
            map(
                many0(alt((
                    map(tag("''"), |_| "'".to_string()),
                    map(none_of("'"), |c| c.to_string()),
                ))),
                |v| v.join(""),
            ),
            char('\''),
        ),
        delimited(
            char('"'),
            map(
                many0(alt((
                    map(tag("\\\""), |_| "\"".to_string()),
                    map(tag("\\n"), |_| "\n".to_string()),
                    map(tag("\\t"), |_| "\t".to_string()),
                    map(tag("\\\\"), |_| "\\".to_string()),
                    map(none_of("\"\\"), |c| c.to_string()),
                ))),
                |v| v.join(""),
            ),
            char('"'),
        ),
    ))(input)
}

fn array_literal(input: &str) -> IResult<&str, Vec<Literal>> {
    delimited(
        char('['),
        separated_list0(tuple((multispace0, char(','), multispace0)), literal),
        char(']'),
    )(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_equality() {
        let conds = parse_filter("yearLevel == \"2nd Year\"").unwrap();
        assert_eq!(conds.len(), 1);
        assert_eq!(conds[0].field, "yearLevel");
        assert_eq!(conds[0].op, Operator::Eq);
        assert_eq!(conds[0].value, Literal::String("2nd Year".into()));
    }

    #[test]
    fn test_parse_single_quotes_with_escape() {
        let conds = parse_filter("name == 'O''Brien'").unwrap();
        assert_eq!(conds[0].value, Literal::String("O'Brien".into()));
    }

    #[test]
    fn test_parse_numeric_comparisons() {
        let conds = parse_filter("credits >= 3 and gpa < 2.5").unwrap();
        assert_eq!(conds.len(), 2);
        assert_eq!(conds[0].op, Operator::Ge);
        assert_eq!(conds[0].value, Literal::Int(3));
        assert_eq!(conds[1].op, Operator::Lt);
        assert_eq!(conds[1].value, Literal::Float(2.5));
    }

    #[test]
    fn test_parse_in() {
        let conds = parse_filter("course in [\"BS CS\", \"BS IT\"]").unwrap();
        assert_eq!(conds[0].op, Operator::In);
        if let Literal::Array(items) = &conds[0].value {
            assert_eq!(items.len(), 2);
        } else {
            panic!("Expected Array");
        }
    }

    #[test]
    fn test_parse_not_in() {
        let conds = parse_filter("status not in ['dropped']").unwrap();
        assert_eq!(conds[0].op, Operator::NotIn);
    }

    #[test]
    fn test_parse_contains() {
        let conds = parse_filter("tags contains 'honors'").unwrap();
        assert_eq!(conds[0].op, Operator::Contains);
        assert_eq!(conds[0].value, Literal::String("honors".into()));
    }

    #[test]
    fn test_parse_like() {
        let conds = parse_filter("email like '%@g.msuiit.edu.ph'").unwrap();
        assert_eq!(conds[0].op, Operator::Like);
    }

    #[test]
    fn test_parse_conjunction() {
        let conds =
            parse_filter("yearLevel == '2nd Year' and course == 'BS Computer Science'").unwrap();
        assert_eq!(conds.len(), 2);
        assert_eq!(conds[0].field, "yearLevel");
        assert_eq!(conds[1].field, "course");
    }

    #[test]
    fn test_parse_empty_is_match_all() {
        assert!(parse_filter("").unwrap().is_empty());
        assert!(parse_filter("   ").unwrap().is_empty());
    }

    #[test]
    fn test_parse_rejects_trailing_garbage() {
        assert!(parse_filter("name == 'x' garbage").is_err());
    }

    #[test]
    fn test_parse_rejects_bare_field() {
        assert!(parse_filter("name").is_err());
    }

    #[test]
    fn test_parse_bool_and_null() {
        let conds = parse_filter("active == true and middleName == null").unwrap();
        assert_eq!(conds[0].value, Literal::Bool(true));
        assert_eq!(conds[1].value, Literal::Null);
    }
}

// SPDX-FileCopyrightText: 2025 Daniel Vrátil <me@dvratil.cz>
//
// SPDX-License-Identifier: MIT

use std::collections::VecDeque;
use std::fmt;

use pest::iterators::Pair;
use thiserror::Error;

use crate::parser::Rule;

#[derive(Error, Debug)]
pub enum AstError {
    #[error("Empty program")]
    EmptyProgram,

    #[error("Invalid declaration: {0}")]
    InvalidDeclaration(String),

    #[error("Invalid statement: {0}")]
    InvalidStatement(String),

    #[error("Invalid expression: {0}")]
    InvalidExpression(String),
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum VarType {
    // Keyword: num
    Number,
    // Keyword: bool
    Bool,
}

impl fmt::Display for VarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VarType::Number => write!(f, "num"),
            VarType::Bool => write!(f, "bool"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Program {
    pub declarations: Vec<Declaration>,
    pub statements: Vec<Statement>,
}

impl TryFrom<Pair<'_, Rule>> for Program {
    type Error = AstError;

    fn try_from(program: Pair<'_, Rule>) -> Result<Self, Self::Error> {
        match program.as_rule() {
            Rule::program => {
                let mut declarations = Vec::new();
                let mut statements = Vec::new();
                for pair in program.into_inner().take_while(|p| p.as_rule() != Rule::EOI) {
                    match pair.as_rule() {
                        Rule::declaration => declarations.push(Declaration::try_from(pair)?),
                        _ => statements.push(Statement::try_from(pair)?),
                    }
                }
                Ok(Program {
                    declarations,
                    statements,
                })
            }
            _ => Err(AstError::EmptyProgram),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub r#type: VarType,
    pub identifier: String,
}

impl TryFrom<Pair<'_, Rule>> for Declaration {
    type Error = AstError;

    fn try_from(declaration: Pair<'_, Rule>) -> Result<Self, Self::Error> {
        if declaration.as_rule() != Rule::declaration {
            return Err(AstError::InvalidDeclaration(format!(
                "Expected declaration, got {:?}",
                declaration.as_rule()
            )));
        }

        let mut elements = declaration.into_inner();
        let r#type = match elements.next().map(|p| p.as_str()) {
            Some("bool") => VarType::Bool,
            Some(_) => VarType::Number,
            None => {
                return Err(AstError::InvalidDeclaration(
                    "Missing declaration type".to_string(),
                ));
            }
        };
        let identifier = elements
            .next()
            .ok_or(AstError::InvalidDeclaration(
                "Missing declared identifier".to_string(),
            ))?
            .as_str()
            .to_string();

        Ok(Declaration { r#type, identifier })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Block(Vec<Statement>),
    Assign {
        identifier: String,
        expression: Expression,
    },
    If {
        condition: Expression,
        then_branch: Box<Statement>,
        else_branch: Option<Box<Statement>>,
    },
    While {
        condition: Expression,
        body: Box<Statement>,
    },
    Switch {
        selector: Expression,
        cases: Vec<Case>,
    },
}

impl TryFrom<Pair<'_, Rule>> for Statement {
    type Error = AstError;

    fn try_from(statement: Pair<'_, Rule>) -> Result<Self, Self::Error> {
        match statement.as_rule() {
            Rule::statement => Statement::try_from(statement.into_inner().next().ok_or(
                AstError::InvalidStatement("Empty statement".to_string()),
            )?),
            Rule::block => Ok(Statement::Block(
                statement
                    .into_inner()
                    .map(Statement::try_from)
                    .collect::<Result<Vec<_>, AstError>>()?,
            )),
            Rule::assign_statement => {
                let mut elements = statement.into_inner().collect::<VecDeque<_>>();
                if elements.len() != 2 {
                    return Err(AstError::InvalidStatement(
                        "Invalid assignment statement".to_string(),
                    ));
                }
                let identifier = elements
                    .pop_front()
                    .ok_or(AstError::InvalidStatement(
                        "Empty assignment target".to_string(),
                    ))?
                    .as_str()
                    .to_string();
                let expression = Expression::try_from(elements.pop_front().ok_or(
                    AstError::InvalidStatement("Empty assignment expression".to_string()),
                )?)?;
                Ok(Statement::Assign {
                    identifier,
                    expression,
                })
            }
            Rule::if_statement => {
                let mut elements = statement.into_inner().collect::<VecDeque<_>>();
                let condition = Expression::try_from(elements.pop_front().ok_or(
                    AstError::InvalidStatement("Missing if condition".to_string()),
                )?)?;
                let then_branch = Statement::try_from(elements.pop_front().ok_or(
                    AstError::InvalidStatement("Missing if branch".to_string()),
                )?)?;
                let else_branch = elements
                    .pop_front()
                    .map(Statement::try_from)
                    .transpose()?
                    .map(Box::new);
                Ok(Statement::If {
                    condition,
                    then_branch: Box::new(then_branch),
                    else_branch,
                })
            }
            Rule::while_statement => {
                let mut elements = statement.into_inner().collect::<VecDeque<_>>();
                let condition = Expression::try_from(elements.pop_front().ok_or(
                    AstError::InvalidStatement("Missing while condition".to_string()),
                )?)?;
                let body = Statement::try_from(elements.pop_front().ok_or(
                    AstError::InvalidStatement("Missing while body".to_string()),
                )?)?;
                Ok(Statement::While {
                    condition,
                    body: Box::new(body),
                })
            }
            Rule::switch_statement => {
                let mut elements = statement.into_inner();
                let selector = Expression::try_from(elements.next().ok_or(
                    AstError::InvalidStatement("Missing switch selector".to_string()),
                )?)?;
                let cases = elements
                    .map(Case::try_from)
                    .collect::<Result<Vec<_>, AstError>>()?;
                Ok(Statement::Switch { selector, cases })
            }
            _ => Err(AstError::InvalidStatement(format!(
                "Expected statement, got {:?}",
                statement.as_rule()
            ))),
        }
    }
}

/// A single `case` (or `default`, when `value` is `None`) of a switch statement.
#[derive(Debug, Clone, PartialEq)]
pub struct Case {
    pub value: Option<Expression>,
    pub body: Statement,
}

impl TryFrom<Pair<'_, Rule>> for Case {
    type Error = AstError;

    fn try_from(case: Pair<'_, Rule>) -> Result<Self, Self::Error> {
        match case.as_rule() {
            Rule::case_clause => {
                let mut elements = case.into_inner();
                let value = elements
                    .next()
                    .ok_or(AstError::InvalidStatement("Missing case value".to_string()))?;
                let value = value.as_str().parse::<i64>().map_err(|e| {
                    AstError::InvalidStatement(format!("Invalid case value: {e}"))
                })?;
                let body = Statement::try_from(
                    elements
                        .next()
                        .ok_or(AstError::InvalidStatement("Empty case".to_string()))?,
                )?;
                Ok(Case {
                    value: Some(Expression::Integer(value)),
                    body,
                })
            }
            Rule::default_clause => {
                let body = Statement::try_from(
                    case.into_inner()
                        .next()
                        .ok_or(AstError::InvalidStatement("Empty default".to_string()))?,
                )?;
                Ok(Case { value: None, body })
            }
            _ => Err(AstError::InvalidStatement(format!(
                "Expected case, got {:?}",
                case.as_rule()
            ))),
        }
    }
}

/// Expression tree.
///
/// The list-shaped variants keep the flat operand/operator layout of the
/// grammar layer they come from: `operators.len()` is always one less than
/// `operands.len()`. The parser collapses layers without operators, so a
/// `Logical` or `Arithmetic` node built from source always has at least one
/// operator, but hand-built trees may use empty lists as pass-through layers.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// `||` / `&&` chain. Both operators share one precedence level and the
    /// chain associates to the right: `a || b && c` is `a || (b && c)`.
    Logical {
        operands: Vec<Expression>,
        operators: Vec<LogicalOperator>,
    },
    /// Relational comparison, or a pass-through layer when `tail` is `None`.
    Comparison {
        left: Box<Expression>,
        tail: Option<(RelationalOperator, Box<Expression>)>,
    },
    /// Left-associative `+ -` or `* / %` chain.
    Arithmetic {
        operands: Vec<Expression>,
        operators: Vec<ArithmeticOperator>,
    },
    /// Chain of unary minus applications.
    Negate {
        negations: usize,
        operand: Box<Expression>,
    },
    /// Chain of `!` applications.
    Not {
        negations: usize,
        operand: Box<Expression>,
    },
    /// Parenthesized expression.
    Group(Box<Expression>),
    Identifier(String),
    Integer(i64),
    Boolean(bool),
}

impl Expression {
    fn collect_operands<'i, O>(
        expr: Pair<'i, Rule>,
        parse_operator: fn(Pair<'i, Rule>) -> Result<O, AstError>,
    ) -> Result<(Vec<Expression>, Vec<O>), AstError> {
        let mut elements = expr.into_inner().collect::<VecDeque<_>>();
        let first = elements
            .pop_front()
            .ok_or(AstError::InvalidExpression("Empty expression".to_string()))?;

        let mut operands = vec![Expression::try_from(first)?];
        let mut operators = Vec::new();
        while let (Some(op), Some(operand)) = (elements.pop_front(), elements.pop_front()) {
            operators.push(parse_operator(op)?);
            operands.push(Expression::try_from(operand)?);
        }

        Ok((operands, operators))
    }

    /// Splits a `prefix_operator* ~ operand` sequence into the prefix count and the operand.
    fn count_prefix(expr: Pair<'_, Rule>) -> Result<(usize, Expression), AstError> {
        let mut negations = 0;
        for pair in expr.into_inner() {
            match pair.as_rule() {
                Rule::unary_operator | Rule::not_operator => negations += 1,
                _ => return Ok((negations, Expression::try_from(pair)?)),
            }
        }
        Err(AstError::InvalidExpression("Missing operand".to_string()))
    }
}

impl TryFrom<Pair<'_, Rule>> for Expression {
    type Error = AstError;

    fn try_from(expr: Pair<'_, Rule>) -> Result<Self, Self::Error> {
        match expr.as_rule() {
            Rule::expression => Expression::try_from(
                expr.into_inner()
                    .next()
                    .ok_or(AstError::InvalidExpression("Empty expression".to_string()))?,
            ),
            Rule::logical_expr => {
                let (mut operands, operators) =
                    Expression::collect_operands(expr, LogicalOperator::try_from)?;
                if operators.is_empty() {
                    return operands
                        .pop()
                        .ok_or(AstError::InvalidExpression("Empty expression".to_string()));
                }
                Ok(Expression::Logical {
                    operands,
                    operators,
                })
            }
            Rule::comparison_expr => {
                let mut elements = expr.into_inner().collect::<VecDeque<_>>();
                let left = Expression::try_from(
                    elements
                        .pop_front()
                        .ok_or(AstError::InvalidExpression("Empty comparison".to_string()))?,
                )?;
                match (elements.pop_front(), elements.pop_front()) {
                    (Some(op), Some(right)) => Ok(Expression::Comparison {
                        left: Box::new(left),
                        tail: Some((
                            RelationalOperator::try_from(op)?,
                            Box::new(Expression::try_from(right)?),
                        )),
                    }),
                    (None, _) => Ok(left),
                    (Some(_), None) => Err(AstError::InvalidExpression(
                        "Missing right side of comparison".to_string(),
                    )),
                }
            }
            Rule::additive_expr | Rule::multiplicative_expr => {
                let (mut operands, operators) =
                    Expression::collect_operands(expr, ArithmeticOperator::try_from)?;
                if operators.is_empty() {
                    return operands
                        .pop()
                        .ok_or(AstError::InvalidExpression("Empty term".to_string()));
                }
                Ok(Expression::Arithmetic {
                    operands,
                    operators,
                })
            }
            Rule::unary_expr => match Expression::count_prefix(expr)? {
                (0, operand) => Ok(operand),
                (negations, operand) => Ok(Expression::Negate {
                    negations,
                    operand: Box::new(operand),
                }),
            },
            Rule::not_expr => match Expression::count_prefix(expr)? {
                (0, operand) => Ok(operand),
                (negations, operand) => Ok(Expression::Not {
                    negations,
                    operand: Box::new(operand),
                }),
            },
            Rule::primary => {
                let inner = expr
                    .into_inner()
                    .next()
                    .ok_or(AstError::InvalidExpression("Empty primary".to_string()))?;
                match inner.as_rule() {
                    Rule::expression => Ok(Expression::Group(Box::new(Expression::try_from(
                        inner,
                    )?))),
                    _ => Expression::try_from(inner),
                }
            }
            Rule::boolean => Ok(Expression::Boolean(expr.as_str() == "true")),
            Rule::integer => Ok(Expression::Integer(expr.as_str().parse::<i64>().map_err(
                |e| AstError::InvalidExpression(format!("Invalid integer: {e}")),
            )?)),
            Rule::identifier => Ok(Expression::Identifier(expr.as_str().to_string())),
            _ => Err(AstError::InvalidExpression(format!(
                "Expected expression, got {:?}",
                expr.as_rule()
            ))),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LogicalOperator {
    Or,
    And,
}

impl TryFrom<Pair<'_, Rule>> for LogicalOperator {
    type Error = AstError;

    fn try_from(op: Pair<'_, Rule>) -> Result<Self, Self::Error> {
        match op.as_str() {
            "||" => Ok(LogicalOperator::Or),
            "&&" => Ok(LogicalOperator::And),
            _ => Err(AstError::InvalidExpression(format!(
                "Invalid logical operator: {:?}",
                op
            ))),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RelationalOperator {
    Equal,
    NotEqual,
    LessThan,
    LessThanEqual,
    GreaterThan,
    GreaterThanEqual,
}

impl TryFrom<Pair<'_, Rule>> for RelationalOperator {
    type Error = AstError;

    fn try_from(op: Pair<'_, Rule>) -> Result<Self, Self::Error> {
        match op.as_str() {
            "==" => Ok(RelationalOperator::Equal),
            "!=" => Ok(RelationalOperator::NotEqual),
            "<" => Ok(RelationalOperator::LessThan),
            "<=" => Ok(RelationalOperator::LessThanEqual),
            ">" => Ok(RelationalOperator::GreaterThan),
            ">=" => Ok(RelationalOperator::GreaterThanEqual),
            _ => Err(AstError::InvalidExpression(format!(
                "Invalid relational operator: {:?}",
                op
            ))),
        }
    }
}

impl fmt::Display for RelationalOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self {
            RelationalOperator::Equal => "==",
            RelationalOperator::NotEqual => "!=",
            RelationalOperator::LessThan => "<",
            RelationalOperator::LessThanEqual => "<=",
            RelationalOperator::GreaterThan => ">",
            RelationalOperator::GreaterThanEqual => ">=",
        };
        write!(f, "{op}")
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ArithmeticOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
}

impl TryFrom<Pair<'_, Rule>> for ArithmeticOperator {
    type Error = AstError;

    fn try_from(op: Pair<'_, Rule>) -> Result<Self, Self::Error> {
        match op.as_str() {
            "+" => Ok(ArithmeticOperator::Add),
            "-" => Ok(ArithmeticOperator::Subtract),
            "*" => Ok(ArithmeticOperator::Multiply),
            "/" => Ok(ArithmeticOperator::Divide),
            "%" => Ok(ArithmeticOperator::Modulo),
            _ => Err(AstError::InvalidExpression(format!(
                "Invalid arithmetic operator: {:?}",
                op
            ))),
        }
    }
}

impl fmt::Display for ArithmeticOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self {
            ArithmeticOperator::Add => "+",
            ArithmeticOperator::Subtract => "-",
            ArithmeticOperator::Multiply => "*",
            ArithmeticOperator::Divide => "/",
            ArithmeticOperator::Modulo => "%",
        };
        write!(f, "{op}")
    }
}

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum SelectionParseError {
    #[error("Empty selection text")]
    Empty,
    #[error("Unknown keyword '{0}'")]
    UnknownKeyword(String),
    #[error("Keyword '{0}' requires at least one value")]
    MissingValue(String),
    #[error("Invalid numeric value '{value}' for keyword '{keyword}'")]
    InvalidNumber { keyword: String, value: String },
    #[error("Unbalanced parentheses")]
    UnbalancedParentheses,
    #[error("Unexpected token '{0}'")]
    UnexpectedToken(String),
}

/// An atom property that selection values are matched against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    Index(Vec<usize>),
    Name(Vec<String>),
    Resname(Vec<String>),
    Resid(Vec<isize>),
    Element(Vec<String>),
    Hydrogen,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionExpr {
    All,
    None,
    Match(Predicate),
    Not(Box<SelectionExpr>),
    And(Box<SelectionExpr>, Box<SelectionExpr>),
    Or(Box<SelectionExpr>, Box<SelectionExpr>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Open,
    Close,
    Word(String),
}

fn tokenize(text: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut word = String::new();
    for c in text.chars() {
        match c {
            '(' | ')' => {
                if !word.is_empty() {
                    tokens.push(Token::Word(std::mem::take(&mut word)));
                }
                tokens.push(if c == '(' { Token::Open } else { Token::Close });
            }
            c if c.is_whitespace() => {
                if !word.is_empty() {
                    tokens.push(Token::Word(std::mem::take(&mut word)));
                }
            }
            c => word.push(c),
        }
    }
    if !word.is_empty() {
        tokens.push(Token::Word(word));
    }
    tokens
}

const OPERATORS: [&str; 3] = ["and", "or", "not"];

fn is_keyword(word: &str) -> bool {
    OPERATORS.contains(&word)
        || matches!(
            word,
            "all"
                | "none"
                | "hydrogen"
                | "noh"
                | "index"
                | "name"
                | "resname"
                | "resid"
                | "element"
        )
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_word(&self) -> Option<&str> {
        match self.peek() {
            Some(Token::Word(w)) => Some(w.as_str()),
            _ => None,
        }
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn parse_or(&mut self) -> Result<SelectionExpr, SelectionParseError> {
        let mut lhs = self.parse_and()?;
        while self.peek_word() == Some("or") {
            self.pos += 1;
            let rhs = self.parse_and()?;
            lhs = SelectionExpr::Or(Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_and(&mut self) -> Result<SelectionExpr, SelectionParseError> {
        let mut lhs = self.parse_unary()?;
        while self.peek_word() == Some("and") {
            self.pos += 1;
            let rhs = self.parse_unary()?;
            lhs = SelectionExpr::And(Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> Result<SelectionExpr, SelectionParseError> {
        match self.next() {
            None => Err(SelectionParseError::Empty),
            Some(Token::Close) => Err(SelectionParseError::UnbalancedParentheses),
            Some(Token::Open) => {
                let inner = self.parse_or()?;
                match self.next() {
                    Some(Token::Close) => Ok(inner),
                    _ => Err(SelectionParseError::UnbalancedParentheses),
                }
            }
            Some(Token::Word(word)) => match word.as_str() {
                "not" => Ok(SelectionExpr::Not(Box::new(self.parse_unary()?))),
                "all" => Ok(SelectionExpr::All),
                "none" => Ok(SelectionExpr::None),
                "hydrogen" => Ok(SelectionExpr::Match(Predicate::Hydrogen)),
                "noh" => Ok(SelectionExpr::Not(Box::new(SelectionExpr::Match(
                    Predicate::Hydrogen,
                )))),
                "index" => Ok(SelectionExpr::Match(Predicate::Index(
                    self.numbers(&word)?,
                ))),
                "resid" => Ok(SelectionExpr::Match(Predicate::Resid(
                    self.numbers(&word)?,
                ))),
                "name" => Ok(SelectionExpr::Match(Predicate::Name(self.values(&word)?))),
                "resname" => Ok(SelectionExpr::Match(Predicate::Resname(
                    self.values(&word)?,
                ))),
                "element" => Ok(SelectionExpr::Match(Predicate::Element(
                    self.values(&word)?,
                ))),
                "and" | "or" => Err(SelectionParseError::UnexpectedToken(word)),
                _ => Err(SelectionParseError::UnknownKeyword(word)),
            },
        }
    }

    fn values(&mut self, keyword: &str) -> Result<Vec<String>, SelectionParseError> {
        let mut values = Vec::new();
        while let Some(word) = self.peek_word() {
            if is_keyword(word) {
                break;
            }
            values.push(word.to_string());
            self.pos += 1;
        }
        if values.is_empty() {
            return Err(SelectionParseError::MissingValue(keyword.to_string()));
        }
        Ok(values)
    }

    fn numbers<T: std::str::FromStr>(
        &mut self,
        keyword: &str,
    ) -> Result<Vec<T>, SelectionParseError> {
        self.values(keyword)?
            .into_iter()
            .map(|value| {
                value
                    .parse()
                    .map_err(|_| SelectionParseError::InvalidNumber {
                        keyword: keyword.to_string(),
                        value,
                    })
            })
            .collect()
    }
}

/// Parses selection text into an expression tree.
///
/// `not` binds tighter than `and`, which binds tighter than `or`.
pub fn parse(text: &str) -> Result<SelectionExpr, SelectionParseError> {
    let mut parser = Parser {
        tokens: tokenize(text),
        pos: 0,
    };
    if parser.tokens.is_empty() {
        return Err(SelectionParseError::Empty);
    }
    let expr = parser.parse_or()?;
    match parser.next() {
        None => Ok(expr),
        Some(Token::Close) => Err(SelectionParseError::UnbalancedParentheses),
        Some(Token::Open) => Err(SelectionParseError::UnexpectedToken("(".to_string())),
        Some(Token::Word(word)) => Err(SelectionParseError::UnexpectedToken(word)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(values: &[&str]) -> SelectionExpr {
        SelectionExpr::Match(Predicate::Name(
            values.iter().map(|v| v.to_string()).collect(),
        ))
    }

    #[test]
    fn parses_keyword_with_multiple_values() {
        assert_eq!(parse("name CA CB").unwrap(), name(&["CA", "CB"]));
        assert_eq!(
            parse("index 0 4 7").unwrap(),
            SelectionExpr::Match(Predicate::Index(vec![0, 4, 7]))
        );
    }

    #[test]
    fn and_binds_tighter_than_or() {
        let expr = parse("name A or name B and name C").unwrap();
        assert_eq!(
            expr,
            SelectionExpr::Or(
                Box::new(name(&["A"])),
                Box::new(SelectionExpr::And(
                    Box::new(name(&["B"])),
                    Box::new(name(&["C"]))
                ))
            )
        );
    }

    #[test]
    fn parentheses_and_noh_compose() {
        let expr = parse("(resname TIP) and noh").unwrap();
        assert_eq!(
            expr,
            SelectionExpr::And(
                Box::new(SelectionExpr::Match(Predicate::Resname(vec![
                    "TIP".to_string()
                ]))),
                Box::new(SelectionExpr::Not(Box::new(SelectionExpr::Match(
                    Predicate::Hydrogen
                ))))
            )
        );
    }

    #[test]
    fn invalid_texts_are_rejected() {
        assert_eq!(parse("   "), Err(SelectionParseError::Empty));
        assert_eq!(
            parse("banana"),
            Err(SelectionParseError::UnknownKeyword("banana".to_string()))
        );
        assert_eq!(
            parse("name"),
            Err(SelectionParseError::MissingValue("name".to_string()))
        );
        assert_eq!(
            parse("(all"),
            Err(SelectionParseError::UnbalancedParentheses)
        );
        assert_eq!(
            parse("all)"),
            Err(SelectionParseError::UnbalancedParentheses)
        );
        assert!(matches!(
            parse("resid one"),
            Err(SelectionParseError::InvalidNumber { .. })
        ));
    }
}

use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Number(f64),
    Op(char),
}

pub struct Tokenizer<'a> {
    input: &'a str,
    cache: HashMap<String, Vec<Token>>,
}

impl<'a> Tokenizer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            cache: HashMap::new(),
        }
    }

    pub fn tokenize(&mut self) -> Result<Vec<Token>, String> {
        let mut tokens = Vec::new();
        for part in self.input.split_whitespace() {
            match part.parse::<f64>() {
                Ok(n) => tokens.push(Token::Number(n)),
                Err(_) if part.len() == 1 => tokens.push(Token::Op(part.chars().next().unwrap())),
                Err(e) => return Err(format!("bad token {}: {}", part, e)),
            }
        }
        self.cache.insert(self.input.to_string(), tokens.clone());
        Ok(tokens)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number(n) => write!(f, "{}", n),
            Token::Op(c) => write!(f, "{}", c),
        }
    }
}

fn main() {
    let mut tokenizer = Tokenizer::new("1 + 2");
    let tokens = tokenizer.tokenize().expect("valid input");
    println!("{:?}", tokens);
}

use genera_types::{ClassId, Type, TypeEnv, TypeParamDef, TypeStore};

use crate::{SignatureError, TypeVarScope};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token<'a> {
    Ident(&'a str),
    Lt,
    Gt,
    Comma,
    Question,
    LBracket,
    RBracket,
}

impl Token<'_> {
    fn describe(&self) -> String {
        match self {
            Token::Ident(name) => (*name).to_string(),
            Token::Lt => "<".to_string(),
            Token::Gt => ">".to_string(),
            Token::Comma => ",".to_string(),
            Token::Question => "?".to_string(),
            Token::LBracket => "[".to_string(),
            Token::RBracket => "]".to_string(),
        }
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '$' | '.')
}

fn tokenize(input: &str) -> Result<Vec<(usize, Token<'_>)>, SignatureError> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();
    while let Some(&(offset, c)) = chars.peek() {
        let token = match c {
            c if c.is_whitespace() => {
                chars.next();
                continue;
            }
            '<' => Token::Lt,
            '>' => Token::Gt,
            ',' => Token::Comma,
            '?' => Token::Question,
            '[' => Token::LBracket,
            ']' => Token::RBracket,
            c if is_ident_char(c) => {
                let mut end = offset;
                while let Some(&(idx, c)) = chars.peek() {
                    if !is_ident_char(c) {
                        break;
                    }
                    end = idx + c.len_utf8();
                    chars.next();
                }
                tokens.push((offset, Token::Ident(&input[offset..end])));
                continue;
            }
            other => {
                return Err(SignatureError::Unexpected {
                    input: input.to_string(),
                    offset,
                    found: other.to_string(),
                })
            }
        };
        chars.next();
        tokens.push((offset, token));
    }
    Ok(tokens)
}

pub(crate) struct Parser<'a> {
    store: &'a TypeStore,
    scope: &'a TypeVarScope,
    input: &'a str,
    tokens: Vec<(usize, Token<'a>)>,
    pos: usize,
}

impl<'a> Parser<'a> {
    pub(crate) fn new(
        store: &'a TypeStore,
        scope: &'a TypeVarScope,
        input: &'a str,
    ) -> Result<Self, SignatureError> {
        Ok(Self {
            store,
            scope,
            input,
            tokens: tokenize(input)?,
            pos: 0,
        })
    }

    fn peek(&self) -> Option<&Token<'a>> {
        self.tokens.get(self.pos).map(|(_, tok)| tok)
    }

    fn bump(&mut self) -> Option<Token<'a>> {
        let tok = self.tokens.get(self.pos).map(|(_, tok)| tok.clone());
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn unexpected(&self) -> SignatureError {
        match self.tokens.get(self.pos) {
            Some((offset, tok)) => SignatureError::Unexpected {
                input: self.input.to_string(),
                offset: *offset,
                found: tok.describe(),
            },
            None => SignatureError::UnexpectedEnd(self.input.to_string()),
        }
    }

    fn expect(&mut self, expected: Token<'_>) -> Result<(), SignatureError> {
        if self.peek() == Some(&expected) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.unexpected())
        }
    }

    fn ident(&mut self) -> Result<&'a str, SignatureError> {
        match self.peek() {
            Some(Token::Ident(name)) => {
                let name = *name;
                self.pos += 1;
                Ok(name)
            }
            _ => Err(self.unexpected()),
        }
    }

    pub(crate) fn finish(&self) -> Result<(), SignatureError> {
        if self.pos == self.tokens.len() {
            Ok(())
        } else {
            Err(self.unexpected())
        }
    }

    /// `Name ('extends' Type)?`
    pub(crate) fn type_param(&mut self) -> Result<TypeParamDef, SignatureError> {
        let name = self.ident()?;
        if name.contains('.') {
            return Err(SignatureError::InvalidTypeParameter(name.to_string()));
        }
        if self.peek() == Some(&Token::Ident("extends")) {
            self.pos += 1;
            let bound = self.ty()?;
            return Ok(TypeParamDef::bounded(name, bound));
        }
        Ok(TypeParamDef::new(name))
    }

    /// A type outside an argument list: wildcards are not allowed here.
    pub(crate) fn ty(&mut self) -> Result<Type, SignatureError> {
        if self.peek() == Some(&Token::Question) {
            return Err(SignatureError::WildcardOutsideArguments(self.input.to_string()));
        }
        let base = self.named()?;
        self.dims(base)
    }

    fn type_argument(&mut self) -> Result<Type, SignatureError> {
        if self.peek() != Some(&Token::Question) {
            return self.ty();
        }
        self.pos += 1;
        match self.peek() {
            Some(Token::Ident("extends")) => {
                self.pos += 1;
                Ok(Type::wildcard_extends(self.ty()?))
            }
            // Only upper bounds are modelled; `? super X` is as opaque as `?`.
            Some(Token::Ident("super")) => {
                self.pos += 1;
                self.ty()?;
                Ok(Type::wildcard())
            }
            _ => Ok(Type::wildcard()),
        }
    }

    fn named(&mut self) -> Result<Type, SignatureError> {
        let name = self.ident()?;

        if let Some(var) = self.scope.get(name) {
            if self.peek() == Some(&Token::Lt) {
                return Err(SignatureError::ArgumentsOnTypeVariable(name.to_string()));
            }
            return Ok(Type::TypeVar(var));
        }

        let class = self.class_named(name)?;
        if self.peek() != Some(&Token::Lt) {
            return Ok(Type::class(class));
        }

        self.bump();
        let mut args = vec![self.type_argument()?];
        while self.peek() == Some(&Token::Comma) {
            self.pos += 1;
            args.push(self.type_argument()?);
        }
        self.expect(Token::Gt)?;

        if let Some(def) = self.store.class(class) {
            if def.type_params.len() != args.len() {
                return Err(SignatureError::ArityMismatch {
                    class: def.name.clone(),
                    expected: def.type_params.len(),
                    found: args.len(),
                });
            }
        }

        Ok(Type::parameterized(class, args))
    }

    fn dims(&mut self, mut ty: Type) -> Result<Type, SignatureError> {
        while self.peek() == Some(&Token::LBracket) {
            self.pos += 1;
            self.expect(Token::RBracket)?;
            ty = Type::array(ty);
        }
        Ok(ty)
    }

    fn class_named(&self, name: &str) -> Result<ClassId, SignatureError> {
        if let Some(id) = self.store.class_id(name) {
            return Ok(id);
        }
        if name.contains('.') {
            return Err(SignatureError::UnknownType(name.to_string()));
        }

        let candidates = self.store.classes_with_simple_name(name);
        match candidates.as_slice() {
            [] => Err(SignatureError::UnknownType(name.to_string())),
            [id] => Ok(*id),
            _ => Err(SignatureError::AmbiguousName {
                name: name.to_string(),
                candidates: candidates
                    .iter()
                    .filter_map(|id| self.store.class_name(*id))
                    .map(str::to_string)
                    .collect(),
            }),
        }
    }
}

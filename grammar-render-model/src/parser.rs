// Syntactic AST of the model notation.
//
// The notation mirrors ANTLR rule syntax closely enough to be tokenized by the
// Rust lexer: multi-character literals use double quotes, character sets are
// written as a bracketed string (`["a-z"]`), and comments are ordinary `//`
// comments that the tokenizer drops.
use syn::ext::IdentExt;
use syn::parse::{Parse, ParseStream};
use syn::{token, Ident, LitChar, LitStr, Result, Token};

mod rt {
    use syn::ext::IdentExt;
    use syn::parse::discouraged::Speculative;
    use syn::parse::ParseStream;
    use syn::Result;

    pub fn attempt<T>(
        input: ParseStream,
        parser: impl FnOnce(ParseStream) -> Result<T>,
    ) -> Result<Option<T>> {
        let fork = input.fork();
        match parser(&fork) {
            Ok(res) => {
                input.advance_to(&fork);
                Ok(Some(res))
            }
            Err(_) => Ok(None),
        }
    }

    pub fn parse_ident(input: ParseStream) -> Result<syn::Ident> {
        input.call(syn::Ident::parse_any)
    }
}

pub mod kw {
    syn::custom_keyword!(grammar);
    syn::custom_keyword!(parser);
    syn::custom_keyword!(lexer);
    syn::custom_keyword!(fragment);
    syn::custom_keyword!(mode);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrammarKind {
    Parser,
    Lexer,
}

/// One `parser grammar Name { ... }` or `lexer grammar Name { ... }` block.
pub struct GrammarFile {
    pub kind: GrammarKind,
    pub name: Ident,
    pub rules: Vec<Rule>,
}

impl Parse for GrammarFile {
    fn parse(input: ParseStream) -> Result<Self> {
        let kind = if input.peek(kw::parser) {
            let _ = input.parse::<kw::parser>()?;
            GrammarKind::Parser
        } else if input.peek(kw::lexer) {
            let _ = input.parse::<kw::lexer>()?;
            GrammarKind::Lexer
        } else {
            return Err(input.error("expected `parser grammar` or `lexer grammar`"));
        };

        let _ = input.parse::<kw::grammar>()?;
        let name = rt::parse_ident(input)?;

        let content;
        let _ = syn::braced!(content in input);

        let mut rules = Vec::new();
        while !content.is_empty() {
            if content.peek(kw::mode) && content.peek2(Ident) && content.peek3(token::Brace) {
                let mode_token = content.parse::<kw::mode>()?;
                if kind == GrammarKind::Parser {
                    return Err(syn::Error::new(
                        mode_token.span,
                        "lexing modes are only allowed in lexer grammars",
                    ));
                }
                let mode = rt::parse_ident(&content)?;
                let body;
                syn::braced!(body in content);
                while !body.is_empty() {
                    let mut rule: Rule = body.parse()?;
                    rule.mode = Some(mode.clone());
                    rules.push(rule);
                }
            } else {
                rules.push(content.parse()?);
            }
        }

        if !input.is_empty() {
            return Err(input.error("unexpected tokens after grammar block"));
        }

        Ok(GrammarFile { kind, name, rules })
    }
}

pub struct Rule {
    pub fragment: Option<kw::fragment>,
    pub mode: Option<Ident>,
    pub name: Ident,
    pub alternatives: Vec<Alternative>,
}

impl Parse for Rule {
    fn parse(input: ParseStream) -> Result<Self> {
        let fragment = if input.peek(kw::fragment) && input.peek2(Ident::peek_any) {
            Some(input.parse()?)
        } else {
            None
        };

        let name = rt::parse_ident(input)?;
        let _ = input.parse::<Token![:]>()?;
        let alternatives = Alternative::parse_list(input)?;
        let _ = input.parse::<Token![;]>()?;

        Ok(Rule {
            fragment,
            mode: None,
            name,
            alternatives,
        })
    }
}

pub struct Alternative {
    pub elements: Vec<Element>,
}

impl Alternative {
    pub fn parse_list(input: ParseStream) -> Result<Vec<Self>> {
        let mut alternatives = Vec::new();
        loop {
            alternatives.push(input.parse()?);
            if input.peek(Token![|]) {
                let _ = input.parse::<Token![|]>()?;
            } else {
                break;
            }
        }
        Ok(alternatives)
    }
}

impl Parse for Alternative {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut elements = Vec::new();
        while !at_alternative_end(input) {
            elements.push(input.parse()?);
        }

        // Lexer commands (`-> skip`) and alt labels (`# Call`) are not rendered.
        if input.peek(Token![->]) {
            let _ = input.parse::<Token![->]>()?;
            loop {
                let _command = rt::parse_ident(input)?;
                if input.peek(token::Paren) {
                    let _arguments: proc_macro2::Group = input.parse()?;
                }
                if input.peek(Token![,]) {
                    let _ = input.parse::<Token![,]>()?;
                } else {
                    break;
                }
            }
        }

        if input.peek(Token![#]) {
            let _ = input.parse::<Token![#]>()?;
            let _label = rt::parse_ident(input)?;
        }

        Ok(Alternative { elements })
    }
}

fn at_alternative_end(input: ParseStream) -> bool {
    input.is_empty()
        || input.peek(Token![|])
        || input.peek(Token![;])
        || input.peek(Token![->])
        || input.peek(Token![#])
}

#[derive(Debug, Clone)]
pub enum Element {
    Lit(LitStr),
    CharSet(LitStr, token::Bracket),
    Ref(Ident),
    Group(Vec<Vec<Element>>, token::Paren),
    Optional(Box<Element>, bool),
    Star(Box<Element>, bool),
    Plus(Box<Element>, bool),
    Not(Box<Element>, Token![~]),
    Range(Box<Element>, Box<Element>),
    Action { predicate: bool },
}

impl Parse for Element {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut element = if input.peek(Token![~]) {
            let token = input.parse::<Token![~]>()?;
            Element::Not(Box::new(parse_range(input)?), token)
        } else {
            parse_range(input)?
        };

        loop {
            if input.peek(Token![?]) {
                let _ = input.parse::<Token![?]>()?;
                element = Element::Optional(Box::new(element), parse_greedy(input)?);
            } else if input.peek(Token![*]) {
                let _ = input.parse::<Token![*]>()?;
                element = Element::Star(Box::new(element), parse_greedy(input)?);
            } else if input.peek(Token![+]) && !input.peek(Token![+=]) {
                let _ = input.parse::<Token![+]>()?;
                element = Element::Plus(Box::new(element), parse_greedy(input)?);
            } else {
                break;
            }
        }
        Ok(element)
    }
}

// A trailing `?` after a quantifier marks it non-greedy.
fn parse_greedy(input: ParseStream) -> Result<bool> {
    if input.peek(Token![?]) {
        let _ = input.parse::<Token![?]>()?;
        Ok(false)
    } else {
        Ok(true)
    }
}

fn parse_range(input: ParseStream) -> Result<Element> {
    let left = parse_atom(input)?;
    if input.peek(Token![..]) {
        let _ = input.parse::<Token![..]>()?;
        let right = parse_atom(input)?;
        return Ok(Element::Range(Box::new(left), Box::new(right)));
    }
    Ok(left)
}

fn parse_atom(input: ParseStream) -> Result<Element> {
    // Element labels (`x=ID`, `xs+=expr`) carry no rendering information.
    rt::attempt(input, |input| {
        let label = rt::parse_ident(input)?;
        if input.peek(Token![+=]) {
            let _ = input.parse::<Token![+=]>()?;
        } else {
            let _ = input.parse::<Token![=]>()?;
        }
        Ok(label)
    })?;

    if input.peek(LitStr) {
        Ok(Element::Lit(input.parse()?))
    } else if input.peek(LitChar) {
        let c: LitChar = input.parse()?;
        Ok(Element::Lit(LitStr::new(&c.value().to_string(), c.span())))
    } else if input.peek(token::Bracket) {
        let content;
        let token = syn::bracketed!(content in input);
        let set: LitStr = content.parse()?;
        if !content.is_empty() {
            return Err(content.error("a character set holds exactly one string literal"));
        }
        Ok(Element::CharSet(set, token))
    } else if input.peek(token::Paren) {
        let content;
        let token = syn::parenthesized!(content in input);
        Ok(Element::Group(parse_group_content(&content)?, token))
    } else if input.peek(token::Brace) {
        let _action: proc_macro2::Group = input.parse()?;
        let predicate = input.peek(Token![?]);
        if predicate {
            let _ = input.parse::<Token![?]>()?;
        }
        Ok(Element::Action { predicate })
    } else if input.peek(Ident::peek_any) {
        Ok(Element::Ref(rt::parse_ident(input)?))
    } else {
        Err(input.error("unrecognized grammar element"))
    }
}

fn parse_group_content(input: ParseStream) -> Result<Vec<Vec<Element>>> {
    let mut alts = Vec::new();
    loop {
        let mut seq = Vec::new();
        while !input.is_empty() && !input.peek(Token![|]) {
            seq.push(input.parse()?);
        }
        alts.push(seq);
        if input.peek(Token![|]) {
            let _ = input.parse::<Token![|]>()?;
        } else {
            break;
        }
    }
    Ok(alts)
}

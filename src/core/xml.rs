//! Minimal XML pretty-printer for `FlexLogger::xml`
//!
//! This is deliberately not a full XML parser: the logger only needs to
//! re-indent well-formed markup and reject input that is structurally
//! broken (unbalanced or unterminated tags) so the dispatcher can fall back
//! to logging the raw text.

use super::error::{FlexError, Result};

const INDENT: &str = "  ";

#[derive(Debug, PartialEq)]
enum Token<'a> {
    /// `<name ...>`
    Open(&'a str),
    /// `</name>`
    Close(&'a str),
    /// `<name ... />`, `<?...?>`, `<!-- -->`, `<!...>`
    Standalone(&'a str),
    Text(&'a str),
}

/// Re-indent an XML document with two spaces per nesting level.
///
/// # Errors
///
/// Returns a formatter error when a tag is unterminated, a closing tag does
/// not match the innermost open tag, or tags are left open at end of input.
pub fn pretty_print(input: &str) -> Result<String> {
    let tokens = tokenize(input)?;

    let mut out = String::new();
    let mut depth: usize = 0;
    let mut stack: Vec<&str> = Vec::new();

    for token in &tokens {
        match token {
            Token::Open(raw) => {
                push_line(&mut out, depth, raw);
                stack.push(tag_name(raw));
                depth += 1;
            }
            Token::Close(raw) => {
                let name = tag_name(raw);
                match stack.pop() {
                    Some(open) if open == name => {}
                    Some(open) => {
                        return Err(FlexError::formatter(
                            "XML",
                            format!("Mismatched closing tag: expected '</{}>', found '</{}>'", open, name),
                        ))
                    }
                    None => {
                        return Err(FlexError::formatter(
                            "XML",
                            format!("Unexpected closing tag '</{}>'", name),
                        ))
                    }
                }
                depth -= 1;
                push_line(&mut out, depth, raw);
            }
            Token::Standalone(raw) => push_line(&mut out, depth, raw),
            Token::Text(text) => push_line(&mut out, depth, text),
        }
    }

    if let Some(open) = stack.pop() {
        return Err(FlexError::formatter(
            "XML",
            format!("Unclosed tag '<{}>'", open),
        ));
    }

    Ok(out.trim_end().to_string())
}

fn push_line(out: &mut String, depth: usize, content: &str) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }
    out.push_str(content);
    out.push('\n');
}

/// Name portion of a raw tag like `<note id="1">` or `</note>`.
fn tag_name(raw: &str) -> &str {
    let inner = raw
        .trim_start_matches('<')
        .trim_start_matches('/')
        .trim_end_matches('>')
        .trim_end_matches('/');
    inner
        .split_whitespace()
        .next()
        .unwrap_or("")
}

fn tokenize(input: &str) -> Result<Vec<Token<'_>>> {
    let mut tokens = Vec::new();
    let mut rest = input;

    loop {
        let Some(lt) = rest.find('<') else {
            let text = rest.trim();
            if !text.is_empty() {
                tokens.push(Token::Text(text));
            }
            break;
        };

        let text = rest[..lt].trim();
        if !text.is_empty() {
            tokens.push(Token::Text(text));
        }

        let Some(gt) = rest[lt..].find('>') else {
            return Err(FlexError::formatter("XML", "Unterminated tag"));
        };
        let raw = &rest[lt..lt + gt + 1];
        let inner = &raw[1..raw.len() - 1];

        if inner.is_empty() {
            return Err(FlexError::formatter("XML", "Empty tag"));
        } else if inner.starts_with('?') || inner.starts_with('!') || inner.ends_with('/') {
            tokens.push(Token::Standalone(raw));
        } else if let Some(stripped) = inner.strip_prefix('/') {
            if stripped.trim().is_empty() {
                return Err(FlexError::formatter("XML", "Empty closing tag"));
            }
            tokens.push(Token::Close(raw));
        } else {
            tokens.push(Token::Open(raw));
        }

        rest = &rest[lt + gt + 1..];
    }

    Ok(tokens)
}

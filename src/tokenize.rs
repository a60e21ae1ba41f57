use std::sync::Arc;

/// Leading byte marking a token that must match exactly. The similarity
/// pass hard-rejects any candidate whose marked position differs, so
/// marked tokens never generalize to the wildcard.
pub const EXACT_MATCH_MARK: char = '\0';

/// Converts between raw lines and token sequences. The engine stores the
/// unmarshal side inside each cluster it creates so templates render the
/// way they were tokenized.
pub trait Tokenizer: Send + Sync {
    fn marshal(&self, content: &str) -> Vec<String>;
    fn unmarshal(&self, tokens: &[String]) -> String;
}

/// Selects a tokenization strategy by name. Unrecognized names fall back
/// to the adaptive default.
pub fn tokenizer_by_name(name: &str) -> Arc<dyn Tokenizer> {
    match name {
        "logfmt" => Arc::new(LogfmtTokenizer {
            tokenize_inside_quotes: true,
        }),
        _ => Arc::new(AdaptiveTokenizer),
    }
}

/// Default strategy: single-space splitting, mirroring the match-side
/// splitting so a trained line matches itself.
pub struct AdaptiveTokenizer;

impl Tokenizer for AdaptiveTokenizer {
    fn marshal(&self, content: &str) -> Vec<String> {
        content.split(' ').map(str::to_string).collect()
    }

    fn unmarshal(&self, tokens: &[String]) -> String {
        tokens.join(" ")
    }
}

/// Key/value-aware strategy for logfmt-shaped lines. Keys become
/// exact-match tokens of the form `\0key=`, which keeps messages with
/// different field sets from merging, while values stay free to
/// generalize. Quoted values are optionally tokenized inside the quotes.
pub struct LogfmtTokenizer {
    pub tokenize_inside_quotes: bool,
}

impl Tokenizer for LogfmtTokenizer {
    fn marshal(&self, content: &str) -> Vec<String> {
        let mut tokens = Vec::new();
        for field in split_fields(content) {
            match field.split_once('=') {
                Some((key, value)) if !key.is_empty() && !key.contains('"') => {
                    tokens.push(format!("\0{key}="));
                    let unquoted = value
                        .strip_prefix('"')
                        .and_then(|inner| inner.strip_suffix('"'));
                    match unquoted {
                        Some(inner) if self.tokenize_inside_quotes => {
                            tokens.extend(
                                inner.split(' ').filter(|t| !t.is_empty()).map(str::to_string),
                            );
                        }
                        Some(inner) => {
                            if !inner.is_empty() {
                                tokens.push(inner.to_string());
                            }
                        }
                        None => {
                            if !value.is_empty() {
                                tokens.push(value.to_string());
                            }
                        }
                    }
                }
                _ => tokens.push(field),
            }
        }
        tokens
    }

    fn unmarshal(&self, tokens: &[String]) -> String {
        let mut out = String::new();
        let mut glue_next = false;
        for token in tokens {
            if let Some(key) = token.strip_prefix(EXACT_MATCH_MARK) {
                if !out.is_empty() {
                    out.push(' ');
                }
                out.push_str(key);
                glue_next = true;
            } else {
                if glue_next {
                    glue_next = false;
                } else if !out.is_empty() {
                    out.push(' ');
                }
                out.push_str(token);
            }
        }
        out
    }
}

/// Splits on spaces outside double quotes, keeping the quotes in place.
fn split_fields(content: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    for ch in content.chars() {
        match ch {
            '"' => {
                in_quotes = !in_quotes;
                current.push(ch);
            }
            ' ' if !in_quotes => fields.push(std::mem::take(&mut current)),
            _ => current.push(ch),
        }
    }
    fields.push(current);
    fields
}

/// Splits an already-templated pattern string into tokens, collapsing
/// wildcard runs.
pub fn tokenize_pattern(content: &str, placeholder: &str) -> Vec<String> {
    let tokens: Vec<String> = content.split(' ').map(str::to_string).collect();
    deduplicate_placeholders(&tokens, placeholder)
}

/// Drops a token iff it is the placeholder and repeats its predecessor.
/// Runs of `<_> <_> ...` collapse to one; isolated placeholders between
/// literals survive. Idempotent.
pub fn deduplicate_placeholders(tokens: &[String], placeholder: &str) -> Vec<String> {
    if tokens.len() < 2 {
        return tokens.to_vec();
    }
    let mut out = Vec::with_capacity(tokens.len());
    for (i, token) in tokens.iter().enumerate() {
        if i > 0 && token == placeholder && *token == tokens[i - 1] {
            continue;
        }
        out.push(token.clone());
    }
    out
}

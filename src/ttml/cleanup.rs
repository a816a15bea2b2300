/*!
 * Whitespace and markup cleanup for rendered SRT text.
 *
 * Rendered markup is split into tokens (opening tags, closing tags and text)
 * and rewritten by a fixed sequence of [`CleanupStep`]s. Only the four tags
 * the renderer emits are recognized: `<font color="...">`, `</font>`, `<i>`
 * and `</i>`. Anything else, including a stray `<`, is plain text.
 */

use std::fmt::Write;

/// One unit of rendered markup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    OpenFont(String),
    OpenItalic,
    CloseFont,
    CloseItalic,
    Text(String),
}

impl Token {
    fn is_open(&self) -> bool {
        matches!(self, Token::OpenFont(_) | Token::OpenItalic)
    }

    fn is_close(&self) -> bool {
        matches!(self, Token::CloseFont | Token::CloseItalic)
    }

    fn text(&self) -> Option<&str> {
        match self {
            Token::Text(text) => Some(text),
            _ => None,
        }
    }

    fn whitespace(&self) -> Option<&str> {
        self.text().filter(|t| t.chars().all(char::is_whitespace))
    }
}

/// Split markup into tokens. Adjacent text is merged and empty text dropped.
pub fn tokenize(markup: &str) -> Vec<Token> {
    const OPEN_FONT: &str = "<font color=\"";

    let mut tokens = Vec::new();
    let mut text = String::new();
    let mut rest = markup;

    while let Some(c) = rest.chars().next() {
        let tag = if c != '<' {
            None
        } else if let Some(after) = rest.strip_prefix("<i>") {
            Some((Token::OpenItalic, after))
        } else if let Some(after) = rest.strip_prefix("</i>") {
            Some((Token::CloseItalic, after))
        } else if let Some(after) = rest.strip_prefix("</font>") {
            Some((Token::CloseFont, after))
        } else if let Some(after) = rest.strip_prefix(OPEN_FONT) {
            after
                .find('"')
                .filter(|&quote| quote > 0 && after[quote..].starts_with("\">"))
                .map(|quote| (Token::OpenFont(after[..quote].to_string()), &after[quote + 2..]))
        } else {
            None
        };

        match tag {
            Some((token, after)) => {
                if !text.is_empty() {
                    tokens.push(Token::Text(std::mem::take(&mut text)));
                }
                tokens.push(token);
                rest = after;
            }
            None => {
                text.push(c);
                rest = &rest[c.len_utf8()..];
            }
        }
    }

    if !text.is_empty() {
        tokens.push(Token::Text(text));
    }
    tokens
}

/// Serialize tokens back to markup
pub fn render_tokens(tokens: &[Token]) -> String {
    let mut out = String::new();
    for token in tokens {
        match token {
            Token::OpenFont(color) => {
                let _ = write!(out, "<font color=\"{}\">", color);
            }
            Token::OpenItalic => out.push_str("<i>"),
            Token::CloseFont => out.push_str("</font>"),
            Token::CloseItalic => out.push_str("</i>"),
            Token::Text(text) => out.push_str(text),
        }
    }
    out
}

fn normalize(tokens: Vec<Token>) -> Vec<Token> {
    let mut out: Vec<Token> = Vec::with_capacity(tokens.len());
    for token in tokens {
        match token {
            Token::Text(text) if text.is_empty() => {}
            Token::Text(text) => match out.last_mut() {
                Some(Token::Text(previous)) => previous.push_str(&text),
                _ => out.push(Token::Text(text)),
            },
            other => out.push(other),
        }
    }
    out
}

/// Rewrites applied, in order, to every rendered element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanupStep {
    /// `" <i>  x"` becomes `" <i>x"` when the opening tags start the text or follow whitespace
    StripSpacesAfterOpeningTags,
    /// `"x  </i> "` becomes `"x</i> "` when the closing tags end the text or precede whitespace
    StripSpacesBeforeClosingTags,
    /// A newline followed by whitespace becomes a bare newline
    TrimIndentAfterNewlines,
    /// Whitespace followed by a newline becomes a bare newline
    TrimWhitespaceBeforeNewlines,
    /// `<font C1><font C2>text</font></font>` keeps only the inner color
    CollapseNestedFonts,
    /// `"x\n</i>"` becomes `"x</i>\n"`
    MoveNewlinesPastClosingTags,
    /// A font tag around nothing but whitespace is replaced by that whitespace
    DropEmptyFonts,
}

impl CleanupStep {
    /// Every step in application order
    pub const ALL: [CleanupStep; 7] = [
        CleanupStep::StripSpacesAfterOpeningTags,
        CleanupStep::StripSpacesBeforeClosingTags,
        CleanupStep::TrimIndentAfterNewlines,
        CleanupStep::TrimWhitespaceBeforeNewlines,
        CleanupStep::CollapseNestedFonts,
        CleanupStep::MoveNewlinesPastClosingTags,
        CleanupStep::DropEmptyFonts,
    ];

    /// Apply this step to a token stream
    pub fn apply(self, tokens: Vec<Token>) -> Vec<Token> {
        let tokens = match self {
            CleanupStep::StripSpacesAfterOpeningTags => strip_spaces_after_opening_tags(tokens),
            CleanupStep::StripSpacesBeforeClosingTags => strip_spaces_before_closing_tags(tokens),
            CleanupStep::TrimIndentAfterNewlines => map_whitespace_runs(tokens, trim_indent_after_newline),
            CleanupStep::TrimWhitespaceBeforeNewlines => {
                map_whitespace_runs(tokens, trim_whitespace_before_newline)
            }
            CleanupStep::CollapseNestedFonts => collapse_nested_fonts(tokens),
            CleanupStep::MoveNewlinesPastClosingTags => move_newlines_past_closing_tags(tokens),
            CleanupStep::DropEmptyFonts => drop_empty_fonts(tokens),
        };
        normalize(tokens)
    }

    /// Apply this step to markup text
    pub fn apply_to(self, markup: &str) -> String {
        render_tokens(&self.apply(tokenize(markup)))
    }
}

/// Run every cleanup step over `markup`
pub fn cleanup(markup: &str) -> String {
    let tokens = CleanupStep::ALL
        .iter()
        .fold(tokenize(markup), |tokens, step| step.apply(tokens));
    render_tokens(&tokens)
}

// End (exclusive) of the run of tokens starting at `start` that satisfy `pred`
fn run_end(tokens: &[Token], start: usize, pred: impl Fn(&Token) -> bool) -> usize {
    tokens[start..]
        .iter()
        .position(|t| !pred(t))
        .map_or(tokens.len(), |offset| start + offset)
}

fn strip_spaces_after_opening_tags(mut tokens: Vec<Token>) -> Vec<Token> {
    // Set when a text token was emptied by stripping; the whitespace it held still counts
    let mut emptied = false;
    let mut i = 0;
    while i < tokens.len() {
        if !tokens[i].is_open() {
            i += 1;
            continue;
        }
        let end = run_end(&tokens, i, Token::is_open);
        let after_whitespace = i == 0
            || match &tokens[i - 1] {
                Token::Text(t) if t.is_empty() => emptied,
                Token::Text(t) => t.ends_with(char::is_whitespace),
                _ => false,
            };
        emptied = false;
        if after_whitespace {
            if let Some(Token::Text(text)) = tokens.get_mut(end) {
                let stripped = text.trim_start_matches(' ');
                emptied = stripped.is_empty() && !text.is_empty();
                *text = stripped.to_string();
            }
        }
        i = end;
    }
    tokens
}

fn strip_spaces_before_closing_tags(mut tokens: Vec<Token>) -> Vec<Token> {
    let mut i = 0;
    while i < tokens.len() {
        if !tokens[i].is_close() {
            i += 1;
            continue;
        }
        let end = run_end(&tokens, i, Token::is_close);
        let before_whitespace = tokens
            .get(end)
            .is_none_or(|t| t.text().is_some_and(|t| t.starts_with(char::is_whitespace)));
        if before_whitespace && i > 0 {
            if let Token::Text(text) = &mut tokens[i - 1] {
                *text = text.trim_end_matches(' ').to_string();
            }
        }
        i = end;
    }
    tokens
}

fn map_whitespace_runs(tokens: Vec<Token>, rewrite: fn(&str) -> String) -> Vec<Token> {
    tokens
        .into_iter()
        .map(|token| match token {
            Token::Text(text) => {
                let mut out = String::with_capacity(text.len());
                let mut run = String::new();
                for c in text.chars() {
                    if c.is_whitespace() {
                        run.push(c);
                    } else {
                        if !run.is_empty() {
                            out.push_str(&rewrite(&run));
                            run.clear();
                        }
                        out.push(c);
                    }
                }
                if !run.is_empty() {
                    out.push_str(&rewrite(&run));
                }
                Token::Text(out)
            }
            other => other,
        })
        .collect()
}

fn trim_indent_after_newline(run: &str) -> String {
    match run.find('\n') {
        Some(newline) => format!("{}\n", &run[..newline]),
        None => run.to_string(),
    }
}

fn trim_whitespace_before_newline(run: &str) -> String {
    match run.rfind('\n') {
        Some(newline) => format!("\n{}", &run[newline + 1..]),
        None => run.to_string(),
    }
}

fn collapse_nested_fonts(tokens: Vec<Token>) -> Vec<Token> {
    let mut out = Vec::with_capacity(tokens.len());
    let mut i = 0;
    while i < tokens.len() {
        match match_nested_fonts(&tokens, i) {
            Some((replacement, end)) => {
                out.extend(replacement);
                i = end;
            }
            None => {
                out.push(tokens[i].clone());
                i += 1;
            }
        }
    }
    out
}

// Matches `<font C1>[ws]<font C2>text</font>[ws]</font>` at `start`
fn match_nested_fonts(tokens: &[Token], start: usize) -> Option<(Vec<Token>, usize)> {
    let mut j = start;
    let Some(Token::OpenFont(_)) = tokens.get(j) else {
        return None;
    };
    j += 1;

    let leading = tokens.get(j).and_then(Token::whitespace).map(str::to_string);
    if leading.is_some() {
        j += 1;
    }

    let Some(Token::OpenFont(inner_color)) = tokens.get(j) else {
        return None;
    };
    let text = tokens.get(j + 1)?.text().filter(|t| !t.contains('<'))?;
    if tokens.get(j + 2) != Some(&Token::CloseFont) {
        return None;
    }
    j += 3;

    let trailing = tokens.get(j).and_then(Token::whitespace).map(str::to_string);
    if trailing.is_some() {
        j += 1;
    }
    if tokens.get(j) != Some(&Token::CloseFont) {
        return None;
    }

    let mut replacement = Vec::with_capacity(5);
    replacement.extend(leading.map(Token::Text));
    replacement.push(Token::OpenFont(inner_color.clone()));
    replacement.push(Token::Text(text.to_string()));
    replacement.push(Token::CloseFont);
    replacement.extend(trailing.map(Token::Text));
    Some((replacement, j + 1))
}

fn move_newlines_past_closing_tags(mut tokens: Vec<Token>) -> Vec<Token> {
    let mut i = 1;
    while i < tokens.len() {
        if !tokens[i].is_close() {
            i += 1;
            continue;
        }
        let end = run_end(&tokens, i, Token::is_close);
        let moved = match &mut tokens[i - 1] {
            Token::Text(text) if text.ends_with('\n') => {
                *text = text.trim_end_matches('\n').to_string();
                true
            }
            _ => false,
        };
        if moved {
            tokens.insert(end, Token::Text("\n".to_string()));
            i = end + 1;
        } else {
            i = end;
        }
    }
    tokens
}

fn drop_empty_fonts(tokens: Vec<Token>) -> Vec<Token> {
    let mut out = Vec::with_capacity(tokens.len());
    let mut i = 0;
    while i < tokens.len() {
        if let Token::OpenFont(_) = tokens[i] {
            let inner = tokens.get(i + 1).and_then(Token::whitespace);
            let close_at = if inner.is_some() { i + 2 } else { i + 1 };
            if tokens.get(close_at) == Some(&Token::CloseFont) {
                if let Some(whitespace) = inner {
                    out.push(Token::Text(whitespace.to_string()));
                }
                i = close_at + 1;
                continue;
            }
        }
        out.push(tokens[i].clone());
        i += 1;
    }
    out
}

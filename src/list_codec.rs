// 🧾 List Codec - serialization format for list-valued columns
//
// Two versions of the on-disk format are understood:
//
// v1 `Literal`   - bracketed, quoted sequence: ['Germany', "Côte d'Ivoire"]
//                  Items are single- or double-quoted strings separated by commas.
//                  Backslash escapes \\ \' \" \n \t are honoured. `[]` is empty.
// v2 `Delimited` - items joined by a separator character: Germany|France
//                  An empty cell is the empty list. No quoting or escaping.
//
// Nothing is ever evaluated: anything other than quoted strings inside the
// brackets is rejected.

// ============================================================================
// FORMAT
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListFormat {
    /// v1: bracketed quoted literal
    Literal,
    /// v2: separator-joined
    Delimited { separator: char },
}

impl Default for ListFormat {
    fn default() -> Self {
        ListFormat::Literal
    }
}

impl ListFormat {
    pub fn version(&self) -> u8 {
        match self {
            ListFormat::Literal => 1,
            ListFormat::Delimited { .. } => 2,
        }
    }

    /// Decode one cell into its items, in stored order
    pub fn decode(&self, raw: &str) -> Result<Vec<String>, String> {
        match self {
            ListFormat::Literal => decode_literal(raw),
            ListFormat::Delimited { separator } => Ok(decode_delimited(raw, *separator)),
        }
    }
}

fn decode_delimited(raw: &str, separator: char) -> Vec<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }

    trimmed
        .split(separator)
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

fn decode_literal(raw: &str) -> Result<Vec<String>, String> {
    let trimmed = raw.trim();

    let inner = trimmed
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .ok_or_else(|| "expected a bracketed list".to_string())?;

    let mut items = Vec::new();
    let mut chars = inner.chars().peekable();
    let mut expect_item = true;

    loop {
        while matches!(chars.peek(), Some(c) if c.is_whitespace()) {
            chars.next();
        }

        let Some(c) = chars.next() else {
            break;
        };

        match c {
            '\'' | '"' if expect_item => {
                items.push(read_quoted(&mut chars, c)?);
                expect_item = false;
            }
            ',' if !expect_item => {
                expect_item = true;
            }
            ',' => return Err("empty item between commas".to_string()),
            other if expect_item => {
                return Err(format!("unexpected character '{}', items must be quoted", other))
            }
            other => return Err(format!("expected ',' but found '{}'", other)),
        }
    }

    // A trailing comma (['a',]) is accepted
    Ok(items)
}

fn read_quoted<I>(chars: &mut std::iter::Peekable<I>, quote: char) -> Result<String, String>
where
    I: Iterator<Item = char>,
{
    let mut item = String::new();

    loop {
        match chars.next() {
            None => return Err("unterminated string".to_string()),
            Some('\\') => match chars.next() {
                Some('n') => item.push('\n'),
                Some('t') => item.push('\t'),
                Some(escaped @ ('\\' | '\'' | '"')) => item.push(escaped),
                Some(other) => {
                    item.push('\\');
                    item.push(other);
                }
                None => return Err("unterminated escape".to_string()),
            },
            Some(c) if c == quote => return Ok(item),
            Some(c) => item.push(c),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_empty() {
        assert_eq!(ListFormat::Literal.decode("[]").unwrap(), Vec::<String>::new());
        assert_eq!(ListFormat::Literal.decode("  [ ]  ").unwrap(), Vec::<String>::new());
    }

    #[test]
    fn test_literal_mixed_quotes_and_escapes() {
        let items = ListFormat::Literal
            .decode(r#"['Germany', "Côte d'Ivoire", 'it\'s']"#)
            .unwrap();

        assert_eq!(items, vec!["Germany", "Côte d'Ivoire", "it's"]);
    }

    #[test]
    fn test_literal_keeps_duplicates_and_order() {
        let items = ListFormat::Literal.decode("['Qatar', 'Qatar', 'Iran']").unwrap();
        assert_eq!(items, vec!["Qatar", "Qatar", "Iran"]);
    }

    #[test]
    fn test_literal_trailing_comma() {
        let items = ListFormat::Literal.decode("['a',]").unwrap();
        assert_eq!(items, vec!["a"]);
    }

    #[test]
    fn test_literal_rejects_code() {
        assert!(ListFormat::Literal.decode("__import__('os')").is_err());
        assert!(ListFormat::Literal.decode("[1, 2]").is_err());
        assert!(ListFormat::Literal.decode("['a' 'b']").is_err());
        assert!(ListFormat::Literal.decode("['a', , 'b']").is_err());
        assert!(ListFormat::Literal.decode("[,]").is_err());
        assert!(ListFormat::Literal.decode("['unterminated]").is_err());
        assert!(ListFormat::Literal.decode("").is_err());
    }

    #[test]
    fn test_delimited() {
        let format = ListFormat::Delimited { separator: '|' };

        assert_eq!(format.decode("").unwrap(), Vec::<String>::new());
        assert_eq!(
            format.decode("Olaf Scholz| Emmanuel Macron").unwrap(),
            vec!["Olaf Scholz", "Emmanuel Macron"]
        );
        assert_eq!(format.version(), 2);
    }
}

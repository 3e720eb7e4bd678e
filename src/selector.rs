use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SelectorAttrCondition {
    Exists { key: String },
    Eq { key: String, value: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct SelectorStep {
    pub(crate) tag: Option<String>,
    pub(crate) universal: bool,
    pub(crate) id: Option<String>,
    pub(crate) classes: Vec<String>,
    pub(crate) attrs: Vec<SelectorAttrCondition>,
}

impl SelectorStep {
    pub(crate) fn id_only(&self) -> Option<&str> {
        if !self.universal && self.tag.is_none() && self.classes.is_empty() && self.attrs.is_empty()
        {
            self.id.as_deref()
        } else {
            None
        }
    }

    fn is_empty(&self) -> bool {
        self.tag.is_none()
            && self.id.is_none()
            && self.classes.is_empty()
            && self.attrs.is_empty()
            && !self.universal
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SelectorCombinator {
    Descendant,
    Child,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SelectorPart {
    pub(crate) step: SelectorStep,
    // Relation to previous (left) selector part.
    pub(crate) combinator: Option<SelectorCombinator>,
}

pub(crate) fn parse_selector_groups(selector: &str) -> Result<Vec<Vec<SelectorPart>>> {
    split_selector_groups(selector)?
        .iter()
        .map(|group| parse_selector_chain(group))
        .collect()
}

fn parse_selector_chain(selector: &str) -> Result<Vec<SelectorPart>> {
    let selector = selector.trim();
    if selector.is_empty() {
        return Err(Error::UnsupportedSelector(selector.into()));
    }

    let mut steps = Vec::new();
    let mut pending_combinator: Option<SelectorCombinator> = None;

    for token in tokenize_selector(selector)? {
        if token == ">" {
            if pending_combinator.is_some() || steps.is_empty() {
                return Err(Error::UnsupportedSelector(selector.into()));
            }
            pending_combinator = Some(SelectorCombinator::Child);
            continue;
        }

        let step = parse_selector_step(&token)?;
        let combinator = if steps.is_empty() {
            None
        } else {
            Some(
                pending_combinator
                    .take()
                    .unwrap_or(SelectorCombinator::Descendant),
            )
        };
        steps.push(SelectorPart { step, combinator });
    }

    if steps.is_empty() || pending_combinator.is_some() {
        return Err(Error::UnsupportedSelector(selector.into()));
    }

    Ok(steps)
}

fn split_selector_groups(selector: &str) -> Result<Vec<String>> {
    let mut groups = Vec::new();
    let mut current = String::new();
    let mut bracket_depth = 0usize;

    for ch in selector.chars() {
        match ch {
            '[' => {
                bracket_depth += 1;
                current.push(ch);
            }
            ']' => {
                if bracket_depth == 0 {
                    return Err(Error::UnsupportedSelector(selector.into()));
                }
                bracket_depth -= 1;
                current.push(ch);
            }
            ',' if bracket_depth == 0 => {
                let trimmed = current.trim();
                if trimmed.is_empty() {
                    return Err(Error::UnsupportedSelector(selector.into()));
                }
                groups.push(trimmed.to_string());
                current.clear();
            }
            _ => current.push(ch),
        }
    }

    let trimmed = current.trim();
    if bracket_depth != 0 || trimmed.is_empty() {
        return Err(Error::UnsupportedSelector(selector.into()));
    }
    groups.push(trimmed.to_string());
    Ok(groups)
}

fn tokenize_selector(selector: &str) -> Result<Vec<String>> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut bracket_depth = 0usize;

    let flush = |current: &mut String, tokens: &mut Vec<String>| {
        if !current.trim().is_empty() {
            tokens.push(current.trim().to_string());
        }
        current.clear();
    };

    for ch in selector.chars() {
        match ch {
            '[' => {
                bracket_depth += 1;
                current.push(ch);
            }
            ']' => {
                if bracket_depth == 0 {
                    return Err(Error::UnsupportedSelector(selector.into()));
                }
                bracket_depth -= 1;
                current.push(ch);
            }
            '+' | '~' | '(' | ')' if bracket_depth == 0 => {
                return Err(Error::UnsupportedSelector(selector.into()));
            }
            '>' if bracket_depth == 0 => {
                flush(&mut current, &mut tokens);
                tokens.push(ch.to_string());
            }
            ch if ch.is_ascii_whitespace() && bracket_depth == 0 => {
                flush(&mut current, &mut tokens);
            }
            _ => current.push(ch),
        }
    }

    if bracket_depth != 0 {
        return Err(Error::UnsupportedSelector(selector.into()));
    }
    flush(&mut current, &mut tokens);

    Ok(tokens)
}

fn parse_selector_step(part: &str) -> Result<SelectorStep> {
    let part = part.trim();
    let bytes = part.as_bytes();
    let mut i = 0usize;
    let mut step = SelectorStep::default();

    while i < bytes.len() {
        match bytes[i] {
            b'*' => {
                if step.universal || step.tag.is_some() {
                    return Err(Error::UnsupportedSelector(part.into()));
                }
                step.universal = true;
                i += 1;
            }
            b'#' => {
                let Some((id, next)) = parse_selector_ident(part, i + 1) else {
                    return Err(Error::UnsupportedSelector(part.into()));
                };
                if step.id.replace(id).is_some() {
                    return Err(Error::UnsupportedSelector(part.into()));
                }
                i = next;
            }
            b'.' => {
                let Some((class_name, next)) = parse_selector_ident(part, i + 1) else {
                    return Err(Error::UnsupportedSelector(part.into()));
                };
                step.classes.push(class_name);
                i = next;
            }
            b'[' => {
                let (attr, next) = parse_selector_attr_condition(part, i)?;
                step.attrs.push(attr);
                i = next;
            }
            _ => {
                if !step.is_empty() {
                    return Err(Error::UnsupportedSelector(part.into()));
                }
                let Some((tag, next)) = parse_selector_ident(part, i) else {
                    return Err(Error::UnsupportedSelector(part.into()));
                };
                step.tag = Some(tag.to_ascii_lowercase());
                i = next;
            }
        }
    }

    if step.is_empty() {
        return Err(Error::UnsupportedSelector(part.into()));
    }
    Ok(step)
}

fn parse_selector_ident(src: &str, start: usize) -> Option<(String, usize)> {
    let bytes = src.as_bytes();
    if start >= bytes.len() || !is_selector_ident_char(bytes[start]) {
        return None;
    }
    let mut end = start + 1;
    while end < bytes.len() && is_selector_ident_char(bytes[end]) {
        end += 1;
    }
    Some((src.get(start..end)?.to_string(), end))
}

fn is_selector_ident_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'-'
}

fn parse_selector_attr_condition(
    src: &str,
    open_bracket: usize,
) -> Result<(SelectorAttrCondition, usize)> {
    let bytes = src.as_bytes();
    let mut i = open_bracket + 1;
    let mut quote: Option<u8> = None;

    while i < bytes.len() {
        let b = bytes[i];
        if let Some(q) = quote {
            if b == q {
                quote = None;
            }
            i += 1;
            continue;
        }

        if b == b'\'' || b == b'"' {
            quote = Some(b);
            i += 1;
            continue;
        }

        if b == b']' {
            let body = src
                .get(open_bracket + 1..i)
                .map(str::trim)
                .filter(|body| !body.is_empty())
                .ok_or_else(|| Error::UnsupportedSelector(src.into()))?;

            let cond = if let Some((key, value)) = body.split_once('=') {
                let key = key.trim().to_ascii_lowercase();
                if key.is_empty() || !key.bytes().all(is_selector_ident_char) {
                    return Err(Error::UnsupportedSelector(src.into()));
                }
                let value = value.trim();
                let value = if value.len() >= 2
                    && ((value.starts_with('"') && value.ends_with('"'))
                        || (value.starts_with('\'') && value.ends_with('\'')))
                {
                    value[1..value.len() - 1].to_string()
                } else {
                    value.to_string()
                };
                SelectorAttrCondition::Eq { key, value }
            } else {
                if !body.bytes().all(is_selector_ident_char) {
                    return Err(Error::UnsupportedSelector(src.into()));
                }
                SelectorAttrCondition::Exists {
                    key: body.to_ascii_lowercase(),
                }
            };
            return Ok((cond, i + 1));
        }

        i += 1;
    }

    Err(Error::UnsupportedSelector(src.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_compound_step_with_attribute() -> Result<()> {
        let groups = parse_selector_groups("section[id]")?;
        assert_eq!(groups.len(), 1);
        let step = &groups[0][0].step;
        assert_eq!(step.tag.as_deref(), Some("section"));
        assert_eq!(
            step.attrs,
            vec![SelectorAttrCondition::Exists { key: "id".into() }]
        );
        Ok(())
    }

    #[test]
    fn parses_groups_and_combinators() -> Result<()> {
        let groups = parse_selector_groups(".card, #navMenu > a, nav a[href='#about']")?;
        assert_eq!(groups.len(), 3);
        assert_eq!(groups[1][1].combinator, Some(SelectorCombinator::Child));
        assert_eq!(groups[2][1].combinator, Some(SelectorCombinator::Descendant));
        assert_eq!(
            groups[2][1].step.attrs,
            vec![SelectorAttrCondition::Eq {
                key: "href".into(),
                value: "#about".into()
            }]
        );
        Ok(())
    }

    #[test]
    fn id_only_detects_fast_path() -> Result<()> {
        let groups = parse_selector_groups("#hero")?;
        assert_eq!(groups[0][0].step.id_only(), Some("hero"));
        let groups = parse_selector_groups("div#hero")?;
        assert_eq!(groups[0][0].step.id_only(), None);
        Ok(())
    }

    #[test]
    fn rejects_unsupported_syntax() {
        for selector in ["", "#", "a + b", "li:first-child", "a >", "[", "a,,b", "#a#b"] {
            assert!(
                matches!(
                    parse_selector_groups(selector),
                    Err(Error::UnsupportedSelector(_))
                ),
                "selector {selector:?} should be rejected"
            );
        }
    }
}

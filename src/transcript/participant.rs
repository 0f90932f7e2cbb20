//! Participant declarations: `@handle(R,col:#f00,pic:🐱,display:Name)`.

use super::color::{is_valid_color, split_top_level};
use super::model::{default_avatar, Participant, Side};

/// A parameter that was not applied to the participant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejected {
    /// `col:` value that is not a color.
    Color(String),
    /// Anything other than `L`, `R`, `pic:`, `display:` or `col:`.
    Unknown(String),
}

/// A parsed declaration plus whatever was thrown away while reading it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub participant: Participant,
    pub rejected: Vec<Rejected>,
}

/// Parse a single `@...` declaration line.
///
/// The handle runs up to the first whitespace or `(`. Parameters sit between
/// that `(` and its matching `)`; commas inside nested parentheses belong to
/// the value, so `col:rgba(0,0,0,.5)` stays whole.
pub fn parse_declaration(line: &str) -> Option<Declaration> {
    let rest = line.trim().strip_prefix('@')?;
    let handle_end = rest
        .find(|c: char| c.is_whitespace() || c == '(' || c == ')')
        .unwrap_or(rest.len());
    let handle = &rest[..handle_end];
    if handle.is_empty() {
        return None;
    }

    let mut participant = Participant::fallback(handle);
    let mut rejected = Vec::new();

    if let Some(params) = params_after(&rest[handle_end..]) {
        for param in split_top_level(params, |c| c == ',') {
            let param = param.trim();
            if param.is_empty() {
                continue;
            }
            if let Some(side) = Side::from_token(param) {
                participant.side = side;
                continue;
            }
            let Some((key, value)) = param.split_once(':') else {
                rejected.push(Rejected::Unknown(param.to_string()));
                continue;
            };
            let value = value.trim();
            match key.trim() {
                "pic" => {
                    participant.avatar = if value.is_empty() {
                        default_avatar(handle)
                    } else {
                        value.to_string()
                    };
                }
                "display" => {
                    participant.display_name = if value.is_empty() {
                        handle.to_string()
                    } else {
                        value.to_string()
                    };
                }
                "col" if is_valid_color(value) => {
                    participant.accent_color = Some(value.to_string());
                }
                "col" => rejected.push(Rejected::Color(value.to_string())),
                _ => rejected.push(Rejected::Unknown(param.to_string())),
            }
        }
    }

    Some(Declaration {
        participant,
        rejected,
    })
}

/// Contents of the parameter list directly after the handle, if any.
/// An unclosed list runs to the end of the line.
fn params_after(rest: &str) -> Option<&str> {
    let body = rest.strip_prefix('(')?;
    let mut depth = 0usize;
    for (i, c) in body.char_indices() {
        match c {
            '(' => depth += 1,
            ')' if depth == 0 => return Some(&body[..i]),
            ')' => depth -= 1,
            _ => {}
        }
    }
    Some(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn participant(line: &str) -> Participant {
        parse_declaration(line).unwrap().participant
    }

    #[test]
    fn test_full_declaration() {
        let p = participant("@alice(R,col:#ff0000,display:Alice W)");
        assert_eq!(p.handle, "alice");
        assert_eq!(p.side, Side::Right);
        assert_eq!(p.accent_color.as_deref(), Some("#ff0000"));
        assert_eq!(p.display_name, "Alice W");
        assert_eq!(p.avatar, "A");
    }

    #[test]
    fn test_bare_handle_defaults() {
        let p = participant("@bob");
        assert_eq!(p.display_name, "bob");
        assert_eq!(p.side, Side::Left);
        assert!(p.accent_color.is_none());
        assert_eq!(p.avatar, "B");
    }

    #[test]
    fn test_invalid_color_discarded() {
        let decl = parse_declaration("@bob(col:not-a-color)").unwrap();
        assert!(decl.participant.accent_color.is_none());
        assert_eq!(
            decl.rejected,
            vec![Rejected::Color("not-a-color".to_string())]
        );
    }

    #[test]
    fn test_color_with_nested_commas() {
        let p = participant("@carol(col:rgba(0, 128, 255, 0.5), L)");
        assert_eq!(p.accent_color.as_deref(), Some("rgba(0, 128, 255, 0.5)"));
        assert_eq!(p.side, Side::Left);
    }

    #[test]
    fn test_value_keeps_later_colons() {
        let p = participant("@dave(display:Dave: the builder)");
        assert_eq!(p.display_name, "Dave: the builder");
    }

    #[test]
    fn test_pic_and_cjk_default() {
        assert_eq!(participant("@小明").avatar, "小");
        assert_eq!(participant("@eve(pic:🐱)").avatar, "🐱");
        assert_eq!(participant("@eve(pic:)").avatar, "E");
        assert_eq!(participant("@eve(display:)").display_name, "eve");
    }

    #[test]
    fn test_unknown_params_reported() {
        let decl = parse_declaration("@zed(X, size:3)").unwrap();
        assert_eq!(
            decl.rejected,
            vec![
                Rejected::Unknown("X".to_string()),
                Rejected::Unknown("size:3".to_string()),
            ]
        );
    }

    #[test]
    fn test_not_a_declaration() {
        assert!(parse_declaration("alice: hi").is_none());
        assert!(parse_declaration("@").is_none());
        assert!(parse_declaration("@(R)").is_none());
    }

    #[test]
    fn test_space_before_params_means_no_params() {
        let p = participant("@frank (R)");
        assert_eq!(p.handle, "frank");
        assert_eq!(p.side, Side::Left);
    }
}

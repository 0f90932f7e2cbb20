//! A small CSS color grammar.
//!
//! Covers hex notation, `rgb()`/`rgba()`/`hsl()`/`hsla()`, named colors, and
//! gradient functions for background values. This is not a full CSS parser;
//! anything outside these forms is rejected.

/// CSS named colors, lowercase.
const NAMED_COLORS: &[&str] = &[
    "aliceblue", "antiquewhite", "aqua", "aquamarine", "azure", "beige", "bisque", "black",
    "blanchedalmond", "blue", "blueviolet", "brown", "burlywood", "cadetblue", "chartreuse",
    "chocolate", "coral", "cornflowerblue", "cornsilk", "crimson", "cyan", "darkblue",
    "darkcyan", "darkgoldenrod", "darkgray", "darkgreen", "darkgrey", "darkkhaki",
    "darkmagenta", "darkolivegreen", "darkorange", "darkorchid", "darkred", "darksalmon",
    "darkseagreen", "darkslateblue", "darkslategray", "darkslategrey", "darkturquoise",
    "darkviolet", "deeppink", "deepskyblue", "dimgray", "dimgrey", "dodgerblue", "firebrick",
    "floralwhite", "forestgreen", "fuchsia", "gainsboro", "ghostwhite", "gold", "goldenrod",
    "gray", "green", "greenyellow", "grey", "honeydew", "hotpink", "indianred", "indigo",
    "ivory", "khaki", "lavender", "lavenderblush", "lawngreen", "lemonchiffon", "lightblue",
    "lightcoral", "lightcyan", "lightgoldenrodyellow", "lightgray", "lightgreen", "lightgrey",
    "lightpink", "lightsalmon", "lightseagreen", "lightskyblue", "lightslategray",
    "lightslategrey", "lightsteelblue", "lightyellow", "lime", "limegreen", "linen", "magenta",
    "maroon", "mediumaquamarine", "mediumblue", "mediumorchid", "mediumpurple",
    "mediumseagreen", "mediumslateblue", "mediumspringgreen", "mediumturquoise",
    "mediumvioletred", "midnightblue", "mintcream", "mistyrose", "moccasin", "navajowhite",
    "navy", "oldlace", "olive", "olivedrab", "orange", "orangered", "orchid", "palegoldenrod",
    "palegreen", "paleturquoise", "palevioletred", "papayawhip", "peachpuff", "peru", "pink",
    "plum", "powderblue", "purple", "rebeccapurple", "red", "rosybrown", "royalblue",
    "saddlebrown", "salmon", "sandybrown", "seagreen", "seashell", "sienna", "silver",
    "skyblue", "slateblue", "slategray", "slategrey", "snow", "springgreen", "steelblue", "tan",
    "teal", "thistle", "tomato", "turquoise", "violet", "wheat", "white", "whitesmoke",
    "yellow", "yellowgreen", "transparent", "currentcolor",
];

const COLOR_FUNCTIONS: &[&str] = &["rgb", "rgba", "hsl", "hsla"];

const GRADIENT_FUNCTIONS: &[&str] = &[
    "linear-gradient",
    "radial-gradient",
    "conic-gradient",
    "repeating-linear-gradient",
    "repeating-radial-gradient",
    "repeating-conic-gradient",
];

const UNITS: &[&str] = &["%", "deg", "grad", "rad", "turn"];

/// Whether `value` is a plain color (no gradients).
pub fn is_valid_color(value: &str) -> bool {
    let value = value.trim().to_ascii_lowercase();
    if value.is_empty() {
        return false;
    }
    if let Some(hex) = value.strip_prefix('#') {
        return matches!(hex.len(), 3 | 4 | 6 | 8) && hex.chars().all(|c| c.is_ascii_hexdigit());
    }
    if let Some((name, args)) = split_function(&value) {
        return COLOR_FUNCTIONS.contains(&name) && valid_color_args(args);
    }
    NAMED_COLORS.contains(&value.as_str())
}

/// Whether `value` can paint a background: a color or a gradient.
pub fn is_valid_paint(value: &str) -> bool {
    if is_valid_color(value) {
        return true;
    }
    let value = value.trim().to_ascii_lowercase();
    match split_function(&value) {
        Some((name, args)) if GRADIENT_FUNCTIONS.contains(&name) => valid_gradient_args(args),
        _ => false,
    }
}

/// Split `name(args)` into its parts. Parentheses must balance and the
/// closing one must end the value.
fn split_function(value: &str) -> Option<(&str, &str)> {
    let open = value.find('(')?;
    let inner = value[open + 1..].strip_suffix(')')?;
    let name = value[..open].trim();
    if name.is_empty() || !balanced(inner) {
        return None;
    }
    Some((name, inner))
}

fn balanced(s: &str) -> bool {
    let mut depth = 0usize;
    for c in s.chars() {
        match c {
            '(' => depth += 1,
            ')' => match depth.checked_sub(1) {
                Some(d) => depth = d,
                None => return false,
            },
            _ => {}
        }
    }
    depth == 0
}

/// Split on separator characters that sit outside any parentheses.
/// Empty pieces are kept so callers can reject them.
pub(crate) fn split_top_level(s: &str, is_sep: impl Fn(char) -> bool) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in s.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            c if depth == 0 && is_sep(c) => {
                parts.push(&s[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&s[start..]);
    parts
}

fn is_number(token: &str) -> bool {
    let token = token.strip_prefix(|c| c == '+' || c == '-').unwrap_or(token);
    let mut seen_digit = false;
    let mut seen_dot = false;
    for c in token.chars() {
        match c {
            '0'..='9' => seen_digit = true,
            '.' if !seen_dot => seen_dot = true,
            _ => return false,
        }
    }
    seen_digit
}

fn is_component(token: &str) -> bool {
    if token == "none" {
        return true;
    }
    let number = UNITS
        .iter()
        .find_map(|unit| token.strip_suffix(unit))
        .unwrap_or(token);
    is_number(number)
}

fn valid_color_args(args: &str) -> bool {
    let components: Vec<&str> = if args.contains(',') {
        args.split(',').map(str::trim).collect()
    } else {
        let mut halves = args.splitn(2, '/');
        let mut comps: Vec<&str> = halves
            .next()
            .unwrap_or_default()
            .split_whitespace()
            .collect();
        if let Some(alpha) = halves.next() {
            if comps.len() != 3 {
                return false;
            }
            comps.push(alpha.trim());
        }
        comps
    };
    matches!(components.len(), 3 | 4) && components.iter().all(|c| is_component(c))
}

fn valid_gradient_args(args: &str) -> bool {
    let stops = split_top_level(args, |c| c == ',')
        .into_iter()
        .map(str::trim)
        .filter(|arg| {
            split_top_level(arg, char::is_whitespace)
                .into_iter()
                .find(|t| !t.is_empty())
                .is_some_and(is_valid_color)
        })
        .count();
    stops >= 2
}

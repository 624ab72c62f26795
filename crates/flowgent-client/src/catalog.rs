//! Node presentation tables
//!
//! TigerStyle: Ordered static tables, first match wins.
//!
//! Formatting conveniences for node cards: display names derived from the
//! dotted type identifier, and category/icon/popularity looked up by
//! case-insensitive substring match against ordered tables. Table order is
//! part of the contract: specific keys must precede generic ones ("gmail"
//! and "wait" both contain "ai"), and the first matching key wins.

/// Character budget for full node descriptions
pub const NODE_DESCRIPTION_CHARS_MAX: usize = 200;

/// Character budget for preview-card descriptions
pub const NODE_PREVIEW_CHARS_MAX: usize = 120;

/// Default category for unmatched node types
pub const CATEGORY_DEFAULT: &str = "Other";

/// Default icon for unmatched node types
pub const ICON_DEFAULT: &str = "⚙️";

/// Default popularity score for unmatched node types
pub const POPULARITY_DEFAULT: u32 = 30;

/// Category lookup, keyed by lowercase substring of the node type
const CATEGORIES: &[(&str, &str)] = &[
    ("webhook", "Trigger"),
    ("schedule", "Trigger"),
    ("cron", "Trigger"),
    ("trigger", "Trigger"),
    ("httprequest", "Core"),
    ("http", "Core"),
    ("code", "Core"),
    ("function", "Core"),
    ("set", "Core"),
    ("wait", "Flow"),
    ("switch", "Flow"),
    ("merge", "Flow"),
    ("if", "Flow"),
    ("slack", "Communication"),
    ("gmail", "Communication"),
    ("email", "Communication"),
    ("telegram", "Communication"),
    ("discord", "Communication"),
    ("sheet", "Data"),
    ("postgres", "Data"),
    ("mysql", "Data"),
    ("airtable", "Data"),
    ("notion", "Data"),
    ("openai", "AI"),
    ("ai", "AI"),
];

/// Icon lookup, same ordering rules as CATEGORIES
const ICONS: &[(&str, &str)] = &[
    ("webhook", "🪝"),
    ("schedule", "⏰"),
    ("cron", "⏰"),
    ("trigger", "⚡"),
    ("http", "🌐"),
    ("code", "📜"),
    ("function", "📜"),
    ("slack", "💬"),
    ("gmail", "📧"),
    ("email", "📧"),
    ("telegram", "✈️"),
    ("sheet", "📊"),
    ("postgres", "🗄️"),
    ("mysql", "🗄️"),
    ("notion", "📝"),
    ("openai", "🤖"),
    ("ai", "🤖"),
];

/// Popularity scores (0-100), same ordering rules as CATEGORIES
const POPULARITY: &[(&str, u32)] = &[
    ("httprequest", 95),
    ("webhook", 90),
    ("code", 85),
    ("set", 80),
    ("gmail", 72),
    ("slack", 70),
    ("if", 68),
    ("sheet", 66),
    ("schedule", 65),
    ("postgres", 60),
];

/// Derive a display name from the trailing dotted segment
///
/// `n8n-nodes-base.httpRequest` -> `Http Request`
pub fn display_name(node_type: &str) -> String {
    let segment = node_type.rsplit('.').next().unwrap_or(node_type);

    let mut name = String::with_capacity(segment.len() + 4);
    for (i, ch) in segment.chars().enumerate() {
        if i == 0 {
            name.extend(ch.to_uppercase());
        } else if ch.is_uppercase() {
            name.push(' ');
            name.push(ch);
        } else {
            name.push(ch);
        }
    }
    name
}

fn lookup<'a, T: Copy>(table: &'a [(&'a str, T)], node_type: &str) -> Option<T> {
    let haystack = node_type.to_lowercase();
    table
        .iter()
        .find(|(key, _)| haystack.contains(key))
        .map(|(_, value)| *value)
}

/// Category for a node type
pub fn category(node_type: &str) -> &'static str {
    lookup(CATEGORIES, node_type).unwrap_or(CATEGORY_DEFAULT)
}

/// Icon for a node type
pub fn icon(node_type: &str) -> &'static str {
    lookup(ICONS, node_type).unwrap_or(ICON_DEFAULT)
}

/// Popularity score for a node type
pub fn popularity(node_type: &str) -> u32 {
    lookup(POPULARITY, node_type).unwrap_or(POPULARITY_DEFAULT)
}

/// Truncate a description to a character budget
///
/// When over budget, the text is cut to budget-3 characters and an ASCII
/// ellipsis appended, keeping total length at the budget.
pub fn truncate_description(text: &str, budget: usize) -> String {
    let count = text.chars().count();
    if count <= budget {
        return text.to_string();
    }
    let keep = budget.saturating_sub(3);
    let mut out: String = text.chars().take(keep).collect();
    out.push_str("...");
    out
}

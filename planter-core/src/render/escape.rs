//! Escaping of user-controlled identifiers for PlantUML output.
//!
//! Table names, column names, types and relation labels come straight from the
//! database and are treated as untrusted markup. Every emitted label goes
//! through [`escape_label`]; entity references use the identifiers handed out
//! by [`EntityIds`].

use crate::models::Table;
use std::borrow::Cow;
use std::collections::{HashMap, HashSet};

/// Characters that can break out of a quoted name, an entity body or a label.
fn is_reserved(c: char) -> bool {
    matches!(c, '"' | '{' | '}' | '<' | '>' | '~' | '\\') || c.is_control()
}

/// Visibility and mandatory markers PlantUML reads at the start of a member.
fn is_member_prefix(c: char) -> bool {
    matches!(c, '-' | '#' | '+' | '*' | '/')
}

/// Creole markers that take effect when doubled (`**bold**`, `//italic//`,
/// `--strike--`, `__underline__`).
fn is_creole_marker(c: char) -> bool {
    matches!(c, '*' | '/' | '-' | '_')
}

fn needs_escape(previous: Option<char>, c: char) -> bool {
    is_reserved(c)
        || match previous {
            None => is_member_prefix(c),
            Some(p) => p == c && is_creole_marker(c),
        }
}

/// Escapes a label for use inside PlantUML markup.
///
/// Reserved characters, a leading member prefix and the second character of a
/// doubled creole marker are written as `<U+XXXX>` code points, which PlantUML
/// renders as the original character. Labels that need no escaping are
/// returned borrowed.
pub fn escape_label(text: &str) -> Cow<'_, str> {
    let mut previous = None;
    let clean = text.chars().all(|c| {
        let keep = !needs_escape(previous, c);
        previous = Some(c);
        keep
    });
    if clean {
        return Cow::Borrowed(text);
    }

    let mut escaped = String::with_capacity(text.len().saturating_add(16));
    let mut previous = None;
    for c in text.chars() {
        if needs_escape(previous, c) {
            escaped.push_str(&format!("<U+{:04X}>", u32::from(c)));
        } else {
            escaped.push(c);
        }
        previous = Some(c);
    }
    Cow::Owned(escaped)
}

/// Reduces a table name to a PlantUML identifier (`[A-Za-z0-9_]`, not
/// starting with a digit).
pub fn sanitize_identifier(name: &str) -> String {
    let mut id: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();

    if id.is_empty() || id.starts_with(|c: char| c.is_ascii_digit()) {
        id.insert(0, '_');
    }
    id
}

/// Entity identifiers for one document.
///
/// Plain ASCII table names keep their own name as identifier. Names that
/// sanitize to an identifier already taken get `_2`, `_3`, ... appended, in
/// table order, so the mapping is deterministic and injective.
#[derive(Debug, Clone, Default)]
pub struct EntityIds {
    ids: HashMap<String, String>,
}

impl EntityIds {
    /// Assigns identifiers to `tables` in order.
    pub fn new(tables: &[Table]) -> Self {
        let mut taken: HashSet<String> = HashSet::with_capacity(tables.len());
        let mut ids = HashMap::with_capacity(tables.len());

        // Exact matches claim their identifier first so that `a_b` keeps
        // `a_b` even when `a-b` comes earlier.
        for table in tables {
            if sanitize_identifier(&table.name) == table.name {
                taken.insert(table.name.clone());
                ids.insert(table.name.clone(), table.name.clone());
            }
        }

        for table in tables {
            if ids.contains_key(&table.name) {
                continue;
            }
            let base = sanitize_identifier(&table.name);
            let mut candidate = base.clone();
            let mut suffix: u32 = 1;
            while taken.contains(&candidate) {
                suffix = suffix.saturating_add(1);
                candidate = format!("{}_{}", base, suffix);
            }
            taken.insert(candidate.clone());
            ids.insert(table.name.clone(), candidate);
        }

        Self { ids }
    }

    /// Identifier of a table, `None` when the table is not in this document
    pub fn get(&self, table: &str) -> Option<&str> {
        self.ids.get(table).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_labels_are_borrowed() {
        assert!(matches!(escape_label("user_id"), Cow::Borrowed("user_id")));
        assert!(matches!(
            escape_label("character varying(255)"),
            Cow::Borrowed(_)
        ));
    }

    #[test]
    fn test_reserved_characters_are_escaped() {
        assert_eq!(escape_label("a\"b"), "a<U+0022>b");
        assert_eq!(escape_label("{x}"), "<U+007B>x<U+007D>");
        assert_eq!(escape_label("<<PK>>"), "<U+003C><U+003C>PK<U+003E><U+003E>");
        assert_eq!(escape_label("line\nbreak"), "line<U+000A>break");
        assert_eq!(escape_label("c:\\tmp~"), "c:<U+005C>tmp<U+007E>");
    }

    #[test]
    fn test_leading_member_prefix_is_escaped() {
        assert_eq!(escape_label("+x"), "<U+002B>x");
        assert_eq!(escape_label("-x"), "<U+002D>x");
        assert_eq!(escape_label("#id"), "<U+0023>id");
        assert_eq!(escape_label("*x"), "<U+002A>x");
        assert_eq!(escape_label("/x"), "<U+002F>x");
        // Only the first character is a member prefix
        assert!(matches!(escape_label("a+b-c#d"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_doubled_creole_markers_are_broken_up() {
        assert_eq!(escape_label("a**b"), "a*<U+002A>b");
        assert_eq!(escape_label("x//y"), "x/<U+002F>y");
        assert_eq!(escape_label("a--b"), "a-<U+002D>b");
        assert_eq!(escape_label("user__id"), "user_<U+005F>id");
        assert!(matches!(escape_label("_id"), Cow::Borrowed("_id")));
        assert!(matches!(escape_label("a_b-c"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_escaped_label_has_no_raw_reserved_characters() {
        let escaped = escape_label("}\r\n@enduml\n{\"");
        assert!(!escaped.contains(['"', '{', '}', '\n', '\r']));
    }

    #[test]
    fn test_sanitize_identifier() {
        assert_eq!(sanitize_identifier("users"), "users");
        assert_eq!(sanitize_identifier("order items"), "order_items");
        assert_eq!(sanitize_identifier("2fa_codes"), "_2fa_codes");
        assert_eq!(sanitize_identifier("späti"), "sp_ti");
        assert_eq!(sanitize_identifier(""), "_");
    }

    #[test]
    fn test_entity_ids_keep_plain_names() {
        let ids = EntityIds::new(&[Table::new("users"), Table::new("orders")]);
        assert_eq!(ids.get("users"), Some("users"));
        assert_eq!(ids.get("orders"), Some("orders"));
        assert_eq!(ids.get("missing"), None);
    }

    #[test]
    fn test_entity_ids_resolve_collisions() {
        let ids = EntityIds::new(&[
            Table::new("a-b"),
            Table::new("a b"),
            Table::new("a_b"),
        ]);
        assert_eq!(ids.get("a_b"), Some("a_b"));
        assert_eq!(ids.get("a-b"), Some("a_b_2"));
        assert_eq!(ids.get("a b"), Some("a_b_3"));
    }

    #[test]
    fn test_entity_ids_are_deterministic() {
        let tables = [Table::new("x.y"), Table::new("x y"), Table::new("x_y_2")];
        let first = EntityIds::new(&tables);
        let second = EntityIds::new(&tables);
        for table in &tables {
            assert_eq!(first.get(&table.name), second.get(&table.name));
        }
        assert_eq!(first.get("x_y_2"), Some("x_y_2"));
        assert_eq!(first.get("x.y"), Some("x_y"));
        assert_eq!(first.get("x y"), Some("x_y_3"));
    }
}

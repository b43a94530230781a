//! Wraps entity and relation blocks into a complete PlantUML document.

/// First line of every document
pub const START_MARKER: &str = "@startuml";
/// Last line of every document
pub const END_MARKER: &str = "@enduml";
/// Layout directives emitted after the optional title
pub const LAYOUT_DIRECTIVES: [&str; 2] = ["hide circle", "skinparam linetype ortho"];

/// Formats the title line, or `None` when there is no title.
///
/// The title is kept verbatim except for line breaks, which become PlantUML's
/// literal `\n` so the title stays on one source line.
pub fn title_line(title: Option<&str>) -> Option<String> {
    let title = title.filter(|t| !t.is_empty())?;
    let single_line = title
        .replace("\r\n", "\\n")
        .replace(['\r', '\n'], "\\n");
    Some(format!("title {}\n", single_line))
}

/// Assembles the final document.
///
/// The entity and relation blocks are copied unchanged; a blank line precedes
/// each non-empty block.
pub fn assemble(title: Option<&str>, entities: &str, relations: &str) -> String {
    let mut document = String::with_capacity(
        entities
            .len()
            .saturating_add(relations.len())
            .saturating_add(128),
    );

    document.push_str(START_MARKER);
    document.push('\n');
    if let Some(line) = title_line(title) {
        document.push_str(&line);
    }
    for directive in LAYOUT_DIRECTIVES {
        document.push_str(directive);
        document.push('\n');
    }

    for block in [entities, relations] {
        if !block.is_empty() {
            document.push('\n');
            document.push_str(block);
        }
    }

    document.push_str(END_MARKER);
    document.push('\n');
    document
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document() {
        assert_eq!(
            assemble(None, "", ""),
            "@startuml\nhide circle\nskinparam linetype ortho\n@enduml\n"
        );
    }

    #[test]
    fn test_title_only_when_non_empty() {
        assert!(assemble(Some("Shop"), "", "").contains("\ntitle Shop\n"));
        assert!(!assemble(Some(""), "", "").contains("title"));
        assert!(!assemble(None, "", "").contains("title"));
    }

    #[test]
    fn test_title_stays_on_one_line() {
        assert_eq!(
            title_line(Some("Shop\nschema\r\nv2")),
            Some("title Shop\\nschema\\nv2\n".to_string())
        );
    }

    #[test]
    fn test_blocks_are_preserved_byte_for_byte() {
        let entities = "entity \"a\" as a {\n}\n";
        let relations = "a --> a : x\n";
        let document = assemble(Some("T"), entities, relations);

        assert_eq!(
            document,
            "@startuml\ntitle T\nhide circle\nskinparam linetype ortho\n\n\
             entity \"a\" as a {\n}\n\na --> a : x\n@enduml\n"
        );
    }

    #[test]
    fn test_markers_frame_the_document() {
        let document = assemble(None, "entity \"a\" as a {\n}\n", "");
        assert!(document.starts_with("@startuml\n"));
        assert!(document.ends_with("}\n@enduml\n"));
    }
}

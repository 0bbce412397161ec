use std::sync::LazyLock;

use regex::Regex;

use super::workbook::{Sheet, Workbook};

/// Corporate suffixes and articles dropped before fuzzy sheet matching.
/// Each pattern removes its first occurrence only.
static RE_SIMPLIFY: LazyLock<[Regex; 4]> = LazyLock::new(|| {
    [
        Regex::new(r"(?i)The ").unwrap(),
        Regex::new(r"(?i) Company").unwrap(),
        Regex::new(r"(?i) Corporation").unwrap(),
        Regex::new(r"(?i) Holdings").unwrap(),
    ]
});

/// Which rule selected the sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetMatch {
    Metrics,
    ExactName,
    Simplified,
}

/// Entity name reduced for fuzzy comparison, e.g.
/// "The Mosaic Company" -> "mosaic".
pub fn simplify_entity_name(entity: &str) -> String {
    let mut name = entity.to_string();
    for re in RE_SIMPLIFY.iter() {
        name = re.replacen(&name, 1, "").into_owned();
    }
    name.trim().to_lowercase()
}

/// Picks the sheet to read for `entity`. First match wins within each rule.
pub fn resolve_sheet<'a>(workbook: &'a Workbook, entity: &str) -> Option<(&'a Sheet, SheetMatch)> {
    let sheets = workbook.sheets();

    if let Some(sheet) = sheets
        .iter()
        .find(|s| s.name.trim().to_lowercase() == "metrics")
    {
        return Some((sheet, SheetMatch::Metrics));
    }

    let entity_lower = entity.to_lowercase();
    if let Some(sheet) = sheets.iter().find(|s| s.name.to_lowercase() == entity_lower) {
        return Some((sheet, SheetMatch::ExactName));
    }

    let simplified = simplify_entity_name(entity);
    if simplified.is_empty() {
        return None;
    }

    sheets
        .iter()
        .find(|s| {
            let name = s.name.to_lowercase();
            name.contains(&simplified) || simplified.contains(&name)
        })
        .map(|sheet| (sheet, SheetMatch::Simplified))
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Lightweight scanner over written STEP text.
//!
//! Used to inspect generated files: count entities by type, look up an
//! entity's raw attributes and follow its `#id` references. Only the DATA
//! section is scanned and string literals are skipped when collecting
//! references.

use memchr::memchr;
use rustc_hash::FxHashMap;

/// One `#id=TYPE(...);` record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScannedEntity<'a> {
    pub id: u64,
    pub type_name: &'a str,
    /// Text between the outer parentheses
    pub attributes: &'a str,
}

impl<'a> ScannedEntity<'a> {
    /// Entity ids referenced by the attributes, in order of appearance
    pub fn references(&self) -> Vec<u64> {
        references(self.attributes)
    }

    /// Split top-level attributes on commas
    pub fn split_attributes(&self) -> Vec<&'a str> {
        split_top_level(self.attributes)
    }
}

/// Entity scanner over STEP content
pub struct EntityScanner<'a> {
    content: &'a str,
    position: usize,
}

impl<'a> EntityScanner<'a> {
    pub fn new(content: &'a str) -> Self {
        let position = content.find("DATA;").map_or(0, |p| p + 5);
        Self { content, position }
    }

    /// Scan for the next entity
    pub fn next_entity(&mut self) -> Option<ScannedEntity<'a>> {
        loop {
            let bytes = self.content.as_bytes();
            let rel = memchr(b'#', &bytes[self.position..])?;
            let start = self.position + rel;
            let end = statement_end(self.content, start)?;
            self.position = end + 1;

            let record = &self.content[start + 1..end];
            let Some(eq) = memchr(b'=', record.as_bytes()) else {
                continue;
            };
            let Ok(id) = record[..eq].trim().parse::<u64>() else {
                continue;
            };
            let body = record[eq + 1..].trim();
            let Some(open) = memchr(b'(', body.as_bytes()) else {
                continue;
            };
            if !body.ends_with(')') {
                continue;
            }
            return Some(ScannedEntity {
                id,
                type_name: body[..open].trim(),
                attributes: &body[open + 1..body.len() - 1],
            });
        }
    }

    /// Find all entities of a specific type
    pub fn find_by_type(&mut self, target_type: &str) -> Vec<ScannedEntity<'a>> {
        let mut results = Vec::new();
        while let Some(entity) = self.next_entity() {
            if entity.type_name.eq_ignore_ascii_case(target_type) {
                results.push(entity);
            }
        }
        results
    }

    /// Count entities by type
    pub fn count_by_type(&mut self) -> FxHashMap<String, usize> {
        let mut counts = FxHashMap::default();
        while let Some(entity) = self.next_entity() {
            *counts.entry(entity.type_name.to_string()).or_insert(0) += 1;
        }
        counts
    }

    /// Index every entity by id
    pub fn index(&mut self) -> FxHashMap<u64, ScannedEntity<'a>> {
        let mut index = FxHashMap::default();
        while let Some(entity) = self.next_entity() {
            index.insert(entity.id, entity);
        }
        index
    }
}

// Position of the terminating ';' of a statement, ignoring ';' inside strings
fn statement_end(content: &str, start: usize) -> Option<usize> {
    let bytes = content.as_bytes();
    let mut in_string = false;
    let mut i = start;
    while i < bytes.len() {
        match bytes[i] {
            b'\'' => in_string = !in_string,
            b';' if !in_string => return Some(i),
            _ => {}
        }
        i += 1;
    }
    None
}

fn references(attributes: &str) -> Vec<u64> {
    let bytes = attributes.as_bytes();
    let mut refs = Vec::new();
    let mut in_string = false;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\'' => in_string = !in_string,
            b'#' if !in_string => {
                let digits = bytes[i + 1..]
                    .iter()
                    .take_while(|b| b.is_ascii_digit())
                    .count();
                if let Ok(id) = attributes[i + 1..i + 1 + digits].parse() {
                    refs.push(id);
                }
                i += digits;
            }
            _ => {}
        }
        i += 1;
    }
    refs
}

fn split_top_level(attributes: &str) -> Vec<&str> {
    let bytes = attributes.as_bytes();
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut in_string = false;
    let mut last = 0;
    for (i, &b) in bytes.iter().enumerate() {
        match b {
            b'\'' => in_string = !in_string,
            b'(' if !in_string => depth += 1,
            b')' if !in_string => depth = depth.saturating_sub(1),
            b',' if !in_string && depth == 0 => {
                parts.push(attributes[last..i].trim());
                last = i + 1;
            }
            _ => {}
        }
    }
    if !attributes.is_empty() {
        parts.push(attributes[last..].trim());
    }
    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "ISO-10303-21;\nHEADER;\nFILE_NAME('#1=X(;)','',(''),(''),'','','');\nENDSEC;\nDATA;\n\
        #1=IFCCARTESIANPOINT((0.,0.,0.));\n\
        #2=IFCWALLSTANDARDCASE('id',#9,'a;b''#3',$,$,#1,$,$,$);\n\
        #3=IFCCARTESIANPOINT((1.,0.,0.));\n\
        ENDSEC;\nEND-ISO-10303-21;\n";

    #[test]
    fn test_scan_skips_header() {
        let counts = EntityScanner::new(SAMPLE).count_by_type();
        assert_eq!(counts.get("IFCCARTESIANPOINT"), Some(&2));
        assert_eq!(counts.get("IFCWALLSTANDARDCASE"), Some(&1));
        assert_eq!(counts.get("X"), None);
    }

    #[test]
    fn test_references_ignore_strings() {
        let walls = EntityScanner::new(SAMPLE).find_by_type("IfcWallStandardCase");
        assert_eq!(walls.len(), 1);
        assert_eq!(walls[0].references(), vec![9, 1]);
    }

    #[test]
    fn test_split_attributes() {
        let index = EntityScanner::new(SAMPLE).index();
        let wall = index[&2];
        let attrs = wall.split_attributes();
        assert_eq!(attrs.len(), 9);
        assert_eq!(attrs[2], "'a;b''#3'");
        assert_eq!(attrs[5], "#1");
        assert_eq!(index[&1].split_attributes(), vec!["(0.,0.,0.)"]);
    }
}

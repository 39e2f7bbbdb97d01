//! Plain-text tables in and out of the worklist: TSV seed files and
//! CSV/TSV exports for downstream analysis.

use std::collections::BTreeSet;
use std::io::Write;

use csv::{ReaderBuilder, Terminator, Trim, WriterBuilder};

use crate::item::Item;
use crate::store::WorklistStore;
use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delim {
    Csv,
    Tsv,
}

impl Delim {
    pub fn byte(self) -> u8 {
        match self {
            Delim::Csv => b',',
            Delim::Tsv => b'\t',
        }
    }
}

/// Parses `identity<TAB>locator` lines. Blank lines and `#` comments are
/// skipped; quotes are taken literally since titles contain them.
pub fn parse_seed(text: &str) -> Result<Vec<Item>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .delimiter(Delim::Tsv.byte())
        .comment(Some(b'#'))
        .quoting(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(text.as_bytes());

    let mut items = Vec::new();
    for record in reader.records() {
        let record = record?;
        let line = record.position().map_or(0, |pos| pos.line() as usize);
        match (record.len(), record.get(0), record.get(1)) {
            (2, Some(identity), Some(locator)) if !identity.is_empty() && !locator.is_empty() => {
                items.push(Item::new(identity, locator));
            }
            _ => return Err(Error::SeedLine(line)),
        }
    }
    Ok(items)
}

/// Adds seed items that aren't in the store yet. Returns how many were added.
pub fn seed_store(store: &mut WorklistStore, items: Vec<Item>) -> Result<usize> {
    let mut added = 0;
    for item in items {
        if store.get(&item.identity).is_some() {
            tracing::debug!(identity = %item.identity, "already in worklist, skipping");
            continue;
        }
        store.insert(item)?;
        added += 1;
    }
    Ok(added)
}

/// Writes one row per item: identity, locator, status, then every field name
/// seen anywhere in the store, sorted. Missing values are empty cells.
pub fn write_export<W: Write>(store: &WorklistStore, w: W, delim: Delim) -> Result<()> {
    let field_names: BTreeSet<&str> = store
        .items()
        .flat_map(|item| item.fields.keys().map(String::as_str))
        .collect();

    let mut writer = WriterBuilder::new()
        .delimiter(delim.byte())
        .terminator(Terminator::Any(b'\n'))
        .from_writer(w);

    let mut header = vec!["identity", "locator", "status"];
    header.extend(field_names.iter().copied());
    writer.write_record(&header)?;

    for item in store.items() {
        let status = item.status.to_string();
        let mut row = vec![item.identity.as_str(), item.locator.as_str(), status.as_str()];
        row.extend(field_names.iter().map(|name| item.field(name).unwrap_or("")));
        writer.write_record(&row)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::item::{FieldSet, FieldValue};
    use crate::merge::CompletionPolicy;

    #[test]
    fn seed_skips_comments_and_rejects_bad_lines() {
        let items = parse_seed(
            "# films\nAirborne\t/wiki/Airborne_(1993_film)\n\nHackers\t/wiki/Hackers_(film)\r\n",
        )
        .unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].locator, "/wiki/Hackers_(film)");

        assert!(matches!(parse_seed("ok\t/ok\nno tab here\n"), Err(Error::SeedLine(2))));
        assert!(matches!(parse_seed("ok\t\n"), Err(Error::SeedLine(1))));

        let quoted = parse_seed("Say \"Anything\"\t/wiki/Say_Anything...\n").unwrap();
        assert_eq!(quoted[0].identity, "Say \"Anything\"");
    }

    #[test]
    fn seeding_twice_adds_nothing_new() {
        let mut store = WorklistStore::create("unused.json");
        let items = parse_seed("Airborne\t/wiki/Airborne\nHackers\t/wiki/Hackers\n").unwrap();
        assert_eq!(seed_store(&mut store, items.clone()).unwrap(), 2);
        assert_eq!(seed_store(&mut store, items).unwrap(), 0);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn export_unions_fields_and_quotes() {
        let mut store = WorklistStore::create("unused.json");
        store.insert(Item::new("Airborne", "/wiki/Airborne")).unwrap();
        store.insert(Item::new("Hackers", "/wiki/Hackers")).unwrap();

        let mut fields = FieldSet::new();
        fields.insert("Budget".into(), FieldValue::new("$1,000,000"));
        fields.insert("Release date".into(), FieldValue::new("1993"));
        fields.insert("Box office".into(), FieldValue::Missing);
        store
            .mark("Airborne", &Ok(fields), &CompletionPolicy::new(["Release date"]))
            .unwrap();

        let mut out = Vec::new();
        write_export(&store, &mut out, Delim::Csv).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "identity,locator,status,Box office,Budget,Release date\n\
             Airborne,/wiki/Airborne,complete,,\"$1,000,000\",1993\n\
             Hackers,/wiki/Hackers,pending,,,\n"
        );

        let mut out = Vec::new();
        write_export(&store, &mut out, Delim::Tsv).unwrap();
        assert!(String::from_utf8(out).unwrap().contains("complete\t\t$1,000,000\t1993"));
    }

    #[test]
    fn export_quotes_embedded_quotes_and_newlines() {
        let mut store = WorklistStore::create("unused.json");
        store
            .insert(Item::new("Say \"Anything\"", "/wiki/Say_Anything..."))
            .unwrap();
        let mut fields = FieldSet::new();
        fields.insert("Script".into(), FieldValue::new("FADE IN:\nEXT. STREET"));
        store
            .mark("Say \"Anything\"", &Ok(fields), &CompletionPolicy::default())
            .unwrap();

        let mut out = Vec::new();
        write_export(&store, &mut out, Delim::Csv).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "identity,locator,status,Script\n\
             \"Say \"\"Anything\"\"\",/wiki/Say_Anything...,complete,\"FADE IN:\nEXT. STREET\"\n"
        );
    }
}

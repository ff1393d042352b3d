use tracing::{debug, warn};

use crate::config::{ComparedField, ReconConfig};
use crate::index::DestinationIndex;
use crate::model::{Buckets, InputMeta, RecordSet, ReconMeta, ReconResult};
use crate::summary::compute_summary;

/// Classify every source record against the indexed destination set.
///
/// Unmatched source records go to `unmatched`. For a matched record, each
/// compared field that differs puts the destination record in that field's
/// bucket; if none differ it goes to `fully_matched` instead. Bucket order
/// follows source order.
pub fn reconcile(
    source: &RecordSet,
    index: &DestinationIndex<'_>,
    compared: &[ComparedField],
) -> Buckets {
    let policy = index.policy();
    let mut buckets = Buckets::for_fields(compared);

    for record in &source.records {
        let Some(dest) = index.lookup(record) else {
            buckets.unmatched.push(record.clone());
            continue;
        };

        let mut all_agree = true;
        for (field, slot) in compared.iter().zip(buckets.mismatches.iter_mut()) {
            if !policy.values_agree(record.get(&field.column), dest.get(&field.column)) {
                slot.records.push(dest.clone());
                all_agree = false;
            }
        }

        if all_agree {
            buckets.fully_matched.push(dest.clone());
        }
    }

    buckets
}

/// Run reconciliation per config. Returns buckets + summary.
pub fn run(config: &ReconConfig, source: &RecordSet, destination: &RecordSet) -> ReconResult {
    let index = DestinationIndex::build_with(destination, config.match_policy());

    if !index.duplicate_keys().is_empty() {
        warn!(
            count = index.duplicate_keys().len(),
            first = %index.duplicate_keys()[0],
            "duplicate keys in {}; later rows win",
            destination.label,
        );
    }
    if index.missing_key() > 0 {
        warn!(
            count = index.missing_key(),
            key = %config.key,
            "{} rows without a key column were not indexed",
            destination.label,
        );
    }
    debug!(entries = index.len(), "destination index built");

    let buckets = reconcile(source, &index, &config.compare);
    let summary = compute_summary(&buckets, &config.output, source, destination, &index);

    ReconResult {
        meta: ReconMeta {
            config_name: config.name.clone(),
            key_field: config.key.clone(),
            compared_fields: config.compare.iter().map(|c| c.column.clone()).collect(),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
            source: input_meta(source),
            destination: input_meta(destination),
        },
        summary,
        buckets,
    }
}

fn input_meta(set: &RecordSet) -> InputMeta {
    InputMeta {
        label: set.label.clone(),
        records: set.len(),
        sha256: set.fingerprint.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Record;
    use crate::load::parse_record_set;

    fn user(email: &str, first: &str, last: &str, pw: &str) -> Record {
        Record::from_pairs([
            ("email", email),
            ("first_name", first),
            ("last_name", last),
            ("encrypted_password", pw),
        ])
    }

    fn set(label: &str, records: Vec<Record>) -> RecordSet {
        RecordSet::from_records(label, records)
    }

    fn classify(source: &RecordSet, destination: &RecordSet) -> Buckets {
        let config = ReconConfig::default();
        let index = DestinationIndex::build(destination, &config.key);
        reconcile(source, &index, &config.compare)
    }

    #[test]
    fn first_name_mismatch_only() {
        let source = set("source", vec![user("a@x.com", "Jo", "Doe", "p1")]);
        let destination = set("destination", vec![user("a@x.com", "Joe", "Doe", "p1")]);
        let b = classify(&source, &destination);

        assert_eq!(b.mismatched("first_name"), [destination.records[0].clone()]);
        assert!(b.mismatched("last_name").is_empty());
        assert!(b.mismatched("encrypted_password").is_empty());
        assert!(b.unmatched.is_empty());
        assert!(b.fully_matched.is_empty());
    }

    #[test]
    fn missing_destination_goes_to_unmatched() {
        let source = set("source", vec![user("b@x.com", "Bo", "Roe", "p2")]);
        let destination = set("destination", vec![]);
        let b = classify(&source, &destination);

        assert_eq!(b.unmatched, [source.records[0].clone()]);
        assert!(b.fully_matched.is_empty());
        assert!(b.mismatches.iter().all(|m| m.records.is_empty()));
    }

    #[test]
    fn identical_records_fully_match() {
        let source = set("source", vec![user("c@x.com", "Cy", "Poe", "p3")]);
        let destination = set("destination", vec![user("c@x.com", "Cy", "Poe", "p3")]);
        let b = classify(&source, &destination);

        assert_eq!(b.fully_matched.len(), 1);
        assert!(b.unmatched.is_empty());
        assert!(b.mismatches.iter().all(|m| m.records.is_empty()));
    }

    #[test]
    fn several_fields_differ_lands_in_each_bucket() {
        let source = set("source", vec![user("d@x.com", "Di", "Lo", "p4")]);
        let destination = set("destination", vec![user("d@x.com", "Dee", "Low", "p4")]);
        let b = classify(&source, &destination);

        assert_eq!(b.mismatched("first_name").len(), 1);
        assert_eq!(b.mismatched("last_name").len(), 1);
        assert!(b.mismatched("encrypted_password").is_empty());
        assert!(b.fully_matched.is_empty());
    }

    #[test]
    fn missing_compared_field_is_a_mismatch() {
        let source = set(
            "source",
            vec![Record::from_pairs([
                ("email", "e@x.com"),
                ("first_name", "Ed"),
                ("last_name", "Moe"),
            ])],
        );
        let destination = set("destination", vec![user("e@x.com", "Ed", "Moe", "p5")]);
        let b = classify(&source, &destination);

        assert_eq!(b.mismatched("encrypted_password").len(), 1);
        assert!(b.mismatched("first_name").is_empty());
        assert!(b.fully_matched.is_empty());
    }

    #[test]
    fn source_without_key_column_is_unmatched() {
        let source = set("source", vec![Record::from_pairs([("first_name", "Nokey")])]);
        let destination = set("destination", vec![user("", "Blank", "K", "p")]);
        let b = classify(&source, &destination);
        assert_eq!(b.unmatched.len(), 1);
        assert!(b.fully_matched.is_empty());
    }

    #[test]
    fn blank_keys_match_each_other() {
        let csv = "email,first_name,last_name,encrypted_password\n,Jo,Doe,p1\n";
        let source = parse_record_set("source", csv.as_bytes()).unwrap();
        let destination = parse_record_set("destination", csv.as_bytes()).unwrap();
        let index = DestinationIndex::build(&destination, "email");
        assert_eq!(index.len(), 1);

        let b = reconcile(&source, &index, &ReconConfig::default().compare);
        assert!(b.unmatched.is_empty());
        assert_eq!(b.fully_matched.len(), 1);
    }

    #[test]
    fn duplicate_destination_uses_later_record() {
        let source = set("source", vec![user("f@x.com", "Fay", "Ng", "p6")]);
        let destination = set(
            "destination",
            vec![user("f@x.com", "Old", "Ng", "p6"), user("f@x.com", "Fay", "Ng", "p6")],
        );
        let b = classify(&source, &destination);
        assert_eq!(b.fully_matched, [destination.records[1].clone()]);
    }

    #[test]
    fn bucket_order_follows_source_order() {
        let source = set(
            "source",
            vec![
                user("z@x.com", "Z", "Z", "p"),
                user("m@x.com", "M", "M", "p"),
                user("a@x.com", "A", "A", "p"),
            ],
        );
        let destination = set(
            "destination",
            vec![
                user("a@x.com", "A", "A", "p"),
                user("m@x.com", "M", "M", "p"),
                user("z@x.com", "Z", "Z", "p"),
            ],
        );
        let b = classify(&source, &destination);
        let emails: Vec<_> = b.fully_matched.iter().map(|r| r.get("email").unwrap()).collect();
        assert_eq!(emails, ["z@x.com", "m@x.com", "a@x.com"]);
    }

    #[test]
    fn trimmed_comparison_ignores_padding() {
        let source = set("source", vec![user("g@x.com", " Gus", "Li ", "p7")]);
        let destination = set("destination", vec![user("g@x.com", "Gus", "Li", "p7")]);
        let config = ReconConfig {
            trim_values: true,
            ..ReconConfig::default()
        };
        let result = run(&config, &source, &destination);
        assert_eq!(result.buckets.fully_matched.len(), 1);
    }

    #[test]
    fn run_fills_meta_and_summary() {
        let mut source = set(
            "source",
            vec![user("a@x.com", "Jo", "Doe", "p1"), user("b@x.com", "Bo", "Roe", "p2")],
        );
        source.fingerprint = Some("abc".into());
        let destination = set("destination", vec![user("a@x.com", "Jo", "Doe", "p1")]);

        let result = run(&ReconConfig::default(), &source, &destination);
        assert_eq!(result.meta.key_field, "email");
        assert_eq!(
            result.meta.compared_fields,
            ["first_name", "last_name", "encrypted_password"]
        );
        assert_eq!(result.meta.source.sha256.as_deref(), Some("abc"));
        assert_eq!(result.meta.destination.sha256, None);
        assert_eq!(result.summary.matched, 1);
        assert_eq!(result.summary.unmatched, 1);
        assert!(!result.summary.is_clean());
    }
}

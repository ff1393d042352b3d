use crate::config::OutputConfig;
use crate::index::DestinationIndex;
use crate::model::{BucketCount, Buckets, RecordSet, ReconSummary};

/// Compute summary statistics from classified buckets.
pub fn compute_summary(
    buckets: &Buckets,
    output: &OutputConfig,
    source: &RecordSet,
    destination: &RecordSet,
    index: &DestinationIndex<'_>,
) -> ReconSummary {
    let matched = source.len() - buckets.unmatched.len();

    ReconSummary {
        source_records: source.len(),
        destination_records: destination.len(),
        matched,
        unmatched: buckets.unmatched.len(),
        fully_matched: buckets.fully_matched.len(),
        records_with_mismatch: matched - buckets.fully_matched.len(),
        duplicate_destination_keys: index.duplicate_keys().len(),
        destination_missing_key: index.missing_key(),
        skipped_rows: source.skipped.len() + destination.skipped.len(),
        buckets: buckets
            .named(output)
            .into_iter()
            .map(|b| BucketCount {
                bucket: b.name.to_string(),
                records: b.records.len(),
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ReconConfig;
    use crate::engine::reconcile;
    use crate::model::{Record, SkippedRow};

    fn user(email: &str, first: &str, last: &str) -> Record {
        Record::from_pairs([
            ("email", email),
            ("first_name", first),
            ("last_name", last),
            ("encrypted_password", "pw"),
        ])
    }

    #[test]
    fn summary_counts() {
        let mut source = RecordSet::from_records(
            "source",
            vec![
                user("a@x.com", "A", "A"),
                user("b@x.com", "B", "Wrong"),
                user("c@x.com", "Wrong", "Wrong"),
                user("d@x.com", "D", "D"),
            ],
        );
        source.skipped.push(SkippedRow { line: 7, expected: 4, found: 3 });
        let destination = RecordSet::from_records(
            "destination",
            vec![
                user("a@x.com", "A", "A"),
                user("b@x.com", "B", "B"),
                user("c@x.com", "C", "C"),
                user("c@x.com", "C", "C"),
            ],
        );
        let config = ReconConfig::default();
        let index = DestinationIndex::build(&destination, "email");
        let buckets = reconcile(&source, &index, &config.compare);
        let summary = compute_summary(&buckets, &config.output, &source, &destination, &index);

        assert_eq!(summary.source_records, 4);
        assert_eq!(summary.destination_records, 4);
        assert_eq!(summary.matched, 3);
        assert_eq!(summary.unmatched, 1);
        assert_eq!(summary.fully_matched, 1);
        assert_eq!(summary.records_with_mismatch, 2);
        assert_eq!(summary.duplicate_destination_keys, 1);
        assert_eq!(summary.skipped_rows, 1);

        let counts: Vec<(&str, usize)> = summary
            .buckets
            .iter()
            .map(|b| (b.bucket.as_str(), b.records))
            .collect();
        assert_eq!(
            counts,
            [
                ("unmatched", 1),
                ("first_name_mismatch", 1),
                ("last_name_mismatch", 2),
                ("password_mismatch", 0),
                ("fully_matched", 1),
            ]
        );
    }
}

//! # Build/Verify Integration Flows
//!
//! End-to-end passes over real files in a temp directory: stream a
//! synthetic corpus through the builder, publish filter files, load them
//! back with a fresh verifier, and check the classification counters.
//!
//! ## Flows Tested
//!
//! 1. **Builder -> Verifier**: a 100k-record corpus split across three
//!    frequency bands verifies with zero not-found and a bounded lost rate
//! 2. **Blacklist round trip**: plaintext words ingested at build time are
//!    found by wordlist verification with the blacklist label
//! 3. **On-disk portability**: two independent builds of the same corpus
//!    publish byte-identical filter files

#[cfg(test)]
mod tests {
    use std::fs;
    use std::io::{BufReader, Cursor, Write};
    use std::path::Path;

    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use breach_filters::{
        build_index, FilterSetBuilder, FilterSetVerifier, IndexConfig, IndexConfigBuilder,
        Partition, PartitionScheme,
    };

    // =========================================================================
    // TEST FIXTURES
    // =========================================================================

    fn partition(exp: u32, min: u64, max: u64, label: &str) -> Partition {
        Partition {
            size_exponent: exp,
            min_frequency: min,
            max_frequency: max,
            label: label.to_string(),
        }
    }

    /// Three frequency bands sized so each band's expected FPR stays small
    /// at the synthetic corpus volume.
    fn three_band_scheme() -> PartitionScheme {
        PartitionScheme::new(vec![
            partition(21, 100, u64::MAX, "top"),
            partition(18, 10, 100, "mid"),
            partition(15, 0, 10, "rare"),
        ])
        .unwrap()
    }

    fn three_band_config() -> IndexConfig {
        IndexConfigBuilder::new()
            .scheme(three_band_scheme())
            .hash_count(3)
            .content_id("synthetic-sha1")
            .content_date("2026-08")
            .build()
            .unwrap()
    }

    /// Deterministic synthetic corpus: `records` unique-looking 40-hex
    /// digests with frequencies spread over [0, 1000).
    fn synthetic_corpus(records: u64, seed: u64) -> String {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut corpus = String::with_capacity(records as usize * 48);
        for i in 0..records {
            let digest: u128 = rng.gen();
            let frequency: u64 = rng.gen_range(0..1000);
            // Suffix the counter so every line's digest is unique.
            corpus.push_str(&format!("{digest:032X}{i:08X}:{frequency}\n"));
        }
        corpus
    }

    fn write_file(dir: &Path, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    // =========================================================================
    // FLOWS
    // =========================================================================

    #[test]
    fn test_100k_corpus_builds_and_verifies_clean() {
        let dir = tempfile::tempdir().unwrap();
        let corpus = synthetic_corpus(100_000, 7);
        let corpus_path = write_file(dir.path(), "corpus.txt", &corpus);

        let out_dir = dir.path().join("filters");
        fs::create_dir(&out_dir).unwrap();

        let config = three_band_config();
        let summary = build_index(config.clone(), &corpus_path, &out_dir).unwrap();

        assert_eq!(summary.stats.records, 100_000);
        assert_eq!(summary.stats.malformed, 0);
        assert_eq!(summary.stats.out_of_range, 0);
        assert_eq!(
            summary.stats.per_partition.iter().sum::<u64>(),
            100_000,
            "every record lands in exactly one partition"
        );

        let verifier = FilterSetVerifier::load(config, &out_dir).unwrap();
        assert_eq!(verifier.loaded_count(), 3);

        let report = verifier
            .verify_corpus(BufReader::new(fs::File::open(&corpus_path).unwrap()))
            .unwrap();

        assert_eq!(report.records, 100_000);
        assert_eq!(report.success, 100_000, "no false negatives, ever");
        assert_eq!(report.not_found, 0);

        // Lost hits are foreign-partition false positives; with these
        // geometries the rate stays well under 1% of foreign probes.
        let foreign_probes = 2 * report.records;
        assert!(
            report.lost < foreign_probes / 100,
            "lost count {} exceeds the configured false-positive budget",
            report.lost
        );
    }

    #[test]
    fn test_blacklist_words_round_trip_through_files() {
        let dir = tempfile::tempdir().unwrap();
        let corpus_path = write_file(dir.path(), "corpus.txt", "ABCD1234:50\n");
        let blacklist_path = write_file(dir.path(), "blacklist.txt", "password\nletmein\n");

        let out_dir = dir.path().join("filters");
        fs::create_dir(&out_dir).unwrap();

        let scheme = PartitionScheme::new(vec![
            partition(14, 0, u64::MAX, "all"),
            partition(14, u64::MAX, u64::MAX, "blacklist"),
        ])
        .unwrap();
        let config = IndexConfigBuilder::new()
            .scheme(scheme)
            .content_id("corpus")
            .content_date("2026-08")
            .blacklist_path(&blacklist_path)
            .build()
            .unwrap();

        let summary = build_index(config.clone(), &corpus_path, &out_dir).unwrap();
        assert_eq!(summary.stats.blacklist_words, 2);
        assert!(!summary.stats.blacklist_skipped);

        let verifier = FilterSetVerifier::load(config, &out_dir).unwrap();
        let report = verifier
            .verify_wordlist(Cursor::new("password\nletmein\nnot-blacklisted\n"))
            .unwrap();

        assert_eq!(report.found, 2);
        assert_eq!(report.not_found, 1);
        assert!(report
            .matches
            .iter()
            .all(|m| m.label == "blacklist"));
        assert_eq!(report.misses, vec!["not-blacklisted".to_string()]);
    }

    #[test]
    fn test_blacklist_label_missing_from_scheme_does_not_abort_build() {
        let dir = tempfile::tempdir().unwrap();
        let corpus_path = write_file(dir.path(), "corpus.txt", "ABCD1234:50\n");
        let blacklist_path = write_file(dir.path(), "blacklist.txt", "password\n");

        let out_dir = dir.path().join("filters");
        fs::create_dir(&out_dir).unwrap();

        // Scheme has no "blacklist" partition.
        let scheme = PartitionScheme::new(vec![partition(14, 0, u64::MAX, "all")]).unwrap();
        let config = IndexConfigBuilder::new()
            .scheme(scheme)
            .content_id("corpus")
            .content_date("2026-08")
            .blacklist_path(&blacklist_path)
            .build()
            .unwrap();

        let summary = build_index(config.clone(), &corpus_path, &out_dir).unwrap();
        assert!(summary.stats.blacklist_skipped, "skip and report, do not abort");
        assert_eq!(summary.stats.records, 1, "corpus build still completes");
        assert!(out_dir.join("corpus_2026-08_14bits_all.filter").exists());
    }

    #[test]
    fn test_independent_builds_publish_byte_identical_filters() {
        let dir = tempfile::tempdir().unwrap();
        let corpus = synthetic_corpus(5_000, 11);
        let corpus_path = write_file(dir.path(), "corpus.txt", &corpus);

        let out_a = dir.path().join("a");
        let out_b = dir.path().join("b");
        fs::create_dir(&out_a).unwrap();
        fs::create_dir(&out_b).unwrap();

        build_index(three_band_config(), &corpus_path, &out_a).unwrap();
        build_index(three_band_config(), &corpus_path, &out_b).unwrap();

        for partition in three_band_scheme().partitions() {
            let name = three_band_config().filter_file_name(partition);
            let a = fs::read(out_a.join(&name)).unwrap();
            let b = fs::read(out_b.join(&name)).unwrap();
            assert_eq!(a, b, "filter {name} must be reproducible byte for byte");
            assert_eq!(
                a.len() as u64,
                partition.size_bits() / 8,
                "packed length is ceil(2^exponent / 8)"
            );
        }
    }

    #[test]
    fn test_finalized_set_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let corpus_path = write_file(dir.path(), "corpus.txt", "ABCD:5\nEF01:500\n");
        let out_dir = dir.path().join("filters");
        fs::create_dir(&out_dir).unwrap();

        build_index(three_band_config(), &corpus_path, &out_dir).unwrap();

        let names: Vec<String> = fs::read_dir(&out_dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names.len(), 3);
        assert!(
            names.iter().all(|n| n.ends_with(".filter")),
            "only canonical filter files may remain: {names:?}"
        );
    }

    #[test]
    fn test_builder_is_usable_without_touching_disk_until_finalize() {
        // The builder is a self-contained context object; two builders in
        // one process must not interfere.
        let mut a = FilterSetBuilder::new(three_band_config()).unwrap();
        let mut b = FilterSetBuilder::new(three_band_config()).unwrap();

        a.ingest_corpus(Cursor::new("AAAA:5\n")).unwrap();
        b.ingest_corpus(Cursor::new("BBBB:500\nCCCC:50\n")).unwrap();

        assert_eq!(a.stats().records, 1);
        assert_eq!(b.stats().records, 2);
        assert_eq!(a.stats().per_partition, vec![0, 0, 1]);
        assert_eq!(b.stats().per_partition, vec![1, 1, 0]);
    }
}

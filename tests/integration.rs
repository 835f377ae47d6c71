//! End-to-end integration tests driving the full pipeline (C1-C8) against real temp files via
//! `tempfile`, exercising seed scenarios, boundary cases, and output-equivalence properties.
//! Fast, pure-logic coverage for individual components lives beside each module instead; this
//! file is reserved for whole-pipeline behavior.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use wikifilter::engine::{run_with_cancel, Cli};

fn write(dir: &Path, name: &str, contents: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

fn run_filter(dict_path: &Path, text_path: &Path, thread_count: Option<i64>) -> PathBuf {
    let cli = Cli {
        dict_path: dict_path.to_path_buf(),
        text_path: text_path.to_path_buf(),
        thread_count,
    };
    run_with_cancel(&cli, Arc::new(AtomicBool::new(false))).unwrap();
    cli.output_path()
}

/// Parse `term\tcount\n` records into a map, tolerating any ordering (§8 property 4: output is
/// deterministic only up to batch interleaving order).
fn read_records(path: &Path) -> HashMap<String, u64> {
    let contents = std::fs::read_to_string(path).unwrap_or_default();
    contents
        .lines()
        .map(|line| {
            let (term, count) = line.split_once('\t').expect("tab-separated record");
            (term.to_string(), count.parse().unwrap())
        })
        .collect()
}

#[test]
fn seed_scenario_one_single_thread() {
    let dir = tempfile::tempdir().unwrap();
    let dict = write(dir.path(), "dict.txt", b"ab\nbc\nabc\nx\n");
    let corpus = write(dir.path(), "corpus.txt", b"abc\nxabcx\nab\nxx\n");

    let out = run_filter(&dict, &corpus, Some(1));
    let records = read_records(&out);

    let expected: HashMap<String, u64> = [("ab", 3), ("bc", 2), ("abc", 2)]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();
    assert_eq!(records, expected);
}

#[test]
fn seed_scenario_one_four_threads_matches_single_thread() {
    let dir = tempfile::tempdir().unwrap();
    let dict = write(dir.path(), "dict.txt", b"ab\nbc\nabc\nx\n");
    let corpus = write(dir.path(), "corpus.txt", b"abc\nxabcx\nab\nxx\n");

    let out = run_filter(&dict, &corpus, Some(4));
    let records = read_records(&out);

    let expected: HashMap<String, u64> = [("ab", 3), ("bc", 2), ("abc", 2)]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();
    assert_eq!(records, expected);
}

#[test]
fn cjk_terms_match_as_utf8_byte_sequences() {
    let dir = tempfile::tempdir().unwrap();
    let dict = write(
        dir.path(),
        "dict.txt",
        "系统\n文件\n".as_bytes(),
    );
    let corpus = write(
        dir.path(),
        "corpus.txt",
        "系统文件\n系统\n".as_bytes(),
    );

    let out = run_filter(&dict, &corpus, None);
    let records = read_records(&out);

    let expected: HashMap<String, u64> = [("系统", 2), ("文件", 1)]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();
    assert_eq!(records, expected);
}

#[test]
fn repeated_occurrence_on_one_line_dedups_to_one() {
    let dir = tempfile::tempdir().unwrap();
    let dict = write(dir.path(), "dict.txt", b"aa\n");
    let corpus = write(dir.path(), "corpus.txt", b"aaaa\n");

    let out = run_filter(&dict, &corpus, Some(1));
    let records = read_records(&out);
    assert_eq!(records.get("aa"), Some(&1));
}

#[test]
fn very_long_term_matches_across_two_lines() {
    let dir = tempfile::tempdir().unwrap();
    let long_term = "t".repeat(10_000);
    let dict = write(dir.path(), "dict.txt", format!("{long_term}\n").as_bytes());
    let corpus_contents = format!("{long_term}\n{long_term}\n");
    let corpus = write(dir.path(), "corpus.txt", corpus_contents.as_bytes());

    let out = run_filter(&dict, &corpus, Some(1));
    let records = read_records(&out);
    assert_eq!(records.get(long_term.as_str()), Some(&2));
}

#[test]
fn length_one_terms_are_dropped_and_produce_no_output() {
    let dir = tempfile::tempdir().unwrap();
    let dict = write(dir.path(), "dict.txt", b"x\na\nab\n");
    let corpus = write(dir.path(), "corpus.txt", b"xaxabx\n");

    let out = run_filter(&dict, &corpus, Some(1));
    let records = read_records(&out);
    assert_eq!(records.len(), 1);
    assert_eq!(records.get("ab"), Some(&1));
}

#[test]
fn empty_dictionary_yields_empty_output() {
    let dir = tempfile::tempdir().unwrap();
    let dict = write(dir.path(), "dict.txt", b"");
    let corpus = write(dir.path(), "corpus.txt", b"abc\ndef\n");

    let out = run_filter(&dict, &corpus, Some(1));
    assert_eq!(std::fs::read_to_string(&out).unwrap(), "");
}

#[test]
fn empty_corpus_yields_empty_output() {
    let dir = tempfile::tempdir().unwrap();
    let dict = write(dir.path(), "dict.txt", b"ab\nbc\n");
    let corpus = write(dir.path(), "corpus.txt", b"");

    let out = run_filter(&dict, &corpus, Some(1));
    assert_eq!(std::fs::read_to_string(&out).unwrap(), "");
}

#[test]
fn corpus_without_trailing_newline_still_counts_final_line() {
    let dir = tempfile::tempdir().unwrap();
    let dict = write(dir.path(), "dict.txt", b"ab\n");
    let corpus = write(dir.path(), "corpus.txt", b"xx\nab"); // no trailing \n

    let out = run_filter(&dict, &corpus, Some(1));
    let records = read_records(&out);
    assert_eq!(records.get("ab"), Some(&1));
}

#[test]
fn suffix_terms_both_counted_on_the_same_line() {
    let dir = tempfile::tempdir().unwrap();
    let dict = write(dir.path(), "dict.txt", b"bc\nabc\n");
    let corpus = write(dir.path(), "corpus.txt", b"xabcx\n");

    let out = run_filter(&dict, &corpus, Some(1));
    let records = read_records(&out);
    assert_eq!(records.get("bc"), Some(&1));
    assert_eq!(records.get("abc"), Some(&1));
}

#[test]
fn running_twice_produces_equivalent_output() {
    let dir = tempfile::tempdir().unwrap();
    let dict = write(dir.path(), "dict.txt", b"ab\nbc\nabc\n");
    let corpus = write(dir.path(), "corpus.txt", b"abc\nxabcx\nab\nxx\n");

    let first = read_records(&run_filter(&dict, &corpus, Some(1)));
    let second = read_records(&run_filter(&dict, &corpus, Some(1)));
    assert_eq!(first, second);
}

#[test]
fn shuffled_dictionary_order_does_not_change_output_multiset() {
    let dir = tempfile::tempdir().unwrap();
    let corpus = write(dir.path(), "corpus.txt", b"abc\nxabcx\nab\nxx\n");

    let dict_in_order = write(dir.path(), "dict_in_order.txt", b"ab\nbc\nabc\nx\n");
    let dict_shuffled = write(dir.path(), "dict_shuffled.txt", b"x\nabc\nab\nbc\n");

    let in_order = read_records(&run_filter(&dict_in_order, &corpus, Some(1)));
    let shuffled = read_records(&run_filter(&dict_shuffled, &corpus, Some(1)));
    assert_eq!(in_order, shuffled);
}

#[test]
fn splitting_dictionary_and_merging_equals_running_on_the_union() {
    let dir = tempfile::tempdir().unwrap();
    let corpus = write(dir.path(), "corpus.txt", b"abc\nxabcx\nab\nxx\n");

    let union_dict = write(dir.path(), "union.txt", b"ab\nbc\nabc\nx\n");
    let half_a = write(dir.path(), "half_a.txt", b"ab\nbc\n");
    let half_b = write(dir.path(), "half_b.txt", b"abc\nx\n");

    let union = read_records(&run_filter(&union_dict, &corpus, Some(1)));

    let mut merged = read_records(&run_filter(&half_a, &corpus, Some(1)));
    merged.extend(read_records(&run_filter(&half_b, &corpus, Some(1))));

    assert_eq!(union, merged);
}

#[test]
fn duplicate_dictionary_terms_are_kept_as_distinct_records() {
    let dir = tempfile::tempdir().unwrap();
    let dict = write(dir.path(), "dict.txt", b"ab\nab\n");
    let corpus = write(dir.path(), "corpus.txt", b"ab\n");

    let cli = Cli {
        dict_path: dict,
        text_path: corpus,
        thread_count: Some(1),
    };
    run_with_cancel(&cli, Arc::new(AtomicBool::new(false))).unwrap();
    let contents = std::fs::read_to_string(cli.output_path()).unwrap();
    let mut lines: Vec<&str> = contents.lines().collect();
    lines.sort_unstable();
    assert_eq!(lines, vec!["ab\t1", "ab\t1"]);
}

#[test]
fn many_batches_agree_with_a_single_batch_reference() {
    // §4.5 step 6 oversubscribes batches vs. threads regardless of memory pressure
    // (`num_batches = max(ceil(terms / max_words_per_ac), num_threads)`), so `thread_count=4`
    // alone is enough to force multiple batches here; the reference run at `thread_count=1`
    // should still agree on the output multiset.
    let dir = tempfile::tempdir().unwrap();
    let mut dict_contents = String::new();
    for i in 0..2000u32 {
        dict_contents.push_str(&format!("{i:04}\n"));
    }
    let dict = write(dir.path(), "dict.txt", dict_contents.as_bytes());

    let mut corpus_contents = String::new();
    for i in 0..500u32 {
        corpus_contents.push_str(&format!(
            "line containing {:04} and {:04}\n",
            i % 2000,
            (i * 7) % 2000
        ));
    }
    let corpus = write(dir.path(), "corpus.txt", corpus_contents.as_bytes());

    let batched = read_records(&run_filter(&dict, &corpus, Some(4)));
    let reference = read_records(&run_filter(&dict, &corpus, Some(1)));

    assert_eq!(batched, reference);
}

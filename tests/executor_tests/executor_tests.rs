//! Tests for the batch executor
//!
//! These tests verify:
//! - Point get/set/delete semantics
//! - Multi get aggregation and error abort
//! - Multi set pairing validation and atomicity
//! - Multi delete atomicity under injected faults
//! - Per-call objects released on every exit path

use bytes::Bytes;
use dskv::engine::{BlockCache, MemoryEngine, ReadStats, StorageEngine};
use dskv::{Config, Context, DsError};

// =============================================================================
// Helper Functions
// =============================================================================

fn setup() -> (MemoryEngine, Context<MemoryEngine>) {
    let config = Config::default();
    let cache = BlockCache::lru(config.cache_size);
    let engine = MemoryEngine::open(&config.engine_options(), &cache).unwrap();
    let ctx = Context::with_engine(engine.clone(), cache, &config);
    (engine, ctx)
}

fn assert_no_outstanding(ctx: &Context<MemoryEngine>) {
    assert_eq!(ctx.ledger().outstanding(), 0);
    assert_eq!(ctx.ledger().acquired(), ctx.ledger().released());
}

// =============================================================================
// Point Operation Tests
// =============================================================================

#[test]
fn test_get_unset_key_is_absent() {
    let (_engine, ctx) = setup();
    let exec = ctx.executor();

    assert_eq!(exec.point_get(b"never-set").unwrap(), None);
    assert_no_outstanding(&ctx);
}

#[test]
fn test_set_then_get_round_trip() {
    let (_engine, ctx) = setup();
    let exec = ctx.executor();

    let value: Vec<u8> = (0..=255u8).collect();
    exec.point_set(b"binary", &value).unwrap();
    assert_eq!(exec.point_get(b"binary").unwrap(), Some(value));
}

#[test]
fn test_set_overwrites() {
    let (_engine, ctx) = setup();
    let exec = ctx.executor();

    exec.point_set(b"k", b"v1").unwrap();
    exec.point_set(b"k", b"v2").unwrap();
    assert_eq!(exec.point_get(b"k").unwrap(), Some(b"v2".to_vec()));
}

#[test]
fn test_get_engine_error_is_not_absent() {
    let (engine, ctx) = setup();
    let exec = ctx.executor();

    engine.fail_reads_for(b"k", "IO error: read failed");
    let err = exec.point_get(b"k").unwrap_err();
    assert!(matches!(err, DsError::Engine(ref msg) if msg == "IO error: read failed"));
    assert_no_outstanding(&ctx);

    engine.clear_read_failure(b"k");
    assert_eq!(exec.point_get(b"k").unwrap(), None);
}

#[test]
fn test_reads_skip_checksums_and_fill_cache() {
    let (engine, ctx) = setup();
    let exec = ctx.executor();

    exec.point_get(b"a").unwrap();
    exec.multi_get(&["b", "c"]).unwrap();

    assert_eq!(
        engine.read_stats(),
        ReadStats {
            reads: 3,
            verified_reads: 0,
            cache_filling_reads: 3,
        }
    );
}

#[test]
fn test_corrupt_value_still_served_without_verification() {
    let (engine, ctx) = setup();
    let exec = ctx.executor();

    exec.point_set(b"k", b"abc").unwrap();
    engine.corrupt(b"k");
    let value = exec.point_get(b"k").unwrap().unwrap();
    assert_ne!(value, b"abc".to_vec());
}

#[test]
fn test_set_engine_error() {
    let (engine, ctx) = setup();
    let exec = ctx.executor();

    engine.fail_next_write("IO error: No space left on device");
    assert!(exec.point_set(b"k", b"v").unwrap_err().is_engine());
    assert_eq!(exec.point_get(b"k").unwrap(), None);
    assert_no_outstanding(&ctx);
}

// =============================================================================
// Multi Get Tests
// =============================================================================

#[test]
fn test_mget_skips_absent_keys() {
    let (_engine, ctx) = setup();
    let exec = ctx.executor();

    exec.point_set(b"a", b"1").unwrap();
    let reply = exec.multi_get(&["a", "b"]).unwrap();
    assert_eq!(reply, Some(Bytes::from_static(b"a=1")));
}

#[test]
fn test_mget_preserves_argument_order() {
    let (_engine, ctx) = setup();
    let exec = ctx.executor();

    exec.multi_set(&["x", "1", "y", "2", "z", "3"]).unwrap();
    let reply = exec.multi_get(&["z", "x", "y"]).unwrap();
    assert_eq!(reply, Some(Bytes::from_static(b"z=3&x=1&y=2")));
}

#[test]
fn test_mget_repeated_key_appears_twice() {
    let (_engine, ctx) = setup();
    let exec = ctx.executor();

    exec.point_set(b"a", b"1").unwrap();
    let reply = exec.multi_get(&["a", "a"]).unwrap();
    assert_eq!(reply, Some(Bytes::from_static(b"a=1&a=1")));
}

#[test]
fn test_mget_nothing_found_is_none() {
    let (_engine, ctx) = setup();
    let exec = ctx.executor();

    assert_eq!(exec.multi_get(&["a", "b"]).unwrap(), None);
}

#[test]
fn test_mget_encodes_binary_values() {
    let (_engine, ctx) = setup();
    let exec = ctx.executor();

    exec.point_set(b"k", b"a b&c=\x00").unwrap();
    let reply = exec.multi_get(&["k"]).unwrap();
    assert_eq!(reply, Some(Bytes::from_static(b"k=a+b%26c%3D%00")));
}

#[test]
fn test_mget_first_key_error_aborts() {
    let (engine, ctx) = setup();
    let exec = ctx.executor();

    exec.point_set(b"b", b"2").unwrap();
    engine.fail_reads_for(b"a", "Corruption: bad block");

    let err = exec.multi_get(&["a", "b"]).unwrap_err();
    assert_eq!(err.to_string(), "Corruption: bad block");
    assert_no_outstanding(&ctx);
}

#[test]
fn test_mget_error_after_hits_discards_partial_reply() {
    let (engine, ctx) = setup();
    let exec = ctx.executor();

    exec.point_set(b"a", b"1").unwrap();
    exec.point_set(b"c", b"3").unwrap();
    engine.fail_reads_for(b"b", "IO error");

    let before = engine.read_stats().reads;
    assert!(exec.multi_get(&["a", "b", "c"]).is_err());
    // "c" is never read
    assert_eq!(engine.read_stats().reads - before, 2);
    assert_no_outstanding(&ctx);
}

// =============================================================================
// Multi Set Tests
// =============================================================================

#[test]
fn test_mset_commits_all_pairs_in_one_batch() {
    let (engine, ctx) = setup();
    let exec = ctx.executor();

    exec.multi_set(&["a", "1", "b", "2"]).unwrap();
    assert_eq!(engine.batch_count(), 1);
    assert_eq!(exec.point_get(b"a").unwrap(), Some(b"1".to_vec()));
    assert_eq!(exec.point_get(b"b").unwrap(), Some(b"2".to_vec()));
}

#[test]
fn test_mset_single_pair_is_accepted() {
    let (_engine, ctx) = setup();
    let exec = ctx.executor();

    exec.multi_set(&["a", "1"]).unwrap();
    assert_eq!(exec.point_get(b"a").unwrap(), Some(b"1".to_vec()));
}

#[test]
fn test_mset_odd_count_rejected_without_side_effects() {
    let (engine, ctx) = setup();
    let exec = ctx.executor();

    exec.point_set(b"a", b"old").unwrap();
    let writes = engine.write_count();

    let err = exec.multi_set(&["a", "new", "b"]).unwrap_err();
    assert!(err.is_malformed());
    assert_eq!(engine.write_count(), writes);
    assert_eq!(engine.batch_count(), 0);
    assert_eq!(exec.point_get(b"a").unwrap(), Some(b"old".to_vec()));
    assert_eq!(exec.point_get(b"b").unwrap(), None);
}

#[test]
fn test_mset_empty_rejected() {
    let (engine, ctx) = setup();
    let args: Vec<&[u8]> = Vec::new();

    assert!(ctx.executor().multi_set(&args).unwrap_err().is_malformed());
    assert!(engine.is_empty());
}

#[test]
fn test_mset_last_write_in_batch_wins() {
    let (_engine, ctx) = setup();
    let exec = ctx.executor();

    exec.point_set(b"k", b"committed").unwrap();
    let args = ["k", "first", "other", "x", "k", "second"];
    exec.multi_set(&args).unwrap();

    assert_eq!(exec.point_get(b"k").unwrap(), Some(b"second".to_vec()));
}

#[test]
fn test_mset_fault_mid_batch_applies_nothing() {
    let (engine, ctx) = setup();
    let exec = ctx.executor();

    engine.fail_batch_after(1, "IO error: disk full");
    let err = exec.multi_set(&["a", "1", "b", "2"]).unwrap_err();
    assert_eq!(err.to_string(), "IO error: disk full");

    assert_eq!(exec.point_get(b"a").unwrap(), None);
    assert_eq!(exec.point_get(b"b").unwrap(), None);
    assert_no_outstanding(&ctx);
}

#[test]
fn test_multi_set_fault_beyond_batch_length_still_fails() {
    let (engine, ctx) = setup();
    let exec = ctx.executor();

    engine.fail_batch_after(5, "IO error: disk full");
    let err = exec.multi_set(&["a", "1"]).unwrap_err();
    assert!(err.is_engine());
    assert!(engine.is_empty());
    assert_no_outstanding(&ctx);

    // Consumed by the failed batch; a longer one now commits
    let args = ["k0", "v0", "k1", "v1", "k2", "v2", "k3", "v3", "k4", "v4", "k5", "v5"];
    exec.multi_set(&args).unwrap();
    assert_eq!(engine.len(), 6);
    assert_eq!(engine.batch_count(), 1);
}

// =============================================================================
// Delete Tests
// =============================================================================

#[test]
fn test_delete_single_key_uses_point_delete() {
    let (engine, ctx) = setup();
    let exec = ctx.executor();

    exec.point_set(b"k", b"v").unwrap();
    exec.delete(&["k"]).unwrap();

    assert_eq!(exec.point_get(b"k").unwrap(), None);
    assert_eq!(engine.batch_count(), 0);
}

#[test]
fn test_delete_absent_key_succeeds() {
    let (_engine, ctx) = setup();
    ctx.executor().delete(&["missing"]).unwrap();
}

#[test]
fn test_delete_multiple_keys_in_one_batch() {
    let (engine, ctx) = setup();
    let exec = ctx.executor();

    exec.multi_set(&["a", "1", "b", "2", "c", "3"]).unwrap();
    exec.delete(&["a", "b"]).unwrap();

    assert_eq!(engine.batch_count(), 2);
    assert_eq!(exec.point_get(b"a").unwrap(), None);
    assert_eq!(exec.point_get(b"b").unwrap(), None);
    assert_eq!(exec.point_get(b"c").unwrap(), Some(b"3".to_vec()));
}

#[test]
fn test_delete_fault_mid_batch_removes_nothing() {
    let (engine, ctx) = setup();
    let exec = ctx.executor();

    exec.multi_set(&["a", "1", "b", "2", "c", "3"]).unwrap();
    engine.fail_batch_after(2, "IO error: write failed");

    assert!(exec.delete(&["a", "b", "c"]).unwrap_err().is_engine());
    assert_eq!(engine.len(), 3);
    assert_eq!(
        exec.multi_get(&["a", "b", "c"]).unwrap(),
        Some(Bytes::from_static(b"a=1&b=2&c=3"))
    );
    assert_no_outstanding(&ctx);
}

#[test]
fn test_single_delete_engine_error() {
    let (engine, ctx) = setup();
    let exec = ctx.executor();

    exec.point_set(b"k", b"v").unwrap();
    engine.fail_next_write("IO error");
    assert!(exec.delete(&["k"]).is_err());
    assert_eq!(exec.point_get(b"k").unwrap(), Some(b"v".to_vec()));
}

// =============================================================================
// Resource Accounting Tests
// =============================================================================

#[test]
fn test_each_command_acquires_expected_objects() {
    let (_engine, ctx) = setup();
    let exec = ctx.executor();

    exec.point_get(b"a").unwrap(); // read options
    exec.point_set(b"a", b"1").unwrap(); // write options
    exec.multi_set(&["a", "1"]).unwrap(); // write options + batch
    exec.delete(&["a"]).unwrap(); // write options
    exec.delete(&["a", "b"]).unwrap(); // write options + batch

    assert_eq!(ctx.ledger().acquired(), 7);
    assert_no_outstanding(&ctx);
}

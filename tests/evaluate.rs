//! End-to-end evaluation of the perceptron predictor on commit logs.

use perceptron_bp::*;

use bitvec::prelude::*;
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rstest::rstest;
use std::io::Write;
use tempfile::NamedTempFile;

const BEQ: u32 = 0x0000_0063;
const BNE: u32 = 0xfeb5_1ce3;
const ADDI: u32 = 0x0015_0513;

fn log_line(pc: u32, inst: u32) -> String {
    format!("core   0: 3 0x{:016x} (0x{:08x}) x10 0x0000000000000000\n", pc, inst)
}

fn write_log(records: &[(u32, u32)]) -> NamedTempFile {
    let mut f = NamedTempFile::new().unwrap();
    writeln!(f, "bbl loader").unwrap();
    for (pc, inst) in records {
        f.write_all(log_line(*pc, *inst).as_bytes()).unwrap();
    }
    f.flush().unwrap();
    f
}

fn reference() -> BranchPredictor {
    PerceptronConfig::default().build().unwrap()
}

#[test]
fn reference_table_has_eight_entries() {
    let cfg = PerceptronConfig { history_len: 4, weight_bits: 4, storage_bits: 128,
        ..Default::default() };
    assert_eq!(cfg.build().unwrap().num_perceptrons(), 8);
}

#[test]
fn jump_past_fallthrough_is_taken_and_trains() {
    let log = write_log(&[(0x1000, BEQ), (0x1008, ADDI)]);
    let trace = TextTrace::from_file(log.path()).unwrap();
    assert_eq!(trace.num_entries(), 2);
    assert_eq!(trace.num_skipped(), 1);

    let mut bp = reference();
    let mut events = Vec::new();
    let stat = evaluate_with(trace.as_slice(), &mut bp, |e| events.push(e.clone()));
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].outcome, Outcome::T);
    assert_eq!(stat.global_brns(), 1);
    let first = events[0].prediction;

    // Same trace again on the trained predictor
    events.clear();
    evaluate_with(trace.as_slice(), &mut bp, |e| events.push(e.clone()));
    let second = events[0].prediction;
    assert_eq!(second.outcome, Outcome::T);
    assert!(second.y > first.y, "{second:?} vs {first:?}");
}

#[test]
fn sequential_successor_is_not_taken() {
    let log = write_log(&[(0x2000, BEQ), (0x2004, ADDI)]);
    let trace = TextTrace::from_file(log.path()).unwrap();
    let mut events = Vec::new();
    let stat = evaluate_with(trace.as_slice(), &mut reference(), |e| events.push(e.clone()));
    assert_eq!(events[0].outcome, Outcome::N);
    // A fresh predictor guesses taken for a zero sum
    assert_eq!(events[0].prediction.outcome, Outcome::T);
    assert_eq!(stat.hit_rate(), Some(0.0));
}

#[test]
fn trace_without_branches_has_no_accuracy() {
    let log = write_log(&[(0x1000, ADDI), (0x1004, ADDI), (0x1008, 0x0000_8067)]);
    let trace = TextTrace::from_file(log.path()).unwrap();
    let stat = evaluate(trace.as_slice(), &mut reference());
    assert_eq!(stat.global_brns(), 0);
    assert_eq!(stat.hit_rate(), None);
}

#[test]
fn missing_trace_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.log");
    match TextTrace::from_file(&path) {
        Err(Error::Io { path: p, .. }) => assert_eq!(p, path),
        other => panic!("unexpected {other:?}"),
    }
}

#[rstest]
#[case(2)]
#[case(4)]
#[case(8)]
fn supported_weight_widths(#[case] weight_bits: u32) {
    let cfg = PerceptronConfig { weight_bits, ..Default::default() };
    assert!(cfg.build().is_ok());
}

#[rstest]
#[case(1)]
#[case(3)]
#[case(16)]
fn unsupported_weight_widths(#[case] weight_bits: u32) {
    let cfg = PerceptronConfig { weight_bits, ..Default::default() };
    assert_eq!(cfg.build().err(), Some(ConfigError::InvalidWeightWidth(weight_bits)));
}

#[rstest]
#[case(2, -2, 1)]
#[case(4, -8, 7)]
#[case(8, -128, 127)]
fn weights_wrap_at_both_ends(#[case] bits: u32, #[case] min: i32, #[case] max: i32) {
    let cfg = PerceptronConfig { weight_bits: bits, sum_bits: Some(16), threshold: i32::MAX,
        ..Default::default() };
    let history = bits![0, 0, 0, 0];

    let mut p = Perceptron::from_weights(cfg, &[max; 4]);
    p.update(Outcome::T, history);
    assert_eq!(p.weights(), vec![min; 4]);

    let mut p = Perceptron::from_weights(cfg, &[min; 4]);
    p.update(Outcome::N, history);
    assert_eq!(p.weights(), vec![max; 4]);
}

#[test]
fn sum_wraps_through_minimum() {
    // 5-bit sum: 4 + 4 + 4 + 4 = 16 is one past the maximum of 15
    let p = Perceptron::from_weights(PerceptronConfig::default(), &[4; 4]);
    let out = p.predict(bits![1, 1, 1, 1]);
    assert_eq!(out.y, -16);
    assert_eq!(out.outcome, Outcome::N);
}

#[test]
fn sum_wraps_through_maximum() {
    // 5-bit sum: -8 - 8 = -16 is the minimum, one more step down lands on 15
    let p = Perceptron::from_weights(PerceptronConfig::default(), &[-8, -8, -1, 0]);
    let out = p.predict(bits![1, 1, 1, 0]);
    assert_eq!(out.y, 15);
    assert_eq!(out.outcome, Outcome::T);
}

#[test]
fn training_toward_taken_is_monotonic_until_wrap() {
    let cfg = PerceptronConfig { sum_bits: Some(8), threshold: 127, ..Default::default() };
    let history = bits![1, 0, 1, 1];
    let mut p = Perceptron::new(cfg);

    let mut last = p.predict(history).y;
    // Weights climb from 0 to the 4-bit maximum of 7
    for _ in 0..cfg.weight_max() {
        p.update(Outcome::T, history);
        let y = p.predict(history).y;
        assert!(y >= last);
        assert_eq!(p.predict(history).outcome, Outcome::T);
        last = y;
    }
    assert_eq!(last, 21);

    // The next step wraps every weight to the minimum
    p.update(Outcome::T, history);
    assert_eq!(p.predict(history).y, -24);
}

#[test]
fn sum_mode_changes_results() {
    // Seven taken branches: both modes train on every one of them
    let records: Vec<TraceRecord> = (0..7)
        .flat_map(|_| [TraceRecord::new(0x1000, BEQ), TraceRecord::new(0x1020, ADDI)])
        .collect();

    let mut acc = reference();
    let mut last = PerceptronConfig { sum_mode: SumMode::LastTerm, ..Default::default() }
        .build().unwrap();
    evaluate(&records, &mut acc);
    evaluate(&records, &mut last);

    // Identical weights, but the accumulated sum wraps: 7+7+7 -> -11, then -4
    assert_eq!(acc.weights(0), vec![7; 4]);
    assert_eq!(last.weights(0), vec![7; 4]);
    assert_eq!(acc.predict(0x1000).y, -4);
    assert_eq!(last.predict(0x1000).y, 7);
}

#[test]
fn runs_are_independent_and_deterministic() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let mut pc = 0x8000_0000u32;
    let mut records = Vec::new();
    for _ in 0..2000 {
        let inst = if rng.gen_bool(0.3) { BNE } else { ADDI };
        records.push(TraceRecord::new(pc, inst));
        pc = if rng.gen_bool(0.2) {
            0x8000_0000 + rng.gen_range(0..256u32) * 4
        } else {
            pc + 4
        };
    }

    let a = evaluate(&records, &mut reference());
    let b = evaluate(&records, &mut reference());
    assert!(a.global_brns() > 0);
    assert_eq!(a.global_brns(), b.global_brns());
    assert_eq!(a.global_hits(), b.global_hits());
}

#[test]
fn latched_address_bits_alias_distant_branches() {
    let cfg = PerceptronConfig { address_bits: 8, ..Default::default() };
    let mut bp = cfg.build().unwrap();
    let records = [
        TraceRecord::new(0x8000_0010, BEQ),
        TraceRecord::new(0x8000_0100, ADDI),
        TraceRecord::new(0x9000_0010, BEQ),
        TraceRecord::new(0x9000_0014, ADDI),
    ];
    let mut idx = Vec::new();
    evaluate_with(&records, &mut bp, |e| idx.push(e.prediction.index));
    assert_eq!(idx, vec![4, 4]);
}

proptest! {
    #[test]
    fn history_length_is_constant(len in 1usize..64, pushes in prop::collection::vec(any::<bool>(), 0..200)) {
        let mut ghr = GlobalHistory::new(len);
        for b in pushes.iter() {
            ghr.push(Outcome::from(*b));
            prop_assert_eq!(ghr.len(), len);
            prop_assert_eq!(ghr.get(0), Some(Outcome::from(*b)));
        }
        // The newest `len` pushes, most recent first
        let expected: Vec<Outcome> = pushes.iter().rev()
            .map(|b| Outcome::from(*b))
            .chain(std::iter::repeat(Outcome::N))
            .take(len)
            .collect();
        prop_assert_eq!(ghr.outcomes(), expected);
    }

    #[test]
    fn index_is_stable_and_in_range(pc in any::<u32>(), storage in 16usize..4096) {
        let cfg = PerceptronConfig { storage_bits: storage, ..Default::default() };
        let bp = cfg.build().unwrap();
        let t = bp.table();
        prop_assert!(t.index(pc) < t.size());
        prop_assert_eq!(t.index(pc), t.index(pc));
        prop_assert_eq!(t.index(pc), t.index(pc & !0b11));
    }

    #[test]
    fn predict_does_not_mutate(outcomes in prop::collection::vec(any::<bool>(), 0..64), pc in any::<u32>()) {
        let mut bp = reference();
        for (i, o) in outcomes.iter().enumerate() {
            bp.update(0x1000 + (i as u32) * 4, Outcome::from(*o));
        }
        let before = bp.clone();
        let p = bp.predict(pc);
        prop_assert_eq!(bp.predict(pc), p);
        prop_assert_eq!(bp.history(), before.history());
        prop_assert_eq!(bp.weights(p.index), before.weights(p.index));
    }

    #[test]
    fn wrap_always_lands_in_range(x in any::<i64>(), bits in 1u32..=16) {
        let y = perceptron_bp::fixed::wrap(x, bits);
        prop_assert!(perceptron_bp::fixed::in_range(i64::from(y), bits));
        prop_assert_eq!(i64::from(y).rem_euclid(1 << bits), x.rem_euclid(1 << bits));
    }
}

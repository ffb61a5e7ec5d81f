// SPDX-License-Identifier: Apache-2.0

use arithgen_g8r::gate_provider::InferredProvider;
use arithgen_g8r::get_summary_stats::get_summary_stats;
use arithgen_g8r::netlist::Netlist;
use arithgen_g8r::pipeline::{generate_adder, AdderOptions};
use arithgen_g8r::prefix_adder::AdderAlgorithm;
use arithgen_g8r::sky130_cells::CellLibrary;
use arithgen_g8r::test_utils::{make_rng, mask, random_values, simulate_all};
use test_case::test_case;

fn build_adder(bits: usize, algorithm: AdderAlgorithm) -> Netlist {
    let provider = InferredProvider::new();
    let options = AdderOptions {
        bits,
        algorithm,
        ..Default::default()
    };
    generate_adder(&options, &provider).unwrap()
}

fn run_adder(netlist: &Netlist, a: &[u128], b: &[u128]) -> Vec<u128> {
    simulate_all(
        netlist,
        &[("a", a.to_vec()), ("b", b.to_vec())],
        "o",
        /* latency= */ 0,
    )
    .unwrap()
}

#[test_case(8)]
#[test_case(16)]
#[test_case(32)]
#[test_case(64)]
fn test_all_adders_match_reference(bits: usize) {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut rng = make_rng(bits as u64);
    let mut a = random_values(&mut rng, bits, 1000);
    let mut b = random_values(&mut rng, bits, 1000);
    // Carry through every bit position.
    a.extend([mask(bits), mask(bits), 0, mask(bits - 1)]);
    b.extend([1, mask(bits), 0, 1]);
    let want: Vec<u128> = a
        .iter()
        .zip(b.iter())
        .map(|(x, y)| (x + y) & mask(bits))
        .collect();
    for algorithm in AdderAlgorithm::ALL {
        let netlist = build_adder(bits, algorithm);
        let got = run_adder(&netlist, &a, &b);
        for (i, (g, w)) in got.iter().zip(want.iter()).enumerate() {
            assert_eq!(
                g, w,
                "{} {}-bit: {:#x} + {:#x}",
                algorithm, bits, a[i], b[i]
            );
        }
    }
}

#[test_case(AdderAlgorithm::BrentKung)]
#[test_case(AdderAlgorithm::KoggeStone)]
#[test_case(AdderAlgorithm::HanCarlson)]
#[test_case(AdderAlgorithm::Inferred)]
fn test_8b_carry_into_msb(algorithm: AdderAlgorithm) {
    let netlist = build_adder(8, algorithm);
    assert_eq!(run_adder(&netlist, &[0x7f], &[0x01]), vec![0x80]);
    assert_eq!(run_adder(&netlist, &[0xff], &[0x01]), vec![0x00]);
}

#[test]
fn test_64b_adders_agree_on_random_pairs() {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut rng = make_rng(0xadd);
    let a = random_values(&mut rng, 64, 10_000);
    let b = random_values(&mut rng, 64, 10_000);
    let baseline = run_adder(&build_adder(64, AdderAlgorithm::Inferred), &a, &b);
    for (i, sum) in baseline.iter().enumerate() {
        assert_eq!(*sum, (a[i] as u64).wrapping_add(b[i] as u64) as u128);
    }
    for algorithm in [
        AdderAlgorithm::BrentKung,
        AdderAlgorithm::KoggeStone,
        AdderAlgorithm::HanCarlson,
    ] {
        let got = run_adder(&build_adder(64, algorithm), &a, &b);
        assert!(got == baseline, "{} disagrees with inferred", algorithm);
    }
}

#[test_case(AdderAlgorithm::BrentKung)]
#[test_case(AdderAlgorithm::KoggeStone)]
#[test_case(AdderAlgorithm::HanCarlson)]
#[test_case(AdderAlgorithm::Inferred)]
fn test_sky130_adder_matches_reference(algorithm: AdderAlgorithm) {
    let provider = CellLibrary::sky130_hd();
    let options = AdderOptions {
        bits: 16,
        algorithm,
        ..Default::default()
    };
    let netlist = generate_adder(&options, &provider).unwrap();
    let mut rng = make_rng(130);
    let a = random_values(&mut rng, 16, 500);
    let b = random_values(&mut rng, 16, 500);
    let got = run_adder(&netlist, &a, &b);
    for i in 0..a.len() {
        assert_eq!(got[i], (a[i] + b[i]) & 0xffff);
    }
}

#[test]
fn test_prefix_depth_ordering() {
    let depth = |algorithm| {
        get_summary_stats(&build_adder(64, algorithm))
            .unwrap()
            .comb_depth
    };
    let kogge_stone = depth(AdderAlgorithm::KoggeStone);
    let han_carlson = depth(AdderAlgorithm::HanCarlson);
    let brent_kung = depth(AdderAlgorithm::BrentKung);
    assert!(kogge_stone < han_carlson, "{} vs {}", kogge_stone, han_carlson);
    assert!(han_carlson < brent_kung, "{} vs {}", han_carlson, brent_kung);
    assert!(depth(AdderAlgorithm::Inferred) < kogge_stone);
}

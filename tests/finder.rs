mod common;

use common::random_pair_tensor;
use test_case::test_case;
use triplet_pll::alphabet::N_SYMBOLS;
use triplet_pll::objective::ParameterLayout;
use triplet_pll::triplets::{
    column_triples, find_triplets, find_triplets_parallel, ColumnTripletScorer, PairTensor,
    SymbolTripletScorer, TripletRecord,
};

fn brute_force_symbol_scores(pair: &PairTensor, min_separation: usize) -> Vec<f64> {
    let mut scores = Vec::new();
    for [i, j, k] in column_triples(pair.ncol(), min_separation) {
        for a in 0..N_SYMBOLS {
            for b in 0..N_SYMBOLS {
                for c in 0..N_SYMBOLS {
                    scores.push(pair.get(i, j, a, b) + pair.get(i, k, a, c) + pair.get(j, k, b, c));
                }
            }
        }
    }
    scores.sort_by(|a, b| b.total_cmp(a));
    scores
}

fn brute_force_column_score(pair: &PairTensor, [i, j, k]: [usize; 3]) -> f64 {
    let mut total = 0.0;
    for a in 0..N_SYMBOLS {
        for b in 0..N_SYMBOLS {
            for c in 0..N_SYMBOLS {
                total += pair.get(i, j, a, b) + pair.get(i, k, a, c) + pair.get(j, k, b, c);
            }
        }
    }
    total
}

#[test_case(5, 1, 10 ; "five columns adjacent")]
#[test_case(7, 2, 100 ; "seven columns separated")]
#[test_case(6, 0, 1 ; "zero separation single best")]
#[test_case(8, 3, 40000 ; "more requested than exist")]
fn symbol_search_matches_brute_force(ncol: usize, min_separation: usize, ntriplets: usize) {
    let pair = random_pair_tensor(ncol, ncol as u64 * 31 + min_separation as u64);
    let expected = brute_force_symbol_scores(&pair, min_separation);
    let expected = &expected[..ntriplets.min(expected.len())];

    let selection = find_triplets(&pair, ntriplets, min_separation, &SymbolTripletScorer).unwrap();
    assert_eq!(selection.scores(), expected);

    for t in selection.records() {
        assert!(t.j >= t.i + min_separation.max(1) as u32);
        assert!(t.k >= t.j + min_separation.max(1) as u32);
    }
}

#[test_case(6, 1, 5 ; "six columns")]
#[test_case(9, 2, 20 ; "nine columns")]
fn column_search_matches_brute_force(ncol: usize, min_separation: usize, ntriplets: usize) {
    let pair = random_pair_tensor(ncol, 77);
    let mut expected: Vec<f64> = column_triples(ncol, min_separation)
        .map(|triple| brute_force_column_score(&pair, triple))
        .collect();
    expected.sort_by(|a, b| b.total_cmp(a));
    expected.truncate(ntriplets);

    let selection = find_triplets(&pair, ntriplets, min_separation, &ColumnTripletScorer).unwrap();
    assert_eq!(selection.len(), expected.len());
    for (record, want) in selection.records().iter().zip(&expected) {
        let brute = brute_force_column_score(&pair, record.columns().map(|c| c as usize));
        assert!((record.score() - brute).abs() <= 1e-9 * brute.abs().max(1.0));
        assert!((record.score() - want).abs() <= 1e-9 * want.abs().max(1.0));
    }
}

#[test_case(4, 2 ; "four columns separation two")]
#[test_case(2, 1 ; "two columns")]
#[test_case(0, 1 ; "no columns")]
fn too_narrow_alignment_yields_nothing(ncol: usize, min_separation: usize) {
    let pair = random_pair_tensor(ncol, 1);
    assert!(find_triplets(&pair, 10, min_separation, &SymbolTripletScorer)
        .unwrap()
        .is_empty());
    assert!(find_triplets_parallel(&pair, 10, min_separation, &ColumnTripletScorer)
        .unwrap()
        .is_empty());
}

#[test]
fn parallel_search_retains_same_scores() {
    let pair = random_pair_tensor(10, 5);
    for ntriplets in [1, 17, 500] {
        let sequential = find_triplets(&pair, ntriplets, 2, &SymbolTripletScorer).unwrap();
        let parallel = find_triplets_parallel(&pair, ntriplets, 2, &SymbolTripletScorer).unwrap();
        assert_eq!(sequential.scores(), parallel.scores());

        let sequential = find_triplets(&pair, ntriplets, 2, &ColumnTripletScorer).unwrap();
        let parallel = find_triplets_parallel(&pair, ntriplets, 2, &ColumnTripletScorer).unwrap();
        assert_eq!(sequential.scores(), parallel.scores());
    }
}

#[test]
fn packed_output_is_parallel_to_scores() {
    let pair = random_pair_tensor(6, 3);
    let selection = find_triplets(&pair, 12, 1, &SymbolTripletScorer).unwrap();
    let packed = selection.packed();
    assert_eq!(packed.len(), 6 * selection.len());

    let mut fields = vec![0u32; packed.len()];
    let mut scores = vec![0.0; selection.len()];
    assert_eq!(selection.write_packed(&mut fields, &mut scores), selection.len());
    assert_eq!(fields, packed);
    assert_eq!(scores, selection.scores());
    for (chunk, score) in packed.chunks_exact(6).zip(&scores) {
        let (i, j, k) = (chunk[0] as usize, chunk[1] as usize, chunk[2] as usize);
        let (a, b, c) = (chunk[3] as usize, chunk[4] as usize, chunk[5] as usize);
        assert_eq!(
            *score,
            pair.get(i, j, a, b) + pair.get(i, k, a, c) + pair.get(j, k, b, c)
        );
    }
}

#[test]
fn search_on_parameter_couplings() {
    // a single strong coupling x2[(1, 4), C, W] drives the best triplet
    let layout = ParameterLayout::new(6, 0);
    let mut x = vec![0.0; layout.nvar()];
    let ij = layout.pair_index(1, 4);
    let (_, x2, _) = layout.split_mut(&mut x);
    x2[ParameterLayout::pair_offset(ij, 4, 17)] = 3.0;

    let pair = layout.pair_tensor(&x).unwrap();
    let best = find_triplets(&pair, 1, 1, &SymbolTripletScorer).unwrap();
    let t = best.records()[0];
    assert_eq!(t.score, 3.0);
    let columns = [t.i, t.j, t.k];
    let symbols = t.symbols();
    let pos1 = columns.iter().position(|&c| c == 1).unwrap();
    let pos4 = columns.iter().position(|&c| c == 4).unwrap();
    assert_eq!((symbols[pos1], symbols[pos4]), (4, 17));
}
